use nu_ansi_term::Color::{Blue, Cyan, Green};
use provfind_core::{PackageMeta, Platform, Provider, Source, Version};
use tracing::{debug, info};

use crate::{
    error::{CliError, CliResult},
    utils::{print_json, Colored},
};

pub fn locate_package(
    source: &Source,
    provider: &Provider,
    version: &str,
    platform: Option<&str>,
    json: bool,
) -> CliResult<()> {
    let version = Version::parse(version).map_err(|err| {
        CliError::InvalidVersion {
            input: version.to_string(),
            source: err,
        }
    })?;
    let platform = match platform {
        Some(platform) => platform.parse::<Platform>()?,
        None => Platform::current(),
    };

    // The registry answers 404 both for unknown versions and for
    // unsupported platforms.
    let versions = source.available_versions(provider)?;
    let Some(version) = versions.find(&version).cloned() else {
        return Err(CliError::UnknownVersion {
            provider: provider.clone(),
            version,
        });
    };

    debug!("Locating {} {} for {}", provider, version, platform);
    let meta = source.download_location(provider, &version, &platform)?;

    if json {
        return print_json(&meta);
    }

    print_package(&meta);
    Ok(())
}

fn print_package(meta: &PackageMeta) {
    let field = |label: &str, value: &dyn std::fmt::Display| {
        info!("{:>10}: {}", Colored(Cyan, label), value);
    };

    field("Provider", &Colored(Blue, &meta.provider));
    field("Version", &Colored(Green, &meta.version));
    field("Platform", &meta.target_platform);
    field("Filename", &meta.filename);
    field("URL", &meta.location);

    if !meta.protocol_versions.is_empty() {
        field("Protocols", &meta.protocol_versions.join(", "));
    }
    if let Some(sum) = &meta.sha256_sum {
        field("SHA-256", sum);
    }
    if let Some(url) = &meta.shasums_url {
        field("SHASUMS", url);
    }
    if let Some(url) = &meta.shasums_signature_url {
        field("Signature", url);
    }
    for key in &meta.signing_keys {
        field("Key", &key.key_id);
    }
}
