use nu_ansi_term::Color::Yellow;
use provfind_core::{Provider, Source};
use serde_json::json;
use tracing::{info, warn};

use crate::{
    error::CliResult,
    utils::{print_json, Colored},
};

pub fn list_versions(source: &Source, provider: &Provider, json: bool) -> CliResult<()> {
    let versions = source.available_versions(provider)?;

    if json {
        return print_json(&json!({
            "provider": provider,
            "versions": versions,
            "newest": versions.newest(),
            "newest_release": versions.newest_release(),
        }));
    }

    if versions.is_empty() {
        warn!("{} has no published versions", provider);
        return Ok(());
    }

    for version in &versions {
        if version.is_prerelease() {
            info!("{}", Colored(Yellow, version));
        } else {
            info!("{}", version);
        }
    }

    Ok(())
}
