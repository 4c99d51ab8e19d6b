use nu_ansi_term::Color::{Blue, Green};
use provfind_core::{FindError, Hostname, ServiceHost, PROVIDERS_V1};
use provfind_disco::Disco;
use serde_json::json;
use tracing::{debug, info};

use crate::{
    error::CliResult,
    utils::{print_json, Colored},
};

pub fn discover_host(disco: &Disco, hostname: &str, json: bool) -> CliResult<()> {
    let hostname = Hostname::parse(hostname)?;
    let host = disco.discover_host(&hostname)?;

    let services: Vec<&str> = host.service_names().collect();
    debug!("{} lists services: {}", hostname, services.join(", "));

    let url = host
        .service_url(PROVIDERS_V1)
        .map_err(|err| FindError::from_service_url(&hostname, err))?;

    if json {
        return print_json(&json!({
            "hostname": hostname,
            "discovery_url": host.discovery_url().as_str(),
            "services": services,
            "providers_v1": url.as_str(),
        }));
    }

    info!(
        "{} {} {}",
        Colored(Blue, &hostname),
        PROVIDERS_V1,
        Colored(Green, &url)
    );
    Ok(())
}
