use clap::Parser;
use cli::{Args, Commands};
use discover::discover_host;
use error::{CliError, CliResult};
use locate::locate_package;
use logging::setup_logging;
use provfind_config::config::{self, get_config, Config, CONFIG_PATH};
use provfind_core::{Provider, Source};
use provfind_disco::{http_client::configure_http_client, CredentialsChain, Disco};
use provfind_registry::HttpClientFactory;
use provfind_utils::path::resolve_path;
use tracing::debug;
use ureq::Proxy;
use utils::set_color;
use versions::list_versions;

mod cli;
mod discover;
mod error;
mod locate;
mod logging;
mod utils;
mod versions;

fn create_source(config: &Config) -> Source {
    Source::new(
        Disco::from_config(config),
        CredentialsChain::from_config(config),
        HttpClientFactory,
    )
}

fn parse_provider(config: &Config, input: &str) -> CliResult<Provider> {
    Ok(Provider::parse_with_default_host(
        input,
        &config.default_registry()?,
    )?)
}

/// Applies proxy, user agent and timeout from the command line and the
/// config, command line first.
fn setup_http_client(args: &Args, config: &Config) -> CliResult<()> {
    let proxy = args
        .proxy
        .as_deref()
        .or(config.proxy.as_deref())
        .map(|value| {
            Proxy::new(value).map_err(|err| {
                CliError::InvalidProxy {
                    value: value.to_string(),
                    source: Box::new(err),
                }
            })
        })
        .transpose()?;
    let user_agent = args
        .user_agent
        .clone()
        .unwrap_or_else(|| config.user_agent());
    let timeout = config.timeout()?;

    configure_http_client(|http| {
        if proxy.is_some() {
            http.proxy = proxy;
        }
        http.user_agent = Some(user_agent);
        if timeout.is_some() {
            http.timeout = timeout;
        }
    });

    Ok(())
}

fn handle_cli() -> CliResult<()> {
    let args = Args::parse();

    setup_logging(&args);

    if args.no_color {
        set_color(false);
    }

    if let Some(ref c) = args.config {
        let path = resolve_path(c)?;
        *CONFIG_PATH.write().unwrap_or_else(|e| e.into_inner()) = path;
    }

    config::init()?;
    let config = get_config();
    debug!(
        "Loaded configuration from {}",
        CONFIG_PATH
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .display()
    );

    setup_http_client(&args, &config)?;

    match args.command {
        Commands::Versions {
            ref provider,
        } => {
            let provider = parse_provider(&config, provider)?;
            list_versions(&create_source(&config), &provider, args.json)?;
        }
        Commands::Locate {
            ref provider,
            ref version,
            ref platform,
        } => {
            let provider = parse_provider(&config, provider)?;
            locate_package(
                &create_source(&config),
                &provider,
                version,
                platform.as_deref(),
                args.json,
            )?;
        }
        Commands::Discover {
            ref hostname,
        } => {
            discover_host(&Disco::from_config(&config), hostname, args.json)?;
        }
    }

    Ok(())
}

fn main() {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .build(),
        )
    }))
    .ok();

    if let Err(err) = handle_cli() {
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(1);
    }
}
