use std::{
    collections::HashMap,
    fmt, fs,
    path::{Path, PathBuf},
    sync::{LazyLock, RwLock},
    time::Duration,
};

use provfind_core::{Hostname, DEFAULT_REGISTRY_HOST};
use provfind_utils::{path::xdg_config_home, time::parse_duration};
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::error::{ConfigError, Result};

/// Application's configuration
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Hostname used for provider addresses written as `namespace/type`.
    /// Default: registry.terraform.io
    pub default_registry: Option<String>,

    /// User agent sent with every request.
    /// Default: provfind/<version>
    pub user_agent: Option<String>,

    /// Global timeout for a single HTTP request, e.g. `30s`.
    pub timeout: Option<String>,

    /// Proxy for all HTTP requests, e.g. `http://proxy:3128`.
    pub proxy: Option<String>,

    /// Service discovery overrides keyed by hostname. Hosts listed here are
    /// never contacted for discovery.
    #[serde(default)]
    pub hosts: HashMap<String, HostConfig>,

    /// Registry credentials keyed by hostname.
    #[serde(default)]
    pub credentials: HashMap<String, CredentialsConfig>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HostConfig {
    /// Service URLs keyed by service name, e.g. `providers.v1`.
    #[serde(default)]
    pub services: HashMap<String, String>,
}

#[derive(Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CredentialsConfig {
    pub token: String,
}

impl fmt::Debug for CredentialsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialsConfig")
            .field("token", &"<redacted>")
            .finish()
    }
}

pub static CONFIG: LazyLock<RwLock<Option<Config>>> = LazyLock::new(|| RwLock::new(None));

pub static CONFIG_PATH: LazyLock<RwLock<PathBuf>> = LazyLock::new(|| {
    RwLock::new(match std::env::var("PROVFIND_CONFIG") {
        Ok(path_str) => PathBuf::from(path_str),
        Err(_) => xdg_config_home().join("provfind").join("config.toml"),
    })
});

/// Loads the configuration from [`CONFIG_PATH`] into [`CONFIG`].
pub fn init() -> Result<()> {
    let path = CONFIG_PATH
        .read()
        .unwrap_or_else(|e| e.into_inner())
        .clone();
    let config = Config::load(&path)?;
    *CONFIG.write().unwrap_or_else(|e| e.into_inner()) = Some(config);
    Ok(())
}

/// Returns the loaded configuration, or the defaults if [`init`] has not
/// run.
pub fn get_config() -> Config {
    CONFIG
        .read()
        .unwrap_or_else(|e| e.into_inner())
        .clone()
        .unwrap_or_default()
}

impl Config {
    /// Loads the configuration from `path`. A missing file yields the
    /// defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = match fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No config at {}, using defaults", path.display());
                Self::default()
            }
            Err(source) => {
                return Err(ConfigError::IoError {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        config.resolve()?;

        Ok(config)
    }

    /// Validates every value and normalizes the hostname keys of `hosts`
    /// and `credentials`.
    pub fn resolve(&mut self) -> Result<()> {
        self.default_registry()?;
        self.timeout()?;

        let mut hosts = HashMap::with_capacity(self.hosts.len());
        for (hostname, host) in self.hosts.drain() {
            let hostname = Hostname::parse(&hostname)?;
            for (service, url) in &host.services {
                validate_service(&hostname, service, url)?;
            }
            if hosts.insert(hostname.to_string(), host).is_some() {
                return Err(ConfigError::DuplicateHost(hostname.to_string()));
            }
        }
        self.hosts = hosts;

        let mut credentials = HashMap::with_capacity(self.credentials.len());
        for (hostname, creds) in self.credentials.drain() {
            let hostname = Hostname::parse(&hostname)?;
            if creds.token.trim().is_empty() {
                return Err(ConfigError::EmptyToken(hostname.to_string()));
            }
            if credentials.insert(hostname.to_string(), creds).is_some() {
                return Err(ConfigError::DuplicateHost(hostname.to_string()));
            }
        }
        self.credentials = credentials;

        Ok(())
    }

    pub fn default_registry(&self) -> Result<Hostname> {
        let hostname = self
            .default_registry
            .as_deref()
            .unwrap_or(DEFAULT_REGISTRY_HOST);
        Ok(Hostname::parse(hostname)?)
    }

    pub fn timeout(&self) -> Result<Option<Duration>> {
        self.timeout
            .as_deref()
            .map(|t| parse_duration(t).map_err(|e| ConfigError::InvalidTimeout(e.to_string())))
            .transpose()
    }

    pub fn user_agent(&self) -> String {
        self.user_agent
            .clone()
            .unwrap_or_else(|| format!("provfind/{}", env!("CARGO_PKG_VERSION")))
    }
}

fn validate_service(hostname: &Hostname, service: &str, url: &str) -> Result<()> {
    let valid_name = service
        .rsplit_once(".v")
        .is_some_and(|(name, version)| !name.is_empty() && version.parse::<u32>().is_ok());
    if !valid_name {
        return Err(ConfigError::InvalidServiceName {
            hostname: hostname.to_string(),
            service: service.to_string(),
        });
    }

    let absolute = Url::parse(url).is_ok_and(|u| matches!(u.scheme(), "http" | "https"));
    if !absolute {
        return Err(ConfigError::InvalidServiceUrl {
            hostname: hostname.to_string(),
            service: service.to_string(),
            url: url.to_string(),
        });
    }

    Ok(())
}
