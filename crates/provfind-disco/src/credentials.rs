//! Credential sources for registry hosts.

use std::collections::HashMap;

use provfind_config::config::Config;
use provfind_core::{BoxError, Credentials, CredentialsSource, Hostname};
use tracing::{trace, warn};

/// Prefix of the environment variables [`EnvCredentials`] reads.
pub const TOKEN_ENV_PREFIX: &str = "TF_TOKEN_";

/// Tokens configured up front, e.g. in the `[credentials]` table of the
/// configuration file.
#[derive(Clone, Default)]
pub struct StaticCredentials {
    tokens: HashMap<Hostname, String>,
}

impl StaticCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &Config) -> Self {
        let tokens = config
            .credentials
            .iter()
            .filter_map(|(hostname, creds)| {
                match Hostname::parse(hostname) {
                    Ok(hostname) => Some((hostname, creds.token.clone())),
                    Err(err) => {
                        warn!("Ignoring credentials: {}", err);
                        None
                    }
                }
            })
            .collect();

        Self {
            tokens,
        }
    }

    pub fn with_token(mut self, hostname: Hostname, token: impl Into<String>) -> Self {
        self.tokens.insert(hostname, token.into());
        self
    }
}

impl CredentialsSource for StaticCredentials {
    fn credentials_for_host(&self, hostname: &Hostname) -> Result<Option<Credentials>, BoxError> {
        Ok(self.tokens.get(hostname).map(Credentials::token))
    }
}

/// Tokens from `TF_TOKEN_<host>` environment variables.
///
/// In the variable name every `.` of the hostname becomes `_` and every `-`
/// becomes `__`, so `registry.my-corp.com` is read from
/// `TF_TOKEN_registry_my__corp_com`. Empty values are ignored.
#[derive(Clone, Copy, Debug, Default)]
pub struct EnvCredentials;

impl EnvCredentials {
    pub fn variable_name(hostname: &Hostname) -> String {
        let mut name = String::from(TOKEN_ENV_PREFIX);
        for c in hostname.as_str().chars() {
            match c {
                '.' => name.push('_'),
                '-' => name.push_str("__"),
                c => name.push(c),
            }
        }
        name
    }
}

impl CredentialsSource for EnvCredentials {
    fn credentials_for_host(&self, hostname: &Hostname) -> Result<Option<Credentials>, BoxError> {
        let name = Self::variable_name(hostname);
        match std::env::var(&name) {
            Ok(token) if !token.trim().is_empty() => {
                trace!("Using token from {}", name);
                Ok(Some(Credentials::token(token.trim())))
            }
            Ok(_) | Err(std::env::VarError::NotPresent) => Ok(None),
            Err(err @ std::env::VarError::NotUnicode(_)) => {
                Err(format!("{name} is not valid unicode: {err}").into())
            }
        }
    }
}

/// Asks each source in order and returns the first credentials found.
///
/// An error from any source is returned as-is without asking the remaining
/// ones.
#[derive(Default)]
pub struct CredentialsChain {
    sources: Vec<Box<dyn CredentialsSource>>,
}

impl CredentialsChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<S>(mut self, source: S) -> Self
    where
        S: CredentialsSource + 'static,
    {
        self.sources.push(Box::new(source));
        self
    }

    /// Environment tokens first, then tokens from `config`.
    pub fn from_config(config: &Config) -> Self {
        Self::new()
            .with(EnvCredentials)
            .with(StaticCredentials::from_config(config))
    }
}

impl CredentialsSource for CredentialsChain {
    fn credentials_for_host(&self, hostname: &Hostname) -> Result<Option<Credentials>, BoxError> {
        for source in &self.sources {
            if let Some(credentials) = source.credentials_for_host(hostname)? {
                return Ok(Some(credentials));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    struct FailingSource;

    impl CredentialsSource for FailingSource {
        fn credentials_for_host(&self, _: &Hostname) -> Result<Option<Credentials>, BoxError> {
            Err("keychain locked".into())
        }
    }

    fn host(s: &str) -> Hostname {
        Hostname::parse(s).unwrap()
    }

    #[test]
    fn test_static_credentials() {
        let creds = StaticCredentials::new().with_token(host("example.com"), "abc");
        assert_eq!(
            creds.credentials_for_host(&host("Example.com")).unwrap(),
            Some(Credentials::token("abc"))
        );
        assert_eq!(creds.credentials_for_host(&host("other.com")).unwrap(), None);
    }

    #[test]
    fn test_static_credentials_from_config() {
        let mut config = Config::default();
        config.credentials.insert(
            "example.com".into(),
            provfind_config::config::CredentialsConfig {
                token: "from-config".into(),
            },
        );

        let creds = StaticCredentials::from_config(&config);
        assert_eq!(
            creds.credentials_for_host(&host("example.com")).unwrap(),
            Some(Credentials::token("from-config"))
        );
    }

    #[test]
    fn test_env_variable_name() {
        assert_eq!(
            EnvCredentials::variable_name(&host("registry.my-corp.com")),
            "TF_TOKEN_registry_my__corp_com"
        );
    }

    #[test]
    #[serial]
    fn test_env_credentials() {
        std::env::set_var("TF_TOKEN_env_example_com", " tok ");
        std::env::set_var("TF_TOKEN_empty_example_com", "");

        assert_eq!(
            EnvCredentials
                .credentials_for_host(&host("env.example.com"))
                .unwrap(),
            Some(Credentials::token("tok"))
        );
        assert_eq!(
            EnvCredentials
                .credentials_for_host(&host("empty.example.com"))
                .unwrap(),
            None
        );

        std::env::remove_var("TF_TOKEN_env_example_com");
        std::env::remove_var("TF_TOKEN_empty_example_com");
    }

    #[test]
    #[serial]
    fn test_chain_prefers_first_source() {
        std::env::set_var("TF_TOKEN_chain_example_com", "from-env");

        let chain = CredentialsChain::new()
            .with(EnvCredentials)
            .with(StaticCredentials::new().with_token(host("chain.example.com"), "static"));
        assert_eq!(
            chain
                .credentials_for_host(&host("chain.example.com"))
                .unwrap(),
            Some(Credentials::token("from-env"))
        );

        std::env::remove_var("TF_TOKEN_chain_example_com");
        assert_eq!(
            chain
                .credentials_for_host(&host("chain.example.com"))
                .unwrap(),
            Some(Credentials::token("static"))
        );
    }

    #[test]
    fn test_chain_stops_on_error() {
        let chain = CredentialsChain::new()
            .with(FailingSource)
            .with(StaticCredentials::new().with_token(host("example.com"), "never"));

        let err = chain
            .credentials_for_host(&host("example.com"))
            .unwrap_err();
        assert_eq!(err.to_string(), "keychain locked");
    }

    #[test]
    fn test_empty_chain() {
        assert_eq!(
            CredentialsChain::new()
                .credentials_for_host(&host("example.com"))
                .unwrap(),
            None
        );
    }
}
