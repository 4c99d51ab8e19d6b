use clap::{ArgAction, Parser, Subcommand};

#[derive(Parser)]
#[command(
    author,
    version,
    about,
    help_template = "{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}",
    arg_required_else_help = true
)]
pub struct Args {
    /// Set output verbosity
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress outputs
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output as json
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Disable colors in output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Provide custom config file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Set proxy
    #[arg(required = false, long, short = 'P', global = true)]
    pub proxy: Option<String>,

    /// Set user agent
    #[arg(required = false, long, short = 'A', global = true)]
    pub user_agent: Option<String>,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the published versions of a provider, oldest first
    #[command(arg_required_else_help = true)]
    #[clap(name = "versions", visible_alias = "ls")]
    Versions {
        /// Provider address, `namespace/type` or `hostname/namespace/type`
        #[arg(required = true)]
        provider: String,
    },

    /// Show where to download a provider package
    #[command(arg_required_else_help = true)]
    #[clap(name = "locate", visible_alias = "loc")]
    Locate {
        /// Provider address, `namespace/type` or `hostname/namespace/type`
        #[arg(required = true)]
        provider: String,

        /// Exact version, e.g. `1.2.3`
        #[arg(required = true)]
        version: String,

        /// Target platform as `os_arch` [default: this machine]
        #[arg(required = false, long, short = 'p')]
        platform: Option<String>,
    },

    /// Show the provider registry service a host offers
    #[command(arg_required_else_help = true)]
    Discover {
        /// Hostname, optionally with a port
        #[arg(required = true)]
        hostname: String,
    },
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_command_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_locate() {
        let args = Args::try_parse_from([
            "provfind",
            "-vv",
            "--json",
            "locate",
            "hashicorp/random",
            "3.6.0",
            "--platform",
            "linux_arm64",
        ])
        .unwrap();

        assert_eq!(args.verbose, 2);
        assert!(args.json);
        match args.command {
            Commands::Locate {
                provider,
                version,
                platform,
            } => {
                assert_eq!(provider, "hashicorp/random");
                assert_eq!(version, "3.6.0");
                assert_eq!(platform.as_deref(), Some("linux_arm64"));
            }
            _ => panic!("expected locate"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = Args::try_parse_from([
            "provfind",
            "versions",
            "acme/widget",
            "-c",
            "/tmp/provfind.toml",
            "-A",
            "custom/1.0",
            "-q",
        ])
        .unwrap();

        assert!(args.quiet);
        assert_eq!(args.config.as_deref(), Some("/tmp/provfind.toml"));
        assert_eq!(args.user_agent.as_deref(), Some("custom/1.0"));
        assert!(matches!(args.command, Commands::Versions { .. }));
    }

    #[test]
    fn test_missing_version_is_rejected() {
        assert!(Args::try_parse_from(["provfind", "locate", "acme/widget"]).is_err());
    }
}
