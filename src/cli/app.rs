use super::commands::auth::AuthCommands;
use super::commands::export::ExportCommands;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "annotation-export")]
#[command(about = "Export note attachments and their metadata from Microsoft Dynamics 365")]
#[command(version)]
pub struct Cli {
    /// Log file, truncated on every run
    #[arg(long, global = true, default_value = "annotation-export.log")]
    pub log_file: PathBuf,

    /// Read TENANT_ID, CLIENT_ID, CLIENT_SECRET and RESOURCE from this file
    #[arg(long, global = true)]
    pub env_file: Option<PathBuf>,

    /// Settings file (defaults to the per-user config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Download annotation attachments and write their metadata
    Export(ExportCommands),
    /// Check that the client credentials can obtain a token
    Auth(AuthCommands),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::MetadataProfile;

    #[test]
    fn test_parse_export_arguments() {
        let cli = Cli::try_parse_from([
            "annotation-export",
            "export",
            "--crm-url",
            "https://org.crm.dynamics.com",
            "--profile",
            "per-file",
            "--fail-fast",
            "--timeout-secs",
            "15",
        ])
        .unwrap();

        assert_eq!(cli.log_file, PathBuf::from("annotation-export.log"));
        match cli.command {
            Commands::Export(args) => {
                let overrides = args.overrides();
                assert_eq!(overrides.crm_url.as_deref(), Some("https://org.crm.dynamics.com"));
                assert_eq!(overrides.profile, Some(MetadataProfile::PerFile));
                assert!(overrides.fail_fast);
                assert_eq!(overrides.timeout_secs, Some(15));
            }
            _ => panic!("expected export command"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["annotation-export", "auth", "--env-file", "prod.env"]).unwrap();
        assert_eq!(cli.env_file, Some(PathBuf::from("prod.env")));
        assert!(matches!(cli.command, Commands::Auth(_)));
    }

    #[test]
    fn test_rejects_unknown_profile() {
        assert!(Cli::try_parse_from(["annotation-export", "export", "--profile", "all"]).is_err());
    }
}
