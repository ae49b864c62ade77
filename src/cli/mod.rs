pub mod app;
pub mod commands;

pub use app::{Cli, Commands};

use anyhow::Result;
use std::path::Path;

use crate::auth::Credentials;
use crate::config::Config;
use crate::error::ExportError;
use commands::{handle_auth_command, handle_export_command};

/// Load credentials and settings once, then dispatch to the selected command
pub async fn run(cli: Cli) -> Result<()> {
    let credentials = load_credentials(cli.env_file.as_deref())?;
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Export(args) => handle_export_command(args, &credentials, &config).await,
        Commands::Auth(args) => handle_auth_command(args, &credentials, &config).await,
    }
}

fn load_credentials(env_file: Option<&Path>) -> Result<Credentials, ExportError> {
    match env_file {
        Some(path) => Credentials::from_env_file(path),
        None => {
            dotenvy::dotenv().ok();
            Credentials::from_env()
        }
    }
}
