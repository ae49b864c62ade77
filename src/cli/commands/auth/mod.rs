pub mod handler;

use clap::Args;

use crate::config::ExportOverrides;

pub use handler::handle_auth_command;

#[derive(Args)]
pub struct AuthCommands {
    /// Azure AD authority used for the token request
    #[arg(long)]
    pub authority: Option<String>,

    /// Request timeout in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,
}

impl AuthCommands {
    pub fn overrides(&self) -> ExportOverrides {
        ExportOverrides {
            authority: self.authority.clone(),
            timeout_secs: self.timeout_secs,
            ..Default::default()
        }
    }
}
