pub mod handler;

use clap::Args;
use std::path::PathBuf;

use crate::config::ExportOverrides;
use crate::export::MetadataProfile;

pub use handler::handle_export_command;

#[derive(Args)]
pub struct ExportCommands {
    /// Organisation URL, e.g. https://contoso.crm.dynamics.com (defaults to CRM_URL, then RESOURCE)
    #[arg(long)]
    pub crm_url: Option<String>,

    /// Azure AD authority used for the token request
    #[arg(long)]
    pub authority: Option<String>,

    /// Directory receiving the attachments folder and metadata files
    #[arg(short, long)]
    pub output_root: Option<PathBuf>,

    /// Metadata field set and output layout
    #[arg(short, long, value_enum)]
    pub profile: Option<MetadataProfile>,

    /// Stop at the first record that cannot be exported
    #[arg(long)]
    pub fail_fast: bool,

    /// Per-request timeout in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,
}

impl ExportCommands {
    pub fn overrides(&self) -> ExportOverrides {
        ExportOverrides {
            crm_url: self.crm_url.clone(),
            authority: self.authority.clone(),
            output_root: self.output_root.clone(),
            profile: self.profile,
            fail_fast: self.fail_fast,
            timeout_secs: self.timeout_secs,
        }
    }
}
