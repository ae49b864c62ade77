pub mod auth;
pub mod export;

pub use auth::{AuthCommands, handle_auth_command};
pub use export::{ExportCommands, handle_export_command};
