use anyhow::Result;
use colored::*;
use log::{error, info};

use super::AuthCommands;
use crate::api::TokenClient;
use crate::auth::Credentials;
use crate::config::{Config, ExportSettings};

pub async fn handle_auth_command(args: AuthCommands, credentials: &Credentials, config: &Config) -> Result<()> {
    info!("Executing auth command");

    let settings = ExportSettings::resolve(&args.overrides(), None, config, credentials);
    let token_client = TokenClient::new(settings.http_client()?, settings.authority.clone());

    println!("Annotation Export Authentication");
    println!("================================");
    println!("  Tenant:    {}", credentials.tenant_id);
    println!("  Client ID: {}", credentials.client_id);
    println!("  Resource:  {}", credentials.resource);
    println!("  Endpoint:  {}", token_client.token_url(&credentials.tenant_id));

    println!("\nTesting authentication...");
    match token_client.request_token(credentials).await {
        Ok(token) => {
            info!("Authentication test successful");
            println!("{} Authentication successful ({})", "✓".green(), token.redacted());
            Ok(())
        }
        Err(e) => {
            error!("Authentication test failed: {}", e);
            println!("{} Authentication failed: {}", "✗".red(), e);
            Err(e.into())
        }
    }
}
