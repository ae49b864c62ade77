//! Export command handler

use anyhow::Result;
use colored::*;

use super::ExportCommands;
use crate::api::TokenClient;
use crate::auth::Credentials;
use crate::config::{Config, ExportSettings};
use crate::error::ExportError;
use crate::export::{ExportSummary, Exporter, MetadataLayout};

/// Optional organisation URL, consulted between the flag and the settings file
pub const CRM_URL_VAR: &str = "CRM_URL";

pub async fn handle_export_command(args: ExportCommands, credentials: &Credentials, config: &Config) -> Result<()> {
    let settings = ExportSettings::resolve(
        &args.overrides(),
        std::env::var(CRM_URL_VAR).ok(),
        config,
        credentials,
    );
    log::info!("Export settings: {:?}", settings);

    println!("🌍 Organisation: {}", settings.crm_url.bright_green().bold());
    println!("📁 Output root:  {}", settings.output_root.display().to_string().cyan());
    println!("🧾 Profile:      {}", settings.profile.to_string().cyan());
    println!();

    let http_client = settings.http_client()?;
    let token_client = TokenClient::new(http_client.clone(), settings.authority.clone());
    let exporter = Exporter::with_http_client(settings, http_client);

    println!("🔐 {}", "Requesting access token...".dimmed());
    let token = token_client.obtain_token(credentials).await;
    match &token {
        Some(_) => println!("{} Access token obtained", "✓".green()),
        None => println!("{} Could not obtain an access token (see log for details)", "✗".red()),
    }

    println!("🚀 {}", "Fetching annotations with attachments...".dimmed());
    let summary = exporter.export_attachments(token.as_ref()).await?;

    print_summary(&summary, exporter.settings().profile.layout());

    if !summary.is_complete() {
        return Err(ExportError::Incomplete {
            skipped: summary.skipped.len(),
            fetched: summary.records_fetched,
        }
        .into());
    }

    Ok(())
}

fn print_summary(summary: &ExportSummary, layout: MetadataLayout) {
    println!();
    println!("📋 {}", "Export summary".bold());
    println!("  Records fetched: {}", summary.records_fetched);
    println!("  Files written:   {}", summary.files_written().to_string().bright_green());
    println!("  Bytes written:   {}", summary.bytes_written);
    println!("  Attachments:     {}", summary.attachments_dir.display());
    println!(
        "  Duration:        {:.2}s",
        summary.duration().num_milliseconds() as f64 / 1000.0
    );

    match layout {
        MetadataLayout::Aggregate => {
            for artifact in &summary.artifacts {
                println!("💾 Metadata saved to: {}", artifact.display().to_string().bright_green());
            }
        }
        MetadataLayout::PerFile => {
            println!("💾 {} metadata files written next to the attachments", summary.artifacts.len());
        }
    }

    if summary.more_pages {
        println!(
            "{} The server has more results than were returned; only the first page was exported",
            "⚠".yellow()
        );
    }

    if !summary.skipped.is_empty() {
        println!();
        println!("{} {} record(s) skipped:", "⚠".yellow(), summary.skipped.len());
        for record in &summary.skipped {
            println!(
                "  #{} {} ({}): {}",
                record.index,
                record.file_name.as_deref().unwrap_or("<no filename>"),
                record.annotation_id.as_deref().unwrap_or("<no id>"),
                record.reason.red()
            );
        }
    }
}
