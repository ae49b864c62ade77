use annotation_export::ExportError;
use annotation_export::cli::{self, Cli};
use annotation_export::error::exit_codes;
use clap::Parser;
use colored::*;
use log::{error, info};
use std::path::Path;
use std::process::ExitCode;

fn init_logging(log_file: &Path) -> std::io::Result<()> {
    // Truncate on each run
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(log_file)?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(&cli.log_file) {
        eprintln!("{} Cannot open log file {}: {}", "✗".red(), cli.log_file.display(), e);
        return ExitCode::from(exit_codes::CONFIG);
    }

    info!("Starting annotation-export {}", env!("CARGO_PKG_VERSION"));

    match cli::run(cli).await {
        Ok(()) => {
            info!("Finished successfully");
            ExitCode::from(exit_codes::SUCCESS)
        }
        Err(err) => {
            error!("{:#}", err);
            eprintln!("{} {:#}", "✗".red(), err);
            let code = err
                .downcast_ref::<ExportError>()
                .map(ExportError::exit_code)
                .unwrap_or(exit_codes::CONFIG);
            ExitCode::from(code)
        }
    }
}
