use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

pub mod review;
pub mod serve;

use crate::core::AppConfig;

#[derive(Subcommand)]
enum Command {
    /// Run the web server
    Serve {
        /// Set the server host address
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Set the server port
        #[arg(long, default_value = "2222")]
        port: String,
    },
    /// Review a source file and print the review and bug report
    Review {
        /// File to review. Reads from stdin when omitted
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

pub async fn run() -> Result<()> {
    let args = Cli::parse();

    crate::core::logging::init();

    // Nothing else starts without a valid config
    let config = AppConfig::load().inspect_err(|e| {
        tracing::error!("Failed to load config: {}", e);
    })?;

    // Handle each sub command
    match args.command {
        Some(Command::Serve { host, port }) => {
            serve::run(host, port, config).await?;
        }
        Some(Command::Review { file }) => {
            review::run(file, config).await?;
        }
        None => {}
    }

    Ok(())
}
