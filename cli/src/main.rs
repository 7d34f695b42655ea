//! sealsms CLI
//!
//! Seal notifications into SMS frames and open received frames.

mod config;


use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand};
use sealsms_protocol::{Protocol, parse};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{Level, debug, info};
use tracing_subscriber::FmtSubscriber;

use config::CliConfig;

#[derive(Parser, Debug)]
#[command(name = "sealsms")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "sealsms.toml")]
    config: PathBuf,

    /// Run in verbose mode
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Seal a plaintext into a frame of the current version
    Seal {
        /// Group number the key is derived from
        #[arg(long)]
        group: String,
        /// Meeting identifier carried in the clear
        #[arg(long)]
        meeting: String,
        /// Payload to encrypt
        plaintext: String,
    },
    /// Decode a received frame and print its plaintext
    Open {
        /// Raw SMS content
        frame: String,
    },
    /// Show a frame's fields without decrypting
    Inspect {
        /// Raw SMS content
        frame: String,
    },
}

fn protocol(config: &CliConfig) -> Result<Protocol> {
    let secret = Arc::new(config.secret.resolve()?);
    let protocol = Protocol::new(secret);
    Ok(if config.receiver.key_cache {
        protocol.with_key_cache()
    } else {
        protocol
    })
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging; stdout is reserved for command output
    let level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let config = CliConfig::load_or_default(&args.config)?;
    debug!("Loaded configuration from {}", args.config.display());

    match args.command {
        Commands::Seal {
            group,
            meeting,
            plaintext,
        } => {
            let frame = protocol(&config)?.send(&group, &meeting, &plaintext)?;
            info!(group = %group, len = frame.len(), "Frame sealed");
            println!("{}", frame);
        }
        Commands::Open { frame } => {
            let message = protocol(&config)?
                .receive(&frame)
                .map_err(|e| anyhow!("frame rejected: {}", e.reason()))?;
            println!("{}", message.plaintext);
        }
        Commands::Inspect { frame } => {
            let frame = parse(&frame)?;
            println!("version:  {}", frame.version());
            println!("context:  {}", frame.context_id().unwrap_or("-"));
            println!("metadata: {}", frame.metadata().join(", "));
            println!(
                "cipher:   {}",
                if frame.version().is_authenticated() {
                    "AES-256-GCM"
                } else {
                    "AES-256-ECB (unauthenticated)"
                }
            );
        }
    }

    Ok(())
}
