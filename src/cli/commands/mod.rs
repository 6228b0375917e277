//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod config_cmd;
mod scan;
mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{load_settings, LoadOptions};

#[derive(Parser)]
#[command(name = "cinscan")]
#[command(about = "Extract national ID numbers from ID card images")]
#[command(version)]
pub struct Cli {
    /// Config file path (defaults to ./cinscan.toml when present)
    #[arg(short, long, global = true, env = "CINSCAN_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Bind address: port, host, or host:port
        #[arg(short, long)]
        bind: Option<String>,
        /// Directory for temporary uploads
        #[arg(long)]
        upload_dir: Option<PathBuf>,
    },

    /// Run OCR and CIN extraction on a local image (the file is kept)
    Scan {
        /// Image to analyse (.jpg, .jpeg or .png)
        image: PathBuf,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show the effective configuration (secrets redacted)
    Show,
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let options = LoadOptions {
        config_path: cli.config,
    };
    let mut settings = load_settings(&options)?;

    match cli.command {
        Commands::Serve { bind, upload_dir } => {
            if let Some(bind) = bind {
                settings.bind = bind;
            }
            if let Some(dir) = upload_dir {
                settings.upload_dir = dir;
            }
            serve::cmd_serve(&settings).await
        }
        Commands::Scan { image, json } => scan::cmd_scan(&settings, &image, json).await,
        Commands::Config { command } => match command {
            ConfigCommands::Show => config_cmd::cmd_config_show(&settings),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_serve_overrides() {
        let cli = Cli::try_parse_from([
            "cinscan",
            "-v",
            "serve",
            "--bind",
            "0.0.0.0:8080",
            "--upload-dir",
            "/tmp/up",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Serve { bind, upload_dir } => {
                assert_eq!(bind.as_deref(), Some("0.0.0.0:8080"));
                assert_eq!(upload_dir, Some(PathBuf::from("/tmp/up")));
            }
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn test_parse_scan() {
        let cli = Cli::try_parse_from(["cinscan", "scan", "card.png", "--json"]).unwrap();
        match cli.command {
            Commands::Scan { image, json } => {
                assert_eq!(image, PathBuf::from("card.png"));
                assert!(json);
            }
            _ => panic!("expected scan"),
        }
    }
}
