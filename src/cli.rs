//! Command-line interface for noughts.

use clap::Parser;
use std::path::PathBuf;

/// Noughts - multi-session tic-tac-toe server
#[derive(Parser, Debug)]
#[command(name = "noughts")]
#[command(about = "Multi-session tic-tac-toe server with live board updates", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Host to bind to (overrides the config file)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides the config file and PORT)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Path of the session snapshot file (overrides the config file)
    #[arg(long)]
    pub data_file: Option<PathBuf>,
}
