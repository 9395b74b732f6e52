use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "tally", about = "Tally: in-memory transaction ledger service", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the HTTP server
    Serve(ServeArgs),
    /// Print the effective configuration as TOML
    Config(ConfigArgs),
}

#[derive(Args)]
pub struct ServeArgs {
    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Override the bind address
    #[arg(short, long)]
    pub bind: Option<SocketAddr>,
    /// Disable the read cache
    #[arg(long)]
    pub no_cache: bool,
}

#[derive(Args)]
pub struct ConfigArgs {
    /// TOML configuration file to merge over the defaults
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}
