//! Operator tooling: generate long-term server key material and inspect it.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use opaque_gate::{config::Config, Engine};

#[derive(Debug, Parser)]
pub struct Cli {
    /// Path to an engine config file; built-in defaults are used when omitted
    #[clap(long)]
    pub config: Option<PathBuf>,
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate a fresh server setup and print it base64 encoded
    CreateSetup,
    /// Print the static public key of a base64 encoded server setup
    PublicKey { server_setup: String },
}

pub fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    let engine = Engine::new();
    engine.initialize(&config)?;

    match cli.command {
        Command::CreateSetup => println!("{}", engine.create_server_setup()?),
        Command::PublicKey { server_setup } => {
            println!("{}", engine.get_server_public_key(&server_setup)?)
        }
    }

    Ok(())
}
