use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use fairmap::cli::{Cli, Commands};
use fairmap::commands::{serve, show};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match &cli.command {
        Commands::Show(args) => show::run(&cli, args),
        Commands::Serve(args) => serve::run(&cli, args),
    }
}
