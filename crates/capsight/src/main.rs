use anyhow::Result;
use clap::Parser;

use capsight::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    dispatch(cli.command).await
}

async fn dispatch(command: Commands) -> Result<()> {
    match command {
        Commands::Analyze(args) => capsight::cli::analyze::run(args).await,
        Commands::Normalize { variants } => capsight::cli::normalize::run(&variants),
        Commands::Lookup {
            variants,
            reference,
        } => capsight::cli::lookup::run(&variants, &reference),
        Commands::Scan { file } => capsight::cli::scan::run(&file).await,
        Commands::Assess(args) => capsight::cli::assess::run(&args),
    }
}
