//! API Blueprint CLI - Main entry point

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "blueprint")]
#[command(version)]
#[command(about = "API Blueprint language tooling", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the language server over stdio
    Lsp,

    /// Validate an API Blueprint file and report its diagnostics
    Check {
        /// File to validate
        file: PathBuf,

        /// Parser executable (defaults to drafter)
        #[arg(long)]
        parser: Option<String>,

        /// Print results as JSON
        #[arg(long)]
        json: bool,

        /// Also print the document outline
        #[arg(long)]
        outline: bool,
    },
}

fn main() -> Result<()> {
    // Initialize logging. stdout belongs to the LSP stream, so logs go to stderr.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "blueprint=info,blueprint_lsp=info,blueprint_lsp_core=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Lsp => commands::lsp::execute(),
        Commands::Check {
            file,
            parser,
            json,
            outline,
        } => commands::check::execute(commands::check::CheckArgs {
            file,
            parser,
            json,
            outline,
        }),
    }
}
