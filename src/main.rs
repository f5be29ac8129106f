use anyhow::Result;
use clap::{Parser, Subcommand};
use ferreprecio::cli;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "ferreprecio",
    about = "Ferreprecio — per-region minimum prices from the mercadopublico.cl hardware catalog",
    version,
    after_help = "Run 'ferreprecio <command> --help' for details on each command."
)]
struct Cli {
    /// Enable verbose/debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP boundary
    Serve {
        /// Listen port (defaults to $PORT, then 3000)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Run one price discovery and print the result
    Search {
        /// Catalog product id or free-text name
        query: String,
        /// Print the raw JSON body instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Process a newline-delimited query file into a CSV
    Batch {
        /// File with one query per line
        input: PathBuf,
        /// Output CSV path (defaults to prices_YYYY-MM-DD.csv)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Check that a Chromium binary can be located
    Doctor,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Serve { port } => cli::serve_cmd::run(port).await,
        Commands::Search { query, json } => cli::search_cmd::run(&query, json).await,
        Commands::Batch { input, output } => cli::batch_cmd::run(input, output).await,
        Commands::Doctor => cli::doctor::run().await,
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(format!("ferreprecio={level}").parse().unwrap()),
        )
        .init();
}
