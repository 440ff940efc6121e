//! geoquiz CLI: the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "geoquiz", version, about = "Geodynamics quiz backed by Contentful")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a starter geoquiz.toml
    Init,

    /// List quiz categories
    Categories {
        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Play a quiz in the terminal
    Play {
        /// Category id to start with (skips the category menu)
        #[arg(long)]
        category: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Export every question of a category with its answer and explanation
    Preview {
        /// Category id
        #[arg(long)]
        category: String,

        /// Output file (default: geoquiz-preview-<category>.<format>)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Output format: html, json
        #[arg(long, default_value = "html")]
        format: String,

        /// HTML page to write: review (answer key), quiz (first question), results (full score)
        #[arg(long, default_value = "review")]
        page: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = "geoquiz=info".parse() {
        filter = filter.add_directive(directive);
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init => commands::init::execute(),
        Commands::Categories { config } => commands::categories::execute(config).await,
        Commands::Play { category, config } => commands::play::execute(category, config).await,
        Commands::Preview {
            category,
            output,
            format,
            page,
            config,
        } => commands::preview::execute(category, output, format, page, config).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
