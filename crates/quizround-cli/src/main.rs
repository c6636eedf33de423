//! quizround CLI: the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "quizround", version, about = "Matching and recall quiz rounds")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play one round of a content list in the terminal
    Play {
        /// Path to a .toml content list
        #[arg(long)]
        content: PathBuf,

        /// Play the list as a different game (e.g. a word list as spelling-bee)
        #[arg(long)]
        game: Option<String>,

        /// Fixed shuffle seed
        #[arg(long)]
        seed: Option<u64>,

        /// Output format for the score screen: text, json
        #[arg(long, default_value = "text")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// List content lists for a year and term
    Lists {
        /// Directory of content lists
        #[arg(long)]
        content: Option<PathBuf>,

        /// Academic year (e.g. "Year 5")
        #[arg(long)]
        year: Option<String>,

        /// Academic term (e.g. "Autumn")
        #[arg(long)]
        term: Option<String>,

        /// Only lists playable as this game
        #[arg(long)]
        game: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate content list TOML files
    Validate {
        /// Path to content file or directory
        #[arg(long)]
        content: PathBuf,
    },

    /// Create starter config and example content list
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("quizround=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Play {
            content,
            game,
            seed,
            format,
            config,
        } => commands::play::execute(content, game, seed, format, config).await,
        Commands::Lists {
            content,
            year,
            term,
            game,
            config,
        } => commands::lists::execute(content, year, term, game, config),
        Commands::Validate { content } => commands::validate::execute(content),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
