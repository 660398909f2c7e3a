//! wordcraft CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};

use wordcraft_core::day::DayKey;

mod commands;
mod session;

#[derive(Parser)]
#[command(name = "wordcraft", version, about = "Daily vocabulary trainer")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every command.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Config file path
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding progress.json and preferences.json
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Word bank JSON file (defaults to the built-in bank)
    #[arg(long, global = true)]
    pub bank: Option<PathBuf>,

    /// Judge name from the config (e.g. "remote", "anthropic", "mock")
    #[arg(long, global = true)]
    pub judge: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a starter wordcraft.toml
    Init,

    /// Show today's words and their progress
    Today {
        /// Number of words to show (3-5); defaults to the saved preference
        #[arg(long)]
        count: Option<u8>,

        /// Day to show, as YYYY-MM-DD (defaults to today in US Eastern time)
        #[arg(long)]
        day: Option<DayKey>,
    },

    /// Submit your definition of a word
    Define {
        term: String,
        text: String,

        /// "I already know this": dismiss the word if the definition scores 4 or more
        #[arg(long)]
        known: bool,

        #[arg(long)]
        day: Option<DayKey>,
    },

    /// Move a revealed word on to sentence practice
    Advance {
        term: String,

        #[arg(long)]
        day: Option<DayKey>,
    },

    /// Submit an example sentence using a word
    Sentence {
        term: String,
        text: String,

        #[arg(long)]
        day: Option<DayKey>,
    },

    /// Mark a revealed word as known without writing a sentence
    Known {
        term: String,

        #[arg(long)]
        day: Option<DayKey>,
    },

    /// Show a word's reference entry and your recorded feedback
    Show {
        term: String,

        #[arg(long)]
        day: Option<DayKey>,
    },

    /// Show or set how many words are picked each day (3-5)
    Count { value: Option<u8> },

    /// Validate a word bank file
    ValidateBank,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("wordcraft=info".parse().unwrap()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let global = cli.global;

    let result = match cli.command {
        Commands::Init => commands::init::execute(),
        Commands::Today { count, day } => commands::today::execute(&global, count, day),
        Commands::Define {
            term,
            text,
            known,
            day,
        } => commands::define::execute(&global, &term, &text, known, day).await,
        Commands::Advance { term, day } => commands::advance::execute(&global, &term, day),
        Commands::Sentence { term, text, day } => {
            commands::sentence::execute(&global, &term, &text, day).await
        }
        Commands::Known { term, day } => commands::known::execute(&global, &term, day),
        Commands::Show { term, day } => commands::show::execute(&global, &term, day),
        Commands::Count { value } => commands::count::execute(&global, value),
        Commands::ValidateBank => commands::validate_bank::execute(&global),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
