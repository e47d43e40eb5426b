//! viva CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "viva", version, about = "Adaptive skills interview engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an interactive interview session
    Run {
        /// Candidate name for the transcript
        #[arg(long)]
        candidate: Option<String>,

        /// Directory of question TOML files (built-in bank when omitted)
        #[arg(long)]
        questions: Option<PathBuf>,

        /// Use the offline mock judge regardless of config
        #[arg(long)]
        mock: bool,

        /// Seed for question selection (reproducible runs)
        #[arg(long)]
        seed: Option<u64>,

        /// Write the session transcript JSON here on completion
        #[arg(long)]
        export: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show question bank statistics
    Questions {
        /// Directory of question TOML files (built-in bank when omitted)
        #[arg(long)]
        questions: Option<PathBuf>,
    },

    /// Validate question TOML files
    Validate {
        /// Path to a question file or directory
        #[arg(long)]
        questions: PathBuf,
    },

    /// Create starter config and example question file
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("viva=info".parse().expect("valid directive")),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            candidate,
            questions,
            mock,
            seed,
            export,
            config,
        } => commands::run::execute(candidate, questions, mock, seed, export, config).await,
        Commands::Questions { questions } => commands::questions::execute(questions),
        Commands::Validate { questions } => commands::validate::execute(questions),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
