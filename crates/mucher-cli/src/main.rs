//! mucher CLI: randomized multiple-choice exams and answer-sheet grading.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use mucher_core::config::load_config_from;

mod commands;

#[derive(Parser)]
#[command(
    name = "mucher",
    version,
    about = "Randomized multiple-choice exams with much and pdflatex, and their grading"
)]
struct Cli {
    /// Config file path (default: ./mucher.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output, including external tool output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate exam variants from a question bank
    Create(commands::create::CreateArgs),

    /// Grade a filled-in results spreadsheet
    Grade(commands::grade::GradeArgs),

    /// Check a question bank without running any external tool
    Validate {
        /// Question bank workbook
        #[arg(long)]
        question_file: Option<PathBuf>,
    },

    /// Write a starter mucher.toml
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "mucher=debug" } else { "mucher=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn dispatch(cli: Cli) -> anyhow::Result<()> {
    let config_path = cli.config;
    let load = || load_config_from(config_path.as_deref());

    match cli.command {
        Commands::Create(args) => {
            let mut config = load()?;
            args.apply(&mut config);
            commands::create::execute(&config).await
        }
        Commands::Grade(args) => {
            let mut config = load()?;
            args.apply(&mut config);
            commands::grade::execute(&config, &args.format)
        }
        Commands::Validate { question_file } => {
            let mut config = load()?;
            if let Some(path) = question_file {
                config.question_file = path;
            }
            commands::validate::execute(&config)
        }
        Commands::Init { force } => commands::init::execute(force),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = dispatch(cli).await {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
