mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use verity_common::language::Language;

#[derive(Parser)]
#[command(name = "verity-cli")]
#[command(about = "Verity CLI - Browse, grade and validate coding challenges", long_about = None)]
struct Cli {
    /// Challenge catalog (defaults to CATALOG_PATH or config/challenges.json)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every challenge in the catalog
    List {
        /// Only show challenges in this language (e.g., js, python, c++)
        #[arg(short, long)]
        language: Option<Language>,
    },

    /// Grade a source file against a challenge
    Grade {
        /// Challenge slug (e.g., hello-world, fizz-buzz)
        #[arg(short, long)]
        slug: String,

        /// Path to the solution source file
        #[arg(short, long)]
        file: PathBuf,

        /// Record the submission when every test passes
        #[arg(long, default_value = "false")]
        submit: bool,

        /// Session token forwarded to the recorder (falls back to RECORDER_TOKEN)
        #[arg(long)]
        token: Option<String>,

        /// Print the report as JSON
        #[arg(long, default_value = "false")]
        json: bool,
    },

    /// Check the catalog for malformed test-case inputs
    Validate,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let mut config = verity_common::config::EngineConfig::from_env()?;
    if let Some(path) = cli.catalog {
        config.catalog_path = path;
    }

    match cli.command {
        Commands::List { language } => {
            commands::list_challenges(&config, language)?;
        }
        Commands::Grade {
            slug,
            file,
            submit,
            token,
            json,
        } => {
            commands::grade_file(&config, &slug, &file, submit, token.as_deref(), json).await?;
        }
        Commands::Validate => {
            commands::validate_catalog(&config)?;
        }
    }

    Ok(())
}
