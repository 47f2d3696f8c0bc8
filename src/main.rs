use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "seditor")]
#[command(about = "Staged AI edits for a single document: plan, analyze, generate, validate")]
#[command(version)]
struct Cli {
    /// Working directory (defaults to current directory)
    #[arg(short, long, global = true)]
    path: Option<PathBuf>,

    /// Path to the config file (defaults to .seditor/config.toml in the working directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the edit pipeline against a document
    Run {
        /// Document to edit
        file: PathBuf,

        /// Edit instruction
        #[arg(required = true, trailing_var_arg = true)]
        instruction: Vec<String>,

        /// Print the full result as JSON
        #[arg(long)]
        json: bool,

        /// Write the produced change to the document right away
        #[arg(long)]
        apply: bool,
    },

    /// Show how an instruction would be profiled, without calling the model
    Profile {
        file: PathBuf,

        #[arg(required = true, trailing_var_arg = true)]
        instruction: Vec<String>,
    },

    /// Apply the pending change stored for a document
    Apply { file: PathBuf },

    /// Show the stored conversation for a document
    History {
        file: PathBuf,

        /// Print every step body instead of titles only
        #[arg(long)]
        full: bool,
    },

    /// Initialize a new .seditor/config.toml configuration file
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    // Determine the working directory
    let work_dir = cli.path.unwrap_or_else(|| PathBuf::from("."));

    match cli.command {
        Commands::Run {
            file,
            instruction,
            json,
            apply,
        } => {
            let config = cli::load_config(&work_dir, cli.config.as_deref())?;
            let options = cli::run::RunOptions { json, apply };
            cli::run::run_command(&work_dir, &config, &file, &instruction.join(" "), options).await?;
        }
        Commands::Profile { file, instruction } => {
            cli::profile::profile_command(&work_dir, &file, &instruction.join(" "))?;
        }
        Commands::Apply { file } => {
            let config = cli::load_config(&work_dir, cli.config.as_deref())?;
            cli::apply::apply_command(&work_dir, &config, &file)?;
        }
        Commands::History { file, full } => {
            let config = cli::load_config(&work_dir, cli.config.as_deref())?;
            cli::history::history_command(&work_dir, &config, &file, full)?;
        }
        Commands::Init { force } => {
            cli::init::init_command(&work_dir, cli.config, force).await?;
        }
    }

    Ok(())
}
