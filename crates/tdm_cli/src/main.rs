//! TDM CLI - Inspect test data documents and durable run files.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(name = "tdm")]
#[command(about = "Test data manager for scenario-based test suites", long_about = None)]
#[command(version)]
struct Cli {
    /// Project root containing tdm.toml and the features directory
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the resolved static data for a feature
    Resolve {
        /// Feature name (directory under the features dir)
        feature: String,
        /// Scenario data key (as in @data:<key>)
        #[arg(short, long)]
        scenario: Option<String>,
        /// Environment (defaults to TEST_ENV or the configured one)
        #[arg(long)]
        env: Option<String>,
        /// Also list the source documents consulted
        #[arg(long)]
        sources: bool,
    },
    /// Look a key up through the static and durable tiers
    Get {
        /// Key to look up
        key: String,
        /// Feature whose static data to consult
        #[arg(short, long)]
        feature: Option<String>,
        /// Scenario data key
        #[arg(short, long)]
        scenario: Option<String>,
        /// Run id (defaults to TDM_RUN_ID)
        #[arg(long)]
        run: Option<String>,
    },
    /// Inspect or clear a run's durable data file
    Durable {
        #[command(subcommand)]
        command: DurableCommands,
    },
    /// Print a new run id to export as TDM_RUN_ID
    RunId,
    /// Show or create the project configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum DurableCommands {
    /// Print the durable document
    Show {
        /// Run id (defaults to TDM_RUN_ID)
        #[arg(long)]
        run: Option<String>,
    },
    /// Print the durable file path
    Path {
        /// Run id (defaults to TDM_RUN_ID)
        #[arg(long)]
        run: Option<String>,
    },
    /// Delete the durable file
    Clear {
        /// Run id (defaults to TDM_RUN_ID)
        #[arg(long)]
        run: Option<String>,
    },
    /// List durable files in the results directory
    List,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the effective configuration
    Show,
    /// Write a default tdm.toml
    Init {
        /// Overwrite an existing tdm.toml
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    // Initialize tracing subscriber
    // Respects RUST_LOG environment variable (e.g., RUST_LOG=debug)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let root = cli.root.as_path();

    match cli.command {
        Commands::Resolve {
            feature,
            scenario,
            env,
            sources,
        } => commands::resolve::run(root, &feature, scenario.as_deref(), env.as_deref(), sources),
        Commands::Get {
            key,
            feature,
            scenario,
            run,
        } => commands::get::run(
            root,
            &key,
            feature.as_deref(),
            scenario.as_deref(),
            run.as_deref(),
        ),
        Commands::Durable { command } => match command {
            DurableCommands::Show { run } => commands::durable::show(root, run.as_deref()),
            DurableCommands::Path { run } => commands::durable::path(root, run.as_deref()),
            DurableCommands::Clear { run } => commands::durable::clear(root, run.as_deref()),
            DurableCommands::List => commands::durable::list(root),
        },
        Commands::RunId => commands::run_id::run(),
        Commands::Config { command } => match command {
            ConfigCommands::Show => commands::config::show(root),
            ConfigCommands::Init { force } => commands::config::init(root, force),
        },
    }
}
