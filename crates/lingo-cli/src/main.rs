use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(name = "lingo")]
#[command(about = "Lingo settings tool - inspect, validate and migrate settings files", long_about = None)]
struct Cli {
    /// Show debug logs (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Migrate a settings file to the latest version
    Migrate {
        /// Settings file (.json or .toml); defaults to the user settings file
        file: Option<PathBuf>,

        /// Print the migrated document without writing it
        #[arg(long)]
        dry_run: bool,
    },
    /// Check a settings file against a schema version
    Validate {
        /// Settings file (.json or .toml)
        file: PathBuf,

        /// Version to validate against; defaults to the file's own tag
        #[arg(long)]
        version: Option<u32>,
    },
    /// List the migration chain
    Versions,
    /// Print the default settings document
    Defaults {
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Toml,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Migrate { file, dry_run } => commands::migrate::run(file, dry_run).await?,
        Commands::Validate { file, version } => commands::validate::run(&file, version).await?,
        Commands::Versions => commands::versions::list()?,
        Commands::Defaults { format } => commands::defaults::print(format)?,
    }

    Ok(())
}
