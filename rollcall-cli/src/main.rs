//! Rollcall CLI - Platform-biometric attendance kiosk.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::{fmt, EnvFilter};
use url::Url;

mod commands;
mod exit_codes;
mod utils;

use exit_codes::ExitCode;
use utils::GlobalOptions;

const EXIT_CODES_HELP: &str = "\
Exit codes:
  0   Success
  1   General error
  64  Invalid input or configuration
  65  Identity not recognized, unknown or already registered
  69  Platform authenticator unavailable
  74  Record store I/O error
  75  Cancelled, timed out, or another scan in progress";

#[derive(Parser)]
#[command(name = "rollcall")]
#[command(author, version, about = "Biometric attendance with platform credentials", long_about = None)]
#[command(after_help = EXIT_CODES_HELP)]
struct Cli {
    /// Directory holding the record store (overrides ROLLCALL_STORE_DIR)
    #[arg(long, global = true, value_name = "DIR")]
    store: Option<PathBuf>,

    /// Spreadsheet webhook URL (overrides ROLLCALL_WEBHOOK_URL)
    #[arg(long, global = true, value_name = "URL")]
    webhook: Option<Url>,

    /// Only print what scripts need
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a new person on this device
    Enroll {
        /// Display name
        #[arg(value_name = "NAME")]
        name: String,
    },

    /// Identify whoever is at the sensor and mark their attendance
    Attend {
        /// Credential the mock authenticator presents (default: first enrolled)
        #[arg(long, value_name = "CREDENTIAL")]
        present: Option<String>,
    },

    /// List registered people
    List,

    /// Delete a registered person
    Remove {
        /// Credential reference (base64, as printed by `list`)
        #[arg(value_name = "CREDENTIAL")]
        credential: String,
    },

    /// Show a live clock
    Clock {
        /// Stop after this many ticks (default: run until Ctrl-C)
        #[arg(long, value_name = "N")]
        ticks: Option<u64>,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("rollcall_core=info,warn"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let options = GlobalOptions {
        store: cli.store,
        webhook: cli.webhook,
        quiet: cli.quiet,
    };

    match cli.command {
        Commands::Enroll { name } => commands::enroll::execute(&options, name).await,
        Commands::Attend { present } => commands::attend::execute(&options, present).await,
        Commands::List => commands::list::execute(&options),
        Commands::Remove { credential } => {
            commands::remove::execute(&options, credential).await
        }
        Commands::Clock { ticks } => commands::clock::execute(ticks).await,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing();

    let exit = match run(cli).await {
        Ok(()) => ExitCode::success(),
        Err(err) => ExitCode::from_anyhow(&err),
    };

    if let Some(message) = &exit.message {
        eprintln!("{} {}", "error:".red().bold(), message);
    }
    std::process::exit(exit.code);
}
