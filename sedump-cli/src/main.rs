//! sedump CLI - download Stack Exchange data dumps from archive.org.
//!
//! This binary is a thin shell over the `sedump` library: it parses
//! arguments, installs the ctrl-c handler and supplies the terminal
//! implementations (indicatif progress rendering, dialoguer pick prompt).

mod commands;
mod picker;
mod progress;

use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use commands::download::DownloadArgs;

const AFTER_HELP: &str = "\
Examples:
  sedump download aviation              Download the aviation.stackexchange.com dump
  sedump download math -o /stack-data   Download to a particular folder
  sedump download stack --pick          Pick from the archives matching \"stack\"";

#[derive(Parser)]
#[command(
    name = "sedump",
    version,
    about = "Download Stack Exchange data dumps from archive.org",
    after_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download the most recent data dump for a Stack Exchange site
    Download(DownloadArgs),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    // One cancellation signal for the whole invocation; ctrl-c raises it and
    // the in-flight transfer stops at the next chunk boundary.
    let token = CancellationToken::new();
    let ctrlc_token = token.clone();
    if let Err(e) = ctrlc::set_handler(move || ctrlc_token.cancel()) {
        tracing::warn!(error = %e, "could not install ctrl-c handler");
    }

    let cli = Cli::parse();
    let code = match cli.command {
        Commands::Download(args) => commands::download::run(args, token).await,
    };
    std::process::exit(code);
}
