//! The download subcommand: wires terminal implementations to the core.

use std::path::PathBuf;

use clap::Args;
use tokio_util::sync::CancellationToken;

use sedump::progress::format_bytes;
use sedump::{
    command, ArchiveOrgCatalog, ArchiveResolver, Config, DownloadOrchestrator, DownloadRequest,
    HttpFetcher, OsFs,
};

use crate::picker::TermPicker;
use crate::progress::IndicatifSink;

/// Arguments for `sedump download`.
#[derive(Debug, Args)]
pub struct DownloadArgs {
    /// Archive to download, e.g. "aviation" (case-insensitive substring)
    pub archive: String,

    /// Output folder (defaults to the current directory)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Pick from a list of matching archives when the name is ambiguous
    #[arg(short, long)]
    pub pick: bool,
}

/// Run the download subcommand and return the process exit code.
pub async fn run(args: DownloadArgs, token: CancellationToken) -> i32 {
    let config = Config::default();

    let catalog = match ArchiveOrgCatalog::new(&config) {
        Ok(catalog) => catalog,
        Err(e) => {
            eprintln!("error: {}", e);
            return command::EXIT_FAILURE;
        }
    };
    let fetcher = match HttpFetcher::new(&config) {
        Ok(fetcher) => fetcher,
        Err(e) => {
            eprintln!("error: {}", e);
            return command::EXIT_FAILURE;
        }
    };

    let resolver = ArchiveResolver::new(catalog, TermPicker::new());
    let orchestrator = DownloadOrchestrator::new(fetcher);
    let mut sink = IndicatifSink::new();

    let request = DownloadRequest {
        archive: args.archive,
        output: args.output,
        pick: args.pick,
    };

    match command::run(&request, &resolver, &orchestrator, &OsFs, &mut sink, &token).await {
        Ok(summary) => {
            println!(
                "Downloaded {} file(s), {}.",
                summary.files,
                format_bytes(summary.bytes)
            );
            command::EXIT_SUCCESS
        }
        Err(e) if e.is_cancellation() => {
            eprintln!("Cancelled.");
            e.exit_code()
        }
        Err(e) => {
            eprintln!("error: {}", e);
            e.exit_code()
        }
    }
}
