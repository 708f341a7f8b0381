use std::fs;
use std::io::{self, IsTerminal};
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use bookshelf_core::config::ClientConfig;
use bookshelf_core::navigate::{FileFetcher, LinkPrinter, Navigator};
use bookshelf_core::transport::{HostCapabilities, Transport, build_download_client};
use bookshelf_core::view::{DownloadOutcome, LoadOutcome, MemoryPage, TerminalHost, ViewController};
use tracing::{debug, info};

use crate::ProcessExit;
use crate::app::{config_manager, exit_handler, terminal};
use crate::cli::{Cli, Command, DownloadArgs};

pub(crate) async fn run_bookshelf(cli: Cli) -> Result<ProcessExit> {
    let resolved = config_manager::resolve_config(&cli)?;
    let config = resolved.client;

    let capabilities = HostCapabilities::http(config.http)
        .context("Failed to build HTTP client")?
        .restrict(config.transport);
    let transport = Transport::select(&capabilities);
    info!(
        base = %config.api_base,
        transport = %transport.kind(),
        locale = %config.locale,
        config = ?resolved.config_path,
        "Bookshelf starting"
    );

    match &cli.command {
        Command::List(args) => match &args.html {
            Some(path) => list_to_html(config, transport, path, cli.quiet).await,
            None => Ok(list_to_terminal(config, transport, cli.quiet).await),
        },
        Command::Show(args) => Ok(show_book(config, transport, &args.id, cli.quiet).await),
        Command::Download(args) => download(config, transport, args, cli.quiet).await,
    }
}

async fn list_to_terminal(config: ClientConfig, transport: Transport, quiet: bool) -> ProcessExit {
    let host = Arc::new(TerminalHost::stdout(Arc::new(LinkPrinter::stdout())));
    let controller = ViewController::new(config, transport, host.clone());
    let outcome = controller.load_books().await;
    let (status, is_error) = host.last_status();
    report(&controller, &outcome, &status, is_error, quiet);
    exit_handler::load_exit(&outcome)
}

async fn list_to_html(
    config: ClientConfig,
    transport: Transport,
    path: &Path,
    quiet: bool,
) -> Result<ProcessExit> {
    let page = Arc::new(MemoryPage::new(config.locale));
    let controller = ViewController::new(config, transport, page.clone());
    let outcome = controller.load_books().await;

    fs::write(path, page.to_html())
        .with_context(|| format!("Failed to write page to '{}'", path.display()))?;
    info!(path = %path.display(), cards = page.cards().len(), "Page written");

    report(&controller, &outcome, &page.status_line(), page.status_is_error(), quiet);
    Ok(exit_handler::load_exit(&outcome))
}

async fn show_book(config: ClientConfig, transport: Transport, id: &str, quiet: bool) -> ProcessExit {
    let host = Arc::new(TerminalHost::stdout(Arc::new(LinkPrinter::stdout())));
    let controller = ViewController::new(config, transport, host.clone());
    let outcome = controller.show_book(id).await;
    let (status, is_error) = host.last_status();
    report(&controller, &outcome, &status, is_error, quiet);
    exit_handler::load_exit(&outcome)
}

async fn download(
    config: ClientConfig,
    transport: Transport,
    args: &DownloadArgs,
    quiet: bool,
) -> Result<ProcessExit> {
    let navigator: Arc<dyn Navigator> = match &args.output_dir {
        Some(dir) => {
            let client = build_download_client(config.http).context("Failed to build HTTP client")?;
            let show_progress = terminal::should_show_progress(
                io::stderr().is_terminal(),
                quiet,
                terminal::is_dumb_terminal(),
            );
            debug!(dir = %dir.display(), show_progress, "saving download to directory");
            Arc::new(FileFetcher::new(client, dir).with_progress(show_progress))
        }
        None => Arc::new(LinkPrinter::stdout()),
    };

    let host = Arc::new(TerminalHost::stdout(navigator));
    let controller = ViewController::new(config, transport, host);
    let outcome = controller.download_book(&args.id).await;
    if let DownloadOutcome::Failed(text) = &outcome {
        eprintln!("{text}");
    }
    Ok(exit_handler::download_exit(&outcome))
}

/// Prints the final status line to stderr; errors are shown even when quiet.
fn report(controller: &ViewController, outcome: &LoadOutcome, status: &str, is_error: bool, quiet: bool) {
    if matches!(outcome, LoadOutcome::Aborted) {
        eprintln!("{}", controller.messages().missing_elements());
    } else if is_error || !quiet {
        eprintln!("{status}");
    }
}
