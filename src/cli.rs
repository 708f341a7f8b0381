//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use bookshelf_core::config::TransportPreference;
use bookshelf_core::encoding::IdEncoder;
use bookshelf_core::view::Locale;
use clap::{Args, Parser, Subcommand};

/// Browse a book catalog API and fetch presigned downloads.
///
/// Settings are layered: config file, then `BOOKSHELF_API_BASE`, then flags.
#[derive(Parser, Debug)]
#[command(name = "bookshelf")]
#[command(author, version, about)]
pub struct Cli {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Catalog API base URL, e.g. https://abc.execute-api.us-east-1.amazonaws.com/prod
    #[arg(long, env = "BOOKSHELF_API_BASE", global = true)]
    pub api_base: Option<String>,

    /// Language for status lines and placeholders (en, zh)
    #[arg(long, global = true)]
    pub locale: Option<Locale>,

    /// Request mechanism to use (auto, exchange, fetch)
    #[arg(long, global = true)]
    pub transport: Option<TransportPreference>,

    /// Book id encoder (standard, manual)
    #[arg(long, global = true)]
    pub encoder: Option<IdEncoder>,

    /// Connect timeout in seconds (1-3600)
    #[arg(long, global = true, value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub connect_timeout: Option<u64>,

    /// Read timeout in seconds (1-3600)
    #[arg(long, global = true, value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub read_timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List every book in the catalog
    List(ListArgs),
    /// Show one book by id
    Show(ShowArgs),
    /// Resolve a book's download link and follow it
    Download(DownloadArgs),
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Write the rendered page to FILE instead of printing books
    #[arg(long, value_name = "FILE")]
    pub html: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Book id as listed by the catalog
    pub id: String,
}

#[derive(Args, Debug)]
pub struct DownloadArgs {
    /// Book id as listed by the catalog
    pub id: String,

    /// Save the file into DIR instead of printing the link
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,
}
