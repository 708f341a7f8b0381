//! Navigator that saves the linked file to disk.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use futures_util::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;
use reqwest::header::CONTENT_DISPOSITION;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info, instrument};
use url::Url;

use super::filename::{filename_from_url, parse_content_disposition, resolve_unique_path, sanitize_filename};
use super::{NavigationError, Navigator};

/// A file written by [`FileFetcher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedFile {
    /// Where the file landed.
    pub path: PathBuf,
    /// Bytes written.
    pub bytes: u64,
}

/// Streams presigned downloads into an output directory.
///
/// The link is requested exactly as given. Existing files are never
/// overwritten; a numeric suffix is added instead.
#[derive(Debug, Clone)]
pub struct FileFetcher {
    client: Client,
    output_dir: PathBuf,
    show_progress: bool,
}

impl FileFetcher {
    /// Creates a fetcher writing into `output_dir`.
    pub fn new(client: Client, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            client,
            output_dir: output_dir.into(),
            show_progress: false,
        }
    }

    /// Shows a byte progress bar on stderr while streaming.
    #[must_use]
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Target directory.
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Downloads `url` into the output directory.
    ///
    /// The filename comes from `Content-Disposition`, else the URL path, else
    /// `download.bin`. A partial file is removed when streaming fails.
    ///
    /// # Errors
    ///
    /// Returns [`NavigationError`] for invalid URLs, transport failures,
    /// non-success statuses, and filesystem errors.
    #[instrument(skip(self), fields(dir = %self.output_dir.display()))]
    pub async fn fetch(&self, url: &str) -> Result<SavedFile, NavigationError> {
        let parsed = Url::parse(url).map_err(|_| NavigationError::invalid_url(url))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(NavigationError::invalid_url(url));
        }

        // Send the original string: re-serializing through `Url` could alter
        // the signed query.
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| NavigationError::network(url, e))?;
        let status = response.status();
        if !status.is_success() {
            return Err(NavigationError::http_status(url, status.as_u16()));
        }

        let filename = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .and_then(parse_content_disposition)
            .map(|name| sanitize_filename(&name))
            .or_else(|| filename_from_url(&parsed))
            .unwrap_or_else(|| "download.bin".to_string());

        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|e| NavigationError::io(self.output_dir.clone(), e))?;
        let path = resolve_unique_path(&self.output_dir, &filename);
        debug!(filename = %filename, path = %path.display(), "resolved output path");

        let progress = self.progress_bar(response.content_length());
        let mut file = File::create(&path)
            .await
            .map_err(|e| NavigationError::io(path.clone(), e))?;
        let streamed = stream_to_file(&mut file, response, url, &path, &progress).await;
        progress.finish_and_clear();

        match streamed {
            Ok(bytes) => {
                info!(path = %path.display(), bytes, "download saved");
                Ok(SavedFile { path, bytes })
            }
            Err(error) => {
                debug!(path = %path.display(), "removing partial file after error");
                let _ = tokio::fs::remove_file(&path).await;
                Err(error)
            }
        }
    }

    fn progress_bar(&self, total: Option<u64>) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        match total {
            Some(total) => {
                let bar = ProgressBar::new(total);
                bar.set_style(
                    ProgressStyle::with_template("{bar:30} {bytes}/{total_bytes} {msg}")
                        .unwrap_or_else(|_| ProgressStyle::default_bar()),
                );
                bar
            }
            None => {
                let spinner = ProgressBar::new_spinner();
                spinner.set_style(
                    ProgressStyle::with_template("{spinner} {bytes} {msg}")
                        .unwrap_or_else(|_| ProgressStyle::default_spinner()),
                );
                spinner
            }
        }
    }
}

#[async_trait]
impl Navigator for FileFetcher {
    async fn navigate(&self, url: &str) -> Result<(), NavigationError> {
        self.fetch(url).await.map(|_| ())
    }
}

async fn stream_to_file(
    file: &mut File,
    response: reqwest::Response,
    url: &str,
    path: &Path,
    progress: &ProgressBar,
) -> Result<u64, NavigationError> {
    let mut writer = BufWriter::new(file);
    let mut stream = response.bytes_stream();
    let mut written: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| NavigationError::network(url, e))?;
        writer
            .write_all(&chunk)
            .await
            .map_err(|e| NavigationError::io(path.to_path_buf(), e))?;
        written += chunk.len() as u64;
        progress.set_position(written);
    }

    writer
        .flush()
        .await
        .map_err(|e| NavigationError::io(path.to_path_buf(), e))?;
    Ok(written)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_fetch_rejects_relative_url() {
        let dir = TempDir::new().unwrap();
        let fetcher = FileFetcher::new(Client::new(), dir.path());
        let err = fetcher.fetch("/books/a.pdf").await.unwrap_err();
        assert!(matches!(err, NavigationError::InvalidUrl { .. }));
    }

    #[tokio::test]
    async fn test_fetch_rejects_non_http_scheme() {
        let dir = TempDir::new().unwrap();
        let fetcher = FileFetcher::new(Client::new(), dir.path());
        let err = fetcher.fetch("javascript:alert(1)").await.unwrap_err();
        assert!(matches!(err, NavigationError::InvalidUrl { .. }));
    }

    #[test]
    fn test_progress_hidden_by_default() {
        let fetcher = FileFetcher::new(Client::new(), "out");
        assert!(fetcher.progress_bar(Some(10)).is_hidden());
        assert_eq!(fetcher.output_dir(), Path::new("out"));
    }
}
