//! Configuration lifecycle: load file config, then layer env and CLI values on top.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use bookshelf_core::config::{ApiBase, ClientConfig};
use bookshelf_core::transport::HttpSettings;
use tracing::debug;

use crate::app_config::{FileConfig, load_default_file_config};
use crate::cli::Cli;

/// Resolved configuration bundle for one run.
pub(crate) struct ResolvedConfig {
    pub(crate) client: ClientConfig,
    pub(crate) config_path: Option<PathBuf>,
}

/// Loads the default config file and merges CLI overrides onto it.
pub(crate) fn resolve_config(cli: &Cli) -> Result<ResolvedConfig> {
    let loaded = load_default_file_config()?;
    debug!(
        path = ?loaded.path,
        loaded = loaded.config.is_some(),
        "config file resolved"
    );
    let client = merge(cli, loaded.config.as_ref(), loaded.path.as_deref())?;
    Ok(ResolvedConfig {
        client,
        config_path: loaded.path,
    })
}

/// Applies `defaults < file < env/CLI` for every setting.
///
/// `BOOKSHELF_API_BASE` is read by clap into `cli.api_base`, so it already
/// outranks the file and is outranked by `--api-base`.
pub(crate) fn merge(
    cli: &Cli,
    file_config: Option<&FileConfig>,
    config_path: Option<&Path>,
) -> Result<ClientConfig> {
    let file = file_config.cloned().unwrap_or_default();

    let Some(raw_base) = cli.api_base.as_deref().or(file.api_base.as_deref()) else {
        let location = config_path.map_or_else(
            || "the config file".to_string(),
            |path| format!("'{}'", path.display()),
        );
        bail!(
            "No API base configured: pass --api-base, set BOOKSHELF_API_BASE, or add `api_base` to {location}"
        );
    };
    let api_base = ApiBase::parse(raw_base).context("Invalid API base")?;

    let mut http = HttpSettings::default();
    if let Some(secs) = cli.connect_timeout.or(file.connect_timeout_secs) {
        http.connect_timeout_secs = secs;
    }
    if let Some(secs) = cli.read_timeout.or(file.read_timeout_secs) {
        http.read_timeout_secs = secs;
    }

    let mut client = ClientConfig::new(api_base).with_http(http)?;
    if let Some(locale) = cli.locale.or(file.locale) {
        client = client.with_locale(locale);
    }
    if let Some(encoder) = cli.encoder.or(file.encoder) {
        client = client.with_encoder(encoder);
    }
    if let Some(transport) = cli.transport.or(file.transport) {
        client = client.with_transport(transport);
    }
    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookshelf_core::config::TransportPreference;
    use bookshelf_core::encoding::IdEncoder;
    use bookshelf_core::view::Locale;
    use clap::Parser;

    fn cli(args: &[&str]) -> Cli {
        let mut cli = Cli::try_parse_from(args).expect("args should parse");
        // Ignore an ambient BOOKSHELF_API_BASE unless the test passed the flag.
        if !args.contains(&"--api-base") {
            cli.api_base = None;
        }
        cli
    }

    #[test]
    fn test_merge_requires_api_base() {
        let err = merge(&cli(&["bookshelf", "list"]), None, None).expect_err("base is required");
        assert!(err.to_string().contains("No API base configured"));
    }

    #[test]
    fn test_merge_uses_file_values_when_cli_silent() {
        let file = FileConfig {
            api_base: Some("https://file.test/prod/".into()),
            locale: Some(Locale::Zh),
            encoder: Some(IdEncoder::Manual),
            transport: Some(TransportPreference::Exchange),
            connect_timeout_secs: Some(3),
            read_timeout_secs: Some(9),
        };
        let config = merge(&cli(&["bookshelf", "list"]), Some(&file), None).expect("merge");
        assert_eq!(config.api_base.as_str(), "https://file.test/prod");
        assert_eq!(config.locale, Locale::Zh);
        assert_eq!(config.encoder, IdEncoder::Manual);
        assert_eq!(config.transport, TransportPreference::Exchange);
        assert_eq!(config.http.connect_timeout_secs, 3);
        assert_eq!(config.http.read_timeout_secs, 9);
    }

    #[test]
    fn test_merge_cli_overrides_file() {
        let file = FileConfig {
            api_base: Some("https://file.test".into()),
            locale: Some(Locale::Zh),
            read_timeout_secs: Some(9),
            ..FileConfig::default()
        };
        let args = [
            "bookshelf",
            "--api-base",
            "https://cli.test/stage",
            "--locale",
            "en",
            "--read-timeout",
            "60",
            "list",
        ];
        let config = merge(&cli(&args), Some(&file), None).expect("merge");
        assert_eq!(config.api_base.as_str(), "https://cli.test/stage");
        assert_eq!(config.locale, Locale::En);
        assert_eq!(config.http.read_timeout_secs, 60);
    }

    #[test]
    fn test_merge_rejects_invalid_base() {
        let err = merge(
            &cli(&["bookshelf", "--api-base", "not a url", "list"]),
            None,
            None,
        )
        .expect_err("invalid base");
        assert!(err.to_string().contains("Invalid API base"));
    }

    #[test]
    fn test_merge_missing_base_names_config_path() {
        let err = merge(
            &cli(&["bookshelf", "list"]),
            None,
            Some(Path::new("/home/u/.config/bookshelf/config.toml")),
        )
        .expect_err("base is required");
        assert!(err.to_string().contains("/home/u/.config/bookshelf/config.toml"));
    }
}
