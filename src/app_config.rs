//! Application configuration loading for CLI defaults.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use bookshelf_core::config::{ApiBase, TransportPreference, validate_timeout};
use bookshelf_core::encoding::IdEncoder;
use bookshelf_core::view::Locale;

/// TOML-style file configuration for bookshelf defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileConfig {
    /// Catalog API base URL.
    pub api_base: Option<String>,
    /// Default locale.
    pub locale: Option<Locale>,
    /// Default id encoder.
    pub encoder: Option<IdEncoder>,
    /// Default transport preference.
    pub transport: Option<TransportPreference>,
    /// Client connect timeout in seconds.
    pub connect_timeout_secs: Option<u64>,
    /// Client read timeout in seconds.
    pub read_timeout_secs: Option<u64>,
}

impl FileConfig {
    /// Validates config values against runtime and CLI constraints.
    pub fn validate(&self) -> Result<()> {
        if let Some(api_base) = &self.api_base {
            ApiBase::parse(api_base).context("Invalid config value for `api_base`")?;
        }
        if let Some(value) = self.connect_timeout_secs {
            validate_timeout("connect_timeout_secs", value)
                .context("Invalid config value for `connect_timeout_secs`")?;
        }
        if let Some(value) = self.read_timeout_secs {
            validate_timeout("read_timeout_secs", value)
                .context("Invalid config value for `read_timeout_secs`")?;
        }
        Ok(())
    }
}

/// Loaded config metadata.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// Resolved config path if a base directory is known.
    pub path: Option<PathBuf>,
    /// Parsed file config when a config file exists and was valid.
    pub config: Option<FileConfig>,
}

/// Resolves default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/bookshelf/config.toml`
/// 2. `$HOME/.config/bookshelf/config.toml`
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    if let Some(xdg_config_home) = env_var_non_empty_os("XDG_CONFIG_HOME") {
        return Some(
            PathBuf::from(xdg_config_home)
                .join("bookshelf")
                .join("config.toml"),
        );
    }

    let home = env_var_non_empty_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("bookshelf")
            .join("config.toml"),
    )
}

fn env_var_non_empty_os(name: &str) -> Option<std::ffi::OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}

/// Loads config from default path if present.
pub fn load_default_file_config() -> Result<LoadedConfig> {
    let path = resolve_default_config_path();
    let config = match path.as_deref() {
        Some(path_ref) if path_ref.exists() => Some(load_file_config(path_ref)?),
        _ => None,
    };
    Ok(LoadedConfig { path, config })
}

fn load_file_config(path: &Path) -> Result<FileConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    parse_config_str(&raw)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))
}

fn parse_config_str(raw: &str) -> Result<FileConfig> {
    let mut cfg = FileConfig::default();
    for (line_index, raw_line) in raw.lines().enumerate() {
        let line_no = line_index + 1;
        let line = strip_inline_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }

        let Some((raw_key, raw_value)) = line.split_once('=') else {
            bail!("Invalid config syntax on line {line_no}: expected key = value");
        };

        let key = raw_key.trim();
        let value = raw_value.trim();

        match key {
            "api_base" => {
                let parsed = parse_string_literal(value)
                    .with_context(|| format!("Invalid `api_base` value on line {line_no}"))?;
                cfg.api_base = Some(parsed);
            }
            "locale" => {
                cfg.locale = Some(parse_keyword(key, value, line_no)?);
            }
            "encoder" => {
                cfg.encoder = Some(parse_keyword(key, value, line_no)?);
            }
            "transport" => {
                cfg.transport = Some(parse_keyword(key, value, line_no)?);
            }
            "connect_timeout_secs" => {
                let parsed = parse_integer_u64(value).with_context(|| {
                    format!("Invalid `connect_timeout_secs` value on line {line_no}")
                })?;
                cfg.connect_timeout_secs = Some(parsed);
            }
            "read_timeout_secs" => {
                let parsed = parse_integer_u64(value).with_context(|| {
                    format!("Invalid `read_timeout_secs` value on line {line_no}")
                })?;
                cfg.read_timeout_secs = Some(parsed);
            }
            unknown => {
                bail!("Unknown configuration key: '{unknown}' on line {line_no}");
            }
        }
    }
    cfg.validate()?;
    Ok(cfg)
}

/// Parses a quoted keyword through the type's `FromStr`.
fn parse_keyword<T>(key: &str, raw_value: &str, line_no: usize) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let parsed = parse_string_literal(raw_value)
        .with_context(|| format!("Invalid `{key}` value on line {line_no}"))?;
    parsed
        .parse::<T>()
        .with_context(|| format!("Invalid `{key}` value '{parsed}' on line {line_no}"))
}

fn strip_inline_comment(line: &str) -> &str {
    let mut in_string = false;
    for (index, ch) in line.char_indices() {
        match ch {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..index],
            _ => {}
        }
    }
    line
}

fn parse_string_literal(raw_value: &str) -> Result<String> {
    if raw_value.len() < 2 || !raw_value.starts_with('"') || !raw_value.ends_with('"') {
        bail!("Expected double-quoted string");
    }
    Ok(raw_value[1..raw_value.len() - 1].to_string())
}

fn parse_integer_u64(raw_value: &str) -> Result<u64> {
    let token = raw_value.trim();
    if token.is_empty() {
        bail!("Expected integer value");
    }
    let value = token.parse::<i128>()?;
    if value < 0 {
        bail!("Expected non-negative integer");
    }
    u64::try_from(value).map_err(|_| anyhow::anyhow!("Integer value out of range for u64"))
}
