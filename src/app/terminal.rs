pub(crate) fn is_dumb_terminal() -> bool {
    std::env::var("TERM")
        .map(|value| value.eq_ignore_ascii_case("dumb"))
        .unwrap_or(false)
}

pub(crate) fn should_show_progress(stderr_is_terminal: bool, quiet: bool, dumb_terminal: bool) -> bool {
    stderr_is_terminal && !quiet && !dumb_terminal
}

/// Default log level from flags. `RUST_LOG` still wins at init time.
pub(crate) fn resolve_default_log_level(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        "error"
    } else {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

pub(crate) fn init_tracing(default_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_quiet_wins_over_verbose() {
        assert_eq!(resolve_default_log_level(2, true), "error");
    }

    #[test]
    fn test_log_level_from_verbose_count() {
        assert_eq!(resolve_default_log_level(0, false), "info");
        assert_eq!(resolve_default_log_level(1, false), "debug");
        assert_eq!(resolve_default_log_level(5, false), "trace");
    }

    #[test]
    fn test_progress_only_on_interactive_terminal() {
        assert!(should_show_progress(true, false, false));
        assert!(!should_show_progress(false, false, false));
        assert!(!should_show_progress(true, true, false));
        assert!(!should_show_progress(true, false, true));
    }
}
