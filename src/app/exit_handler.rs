//! Exit code logic for the bookshelf process.
//!
//! Single responsibility: map controller outcomes to the process exit outcome.

use bookshelf_core::view::{DownloadOutcome, LoadOutcome};

use crate::ProcessExit;

/// Load outcomes: an empty catalog is still a success.
pub(crate) fn load_exit(outcome: &LoadOutcome) -> ProcessExit {
    match outcome {
        LoadOutcome::Loaded { .. } | LoadOutcome::Empty => ProcessExit::Success,
        LoadOutcome::Failed(_) => ProcessExit::Failure,
        LoadOutcome::Aborted => ProcessExit::Fatal,
    }
}

pub(crate) fn download_exit(outcome: &DownloadOutcome) -> ProcessExit {
    match outcome {
        DownloadOutcome::Navigated(_) => ProcessExit::Success,
        DownloadOutcome::Failed(_) => ProcessExit::Failure,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_success_for_loaded_and_empty() {
        let loaded = LoadOutcome::Loaded {
            listed: 2,
            rendered: 1,
        };
        assert_eq!(load_exit(&loaded), ProcessExit::Success);
        assert_eq!(load_exit(&LoadOutcome::Empty), ProcessExit::Success);
    }

    #[test]
    fn test_exit_failure_for_reported_error() {
        assert_eq!(
            load_exit(&LoadOutcome::Failed("Load failed: HTTP 500".into())),
            ProcessExit::Failure
        );
        assert_eq!(
            download_exit(&DownloadOutcome::Failed("x".into())),
            ProcessExit::Failure
        );
    }

    #[test]
    fn test_exit_fatal_for_abort() {
        assert_eq!(load_exit(&LoadOutcome::Aborted), ProcessExit::Fatal);
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(ProcessExit::Success.code(), 0);
        assert_eq!(ProcessExit::Failure.code(), 1);
        assert_eq!(ProcessExit::Fatal.code(), 2);
    }
}
