//! Tracing setup for the command-line tool
//!
//! # Usage
//!
//! Configure via RUST_LOG environment variable:
//! - `RUST_LOG=debug` - all debug logs
//! - `RUST_LOG=mathveil::router=debug` - which route each transaction took
//! - `RUST_LOG=mathveil::session=trace` - selection diffs per transaction
//!
//! # Log Files
//!
//! Logs are written to `~/.config/mathveil/logs/mathveil.log` with daily rotation.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config_paths::{ConfigPaths, LOG_FILE_PREFIX};
use crate::text::EditorSelection;

/// Initialize tracing subscriber with console and file logging
///
/// Console output goes to stderr so `clean --stdout` output stays clean.
/// File logging always records debug level, under `paths` when given.
pub fn init(paths: Option<&ConfigPaths>) {
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .with_filter(console_filter);

    let logs = paths.map(ConfigPaths::ensure_logs_dir).transpose();
    let file_layer = match logs {
        Ok(None) => None,
        Ok(Some(logs_dir)) => {
            let file_appender = tracing_appender::rolling::daily(logs_dir, LOG_FILE_PREFIX);
            Some(
                fmt::layer()
                    .with_writer(file_appender)
                    .with_ansi(false)
                    .with_target(true)
                    .with_line_number(true)
                    .with_filter(EnvFilter::new("debug")),
            )
        }
        Err(e) => {
            eprintln!("Warning: Could not initialize file logging: {:#}", e);
            None
        }
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();
}

/// Lightweight snapshot of a selection for diffing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionSnapshot {
    pub main: usize,
    /// `(anchor, head)` per range
    pub ranges: Vec<(usize, usize)>,
}

impl SelectionSnapshot {
    pub fn of(selection: &EditorSelection) -> Self {
        Self {
            main: selection.main_index(),
            ranges: selection
                .ranges()
                .iter()
                .map(|range| (range.anchor, range.head))
                .collect(),
        }
    }

    /// Describe what moved between two snapshots
    pub fn diff(&self, other: &SelectionSnapshot) -> Option<String> {
        if self.ranges.len() != other.ranges.len() {
            return Some(format!(
                "range count: {} → {}",
                self.ranges.len(),
                other.ranges.len()
            ));
        }

        let changes: Vec<String> = self
            .ranges
            .iter()
            .zip(&other.ranges)
            .enumerate()
            .filter(|(_, (before, after))| before != after)
            .map(|(i, (before, after))| {
                format!(
                    "#{}: {}..{} → {}..{}",
                    i, before.0, before.1, after.0, after.1
                )
            })
            .collect();

        if changes.is_empty() {
            None
        } else {
            Some(changes.join("; "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::SelectionRange;

    #[test]
    fn test_snapshot_diff() {
        let a = SelectionSnapshot::of(&EditorSelection::cursor(3));
        let b = SelectionSnapshot::of(&EditorSelection::cursor(7));
        assert_eq!(a.diff(&a), None);
        assert_eq!(a.diff(&b).as_deref(), Some("#0: 3..3 → 7..7"));

        let two = SelectionSnapshot::of(&EditorSelection::create(
            vec![SelectionRange::cursor(1), SelectionRange::cursor(5)],
            0,
        ));
        assert_eq!(a.diff(&two).as_deref(), Some("range count: 1 → 2"));
    }
}
