//! Append-only run log mirrored to stdout.
//!
//! Every entry is one line of `[<timestamp>] <message>` in the log file and the
//! bare message on stdout. The file is created on first use and never truncated;
//! downstream tooling greps it across runs.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Handle to the run log. Cheap to clone; each call opens the file in append
/// mode so concurrent writers interleave at line granularity.
#[derive(Debug, Clone)]
pub struct Logger {
    path: PathBuf,
}

impl Logger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a timestamped line to the log file and echo the message to
    /// stdout. Logging failures are swallowed: a full disk or unwritable log
    /// must not abort an aggregation pass.
    pub fn log(&self, msg: &str) {
        if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(&self.path) {
            let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);
            let _ = writeln!(file, "[{}] {}", timestamp, msg);
        }
        println!("{}", msg);
    }
}

/// Convenience macro for formatted log entries.
#[macro_export]
macro_rules! tlog {
    ($logger:expr, $($arg:tt)*) => {
        $logger.log(&format!($($arg)*))
    };
}
