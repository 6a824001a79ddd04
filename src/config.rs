use std::path::{Path, PathBuf};

/// Suffix a file must carry to count as a task fragment.
pub const FRAGMENT_SUFFIX: &str = "-tasks.json";

/// Format version written into the aggregate document.
pub const FORMAT_VERSION: &str = "2.0.0";

/// Quiet period the watcher waits for after the last qualifying change.
pub const DEBOUNCE_MS: u64 = 500;

/// Filesystem locations the combiner and watcher operate on.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the `*-tasks.json` fragments.
    pub config_dir: PathBuf,
    /// Merged output file, overwritten on every pass.
    pub output_path: PathBuf,
    /// Append-only run log.
    pub log_path: PathBuf,
}

impl Config {
    /// Resolve the standard file names under an arbitrary base directory.
    pub fn rooted(base: &Path) -> Self {
        Self {
            config_dir: base.join("task-configs"),
            output_path: base.join("tasks.json"),
            log_path: base.join("task-watcher.log"),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::rooted(Path::new("."))
    }
}
