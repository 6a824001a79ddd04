//! Fragment aggregation.
//!
//! Scans the configuration directory for `*-tasks.json` fragments, concatenates
//! their task lists, and overwrites the aggregate `tasks.json`. Fragments are
//! opaque: task records pass through unmodified.

use std::fs;

use serde::Serialize;
use serde_json::Value;

use crate::config::{Config, FORMAT_VERSION, FRAGMENT_SUFFIX};
use crate::log::Logger;
use crate::Result;

/// Shape of the merged output document.
#[derive(Debug, Serialize)]
struct Aggregate<'a> {
    version: &'a str,
    tasks: &'a [Value],
}

/// Merges fragment files into the aggregate document.
#[derive(Debug, Clone)]
pub struct Combiner {
    config: Config,
    logger: Logger,
}

impl Combiner {
    pub fn new(config: Config, logger: Logger) -> Self {
        Self { config, logger }
    }

    /// Run one aggregation pass.
    ///
    /// Per-fragment errors (unreadable file, malformed JSON) are logged and
    /// skipped. Only structural failures return `false`: the configuration
    /// directory cannot be created or listed, or the output cannot be written.
    pub fn combine(&self) -> bool {
        match self.run() {
            Ok(count) => {
                crate::tlog!(self.logger, "Tasks combined successfully ({} tasks)", count);
                true
            }
            Err(e) => {
                crate::tlog!(self.logger, "Error combining tasks: {}", e);
                false
            }
        }
    }

    fn run(&self) -> Result<usize> {
        fs::create_dir_all(&self.config.config_dir)?;

        // Sort by file name so the merge order is stable across platforms.
        let mut fragments: Vec<String> = fs::read_dir(&self.config.config_dir)?
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| name.ends_with(FRAGMENT_SUFFIX))
            .collect();
        fragments.sort();

        let mut tasks: Vec<Value> = Vec::new();
        for name in &fragments {
            let path = self.config.config_dir.join(name);
            let parsed: Result<Value> = fs::read_to_string(&path)
                .map_err(crate::Error::from)
                .and_then(|content| serde_json::from_str(&content).map_err(crate::Error::from));
            match parsed {
                Ok(fragment) => {
                    // A missing or non-array `tasks` field is skipped silently;
                    // only read/parse failures earn a log entry.
                    if let Some(list) = fragment.get("tasks").and_then(Value::as_array) {
                        tasks.extend(list.iter().cloned());
                    }
                }
                Err(e) => {
                    crate::tlog!(self.logger, "Error processing {}: {}", name, e);
                }
            }
        }

        let aggregate = Aggregate {
            version: FORMAT_VERSION,
            tasks: &tasks,
        };
        let mut body = serde_json::to_string_pretty(&aggregate)?;
        body.push('\n');
        fs::write(&self.config.output_path, body)?;

        Ok(tasks.len())
    }
}
