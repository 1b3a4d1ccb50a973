//! Per-run context handed to collaborators that need it.

use std::path::PathBuf;

use chrono::{DateTime, Local};

use crate::models::Config;

/// Facts about the current run.
#[derive(Debug, Clone)]
pub struct RunContext {
    /// When the run started; names the default result file
    pub started_at: DateTime<Local>,

    /// File mirroring every status line, if any
    pub mirror_file: Option<PathBuf>,

    /// Suppress informational console output
    pub quiet: bool,
}

impl RunContext {
    pub fn new() -> Self {
        Self {
            started_at: Local::now(),
            mirror_file: None,
            quiet: false,
        }
    }

    /// Context for a run driven by `config`.
    pub fn from_config(config: &Config) -> Self {
        Self {
            mirror_file: config.logging.mirror_file.as_ref().map(PathBuf::from),
            ..Self::new()
        }
    }

    /// Default result file for this run.
    pub fn result_path(&self, config: &Config) -> PathBuf {
        config.output.result_path(&self.started_at)
    }
}

impl Default for RunContext {
    fn default() -> Self {
        Self::new()
    }
}
