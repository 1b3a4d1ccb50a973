// src/utils/log.rs

//! Status reporting with server-style formatting.
//!
//! [`Reporter`] is the fire-and-forget message sink the crawler reports
//! progress through. [`StatusLog`] timestamps each message, forwards it to
//! the `log` facade and optionally mirrors it to a status file.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

use chrono::Local;

use crate::models::RunContext;

/// Log level enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }

    pub fn from_name(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "debug" => LogLevel::Debug,
            "info" => LogLevel::Info,
            "warn" => LogLevel::Warn,
            "error" => LogLevel::Error,
            _ => LogLevel::Info,
        }
    }

    pub fn to_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Error => log::LevelFilter::Error,
        }
    }

    fn to_log(self) -> log::Level {
        match self {
            LogLevel::Debug => log::Level::Debug,
            LogLevel::Info => log::Level::Info,
            LogLevel::Warn => log::Level::Warn,
            LogLevel::Error => log::Level::Error,
        }
    }
}

/// Format a status line with timestamp and level.
pub fn format_line(level: LogLevel, message: &str) -> String {
    let timestamp = Local::now().format("%d/%m/%Y %H:%M:%S");
    format!("[{}] [{}] {}", timestamp, level.as_str(), message)
}

/// Sink for progress and status messages.
pub trait Reporter: Send + Sync {
    /// Emit one message. Never fails.
    fn emit(&self, level: LogLevel, message: &str);

    fn info(&self, message: &str) {
        self.emit(LogLevel::Info, message);
    }

    fn warn(&self, message: &str) {
        self.emit(LogLevel::Warn, message);
    }

    fn error(&self, message: &str) {
        self.emit(LogLevel::Error, message);
    }
}

/// Default reporter: `log` facade plus an optional mirror file.
pub struct StatusLog {
    mirror: Option<PathBuf>,
    quiet: bool,
    mirror_lock: Mutex<()>,
}

impl StatusLog {
    pub fn new(context: &RunContext) -> Self {
        Self {
            mirror: context.mirror_file.clone(),
            quiet: context.quiet,
            mirror_lock: Mutex::new(()),
        }
    }

    fn mirror_line(&self, line: &str) {
        let Some(path) = &self.mirror else {
            return;
        };
        let _guard = self.mirror_lock.lock().unwrap_or_else(|e| e.into_inner());
        let written = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .and_then(|mut file| writeln!(file, "{line}"));
        if let Err(e) = written {
            log::debug!("Status mirror {} not written: {}", path.display(), e);
        }
    }
}

impl Reporter for StatusLog {
    fn emit(&self, level: LogLevel, message: &str) {
        if !(self.quiet && level <= LogLevel::Info) {
            log::log!(level.to_log(), "{}", message);
        }
        self.mirror_line(&format_line(level, message));
    }
}

/// Reporter keeping messages in memory.
#[cfg(test)]
#[derive(Default)]
pub(crate) struct MemoryReporter {
    pub(crate) messages: Mutex<Vec<(LogLevel, String)>>,
}

#[cfg(test)]
impl MemoryReporter {
    pub(crate) fn take(&self) -> Vec<(LogLevel, String)> {
        std::mem::take(&mut *self.messages.lock().unwrap())
    }
}

#[cfg(test)]
impl Reporter for MemoryReporter {
    fn emit(&self, level: LogLevel, message: &str) {
        self.messages
            .lock()
            .unwrap()
            .push((level, message.to_string()));
    }
}

/// Log a header
pub fn header(title: &str) {
    let border = "═".repeat(60);
    log::info!("{}", border);
    log::info!("  {}", title);
    log::info!("{}", border);
}

/// Log a summary section
pub fn summary(title: &str, items: &[(&str, String)]) {
    log::info!("[SUMMARY] {}", title);
    for (key, value) in items {
        log::info!("    {}: {}", key, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warn);
        assert!(LogLevel::Warn < LogLevel::Error);
    }

    #[test]
    fn test_log_level_from_name() {
        assert_eq!(LogLevel::from_name("debug"), LogLevel::Debug);
        assert_eq!(LogLevel::from_name("INFO"), LogLevel::Info);
        assert_eq!(LogLevel::from_name("unknown"), LogLevel::Info);
    }

    #[test]
    fn test_format_line() {
        let line = format_line(LogLevel::Warn, "RIP 000 - not found");
        assert!(line.ends_with("[WARN] RIP 000 - not found"));
        assert!(line.starts_with('['));
    }

    #[test]
    fn test_mirror_file_receives_lines() {
        let dir = tempfile::tempdir().unwrap();
        let mirror = dir.path().join("status.log");
        let context = RunContext {
            mirror_file: Some(mirror.clone()),
            quiet: true,
            ..RunContext::new()
        };

        let status = StatusLog::new(&context);
        status.info("first");
        status.warn("second");

        let content = std::fs::read_to_string(&mirror).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("[INFO] first"));
        assert!(lines[1].ends_with("[WARN] second"));
    }
}
