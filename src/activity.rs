//! Timestamped activity log.
//!
//! Entries are kept for display (e.g. the sync summary) and mirrored to `tracing`
//! at the matching level as they are recorded.

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Subsystem an entry originates from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogModule {
    Core,
    Net,
    Fs,
    Lock,
}

impl LogModule {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Core => "core",
            Self::Net => "net",
            Self::Fs => "fs",
            Self::Lock => "lock",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub module: LogModule,
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct ActivityLog {
    entries: Vec<LogEntry>,
}

impl ActivityLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, level: LogLevel, module: LogModule, message: impl Into<String>) {
        let message = message.into();
        let module_name = module.as_str();
        match level {
            LogLevel::Debug => tracing::debug!(module = module_name, "{message}"),
            LogLevel::Info => tracing::info!(module = module_name, "{message}"),
            LogLevel::Warn => tracing::warn!(module = module_name, "{message}"),
            LogLevel::Error => tracing::error!(module = module_name, "{message}"),
        }
        self.entries.push(LogEntry {
            id: uuid::Uuid::now_v7().to_string(),
            timestamp: Utc::now(),
            level,
            module,
            message,
        });
    }

    pub fn info(&mut self, module: LogModule, message: impl Into<String>) {
        self.record(LogLevel::Info, module, message);
    }

    pub fn warn(&mut self, module: LogModule, message: impl Into<String>) {
        self.record(LogLevel::Warn, module, message);
    }

    pub fn error(&mut self, module: LogModule, message: impl Into<String>) {
        self.record(LogLevel::Error, module, message);
    }

    /// Append all entries of `other`, preserving their order.
    pub fn extend(&mut self, other: ActivityLog) {
        self.entries.extend(other.entries);
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// Entries at `level`.
    pub fn at_level(&self, level: LogLevel) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter().filter(move |e| e.level == level)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
