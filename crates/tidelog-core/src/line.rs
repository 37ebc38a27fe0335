//! Formatted log lines and log file names.

use std::fmt;

use chrono::{DateTime, Local};

/// Platform line separator appended to every line.
#[cfg(windows)]
pub const LINE_SEPARATOR: &str = "\r\n";
/// Platform line separator appended to every line.
#[cfg(not(windows))]
pub const LINE_SEPARATOR: &str = "\n";

/// Timestamp format inside a line: `2026-01-21 14:30:45.123`.
pub const LINE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Timestamp format of a log file name: `20260121_14_30_45`.
pub const FILE_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H_%M_%S";

/// A line ready to be written: `[<arrival>] <message><separator>`.
///
/// Built once when the message arrives and never changed afterwards, so the
/// timestamp reflects arrival rather than the (possibly much later) write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    text: String,
    arrived_at: DateTime<Local>,
}

impl LogLine {
    /// Format `message` as arriving at `arrived_at`.
    pub fn new(message: &str, arrived_at: DateTime<Local>) -> Self {
        let text = format!(
            "[{}] {}{}",
            arrived_at.format(LINE_TIMESTAMP_FORMAT),
            message,
            LINE_SEPARATOR
        );
        Self { text, arrived_at }
    }

    /// Format `message` as arriving now.
    pub fn now(message: &str) -> Self {
        Self::new(message, Local::now())
    }

    /// The full line including the trailing separator.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// When the message arrived.
    pub fn arrived_at(&self) -> DateTime<Local> {
        self.arrived_at
    }
}

impl fmt::Display for LogLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// File name of a session opened at `opened_at`.
pub fn session_file_name(opened_at: DateTime<Local>) -> String {
    format!("{}.log", opened_at.format(FILE_TIMESTAMP_FORMAT))
}
