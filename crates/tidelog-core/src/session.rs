//! The currently open log file.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use chrono::Local;

use crate::error::{LogError, LogResult};
use crate::line::{session_file_name, LogLine};

/// An open log file plus the moment it was opened.
///
/// Owned by the writer thread alone; nothing else holds the handle.
pub struct FileSession {
    writer: BufWriter<File>,
    path: PathBuf,
    opened_at: Instant,
}

impl FileSession {
    /// Open `<dir>/<YYYYMMDD_HH_MM_SS>.log`, creating `dir` if needed.
    ///
    /// The file is opened for appending so a session reopened within the
    /// same second continues the existing file instead of truncating it.
    pub fn open(dir: &Path) -> LogResult<Self> {
        fs::create_dir_all(dir).map_err(|source| LogError::FileIo {
            path: dir.to_path_buf(),
            source,
        })?;

        let path = dir.join(session_file_name(Local::now()));
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| LogError::FileIo {
                path: path.clone(),
                source,
            })?;

        Ok(Self {
            writer: BufWriter::new(file),
            path,
            opened_at: Instant::now(),
        })
    }

    /// Write one line and flush it to the OS (no fsync).
    pub fn write_line(&mut self, line: &LogLine) -> LogResult<()> {
        self.writer
            .write_all(line.as_str().as_bytes())
            .and_then(|()| self.writer.flush())
            .map_err(|source| LogError::FileIo {
                path: self.path.clone(),
                source,
            })
    }

    /// Flush and close the file.
    pub fn close(mut self) -> LogResult<()> {
        self.writer.flush().map_err(|source| LogError::FileIo {
            path: self.path.clone(),
            source,
        })
    }

    /// Path of the file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Monotonic open time, used for rotation.
    pub fn opened_at(&self) -> Instant {
        self.opened_at
    }

    /// How long the file has been open at `now`.
    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.opened_at)
    }
}
