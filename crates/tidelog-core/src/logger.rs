//! Public logger facade.

use std::path::Path;
use std::sync::atomic::Ordering;
use std::sync::mpsc::{self, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::LoggerConfig;
use crate::error::{LogError, LogResult};
use crate::line::LogLine;
use crate::writer::{Control, ControlRequest, Shared, WriterLoop};

/// Snapshot of the logger's counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoggerStats {
    /// Lines written to a file.
    pub lines_written: u64,
    /// Lines lost to write failures, a missing file, or shutdown while stopped.
    pub lines_dropped: u64,
    /// Files opened by rotation (not counting `start()`).
    pub rotations: u64,
    /// Lines currently waiting in the queue.
    pub queued: usize,
}

/// Buffered, rotating file logger.
///
/// Construction spawns the writer thread; [`start`](Self::start) opens the
/// first file. Share it between threads with an `Arc`.
///
/// ```ignore
/// use std::sync::Arc;
/// use tidelog_core::{Logger, LoggerConfig};
///
/// let config = LoggerConfig::new(1000, 60, "logs/", false)?;
/// let logger = Arc::new(Logger::new(config)?);
/// logger.start()?;
/// logger.log("service ready");
/// logger.shutdown();
/// ```
pub struct Logger {
    config: LoggerConfig,
    shared: Arc<Shared>,
    control: Mutex<Option<Sender<ControlRequest>>>,
    writer: Mutex<Option<JoinHandle<()>>>,
    /// Serializes stamp-and-enqueue so arrival order matches queue order.
    front_door: Mutex<()>,
}

impl Logger {
    /// Spawn the writer thread for `config`.
    pub fn new(config: LoggerConfig) -> LogResult<Self> {
        let shared = Arc::new(Shared::new(config.queue_capacity()));
        let (control_tx, control_rx) = mpsc::channel();

        let writer = WriterLoop::new(Arc::clone(&shared), control_rx, config.clone());
        let handle = thread::Builder::new()
            .name("tidelog-writer".to_string())
            .spawn(move || writer.run())?;

        debug!(
            capacity = config.queue_capacity(),
            interval_ms = config.rotation_interval().as_millis() as u64,
            "logger created"
        );

        Ok(Self {
            config,
            shared,
            control: Mutex::new(Some(control_tx)),
            writer: Mutex::new(Some(handle)),
            front_door: Mutex::new(()),
        })
    }

    /// Load a properties file and build a logger from it.
    pub fn from_properties_file(path: impl AsRef<Path>) -> LogResult<Self> {
        let (config, _props) = LoggerConfig::load(path)?;
        Self::new(config)
    }

    /// Queue `message` for writing.
    ///
    /// Never touches the disk; blocks only while the queue is full. After
    /// [`shutdown`](Self::shutdown) the message is discarded.
    pub fn log(&self, message: impl AsRef<str>) {
        if self.shared.shutdown.load(Ordering::SeqCst) {
            warn!("log() called after shutdown, message discarded");
            return;
        }

        let pushed = {
            let _guard = self.front_door.lock();
            let line = LogLine::now(message.as_ref());
            self.shared.queue.push(line)
        };

        match pushed {
            Ok(()) => self.shared.doorbell.ring(),
            Err(_) => warn!("logger shut down while waiting for queue space, message discarded"),
        }
    }

    /// Open a new log file. Fails if a file is already open.
    pub fn start(&self) -> LogResult<()> {
        self.request(Control::Start)
    }

    /// Close the current log file. Fails if already stopped.
    ///
    /// Messages logged while stopped stay queued until the next `start()`.
    pub fn stop(&self) -> LogResult<()> {
        self.request(Control::Stop)
    }

    /// The resolved configuration.
    pub fn config(&self) -> &LoggerConfig {
        &self.config
    }

    /// Current counters.
    pub fn stats(&self) -> LoggerStats {
        let stats = &self.shared.stats;
        LoggerStats {
            lines_written: stats.lines_written.load(Ordering::Relaxed),
            lines_dropped: stats.lines_dropped.load(Ordering::Relaxed),
            rotations: stats.rotations.load(Ordering::Relaxed),
            queued: self.shared.queue.len(),
        }
    }

    /// Stop the writer thread after it has written everything queued.
    ///
    /// Lines still queued while the logger is stopped cannot be written and
    /// are counted as dropped. Calling this more than once is harmless.
    pub fn shutdown(&self) {
        self.shared.shutdown.store(true, Ordering::SeqCst);
        self.shared.queue.close();
        self.shared.doorbell.ring();

        if let Some(handle) = self.writer.lock().take() {
            if handle.join().is_err() {
                warn!("writer thread panicked");
            }
            debug!("logger shut down");
        }
        self.control.lock().take();
    }

    fn request(&self, control: Control) -> LogResult<()> {
        let (reply_tx, reply_rx) = mpsc::channel();
        {
            let sender = self.control.lock();
            let sender = sender.as_ref().ok_or(LogError::ShutDown)?;
            sender
                .send(ControlRequest {
                    control,
                    reply: reply_tx,
                })
                .map_err(|_| LogError::ShutDown)?;
        }
        self.shared.doorbell.ring();
        reply_rx.recv().map_err(|_| LogError::ShutDown)?
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        self.shutdown();
    }
}
