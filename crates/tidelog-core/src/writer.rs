//! The single background writer.
//!
//! ```text
//! producers ──log()──► BoundedQueue ──► WriterLoop ──► FileSession
//!                 └──ring──► Doorbell ──wake──┘    ▲
//! start()/stop() ──Control──────────────────────────┘
//! ```
//!
//! The writer is the only owner of the open [`FileSession`]. Lifecycle
//! requests from other threads travel over a channel and are answered once
//! the writer has applied them, so the handle is never shared.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::{Condvar, Mutex};
use tracing::{debug, error, info, warn};

use crate::config::LoggerConfig;
use crate::error::{LogError, LogResult};
use crate::line::LogLine;
use crate::queue::BoundedQueue;
use crate::rotation::RotationPolicy;
use crate::session::FileSession;

/// Wake-up signal for the writer.
///
/// Every ring bumps a generation counter and wakes the writer once. The
/// writer reads the generation *before* looking for work and only sleeps
/// while it is unchanged, so a ring landing between the check and the wait
/// is never lost.
#[derive(Default)]
pub struct Doorbell {
    generation: Mutex<u64>,
    cv: Condvar,
}

impl Doorbell {
    /// Create a silent doorbell.
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal the writer.
    pub fn ring(&self) {
        *self.generation.lock() += 1;
        self.cv.notify_one();
    }

    /// Current generation.
    pub fn generation(&self) -> u64 {
        *self.generation.lock()
    }

    /// Sleep until someone rings after `seen` was observed.
    pub fn wait_past(&self, seen: u64) {
        let mut generation = self.generation.lock();
        while *generation == seen {
            self.cv.wait(&mut generation);
        }
    }
}

/// Lifecycle request handled by the writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    /// Open a new file session.
    Start,
    /// Close the current file session.
    Stop,
}

/// A [`Control`] plus where to send the outcome.
pub struct ControlRequest {
    pub(crate) control: Control,
    pub(crate) reply: Sender<LogResult<()>>,
}

/// Counters shared between the writer and the facade.
#[derive(Debug, Default)]
pub struct WriterStats {
    pub(crate) lines_written: AtomicU64,
    pub(crate) lines_dropped: AtomicU64,
    pub(crate) rotations: AtomicU64,
}

/// State shared by the facade and the writer thread.
pub struct Shared {
    pub(crate) queue: BoundedQueue<LogLine>,
    pub(crate) doorbell: Doorbell,
    pub(crate) shutdown: AtomicBool,
    pub(crate) stats: WriterStats,
}

impl Shared {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            queue: BoundedQueue::new(capacity),
            doorbell: Doorbell::new(),
            shutdown: AtomicBool::new(false),
            stats: WriterStats::default(),
        }
    }
}

/// Body of the writer thread.
pub struct WriterLoop {
    shared: Arc<Shared>,
    control: Receiver<ControlRequest>,
    config: LoggerConfig,
    policy: RotationPolicy,
    session: Option<FileSession>,
    /// Set once a Start has been applied and cleared by Stop. Stays set when
    /// a rotation fails to open its replacement, so later writes retry.
    started: bool,
    last_loop: Instant,
}

impl WriterLoop {
    pub(crate) fn new(
        shared: Arc<Shared>,
        control: Receiver<ControlRequest>,
        config: LoggerConfig,
    ) -> Self {
        let policy = RotationPolicy::new(config.rotation_interval());
        Self {
            shared,
            control,
            config,
            policy,
            session: None,
            started: false,
            last_loop: Instant::now(),
        }
    }

    /// Run until shutdown is requested and pending work is done.
    pub fn run(mut self) {
        debug!(dir = %self.config.output_dir().display(), "writer started");

        loop {
            let seen = self.shared.doorbell.generation();

            if self.config.tracing() {
                let now = Instant::now();
                info!(
                    since_last_loop_ms = now.duration_since(self.last_loop).as_millis() as u64,
                    "writer loop"
                );
                self.last_loop = now;
            }

            self.serve_control();

            if self.started && !self.shared.queue.is_empty() {
                self.write_next();
                continue;
            }

            if self.shared.shutdown.load(Ordering::SeqCst) {
                break;
            }

            self.shared.doorbell.wait_past(seen);
        }

        self.finish();
    }

    /// Apply every queued lifecycle request.
    fn serve_control(&mut self) {
        loop {
            match self.control.try_recv() {
                Ok(request) => {
                    let outcome = match request.control {
                        Control::Start => self.start(),
                        Control::Stop => self.stop(),
                    };
                    // The requester may have given up waiting.
                    let _ = request.reply.send(outcome);
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => return,
            }
        }
    }

    fn start(&mut self) -> LogResult<()> {
        if self.started {
            return Err(LogError::already_started());
        }
        self.open_session()?;
        self.started = true;
        Ok(())
    }

    fn stop(&mut self) -> LogResult<()> {
        if !self.started {
            return Err(LogError::already_stopped());
        }
        self.started = false;
        self.close_session()
    }

    fn open_session(&mut self) -> LogResult<()> {
        let session = FileSession::open(self.config.output_dir())?;
        info!(path = %session.path().display(), "log file opened");
        self.session = Some(session);
        Ok(())
    }

    fn close_session(&mut self) -> LogResult<()> {
        let Some(session) = self.session.take() else {
            return Ok(());
        };
        let path = session.path().to_path_buf();
        session.close()?;
        info!(path = %path.display(), "log file closed");
        Ok(())
    }

    /// Replace the session if it is too old, or reopen one after a failure.
    ///
    /// Same close-then-open sequence as stop/start, minus the state checks;
    /// failures are reported and leave the writer started so the next write
    /// tries again.
    fn rotate_if_due(&mut self, now: Instant) {
        let due = match &self.session {
            Some(session) => self.policy.is_due(session.opened_at(), now),
            None => true,
        };
        if !due {
            return;
        }

        if let Err(e) = self.close_session() {
            error!(error = %e, "failed to close rotated log file");
        }
        match self.open_session() {
            Ok(()) => {
                self.shared.stats.rotations.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => {
                error!(error = %e, "failed to open new log file, will retry on next write");
            }
        }
    }

    /// Rotate if due, then move one line from the queue to the file.
    fn write_next(&mut self) {
        self.rotate_if_due(Instant::now());

        let Some(line) = self.shared.queue.try_pop() else {
            return;
        };

        let outcome = match self.session.as_mut() {
            Some(session) => session.write_line(&line),
            None => Err(LogError::State("no log file is open".to_string())),
        };

        match outcome {
            Ok(()) => {
                self.shared.stats.lines_written.fetch_add(1, Ordering::Relaxed);
                if self.config.tracing() {
                    let age = self
                        .session
                        .as_ref()
                        .map(|s| s.age(Instant::now()).as_millis() as u64)
                        .unwrap_or_default();
                    info!(
                        remaining = self.shared.queue.len(),
                        file_age_ms = age,
                        "written log line"
                    );
                }
            }
            Err(e) => {
                self.shared.stats.lines_dropped.fetch_add(1, Ordering::Relaxed);
                error!(error = %e, "dropped log line");
            }
        }
    }

    /// Close the session and account for anything that can no longer be written.
    fn finish(&mut self) {
        self.shared.queue.close();
        // A start that arrives with the shutdown still writes what is queued.
        self.serve_control();
        while self.started && !self.shared.queue.is_empty() {
            self.write_next();
        }

        let mut abandoned = 0u64;
        while self.shared.queue.try_pop().is_some() {
            abandoned += 1;
        }
        if abandoned > 0 {
            self.shared
                .stats
                .lines_dropped
                .fetch_add(abandoned, Ordering::Relaxed);
            warn!(abandoned, "logger stopped with unwritten lines");
        }

        if let Err(e) = self.close_session() {
            error!(error = %e, "failed to close log file");
        }
        self.started = false;
        debug!("writer finished");
    }
}
