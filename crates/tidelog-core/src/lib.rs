//! Tidelog Core Library
//!
//! Buffered, disk-backed logging with time-based file rotation.
//!
//! ## Overview
//!
//! Application threads hand messages to [`Logger::log`]. Each message is
//! stamped on arrival and placed in a bounded queue; a single background
//! writer drains the queue into the current log file, flushing every line.
//! Callers never wait on disk I/O, only on queue space when the writer falls
//! behind.
//!
//! ## Rotation
//!
//! Each file lives at most `log_lifetime_seconds`. The age check happens
//! just before a line is written, so rotation is driven by traffic: a quiet
//! period longer than the interval produces no empty files, and the next
//! line opens the new one.
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use tidelog_core::Logger;
//!
//! let logger = Arc::new(Logger::from_properties_file("resources/logger.properties")?);
//! logger.start()?;
//!
//! let worker = {
//!     let logger = Arc::clone(&logger);
//!     std::thread::spawn(move || logger.log("hello from a worker"))
//! };
//! worker.join().unwrap();
//!
//! logger.shutdown();
//! ```

pub mod config;
pub mod error;
pub mod line;
pub mod logger;
pub mod queue;
pub mod rotation;
pub mod session;
pub mod writer;

// Re-exports
pub use config::{LoggerConfig, Properties, DEFAULT_PROPERTIES_PATH};
pub use error::{LogError, LogResult};
pub use line::{session_file_name, LogLine, LINE_SEPARATOR};
pub use logger::{Logger, LoggerStats};
pub use queue::BoundedQueue;
pub use rotation::RotationPolicy;
pub use session::FileSession;
