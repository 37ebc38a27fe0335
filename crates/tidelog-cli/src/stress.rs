//! Load generator: simulated components logging from their own threads.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use rand::Rng;
use tidelog_core::{Logger, LoggerStats, Properties};
use tracing::{debug, info};

/// Property key: messages each simulated component sends.
pub const KEY_LOGS_PER_THREAD: &str = "test_logs_per_thread";
/// Property key: upper bound of the random pause between messages.
pub const KEY_MAX_WAIT_MILLIS: &str = "max_wait_between_test_logs_millis";

/// Harness settings read from the logger's properties source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StressSettings {
    pub logs_per_thread: u64,
    pub max_wait: Duration,
}

impl StressSettings {
    pub fn from_properties(props: &Properties) -> Result<Self> {
        let logs_per_thread: i64 = props
            .get_parsed(KEY_LOGS_PER_THREAD)
            .with_context(|| format!("reading {}", KEY_LOGS_PER_THREAD))?;
        if logs_per_thread < 0 {
            bail!("property {} must be 0 or greater", KEY_LOGS_PER_THREAD);
        }
        let max_wait_millis: i64 = props
            .get_parsed(KEY_MAX_WAIT_MILLIS)
            .with_context(|| format!("reading {}", KEY_MAX_WAIT_MILLIS))?;
        if max_wait_millis < 1 {
            bail!("property {} must be 1 or greater", KEY_MAX_WAIT_MILLIS);
        }
        Ok(Self {
            logs_per_thread: logs_per_thread as u64,
            max_wait: Duration::from_millis(max_wait_millis as u64),
        })
    }
}

/// Outcome of a stress run.
#[derive(Debug, Clone, Copy)]
pub struct StressReport {
    pub threads: usize,
    pub sent: u64,
    pub elapsed: Duration,
    pub stats: LoggerStats,
}

/// One simulated component: sends its message `logs_per_thread` times with
/// a random pause below `max_wait` after each send.
fn component(logger: Arc<Logger>, id: usize, settings: StressSettings) -> u64 {
    let message = format!("Thread {} msg", id);
    let max_wait = settings.max_wait.as_millis() as u64;
    let mut rng = rand::rng();
    let mut sent = 0;

    while sent < settings.logs_per_thread {
        logger.log(&message);
        sent += 1;
        thread::sleep(Duration::from_millis(rng.random_range(0..max_wait)));
    }
    debug!(component = id, sent, "component finished");
    sent
}

/// Start the logger, drive it from `threads` components, then shut it down.
pub fn run(logger: Logger, threads: usize, settings: StressSettings) -> Result<StressReport> {
    let logger = Arc::new(logger);
    logger.start().context("starting logger")?;
    info!(threads, logs_per_thread = settings.logs_per_thread, "stress run started");

    let started = Instant::now();
    let handles = (0..threads)
        .map(|id| {
            let logger = Arc::clone(&logger);
            thread::Builder::new()
                .name(format!("component-{}", id))
                .spawn(move || component(logger, id, settings))
                .context("spawning component thread")
        })
        .collect::<Result<Vec<_>>>()?;

    let mut sent = 0;
    for handle in handles {
        sent += handle
            .join()
            .map_err(|_| anyhow::anyhow!("component thread panicked"))?;
    }

    logger.shutdown();
    let elapsed = started.elapsed();
    info!(sent, elapsed_ms = elapsed.as_millis() as u64, "stress run finished");

    Ok(StressReport {
        threads,
        sent,
        elapsed,
        stats: logger.stats(),
    })
}
