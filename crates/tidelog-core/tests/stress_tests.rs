//! Stress tests for concurrent producers
//!
//! Many threads log through a deliberately small queue; every message must
//! reach disk exactly once and each thread's messages must keep their order.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use tempfile::TempDir;
use tidelog_core::{Logger, LoggerConfig, LINE_SEPARATOR};

fn read_messages(dir: &Path) -> Vec<String> {
    let mut files: Vec<_> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    files.sort();
    files
        .iter()
        .flat_map(|p| {
            fs::read_to_string(p)
                .unwrap()
                .split_terminator(LINE_SEPARATOR)
                .map(|l| l.split_once("] ").unwrap().1.to_string())
                .collect::<Vec<_>>()
        })
        .collect()
}

/// 20 producer threads, 200 messages each, queue of 8
#[test]
fn test_20_threads_no_loss_no_duplication() {
    let temp = TempDir::new().unwrap();
    let config = LoggerConfig::new(8, 60, temp.path(), false).unwrap();
    let logger = Arc::new(Logger::new(config).unwrap());
    logger.start().unwrap();

    let start = Instant::now();

    let producers: Vec<_> = (0..20)
        .map(|t| {
            let logger = Arc::clone(&logger);
            thread::spawn(move || {
                for i in 0..200 {
                    logger.log(format!("Thread {} msg {}", t, i));
                }
            })
        })
        .collect();
    for p in producers {
        p.join().unwrap();
    }
    logger.shutdown();

    let duration = start.elapsed();
    let messages = read_messages(temp.path());
    assert_eq!(messages.len(), 4000);

    let mut per_thread: HashMap<u32, Vec<u32>> = HashMap::new();
    for m in &messages {
        let parts: Vec<_> = m.split_whitespace().collect();
        let t: u32 = parts[1].parse().unwrap();
        let i: u32 = parts[3].parse().unwrap();
        per_thread.entry(t).or_default().push(i);
    }
    assert_eq!(per_thread.len(), 20);
    for (t, seq) in &per_thread {
        let expected: Vec<u32> = (0..200).collect();
        assert_eq!(seq, &expected, "thread {} out of order or incomplete", t);
    }

    let stats = logger.stats();
    assert_eq!(stats.lines_written, 4000);
    assert_eq!(stats.lines_dropped, 0);

    println!(
        "4000 lines from 20 threads in {:?} ({:.2} lines/ms)",
        duration,
        4000.0 / duration.as_millis().max(1) as f64
    );
}

/// Timestamps on disk never go backwards: stamping happens under the same
/// lock as enqueueing.
#[test]
fn test_timestamps_monotonic_across_threads() {
    let temp = TempDir::new().unwrap();
    let config = LoggerConfig::new(4, 60, temp.path(), false).unwrap();
    let logger = Arc::new(Logger::new(config).unwrap());
    logger.start().unwrap();

    let producers: Vec<_> = (0..4)
        .map(|t| {
            let logger = Arc::clone(&logger);
            thread::spawn(move || {
                for i in 0..100 {
                    logger.log(format!("{}-{}", t, i));
                }
            })
        })
        .collect();
    for p in producers {
        p.join().unwrap();
    }
    logger.shutdown();

    let mut files: Vec<_> = fs::read_dir(temp.path())
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    files.sort();
    let stamps: Vec<String> = files
        .iter()
        .flat_map(|p| {
            fs::read_to_string(p)
                .unwrap()
                .split_terminator(LINE_SEPARATOR)
                .map(|l| l[1..24].to_string())
                .collect::<Vec<_>>()
        })
        .collect();

    assert_eq!(stamps.len(), 400);
    assert!(stamps.windows(2).all(|w| w[0] <= w[1]));
}
