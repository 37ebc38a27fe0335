//! Property-based tests for line formatting and ordering
//!
//! Uses proptest to check that any message survives the trip to disk
//! unchanged and in order.

use std::fs;

use chrono::{Local, NaiveDateTime};
use proptest::prelude::*;
use tempfile::TempDir;
use tidelog_core::line::LINE_TIMESTAMP_FORMAT;
use tidelog_core::{LogLine, Logger, LoggerConfig, LINE_SEPARATOR};

// ============================================================================
// Strategy Generators
// ============================================================================

/// Messages without line breaks (any other character is allowed)
fn message_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[^\r\n]{0,200}").expect("valid regex")
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    /// A line is `[ts] message<sep>` with a parseable timestamp
    #[test]
    fn line_format_roundtrip(message in message_strategy()) {
        let before = Local::now().naive_local();
        let line = LogLine::now(&message);
        let after = Local::now().naive_local();

        let body = line.as_str().strip_suffix(LINE_SEPARATOR).unwrap();
        prop_assert!(body.starts_with('['));
        let (stamp, rest) = body[1..].split_once("] ").unwrap();
        prop_assert_eq!(rest, message.as_str());

        let parsed = NaiveDateTime::parse_from_str(stamp, LINE_TIMESTAMP_FORMAT).unwrap();
        // Millisecond truncation can put the stamp just below `before`.
        prop_assert!(parsed >= before - chrono::Duration::milliseconds(1));
        prop_assert!(parsed <= after);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    /// Single-threaded logging preserves call order on disk
    #[test]
    fn single_thread_order_preserved(
        messages in prop::collection::vec(message_strategy(), 0..40),
        capacity in 1i64..6,
    ) {
        let temp = TempDir::new().unwrap();
        let config = LoggerConfig::new(capacity, 60, temp.path(), false).unwrap();
        let logger = Logger::new(config).unwrap();
        logger.start().unwrap();
        for m in &messages {
            logger.log(m);
        }
        logger.shutdown();

        let mut files: Vec<_> = fs::read_dir(temp.path())
            .unwrap()
            .map(|e| e.unwrap().path())
            .collect();
        files.sort();
        let written: Vec<String> = files
            .iter()
            .flat_map(|p| {
                fs::read_to_string(p)
                    .unwrap()
                    .split_terminator(LINE_SEPARATOR)
                    .map(|l| l.split_once("] ").unwrap().1.to_string())
                    .collect::<Vec<_>>()
            })
            .collect();

        prop_assert_eq!(written, messages);
    }
}
