//! Key-event extraction
//!
//! Ranks a log batch by severity then recency and yields a bounded list
//! of the most noteworthy entries for inclusion in a summary.

use crate::events::{KeyEvent, LogEntry, SeverityTables};

/// Maximum characters carried over from a log message into a key event
const MAX_MESSAGE_CHARS: usize = 200;

/// Extracts the most important events from a log batch
pub struct EventExtractor {
    max_events: usize,
    tables: SeverityTables,
}

impl EventExtractor {
    pub fn new(max_events: usize, tables: SeverityTables) -> Self {
        Self { max_events, tables }
    }

    /// Select up to `max_events` entries, most severe and most recent
    /// first
    ///
    /// Deterministic for a fixed input set: the sort is stable, so
    /// entries tying on both level weight and timestamp keep their input
    /// order.
    pub fn extract(&self, logs: &[LogEntry]) -> Vec<KeyEvent> {
        let mut ranked: Vec<&LogEntry> = logs.iter().collect();
        ranked.sort_by(|a, b| {
            (self.tables.level_weight(b.level), b.timestamp)
                .cmp(&(self.tables.level_weight(a.level), a.timestamp))
        });

        ranked
            .into_iter()
            .take(self.max_events)
            .map(|log| KeyEvent {
                timestamp: log.timestamp,
                level: log.level,
                source: log.source.clone(),
                message: truncate_message(&log.message, MAX_MESSAGE_CHARS),
            })
            .collect()
    }
}

/// Cap a message at `max_chars` characters, respecting UTF-8 boundaries
fn truncate_message(message: &str, max_chars: usize) -> String {
    match message.char_indices().nth(max_chars) {
        Some((byte_index, _)) => message[..byte_index].to_string(),
        None => message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{LogLevel, Metadata, Timestamp};
    use chrono::{Duration, Utc};

    fn log(level: LogLevel, message: &str, age_seconds: i64) -> LogEntry {
        LogEntry {
            timestamp: Utc::now() - Duration::seconds(age_seconds),
            source: "web-server-01".to_string(),
            level,
            message: message.to_string(),
            metadata: Metadata::new(),
        }
    }

    fn extractor(max_events: usize) -> EventExtractor {
        EventExtractor::new(max_events, SeverityTables::default())
    }

    #[test]
    fn test_severity_ranks_before_recency() {
        let logs = vec![
            log(LogLevel::Info, "fresh info", 1),
            log(LogLevel::Critical, "older critical", 300),
            log(LogLevel::Error, "recent error", 10),
        ];

        let events = extractor(10).extract(&logs);
        assert_eq!(events[0].message, "older critical");
        assert_eq!(events[1].message, "recent error");
        assert_eq!(events[2].message, "fresh info");
    }

    #[test]
    fn test_recency_breaks_severity_ties() {
        let logs = vec![
            log(LogLevel::Error, "older error", 120),
            log(LogLevel::Error, "newer error", 5),
        ];

        let events = extractor(10).extract(&logs);
        assert_eq!(events[0].message, "newer error");
        assert_eq!(events[1].message, "older error");
    }

    #[test]
    fn test_bounded_by_max_events() {
        let logs: Vec<LogEntry> = (0..25)
            .map(|i| log(LogLevel::Info, &format!("event {}", i), i))
            .collect();

        let events = extractor(10).extract(&logs);
        assert_eq!(events.len(), 10);
    }

    #[test]
    fn test_message_truncated_to_200_chars() {
        let long_message = "x".repeat(250);
        let logs = vec![log(LogLevel::Error, &long_message, 1)];

        let events = extractor(10).extract(&logs);
        assert_eq!(events[0].message.chars().count(), 200);
    }

    #[test]
    fn test_truncation_respects_multibyte_chars() {
        let message: String = "é".repeat(210);
        let logs = vec![log(LogLevel::Error, &message, 1)];

        let events = extractor(10).extract(&logs);
        assert_eq!(events[0].message.chars().count(), 200);
    }

    #[test]
    fn test_short_message_untouched() {
        let logs = vec![log(LogLevel::Warning, "short", 1)];
        let events = extractor(10).extract(&logs);
        assert_eq!(events[0].message, "short");
    }

    #[test]
    fn test_empty_input_yields_empty_output() {
        let events = extractor(10).extract(&[]);
        assert!(events.is_empty());
    }

    #[test]
    fn test_deterministic_under_rerun() {
        let now: Timestamp = Utc::now();
        let logs: Vec<LogEntry> = (0..20)
            .map(|i| LogEntry {
                timestamp: now - Duration::seconds(i % 5),
                source: format!("source-{}", i % 3),
                level: if i % 2 == 0 {
                    LogLevel::Error
                } else {
                    LogLevel::Info
                },
                message: format!("event {}", i),
                metadata: Metadata::new(),
            })
            .collect();

        let first = extractor(8).extract(&logs);
        let second = extractor(8).extract(&logs);
        assert_eq!(first, second);
    }
}
