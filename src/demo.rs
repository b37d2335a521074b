//! Deterministic sample data for the demo command
//!
//! Mirrors typical traffic from a small network: a handful of sources,
//! mostly INFO-level chatter with a sprinkling of warnings and errors,
//! plus one failing source and one traffic spike so the anomaly checks
//! have something to find.

use crate::events::{LogEntry, LogLevel, Metadata, RawAlert, Timestamp};
use chrono::Duration;

const SOURCES: [&str; 5] = [
    "web-server-01",
    "web-server-02",
    "database-01",
    "api-gateway",
    "load-balancer",
];

const INFO_MESSAGES: [&str; 4] = [
    "User authentication successful",
    "Request processed successfully",
    "Health check passed",
    "Connection established to database",
];

const WARNING_MESSAGES: [&str; 3] = [
    "High CPU usage detected",
    "Connection pool nearly exhausted",
    "Request timeout warning",
];

const ERROR_MESSAGES: [&str; 3] = [
    "Connection timeout to database",
    "Query execution failed",
    "Authentication failed for user",
];

/// Sample logs covering the six hours before `end`
///
/// Hour weights are fixed so repeated runs produce the same shape: a
/// steady baseline, a spike in the newest hour, and a concentration of
/// errors on `database-01`.
pub fn sample_logs(end: Timestamp) -> Vec<LogEntry> {
    let mut logs = Vec::new();
    let hour_volumes: [usize; 6] = [40, 40, 40, 40, 40, 120];

    for (hour_index, &volume) in hour_volumes.iter().enumerate() {
        let hour_start = end - Duration::hours(hour_volumes.len() as i64 - hour_index as i64);
        for i in 0..volume {
            let timestamp = hour_start + Duration::seconds((i as i64 * 3600) / volume as i64);
            let source = SOURCES[i % SOURCES.len()];

            // Every 12th entry is an error, every 5th a warning; the
            // database source fails more often than the rest
            let (level, message) = if source == "database-01" && i % 3 == 0 {
                (LogLevel::Error, ERROR_MESSAGES[i % ERROR_MESSAGES.len()])
            } else if i % 12 == 0 {
                (LogLevel::Error, ERROR_MESSAGES[i % ERROR_MESSAGES.len()])
            } else if i % 5 == 0 {
                (
                    LogLevel::Warning,
                    WARNING_MESSAGES[i % WARNING_MESSAGES.len()],
                )
            } else {
                (LogLevel::Info, INFO_MESSAGES[i % INFO_MESSAGES.len()])
            };

            logs.push(LogEntry {
                timestamp,
                source: source.to_string(),
                level,
                message: message.to_string(),
                metadata: Metadata::new(),
            });
        }
    }

    logs
}

/// Sample raw alerts exercising rule matches, fallback classification,
/// and auto-acknowledgment
pub fn sample_alerts() -> Vec<RawAlert> {
    [
        (
            "Security breach attempt detected",
            "Multiple failed login attempts from unknown host",
            "firewall-01",
        ),
        (
            "Connection timeout to database",
            "Primary database is not responding",
            "database-01",
        ),
        (
            "Connection timeout to database",
            "Replica database is not responding",
            "database-02",
        ),
        (
            "High CPU usage on web tier",
            "CPU at 95% for ten minutes",
            "web-server-01",
        ),
        (
            "Scheduled certificate rotation",
            "TLS certificates rotated without incident",
            "load-balancer",
        ),
    ]
    .into_iter()
    .map(|(title, description, source)| RawAlert {
        title: title.to_string(),
        description: description.to_string(),
        source: Some(source.to_string()),
        timestamp: None,
        metadata: Metadata::new(),
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_sample_logs_are_deterministic() {
        let end = Utc::now();
        assert_eq!(sample_logs(end), sample_logs(end));
    }

    #[test]
    fn test_sample_logs_span_the_window() {
        let end = Utc::now();
        let logs = sample_logs(end);

        assert_eq!(logs.len(), 320);
        assert!(logs.iter().all(|log| log.timestamp >= end - Duration::hours(6)));
        assert!(logs.iter().all(|log| log.timestamp <= end));
    }

    #[test]
    fn test_sample_logs_contain_errors() {
        let logs = sample_logs(Utc::now());
        assert!(logs.iter().any(|log| log.level == LogLevel::Error));
        assert!(logs.iter().any(|log| log.level == LogLevel::Warning));
    }

    #[test]
    fn test_sample_alerts_all_titled() {
        assert!(sample_alerts().iter().all(|a| !a.title.is_empty()));
    }
}
