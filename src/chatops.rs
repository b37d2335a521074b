//! Keyword-driven command front end
//!
//! A finite dispatch table maps exact command names to report handlers;
//! anything else goes through a keyword fallback. There is no natural
//! language understanding beyond that. Every processed message is
//! recorded in a bounded history.

use crate::classifier::AlertClassifier;
use crate::events::{AlertFilter, AlertStatus, Severity, Timestamp};
use crate::store::LogStore;
use crate::summarizer::LogSummarizer;
use chrono::{Duration, Utc};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Maximum chat records retained
const HISTORY_LIMIT: usize = 100;

/// Entries shown by the list-style commands
const REPORT_LIMIT: usize = 10;

/// A processed chat interaction
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRecord {
    pub timestamp: Timestamp,
    pub user_message: String,
    pub bot_response: String,
    /// Command that handled the message, or `natural` for the fallback
    pub command: String,
    pub success: bool,
}

/// Command front end over the classifier and summarizer
pub struct ChatOps {
    classifier: Arc<AlertClassifier>,
    summarizer: Arc<LogSummarizer>,
    logs: Arc<dyn LogStore>,
    /// Window used by `summarize` when the caller gives no hour count
    default_window_hours: i64,
    history: Mutex<VecDeque<ChatRecord>>,
}

impl ChatOps {
    pub fn new(
        classifier: Arc<AlertClassifier>,
        summarizer: Arc<LogSummarizer>,
        logs: Arc<dyn LogStore>,
        default_window_hours: i64,
    ) -> Self {
        Self {
            classifier,
            summarizer,
            logs,
            default_window_hours,
            history: Mutex::new(VecDeque::new()),
        }
    }

    /// Process a user message and return the bot response
    ///
    /// The first whitespace token, lowercased, selects the command;
    /// unknown input falls through to the keyword matcher. Handler
    /// failures are reported in the response rather than surfaced as
    /// errors.
    pub fn process_message(&self, message: &str) -> String {
        let trimmed = message.trim();
        let mut parts = trimmed.split_whitespace();
        let command = parts
            .next()
            .map(|word| word.to_lowercase())
            .unwrap_or_else(|| "help".to_string());
        let args: Vec<&str> = parts.collect();

        let (command, outcome) = match command.as_str() {
            "status" => ("status", self.cmd_status()),
            "errors" => ("errors", self.cmd_errors()),
            "alerts" => ("alerts", self.cmd_alerts()),
            "critical" => ("critical", self.cmd_critical()),
            "acknowledge" => ("acknowledge", self.cmd_acknowledge(&args)),
            "summarize" => ("summarize", self.cmd_summarize(&args)),
            "help" => ("help", Ok(self.cmd_help())),
            _ => ("natural", Ok(self.handle_natural_language(trimmed))),
        };

        let (response, success) = match outcome {
            Ok(response) => (response, true),
            Err(reason) => (format!("Error executing command: {}", reason), false),
        };

        self.record(trimmed, &response, command, success);
        response
    }

    /// Chat history, oldest first
    pub fn history(&self) -> Vec<ChatRecord> {
        self.history.lock().unwrap().iter().cloned().collect()
    }

    fn record(&self, message: &str, response: &str, command: &str, success: bool) {
        let mut history = self.history.lock().unwrap();
        if history.len() >= HISTORY_LIMIT {
            history.pop_front();
        }
        history.push_back(ChatRecord {
            timestamp: Utc::now(),
            user_message: message.to_string(),
            bot_response: response.to_string(),
            command: command.to_string(),
            success,
        });
    }

    fn cmd_status(&self) -> Result<String, String> {
        let now = Utc::now();
        let one_hour_ago = now - Duration::hours(1);

        let log_count = self
            .logs
            .logs_between(one_hour_ago, now)
            .map_err(|e| e.to_string())?
            .len();
        let open_alerts = self
            .classifier
            .alerts(&AlertFilter {
                status: Some(AlertStatus::Open),
                ..Default::default()
            })
            .map_err(|e| e.to_string())?;
        let critical_open = open_alerts
            .iter()
            .filter(|a| a.severity == Severity::Critical)
            .count();

        let mut response = String::from("System status\n");
        response.push_str(&format!("  Logs in the last hour: {}\n", log_count));
        response.push_str(&format!("  Open alerts: {}\n", open_alerts.len()));
        if critical_open > 0 {
            response.push_str(&format!("  Critical alerts: {}\n", critical_open));
        } else {
            response.push_str("  No critical alerts\n");
        }
        Ok(response)
    }

    fn cmd_errors(&self) -> Result<String, String> {
        let now = Utc::now();
        let logs = self
            .logs
            .logs_between(now - Duration::hours(1), now)
            .map_err(|e| e.to_string())?;

        let mut errors: Vec<_> = logs
            .iter()
            .filter(|log| log.level.is_error())
            .collect();
        if errors.is_empty() {
            return Ok("No errors in the last hour".to_string());
        }
        errors.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        let mut response = format!("{} errors in the last hour\n", errors.len());
        for log in errors.iter().take(REPORT_LIMIT) {
            response.push_str(&format!(
                "  [{}] {} - {}\n",
                log.level, log.source, log.message
            ));
        }
        Ok(response)
    }

    fn cmd_alerts(&self) -> Result<String, String> {
        let open = self
            .classifier
            .alerts(&AlertFilter {
                status: Some(AlertStatus::Open),
                ..Default::default()
            })
            .map_err(|e| e.to_string())?;

        if open.is_empty() {
            return Ok("No open alerts".to_string());
        }

        let mut response = format!("{} open alerts\n", open.len());
        for alert in open.iter().take(REPORT_LIMIT) {
            response.push_str(&format!(
                "  [{:.2}] {} ({}/{}) - {}\n",
                alert.priority_score, alert.title, alert.category, alert.severity, alert.id
            ));
        }
        Ok(response)
    }

    fn cmd_critical(&self) -> Result<String, String> {
        let critical = self
            .classifier
            .alerts(&AlertFilter {
                status: Some(AlertStatus::Open),
                severity: Some(Severity::Critical),
                ..Default::default()
            })
            .map_err(|e| e.to_string())?;

        if critical.is_empty() {
            return Ok("No open critical alerts".to_string());
        }

        let mut response = format!("{} open critical alerts\n", critical.len());
        for alert in critical.iter().take(REPORT_LIMIT) {
            response.push_str(&format!("  {} - {}\n", alert.title, alert.id));
        }
        Ok(response)
    }

    fn cmd_acknowledge(&self, args: &[&str]) -> Result<String, String> {
        let id_arg = args
            .first()
            .ok_or_else(|| "usage: acknowledge <alert-id>".to_string())?;
        let id = Uuid::parse_str(id_arg).map_err(|_| format!("invalid alert id: {}", id_arg))?;

        let alert = self
            .classifier
            .update_status(id, AlertStatus::Acknowledged)
            .map_err(|e| e.to_string())?;
        Ok(format!("Acknowledged alert: {}", alert.title))
    }

    fn cmd_summarize(&self, args: &[&str]) -> Result<String, String> {
        let hours: i64 = match args.first() {
            Some(arg) => arg
                .parse()
                .map_err(|_| format!("invalid hour count: {}", arg))?,
            None => self.default_window_hours,
        };
        let end = Utc::now();
        let start = end - Duration::hours(hours);

        match self.summarizer.generate_summary(start, end) {
            Ok(summary) => Ok(summary.summary_text),
            Err(crate::error::SummaryError::NoLogs { .. }) => {
                Ok(format!("No logs found in the last {} hours", hours))
            }
            Err(e) => Err(e.to_string()),
        }
    }

    fn cmd_help(&self) -> String {
        "Available commands:\n\
         \x20 status - activity and alert counts\n\
         \x20 errors - recent error logs\n\
         \x20 alerts - open alerts by priority\n\
         \x20 critical - open critical alerts\n\
         \x20 acknowledge <id> - acknowledge an alert\n\
         \x20 summarize [hours] - summarize recent logs\n\
         \x20 help - this message"
            .to_string()
    }

    fn handle_natural_language(&self, message: &str) -> String {
        let text = message.to_lowercase();
        let outcome = if text.contains("error") {
            self.cmd_errors()
        } else if text.contains("alert") {
            self.cmd_alerts()
        } else if text.contains("summar") {
            self.cmd_summarize(&[])
        } else if text.contains("status") || text.contains("health") {
            self.cmd_status()
        } else {
            Ok(format!(
                "I didn't understand that. Try one of these:\n{}",
                self.cmd_help()
            ))
        };
        outcome.unwrap_or_else(|reason| format!("Error executing command: {}", reason))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ClassifierConfig, SummarizerConfig};
    use crate::events::{LogEntry, LogLevel, Metadata, RawAlert, SeverityTables};
    use crate::store::MemoryStore;

    fn chatops() -> (Arc<MemoryStore>, ChatOps) {
        let store = Arc::new(MemoryStore::new());
        let classifier = Arc::new(AlertClassifier::new(
            store.clone(),
            store.clone(),
            SeverityTables::default(),
            ClassifierConfig::default(),
        ));
        let summarizer = Arc::new(LogSummarizer::new(
            store.clone(),
            store.clone(),
            SeverityTables::default(),
            &SummarizerConfig::default(),
        ));
        let chatops = ChatOps::new(classifier, summarizer, store.clone(), 1);
        (store, chatops)
    }

    fn raw(title: &str) -> RawAlert {
        RawAlert {
            title: title.to_string(),
            description: String::new(),
            source: None,
            timestamp: None,
            metadata: Metadata::new(),
        }
    }

    fn seed_logs(store: &Arc<MemoryStore>) {
        let now = Utc::now();
        let logs: Vec<LogEntry> = (0..6)
            .map(|i| LogEntry {
                timestamp: now - Duration::minutes(i),
                source: "web-server-01".to_string(),
                level: if i % 2 == 0 {
                    LogLevel::Error
                } else {
                    LogLevel::Info
                },
                message: format!("event {}", i),
                metadata: Metadata::new(),
            })
            .collect();
        store.insert_logs(&logs).unwrap();
    }

    #[test]
    fn test_status_command() {
        let (store, chatops) = chatops();
        seed_logs(&store);

        let response = chatops.process_message("status");
        assert!(response.starts_with("System status"));
        assert!(response.contains("Logs in the last hour: 6"));
        assert!(response.contains("No critical alerts"));
    }

    #[test]
    fn test_errors_command_lists_recent_errors() {
        let (store, chatops) = chatops();
        seed_logs(&store);

        let response = chatops.process_message("errors");
        assert!(response.starts_with("3 errors in the last hour"));
        assert!(response.contains("web-server-01"));
    }

    #[test]
    fn test_acknowledge_command() {
        let (store, chatops) = chatops();
        let classifier = AlertClassifier::new(
            store.clone(),
            store.clone(),
            SeverityTables::default(),
            ClassifierConfig::default(),
        );
        let alert = classifier.classify(raw("Service is down")).unwrap();

        let response = chatops.process_message(&format!("acknowledge {}", alert.id));
        assert_eq!(response, "Acknowledged alert: Service is down");
    }

    #[test]
    fn test_acknowledge_bad_id_reports_failure() {
        let (_, chatops) = chatops();

        let response = chatops.process_message("acknowledge not-a-uuid");
        assert!(response.starts_with("Error executing command"));

        let history = chatops.history();
        assert!(!history.last().unwrap().success);
    }

    #[test]
    fn test_summarize_without_logs() {
        let (_, chatops) = chatops();
        let response = chatops.process_message("summarize 2");
        assert_eq!(response, "No logs found in the last 2 hours");
    }

    #[test]
    fn test_summarize_with_logs() {
        let (store, chatops) = chatops();
        seed_logs(&store);

        let response = chatops.process_message("summarize");
        assert!(response.starts_with("Total logs processed: 6"));
    }

    #[test]
    fn test_unknown_command_keyword_fallback() {
        let (store, chatops) = chatops();
        seed_logs(&store);

        let response = chatops.process_message("show me the recent errors please");
        assert!(response.contains("errors in the last hour"));

        let history = chatops.history();
        assert_eq!(history.last().unwrap().command, "natural");
    }

    #[test]
    fn test_gibberish_gets_help() {
        let (_, chatops) = chatops();
        let response = chatops.process_message("fhqwhgads");
        assert!(response.contains("Available commands"));
    }

    #[test]
    fn test_empty_message_gets_help() {
        let (_, chatops) = chatops();
        let response = chatops.process_message("   ");
        assert!(response.contains("Available commands"));
    }

    #[test]
    fn test_history_records_interactions() {
        let (_, chatops) = chatops();
        chatops.process_message("help");
        chatops.process_message("status");

        let history = chatops.history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].command, "help");
        assert_eq!(history[1].command, "status");
        assert!(history.iter().all(|r| r.success));
    }

    #[test]
    fn test_history_bounded() {
        let (_, chatops) = chatops();
        for _ in 0..110 {
            chatops.process_message("help");
        }
        assert_eq!(chatops.history().len(), 100);
    }
}
