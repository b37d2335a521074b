//! In-memory store implementation
//!
//! Each collection sits behind its own mutex so the four trait surfaces
//! stay independent. Every trait method is a single lock-scoped unit,
//! which gives the atomicity the engines rely on for read-modify-write
//! sequences on the same record.

use crate::error::StoreError;
use crate::events::{
    Alert, AlertFilter, AlertRule, LogEntry, LogSummary, NewRule, Timestamp,
};
use crate::store::{AlertStore, LogStore, RuleStore, SummaryStore};
use chrono::Utc;
use std::sync::Mutex;
use uuid::Uuid;

/// Rules plus the definition-order counter, kept under one lock
#[derive(Debug, Default)]
struct RuleTable {
    rules: Vec<AlertRule>,
    next_seq: u64,
}

/// In-memory backing store for all four storage traits
#[derive(Debug, Default)]
pub struct MemoryStore {
    rules: Mutex<RuleTable>,
    alerts: Mutex<Vec<Alert>>,
    logs: Mutex<Vec<LogEntry>>,
    summaries: Mutex<Vec<LogSummary>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RuleStore for MemoryStore {
    fn create_rule(&self, rule: NewRule) -> Result<AlertRule, StoreError> {
        let mut table = self.rules.lock().unwrap();

        if table.rules.iter().any(|r| r.name == rule.name) {
            return Err(StoreError::DuplicateRule(rule.name));
        }

        table.next_seq += 1;
        let stored = AlertRule {
            id: Uuid::new_v4(),
            seq: table.next_seq,
            name: rule.name,
            pattern: rule.pattern,
            category: rule.category,
            severity: rule.severity,
            priority_boost: rule.priority_boost,
            enabled: rule.enabled,
            created_at: Utc::now(),
        };
        table.rules.push(stored.clone());
        Ok(stored)
    }

    fn rules(&self) -> Result<Vec<AlertRule>, StoreError> {
        Ok(self.rules.lock().unwrap().rules.clone())
    }

    fn set_rule_enabled(&self, name: &str, enabled: bool) -> Result<Option<AlertRule>, StoreError> {
        let mut table = self.rules.lock().unwrap();
        match table.rules.iter_mut().find(|r| r.name == name) {
            Some(rule) => {
                rule.enabled = enabled;
                Ok(Some(rule.clone()))
            }
            None => Ok(None),
        }
    }
}

impl AlertStore for MemoryStore {
    fn insert_alert(&self, alert: &Alert) -> Result<(), StoreError> {
        self.alerts.lock().unwrap().push(alert.clone());
        Ok(())
    }

    fn alert(&self, id: Uuid) -> Result<Option<Alert>, StoreError> {
        Ok(self
            .alerts
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.id == id)
            .cloned())
    }

    fn update_alert(
        &self,
        id: Uuid,
        mutate: &mut dyn FnMut(&mut Alert),
    ) -> Result<Option<Alert>, StoreError> {
        let mut alerts = self.alerts.lock().unwrap();
        match alerts.iter_mut().find(|a| a.id == id) {
            Some(alert) => {
                mutate(alert);
                Ok(Some(alert.clone()))
            }
            None => Ok(None),
        }
    }

    fn alerts_since(&self, cutoff: Timestamp) -> Result<Vec<Alert>, StoreError> {
        Ok(self
            .alerts
            .lock()
            .unwrap()
            .iter()
            .filter(|a| a.timestamp >= cutoff)
            .cloned()
            .collect())
    }

    fn query_alerts(&self, filter: &AlertFilter) -> Result<Vec<Alert>, StoreError> {
        Ok(self
            .alerts
            .lock()
            .unwrap()
            .iter()
            .filter(|a| filter.matches(a))
            .cloned()
            .collect())
    }
}

impl LogStore for MemoryStore {
    fn insert_logs(&self, entries: &[LogEntry]) -> Result<(), StoreError> {
        self.logs.lock().unwrap().extend_from_slice(entries);
        Ok(())
    }

    fn logs_between(&self, start: Timestamp, end: Timestamp) -> Result<Vec<LogEntry>, StoreError> {
        let mut entries: Vec<LogEntry> = self
            .logs
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.timestamp >= start && e.timestamp <= end)
            .cloned()
            .collect();
        entries.sort_by_key(|e| e.timestamp);
        Ok(entries)
    }
}

impl SummaryStore for MemoryStore {
    fn insert_summary(&self, summary: &LogSummary) -> Result<(), StoreError> {
        self.summaries.lock().unwrap().push(summary.clone());
        Ok(())
    }

    fn recent_summaries(&self, limit: usize) -> Result<Vec<LogSummary>, StoreError> {
        let mut summaries = self.summaries.lock().unwrap().clone();
        summaries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        summaries.truncate(limit);
        Ok(summaries)
    }
}
