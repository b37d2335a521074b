//! Alert classification engine
//!
//! Consumes raw alert payloads and the current rule set, producing fully
//! classified, scored alerts. Also owns the alert lifecycle (status
//! transitions), coarse grouping of similar alerts, and rule management.

use crate::classifier::rules::{fallback_category, fallback_severity, RuleSet};
use crate::config::ClassifierConfig;
use crate::error::ClassifyError;
use crate::events::{
    Alert, AlertFilter, AlertRule, AlertStatus, NewRule, RawAlert, SeverityTables,
};
use crate::store::{AlertStore, RuleStore};
use chrono::{Duration, Utc};
use log::{debug, info};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Number of title characters used as the grouping key
const GROUP_KEY_CHARS: usize = 50;

/// Engine for classifying and prioritizing network alerts
pub struct AlertClassifier {
    rules: Arc<dyn RuleStore>,
    alerts: Arc<dyn AlertStore>,
    tables: SeverityTables,
    config: ClassifierConfig,
}

impl AlertClassifier {
    pub fn new(
        rules: Arc<dyn RuleStore>,
        alerts: Arc<dyn AlertStore>,
        tables: SeverityTables,
        config: ClassifierConfig,
    ) -> Self {
        Self {
            rules,
            alerts,
            tables,
            config,
        }
    }

    /// Classify an incoming alert and persist it
    ///
    /// Every enabled rule's pattern is evaluated against the lowercased
    /// title and description; the highest-severity match decides the
    /// classification, with definition order as the tie-break. Alerts no
    /// rule matches fall back to the keyword heuristics. Low-priority
    /// alerts are auto-acknowledged at creation.
    ///
    /// # Errors
    ///
    /// `ClassifyError::MissingTitle` if the title is empty; rejected
    /// before anything is persisted. Store failures abort the call with
    /// nothing written.
    pub fn classify(&self, raw: RawAlert) -> Result<Alert, ClassifyError> {
        if raw.title.trim().is_empty() {
            return Err(ClassifyError::MissingTitle);
        }

        let combined_text = format!("{} {}", raw.title, raw.description).to_lowercase();

        // Snapshot the rules at call time
        let rule_set = RuleSet::new(self.rules.rules()?);

        let (category, severity, priority_boost) =
            match rule_set.best_match(&combined_text, &self.tables) {
                Some(rule) => {
                    debug!("Alert '{}' matched rule '{}'", raw.title, rule.name);
                    (rule.category.clone(), rule.severity, rule.priority_boost)
                }
                None => {
                    let category = fallback_category(&combined_text);
                    let severity = fallback_severity(&combined_text);
                    debug!(
                        "Alert '{}' fell back to keyword classification: {}/{}",
                        raw.title, category, severity
                    );
                    (category.to_string(), severity, 0.0)
                }
            };

        let base_score = self.tables.base_score(severity);
        let priority_score = (base_score + priority_boost).clamp(0.0, 1.0);

        let now = Utc::now();
        let status = if priority_score < self.config.auto_ack_threshold {
            AlertStatus::Acknowledged
        } else {
            AlertStatus::Open
        };

        let alert = Alert {
            id: Uuid::new_v4(),
            timestamp: raw.timestamp.unwrap_or(now),
            title: raw.title,
            description: raw.description,
            severity,
            category,
            status,
            priority_score,
            source: raw.source.unwrap_or_else(|| "unknown".to_string()),
            metadata: raw.metadata,
            acknowledged_at: (status == AlertStatus::Acknowledged).then_some(now),
            resolved_at: None,
        };

        self.alerts.insert_alert(&alert)?;
        info!(
            "Classified alert '{}' as {}/{} (priority {:.2}, {})",
            alert.title, alert.category, alert.severity, alert.priority_score, alert.status
        );

        Ok(alert)
    }

    /// Update an alert's lifecycle status
    ///
    /// Transitions are forward-only (open, acknowledged, resolved) unless
    /// `allow_reopen` is configured. Acknowledging stamps
    /// `acknowledged_at` only the first time; resolving re-stamps
    /// `resolved_at` on every resolution.
    ///
    /// # Errors
    ///
    /// `ClassifyError::UnknownAlert` for an unknown id;
    /// `ClassifyError::InvalidTransition` for a backwards move, with no
    /// mutation performed.
    pub fn update_status(
        &self,
        id: Uuid,
        new_status: AlertStatus,
    ) -> Result<Alert, ClassifyError> {
        let now = Utc::now();
        let allow_reopen = self.config.allow_reopen;
        let mut rejection: Option<ClassifyError> = None;

        let updated = self.alerts.update_alert(id, &mut |alert| {
            if !allow_reopen && new_status < alert.status {
                rejection = Some(ClassifyError::InvalidTransition {
                    from: alert.status,
                    to: new_status,
                });
                return;
            }

            alert.status = new_status;
            match new_status {
                AlertStatus::Acknowledged => {
                    if alert.acknowledged_at.is_none() {
                        alert.acknowledged_at = Some(now);
                    }
                }
                AlertStatus::Resolved => {
                    alert.resolved_at = Some(now);
                }
                AlertStatus::Open => {}
            }
        })?;

        match updated {
            None => Err(ClassifyError::UnknownAlert(id)),
            Some(alert) => match rejection {
                Some(err) => Err(err),
                None => {
                    info!("Alert {} moved to {}", alert.id, alert.status);
                    Ok(alert)
                }
            },
        }
    }

    /// Group recent alerts sharing a title prefix
    ///
    /// The grouping key is the first 50 characters of the title, compared
    /// for exact equality. Groups with a single member are discarded;
    /// this is intentionally coarse, not clustering.
    pub fn group_similar_alerts(
        &self,
        window_hours: i64,
    ) -> Result<HashMap<String, Vec<Alert>>, ClassifyError> {
        let cutoff = Utc::now() - Duration::hours(window_hours);
        let recent = self.alerts.alerts_since(cutoff)?;

        let mut groups: HashMap<String, Vec<Alert>> = HashMap::new();
        for alert in recent {
            let key: String = alert.title.chars().take(GROUP_KEY_CHARS).collect();
            groups.entry(key).or_default().push(alert);
        }
        groups.retain(|_, members| members.len() > 1);

        Ok(groups)
    }

    /// Create a new classification rule
    pub fn create_rule(&self, rule: NewRule) -> Result<AlertRule, ClassifyError> {
        let stored = self.rules.create_rule(rule)?;
        info!("Created rule '{}' (seq {})", stored.name, stored.seq);
        Ok(stored)
    }

    /// All classification rules in definition order
    pub fn rules(&self) -> Result<Vec<AlertRule>, ClassifyError> {
        Ok(self.rules.rules()?)
    }

    /// Enable or disable a rule by name
    pub fn set_rule_enabled(
        &self,
        name: &str,
        enabled: bool,
    ) -> Result<AlertRule, ClassifyError> {
        match self.rules.set_rule_enabled(name, enabled)? {
            Some(rule) => {
                info!(
                    "Rule '{}' {}",
                    rule.name,
                    if enabled { "enabled" } else { "disabled" }
                );
                Ok(rule)
            }
            None => Err(ClassifyError::UnknownRule(name.to_string())),
        }
    }

    /// Alerts matching the filter, ordered by priority score descending
    /// then timestamp descending
    pub fn alerts(&self, filter: &AlertFilter) -> Result<Vec<Alert>, ClassifyError> {
        let mut alerts = self.alerts.query_alerts(filter)?;
        alerts.sort_by(|a, b| {
            b.priority_score
                .partial_cmp(&a.priority_score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| b.timestamp.cmp(&a.timestamp))
        });
        Ok(alerts)
    }
}


// Property-based tests
#[cfg(test)]
mod property_tests {
    use super::*;
    use crate::events::Severity;
    use crate::store::MemoryStore;
    use quickcheck::{Arbitrary, Gen};
    use quickcheck_macros::quickcheck;

    /// Priority boost in roughly [-1.0, 2.0], wider than anything a rule
    /// should carry, to exercise the clamp
    #[derive(Debug, Clone)]
    struct Boost(f64);

    impl Arbitrary for Boost {
        fn arbitrary(g: &mut Gen) -> Self {
            let raw = u16::arbitrary(g) as f64 / u16::MAX as f64;
            Boost(raw * 3.0 - 1.0)
        }
    }

    #[derive(Debug, Clone)]
    struct AnySeverity(Severity);

    impl Arbitrary for AnySeverity {
        fn arbitrary(g: &mut Gen) -> Self {
            let options = [
                Severity::Low,
                Severity::Medium,
                Severity::High,
                Severity::Critical,
            ];
            AnySeverity(*g.choose(&options).unwrap_or(&Severity::Low))
        }
    }

    #[quickcheck]
    fn prop_priority_score_always_in_unit_range(boost: Boost, severity: AnySeverity) -> bool {
        let store = Arc::new(MemoryStore::new());
        let classifier = AlertClassifier::new(
            store.clone(),
            store,
            SeverityTables::default(),
            ClassifierConfig::default(),
        );
        classifier
            .create_rule(NewRule {
                name: "always".to_string(),
                pattern: ".".to_string(),
                category: "system".to_string(),
                severity: severity.0,
                priority_boost: boost.0,
                enabled: true,
            })
            .unwrap();

        let alert = classifier
            .classify(RawAlert {
                title: "anything at all".to_string(),
                description: String::new(),
                source: None,
                timestamp: None,
                metadata: Default::default(),
            })
            .unwrap();

        (0.0..=1.0).contains(&alert.priority_score)
    }
}
