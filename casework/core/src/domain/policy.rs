// Copyright (c) 2026 ledgerline.io
// SPDX-License-Identifier: AGPL-3.0

use chrono::{DateTime, Duration, Months, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::risk::RiskLevel;

/// Resolution deadline (SLA) in days, keyed by risk level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlaPolicy {
    pub low_days: i64,
    pub medium_days: i64,
    pub high_days: i64,
    pub critical_days: i64,
    pub unknown_days: i64,
}

impl SlaPolicy {
    pub fn days_for(&self, risk: RiskLevel) -> i64 {
        match risk {
            RiskLevel::Low => self.low_days,
            RiskLevel::Medium => self.medium_days,
            RiskLevel::High => self.high_days,
            RiskLevel::Critical => self.critical_days,
            RiskLevel::Unknown => self.unknown_days,
        }
    }
}

impl Default for SlaPolicy {
    fn default() -> Self {
        Self {
            low_days: 30,
            medium_days: 14,
            high_days: 7,
            critical_days: 3,
            unknown_days: 14,
        }
    }
}

/// Periodic re-verification cycle in months, keyed by risk level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefreshPolicy {
    pub low_months: u32,
    pub medium_months: u32,
    pub high_months: u32,
    pub critical_months: u32,
    pub unknown_months: u32,
}

impl RefreshPolicy {
    pub fn months_for(&self, risk: RiskLevel) -> u32 {
        match risk {
            RiskLevel::Low => self.low_months,
            RiskLevel::Medium => self.medium_months,
            RiskLevel::High => self.high_months,
            RiskLevel::Critical => self.critical_months,
            RiskLevel::Unknown => self.unknown_months,
        }
    }
}

impl Default for RefreshPolicy {
    fn default() -> Self {
        Self {
            low_months: 36,
            medium_months: 24,
            high_months: 12,
            critical_months: 6,
            unknown_months: 12,
        }
    }
}

/// Time-based obligations applied to work items.
///
/// Defaults match the operator's standing compliance schedule; deployments
/// override individual fields through the engine configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecyclePolicy {
    pub sla: SlaPolicy,
    pub refresh: RefreshPolicy,
}

impl LifecyclePolicy {
    /// Resolution deadline for a case created at `created_at`.
    pub fn due_date_from(&self, risk: RiskLevel, created_at: DateTime<Utc>) -> DateTime<Utc> {
        created_at + Duration::days(self.sla.days_for(risk))
    }

    /// Next re-verification date for a case completed at `completed_at`.
    pub fn next_refresh_from(&self, risk: RiskLevel, completed_at: DateTime<Utc>) -> DateTime<Utc> {
        completed_at + Months::new(self.refresh.months_for(risk))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_default_sla_days() {
        let policy = SlaPolicy::default();
        assert_eq!(policy.days_for(RiskLevel::Low), 30);
        assert_eq!(policy.days_for(RiskLevel::Medium), 14);
        assert_eq!(policy.days_for(RiskLevel::High), 7);
        assert_eq!(policy.days_for(RiskLevel::Critical), 3);
        assert_eq!(policy.days_for(RiskLevel::Unknown), 14);
    }

    #[test]
    fn test_default_refresh_months() {
        let policy = RefreshPolicy::default();
        assert_eq!(policy.months_for(RiskLevel::Low), 36);
        assert_eq!(policy.months_for(RiskLevel::Medium), 24);
        assert_eq!(policy.months_for(RiskLevel::High), 12);
        assert_eq!(policy.months_for(RiskLevel::Critical), 6);
        assert_eq!(policy.months_for(RiskLevel::Unknown), 12);
    }

    #[test]
    fn test_due_date_computation() {
        let policy = LifecyclePolicy::default();
        let created_at = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();

        let due = policy.due_date_from(RiskLevel::Critical, created_at);
        assert_eq!(due, created_at + Duration::days(3));

        let due = policy.due_date_from(RiskLevel::Low, created_at);
        assert_eq!(due, created_at + Duration::days(30));
    }

    #[test]
    fn test_next_refresh_computation() {
        let policy = LifecyclePolicy::default();
        let completed_at = Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap();

        let next = policy.next_refresh_from(RiskLevel::Critical, completed_at);
        assert_eq!(next, Utc.with_ymd_and_hms(2026, 7, 15, 12, 0, 0).unwrap());

        let next = policy.next_refresh_from(RiskLevel::Low, completed_at);
        assert_eq!(next, Utc.with_ymd_and_hms(2029, 1, 15, 12, 0, 0).unwrap());
    }

    #[test]
    fn test_partial_yaml_override_keeps_defaults() {
        let yaml = "sla:\n  critical_days: 2\n";
        let policy: LifecyclePolicy = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(policy.sla.critical_days, 2);
        assert_eq!(policy.sla.low_days, 30);
        assert_eq!(policy.refresh, RefreshPolicy::default());
    }
}
