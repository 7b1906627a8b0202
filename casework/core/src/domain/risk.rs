use serde::{Deserialize, Serialize};

/// Risk classification assigned to a compliance case.
///
/// Supplied by the Risk Service at creation and overwritten by its
/// reclassification path later. Variant order defines the ordinal used for
/// minimum-risk filtering: `Unknown < Low < Medium < High < Critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Unknown,
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// High and Critical cases must pass through the approval gate.
    pub fn requires_approval(&self) -> bool {
        matches!(self, Self::High | Self::Critical)
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Unknown => "unknown",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        };
        write!(f, "{}", s)
    }
}

/// Queue-ordering priority, derived once from the risk level at creation.
///
/// Advisory only: used by query ordering, never consulted by a transition
/// guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub fn from_risk(risk: RiskLevel) -> Self {
        match risk {
            RiskLevel::Low => Self::Low,
            RiskLevel::Medium | RiskLevel::Unknown => Self::Medium,
            RiskLevel::High => Self::High,
            RiskLevel::Critical => Self::Urgent,
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risk_ordinal_ordering() {
        assert!(RiskLevel::Unknown < RiskLevel::Low);
        assert!(RiskLevel::Low < RiskLevel::Medium);
        assert!(RiskLevel::Medium < RiskLevel::High);
        assert!(RiskLevel::High < RiskLevel::Critical);
    }

    #[test]
    fn test_approval_threshold() {
        assert!(!RiskLevel::Unknown.requires_approval());
        assert!(!RiskLevel::Low.requires_approval());
        assert!(!RiskLevel::Medium.requires_approval());
        assert!(RiskLevel::High.requires_approval());
        assert!(RiskLevel::Critical.requires_approval());
    }

    #[test]
    fn test_priority_from_risk() {
        assert_eq!(Priority::from_risk(RiskLevel::Low), Priority::Low);
        assert_eq!(Priority::from_risk(RiskLevel::Medium), Priority::Medium);
        assert_eq!(Priority::from_risk(RiskLevel::Unknown), Priority::Medium);
        assert_eq!(Priority::from_risk(RiskLevel::High), Priority::High);
        assert_eq!(Priority::from_risk(RiskLevel::Critical), Priority::Urgent);
    }

    #[test]
    fn test_priority_ordering_for_queues() {
        let mut priorities = vec![Priority::Medium, Priority::Urgent, Priority::Low, Priority::High];
        priorities.sort_by(|a, b| b.cmp(a));
        assert_eq!(
            priorities,
            vec![Priority::Urgent, Priority::High, Priority::Medium, Priority::Low]
        );
    }
}
