//! Serialization boundary for external callers
//!
//! Statuses cross this boundary as SCREAMING_SNAKE string codes and every
//! operation outcome is wrapped in the `OperationResult` envelope. Inside
//! the engine only the typed enums exist.

use crate::application::commands::OperationError;
use crate::domain::risk::{Priority, RiskLevel};
use crate::domain::work_item::{WorkItem, WorkItemStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Status Codes
// ============================================================================

/// External string code for a status
pub fn status_code(status: WorkItemStatus) -> &'static str {
    match status {
        WorkItemStatus::New => "NEW",
        WorkItemStatus::Assigned => "ASSIGNED",
        WorkItemStatus::InProgress => "IN_PROGRESS",
        WorkItemStatus::PendingApproval => "PENDING_APPROVAL",
        WorkItemStatus::Approved => "APPROVED",
        WorkItemStatus::Completed => "COMPLETED",
        WorkItemStatus::Declined => "DECLINED",
        WorkItemStatus::Cancelled => "CANCELLED",
        WorkItemStatus::DueForRefresh => "DUE_FOR_REFRESH",
    }
}

#[derive(Debug, Error)]
#[error("Unknown work item status: {0}")]
pub struct StatusParseError(pub String);

/// Parse an external status code back into the enum
pub fn parse_status(code: &str) -> Result<WorkItemStatus, StatusParseError> {
    match code {
        "NEW" => Ok(WorkItemStatus::New),
        "ASSIGNED" => Ok(WorkItemStatus::Assigned),
        "IN_PROGRESS" => Ok(WorkItemStatus::InProgress),
        "PENDING_APPROVAL" => Ok(WorkItemStatus::PendingApproval),
        "APPROVED" => Ok(WorkItemStatus::Approved),
        "COMPLETED" => Ok(WorkItemStatus::Completed),
        "DECLINED" => Ok(WorkItemStatus::Declined),
        "CANCELLED" => Ok(WorkItemStatus::Cancelled),
        "DUE_FOR_REFRESH" => Ok(WorkItemStatus::DueForRefresh),
        other => Err(StatusParseError(other.to_string())),
    }
}

// ============================================================================
// Result Envelope
// ============================================================================

/// Uniform response envelope for all engine operations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationResult<T> {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<T>,
}

impl<T> OperationResult<T> {
    pub fn ok(payload: T) -> Self {
        Self {
            success: true,
            error_message: None,
            error_code: None,
            payload: Some(payload),
        }
    }

    pub fn failure(error: &OperationError) -> Self {
        Self {
            success: false,
            error_message: Some(error.to_string()),
            error_code: Some(error.code().to_string()),
            payload: None,
        }
    }
}

impl<T> From<Result<T, OperationError>> for OperationResult<T> {
    fn from(result: Result<T, OperationError>) -> Self {
        match result {
            Ok(payload) => Self::ok(payload),
            Err(error) => Self::failure(&error),
        }
    }
}

// ============================================================================
// Views
// ============================================================================

/// Work item summary handed to external callers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkItemView {
    pub id: String,
    pub work_item_number: String,
    pub application_id: String,
    pub applicant_name: String,
    pub entity_type: String,
    pub country: String,
    pub risk_level: RiskLevel,
    pub priority: Priority,
    pub status: String,
    pub assigned_to: Option<String>,
    pub assigned_to_name: Option<String>,
    pub requires_approval: bool,
    pub due_date: DateTime<Utc>,
    /// Computed against the supplied evaluation time
    pub is_overdue: bool,
    pub next_refresh_date: Option<DateTime<Utc>>,
    pub refresh_count: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: u64,
}

impl WorkItemView {
    pub fn from_item(item: &WorkItem, now: DateTime<Utc>) -> Self {
        Self {
            id: item.id.to_string(),
            work_item_number: item.work_item_number.as_str().to_string(),
            application_id: item.application_id.to_string(),
            applicant_name: item.applicant_name.clone(),
            entity_type: item.entity_type.clone(),
            country: item.country.clone(),
            risk_level: item.risk_level,
            priority: item.priority,
            status: status_code(item.status).to_string(),
            assigned_to: item.assigned_to.clone(),
            assigned_to_name: item.assigned_to_name.clone(),
            requires_approval: item.requires_approval,
            due_date: item.due_date,
            is_overdue: item.is_overdue(now),
            next_refresh_date: item.next_refresh_date,
            refresh_count: item.refresh_count,
            created_at: item.created_at,
            updated_at: item.updated_at,
            version: item.version,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::actor::Actor;
    use crate::domain::policy::LifecyclePolicy;
    use crate::domain::work_item::{ApplicationId, CaseSnapshot, WorkItemNumber};
    use chrono::{Duration, TimeZone};

    const ALL_STATUSES: [WorkItemStatus; 9] = [
        WorkItemStatus::New,
        WorkItemStatus::Assigned,
        WorkItemStatus::InProgress,
        WorkItemStatus::PendingApproval,
        WorkItemStatus::Approved,
        WorkItemStatus::Completed,
        WorkItemStatus::Declined,
        WorkItemStatus::Cancelled,
        WorkItemStatus::DueForRefresh,
    ];

    #[test]
    fn test_every_status_round_trips() {
        for status in ALL_STATUSES {
            let code = status_code(status);
            assert_eq!(parse_status(code).unwrap(), status);
        }
    }

    #[test]
    fn test_unknown_code_is_rejected() {
        let err = parse_status("ARCHIVED").unwrap_err();
        assert!(err.to_string().contains("ARCHIVED"));
    }

    #[test]
    fn test_success_envelope_shape() {
        let result: OperationResult<u32> = OperationResult::ok(7);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["payload"], 7);
        assert!(json.get("errorMessage").is_none());
    }

    #[test]
    fn test_failure_envelope_shape() {
        let error = OperationError::NotFound("Work item missing".to_string());
        let result: OperationResult<u32> = Err(error).into();
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["errorMessage"], "Work item missing");
        assert_eq!(json["errorCode"], "not_found");
        assert!(json.get("payload").is_none());
    }

    #[test]
    fn test_view_reports_overdue_with_status_code() {
        let created = Utc.with_ymd_and_hms(2026, 2, 10, 9, 0, 0).unwrap();
        let mut item = WorkItem::create(
            WorkItemNumber::from_sequence(9),
            ApplicationId::new(),
            CaseSnapshot {
                applicant_name: "Acme GmbH".to_string(),
                entity_type: "limited_company".to_string(),
                country: "DE".to_string(),
            },
            RiskLevel::High,
            &Actor::system(),
            &LifecyclePolicy::default(),
            created,
        )
        .unwrap();
        item.assign(&Actor::system(), &Actor::system(), created).unwrap();
        item.start_review(&Actor::system(), created).unwrap();

        let past_due = item.due_date + Duration::days(1);
        let view = WorkItemView::from_item(&item, past_due);

        assert_eq!(view.status, "IN_PROGRESS");
        assert!(view.is_overdue);
        assert_eq!(view.work_item_number, "WI-000009");

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["workItemNumber"], "WI-000009");
        assert_eq!(json["isOverdue"], true);
    }
}
