// Copyright (c) 2026 ledgerline.io
// SPDX-License-Identifier: AGPL-3.0

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::actor::Actor;
use crate::domain::policy::LifecyclePolicy;
use crate::domain::risk::{Priority, RiskLevel};

// ============================================================================
// Value Objects
// ============================================================================

/// Unique identifier for a work item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkItemId(pub Uuid);

impl WorkItemId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl Default for WorkItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for WorkItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of the originating onboarding application
///
/// At most one work item exists per application; the repository's `add`
/// enforces the uniqueness at the storage boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApplicationId(pub Uuid);

impl ApplicationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl std::fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Human-readable display number, allocated sequentially by the repository
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkItemNumber(pub String);

impl WorkItemNumber {
    pub fn from_sequence(sequence: u64) -> Self {
        Self(format!("WI-{:06}", sequence))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for WorkItemNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Work item status lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkItemStatus {
    /// Created, awaiting assignment
    New,
    /// Owned by a reviewer, review not yet started
    Assigned,
    /// Under active review
    InProgress,
    /// Submitted to an approver (high/critical risk only)
    PendingApproval,
    /// Approved, awaiting completion bookkeeping
    Approved,
    /// Resolved; periodic refresh schedule armed
    Completed,
    /// Rejected with a reason (terminal)
    Declined,
    /// Withdrawn (terminal)
    Cancelled,
    /// Completed case pulled back for periodic re-verification
    DueForRefresh,
}

impl WorkItemStatus {
    /// Declined and Cancelled permit no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Declined | Self::Cancelled)
    }

    /// Assignment is valid for fresh items, re-assignment, and refresh re-entry.
    pub fn can_assign(&self) -> bool {
        matches!(self, Self::New | Self::Assigned | Self::DueForRefresh)
    }

    pub fn can_unassign(&self) -> bool {
        matches!(self, Self::Assigned | Self::InProgress)
    }

    pub fn can_start_review(&self) -> bool {
        matches!(self, Self::Assigned)
    }

    pub fn can_submit_for_approval(&self) -> bool {
        matches!(self, Self::InProgress)
    }

    pub fn can_approve(&self) -> bool {
        matches!(self, Self::PendingApproval)
    }

    pub fn can_mark_for_refresh(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

/// Descriptive fields copied from the application at creation.
///
/// Pure snapshot: never re-synchronized when the application changes later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseSnapshot {
    pub applicant_name: String,
    pub entity_type: String,
    pub country: String,
}

/// Single audit-trail entry, appended by successful transitions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: Uuid,
    /// Action label, e.g. "Created", "Submitted for approval"
    pub action: String,
    /// Id of the actor who triggered the transition
    pub performed_by: String,
    pub performed_at: DateTime<Utc>,
    /// Status after the transition was applied
    pub status_at_event: WorkItemStatus,
}

/// Reviewer note attached to a work item, independent of status transitions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub text: String,
    pub author_id: String,
    pub author_name: String,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Aggregate Root: WorkItem
// ============================================================================

/// Work item aggregate root
///
/// Represents one compliance case moving through intake, assignment, review,
/// conditional approval, completion/decline, and periodic refresh. All state
/// changes go through the guarded transition methods below; the embedded
/// history and comment logs are append-only and only reachable as slices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkItem {
    /// Unique work item identifier
    pub id: WorkItemId,

    /// Display number, e.g. "WI-000042"
    pub work_item_number: WorkItemNumber,

    /// Originating application (one work item per application)
    pub application_id: ApplicationId,

    /// Applicant display name (snapshot)
    pub applicant_name: String,

    /// Entity type label, e.g. "limited_company" (snapshot)
    pub entity_type: String,

    /// ISO country code of the applicant (snapshot)
    pub country: String,

    /// Current risk classification
    pub risk_level: RiskLevel,

    /// Queue-ordering priority derived from risk at creation
    pub priority: Priority,

    /// Current lifecycle status
    pub status: WorkItemStatus,

    /// Id of the current assignee
    pub assigned_to: Option<String>,

    /// Display name of the current assignee
    pub assigned_to_name: Option<String>,

    /// When the current assignee took ownership
    pub assigned_at: Option<DateTime<Utc>>,

    /// Whether the approval gate applies (fixed at creation)
    pub requires_approval: bool,

    /// Id of the approver
    pub approved_by: Option<String>,

    /// Display name of the approver
    pub approved_by_name: Option<String>,

    /// When approval was granted
    pub approved_at: Option<DateTime<Utc>>,

    /// Reason recorded by decline (or cancel, when given)
    pub rejection_reason: Option<String>,

    /// Notes stored when submitting for approval
    pub submission_notes: Option<String>,

    /// Resolution deadline computed at creation
    pub due_date: DateTime<Utc>,

    /// Next scheduled re-verification, armed by completion
    pub next_refresh_date: Option<DateTime<Utc>>,

    /// When the item last entered the refresh path
    pub last_refreshed_at: Option<DateTime<Utc>>,

    /// Number of refresh cycles entered so far
    pub refresh_count: u32,

    /// Creation timestamp (immutable)
    pub created_at: DateTime<Utc>,

    /// Bumped by every mutating transition
    pub updated_at: DateTime<Utc>,

    /// Storage concurrency token, advanced by the repository on save
    pub version: u64,

    history: Vec<HistoryEntry>,
    comments: Vec<Comment>,
}

impl WorkItem {
    /// Create a new work item (aggregate factory method)
    ///
    /// Computes the due date and the approval requirement from the risk
    /// level and appends the "Created" history entry.
    pub fn create(
        number: WorkItemNumber,
        application_id: ApplicationId,
        snapshot: CaseSnapshot,
        risk_level: RiskLevel,
        actor: &Actor,
        policy: &LifecyclePolicy,
        now: DateTime<Utc>,
    ) -> Result<Self, WorkItemError> {
        if snapshot.applicant_name.trim().is_empty() {
            return Err(WorkItemError::InvalidInput(
                "Applicant name cannot be empty".to_string(),
            ));
        }

        let mut item = Self {
            id: WorkItemId::new(),
            work_item_number: number,
            application_id,
            applicant_name: snapshot.applicant_name,
            entity_type: snapshot.entity_type,
            country: snapshot.country,
            risk_level,
            priority: Priority::from_risk(risk_level),
            status: WorkItemStatus::New,
            assigned_to: None,
            assigned_to_name: None,
            assigned_at: None,
            requires_approval: risk_level.requires_approval(),
            approved_by: None,
            approved_by_name: None,
            approved_at: None,
            rejection_reason: None,
            submission_notes: None,
            due_date: policy.due_date_from(risk_level, now),
            next_refresh_date: None,
            last_refreshed_at: None,
            refresh_count: 0,
            created_at: now,
            updated_at: now,
            version: 1,
            history: Vec::new(),
            comments: Vec::new(),
        };

        item.record("Created", actor, now);
        Ok(item)
    }

    // ========================================================================
    // Aggregate Commands (State Mutations)
    // ========================================================================

    /// Assign or re-assign the item to a reviewer
    pub fn assign(
        &mut self,
        assignee: &Actor,
        actor: &Actor,
        now: DateTime<Utc>,
    ) -> Result<(), WorkItemError> {
        if !self.status.can_assign() {
            return Err(WorkItemError::InvalidStateTransition {
                from: self.status,
                to: WorkItemStatus::Assigned,
            });
        }

        self.assigned_to = Some(assignee.id.clone());
        self.assigned_to_name = Some(assignee.name.clone());
        self.assigned_at = Some(now);
        self.status = WorkItemStatus::Assigned;
        self.record("Assigned", actor, now);
        Ok(())
    }

    /// Release the current assignee and return the item to the intake queue
    pub fn unassign(&mut self, actor: &Actor, now: DateTime<Utc>) -> Result<(), WorkItemError> {
        if !self.status.can_unassign() {
            return Err(WorkItemError::InvalidStateTransition {
                from: self.status,
                to: WorkItemStatus::New,
            });
        }
        if self.assigned_to.is_none() {
            return Err(WorkItemError::NoAssignee);
        }

        self.assigned_to = None;
        self.assigned_to_name = None;
        self.assigned_at = None;
        self.status = WorkItemStatus::New;
        self.record("Unassigned", actor, now);
        Ok(())
    }

    /// Begin active review
    pub fn start_review(&mut self, actor: &Actor, now: DateTime<Utc>) -> Result<(), WorkItemError> {
        if !self.status.can_start_review() {
            return Err(WorkItemError::InvalidStateTransition {
                from: self.status,
                to: WorkItemStatus::InProgress,
            });
        }

        self.status = WorkItemStatus::InProgress;
        self.record("Review started", actor, now);
        Ok(())
    }

    /// Hand the case to an approver (high/critical risk only)
    pub fn submit_for_approval(
        &mut self,
        notes: Option<String>,
        actor: &Actor,
        now: DateTime<Utc>,
    ) -> Result<(), WorkItemError> {
        if !self.status.can_submit_for_approval() {
            return Err(WorkItemError::InvalidStateTransition {
                from: self.status,
                to: WorkItemStatus::PendingApproval,
            });
        }
        if !self.requires_approval {
            return Err(WorkItemError::ApprovalNotRequired);
        }

        self.submission_notes = notes;
        self.status = WorkItemStatus::PendingApproval;
        self.record("Submitted for approval", actor, now);
        Ok(())
    }

    /// Record the approver's decision to accept the case
    pub fn approve(&mut self, actor: &Actor, now: DateTime<Utc>) -> Result<(), WorkItemError> {
        if !self.status.can_approve() {
            return Err(WorkItemError::InvalidStateTransition {
                from: self.status,
                to: WorkItemStatus::Approved,
            });
        }
        if !self.requires_approval {
            return Err(WorkItemError::ApprovalNotRequired);
        }

        self.approved_by = Some(actor.id.clone());
        self.approved_by_name = Some(actor.name.clone());
        self.approved_at = Some(now);
        self.status = WorkItemStatus::Approved;
        self.record("Approved", actor, now);
        Ok(())
    }

    /// Reject the case with a reason (terminal)
    ///
    /// Valid from any non-terminal state, not just PendingApproval: reviewers
    /// can decline on document grounds before the approval gate.
    pub fn decline(
        &mut self,
        reason: impl Into<String>,
        actor: &Actor,
        now: DateTime<Utc>,
    ) -> Result<(), WorkItemError> {
        if self.status.is_terminal() {
            return Err(WorkItemError::Terminal(self.status));
        }
        let reason = reason.into();
        if reason.trim().is_empty() {
            return Err(WorkItemError::InvalidInput(
                "Decline reason cannot be empty".to_string(),
            ));
        }

        self.rejection_reason = Some(reason);
        self.status = WorkItemStatus::Declined;
        self.record("Declined", actor, now);
        Ok(())
    }

    /// Withdraw the case (terminal)
    pub fn cancel(
        &mut self,
        reason: Option<String>,
        actor: &Actor,
        now: DateTime<Utc>,
    ) -> Result<(), WorkItemError> {
        if self.status.is_terminal() {
            return Err(WorkItemError::Terminal(self.status));
        }

        if let Some(reason) = reason {
            self.rejection_reason = Some(reason);
        }
        self.status = WorkItemStatus::Cancelled;
        self.record("Cancelled", actor, now);
        Ok(())
    }

    /// Resolve the case and arm the periodic refresh schedule
    ///
    /// Fast path from InProgress when no approval is required; otherwise only
    /// from Approved.
    pub fn complete(
        &mut self,
        actor: &Actor,
        policy: &LifecyclePolicy,
        now: DateTime<Utc>,
    ) -> Result<(), WorkItemError> {
        match self.status {
            WorkItemStatus::InProgress if !self.requires_approval => {}
            WorkItemStatus::InProgress => return Err(WorkItemError::ApprovalRequired),
            WorkItemStatus::Approved => {}
            from => {
                return Err(WorkItemError::InvalidStateTransition {
                    from,
                    to: WorkItemStatus::Completed,
                });
            }
        }

        self.next_refresh_date = Some(policy.next_refresh_from(self.risk_level, now));
        self.status = WorkItemStatus::Completed;
        self.record("Completed", actor, now);
        Ok(())
    }

    /// Pull a completed case back into the review queue for re-verification
    ///
    /// Clears the refresh date; the next completion re-arms it. The same
    /// aggregate is reused for every refresh cycle, re-entering via `assign`.
    pub fn mark_for_refresh(
        &mut self,
        actor: &Actor,
        now: DateTime<Utc>,
    ) -> Result<(), WorkItemError> {
        if !self.status.can_mark_for_refresh() {
            return Err(WorkItemError::InvalidStateTransition {
                from: self.status,
                to: WorkItemStatus::DueForRefresh,
            });
        }

        self.refresh_count += 1;
        self.last_refreshed_at = Some(now);
        self.next_refresh_date = None;
        self.status = WorkItemStatus::DueForRefresh;
        self.record("Marked for refresh", actor, now);
        Ok(())
    }

    /// Append a reviewer note; no status change and no history entry
    pub fn add_comment(
        &mut self,
        text: impl Into<String>,
        author: &Actor,
        now: DateTime<Utc>,
    ) -> Result<Comment, WorkItemError> {
        if self.status.is_terminal() {
            return Err(WorkItemError::Terminal(self.status));
        }
        let text = text.into();
        if text.trim().is_empty() {
            return Err(WorkItemError::InvalidInput(
                "Comment text cannot be empty".to_string(),
            ));
        }

        let comment = Comment {
            id: Uuid::new_v4(),
            text,
            author_id: author.id.clone(),
            author_name: author.name.clone(),
            created_at: now,
        };
        self.comments.push(comment.clone());
        self.updated_at = now;
        Ok(comment)
    }

    /// Overwrite the risk classification (Risk Service reclassification path)
    ///
    /// Deliberately outside the transition table: no history entry, and the
    /// approval requirement and due date stay as fixed at creation.
    pub fn reclassify_risk(
        &mut self,
        risk_level: RiskLevel,
        now: DateTime<Utc>,
    ) -> Result<(), WorkItemError> {
        if self.status.is_terminal() {
            return Err(WorkItemError::Terminal(self.status));
        }

        self.risk_level = risk_level;
        self.updated_at = now;
        Ok(())
    }

    fn record(&mut self, action: &str, actor: &Actor, now: DateTime<Utc>) {
        self.history.push(HistoryEntry {
            id: Uuid::new_v4(),
            action: action.to_string(),
            performed_by: actor.id.clone(),
            performed_at: now,
            status_at_event: self.status,
        });
        self.updated_at = now;
    }

    // ========================================================================
    // Aggregate Queries (State Inspection)
    // ========================================================================

    /// Audit trail in creation order
    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// Comments in creation order
    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    /// Derived deadline predicate; never stored
    ///
    /// An item is overdue once its due date has passed, unless it already
    /// reached Approved or Completed.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.due_date < now
            && !matches!(
                self.status,
                WorkItemStatus::Approved | WorkItemStatus::Completed
            )
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Case-insensitive free-text match across the searchable fields
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.work_item_number.as_str().to_lowercase().contains(&term)
            || self.applicant_name.to_lowercase().contains(&term)
            || self.entity_type.to_lowercase().contains(&term)
            || self.country.to_lowercase().contains(&term)
            || self.application_id.to_string().to_lowercase().contains(&term)
            || self
                .assigned_to_name
                .as_deref()
                .map(|name| name.to_lowercase().contains(&term))
                .unwrap_or(false)
    }
}

// ============================================================================
// Domain Errors
// ============================================================================

#[derive(Debug, Error)]
pub enum WorkItemError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid state transition from {from:?} to {to:?}")]
    InvalidStateTransition {
        from: WorkItemStatus,
        to: WorkItemStatus,
    },

    #[error("Work item is in terminal state {0:?}")]
    Terminal(WorkItemStatus),

    #[error("Work item has no assignee")]
    NoAssignee,

    #[error("Approval is required before completion")]
    ApprovalRequired,

    #[error("Work item does not require approval")]
    ApprovalNotRequired,
}

// ============================================================================
// Tests
// ============================================================================
