// Copyright (c) 2026 ledgerline.io
// SPDX-License-Identifier: AGPL-3.0

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::risk::RiskLevel;
use crate::domain::work_item::WorkItemId;

/// Domain events emitted after successful lifecycle transitions
///
/// Published on the in-process event bus once the repository save has
/// succeeded, so subscribers only ever observe persisted state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CaseEvent {
    WorkItemCreated {
        work_item_id: WorkItemId,
        work_item_number: String,
        risk_level: RiskLevel,
        requires_approval: bool,
        created_at: DateTime<Utc>,
    },
    WorkItemAssigned {
        work_item_id: WorkItemId,
        assignee_id: String,
        assignee_name: String,
        assigned_at: DateTime<Utc>,
    },
    WorkItemUnassigned {
        work_item_id: WorkItemId,
        unassigned_at: DateTime<Utc>,
    },
    ReviewStarted {
        work_item_id: WorkItemId,
        started_at: DateTime<Utc>,
    },
    SubmittedForApproval {
        work_item_id: WorkItemId,
        submitted_by: String,
        submitted_at: DateTime<Utc>,
    },
    WorkItemApproved {
        work_item_id: WorkItemId,
        approver_id: String,
        approved_at: DateTime<Utc>,
    },
    WorkItemDeclined {
        work_item_id: WorkItemId,
        reason: String,
        declined_at: DateTime<Utc>,
    },
    WorkItemCompleted {
        work_item_id: WorkItemId,
        next_refresh_date: Option<DateTime<Utc>>,
        completed_at: DateTime<Utc>,
    },
    WorkItemCancelled {
        work_item_id: WorkItemId,
        cancelled_at: DateTime<Utc>,
    },
    CommentAdded {
        work_item_id: WorkItemId,
        comment_id: Uuid,
        author_id: String,
        added_at: DateTime<Utc>,
    },
    RiskReclassified {
        work_item_id: WorkItemId,
        previous: RiskLevel,
        current: RiskLevel,
        reclassified_at: DateTime<Utc>,
    },
    MarkedForRefresh {
        work_item_id: WorkItemId,
        refresh_count: u32,
        marked_at: DateTime<Utc>,
    },
}

impl CaseEvent {
    /// Work item the event belongs to; used by filtered subscriptions
    pub fn work_item_id(&self) -> WorkItemId {
        match self {
            Self::WorkItemCreated { work_item_id, .. }
            | Self::WorkItemAssigned { work_item_id, .. }
            | Self::WorkItemUnassigned { work_item_id, .. }
            | Self::ReviewStarted { work_item_id, .. }
            | Self::SubmittedForApproval { work_item_id, .. }
            | Self::WorkItemApproved { work_item_id, .. }
            | Self::WorkItemDeclined { work_item_id, .. }
            | Self::WorkItemCompleted { work_item_id, .. }
            | Self::WorkItemCancelled { work_item_id, .. }
            | Self::CommentAdded { work_item_id, .. }
            | Self::RiskReclassified { work_item_id, .. }
            | Self::MarkedForRefresh { work_item_id, .. } => *work_item_id,
        }
    }

    /// Short label for structured logging
    pub fn kind(&self) -> &'static str {
        match self {
            Self::WorkItemCreated { .. } => "work_item_created",
            Self::WorkItemAssigned { .. } => "work_item_assigned",
            Self::WorkItemUnassigned { .. } => "work_item_unassigned",
            Self::ReviewStarted { .. } => "review_started",
            Self::SubmittedForApproval { .. } => "submitted_for_approval",
            Self::WorkItemApproved { .. } => "work_item_approved",
            Self::WorkItemDeclined { .. } => "work_item_declined",
            Self::WorkItemCompleted { .. } => "work_item_completed",
            Self::WorkItemCancelled { .. } => "work_item_cancelled",
            Self::CommentAdded { .. } => "comment_added",
            Self::RiskReclassified { .. } => "risk_reclassified",
            Self::MarkedForRefresh { .. } => "marked_for_refresh",
        }
    }
}
