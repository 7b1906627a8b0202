// Copyright (c) 2026 ledgerline.io
// SPDX-License-Identifier: AGPL-3.0

//! Case Lifecycle Application Service
//!
//! Orchestrates work item state transitions coordinating:
//! - Domain layer: WorkItem aggregate, lifecycle policy, clock
//! - Infrastructure layer: WorkItemRepository, EventBus
//!
//! Every handler follows the same shape: load, delegate the guarded
//! transition to the aggregate, save with a version check, then publish
//! the domain event. Events are only published after a successful save.

use crate::domain::actor::Actor;
use crate::domain::clock::Clock;
use crate::domain::events::CaseEvent;
use crate::domain::policy::LifecyclePolicy;
use crate::domain::repository::{RepositoryError, WorkItemRepository};
use crate::domain::risk::RiskLevel;
use crate::domain::work_item::{
    ApplicationId, CaseSnapshot, Comment, WorkItem, WorkItemError, WorkItemId,
};
use crate::infrastructure::event_bus::EventBus;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

// ============================================================================
// Operation Errors
// ============================================================================

/// Failure taxonomy exposed to callers of the application services
///
/// `Conflict` covers both duplicate applications and optimistic-lock
/// collisions; callers may retry conflicts, never guard violations.
#[derive(Debug, Error)]
pub enum OperationError {
    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Guard(#[from] WorkItemError),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl OperationError {
    /// Stable machine-readable code for the serialization boundary
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::Guard(_) => "guard_violation",
            Self::Conflict(_) => "conflict",
            Self::Validation(_) => "validation",
            Self::Storage(_) => "storage",
        }
    }
}

impl From<RepositoryError> for OperationError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(message) => Self::NotFound(message),
            RepositoryError::DuplicateApplication(_) => Self::Conflict(err.to_string()),
            RepositoryError::VersionConflict { .. } => Self::Conflict(err.to_string()),
            RepositoryError::Storage(message) => Self::Storage(message),
        }
    }
}

// ============================================================================
// Commands
// ============================================================================

/// Intake payload for opening a new compliance case
#[derive(Debug, Clone, PartialEq)]
pub struct CreateWorkItem {
    pub application_id: ApplicationId,
    pub applicant_name: String,
    pub entity_type: String,
    pub country: String,
    pub risk_level: RiskLevel,
}

// ============================================================================
// Service Trait
// ============================================================================

#[async_trait]
pub trait CaseLifecycleService: Send + Sync {
    /// Open a new work item for an onboarding application
    async fn create(
        &self,
        command: CreateWorkItem,
        actor: &Actor,
    ) -> Result<WorkItem, OperationError>;

    /// Assign or re-assign the work item to a reviewer
    async fn assign(
        &self,
        id: WorkItemId,
        assignee: &Actor,
        actor: &Actor,
    ) -> Result<WorkItem, OperationError>;

    /// Release the assignee and return the item to the intake queue
    async fn unassign(&self, id: WorkItemId, actor: &Actor) -> Result<WorkItem, OperationError>;

    /// Begin active review
    async fn start_review(&self, id: WorkItemId, actor: &Actor)
        -> Result<WorkItem, OperationError>;

    /// Route a high/critical risk case to an approver
    async fn submit_for_approval(
        &self,
        id: WorkItemId,
        notes: Option<String>,
        actor: &Actor,
    ) -> Result<WorkItem, OperationError>;

    /// Record the approval decision
    async fn approve(&self, id: WorkItemId, actor: &Actor) -> Result<WorkItem, OperationError>;

    /// Reject the case with a reason (terminal)
    async fn decline(
        &self,
        id: WorkItemId,
        reason: String,
        actor: &Actor,
    ) -> Result<WorkItem, OperationError>;

    /// Withdraw the case (terminal)
    async fn cancel(
        &self,
        id: WorkItemId,
        reason: Option<String>,
        actor: &Actor,
    ) -> Result<WorkItem, OperationError>;

    /// Resolve the case and schedule its periodic refresh
    async fn complete(&self, id: WorkItemId, actor: &Actor) -> Result<WorkItem, OperationError>;

    /// Pull a completed case back for re-verification
    async fn mark_for_refresh(
        &self,
        id: WorkItemId,
        actor: &Actor,
    ) -> Result<WorkItem, OperationError>;

    /// Attach a reviewer note
    async fn add_comment(
        &self,
        id: WorkItemId,
        text: String,
        author: &Actor,
    ) -> Result<Comment, OperationError>;

    /// Apply an updated risk classification from the risk service
    async fn reclassify_risk(
        &self,
        id: WorkItemId,
        risk_level: RiskLevel,
        actor: &Actor,
    ) -> Result<WorkItem, OperationError>;
}

// ============================================================================
// Standard Implementation
// ============================================================================

pub struct StandardCaseLifecycleService {
    repository: Arc<dyn WorkItemRepository>,
    event_bus: Arc<EventBus>,
    clock: Arc<dyn Clock>,
    policy: LifecyclePolicy,
}

impl StandardCaseLifecycleService {
    pub fn new(
        repository: Arc<dyn WorkItemRepository>,
        event_bus: Arc<EventBus>,
        clock: Arc<dyn Clock>,
        policy: LifecyclePolicy,
    ) -> Self {
        Self {
            repository,
            event_bus,
            clock,
            policy,
        }
    }

    async fn load(&self, id: WorkItemId) -> Result<WorkItem, OperationError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| OperationError::NotFound(format!("Work item {} not found", id)))
    }

    /// Save the aggregate and copy the advanced version back onto it
    async fn persist(&self, item: &mut WorkItem) -> Result<(), OperationError> {
        let version = self.repository.save(item).await?;
        item.version = version;
        Ok(())
    }
}

#[async_trait]
impl CaseLifecycleService for StandardCaseLifecycleService {
    async fn create(
        &self,
        command: CreateWorkItem,
        actor: &Actor,
    ) -> Result<WorkItem, OperationError> {
        if command.applicant_name.trim().is_empty() {
            return Err(OperationError::Validation(
                "Applicant name cannot be empty".to_string(),
            ));
        }

        info!(
            "Creating work item for application {} (risk: {:?})",
            command.application_id, command.risk_level
        );

        // One work item per application
        if self
            .repository
            .find_by_application_id(command.application_id)
            .await?
            .is_some()
        {
            return Err(OperationError::Conflict(format!(
                "A work item for application {} already exists",
                command.application_id
            )));
        }

        let number = self.repository.next_work_item_number().await?;
        let now = self.clock.now();

        let item = WorkItem::create(
            number,
            command.application_id,
            CaseSnapshot {
                applicant_name: command.applicant_name,
                entity_type: command.entity_type,
                country: command.country,
            },
            command.risk_level,
            actor,
            &self.policy,
            now,
        )?;

        // The storage index is authoritative; a concurrent create for the
        // same application surfaces here as a conflict.
        self.repository.add(&item).await?;

        self.event_bus.publish(CaseEvent::WorkItemCreated {
            work_item_id: item.id,
            work_item_number: item.work_item_number.as_str().to_string(),
            risk_level: item.risk_level,
            requires_approval: item.requires_approval,
            created_at: item.created_at,
        });

        info!(
            "Work item {} created (id: {}, due: {})",
            item.work_item_number, item.id, item.due_date
        );
        Ok(item)
    }

    async fn assign(
        &self,
        id: WorkItemId,
        assignee: &Actor,
        actor: &Actor,
    ) -> Result<WorkItem, OperationError> {
        info!("Assigning work item {} to {}", id, assignee.id);

        let mut item = self.load(id).await?;
        let now = self.clock.now();
        item.assign(assignee, actor, now)?;
        self.persist(&mut item).await?;

        self.event_bus.publish(CaseEvent::WorkItemAssigned {
            work_item_id: item.id,
            assignee_id: assignee.id.clone(),
            assignee_name: assignee.name.clone(),
            assigned_at: now,
        });
        Ok(item)
    }

    async fn unassign(&self, id: WorkItemId, actor: &Actor) -> Result<WorkItem, OperationError> {
        info!("Unassigning work item {}", id);

        let mut item = self.load(id).await?;
        let now = self.clock.now();
        item.unassign(actor, now)?;
        self.persist(&mut item).await?;

        self.event_bus.publish(CaseEvent::WorkItemUnassigned {
            work_item_id: item.id,
            unassigned_at: now,
        });
        Ok(item)
    }

    async fn start_review(
        &self,
        id: WorkItemId,
        actor: &Actor,
    ) -> Result<WorkItem, OperationError> {
        info!("Starting review on work item {}", id);

        let mut item = self.load(id).await?;
        let now = self.clock.now();
        item.start_review(actor, now)?;
        self.persist(&mut item).await?;

        self.event_bus.publish(CaseEvent::ReviewStarted {
            work_item_id: item.id,
            started_at: now,
        });
        Ok(item)
    }

    async fn submit_for_approval(
        &self,
        id: WorkItemId,
        notes: Option<String>,
        actor: &Actor,
    ) -> Result<WorkItem, OperationError> {
        info!("Submitting work item {} for approval", id);

        let mut item = self.load(id).await?;
        let now = self.clock.now();
        item.submit_for_approval(notes, actor, now)?;
        self.persist(&mut item).await?;

        self.event_bus.publish(CaseEvent::SubmittedForApproval {
            work_item_id: item.id,
            submitted_by: actor.id.clone(),
            submitted_at: now,
        });
        Ok(item)
    }

    async fn approve(&self, id: WorkItemId, actor: &Actor) -> Result<WorkItem, OperationError> {
        info!("Approving work item {} (approver: {})", id, actor.id);

        let mut item = self.load(id).await?;
        let now = self.clock.now();
        item.approve(actor, now)?;
        self.persist(&mut item).await?;

        self.event_bus.publish(CaseEvent::WorkItemApproved {
            work_item_id: item.id,
            approver_id: actor.id.clone(),
            approved_at: now,
        });
        Ok(item)
    }

    async fn decline(
        &self,
        id: WorkItemId,
        reason: String,
        actor: &Actor,
    ) -> Result<WorkItem, OperationError> {
        if reason.trim().is_empty() {
            return Err(OperationError::Validation(
                "Decline reason cannot be empty".to_string(),
            ));
        }

        info!("Declining work item {}: {}", id, reason);

        let mut item = self.load(id).await?;
        let now = self.clock.now();
        item.decline(reason.clone(), actor, now)?;
        self.persist(&mut item).await?;

        self.event_bus.publish(CaseEvent::WorkItemDeclined {
            work_item_id: item.id,
            reason,
            declined_at: now,
        });
        Ok(item)
    }

    async fn cancel(
        &self,
        id: WorkItemId,
        reason: Option<String>,
        actor: &Actor,
    ) -> Result<WorkItem, OperationError> {
        info!("Cancelling work item {}", id);

        let mut item = self.load(id).await?;
        let now = self.clock.now();
        item.cancel(reason, actor, now)?;
        self.persist(&mut item).await?;

        self.event_bus.publish(CaseEvent::WorkItemCancelled {
            work_item_id: item.id,
            cancelled_at: now,
        });
        Ok(item)
    }

    async fn complete(&self, id: WorkItemId, actor: &Actor) -> Result<WorkItem, OperationError> {
        info!("Completing work item {}", id);

        let mut item = self.load(id).await?;
        let now = self.clock.now();
        item.complete(actor, &self.policy, now)?;
        self.persist(&mut item).await?;

        self.event_bus.publish(CaseEvent::WorkItemCompleted {
            work_item_id: item.id,
            next_refresh_date: item.next_refresh_date,
            completed_at: now,
        });

        info!(
            "Work item {} completed (next refresh: {:?})",
            item.work_item_number, item.next_refresh_date
        );
        Ok(item)
    }

    async fn mark_for_refresh(
        &self,
        id: WorkItemId,
        actor: &Actor,
    ) -> Result<WorkItem, OperationError> {
        info!("Marking work item {} for refresh", id);

        let mut item = self.load(id).await?;
        let now = self.clock.now();
        item.mark_for_refresh(actor, now)?;
        self.persist(&mut item).await?;

        self.event_bus.publish(CaseEvent::MarkedForRefresh {
            work_item_id: item.id,
            refresh_count: item.refresh_count,
            marked_at: now,
        });
        Ok(item)
    }

    async fn add_comment(
        &self,
        id: WorkItemId,
        text: String,
        author: &Actor,
    ) -> Result<Comment, OperationError> {
        if text.trim().is_empty() {
            return Err(OperationError::Validation(
                "Comment text cannot be empty".to_string(),
            ));
        }

        debug!("Adding comment to work item {}", id);

        let mut item = self.load(id).await?;
        let now = self.clock.now();
        let comment = item.add_comment(text, author, now)?;
        self.persist(&mut item).await?;

        self.event_bus.publish(CaseEvent::CommentAdded {
            work_item_id: item.id,
            comment_id: comment.id,
            author_id: author.id.clone(),
            added_at: now,
        });
        Ok(comment)
    }

    async fn reclassify_risk(
        &self,
        id: WorkItemId,
        risk_level: RiskLevel,
        actor: &Actor,
    ) -> Result<WorkItem, OperationError> {
        info!(
            "Reclassifying work item {} to {:?} (actor: {})",
            id, risk_level, actor.id
        );

        let mut item = self.load(id).await?;
        let previous = item.risk_level;
        let now = self.clock.now();
        item.reclassify_risk(risk_level, now)?;
        self.persist(&mut item).await?;

        self.event_bus.publish(CaseEvent::RiskReclassified {
            work_item_id: item.id,
            previous,
            current: risk_level,
            reclassified_at: now,
        });
        Ok(item)
    }
}

// ============================================================================
// Tests
// ============================================================================
