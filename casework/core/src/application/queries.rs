//! Read-side application service
//!
//! Queries never mutate aggregates and never publish events. Sorting and
//! pagination happen here so every repository implementation stays a plain
//! collection scan.

use crate::application::commands::OperationError;
use crate::domain::clock::Clock;
use crate::domain::repository::{Page, PageRequest, WorkItemFilter, WorkItemRepository};
use crate::domain::risk::RiskLevel;
use crate::domain::work_item::{ApplicationId, Comment, HistoryEntry, WorkItem, WorkItemId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::debug;

// ============================================================================
// Service Trait
// ============================================================================

#[async_trait]
pub trait CaseQueryService: Send + Sync {
    /// Fetch one work item by id
    async fn get(&self, id: WorkItemId) -> Result<WorkItem, OperationError>;

    /// Fetch the work item opened for an application
    async fn get_by_application(
        &self,
        application_id: ApplicationId,
    ) -> Result<WorkItem, OperationError>;

    /// Filtered listing, newest first, paginated
    async fn list(
        &self,
        filter: &WorkItemFilter,
        page: PageRequest,
    ) -> Result<Page<WorkItem>, OperationError>;

    /// Approval queue: highest priority first, oldest first within a priority
    async fn pending_approvals(
        &self,
        risk_level: Option<RiskLevel>,
    ) -> Result<Vec<WorkItem>, OperationError>;

    /// Items due for periodic re-verification as of the given instant
    /// (defaults to now), including items already marked DueForRefresh
    async fn due_for_refresh(
        &self,
        as_of: Option<DateTime<Utc>>,
    ) -> Result<Vec<WorkItem>, OperationError>;

    /// Personal queue for a reviewer, newest first
    async fn my_work_items(&self, assignee_id: &str) -> Result<Vec<WorkItem>, OperationError>;

    /// Full audit trail in creation order
    async fn history(&self, id: WorkItemId) -> Result<Vec<HistoryEntry>, OperationError>;

    /// Comments, newest first
    async fn comments(&self, id: WorkItemId) -> Result<Vec<Comment>, OperationError>;
}

// ============================================================================
// Standard Implementation
// ============================================================================

pub struct StandardCaseQueryService {
    repository: Arc<dyn WorkItemRepository>,
    clock: Arc<dyn Clock>,
}

impl StandardCaseQueryService {
    pub fn new(repository: Arc<dyn WorkItemRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }
}

#[async_trait]
impl CaseQueryService for StandardCaseQueryService {
    async fn get(&self, id: WorkItemId) -> Result<WorkItem, OperationError> {
        debug!("Fetching work item {}", id);
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| OperationError::NotFound(format!("Work item {} not found", id)))
    }

    async fn get_by_application(
        &self,
        application_id: ApplicationId,
    ) -> Result<WorkItem, OperationError> {
        debug!("Fetching work item for application {}", application_id);
        self.repository
            .find_by_application_id(application_id)
            .await?
            .ok_or_else(|| {
                OperationError::NotFound(format!(
                    "No work item found for application {}",
                    application_id
                ))
            })
    }

    async fn list(
        &self,
        filter: &WorkItemFilter,
        page: PageRequest,
    ) -> Result<Page<WorkItem>, OperationError> {
        let now = self.clock.now();
        let mut items = self.repository.list(filter, now).await?;
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = items.len();
        let items: Vec<WorkItem> = items
            .into_iter()
            .skip(page.offset())
            .take(page.page_size)
            .collect();

        Ok(Page {
            items,
            total,
            page: page.page,
            page_size: page.page_size,
        })
    }

    async fn pending_approvals(
        &self,
        risk_level: Option<RiskLevel>,
    ) -> Result<Vec<WorkItem>, OperationError> {
        let mut items = self.repository.list_pending_approvals(risk_level).await?;
        items.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then(a.created_at.cmp(&b.created_at))
        });
        Ok(items)
    }

    async fn due_for_refresh(
        &self,
        as_of: Option<DateTime<Utc>>,
    ) -> Result<Vec<WorkItem>, OperationError> {
        let as_of = as_of.unwrap_or_else(|| self.clock.now());
        let mut items = self.repository.list_due_for_refresh(as_of).await?;
        // Earliest refresh date first; already-marked items (date cleared) last.
        items.sort_by(|a, b| {
            match (a.next_refresh_date, b.next_refresh_date) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            }
            .then(b.priority.cmp(&a.priority))
            .then(a.created_at.cmp(&b.created_at))
        });
        Ok(items)
    }

    async fn my_work_items(&self, assignee_id: &str) -> Result<Vec<WorkItem>, OperationError> {
        let mut items = self.repository.find_by_assignee(assignee_id).await?;
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(items)
    }

    async fn history(&self, id: WorkItemId) -> Result<Vec<HistoryEntry>, OperationError> {
        let item = self.get(id).await?;
        Ok(item.history().to_vec())
    }

    async fn comments(&self, id: WorkItemId) -> Result<Vec<Comment>, OperationError> {
        let item = self.get(id).await?;
        let mut comments = item.comments().to_vec();
        comments.reverse();
        Ok(comments)
    }
}

// ============================================================================
// Tests
// ============================================================================
