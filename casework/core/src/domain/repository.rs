// Copyright (c) 2026 ledgerline.io
// SPDX-License-Identifier: AGPL-3.0

//! Repository port for work item persistence
//!
//! | Trait                | Aggregate  | Implementations                       |
//! |----------------------|------------|---------------------------------------|
//! | `WorkItemRepository` | `WorkItem` | `InMemoryWorkItemRepository` (infra)  |
//!
//! Implementations own two storage-level rules the domain relies on:
//! at most one work item per application id, and optimistic version
//! checking on every save.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::risk::RiskLevel;
use crate::domain::work_item::{
    ApplicationId, WorkItem, WorkItemId, WorkItemNumber, WorkItemStatus,
};

// ============================================================================
// Repository Errors
// ============================================================================

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Work item not found: {0}")]
    NotFound(String),

    #[error("A work item for application {0} already exists")]
    DuplicateApplication(ApplicationId),

    #[error("Concurrent update detected on work item {id} (expected version {expected}, found {actual})")]
    VersionConflict {
        id: WorkItemId,
        expected: u64,
        actual: u64,
    },

    #[error("Storage error: {0}")]
    Storage(String),
}

// ============================================================================
// Query Support
// ============================================================================

/// Combinable listing criteria; all present fields must match
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkItemFilter {
    pub status: Option<WorkItemStatus>,
    pub assigned_to: Option<String>,
    pub risk_level: Option<RiskLevel>,
    pub country: Option<String>,
    /// Derived from the due date at evaluation time, never stored
    pub overdue: Option<bool>,
    /// Case-insensitive free-text term
    pub search: Option<String>,
}

impl WorkItemFilter {
    pub fn matches(&self, item: &WorkItem, now: DateTime<Utc>) -> bool {
        if let Some(status) = self.status {
            if item.status != status {
                return false;
            }
        }
        if let Some(assignee) = &self.assigned_to {
            if item.assigned_to.as_deref() != Some(assignee.as_str()) {
                return false;
            }
        }
        if let Some(risk) = self.risk_level {
            if item.risk_level != risk {
                return false;
            }
        }
        if let Some(country) = &self.country {
            if !item.country.eq_ignore_ascii_case(country) {
                return false;
            }
        }
        if let Some(overdue) = self.overdue {
            if item.is_overdue(now) != overdue {
                return false;
            }
        }
        if let Some(term) = &self.search {
            if !item.matches_search(term) {
                return false;
            }
        }
        true
    }
}

/// 1-based page request; size is clamped to 1..=200
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: usize,
    pub page_size: usize,
}

impl PageRequest {
    pub const MAX_PAGE_SIZE: usize = 200;

    pub fn new(page: usize, page_size: usize) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.clamp(1, Self::MAX_PAGE_SIZE),
        }
    }

    pub fn offset(&self) -> usize {
        (self.page - 1) * self.page_size
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: 1, page_size: 50 }
    }
}

/// One page of results plus the pre-pagination total
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
}

impl<T> Page<T> {
    pub fn total_pages(&self) -> usize {
        if self.total == 0 {
            0
        } else {
            self.total.div_ceil(self.page_size)
        }
    }
}

// ============================================================================
// Repository Port
// ============================================================================

#[async_trait]
pub trait WorkItemRepository: Send + Sync {
    /// Allocate the next sequential display number
    async fn next_work_item_number(&self) -> Result<WorkItemNumber, RepositoryError>;

    /// Insert a new work item
    ///
    /// Fails with `DuplicateApplication` when an item for the same
    /// application id already exists, whatever its status.
    async fn add(&self, item: &WorkItem) -> Result<(), RepositoryError>;

    /// Persist a modified work item
    ///
    /// Compares `item.version` against the stored version and fails with
    /// `VersionConflict` on mismatch. Returns the new version on success;
    /// callers copy it back onto their in-memory aggregate.
    async fn save(&self, item: &WorkItem) -> Result<u64, RepositoryError>;

    async fn find_by_id(&self, id: WorkItemId) -> Result<Option<WorkItem>, RepositoryError>;

    async fn find_by_application_id(
        &self,
        application_id: ApplicationId,
    ) -> Result<Option<WorkItem>, RepositoryError>;

    /// All items currently assigned to the given user id
    async fn find_by_assignee(&self, assignee_id: &str) -> Result<Vec<WorkItem>, RepositoryError>;

    /// All items matching the filter; `now` anchors the overdue predicate
    async fn list(
        &self,
        filter: &WorkItemFilter,
        now: DateTime<Utc>,
    ) -> Result<Vec<WorkItem>, RepositoryError>;

    /// Items sitting in PendingApproval, optionally bounded below by risk level
    async fn list_pending_approvals(
        &self,
        risk_level: Option<RiskLevel>,
    ) -> Result<Vec<WorkItem>, RepositoryError>;

    /// Items whose refresh date has arrived plus items already marked DueForRefresh
    async fn list_due_for_refresh(
        &self,
        as_of: DateTime<Utc>,
    ) -> Result<Vec<WorkItem>, RepositoryError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::actor::Actor;
    use crate::domain::policy::LifecyclePolicy;
    use crate::domain::work_item::CaseSnapshot;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 10, 9, 0, 0).unwrap()
    }

    fn sample() -> WorkItem {
        WorkItem::create(
            WorkItemNumber::from_sequence(1),
            ApplicationId::new(),
            CaseSnapshot {
                applicant_name: "Borealis AB".to_string(),
                entity_type: "limited_company".to_string(),
                country: "SE".to_string(),
            },
            RiskLevel::High,
            &Actor::system(),
            &LifecyclePolicy::default(),
            t0(),
        )
        .unwrap()
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let item = sample();
        assert!(WorkItemFilter::default().matches(&item, t0()));
    }

    #[test]
    fn test_filter_combines_criteria() {
        let item = sample();
        let filter = WorkItemFilter {
            status: Some(WorkItemStatus::New),
            risk_level: Some(RiskLevel::High),
            country: Some("se".to_string()),
            ..Default::default()
        };
        assert!(filter.matches(&item, t0()));

        let mismatched = WorkItemFilter {
            status: Some(WorkItemStatus::New),
            risk_level: Some(RiskLevel::Low),
            ..Default::default()
        };
        assert!(!mismatched.matches(&item, t0()));
    }

    #[test]
    fn test_overdue_filter_uses_evaluation_time() {
        let item = sample();
        let filter = WorkItemFilter {
            overdue: Some(true),
            ..Default::default()
        };
        assert!(!filter.matches(&item, t0()));
        assert!(filter.matches(&item, item.due_date + Duration::seconds(1)));
    }

    #[test]
    fn test_page_request_bounds() {
        let request = PageRequest::new(0, 0);
        assert_eq!(request.page, 1);
        assert_eq!(request.page_size, 1);

        let oversized = PageRequest::new(3, 10_000);
        assert_eq!(oversized.page_size, PageRequest::MAX_PAGE_SIZE);
        assert_eq!(oversized.offset(), 2 * PageRequest::MAX_PAGE_SIZE);
    }

    #[test]
    fn test_page_total_pages() {
        let page = Page::<u32> {
            items: vec![],
            total: 101,
            page: 1,
            page_size: 50,
        };
        assert_eq!(page.total_pages(), 3);

        let empty = Page::<u32> {
            items: vec![],
            total: 0,
            page: 1,
            page_size: 50,
        };
        assert_eq!(empty.total_pages(), 0);
    }

    #[test]
    fn test_duplicate_error_mentions_already_exists() {
        let err = RepositoryError::DuplicateApplication(ApplicationId::new());
        assert!(err.to_string().contains("already exists"));
    }
}
