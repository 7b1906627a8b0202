//! In-memory repository adapter
//!
//! Backs the repository port with a plain HashMap behind a mutex. Used by
//! tests and single-process deployments; the storage-level rules (one item
//! per application, version checks) live here exactly as a database adapter
//! would enforce them.

use crate::domain::repository::{RepositoryError, WorkItemFilter, WorkItemRepository};
use crate::domain::risk::RiskLevel;
use crate::domain::work_item::{
    ApplicationId, WorkItem, WorkItemId, WorkItemNumber, WorkItemStatus,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
pub struct InMemoryWorkItemRepository {
    items: Arc<Mutex<HashMap<WorkItemId, WorkItem>>>,
    sequence: Arc<Mutex<u64>>,
}

impl InMemoryWorkItemRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.lock().map(|items| items.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl WorkItemRepository for InMemoryWorkItemRepository {
    async fn next_work_item_number(&self) -> Result<WorkItemNumber, RepositoryError> {
        let mut sequence = self
            .sequence
            .lock()
            .map_err(|_| RepositoryError::Storage("Lock poisoned".to_string()))?;
        *sequence += 1;
        Ok(WorkItemNumber::from_sequence(*sequence))
    }

    async fn add(&self, item: &WorkItem) -> Result<(), RepositoryError> {
        let mut items = self
            .items
            .lock()
            .map_err(|_| RepositoryError::Storage("Lock poisoned".to_string()))?;

        if items
            .values()
            .any(|existing| existing.application_id == item.application_id)
        {
            return Err(RepositoryError::DuplicateApplication(item.application_id));
        }

        items.insert(item.id, item.clone());
        Ok(())
    }

    async fn save(&self, item: &WorkItem) -> Result<u64, RepositoryError> {
        let mut items = self
            .items
            .lock()
            .map_err(|_| RepositoryError::Storage("Lock poisoned".to_string()))?;

        let stored = items.get_mut(&item.id).ok_or_else(|| {
            RepositoryError::NotFound(format!("Work item {} not found", item.id))
        })?;

        if stored.version != item.version {
            return Err(RepositoryError::VersionConflict {
                id: item.id,
                expected: item.version,
                actual: stored.version,
            });
        }

        let mut updated = item.clone();
        updated.version += 1;
        let version = updated.version;
        *stored = updated;
        Ok(version)
    }

    async fn find_by_id(&self, id: WorkItemId) -> Result<Option<WorkItem>, RepositoryError> {
        let items = self
            .items
            .lock()
            .map_err(|_| RepositoryError::Storage("Lock poisoned".to_string()))?;
        Ok(items.get(&id).cloned())
    }

    async fn find_by_application_id(
        &self,
        application_id: ApplicationId,
    ) -> Result<Option<WorkItem>, RepositoryError> {
        let items = self
            .items
            .lock()
            .map_err(|_| RepositoryError::Storage("Lock poisoned".to_string()))?;
        Ok(items
            .values()
            .find(|item| item.application_id == application_id)
            .cloned())
    }

    async fn find_by_assignee(&self, assignee_id: &str) -> Result<Vec<WorkItem>, RepositoryError> {
        let items = self
            .items
            .lock()
            .map_err(|_| RepositoryError::Storage("Lock poisoned".to_string()))?;
        Ok(items
            .values()
            .filter(|item| item.assigned_to.as_deref() == Some(assignee_id))
            .cloned()
            .collect())
    }

    async fn list(
        &self,
        filter: &WorkItemFilter,
        now: DateTime<Utc>,
    ) -> Result<Vec<WorkItem>, RepositoryError> {
        let items = self
            .items
            .lock()
            .map_err(|_| RepositoryError::Storage("Lock poisoned".to_string()))?;
        Ok(items
            .values()
            .filter(|item| filter.matches(item, now))
            .cloned()
            .collect())
    }

    async fn list_pending_approvals(
        &self,
        risk_level: Option<RiskLevel>,
    ) -> Result<Vec<WorkItem>, RepositoryError> {
        let items = self
            .items
            .lock()
            .map_err(|_| RepositoryError::Storage("Lock poisoned".to_string()))?;
        Ok(items
            .values()
            .filter(|item| item.status == WorkItemStatus::PendingApproval && item.requires_approval)
            .filter(|item| risk_level.map(|risk| item.risk_level >= risk).unwrap_or(true))
            .cloned()
            .collect())
    }

    async fn list_due_for_refresh(
        &self,
        as_of: DateTime<Utc>,
    ) -> Result<Vec<WorkItem>, RepositoryError> {
        let items = self
            .items
            .lock()
            .map_err(|_| RepositoryError::Storage("Lock poisoned".to_string()))?;
        Ok(items
            .values()
            .filter(|item| {
                item.status == WorkItemStatus::DueForRefresh
                    || item
                        .next_refresh_date
                        .map(|date| date <= as_of)
                        .unwrap_or(false)
            })
            .cloned()
            .collect())
    }
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

    fn sample(application_id: ApplicationId) -> WorkItem {
        WorkItem::create(
            WorkItemNumber::from_sequence(1),
            application_id,
            CaseSnapshot {
                applicant_name: "Acme GmbH".to_string(),
                entity_type: "limited_company".to_string(),
                country: "DE".to_string(),
            },
            RiskLevel::Low,
            &Actor::system(),
            &LifecyclePolicy::default(),
            t0(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_numbers_are_sequential() {
        let repo = InMemoryWorkItemRepository::new();
        assert_eq!(repo.next_work_item_number().await.unwrap().as_str(), "WI-000001");
        assert_eq!(repo.next_work_item_number().await.unwrap().as_str(), "WI-000002");
    }

    #[tokio::test]
    async fn test_add_rejects_duplicate_application() {
        let repo = InMemoryWorkItemRepository::new();
        let application_id = ApplicationId::new();
        repo.add(&sample(application_id)).await.unwrap();

        let err = repo.add(&sample(application_id)).await.unwrap_err();
        assert!(matches!(err, RepositoryError::DuplicateApplication(_)));
        assert_eq!(repo.len(), 1);
    }

    #[tokio::test]
    async fn test_save_advances_version() {
        let repo = InMemoryWorkItemRepository::new();
        let mut item = sample(ApplicationId::new());
        repo.add(&item).await.unwrap();

        item.assign(&Actor::system(), &Actor::system(), t0()).unwrap();
        let version = repo.save(&item).await.unwrap();
        assert_eq!(version, 2);

        let stored = repo.find_by_id(item.id).await.unwrap().unwrap();
        assert_eq!(stored.version, 2);
    }

    #[tokio::test]
    async fn test_save_detects_stale_version() {
        let repo = InMemoryWorkItemRepository::new();
        let item = sample(ApplicationId::new());
        repo.add(&item).await.unwrap();

        let stale = item.clone();
        let mut fresh = item.clone();
        fresh.assign(&Actor::system(), &Actor::system(), t0()).unwrap();
        repo.save(&fresh).await.unwrap();

        let err = repo.save(&stale).await.unwrap_err();
        assert!(matches!(
            err,
            RepositoryError::VersionConflict {
                expected: 1,
                actual: 2,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_save_unknown_item_is_not_found() {
        let repo = InMemoryWorkItemRepository::new();
        let err = repo.save(&sample(ApplicationId::new())).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_find_by_application_and_assignee() {
        let repo = InMemoryWorkItemRepository::new();
        let application_id = ApplicationId::new();
        let mut item = sample(application_id);
        let reviewer = Actor::new("u-rev", "Rita Reviewer").unwrap();
        item.assign(&reviewer, &reviewer, t0()).unwrap();
        repo.add(&item).await.unwrap();

        let found = repo.find_by_application_id(application_id).await.unwrap();
        assert_eq!(found.map(|f| f.id), Some(item.id));

        let mine = repo.find_by_assignee("u-rev").await.unwrap();
        assert_eq!(mine.len(), 1);
        assert!(repo.find_by_assignee("u-other").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_pending_approvals_bounded_by_minimum_risk() {
        let repo = InMemoryWorkItemRepository::new();
        let reviewer = Actor::system();

        for (sequence, risk) in [(1, RiskLevel::High), (2, RiskLevel::Critical)] {
            let mut item = WorkItem::create(
                WorkItemNumber::from_sequence(sequence),
                ApplicationId::new(),
                CaseSnapshot {
                    applicant_name: "Acme GmbH".to_string(),
                    entity_type: "limited_company".to_string(),
                    country: "DE".to_string(),
                },
                risk,
                &reviewer,
                &LifecyclePolicy::default(),
                t0(),
            )
            .unwrap();
            item.assign(&reviewer, &reviewer, t0()).unwrap();
            item.start_review(&reviewer, t0()).unwrap();
            item.submit_for_approval(None, &reviewer, t0()).unwrap();
            repo.add(&item).await.unwrap();
        }

        assert_eq!(repo.list_pending_approvals(None).await.unwrap().len(), 2);

        let critical = repo
            .list_pending_approvals(Some(RiskLevel::Critical))
            .await
            .unwrap();
        assert_eq!(critical.len(), 1);
        assert_eq!(critical[0].risk_level, RiskLevel::Critical);
    }

    #[tokio::test]
    async fn test_due_for_refresh_boundary_is_inclusive() {
        let repo = InMemoryWorkItemRepository::new();
        let reviewer = Actor::system();
        let policy = LifecyclePolicy::default();

        let mut item = sample(ApplicationId::new());
        item.assign(&reviewer, &reviewer, t0()).unwrap();
        item.start_review(&reviewer, t0()).unwrap();
        item.complete(&reviewer, &policy, t0()).unwrap();
        repo.add(&item).await.unwrap();

        let refresh_date = item.next_refresh_date.unwrap();
        assert!(repo
            .list_due_for_refresh(refresh_date - Duration::seconds(1))
            .await
            .unwrap()
            .is_empty());
        assert_eq!(repo.list_due_for_refresh(refresh_date).await.unwrap().len(), 1);
    }
}
