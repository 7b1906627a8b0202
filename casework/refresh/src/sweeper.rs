// Copyright (c) 2026 ledgerline.io
// SPDX-License-Identifier: AGPL-3.0
//! Refresh Sweeper - Background task for periodic re-verification
//!
//! Periodically scans completed work items whose refresh date has arrived
//! and marks them DueForRefresh, feeding them back into the review queue.
//!
//! # Architecture
//!
//! - **Layer:** Application Layer
//! - **Purpose:** Drives the refresh schedule without manual triggering

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::time::interval;
use tracing::{debug, info, warn};

use ledgerline_casework_core::application::{CaseLifecycleService, CaseQueryService};
use ledgerline_casework_core::domain::actor::Actor;
use ledgerline_casework_core::domain::clock::Clock;
use ledgerline_casework_core::domain::work_item::WorkItemStatus;

/// Configuration for the refresh sweeper
#[derive(Debug, Clone)]
pub struct RefreshSweeperConfig {
    /// How often to run a sweep (in seconds)
    pub interval_seconds: u64,

    /// Maximum number of items marked per sweep
    pub batch_size: usize,

    /// Whether sweeping is enabled
    pub enabled: bool,
}

impl Default for RefreshSweeperConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 3600, // Run every hour
            batch_size: 100,
            enabled: true,
        }
    }
}

/// Totals of a single sweep pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SweepOutcome {
    /// Items returned by the due-for-refresh query
    pub examined: usize,
    /// Items newly marked DueForRefresh
    pub marked: usize,
    /// Items whose marking failed
    pub failed: usize,
}

/// Refresh Sweeper - Background task
pub struct RefreshSweeper {
    queries: Arc<dyn CaseQueryService>,
    commands: Arc<dyn CaseLifecycleService>,
    clock: Arc<dyn Clock>,
    config: RefreshSweeperConfig,
    shutdown_token: tokio_util::sync::CancellationToken,
}

impl RefreshSweeper {
    pub fn new(
        queries: Arc<dyn CaseQueryService>,
        commands: Arc<dyn CaseLifecycleService>,
        clock: Arc<dyn Clock>,
        config: RefreshSweeperConfig,
    ) -> Self {
        Self {
            queries,
            commands,
            clock,
            config,
            shutdown_token: tokio_util::sync::CancellationToken::new(),
        }
    }

    /// Get a handle to trigger shutdown
    pub fn shutdown_token(&self) -> tokio_util::sync::CancellationToken {
        self.shutdown_token.clone()
    }

    /// Start the sweeper background task
    pub fn start(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            self.run().await;
        })
    }

    /// Run the sweep loop with graceful shutdown support
    async fn run(&self) {
        if !self.config.enabled {
            info!("Refresh sweeper is disabled");
            return;
        }

        info!(
            interval_seconds = self.config.interval_seconds,
            batch_size = self.config.batch_size,
            "Starting refresh sweeper background task"
        );

        let mut tick = interval(Duration::from_secs(self.config.interval_seconds));

        loop {
            tokio::select! {
                _ = tick.tick() => {
                    debug!("Running refresh sweep");

                    match self.sweep().await {
                        Ok(outcome) => {
                            info!(
                                examined = outcome.examined,
                                marked = outcome.marked,
                                failed = outcome.failed,
                                "Refresh sweep completed"
                            );
                        }
                        Err(e) => {
                            warn!("Refresh sweep failed: {}", e);
                        }
                    }
                }
                _ = self.shutdown_token.cancelled() => {
                    info!("Shutdown signal received, stopping refresh sweeper");
                    break;
                }
            }
        }

        info!("Refresh sweeper background task stopped");
    }

    /// Execute a single sweep pass
    ///
    /// Only items still in Completed are marked; items already sitting in
    /// DueForRefresh count as examined and are skipped.
    pub async fn sweep(&self) -> Result<SweepOutcome> {
        let as_of = self.clock.now();
        let due = self.queries.due_for_refresh(Some(as_of)).await?;

        let mut outcome = SweepOutcome {
            examined: due.len(),
            ..Default::default()
        };
        let system = Actor::system();

        let candidates = due
            .into_iter()
            .filter(|item| item.status == WorkItemStatus::Completed)
            .take(self.config.batch_size);

        for item in candidates {
            match self.commands.mark_for_refresh(item.id, &system).await {
                Ok(marked) => {
                    debug!(
                        "Work item {} marked for refresh (cycle {})",
                        marked.work_item_number, marked.refresh_count
                    );
                    outcome.marked += 1;
                }
                Err(e) => {
                    warn!("Failed to mark work item {} for refresh: {}", item.id, e);
                    outcome.failed += 1;
                }
            }
        }

        Ok(outcome)
    }
}
