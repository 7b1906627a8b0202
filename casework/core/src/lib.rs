// Copyright (c) 2026 ledgerline.io
// SPDX-License-Identifier: AGPL-3.0
//! # Ledgerline Casework Core
//!
//! Work item lifecycle engine for KYB/KYC compliance cases: intake,
//! assignment, review, risk-conditional approval, completion, and periodic
//! refresh scheduling.
//!
//! | Layer | Contents |
//! |-------|----------|
//! | [`domain`] | `WorkItem` aggregate, risk/priority, lifecycle policy, events, repository port |
//! | [`application`] | `CaseLifecycleService` (commands) and `CaseQueryService` (reads) |
//! | [`infrastructure`] | In-memory repository, event bus, YAML configuration |
//! | [`presentation`] | Status codes, `OperationResult` envelope, view DTOs |

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;

pub use domain::*;
