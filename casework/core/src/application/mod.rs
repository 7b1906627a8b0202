// Copyright (c) 2026 ledgerline.io
// SPDX-License-Identifier: AGPL-3.0

pub mod commands;
pub mod queries;

// Re-export the service surface for convenience
pub use commands::{
    CaseLifecycleService, CreateWorkItem, OperationError, StandardCaseLifecycleService,
};
pub use queries::{CaseQueryService, StandardCaseQueryService};
