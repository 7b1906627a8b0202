// Copyright (c) 2026 ledgerline.io
// SPDX-License-Identifier: AGPL-3.0
//! # Presentation Layer (`ledgerline-casework-core`)
//!
//! Serialization surface that translates external payloads into application
//! service calls. **No business logic lives here**: status codes, result
//! envelopes, and view DTOs only.
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`api`] | Status code mapping, `OperationResult` envelope, work item views |

pub mod api;

pub use api::{parse_status, status_code, OperationResult, WorkItemView};
