// Copyright (c) 2026 ledgerline.io
// SPDX-License-Identifier: AGPL-3.0
//! Domain
//!
//! Aggregates, value objects, domain events, and ports for the work item
//! lifecycle.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Business rules with no infrastructure dependencies

pub mod actor;
pub mod clock;
pub mod events;
pub mod policy;
pub mod repository;
pub mod risk;
pub mod work_item;
