// Copyright (c) 2026 ledgerline.io
// SPDX-License-Identifier: AGPL-3.0
//! # Ledgerline Casework Refresh
//!
//! Background sweeper that feeds completed compliance cases back into the
//! review queue when their periodic re-verification date arrives.

pub mod sweeper;

pub use sweeper::{RefreshSweeper, RefreshSweeperConfig, SweepOutcome};
