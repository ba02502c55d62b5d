// Copyright (c) 2025 tempo contributors. All rights reserved.
// SPDX-License-Identifier: MIT

//! Lease-based distributed locking for tempo scheduled jobs.
//!
//! Every tempo instance fires its own timers; this crate makes sure each
//! named job still runs on exactly one instance per tick. Coordination
//! happens through a shared lock table with atomic conditional updates,
//! never through instance-to-instance communication. A lease is a
//! time-bounded claim on a job name: it expires at `max_hold` if the
//! holder crashes, and stays in force until `min_hold` even when the job
//! finishes early.

pub mod error;
pub mod instrument;
pub mod manager;
pub mod sqlite;
pub mod store;

pub use error::{LockError, Result};
pub use instrument::{process_identity, InstrumentedLeaseManager};
pub use manager::{LeaseHandle, LeaseManager, LeaseProvider, LeaseSpec};
pub use sqlite::SqliteLockStore;
pub use store::{LockRecord, LockStore};
