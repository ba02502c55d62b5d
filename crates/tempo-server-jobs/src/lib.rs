// Copyright (c) 2025 tempo contributors. All rights reserved.
// SPDX-License-Identifier: MIT

//! Scheduled job dispatcher for tempo.
//!
//! Each registered job gets its own timer loop (fixed-rate or cron). When
//! a timer fires, the dispatcher asks the lease layer for a lock named
//! after the job and runs the body only if the lease was granted; on any
//! other tempo instance the same timer fires and is denied. Job failures
//! and lock-store outages are logged and skipped, never allowed to kill
//! the timer loop.

pub mod dispatcher;
pub mod error;
pub mod job;
pub mod schedule;

pub use dispatcher::Dispatcher;
pub use error::{JobError, Result};
pub use job::{Job, JobContext, JobOutput};
pub use schedule::Cadence;
