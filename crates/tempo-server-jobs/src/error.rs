// Copyright (c) 2025 tempo contributors. All rights reserved.
// SPDX-License-Identifier: MIT

//! Error types for job scheduling.

use thiserror::Error;

/// Result type for job scheduling operations.
pub type Result<T> = std::result::Result<T, JobError>;

#[derive(Debug, Error)]
pub enum JobError {
	/// A job body failed. Caught and logged by the dispatcher; the next
	/// scheduled attempt proceeds normally.
	#[error("job failed: {0}")]
	Failed(String),

	#[error("invalid cadence: {0}")]
	InvalidCadence(String),

	/// Invalid lease bounds or name, rejected at registration time.
	#[error(transparent)]
	Lease(#[from] tempo_server_lock::LockError),
}
