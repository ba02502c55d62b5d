// Copyright (c) 2025 tempo contributors. All rights reserved.
// SPDX-License-Identifier: MIT

//! Error types for lock operations.

use thiserror::Error;

/// Result type for lock operations.
pub type Result<T> = std::result::Result<T, LockError>;

/// Errors that can occur while acquiring or releasing leases.
///
/// Contention is not an error: a denied acquisition is reported as
/// `Ok(None)` by [`crate::LeaseProvider::acquire`].
#[derive(Debug, Error)]
pub enum LockError {
	#[error("invalid lease spec: {0}")]
	InvalidSpec(String),

	#[error("lock store error: {0}")]
	Store(#[from] sqlx::Error),

	#[error("lock store returned an unusable clock value: {0}")]
	Clock(String),
}
