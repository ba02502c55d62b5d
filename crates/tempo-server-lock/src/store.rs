// Copyright (c) 2025 tempo contributors. All rights reserved.
// SPDX-License-Identifier: MIT

//! The lock store contract: atomic conditional updates keyed by job name.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;

/// One row of the lock table. A record whose `locked_until` is in the
/// past is free; a missing record is equivalent to free.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockRecord {
	pub name: String,
	pub locked_until: DateTime<Utc>,
	/// Time of the most recent successful acquisition. Diagnostics only.
	pub locked_at: Option<DateTime<Utc>>,
	/// Identity tag of the most recent acquirer. Diagnostics only.
	pub locked_by: Option<String>,
}

/// Durable, shared-across-instances system of record for lease state.
///
/// Implementations must perform `try_acquire` and `try_release` as single
/// atomic operations; a read-then-write split is a race between instances
/// and is not a valid implementation. All timestamp comparisons use the
/// store's own clock ([`LockStore::now`]), never an instance-local clock,
/// so clock skew between replicas cannot produce a double acquisition.
#[async_trait]
pub trait LockStore: Send + Sync {
	/// The store's clock. Every lease computation starts from this value.
	async fn now(&self) -> Result<DateTime<Utc>>;

	/// Atomically claim `name` until `locked_until`, succeeding only if no
	/// record exists or the existing record's lease has expired
	/// (`locked_until <= now`). Returns whether the claim took effect.
	async fn try_acquire(
		&self,
		name: &str,
		now: DateTime<Utc>,
		locked_until: DateTime<Utc>,
	) -> Result<bool>;

	/// Atomically shorten the lease on `name` to `new_locked_until`,
	/// conditioned on the row still carrying `expected_locked_until` - the
	/// value this caller wrote at acquisition. If a later holder has since
	/// re-acquired the name, the condition fails and nothing changes.
	async fn try_release(
		&self,
		name: &str,
		expected_locked_until: DateTime<Utc>,
		new_locked_until: DateTime<Utc>,
	) -> Result<bool>;

	/// Fetch the current record for `name`, if any. Diagnostics only.
	async fn get(&self, name: &str) -> Result<Option<LockRecord>>;
}
