// Copyright (c) 2025 tempo contributors. All rights reserved.
// SPDX-License-Identifier: MIT

//! The lease protocol: acquire with min/max hold bounds, idempotent release.

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::error::{LockError, Result};
use crate::store::LockStore;

/// Validated description of a lease to request: the job name it protects
/// and its hold bounds.
///
/// `max_hold` bounds exposure if the holder crashes mid-job (the slot is
/// reclaimed once it passes); `min_hold` prevents re-acquisition thrash
/// when a job finishes before its schedule interval has really elapsed.
#[derive(Debug, Clone)]
pub struct LeaseSpec {
	name: String,
	min_hold: ChronoDuration,
	max_hold: ChronoDuration,
}

impl LeaseSpec {
	/// Rejects empty names and `min_hold > max_hold` up front, before any
	/// scheduling begins.
	pub fn new(name: impl Into<String>, min_hold: Duration, max_hold: Duration) -> Result<Self> {
		let name = name.into();
		if name.trim().is_empty() {
			return Err(LockError::InvalidSpec("lease name must not be empty".to_string()));
		}
		if min_hold > max_hold {
			return Err(LockError::InvalidSpec(format!(
				"min_hold ({min_hold:?}) exceeds max_hold ({max_hold:?}) for '{name}'"
			)));
		}
		let min_hold = ChronoDuration::from_std(min_hold)
			.map_err(|_| LockError::InvalidSpec(format!("min_hold out of range for '{name}'")))?;
		let max_hold = ChronoDuration::from_std(max_hold)
			.map_err(|_| LockError::InvalidSpec(format!("max_hold out of range for '{name}'")))?;

		Ok(Self {
			name,
			min_hold,
			max_hold,
		})
	}

	pub fn name(&self) -> &str {
		&self.name
	}
}

/// An acquired lease. Lives only in the memory of the process that
/// acquired it; if that process dies, the lease simply expires at
/// `max_hold_until` with no explicit signal.
#[derive(Debug, Clone)]
pub struct LeaseHandle {
	pub name: String,
	pub acquired_at: DateTime<Utc>,
	pub min_hold_until: DateTime<Utc>,
	pub max_hold_until: DateTime<Utc>,
}

/// Lease acquisition and release.
///
/// `acquire` returning `Ok(None)` is the expected contention outcome, not
/// an error: another instance validly owns the slot. `Err` means the lock
/// store itself was unreachable; callers must treat that the same as a
/// denial for scheduling purposes.
#[async_trait]
pub trait LeaseProvider: Send + Sync {
	async fn acquire(&self, spec: &LeaseSpec) -> Result<Option<LeaseHandle>>;
	async fn release(&self, handle: &LeaseHandle) -> Result<()>;
}

/// Implements the lease protocol against a [`LockStore`].
pub struct LeaseManager {
	store: Arc<dyn LockStore>,
}

impl LeaseManager {
	pub fn new(store: Arc<dyn LockStore>) -> Self {
		Self { store }
	}
}

#[async_trait]
impl LeaseProvider for LeaseManager {
	async fn acquire(&self, spec: &LeaseSpec) -> Result<Option<LeaseHandle>> {
		let now = self.store.now().await?;
		let max_hold_until = now + spec.max_hold;

		if !self.store.try_acquire(&spec.name, now, max_hold_until).await? {
			return Ok(None);
		}

		Ok(Some(LeaseHandle {
			name: spec.name.clone(),
			acquired_at: now,
			min_hold_until: now + spec.min_hold,
			max_hold_until,
		}))
	}

	/// Shortens the record's `locked_until` to `max(now, min_hold_until)`,
	/// so the minimum hold is honored even on fast completion. Releasing a
	/// handle whose lease has expired or been re-granted elsewhere finds
	/// nothing to shorten and is a no-op, never an error.
	async fn release(&self, handle: &LeaseHandle) -> Result<()> {
		let now = self.store.now().await?;
		let new_locked_until = now.max(handle.min_hold_until);

		let released = self
			.store
			.try_release(&handle.name, handle.max_hold_until, new_locked_until)
			.await?;

		if !released {
			debug!(name = %handle.name, "lease no longer ours; nothing to shorten");
		}

		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::store::LockRecord;
	use chrono::TimeZone;
	use std::collections::HashMap;
	use std::sync::Mutex;

	/// In-memory store with a manually advanced clock, mirroring the
	/// conditional-update semantics of the SQLite backing.
	struct ManualClockStore {
		clock: Mutex<DateTime<Utc>>,
		rows: Mutex<HashMap<String, DateTime<Utc>>>,
	}

	impl ManualClockStore {
		fn new(start: DateTime<Utc>) -> Self {
			Self {
				clock: Mutex::new(start),
				rows: Mutex::new(HashMap::new()),
			}
		}

		fn advance(&self, by: Duration) {
			let mut clock = self.clock.lock().unwrap();
			*clock += ChronoDuration::from_std(by).unwrap();
		}

		fn locked_until(&self, name: &str) -> Option<DateTime<Utc>> {
			self.rows.lock().unwrap().get(name).copied()
		}
	}

	#[async_trait]
	impl LockStore for ManualClockStore {
		async fn now(&self) -> Result<DateTime<Utc>> {
			Ok(*self.clock.lock().unwrap())
		}

		async fn try_acquire(
			&self,
			name: &str,
			now: DateTime<Utc>,
			locked_until: DateTime<Utc>,
		) -> Result<bool> {
			let mut rows = self.rows.lock().unwrap();
			match rows.get(name) {
				Some(existing) if *existing > now => Ok(false),
				_ => {
					rows.insert(name.to_string(), locked_until);
					Ok(true)
				}
			}
		}

		async fn try_release(
			&self,
			name: &str,
			expected_locked_until: DateTime<Utc>,
			new_locked_until: DateTime<Utc>,
		) -> Result<bool> {
			let mut rows = self.rows.lock().unwrap();
			match rows.get(name) {
				Some(existing) if *existing == expected_locked_until => {
					rows.insert(name.to_string(), new_locked_until);
					Ok(true)
				}
				_ => Ok(false),
			}
		}

		async fn get(&self, name: &str) -> Result<Option<LockRecord>> {
			Ok(self.rows.lock().unwrap().get(name).map(|until| LockRecord {
				name: name.to_string(),
				locked_until: *until,
				locked_at: None,
				locked_by: None,
			}))
		}
	}

	fn t0() -> DateTime<Utc> {
		Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
	}

	fn secs(n: u64) -> Duration {
		Duration::from_secs(n)
	}

	fn setup() -> (Arc<ManualClockStore>, LeaseManager) {
		let store = Arc::new(ManualClockStore::new(t0()));
		let manager = LeaseManager::new(Arc::clone(&store) as Arc<dyn LockStore>);
		(store, manager)
	}

	#[test]
	fn test_spec_rejects_empty_name() {
		let err = LeaseSpec::new("  ", secs(1), secs(2)).unwrap_err();
		assert!(matches!(err, LockError::InvalidSpec(_)));
	}

	#[test]
	fn test_spec_rejects_min_hold_above_max_hold() {
		let err = LeaseSpec::new("heartbeat", secs(30), secs(10)).unwrap_err();
		assert!(matches!(err, LockError::InvalidSpec(_)));
	}

	#[test]
	fn test_spec_accepts_equal_hold_bounds() {
		assert!(LeaseSpec::new("heartbeat", secs(10), secs(10)).is_ok());
	}

	#[tokio::test]
	async fn test_acquire_free_name_returns_handle() {
		let (_, manager) = setup();
		let spec = LeaseSpec::new("heartbeat", secs(10), secs(25)).unwrap();

		let handle = manager.acquire(&spec).await.unwrap().unwrap();
		assert_eq!(handle.name, "heartbeat");
		assert_eq!(handle.acquired_at, t0());
		assert_eq!(handle.min_hold_until, t0() + ChronoDuration::seconds(10));
		assert_eq!(handle.max_hold_until, t0() + ChronoDuration::seconds(25));
	}

	#[tokio::test]
	async fn test_heartbeat_scenario() {
		// min_hold=10s, max_hold=25s, acquired at t=0; body completes at
		// t=2s; an attempt at t=5s is denied; an attempt at t=11s succeeds.
		let (store, manager) = setup();
		let spec = LeaseSpec::new("heartbeat", secs(10), secs(25)).unwrap();

		let handle = manager.acquire(&spec).await.unwrap().unwrap();

		store.advance(secs(2));
		manager.release(&handle).await.unwrap();
		assert_eq!(
			store.locked_until("heartbeat"),
			Some(t0() + ChronoDuration::seconds(10))
		);

		store.advance(secs(3)); // t=5s
		assert!(manager.acquire(&spec).await.unwrap().is_none());

		store.advance(secs(6)); // t=11s
		assert!(manager.acquire(&spec).await.unwrap().is_some());
	}

	#[tokio::test]
	async fn test_crash_recovery_scenario() {
		// max_hold=9m, acquired at t=0, never released: an attempt at
		// t=8m is denied, an attempt at t=9m1s succeeds.
		let (store, manager) = setup();
		let spec = LeaseSpec::new("send-email", secs(60), secs(540)).unwrap();

		assert!(manager.acquire(&spec).await.unwrap().is_some());

		store.advance(secs(480)); // t=8m
		assert!(manager.acquire(&spec).await.unwrap().is_none());

		store.advance(secs(61)); // t=9m1s
		assert!(manager.acquire(&spec).await.unwrap().is_some());
	}

	#[tokio::test]
	async fn test_release_after_min_hold_frees_immediately() {
		let (store, manager) = setup();
		let spec = LeaseSpec::new("heartbeat", secs(10), secs(25)).unwrap();

		let handle = manager.acquire(&spec).await.unwrap().unwrap();
		store.advance(secs(12));
		manager.release(&handle).await.unwrap();

		assert_eq!(
			store.locked_until("heartbeat"),
			Some(t0() + ChronoDuration::seconds(12))
		);
		assert!(manager.acquire(&spec).await.unwrap().is_some());
	}

	#[tokio::test]
	async fn test_release_is_idempotent() {
		let (store, manager) = setup();
		let spec = LeaseSpec::new("heartbeat", secs(10), secs(25)).unwrap();

		let handle = manager.acquire(&spec).await.unwrap().unwrap();
		store.advance(secs(2));
		manager.release(&handle).await.unwrap();
		let after_first = store.locked_until("heartbeat");

		manager.release(&handle).await.unwrap();
		assert_eq!(store.locked_until("heartbeat"), after_first);
	}

	#[tokio::test]
	async fn test_stale_release_does_not_shorten_successor_lease() {
		let (store, manager) = setup();
		let spec = LeaseSpec::new("heartbeat", secs(0), secs(25)).unwrap();

		let first = manager.acquire(&spec).await.unwrap().unwrap();

		// First holder crashes; lease expires and a successor takes over.
		store.advance(secs(30));
		assert!(manager.acquire(&spec).await.unwrap().is_some());
		let successor_until = store.locked_until("heartbeat");

		// The revived first holder's release must not touch the new lease.
		manager.release(&first).await.unwrap();
		assert_eq!(store.locked_until("heartbeat"), successor_until);
	}

	#[tokio::test]
	async fn test_granted_intervals_never_overlap() {
		let (store, manager) = setup();
		let spec = LeaseSpec::new("heartbeat", secs(0), secs(25)).unwrap();

		let first = manager.acquire(&spec).await.unwrap().unwrap();
		store.advance(secs(5));
		manager.release(&first).await.unwrap();

		let second = manager.acquire(&spec).await.unwrap().unwrap();
		assert!(second.acquired_at >= first.acquired_at + ChronoDuration::seconds(5));
	}

	#[tokio::test]
	async fn test_mutual_exclusion_on_shared_sqlite_store() {
		use crate::sqlite::SqliteLockStore;

		let pool = sqlx::SqlitePool::connect("sqlite::memory:").await.unwrap();
		sqlx::query(
			r#"
            CREATE TABLE scheduler_locks (
                name TEXT PRIMARY KEY,
                locked_until INTEGER NOT NULL,
                locked_at INTEGER NOT NULL,
                locked_by TEXT NOT NULL
            )
            "#,
		)
		.execute(&pool)
		.await
		.unwrap();

		// Two "instances" sharing one store, as replicated containers
		// share one database.
		let a = LeaseManager::new(Arc::new(SqliteLockStore::new(pool.clone(), "node-a")));
		let b = LeaseManager::new(Arc::new(SqliteLockStore::new(pool, "node-b")));
		let spec = LeaseSpec::new("send-email", secs(60), secs(540)).unwrap();

		let handle = a.acquire(&spec).await.unwrap();
		assert!(handle.is_some());
		assert!(b.acquire(&spec).await.unwrap().is_none());
	}
}
