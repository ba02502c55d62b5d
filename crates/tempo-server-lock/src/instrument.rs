// Copyright (c) 2025 tempo contributors. All rights reserved.
// SPDX-License-Identifier: MIT

//! Logging decorator for a [`LeaseProvider`].
//!
//! Records acquisition times per lease name so releases can report how
//! long the lock was held, and tags every event with this process's
//! identity so interleaved logs from replicated instances stay readable.
//! The bookkeeping is purely diagnostic; lease correctness lives entirely
//! in the lock store.

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;
use tracing::{debug, error, info};

use crate::error::Result;
use crate::manager::{LeaseHandle, LeaseProvider, LeaseSpec};

const SWEEP_INTERVAL: Duration = Duration::from_secs(5 * 60);
const MAX_ENTRY_AGE_SECS: i64 = 60 * 60;

type HeldSince = Mutex<HashMap<String, DateTime<Utc>>>;

/// Identity tag for this process, taken from the environment. Opaque:
/// nothing in tempo parses it.
pub fn process_identity() -> String {
	for var in ["HOSTNAME", "CONTAINER_NAME"] {
		if let Ok(value) = std::env::var(var) {
			let value = value.trim();
			if !value.is_empty() {
				return value.to_string();
			}
		}
	}
	"unknown".to_string()
}

/// Wraps a [`LeaseProvider`] with structured acquire/deny/release/error
/// events and held-duration tracking.
pub struct InstrumentedLeaseManager {
	inner: Arc<dyn LeaseProvider>,
	held_since: Arc<HeldSince>,
	identity: String,
}

impl InstrumentedLeaseManager {
	/// Must be called from within a tokio runtime: spawns the background
	/// sweeper that evicts stale bookkeeping entries.
	pub fn new(inner: Arc<dyn LeaseProvider>) -> Self {
		Self::with_identity(inner, process_identity())
	}

	pub fn with_identity(inner: Arc<dyn LeaseProvider>, identity: impl Into<String>) -> Self {
		let held_since = Arc::new(Mutex::new(HashMap::new()));
		spawn_sweeper(Arc::downgrade(&held_since));
		Self {
			inner,
			held_since,
			identity: identity.into(),
		}
	}

	fn record_acquired(&self, name: &str, at: DateTime<Utc>) {
		lock_map(&self.held_since).insert(name.to_string(), at);
	}

	fn take_acquired(&self, name: &str) -> Option<DateTime<Utc>> {
		lock_map(&self.held_since).remove(name)
	}
}

#[async_trait]
impl LeaseProvider for InstrumentedLeaseManager {
	async fn acquire(&self, spec: &LeaseSpec) -> Result<Option<LeaseHandle>> {
		match self.inner.acquire(spec).await {
			Ok(Some(handle)) => {
				self.record_acquired(&handle.name, handle.acquired_at);
				info!(
					event = "acquired",
					task = %spec.name(),
					instance = %self.identity,
					"lock acquired"
				);
				Ok(Some(handle))
			}
			Ok(None) => {
				// Expected whenever another instance owns the slot.
				debug!(
					event = "denied",
					task = %spec.name(),
					instance = %self.identity,
					"lock held by another instance"
				);
				Ok(None)
			}
			Err(e) => {
				error!(
					event = "error",
					task = %spec.name(),
					instance = %self.identity,
					error = %e,
					"lock acquisition failed"
				);
				Err(e)
			}
		}
	}

	async fn release(&self, handle: &LeaseHandle) -> Result<()> {
		let result = self.inner.release(handle).await;
		let started = self.take_acquired(&handle.name);

		match &result {
			Ok(()) => match started {
				Some(at) => debug!(
					event = "released",
					task = %handle.name,
					instance = %self.identity,
					held_ms = (Utc::now() - at).num_milliseconds(),
					"lock released"
				),
				None => debug!(
					event = "released",
					task = %handle.name,
					instance = %self.identity,
					held = "unknown",
					"lock released"
				),
			},
			Err(e) => error!(
				event = "error",
				task = %handle.name,
				instance = %self.identity,
				error = %e,
				"lock release failed"
			),
		}

		result
	}
}

fn lock_map(map: &HeldSince) -> std::sync::MutexGuard<'_, HashMap<String, DateTime<Utc>>> {
	match map.lock() {
		Ok(guard) => guard,
		Err(poisoned) => poisoned.into_inner(),
	}
}

/// Evicts entries whose acquisition time fell out of the retention window.
/// Guards against unbounded growth when a release is never observed, e.g.
/// a crash between acquire and release.
fn spawn_sweeper(map: Weak<HeldSince>) {
	tokio::spawn(async move {
		let mut ticker = tokio::time::interval(SWEEP_INTERVAL);
		ticker.tick().await; // first tick completes immediately
		loop {
			ticker.tick().await;
			let Some(map) = map.upgrade() else { break };
			let cutoff = Utc::now() - ChronoDuration::seconds(MAX_ENTRY_AGE_SECS);
			sweep(&map, cutoff);
		}
	});
}

fn sweep(map: &HeldSince, cutoff: DateTime<Utc>) {
	let mut entries = lock_map(map);
	let before = entries.len();
	entries.retain(|_, acquired_at| *acquired_at >= cutoff);
	let removed = before - entries.len();
	if removed > 0 {
		debug!(removed, "swept stale lock bookkeeping entries");
	}
}
