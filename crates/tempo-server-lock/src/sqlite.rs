// Copyright (c) 2025 tempo contributors. All rights reserved.
// SPDX-License-Identifier: MIT

//! SQLite-backed lock store.
//!
//! Timestamps are stored as integer unix-epoch milliseconds so that the
//! `WHERE` guards compare numerically, independent of any text format. The
//! store clock is the database's own clock, which keeps every instance
//! that shares the file on one timeline.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::error::{LockError, Result};
use crate::store::{LockRecord, LockStore};

/// Lock store over a shared SQLite database, table `scheduler_locks`.
#[derive(Clone)]
pub struct SqliteLockStore {
	pool: SqlitePool,
	locked_by: String,
}

impl SqliteLockStore {
	/// `locked_by` is the opaque identity tag written into the diagnostic
	/// column on every acquisition (typically [`crate::process_identity`]).
	pub fn new(pool: SqlitePool, locked_by: impl Into<String>) -> Self {
		Self {
			pool,
			locked_by: locked_by.into(),
		}
	}
}

fn to_millis(ts: DateTime<Utc>) -> i64 {
	ts.timestamp_millis()
}

fn from_millis(ms: i64) -> Result<DateTime<Utc>> {
	DateTime::from_timestamp_millis(ms)
		.ok_or_else(|| LockError::Clock(format!("timestamp out of range: {ms}")))
}

#[async_trait]
impl LockStore for SqliteLockStore {
	#[tracing::instrument(skip(self))]
	async fn now(&self) -> Result<DateTime<Utc>> {
		let ms: i64 = sqlx::query_scalar(
			"SELECT CAST((julianday('now') - 2440587.5) * 86400000.0 AS INTEGER)",
		)
		.fetch_one(&self.pool)
		.await?;

		from_millis(ms)
	}

	#[tracing::instrument(skip(self), fields(name = %name))]
	async fn try_acquire(
		&self,
		name: &str,
		now: DateTime<Utc>,
		locked_until: DateTime<Utc>,
	) -> Result<bool> {
		let result = sqlx::query(
			r#"
            INSERT INTO scheduler_locks (name, locked_until, locked_at, locked_by)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(name) DO UPDATE SET
                locked_until = excluded.locked_until,
                locked_at = excluded.locked_at,
                locked_by = excluded.locked_by
            WHERE scheduler_locks.locked_until <= excluded.locked_at
            "#,
		)
		.bind(name)
		.bind(to_millis(locked_until))
		.bind(to_millis(now))
		.bind(&self.locked_by)
		.execute(&self.pool)
		.await?;

		Ok(result.rows_affected() > 0)
	}

	#[tracing::instrument(skip(self), fields(name = %name))]
	async fn try_release(
		&self,
		name: &str,
		expected_locked_until: DateTime<Utc>,
		new_locked_until: DateTime<Utc>,
	) -> Result<bool> {
		let result =
			sqlx::query("UPDATE scheduler_locks SET locked_until = ? WHERE name = ? AND locked_until = ?")
				.bind(to_millis(new_locked_until))
				.bind(name)
				.bind(to_millis(expected_locked_until))
				.execute(&self.pool)
				.await?;

		Ok(result.rows_affected() > 0)
	}

	#[tracing::instrument(skip(self), fields(name = %name))]
	async fn get(&self, name: &str) -> Result<Option<LockRecord>> {
		let row = sqlx::query_as::<_, (String, i64, Option<i64>, Option<String>)>(
			"SELECT name, locked_until, locked_at, locked_by FROM scheduler_locks WHERE name = ?",
		)
		.bind(name)
		.fetch_optional(&self.pool)
		.await?;

		match row {
			None => Ok(None),
			Some((name, locked_until, locked_at, locked_by)) => Ok(Some(LockRecord {
				name,
				locked_until: from_millis(locked_until)?,
				locked_at: locked_at.map(from_millis).transpose()?,
				locked_by,
			})),
		}
	}
}
