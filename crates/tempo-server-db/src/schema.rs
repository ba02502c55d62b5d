// Copyright (c) 2025 tempo contributors. All rights reserved.
// SPDX-License-Identifier: MIT

//! Schema initialization. Idempotent: every statement is `IF NOT EXISTS`,
//! so replicas racing to start against a fresh shared database all
//! converge on the same tables.

use sqlx::SqlitePool;

use crate::error::Result;

pub async fn init_schema(pool: &SqlitePool) -> Result<()> {
	sqlx::query(
		r#"
        CREATE TABLE IF NOT EXISTS scheduler_locks (
            name TEXT PRIMARY KEY,
            locked_until INTEGER NOT NULL,
            locked_at INTEGER NOT NULL,
            locked_by TEXT NOT NULL
        )
        "#,
	)
	.execute(pool)
	.await?;

	sqlx::query(
		r#"
        CREATE TABLE IF NOT EXISTS email_log (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            recipient TEXT NOT NULL,
            subject TEXT NOT NULL,
            body TEXT NOT NULL,
            sent_at TEXT NOT NULL,
            sent_by TEXT NOT NULL,
            job_execution_id TEXT NOT NULL
        )
        "#,
	)
	.execute(pool)
	.await?;

	sqlx::query("CREATE INDEX IF NOT EXISTS idx_email_log_sent_at ON email_log(sent_at)")
		.execute(pool)
		.await?;

	tracing::debug!("schema initialized");
	Ok(())
}
