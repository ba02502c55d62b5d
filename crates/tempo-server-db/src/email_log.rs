// Copyright (c) 2025 tempo contributors. All rights reserved.
// SPDX-License-Identifier: MIT

//! Audit log of sent emails, one row per send. Feeds the test health
//! endpoint's "emails sent in the last hour" counter.

use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::SqlitePool;

use crate::error::Result;

#[derive(Debug, Clone)]
pub struct EmailLogEntry {
	pub recipient: String,
	pub subject: String,
	pub body: String,
	pub sent_at: DateTime<Utc>,
	pub sent_by: String,
	pub job_execution_id: String,
}

#[derive(Clone)]
pub struct EmailLogRepository {
	pool: SqlitePool,
}

impl EmailLogRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Record a sent email. Returns the generated job execution id.
	#[tracing::instrument(skip(self, body), fields(recipient = %recipient))]
	pub async fn log_email(
		&self,
		recipient: &str,
		subject: &str,
		body: &str,
		sent_by: &str,
	) -> Result<String> {
		let job_execution_id = uuid::Uuid::new_v4().to_string();
		let sent_at = Utc::now().to_rfc3339_opts(SecondsFormat::Nanos, true);

		sqlx::query(
			r#"
            INSERT INTO email_log (recipient, subject, body, sent_at, sent_by, job_execution_id)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
		)
		.bind(recipient)
		.bind(subject)
		.bind(body)
		.bind(&sent_at)
		.bind(sent_by)
		.bind(&job_execution_id)
		.execute(&self.pool)
		.await?;

		tracing::debug!(job_execution_id = %job_execution_id, "email logged");
		Ok(job_execution_id)
	}

	/// Count emails sent at or after `cutoff`.
	#[tracing::instrument(skip(self))]
	pub async fn count_sent_since(&self, cutoff: DateTime<Utc>) -> Result<i64> {
		let cutoff = cutoff.to_rfc3339_opts(SecondsFormat::Nanos, true);
		let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM email_log WHERE sent_at >= ?")
			.bind(cutoff)
			.fetch_one(&self.pool)
			.await?;

		Ok(count)
	}

	/// Most recent sends, newest first. Diagnostics only.
	#[tracing::instrument(skip(self))]
	pub async fn recent(&self, limit: u32) -> Result<Vec<EmailLogEntry>> {
		let rows = sqlx::query_as::<_, (String, String, String, String, String, String)>(
			r#"
            SELECT recipient, subject, body, sent_at, sent_by, job_execution_id
            FROM email_log ORDER BY sent_at DESC LIMIT ?
            "#,
		)
		.bind(limit)
		.fetch_all(&self.pool)
		.await?;

		rows
			.into_iter()
			.map(
				|(recipient, subject, body, sent_at, sent_by, job_execution_id)| {
					let sent_at = DateTime::parse_from_rfc3339(&sent_at)
						.map_err(|e| crate::error::DbError::Internal(format!("bad sent_at: {e}")))?
						.with_timezone(&Utc);
					Ok(EmailLogEntry {
						recipient,
						subject,
						body,
						sent_at,
						sent_by,
						job_execution_id,
					})
				},
			)
			.collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::{create_email_log_table, create_test_pool};
	use chrono::Duration;

	async fn setup() -> EmailLogRepository {
		let pool = create_test_pool().await;
		create_email_log_table(&pool).await;
		EmailLogRepository::new(pool)
	}

	#[tokio::test]
	async fn test_log_email_returns_execution_id() {
		let repo = setup().await;
		let id = repo
			.log_email("test@example.com", "Hello", "Body", "node-a")
			.await
			.unwrap();
		assert!(!id.is_empty());

		let recent = repo.recent(10).await.unwrap();
		assert_eq!(recent.len(), 1);
		assert_eq!(recent[0].recipient, "test@example.com");
		assert_eq!(recent[0].sent_by, "node-a");
		assert_eq!(recent[0].job_execution_id, id);
	}

	#[tokio::test]
	async fn test_count_sent_since_honors_cutoff() {
		let repo = setup().await;
		repo
			.log_email("test@example.com", "Hello", "Body", "node-a")
			.await
			.unwrap();

		let hour_ago = Utc::now() - Duration::hours(1);
		assert_eq!(repo.count_sent_since(hour_ago).await.unwrap(), 1);

		let in_an_hour = Utc::now() + Duration::hours(1);
		assert_eq!(repo.count_sent_since(in_an_hour).await.unwrap(), 0);
	}

	#[tokio::test]
	async fn test_recent_orders_newest_first() {
		let repo = setup().await;
		repo
			.log_email("first@example.com", "One", "Body", "node-a")
			.await
			.unwrap();
		repo
			.log_email("second@example.com", "Two", "Body", "node-a")
			.await
			.unwrap();

		let recent = repo.recent(10).await.unwrap();
		assert_eq!(recent.len(), 2);
		assert_eq!(recent[0].recipient, "second@example.com");
	}
}
