// Copyright (c) 2025 tempo contributors. All rights reserved.
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::JobError;

/// A unit of work the dispatcher protects with a lease. The id doubles as
/// the lease name and must be unique across the deployment.
#[async_trait]
pub trait Job: Send + Sync {
	fn id(&self) -> &str;

	fn name(&self) -> &str;

	fn description(&self) -> &str;

	async fn run(&self, ctx: &JobContext) -> std::result::Result<JobOutput, JobError>;
}

/// Per-execution context handed to a job body.
pub struct JobContext {
	pub run_id: String,
	pub fired_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct JobOutput {
	pub message: String,
}
