// Copyright (c) 2025 tempo contributors. All rights reserved.
// SPDX-License-Identifier: MIT

//! Liveness heartbeat. Runs on a short fixed rate; the lease guarantees
//! only one instance logs the heartbeat per tick, which makes the log
//! stream itself a demonstration of the mutual exclusion.

use async_trait::async_trait;
use tracing::info;

use tempo_server_jobs::{Job, JobContext, JobError, JobOutput};

pub struct HeartbeatJob {
	identity: String,
}

impl HeartbeatJob {
	pub fn new(identity: String) -> Self {
		Self { identity }
	}
}

#[async_trait]
impl Job for HeartbeatJob {
	fn id(&self) -> &str {
		"heartbeat"
	}

	fn name(&self) -> &str {
		"Heartbeat"
	}

	fn description(&self) -> &str {
		"Periodic liveness log line, emitted by exactly one instance per tick"
	}

	async fn run(&self, ctx: &JobContext) -> Result<JobOutput, JobError> {
		info!(
			instance = %self.identity,
			fired_at = %ctx.fired_at,
			"heartbeat: this instance holds the lock"
		);

		Ok(JobOutput {
			message: format!("heartbeat from {}", self.identity),
		})
	}
}
