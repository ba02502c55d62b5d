// Copyright (c) 2025 tempo contributors. All rights reserved.
// SPDX-License-Identifier: MIT

//! Scheduled test email send. The dispatcher's lease around this job is
//! what keeps a multi-instance deployment down to one email per cron fire.

use std::sync::Arc;

use async_trait::async_trait;

use tempo_server_jobs::{Job, JobContext, JobError, JobOutput};

use crate::email::EmailService;

pub struct SendTestEmailJob {
	email: Arc<EmailService>,
}

impl SendTestEmailJob {
	pub fn new(email: Arc<EmailService>) -> Self {
		Self { email }
	}
}

#[async_trait]
impl Job for SendTestEmailJob {
	fn id(&self) -> &str {
		"send-test-email"
	}

	fn name(&self) -> &str {
		"Send test email"
	}

	fn description(&self) -> &str {
		"Sends the recurring test email to the configured recipient"
	}

	async fn run(&self, _ctx: &JobContext) -> Result<JobOutput, JobError> {
		self
			.email
			.send_test_email()
			.await
			.map_err(|e| JobError::Failed(format!("email send failed: {e}")))?;

		Ok(JobOutput {
			message: format!("test email sent by {}", self.email.identity()),
		})
	}
}
