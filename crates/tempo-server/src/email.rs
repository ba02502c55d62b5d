// Copyright (c) 2025 tempo contributors. All rights reserved.
// SPDX-License-Identifier: MIT

//! Test email composition and delivery.
//!
//! Every message carries the sending instance's identity and a timestamp
//! so that a reader of the inbox can verify which node held the lease for
//! each scheduled send.

use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use tracing::{info, warn};

use tempo_server_db::EmailLogRepository;
use tempo_server_smtp::{SmtpClient, SmtpError};

pub struct EmailService {
	client: Arc<SmtpClient>,
	log: EmailLogRepository,
	test_recipient: String,
	identity: String,
}

impl EmailService {
	pub fn new(
		client: Arc<SmtpClient>,
		log: EmailLogRepository,
		test_recipient: String,
		identity: String,
	) -> Self {
		Self {
			client,
			log,
			test_recipient,
			identity,
		}
	}

	/// Identity stamped into outgoing messages.
	pub fn identity(&self) -> &str {
		&self.identity
	}

	/// Send the test email to the configured recipient.
	pub async fn send_test_email(&self) -> Result<(), SmtpError> {
		let recipient = self.test_recipient.clone();
		self.send_test_email_to(&recipient).await
	}

	/// Send the test email to an explicit recipient.
	///
	/// Delivery errors propagate to the caller; a failure to record the
	/// send in the audit log is only logged, since the email has already
	/// left the building by then.
	#[tracing::instrument(skip(self), fields(instance = %self.identity))]
	pub async fn send_test_email_to(&self, recipient: &str) -> Result<(), SmtpError> {
		let sent_at = Utc::now();
		let subject = format!("Scheduled test email from {}", self.identity);
		let body = format!(
			"This is an automated test email.\n\n\
			 Sent by instance: {}\n\
			 Sent at: {}\n\n\
			 Exactly one instance holds the send lock per scheduled run, so\n\
			 each minute should produce a single copy of this message.\n",
			self.identity,
			sent_at.to_rfc3339_opts(SecondsFormat::Secs, true),
		);

		self.client.send_text(recipient, &subject, &body).await?;
		info!(recipient, "test email sent");

		if let Err(e) = self
			.log
			.log_email(recipient, &subject, &body, &self.identity)
			.await
		{
			warn!(error = %e, "email sent but audit log insert failed");
		}

		Ok(())
	}
}
