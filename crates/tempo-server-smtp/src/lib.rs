// Copyright (c) 2025 tempo contributors. All rights reserved.
// SPDX-License-Identifier: MIT

//! Async SMTP client for tempo.
//!
//! Sends the plain-text notification emails produced by scheduled jobs.
//! Built on [`lettre`] with optional STARTTLS and authentication; local
//! development typically points at a MailHog-style catcher with
//! `use_tls = false` and no credentials. Passwords are held in
//! [`secrecy::SecretString`] so they never appear in logs.

use lettre::{
	message::{header::ContentType, Mailbox},
	transport::smtp::authentication::Credentials,
	AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

/// Errors that can occur during SMTP operations.
#[derive(Debug, thiserror::Error)]
pub enum SmtpError {
	/// Failed to connect to the SMTP server.
	#[error("connection failed: {0}")]
	Connection(String),

	/// Failed to send an email message.
	#[error("send failed: {0}")]
	Send(String),

	/// Invalid configuration (missing required fields, invalid values).
	#[error("invalid configuration: {0}")]
	Config(String),

	/// Invalid email address format.
	#[error("invalid email address: {0}")]
	Address(String),
}

/// Configuration for the SMTP client.
#[derive(Debug, Clone, Deserialize)]
pub struct SmtpConfig {
	/// SMTP server hostname.
	pub host: String,

	/// SMTP server port. Common values: 25 (unencrypted), 587 (STARTTLS),
	/// 1025 (MailHog).
	pub port: u16,

	/// Optional username for SMTP authentication.
	pub username: Option<String>,

	/// Optional password for SMTP authentication. Debug output is redacted.
	pub password: Option<SecretString>,

	/// Email address to send from.
	pub from_address: String,

	/// Display name for the sender.
	pub from_name: String,

	/// Whether to use STARTTLS for the connection.
	#[serde(default = "default_use_tls")]
	pub use_tls: bool,
}

fn default_use_tls() -> bool {
	true
}

/// Async SMTP client. Created once from configuration; the underlying
/// [`lettre`] transport pools connections across sends.
pub struct SmtpClient {
	transport: AsyncSmtpTransport<Tokio1Executor>,
	from_mailbox: Mailbox,
}

impl SmtpClient {
	/// Validates the configuration and builds the transport. The actual
	/// connection is made lazily on the first send.
	#[tracing::instrument(
        name = "smtp_client_new",
        skip(config),
        fields(host = %config.host, port = %config.port, use_tls = %config.use_tls)
    )]
	pub fn new(config: SmtpConfig) -> Result<Self, SmtpError> {
		let from_mailbox: Mailbox = format!("{} <{}>", config.from_name, config.from_address)
			.parse()
			.map_err(|e| SmtpError::Address(format!("{e}")))?;

		let builder = if config.use_tls {
			AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
				.map_err(|e| SmtpError::Connection(format!("{e}")))?
		} else {
			AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
		};

		let mut builder = builder.port(config.port);

		if let (Some(username), Some(password)) = (config.username, config.password) {
			let credentials = Credentials::new(username, password.expose_secret().to_string());
			builder = builder.credentials(credentials);
		}

		let transport = builder.build();

		tracing::debug!("SMTP client initialized");

		Ok(Self {
			transport,
			from_mailbox,
		})
	}

	/// Connection test against the configured server, for health checks
	/// and startup validation.
	#[tracing::instrument(name = "smtp_check_health", skip(self))]
	pub async fn check_health(&self) -> Result<(), SmtpError> {
		self
			.transport
			.test_connection()
			.await
			.map_err(|e| SmtpError::Connection(format!("{e}")))?;
		Ok(())
	}

	/// Send a plain-text email.
	#[tracing::instrument(
        name = "smtp_send_text",
        skip(self, body),
        fields(to = %to, subject = %subject)
    )]
	pub async fn send_text(&self, to: &str, subject: &str, body: &str) -> Result<(), SmtpError> {
		let to_mailbox: Mailbox = to.parse().map_err(|e| SmtpError::Address(format!("{e}")))?;

		let message = Message::builder()
			.from(self.from_mailbox.clone())
			.to(to_mailbox)
			.subject(subject)
			.header(ContentType::TEXT_PLAIN)
			.body(body.to_string())
			.map_err(|e| SmtpError::Send(format!("failed to build message: {e}")))?;

		self
			.transport
			.send(message)
			.await
			.map_err(|e| SmtpError::Send(format!("{e}")))?;

		tracing::info!("email sent");

		Ok(())
	}
}

/// Validate an email address format via [`lettre`]'s [`Mailbox`] parser.
/// Checks syntax, not deliverability.
pub fn is_valid_email(email: &str) -> bool {
	email.parse::<Mailbox>().is_ok()
}
