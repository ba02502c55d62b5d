// Copyright (c) 2025 tempo contributors. All rights reserved.
// SPDX-License-Identifier: MIT

//! Email content configuration: who the scheduled test email goes to.

use serde::Deserialize;

#[derive(Debug, Clone)]
pub struct EmailConfig {
	pub test_recipient: String,
}

impl Default for EmailConfig {
	fn default() -> Self {
		Self {
			test_recipient: "test@example.com".to_string(),
		}
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmailConfigLayer {
	#[serde(default)]
	pub test_recipient: Option<String>,
}

impl EmailConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.test_recipient.is_some() {
			self.test_recipient = other.test_recipient;
		}
	}

	pub fn finalize(self) -> EmailConfig {
		EmailConfig {
			test_recipient: self
				.test_recipient
				.unwrap_or_else(|| "test@example.com".to_string()),
		}
	}
}
