// Copyright (c) 2025 tempo contributors. All rights reserved.
// SPDX-License-Identifier: MIT

//! SMTP configuration. The whole section is optional: without a host and
//! from address the server runs with email disabled and only the
//! heartbeat job registered.

use secrecy::SecretString;
use serde::Deserialize;
use tempo_server_smtp::SmtpConfig;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SmtpConfigLayer {
	#[serde(default)]
	pub host: Option<String>,
	#[serde(default)]
	pub port: Option<u16>,
	#[serde(default)]
	pub username: Option<String>,
	#[serde(default)]
	pub password: Option<SecretString>,
	#[serde(default)]
	pub from_address: Option<String>,
	#[serde(default)]
	pub from_name: Option<String>,
	#[serde(default)]
	pub use_tls: Option<bool>,
}

impl SmtpConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.host.is_some() {
			self.host = other.host;
		}
		if other.port.is_some() {
			self.port = other.port;
		}
		if other.username.is_some() {
			self.username = other.username;
		}
		if other.password.is_some() {
			self.password = other.password;
		}
		if other.from_address.is_some() {
			self.from_address = other.from_address;
		}
		if other.from_name.is_some() {
			self.from_name = other.from_name;
		}
		if other.use_tls.is_some() {
			self.use_tls = other.use_tls;
		}
	}

	/// `None` unless both `host` and `from_address` are configured.
	pub fn finalize(self) -> Option<SmtpConfig> {
		let host = self.host?;
		let from_address = self.from_address?;

		Some(SmtpConfig {
			host,
			port: self.port.unwrap_or(587),
			username: self.username,
			password: self.password,
			from_address,
			from_name: self.from_name.unwrap_or_else(|| "tempo".to_string()),
			use_tls: self.use_tls.unwrap_or(true),
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_empty_layer_finalizes_to_none() {
		assert!(SmtpConfigLayer::default().finalize().is_none());
	}

	#[test]
	fn test_host_alone_is_not_enough() {
		let layer = SmtpConfigLayer {
			host: Some("smtp.example.com".to_string()),
			..Default::default()
		};
		assert!(layer.finalize().is_none());
	}

	#[test]
	fn test_minimal_config_gets_defaults() {
		let layer = SmtpConfigLayer {
			host: Some("smtp.example.com".to_string()),
			from_address: Some("noreply@example.com".to_string()),
			..Default::default()
		};
		let config = layer.finalize().unwrap();
		assert_eq!(config.port, 587);
		assert_eq!(config.from_name, "tempo");
		assert!(config.use_tls);
	}

	#[test]
	fn test_mailhog_style_config() {
		let layer = SmtpConfigLayer {
			host: Some("localhost".to_string()),
			port: Some(1025),
			from_address: Some("noreply@example.com".to_string()),
			use_tls: Some(false),
			..Default::default()
		};
		let config = layer.finalize().unwrap();
		assert_eq!(config.port, 1025);
		assert!(!config.use_tls);
	}
}
