// Copyright (c) 2025 tempo contributors. All rights reserved.
// SPDX-License-Identifier: MIT

//! Configuration sources: defaults, TOML files, and environment variables.

use std::path::PathBuf;

use secrecy::SecretString;
use tracing::debug;

use crate::error::ConfigError;
use crate::layer::ServerConfigLayer;
use crate::sections::{
	DatabaseConfigLayer, EmailConfigLayer, HttpConfigLayer, LoggingConfigLayer,
	SchedulerConfigLayer, SmtpConfigLayer,
};

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	ConfigFile = 20,
	Environment = 50,
}

/// Trait for configuration sources.
pub trait ConfigSource: Send + Sync {
	fn name(&self) -> &'static str;
	fn precedence(&self) -> Precedence;
	fn load(&self) -> Result<ServerConfigLayer, ConfigError>;
}

/// Built-in defaults source.
pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		Ok(ServerConfigLayer::default())
	}
}

/// TOML file configuration source. A missing file is not an error.
pub struct TomlSource {
	path: PathBuf,
}

impl TomlSource {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	pub fn system() -> Self {
		Self::new("/etc/tempo/server.toml")
	}
}

impl ConfigSource for TomlSource {
	fn name(&self) -> &'static str {
		"toml-config"
	}

	fn precedence(&self) -> Precedence {
		Precedence::ConfigFile
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		if !self.path.exists() {
			debug!(path = %self.path.display(), "config file not found, skipping");
			return Ok(ServerConfigLayer::default());
		}

		debug!(path = %self.path.display(), "loading config file");
		let content = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::FileRead {
			path: self.path.clone(),
			source: e,
		})?;

		toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
			path: self.path.clone(),
			source: e,
		})
	}
}

/// Environment variable source.
///
/// Convention: TEMPO_SERVER_<SECTION>_<FIELD>
pub struct EnvSource;

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		Ok(ServerConfigLayer {
			http: Some(HttpConfigLayer {
				host: env_var("TEMPO_SERVER_HTTP_HOST"),
				port: env_u16("TEMPO_SERVER_HTTP_PORT")?,
			}),
			database: Some(DatabaseConfigLayer {
				url: env_var("TEMPO_SERVER_DATABASE_URL"),
			}),
			smtp: Some(SmtpConfigLayer {
				host: env_var("TEMPO_SERVER_SMTP_HOST"),
				port: env_u16("TEMPO_SERVER_SMTP_PORT")?,
				username: env_var("TEMPO_SERVER_SMTP_USERNAME"),
				password: env_var("TEMPO_SERVER_SMTP_PASSWORD").map(SecretString::from),
				from_address: env_var("TEMPO_SERVER_SMTP_FROM_ADDRESS"),
				from_name: env_var("TEMPO_SERVER_SMTP_FROM_NAME"),
				use_tls: env_bool("TEMPO_SERVER_SMTP_USE_TLS"),
			}),
			email: Some(EmailConfigLayer {
				test_recipient: env_var("TEMPO_SERVER_EMAIL_TEST_RECIPIENT"),
			}),
			scheduler: Some(SchedulerConfigLayer {
				enabled: env_bool("TEMPO_SERVER_SCHEDULER_ENABLED"),
				email_cron: env_var("TEMPO_SERVER_SCHEDULER_EMAIL_CRON"),
				heartbeat_interval_secs: env_u64("TEMPO_SERVER_SCHEDULER_HEARTBEAT_INTERVAL_SECS")?,
			}),
			logging: Some(LoggingConfigLayer {
				level: env_var("TEMPO_SERVER_LOGGING_LEVEL"),
			}),
		})
	}
}

fn env_var(name: &str) -> Option<String> {
	std::env::var(name).ok().filter(|s| !s.is_empty())
}

fn env_bool(name: &str) -> Option<bool> {
	env_var(name).map(|v| v.eq_ignore_ascii_case("true") || v == "1")
}

fn env_u16(name: &str) -> Result<Option<u16>, ConfigError> {
	match env_var(name) {
		Some(v) => v.parse().map(Some).map_err(|_| ConfigError::InvalidValue {
			key: name.to_string(),
			value: v,
		}),
		None => Ok(None),
	}
}

fn env_u64(name: &str) -> Result<Option<u64>, ConfigError> {
	match env_var(name) {
		Some(v) => v.parse().map(Some).map_err(|_| ConfigError::InvalidValue {
			key: name.to_string(),
			value: v,
		}),
		None => Ok(None),
	}
}
