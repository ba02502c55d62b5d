// Copyright (c) 2025 tempo contributors. All rights reserved.
// SPDX-License-Identifier: MIT

//! Scheduler configuration.
//!
//! `enabled = false` leaves the dispatcher constructed but never started,
//! for instances that should serve HTTP only.

use serde::Deserialize;

#[derive(Debug, Clone, PartialEq)]
pub struct SchedulerConfig {
	pub enabled: bool,
	/// 5-field cron expression for the test email job.
	pub email_cron: String,
	pub heartbeat_interval_secs: u64,
}

impl Default for SchedulerConfig {
	fn default() -> Self {
		Self {
			enabled: true,
			email_cron: "* * * * *".to_string(),
			heartbeat_interval_secs: 30,
		}
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SchedulerConfigLayer {
	#[serde(default)]
	pub enabled: Option<bool>,
	#[serde(default)]
	pub email_cron: Option<String>,
	#[serde(default)]
	pub heartbeat_interval_secs: Option<u64>,
}

impl SchedulerConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.enabled.is_some() {
			self.enabled = other.enabled;
		}
		if other.email_cron.is_some() {
			self.email_cron = other.email_cron;
		}
		if other.heartbeat_interval_secs.is_some() {
			self.heartbeat_interval_secs = other.heartbeat_interval_secs;
		}
	}

	pub fn finalize(self) -> SchedulerConfig {
		let defaults = SchedulerConfig::default();
		SchedulerConfig {
			enabled: self.enabled.unwrap_or(defaults.enabled),
			email_cron: self.email_cron.unwrap_or(defaults.email_cron),
			heartbeat_interval_secs: self
				.heartbeat_interval_secs
				.unwrap_or(defaults.heartbeat_interval_secs),
		}
	}
}
