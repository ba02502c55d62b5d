// Copyright (c) 2025 tempo contributors. All rights reserved.
// SPDX-License-Identifier: MIT

//! Job cadences: fixed-rate intervals and cron expressions.

use chrono::{DateTime, Utc};
use cron::Schedule;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{JobError, Result};

/// How often a job's timer fires. Independent of the job's lease bounds:
/// the cadence says when this instance *tries*, the lease decides who runs.
#[derive(Debug, Clone)]
pub enum Cadence {
	FixedRate(Duration),
	Cron(Box<Schedule>),
}

impl Cadence {
	pub fn fixed_rate(interval: Duration) -> Result<Self> {
		if interval.is_zero() {
			return Err(JobError::InvalidCadence(
				"fixed-rate interval must be positive".to_string(),
			));
		}
		Ok(Cadence::FixedRate(interval))
	}

	/// Accepts standard 5-field Unix cron expressions ("0 * * * *") as
	/// well as the extended 6/7-field form.
	pub fn cron(expression: &str) -> Result<Self> {
		let normalized = normalize_cron(expression);
		let schedule =
			Schedule::from_str(&normalized).map_err(|e| JobError::InvalidCadence(e.to_string()))?;
		Ok(Cadence::Cron(Box::new(schedule)))
	}

	/// The next time the timer should fire, strictly after `after`.
	/// Callers pass the previous scheduled fire time, so fixed-rate
	/// cadences stay anchored to the schedule regardless of how long each
	/// body takes. `None` only for cron schedules that have run out of
	/// occurrences.
	pub fn next_fire(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
		match self {
			Cadence::FixedRate(interval) => {
				Some(after + chrono::Duration::from_std(*interval).ok()?)
			}
			Cadence::Cron(schedule) => schedule.after(&after).next(),
		}
	}
}

/// Convert a 5-field Unix cron expression to the 7-field format the `cron`
/// crate expects: prepend "0" seconds, append "*" years. Expressions that
/// already have 6+ fields pass through; anything else is left for the
/// parser to reject.
fn normalize_cron(expression: &str) -> String {
	match expression.split_whitespace().count() {
		5 => format!("0 {expression} *"),
		_ => expression.to_string(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::TimeZone;

	#[test]
	fn test_five_field_cron_is_normalized() {
		assert_eq!(normalize_cron("0 * * * *"), "0 0 * * * * *");
	}

	#[test]
	fn test_extended_cron_passes_through() {
		assert_eq!(normalize_cron("0 0 * * * *"), "0 0 * * * *");
	}

	#[test]
	fn test_cron_every_minute_next_fire() {
		let cadence = Cadence::cron("* * * * *").unwrap();
		let after = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 30).unwrap();
		assert_eq!(
			cadence.next_fire(after),
			Some(Utc.with_ymd_and_hms(2025, 6, 1, 12, 1, 0).unwrap())
		);
	}

	#[test]
	fn test_cron_hourly_next_fire() {
		let cadence = Cadence::cron("0 * * * *").unwrap();
		let after = Utc.with_ymd_and_hms(2025, 6, 1, 12, 15, 0).unwrap();
		assert_eq!(
			cadence.next_fire(after),
			Some(Utc.with_ymd_and_hms(2025, 6, 1, 13, 0, 0).unwrap())
		);
	}

	#[test]
	fn test_invalid_cron_is_rejected() {
		assert!(matches!(
			Cadence::cron("not a cron"),
			Err(JobError::InvalidCadence(_))
		));
	}

	#[test]
	fn test_zero_interval_is_rejected() {
		assert!(matches!(
			Cadence::fixed_rate(Duration::ZERO),
			Err(JobError::InvalidCadence(_))
		));
	}

	#[test]
	fn test_fixed_rate_next_fire() {
		let cadence = Cadence::fixed_rate(Duration::from_secs(30)).unwrap();
		let after = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
		assert_eq!(
			cadence.next_fire(after),
			Some(Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 30).unwrap())
		);
	}
}
