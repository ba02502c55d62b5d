// Copyright (c) 2025 tempo contributors. All rights reserved.
// SPDX-License-Identifier: MIT

//! Manual-test HTTP endpoints.
//!
//! These exist so an operator can poke a running deployment: fire an email
//! outside the schedule, check per-instance health, and see which instance
//! answered. None of them are load-bearing for the scheduler itself.

use std::sync::Arc;

use axum::{
	extract::State,
	http::StatusCode,
	response::{IntoResponse, Json},
	routing::get,
	Router,
};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::error;

use tempo_server_db::EmailLogRepository;

use crate::email::EmailService;

#[derive(Clone)]
pub struct AppState {
	/// Present only when SMTP is configured.
	pub email: Option<Arc<EmailService>>,
	pub email_log: EmailLogRepository,
	pub identity: String,
	pub scheduler_enabled: bool,
}

pub fn create_router(state: AppState) -> Router {
	Router::new()
		.route("/api/test/send-email", get(send_test_email))
		.route("/api/test/health", get(health))
		.route("/api/test/info", get(info))
		.with_state(state)
}

#[derive(Debug, Serialize)]
struct SendEmailResponse {
	status: &'static str,
	message: String,
	instance: String,
	timestamp: DateTime<Utc>,
}

async fn send_test_email(State(state): State<AppState>) -> impl IntoResponse {
	let timestamp = Utc::now();

	let Some(email) = &state.email else {
		return (
			StatusCode::SERVICE_UNAVAILABLE,
			Json(SendEmailResponse {
				status: "error",
				message: "smtp is not configured".to_string(),
				instance: state.identity,
				timestamp,
			}),
		);
	};

	match email.send_test_email().await {
		Ok(()) => (
			StatusCode::OK,
			Json(SendEmailResponse {
				status: "sent",
				message: "test email sent".to_string(),
				instance: state.identity,
				timestamp,
			}),
		),
		Err(e) => {
			error!(error = %e, "manual test email failed");
			(
				StatusCode::INTERNAL_SERVER_ERROR,
				Json(SendEmailResponse {
					status: "error",
					message: format!("send failed: {e}"),
					instance: state.identity,
					timestamp,
				}),
			)
		}
	}
}

#[derive(Debug, Serialize)]
struct HealthResponse {
	status: &'static str,
	instance: String,
	timestamp: DateTime<Utc>,
	scheduler_enabled: bool,
	smtp_configured: bool,
	emails_sent_last_hour: i64,
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
	let cutoff = Utc::now() - Duration::hours(1);
	let emails_sent_last_hour = match state.email_log.count_sent_since(cutoff).await {
		Ok(count) => count,
		Err(e) => {
			error!(error = %e, "email log query failed");
			return (
				StatusCode::INTERNAL_SERVER_ERROR,
				Json(HealthResponse {
					status: "error",
					instance: state.identity,
					timestamp: Utc::now(),
					scheduler_enabled: state.scheduler_enabled,
					smtp_configured: state.email.is_some(),
					emails_sent_last_hour: 0,
				}),
			);
		}
	};

	(
		StatusCode::OK,
		Json(HealthResponse {
			status: "ok",
			instance: state.identity,
			timestamp: Utc::now(),
			scheduler_enabled: state.scheduler_enabled,
			smtp_configured: state.email.is_some(),
			emails_sent_last_hour,
		}),
	)
}

#[derive(Debug, Serialize)]
struct InfoResponse {
	name: &'static str,
	version: &'static str,
	instance: String,
	timestamp: DateTime<Utc>,
}

async fn info(State(state): State<AppState>) -> Json<InfoResponse> {
	Json(InfoResponse {
		name: env!("CARGO_PKG_NAME"),
		version: env!("CARGO_PKG_VERSION"),
		instance: state.identity,
		timestamp: Utc::now(),
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use axum::body::Body;
	use axum::http::Request;
	use tempo_server_db::testing::{create_email_log_table, create_test_pool};
	use tower::util::ServiceExt;

	async fn test_state() -> AppState {
		let pool = create_test_pool().await;
		create_email_log_table(&pool).await;
		AppState {
			email: None,
			email_log: EmailLogRepository::new(pool),
			identity: "node-a".to_string(),
			scheduler_enabled: true,
		}
	}

	#[tokio::test]
	async fn test_health_reports_email_count() {
		let state = test_state().await;
		state
			.email_log
			.log_email("test@example.com", "Hello", "Body", "node-a")
			.await
			.unwrap();

		let app = create_router(state);
		let response = app
			.oneshot(
				Request::builder()
					.uri("/api/test/health")
					.body(Body::empty())
					.unwrap(),
			)
			.await
			.unwrap();

		assert_eq!(response.status(), StatusCode::OK);
		let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
			.await
			.unwrap();
		let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
		assert_eq!(json["status"], "ok");
		assert_eq!(json["instance"], "node-a");
		assert_eq!(json["emails_sent_last_hour"], 1);
	}

	#[tokio::test]
	async fn test_send_email_unavailable_without_smtp() {
		let app = create_router(test_state().await);
		let response = app
			.oneshot(
				Request::builder()
					.uri("/api/test/send-email")
					.body(Body::empty())
					.unwrap(),
			)
			.await
			.unwrap();

		assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
	}

	#[tokio::test]
	async fn test_info_names_the_instance() {
		let app = create_router(test_state().await);
		let response = app
			.oneshot(
				Request::builder()
					.uri("/api/test/info")
					.body(Body::empty())
					.unwrap(),
			)
			.await
			.unwrap();

		assert_eq!(response.status(), StatusCode::OK);
		let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
			.await
			.unwrap();
		let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
		assert_eq!(json["instance"], "node-a");
		assert_eq!(json["name"], "tempo-server");
	}
}
