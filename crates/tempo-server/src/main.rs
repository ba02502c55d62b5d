// Copyright (c) 2025 tempo contributors. All rights reserved.
// SPDX-License-Identifier: MIT

//! tempo server binary.
//!
//! Wires together the lock store, lease manager, dispatcher, and HTTP
//! surface. Run several instances against the same SQLite database to see
//! the lease coordination in action: every scheduled run is executed by
//! exactly one instance.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tempo_server::jobs::{HeartbeatJob, SendTestEmailJob};
use tempo_server::{create_router, email::EmailService, AppState};
use tempo_server_db::{create_pool, init_schema, EmailLogRepository};
use tempo_server_jobs::{Cadence, Dispatcher};
use tempo_server_lock::{
	process_identity, InstrumentedLeaseManager, LeaseManager, LeaseProvider, SqliteLockStore,
};
use tempo_server_smtp::SmtpClient;

/// Lease bounds for the email job. The minimum hold suppresses duplicate
/// sends from clock-skewed instances inside the same minute; the maximum
/// hold bounds how long a crashed holder blocks successors.
const EMAIL_MIN_HOLD: Duration = Duration::from_secs(60);
const EMAIL_MAX_HOLD: Duration = Duration::from_secs(9 * 60);

/// Lease bounds for the heartbeat job, sized under its 30s default rate.
const HEARTBEAT_MIN_HOLD: Duration = Duration::from_secs(10);
const HEARTBEAT_MAX_HOLD: Duration = Duration::from_secs(25);

/// tempo server - lease-coordinated scheduled jobs.
#[derive(Parser, Debug)]
#[command(name = "tempo-server", about = "tempo scheduled job server", version)]
struct Args {
	/// Path to a TOML config file (default: /etc/tempo/server.toml)
	#[arg(long)]
	config: Option<PathBuf>,

	#[command(subcommand)]
	command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Show version information
	Version,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	if let Some(Command::Version) = args.command {
		println!("tempo-server {}", env!("CARGO_PKG_VERSION"));
		return Ok(());
	}

	// Load .env file if present
	dotenvy::dotenv().ok();

	let config = match &args.config {
		Some(path) => tempo_server_config::load_config_with_file(path)?,
		None => tempo_server_config::load_config()?,
	};

	tracing_subscriber::registry()
		.with(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| config.logging.level.clone().into()),
		)
		.with(tracing_subscriber::fmt::layer())
		.init();

	let identity = process_identity();

	tracing::info!(
		host = %config.http.host,
		port = config.http.port,
		database = %config.database.url,
		instance = %identity,
		"starting tempo-server"
	);

	let pool = create_pool(&config.database.url).await?;
	init_schema(&pool).await?;

	// Lock store and lease provider shared by all jobs
	let store = Arc::new(SqliteLockStore::new(pool.clone(), identity.clone()));
	let manager: Arc<dyn LeaseProvider> = Arc::new(LeaseManager::new(store));
	let leases: Arc<dyn LeaseProvider> =
		Arc::new(InstrumentedLeaseManager::with_identity(manager, identity.clone()));

	let email_log = EmailLogRepository::new(pool.clone());

	// Email service only exists when SMTP is configured
	let email_service = match config.smtp.clone() {
		Some(smtp_config) => {
			let client = Arc::new(SmtpClient::new(smtp_config)?);
			Some(Arc::new(EmailService::new(
				client,
				email_log.clone(),
				config.email.test_recipient.clone(),
				identity.clone(),
			)))
		}
		None => {
			tracing::warn!("smtp not configured, email sending disabled");
			None
		}
	};

	let mut dispatcher = Dispatcher::new(leases);

	dispatcher.register(
		Arc::new(HeartbeatJob::new(identity.clone())),
		Cadence::fixed_rate(Duration::from_secs(config.scheduler.heartbeat_interval_secs))?,
		HEARTBEAT_MIN_HOLD,
		HEARTBEAT_MAX_HOLD,
	)?;

	if let Some(ref email) = email_service {
		dispatcher.register(
			Arc::new(SendTestEmailJob::new(Arc::clone(email))),
			Cadence::cron(&config.scheduler.email_cron)?,
			EMAIL_MIN_HOLD,
			EMAIL_MAX_HOLD,
		)?;
	}

	let dispatcher = Arc::new(dispatcher);

	if config.scheduler.enabled {
		dispatcher.start().await;
		tracing::info!(jobs = ?dispatcher.job_ids(), "dispatcher started");
	} else {
		tracing::info!("scheduler disabled by configuration");
	}

	let state = AppState {
		email: email_service,
		email_log,
		identity,
		scheduler_enabled: config.scheduler.enabled,
	};

	let app = create_router(state).layer(TraceLayer::new_for_http());

	let addr = config.socket_addr();
	tracing::info!("listening on {}", addr);

	let listener = tokio::net::TcpListener::bind(&addr).await?;

	// Run server with graceful shutdown
	tokio::select! {
		result = axum::serve(listener, app) => {
			if let Err(e) = result {
				tracing::error!(error = %e, "server error");
			}
		}
		_ = tokio::signal::ctrl_c() => {
			tracing::info!("received shutdown signal");
			dispatcher.shutdown().await;
		}
	}

	tracing::info!("server shutdown complete");
	Ok(())
}
