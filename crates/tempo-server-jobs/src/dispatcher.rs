// Copyright (c) 2025 tempo contributors. All rights reserved.
// SPDX-License-Identifier: MIT

use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use tempo_server_lock::{LeaseProvider, LeaseSpec};

use crate::error::Result;
use crate::job::{Job, JobContext};
use crate::schedule::Cadence;

struct RegisteredJob {
	job: Arc<dyn Job>,
	cadence: Cadence,
	lease: LeaseSpec,
}

/// Fires each registered job on its own cadence, gated by a lease named
/// after the job. One dispatcher is constructed at process start and owns
/// every per-job timer loop.
pub struct Dispatcher {
	jobs: HashMap<String, RegisteredJob>,
	leases: Arc<dyn LeaseProvider>,
	shutdown_tx: broadcast::Sender<()>,
	handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Dispatcher {
	pub fn new(leases: Arc<dyn LeaseProvider>) -> Self {
		let (shutdown_tx, _) = broadcast::channel(1);
		Self {
			jobs: HashMap::new(),
			leases,
			shutdown_tx,
			handles: Mutex::new(Vec::new()),
		}
	}

	/// Register a job with its cadence and lease hold bounds. Invalid
	/// bounds (empty id, `min_hold > max_hold`) are rejected here, before
	/// any scheduling begins. Registering the same id again replaces the
	/// earlier registration.
	pub fn register(
		&mut self,
		job: Arc<dyn Job>,
		cadence: Cadence,
		min_hold: Duration,
		max_hold: Duration,
	) -> Result<()> {
		let lease = LeaseSpec::new(job.id(), min_hold, max_hold)?;
		let id = job.id().to_string();
		self.jobs.insert(id, RegisteredJob { job, cadence, lease });
		Ok(())
	}

	#[instrument(skip(self))]
	pub async fn start(&self) {
		let mut handles = self.handles.lock().await;

		for (job_id, registered) in &self.jobs {
			let job = Arc::clone(&registered.job);
			let leases = Arc::clone(&self.leases);
			let cadence = registered.cadence.clone();
			let lease = registered.lease.clone();
			let mut shutdown_rx = self.shutdown_tx.subscribe();
			let job_id = job_id.clone();

			let handle = tokio::spawn(async move {
				// Fires are anchored to the schedule, not to body completion:
				// a body that overruns the interval delays the next fire but
				// never shifts the cadence.
				let mut anchor = Utc::now();
				loop {
					let Some(next) = cadence.next_fire(anchor) else {
						warn!(job_id = %job_id, "cadence has no further fire times");
						break;
					};
					let delay = (next - Utc::now()).to_std().unwrap_or(Duration::ZERO);

					tokio::select! {
						_ = tokio::time::sleep(delay) => {
							run_guarded(&job, &leases, &lease).await;
							anchor = next;
						}
						_ = shutdown_rx.recv() => {
							info!(job_id = %job_id, "shutting down job loop");
							break;
						}
					}
				}
			});

			handles.push(handle);
		}

		info!(job_count = handles.len(), "dispatcher started");
	}

	#[instrument(skip(self))]
	pub async fn shutdown(&self) {
		let _ = self.shutdown_tx.send(());

		let mut handles = self.handles.lock().await;
		for handle in handles.drain(..) {
			let _ = handle.await;
		}

		info!("dispatcher shut down");
	}

	pub fn job_ids(&self) -> Vec<String> {
		self.jobs.keys().cloned().collect()
	}
}

/// One tick: try the lease, run the body if granted, always release.
///
/// Denials and store outages both skip this tick; a store outage is logged
/// louder because it means infrastructure trouble, but scheduling-wise it
/// is the same skip. Body failures and body panics are logged and
/// contained here; the timer loop never sees them. A failed release is
/// swallowed: the lease expires on its own at `max_hold` and correctness
/// is unaffected.
async fn run_guarded(job: &Arc<dyn Job>, leases: &Arc<dyn LeaseProvider>, lease: &LeaseSpec) {
	let handle = match leases.acquire(lease).await {
		Ok(Some(handle)) => handle,
		Ok(None) => {
			debug!(job_id = %job.id(), "skipped: lock held by another instance");
			return;
		}
		Err(e) => {
			warn!(job_id = %job.id(), error = %e, "skipped: lock store unavailable");
			return;
		}
	};

	let run_id = uuid::Uuid::new_v4().to_string();
	let started = std::time::Instant::now();

	// The body runs in its own task so a panic is contained there: it
	// surfaces as a JoinError instead of unwinding through the timer
	// loop, and the release below still happens.
	let body = {
		let job = Arc::clone(job);
		let ctx = JobContext {
			run_id: run_id.clone(),
			fired_at: handle.acquired_at,
		};
		tokio::spawn(async move { job.run(&ctx).await })
	};

	match body.await {
		Ok(Ok(output)) => info!(
			job_id = %job.id(),
			run_id = %run_id,
			duration_ms = started.elapsed().as_millis() as u64,
			message = %output.message,
			"job completed"
		),
		Ok(Err(e)) => warn!(
			job_id = %job.id(),
			run_id = %run_id,
			error = %e,
			"job failed"
		),
		Err(e) => warn!(
			job_id = %job.id(),
			run_id = %run_id,
			panicked = e.is_panic(),
			"job body aborted"
		),
	}

	if let Err(e) = leases.release(&handle).await {
		warn!(
			job_id = %job.id(),
			error = %e,
			"lock release failed; lease will expire on its own"
		);
	}
}
