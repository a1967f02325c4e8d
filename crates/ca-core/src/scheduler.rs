//! Delayed issuance of enrolled orders.
//!
//! Every enrollment schedules one task that sleeps for the configured delay
//! and then asks the store to mark the order issued. Tasks are tracked in a
//! `JoinSet` so shutdown can either wait for them or abort them.

use ca_storage::StorageInterface;
use ca_types::OrderId;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tracing::{debug, info, instrument, warn};

/// Outcome of stopping the scheduler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShutdownReport {
	/// Tasks that ran to completion during shutdown.
	pub completed: usize,
	/// Tasks cancelled before their delay elapsed.
	pub aborted: usize,
}

/// Runs the delayed `Pending -> Issued` step for enrolled orders.
pub struct IssuanceScheduler {
	storage: Arc<dyn StorageInterface>,
	delay: Duration,
	tasks: Mutex<JoinSet<()>>,
}

impl IssuanceScheduler {
	pub fn new(storage: Arc<dyn StorageInterface>, delay: Duration) -> Self {
		Self {
			storage,
			delay,
			tasks: Mutex::new(JoinSet::new()),
		}
	}

	/// Schedules issuance of `id` once the delay has elapsed.
	///
	/// Returns immediately; the caller never waits for the delay.
	pub async fn schedule(&self, id: OrderId) {
		let storage = Arc::clone(&self.storage);
		let delay = self.delay;

		let mut tasks = self.tasks.lock().await;
		reap_finished(&mut tasks);
		tasks.spawn(issue_after_delay(storage, id, delay));
		debug!(order_id = %id, outstanding = tasks.len(), "Scheduled issuance");
	}

	/// Number of issuance tasks that have not been reaped yet.
	pub async fn outstanding(&self) -> usize {
		let mut tasks = self.tasks.lock().await;
		reap_finished(&mut tasks);
		tasks.len()
	}

	/// Stops the scheduler.
	///
	/// With `drain` set, waits for every outstanding task to finish its delay
	/// and issue its order. Otherwise aborts them, leaving their orders pending.
	pub async fn shutdown(&self, drain: bool) -> ShutdownReport {
		let mut tasks = self.tasks.lock().await;
		let mut report = ShutdownReport::default();

		if drain {
			while let Some(result) = tasks.join_next().await {
				if let Err(e) = result {
					warn!(error = %e, "Issuance task failed during drain");
				}
				report.completed += 1;
			}
		} else {
			report.aborted = tasks.len();
			tasks.shutdown().await;
		}

		info!(
			completed = report.completed,
			aborted = report.aborted,
			"Issuance scheduler stopped"
		);
		report
	}
}

/// Drops finished tasks so the set only holds outstanding ones.
fn reap_finished(tasks: &mut JoinSet<()>) {
	while let Some(result) = tasks.try_join_next() {
		if let Err(e) = result {
			warn!(error = %e, "Issuance task failed");
		}
	}
}

#[instrument(skip_all, fields(order_id = %id))]
async fn issue_after_delay(storage: Arc<dyn StorageInterface>, id: OrderId, delay: Duration) {
	tokio::time::sleep(delay).await;

	match storage.mark_issued(id).await {
		Ok(status) => info!(%status, "Issuance step completed"),
		Err(e) => warn!(error = %e, "Issuance step failed"),
	}
}
