//! Issuance engine serving the CA operations.
//!
//! The engine owns the order store and the issuance scheduler. HTTP handlers
//! call into it and never touch the store directly.

use crate::scheduler::{IssuanceScheduler, ShutdownReport};
use ca_config::Config;
use ca_storage::{StorageError, StorageInterface};
use ca_types::{new_session_token, EnrollParams, OrderId, OrderStatus};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, instrument, warn};

/// Errors that can occur during engine operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
	/// No order matches the requested identifier.
	#[error("Order not found: {0}")]
	OrderNotFound(String),
	/// The order exists but is not issued.
	#[error("Certificate not ready (status: {status})")]
	NotReady { id: OrderId, status: OrderStatus },
	/// The store failed for a reason unrelated to the request.
	#[error("Storage error: {0}")]
	Storage(String),
}

impl From<StorageError> for EngineError {
	fn from(err: StorageError) -> Self {
		match err {
			StorageError::NotFound(id) => EngineError::OrderNotFound(id),
			StorageError::NotReady { id, status } => EngineError::NotReady { id, status },
			other => EngineError::Storage(other.to_string()),
		}
	}
}

/// Main engine coordinating the order store and delayed issuance.
pub struct CaEngine {
	/// Service configuration.
	config: Config,
	/// Order store shared with the scheduler.
	storage: Arc<dyn StorageInterface>,
	/// Runs the delayed issuance step.
	scheduler: IssuanceScheduler,
}

impl CaEngine {
	/// Creates an engine over `storage`, issuing orders after the configured
	/// delay.
	pub fn new(config: Config, storage: Arc<dyn StorageInterface>) -> Self {
		let scheduler = IssuanceScheduler::new(Arc::clone(&storage), config.issuance.delay());
		Self {
			config,
			storage,
			scheduler,
		}
	}

	/// Returns a reference to the configuration.
	pub fn config(&self) -> &Config {
		&self.config
	}

	/// Accepts any credentials and returns a fresh session token.
	///
	/// The token is never stored or checked by later calls.
	pub fn authenticate(&self, login_name: &str) -> String {
		let token = new_session_token();
		info!(login_name, "Authenticated");
		token
	}

	/// Creates a pending order and schedules its issuance.
	///
	/// Returns once the order is visible in the store, without waiting for
	/// the issuance delay.
	#[instrument(skip_all, fields(product_code = params.product_code, term = params.term))]
	pub async fn enroll(&self, params: EnrollParams) -> Result<OrderId, EngineError> {
		let id = self.storage.create(params).await?;
		self.scheduler.schedule(id).await;
		info!(order_id = %id, "Order created");
		Ok(id)
	}

	/// Returns the current status of the order.
	pub async fn status(&self, id: OrderId) -> Result<OrderStatus, EngineError> {
		Ok(self.storage.get(id).await?.status)
	}

	/// Returns the certificate of an issued order.
	pub async fn collect(&self, id: OrderId) -> Result<String, EngineError> {
		Ok(self.storage.certificate_if_ready(id).await?)
	}

	/// Revokes the order whose decimal identifier equals `external_id`.
	pub async fn revoke(&self, external_id: &str) -> Result<OrderId, EngineError> {
		match self.storage.revoke_by_external_id(external_id).await {
			Ok(id) => {
				info!(order_id = %id, "Order revoked");
				Ok(id)
			},
			Err(e) => {
				warn!(ssl_id = external_id, error = %e, "Revocation did not match an order");
				Err(e.into())
			},
		}
	}

	/// Number of orders held by the store.
	pub async fn order_count(&self) -> usize {
		self.storage.len().await
	}

	/// Number of issuance tasks still waiting for their delay.
	pub async fn outstanding_issuances(&self) -> usize {
		self.scheduler.outstanding().await
	}

	/// Stops the issuance scheduler, draining or aborting outstanding tasks
	/// per `issuance.drain_on_shutdown`.
	pub async fn shutdown(&self) -> ShutdownReport {
		self.scheduler
			.shutdown(self.config.issuance.drain_on_shutdown)
			.await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use ca_storage::implementations::memory::MemoryStorage;
	use ca_types::PLACEHOLDER_CERTIFICATE;
	use std::time::Duration;

	fn engine() -> CaEngine {
		let config: Config = r#"
[service]
id = "mock-ca"

[storage]
primary = "memory"
[storage.implementations.memory]
"#
		.parse()
		.unwrap();
		CaEngine::new(config, Arc::new(MemoryStorage::default()))
	}

	#[test]
	fn test_authenticate_returns_fresh_tokens() {
		let engine = engine();
		let first = engine.authenticate("alice");
		let second = engine.authenticate("");
		assert_eq!(first.len(), 32);
		assert_ne!(first, second);
	}

	#[tokio::test(start_paused = true)]
	async fn test_enroll_then_collect_after_delay() {
		let engine = engine();
		let id = engine
			.enroll(EnrollParams::from_csr("CSR-A"))
			.await
			.unwrap();

		assert_eq!(id, OrderId(12345));
		assert_eq!(engine.status(id).await, Ok(OrderStatus::Pending));
		assert_eq!(
			engine.collect(id).await,
			Err(EngineError::NotReady {
				id,
				status: OrderStatus::Pending
			})
		);

		tokio::time::sleep(Duration::from_secs(6)).await;

		assert_eq!(engine.status(id).await, Ok(OrderStatus::Issued));
		assert_eq!(
			engine.collect(id).await.unwrap(),
			PLACEHOLDER_CERTIFICATE
		);
	}

	#[tokio::test(start_paused = true)]
	async fn test_revoke_then_reject_collect() {
		let engine = engine();
		let id = engine
			.enroll(EnrollParams::from_csr("CSR-A"))
			.await
			.unwrap();

		assert_eq!(engine.revoke("12345").await, Ok(id));
		tokio::time::sleep(Duration::from_secs(6)).await;

		assert_eq!(engine.status(id).await, Ok(OrderStatus::Revoked));
		assert!(matches!(
			engine.collect(id).await,
			Err(EngineError::NotReady {
				status: OrderStatus::Revoked,
				..
			})
		));
	}

	#[tokio::test]
	async fn test_unknown_order_errors() {
		let engine = engine();
		assert_eq!(
			engine.status(OrderId(99999)).await,
			Err(EngineError::OrderNotFound("99999".to_string()))
		);
		assert_eq!(
			engine.revoke("99999").await,
			Err(EngineError::OrderNotFound("99999".to_string()))
		);
		assert_eq!(engine.order_count().await, 0);
	}

	#[tokio::test(start_paused = true)]
	async fn test_shutdown_aborts_by_default() {
		let engine = engine();
		let id = engine
			.enroll(EnrollParams::from_csr("CSR-A"))
			.await
			.unwrap();
		assert_eq!(engine.outstanding_issuances().await, 1);

		let report = engine.shutdown().await;
		assert_eq!(report.aborted, 1);
		assert_eq!(engine.status(id).await, Ok(OrderStatus::Pending));
	}
}
