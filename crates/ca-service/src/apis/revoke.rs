//! Certificate revocation.
//!
//! A revocation that matches no order is still answered with 200; the
//! outcome is carried in the body.

use super::{decode_body, engine_error};
use ca_core::{CaEngine, EngineError};
use ca_types::{APIError, RevokeRequest, RevokeResponse};

/// Handles `POST /revoke`.
pub async fn revoke(body: &[u8], engine: &CaEngine) -> Result<RevokeResponse, APIError> {
	let request: RevokeRequest = decode_body(body)?;

	if !request.reason.is_empty() {
		tracing::debug!(ssl_id = %request.ssl_id, reason = %request.reason, "Revocation requested");
	}

	match engine.revoke(&request.ssl_id).await {
		Ok(_) => Ok(RevokeResponse::success()),
		Err(EngineError::OrderNotFound(_)) => Ok(RevokeResponse::not_found()),
		Err(e) => Err(engine_error(e)),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use async_trait::async_trait;
	use ca_config::Config;
	use ca_storage::implementations::memory::MemoryStorage;
	use ca_storage::{StorageError, StorageInterface};
	use ca_types::{EnrollParams, Order, OrderId, OrderStatus, RevokeOutcome};
	use std::sync::Arc;

	/// Store whose every operation fails with a configuration error.
	struct MisconfiguredStorage;

	fn misconfigured() -> StorageError {
		StorageError::Configuration("store not initialised".to_string())
	}

	#[async_trait]
	impl StorageInterface for MisconfiguredStorage {
		async fn create(&self, _params: EnrollParams) -> Result<OrderId, StorageError> {
			Err(misconfigured())
		}

		async fn get(&self, _id: OrderId) -> Result<Order, StorageError> {
			Err(misconfigured())
		}

		async fn mark_issued(&self, _id: OrderId) -> Result<OrderStatus, StorageError> {
			Err(misconfigured())
		}

		async fn revoke_by_external_id(&self, _external_id: &str) -> Result<OrderId, StorageError> {
			Err(misconfigured())
		}

		async fn certificate_if_ready(&self, _id: OrderId) -> Result<String, StorageError> {
			Err(misconfigured())
		}

		async fn len(&self) -> usize {
			0
		}
	}

	fn engine_over(storage: Arc<dyn StorageInterface>) -> CaEngine {
		let config: Config = r#"
[service]
id = "mock-ca"

[storage]
primary = "memory"
[storage.implementations.memory]
"#
		.parse()
		.unwrap();
		CaEngine::new(config, storage)
	}

	#[tokio::test]
	async fn test_unmatched_id_reports_failure_outcome() {
		let engine = engine_over(Arc::new(MemoryStorage::default()));
		let response = revoke(br#"{"sslId":"12345"}"#, &engine).await.unwrap();
		assert_eq!(response.status, RevokeOutcome::Failure);
		assert_eq!(response.message, "Order not found");
	}

	#[tokio::test]
	async fn test_store_failure_is_not_reported_as_not_found() {
		let engine = engine_over(Arc::new(MisconfiguredStorage));
		let err = revoke(br#"{"sslId":"12345"}"#, &engine).await.unwrap_err();
		assert_eq!(err.status_code(), 500);
		assert_eq!(err.to_error_response().error, "STORAGE_ERROR");
	}
}
