//! Order store for the mock CA issuance service.
//!
//! The store owns every order and is the only place order state changes.
//! Backends implement [`StorageInterface`]; callers only ever see cloned
//! snapshots of an order, never a reference into the collection.

use async_trait::async_trait;
use ca_types::{EnrollParams, ImplementationRegistry, Order, OrderId, OrderStatus};
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod memory;
}

/// Errors that can occur during storage operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StorageError {
	/// No order matches the requested identifier.
	#[error("Order not found: {0}")]
	NotFound(String),
	/// The order exists but its certificate has not been released.
	#[error("Certificate not ready (status: {status})")]
	NotReady { id: OrderId, status: OrderStatus },
	/// Error that occurs during configuration validation.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// Operations every order store backend provides.
///
/// All reads and writes of a backend go through one guard over the whole
/// collection, so no caller can observe a partially updated order and
/// operations on the same identifier are totally ordered.
#[async_trait]
pub trait StorageInterface: Send + Sync {
	/// Allocates an identifier and inserts a pending order with the
	/// placeholder certificate. The order is visible to readers once this
	/// returns.
	async fn create(&self, params: EnrollParams) -> Result<OrderId, StorageError>;

	/// Returns a snapshot of the order.
	async fn get(&self, id: OrderId) -> Result<Order, StorageError>;

	/// Moves a pending order to issued and returns the status the order ends
	/// up in.
	///
	/// Calling it on an issued order is a no-op. A revoked order stays
	/// revoked: the returned status is then `Revoked`.
	async fn mark_issued(&self, id: OrderId) -> Result<OrderStatus, StorageError>;

	/// Revokes the order whose decimal identifier equals `external_id`.
	///
	/// This is a linear scan over the collection, O(n) in the number of
	/// orders, comparing string renderings rather than parsing the input.
	/// Revoking an already revoked order succeeds again. Strings that match
	/// nothing, including non-numeric ones, report `NotFound`.
	async fn revoke_by_external_id(&self, external_id: &str) -> Result<OrderId, StorageError>;

	/// Returns the certificate body when the order is issued, `NotReady`
	/// otherwise.
	async fn certificate_if_ready(&self, id: OrderId) -> Result<String, StorageError>;

	/// Number of orders held.
	async fn len(&self) -> usize;

	/// Returns true when no order has been created yet.
	async fn is_empty(&self) -> bool {
		self.len().await == 0
	}
}

/// Type alias for storage factory functions.
///
/// This is the function signature that all storage implementations must provide
/// to create instances of their storage interface.
pub type StorageFactory = fn(&toml::Value) -> Result<Box<dyn StorageInterface>, StorageError>;

/// Registry trait for storage implementations.
pub trait StorageRegistry: ImplementationRegistry<Factory = StorageFactory> {}

/// Get all registered storage implementations.
///
/// Returns a vector of (name, factory) tuples for all available storage implementations.
pub fn get_all_implementations() -> Vec<(&'static str, StorageFactory)> {
	use implementations::memory;

	vec![(memory::Registry::NAME, memory::Registry::factory())]
}
