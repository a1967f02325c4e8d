//! In-memory order store.
//!
//! Orders live in a `HashMap` behind a single `RwLock`: lookups take the
//! shared guard, creation and status changes take the exclusive one. Nothing
//! survives a restart.

use crate::{StorageError, StorageFactory, StorageInterface, StorageRegistry};
use async_trait::async_trait;
use ca_types::{
	current_timestamp, EnrollParams, ImplementationRegistry, Order, OrderId, OrderIdGenerator,
	OrderStatus, DEFAULT_FIRST_ORDER_ID,
};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// In-memory storage implementation.
pub struct MemoryStorage {
	/// Identifier source; only advanced while the write guard is held.
	ids: OrderIdGenerator,
	/// The order collection protected by a read-write lock.
	orders: RwLock<HashMap<OrderId, Order>>,
}

impl MemoryStorage {
	/// Creates an empty store whose first order gets identifier `first_order_id`.
	pub fn new(first_order_id: u64) -> Self {
		Self {
			ids: OrderIdGenerator::new(first_order_id),
			orders: RwLock::new(HashMap::new()),
		}
	}
}

impl Default for MemoryStorage {
	fn default() -> Self {
		Self::new(DEFAULT_FIRST_ORDER_ID)
	}
}

#[async_trait]
impl StorageInterface for MemoryStorage {
	async fn create(&self, params: EnrollParams) -> Result<OrderId, StorageError> {
		let mut orders = self.orders.write().await;
		// Allocated under the guard so allocation order matches insertion order.
		let id = self.ids.next_order_id();
		orders.insert(id, Order::pending(id, params, current_timestamp()));
		debug!(order_id = %id, total = orders.len(), "Stored pending order");
		Ok(id)
	}

	async fn get(&self, id: OrderId) -> Result<Order, StorageError> {
		let orders = self.orders.read().await;
		orders
			.get(&id)
			.cloned()
			.ok_or_else(|| StorageError::NotFound(id.to_string()))
	}

	async fn mark_issued(&self, id: OrderId) -> Result<OrderStatus, StorageError> {
		let mut orders = self.orders.write().await;
		let order = orders
			.get_mut(&id)
			.ok_or_else(|| StorageError::NotFound(id.to_string()))?;

		if !order.status.can_transition_to(OrderStatus::Issued) {
			warn!(order_id = %id, status = %order.status, "Order revoked before issuance, skipping");
			return Ok(order.status);
		}

		if order.status != OrderStatus::Issued {
			order.status = OrderStatus::Issued;
			order.updated_at = current_timestamp();
		}

		Ok(order.status)
	}

	async fn revoke_by_external_id(&self, external_id: &str) -> Result<OrderId, StorageError> {
		let mut orders = self.orders.write().await;
		let order = orders
			.values_mut()
			.find(|order| order.id.to_string() == external_id)
			.ok_or_else(|| StorageError::NotFound(external_id.to_string()))?;

		if order.status != OrderStatus::Revoked {
			order.status = OrderStatus::Revoked;
			order.updated_at = current_timestamp();
		}

		Ok(order.id)
	}

	async fn certificate_if_ready(&self, id: OrderId) -> Result<String, StorageError> {
		let orders = self.orders.read().await;
		let order = orders
			.get(&id)
			.ok_or_else(|| StorageError::NotFound(id.to_string()))?;

		order
			.released_certificate()
			.map(str::to_string)
			.ok_or(StorageError::NotReady {
				id,
				status: order.status,
			})
	}

	async fn len(&self) -> usize {
		self.orders.read().await.len()
	}
}

/// Factory function to create a memory storage backend from configuration.
///
/// Configuration parameters:
/// - `first_order_id` (optional, positive integer): identifier of the first
///   order, 12345 when omitted.
pub fn create_storage(config: &toml::Value) -> Result<Box<dyn StorageInterface>, StorageError> {
	let first_order_id = match config.get("first_order_id") {
		None => DEFAULT_FIRST_ORDER_ID,
		Some(value) => value
			.as_integer()
			.filter(|n| *n > 0)
			.map(|n| n as u64)
			.ok_or_else(|| {
				StorageError::Configuration(format!(
					"first_order_id must be a positive integer, got {}",
					value
				))
			})?,
	};

	Ok(Box::new(MemoryStorage::new(first_order_id)))
}

/// Registry for the memory storage implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "memory";
	type Factory = StorageFactory;

	fn factory() -> Self::Factory {
		create_storage
	}
}

impl StorageRegistry for Registry {}
