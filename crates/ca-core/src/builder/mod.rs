//! Builder for constructing issuance engines.
//!
//! Composes a [`CaEngine`] from configuration and a set of named storage
//! factories, so backends can be selected by name in the config file.

use crate::engine::CaEngine;
use ca_config::Config;
use ca_storage::{StorageError, StorageInterface};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur during engine construction.
#[derive(Debug, Error)]
pub enum BuilderError {
	#[error("Configuration error: {0}")]
	Config(String),
	#[error("Missing required component: {0}")]
	MissingComponent(String),
}

/// Factory functions available to the builder, keyed by implementation name.
pub struct CaFactories<SF> {
	pub storage_factories: HashMap<String, SF>,
}

/// Builder for constructing a CaEngine with a pluggable order store.
pub struct CaBuilder {
	config: Config,
}

impl CaBuilder {
	/// Creates a new CaBuilder with the given configuration.
	pub fn new(config: Config) -> Self {
		Self { config }
	}

	/// Builds the engine using the factory registered for the primary
	/// storage implementation.
	pub fn build<SF>(self, factories: CaFactories<SF>) -> Result<CaEngine, BuilderError>
	where
		SF: Fn(&toml::Value) -> Result<Box<dyn StorageInterface>, StorageError>,
	{
		let primary = &self.config.storage.primary;

		let storage_config = self.config.primary_storage_config().ok_or_else(|| {
			BuilderError::Config(format!(
				"Primary storage '{}' not found in implementations",
				primary
			))
		})?;

		let factory = factories.storage_factories.get(primary).ok_or_else(|| {
			BuilderError::MissingComponent(format!("storage implementation '{}'", primary))
		})?;

		let backend = match factory(storage_config) {
			Ok(backend) => {
				tracing::info!(component = "storage", implementation = %primary, "Loaded");
				backend
			},
			Err(e) => {
				tracing::error!(
					component = "storage",
					implementation = %primary,
					error = %e,
					"Failed to create storage implementation"
				);
				return Err(BuilderError::Config(format!(
					"Failed to create storage implementation '{}': {}",
					primary, e
				)));
			},
		};

		let storage: Arc<dyn StorageInterface> = Arc::from(backend);
		Ok(CaEngine::new(self.config, storage))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use ca_storage::get_all_implementations;
	use ca_storage::StorageFactory;

	fn config(storage: &str) -> Config {
		format!(
			r#"
[service]
id = "mock-ca"

[issuance]
delay_seconds = 1

[storage]
primary = "{storage}"
[storage.implementations.{storage}]
first_order_id = 42
"#
		)
		.parse()
		.unwrap()
	}

	fn registered() -> CaFactories<StorageFactory> {
		CaFactories {
			storage_factories: get_all_implementations()
				.into_iter()
				.map(|(name, factory)| (name.to_string(), factory))
				.collect(),
		}
	}

	#[tokio::test]
	async fn test_build_with_memory_storage() {
		let engine = CaBuilder::new(config("memory")).build(registered()).unwrap();

		assert_eq!(engine.config().issuance.delay_seconds, 1);
		let id = engine
			.enroll(ca_types::EnrollParams::from_csr("CSR-A"))
			.await
			.unwrap();
		assert_eq!(id, ca_types::OrderId(42));
	}

	#[test]
	fn test_unregistered_storage_is_missing() {
		let result = CaBuilder::new(config("redis")).build(registered());
		assert!(matches!(result, Err(BuilderError::MissingComponent(_))));
	}

	#[test]
	fn test_factory_error_is_reported() {
		let mut cfg = config("memory");
		cfg.storage.implementations.insert(
			"memory".to_string(),
			toml::from_str("first_order_id = 0").unwrap(),
		);

		let result = CaBuilder::new(cfg).build(registered());
		assert!(matches!(result, Err(BuilderError::Config(_))));
	}
}
