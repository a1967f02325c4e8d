//! Configuration for the mock CA issuance service.
//!
//! A single TOML file describes the service id, the issuance delay, the order
//! store backend and the HTTP listener. `${VAR}` and `${VAR:-default}`
//! references are substituted from the environment before parsing, so one
//! file can serve several deployments.

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Extract just the message without the huge input dump
		let message = err.message().to_string();
		ConfigError::Parse(message)
	}
}

/// Main configuration structure for the issuance service.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// Configuration specific to this service instance.
	pub service: ServiceConfig,
	/// Configuration for the asynchronous issuance step.
	#[serde(default)]
	pub issuance: IssuanceConfig,
	/// Configuration for the order store backend.
	pub storage: StorageConfig,
	/// Configuration for the HTTP API server.
	#[serde(default)]
	pub api: ApiConfig,
}

/// Configuration specific to this service instance.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServiceConfig {
	/// Identifier used in logs.
	pub id: String,
}

/// Configuration for the issuance scheduler.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IssuanceConfig {
	/// Seconds between enrollment and the order becoming issued.
	#[serde(default = "default_issuance_delay_seconds")]
	pub delay_seconds: u64,
	/// Whether shutdown waits for outstanding issuance tasks instead of
	/// aborting them.
	#[serde(default)]
	pub drain_on_shutdown: bool,
}

impl IssuanceConfig {
	/// The issuance delay as a [`Duration`].
	pub fn delay(&self) -> Duration {
		Duration::from_secs(self.delay_seconds)
	}
}

impl Default for IssuanceConfig {
	fn default() -> Self {
		Self {
			delay_seconds: default_issuance_delay_seconds(),
			drain_on_shutdown: false,
		}
	}
}

/// Returns the default issuance delay in seconds.
fn default_issuance_delay_seconds() -> u64 {
	5
}

/// Upper bound accepted for `issuance.delay_seconds`.
const MAX_ISSUANCE_DELAY_SECONDS: u64 = 3600;

/// Configuration for the order store backend.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
	/// Which implementation to use as primary.
	pub primary: String,
	/// Map of storage implementation names to their configurations.
	pub implementations: HashMap<String, toml::Value>,
}

/// Configuration for the HTTP API server.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
	/// Host address to bind the server to.
	#[serde(default = "default_api_host")]
	pub host: String,
	/// Port to bind the server to.
	#[serde(default = "default_api_port")]
	pub port: u16,
	/// Path prefix every route is nested under.
	#[serde(default = "default_api_base_path")]
	pub base_path: String,
	/// Request timeout in seconds.
	#[serde(default = "default_api_timeout")]
	pub timeout_seconds: u64,
	/// Maximum request size in bytes.
	#[serde(default = "default_max_request_size")]
	pub max_request_size: usize,
}

impl Default for ApiConfig {
	fn default() -> Self {
		Self {
			host: default_api_host(),
			port: default_api_port(),
			base_path: default_api_base_path(),
			timeout_seconds: default_api_timeout(),
			max_request_size: default_max_request_size(),
		}
	}
}

/// Returns the default API host.
///
/// Binds every interface, matching the behavior clients of the real API
/// expect from a drop-in mock.
fn default_api_host() -> String {
	"0.0.0.0".to_string()
}

/// Returns the default API port.
fn default_api_port() -> u16 {
	8080
}

/// Returns the default route prefix.
fn default_api_base_path() -> String {
	"/api/ssl/v1".to_string()
}

/// Returns the default API timeout in seconds.
fn default_api_timeout() -> u64 {
	30
}

/// Returns the default maximum request size in bytes (1MB).
fn default_max_request_size() -> usize {
	1024 * 1024
}

/// Matches `${NAME}` and `${NAME:-fallback}` references.
const ENV_REFERENCE: &str = r"\$\{([A-Z_][A-Z0-9_]*)(?::-([^}]*))?\}";

/// Substitutes environment references in raw configuration text.
///
/// Every unset variable without a fallback is collected so a single error
/// names all of them.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	let pattern = Regex::new(ENV_REFERENCE)
		.map_err(|e| ConfigError::Parse(format!("Invalid env reference pattern: {}", e)))?;

	let mut unset = Vec::new();
	let resolved = pattern.replace_all(input, |caps: &Captures| {
		let name = &caps[1];
		match (std::env::var(name), caps.get(2)) {
			(Ok(value), _) => value,
			(Err(_), Some(fallback)) => fallback.as_str().to_string(),
			(Err(_), None) => {
				unset.push(name.to_string());
				String::new()
			},
		}
	});

	if !unset.is_empty() {
		return Err(ConfigError::Validation(format!(
			"Unset environment variables without a default: {}",
			unset.join(", ")
		)));
	}

	Ok(resolved.into_owned())
}

impl Config {
	/// Reads a configuration file, substitutes environment references and
	/// validates the result.
	pub async fn from_file(path: &str) -> Result<Self, ConfigError> {
		let content = tokio::fs::read_to_string(path).await.map_err(|e| {
			ConfigError::Io(std::io::Error::new(
				e.kind(),
				format!("Cannot read configuration file {}: {}", path, e),
			))
		})?;
		content.parse()
	}

	/// Returns the configuration table of the primary storage implementation.
	pub fn primary_storage_config(&self) -> Option<&toml::Value> {
		self.storage.implementations.get(&self.storage.primary)
	}

	/// Validates the configuration to ensure all required fields are properly set.
	fn validate(&self) -> Result<(), ConfigError> {
		if self.service.id.is_empty() {
			return Err(ConfigError::Validation("Service ID cannot be empty".into()));
		}

		// Validate issuance config
		if self.issuance.delay_seconds > MAX_ISSUANCE_DELAY_SECONDS {
			return Err(ConfigError::Validation(format!(
				"issuance.delay_seconds cannot exceed {}",
				MAX_ISSUANCE_DELAY_SECONDS
			)));
		}

		// Validate storage config
		if self.storage.implementations.is_empty() {
			return Err(ConfigError::Validation(
				"At least one storage implementation must be configured".into(),
			));
		}
		if self.storage.primary.is_empty() {
			return Err(ConfigError::Validation(
				"Storage primary implementation cannot be empty".into(),
			));
		}
		if !self
			.storage
			.implementations
			.contains_key(&self.storage.primary)
		{
			return Err(ConfigError::Validation(format!(
				"Primary storage '{}' not found in implementations",
				self.storage.primary
			)));
		}

		// Validate API config
		if self.api.port == 0 {
			return Err(ConfigError::Validation("api.port cannot be 0".into()));
		}
		let base_path = &self.api.base_path;
		if !base_path.starts_with('/') || base_path.ends_with('/') {
			return Err(ConfigError::Validation(format!(
				"api.base_path '{}' must start with '/' and must not end with '/'",
				base_path
			)));
		}
		if self.api.timeout_seconds == 0 {
			return Err(ConfigError::Validation(
				"api.timeout_seconds must be greater than 0".into(),
			));
		}

		Ok(())
	}
}

/// Parses a TOML string, resolving environment variables and validating the
/// result.
impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let config: Config = toml::from_str(&resolved)?;
		config.validate()?;
		Ok(config)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const MINIMAL: &str = r#"
[service]
id = "mock-ca"

[storage]
primary = "memory"
[storage.implementations.memory]
"#;

	#[test]
	fn test_env_var_resolution() {
		std::env::set_var("CA_TEST_HOST", "localhost");
		std::env::set_var("CA_TEST_PORT", "9090");

		let input = "host = \"${CA_TEST_HOST}:${CA_TEST_PORT}\"";
		let result = resolve_env_vars(input).unwrap();
		assert_eq!(result, "host = \"localhost:9090\"");

		std::env::remove_var("CA_TEST_HOST");
		std::env::remove_var("CA_TEST_PORT");
	}

	#[test]
	fn test_env_var_with_default() {
		let input = "value = \"${CA_MISSING_VAR:-default_value}\"";
		let result = resolve_env_vars(input).unwrap();
		assert_eq!(result, "value = \"default_value\"");
	}

	#[test]
	fn test_missing_env_var_error() {
		let input = "value = \"${CA_MISSING_VAR}\"";
		let result = resolve_env_vars(input);
		assert!(result.is_err());
		assert!(result.unwrap_err().to_string().contains("CA_MISSING_VAR"));
	}

	#[test]
	fn test_minimal_config_uses_defaults() {
		let config: Config = MINIMAL.parse().unwrap();
		assert_eq!(config.service.id, "mock-ca");
		assert_eq!(config.issuance.delay(), Duration::from_secs(5));
		assert!(!config.issuance.drain_on_shutdown);
		assert_eq!(config.api.host, "0.0.0.0");
		assert_eq!(config.api.port, 8080);
		assert_eq!(config.api.base_path, "/api/ssl/v1");
		assert!(config.primary_storage_config().is_some());
	}

	#[test]
	fn test_config_with_env_vars() {
		std::env::set_var("CA_TEST_SERVICE_ID", "ca-from-env");

		let config_str = r#"
[service]
id = "${CA_TEST_SERVICE_ID}"

[issuance]
delay_seconds = ${CA_TEST_DELAY:-2}

[storage]
primary = "memory"
[storage.implementations.memory]
first_order_id = 500

[api]
port = 9443
"#;

		let config: Config = config_str.parse().unwrap();
		assert_eq!(config.service.id, "ca-from-env");
		assert_eq!(config.issuance.delay_seconds, 2);
		assert_eq!(config.api.port, 9443);

		std::env::remove_var("CA_TEST_SERVICE_ID");
	}

	#[test]
	fn test_unknown_primary_storage_rejected() {
		let config_str = r#"
[service]
id = "mock-ca"

[storage]
primary = "postgres"
[storage.implementations.memory]
"#;

		let err = Config::from_str(config_str).unwrap_err();
		assert!(err
			.to_string()
			.contains("Primary storage 'postgres' not found in implementations"));
	}

	#[test]
	fn test_empty_service_id_rejected() {
		let config_str = MINIMAL.replace("id = \"mock-ca\"", "id = \"\"");
		let err = Config::from_str(&config_str).unwrap_err();
		assert!(err.to_string().contains("Service ID cannot be empty"));
	}

	#[test]
	fn test_excessive_delay_rejected() {
		let config_str = format!("{}\n[issuance]\ndelay_seconds = 86400\n", MINIMAL);
		let err = Config::from_str(&config_str).unwrap_err();
		assert!(err.to_string().contains("issuance.delay_seconds"));
	}

	#[test]
	fn test_base_path_shape_enforced() {
		for bad in ["api/ssl/v1", "/api/ssl/v1/", "/"] {
			let config_str = format!("{}\n[api]\nbase_path = \"{}\"\n", MINIMAL, bad);
			let err = Config::from_str(&config_str).unwrap_err();
			assert!(
				err.to_string().contains("api.base_path"),
				"expected base_path error for {:?}, got: {}",
				bad,
				err
			);
		}
	}

	#[test]
	fn test_parse_error_is_reported() {
		let err = Config::from_str("[service\nid = 1").unwrap_err();
		assert!(matches!(err, ConfigError::Parse(_)));
	}

	#[test]
	fn test_every_unset_variable_is_named() {
		let input = "a = \"${CA_UNSET_ONE}\"\nb = \"${CA_UNSET_TWO}\"\n";
		let err = resolve_env_vars(input).unwrap_err().to_string();
		assert!(err.contains("CA_UNSET_ONE, CA_UNSET_TWO"), "got: {}", err);
	}

	#[tokio::test]
	async fn test_from_file_reads_single_file() {
		let dir = tempfile::TempDir::new().unwrap();
		let path = dir.path().join("ca-mock.toml");
		let content = format!(
			"{}first_order_id = ${{CA_TEST_FIRST_ID:-1000}}\n\n[api]\nport = 9000\n",
			MINIMAL.trim_start()
		);
		std::fs::write(&path, content).unwrap();

		let config = Config::from_file(path.to_str().unwrap()).await.unwrap();
		assert_eq!(config.api.port, 9000);
		assert_eq!(
			config.primary_storage_config().unwrap()["first_order_id"].as_integer(),
			Some(1000)
		);
	}

	#[tokio::test]
	async fn test_from_file_missing_file() {
		let dir = tempfile::TempDir::new().unwrap();
		let path = dir.path().join("absent.toml");

		let err = Config::from_file(path.to_str().unwrap()).await.unwrap_err();
		assert!(matches!(err, ConfigError::Io(_)));
		assert!(err.to_string().contains("absent.toml"));
	}
}
