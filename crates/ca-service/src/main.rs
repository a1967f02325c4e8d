//! Main entry point for the mock CA issuance service.
//!
//! Serves an HTTP API that accepts certificate enrollments, issues a
//! placeholder certificate after a fixed delay and supports revocation.
//! Nothing is persisted; all orders are lost on exit.

use ca_config::Config;
use ca_core::{CaBuilder, CaEngine, CaFactories};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

mod apis;
mod server;

/// Command-line arguments for the issuance service.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config/ca-mock.toml")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,
}

/// Main entry point for the issuance service.
///
/// This function:
/// 1. Parses command-line arguments
/// 2. Initializes logging infrastructure
/// 3. Loads configuration from file
/// 4. Builds the engine with the configured order store
/// 5. Serves the API until Ctrl-C, then stops the issuance scheduler
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	use tracing_subscriber::{fmt, EnvFilter};

	// RUST_LOG takes precedence over --log-level
	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

	fmt()
		.with_env_filter(env_filter)
		.with_thread_ids(true)
		.with_target(true)
		.init();

	tracing::info!("Started CA mock");

	let config_path = args
		.config
		.to_str()
		.ok_or_else(|| format!("Invalid config path: {}", args.config.display()))?;
	let config = Config::from_file(config_path).await?;
	tracing::info!("Loaded configuration [{}]", config.service.id);

	let engine = Arc::new(build_engine(config)?);

	server::start_server(Arc::clone(&engine), shutdown_signal()).await?;

	let report = engine.shutdown().await;
	tracing::info!(
		completed = report.completed,
		aborted = report.aborted,
		"Stopped CA mock"
	);
	Ok(())
}

/// Builds the engine with every registered storage implementation available.
fn build_engine(config: Config) -> Result<CaEngine, Box<dyn std::error::Error>> {
	let factories = CaFactories {
		storage_factories: ca_storage::get_all_implementations()
			.into_iter()
			.map(|(name, factory)| (name.to_string(), factory))
			.collect(),
	};

	Ok(CaBuilder::new(config).build(factories)?)
}

/// Resolves when the process receives Ctrl-C.
async fn shutdown_signal() {
	match tokio::signal::ctrl_c().await {
		Ok(()) => tracing::info!("Shutdown signal received"),
		Err(e) => {
			tracing::error!(error = %e, "Failed to listen for shutdown signal");
			std::future::pending::<()>().await;
		},
	}
}
