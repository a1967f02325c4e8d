//! HTTP server for the issuance API.
//!
//! Routes are nested under the configured base path; `/health` sits at the
//! root so probes do not depend on it.

use crate::apis;
use axum::{
	extract::{DefaultBodyLimit, Path, State},
	response::{Json, Response},
	routing::{get, post},
	Router,
};
use bytes::Bytes;
use ca_core::CaEngine;
use ca_types::{
	APIError, AuthResponse, EnrollResponse, HealthResponse, RevokeResponse, StatusResponse,
};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

/// Shared application state for the API server.
#[derive(Clone)]
pub struct AppState {
	/// Engine serving every request.
	pub engine: Arc<CaEngine>,
}

/// Builds the router with every route, middleware and the shared state.
pub fn build_router(engine: Arc<CaEngine>) -> Router {
	let api_config = engine.config().api.clone();

	let routes = Router::new()
		.route("/user/auth", post(handle_auth))
		.route("/enroll", post(handle_enroll))
		.route("/status/{id}", get(handle_status))
		.route("/status/", get(handle_missing_id))
		.route("/collect/{id}", get(handle_collect))
		.route("/collect/", get(handle_missing_id))
		.route("/revoke", post(handle_revoke));

	Router::new()
		.nest(&api_config.base_path, routes)
		.route("/health", get(handle_health))
		.layer(
			ServiceBuilder::new()
				.layer(TraceLayer::new_for_http())
				.layer(TimeoutLayer::new(Duration::from_secs(
					api_config.timeout_seconds,
				)))
				.layer(CorsLayer::permissive())
				.layer(DefaultBodyLimit::max(api_config.max_request_size)),
		)
		.with_state(AppState { engine })
}

/// Starts the HTTP server and serves until `shutdown` resolves.
pub async fn start_server(
	engine: Arc<CaEngine>,
	shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), Box<dyn std::error::Error>> {
	let api_config = engine.config().api.clone();
	let app = build_router(engine);

	let bind_address = format!("{}:{}", api_config.host, api_config.port);
	let listener = TcpListener::bind(&bind_address).await?;

	tracing::info!(
		"CA API server listening on {}{}",
		bind_address,
		api_config.base_path
	);

	axum::serve(listener, app)
		.with_graceful_shutdown(shutdown)
		.await?;

	tracing::info!("CA API server stopped");
	Ok(())
}

/// Handles POST {base}/user/auth requests.
async fn handle_auth(
	State(state): State<AppState>,
	body: Bytes,
) -> Result<Json<AuthResponse>, APIError> {
	apis::auth::authenticate(&body, &state.engine).map(Json)
}

/// Handles POST {base}/enroll requests.
async fn handle_enroll(
	State(state): State<AppState>,
	body: Bytes,
) -> Result<Json<EnrollResponse>, APIError> {
	apis::enroll::enroll(&body, &state.engine).await.map(Json)
}

/// Handles GET {base}/status/{id} requests.
async fn handle_status(
	Path(id): Path<String>,
	State(state): State<AppState>,
) -> Result<Json<StatusResponse>, APIError> {
	apis::order::get_status(&id, &state.engine).await.map(Json)
}

/// Handles GET {base}/collect/{id} requests.
async fn handle_collect(
	Path(id): Path<String>,
	State(state): State<AppState>,
) -> Result<Response, APIError> {
	apis::order::collect(&id, &state.engine).await
}

/// Handles status and collect requests whose id segment is empty.
async fn handle_missing_id() -> APIError {
	apis::invalid_order_id()
}

/// Handles POST {base}/revoke requests.
async fn handle_revoke(
	State(state): State<AppState>,
	body: Bytes,
) -> Result<Json<RevokeResponse>, APIError> {
	apis::revoke::revoke(&body, &state.engine).await.map(Json)
}

/// Handles GET /health requests.
async fn handle_health(State(state): State<AppState>) -> Json<HealthResponse> {
	Json(HealthResponse {
		status: "ok".to_string(),
		orders: state.engine.order_count().await,
	})
}
