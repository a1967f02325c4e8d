//! Order status and certificate collection.

use super::{engine_error, parse_order_id};
use axum::{
	http::header,
	response::{IntoResponse, Response},
};
use ca_core::CaEngine;
use ca_types::{APIError, OrderId, StatusResponse};

/// Media type of a collected certificate.
pub const PEM_CONTENT_TYPE: &str = "application/x-pem-file";

/// Handles `GET /status/{id}`.
pub async fn get_status(id: &str, engine: &CaEngine) -> Result<StatusResponse, APIError> {
	let id = parse_order_id(id)?;
	let status = engine.status(id).await.map_err(engine_error)?;

	Ok(StatusResponse { ssl_id: id, status })
}

/// Handles `GET /collect/{id}`.
///
/// Returns the certificate as a PEM file download once the order is issued.
pub async fn collect(id: &str, engine: &CaEngine) -> Result<Response, APIError> {
	let id = parse_order_id(id)?;
	let certificate = engine.collect(id).await.map_err(engine_error)?;

	Ok(certificate_download(id, certificate))
}

fn certificate_download(id: OrderId, certificate: String) -> Response {
	(
		[
			(header::CONTENT_TYPE, PEM_CONTENT_TYPE.to_string()),
			(
				header::CONTENT_DISPOSITION,
				format!("attachment; filename=\"{}.crt\"", id),
			),
		],
		certificate,
	)
		.into_response()
}
