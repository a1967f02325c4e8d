//! Certificate enrollment.

use super::{decode_body, engine_error};
use ca_core::CaEngine;
use ca_types::{APIError, EnrollParams, EnrollRequest, EnrollResponse};

/// Handles `POST /enroll`.
///
/// Creates a pending order and returns its identifier without waiting for
/// issuance. `term` and `productCode` are stored but not interpreted.
pub async fn enroll(body: &[u8], engine: &CaEngine) -> Result<EnrollResponse, APIError> {
	let request: EnrollRequest = decode_body(body)?;

	let params = EnrollParams {
		csr: request.csr,
		term: request.term,
		product_code: request.product_code,
	};
	let id = engine.enroll(params).await.map_err(engine_error)?;

	Ok(EnrollResponse {
		ssl_id: id,
		message: "Order created successfully".to_string(),
	})
}
