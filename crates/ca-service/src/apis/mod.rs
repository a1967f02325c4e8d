//! Request handling for the issuance API.
//!
//! Each submodule turns a decoded request into engine calls and maps engine
//! errors onto [`APIError`]. Bodies arrive as raw bytes and are decoded here,
//! so a missing or unexpected `Content-Type` does not change the outcome.

pub mod auth;
pub mod enroll;
pub mod order;
pub mod revoke;

use ca_core::EngineError;
use ca_types::{APIError, OrderId};
use serde::de::DeserializeOwned;
use tracing::warn;

/// Decodes a JSON request body, rejecting anything malformed with a 400.
pub fn decode_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, APIError> {
	serde_json::from_slice(body).map_err(|e| {
		warn!(error = %e, "Rejected request body");
		APIError::BadRequest {
			error_type: "INVALID_REQUEST_BODY".to_string(),
			message: "Invalid request body".to_string(),
			details: Some(serde_json::json!({ "reason": e.to_string() })),
		}
	})
}

/// Parses an order identifier from a path segment.
///
/// Only plain decimal integers are accepted.
pub fn parse_order_id(raw: &str) -> Result<OrderId, APIError> {
	raw.parse().map_err(|_| {
		warn!(id = raw, "Rejected order id");
		invalid_order_id()
	})
}

/// The 400 returned for any order id that is not a plain decimal integer.
pub fn invalid_order_id() -> APIError {
	APIError::bad_request("INVALID_ORDER_ID", "Invalid order ID")
}

/// Maps an engine failure onto the HTTP error it is reported as.
pub fn engine_error(err: EngineError) -> APIError {
	match err {
		EngineError::OrderNotFound(_) => APIError::not_found("ORDER_NOT_FOUND", "Order not found"),
		EngineError::NotReady { .. } => {
			APIError::bad_request("CERTIFICATE_NOT_READY", err.to_string())
		},
		EngineError::Storage(message) => APIError::InternalServerError {
			error_type: "STORAGE_ERROR".to_string(),
			message,
		},
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use ca_types::{AuthRequest, OrderStatus};

	#[test]
	fn test_decode_body_rejects_malformed_json() {
		let err = decode_body::<AuthRequest>(b"{not json").unwrap_err();
		assert_eq!(err.status_code(), 400);

		let request: AuthRequest = decode_body(br#"{"loginName":"alice"}"#).unwrap();
		assert_eq!(request.login_name, "alice");
	}

	#[test]
	fn test_parse_order_id() {
		assert_eq!(parse_order_id("12345").unwrap(), OrderId(12345));
		for raw in ["abc", "-1", "12.5", "", "99999999999999999999999"] {
			assert_eq!(parse_order_id(raw).unwrap_err().status_code(), 400);
		}
	}

	#[test]
	fn test_engine_error_mapping() {
		let err = engine_error(EngineError::OrderNotFound("1".to_string()));
		assert_eq!(err.status_code(), 404);

		let err = engine_error(EngineError::NotReady {
			id: OrderId(1),
			status: OrderStatus::Pending,
		});
		assert_eq!(err.status_code(), 400);
		assert_eq!(
			err.to_error_response().message,
			"Certificate not ready (status: pending)"
		);
	}
}
