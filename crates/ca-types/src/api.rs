//! API types for the issuance HTTP API.
//!
//! Request and response bodies use the camelCase field names the API clients
//! expect (`sslId`, `loginName`, `productCode`). Request bodies default every
//! missing field so that only malformed JSON or mistyped values are rejected.

use crate::{OrderId, OrderStatus};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Request body for `POST /user/auth`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AuthRequest {
	pub login_name: String,
	pub password: String,
}

/// Response body for `POST /user/auth`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
	/// Opaque session token.
	#[serde(rename = "sslId")]
	pub ssl_id: String,
	pub message: String,
}

/// Request body for `POST /enroll`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EnrollRequest {
	/// Certificate signing request, stored verbatim.
	pub csr: String,
	pub term: i64,
	pub product_code: i64,
}

/// Response body for `POST /enroll`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrollResponse {
	/// Identifier of the created order.
	#[serde(rename = "sslId")]
	pub ssl_id: OrderId,
	pub message: String,
}

/// Response body for `GET /status/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
	#[serde(rename = "sslId")]
	pub ssl_id: OrderId,
	pub status: OrderStatus,
}

/// Request body for `POST /revoke`.
///
/// `ssl_id` is kept as a string: it is matched against the decimal rendering
/// of stored identifiers rather than parsed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RevokeRequest {
	#[serde(rename = "sslId")]
	pub ssl_id: String,
	pub reason: String,
}

/// Outcome reported in a revoke response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RevokeOutcome {
	Success,
	Failure,
}

/// Response body for `POST /revoke`.
///
/// Unknown identifiers are reported with `status = failure` and a 200 status
/// code, never as an HTTP error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevokeResponse {
	pub status: RevokeOutcome,
	pub message: String,
}

impl RevokeResponse {
	pub fn success() -> Self {
		Self {
			status: RevokeOutcome::Success,
			message: "Certificate revoked".to_string(),
		}
	}

	pub fn not_found() -> Self {
		Self {
			status: RevokeOutcome::Failure,
			message: "Order not found".to_string(),
		}
	}
}

/// Response body for `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
	pub status: String,
	/// Number of orders currently held by the store.
	pub orders: usize,
}

/// API error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
	/// Error type/code
	pub error: String,
	/// Human-readable description
	pub message: String,
	/// Additional error context
	pub details: Option<serde_json::Value>,
}

/// Structured API error type with appropriate HTTP status mapping.
#[derive(Debug)]
pub enum APIError {
	/// Malformed request or order not in a servable state (400)
	BadRequest {
		error_type: String,
		message: String,
		details: Option<serde_json::Value>,
	},
	/// Unknown order (404)
	NotFound { error_type: String, message: String },
	/// Internal server error (500)
	InternalServerError { error_type: String, message: String },
}

impl APIError {
	/// Shorthand for a 400 without details.
	pub fn bad_request(error_type: &str, message: impl Into<String>) -> Self {
		APIError::BadRequest {
			error_type: error_type.to_string(),
			message: message.into(),
			details: None,
		}
	}

	/// Shorthand for a 404.
	pub fn not_found(error_type: &str, message: impl Into<String>) -> Self {
		APIError::NotFound {
			error_type: error_type.to_string(),
			message: message.into(),
		}
	}

	/// Get the HTTP status code for this error.
	pub fn status_code(&self) -> u16 {
		match self {
			APIError::BadRequest { .. } => 400,
			APIError::NotFound { .. } => 404,
			APIError::InternalServerError { .. } => 500,
		}
	}

	/// Convert to ErrorResponse for JSON serialization.
	pub fn to_error_response(&self) -> ErrorResponse {
		match self {
			APIError::BadRequest {
				error_type,
				message,
				details,
			} => ErrorResponse {
				error: error_type.clone(),
				message: message.clone(),
				details: details.clone(),
			},
			APIError::NotFound {
				error_type,
				message,
			}
			| APIError::InternalServerError {
				error_type,
				message,
			} => ErrorResponse {
				error: error_type.clone(),
				message: message.clone(),
				details: None,
			},
		}
	}
}

impl fmt::Display for APIError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			APIError::BadRequest { message, .. } => write!(f, "Bad Request: {}", message),
			APIError::NotFound { message, .. } => write!(f, "Not Found: {}", message),
			APIError::InternalServerError { message, .. } => {
				write!(f, "Internal Server Error: {}", message)
			},
		}
	}
}

impl std::error::Error for APIError {}

impl axum::response::IntoResponse for APIError {
	fn into_response(self) -> axum::response::Response {
		use axum::{http::StatusCode, response::Json};

		let status =
			StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

		let error_response = self.to_error_response();
		(status, Json(error_response)).into_response()
	}
}
