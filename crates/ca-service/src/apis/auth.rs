//! Session authentication.
//!
//! Every well-formed request succeeds: credentials are logged and discarded,
//! and the returned token is never checked by any other endpoint.

use super::decode_body;
use ca_core::CaEngine;
use ca_types::{APIError, AuthRequest, AuthResponse};

/// Handles `POST /user/auth`.
pub fn authenticate(body: &[u8], engine: &CaEngine) -> Result<AuthResponse, APIError> {
	let request: AuthRequest = decode_body(body)?;

	Ok(AuthResponse {
		ssl_id: engine.authenticate(&request.login_name),
		message: "Authentication successful".to_string(),
	})
}
