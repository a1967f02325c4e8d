//! Order lifecycle types for the issuance service.
//!
//! An [`Order`] is a certificate request tracked from enrollment until it is
//! issued or revoked. The store owns every order; everything handed to callers
//! is a cloned snapshot.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// Certificate body attached to every order at creation time.
///
/// No signing happens; the body is only released once the order is issued.
pub const PLACEHOLDER_CERTIFICATE: &str = "-----BEGIN CERTIFICATE-----
MIIQD...... (Mock Certificate Data) ......
......
......
-----END CERTIFICATE-----";

/// Identifier of an order, rendered as a plain decimal integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub u64);

impl fmt::Display for OrderId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl FromStr for OrderId {
	type Err = ParseIntError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		s.parse::<u64>().map(OrderId)
	}
}

/// Status of an order.
///
/// Progression is monotonic: `Pending -> Issued -> Revoked`, with `Revoked`
/// also reachable straight from `Pending`. Nothing leaves `Revoked`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
	/// Enrolled, waiting for the issuance delay to elapse.
	Pending,
	/// Certificate is released to callers.
	Issued,
	/// Terminal.
	Revoked,
}

impl OrderStatus {
	/// Lowercase wire name of the status.
	pub fn as_str(&self) -> &'static str {
		match self {
			OrderStatus::Pending => "pending",
			OrderStatus::Issued => "issued",
			OrderStatus::Revoked => "revoked",
		}
	}

	/// Checks whether moving from `self` to `next` is allowed.
	///
	/// Self-transitions on `Issued` and `Revoked` are accepted so that repeated
	/// issuance and repeated revocation stay idempotent.
	pub fn can_transition_to(&self, next: OrderStatus) -> bool {
		use OrderStatus::*;
		matches!(
			(self, next),
			(Pending, Issued) | (Pending, Revoked) | (Issued, Issued) | (Issued, Revoked) | (Revoked, Revoked)
		)
	}
}

impl fmt::Display for OrderStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Parameters accepted at enrollment.
///
/// `term` and `product_code` are stored verbatim and never interpreted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrollParams {
	/// Certificate signing request, opaque.
	pub csr: String,
	/// Requested validity term.
	pub term: i64,
	/// Product the certificate is ordered under.
	pub product_code: i64,
}

impl EnrollParams {
	/// Enrollment parameters carrying only a CSR.
	pub fn from_csr(csr: impl Into<String>) -> Self {
		Self {
			csr: csr.into(),
			..Default::default()
		}
	}
}

/// A certificate order tracked by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
	/// Unique identifier, never reused.
	pub id: OrderId,
	/// Certificate signing request as submitted.
	pub csr: String,
	/// Requested validity term.
	pub term: i64,
	/// Product code from the enrollment request.
	pub product_code: i64,
	/// Current lifecycle status.
	pub status: OrderStatus,
	/// Certificate body, released only while `status` is `Issued`.
	pub certificate: String,
	/// Timestamp when this order was created.
	pub created_at: u64,
	/// Timestamp of the last status change.
	pub updated_at: u64,
}

impl Order {
	/// Builds a pending order with the placeholder certificate.
	pub fn pending(id: OrderId, params: EnrollParams, now: u64) -> Self {
		Self {
			id,
			csr: params.csr,
			term: params.term,
			product_code: params.product_code,
			status: OrderStatus::Pending,
			certificate: PLACEHOLDER_CERTIFICATE.to_string(),
			created_at: now,
			updated_at: now,
		}
	}

	/// Returns the certificate body if it has been released.
	pub fn released_certificate(&self) -> Option<&str> {
		match self.status {
			OrderStatus::Issued => Some(&self.certificate),
			_ => None,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_transition_table() {
		use OrderStatus::*;

		assert!(Pending.can_transition_to(Issued));
		assert!(Pending.can_transition_to(Revoked));
		assert!(Issued.can_transition_to(Revoked));
		assert!(Issued.can_transition_to(Issued));
		assert!(Revoked.can_transition_to(Revoked));

		assert!(!Issued.can_transition_to(Pending));
		assert!(!Revoked.can_transition_to(Issued));
		assert!(!Revoked.can_transition_to(Pending));
		assert!(!Pending.can_transition_to(Pending));
	}

	#[test]
	fn test_status_serializes_lowercase() {
		let json = serde_json::to_string(&OrderStatus::Issued).unwrap();
		assert_eq!(json, "\"issued\"");

		let status: OrderStatus = serde_json::from_str("\"revoked\"").unwrap();
		assert_eq!(status, OrderStatus::Revoked);
	}

	#[test]
	fn test_order_id_parsing() {
		assert_eq!("12345".parse::<OrderId>().unwrap(), OrderId(12345));
		assert!("abc".parse::<OrderId>().is_err());
		assert!("-1".parse::<OrderId>().is_err());
		assert!("".parse::<OrderId>().is_err());
		assert_eq!(OrderId(42).to_string(), "42");
	}

	#[test]
	fn test_certificate_released_only_when_issued() {
		let mut order = Order::pending(OrderId(1), EnrollParams::from_csr("CSR-A"), 0);
		assert_eq!(order.released_certificate(), None);

		order.status = OrderStatus::Issued;
		assert_eq!(order.released_certificate(), Some(PLACEHOLDER_CERTIFICATE));

		order.status = OrderStatus::Revoked;
		assert_eq!(order.released_certificate(), None);
	}
}
