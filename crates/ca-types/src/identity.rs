//! Identity generation for sessions and orders.
//!
//! Session tokens are random and carry no uniqueness guarantee beyond their
//! entropy. Order identifiers come from a process-wide counter and are never
//! handed out twice.

use crate::OrderId;
use rand::rngs::OsRng;
use rand::RngCore;
use std::sync::atomic::{AtomicU64, Ordering};

/// First order identifier handed out when none is configured.
pub const DEFAULT_FIRST_ORDER_ID: u64 = 12345;

/// Number of random bytes in a session token (128 bits).
const SESSION_TOKEN_BYTES: usize = 16;

/// Returns a fresh session token: 128 bits from the OS RNG as lowercase hex.
pub fn new_session_token() -> String {
	let mut bytes = [0u8; SESSION_TOKEN_BYTES];
	OsRng.fill_bytes(&mut bytes);
	hex::encode(bytes)
}

/// Strictly increasing order identifier source.
///
/// Safe to share between threads: two concurrent calls to
/// [`next_order_id`](Self::next_order_id) never observe the same value.
#[derive(Debug)]
pub struct OrderIdGenerator {
	next: AtomicU64,
}

impl OrderIdGenerator {
	/// Creates a generator whose first identifier is `first`.
	pub fn new(first: u64) -> Self {
		Self {
			next: AtomicU64::new(first),
		}
	}

	/// Allocates the next identifier.
	pub fn next_order_id(&self) -> OrderId {
		OrderId(self.next.fetch_add(1, Ordering::SeqCst))
	}
}

impl Default for OrderIdGenerator {
	fn default() -> Self {
		Self::new(DEFAULT_FIRST_ORDER_ID)
	}
}
