//! Common types module for the mock CA issuance service.
//!
//! This module defines the core data types shared by the store, the issuance
//! scheduler and the HTTP layer, so that every crate agrees on what an order
//! looks like and how it travels over the wire.

/// API types for HTTP endpoints and request/response structures.
pub mod api;
/// Session token and order identifier generation.
pub mod identity;
/// Order lifecycle types.
pub mod order;
/// Registry trait for named, config-selected implementations.
pub mod registry;
/// Utility functions shared across crates.
pub mod utils;

// Re-export all types for convenient access
pub use api::*;
pub use identity::{new_session_token, OrderIdGenerator, DEFAULT_FIRST_ORDER_ID};
pub use order::*;
pub use registry::ImplementationRegistry;
pub use utils::current_timestamp;
