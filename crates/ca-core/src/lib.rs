//! Core engine for the mock CA issuance service.
//!
//! Ties the order store to the delayed issuance step and exposes the
//! operations the HTTP layer serves: authenticate, enroll, status, collect
//! and revoke. Engines are assembled from configuration by [`CaBuilder`].

pub mod builder;
pub mod engine;
pub mod scheduler;

pub use builder::{BuilderError, CaBuilder, CaFactories};
pub use engine::{CaEngine, EngineError};
pub use scheduler::{IssuanceScheduler, ShutdownReport};
