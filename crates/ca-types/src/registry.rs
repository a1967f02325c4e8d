//! Registry trait for self-registering implementations.
//!
//! Backends that can be selected by name in the configuration file provide a
//! `Registry` struct implementing this trait, declaring the name they are
//! referenced by and the factory that builds them.

/// Base trait for implementation registries.
pub trait ImplementationRegistry {
	/// The name used in configuration files to reference this implementation,
	/// e.g. "memory" for `storage.implementations.memory`.
	const NAME: &'static str;

	/// The factory function type this implementation provides.
	type Factory;

	/// Get the factory function for this implementation.
	fn factory() -> Self::Factory;
}
