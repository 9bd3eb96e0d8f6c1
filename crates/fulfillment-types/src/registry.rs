//! Registry trait for self-registering implementations.

/// Implemented by each backend module to declare the name it is configured
/// under and the factory that builds it.
///
/// The name matches the TOML key, e.g. `http` for
/// `[order_service.implementations.http]`.
pub trait ImplementationRegistry {
	const NAME: &'static str;

	type Factory;

	fn factory() -> Self::Factory;
}
