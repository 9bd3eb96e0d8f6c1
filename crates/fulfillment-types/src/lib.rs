//! Common types for the order fulfillment system.
//!
//! This crate defines the data model shared by the status engine, the Order
//! Service clients and the command-line front end: raw order records with
//! their sparse progress flags, the derived lifecycle states, the coarse
//! board columns, and the backend operation tokens.

/// Wire envelopes and status update payloads exchanged with the Order Service.
pub mod api;
/// Driver-app status codes and labels.
pub mod driver;
/// Raw order records and the shared truthiness rule for their flags.
pub mod flags;
/// Lifecycle states, board columns and backend operations.
pub mod order;
/// Self-registration of pluggable implementations.
pub mod registry;
/// Redacting wrapper for credentials.
pub mod secret_string;
/// Schema validation for implementation-specific TOML tables.
pub mod validation;

pub use api::*;
pub use driver::{DriverAction, DriverStatusCode};
pub use flags::{is_truthy, DeliveryType, Flag, FlagValue, OrderFlags, OrderId};
pub use order::*;
pub use registry::ImplementationRegistry;
pub use secret_string::SecretString;
pub use validation::*;
