//! hn-core: shared foundation for hydronet.
//!
//! Contains:
//! - ids (pluggable identifier providers for model entities)
//! - units (uom SI types, constructors and SI/US display conversions)

pub mod ids;
pub mod units;

pub use ids::{FallbackIds, IdProvider, SequentialIds, UuidIds, default_provider};
pub use units::UnitSystem;
