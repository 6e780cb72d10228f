//! hn-sanitize: structural cloning with exclusion of non-serializable content.
//!
//! Provides:
//! - a dynamic [`Value`] tree able to hold callbacks, platform handles and symbol keys
//! - a [`Sanitizer`] that deep-copies values while omitting those members
//! - [`SanitizeReport`] diagnostics, emitted once per clone call that excluded anything
//!
//! # Example
//!
//! ```
//! use hn_sanitize::{Sanitizer, Value};
//!
//! let raw = Value::object([
//!     ("name", Value::from("Tank 1")),
//!     ("onClick", Value::function("onClick", |_| Value::Null)),
//! ]);
//! let out = Sanitizer::new().clone_value(&raw);
//!
//! assert_eq!(out.value, Value::object([("name", Value::from("Tank 1"))]));
//! assert_eq!(out.report.unwrap().detalles[0].path, "onClick");
//! ```

pub mod predicate;
pub mod report;
pub mod sanitizer;
pub mod value;

pub use predicate::{Functions, PlatformHandles, SymbolKeys, UnclonablePredicate, standard_predicates};
pub use report::{
    CollectingDiagnostics, DiagnosticSink, Exclusion, ExclusionReason, SanitizeReport,
    TracingDiagnostics,
};
pub use sanitizer::{CloneSession, PATH_SEPARATOR, Sanitized, Sanitizer};
pub use value::{Callback, Key, PlatformHandle, Symbol, Value};
