//! hn-hydraulics: the solver boundary for hydronet.
//!
//! The editor only depends on [`HydraulicsEngine`]; [`ReferenceEngine`] is a
//! deterministic estimator used by the CLI and tests.
//!
//! # Example
//!
//! ```
//! use hn_core::SequentialIds;
//! use hn_hydraulics::{HydraulicsEngine, ReferenceEngine};
//! use hn_model::{GridLayout, SystemModel};
//!
//! let model = SystemModel::default_model(&SequentialIds::new("n"), &GridLayout::default());
//! let out = ReferenceEngine::default().compute(&model);
//! assert!(out.results.specific_weight > 9_000.0);
//! ```

pub mod engine;
pub mod fluid;
pub mod reference;
pub mod results;

pub use engine::{HydraulicsEngine, NullEngine};
pub use fluid::FluidProperties;
pub use reference::ReferenceEngine;
pub use results::{Alert, Computation, HydraulicResults, PipeResult, Severity};
