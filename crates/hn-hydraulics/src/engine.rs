//! The engine contract.

use hn_model::SystemModel;

use crate::results::Computation;

/// Turns a model into results and alerts.
///
/// Implementations must be deterministic and must not mutate anything: the editor
/// calls `compute` inline on every mutation, undo and redo.
pub trait HydraulicsEngine: Send + Sync {
    fn compute(&self, model: &SystemModel) -> Computation;
}

impl<F> HydraulicsEngine for F
where
    F: Fn(&SystemModel) -> Computation + Send + Sync,
{
    fn compute(&self, model: &SystemModel) -> Computation {
        self(model)
    }
}

/// Default results, no alerts.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullEngine;

impl HydraulicsEngine for NullEngine {
    fn compute(&self, _model: &SystemModel) -> Computation {
        Computation::default()
    }
}
