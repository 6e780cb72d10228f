//! Pluggable "is this unclonable?" checks.

use crate::report::ExclusionReason;
use crate::value::{Key, Value};

/// Classifies values (and object keys) that must not be copied.
///
/// The first predicate that returns `Some` decides the reason. Opaque values and
/// symbol keys that no predicate claims are still excluded, as
/// [`ExclusionReason::Other`].
pub trait UnclonablePredicate: Send + Sync {
    fn classify(&self, _value: &Value) -> Option<ExclusionReason> {
        None
    }

    fn classify_key(&self, _key: &Key) -> Option<ExclusionReason> {
        None
    }
}

impl<F> UnclonablePredicate for F
where
    F: Fn(&Value) -> Option<ExclusionReason> + Send + Sync,
{
    fn classify(&self, value: &Value) -> Option<ExclusionReason> {
        self(value)
    }
}

/// Live event objects and other platform handles.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlatformHandles;

impl UnclonablePredicate for PlatformHandles {
    fn classify(&self, value: &Value) -> Option<ExclusionReason> {
        matches!(value, Value::Handle(_)).then_some(ExclusionReason::Event)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Functions;

impl UnclonablePredicate for Functions {
    fn classify(&self, value: &Value) -> Option<ExclusionReason> {
        matches!(value, Value::Function(_)).then_some(ExclusionReason::Function)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SymbolKeys;

impl UnclonablePredicate for SymbolKeys {
    fn classify_key(&self, key: &Key) -> Option<ExclusionReason> {
        matches!(key, Key::Symbol(_)).then_some(ExclusionReason::Symbol)
    }
}

pub fn standard_predicates() -> Vec<Box<dyn UnclonablePredicate>> {
    vec![
        Box::new(PlatformHandles),
        Box::new(Functions),
        Box::new(SymbolKeys),
    ]
}
