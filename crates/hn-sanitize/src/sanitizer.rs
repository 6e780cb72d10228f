//! Structural deep copy with exclusion of non-serializable members.

use std::sync::Arc;

use crate::predicate::{UnclonablePredicate, standard_predicates};
use crate::report::{DiagnosticSink, Exclusion, ExclusionReason, SanitizeReport, TracingDiagnostics};
use crate::value::{Key, Value};

pub const PATH_SEPARATOR: &str = " > ";
const ROOT_PATH: &str = "(root)";

/// A copied value together with what was left out of it.
#[derive(Debug, Clone, PartialEq)]
pub struct Sanitized<T> {
    pub value: T,
    pub report: Option<SanitizeReport>,
}

impl<T> Sanitized<T> {
    pub fn is_clean(&self) -> bool {
        self.report.is_none()
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Sanitized<U> {
        Sanitized {
            value: f(self.value),
            report: self.report,
        }
    }

    pub fn into_value(self) -> T {
        self.value
    }
}

/// Deep cloner parameterized by a set of [`UnclonablePredicate`]s.
///
/// Never fails: unclonable content is omitted from the copy and reported. Every
/// clone call that excluded at least one member emits exactly one diagnostic to
/// the configured [`DiagnosticSink`].
pub struct Sanitizer {
    predicates: Vec<Box<dyn UnclonablePredicate>>,
    sink: Arc<dyn DiagnosticSink>,
}

impl Default for Sanitizer {
    fn default() -> Self {
        Self {
            predicates: standard_predicates(),
            sink: Arc::new(TracingDiagnostics),
        }
    }
}

impl std::fmt::Debug for Sanitizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sanitizer")
            .field("predicates", &self.predicates.len())
            .finish()
    }
}

impl Sanitizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sanitizer with no predicates; only inherently opaque content is dropped.
    pub fn bare() -> Self {
        Self {
            predicates: Vec::new(),
            sink: Arc::new(TracingDiagnostics),
        }
    }

    pub fn with_predicate(mut self, predicate: impl UnclonablePredicate + 'static) -> Self {
        self.predicates.push(Box::new(predicate));
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn clone_value(&self, value: &Value) -> Sanitized<Value> {
        let mut session = self.session();
        let copy = session.clone_at::<&str>(&[], value).unwrap_or(Value::Null);
        Sanitized {
            value: copy,
            report: session.finish(),
        }
    }

    /// Start a multi-part clone whose exclusions are reported together.
    pub fn session(&self) -> CloneSession<'_> {
        CloneSession {
            sanitizer: self,
            path: Vec::new(),
            exclusions: Vec::new(),
        }
    }

    fn classify(&self, value: &Value) -> Option<ExclusionReason> {
        self.predicates
            .iter()
            .find_map(|p| p.classify(value))
            .or_else(|| value.is_opaque().then_some(ExclusionReason::Other))
    }

    fn classify_key(&self, key: &Key) -> Option<ExclusionReason> {
        self.predicates
            .iter()
            .find_map(|p| p.classify_key(key))
            .or_else(|| matches!(key, Key::Symbol(_)).then_some(ExclusionReason::Other))
    }
}

/// One logical clone call spanning any number of values.
pub struct CloneSession<'a> {
    sanitizer: &'a Sanitizer,
    path: Vec<String>,
    exclusions: Vec<Exclusion>,
}

impl CloneSession<'_> {
    /// Copy `value` located at `path`. `None` means the value itself was excluded.
    pub fn clone_at<S: AsRef<str>>(&mut self, path: &[S], value: &Value) -> Option<Value> {
        let depth = self.path.len();
        self.path.extend(path.iter().map(|s| s.as_ref().to_string()));
        let copy = self.walk(value);
        self.path.truncate(depth);
        copy
    }

    /// Copy object members located at `path`, dropping excluded keys and values.
    pub fn clone_entries<S: AsRef<str>>(
        &mut self,
        path: &[S],
        entries: &[(Key, Value)],
    ) -> Vec<(Key, Value)> {
        let depth = self.path.len();
        self.path.extend(path.iter().map(|s| s.as_ref().to_string()));
        let copy = self.walk_entries(entries);
        self.path.truncate(depth);
        copy
    }

    pub fn exclusions(&self) -> &[Exclusion] {
        &self.exclusions
    }

    /// Close the session, emitting the diagnostic if anything was excluded.
    pub fn finish(self) -> Option<SanitizeReport> {
        let report = SanitizeReport::from_exclusions(self.exclusions)?;
        self.sanitizer.sink.emit(&report);
        Some(report)
    }

    fn walk(&mut self, value: &Value) -> Option<Value> {
        if let Some(reason) = self.sanitizer.classify(value) {
            self.exclude(reason);
            return None;
        }

        let copy = match value {
            Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => value.clone(),
            Value::Array(items) => Value::Array(self.walk_items(items)),
            Value::Set(items) => Value::Set(self.walk_items(items)),
            Value::Object(entries) => Value::Object(self.walk_entries(entries)),
            Value::Map(entries) => Value::Map(self.walk_map(entries)),
            // classify() claims every opaque value
            Value::Function(_) | Value::Handle(_) => return None,
        };
        Some(copy)
    }

    fn walk_items(&mut self, items: &[Value]) -> Vec<Value> {
        items
            .iter()
            .enumerate()
            .filter_map(|(i, item)| self.descend(i.to_string(), item))
            .collect()
    }

    fn walk_entries(&mut self, entries: &[(Key, Value)]) -> Vec<(Key, Value)> {
        let mut out = Vec::with_capacity(entries.len());
        for (key, value) in entries {
            if let Some(reason) = self.sanitizer.classify_key(key) {
                self.path.push(key.to_string());
                self.exclude(reason);
                self.path.pop();
                continue;
            }
            if let Some(copy) = self.descend(key.to_string(), value) {
                out.push((key.clone(), copy));
            }
        }
        out
    }

    fn walk_map(&mut self, entries: &[(Value, Value)]) -> Vec<(Value, Value)> {
        let mut out = Vec::with_capacity(entries.len());
        for (i, (key, value)) in entries.iter().enumerate() {
            let segment = match key {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                _ => i.to_string(),
            };
            let Some(key_copy) = self.descend(segment.clone(), key) else {
                continue;
            };
            if let Some(copy) = self.descend(segment, value) {
                out.push((key_copy, copy));
            }
        }
        out
    }

    fn descend(&mut self, segment: String, value: &Value) -> Option<Value> {
        self.path.push(segment);
        let copy = self.walk(value);
        self.path.pop();
        copy
    }

    fn exclude(&mut self, reason: ExclusionReason) {
        let path = if self.path.is_empty() {
            ROOT_PATH.to_string()
        } else {
            self.path.join(PATH_SEPARATOR)
        };
        self.exclusions.push(Exclusion { path, reason });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::CollectingDiagnostics;
    use crate::value::Symbol;

    fn collecting() -> (Sanitizer, Arc<CollectingDiagnostics>) {
        let sink = Arc::new(CollectingDiagnostics::new());
        (Sanitizer::new().with_sink(sink.clone()), sink)
    }

    #[test]
    fn clean_values_copy_exactly_without_diagnostic() {
        let (sanitizer, sink) = collecting();
        let source = Value::object([
            ("id", Value::from("t1")),
            ("levels", Value::Array(vec![Value::from(1.0), Value::from(2.0)])),
            (
                "lookup",
                Value::Map(vec![(Value::from("k"), Value::from(true))]),
            ),
        ]);
        let out = sanitizer.clone_value(&source);
        assert!(out.is_clean());
        assert_eq!(out.value, source);
        assert!(sink.is_empty());
    }

    #[test]
    fn excludes_each_category_with_paths() {
        let (sanitizer, sink) = collecting();
        let source = Value::object([(
            "nodes",
            Value::Array(vec![Value::object([
                (Key::from("id"), Value::from("n1")),
                (Key::from("onClick"), Value::function("onClick", |_| Value::Null)),
                (Key::from("lastEvent"), Value::handle("PointerEvent", ())),
                (Key::Symbol(Symbol::new("react.internal")), Value::from(1.0)),
            ])]),
        )]);

        let out = sanitizer.clone_value(&source);
        let report = out.report.expect("report");
        assert_eq!(report.total, 3);
        assert_eq!(
            report.detalles,
            vec![
                Exclusion {
                    path: "nodes > 0 > onClick".into(),
                    reason: ExclusionReason::Function
                },
                Exclusion {
                    path: "nodes > 0 > lastEvent".into(),
                    reason: ExclusionReason::Event
                },
                Exclusion {
                    path: "nodes > 0 > Symbol(react.internal)".into(),
                    reason: ExclusionReason::Symbol
                },
            ]
        );
        assert_eq!(
            out.value,
            Value::object([(
                "nodes",
                Value::Array(vec![Value::object([("id", Value::from("n1"))])])
            )])
        );
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn opaque_root_becomes_null() {
        let (sanitizer, _) = collecting();
        let out = sanitizer.clone_value(&Value::function("f", |_| Value::Null));
        assert_eq!(out.value, Value::Null);
        let report = out.report.unwrap();
        assert_eq!(report.detalles[0].path, "(root)");
    }

    #[test]
    fn unclaimed_opaque_content_is_other() {
        let sink = Arc::new(CollectingDiagnostics::new());
        let sanitizer = Sanitizer::bare().with_sink(sink.clone());
        let source = Value::Array(vec![Value::handle("Timer", 5_u32), Value::from(1.0)]);
        let out = sanitizer.clone_value(&source);
        assert_eq!(out.value, Value::Array(vec![Value::from(1.0)]));
        assert_eq!(out.report.unwrap().count(ExclusionReason::Other), 1);
    }

    #[test]
    fn custom_predicate_excludes_ordinary_values() {
        let sanitizer = Sanitizer::new().with_predicate(|v: &Value| {
            v.as_str()
                .filter(|s| s.starts_with("blob:"))
                .map(|_| ExclusionReason::Other)
        });
        let source = Value::object([
            ("preview", Value::from("blob:abc")),
            ("name", Value::from("Pump 1")),
        ]);
        let out = sanitizer.clone_value(&source);
        assert_eq!(out.value, Value::object([("name", Value::from("Pump 1"))]));
        assert_eq!(out.report.unwrap().detalles[0].path, "preview");
    }

    #[test]
    fn map_and_set_members_are_walked() {
        let (sanitizer, _) = collecting();
        let source = Value::Map(vec![
            (Value::from("keep"), Value::Set(vec![Value::from(1.0)])),
            (Value::from("drop"), Value::function("cb", |_| Value::Null)),
            (Value::handle("Key", ()), Value::from(2.0)),
        ]);
        let out = sanitizer.clone_value(&source);
        assert_eq!(
            out.value,
            Value::Map(vec![(Value::from("keep"), Value::Set(vec![Value::from(1.0)]))])
        );
        let paths: Vec<&str> = out.report.as_ref().unwrap().paths().collect();
        assert_eq!(paths, vec!["drop", "2"]);
    }

    #[test]
    fn session_reports_once_across_parts() {
        let (sanitizer, sink) = collecting();
        let mut session = sanitizer.session();
        let a = session.clone_at(&["nodes", "0", "meta"], &Value::function("a", |_| Value::Null));
        let b = session.clone_entries(
            &["pipes", "1"],
            &[(Key::from("onHover"), Value::function("b", |_| Value::Null))],
        );
        assert!(a.is_none());
        assert!(b.is_empty());
        let report = session.finish().unwrap();
        assert_eq!(report.total, 2);
        assert_eq!(report.detalles[0].path, "nodes > 0 > meta");
        assert_eq!(report.detalles[1].path, "pipes > 1 > onHover");
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn copy_is_independent_of_source() {
        let (sanitizer, _) = collecting();
        let mut source = Value::object([("list", Value::Array(vec![Value::from(1.0)]))]);
        let mut copy = sanitizer.clone_value(&source).into_value();

        copy.get_mut("list").unwrap().as_array_mut().unwrap().push(Value::from(2.0));
        assert_eq!(source.get("list"), Some(&Value::Array(vec![Value::from(1.0)])));

        source.insert("extra", Value::Null);
        assert!(copy.get("extra").is_none());
    }
}
