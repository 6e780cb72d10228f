//! Property tests for the sanitizer.

use hn_sanitize::{ExclusionReason, Sanitizer, Value};
use proptest::prelude::*;

fn leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        (-1.0e6_f64..1.0e6).prop_map(Value::Number),
        "[a-z]{0,8}".prop_map(Value::String),
    ]
}

fn opaque_leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::function("cb", |_| Value::Null)),
        Just(Value::handle("MouseEvent", ())),
    ]
}

fn tree(with_opaque: bool) -> BoxedStrategy<Value> {
    let base = if with_opaque {
        prop_oneof![3 => leaf(), 1 => opaque_leaf()].boxed()
    } else {
        leaf().boxed()
    };
    base.prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Set),
            prop::collection::vec(("[a-z]{1,6}", inner.clone()), 0..6)
                .prop_map(|entries| Value::object(entries)),
            prop::collection::vec(("[a-z]{1,6}", inner), 0..4).prop_map(|entries| {
                Value::Map(
                    entries
                        .into_iter()
                        .map(|(k, v)| (Value::String(k), v))
                        .collect(),
                )
            }),
        ]
    })
    .boxed()
}

fn count_opaque(value: &Value) -> usize {
    match value {
        Value::Function(_) | Value::Handle(_) => 1,
        Value::Array(items) | Value::Set(items) => items.iter().map(count_opaque).sum(),
        Value::Object(entries) => entries.iter().map(|(_, v)| count_opaque(v)).sum(),
        Value::Map(entries) => entries
            .iter()
            .map(|(k, v)| count_opaque(k) + count_opaque(v))
            .sum(),
        _ => 0,
    }
}

proptest! {
    #[test]
    fn clean_trees_copy_unchanged(source in tree(false)) {
        let out = Sanitizer::new().clone_value(&source);
        prop_assert!(out.report.is_none());
        prop_assert_eq!(out.value, source);
    }

    #[test]
    fn every_opaque_member_is_reported_once(source in tree(true)) {
        let out = Sanitizer::new().clone_value(&source);
        let expected = count_opaque(&source);
        prop_assert_eq!(count_opaque(&out.value), 0);
        prop_assert!(out.value.to_json().is_ok());
        match out.report {
            None => prop_assert_eq!(expected, 0),
            Some(report) => {
                prop_assert_eq!(report.total, expected);
                prop_assert_eq!(report.detalles.len(), expected);
                prop_assert_eq!(report.count(ExclusionReason::Symbol), 0);
            }
        }
    }
}
