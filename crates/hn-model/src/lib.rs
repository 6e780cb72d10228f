//! hn-model: the hydraulic network model, its defaults, validation and
//! (de)serialization boundary.
//!
//! # Example
//!
//! ```
//! use hn_core::SequentialIds;
//! use hn_model::{GridLayout, SystemModel, from_json_str, to_json_string};
//!
//! let model = SystemModel::default_model(&SequentialIds::new("n"), &GridLayout::default());
//! let text = to_json_string(&model).unwrap();
//! assert_eq!(from_json_str(&text).unwrap(), model);
//! ```

pub mod defaults;
pub mod layout;
pub mod schema;
pub mod snapshot;
pub mod validate;

use std::collections::HashSet;

use hn_sanitize::{Key, PATH_SEPARATOR, Sanitized, Sanitizer, Value};

pub use defaults::{
    DEFAULT_AMBIENT_PRESSURE_PA, DEFAULT_FLUID_ID, node_name, pipe_name,
};
pub use layout::GridLayout;
pub use schema::*;
pub use snapshot::SnapshotCloner;
pub use validate::{ValidationError, check_topology, validate_model};

pub type ModelResult<T> = Result<T, ModelError>;

#[derive(thiserror::Error, Debug)]
pub enum ModelError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Invalid model shape: {what}")]
    Shape { what: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Parse untyped external data. Non-serializable members are stripped (and
/// reported) before the shape is checked. An object naming the same member
/// twice is rejected rather than collapsed.
pub fn parse_value(raw: &Value) -> ModelResult<SystemModel> {
    parse_value_with(&Sanitizer::default(), raw).map(Sanitized::into_value)
}

pub fn parse_value_with(sanitizer: &Sanitizer, raw: &Value) -> ModelResult<Sanitized<SystemModel>> {
    let clean = sanitizer.clone_value(raw);
    reject_duplicate_members(&clean.value, "root")?;
    let json = clean.value.to_json()?;
    let model = parse_json_value(json)?;
    Ok(Sanitized {
        value: model,
        report: clean.report,
    })
}

pub fn parse_json_value(json: serde_json::Value) -> ModelResult<SystemModel> {
    if !json.is_object() {
        return Err(ModelError::Shape {
            what: format!("expected an object, found {}", json_kind(&json)),
        });
    }
    let model: SystemModel = serde_json::from_value(json)?;
    validate_model(&model)?;
    Ok(model)
}

pub fn from_json_str(text: &str) -> ModelResult<SystemModel> {
    let json: serde_json::Value = serde_json::from_str(text)?;
    parse_json_value(json)
}

pub fn from_yaml_str(text: &str) -> ModelResult<SystemModel> {
    let model: SystemModel = serde_yaml::from_str(text)?;
    validate_model(&model)?;
    Ok(model)
}

/// Serialize a validated, sanitized copy of `model`.
pub fn to_json_value(model: &SystemModel) -> ModelResult<serde_json::Value> {
    validate_model(model)?;
    let clean = SnapshotCloner::new().snapshot(model).into_value();
    Ok(serde_json::to_value(&clean)?)
}

pub fn to_json_string(model: &SystemModel) -> ModelResult<String> {
    validate_model(model)?;
    let clean = SnapshotCloner::new().snapshot(model).into_value();
    Ok(serde_json::to_string_pretty(&clean)?)
}

pub fn to_yaml_string(model: &SystemModel) -> ModelResult<String> {
    validate_model(model)?;
    let clean = SnapshotCloner::new().snapshot(model).into_value();
    Ok(serde_yaml::to_string(&clean)?)
}

fn reject_duplicate_members(value: &Value, path: &str) -> ModelResult<()> {
    match value {
        Value::Object(entries) => {
            let mut seen = HashSet::new();
            for (key, child) in entries {
                let Key::Name(name) = key else { continue };
                if !seen.insert(name.as_str()) {
                    return Err(ModelError::Shape {
                        what: format!("duplicate member '{name}' at {path}"),
                    });
                }
                reject_duplicate_members(child, &format!("{path}{PATH_SEPARATOR}{name}"))?;
            }
        }
        Value::Array(items) | Value::Set(items) => {
            for (index, item) in items.iter().enumerate() {
                reject_duplicate_members(item, &format!("{path}{PATH_SEPARATOR}{index}"))?;
            }
        }
        Value::Map(entries) => {
            for (_, child) in entries {
                reject_duplicate_members(child, path)?;
            }
        }
        _ => {}
    }
    Ok(())
}

fn json_kind(json: &serde_json::Value) -> &'static str {
    match json {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
