//! Model validation logic.
//!
//! `check_topology` covers the structural invariants every live model must keep.
//! `validate_model` adds value checks and is applied at the parse boundary.

use std::collections::HashSet;

use crate::schema::{NodeProps, SystemModel, SystemNode, SystemPipe};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Duplicate ID: {id} in {context}")]
    DuplicateId { id: String, context: String },

    #[error("Missing reference: {id} in {context}")]
    MissingReference { id: String, context: String },

    #[error("Pipe '{pipe}' connects node '{node}' to itself")]
    SelfLoop { pipe: String, node: String },

    #[error("Pipe '{pipe}' duplicates the connection between '{from}' and '{to}'")]
    DuplicateConnection {
        pipe: String,
        from: String,
        to: String,
    },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing field: {field}")]
    MissingField { field: String },
}

pub fn validate_model(model: &SystemModel) -> Result<(), ValidationError> {
    check_topology(model)?;
    check_values(model)
}

/// Unique ids, existing endpoints, no self-loops, one pipe per node pair.
pub fn check_topology(model: &SystemModel) -> Result<(), ValidationError> {
    let mut node_ids = HashSet::new();
    for node in &model.nodes {
        if !node_ids.insert(node.id.as_str()) {
            return Err(ValidationError::DuplicateId {
                id: node.id.clone(),
                context: "nodes".to_string(),
            });
        }
    }

    let mut pipe_ids = HashSet::new();
    let mut pairs = HashSet::new();
    for pipe in &model.pipes {
        if !pipe_ids.insert(pipe.id.as_str()) {
            return Err(ValidationError::DuplicateId {
                id: pipe.id.clone(),
                context: "pipes".to_string(),
            });
        }
        for (endpoint, label) in [(&pipe.from, "from"), (&pipe.to, "to")] {
            if !node_ids.contains(endpoint.as_str()) {
                return Err(ValidationError::MissingReference {
                    id: endpoint.clone(),
                    context: format!("pipe '{}' {}", pipe.name, label),
                });
            }
        }
        if pipe.from == pipe.to {
            return Err(ValidationError::SelfLoop {
                pipe: pipe.id.clone(),
                node: pipe.from.clone(),
            });
        }
        if !pairs.insert(unordered_pair(&pipe.from, &pipe.to)) {
            return Err(ValidationError::DuplicateConnection {
                pipe: pipe.id.clone(),
                from: pipe.from.clone(),
                to: pipe.to.clone(),
            });
        }
    }

    for node in &model.nodes {
        if let NodeProps::Pump {
            suction_node_id,
            discharge_node_id,
        } = &node.props
        {
            for (target, label) in [(suction_node_id, "suctionNodeId"), (discharge_node_id, "dischargeNodeId")] {
                if !target.is_empty() && !node_ids.contains(target.as_str()) {
                    return Err(ValidationError::MissingReference {
                        id: target.clone(),
                        context: format!("pump '{}' {}", node.name, label),
                    });
                }
            }
        }
    }

    Ok(())
}

fn unordered_pair<'a>(a: &'a str, b: &'a str) -> (&'a str, &'a str) {
    if a <= b { (a, b) } else { (b, a) }
}

fn check_values(model: &SystemModel) -> Result<(), ValidationError> {
    if model.fluid_id.trim().is_empty() {
        return Err(ValidationError::MissingField {
            field: "fluidId".to_string(),
        });
    }
    validate_positive_finite("ambientPressure", model.ambient_pressure, "model")?;

    for node in &model.nodes {
        validate_node(node)?;
    }
    for pipe in &model.pipes {
        validate_pipe(pipe)?;
    }
    Ok(())
}

fn validate_node(node: &SystemNode) -> Result<(), ValidationError> {
    let owner = format!("node '{}'", node.name);
    validate_finite("position.x", node.position.x, &owner)?;
    validate_finite("position.y", node.position.y, &owner)?;

    match &node.props {
        NodeProps::Tank {
            base_elevation,
            fluid_level,
            volume,
        } => {
            validate_finite("baseElevation", *base_elevation, &owner)?;
            validate_non_negative_finite("fluidLevel", *fluid_level, &owner)?;
            validate_non_negative_finite("volume", *volume, &owner)?;
        }
        NodeProps::Pump { .. } => {}
        NodeProps::Junction {
            elevation,
            demand,
            reference_elevation,
        } => {
            validate_finite("elevation", *elevation, &owner)?;
            validate_finite("demand", *demand, &owner)?;
            validate_finite("referenceElevation", *reference_elevation, &owner)?;
        }
        NodeProps::Valve {
            elevation,
            loss_coefficient,
            reference_elevation,
            ..
        } => {
            validate_finite("elevation", *elevation, &owner)?;
            validate_non_negative_finite("lossCoefficient", *loss_coefficient, &owner)?;
            validate_finite("referenceElevation", *reference_elevation, &owner)?;
        }
        NodeProps::Regulator {
            elevation,
            setpoint_pressure,
            tolerance,
            reference_elevation,
        } => {
            validate_finite("elevation", *elevation, &owner)?;
            validate_finite("setpointPressure", *setpoint_pressure, &owner)?;
            validate_non_negative_finite("tolerance", *tolerance, &owner)?;
            validate_finite("referenceElevation", *reference_elevation, &owner)?;
        }
        NodeProps::Meter {
            elevation,
            reference_elevation,
            ..
        } => {
            validate_finite("elevation", *elevation, &owner)?;
            validate_finite("referenceElevation", *reference_elevation, &owner)?;
        }
    }
    Ok(())
}

fn validate_pipe(pipe: &SystemPipe) -> Result<(), ValidationError> {
    let owner = format!("pipe '{}'", pipe.name);
    validate_positive_finite("diameter", pipe.diameter, &owner)?;
    validate_positive_finite("length", pipe.length, &owner)?;
    validate_non_negative_finite("roughness", pipe.roughness, &owner)?;
    validate_finite("flowRate", pipe.flow_rate, &owner)?;
    validate_non_negative_finite("minorLossK", pipe.minor_loss_k, &owner)?;
    Ok(())
}

fn validate_finite(field: &str, value: f64, owner: &str) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::InvalidValue {
            field: format!("{} {}", owner, field),
            value: value.to_string(),
            reason: "must be finite".to_string(),
        });
    }
    Ok(())
}

fn validate_positive_finite(field: &str, value: f64, owner: &str) -> Result<(), ValidationError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ValidationError::InvalidValue {
            field: format!("{} {}", owner, field),
            value: value.to_string(),
            reason: "must be positive and finite".to_string(),
        });
    }
    Ok(())
}

fn validate_non_negative_finite(field: &str, value: f64, owner: &str) -> Result<(), ValidationError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ValidationError::InvalidValue {
            field: format!("{} {}", owner, field),
            value: value.to_string(),
            reason: "must be non-negative and finite".to_string(),
        });
    }
    Ok(())
}
