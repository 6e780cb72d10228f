//! Model schema definitions.
//!
//! Nodes and pipes live in flat ordered collections. Every relation (pipe
//! endpoints, pump suction/discharge) is a plain id reference resolved by lookup.

use hn_core::UnitSystem;
use hn_sanitize::{Key, Value};
use serde::de::Error as _;
use serde::ser::{Error as _, SerializeMap};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SystemModel {
    pub nodes: Vec<SystemNode>,
    pub pipes: Vec<SystemPipe>,
    pub fluid_id: String,
    pub units: UnitSystem,
    /// Absolute ambient pressure, Pa.
    pub ambient_pressure: f64,
    #[serde(default, skip_serializing_if = "Attachments::is_empty")]
    pub attachments: Attachments,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SystemNode {
    pub id: String,
    pub name: String,
    pub position: Position,
    #[serde(flatten)]
    pub props: NodeProps,
    #[serde(default, skip_serializing_if = "Attachments::is_empty")]
    pub attachments: Attachments,
}

impl SystemNode {
    pub fn kind(&self) -> NodeKind {
        self.props.kind()
    }
}

/// Kind-specific node properties; `kind` is the serialized discriminant.
///
/// Elevations are metres, pressures Pa, demand m³/s, tank volume m³.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum NodeProps {
    Tank {
        base_elevation: f64,
        fluid_level: f64,
        volume: f64,
    },
    Pump {
        suction_node_id: String,
        discharge_node_id: String,
    },
    Junction {
        elevation: f64,
        demand: f64,
        reference_elevation: f64,
    },
    Valve {
        elevation: f64,
        loss_coefficient: f64,
        status: ValveStatus,
        reference_elevation: f64,
    },
    Regulator {
        elevation: f64,
        setpoint_pressure: f64,
        tolerance: f64,
        reference_elevation: f64,
    },
    Meter {
        elevation: f64,
        measured_quantity: MeasuredQuantity,
        reference_elevation: f64,
    },
}

impl NodeProps {
    pub fn kind(&self) -> NodeKind {
        match self {
            NodeProps::Tank { .. } => NodeKind::Tank,
            NodeProps::Pump { .. } => NodeKind::Pump,
            NodeProps::Junction { .. } => NodeKind::Junction,
            NodeProps::Valve { .. } => NodeKind::Valve,
            NodeProps::Regulator { .. } => NodeKind::Regulator,
            NodeProps::Meter { .. } => NodeKind::Meter,
        }
    }

    /// Geometric elevation of the node. Pumps carry none of their own.
    pub fn elevation(&self) -> Option<f64> {
        match self {
            NodeProps::Tank { base_elevation, .. } => Some(*base_elevation),
            NodeProps::Pump { .. } => None,
            NodeProps::Junction { elevation, .. }
            | NodeProps::Valve { elevation, .. }
            | NodeProps::Regulator { elevation, .. }
            | NodeProps::Meter { elevation, .. } => Some(*elevation),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Tank,
    Pump,
    Junction,
    Valve,
    Regulator,
    Meter,
}

impl NodeKind {
    pub const ALL: [NodeKind; 6] = [
        NodeKind::Tank,
        NodeKind::Pump,
        NodeKind::Junction,
        NodeKind::Valve,
        NodeKind::Regulator,
        NodeKind::Meter,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Tank => "tank",
            NodeKind::Pump => "pump",
            NodeKind::Junction => "junction",
            NodeKind::Valve => "valve",
            NodeKind::Regulator => "regulator",
            NodeKind::Meter => "meter",
        }
    }

    /// Prefix of generated display names ("Tank 1", "Pump 2", ...).
    pub fn name_prefix(self) -> &'static str {
        match self {
            NodeKind::Tank => "Tank",
            NodeKind::Pump => "Pump",
            NodeKind::Junction => "Junction",
            NodeKind::Valve => "Valve",
            NodeKind::Regulator => "Regulator",
            NodeKind::Meter => "Meter",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValveStatus {
    #[default]
    Open,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasuredQuantity {
    #[default]
    Flow,
    Pressure,
    Level,
    Temperature,
}

/// A directed connection between two nodes. SI units: m, m³/s.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SystemPipe {
    pub id: String,
    pub name: String,
    pub from: String,
    pub to: String,
    pub diameter: f64,
    pub length: f64,
    pub roughness: f64,
    pub flow_rate: f64,
    pub minor_loss_k: f64,
    #[serde(default, skip_serializing_if = "Attachments::is_empty")]
    pub attachments: Attachments,
}

impl SystemPipe {
    /// True if the pipe joins `a` and `b` in either direction.
    pub fn joins(&self, a: &str, b: &str) -> bool {
        (self.from == a && self.to == b) || (self.from == b && self.to == a)
    }

    pub fn touches(&self, node_id: &str) -> bool {
        self.from == node_id || self.to == node_id
    }
}

/// Incidental data a host UI hangs off model entities (handlers, live event
/// objects, scratch state). Never part of the hydraulic model proper; snapshots
/// and serialization strip whatever is not serializable.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Attachments(Vec<(Key, Value)>);

impl Attachments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: Vec<(Key, Value)>) -> Self {
        Self(entries)
    }

    pub fn entries(&self) -> &[(Key, Value)] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0
            .iter()
            .find(|(k, _)| k.as_name() == Some(name))
            .map(|(_, v)| v)
    }

    pub fn insert(&mut self, key: impl Into<Key>, value: Value) {
        let key = key.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        let idx = self.0.iter().position(|(k, _)| k.as_name() == Some(name))?;
        Some(self.0.remove(idx).1)
    }
}

impl Serialize for Attachments {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in &self.0 {
            let Some(name) = key.as_name() else {
                return Err(S::Error::custom(format!(
                    "attachment key {key} is not serializable"
                )));
            };
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Attachments {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Object(entries) => Ok(Self(entries)),
            Value::Null => Ok(Self::default()),
            other => Err(D::Error::custom(format!(
                "attachments must be an object, found {}",
                other.kind_name()
            ))),
        }
    }
}

/// Node counts per kind plus pipe count.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ModelSummary {
    pub node_counts: BTreeMap<NodeKind, usize>,
    pub node_total: usize,
    pub pipe_total: usize,
}

impl SystemModel {
    pub fn node(&self, id: &str) -> Option<&SystemNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut SystemNode> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    pub fn pipe(&self, id: &str) -> Option<&SystemPipe> {
        self.pipes.iter().find(|p| p.id == id)
    }

    pub fn pipe_mut(&mut self, id: &str) -> Option<&mut SystemPipe> {
        self.pipes.iter_mut().find(|p| p.id == id)
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.node(id).is_some()
    }

    /// The pipe joining `a` and `b` in either direction, if any.
    pub fn connection(&self, a: &str, b: &str) -> Option<&SystemPipe> {
        self.pipes.iter().find(|p| p.joins(a, b))
    }

    pub fn incident_pipes<'a>(&'a self, node_id: &'a str) -> impl Iterator<Item = &'a SystemPipe> {
        self.pipes.iter().filter(move |p| p.touches(node_id))
    }

    pub fn nodes_of_kind(&self, kind: NodeKind) -> impl Iterator<Item = &SystemNode> {
        self.nodes.iter().filter(move |n| n.kind() == kind)
    }

    pub fn count_kind(&self, kind: NodeKind) -> usize {
        self.nodes_of_kind(kind).count()
    }

    pub fn summary(&self) -> ModelSummary {
        let mut node_counts = BTreeMap::new();
        for node in &self.nodes {
            *node_counts.entry(node.kind()).or_insert(0) += 1;
        }
        ModelSummary {
            node_counts,
            node_total: self.nodes.len(),
            pipe_total: self.pipes.len(),
        }
    }
}
