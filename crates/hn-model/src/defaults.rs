//! Constructors with default properties, and the default model.

use hn_core::IdProvider;
use hn_core::units::constants::STANDARD_ATMOSPHERE_PA;
use hn_core::UnitSystem;

use crate::layout::GridLayout;
use crate::schema::{
    Attachments, MeasuredQuantity, NodeKind, NodeProps, Position, SystemModel, SystemNode,
    SystemPipe, ValveStatus,
};

pub const DEFAULT_FLUID_ID: &str = "water";
pub const DEFAULT_AMBIENT_PRESSURE_PA: f64 = STANDARD_ATMOSPHERE_PA;

pub const PIPE_NAME_PREFIX: &str = "Pipe";
pub const DEFAULT_PIPE_DIAMETER_M: f64 = 0.1;
pub const DEFAULT_PIPE_LENGTH_M: f64 = 10.0;
pub const DEFAULT_PIPE_ROUGHNESS_M: f64 = 0.000_045;
pub const DEFAULT_PIPE_FLOW_M3_S: f64 = 0.01;
pub const DEFAULT_PIPE_MINOR_LOSS_K: f64 = 0.5;

/// `"<Prefix> <n>"` where `n` is one more than the nodes of that kind already present.
pub fn node_name(kind: NodeKind, existing_of_kind: usize) -> String {
    format!("{} {}", kind.name_prefix(), existing_of_kind + 1)
}

pub fn pipe_name(existing_pipes: usize) -> String {
    format!("{} {}", PIPE_NAME_PREFIX, existing_pipes + 1)
}

impl NodeProps {
    /// Default properties for `kind`. Pumps point at the model's first tank
    /// (suction) and first junction (discharge), or at nothing.
    pub fn defaults_for(kind: NodeKind, model: &SystemModel) -> Self {
        match kind {
            NodeKind::Tank => NodeProps::Tank {
                base_elevation: 0.0,
                fluid_level: 2.0,
                volume: 10.0,
            },
            NodeKind::Pump => NodeProps::Pump {
                suction_node_id: first_id_of(model, NodeKind::Tank),
                discharge_node_id: first_id_of(model, NodeKind::Junction),
            },
            NodeKind::Junction => NodeProps::Junction {
                elevation: 0.0,
                demand: 0.0,
                reference_elevation: 0.0,
            },
            NodeKind::Valve => NodeProps::Valve {
                elevation: 0.0,
                loss_coefficient: 0.2,
                status: ValveStatus::Open,
                reference_elevation: 0.0,
            },
            NodeKind::Regulator => NodeProps::Regulator {
                elevation: 0.0,
                setpoint_pressure: 300_000.0,
                tolerance: 5_000.0,
                reference_elevation: 0.0,
            },
            NodeKind::Meter => NodeProps::Meter {
                elevation: 0.0,
                measured_quantity: MeasuredQuantity::Flow,
                reference_elevation: 0.0,
            },
        }
    }
}

fn first_id_of(model: &SystemModel, kind: NodeKind) -> String {
    model
        .nodes_of_kind(kind)
        .next()
        .map(|n| n.id.clone())
        .unwrap_or_default()
}

impl SystemNode {
    pub fn new(id: impl Into<String>, name: impl Into<String>, position: Position, props: NodeProps) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            position,
            props,
            attachments: Attachments::new(),
        }
    }

    /// A node of `kind` with default properties, named after the nodes of that
    /// kind already in `model`.
    pub fn with_defaults(
        kind: NodeKind,
        id: impl Into<String>,
        position: Position,
        model: &SystemModel,
    ) -> Self {
        let name = node_name(kind, model.count_kind(kind));
        Self::new(id, name, position, NodeProps::defaults_for(kind, model))
    }
}

impl SystemPipe {
    /// A pipe with the default hydraulic properties.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        from: impl Into<String>,
        to: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            from: from.into(),
            to: to.into(),
            diameter: DEFAULT_PIPE_DIAMETER_M,
            length: DEFAULT_PIPE_LENGTH_M,
            roughness: DEFAULT_PIPE_ROUGHNESS_M,
            flow_rate: DEFAULT_PIPE_FLOW_M3_S,
            minor_loss_k: DEFAULT_PIPE_MINOR_LOSS_K,
            attachments: Attachments::new(),
        }
    }
}

impl SystemModel {
    /// No nodes, no pipes, default global settings.
    pub fn empty() -> Self {
        Self {
            nodes: Vec::new(),
            pipes: Vec::new(),
            fluid_id: DEFAULT_FLUID_ID.to_string(),
            units: UnitSystem::Si,
            ambient_pressure: DEFAULT_AMBIENT_PRESSURE_PA,
            attachments: Attachments::new(),
        }
    }

    /// Tank -> pump -> junction, connected by two pipes.
    pub fn default_model(ids: &dyn IdProvider, layout: &GridLayout) -> Self {
        let mut model = Self::empty();

        let tank = SystemNode::with_defaults(NodeKind::Tank, ids.next_id(), layout.position(0), &model);
        model.nodes.push(tank);

        // The junction must exist before the pump so the pump picks it up as discharge.
        let junction_id = ids.next_id();
        let junction = SystemNode::with_defaults(
            NodeKind::Junction,
            junction_id.clone(),
            layout.position(2),
            &model,
        );
        model.nodes.push(junction);

        let pump = SystemNode::with_defaults(NodeKind::Pump, ids.next_id(), layout.position(1), &model);
        let pump_id = pump.id.clone();
        let tank_id = model.nodes[0].id.clone();
        model.nodes.insert(1, pump);

        let first = SystemPipe::new(ids.next_id(), pipe_name(0), tank_id, pump_id.clone());
        model.pipes.push(first);
        let second = SystemPipe::new(ids.next_id(), pipe_name(1), pump_id, junction_id);
        model.pipes.push(second);

        model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hn_core::SequentialIds;

    #[test]
    fn default_model_shape() {
        let model = SystemModel::default_model(&SequentialIds::new("id-"), &GridLayout::default());
        let kinds: Vec<NodeKind> = model.nodes.iter().map(|n| n.kind()).collect();
        assert_eq!(kinds, vec![NodeKind::Tank, NodeKind::Pump, NodeKind::Junction]);
        assert_eq!(model.pipes.len(), 2);
        assert_eq!(model.fluid_id, "water");
        assert_eq!(model.units, UnitSystem::Si);

        let tank = &model.nodes[0];
        let pump = &model.nodes[1];
        let junction = &model.nodes[2];
        assert_eq!(
            pump.props,
            NodeProps::Pump {
                suction_node_id: tank.id.clone(),
                discharge_node_id: junction.id.clone(),
            }
        );
        assert!(model.connection(&tank.id, &pump.id).is_some());
        assert!(model.connection(&junction.id, &pump.id).is_some());
        assert_eq!(model.pipes[0].name, "Pipe 1");
        assert_eq!(model.pipes[1].name, "Pipe 2");
    }

    #[test]
    fn names_count_per_kind() {
        let mut model = SystemModel::empty();
        model.nodes.push(SystemNode::with_defaults(
            NodeKind::Valve,
            "v1",
            Position::default(),
            &model,
        ));
        let second = SystemNode::with_defaults(NodeKind::Valve, "v2", Position::default(), &model);
        assert_eq!(second.name, "Valve 2");
        let tank = SystemNode::with_defaults(NodeKind::Tank, "t1", Position::default(), &model);
        assert_eq!(tank.name, "Tank 1");
    }

    #[test]
    fn pump_without_candidates_has_empty_references() {
        let pump = SystemNode::with_defaults(NodeKind::Pump, "p", Position::default(), &SystemModel::empty());
        assert_eq!(
            pump.props,
            NodeProps::Pump {
                suction_node_id: String::new(),
                discharge_node_id: String::new(),
            }
        );
    }
}
