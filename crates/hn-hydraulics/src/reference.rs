//! Reference steady-state estimator.
//!
//! Single-pump estimate: static head from the suction source, Darcy-Weisbach
//! losses on every pipe at its nominal flow (Swamee-Jain friction factor), and
//! pump head as lift plus suction and discharge line losses. Good enough to drive
//! the editor's results panel and alerts; not a network solver.

use std::f64::consts::PI;

use hn_core::units::constants::G0_MPS2;
use hn_model::{NodeKind, NodeProps, SystemModel, SystemNode, SystemPipe, ValveStatus};

use crate::engine::HydraulicsEngine;
use crate::fluid::{self, FluidProperties};
use crate::results::{Alert, Computation, HydraulicResults, PipeResult};

pub const MAX_VELOCITY_MPS: f64 = 3.0;
const LAMINAR_RE: f64 = 2_300.0;

#[derive(Debug, Clone, Copy)]
pub struct ReferenceEngine {
    pub max_velocity: f64,
}

impl Default for ReferenceEngine {
    fn default() -> Self {
        Self {
            max_velocity: MAX_VELOCITY_MPS,
        }
    }
}

impl HydraulicsEngine for ReferenceEngine {
    fn compute(&self, model: &SystemModel) -> Computation {
        let mut alerts = Vec::new();

        let fluid = match fluid::lookup(&model.fluid_id) {
            Some(fluid) => fluid,
            None => {
                alerts.push(Alert::error(
                    "fluid-unknown",
                    "Unknown fluid",
                    format!(
                        "Fluid '{}' is not in the catalog; water properties are used.",
                        model.fluid_id
                    ),
                ));
                fluid::water()
            }
        };
        let gamma = fluid.density * G0_MPS2;

        let pipes: Vec<PipeResult> = model
            .pipes
            .iter()
            .map(|pipe| pipe_result(pipe, fluid))
            .collect();
        for (pipe, result) in model.pipes.iter().zip(&pipes) {
            if result.velocity.abs() > self.max_velocity {
                alerts.push(Alert::warning(
                    format!("pipe-velocity-{}", pipe.id),
                    "High velocity",
                    format!(
                        "{} runs at {:.2} m/s (limit {:.1} m/s).",
                        pipe.name, result.velocity, self.max_velocity
                    ),
                ));
            }
        }

        let mut results = HydraulicResults {
            specific_weight: gamma,
            suction_pressure: model.ambient_pressure,
            discharge_pressure: model.ambient_pressure,
            ..HydraulicResults::default()
        };

        if model.count_kind(NodeKind::Tank) == 0 {
            alerts.push(Alert::warning(
                "no-tank",
                "No supply tank",
                "Add a tank to provide suction head.",
            ));
        }

        match model.nodes_of_kind(NodeKind::Pump).next() {
            None => alerts.push(Alert::warning(
                "no-pump",
                "No pump",
                "The network has no pump; head and pressures are static.",
            )),
            Some(pump) => {
                pump_duty(model, pump, fluid, &pipes, &mut results, &mut alerts);
            }
        }

        let dissipated: f64 = model
            .pipes
            .iter()
            .zip(&pipes)
            .map(|(pipe, r)| gamma * pipe.flow_rate.abs() * r.head_loss)
            .sum();
        results.energy_balance -= dissipated;

        node_alerts(model, &mut alerts);
        results.pipes = pipes;

        tracing::trace!(
            nodes = model.nodes.len(),
            pipes = model.pipes.len(),
            alerts = alerts.len(),
            tdh = results.total_dynamic_head,
            "reference engine computed"
        );

        Computation { results, alerts }
    }
}

fn pipe_result(pipe: &SystemPipe, fluid: &FluidProperties) -> PipeResult {
    let area = PI * pipe.diameter * pipe.diameter / 4.0;
    let velocity = if area > 0.0 { pipe.flow_rate / area } else { 0.0 };
    let reynolds = velocity.abs() * pipe.diameter / fluid.kinematic_viscosity;
    let friction_factor = friction_factor(reynolds, pipe.roughness / pipe.diameter);
    let velocity_head = velocity * velocity / (2.0 * G0_MPS2);
    let major = if pipe.diameter > 0.0 {
        friction_factor * pipe.length / pipe.diameter
    } else {
        0.0
    };
    PipeResult {
        pipe_id: pipe.id.clone(),
        velocity,
        reynolds,
        friction_factor,
        head_loss: (major + pipe.minor_loss_k) * velocity_head,
    }
}

/// Darcy friction factor: laminar 64/Re, Swamee-Jain otherwise.
pub fn friction_factor(reynolds: f64, relative_roughness: f64) -> f64 {
    if !reynolds.is_finite() || reynolds <= 0.0 {
        return 0.0;
    }
    if reynolds < LAMINAR_RE {
        return 64.0 / reynolds;
    }
    let rel = if relative_roughness.is_finite() {
        relative_roughness.max(0.0)
    } else {
        0.0
    };
    let term = (rel / 3.7 + 5.74 / reynolds.powf(0.9)).log10();
    0.25 / (term * term)
}

fn pump_duty(
    model: &SystemModel,
    pump: &SystemNode,
    fluid: &FluidProperties,
    pipes: &[PipeResult],
    results: &mut HydraulicResults,
    alerts: &mut Vec<Alert>,
) {
    let NodeProps::Pump {
        suction_node_id,
        discharge_node_id,
    } = &pump.props
    else {
        return;
    };
    let gamma = results.specific_weight;

    if suction_node_id.is_empty() {
        alerts.push(Alert::warning(
            format!("pump-suction-unset-{}", pump.id),
            "Pump suction not assigned",
            format!("{} has no suction node.", pump.name),
        ));
    }
    if discharge_node_id.is_empty() {
        alerts.push(Alert::warning(
            format!("pump-discharge-unset-{}", pump.id),
            "Pump discharge not assigned",
            format!("{} has no discharge node.", pump.name),
        ));
    }

    let suction = model.node(suction_node_id);
    let discharge = model.node(discharge_node_id);
    let suction_head = suction.map(source_head).unwrap_or(0.0);
    let discharge_head = discharge.map(source_head).unwrap_or(0.0);
    let suction_loss = line_loss(model, pipes, &pump.id, suction_node_id);
    let discharge_loss = line_loss(model, pipes, &pump.id, discharge_node_id);
    let flow = model
        .connection(&pump.id, suction_node_id)
        .map(|p| p.flow_rate.abs())
        .unwrap_or(0.0);

    let tdh = (discharge_head - suction_head) + suction_loss + discharge_loss;
    results.total_dynamic_head = tdh;
    results.suction_pressure = model.ambient_pressure + gamma * (suction_head - suction_loss);
    results.discharge_pressure = results.suction_pressure + gamma * tdh;
    // pump input minus static lift; pipe dissipation is subtracted by the caller
    results.energy_balance = gamma * flow * tdh - gamma * flow * (discharge_head - suction_head);

    if results.suction_pressure <= fluid.vapor_pressure {
        alerts.push(Alert::error(
            format!("cavitation-{}", pump.id),
            "Cavitation risk",
            format!(
                "Suction pressure {:.0} Pa at {} is at or below the vapor pressure of {}.",
                results.suction_pressure, pump.name, fluid.display_name
            ),
        ));
    }

    for regulator in model.nodes_of_kind(NodeKind::Regulator) {
        if let NodeProps::Regulator {
            setpoint_pressure,
            tolerance,
            ..
        } = &regulator.props
            && *setpoint_pressure - tolerance > results.discharge_pressure
        {
            alerts.push(Alert::warning(
                format!("regulator-unreachable-{}", regulator.id),
                "Regulator setpoint unreachable",
                format!(
                    "{} asks for {:.0} Pa but the pump delivers {:.0} Pa.",
                    regulator.name, setpoint_pressure, results.discharge_pressure
                ),
            ));
        }
    }
}

/// Free-surface or elevation head of a node relative to the pump datum.
fn source_head(node: &SystemNode) -> f64 {
    match &node.props {
        NodeProps::Tank {
            base_elevation,
            fluid_level,
            ..
        } => base_elevation + fluid_level,
        props => props.elevation().unwrap_or(0.0),
    }
}

fn line_loss(model: &SystemModel, pipes: &[PipeResult], pump_id: &str, other: &str) -> f64 {
    model
        .connection(pump_id, other)
        .and_then(|pipe| pipes.iter().find(|r| r.pipe_id == pipe.id))
        .map(|r| r.head_loss)
        .unwrap_or(0.0)
}

fn node_alerts(model: &SystemModel, alerts: &mut Vec<Alert>) {
    for node in &model.nodes {
        let connected = model.incident_pipes(&node.id).next().is_some();
        if !connected {
            alerts.push(Alert::info(
                format!("isolated-{}", node.id),
                "Unconnected node",
                format!("{} has no pipes.", node.name),
            ));
            continue;
        }
        if let NodeProps::Valve {
            status: ValveStatus::Closed,
            ..
        } = node.props
        {
            alerts.push(Alert::warning(
                format!("valve-closed-{}", node.id),
                "Closed valve",
                format!("{} is closed and blocks flow on its line.", node.name),
            ));
        }
    }
}
