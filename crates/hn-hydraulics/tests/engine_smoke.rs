use hn_core::SequentialIds;
use hn_hydraulics::{HydraulicsEngine, NullEngine, ReferenceEngine, Severity};
use hn_model::{GridLayout, NodeKind, NodeProps, SystemModel, SystemNode, ValveStatus};

fn default_model() -> SystemModel {
    SystemModel::default_model(&SequentialIds::new("n"), &GridLayout::default())
}

#[test]
fn default_model_is_quiet_and_balanced() {
    let model = default_model();
    let out = ReferenceEngine::default().compute(&model);

    assert!(!out.has_errors(), "alerts: {:?}", out.alerts);
    assert!(out.alert("no-pump").is_none());
    assert!(out.alert("no-tank").is_none());
    assert_eq!(out.results.pipes.len(), 2);

    // Lift is -2 m (tank surface above the junction); line losses add back a little.
    let tdh = out.results.total_dynamic_head;
    assert!(tdh > -2.0 && tdh < 0.0, "tdh = {tdh}");
    assert!(out.results.suction_pressure > model.ambient_pressure);
    // Pump work equals lift plus pipe dissipation when every pipe is on the pump line.
    assert!(out.results.energy_balance.abs() < 1e-6, "{}", out.results.energy_balance);
}

#[test]
fn results_are_deterministic() {
    let model = default_model();
    let engine = ReferenceEngine::default();
    assert_eq!(engine.compute(&model), engine.compute(&model));
}

#[test]
fn pipe_results_follow_darcy_weisbach() {
    let model = default_model();
    let out = ReferenceEngine::default().compute(&model);
    let pipe = &model.pipes[0];
    let r = out.results.pipe(&pipe.id).unwrap();

    let area = std::f64::consts::PI * 0.1 * 0.1 / 4.0;
    assert!((r.velocity - 0.01 / area).abs() < 1e-9);
    assert!(r.reynolds > 100_000.0);
    assert!(r.friction_factor > 0.01 && r.friction_factor < 0.03);
    assert!(r.head_loss > 0.0);
}

#[test]
fn empty_model_warns_about_missing_equipment() {
    let out = ReferenceEngine::default().compute(&SystemModel::empty());
    assert_eq!(out.alert("no-pump").unwrap().severity, Severity::Warning);
    assert_eq!(out.alert("no-tank").unwrap().severity, Severity::Warning);
    assert!(out.results.pipes.is_empty());
}

#[test]
fn unknown_fluid_falls_back_to_water() {
    let mut model = default_model();
    model.fluid_id = "mercury".into();
    let out = ReferenceEngine::default().compute(&model);
    assert_eq!(out.alert("fluid-unknown").unwrap().severity, Severity::Error);
    assert!((out.results.specific_weight - 998.2 * 9.806_65).abs() < 1e-9);
}

#[test]
fn fast_pipe_raises_velocity_warning() {
    let mut model = default_model();
    model.pipes[1].flow_rate = 0.05;
    let id = model.pipes[1].id.clone();
    let out = ReferenceEngine::default().compute(&model);
    assert!(out.alert(&format!("pipe-velocity-{id}")).is_some());
    assert!(out.alert(&format!("pipe-velocity-{}", model.pipes[0].id)).is_none());
}

#[test]
fn unset_pump_ports_are_reported() {
    let mut model = SystemModel::empty();
    let pump = SystemNode::with_defaults(NodeKind::Pump, "p1", GridLayout::default().position(0), &model);
    model.nodes.push(pump);
    let out = ReferenceEngine::default().compute(&model);
    assert!(out.alert("pump-suction-unset-p1").is_some());
    assert!(out.alert("pump-discharge-unset-p1").is_some());
    assert!(out.alert("isolated-p1").is_some());
}

#[test]
fn low_tank_on_tall_suction_cavitates() {
    let mut model = default_model();
    if let NodeProps::Tank { base_elevation, .. } = &mut model.nodes[0].props {
        *base_elevation = -20.0;
    }
    let pump_id = model.nodes[1].id.clone();
    let out = ReferenceEngine::default().compute(&model);
    let alert = out.alert(&format!("cavitation-{pump_id}")).unwrap();
    assert_eq!(alert.severity, Severity::Error);
}

#[test]
fn closed_valve_is_flagged() {
    let mut model = default_model();
    let valve = SystemNode::with_defaults(NodeKind::Valve, "v1", GridLayout::default().position(3), &model);
    model.nodes.push(valve);
    let junction = model.nodes[2].id.clone();
    model
        .pipes
        .push(hn_model::SystemPipe::new("p-extra", "Pipe 3", junction, "v1"));
    if let NodeProps::Valve { status, .. } = &mut model.nodes[3].props {
        *status = ValveStatus::Closed;
    }
    let out = ReferenceEngine::default().compute(&model);
    assert!(out.alert("valve-closed-v1").is_some());
    assert!(out.alert("isolated-v1").is_none());
}

#[test]
fn null_engine_returns_defaults() {
    let out = NullEngine.compute(&default_model());
    assert!(out.alerts.is_empty());
    assert_eq!(out.results, Default::default());
}

#[test]
fn closures_are_engines() {
    let engine = |model: &SystemModel| {
        let mut out = hn_hydraulics::Computation::default();
        out.results.total_dynamic_head = model.nodes.len() as f64;
        out
    };
    assert_eq!(engine.compute(&default_model()).results.total_dynamic_head, 3.0);
}
