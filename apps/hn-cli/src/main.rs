use clap::{Parser, Subcommand, ValueEnum};
use hn_core::units::{m, m3ps, mps, pa};
use hn_core::{IdProvider, SequentialIds, UnitSystem, default_provider};
use hn_editor::{AlertTracker, EditorResult, ModelStore, TracingSink};
use hn_hydraulics::{Alert, HydraulicResults, HydraulicsEngine, ReferenceEngine};
use hn_model::{NodeKind, SystemModel, from_json_str, from_yaml_str, to_json_string, to_yaml_string};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hydronet")]
#[command(about = "hydronet - hydraulic network model tool", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a model file (JSON or YAML)
    Validate {
        /// Path to the model file
        model_path: PathBuf,
    },
    /// Print node and pipe counts
    Summary {
        /// Path to the model file
        model_path: PathBuf,
    },
    /// Run the reference engine and print results and alerts
    Compute {
        /// Path to the model file
        model_path: PathBuf,
        /// Override the model's display units
        #[arg(long, value_enum)]
        units: Option<UnitsArg>,
    },
    /// Convert between JSON and YAML (chosen by file extension)
    Convert {
        /// Input model file
        input: PathBuf,
        /// Output model file
        output: PathBuf,
    },
    /// Run a scripted editing session on the default model
    Demo {
        /// Use deterministic ids
        #[arg(long)]
        sequential_ids: bool,
        /// Write the final model to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum UnitsArg {
    Si,
    Us,
}

impl From<UnitsArg> for UnitSystem {
    fn from(arg: UnitsArg) -> Self {
        match arg {
            UnitsArg::Si => UnitSystem::Si,
            UnitsArg::Us => UnitSystem::Us,
        }
    }
}

fn main() -> EditorResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { model_path } => cmd_validate(&model_path),
        Commands::Summary { model_path } => cmd_summary(&model_path),
        Commands::Compute { model_path, units } => cmd_compute(&model_path, units.map(Into::into)),
        Commands::Convert { input, output } => cmd_convert(&input, &output),
        Commands::Demo {
            sequential_ids,
            output,
        } => cmd_demo(sequential_ids, output.as_deref()),
    }
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}

fn read_model(path: &Path) -> EditorResult<SystemModel> {
    let text = std::fs::read_to_string(path)?;
    let model = if is_yaml(path) {
        from_yaml_str(&text)?
    } else {
        from_json_str(&text)?
    };
    tracing::debug!(path = %path.display(), nodes = model.nodes.len(), "model loaded");
    Ok(model)
}

fn write_model(path: &Path, model: &SystemModel) -> EditorResult<()> {
    let text = if is_yaml(path) {
        to_yaml_string(model)?
    } else {
        to_json_string(model)?
    };
    std::fs::write(path, text)?;
    Ok(())
}

fn cmd_validate(model_path: &Path) -> EditorResult<()> {
    println!("Validating model: {}", model_path.display());
    read_model(model_path)?;
    println!("✓ Model is valid");
    Ok(())
}

fn cmd_summary(model_path: &Path) -> EditorResult<()> {
    let model = read_model(model_path)?;
    let summary = model.summary();
    println!("Fluid: {}", model.fluid_id);
    println!("Units: {}", model.units);
    println!(
        "Ambient pressure: {:.2} {}",
        model.units.pressure(pa(model.ambient_pressure)),
        model.units.pressure_label()
    );
    println!("Nodes: {}", summary.node_total);
    for kind in NodeKind::ALL {
        let count = summary.node_counts.get(&kind).copied().unwrap_or(0);
        if count > 0 {
            println!("  {kind}: {count}");
        }
    }
    println!("Pipes: {}", summary.pipe_total);
    Ok(())
}

fn cmd_compute(model_path: &Path, units: Option<UnitSystem>) -> EditorResult<()> {
    let model = read_model(model_path)?;
    let units = units.unwrap_or(model.units);
    let out = ReferenceEngine::default().compute(&model);
    print_computation(&model, &out.results, &out.alerts, units);
    Ok(())
}

fn print_computation(model: &SystemModel, r: &HydraulicResults, alerts: &[Alert], units: UnitSystem) {
    println!("Results ({units}):");
    println!(
        "  Total dynamic head: {:.3} {}",
        units.length(m(r.total_dynamic_head)),
        units.length_label()
    );
    println!(
        "  Suction pressure:   {:.2} {}",
        units.pressure(pa(r.suction_pressure)),
        units.pressure_label()
    );
    println!(
        "  Discharge pressure: {:.2} {}",
        units.pressure(pa(r.discharge_pressure)),
        units.pressure_label()
    );
    println!("  Specific weight:    {:.1} N/m³", r.specific_weight);
    println!("  Energy balance:     {:.1} W", r.energy_balance);

    for pipe in &model.pipes {
        if let Some(p) = r.pipe(&pipe.id) {
            println!(
                "  {} ({} -> {}): Q {:.3} {}, v {:.2} {}, Re {:.0}, hL {:.3} {}",
                pipe.name,
                pipe.from,
                pipe.to,
                units.flow(m3ps(pipe.flow_rate)),
                units.flow_label(),
                units.velocity(mps(p.velocity)),
                units.velocity_label(),
                p.reynolds,
                units.length(m(p.head_loss)),
                units.length_label()
            );
        }
    }

    if alerts.is_empty() {
        println!("No alerts");
    } else {
        println!("Alerts:");
        for alert in alerts {
            println!("  [{}] {}: {}", alert.severity, alert.title, alert.detail);
        }
    }
}

fn cmd_convert(input: &Path, output: &Path) -> EditorResult<()> {
    let model = read_model(input)?;
    write_model(output, &model)?;
    println!("✓ Wrote {}", output.display());
    Ok(())
}

fn cmd_demo(sequential_ids: bool, output: Option<&Path>) -> EditorResult<()> {
    let ids: Box<dyn IdProvider> = if sequential_ids {
        Box::new(SequentialIds::new("n"))
    } else {
        default_provider()
    };
    let mut store = ModelStore::new(Box::new(ReferenceEngine::default()), ids);
    let mut tracker = AlertTracker::new();
    let mut sink = TracingSink;
    tracker.observe(store.alerts(), &mut sink);

    let junction = store.model().nodes_of_kind(NodeKind::Junction).next().map(|n| n.id.clone());
    let valve = store.add_valve(None);
    println!("Added {valve}");
    if let Some(junction) = &junction {
        let out = store.add_pipe(junction, &valve);
        println!("Connect {junction} -> {valve}: {}", outcome_text(out.success, out.error.as_deref()));
        let again = store.add_pipe(&valve, junction);
        println!("Connect {valve} -> {junction}: {}", outcome_text(again.success, again.error.as_deref()));
    }
    tracker.observe(store.alerts(), &mut sink);

    store.set_fluid("glycol30");
    tracker.observe(store.alerts(), &mut sink);
    println!("History: {} entries, at {}", store.history_len(), store.history_index());

    store.undo();
    println!("Undo -> fluid {}", store.model().fluid_id);
    store.redo();
    println!("Redo -> fluid {}", store.model().fluid_id);
    tracker.observe(store.alerts(), &mut sink);

    let state = store.state();
    let model = &state.model;
    print_computation(model, &state.results, &state.alerts, model.units);

    if let Some(path) = output {
        write_model(path, model)?;
        println!("✓ Wrote {}", path.display());
    }
    println!(
        "Final: {} nodes, {} pipes, selection {:?}",
        model.nodes.len(),
        model.pipes.len(),
        state.selection
    );
    Ok(())
}

fn outcome_text(success: bool, error: Option<&str>) -> String {
    if success {
        "ok".to_string()
    } else {
        format!("refused ({})", error.unwrap_or("unknown"))
    }
}
