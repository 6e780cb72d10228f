//! The model store: the only writer of the live model.
//!
//! Every mutation works on a sanitized copy of the live model, applies one
//! change, recomputes results, records the new model in history and only then
//! replaces the published state. Refused or no-op requests leave state and
//! history untouched.

use std::sync::Arc;

use hn_core::{IdProvider, UnitSystem};
use hn_hydraulics::{Alert, Computation, HydraulicResults, HydraulicsEngine};
use hn_model::{
    GridLayout, NodeKind, NodeProps, Position, SnapshotCloner, SystemModel, SystemNode,
    SystemPipe, check_topology, from_json_str, from_yaml_str, parse_value_with, pipe_name,
    to_json_string, to_yaml_string,
};
use hn_sanitize::{SanitizeReport, Value};
use serde::{Deserialize, Serialize};

use crate::error::{ConnectError, EditorResult, MutationOutcome, PipeOutcome};
use crate::history::{History, MAX_HISTORY};
use crate::selection::Selection;

const ID_ATTEMPTS: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StoreConfig {
    pub max_history: usize,
    pub layout: GridLayout,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_history: MAX_HISTORY,
            layout: GridLayout::default(),
        }
    }
}

/// The published state. Callers only ever see a complete one.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorState {
    pub model: SystemModel,
    pub results: HydraulicResults,
    pub alerts: Vec<Alert>,
    pub selection: Selection,
}

pub struct ModelStore {
    engine: Box<dyn HydraulicsEngine>,
    ids: Box<dyn IdProvider>,
    config: StoreConfig,
    cloner: Arc<SnapshotCloner>,
    history: History,
    state: EditorState,
}

impl std::fmt::Debug for ModelStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelStore")
            .field("config", &self.config)
            .field("history_len", &self.history.len())
            .field("history_index", &self.history.index())
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl ModelStore {
    pub fn new(engine: Box<dyn HydraulicsEngine>, ids: Box<dyn IdProvider>) -> Self {
        Self::with_config(engine, ids, StoreConfig::default())
    }

    pub fn with_config(
        engine: Box<dyn HydraulicsEngine>,
        ids: Box<dyn IdProvider>,
        config: StoreConfig,
    ) -> Self {
        Self::with_parts(engine, ids, config, SnapshotCloner::default())
    }

    /// Starts from the default model with a single history entry.
    pub fn with_parts(
        engine: Box<dyn HydraulicsEngine>,
        ids: Box<dyn IdProvider>,
        config: StoreConfig,
        cloner: SnapshotCloner,
    ) -> Self {
        let cloner = Arc::new(cloner);
        let model = SystemModel::default_model(ids.as_ref(), &config.layout);
        let Computation { results, alerts } = engine.compute(&model);
        let history = History::new(&model, config.max_history, Arc::clone(&cloner));
        Self {
            engine,
            ids,
            config,
            cloner,
            history,
            state: EditorState {
                model,
                results,
                alerts,
                selection: Selection::None,
            },
        }
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn model(&self) -> &SystemModel {
        &self.state.model
    }

    pub fn results(&self) -> &HydraulicResults {
        &self.state.results
    }

    pub fn alerts(&self) -> &[Alert] {
        &self.state.alerts
    }

    pub fn selection(&self) -> &Selection {
        &self.state.selection
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn history_index(&self) -> usize {
        self.history.index()
    }

    // --- nodes ---

    /// Appends a node of `kind` with default properties and selects it.
    pub fn add_node(&mut self, kind: NodeKind, position: Option<Position>) -> String {
        let mut model = self.working_copy();
        let id = self.fresh_id(&model);
        let position = position.unwrap_or_else(|| self.config.layout.position(model.nodes.len()));
        let node = SystemNode::with_defaults(kind, id.clone(), position, &model);
        model.nodes.push(node);
        self.commit("add_node", model, Selection::Node(id.clone()));
        id
    }

    pub fn add_tank(&mut self, position: Option<Position>) -> String {
        self.add_node(NodeKind::Tank, position)
    }

    pub fn add_pump(&mut self, position: Option<Position>) -> String {
        self.add_node(NodeKind::Pump, position)
    }

    pub fn add_junction(&mut self, position: Option<Position>) -> String {
        self.add_node(NodeKind::Junction, position)
    }

    pub fn add_valve(&mut self, position: Option<Position>) -> String {
        self.add_node(NodeKind::Valve, position)
    }

    pub fn add_regulator(&mut self, position: Option<Position>) -> String {
        self.add_node(NodeKind::Regulator, position)
    }

    pub fn add_meter(&mut self, position: Option<Position>) -> String {
        self.add_node(NodeKind::Meter, position)
    }

    /// Removes a node and every pipe touching it. Pumps are never removed.
    ///
    /// Pump suction/discharge references to the removed node are cleared.
    pub fn remove_node(&mut self, id: &str) -> MutationOutcome {
        match self.state.model.node(id).map(SystemNode::kind) {
            None => return self.unchanged("remove_node", id, "not found"),
            Some(NodeKind::Pump) => return self.unchanged("remove_node", id, "pump is protected"),
            Some(_) => {}
        }

        let mut model = self.working_copy();
        model.nodes.retain(|n| n.id != id);
        model.pipes.retain(|p| !p.touches(id));
        for node in &mut model.nodes {
            if let NodeProps::Pump {
                suction_node_id,
                discharge_node_id,
            } = &mut node.props
            {
                if suction_node_id.as_str() == id {
                    suction_node_id.clear();
                }
                if discharge_node_id.as_str() == id {
                    discharge_node_id.clear();
                }
            }
        }
        self.commit("remove_node", model, Selection::None);
        MutationOutcome::Applied
    }

    /// Replaces the node with `updater`'s output.
    ///
    /// The output must keep the node's id and its pump-ness (pumps only come
    /// from [`ModelStore::add_pump`]), and must leave the model's topology
    /// valid; otherwise nothing changes.
    pub fn update_node<F>(&mut self, id: &str, updater: F) -> MutationOutcome
    where
        F: FnOnce(SystemNode) -> SystemNode,
    {
        let Some(index) = self.state.model.nodes.iter().position(|n| n.id == id) else {
            return self.unchanged("update_node", id, "not found");
        };

        let mut model = self.working_copy();
        let current = model.nodes[index].clone();
        let was_pump = current.kind() == NodeKind::Pump;
        let updated = updater(current);
        if updated.id != id {
            return self.unchanged("update_node", id, "updater changed the id");
        }
        if was_pump && updated.kind() != NodeKind::Pump {
            return self.unchanged("update_node", id, "pump is protected");
        }
        if !was_pump && updated.kind() == NodeKind::Pump {
            return self.unchanged("update_node", id, "cannot become a pump");
        }
        model.nodes[index] = updated;
        if let Err(err) = check_topology(&model) {
            tracing::debug!(op = "update_node", id, error = %err, "mutation refused");
            return MutationOutcome::Unchanged;
        }

        let selection = self.state.selection.clone();
        self.commit("update_node", model, selection);
        MutationOutcome::Applied
    }

    pub fn move_node(&mut self, id: &str, position: Position) -> MutationOutcome {
        self.update_node(id, |mut node| {
            node.position = position;
            node
        })
    }

    // --- pipes ---

    /// Connects two nodes. Refusals are reported in the outcome and change nothing.
    pub fn add_pipe(&mut self, from: &str, to: &str) -> PipeOutcome {
        if let Err(reason) = self.check_connection(from, to) {
            tracing::debug!(op = "add_pipe", from, to, error = %reason, "mutation refused");
            return PipeOutcome::rejected(reason);
        }

        let mut model = self.working_copy();
        let id = self.fresh_id(&model);
        let name = pipe_name(model.pipes.len());
        model.pipes.push(SystemPipe::new(id.clone(), name, from, to));
        self.commit("add_pipe", model, Selection::Pipe(id.clone()));
        PipeOutcome::connected(id)
    }

    pub fn remove_pipe(&mut self, id: &str) -> MutationOutcome {
        if self.state.model.pipe(id).is_none() {
            return self.unchanged("remove_pipe", id, "not found");
        }
        let mut model = self.working_copy();
        model.pipes.retain(|p| p.id != id);
        self.commit("remove_pipe", model, Selection::None);
        MutationOutcome::Applied
    }

    /// Replaces the pipe with `updater`'s output, under the same rules as
    /// [`ModelStore::update_node`].
    pub fn update_pipe<F>(&mut self, id: &str, updater: F) -> MutationOutcome
    where
        F: FnOnce(SystemPipe) -> SystemPipe,
    {
        let Some(index) = self.state.model.pipes.iter().position(|p| p.id == id) else {
            return self.unchanged("update_pipe", id, "not found");
        };

        let mut model = self.working_copy();
        let updated = updater(model.pipes[index].clone());
        if updated.id != id {
            return self.unchanged("update_pipe", id, "updater changed the id");
        }
        model.pipes[index] = updated;
        if let Err(err) = check_topology(&model) {
            tracing::debug!(op = "update_pipe", id, error = %err, "mutation refused");
            return MutationOutcome::Unchanged;
        }

        let selection = self.state.selection.clone();
        self.commit("update_pipe", model, selection);
        MutationOutcome::Applied
    }

    // --- system settings ---

    pub fn set_fluid(&mut self, fluid_id: impl Into<String>) -> MutationOutcome {
        let mut model = self.working_copy();
        model.fluid_id = fluid_id.into();
        self.commit_keeping_selection("set_fluid", model)
    }

    pub fn set_units(&mut self, units: UnitSystem) -> MutationOutcome {
        let mut model = self.working_copy();
        model.units = units;
        self.commit_keeping_selection("set_units", model)
    }

    /// Absolute ambient pressure, Pa.
    pub fn set_ambient_pressure(&mut self, pressure: f64) -> MutationOutcome {
        let mut model = self.working_copy();
        model.ambient_pressure = pressure;
        self.commit_keeping_selection("set_ambient_pressure", model)
    }

    // --- whole-model operations ---

    /// Back to the default model with a single history entry.
    pub fn reset(&mut self) {
        let model = SystemModel::default_model(self.ids.as_ref(), &self.config.layout);
        let Computation { results, alerts } = self.engine.compute(&model);
        self.history.reset(&model);
        self.state = EditorState {
            model,
            results,
            alerts,
            selection: Selection::None,
        };
        tracing::debug!(op = "reset", nodes = self.state.model.nodes.len(), "store reset");
    }

    /// Parses untyped external data and, if it is a valid model, makes it live.
    ///
    /// On error nothing changes. On success the sanitizer's report (if anything
    /// was stripped) is returned.
    pub fn load_model(&mut self, raw: &Value) -> EditorResult<Option<SanitizeReport>> {
        let parsed = parse_value_with(self.cloner.sanitizer(), raw)?;
        self.commit("load_model", parsed.value, Selection::None);
        Ok(parsed.report)
    }

    pub fn load_json_str(&mut self, text: &str) -> EditorResult<()> {
        let model = from_json_str(text)?;
        self.commit("load_model", model, Selection::None);
        Ok(())
    }

    pub fn load_yaml_str(&mut self, text: &str) -> EditorResult<()> {
        let model = from_yaml_str(text)?;
        self.commit("load_model", model, Selection::None);
        Ok(())
    }

    pub fn export_json(&self) -> EditorResult<String> {
        Ok(to_json_string(&self.state.model)?)
    }

    pub fn export_yaml(&self) -> EditorResult<String> {
        Ok(to_yaml_string(&self.state.model)?)
    }

    // --- history ---

    /// Steps back one entry and clears the selection.
    pub fn undo(&mut self) -> MutationOutcome {
        match self.history.undo() {
            Some(snapshot) => {
                self.restore("undo", snapshot.model, Selection::None);
                MutationOutcome::Applied
            }
            None => MutationOutcome::Unchanged,
        }
    }

    /// Re-applies the next entry, including what that edit selected.
    pub fn redo(&mut self) -> MutationOutcome {
        match self.history.redo() {
            Some(snapshot) => {
                self.restore("redo", snapshot.model, snapshot.selection);
                MutationOutcome::Applied
            }
            None => MutationOutcome::Unchanged,
        }
    }

    // --- selection ---

    /// Selects an existing node or pipe. Selection changes are not recorded.
    pub fn select(&mut self, selection: Selection) -> MutationOutcome {
        let exists = match &selection {
            Selection::None => true,
            Selection::Node(id) => self.state.model.contains_node(id),
            Selection::Pipe(id) => self.state.model.pipe(id).is_some(),
        };
        if !exists {
            return MutationOutcome::Unchanged;
        }
        self.state.selection = selection;
        MutationOutcome::Applied
    }

    pub fn clear_selection(&mut self) {
        self.state.selection = Selection::None;
    }

    pub fn remove_selected(&mut self) -> MutationOutcome {
        match self.state.selection.clone() {
            Selection::None => MutationOutcome::Unchanged,
            Selection::Node(id) => self.remove_node(&id),
            Selection::Pipe(id) => self.remove_pipe(&id),
        }
    }

    // --- internals ---

    fn working_copy(&self) -> SystemModel {
        self.cloner.snapshot(&self.state.model).into_value()
    }

    /// Checked in order: identical endpoints, missing nodes, existing connection.
    fn check_connection(&self, from: &str, to: &str) -> Result<(), ConnectError> {
        if from == to {
            return Err(ConnectError::IdenticalEndpoints { id: from.to_string() });
        }
        let model = &self.state.model;
        for id in [from, to] {
            if !model.contains_node(id) {
                return Err(ConnectError::MissingNode { id: id.to_string() });
            }
        }
        if model.connection(from, to).is_some() {
            return Err(ConnectError::DuplicateConnection {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        Ok(())
    }

    /// An id not used by any node or pipe of `model`.
    fn fresh_id(&self, model: &SystemModel) -> String {
        let taken = |id: &str| model.contains_node(id) || model.pipe(id).is_some();
        let mut id = self.ids.next_id();
        for _ in 1..ID_ATTEMPTS {
            if !taken(&id) {
                return id;
            }
            id = self.ids.next_id();
        }
        let base = id;
        let mut n = 2usize;
        loop {
            let candidate = format!("{base}-{n}");
            if !taken(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    fn commit(&mut self, op: &'static str, model: SystemModel, selection: Selection) {
        let Computation { results, alerts } = self.engine.compute(&model);
        self.history.push(&model, selection.clone());
        self.state = EditorState {
            model,
            results,
            alerts,
            selection,
        };
        tracing::debug!(
            op,
            nodes = self.state.model.nodes.len(),
            pipes = self.state.model.pipes.len(),
            history_index = self.history.index(),
            "mutation applied"
        );
    }

    fn commit_keeping_selection(&mut self, op: &'static str, model: SystemModel) -> MutationOutcome {
        let selection = self.state.selection.clone();
        self.commit(op, model, selection);
        MutationOutcome::Applied
    }

    fn restore(&mut self, op: &'static str, model: SystemModel, selection: Selection) {
        let Computation { results, alerts } = self.engine.compute(&model);
        self.state = EditorState {
            model,
            results,
            alerts,
            selection,
        };
        tracing::debug!(op, history_index = self.history.index(), "history restored");
    }

    fn unchanged(&self, op: &'static str, id: &str, why: &'static str) -> MutationOutcome {
        tracing::debug!(op, id, why, "mutation skipped");
        MutationOutcome::Unchanged
    }
}
