use hn_core::SequentialIds;
use hn_editor::{ConnectError, MAX_HISTORY, ModelStore, MutationOutcome};
use hn_hydraulics::NullEngine;
use hn_model::{NodeKind, Position, check_topology};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Add(NodeKind),
    Connect(usize, usize),
    RemoveNode(usize),
    RemovePipe(usize),
    Move(usize, f64, f64),
    Fluid(bool),
}

fn op() -> impl Strategy<Value = Op> {
    let kind = prop::sample::select(NodeKind::ALL.to_vec());
    prop_oneof![
        kind.prop_map(Op::Add),
        (0usize..12, 0usize..12).prop_map(|(a, b)| Op::Connect(a, b)),
        (0usize..12).prop_map(Op::RemoveNode),
        (0usize..12).prop_map(Op::RemovePipe),
        (0usize..12, -500.0..500.0f64, -500.0..500.0f64).prop_map(|(i, x, y)| Op::Move(i, x, y)),
        any::<bool>().prop_map(Op::Fluid),
    ]
}

fn store() -> ModelStore {
    ModelStore::new(Box::new(NullEngine), Box::new(SequentialIds::new("id")))
}

fn node_id(s: &ModelStore, i: usize) -> String {
    let nodes = &s.model().nodes;
    nodes[i % nodes.len()].id.clone()
}

fn apply(s: &mut ModelStore, op: &Op) -> bool {
    match op {
        Op::Add(kind) => {
            s.add_node(*kind, None);
            true
        }
        Op::Connect(a, b) => {
            let (a, b) = (node_id(s, *a), node_id(s, *b));
            s.add_pipe(&a, &b).success
        }
        Op::RemoveNode(i) => {
            let id = node_id(s, *i);
            s.remove_node(&id).is_applied()
        }
        Op::RemovePipe(i) => {
            let id = match s.model().pipes.get(*i) {
                Some(p) => p.id.clone(),
                None => "missing".to_string(),
            };
            s.remove_pipe(&id).is_applied()
        }
        Op::Move(i, x, y) => {
            let id = node_id(s, *i);
            s.move_node(&id, Position::new(*x, *y)).is_applied()
        }
        Op::Fluid(sea) => s.set_fluid(if *sea { "seawater" } else { "water" }).is_applied(),
    }
}

proptest! {
    #[test]
    fn edits_keep_the_graph_consistent(ops in prop::collection::vec(op(), 1..40)) {
        let mut s = store();
        for op in &ops {
            apply(&mut s, op);
            prop_assert!(check_topology(s.model()).is_ok());
            prop_assert!(s.history_len() <= MAX_HISTORY);
            prop_assert_eq!(s.history_index(), s.history_len() - 1);
            // pumps only ever accumulate
            prop_assert!(s.model().count_kind(NodeKind::Pump) >= 1);
        }
    }

    #[test]
    fn undo_then_redo_is_exact(ops in prop::collection::vec(op(), 1..20)) {
        let mut s = store();
        for op in &ops {
            let before = s.model().clone();
            if apply(&mut s, op) {
                let after = s.model().clone();
                prop_assert_eq!(s.undo(), MutationOutcome::Applied);
                prop_assert_eq!(s.model(), &before);
                prop_assert_eq!(s.redo(), MutationOutcome::Applied);
                prop_assert_eq!(s.model(), &after);
            } else {
                prop_assert_eq!(s.model(), &before);
            }
        }
    }

    #[test]
    fn self_loops_are_always_refused(ops in prop::collection::vec(op(), 0..15), pick in 0usize..12) {
        let mut s = store();
        for op in &ops {
            apply(&mut s, op);
        }
        let id = node_id(&s, pick);
        let len = s.history_len();
        let out = s.add_pipe(&id, &id);
        prop_assert_eq!(out.reason(), Some(&ConnectError::IdenticalEndpoints { id }));
        prop_assert_eq!(s.history_len(), len);
    }

    #[test]
    fn connections_are_unique_in_both_directions(a in 0usize..12, b in 0usize..12) {
        let mut s = store();
        for _ in 0..4 {
            s.add_junction(None);
        }
        let (x, y) = (node_id(&s, a), node_id(&s, b));
        prop_assume!(x != y);
        let first = s.add_pipe(&x, &y);
        prop_assume!(first.success || s.model().connection(&x, &y).is_some());
        let is_dup = |r: Option<&ConnectError>| matches!(r, Some(ConnectError::DuplicateConnection { .. }));
        prop_assert!(is_dup(s.add_pipe(&x, &y).reason()));
        prop_assert!(is_dup(s.add_pipe(&y, &x).reason()));
    }
}
