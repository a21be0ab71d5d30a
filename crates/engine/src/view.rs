//! Read-only graph view for display layers.
//!
//! Maps states to nodes and transitions to directed edges. The engine never
//! draws anything; a front end serialises a [`GraphView`] and hands it to
//! whatever graphing widget it uses.

use model::{StateId, StateKind, Transition};
use serde::Serialize;

use crate::graph::collect_states;

/// A state as a graph node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewNode {
    pub id: StateId,
    pub label: String,
    pub kind: StateKind,
}

/// A transition as a directed edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewEdge {
    pub from: StateId,
    pub to: StateId,
    pub label: String,
    /// Arrow placement hint; always `"to"`.
    pub arrows: &'static str,
}

/// Nodes and edges of a whole workflow graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GraphView {
    pub nodes: Vec<ViewNode>,
    pub edges: Vec<ViewEdge>,
}

impl GraphView {
    /// Build a view; nodes are deduplicated by id and transitions missing an
    /// endpoint contribute no edge.
    pub fn from_transitions(transitions: &[Transition]) -> Self {
        let nodes = collect_states(transitions)
            .into_iter()
            .map(|state| ViewNode {
                id: state.id(),
                label: state.name().to_owned(),
                kind: state.kind(),
            })
            .collect();

        let edges = transitions
            .iter()
            .filter_map(|t| {
                let (from, to) = (t.in_state()?, t.out_state()?);
                Some(ViewEdge {
                    from: from.id(),
                    to: to.id(),
                    label: t.name().to_owned(),
                    arrows: "to",
                })
            })
            .collect();

        Self { nodes, edges }
    }
}

impl From<&crate::WorkflowEngine> for GraphView {
    fn from(engine: &crate::WorkflowEngine) -> Self {
        Self::from_transitions(engine.transitions())
    }
}

#[cfg(test)]
mod tests {
    use model::State;

    use super::*;

    #[test]
    fn nodes_are_unique_and_edges_follow_transitions() {
        let start = State::entry("start");
        let task = State::plain("task");
        let end = State::exit("end");
        let transitions = vec![
            Transition::between("t1", &start, &task),
            Transition::between("t2", &task, &end),
            Transition::new("unwired"),
        ];

        let view = GraphView::from_transitions(&transitions);
        let labels: Vec<&str> = view.nodes.iter().map(|n| n.label.as_str()).collect();
        assert_eq!(labels, vec!["start", "task", "end"]);
        assert_eq!(view.edges.len(), 2);
        assert_eq!(view.edges[1].from, task.id());
        assert_eq!(view.edges[1].to, end.id());
    }

    #[test]
    fn serializes_for_graphing_widgets() {
        let start = State::entry("start");
        let end = State::exit("end");
        let view = GraphView::from_transitions(&[Transition::between("go", &start, &end)]);

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["edges"][0]["arrows"], "to");
        assert_eq!(json["nodes"][0]["label"], "start");
        assert_eq!(json["nodes"][1]["kind"]["type"], "exit");
    }
}
