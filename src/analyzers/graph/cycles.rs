use std::collections::HashSet;

use petgraph::Direction;
use petgraph::algo::tarjan_scc;
use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};

use crate::analyzers::graph::builder::{DependencyGraph, EdgeKind, NodeKind};
use crate::core::types::Severity;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CircularDependency {
    /// Node ids on the cycle, in walk order, first node not repeated.
    pub nodes: Vec<String>,
    pub length: usize,
    /// Edge kinds along the cycle including the closing edge.
    pub edge_kinds: Vec<EdgeKind>,
    pub severity: Severity,
}

/// Cycle detection via Tarjan's strongly connected components: every SCC
/// with more than one node (or a self-loop) is a cycle. The walk order is
/// reconstructed by following edges inside the component.
pub fn detect_cycles(graph: &DependencyGraph) -> Vec<CircularDependency> {
    let mut cycles = Vec::new();
    for scc in tarjan_scc(graph.inner()) {
        if scc.len() == 1 && graph.inner().find_edge(scc[0], scc[0]).is_none() {
            continue;
        }
        let ordered = walk_cycle(graph, &scc);
        cycles.push(describe_cycle(graph, &ordered, &scc));
    }
    cycles
}

/// Orders the component's nodes into a closed walk by repeatedly stepping to
/// an unvisited out-neighbor inside the component.
fn walk_cycle(graph: &DependencyGraph, scc: &[NodeIndex]) -> Vec<NodeIndex> {
    let members: HashSet<NodeIndex> = scc.iter().copied().collect();
    let start = scc[0];
    let mut ordered = vec![start];
    let mut seen = HashSet::from([start]);
    let mut current = start;
    while let Some(next) = graph
        .inner()
        .neighbors_directed(current, Direction::Outgoing)
        .find(|n| members.contains(n) && !seen.contains(n))
    {
        seen.insert(next);
        ordered.push(next);
        current = next;
    }
    ordered
}

fn describe_cycle(
    graph: &DependencyGraph,
    ordered: &[NodeIndex],
    scc: &[NodeIndex],
) -> CircularDependency {
    let nodes: Vec<String> = ordered
        .iter()
        .map(|&i| graph.inner()[i].id.clone())
        .collect();

    let mut edge_kinds = Vec::with_capacity(ordered.len());
    for (i, &from) in ordered.iter().enumerate() {
        let to = ordered[(i + 1) % ordered.len()];
        if let Some(edge) = graph.edge_between(from, to) {
            edge_kinds.push(edge.kind);
        }
    }

    let severity = cycle_severity(graph, scc);
    CircularDependency {
        length: nodes.len(),
        nodes,
        edge_kinds,
        severity,
    }
}

/// Severity ladder: design-permitted loops are informational; anything that
/// pulls requirements, goals, or actors into a cycle is critical; otherwise
/// shorter cycles are worse because they are tight couplings.
fn cycle_severity(graph: &DependencyGraph, scc: &[NodeIndex]) -> Severity {
    let members: HashSet<NodeIndex> = scc.iter().copied().collect();
    let all_bidirectional = graph
        .inner()
        .edge_references()
        .filter(|e| members.contains(&e.source()) && members.contains(&e.target()))
        .all(|e| e.weight().bidirectional_allowed);
    if all_bidirectional {
        return Severity::Info;
    }
    let has_critical_kind = scc.iter().any(|&i| {
        matches!(
            graph.inner()[i].kind,
            NodeKind::BusinessRequirement | NodeKind::BusinessGoal | NodeKind::Actor
        )
    });
    if has_critical_kind {
        return Severity::Critical;
    }
    match scc.len() {
        0..=3 => Severity::High,
        4..=5 => Severity::Medium,
        _ => Severity::Low,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph_with(nodes: &[(&str, NodeKind)], edges: &[(&str, &str, bool)]) -> DependencyGraph {
        let mut graph = DependencyGraph::new();
        for (id, kind) in nodes {
            graph.add_node(*id, *id, *kind);
        }
        for (from, to, bidirectional) in edges {
            graph.add_edge(from, to, EdgeKind::DependsOn, *bidirectional);
        }
        graph
    }

    #[test]
    fn test_bidirectional_screen_loop_is_info() {
        let mut graph = DependencyGraph::new();
        graph.add_node("list", "list", NodeKind::Screen);
        graph.add_node("detail", "detail", NodeKind::Screen);
        graph.add_edge("list", "detail", EdgeKind::Triggers, true);
        graph.add_edge("detail", "list", EdgeKind::Triggers, true);

        let cycles = detect_cycles(&graph);
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].severity, Severity::Info);
        assert_eq!(cycles[0].length, 2);
        assert_eq!(cycles[0].edge_kinds, vec![EdgeKind::Triggers, EdgeKind::Triggers]);
    }

    #[test]
    fn test_requirement_in_cycle_is_critical() {
        let graph = graph_with(
            &[
                ("br-1", NodeKind::BusinessRequirement),
                ("uc-1", NodeKind::UseCase),
            ],
            &[("br-1", "uc-1", false), ("uc-1", "br-1", false)],
        );
        let cycles = detect_cycles(&graph);
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].severity, Severity::Critical);
    }

    #[test]
    fn test_length_based_severity() {
        let short = graph_with(
            &[
                ("a", NodeKind::UseCase),
                ("b", NodeKind::UseCase),
                ("c", NodeKind::UseCase),
            ],
            &[("a", "b", false), ("b", "c", false), ("c", "a", false)],
        );
        assert_eq!(detect_cycles(&short)[0].severity, Severity::High);

        let medium = graph_with(
            &[
                ("a", NodeKind::UseCase),
                ("b", NodeKind::UseCase),
                ("c", NodeKind::UseCase),
                ("d", NodeKind::UseCase),
                ("e", NodeKind::UseCase),
            ],
            &[
                ("a", "b", false),
                ("b", "c", false),
                ("c", "d", false),
                ("d", "e", false),
                ("e", "a", false),
            ],
        );
        assert_eq!(detect_cycles(&medium)[0].severity, Severity::Medium);
    }

    #[test]
    fn test_acyclic_graph_has_no_cycles() {
        let graph = graph_with(
            &[
                ("a", NodeKind::UseCase),
                ("b", NodeKind::UseCase),
                ("c", NodeKind::Screen),
            ],
            &[("a", "b", false), ("a", "c", false), ("b", "c", false)],
        );
        assert!(detect_cycles(&graph).is_empty());
    }

    #[test]
    fn test_self_loop_is_a_cycle() {
        let graph = graph_with(
            &[("uc-1", NodeKind::UseCase)],
            &[("uc-1", "uc-1", false)],
        );
        let cycles = detect_cycles(&graph);
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].length, 1);
        assert_eq!(cycles[0].severity, Severity::High);
    }

    #[test]
    fn test_reported_cycle_is_closed_walk() {
        let graph = graph_with(
            &[
                ("a", NodeKind::UseCase),
                ("b", NodeKind::UseCase),
                ("c", NodeKind::UseCase),
            ],
            &[("a", "b", false), ("b", "c", false), ("c", "a", false)],
        );
        let cycles = detect_cycles(&graph);
        assert_eq!(cycles.len(), 1);
        let cycle = &cycles[0];
        assert_eq!(cycle.nodes.len(), 3);
        for i in 0..cycle.nodes.len() {
            let from = graph.node_index(&cycle.nodes[i]).unwrap();
            let to = graph
                .node_index(&cycle.nodes[(i + 1) % cycle.nodes.len()])
                .unwrap();
            assert!(graph.edge_between(from, to).is_some());
        }
    }

    #[test]
    fn test_two_components_two_cycles() {
        let graph = graph_with(
            &[
                ("a", NodeKind::UseCase),
                ("b", NodeKind::UseCase),
                ("x", NodeKind::Screen),
                ("y", NodeKind::Screen),
            ],
            &[
                ("a", "b", false),
                ("b", "a", false),
                ("x", "y", true),
                ("y", "x", true),
            ],
        );
        let cycles = detect_cycles(&graph);
        assert_eq!(cycles.len(), 2);
        let severities: HashSet<Severity> = cycles.iter().map(|c| c.severity).collect();
        assert!(severities.contains(&Severity::High));
        assert!(severities.contains(&Severity::Info));
    }
}
