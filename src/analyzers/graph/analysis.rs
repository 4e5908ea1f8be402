use std::collections::{BTreeMap, HashSet};

use petgraph::Direction;
use petgraph::algo::{connected_components, tarjan_scc, toposort};
use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};

use crate::analyzers::coherence::{CoherenceValidationResult, FlowDesignNote};
use crate::analyzers::graph::builder::{DependencyGraph, GraphExport, NodeKind, build_graph};
use crate::analyzers::graph::cycles::{CircularDependency, detect_cycles};
use crate::core::collection::ArtifactCollection;
use crate::core::types::{EffortBucket, Priority, Severity};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphStatistics {
    pub node_count: usize,
    pub edge_count: usize,
    pub nodes_by_kind: BTreeMap<String, usize>,
    pub edges_by_kind: BTreeMap<String, usize>,
    pub average_in_degree: f64,
    pub average_out_degree: f64,
    pub max_depth: usize,
    pub connected_components: usize,
    pub cycle_count: usize,
    pub isolated_node_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphLayer {
    pub level: usize,
    pub nodes: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerViolation {
    pub from: String,
    pub to: String,
    pub from_level: usize,
    pub to_level: usize,
    pub severity: Severity,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerAnalysis {
    pub layers: Vec<GraphLayer>,
    pub violations: Vec<LayerViolation>,
    pub health_score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeImportance {
    pub node_id: String,
    pub kind: NodeKind,
    pub in_degree: usize,
    pub out_degree: usize,
    pub page_rank: f64,
    pub betweenness: f64,
    pub importance: Priority,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactAnalysis {
    pub target: String,
    pub direct_impact: Vec<String>,
    pub indirect_impact: Vec<String>,
    pub critical_count: usize,
    pub estimated_effort: EffortBucket,
}

/// Full structural diagnostics of one graph build. Coherence and flow-design
/// info are attached by the pipeline after the orthogonal validators run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphAnalysisResult {
    pub graph: GraphExport,
    pub statistics: GraphStatistics,
    pub circular_dependencies: Vec<CircularDependency>,
    pub layer_analysis: LayerAnalysis,
    pub node_importance: Vec<NodeImportance>,
    pub isolated_nodes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topological_order: Option<Vec<String>>,
    pub warnings: Vec<String>,
    pub recommendations: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coherence_validation: Option<CoherenceValidationResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flow_design_info: Option<Vec<FlowDesignNote>>,
}

impl GraphAnalysisResult {
    pub fn cycles_by_severity(&self) -> BTreeMap<Severity, usize> {
        let mut by_severity = BTreeMap::new();
        for cycle in &self.circular_dependencies {
            *by_severity.entry(cycle.severity).or_insert(0) += 1;
        }
        by_severity
    }

    /// Cycles that are not design-permitted loops.
    pub fn problematic_cycle_count(&self) -> usize {
        self.circular_dependencies
            .iter()
            .filter(|c| c.severity != Severity::Info)
            .count()
    }
}

pub struct GraphAnalyzer;

impl GraphAnalyzer {
    pub fn new() -> Self {
        Self
    }

    pub fn analyze(&self, collection: &ArtifactCollection) -> GraphAnalysisResult {
        let graph = build_graph(collection);
        let circular_dependencies = detect_cycles(&graph);
        let statistics = compute_statistics(&graph, circular_dependencies.len());
        let layer_analysis = analyze_layers(&graph);
        let node_importance = rank_importance(&graph);
        let isolated_nodes: Vec<String> = graph
            .inner()
            .node_indices()
            .filter(|&i| graph.is_isolated(i))
            .map(|i| graph.inner()[i].id.clone())
            .collect();
        let topological_order = if circular_dependencies.is_empty() {
            topological_order(&graph)
        } else {
            None
        };
        let (warnings, recommendations) =
            collect_warnings(&graph, &circular_dependencies, &isolated_nodes);

        GraphAnalysisResult {
            graph: graph.export(),
            statistics,
            circular_dependencies,
            layer_analysis,
            node_importance,
            isolated_nodes,
            topological_order,
            warnings,
            recommendations,
            coherence_validation: None,
            flow_design_info: None,
        }
    }
}

impl Default for GraphAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

fn compute_statistics(graph: &DependencyGraph, cycle_count: usize) -> GraphStatistics {
    let inner = graph.inner();
    let node_count = inner.node_count();
    let edge_count = inner.edge_count();

    let mut nodes_by_kind = BTreeMap::new();
    for node in inner.node_weights() {
        *nodes_by_kind.entry(node.kind.key().to_string()).or_insert(0) += 1;
    }
    let mut edges_by_kind = BTreeMap::new();
    for edge in inner.edge_references() {
        *edges_by_kind
            .entry(edge.weight().kind.key().to_string())
            .or_insert(0) += 1;
    }

    let average = if node_count == 0 {
        0.0
    } else {
        edge_count as f64 / node_count as f64
    };

    let (level, assigned) = assign_levels(graph);
    let max_depth = inner
        .node_indices()
        .filter(|i| assigned[i.index()])
        .map(|i| level[i.index()])
        .max()
        .unwrap_or(0);

    GraphStatistics {
        node_count,
        edge_count,
        nodes_by_kind,
        edges_by_kind,
        average_in_degree: average,
        average_out_degree: average,
        max_depth,
        connected_components: connected_components(inner),
        cycle_count,
        isolated_node_count: inner.node_indices().filter(|&i| graph.is_isolated(i)).count(),
    }
}

/// Longest-path level per node. Acyclic graphs come straight from
/// `toposort`; otherwise the SCC condensation order from `tarjan_scc` layers
/// the acyclic part and everything trapped in or behind a cycle stays
/// unassigned.
fn assign_levels(graph: &DependencyGraph) -> (Vec<usize>, Vec<bool>) {
    // Nodes are never removed, so indices are dense in 0..node_count.
    let inner = graph.inner();
    let bound = inner.node_count();
    let mut level = vec![0usize; bound];
    let mut assigned = vec![false; bound];

    match toposort(inner, None) {
        Ok(order) => {
            for node in order {
                let depth = inner
                    .neighbors_directed(node, Direction::Incoming)
                    .map(|p| level[p.index()] + 1)
                    .max()
                    .unwrap_or(0);
                level[node.index()] = depth;
                assigned[node.index()] = true;
            }
        }
        Err(_) => {
            let sccs = tarjan_scc(inner);
            let mut trapped = vec![false; bound];
            for scc in &sccs {
                let cyclic = scc.len() > 1 || inner.find_edge(scc[0], scc[0]).is_some();
                if cyclic {
                    for &node in scc {
                        trapped[node.index()] = true;
                    }
                }
            }
            // tarjan_scc yields components in reverse topological order, so
            // the reversed list visits every predecessor component first.
            for scc in sccs.iter().rev() {
                for &node in scc {
                    if trapped[node.index()] {
                        continue;
                    }
                    let mut depth = 0;
                    let mut layerable = true;
                    for pred in inner.neighbors_directed(node, Direction::Incoming) {
                        if !assigned[pred.index()] {
                            layerable = false;
                            break;
                        }
                        depth = depth.max(level[pred.index()] + 1);
                    }
                    if layerable {
                        level[node.index()] = depth;
                        assigned[node.index()] = true;
                    }
                }
            }
        }
    }

    (level, assigned)
}

/// Layering over the longest-path levels: every node appears in exactly one
/// layer; nodes trapped in cycles land together in one final layer so the
/// partition stays total.
pub fn analyze_layers(graph: &DependencyGraph) -> LayerAnalysis {
    let inner = graph.inner();
    let (mut level, assigned) = assign_levels(graph);

    let max_assigned = inner
        .node_indices()
        .filter(|i| assigned[i.index()])
        .map(|i| level[i.index()])
        .max()
        .unwrap_or(0);
    let has_remnant = inner.node_indices().any(|i| !assigned[i.index()]);
    for i in inner.node_indices() {
        if !assigned[i.index()] {
            level[i.index()] = max_assigned + 1;
        }
    }

    let layer_count = if inner.node_count() == 0 {
        0
    } else if has_remnant {
        max_assigned + 2
    } else {
        max_assigned + 1
    };
    let mut layers: Vec<GraphLayer> = (0..layer_count)
        .map(|l| GraphLayer {
            level: l,
            nodes: Vec::new(),
        })
        .collect();
    for i in inner.node_indices() {
        layers[level[i.index()]].nodes.push(inner[i].id.clone());
    }
    layers.retain(|l| !l.nodes.is_empty());

    let mut violations = Vec::new();
    for edge in inner.edge_references() {
        let from_level = level[edge.source().index()];
        let to_level = level[edge.target().index()];
        if from_level > to_level {
            let gap = from_level - to_level;
            let severity = if gap > 2 {
                Severity::High
            } else if gap > 1 {
                Severity::Medium
            } else {
                Severity::Low
            };
            violations.push(LayerViolation {
                from: inner[edge.source()].id.clone(),
                to: inner[edge.target()].id.clone(),
                from_level,
                to_level,
                severity,
            });
        }
    }

    let health_score = (100.0 - 5.0 * violations.len() as f64).max(0.0);
    LayerAnalysis {
        layers,
        violations,
        health_score,
    }
}

/// Degree-derived importance ranking. The pagerank here is the one-pass
/// degree approximation, not the iterative algorithm.
pub fn rank_importance(graph: &DependencyGraph) -> Vec<NodeImportance> {
    let inner = graph.inner();
    let node_count = inner.node_count();
    let mut ranked: Vec<NodeImportance> = inner
        .node_indices()
        .map(|i| {
            let node = &inner[i];
            let in_degree = graph.in_degree(i);
            let out_degree = graph.out_degree(i);
            let betweenness = (in_degree * out_degree) as f64;
            let importance = if in_degree >= 10 || betweenness >= 50.0 {
                Priority::Critical
            } else if in_degree >= 5 || betweenness >= 20.0 {
                Priority::High
            } else if in_degree >= 2 || betweenness >= 5.0 {
                Priority::Medium
            } else {
                Priority::Low
            };
            NodeImportance {
                node_id: node.id.clone(),
                kind: node.kind,
                in_degree,
                out_degree,
                page_rank: if node_count == 0 {
                    0.0
                } else {
                    in_degree as f64 / node_count as f64
                },
                betweenness,
                importance,
            }
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.in_degree
            .cmp(&a.in_degree)
            .then_with(|| a.node_id.cmp(&b.node_id))
    });
    ranked
}

/// Default bound for change-impact traversal.
pub const DEFAULT_IMPACT_DEPTH: usize = 5;

/// Reverse-BFS change impact over incoming edges, bounded by `max_depth`.
/// Immediate dependents are the direct impact; anything deeper is indirect.
pub fn analyze_impact(
    graph: &DependencyGraph,
    node_id: &str,
    max_depth: usize,
) -> Option<ImpactAnalysis> {
    let inner = graph.inner();
    let start = graph.node_index(node_id)?;

    let mut direct_impact = Vec::new();
    let mut indirect_impact = Vec::new();
    let mut visited: HashSet<NodeIndex> = HashSet::from([start]);
    let mut frontier = vec![start];
    for depth in 1..=max_depth {
        let mut next_frontier = Vec::new();
        for &node in &frontier {
            for dependent in inner.neighbors_directed(node, Direction::Incoming) {
                if visited.insert(dependent) {
                    next_frontier.push(dependent);
                    let id = inner[dependent].id.clone();
                    if depth == 1 {
                        direct_impact.push(id);
                    } else {
                        indirect_impact.push(id);
                    }
                }
            }
        }
        if next_frontier.is_empty() {
            break;
        }
        frontier = next_frontier;
    }

    let critical_count = visited
        .iter()
        .filter(|&&i| i != start)
        .filter(|&&i| {
            matches!(
                inner[i].kind,
                NodeKind::UseCase | NodeKind::BusinessRequirement
            )
        })
        .count();
    let total = direct_impact.len() + indirect_impact.len();

    Some(ImpactAnalysis {
        target: node_id.to_string(),
        direct_impact,
        indirect_impact,
        critical_count,
        estimated_effort: EffortBucket::from_impact_count(total),
    })
}

/// Topological order via `petgraph::algo::toposort`; absent when the graph
/// has a cycle.
pub fn topological_order(graph: &DependencyGraph) -> Option<Vec<String>> {
    match toposort(graph.inner(), None) {
        Ok(order) => Some(
            order
                .into_iter()
                .map(|i| graph.inner()[i].id.clone())
                .collect(),
        ),
        Err(_) => None,
    }
}

fn collect_warnings(
    graph: &DependencyGraph,
    cycles: &[CircularDependency],
    isolated: &[String],
) -> (Vec<String>, Vec<String>) {
    let mut warnings = Vec::new();
    let mut recommendations = Vec::new();

    if !cycles.is_empty() {
        warnings.push(format!("{} circular dependency(ies) detected", cycles.len()));
        recommendations.push(
            "Break non-informational cycles by removing or inverting one dependency per loop"
                .to_string(),
        );
    }
    if !isolated.is_empty() {
        warnings.push(format!(
            "{} isolated node(s) have no relationships to the rest of the model",
            isolated.len()
        ));
        recommendations
            .push("Connect isolated artifacts to the model or remove them".to_string());
    }
    for i in graph.inner().node_indices() {
        if graph.in_degree(i) >= 10 {
            let node = &graph.inner()[i];
            warnings.push(format!(
                "'{}' is referenced by {} artifacts",
                node.id,
                graph.in_degree(i)
            ));
            recommendations.push(format!(
                "Consider splitting '{}' to reduce its fan-in",
                node.id
            ));
        }
    }

    (warnings, recommendations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::graph::builder::EdgeKind;

    fn chain_graph() -> DependencyGraph {
        let mut graph = DependencyGraph::new();
        graph.add_node("a", "a", NodeKind::Actor);
        graph.add_node("b", "b", NodeKind::UseCase);
        graph.add_node("c", "c", NodeKind::Screen);
        graph.add_node("lonely", "lonely", NodeKind::Actor);
        graph.add_edge("a", "b", EdgeKind::Uses, false);
        graph.add_edge("b", "c", EdgeKind::Uses, false);
        graph
    }

    #[test]
    fn test_statistics() {
        let graph = chain_graph();
        let stats = compute_statistics(&graph, 0);
        assert_eq!(stats.node_count, 4);
        assert_eq!(stats.edge_count, 2);
        assert_eq!(stats.max_depth, 2);
        assert_eq!(stats.connected_components, 2);
        assert_eq!(stats.isolated_node_count, 1);
        assert_eq!(stats.nodes_by_kind["actor"], 2);
        assert_eq!(stats.edges_by_kind["USES"], 2);
    }

    #[test]
    fn test_layers_partition_every_node_once() {
        let graph = chain_graph();
        let analysis = analyze_layers(&graph);
        let total: usize = analysis.layers.iter().map(|l| l.nodes.len()).sum();
        assert_eq!(total, graph.node_count());
        assert!(analysis.violations.is_empty());
        assert_eq!(analysis.health_score, 100.0);
    }

    #[test]
    fn test_cyclic_nodes_still_partitioned() {
        let mut graph = DependencyGraph::new();
        graph.add_node("root", "root", NodeKind::Actor);
        graph.add_node("x", "x", NodeKind::UseCase);
        graph.add_node("y", "y", NodeKind::UseCase);
        graph.add_edge("root", "x", EdgeKind::Uses, false);
        graph.add_edge("x", "y", EdgeKind::DependsOn, false);
        graph.add_edge("y", "x", EdgeKind::DependsOn, false);

        let analysis = analyze_layers(&graph);
        let total: usize = analysis.layers.iter().map(|l| l.nodes.len()).sum();
        assert_eq!(total, 3);
        // root is layerable; the x/y loop lands in the final remnant layer.
        assert_eq!(analysis.layers[0].nodes, vec!["root"]);
        assert_eq!(analysis.layers.last().unwrap().nodes.len(), 2);
    }

    #[test]
    fn test_importance_buckets_and_order() {
        let mut graph = DependencyGraph::new();
        graph.add_node("hub", "hub", NodeKind::Screen);
        for i in 0..10 {
            let id = format!("uc-{}", i);
            graph.add_node(&id, &id, NodeKind::UseCase);
            graph.add_edge(&id, "hub", EdgeKind::Uses, false);
        }
        let ranked = rank_importance(&graph);
        assert_eq!(ranked[0].node_id, "hub");
        assert_eq!(ranked[0].importance, Priority::Critical);
        assert_eq!(ranked[0].page_rank, 10.0 / 11.0);
    }

    #[test]
    fn test_impact_analysis_depth_split() {
        let mut graph = DependencyGraph::new();
        graph.add_node("screen", "screen", NodeKind::Screen);
        graph.add_node("uc", "uc", NodeKind::UseCase);
        graph.add_node("actor", "actor", NodeKind::Actor);
        graph.add_edge("actor", "uc", EdgeKind::Uses, false);
        graph.add_edge("uc", "screen", EdgeKind::Uses, false);

        let impact = analyze_impact(&graph, "screen", DEFAULT_IMPACT_DEPTH).unwrap();
        assert_eq!(impact.direct_impact, vec!["uc"]);
        assert_eq!(impact.indirect_impact, vec!["actor"]);
        assert_eq!(impact.critical_count, 1);
        assert_eq!(impact.estimated_effort, EffortBucket::Small);
        assert!(analyze_impact(&graph, "unknown", DEFAULT_IMPACT_DEPTH).is_none());
    }

    #[test]
    fn test_impact_respects_max_depth() {
        let mut graph = DependencyGraph::new();
        for id in ["a", "b", "c", "d"] {
            graph.add_node(id, id, NodeKind::UseCase);
        }
        graph.add_edge("b", "a", EdgeKind::DependsOn, false);
        graph.add_edge("c", "b", EdgeKind::DependsOn, false);
        graph.add_edge("d", "c", EdgeKind::DependsOn, false);

        let impact = analyze_impact(&graph, "a", 2).unwrap();
        assert_eq!(impact.direct_impact, vec!["b"]);
        assert_eq!(impact.indirect_impact, vec!["c"]);
    }

    #[test]
    fn test_topological_order_respects_edges() {
        let graph = chain_graph();
        let order = topological_order(&graph).unwrap();
        let pos = |id: &str| order.iter().position(|n| n == id).unwrap();
        assert!(pos("a") < pos("b"));
        assert!(pos("b") < pos("c"));
    }

    #[test]
    fn test_topological_order_absent_on_cycle() {
        let mut graph = DependencyGraph::new();
        graph.add_node("x", "x", NodeKind::UseCase);
        graph.add_node("y", "y", NodeKind::UseCase);
        graph.add_edge("x", "y", EdgeKind::DependsOn, false);
        graph.add_edge("y", "x", EdgeKind::DependsOn, false);
        assert!(topological_order(&graph).is_none());
    }

    #[test]
    fn test_hub_warning() {
        let mut graph = DependencyGraph::new();
        graph.add_node("hub", "hub", NodeKind::Screen);
        for i in 0..10 {
            let id = format!("uc-{}", i);
            graph.add_node(&id, &id, NodeKind::UseCase);
            graph.add_edge(&id, "hub", EdgeKind::Uses, false);
        }
        let (warnings, recommendations) = collect_warnings(&graph, &[], &[]);
        assert!(warnings.iter().any(|w| w.contains("hub")));
        assert!(recommendations.iter().any(|r| r.contains("hub")));
    }
}
