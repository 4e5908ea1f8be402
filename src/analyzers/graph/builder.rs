use std::collections::{HashMap, HashSet};

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};

use crate::core::collection::{ArtifactCollection, sub_item_id};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum NodeKind {
    BusinessRequirement,
    BusinessGoal,
    BusinessRule,
    SecurityPolicy,
    Actor,
    UseCase,
    Screen,
    ScreenFlow,
}

impl NodeKind {
    pub fn key(&self) -> &'static str {
        match self {
            NodeKind::BusinessRequirement => "business-requirement",
            NodeKind::BusinessGoal => "business-goal",
            NodeKind::BusinessRule => "business-rule",
            NodeKind::SecurityPolicy => "security-policy",
            NodeKind::Actor => "actor",
            NodeKind::UseCase => "usecase",
            NodeKind::Screen => "screen",
            NodeKind::ScreenFlow => "screen-flow",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EdgeKind {
    Uses,
    Contains,
    References,
    Extends,
    Includes,
    DependsOn,
    Implements,
    Triggers,
}

impl EdgeKind {
    pub fn key(&self) -> &'static str {
        match self {
            EdgeKind::Uses => "USES",
            EdgeKind::Contains => "CONTAINS",
            EdgeKind::References => "REFERENCES",
            EdgeKind::Extends => "EXTENDS",
            EdgeKind::Includes => "INCLUDES",
            EdgeKind::DependsOn => "DEPENDS_ON",
            EdgeKind::Implements => "IMPLEMENTS",
            EdgeKind::Triggers => "TRIGGERS",
        }
    }
}

/// Node weight: the artifact (or sub-item) behind the graph node.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    pub id: String,
    pub name: String,
    pub kind: NodeKind,
}

/// Edge weight. Edges that are expected to close loops (screen transitions)
/// do not escalate cycle severity above info.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphEdge {
    pub kind: EdgeKind,
    pub bidirectional_allowed: bool,
}

/// Flattened edge for result records.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphEdgeRecord {
    pub from: String,
    pub to: String,
    pub kind: EdgeKind,
    pub bidirectional_allowed: bool,
}

/// Heterogeneous directed graph over artifacts and their sub-items: a
/// `petgraph` `DiGraph` plus an id side-table, because artifacts reference
/// each other by string id and screen transitions make the graph genuinely
/// cyclic.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    graph: DiGraph<GraphNode, GraphEdge>,
    node_map: HashMap<String, NodeIndex>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            node_map: HashMap::new(),
        }
    }

    pub fn inner(&self) -> &DiGraph<GraphNode, GraphEdge> {
        &self.graph
    }

    pub fn add_node(&mut self, id: impl Into<String>, name: impl Into<String>, kind: NodeKind) {
        let id = id.into();
        if self.node_map.contains_key(&id) {
            return;
        }
        let index = self.graph.add_node(GraphNode {
            id: id.clone(),
            name: name.into(),
            kind,
        });
        self.node_map.insert(id, index);
    }

    /// Adds an edge when both endpoints exist; dangling references are the
    /// coherence validator's concern, not the graph's.
    pub fn add_edge(&mut self, from: &str, to: &str, kind: EdgeKind, bidirectional_allowed: bool) {
        let (Some(&from_idx), Some(&to_idx)) = (self.node_map.get(from), self.node_map.get(to))
        else {
            return;
        };
        self.graph.add_edge(
            from_idx,
            to_idx,
            GraphEdge {
                kind,
                bidirectional_allowed,
            },
        );
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn node_index(&self, id: &str) -> Option<NodeIndex> {
        self.node_map.get(id).copied()
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.node_index(id).map(|i| &self.graph[i])
    }

    pub fn out_degree(&self, index: NodeIndex) -> usize {
        self.graph.edges_directed(index, Direction::Outgoing).count()
    }

    pub fn in_degree(&self, index: NodeIndex) -> usize {
        self.graph.edges_directed(index, Direction::Incoming).count()
    }

    /// First edge recorded between the two nodes, if any.
    pub fn edge_between(&self, from: NodeIndex, to: NodeIndex) -> Option<&GraphEdge> {
        self.graph.find_edge(from, to).map(|e| &self.graph[e])
    }

    pub fn is_isolated(&self, index: NodeIndex) -> bool {
        self.in_degree(index) == 0 && self.out_degree(index) == 0
    }

    /// Snapshot of nodes and edges for result records.
    pub fn export(&self) -> GraphExport {
        GraphExport {
            nodes: self.graph.node_weights().cloned().collect(),
            edges: self
                .graph
                .edge_references()
                .map(|edge| GraphEdgeRecord {
                    from: self.graph[edge.source()].id.clone(),
                    to: self.graph[edge.target()].id.clone(),
                    kind: edge.weight().kind,
                    bidirectional_allowed: edge.weight().bidirectional_allowed,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphExport {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdgeRecord>,
}

/// Builds the dependency graph from an artifact collection following the
/// construction rules of the analyzer.
pub fn build_graph(collection: &ArtifactCollection) -> DependencyGraph {
    let mut graph = DependencyGraph::new();

    for req in collection.business_requirements() {
        let display = if req.title.is_empty() { &req.name } else { &req.title };
        graph.add_node(&req.id, display.clone(), NodeKind::BusinessRequirement);
        for (index, goal) in req.business_goals.iter().enumerate() {
            let id = sub_item_id(&goal.id, &req.id, "goal", index);
            graph.add_node(&id, goal.description.clone(), NodeKind::BusinessGoal);
            graph.add_edge(&req.id, &id, EdgeKind::Contains, false);
        }
        for (index, rule) in req.business_rules.iter().enumerate() {
            let id = sub_item_id(&rule.id, &req.id, "rule", index);
            graph.add_node(&id, rule.description.clone(), NodeKind::BusinessRule);
            graph.add_edge(&req.id, &id, EdgeKind::Contains, false);
        }
        for (index, policy) in req.security_policies.iter().enumerate() {
            let id = sub_item_id(&policy.id, &req.id, "policy", index);
            graph.add_node(&id, policy.description.clone(), NodeKind::SecurityPolicy);
            graph.add_edge(&req.id, &id, EdgeKind::Contains, false);
        }
    }

    for actor in collection.actors() {
        graph.add_node(&actor.id, actor.name.clone(), NodeKind::Actor);
    }

    for screen in collection.screens() {
        graph.add_node(&screen.id, screen.name.clone(), NodeKind::Screen);
    }

    for uc in collection.use_cases() {
        graph.add_node(&uc.id, uc.name.clone(), NodeKind::UseCase);
    }

    for uc in collection.use_cases() {
        if let Some(primary) = &uc.actors.primary {
            graph.add_edge(&primary.id, &uc.id, EdgeKind::Uses, false);
        }
        for secondary in &uc.actors.secondary {
            graph.add_edge(&secondary.id, &uc.id, EdgeKind::Uses, false);
        }
        if let Some(coverage) = &uc.business_requirement_coverage {
            graph.add_edge(&uc.id, &coverage.requirement.id, EdgeKind::Implements, false);
            for goal in &coverage.business_goals {
                graph.add_edge(&uc.id, &goal.id, EdgeKind::Implements, false);
            }
        }
        for rule in &uc.business_rules {
            graph.add_edge(&uc.id, &rule.id, EdgeKind::DependsOn, false);
        }
        for policy in &uc.security_policies {
            graph.add_edge(&uc.id, &policy.id, EdgeKind::DependsOn, false);
        }
        let mut seen_screens = HashSet::new();
        for step in &uc.main_flow {
            if let Some(screen) = &step.screen {
                if seen_screens.insert(screen.id.clone()) {
                    graph.add_edge(&uc.id, &screen.id, EdgeKind::Uses, false);
                }
            }
        }
    }

    for flow in collection.screen_flows() {
        graph.add_node(&flow.id, flow.name.clone(), NodeKind::ScreenFlow);
        for screen_id in flow.screens() {
            graph.add_edge(&flow.id, &screen_id, EdgeKind::Contains, false);
        }
        for transition in &flow.transitions {
            graph.add_edge(&transition.from.id, &transition.to.id, EdgeKind::Triggers, true);
        }
        graph.add_edge(&flow.related_use_case.id, &flow.id, EdgeKind::Uses, false);
    }

    graph
}
