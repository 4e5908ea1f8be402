pub mod analysis;
pub mod builder;
pub mod cycles;

pub use analysis::{
    DEFAULT_IMPACT_DEPTH, GraphAnalysisResult, GraphAnalyzer, GraphLayer, GraphStatistics,
    ImpactAnalysis, LayerAnalysis, LayerViolation, NodeImportance, analyze_impact,
    analyze_layers, rank_importance, topological_order,
};
pub use builder::{
    DependencyGraph, EdgeKind, GraphEdge, GraphEdgeRecord, GraphExport, GraphNode, NodeKind,
    build_graph,
};
pub use cycles::{CircularDependency, detect_cycles};
