pub mod coherence;
pub mod flow_consistency;
pub mod graph;
pub mod maturity;
pub mod naming;

pub use coherence::{
    CoherenceIssue, CoherenceIssueKind, CoherenceValidationResult, CoherenceValidator,
    FlowDesignLevel, FlowDesignNote,
};
pub use flow_consistency::{FlowConsistencyResult, FlowConsistencyValidator, FlowMismatch};
pub use graph::{
    CircularDependency, DependencyGraph, GraphAnalysisResult, GraphAnalyzer, ImpactAnalysis,
    LayerAnalysis, NodeImportance,
};
pub use maturity::{
    ElementAssessment, MaturityAssessor, ProjectMaturityAssessment,
};
pub use naming::{NamingConsistencyResult, NamingConsistencyValidator, NamingStyle, to_kebab_case};
