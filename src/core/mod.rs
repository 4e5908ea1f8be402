pub mod artifacts;
pub mod collection;
pub mod config;
pub mod loader;
pub mod pipeline;
pub mod types;

pub use artifacts::{
    Actor, ActorRole, AlternativeFlow, Artifact, BusinessGoal, BusinessRequirement, BusinessRule,
    DocumentMetadata, FlowStep, Ref, RequirementCoverage, RequirementItem, Screen, ScreenAction,
    ScreenFlow, ScreenTransition, ScreenType, SecurityPolicy, TransitionTrigger, UseCase,
    UseCaseActors, ValidationRule,
};
pub use collection::{ArtifactCollection, ConsistencyIssue};
pub use config::AnalyzerConfig;
pub use loader::{CollectionLoader, LoadResult};
pub use pipeline::{AssessmentPipeline, QualityAssessmentReport};
pub use types::{
    Complexity, Dimension, EffortBucket, ElementType, Priority, Severity, SolutionComplexity,
};
