use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::analyzers::coherence::CoherenceValidator;
use crate::analyzers::flow_consistency::{FlowConsistencyResult, FlowConsistencyValidator};
use crate::analyzers::graph::{GraphAnalysisResult, GraphAnalyzer};
use crate::analyzers::maturity::{MaturityAssessor, ProjectMaturityAssessment};
use crate::analyzers::naming::{NamingConsistencyResult, NamingConsistencyValidator};
use crate::core::collection::{ArtifactCollection, ConsistencyIssue};
use crate::core::config::AnalyzerConfig;
use crate::dashboard::{
    DashboardAlert, MetricsDashboard, MetricsSnapshot, ProjectHealthScore,
};
use crate::recommendations::{
    AIAgentRecommendations, ProjectContext, RecommendationEngine, RecommendationInput,
};

/// Everything one run produces, ready for rendering or serialization.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityAssessmentReport {
    pub project_name: String,
    pub generated_at: DateTime<Utc>,
    pub maturity: ProjectMaturityAssessment,
    pub graph: GraphAnalysisResult,
    pub naming: NamingConsistencyResult,
    pub flow_consistency: FlowConsistencyResult,
    pub recommendations: AIAgentRecommendations,
    pub snapshot: MetricsSnapshot,
    pub health: ProjectHealthScore,
    pub alerts: Vec<DashboardAlert>,
    pub consistency_issues: Vec<ConsistencyIssue>,
    pub warnings: Vec<String>,
}

/// Runs the analysis stages in order over one immutable collection:
/// maturity, graph, coherence, naming, flow consistency (order-agnostic),
/// then recommendations, then the snapshot and health score.
pub struct AssessmentPipeline {
    config: AnalyzerConfig,
    dashboard: MetricsDashboard,
}

impl AssessmentPipeline {
    pub fn new() -> Self {
        Self::with_config(AnalyzerConfig::default())
    }

    pub fn with_config(config: AnalyzerConfig) -> Self {
        Self {
            dashboard: MetricsDashboard::with_config(config.clone()),
            config,
        }
    }

    pub fn dashboard(&self) -> &MetricsDashboard {
        &self.dashboard
    }

    pub fn dashboard_mut(&mut self) -> &mut MetricsDashboard {
        &mut self.dashboard
    }

    pub fn run(
        &mut self,
        project_name: impl Into<String>,
        collection: &ArtifactCollection,
        context: Option<ProjectContext>,
        warnings: Vec<String>,
    ) -> QualityAssessmentReport {
        let maturity = MaturityAssessor::new().assess_project(collection);

        let coherence_validator = CoherenceValidator::new();
        let coherence = coherence_validator.validate(collection);
        let flow_design_info = coherence_validator.flow_design_info(collection);

        let mut graph = GraphAnalyzer::new().analyze(collection);
        graph.flow_design_info = Some(flow_design_info);

        let naming = NamingConsistencyValidator::with_confusable_terms(
            self.config.confusable_terms.clone(),
        )
        .validate(collection);
        let flow_consistency = FlowConsistencyValidator::new().validate(collection);

        let recommendations = RecommendationEngine::with_config(&self.config).generate(
            &RecommendationInput {
                maturity: &maturity,
                graph: &graph,
                coherence: &coherence,
                naming: Some(&naming),
                flow: Some(&flow_consistency),
                context: context.as_ref(),
            },
        );
        graph.coherence_validation = Some(coherence);

        let snapshot =
            self.dashboard
                .take_snapshot(&maturity, &recommendations, Some(&graph), collection);
        let health = self.dashboard.health_score(&snapshot);
        let alerts = self.dashboard.alerts(&snapshot);

        QualityAssessmentReport {
            project_name: project_name.into(),
            generated_at: Utc::now(),
            maturity,
            graph,
            naming,
            flow_consistency,
            recommendations,
            snapshot,
            health,
            alerts,
            consistency_issues: collection.consistency_issues().to_vec(),
            warnings,
        }
    }
}

impl Default for AssessmentPipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::artifacts::Artifact;

    fn artifact(value: serde_json::Value) -> Artifact {
        serde_json::from_value(value).unwrap()
    }

    fn sample_collection() -> ArtifactCollection {
        ArtifactCollection::from_artifacts(vec![
            artifact(serde_json::json!({
                "type": "actor",
                "id": "actor-user",
                "name": "User",
                "role": "primary",
                "responsibilities": ["sign in", "manage data"],
                "goals": ["work efficiently"],
                "description": "An authenticated end user of the product who works with their own records on a daily basis.",
            })),
            artifact(serde_json::json!({
                "type": "usecase",
                "id": "uc-login",
                "name": "Log in",
                "description": "A registered user signs in with valid account credentials.",
                "priority": "high",
                "preconditions": ["account exists"],
                "postconditions": ["session active"],
                "actors": { "primary": { "id": "actor-user" } },
                "mainFlow": [
                    { "stepId": "enter", "actor": { "id": "actor-user" },
                      "action": "enter credentials", "expectedResult": "credentials accepted" },
                    { "stepId": "confirm", "actor": { "id": "actor-user" },
                      "action": "submit the form", "expectedResult": "session created" }
                ],
            })),
        ])
    }

    #[test]
    fn test_full_pipeline_produces_consistent_report() {
        let collection = sample_collection();
        let mut pipeline = AssessmentPipeline::new();
        let report = pipeline.run("demo", &collection, None, vec![]);

        assert_eq!(report.project_name, "demo");
        assert_eq!(report.maturity.project_level, 2);
        assert!(report.graph.coherence_validation.is_some());
        assert!(report.graph.flow_design_info.is_some());
        assert_eq!(
            report.snapshot.maturity_level,
            report.maturity.project_level
        );
        assert!(report.health.overall >= 0.0 && report.health.overall <= 100.0);
        assert_eq!(pipeline.dashboard().snapshots().len(), 1);
    }

    #[test]
    fn test_pipeline_serializes_to_json() {
        let collection = sample_collection();
        let mut pipeline = AssessmentPipeline::new();
        let report = pipeline.run("demo", &collection, None, vec![]);
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"projectName\":\"demo\""));
        assert!(json.contains("\"maturity\""));
    }

    #[test]
    fn test_repeated_runs_accumulate_history() {
        let collection = sample_collection();
        let mut pipeline = AssessmentPipeline::new();
        pipeline.run("demo", &collection, None, vec![]);
        pipeline.run("demo", &collection, None, vec![]);
        assert_eq!(pipeline.dashboard().snapshots().len(), 2);
        let trend = pipeline.dashboard().trend("maturityLevel").unwrap();
        assert_eq!(trend.values, vec![2.0, 2.0]);
    }
}
