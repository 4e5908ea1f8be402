pub mod strategies;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::analyzers::coherence::CoherenceValidationResult;
use crate::analyzers::flow_consistency::FlowConsistencyResult;
use crate::analyzers::graph::GraphAnalysisResult;
use crate::analyzers::maturity::ProjectMaturityAssessment;
use crate::analyzers::naming::NamingConsistencyResult;
use crate::core::config::AnalyzerConfig;
use crate::core::types::{Dimension, Priority, Severity, SolutionComplexity};

pub use strategies::{
    CoherenceStrategy, ContextStrategy, GraphStrategy, MaturityGapStrategy,
    RecommendationStrategy,
};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationCategory {
    Structure,
    Detail,
    Traceability,
    Testability,
    Maintainability,
    Architecture,
    Quality,
}

impl From<Dimension> for RecommendationCategory {
    fn from(dimension: Dimension) -> Self {
        match dimension {
            Dimension::Structure => RecommendationCategory::Structure,
            Dimension::Detail => RecommendationCategory::Detail,
            Dimension::Traceability => RecommendationCategory::Traceability,
            Dimension::Testability => RecommendationCategory::Testability,
            Dimension::Maintainability => RecommendationCategory::Maintainability,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ImpactScope {
    Element,
    Module,
    Project,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationImpact {
    pub scope: ImpactScope,
    pub affected_elements: Vec<String>,
    pub severity: Severity,
}

/// A concrete, machine-actionable step inside a solution.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutableAction {
    pub action: String,
    pub target: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationSolution {
    pub description: String,
    pub steps: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub executables: Vec<ExecutableAction>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationEffort {
    pub hours: f64,
    pub complexity: SolutionComplexity,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationRationale {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maturity_gap: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dependency_issue: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_practice: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub id: String,
    pub title: String,
    pub priority: Priority,
    pub category: RecommendationCategory,
    pub problem: String,
    pub impact: RecommendationImpact,
    pub solution: RecommendationSolution,
    pub benefits: Vec<String>,
    pub effort: RecommendationEffort,
    pub rationale: RecommendationRationale,
}

// ---------------------------------------------------------------------------
// Project context
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectDomain {
    Finance,
    Healthcare,
    Ecommerce,
    General,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectStage {
    Poc,
    Mvp,
    ActiveDevelopment,
    Production,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum TeamSize {
    Solo,
    Small,
    Medium,
    Large,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Criticality {
    Experimental,
    Medium,
    MissionCritical,
}

/// Optional project profile that tunes which recommendations matter.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectContext {
    pub domain: ProjectDomain,
    pub stage: ProjectStage,
    pub team_size: TeamSize,
    pub criticality: Criticality,
}

// ---------------------------------------------------------------------------
// Engine input and output
// ---------------------------------------------------------------------------

/// Everything the strategies read. All references; strategies are pure.
pub struct RecommendationInput<'a> {
    pub maturity: &'a ProjectMaturityAssessment,
    pub graph: &'a GraphAnalysisResult,
    pub coherence: &'a CoherenceValidationResult,
    pub naming: Option<&'a NamingConsistencyResult>,
    pub flow: Option<&'a FlowConsistencyResult>,
    pub context: Option<&'a ProjectContext>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickWin {
    pub title: String,
    pub unit_hours: f64,
    pub count: usize,
    pub total_hours: f64,
    pub display: String,
    pub recommendation_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationBundle {
    pub id: String,
    pub name: String,
    pub recommendation_ids: Vec<String>,
    pub execution_order: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationSummary {
    pub total: usize,
    pub critical: usize,
    pub high: usize,
    pub estimated_total_hours: f64,
    pub expected_maturity_increase: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AIAgentRecommendations {
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<ProjectContext>,
    pub recommendations: Vec<Recommendation>,
    pub top_priority: Vec<Recommendation>,
    pub bundles: Vec<RecommendationBundle>,
    pub quick_wins: Vec<QuickWin>,
    pub long_term_strategy: Vec<String>,
    pub summary: RecommendationSummary,
}

fn short_hash(namespace: &str, seed: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(namespace.as_bytes());
    hasher.update(b":");
    hasher.update(seed.as_bytes());
    let digest = hasher.finalize();
    digest.iter().take(4).map(|b| format!("{:02x}", b)).collect()
}

/// Stable recommendation id: strategy name plus an 8-hex digest of the seed.
/// Identical inputs always hash to identical ids.
pub fn recommendation_id(strategy: &str, seed: &str) -> String {
    format!("rec-{}-{}", strategy, short_hash(strategy, seed))
}

/// Runs the strategies in fixed order and assembles the prioritized output.
pub struct RecommendationEngine {
    strategies: Vec<Box<dyn RecommendationStrategy>>,
    top_priority_count: usize,
    quick_win_max_hours: f64,
}

impl RecommendationEngine {
    pub fn new() -> Self {
        Self::with_config(&AnalyzerConfig::default())
    }

    pub fn with_config(config: &AnalyzerConfig) -> Self {
        Self {
            strategies: vec![
                Box::new(MaturityGapStrategy),
                Box::new(ContextStrategy),
                Box::new(GraphStrategy),
                Box::new(CoherenceStrategy),
            ],
            top_priority_count: config.top_priority_count,
            quick_win_max_hours: config.quick_win_max_hours,
        }
    }

    pub fn generate(&self, input: &RecommendationInput<'_>) -> AIAgentRecommendations {
        let mut recommendations = Vec::new();
        for strategy in &self.strategies {
            recommendations.extend(strategy.generate(input));
        }

        // PoC-stage projects do not need low-priority polish on detail.
        if input.context.map(|c| c.stage) == Some(ProjectStage::Poc) {
            recommendations.retain(|r| {
                !(r.priority == Priority::Low
                    && r.category == RecommendationCategory::Detail)
            });
        }

        let top_priority = self.top_priority(&recommendations);
        let quick_wins = self.quick_wins(&recommendations);
        let bundles = self.bundles(&recommendations, input);
        let summary = self.summarize(&recommendations, input);
        let long_term_strategy = self.long_term_strategy(input);

        AIAgentRecommendations {
            timestamp: Utc::now(),
            context: input.context.copied(),
            recommendations,
            top_priority,
            bundles,
            quick_wins,
            long_term_strategy,
            summary,
        }
    }

    /// Top N by priority, then return on invested hour, then id.
    fn top_priority(&self, recommendations: &[Recommendation]) -> Vec<Recommendation> {
        let max_benefits = recommendations
            .iter()
            .map(|r| r.benefits.len())
            .max()
            .unwrap_or(1)
            .max(1) as f64;
        let roi = |r: &Recommendation| {
            let benefit = r.benefits.len() as f64 / max_benefits;
            if r.effort.hours <= 0.0 {
                benefit
            } else {
                benefit / r.effort.hours
            }
        };

        let mut sorted: Vec<Recommendation> = recommendations.to_vec();
        sorted.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then_with(|| {
                    roi(b).partial_cmp(&roi(a)).unwrap_or(std::cmp::Ordering::Equal)
                })
                .then_with(|| a.id.cmp(&b.id))
        });
        sorted.truncate(self.top_priority_count);
        sorted
    }

    /// Cheap simple items, deduplicated by title, cheapest first. Repeated
    /// titles fold into one entry with a combined display.
    fn quick_wins(&self, recommendations: &[Recommendation]) -> Vec<QuickWin> {
        let mut grouped: Vec<QuickWin> = Vec::new();
        for rec in recommendations {
            if rec.effort.hours > self.quick_win_max_hours
                || rec.effort.complexity != SolutionComplexity::Simple
            {
                continue;
            }
            if let Some(existing) = grouped.iter_mut().find(|w| w.title == rec.title) {
                existing.count += 1;
                existing.total_hours += rec.effort.hours;
                existing.recommendation_ids.push(rec.id.clone());
            } else {
                grouped.push(QuickWin {
                    title: rec.title.clone(),
                    unit_hours: rec.effort.hours,
                    count: 1,
                    total_hours: rec.effort.hours,
                    display: String::new(),
                    recommendation_ids: vec![rec.id.clone()],
                });
            }
        }
        for win in &mut grouped {
            win.display = if win.count > 1 {
                format!(
                    "{}h × {}件 = {}h",
                    format_hours(win.unit_hours),
                    win.count,
                    format_hours(win.total_hours)
                )
            } else {
                format!("{}h", format_hours(win.unit_hours))
            };
        }
        grouped.sort_by(|a, b| {
            a.unit_hours
                .partial_cmp(&b.unit_hours)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.title.cmp(&b.title))
        });
        grouped
    }

    /// Bundles share a target artifact; execution order follows the graph's
    /// topological order where one exists, then recommendation id.
    fn bundles(
        &self,
        recommendations: &[Recommendation],
        input: &RecommendationInput<'_>,
    ) -> Vec<RecommendationBundle> {
        let topo_position: BTreeMap<&str, usize> = input
            .graph
            .topological_order
            .as_deref()
            .map(|order| {
                order
                    .iter()
                    .enumerate()
                    .map(|(i, id)| (id.as_str(), i))
                    .collect()
            })
            .unwrap_or_default();

        let mut by_target: BTreeMap<String, Vec<&Recommendation>> = BTreeMap::new();
        for rec in recommendations {
            if let Some(target) = rec.impact.affected_elements.first() {
                by_target.entry(target.clone()).or_default().push(rec);
            }
        }

        by_target
            .into_iter()
            .filter(|(_, recs)| recs.len() >= 2)
            .map(|(target, recs)| {
                let mut ordered: Vec<&Recommendation> = recs.clone();
                ordered.sort_by(|a, b| {
                    let pos = |r: &Recommendation| {
                        r.impact
                            .affected_elements
                            .first()
                            .and_then(|e| topo_position.get(e.as_str()).copied())
                            .unwrap_or(usize::MAX)
                    };
                    pos(a).cmp(&pos(b)).then_with(|| a.id.cmp(&b.id))
                });
                RecommendationBundle {
                    id: format!("bundle-{}", short_hash("bundle", &target)),
                    name: format!("Improvements for '{}'", target),
                    recommendation_ids: recs.iter().map(|r| r.id.clone()).collect(),
                    execution_order: ordered.iter().map(|r| r.id.clone()).collect(),
                }
            })
            .collect()
    }

    fn summarize(
        &self,
        recommendations: &[Recommendation],
        input: &RecommendationInput<'_>,
    ) -> RecommendationSummary {
        let next_level = input.maturity.project_level + 1;
        let mut closure_weight = 0.0;
        for element in input.maturity.elements.iter() {
            closure_weight += element
                .criteria
                .iter()
                .filter(|c| c.level == next_level && c.required && !c.satisfied)
                .map(|c| c.weight)
                .sum::<f64>();
        }

        RecommendationSummary {
            total: recommendations.len(),
            critical: recommendations
                .iter()
                .filter(|r| r.priority == Priority::Critical)
                .count(),
            high: recommendations
                .iter()
                .filter(|r| r.priority == Priority::High)
                .count(),
            estimated_total_hours: recommendations.iter().map(|r| r.effort.hours).sum(),
            expected_maturity_increase: closure_weight.min(5.0),
        }
    }

    fn long_term_strategy(&self, input: &RecommendationInput<'_>) -> Vec<String> {
        let mut phases = Vec::new();
        let level = input.maturity.project_level;
        if level < 5 {
            phases.push(format!(
                "Phase 1: close every required criterion at level {} to lift the project from level {}",
                level + 1,
                level
            ));
        }
        if let Some(weakest) = input
            .maturity
            .overall_dimensions
            .iter()
            .min_by(|a, b| {
                a.completion_rate
                    .partial_cmp(&b.completion_rate)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
        {
            phases.push(format!(
                "Phase 2: raise the {} dimension above 80% completion",
                weakest.dimension
            ));
        }
        if input.graph.problematic_cycle_count() > 0 || !input.graph.isolated_nodes.is_empty() {
            phases.push(
                "Phase 3: clean up the dependency structure (cycles and isolated artifacts)"
                    .to_string(),
            );
        }
        phases.push("Ongoing: re-run the assessment after each batch of edits and track the health trend".to_string());
        phases
    }
}

impl Default for RecommendationEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn format_hours(hours: f64) -> String {
    if hours.fract() == 0.0 {
        format!("{}", hours as i64)
    } else {
        format!("{:.1}", hours)
    }
}
