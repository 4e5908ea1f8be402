use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analyzers::graph::GraphAnalysisResult;
use crate::analyzers::maturity::ProjectMaturityAssessment;
use crate::core::collection::ArtifactCollection;
use crate::core::config::AnalyzerConfig;
use crate::core::types::{Dimension, Severity};
use crate::recommendations::AIAgentRecommendations;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationCounts {
    pub total: usize,
    pub critical: usize,
    pub high: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphStatsSummary {
    pub node_count: usize,
    pub edge_count: usize,
    /// Problematic (non-info) cycles; design-permitted loops are tracked in
    /// the severity map but do not degrade health.
    pub circular_dependencies: usize,
    pub isolated_nodes: usize,
    pub circular_dependencies_by_severity: BTreeMap<Severity, usize>,
    pub coherence_issues: usize,
}

/// Numeric projection of one assessment run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub maturity_level: u8,
    pub dimension_rates: BTreeMap<String, f64>,
    pub element_counts: BTreeMap<String, usize>,
    pub overall_completion_rate: f64,
    pub unsatisfied_criteria: usize,
    pub recommendation_counts: RecommendationCounts,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graph_stats: Option<GraphStatsSummary>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthLevel {
    Excellent,
    Good,
    Fair,
    Poor,
    Critical,
}

impl std::fmt::Display for HealthLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthLevel::Excellent => write!(f, "excellent"),
            HealthLevel::Good => write!(f, "good"),
            HealthLevel::Fair => write!(f, "fair"),
            HealthLevel::Poor => write!(f, "poor"),
            HealthLevel::Critical => write!(f, "critical"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryScores {
    pub maturity: f64,
    pub completeness: f64,
    pub consistency: f64,
    pub traceability: f64,
    pub architecture: f64,
}

impl CategoryScores {
    pub fn named(&self) -> [(&'static str, f64); 5] {
        [
            ("maturity", self.maturity),
            ("completeness", self.completeness),
            ("consistency", self.consistency),
            ("traceability", self.traceability),
            ("architecture", self.architecture),
        ]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectHealthScore {
    pub overall: f64,
    pub level: HealthLevel,
    pub categories: CategoryScores,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub assessment: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Improving,
    Declining,
    Stable,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendAnalysis {
    pub metric: String,
    pub values: Vec<f64>,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    pub change_rate: f64,
    pub trend: TrendDirection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricComparison {
    pub metric: String,
    pub before: f64,
    pub after: f64,
    pub change: f64,
    pub improved: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotComparison {
    pub from_id: String,
    pub to_id: String,
    pub duration_ms: i64,
    pub duration_display: String,
    pub metrics: Vec<MetricComparison>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    Warning,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardAlert {
    pub level: AlertLevel,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    pub id: String,
    pub kind: String,
    pub description: String,
    pub achieved_at: DateTime<Utc>,
    pub snapshot_id: String,
}

/// Owns the append-only snapshot history of one analysis session. This is
/// the only mutable state in the system; everything else is a pure function
/// of the collection.
pub struct MetricsDashboard {
    config: AnalyzerConfig,
    snapshots: Vec<MetricsSnapshot>,
    milestones: Vec<Milestone>,
    sequence: u64,
}

impl MetricsDashboard {
    pub fn new() -> Self {
        Self::with_config(AnalyzerConfig::default())
    }

    pub fn with_config(config: AnalyzerConfig) -> Self {
        Self {
            config,
            snapshots: Vec::new(),
            milestones: Vec::new(),
            sequence: 0,
        }
    }

    pub fn snapshots(&self) -> &[MetricsSnapshot] {
        &self.snapshots
    }

    pub fn milestones(&self) -> &[Milestone] {
        &self.milestones
    }

    pub fn snapshot(&self, id: &str) -> Option<&MetricsSnapshot> {
        self.snapshots.iter().find(|s| s.id == id)
    }

    /// Projects one run into a snapshot, appends it, evicts FIFO beyond the
    /// retention limit, and records first-achievement milestones.
    pub fn take_snapshot(
        &mut self,
        maturity: &ProjectMaturityAssessment,
        recommendations: &AIAgentRecommendations,
        graph: Option<&GraphAnalysisResult>,
        collection: &ArtifactCollection,
    ) -> MetricsSnapshot {
        let timestamp = Utc::now();
        self.sequence += 1;
        let id = format!("snapshot-{}-{:04}", timestamp.timestamp_millis(), self.sequence);

        let dimension_rates: BTreeMap<String, f64> = maturity
            .overall_dimensions
            .iter()
            .map(|d| (d.dimension.key().to_string(), d.completion_rate))
            .collect();

        let graph_stats = graph.map(|g| GraphStatsSummary {
            node_count: g.statistics.node_count,
            edge_count: g.statistics.edge_count,
            circular_dependencies: g.problematic_cycle_count(),
            isolated_nodes: g.isolated_nodes.len(),
            circular_dependencies_by_severity: g.cycles_by_severity(),
            coherence_issues: g
                .coherence_validation
                .as_ref()
                .map(|c| c.total_issues)
                .unwrap_or(0),
        });

        let snapshot = MetricsSnapshot {
            id: id.clone(),
            timestamp,
            maturity_level: maturity.project_level,
            dimension_rates,
            element_counts: collection.element_counts(),
            overall_completion_rate: maturity.overall_completion_rate(),
            unsatisfied_criteria: maturity.unsatisfied_criteria_count(),
            recommendation_counts: RecommendationCounts {
                total: recommendations.summary.total,
                critical: recommendations.summary.critical,
                high: recommendations.summary.high,
            },
            graph_stats,
        };

        self.record_milestones(&snapshot);
        self.snapshots.push(snapshot.clone());
        while self.snapshots.len() > self.config.max_snapshots {
            self.snapshots.remove(0);
        }
        snapshot
    }

    fn record_milestones(&mut self, snapshot: &MetricsSnapshot) {
        for level in 2..=snapshot.maturity_level {
            let kind = format!("maturity-level-{}", level);
            if !self.milestones.iter().any(|m| m.kind == kind) {
                self.milestones.push(Milestone {
                    id: format!("milestone-{}", kind),
                    kind,
                    description: format!("Project reached maturity level {}", level),
                    achieved_at: snapshot.timestamp,
                    snapshot_id: snapshot.id.clone(),
                });
            }
        }
        if snapshot.overall_completion_rate >= 0.8 {
            let kind = "completion-rate-80".to_string();
            if !self.milestones.iter().any(|m| m.kind == kind) {
                self.milestones.push(Milestone {
                    id: format!("milestone-{}", kind),
                    kind,
                    description: "Overall completion rate reached 80%".to_string(),
                    achieved_at: snapshot.timestamp,
                    snapshot_id: snapshot.id.clone(),
                });
            }
        }
    }

    pub fn record_custom_milestone(
        &mut self,
        kind: impl Into<String>,
        description: impl Into<String>,
    ) {
        let kind = kind.into();
        if self.milestones.iter().any(|m| m.kind == kind) {
            return;
        }
        let snapshot_id = self
            .snapshots
            .last()
            .map(|s| s.id.clone())
            .unwrap_or_default();
        self.milestones.push(Milestone {
            id: format!("milestone-{}", kind),
            kind: kind.clone(),
            description: description.into(),
            achieved_at: Utc::now(),
            snapshot_id,
        });
    }

    pub fn health_score(&self, snapshot: &MetricsSnapshot) -> ProjectHealthScore {
        compute_health_score(snapshot, &self.config)
    }

    pub fn trend(&self, metric: &str) -> Option<TrendAnalysis> {
        analyze_trend(&self.snapshots, metric)
    }

    pub fn compare(&self, from_id: &str, to_id: &str) -> Option<SnapshotComparison> {
        let from = self.snapshot(from_id)?;
        let to = self.snapshot(to_id)?;
        Some(compare_snapshots(from, to))
    }

    pub fn alerts(&self, snapshot: &MetricsSnapshot) -> Vec<DashboardAlert> {
        alerts_for(snapshot)
    }
}

impl Default for MetricsDashboard {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Pure scoring, trend, and comparison functions
// ---------------------------------------------------------------------------

/// Weighted 0-100 health projection. Category scores round to integers first;
/// the overall rounds after weighting.
pub fn compute_health_score(
    snapshot: &MetricsSnapshot,
    config: &AnalyzerConfig,
) -> ProjectHealthScore {
    let maturity = (snapshot.maturity_level as f64 / 5.0 * 100.0).round();
    let completeness = (snapshot.overall_completion_rate * 100.0).round();

    let rates: Vec<f64> = snapshot.dimension_rates.values().copied().collect();
    let consistency = (100.0 - variance(&rates) * 200.0).clamp(0.0, 100.0).round();

    let traceability = (snapshot
        .dimension_rates
        .get(Dimension::Traceability.key())
        .copied()
        .unwrap_or(0.0)
        * 100.0)
        .round();

    let architecture = match &snapshot.graph_stats {
        Some(stats) => (100.0
            - 10.0 * stats.circular_dependencies as f64
            - 5.0 * stats.isolated_nodes as f64)
            .clamp(0.0, 100.0),
        None => 100.0,
    };

    let weights = &config.health_weights;
    let overall = (weights.maturity * maturity
        + weights.completeness * completeness
        + weights.consistency * consistency
        + weights.traceability * traceability
        + weights.architecture * architecture)
        .round();

    let thresholds = &config.health_thresholds;
    let level = if overall >= thresholds.excellent {
        HealthLevel::Excellent
    } else if overall >= thresholds.good {
        HealthLevel::Good
    } else if overall >= thresholds.fair {
        HealthLevel::Fair
    } else if overall >= thresholds.poor {
        HealthLevel::Poor
    } else {
        HealthLevel::Critical
    };

    let categories = CategoryScores {
        maturity,
        completeness,
        consistency,
        traceability,
        architecture,
    };
    let strengths: Vec<String> = categories
        .named()
        .iter()
        .filter(|(_, v)| *v >= 80.0)
        .map(|(n, _)| n.to_string())
        .collect();
    let weaknesses: Vec<String> = categories
        .named()
        .iter()
        .filter(|(_, v)| *v < 60.0)
        .map(|(n, _)| n.to_string())
        .collect();

    let assessment = build_assessment(level, &categories);

    ProjectHealthScore {
        overall,
        level,
        categories,
        strengths,
        weaknesses,
        assessment,
    }
}

fn build_assessment(level: HealthLevel, categories: &CategoryScores) -> String {
    let base = match level {
        HealthLevel::Excellent => "The repository is in excellent shape; keep the cadence.",
        HealthLevel::Good => "The repository is healthy with room for targeted improvement.",
        HealthLevel::Fair => "The repository is serviceable but needs systematic work.",
        HealthLevel::Poor => "The repository has substantial gaps that slow every change.",
        HealthLevel::Critical => "The repository needs immediate structural attention.",
    };
    let lowest = categories
        .named()
        .iter()
        .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(n, v)| (n.to_string(), *v));
    match lowest {
        Some((name, value)) if value < 60.0 => {
            format!("{} Weakest category: {} ({:.0}).", base, name, value)
        }
        _ => base.to_string(),
    }
}

fn variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64
}

/// Named metric accessor over a snapshot; unknown names yield None.
pub fn metric_value(snapshot: &MetricsSnapshot, metric: &str) -> Option<f64> {
    match metric {
        "maturityLevel" => Some(snapshot.maturity_level as f64),
        "completionRate" => Some(snapshot.overall_completion_rate),
        "unsatisfiedCriteria" => Some(snapshot.unsatisfied_criteria as f64),
        "recommendationCount.total" => Some(snapshot.recommendation_counts.total as f64),
        "recommendationCount.critical" => Some(snapshot.recommendation_counts.critical as f64),
        "recommendationCount.high" => Some(snapshot.recommendation_counts.high as f64),
        "nodeCount" => snapshot.graph_stats.as_ref().map(|g| g.node_count as f64),
        "edgeCount" => snapshot.graph_stats.as_ref().map(|g| g.edge_count as f64),
        "circularDependencies" => snapshot
            .graph_stats
            .as_ref()
            .map(|g| g.circular_dependencies as f64),
        "isolatedNodes" => snapshot.graph_stats.as_ref().map(|g| g.isolated_nodes as f64),
        "coherenceIssues" => snapshot
            .graph_stats
            .as_ref()
            .map(|g| g.coherence_issues as f64),
        _ => metric
            .strip_prefix("dimension.")
            .and_then(|key| snapshot.dimension_rates.get(key).copied()),
    }
}

/// Metrics where a decrease is the improvement.
fn lower_is_better(metric: &str) -> bool {
    matches!(
        metric,
        "unsatisfiedCriteria"
            | "recommendationCount.total"
            | "recommendationCount.critical"
            | "recommendationCount.high"
            | "circularDependencies"
            | "isolatedNodes"
            | "coherenceIssues"
    )
}

/// Min/max/mean/median plus a ±5% change band over the snapshot history.
pub fn analyze_trend(snapshots: &[MetricsSnapshot], metric: &str) -> Option<TrendAnalysis> {
    let values: Vec<f64> = snapshots
        .iter()
        .filter_map(|s| metric_value(s, metric))
        .collect();
    if values.is_empty() {
        return None;
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let mut sorted = values.clone();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let median = if sorted.len() % 2 == 1 {
        sorted[sorted.len() / 2]
    } else {
        (sorted[sorted.len() / 2 - 1] + sorted[sorted.len() / 2]) / 2.0
    };

    let first = values[0];
    let last = values[values.len() - 1];
    let change_rate = if first == 0.0 {
        if last == 0.0 { 0.0 } else { 100.0 }
    } else {
        (last - first) / first * 100.0
    };
    let trend = if change_rate >= 5.0 {
        TrendDirection::Improving
    } else if change_rate <= -5.0 {
        TrendDirection::Declining
    } else {
        TrendDirection::Stable
    };

    Some(TrendAnalysis {
        metric: metric.to_string(),
        values,
        min,
        max,
        mean,
        median,
        change_rate,
        trend,
    })
}

const COMPARED_METRICS: [&str; 8] = [
    "maturityLevel",
    "completionRate",
    "unsatisfiedCriteria",
    "recommendationCount.total",
    "recommendationCount.critical",
    "recommendationCount.high",
    "circularDependencies",
    "isolatedNodes",
];

pub fn compare_snapshots(from: &MetricsSnapshot, to: &MetricsSnapshot) -> SnapshotComparison {
    let duration = to.timestamp - from.timestamp;
    let days = duration.num_days();
    let hours = duration.num_hours() - days * 24;

    let metrics = COMPARED_METRICS
        .iter()
        .filter_map(|&metric| {
            let before = metric_value(from, metric)?;
            let after = metric_value(to, metric)?;
            let change = after - before;
            let improved = if lower_is_better(metric) {
                change < 0.0
            } else {
                change > 0.0
            };
            Some(MetricComparison {
                metric: metric.to_string(),
                before,
                after,
                change,
                improved,
            })
        })
        .collect();

    SnapshotComparison {
        from_id: from.id.clone(),
        to_id: to.id.clone(),
        duration_ms: duration.num_milliseconds(),
        duration_display: format!("{} days, {} hours", days, hours),
        metrics,
    }
}

pub fn alerts_for(snapshot: &MetricsSnapshot) -> Vec<DashboardAlert> {
    let mut alerts = Vec::new();
    if snapshot.maturity_level <= 2 {
        alerts.push(DashboardAlert {
            level: AlertLevel::Warning,
            message: format!(
                "maturity level is {}; the model is not yet repeatable across the team",
                snapshot.maturity_level
            ),
        });
    }
    if snapshot.overall_completion_rate < 0.5 {
        alerts.push(DashboardAlert {
            level: AlertLevel::Error,
            message: format!(
                "overall completion rate is {:.0}%; more than half of the quality criteria fail",
                snapshot.overall_completion_rate * 100.0
            ),
        });
    }
    if let Some(stats) = &snapshot.graph_stats {
        if stats.circular_dependencies > 0 {
            alerts.push(DashboardAlert {
                level: AlertLevel::Error,
                message: format!(
                    "{} circular dependency(ies) in the artifact graph",
                    stats.circular_dependencies
                ),
            });
        }
    }
    alerts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot_with(
        maturity_level: u8,
        completion: f64,
        rates: &[(Dimension, f64)],
        cycles: usize,
        isolated: usize,
    ) -> MetricsSnapshot {
        MetricsSnapshot {
            id: "snapshot-test".to_string(),
            timestamp: Utc::now(),
            maturity_level,
            dimension_rates: rates
                .iter()
                .map(|(d, r)| (d.key().to_string(), *r))
                .collect(),
            element_counts: BTreeMap::new(),
            overall_completion_rate: completion,
            unsatisfied_criteria: 0,
            recommendation_counts: RecommendationCounts::default(),
            graph_stats: Some(GraphStatsSummary {
                node_count: 10,
                edge_count: 12,
                circular_dependencies: cycles,
                isolated_nodes: isolated,
                circular_dependencies_by_severity: BTreeMap::new(),
                coherence_issues: 0,
            }),
        }
    }

    #[test]
    fn test_health_score_worked_example() {
        let snapshot = snapshot_with(
            3,
            0.80,
            &[
                (Dimension::Structure, 0.9),
                (Dimension::Detail, 0.8),
                (Dimension::Traceability, 0.7),
                (Dimension::Testability, 0.7),
                (Dimension::Maintainability, 0.6),
            ],
            0,
            0,
        );
        let health = compute_health_score(&snapshot, &AnalyzerConfig::default());
        assert_eq!(health.categories.maturity, 60.0);
        assert_eq!(health.categories.completeness, 80.0);
        assert_eq!(health.categories.consistency, 98.0);
        assert_eq!(health.categories.traceability, 70.0);
        assert_eq!(health.categories.architecture, 100.0);
        assert_eq!(health.overall, 78.0);
        assert_eq!(health.level, HealthLevel::Good);
    }

    #[test]
    fn test_architecture_penalties_and_clamp() {
        let rates = [(Dimension::Traceability, 1.0)];
        let one_isolated = snapshot_with(5, 1.0, &rates, 0, 1);
        let health = compute_health_score(&one_isolated, &AnalyzerConfig::default());
        assert_eq!(health.categories.architecture, 95.0);

        let wrecked = snapshot_with(5, 1.0, &rates, 20, 20);
        let health = compute_health_score(&wrecked, &AnalyzerConfig::default());
        assert_eq!(health.categories.architecture, 0.0);
    }

    #[test]
    fn test_overall_stays_in_range() {
        let snapshot = snapshot_with(1, 0.0, &[], 50, 50);
        let health = compute_health_score(&snapshot, &AnalyzerConfig::default());
        assert!(health.overall >= 0.0 && health.overall <= 100.0);
        assert_eq!(health.level, HealthLevel::Critical);
        assert!(!health.weaknesses.is_empty());
    }

    #[test]
    fn test_trend_direction_band() {
        let mut snapshots = Vec::new();
        for level in [2u8, 2, 3] {
            snapshots.push(snapshot_with(level, 0.5, &[], 0, 0));
        }
        let trend = analyze_trend(&snapshots, "maturityLevel").unwrap();
        assert_eq!(trend.trend, TrendDirection::Improving);
        assert_eq!(trend.change_rate, 50.0);
        assert_eq!(trend.min, 2.0);
        assert_eq!(trend.max, 3.0);
        assert_eq!(trend.median, 2.0);

        let flat = vec![snapshot_with(3, 0.5, &[], 0, 0), snapshot_with(3, 0.5, &[], 0, 0)];
        assert_eq!(
            analyze_trend(&flat, "maturityLevel").unwrap().trend,
            TrendDirection::Stable
        );
    }

    #[test]
    fn test_trend_unknown_metric_is_none() {
        let snapshots = vec![snapshot_with(3, 0.5, &[], 0, 0)];
        assert!(analyze_trend(&snapshots, "no.such.metric").is_none());
    }

    #[test]
    fn test_comparison_duration_and_direction() {
        let mut from = snapshot_with(2, 0.4, &[], 2, 0);
        let mut to = snapshot_with(3, 0.6, &[], 1, 0);
        from.id = "snapshot-a".to_string();
        to.id = "snapshot-b".to_string();
        to.timestamp = from.timestamp + chrono::Duration::days(2) + chrono::Duration::hours(5);

        let comparison = compare_snapshots(&from, &to);
        assert_eq!(
            comparison.duration_ms,
            (to.timestamp - from.timestamp).num_milliseconds()
        );
        assert_eq!(comparison.duration_display, "2 days, 5 hours");

        let maturity = comparison
            .metrics
            .iter()
            .find(|m| m.metric == "maturityLevel")
            .unwrap();
        assert!(maturity.improved);
        let cycles = comparison
            .metrics
            .iter()
            .find(|m| m.metric == "circularDependencies")
            .unwrap();
        assert!(cycles.improved, "fewer cycles counts as improvement");
    }

    #[test]
    fn test_alerts() {
        let bad = snapshot_with(2, 0.4, &[], 1, 0);
        let alerts = alerts_for(&bad);
        assert_eq!(alerts.len(), 3);
        assert!(alerts.iter().any(|a| a.level == AlertLevel::Warning));
        assert_eq!(
            alerts.iter().filter(|a| a.level == AlertLevel::Error).count(),
            2
        );

        let good = snapshot_with(4, 0.9, &[], 0, 0);
        assert!(alerts_for(&good).is_empty());
    }

    #[test]
    fn test_fifo_retention() {
        let mut config = AnalyzerConfig::default();
        config.max_snapshots = 2;
        let mut dashboard = MetricsDashboard::with_config(config);

        let collection = ArtifactCollection::default();
        let maturity =
            crate::analyzers::maturity::MaturityAssessor::new().assess_project(&collection);
        let graph = crate::analyzers::graph::GraphAnalyzer::new().analyze(&collection);
        let coherence =
            crate::analyzers::coherence::CoherenceValidator::new().validate(&collection);
        let recommendations = crate::recommendations::RecommendationEngine::new().generate(
            &crate::recommendations::RecommendationInput {
                maturity: &maturity,
                graph: &graph,
                coherence: &coherence,
                naming: None,
                flow: None,
                context: None,
            },
        );

        let first = dashboard.take_snapshot(&maturity, &recommendations, Some(&graph), &collection);
        dashboard.take_snapshot(&maturity, &recommendations, Some(&graph), &collection);
        dashboard.take_snapshot(&maturity, &recommendations, Some(&graph), &collection);

        assert_eq!(dashboard.snapshots().len(), 2);
        assert!(dashboard.snapshot(&first.id).is_none(), "oldest evicted");
    }

    #[test]
    fn test_milestones_recorded_once() {
        let mut dashboard = MetricsDashboard::new();
        let collection = ArtifactCollection::default();
        let mut maturity =
            crate::analyzers::maturity::MaturityAssessor::new().assess_project(&collection);
        maturity.project_level = 3;
        let graph = crate::analyzers::graph::GraphAnalyzer::new().analyze(&collection);
        let coherence =
            crate::analyzers::coherence::CoherenceValidator::new().validate(&collection);
        let recommendations = crate::recommendations::RecommendationEngine::new().generate(
            &crate::recommendations::RecommendationInput {
                maturity: &maturity,
                graph: &graph,
                coherence: &coherence,
                naming: None,
                flow: None,
                context: None,
            },
        );

        dashboard.take_snapshot(&maturity, &recommendations, Some(&graph), &collection);
        dashboard.take_snapshot(&maturity, &recommendations, Some(&graph), &collection);

        let level_milestones: Vec<_> = dashboard
            .milestones()
            .iter()
            .filter(|m| m.kind.starts_with("maturity-level-"))
            .collect();
        assert_eq!(level_milestones.len(), 2); // levels 2 and 3, once each
    }
}
