use anyhow::Result;

use super::{ReportFormat, ReportGenerator};
use crate::core::pipeline::QualityAssessmentReport;

/// Flat metric sink for spreadsheets: one `section,metric,value` row per
/// number the run produced.
pub struct CsvReportGenerator;

impl CsvReportGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CsvReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

fn quote(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

impl ReportGenerator for CsvReportGenerator {
    fn generate(&self, report: &QualityAssessmentReport) -> Result<String> {
        let mut rows: Vec<(String, String, String)> = Vec::new();
        let mut push = |section: &str, metric: &str, value: String| {
            rows.push((section.to_string(), metric.to_string(), value));
        };

        push("health", "overall", format!("{:.0}", report.health.overall));
        push("health", "level", report.health.level.to_string());
        for (name, score) in report.health.categories.named() {
            push("health", name, format!("{:.0}", score));
        }

        push(
            "maturity",
            "projectLevel",
            report.maturity.project_level.to_string(),
        );
        for (level, count) in &report.maturity.distribution {
            push("maturity", &format!("level{}Count", level), count.to_string());
        }
        for dimension in &report.maturity.overall_dimensions {
            push(
                "maturity",
                &format!("{}Completion", dimension.dimension),
                format!("{:.4}", dimension.completion_rate),
            );
        }

        let stats = &report.graph.statistics;
        push("graph", "nodeCount", stats.node_count.to_string());
        push("graph", "edgeCount", stats.edge_count.to_string());
        push("graph", "cycleCount", stats.cycle_count.to_string());
        push(
            "graph",
            "isolatedNodeCount",
            stats.isolated_node_count.to_string(),
        );
        push(
            "graph",
            "connectedComponents",
            stats.connected_components.to_string(),
        );
        push(
            "graph",
            "layerHealth",
            format!("{:.0}", report.graph.layer_analysis.health_score),
        );

        if let Some(coherence) = &report.graph.coherence_validation {
            push(
                "coherence",
                "totalIssues",
                coherence.total_issues.to_string(),
            );
        }
        push(
            "naming",
            "overallScore",
            format!("{:.1}", report.naming.overall_score),
        );
        push(
            "flowConsistency",
            "overallScore",
            format!("{:.1}", report.flow_consistency.overall_score),
        );

        let summary = &report.recommendations.summary;
        push("recommendations", "total", summary.total.to_string());
        push("recommendations", "critical", summary.critical.to_string());
        push("recommendations", "high", summary.high.to_string());
        push(
            "recommendations",
            "estimatedTotalHours",
            format!("{:.1}", summary.estimated_total_hours),
        );

        for (kind, count) in &report.snapshot.element_counts {
            push("elements", kind, count.to_string());
        }

        let mut content = String::from("section,metric,value\n");
        for (section, metric, value) in rows {
            content.push_str(&format!(
                "{},{},{}\n",
                quote(&section),
                quote(&metric),
                quote(&value)
            ));
        }
        Ok(content)
    }

    fn file_extension(&self) -> &str {
        "csv"
    }

    fn format(&self) -> ReportFormat {
        ReportFormat::Csv
    }
}
