use anyhow::Result;

use super::{ReportFormat, ReportGenerator, format_priority, format_severity};
use crate::core::pipeline::QualityAssessmentReport;

pub struct MarkdownReportGenerator;

impl MarkdownReportGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MarkdownReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportGenerator for MarkdownReportGenerator {
    fn generate(&self, report: &QualityAssessmentReport) -> Result<String> {
        let mut content = String::new();

        content.push_str(&format!("# Quality Assessment: {}\n\n", report.project_name));
        content.push_str(&format!(
            "Generated {}\n\n",
            report.generated_at.format("%Y-%m-%d %H:%M UTC")
        ));

        // Health overview
        content.push_str("## Health\n\n");
        content.push_str(&format!(
            "**Overall: {:.0}/100 ({})**\n\n",
            report.health.overall, report.health.level
        ));
        content.push_str("| Category | Score |\n");
        content.push_str("|----------|-------|\n");
        for (name, score) in report.health.categories.named() {
            content.push_str(&format!("| {} | {:.0} |\n", name, score));
        }
        content.push_str(&format!("\n{}\n\n", report.health.assessment));

        if !report.alerts.is_empty() {
            content.push_str("### Alerts\n\n");
            for alert in &report.alerts {
                content.push_str(&format!("- **{:?}**: {}\n", alert.level, alert.message));
            }
            content.push_str("\n");
        }

        // Maturity
        content.push_str("## Maturity\n\n");
        content.push_str(&format!(
            "Project level: **{}** of 5\n\n",
            report.maturity.project_level
        ));
        content.push_str("| Level | Elements |\n");
        content.push_str("|-------|----------|\n");
        for (level, count) in &report.maturity.distribution {
            content.push_str(&format!("| {} | {} |\n", level, count));
        }
        content.push_str("\n| Dimension | Completion | Level |\n");
        content.push_str("|-----------|------------|-------|\n");
        for dimension in &report.maturity.overall_dimensions {
            content.push_str(&format!(
                "| {} | {:.0}% | {} |\n",
                dimension.dimension,
                dimension.completion_rate * 100.0,
                dimension.current_level
            ));
        }
        content.push_str("\n");

        if !report.maturity.improvement_areas.is_empty() {
            let areas: Vec<String> = report
                .maturity
                .improvement_areas
                .iter()
                .map(|d| d.to_string())
                .collect();
            content.push_str(&format!("Improvement areas: {}\n\n", areas.join(", ")));
        }

        content.push_str("### Elements\n\n");
        content.push_str("| Element | Kind | Level | Completion | Next effort |\n");
        content.push_str("|---------|------|-------|------------|-------------|\n");
        for element in report.maturity.elements.iter() {
            content.push_str(&format!(
                "| {} | {} | {} | {:.0}% | {} |\n",
                element.element_id,
                element.element_type,
                element.overall_level,
                element.overall_completion_rate * 100.0,
                element.estimated_effort
            ));
        }
        content.push_str("\n");

        // Dependency graph
        content.push_str("## Dependency Graph\n\n");
        let stats = &report.graph.statistics;
        content.push_str(&format!(
            "{} nodes, {} edges, {} component(s), max depth {}\n\n",
            stats.node_count, stats.edge_count, stats.connected_components, stats.max_depth
        ));

        if !report.graph.circular_dependencies.is_empty() {
            content.push_str("### Circular Dependencies\n\n");
            for cycle in &report.graph.circular_dependencies {
                content.push_str(&format!(
                    "- [{}] {}\n",
                    format_severity(&cycle.severity),
                    cycle.nodes.join(" -> ")
                ));
            }
            content.push_str("\n");
        }

        if !report.graph.isolated_nodes.is_empty() {
            content.push_str(&format!(
                "Isolated nodes: {}\n\n",
                report.graph.isolated_nodes.join(", ")
            ));
        }

        if !report.graph.layer_analysis.violations.is_empty() {
            content.push_str(&format!(
                "Layer violations: {} (layer health {:.0})\n\n",
                report.graph.layer_analysis.violations.len(),
                report.graph.layer_analysis.health_score
            ));
        }

        for warning in &report.graph.warnings {
            content.push_str(&format!("- {}\n", warning));
        }
        if !report.graph.warnings.is_empty() {
            content.push_str("\n");
        }

        // Coherence
        if let Some(coherence) = &report.graph.coherence_validation {
            content.push_str("## Coherence\n\n");
            content.push_str(&format!(
                "{} use case(s), {} screen flow(s), {} issue(s)\n\n",
                coherence.total_use_cases, coherence.total_screen_flows, coherence.total_issues
            ));
            for issue in &coherence.issues {
                content.push_str(&format!(
                    "- [{}] {}: {}\n",
                    format_severity(&issue.severity),
                    issue.use_case_id,
                    issue.description
                ));
            }
            if !coherence.issues.is_empty() {
                content.push_str("\n");
            }
        }

        if let Some(notes) = &report.graph.flow_design_info {
            if !notes.is_empty() {
                content.push_str("### Flow Design Notes\n\n");
                for note in notes {
                    content.push_str(&format!(
                        "- {} ({} steps): {}\n",
                        note.use_case_id, note.step_count, note.message
                    ));
                }
                content.push_str("\n");
            }
        }

        // Consistency
        content.push_str("## Consistency\n\n");
        content.push_str(&format!(
            "Naming: {:.0}% overall (ids {:.0}%, stepIds {:.0}%, files {:.0}%)\n\n",
            report.naming.overall_score,
            report.naming.id_naming_score,
            report.naming.step_id_score,
            report.naming.file_naming_score
        ));
        for recommendation in &report.naming.recommendations {
            content.push_str(&format!("- {}\n", recommendation));
        }
        if !report.naming.recommendations.is_empty() {
            content.push_str("\n");
        }
        content.push_str(&format!(
            "Flow consistency: {:.0}% (screen order {:.0}%, actions {:.0}%, triggers {:.0}%, completeness {:.0}%)\n\n",
            report.flow_consistency.overall_score,
            report.flow_consistency.screen_order_score,
            report.flow_consistency.action_score,
            report.flow_consistency.trigger_score,
            report.flow_consistency.completeness_score
        ));

        // Recommendations
        content.push_str("## Recommendations\n\n");
        let summary = &report.recommendations.summary;
        content.push_str(&format!(
            "{} total ({} critical, {} high), estimated {:.0}h, expected maturity increase {:.1}\n\n",
            summary.total,
            summary.critical,
            summary.high,
            summary.estimated_total_hours,
            summary.expected_maturity_increase
        ));

        if !report.recommendations.top_priority.is_empty() {
            content.push_str("### Top Priority\n\n");
            content.push_str("| Priority | Title | Affected | Effort |\n");
            content.push_str("|----------|-------|----------|--------|\n");
            for rec in &report.recommendations.top_priority {
                content.push_str(&format!(
                    "| {} | {} | {} | {}h {} |\n",
                    format_priority(&rec.priority),
                    rec.title,
                    rec.impact.affected_elements.join(", "),
                    rec.effort.hours,
                    rec.effort.complexity
                ));
            }
            content.push_str("\n");
        }

        if !report.recommendations.quick_wins.is_empty() {
            content.push_str("### Quick Wins\n\n");
            for win in &report.recommendations.quick_wins {
                content.push_str(&format!("- {} ({})\n", win.title, win.display));
            }
            content.push_str("\n");
        }

        if !report.recommendations.long_term_strategy.is_empty() {
            content.push_str("### Long-Term Strategy\n\n");
            for phase in &report.recommendations.long_term_strategy {
                content.push_str(&format!("- {}\n", phase));
            }
            content.push_str("\n");
        }

        // Run metadata
        content.push_str("## Run Metadata\n\n");
        content.push_str("| Property | Value |\n");
        content.push_str("|----------|-------|\n");
        for (kind, count) in &report.snapshot.element_counts {
            content.push_str(&format!("| {} | {} |\n", kind, count));
        }
        content.push_str(&format!("| snapshot | {} |\n", report.snapshot.id));

        if !report.warnings.is_empty() {
            content.push_str("\n### Warnings\n\n");
            for warning in &report.warnings {
                content.push_str(&format!("- {}\n", warning));
            }
        }
        if !report.consistency_issues.is_empty() {
            content.push_str("\n### Collection Issues\n\n");
            for issue in &report.consistency_issues {
                content.push_str(&format!(
                    "- [{}] {}\n",
                    format_severity(&issue.severity),
                    issue.description
                ));
            }
        }

        content.push_str("\n---\n");
        content.push_str("*Generated by quality-assessment*\n");

        Ok(content)
    }

    fn file_extension(&self) -> &str {
        "md"
    }

    fn format(&self) -> ReportFormat {
        ReportFormat::Markdown
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::collection::ArtifactCollection;
    use crate::core::pipeline::AssessmentPipeline;

    #[test]
    fn test_markdown_covers_main_sections() {
        let collection = ArtifactCollection::from_artifacts(vec![serde_json::from_value(
            serde_json::json!({
                "type": "usecase",
                "id": "uc-demo",
                "name": "Demo",
                "mainFlow": [
                    { "stepId": "only", "action": "do the thing", "expectedResult": "done" }
                ],
            }),
        )
        .unwrap()]);
        let report = AssessmentPipeline::new().run("md-demo", &collection, None, vec![]);
        let content = MarkdownReportGenerator::new().generate(&report).unwrap();

        for heading in [
            "# Quality Assessment: md-demo",
            "## Health",
            "## Maturity",
            "## Dependency Graph",
            "## Consistency",
            "## Recommendations",
            "## Run Metadata",
        ] {
            assert!(content.contains(heading), "missing section: {}", heading);
        }
        // The single-step use case surfaces as a flow design note.
        assert!(content.contains("Flow Design Notes"));
    }
}
