use anyhow::Result;

use super::{ReportFormat, ReportGenerator, format_priority, format_severity};
use crate::core::pipeline::QualityAssessmentReport;

pub struct HtmlReportGenerator;

impl HtmlReportGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl Default for HtmlReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

impl ReportGenerator for HtmlReportGenerator {
    fn generate(&self, report: &QualityAssessmentReport) -> Result<String> {
        let mut html = String::new();

        html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
        html.push_str("<meta charset=\"utf-8\">\n");
        html.push_str(&format!(
            "<title>Quality Assessment: {}</title>\n",
            escape(&report.project_name)
        ));
        html.push_str("<style>\n");
        html.push_str("body { font-family: sans-serif; margin: 2em; color: #222; }\n");
        html.push_str("table { border-collapse: collapse; margin-bottom: 1.5em; }\n");
        html.push_str("th, td { border: 1px solid #ccc; padding: 0.4em 0.8em; text-align: left; }\n");
        html.push_str(".score { font-size: 2em; font-weight: bold; }\n");
        html.push_str(".critical, .high { color: #b00020; }\n");
        html.push_str(".medium { color: #b06000; }\n");
        html.push_str("</style>\n</head>\n<body>\n");

        html.push_str(&format!(
            "<h1>Quality Assessment: {}</h1>\n",
            escape(&report.project_name)
        ));
        html.push_str(&format!(
            "<p class=\"score\">{:.0}/100 ({})</p>\n",
            report.health.overall, report.health.level
        ));

        html.push_str("<h2>Health Categories</h2>\n<table>\n<tr><th>Category</th><th>Score</th></tr>\n");
        for (name, score) in report.health.categories.named() {
            html.push_str(&format!(
                "<tr><td>{}</td><td>{:.0}</td></tr>\n",
                name, score
            ));
        }
        html.push_str("</table>\n");
        html.push_str(&format!("<p>{}</p>\n", escape(&report.health.assessment)));

        if !report.alerts.is_empty() {
            html.push_str("<h2>Alerts</h2>\n<ul>\n");
            for alert in &report.alerts {
                html.push_str(&format!(
                    "<li><strong>{:?}</strong>: {}</li>\n",
                    alert.level,
                    escape(&alert.message)
                ));
            }
            html.push_str("</ul>\n");
        }

        html.push_str("<h2>Maturity</h2>\n");
        html.push_str(&format!(
            "<p>Project level {} of 5</p>\n",
            report.maturity.project_level
        ));
        html.push_str("<table>\n<tr><th>Element</th><th>Kind</th><th>Level</th><th>Completion</th></tr>\n");
        for element in report.maturity.elements.iter() {
            html.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{:.0}%</td></tr>\n",
                escape(&element.element_id),
                element.element_type,
                element.overall_level,
                element.overall_completion_rate * 100.0
            ));
        }
        html.push_str("</table>\n");

        html.push_str("<h2>Dependency Graph</h2>\n");
        let stats = &report.graph.statistics;
        html.push_str(&format!(
            "<p>{} nodes, {} edges, {} cycles, {} isolated</p>\n",
            stats.node_count, stats.edge_count, stats.cycle_count, stats.isolated_node_count
        ));
        if !report.graph.circular_dependencies.is_empty() {
            html.push_str("<ul>\n");
            for cycle in &report.graph.circular_dependencies {
                html.push_str(&format!(
                    "<li class=\"{}\">[{}] {}</li>\n",
                    cycle.severity,
                    format_severity(&cycle.severity),
                    escape(&cycle.nodes.join(" → "))
                ));
            }
            html.push_str("</ul>\n");
        }

        if let Some(coherence) = &report.graph.coherence_validation {
            if !coherence.issues.is_empty() {
                html.push_str("<h2>Coherence Issues</h2>\n<ul>\n");
                for issue in &coherence.issues {
                    html.push_str(&format!(
                        "<li class=\"{}\">[{}] {}: {}</li>\n",
                        issue.severity,
                        format_severity(&issue.severity),
                        escape(&issue.use_case_id),
                        escape(&issue.description)
                    ));
                }
                html.push_str("</ul>\n");
            }
        }

        html.push_str("<h2>Top Recommendations</h2>\n");
        html.push_str("<table>\n<tr><th>Priority</th><th>Title</th><th>Effort</th></tr>\n");
        for rec in &report.recommendations.top_priority {
            html.push_str(&format!(
                "<tr><td class=\"{}\">{}</td><td>{}</td><td>{}h ({})</td></tr>\n",
                rec.priority,
                format_priority(&rec.priority),
                escape(&rec.title),
                rec.effort.hours,
                rec.effort.complexity
            ));
        }
        html.push_str("</table>\n");

        if !report.recommendations.quick_wins.is_empty() {
            html.push_str("<h2>Quick Wins</h2>\n<ul>\n");
            for win in &report.recommendations.quick_wins {
                html.push_str(&format!(
                    "<li>{} ({})</li>\n",
                    escape(&win.title),
                    escape(&win.display)
                ));
            }
            html.push_str("</ul>\n");
        }

        html.push_str(&format!(
            "<footer><p>Generated {} · snapshot {}</p></footer>\n",
            report.generated_at.format("%Y-%m-%d %H:%M UTC"),
            escape(&report.snapshot.id)
        ));
        html.push_str("</body>\n</html>\n");

        Ok(html)
    }

    fn file_extension(&self) -> &str {
        "html"
    }

    fn format(&self) -> ReportFormat {
        ReportFormat::Html
    }
}
