use std::path::Path;

use anyhow::Result;
use clap::Parser;

use crate::core::config::AnalyzerConfig;
use crate::core::loader::CollectionLoader;
use crate::core::pipeline::{AssessmentPipeline, QualityAssessmentReport};
use crate::dashboard::AlertLevel;
use crate::generators::{ReportFormat, ReportGeneratorFactory};
use crate::recommendations::{
    Criticality, ProjectContext, ProjectDomain, ProjectStage, TeamSize,
};

#[derive(Parser)]
#[command(name = "quality-assessment")]
#[command(about = "Assess the quality of a requirements artifact repository")]
#[command(version = "0.1.0")]
pub struct Cli {
    /// Path to the project directory containing artifact files
    #[arg(default_value = ".")]
    pub project_dir: String,

    /// Write the report to quality-report-<timestamp>.<ext>
    #[arg(long)]
    pub export: bool,

    /// Export as JSON
    #[arg(long)]
    pub json: bool,

    /// Export as Markdown (the default format)
    #[arg(long)]
    pub markdown: bool,

    /// Export as HTML
    #[arg(long)]
    pub html: bool,

    /// Explicit analyzer config path (defaults to <project-dir>/quality-config.json)
    #[arg(long)]
    pub config: Option<String>,

    /// Project domain (finance, healthcare, ecommerce, general)
    #[arg(long)]
    pub context_domain: Option<String>,

    /// Project stage (poc, mvp, active-development, production)
    #[arg(long)]
    pub context_stage: Option<String>,

    /// Team size (solo, small, medium, large)
    #[arg(long)]
    pub context_team_size: Option<String>,

    /// Criticality (experimental, medium, mission-critical)
    #[arg(long)]
    pub context_criticality: Option<String>,
}

impl Cli {
    fn export_format(&self) -> ReportFormat {
        if self.json {
            ReportFormat::Json
        } else if self.html {
            ReportFormat::Html
        } else {
            ReportFormat::Markdown
        }
    }

    /// Builds a project context when any context flag is given; unknown
    /// values fall back to the neutral defaults with a warning.
    fn project_context(&self, warnings: &mut Vec<String>) -> Option<ProjectContext> {
        if self.context_domain.is_none()
            && self.context_stage.is_none()
            && self.context_team_size.is_none()
            && self.context_criticality.is_none()
        {
            return None;
        }

        fn parse<T: serde::de::DeserializeOwned>(
            flag: &str,
            value: &Option<String>,
            fallback: T,
            warnings: &mut Vec<String>,
        ) -> T {
            let Some(value) = value else {
                return fallback;
            };
            match serde_json::from_value(serde_json::Value::String(value.clone())) {
                Ok(parsed) => parsed,
                Err(_) => {
                    warnings.push(format!("unknown {} '{}', using default", flag, value));
                    fallback
                }
            }
        }

        Some(ProjectContext {
            domain: parse(
                "--context-domain",
                &self.context_domain,
                ProjectDomain::General,
                warnings,
            ),
            stage: parse(
                "--context-stage",
                &self.context_stage,
                ProjectStage::ActiveDevelopment,
                warnings,
            ),
            team_size: parse(
                "--context-team-size",
                &self.context_team_size,
                TeamSize::Small,
                warnings,
            ),
            criticality: parse(
                "--context-criticality",
                &self.context_criticality,
                Criticality::Medium,
                warnings,
            ),
        })
    }
}

pub struct CliRunner;

impl CliRunner {
    pub fn new() -> Self {
        Self
    }

    /// Runs the full assessment and returns the process exit code.
    pub async fn run(&self, cli: Cli) -> Result<i32> {
        let project_dir = Path::new(&cli.project_dir);
        println!("Assessing project: {}", project_dir.display());

        let mut warnings = Vec::new();
        let config = match &cli.config {
            Some(path) => AnalyzerConfig::load(Path::new(path))?,
            None => {
                let (config, config_warning) = AnalyzerConfig::load_or_default(project_dir);
                if let Some(warning) = config_warning {
                    warnings.push(warning);
                }
                config
            }
        };
        let context = cli.project_context(&mut warnings);

        let load_result = CollectionLoader::new().load(project_dir).await?;
        warnings.extend(load_result.warnings.clone());
        println!(
            "Loaded {} artifact(s) from {} file(s)",
            load_result.collection.total_artifacts(),
            load_result.files_loaded
        );

        let mut pipeline = AssessmentPipeline::with_config(config);
        let project_name = project_dir
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("project")
            .to_string();
        let report = pipeline.run(project_name, &load_result.collection, context, warnings);

        self.print_summary(&report);

        if cli.export {
            let path =
                ReportGeneratorFactory::export(&report, cli.export_format(), project_dir)?;
            println!("Report written to {}", path.display());
        }

        Ok(exit_code(report.health.overall))
    }

    fn print_summary(&self, report: &QualityAssessmentReport) {
        println!();
        println!(
            "Overall health: {:.0}/100 ({})",
            report.health.overall, report.health.level
        );
        println!("Maturity level: {} of 5", report.maturity.project_level);
        let stats = &report.graph.statistics;
        println!(
            "Graph: {} nodes, {} edges, {} cycle(s), {} isolated",
            stats.node_count, stats.edge_count, stats.cycle_count, stats.isolated_node_count
        );
        if let Some(coherence) = &report.graph.coherence_validation {
            println!("Coherence issues: {}", coherence.total_issues);
        }
        let summary = &report.recommendations.summary;
        println!(
            "Recommendations: {} ({} critical, {} high), ~{:.0}h",
            summary.total, summary.critical, summary.high, summary.estimated_total_hours
        );
        for alert in &report.alerts {
            match alert.level {
                AlertLevel::Error => eprintln!("error: {}", alert.message),
                AlertLevel::Warning => eprintln!("warning: {}", alert.message),
            }
        }
        for warning in &report.warnings {
            eprintln!("warning: {}", warning);
        }
        if report.health.overall < 75.0 && report.health.overall >= 40.0 {
            eprintln!("warning: overall health below the comfortable threshold of 75");
        }
    }
}

impl Default for CliRunner {
    fn default() -> Self {
        Self::new()
    }
}

/// Exit policy: healthy and fair projects exit 0 (fair with a warning
/// already printed); anything below 40 fails the run.
fn exit_code(overall_health: f64) -> i32 {
    if overall_health >= 40.0 { 0 } else { 1 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_policy() {
        assert_eq!(exit_code(90.0), 0);
        assert_eq!(exit_code(75.0), 0);
        assert_eq!(exit_code(40.0), 0);
        assert_eq!(exit_code(39.9), 1);
        assert_eq!(exit_code(0.0), 1);
    }

    #[test]
    fn test_export_format_selection() {
        let cli = Cli::parse_from(["quality-assessment", ".", "--export", "--json"]);
        assert_eq!(cli.export_format(), ReportFormat::Json);
        let cli = Cli::parse_from(["quality-assessment", ".", "--export"]);
        assert_eq!(cli.export_format(), ReportFormat::Markdown);
        let cli = Cli::parse_from(["quality-assessment", ".", "--export", "--html"]);
        assert_eq!(cli.export_format(), ReportFormat::Html);
    }

    #[test]
    fn test_context_parsing() {
        let cli = Cli::parse_from([
            "quality-assessment",
            ".",
            "--context-domain",
            "finance",
            "--context-stage",
            "production",
            "--context-criticality",
            "mission-critical",
        ]);
        let mut warnings = Vec::new();
        let context = cli.project_context(&mut warnings).unwrap();
        assert!(warnings.is_empty());
        assert_eq!(context.domain, ProjectDomain::Finance);
        assert_eq!(context.stage, ProjectStage::Production);
        assert_eq!(context.criticality, Criticality::MissionCritical);
        assert_eq!(context.team_size, TeamSize::Small);
    }

    #[test]
    fn test_no_context_flags_means_no_context() {
        let cli = Cli::parse_from(["quality-assessment", "."]);
        let mut warnings = Vec::new();
        assert!(cli.project_context(&mut warnings).is_none());
    }

    #[test]
    fn test_unknown_context_value_warns() {
        let cli = Cli::parse_from(["quality-assessment", ".", "--context-stage", "someday"]);
        let mut warnings = Vec::new();
        let context = cli.project_context(&mut warnings).unwrap();
        assert_eq!(warnings.len(), 1);
        assert_eq!(context.stage, ProjectStage::ActiveDevelopment);
    }

    #[tokio::test]
    async fn test_end_to_end_run_with_export() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("login.json"),
            serde_json::json!({
                "type": "usecase",
                "id": "uc-login",
                "name": "Log in",
                "mainFlow": [
                    { "stepId": "enter", "action": "enter credentials",
                      "expectedResult": "accepted" }
                ],
            })
            .to_string(),
        )
        .unwrap();

        let cli = Cli::parse_from([
            "quality-assessment",
            dir.path().to_str().unwrap(),
            "--export",
        ]);
        let code = CliRunner::new().run(cli).await.unwrap();
        assert!(code == 0 || code == 1);

        let exported = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .any(|e| {
                e.file_name()
                    .to_str()
                    .is_some_and(|n| n.starts_with("quality-report-") && n.ends_with(".md"))
            });
        assert!(exported);
    }
}
