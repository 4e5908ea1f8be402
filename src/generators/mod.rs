use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::pipeline::QualityAssessmentReport;
use crate::core::types::{Priority, Severity};

pub mod csv;
pub mod html;
pub mod json;
pub mod markdown;

pub use csv::CsvReportGenerator;
pub use html::HtmlReportGenerator;
pub use json::JsonReportGenerator;
pub use markdown::MarkdownReportGenerator;

pub trait ReportGenerator {
    fn generate(&self, report: &QualityAssessmentReport) -> Result<String>;
    fn file_extension(&self) -> &str;
    fn format(&self) -> ReportFormat;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Markdown,
    Html,
    Json,
    Csv,
}

pub struct ReportGeneratorFactory;

impl ReportGeneratorFactory {
    pub fn create(format: ReportFormat) -> Box<dyn ReportGenerator> {
        match format {
            ReportFormat::Markdown => Box::new(MarkdownReportGenerator::new()),
            ReportFormat::Html => Box::new(HtmlReportGenerator::new()),
            ReportFormat::Json => Box::new(JsonReportGenerator::new()),
            ReportFormat::Csv => Box::new(CsvReportGenerator::new()),
        }
    }

    /// Writes `quality-report-<timestamp>.<ext>` into the output directory
    /// and returns the path.
    pub fn export(
        report: &QualityAssessmentReport,
        format: ReportFormat,
        output_dir: &Path,
    ) -> Result<PathBuf> {
        let generator = Self::create(format);
        let content = generator.generate(report)?;
        let filename = format!(
            "quality-report-{}.{}",
            report.generated_at.format("%Y%m%d-%H%M%S"),
            generator.file_extension()
        );
        let path = output_dir.join(filename);
        std::fs::write(&path, &content)
            .with_context(|| format!("Failed to write report to {:?}", path))?;
        Ok(path)
    }
}

// Helper functions for consistent formatting across generators
pub fn format_priority(priority: &Priority) -> &'static str {
    match priority {
        Priority::Critical => "Critical",
        Priority::High => "High",
        Priority::Medium => "Medium",
        Priority::Low => "Low",
    }
}

pub fn format_severity(severity: &Severity) -> &'static str {
    match severity {
        Severity::Critical => "Critical",
        Severity::High => "High",
        Severity::Medium => "Medium",
        Severity::Low => "Low",
        Severity::Info => "Info",
    }
}
