use anyhow::{Context, Result};

use super::{ReportFormat, ReportGenerator};
use crate::core::pipeline::QualityAssessmentReport;

/// Serializes the full report record; downstream tools consume this shape.
pub struct JsonReportGenerator;

impl JsonReportGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl Default for JsonReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportGenerator for JsonReportGenerator {
    fn generate(&self, report: &QualityAssessmentReport) -> Result<String> {
        serde_json::to_string_pretty(report).context("Failed to serialize report to JSON")
    }

    fn file_extension(&self) -> &str {
        "json"
    }

    fn format(&self) -> ReportFormat {
        ReportFormat::Json
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::collection::ArtifactCollection;
    use crate::core::pipeline::AssessmentPipeline;

    #[test]
    fn test_json_output_parses_back() {
        let report =
            AssessmentPipeline::new().run("json-demo", &ArtifactCollection::default(), None, vec![]);
        let content = JsonReportGenerator::new().generate(&report).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value["projectName"], "json-demo");
        assert!(value["health"]["overall"].is_number());
        assert!(value["snapshot"]["id"].as_str().unwrap().starts_with("snapshot-"));
    }
}
