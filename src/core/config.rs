use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// File name looked up inside the analyzed project directory.
pub const CONFIG_FILE_NAME: &str = "quality-config.json";

/// Health-level cut points on the 0-100 overall score.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthThresholds {
    pub excellent: f64,
    pub good: f64,
    pub fair: f64,
    pub poor: f64,
}

impl Default for HealthThresholds {
    fn default() -> Self {
        Self {
            excellent: 90.0,
            good: 75.0,
            fair: 60.0,
            poor: 40.0,
        }
    }
}

/// Weights of the five health categories; they sum to 1.0.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthWeights {
    pub maturity: f64,
    pub completeness: f64,
    pub consistency: f64,
    pub traceability: f64,
    pub architecture: f64,
}

impl Default for HealthWeights {
    fn default() -> Self {
        Self {
            maturity: 0.30,
            completeness: 0.25,
            consistency: 0.15,
            traceability: 0.15,
            architecture: 0.15,
        }
    }
}

/// Pair of domain terms that are easy to mix up in artifact names.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfusableTermPair {
    pub preferred: String,
    pub alternate: String,
}

/// Tunable knobs of the assessment run. Defaults match the documented
/// behavior; a `quality-config.json` in the project directory can override
/// any subset of them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalyzerConfig {
    pub health_thresholds: HealthThresholds,
    pub health_weights: HealthWeights,
    pub max_snapshots: usize,
    pub top_priority_count: usize,
    pub quick_win_max_hours: f64,
    pub confusable_terms: Vec<ConfusableTermPair>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            health_thresholds: HealthThresholds::default(),
            health_weights: HealthWeights::default(),
            max_snapshots: 100,
            top_priority_count: 10,
            quick_win_max_hours: 4.0,
            confusable_terms: Vec::new(),
        }
    }
}

impl AnalyzerConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read analyzer config from {:?}", path))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse analyzer config {:?}", path))
    }

    /// Load `quality-config.json` from the project directory when present.
    /// A missing file is the normal case; a malformed one falls back to
    /// defaults and returns a warning instead of failing the run.
    pub fn load_or_default(project_dir: &Path) -> (Self, Option<String>) {
        let path = project_dir.join(CONFIG_FILE_NAME);
        if !path.exists() {
            return (Self::default(), None);
        }
        match Self::load(&path) {
            Ok(config) => (config, None),
            Err(e) => (
                Self::default(),
                Some(format!("ignoring malformed {}: {:#}", CONFIG_FILE_NAME, e)),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_documented_constants() {
        let config = AnalyzerConfig::default();
        assert_eq!(config.health_thresholds.good, 75.0);
        assert_eq!(config.max_snapshots, 100);
        assert_eq!(config.top_priority_count, 10);
        let weights = &config.health_weights;
        let sum = weights.maturity
            + weights.completeness
            + weights.consistency
            + weights.traceability
            + weights.architecture;
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, r#"{"maxSnapshots": 25}"#).unwrap();

        let (config, warning) = AnalyzerConfig::load_or_default(dir.path());
        assert!(warning.is_none());
        assert_eq!(config.max_snapshots, 25);
        assert_eq!(config.top_priority_count, 10);
    }

    #[test]
    fn test_malformed_config_warns_and_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "not json").unwrap();

        let (config, warning) = AnalyzerConfig::load_or_default(dir.path());
        assert!(warning.is_some());
        assert_eq!(config.max_snapshots, 100);
    }

    #[test]
    fn test_missing_config_is_silent() {
        let dir = tempfile::tempdir().unwrap();
        let (config, warning) = AnalyzerConfig::load_or_default(dir.path());
        assert!(warning.is_none());
        assert_eq!(config.quick_win_max_hours, 4.0);
    }
}
