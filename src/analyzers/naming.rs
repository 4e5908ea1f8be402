use std::collections::{BTreeMap, BTreeSet};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::core::collection::ArtifactCollection;
use crate::core::config::ConfusableTermPair;

static KEBAB_CASE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z][a-z0-9]*(?:-[a-z0-9]+)*$").unwrap());
static CAMEL_CASE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z][a-z0-9]*(?:[A-Z][a-z0-9]*)+$").unwrap());
static SNAKE_CASE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z][a-z0-9]*(?:_[a-z0-9]+)+$").unwrap());
static PASCAL_CASE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:[A-Z][a-z0-9]*)+$").unwrap());

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "kebab-case")]
pub enum NamingStyle {
    KebabCase,
    CamelCase,
    SnakeCase,
    PascalCase,
    Inconsistent,
}

impl NamingStyle {
    pub fn key(&self) -> &'static str {
        match self {
            NamingStyle::KebabCase => "kebab-case",
            NamingStyle::CamelCase => "camel-case",
            NamingStyle::SnakeCase => "snake-case",
            NamingStyle::PascalCase => "pascal-case",
            NamingStyle::Inconsistent => "inconsistent",
        }
    }
}

/// First matching class wins, in kebab, camel, snake, pascal order.
pub fn classify(identifier: &str) -> NamingStyle {
    if KEBAB_CASE.is_match(identifier) {
        NamingStyle::KebabCase
    } else if CAMEL_CASE.is_match(identifier) {
        NamingStyle::CamelCase
    } else if SNAKE_CASE.is_match(identifier) {
        NamingStyle::SnakeCase
    } else if PASCAL_CASE.is_match(identifier) {
        NamingStyle::PascalCase
    } else {
        NamingStyle::Inconsistent
    }
}

/// Mechanical kebab-case conversion: word boundaries become hyphens,
/// underscores become hyphens, everything lowercases. Idempotent on input
/// that is already kebab-case.
pub fn to_kebab_case(identifier: &str) -> String {
    let mut out = String::with_capacity(identifier.len() + 4);
    let mut prev_lower_or_digit = false;
    for ch in identifier.chars() {
        if ch == '_' || ch == '-' || ch.is_whitespace() {
            if !out.ends_with('-') && !out.is_empty() {
                out.push('-');
            }
            prev_lower_or_digit = false;
        } else if ch.is_ascii_uppercase() {
            if prev_lower_or_digit && !out.ends_with('-') {
                out.push('-');
            }
            out.push(ch.to_ascii_lowercase());
            prev_lower_or_digit = false;
        } else {
            out.push(ch);
            prev_lower_or_digit = ch.is_ascii_lowercase() || ch.is_ascii_digit();
        }
    }
    out.trim_matches('-').to_string()
}

fn is_purely_numeric(identifier: &str) -> bool {
    !identifier.is_empty() && identifier.chars().all(|c| c.is_ascii_digit())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamingViolation {
    pub target: String,
    pub context: String,
    pub style: NamingStyle,
    pub suggested: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MixedTerminology {
    pub preferred: String,
    pub alternate: String,
    pub occurrences: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamingConsistencyResult {
    pub style_counts: BTreeMap<String, usize>,
    pub id_naming_score: f64,
    pub step_id_score: f64,
    pub file_naming_score: f64,
    pub overall_score: f64,
    pub violations: Vec<NamingViolation>,
    pub mixed_terminology: Vec<MixedTerminology>,
    pub recommendations: Vec<String>,
}

/// Stylistic identifier checks. Deliberately decoupled from maturity: a
/// repository can suppress these without changing its level.
pub struct NamingConsistencyValidator {
    confusable_terms: Vec<ConfusableTermPair>,
}

impl NamingConsistencyValidator {
    pub fn new() -> Self {
        Self {
            confusable_terms: Vec::new(),
        }
    }

    pub fn with_confusable_terms(confusable_terms: Vec<ConfusableTermPair>) -> Self {
        Self { confusable_terms }
    }

    pub fn validate(&self, collection: &ArtifactCollection) -> NamingConsistencyResult {
        let ids = collect_artifact_ids(collection);

        let mut style_counts: BTreeMap<String, usize> = BTreeMap::new();
        let mut violations = Vec::new();
        let mut kebab_ids = 0usize;
        for id in &ids {
            let style = classify(id);
            *style_counts.entry(style.key().to_string()).or_insert(0) += 1;
            if style == NamingStyle::KebabCase {
                kebab_ids += 1;
            } else {
                violations.push(NamingViolation {
                    target: id.clone(),
                    context: "artifact id".to_string(),
                    style,
                    suggested: to_kebab_case(id),
                });
            }
        }
        let id_naming_score = ratio_score(kebab_ids, ids.len());

        let step_id_score = self.step_id_score(collection, &mut violations);
        let file_naming_score = file_score(collection.source_files());

        let overall_score =
            0.5 * id_naming_score + 0.4 * step_id_score + 0.1 * file_naming_score;

        let mixed_terminology = self.find_mixed_terminology(collection);
        let recommendations = violations
            .iter()
            .take(10)
            .map(|v| format!("Rename '{}' to '{}'", v.target, v.suggested))
            .collect();

        NamingConsistencyResult {
            style_counts,
            id_naming_score,
            step_id_score,
            file_naming_score,
            overall_score,
            violations,
            mixed_terminology,
            recommendations,
        }
    }

    /// Base kebab ratio minus 5 points for every use case whose stepIds mix
    /// styles or are purely numeric, clamped at zero.
    fn step_id_score(
        &self,
        collection: &ArtifactCollection,
        violations: &mut Vec<NamingViolation>,
    ) -> f64 {
        let mut total = 0usize;
        let mut kebab = 0usize;
        let mut penalties = 0usize;

        for uc in collection.use_cases() {
            let step_ids = uc.main_flow_step_ids();
            if step_ids.is_empty() {
                continue;
            }
            let mut styles = BTreeSet::new();
            let mut numeric = false;
            for step_id in &step_ids {
                total += 1;
                let style = classify(step_id);
                styles.insert(style);
                if style == NamingStyle::KebabCase {
                    kebab += 1;
                } else {
                    violations.push(NamingViolation {
                        target: step_id.to_string(),
                        context: format!("stepId in use case '{}'", uc.id),
                        style,
                        suggested: to_kebab_case(step_id),
                    });
                }
                if is_purely_numeric(step_id) {
                    numeric = true;
                }
            }
            if styles.len() > 1 || numeric {
                penalties += 1;
            }
        }

        (ratio_score(kebab, total) - 5.0 * penalties as f64).max(0.0)
    }

    fn find_mixed_terminology(&self, collection: &ArtifactCollection) -> Vec<MixedTerminology> {
        let mut haystack: Vec<(String, String)> = Vec::new();
        for id in collect_artifact_ids(collection) {
            haystack.push((id.clone(), id));
        }
        for uc in collection.use_cases() {
            haystack.push((uc.id.clone(), uc.name.to_lowercase()));
        }

        self.confusable_terms
            .iter()
            .filter_map(|pair| {
                let preferred_hits: Vec<String> = haystack
                    .iter()
                    .filter(|(_, text)| text.contains(&pair.preferred.to_lowercase()))
                    .map(|(id, _)| id.clone())
                    .collect();
                let alternate_hits: Vec<String> = haystack
                    .iter()
                    .filter(|(_, text)| text.contains(&pair.alternate.to_lowercase()))
                    .map(|(id, _)| id.clone())
                    .collect();
                if preferred_hits.is_empty() || alternate_hits.is_empty() {
                    return None;
                }
                let mut occurrences: Vec<String> = preferred_hits
                    .into_iter()
                    .chain(alternate_hits)
                    .collect::<BTreeSet<_>>()
                    .into_iter()
                    .collect();
                occurrences.dedup();
                Some(MixedTerminology {
                    preferred: pair.preferred.clone(),
                    alternate: pair.alternate.clone(),
                    occurrences,
                })
            })
            .collect()
    }
}

impl Default for NamingConsistencyValidator {
    fn default() -> Self {
        Self::new()
    }
}

fn collect_artifact_ids(collection: &ArtifactCollection) -> Vec<String> {
    let mut ids = Vec::new();
    ids.extend(collection.business_requirements().iter().map(|a| a.id.clone()));
    ids.extend(collection.actors().iter().map(|a| a.id.clone()));
    ids.extend(collection.use_cases().iter().map(|a| a.id.clone()));
    ids.extend(collection.screens().iter().map(|a| a.id.clone()));
    ids.extend(collection.screen_flows().iter().map(|a| a.id.clone()));
    ids.extend(collection.validation_rules().iter().map(|a| a.id.clone()));
    ids
}

fn ratio_score(hits: usize, total: usize) -> f64 {
    if total == 0 {
        100.0
    } else {
        hits as f64 / total as f64 * 100.0
    }
}

fn file_score(stems: &[String]) -> f64 {
    let kebab = stems
        .iter()
        .filter(|s| classify(s) == NamingStyle::KebabCase)
        .count();
    ratio_score(kebab, stems.len())
}
