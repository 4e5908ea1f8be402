pub mod criteria;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::collection::ArtifactCollection;
use crate::core::types::{Dimension, EffortBucket, ElementType, Priority};

pub use criteria::{Criterion, CriterionOutcome, CriterionRegistry, ElementRef};

/// Outcome of a single criterion against a single element.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CriterionResult {
    pub criterion_id: String,
    pub level: u8,
    pub dimension: Dimension,
    pub required: bool,
    pub weight: f64,
    pub satisfied: bool,
    pub evidence: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionAssessment {
    pub dimension: Dimension,
    pub completion_rate: f64,
    /// Maximum level with a satisfied criterion in this dimension. Unlike the
    /// overall level, dimensions have no required chain, so levels may skip.
    pub level: u8,
    pub satisfied_count: usize,
    pub total_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextStep {
    pub priority: Priority,
    pub criterion_id: String,
    pub description: String,
    pub dimension: Dimension,
    pub level: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementAssessment {
    pub element_id: String,
    pub element_name: String,
    pub element_type: ElementType,
    pub overall_level: u8,
    pub overall_completion_rate: f64,
    pub criteria: Vec<CriterionResult>,
    pub dimensions: Vec<DimensionAssessment>,
    pub next_steps: Vec<NextStep>,
    pub estimated_effort: EffortBucket,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionAggregate {
    pub dimension: Dimension,
    pub completion_rate: f64,
    pub current_level: u8,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessedElements {
    pub business_requirements: Vec<ElementAssessment>,
    pub actors: Vec<ElementAssessment>,
    pub use_cases: Vec<ElementAssessment>,
}

impl AssessedElements {
    pub fn iter(&self) -> impl Iterator<Item = &ElementAssessment> {
        self.business_requirements
            .iter()
            .chain(self.actors.iter())
            .chain(self.use_cases.iter())
    }

    pub fn len(&self) -> usize {
        self.business_requirements.len() + self.actors.len() + self.use_cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// CMMI-style project assessment over all scorable elements.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMaturityAssessment {
    pub timestamp: DateTime<Utc>,
    pub project_level: u8,
    pub elements: AssessedElements,
    pub overall_dimensions: Vec<DimensionAggregate>,
    pub strengths: Vec<Dimension>,
    pub improvement_areas: Vec<Dimension>,
    pub recommended_actions: Vec<String>,
    pub distribution: BTreeMap<u8, usize>,
}

impl ProjectMaturityAssessment {
    pub fn overall_completion_rate(&self) -> f64 {
        if self.elements.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.elements.iter().map(|e| e.overall_completion_rate).sum();
        sum / self.elements.len() as f64
    }

    pub fn unsatisfied_criteria_count(&self) -> usize {
        self.elements
            .iter()
            .map(|e| e.criteria.iter().filter(|c| !c.satisfied).count())
            .sum()
    }

    pub fn dimension_rate(&self, dimension: Dimension) -> f64 {
        self.overall_dimensions
            .iter()
            .find(|d| d.dimension == dimension)
            .map(|d| d.completion_rate)
            .unwrap_or(0.0)
    }
}

/// Evaluates the criterion registry against every scorable element and
/// aggregates the weakest-link project level.
pub struct MaturityAssessor {
    registry: CriterionRegistry,
}

impl MaturityAssessor {
    pub fn new() -> Self {
        Self {
            registry: CriterionRegistry::standard(),
        }
    }

    pub fn registry(&self) -> &CriterionRegistry {
        &self.registry
    }

    pub fn assess_element(
        &self,
        element: ElementRef<'_>,
        collection: &ArtifactCollection,
    ) -> ElementAssessment {
        let element_type = element.element_type();
        let criteria: Vec<CriterionResult> = self
            .registry
            .for_element(element_type)
            .map(|criterion| {
                let outcome = criterion.evaluate(element, collection);
                CriterionResult {
                    criterion_id: criterion.id.to_string(),
                    level: criterion.level,
                    dimension: criterion.dimension,
                    required: criterion.required,
                    weight: criterion.weight,
                    satisfied: outcome.satisfied,
                    evidence: outcome.evidence,
                    description: criterion.description.to_string(),
                }
            })
            .collect();

        let overall_level = Self::overall_level(&criteria);
        let overall_completion_rate = Self::weighted_rate(criteria.iter());
        let dimensions = Self::dimension_assessments(&criteria);
        let next_steps = Self::next_steps(&criteria, &dimensions, overall_level);
        let unsatisfied = criteria.iter().filter(|c| !c.satisfied).count();

        ElementAssessment {
            element_id: element.id().to_string(),
            element_name: element.name().to_string(),
            element_type,
            overall_level,
            overall_completion_rate,
            criteria,
            dimensions,
            next_steps,
            estimated_effort: EffortBucket::from_unsatisfied_count(unsatisfied),
        }
    }

    pub fn assess_project(&self, collection: &ArtifactCollection) -> ProjectMaturityAssessment {
        let mut elements = AssessedElements::default();
        for req in collection.business_requirements() {
            elements
                .business_requirements
                .push(self.assess_element(ElementRef::BusinessRequirement(req), collection));
        }
        for actor in collection.actors() {
            elements
                .actors
                .push(self.assess_element(ElementRef::Actor(actor), collection));
        }
        for uc in collection.use_cases() {
            elements
                .use_cases
                .push(self.assess_element(ElementRef::UseCase(uc), collection));
        }

        let project_level = elements.iter().map(|e| e.overall_level).min().unwrap_or(1);

        let mut distribution: BTreeMap<u8, usize> = (1..=5).map(|l| (l, 0)).collect();
        for element in elements.iter() {
            *distribution.entry(element.overall_level).or_insert(0) += 1;
        }

        let overall_dimensions = Self::aggregate_dimensions(&elements);
        let strengths = overall_dimensions
            .iter()
            .filter(|d| d.completion_rate >= 0.8)
            .map(|d| d.dimension)
            .collect();
        let improvement_areas: Vec<Dimension> = overall_dimensions
            .iter()
            .filter(|d| d.completion_rate < 0.6)
            .map(|d| d.dimension)
            .collect();

        let recommended_actions =
            Self::recommended_actions(&elements, &overall_dimensions, project_level);

        ProjectMaturityAssessment {
            timestamp: Utc::now(),
            project_level,
            elements,
            overall_dimensions,
            strengths,
            improvement_areas,
            recommended_actions,
            distribution,
        }
    }

    /// Starting at level 1, advance one level at a time while every required
    /// criterion of the next level is satisfied. No skipping.
    fn overall_level(criteria: &[CriterionResult]) -> u8 {
        let mut level = 1u8;
        for candidate in 2..=5u8 {
            let all_required_met = criteria
                .iter()
                .filter(|c| c.level == candidate && c.required)
                .all(|c| c.satisfied);
            if all_required_met {
                level = candidate;
            } else {
                break;
            }
        }
        level
    }

    fn weighted_rate<'a>(criteria: impl Iterator<Item = &'a CriterionResult>) -> f64 {
        let mut satisfied = 0.0;
        let mut total = 0.0;
        for c in criteria {
            total += c.weight;
            if c.satisfied {
                satisfied += c.weight;
            }
        }
        if total == 0.0 { 0.0 } else { satisfied / total }
    }

    fn dimension_assessments(criteria: &[CriterionResult]) -> Vec<DimensionAssessment> {
        Dimension::ALL
            .iter()
            .filter_map(|&dimension| {
                let in_dimension: Vec<&CriterionResult> =
                    criteria.iter().filter(|c| c.dimension == dimension).collect();
                if in_dimension.is_empty() {
                    return None;
                }
                let completion_rate = Self::weighted_rate(in_dimension.iter().copied());
                let level = in_dimension
                    .iter()
                    .filter(|c| c.satisfied)
                    .map(|c| c.level)
                    .max()
                    .unwrap_or(0);
                Some(DimensionAssessment {
                    dimension,
                    completion_rate,
                    level,
                    satisfied_count: in_dimension.iter().filter(|c| c.satisfied).count(),
                    total_count: in_dimension.len(),
                })
            })
            .collect()
    }

    /// Up to five prioritized actions: required gaps at the next level first,
    /// then the heaviest unsatisfied criterion of up to two weak dimensions.
    fn next_steps(
        criteria: &[CriterionResult],
        dimensions: &[DimensionAssessment],
        overall_level: u8,
    ) -> Vec<NextStep> {
        let mut steps = Vec::new();

        if overall_level < 5 {
            let next_level = overall_level + 1;
            let mut gaps: Vec<&CriterionResult> = criteria
                .iter()
                .filter(|c| c.level == next_level && c.required && !c.satisfied)
                .collect();
            gaps.sort_by(|a, b| {
                b.weight
                    .partial_cmp(&a.weight)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| a.criterion_id.cmp(&b.criterion_id))
            });
            for gap in gaps {
                steps.push(NextStep {
                    priority: Priority::High,
                    criterion_id: gap.criterion_id.clone(),
                    description: gap.description.clone(),
                    dimension: gap.dimension,
                    level: gap.level,
                });
            }
        }

        let mut weak: Vec<&DimensionAssessment> = dimensions
            .iter()
            .filter(|d| d.completion_rate < 0.7)
            .collect();
        weak.sort_by(|a, b| {
            a.completion_rate
                .partial_cmp(&b.completion_rate)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        for dimension in weak.into_iter().take(2) {
            let heaviest = criteria
                .iter()
                .filter(|c| c.dimension == dimension.dimension && !c.satisfied)
                .max_by(|a, b| {
                    a.weight
                        .partial_cmp(&b.weight)
                        .unwrap_or(std::cmp::Ordering::Equal)
                        .then_with(|| b.criterion_id.cmp(&a.criterion_id))
                });
            if let Some(criterion) = heaviest {
                if steps.iter().any(|s: &NextStep| s.criterion_id == criterion.criterion_id) {
                    continue;
                }
                steps.push(NextStep {
                    priority: Priority::Medium,
                    criterion_id: criterion.criterion_id.clone(),
                    description: criterion.description.clone(),
                    dimension: criterion.dimension,
                    level: criterion.level,
                });
            }
        }

        steps.truncate(5);
        steps
    }

    fn aggregate_dimensions(elements: &AssessedElements) -> Vec<DimensionAggregate> {
        Dimension::ALL
            .iter()
            .filter_map(|&dimension| {
                let rates: Vec<(f64, u8)> = elements
                    .iter()
                    .filter_map(|e| {
                        e.dimensions
                            .iter()
                            .find(|d| d.dimension == dimension)
                            .map(|d| (d.completion_rate, d.level))
                    })
                    .collect();
                if rates.is_empty() {
                    return None;
                }
                let completion_rate =
                    rates.iter().map(|(r, _)| r).sum::<f64>() / rates.len() as f64;
                let current_level = rates.iter().map(|(_, l)| *l).min().unwrap_or(0);
                Some(DimensionAggregate {
                    dimension,
                    completion_rate,
                    current_level,
                })
            })
            .collect()
    }

    fn recommended_actions(
        elements: &AssessedElements,
        dimensions: &[DimensionAggregate],
        project_level: u8,
    ) -> Vec<String> {
        let mut actions = Vec::new();
        if !elements.is_empty() {
            let cohort = elements
                .iter()
                .filter(|e| e.overall_level == project_level)
                .count();
            if project_level < 5 {
                actions.push(format!(
                    "Raise the {} element(s) currently at level {} to level {}",
                    cohort,
                    project_level,
                    project_level + 1
                ));
            }
        }
        if let Some(weakest) = dimensions.iter().min_by(|a, b| {
            a.completion_rate
                .partial_cmp(&b.completion_rate)
                .unwrap_or(std::cmp::Ordering::Equal)
        }) {
            actions.push(format!(
                "Strengthen the {} dimension (completion {:.0}%)",
                weakest.dimension,
                weakest.completion_rate * 100.0
            ));
        }
        actions
    }
}

impl Default for MaturityAssessor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::artifacts::Artifact;

    fn artifact(value: serde_json::Value) -> Artifact {
        serde_json::from_value(value).unwrap()
    }

    /// The two-step authentication scenario: per-step quality, not step
    /// count, is what gates level 2.
    fn auth_collection() -> ArtifactCollection {
        ArtifactCollection::from_artifacts(vec![
            artifact(serde_json::json!({
                "type": "actor",
                "id": "actor-001",
                "name": "Registered User",
                "role": "primary",
                "responsibilities": ["login"],
                "goals": ["authenticate"],
                "description": "A registered user of the service who signs in with previously issued credentials to reach their account.",
            })),
            artifact(serde_json::json!({
                "type": "usecase",
                "id": "uc-auth",
                "name": "Authenticate",
                "description": "A registered user signs in with valid account credentials.",
                "priority": "high",
                "preconditions": ["user has account"],
                "postconditions": ["session established"],
                "actors": { "primary": { "id": "actor-001" } },
                "mainFlow": [
                    {
                        "stepId": "enter",
                        "actor": { "id": "actor-001" },
                        "action": "enter credentials",
                        "expectedResult": "credentials accepted"
                    },
                    {
                        "stepId": "confirm",
                        "actor": { "id": "actor-001" },
                        "action": "submit form",
                        "expectedResult": "session created"
                    }
                ],
            })),
        ])
    }

    #[test]
    fn test_two_step_authentication_reaches_level_two() {
        let collection = auth_collection();
        let assessor = MaturityAssessor::new();
        let uc = collection.use_case("uc-auth").unwrap();
        let assessment = assessor.assess_element(ElementRef::UseCase(uc), &collection);
        assert_eq!(assessment.overall_level, 2);
    }

    #[test]
    fn test_level_advance_stops_at_first_gap() {
        let collection = auth_collection();
        let assessor = MaturityAssessor::new();
        let uc = collection.use_case("uc-auth").unwrap();
        let assessment = assessor.assess_element(ElementRef::UseCase(uc), &collection);
        // Level 3 requires alternative flows and coverage; neither is present.
        let level3_required_gap = assessment
            .criteria
            .iter()
            .any(|c| c.level == 3 && c.required && !c.satisfied);
        assert!(level3_required_gap);
        assert!(assessment.overall_level < 3);
    }

    #[test]
    fn test_project_level_is_weakest_link() {
        let collection = auth_collection();
        let assessor = MaturityAssessor::new();
        let project = assessor.assess_project(&collection);
        let min_level = project.elements.iter().map(|e| e.overall_level).min().unwrap();
        assert_eq!(project.project_level, min_level);
        let total: usize = project.distribution.values().sum();
        assert_eq!(total, project.elements.len());
    }

    #[test]
    fn test_next_steps_capped_and_prioritized() {
        let collection = ArtifactCollection::from_artifacts(vec![artifact(serde_json::json!({
            "type": "usecase",
            "id": "uc-bare",
            "name": "Bare",
            "mainFlow": [],
        }))]);
        let assessor = MaturityAssessor::new();
        let uc = collection.use_case("uc-bare").unwrap();
        let assessment = assessor.assess_element(ElementRef::UseCase(uc), &collection);

        assert!(assessment.next_steps.len() <= 5);
        assert!(!assessment.next_steps.is_empty());
        // High-priority gaps come first and target the next level up.
        assert_eq!(assessment.next_steps[0].priority, Priority::High);
        assert_eq!(assessment.next_steps[0].level, assessment.overall_level + 1);
        // Ordered by descending weight within the high group.
        let high_weights: Vec<f64> = assessment
            .next_steps
            .iter()
            .filter(|s| s.priority == Priority::High)
            .map(|s| {
                assessment
                    .criteria
                    .iter()
                    .find(|c| c.criterion_id == s.criterion_id)
                    .unwrap()
                    .weight
            })
            .collect();
        assert!(high_weights.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_step_order_does_not_change_scores() {
        let collection = auth_collection();
        let assessor = MaturityAssessor::new();
        let uc = collection.use_case("uc-auth").unwrap();
        let before = assessor.assess_element(ElementRef::UseCase(uc), &collection);

        let mut reordered = uc.clone();
        reordered.main_flow.reverse();
        let after = assessor.assess_element(ElementRef::UseCase(&reordered), &collection);

        assert_eq!(before.overall_level, after.overall_level);
        assert_eq!(before.overall_completion_rate, after.overall_completion_rate);
    }

    #[test]
    fn test_empty_collection_defaults_to_level_one() {
        let assessor = MaturityAssessor::new();
        let project = assessor.assess_project(&ArtifactCollection::default());
        assert_eq!(project.project_level, 1);
        assert!(project.elements.is_empty());
    }

    #[test]
    fn test_dimension_levels_may_skip() {
        // An element satisfying a level-4 criterion in a dimension gets that
        // dimension level even when lower-level criteria in it fail.
        let collection = ArtifactCollection::from_artifacts(vec![
            artifact(serde_json::json!({
                "type": "actor",
                "id": "actor-x",
                "name": "X",
            })),
            artifact(serde_json::json!({
                "type": "usecase",
                "id": "uc-1",
                "name": "UC",
                "actors": { "primary": { "id": "actor-x" } },
                "mainFlow": [],
            })),
        ]);
        let assessor = MaturityAssessor::new();
        let actor = collection.actor("actor-x").unwrap();
        let assessment = assessor.assess_element(ElementRef::Actor(actor), &collection);
        let traceability = assessment
            .dimensions
            .iter()
            .find(|d| d.dimension == Dimension::Traceability)
            .unwrap();
        // actor.usecase-coverage (level 4) is the only traceability criterion
        // and it is satisfied, so the dimension level skips straight to 4.
        assert_eq!(traceability.level, 4);
    }
}
