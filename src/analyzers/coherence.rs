use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::core::artifacts::{ScreenFlow, UseCase};
use crate::core::collection::ArtifactCollection;
use crate::core::types::Severity;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum CoherenceIssueKind {
    ScreenSequenceMismatch,
    TransitionMissing,
    StartScreenMismatch,
    EndScreenMismatch,
    PrerequisiteUsecaseMissing,
    PrerequisitePriorityMismatch,
    PrerequisiteCircularDependency,
    UnresolvedReference,
    DuplicateStepId,
    ReturnTargetMissing,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoherenceIssue {
    pub kind: CoherenceIssueKind,
    pub severity: Severity,
    pub use_case_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screen_flow_id: Option<String>,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoherenceValidationResult {
    pub valid: bool,
    pub total_use_cases: usize,
    pub total_screen_flows: usize,
    pub total_issues: usize,
    pub issues: Vec<CoherenceIssue>,
    pub issues_by_severity: BTreeMap<Severity, usize>,
    pub issues_by_use_case: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FlowDesignLevel {
    Info,
    Warning,
}

/// Step-count observation. Informational only; never feeds any score.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowDesignNote {
    pub use_case_id: String,
    pub step_count: usize,
    pub level: FlowDesignLevel,
    pub message: String,
}

/// Cross-artifact consistency between use cases and their screen flows, plus
/// reference resolution and prerequisite sanity.
pub struct CoherenceValidator;

impl CoherenceValidator {
    pub fn new() -> Self {
        Self
    }

    pub fn validate(&self, collection: &ArtifactCollection) -> CoherenceValidationResult {
        let mut issues = Vec::new();

        for uc in collection.use_cases() {
            self.check_references(uc, collection, &mut issues);
            self.check_step_ids(uc, &mut issues);
            self.check_prerequisites(uc, collection, &mut issues);
            for flow in collection.flows_for_use_case(&uc.id) {
                self.check_flow_coherence(uc, flow, &mut issues);
            }
        }
        for flow in collection.screen_flows() {
            if collection.use_case(&flow.related_use_case.id).is_none() {
                issues.push(CoherenceIssue {
                    kind: CoherenceIssueKind::UnresolvedReference,
                    severity: Severity::High,
                    use_case_id: flow.related_use_case.id.clone(),
                    screen_flow_id: Some(flow.id.clone()),
                    description: format!(
                        "screen flow '{}' relates to unknown use case '{}'",
                        flow.id, flow.related_use_case.id
                    ),
                });
            }
        }

        let mut issues_by_severity = BTreeMap::new();
        let mut issues_by_use_case = BTreeMap::new();
        for issue in &issues {
            *issues_by_severity.entry(issue.severity).or_insert(0) += 1;
            *issues_by_use_case
                .entry(issue.use_case_id.clone())
                .or_insert(0) += 1;
        }

        CoherenceValidationResult {
            valid: issues.is_empty(),
            total_use_cases: collection.use_cases().len(),
            total_screen_flows: collection.screen_flows().len(),
            total_issues: issues.len(),
            issues,
            issues_by_severity,
            issues_by_use_case,
        }
    }

    /// Step-count classification per use case: a one-step flow may be a
    /// legitimate notification; a very long one probably wants splitting.
    pub fn flow_design_info(&self, collection: &ArtifactCollection) -> Vec<FlowDesignNote> {
        let mut notes = Vec::new();
        for uc in collection.use_cases() {
            let step_count = uc.main_flow.len();
            if step_count == 1 {
                notes.push(FlowDesignNote {
                    use_case_id: uc.id.clone(),
                    step_count,
                    level: FlowDesignLevel::Info,
                    message: "single-step flow; a simple notification or read-only flow may be fine"
                        .to_string(),
                });
            } else if step_count > 15 {
                notes.push(FlowDesignNote {
                    use_case_id: uc.id.clone(),
                    step_count,
                    level: FlowDesignLevel::Warning,
                    message: format!(
                        "main flow has {} steps; consider splitting the use case",
                        step_count
                    ),
                });
            }
        }
        notes
    }

    fn check_references(
        &self,
        uc: &UseCase,
        collection: &ArtifactCollection,
        issues: &mut Vec<CoherenceIssue>,
    ) {
        let unresolved = |expected: &str, id: &str| CoherenceIssue {
            kind: CoherenceIssueKind::UnresolvedReference,
            severity: Severity::High,
            use_case_id: uc.id.clone(),
            screen_flow_id: None,
            description: format!("reference to unknown {} '{}'", expected, id),
        };

        if let Some(primary) = &uc.actors.primary {
            if collection.actor(&primary.id).is_none() {
                issues.push(unresolved("actor", &primary.id));
            }
        }
        for secondary in &uc.actors.secondary {
            if collection.actor(&secondary.id).is_none() {
                issues.push(unresolved("actor", &secondary.id));
            }
        }
        for step in &uc.main_flow {
            if let Some(screen) = &step.screen {
                if collection.screen(&screen.id).is_none() {
                    issues.push(unresolved("screen", &screen.id));
                }
            }
            for rule in &step.validation_rules {
                if collection.validation_rule(&rule.id).is_none() {
                    issues.push(unresolved("validation rule", &rule.id));
                }
            }
        }
        if let Some(coverage) = &uc.business_requirement_coverage {
            if collection.business_requirement(&coverage.requirement.id).is_none() {
                issues.push(unresolved("business requirement", &coverage.requirement.id));
            }
            for goal in &coverage.business_goals {
                if collection.resolve_business_goal(&goal.id).is_none() {
                    issues.push(unresolved("business goal", &goal.id));
                }
            }
        }
        for rule in &uc.business_rules {
            if collection.resolve_business_rule(&rule.id).is_none() {
                issues.push(unresolved("business rule", &rule.id));
            }
        }
        for policy in &uc.security_policies {
            if collection.resolve_security_policy(&policy.id).is_none() {
                issues.push(unresolved("security policy", &policy.id));
            }
        }
    }

    fn check_step_ids(&self, uc: &UseCase, issues: &mut Vec<CoherenceIssue>) {
        let mut seen = HashSet::new();
        for step_id in uc.main_flow_step_ids() {
            if !seen.insert(step_id) {
                issues.push(CoherenceIssue {
                    kind: CoherenceIssueKind::DuplicateStepId,
                    severity: Severity::Medium,
                    use_case_id: uc.id.clone(),
                    screen_flow_id: None,
                    description: format!("stepId '{}' appears more than once", step_id),
                });
            }
        }
        for flow in &uc.alternative_flows {
            if let Some(target) = &flow.return_to_step_id {
                if !seen.contains(target.as_str()) {
                    issues.push(CoherenceIssue {
                        kind: CoherenceIssueKind::ReturnTargetMissing,
                        severity: Severity::High,
                        use_case_id: uc.id.clone(),
                        screen_flow_id: None,
                        description: format!(
                            "alternative flow '{}' returns to unknown stepId '{}'",
                            flow.id, target
                        ),
                    });
                }
            }
        }
    }

    fn check_prerequisites(
        &self,
        uc: &UseCase,
        collection: &ArtifactCollection,
        issues: &mut Vec<CoherenceIssue>,
    ) {
        for prerequisite in &uc.prerequisite_use_cases {
            let Some(target) = collection.use_case(&prerequisite.id) else {
                issues.push(CoherenceIssue {
                    kind: CoherenceIssueKind::PrerequisiteUsecaseMissing,
                    severity: Severity::High,
                    use_case_id: uc.id.clone(),
                    screen_flow_id: None,
                    description: format!(
                        "prerequisite use case '{}' does not exist",
                        prerequisite.id
                    ),
                });
                continue;
            };

            if let (Some(own), Some(required)) = (uc.priority, target.priority) {
                if required < own {
                    issues.push(CoherenceIssue {
                        kind: CoherenceIssueKind::PrerequisitePriorityMismatch,
                        severity: Severity::Medium,
                        use_case_id: uc.id.clone(),
                        screen_flow_id: None,
                        description: format!(
                            "prerequisite '{}' has priority {} below this use case's {}",
                            prerequisite.id, required, own
                        ),
                    });
                }
            }

            if reaches(collection, &prerequisite.id, &uc.id, &mut HashSet::new()) {
                issues.push(CoherenceIssue {
                    kind: CoherenceIssueKind::PrerequisiteCircularDependency,
                    severity: Severity::High,
                    use_case_id: uc.id.clone(),
                    screen_flow_id: None,
                    description: format!(
                        "prerequisite chain from '{}' leads back to '{}'",
                        prerequisite.id, uc.id
                    ),
                });
            }
        }
    }

    fn check_flow_coherence(
        &self,
        uc: &UseCase,
        flow: &ScreenFlow,
        issues: &mut Vec<CoherenceIssue>,
    ) {
        let uc_screens = trim_cyclic_suffix(uc.screen_sequence());
        let flow_screens = flow.screens();

        if !same_screen_set(&uc_screens, &flow_screens) {
            issues.push(CoherenceIssue {
                kind: CoherenceIssueKind::ScreenSequenceMismatch,
                severity: Severity::High,
                use_case_id: uc.id.clone(),
                screen_flow_id: Some(flow.id.clone()),
                description: format!(
                    "main-flow screens [{}] differ from flow screens [{}]",
                    uc_screens.join(", "),
                    flow_screens.join(", ")
                ),
            });
        }

        for pair in uc.main_flow.windows(2) {
            let (Some(from), Some(to)) = (&pair[0].screen, &pair[1].screen) else {
                continue;
            };
            if from.id != to.id && !flow.has_transition(&from.id, &to.id) {
                issues.push(CoherenceIssue {
                    kind: CoherenceIssueKind::TransitionMissing,
                    severity: Severity::High,
                    use_case_id: uc.id.clone(),
                    screen_flow_id: Some(flow.id.clone()),
                    description: format!(
                        "no transition from '{}' to '{}' although consecutive steps move between them",
                        from.id, to.id
                    ),
                });
            }
        }

        // Authored boundary screens win over the derived sets; when they are
        // omitted, the in-degree-0 / out-degree-0 sets are authoritative and
        // there is nothing to cross-check.
        let sequence = uc.screen_sequence();
        if let (Some(start), Some(first)) = (&flow.start_screen, sequence.first()) {
            if &start.id != first {
                issues.push(CoherenceIssue {
                    kind: CoherenceIssueKind::StartScreenMismatch,
                    severity: Severity::Medium,
                    use_case_id: uc.id.clone(),
                    screen_flow_id: Some(flow.id.clone()),
                    description: format!(
                        "flow declares start screen '{}' but the main flow begins on '{}'",
                        start.id, first
                    ),
                });
            }
        }
        if let Some(last) = sequence.last() {
            if !flow.end_screens.is_empty()
                && !flow.end_screens.iter().any(|e| &e.id == last)
            {
                issues.push(CoherenceIssue {
                    kind: CoherenceIssueKind::EndScreenMismatch,
                    severity: Severity::Medium,
                    use_case_id: uc.id.clone(),
                    screen_flow_id: Some(flow.id.clone()),
                    description: format!(
                        "main flow ends on '{}', which is not among the declared end screens",
                        last
                    ),
                });
            }
        }
    }
}

impl Default for CoherenceValidator {
    fn default() -> Self {
        Self::new()
    }
}

/// DFS over prerequisite edges. The visited set makes malformed cyclic data
/// terminate instead of recursing forever.
fn reaches<'a>(
    collection: &'a ArtifactCollection,
    from: &'a str,
    target: &str,
    visited: &mut HashSet<&'a str>,
) -> bool {
    if from == target {
        return true;
    }
    if !visited.insert(from) {
        return false;
    }
    let Some(uc) = collection.use_case(from) else {
        return false;
    };
    uc.prerequisite_use_cases
        .iter()
        .any(|p| reaches(collection, &p.id, target, visited))
}

/// Drops a trailing screen that loops back to the first one so that
/// list -> detail -> list compares as {list, detail}.
pub fn trim_cyclic_suffix(mut sequence: Vec<String>) -> Vec<String> {
    if sequence.len() > 1 && sequence.first() == sequence.last() {
        sequence.pop();
    }
    sequence
}

fn same_screen_set(a: &[String], b: &[String]) -> bool {
    let left: std::collections::BTreeSet<&str> = a.iter().map(|s| s.as_str()).collect();
    let right: std::collections::BTreeSet<&str> = b.iter().map(|s| s.as_str()).collect();
    left == right
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::artifacts::Artifact;

    fn artifact(value: serde_json::Value) -> Artifact {
        serde_json::from_value(value).unwrap()
    }

    fn use_case_with_screens(id: &str, screens: &[&str]) -> serde_json::Value {
        let steps: Vec<serde_json::Value> = screens
            .iter()
            .enumerate()
            .map(|(i, s)| {
                serde_json::json!({
                    "stepId": format!("step-{}", i),
                    "action": "do something",
                    "expectedResult": "it happened",
                    "screen": { "id": s },
                })
            })
            .collect();
        serde_json::json!({
            "type": "usecase",
            "id": id,
            "name": id,
            "mainFlow": steps,
        })
    }

    fn screens(ids: &[&str]) -> Vec<Artifact> {
        ids.iter()
            .map(|id| {
                artifact(serde_json::json!({
                    "type": "screen", "id": id, "name": id,
                }))
            })
            .collect()
    }

    #[test]
    fn test_missing_prerequisite_is_high_severity() {
        let collection = ArtifactCollection::from_artifacts(vec![artifact(serde_json::json!({
            "type": "usecase",
            "id": "uc-x",
            "name": "X",
            "mainFlow": [],
            "prerequisiteUseCases": [{ "id": "uc-y" }],
        }))]);
        let result = CoherenceValidator::new().validate(&collection);
        let issue = result
            .issues
            .iter()
            .find(|i| i.kind == CoherenceIssueKind::PrerequisiteUsecaseMissing)
            .unwrap();
        assert_eq!(issue.severity, Severity::High);
        assert_eq!(issue.use_case_id, "uc-x");
    }

    #[test]
    fn test_prerequisite_priority_mismatch() {
        let collection = ArtifactCollection::from_artifacts(vec![
            artifact(serde_json::json!({
                "type": "usecase", "id": "uc-a", "name": "A", "priority": "critical",
                "mainFlow": [], "prerequisiteUseCases": [{ "id": "uc-b" }],
            })),
            artifact(serde_json::json!({
                "type": "usecase", "id": "uc-b", "name": "B", "priority": "low", "mainFlow": [],
            })),
        ]);
        let result = CoherenceValidator::new().validate(&collection);
        assert!(result
            .issues
            .iter()
            .any(|i| i.kind == CoherenceIssueKind::PrerequisitePriorityMismatch));
    }

    #[test]
    fn test_prerequisite_cycle_detected_symmetrically() {
        let collection = ArtifactCollection::from_artifacts(vec![
            artifact(serde_json::json!({
                "type": "usecase", "id": "uc-a", "name": "A", "mainFlow": [],
                "prerequisiteUseCases": [{ "id": "uc-b" }],
            })),
            artifact(serde_json::json!({
                "type": "usecase", "id": "uc-b", "name": "B", "mainFlow": [],
                "prerequisiteUseCases": [{ "id": "uc-a" }],
            })),
        ]);
        let result = CoherenceValidator::new().validate(&collection);
        let cycle_issues: Vec<_> = result
            .issues
            .iter()
            .filter(|i| i.kind == CoherenceIssueKind::PrerequisiteCircularDependency)
            .collect();
        // Both directions report the loop.
        assert_eq!(cycle_issues.len(), 2);
    }

    #[test]
    fn test_matching_flow_produces_no_sequence_issue() {
        let mut artifacts = screens(&["list", "detail"]);
        artifacts.push(artifact(use_case_with_screens("uc-browse", &["list", "detail", "list"])));
        artifacts.push(artifact(serde_json::json!({
            "type": "screen-flow",
            "id": "flow-browse",
            "name": "Browse",
            "relatedUseCase": { "id": "uc-browse" },
            "transitions": [
                { "from": { "id": "list" }, "to": { "id": "detail" },
                  "trigger": { "screenId": "list", "actionId": "open" } },
                { "from": { "id": "detail" }, "to": { "id": "list" },
                  "trigger": { "screenId": "detail", "actionId": "back" } }
            ],
        })));
        let collection = ArtifactCollection::from_artifacts(artifacts);
        let result = CoherenceValidator::new().validate(&collection);
        assert!(
            !result
                .issues
                .iter()
                .any(|i| i.kind == CoherenceIssueKind::ScreenSequenceMismatch),
            "{:?}",
            result.issues
        );
    }

    #[test]
    fn test_screen_sequence_mismatch() {
        let mut artifacts = screens(&["list", "detail", "other"]);
        artifacts.push(artifact(use_case_with_screens("uc-browse", &["list", "detail"])));
        artifacts.push(artifact(serde_json::json!({
            "type": "screen-flow",
            "id": "flow-browse",
            "name": "Browse",
            "relatedUseCase": { "id": "uc-browse" },
            "transitions": [
                { "from": { "id": "list" }, "to": { "id": "other" },
                  "trigger": { "screenId": "list", "actionId": "open" } }
            ],
        })));
        let collection = ArtifactCollection::from_artifacts(artifacts);
        let result = CoherenceValidator::new().validate(&collection);
        let issue = result
            .issues
            .iter()
            .find(|i| i.kind == CoherenceIssueKind::ScreenSequenceMismatch)
            .unwrap();
        assert_eq!(issue.severity, Severity::High);
    }

    #[test]
    fn test_transition_missing() {
        let mut artifacts = screens(&["a", "b"]);
        artifacts.push(artifact(use_case_with_screens("uc-1", &["a", "b"])));
        artifacts.push(artifact(serde_json::json!({
            "type": "screen-flow",
            "id": "flow-1",
            "name": "Flow",
            "relatedUseCase": { "id": "uc-1" },
            "transitions": [
                { "from": { "id": "b" }, "to": { "id": "a" },
                  "trigger": { "screenId": "b", "actionId": "back" } }
            ],
        })));
        let collection = ArtifactCollection::from_artifacts(artifacts);
        let result = CoherenceValidator::new().validate(&collection);
        assert!(result
            .issues
            .iter()
            .any(|i| i.kind == CoherenceIssueKind::TransitionMissing));
    }

    #[test]
    fn test_boundary_screen_checks() {
        let mut artifacts = screens(&["a", "b"]);
        artifacts.push(artifact(use_case_with_screens("uc-1", &["a", "b"])));
        artifacts.push(artifact(serde_json::json!({
            "type": "screen-flow",
            "id": "flow-1",
            "name": "Flow",
            "relatedUseCase": { "id": "uc-1" },
            "startScreen": { "id": "b" },
            "endScreens": [{ "id": "a" }],
            "transitions": [
                { "from": { "id": "a" }, "to": { "id": "b" },
                  "trigger": { "screenId": "a", "actionId": "next" } }
            ],
        })));
        let collection = ArtifactCollection::from_artifacts(artifacts);
        let result = CoherenceValidator::new().validate(&collection);
        assert!(result
            .issues
            .iter()
            .any(|i| i.kind == CoherenceIssueKind::StartScreenMismatch
                && i.severity == Severity::Medium));
        assert!(result
            .issues
            .iter()
            .any(|i| i.kind == CoherenceIssueKind::EndScreenMismatch));
    }

    #[test]
    fn test_flow_design_info_thresholds() {
        let single = use_case_with_screens("uc-single", &["a"]);
        let long_screens: Vec<String> = (0..16).map(|i| format!("s{}", i)).collect();
        let long_refs: Vec<&str> = long_screens.iter().map(|s| s.as_str()).collect();
        let long = use_case_with_screens("uc-long", &long_refs);
        let two = use_case_with_screens("uc-two", &["a", "b"]);

        let collection = ArtifactCollection::from_artifacts(vec![
            artifact(single),
            artifact(long),
            artifact(two),
        ]);
        let notes = CoherenceValidator::new().flow_design_info(&collection);
        assert_eq!(notes.len(), 2);
        assert!(notes
            .iter()
            .any(|n| n.use_case_id == "uc-single" && n.level == FlowDesignLevel::Info));
        assert!(notes
            .iter()
            .any(|n| n.use_case_id == "uc-long" && n.level == FlowDesignLevel::Warning));
    }

    #[test]
    fn test_return_target_and_duplicate_step_ids() {
        let collection = ArtifactCollection::from_artifacts(vec![artifact(serde_json::json!({
            "type": "usecase",
            "id": "uc-1",
            "name": "UC",
            "mainFlow": [
                { "stepId": "one", "action": "do it", "expectedResult": "done" },
                { "stepId": "one", "action": "again", "expectedResult": "done" }
            ],
            "alternativeFlows": [
                { "id": "alt-1", "name": "Alt", "condition": "error",
                  "steps": [], "returnToStepId": "missing" }
            ],
        }))]);
        let result = CoherenceValidator::new().validate(&collection);
        assert!(result
            .issues
            .iter()
            .any(|i| i.kind == CoherenceIssueKind::DuplicateStepId));
        assert!(result
            .issues
            .iter()
            .any(|i| i.kind == CoherenceIssueKind::ReturnTargetMissing));
    }

    #[test]
    fn test_unrelated_flow_use_case_reported() {
        let collection = ArtifactCollection::from_artifacts(vec![artifact(serde_json::json!({
            "type": "screen-flow",
            "id": "flow-orphan",
            "name": "Orphan",
            "relatedUseCase": { "id": "uc-ghost" },
            "transitions": [],
        }))]);
        let result = CoherenceValidator::new().validate(&collection);
        assert_eq!(result.total_issues, 1);
        assert!(!result.valid);
        assert_eq!(result.issues[0].kind, CoherenceIssueKind::UnresolvedReference);
    }

    #[test]
    fn test_trim_cyclic_suffix() {
        let trimmed = trim_cyclic_suffix(vec![
            "a".to_string(),
            "b".to_string(),
            "a".to_string(),
        ]);
        assert_eq!(trimmed, vec!["a", "b"]);
        let untouched = trim_cyclic_suffix(vec!["a".to_string(), "b".to_string()]);
        assert_eq!(untouched, vec!["a", "b"]);
    }
}
