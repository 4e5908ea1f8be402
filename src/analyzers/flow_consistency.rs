use serde::{Deserialize, Serialize};

use crate::analyzers::coherence::trim_cyclic_suffix;
use crate::core::collection::ArtifactCollection;

const WEIGHT_SCREEN_ORDER: f64 = 0.3;
const WEIGHT_ACTIONS: f64 = 0.3;
const WEIGHT_TRIGGER_VALIDITY: f64 = 0.25;
const WEIGHT_COMPLETENESS: f64 = 0.15;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum FlowMismatchKind {
    ScreenOrderMismatch,
    MissingAction,
    ScreenMismatch,
    MissingScreen,
    IncompleteFlow,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowMismatch {
    pub kind: FlowMismatchKind,
    pub flow_id: String,
    pub detail: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowConsistencyResult {
    pub screen_order_score: f64,
    pub action_score: f64,
    pub trigger_score: f64,
    pub completeness_score: f64,
    pub overall_score: f64,
    pub mismatches: Vec<FlowMismatch>,
}

/// Screen-flow level consistency: transition triggers must name real actions
/// on the right screens, and flows should converge on a unique terminal.
pub struct FlowConsistencyValidator;

impl FlowConsistencyValidator {
    pub fn new() -> Self {
        Self
    }

    pub fn validate(&self, collection: &ArtifactCollection) -> FlowConsistencyResult {
        let mut mismatches = Vec::new();

        let screen_order_score = self.screen_order_score(collection, &mut mismatches);
        let action_score = self.action_score(collection, &mut mismatches);
        let trigger_score = self.trigger_score(collection, &mut mismatches);
        let completeness_score = self.completeness_score(collection, &mut mismatches);

        let overall_score = WEIGHT_SCREEN_ORDER * screen_order_score
            + WEIGHT_ACTIONS * action_score
            + WEIGHT_TRIGGER_VALIDITY * trigger_score
            + WEIGHT_COMPLETENESS * completeness_score;

        FlowConsistencyResult {
            screen_order_score,
            action_score,
            trigger_score,
            completeness_score,
            overall_score,
            mismatches,
        }
    }

    fn screen_order_score(
        &self,
        collection: &ArtifactCollection,
        mismatches: &mut Vec<FlowMismatch>,
    ) -> f64 {
        let mut total = 0usize;
        let mut matched = 0usize;
        for flow in collection.screen_flows() {
            let Some(uc) = collection.use_case(&flow.related_use_case.id) else {
                continue;
            };
            total += 1;
            let uc_screens: std::collections::BTreeSet<String> =
                trim_cyclic_suffix(uc.screen_sequence()).into_iter().collect();
            let flow_screens: std::collections::BTreeSet<String> =
                flow.screens().into_iter().collect();
            if uc_screens == flow_screens {
                matched += 1;
            } else {
                mismatches.push(FlowMismatch {
                    kind: FlowMismatchKind::ScreenOrderMismatch,
                    flow_id: flow.id.clone(),
                    detail: format!(
                        "use case '{}' walks [{}] but the flow covers [{}]",
                        uc.id,
                        uc_screens.iter().cloned().collect::<Vec<_>>().join(", "),
                        flow_screens.iter().cloned().collect::<Vec<_>>().join(", ")
                    ),
                });
            }
        }
        ratio(matched, total)
    }

    fn action_score(
        &self,
        collection: &ArtifactCollection,
        mismatches: &mut Vec<FlowMismatch>,
    ) -> f64 {
        let mut total = 0usize;
        let mut valid = 0usize;
        for flow in collection.screen_flows() {
            for transition in &flow.transitions {
                total += 1;
                let declared = collection
                    .screen(&transition.trigger.screen_id)
                    .map(|screen| screen.has_action(&transition.trigger.action_id))
                    .unwrap_or(false);
                if declared {
                    valid += 1;
                } else {
                    mismatches.push(FlowMismatch {
                        kind: FlowMismatchKind::MissingAction,
                        flow_id: flow.id.clone(),
                        detail: format!(
                            "screen '{}' declares no action '{}'",
                            transition.trigger.screen_id, transition.trigger.action_id
                        ),
                    });
                }
            }
        }
        ratio(valid, total)
    }

    fn trigger_score(
        &self,
        collection: &ArtifactCollection,
        mismatches: &mut Vec<FlowMismatch>,
    ) -> f64 {
        let mut total = 0usize;
        let mut valid = 0usize;
        for flow in collection.screen_flows() {
            for transition in &flow.transitions {
                total += 1;
                if collection.screen(&transition.trigger.screen_id).is_none() {
                    mismatches.push(FlowMismatch {
                        kind: FlowMismatchKind::MissingScreen,
                        flow_id: flow.id.clone(),
                        detail: format!(
                            "trigger references undeclared screen '{}'",
                            transition.trigger.screen_id
                        ),
                    });
                } else if transition.trigger.screen_id != transition.from.id {
                    mismatches.push(FlowMismatch {
                        kind: FlowMismatchKind::ScreenMismatch,
                        flow_id: flow.id.clone(),
                        detail: format!(
                            "trigger screen '{}' is not the transition source '{}'",
                            transition.trigger.screen_id, transition.from.id
                        ),
                    });
                } else {
                    valid += 1;
                }
            }
        }
        ratio(valid, total)
    }

    /// A flow is complete when it has at most one terminal screen
    /// (out-degree 0); several dead ends mean the flow leaks.
    fn completeness_score(
        &self,
        collection: &ArtifactCollection,
        mismatches: &mut Vec<FlowMismatch>,
    ) -> f64 {
        let mut total = 0usize;
        let mut complete = 0usize;
        for flow in collection.screen_flows() {
            total += 1;
            let dead_ends = flow.derived_end_screens();
            if dead_ends.len() <= 1 {
                complete += 1;
            } else {
                mismatches.push(FlowMismatch {
                    kind: FlowMismatchKind::IncompleteFlow,
                    flow_id: flow.id.clone(),
                    detail: format!(
                        "{} dead-end screens: [{}]",
                        dead_ends.len(),
                        dead_ends.join(", ")
                    ),
                });
            }
        }
        ratio(complete, total)
    }
}

impl Default for FlowConsistencyValidator {
    fn default() -> Self {
        Self::new()
    }
}

fn ratio(hits: usize, total: usize) -> f64 {
    if total == 0 {
        100.0
    } else {
        hits as f64 / total as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::artifacts::Artifact;

    fn artifact(value: serde_json::Value) -> Artifact {
        serde_json::from_value(value).unwrap()
    }

    fn screen(id: &str, actions: &[&str]) -> Artifact {
        let action_objs: Vec<serde_json::Value> = actions
            .iter()
            .map(|a| serde_json::json!({ "id": a, "label": a }))
            .collect();
        artifact(serde_json::json!({
            "type": "screen", "id": id, "name": id, "actions": action_objs,
        }))
    }

    fn consistent_artifacts() -> Vec<Artifact> {
        vec![
            screen("list", &["open"]),
            screen("detail", &["back"]),
            artifact(serde_json::json!({
                "type": "usecase",
                "id": "uc-browse",
                "name": "Browse",
                "mainFlow": [
                    { "stepId": "view", "action": "view list", "expectedResult": "shown",
                      "screen": { "id": "list" } },
                    { "stepId": "open", "action": "open item", "expectedResult": "shown",
                      "screen": { "id": "detail" } }
                ],
            })),
            artifact(serde_json::json!({
                "type": "screen-flow",
                "id": "flow-browse",
                "name": "Browse",
                "relatedUseCase": { "id": "uc-browse" },
                "transitions": [
                    { "from": { "id": "list" }, "to": { "id": "detail" },
                      "trigger": { "screenId": "list", "actionId": "open" } }
                ],
            })),
        ]
    }

    #[test]
    fn test_consistent_flow_scores_full() {
        let collection = ArtifactCollection::from_artifacts(consistent_artifacts());
        let result = FlowConsistencyValidator::new().validate(&collection);
        assert_eq!(result.overall_score, 100.0);
        assert!(result.mismatches.is_empty());
    }

    #[test]
    fn test_missing_action_detected() {
        let mut artifacts = consistent_artifacts();
        // Replace the list screen with one that lacks the 'open' action.
        artifacts[0] = screen("list", &["refresh"]);
        let collection = ArtifactCollection::from_artifacts(artifacts);
        let result = FlowConsistencyValidator::new().validate(&collection);
        assert_eq!(result.action_score, 0.0);
        assert!(result
            .mismatches
            .iter()
            .any(|m| m.kind == FlowMismatchKind::MissingAction));
    }

    #[test]
    fn test_trigger_screen_mismatch() {
        let mut artifacts = consistent_artifacts();
        artifacts[3] = artifact(serde_json::json!({
            "type": "screen-flow",
            "id": "flow-browse",
            "name": "Browse",
            "relatedUseCase": { "id": "uc-browse" },
            "transitions": [
                { "from": { "id": "list" }, "to": { "id": "detail" },
                  "trigger": { "screenId": "detail", "actionId": "back" } }
            ],
        }));
        let collection = ArtifactCollection::from_artifacts(artifacts);
        let result = FlowConsistencyValidator::new().validate(&collection);
        assert_eq!(result.trigger_score, 0.0);
        assert!(result
            .mismatches
            .iter()
            .any(|m| m.kind == FlowMismatchKind::ScreenMismatch));
    }

    #[test]
    fn test_undeclared_trigger_screen() {
        let mut artifacts = consistent_artifacts();
        artifacts[3] = artifact(serde_json::json!({
            "type": "screen-flow",
            "id": "flow-browse",
            "name": "Browse",
            "relatedUseCase": { "id": "uc-browse" },
            "transitions": [
                { "from": { "id": "ghost" }, "to": { "id": "detail" },
                  "trigger": { "screenId": "ghost", "actionId": "open" } }
            ],
        }));
        let collection = ArtifactCollection::from_artifacts(artifacts);
        let result = FlowConsistencyValidator::new().validate(&collection);
        assert!(result
            .mismatches
            .iter()
            .any(|m| m.kind == FlowMismatchKind::MissingScreen));
    }

    #[test]
    fn test_multiple_dead_ends_incomplete() {
        let artifacts = vec![
            screen("a", &["x", "y"]),
            screen("b", &[]),
            screen("c", &[]),
            artifact(serde_json::json!({
                "type": "usecase", "id": "uc-1", "name": "UC", "mainFlow": [],
            })),
            artifact(serde_json::json!({
                "type": "screen-flow",
                "id": "flow-fork",
                "name": "Fork",
                "relatedUseCase": { "id": "uc-1" },
                "transitions": [
                    { "from": { "id": "a" }, "to": { "id": "b" },
                      "trigger": { "screenId": "a", "actionId": "x" } },
                    { "from": { "id": "a" }, "to": { "id": "c" },
                      "trigger": { "screenId": "a", "actionId": "y" } }
                ],
            })),
        ];
        let collection = ArtifactCollection::from_artifacts(artifacts);
        let result = FlowConsistencyValidator::new().validate(&collection);
        assert_eq!(result.completeness_score, 0.0);
        assert!(result
            .mismatches
            .iter()
            .any(|m| m.kind == FlowMismatchKind::IncompleteFlow));
    }

    #[test]
    fn test_weighting_formula() {
        let collection = ArtifactCollection::from_artifacts(consistent_artifacts());
        let result = FlowConsistencyValidator::new().validate(&collection);
        let expected = 0.3 * result.screen_order_score
            + 0.3 * result.action_score
            + 0.25 * result.trigger_score
            + 0.15 * result.completeness_score;
        assert!((result.overall_score - expected).abs() < 1e-9);
    }

    #[test]
    fn test_empty_collection_scores_full() {
        let result =
            FlowConsistencyValidator::new().validate(&ArtifactCollection::default());
        assert_eq!(result.overall_score, 100.0);
    }
}
