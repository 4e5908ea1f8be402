use std::collections::HashSet;
use std::marker::PhantomData;

use serde::{Deserialize, Serialize};

use crate::core::types::{Complexity, Priority};

/// A lightweight typed reference to another artifact. Only `id` is
/// semantically meaningful; equality and hashing ignore the display name.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ref<T> {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip)]
    marker: PhantomData<fn() -> T>,
}

impl<T> Ref<T> {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: None,
            marker: PhantomData,
        }
    }

    pub fn with_display_name(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: Some(display_name.into()),
            marker: PhantomData,
        }
    }
}

impl<T> PartialEq for Ref<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for Ref<T> {}

impl<T> std::hash::Hash for Ref<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Free-form metadata carried by any artifact.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(flatten)]
    pub extra: std::collections::BTreeMap<String, serde_json::Value>,
}

/// Any top-level authored document, discriminated by its `type` tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Artifact {
    #[serde(rename = "business-requirement")]
    BusinessRequirement(BusinessRequirement),
    #[serde(rename = "actor")]
    Actor(Actor),
    #[serde(rename = "usecase")]
    UseCase(UseCase),
    #[serde(rename = "screen")]
    Screen(Screen),
    #[serde(rename = "screen-flow")]
    ScreenFlow(ScreenFlow),
    #[serde(rename = "validation-rule")]
    ValidationRule(ValidationRule),
}

impl Artifact {
    pub fn id(&self) -> &str {
        match self {
            Artifact::BusinessRequirement(a) => &a.id,
            Artifact::Actor(a) => &a.id,
            Artifact::UseCase(a) => &a.id,
            Artifact::Screen(a) => &a.id,
            Artifact::ScreenFlow(a) => &a.id,
            Artifact::ValidationRule(a) => &a.id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Artifact::BusinessRequirement(_) => "business-requirement",
            Artifact::Actor(_) => "actor",
            Artifact::UseCase(_) => "usecase",
            Artifact::Screen(_) => "screen",
            Artifact::ScreenFlow(_) => "screen-flow",
            Artifact::ValidationRule(_) => "validation-rule",
        }
    }
}

// ---------------------------------------------------------------------------
// Business requirements
// ---------------------------------------------------------------------------

/// A single business goal inside a requirement. Goals are addressable graph
/// nodes, so they carry their own id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessGoal {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessRule {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityPolicy {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub description: String,
}

/// Generic sub-item used for scope entries, stakeholders, success metrics,
/// assumptions, and constraints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequirementItem {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequirementScope {
    #[serde(default)]
    pub in_scope: Vec<RequirementItem>,
    #[serde(default)]
    pub out_of_scope: Vec<RequirementItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessRequirement {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<DocumentMetadata>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub business_goals: Vec<BusinessGoal>,
    #[serde(default)]
    pub scope: RequirementScope,
    #[serde(default)]
    pub stakeholders: Vec<RequirementItem>,
    #[serde(default)]
    pub success_metrics: Vec<RequirementItem>,
    #[serde(default)]
    pub assumptions: Vec<RequirementItem>,
    #[serde(default)]
    pub constraints: Vec<RequirementItem>,
    #[serde(default)]
    pub business_rules: Vec<BusinessRule>,
    #[serde(default)]
    pub security_policies: Vec<SecurityPolicy>,
}

// ---------------------------------------------------------------------------
// Actors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ActorRole {
    Primary,
    Secondary,
    External,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<DocumentMetadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<ActorRole>,
    #[serde(default)]
    pub responsibilities: Vec<String>,
    #[serde(default)]
    pub goals: Vec<String>,
}

// ---------------------------------------------------------------------------
// Use cases
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UseCaseActors {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary: Option<Ref<Actor>>,
    #[serde(default)]
    pub secondary: Vec<Ref<Actor>>,
}

/// One step of a use case flow. `step_number` is never authored; it is the
/// index + 1 within the containing flow.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowStep {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor: Option<Ref<Actor>>,
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub expected_result: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screen: Option<Ref<Screen>>,
    #[serde(default)]
    pub input_fields: Vec<String>,
    #[serde(default)]
    pub validation_rules: Vec<Ref<ValidationRule>>,
    #[serde(default)]
    pub error_handling: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlternativeFlow {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub condition: String,
    #[serde(default)]
    pub steps: Vec<FlowStep>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_to_step_id: Option<String>,
}

/// Link from a use case to the business requirement (and goals) it covers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequirementCoverage {
    pub requirement: Ref<BusinessRequirement>,
    #[serde(default)]
    pub business_goals: Vec<Ref<BusinessGoal>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UseCase {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<DocumentMetadata>,
    #[serde(default)]
    pub actors: UseCaseActors,
    #[serde(default)]
    pub preconditions: Vec<String>,
    #[serde(default)]
    pub postconditions: Vec<String>,
    #[serde(default)]
    pub main_flow: Vec<FlowStep>,
    #[serde(default)]
    pub alternative_flows: Vec<AlternativeFlow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complexity: Option<Complexity>,
    #[serde(default)]
    pub acceptance_criteria: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_requirement_coverage: Option<RequirementCoverage>,
    #[serde(default)]
    pub prerequisite_use_cases: Vec<Ref<UseCase>>,
    #[serde(default)]
    pub business_rules: Vec<Ref<BusinessRule>>,
    #[serde(default)]
    pub security_policies: Vec<Ref<SecurityPolicy>>,
    #[serde(default)]
    pub data_requirements: Vec<String>,
    #[serde(default)]
    pub performance_requirements: Vec<String>,
    #[serde(default)]
    pub ui_requirements: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_effort: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_value: Option<String>,
}

impl UseCase {
    /// Main-flow steps paired with their derived step numbers (index + 1).
    pub fn numbered_steps(&self) -> impl Iterator<Item = (usize, &FlowStep)> {
        self.main_flow.iter().enumerate().map(|(i, s)| (i + 1, s))
    }

    /// Ordered screen ids referenced by the main flow, with consecutive
    /// repeats collapsed.
    pub fn screen_sequence(&self) -> Vec<String> {
        let mut sequence: Vec<String> = Vec::new();
        for step in &self.main_flow {
            if let Some(screen) = &step.screen {
                if sequence.last().map(|s| s.as_str()) != Some(screen.id.as_str()) {
                    sequence.push(screen.id.clone());
                }
            }
        }
        sequence
    }

    /// Step ids declared in the main flow.
    pub fn main_flow_step_ids(&self) -> Vec<&str> {
        self.main_flow
            .iter()
            .filter_map(|s| s.step_id.as_deref())
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Screens and screen flows
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ScreenType {
    Form,
    List,
    Detail,
    Confirmation,
    Dashboard,
    Search,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenAction {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Screen {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<DocumentMetadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screen_type: Option<ScreenType>,
    #[serde(default)]
    pub input_fields: Vec<String>,
    #[serde(default)]
    pub display_fields: Vec<String>,
    #[serde(default)]
    pub actions: Vec<ScreenAction>,
}

impl Screen {
    pub fn has_action(&self, action_id: &str) -> bool {
        self.actions.iter().any(|a| a.id == action_id)
    }
}

/// The user interaction that fires a transition: an action on a screen.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionTrigger {
    pub screen_id: String,
    pub action_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenTransition {
    pub from: Ref<Screen>,
    pub to: Ref<Screen>,
    pub trigger: TransitionTrigger,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

/// A set of screen transitions linked to the use case it realizes.
/// `related_use_case` is mandatory; a flow without it fails construction.
/// Contained screens and boundary screens are derived from `transitions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenFlow {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<DocumentMetadata>,
    #[serde(default)]
    pub transitions: Vec<ScreenTransition>,
    pub related_use_case: Ref<UseCase>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_screen: Option<Ref<Screen>>,
    #[serde(default)]
    pub end_screens: Vec<Ref<Screen>>,
}

impl ScreenFlow {
    /// All screen ids touched by any transition, in first-seen order.
    pub fn screens(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut screens = Vec::new();
        for t in &self.transitions {
            for id in [&t.from.id, &t.to.id] {
                if seen.insert(id.clone()) {
                    screens.push(id.clone());
                }
            }
        }
        screens
    }

    /// Screens that no transition enters (derived in-degree 0).
    pub fn derived_start_screens(&self) -> Vec<String> {
        let targets: HashSet<&str> = self.transitions.iter().map(|t| t.to.id.as_str()).collect();
        self.screens()
            .into_iter()
            .filter(|s| !targets.contains(s.as_str()))
            .collect()
    }

    /// Screens that no transition leaves (derived out-degree 0).
    pub fn derived_end_screens(&self) -> Vec<String> {
        let sources: HashSet<&str> = self.transitions.iter().map(|t| t.from.id.as_str()).collect();
        self.screens()
            .into_iter()
            .filter(|s| !sources.contains(s.as_str()))
            .collect()
    }

    /// Whether the flow contains a transition between the given screens.
    pub fn has_transition(&self, from: &str, to: &str) -> bool {
        self.transitions
            .iter()
            .any(|t| t.from.id == from && t.to.id == to)
    }
}

// ---------------------------------------------------------------------------
// Validation rules
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ValidateOn {
    Blur,
    Submit,
    Change,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationRule {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<DocumentMetadata>,
    #[serde(default)]
    pub rule_type: String,
    #[serde(default)]
    pub error_message: String,
    #[serde(default)]
    pub validate_on: Vec<ValidateOn>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transition(from: &str, to: &str, action: &str) -> ScreenTransition {
        ScreenTransition {
            from: Ref::new(from),
            to: Ref::new(to),
            trigger: TransitionTrigger {
                screen_id: from.to_string(),
                action_id: action.to_string(),
            },
            condition: None,
        }
    }

    fn sample_flow() -> ScreenFlow {
        ScreenFlow {
            id: "flow-order".to_string(),
            name: "Order flow".to_string(),
            description: None,
            metadata: None,
            transitions: vec![
                transition("screen-list", "screen-detail", "open"),
                transition("screen-detail", "screen-confirm", "submit"),
            ],
            related_use_case: Ref::new("uc-order"),
            start_screen: None,
            end_screens: vec![],
        }
    }

    #[test]
    fn test_ref_equality_ignores_display_name() {
        let a: Ref<Actor> = Ref::new("actor-001");
        let b: Ref<Actor> = Ref::with_display_name("actor-001", "Customer");
        assert_eq!(a, b);
    }

    #[test]
    fn test_artifact_tag_round_trip() {
        let json = r#"{"type":"actor","id":"actor-001","name":"Customer","role":"primary","responsibilities":["place orders"]}"#;
        let artifact: Artifact = serde_json::from_str(json).unwrap();
        assert_eq!(artifact.kind(), "actor");
        assert_eq!(artifact.id(), "actor-001");
        match artifact {
            Artifact::Actor(actor) => assert_eq!(actor.role, Some(ActorRole::Primary)),
            other => panic!("expected actor, got {}", other.kind()),
        }
    }

    #[test]
    fn test_screen_flow_requires_related_use_case() {
        let json = r#"{"type":"screen-flow","id":"flow-1","transitions":[]}"#;
        let parsed: Result<Artifact, _> = serde_json::from_str(json);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_derived_screens_and_boundaries() {
        let flow = sample_flow();
        assert_eq!(
            flow.screens(),
            vec!["screen-list", "screen-detail", "screen-confirm"]
        );
        assert_eq!(flow.derived_start_screens(), vec!["screen-list"]);
        assert_eq!(flow.derived_end_screens(), vec!["screen-confirm"]);
    }

    #[test]
    fn test_screen_sequence_collapses_repeats() {
        let mut uc = UseCase {
            id: "uc-1".to_string(),
            name: String::new(),
            description: None,
            metadata: None,
            actors: UseCaseActors::default(),
            preconditions: vec![],
            postconditions: vec![],
            main_flow: vec![],
            alternative_flows: vec![],
            priority: None,
            complexity: None,
            acceptance_criteria: vec![],
            business_requirement_coverage: None,
            prerequisite_use_cases: vec![],
            business_rules: vec![],
            security_policies: vec![],
            data_requirements: vec![],
            performance_requirements: vec![],
            ui_requirements: vec![],
            estimated_effort: None,
            business_value: None,
        };
        for screen in ["a", "a", "b", "b", "c"] {
            uc.main_flow.push(FlowStep {
                screen: Some(Ref::new(screen)),
                ..FlowStep::default()
            });
        }
        assert_eq!(uc.screen_sequence(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_step_numbers_are_derived() {
        let mut uc_steps = Vec::new();
        for id in ["enter", "confirm"] {
            uc_steps.push(FlowStep {
                step_id: Some(id.to_string()),
                ..FlowStep::default()
            });
        }
        let uc = UseCase {
            main_flow: uc_steps,
            ..sample_use_case()
        };
        let numbers: Vec<usize> = uc.numbered_steps().map(|(n, _)| n).collect();
        assert_eq!(numbers, vec![1, 2]);
    }

    fn sample_use_case() -> UseCase {
        serde_json::from_value(serde_json::json!({
            "id": "uc-sample",
            "name": "Sample",
        }))
        .unwrap()
    }
}
