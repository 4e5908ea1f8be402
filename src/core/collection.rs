use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::core::artifacts::{
    Actor, Artifact, BusinessGoal, BusinessRequirement, BusinessRule, Screen, ScreenFlow,
    SecurityPolicy, UseCase, ValidationRule,
};
use crate::core::types::Severity;

/// Effective node id of a requirement sub-item: the authored id when present,
/// otherwise the positional template `"<parent-id>-<kind>-<index>"`.
pub fn sub_item_id(authored: &str, parent_id: &str, kind: &str, index: usize) -> String {
    if authored.is_empty() {
        format!("{}-{}-{}", parent_id, kind, index)
    } else {
        authored.to_string()
    }
}

/// A structural problem detected while assembling the collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsistencyIssue {
    pub kind: String,
    pub severity: Severity,
    pub artifact_kind: String,
    pub artifact_id: String,
    pub description: String,
}

/// The immutable in-memory artifact collection every analyzer reads from.
/// Ids are unique within each kind; duplicates keep the first occurrence and
/// are recorded as critical consistency issues. Id reuse across kinds is
/// allowed.
#[derive(Debug, Clone, Default)]
pub struct ArtifactCollection {
    business_requirements: Vec<BusinessRequirement>,
    actors: Vec<Actor>,
    use_cases: Vec<UseCase>,
    screens: Vec<Screen>,
    screen_flows: Vec<ScreenFlow>,
    validation_rules: Vec<ValidationRule>,

    requirement_index: HashMap<String, usize>,
    actor_index: HashMap<String, usize>,
    use_case_index: HashMap<String, usize>,
    screen_index: HashMap<String, usize>,
    screen_flow_index: HashMap<String, usize>,
    validation_rule_index: HashMap<String, usize>,

    consistency_issues: Vec<ConsistencyIssue>,
    source_files: Vec<String>,
}

impl ArtifactCollection {
    pub fn from_artifacts(artifacts: Vec<Artifact>) -> Self {
        let mut collection = ArtifactCollection::default();
        for artifact in artifacts {
            collection.insert(artifact);
        }
        collection
    }

    fn insert(&mut self, artifact: Artifact) {
        let kind = artifact.kind();
        let id = artifact.id().to_string();
        let duplicate = match &artifact {
            Artifact::BusinessRequirement(_) => self.requirement_index.contains_key(&id),
            Artifact::Actor(_) => self.actor_index.contains_key(&id),
            Artifact::UseCase(_) => self.use_case_index.contains_key(&id),
            Artifact::Screen(_) => self.screen_index.contains_key(&id),
            Artifact::ScreenFlow(_) => self.screen_flow_index.contains_key(&id),
            Artifact::ValidationRule(_) => self.validation_rule_index.contains_key(&id),
        };
        if duplicate {
            self.consistency_issues.push(ConsistencyIssue {
                kind: "duplicate-id".to_string(),
                severity: Severity::Critical,
                artifact_kind: kind.to_string(),
                artifact_id: id.clone(),
                description: format!(
                    "duplicate {} id '{}'; first occurrence kept, this one ignored",
                    kind, id
                ),
            });
            return;
        }
        match artifact {
            Artifact::BusinessRequirement(a) => {
                self.requirement_index.insert(id, self.business_requirements.len());
                self.business_requirements.push(a);
            }
            Artifact::Actor(a) => {
                self.actor_index.insert(id, self.actors.len());
                self.actors.push(a);
            }
            Artifact::UseCase(a) => {
                self.use_case_index.insert(id, self.use_cases.len());
                self.use_cases.push(a);
            }
            Artifact::Screen(a) => {
                self.screen_index.insert(id, self.screens.len());
                self.screens.push(a);
            }
            Artifact::ScreenFlow(a) => {
                self.screen_flow_index.insert(id, self.screen_flows.len());
                self.screen_flows.push(a);
            }
            Artifact::ValidationRule(a) => {
                self.validation_rule_index.insert(id, self.validation_rules.len());
                self.validation_rules.push(a);
            }
        }
    }

    pub fn record_source_file(&mut self, stem: impl Into<String>) {
        self.source_files.push(stem.into());
    }

    pub fn business_requirements(&self) -> &[BusinessRequirement] {
        &self.business_requirements
    }

    pub fn actors(&self) -> &[Actor] {
        &self.actors
    }

    pub fn use_cases(&self) -> &[UseCase] {
        &self.use_cases
    }

    pub fn screens(&self) -> &[Screen] {
        &self.screens
    }

    pub fn screen_flows(&self) -> &[ScreenFlow] {
        &self.screen_flows
    }

    pub fn validation_rules(&self) -> &[ValidationRule] {
        &self.validation_rules
    }

    pub fn consistency_issues(&self) -> &[ConsistencyIssue] {
        &self.consistency_issues
    }

    pub fn source_files(&self) -> &[String] {
        &self.source_files
    }

    pub fn business_requirement(&self, id: &str) -> Option<&BusinessRequirement> {
        self.requirement_index
            .get(id)
            .map(|&i| &self.business_requirements[i])
    }

    pub fn actor(&self, id: &str) -> Option<&Actor> {
        self.actor_index.get(id).map(|&i| &self.actors[i])
    }

    pub fn use_case(&self, id: &str) -> Option<&UseCase> {
        self.use_case_index.get(id).map(|&i| &self.use_cases[i])
    }

    pub fn screen(&self, id: &str) -> Option<&Screen> {
        self.screen_index.get(id).map(|&i| &self.screens[i])
    }

    pub fn screen_flow(&self, id: &str) -> Option<&ScreenFlow> {
        self.screen_flow_index.get(id).map(|&i| &self.screen_flows[i])
    }

    pub fn validation_rule(&self, id: &str) -> Option<&ValidationRule> {
        self.validation_rule_index
            .get(id)
            .map(|&i| &self.validation_rules[i])
    }

    /// Screen flows whose `relatedUseCase` points at the given use case.
    pub fn flows_for_use_case(&self, use_case_id: &str) -> Vec<&ScreenFlow> {
        self.screen_flows
            .iter()
            .filter(|f| f.related_use_case.id == use_case_id)
            .collect()
    }

    /// Whether the actor id appears as primary or secondary in any use case.
    pub fn actor_is_referenced(&self, actor_id: &str) -> bool {
        self.use_cases.iter().any(|uc| {
            uc.actors.primary.as_ref().map(|p| p.id.as_str()) == Some(actor_id)
                || uc.actors.secondary.iter().any(|s| s.id == actor_id)
        })
    }

    /// Resolve a business goal by its effective node id across all
    /// requirements.
    pub fn resolve_business_goal(&self, id: &str) -> Option<(&BusinessRequirement, &BusinessGoal)> {
        for req in &self.business_requirements {
            for (index, goal) in req.business_goals.iter().enumerate() {
                if sub_item_id(&goal.id, &req.id, "goal", index) == id {
                    return Some((req, goal));
                }
            }
        }
        None
    }

    /// Resolve a business rule by its effective node id across all
    /// requirements.
    pub fn resolve_business_rule(&self, id: &str) -> Option<(&BusinessRequirement, &BusinessRule)> {
        for req in &self.business_requirements {
            for (index, rule) in req.business_rules.iter().enumerate() {
                if sub_item_id(&rule.id, &req.id, "rule", index) == id {
                    return Some((req, rule));
                }
            }
        }
        None
    }

    /// Resolve a security policy by its effective node id across all
    /// requirements.
    pub fn resolve_security_policy(
        &self,
        id: &str,
    ) -> Option<(&BusinessRequirement, &SecurityPolicy)> {
        for req in &self.business_requirements {
            for (index, policy) in req.security_policies.iter().enumerate() {
                if sub_item_id(&policy.id, &req.id, "policy", index) == id {
                    return Some((req, policy));
                }
            }
        }
        None
    }

    /// Element counts per kind tag, stable across runs.
    pub fn element_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        counts.insert(
            "business-requirement".to_string(),
            self.business_requirements.len(),
        );
        counts.insert("actor".to_string(), self.actors.len());
        counts.insert("usecase".to_string(), self.use_cases.len());
        counts.insert("screen".to_string(), self.screens.len());
        counts.insert("screen-flow".to_string(), self.screen_flows.len());
        counts.insert("validation-rule".to_string(), self.validation_rules.len());
        counts
    }

    pub fn is_empty(&self) -> bool {
        self.business_requirements.is_empty()
            && self.actors.is_empty()
            && self.use_cases.is_empty()
            && self.screens.is_empty()
            && self.screen_flows.is_empty()
            && self.validation_rules.is_empty()
    }

    pub fn total_artifacts(&self) -> usize {
        self.business_requirements.len()
            + self.actors.len()
            + self.use_cases.len()
            + self.screens.len()
            + self.screen_flows.len()
            + self.validation_rules.len()
    }
}
