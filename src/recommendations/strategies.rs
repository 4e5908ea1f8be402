use crate::analyzers::coherence::CoherenceIssueKind;
use crate::core::types::{Priority, Severity, SolutionComplexity};

use super::{
    Criticality, ExecutableAction, ImpactScope, ProjectStage, Recommendation,
    RecommendationCategory, RecommendationEffort, RecommendationImpact, RecommendationInput,
    RecommendationRationale, RecommendationSolution, TeamSize, recommendation_id,
};

/// A template that inspects the assembled input and produces zero or more
/// recommendations. Strategies run in a fixed order and must be pure.
pub trait RecommendationStrategy: Send + Sync {
    fn name(&self) -> &'static str;
    fn generate(&self, input: &RecommendationInput<'_>) -> Vec<Recommendation>;
}

// Criteria whose fix sweeps across every step of a flow; these are never
// one-line edits.
const PER_STEP_CRITERIA: [&str; 4] = [
    "usecase.step-quality",
    "usecase.steps-fully-specified",
    "usecase.step-error-handling",
    "usecase.step-validation-rules",
];

/// Turns unsatisfied criteria at the next maturity level into concrete,
/// per-element actions.
pub struct MaturityGapStrategy;

impl RecommendationStrategy for MaturityGapStrategy {
    fn name(&self) -> &'static str {
        "maturity"
    }

    fn generate(&self, input: &RecommendationInput<'_>) -> Vec<Recommendation> {
        let mut recommendations = Vec::new();
        let next_level = input.maturity.project_level + 1;
        if next_level > 5 {
            return recommendations;
        }

        for element in input.maturity.elements.iter() {
            for criterion in &element.criteria {
                if criterion.satisfied {
                    continue;
                }
                let is_gap = criterion.level == next_level && criterion.required;
                let is_optional = !criterion.required;
                if !is_gap && !is_optional {
                    continue;
                }

                let (hours, complexity) = if PER_STEP_CRITERIA.contains(&criterion.criterion_id.as_str()) {
                    (6.0, SolutionComplexity::Moderate)
                } else if criterion.weight >= 0.9 {
                    (4.0, SolutionComplexity::Simple)
                } else if criterion.weight >= 0.7 {
                    (3.0, SolutionComplexity::Simple)
                } else {
                    (2.0, SolutionComplexity::Simple)
                };

                let priority = if is_gap { Priority::High } else { Priority::Medium };
                let severity = if is_gap { Severity::High } else { Severity::Medium };

                recommendations.push(Recommendation {
                    id: recommendation_id(
                        self.name(),
                        &format!("{}:{}", element.element_id, criterion.criterion_id),
                    ),
                    title: criterion.description.clone(),
                    priority,
                    category: criterion.dimension.into(),
                    problem: format!(
                        "'{}' does not satisfy '{}': {}",
                        element.element_id, criterion.criterion_id, criterion.evidence
                    ),
                    impact: RecommendationImpact {
                        scope: ImpactScope::Element,
                        affected_elements: vec![element.element_id.clone()],
                        severity,
                    },
                    solution: RecommendationSolution {
                        description: criterion.description.clone(),
                        steps: vec![
                            format!("Open the definition of '{}'", element.element_id),
                            format!("Satisfy: {}", criterion.description),
                        ],
                        executables: vec![ExecutableAction {
                            action: format!("satisfy:{}", criterion.criterion_id),
                            target: element.element_id.clone(),
                        }],
                    },
                    benefits: if is_gap {
                        vec![
                            format!("Moves '{}' toward level {}", element.element_id, next_level),
                            format!("Improves the {} dimension", criterion.dimension),
                        ]
                    } else {
                        vec![format!("Improves the {} dimension", criterion.dimension)]
                    },
                    effort: RecommendationEffort { hours, complexity },
                    rationale: RecommendationRationale {
                        maturity_gap: Some(if is_gap {
                            format!(
                                "required for level {} ({} weight {:.1})",
                                criterion.level, criterion.criterion_id, criterion.weight
                            )
                        } else {
                            format!(
                                "optional criterion {} at level {} left open",
                                criterion.criterion_id, criterion.level
                            )
                        }),
                        ..Default::default()
                    },
                });
            }
        }
        recommendations
    }
}

/// Adjusts emphasis based on the project profile: mission-critical systems
/// get security and traceability pressure, production-bound projects get a
/// stabilization gate.
pub struct ContextStrategy;

impl RecommendationStrategy for ContextStrategy {
    fn name(&self) -> &'static str {
        "context"
    }

    fn generate(&self, input: &RecommendationInput<'_>) -> Vec<Recommendation> {
        let Some(context) = input.context else {
            return Vec::new();
        };
        let mut recommendations = Vec::new();

        if context.criticality == Criticality::MissionCritical {
            let without_policies: Vec<String> = input
                .maturity
                .elements
                .use_cases
                .iter()
                .filter(|e| {
                    e.criteria.iter().any(|c| {
                        c.criterion_id == "usecase.security-policies" && !c.satisfied
                    })
                })
                .map(|e| e.element_id.clone())
                .collect();
            if !without_policies.is_empty() {
                recommendations.push(Recommendation {
                    id: recommendation_id(self.name(), &without_policies.join(",")),
                    title: "Reference security policies from every use case".to_string(),
                    priority: Priority::High,
                    category: RecommendationCategory::Traceability,
                    problem: format!(
                        "{} use case(s) of a mission-critical system reference no security policy",
                        without_policies.len()
                    ),
                    impact: RecommendationImpact {
                        scope: ImpactScope::Module,
                        affected_elements: without_policies,
                        severity: Severity::High,
                    },
                    solution: RecommendationSolution {
                        description: "Link each use case to the security policies that govern it"
                            .to_string(),
                        steps: vec![
                            "Review the security policies of the covering requirement".to_string(),
                            "Add securityPolicies references to each listed use case".to_string(),
                        ],
                        executables: vec![],
                    },
                    benefits: vec!["Auditable security coverage".to_string()],
                    effort: RecommendationEffort {
                        hours: 6.0,
                        complexity: SolutionComplexity::Moderate,
                    },
                    rationale: RecommendationRationale {
                        context_reason: Some("criticality is mission-critical".to_string()),
                        ..Default::default()
                    },
                });
            }
        }

        if context.stage == ProjectStage::Production && input.maturity.project_level <= 2 {
            recommendations.push(Recommendation {
                id: recommendation_id(self.name(), "production-gate"),
                title: "Stabilize the model before production operation".to_string(),
                priority: Priority::High,
                category: RecommendationCategory::Quality,
                problem: format!(
                    "the project runs in production at maturity level {}",
                    input.maturity.project_level
                ),
                impact: RecommendationImpact {
                    scope: ImpactScope::Project,
                    affected_elements: vec![],
                    severity: Severity::High,
                },
                solution: RecommendationSolution {
                    description: "Close the required criteria up to level 3 before the next release"
                        .to_string(),
                    steps: vec!["Work through the maturity-gap recommendations first".to_string()],
                    executables: vec![],
                },
                benefits: vec!["Reduces operational risk".to_string()],
                effort: RecommendationEffort {
                    hours: 16.0,
                    complexity: SolutionComplexity::Complex,
                },
                rationale: RecommendationRationale {
                    context_reason: Some("stage is production".to_string()),
                    ..Default::default()
                },
            });
        }

        if context.team_size == TeamSize::Large {
            if let Some(naming) = input.naming {
                if naming.overall_score < 80.0 {
                    recommendations.push(Recommendation {
                        id: recommendation_id(self.name(), "naming-standard"),
                        title: "Standardize identifier naming".to_string(),
                        priority: Priority::Medium,
                        category: RecommendationCategory::Maintainability,
                        problem: format!(
                            "naming consistency is at {:.0}% across a large team",
                            naming.overall_score
                        ),
                        impact: RecommendationImpact {
                            scope: ImpactScope::Project,
                            affected_elements: vec![],
                            severity: Severity::Medium,
                        },
                        solution: RecommendationSolution {
                            description: "Adopt kebab-case for ids and step ids".to_string(),
                            steps: naming.recommendations.clone(),
                            executables: vec![],
                        },
                        benefits: vec!["Lower onboarding friction".to_string()],
                        effort: RecommendationEffort {
                            hours: 4.0,
                            complexity: SolutionComplexity::Simple,
                        },
                        rationale: RecommendationRationale {
                            context_reason: Some("team size is large".to_string()),
                            ..Default::default()
                        },
                    });
                }
            }
        }

        recommendations
    }
}

/// Graph findings: problematic cycles, isolated artifacts, and hubs.
pub struct GraphStrategy;

impl RecommendationStrategy for GraphStrategy {
    fn name(&self) -> &'static str {
        "graph"
    }

    fn generate(&self, input: &RecommendationInput<'_>) -> Vec<Recommendation> {
        let mut recommendations = Vec::new();

        for cycle in &input.graph.circular_dependencies {
            let priority = match cycle.severity {
                Severity::Critical => Priority::Critical,
                Severity::High => Priority::High,
                _ => continue,
            };
            recommendations.push(Recommendation {
                id: recommendation_id(self.name(), &cycle.nodes.join(">")),
                title: format!("Break a dependency cycle of {} artifacts", cycle.length),
                priority,
                category: RecommendationCategory::Architecture,
                problem: format!("cyclic dependency: {}", cycle.nodes.join(" -> ")),
                impact: RecommendationImpact {
                    scope: ImpactScope::Module,
                    affected_elements: cycle.nodes.clone(),
                    severity: cycle.severity,
                },
                solution: RecommendationSolution {
                    description: "Remove or invert one dependency on the loop".to_string(),
                    steps: vec![
                        "Decide which artifact on the loop owns the relationship".to_string(),
                        "Re-point or delete the weakest edge".to_string(),
                    ],
                    executables: vec![],
                },
                benefits: vec!["Restores a layered, analyzable structure".to_string()],
                effort: RecommendationEffort {
                    hours: 8.0,
                    complexity: SolutionComplexity::Moderate,
                },
                rationale: RecommendationRationale {
                    dependency_issue: Some(format!(
                        "{} severity cycle over {:?} edges",
                        cycle.severity, cycle.edge_kinds
                    )),
                    ..Default::default()
                },
            });
        }

        for node in &input.graph.isolated_nodes {
            recommendations.push(Recommendation {
                id: recommendation_id(self.name(), &format!("isolated:{}", node)),
                title: "Connect isolated artifact to the model".to_string(),
                priority: Priority::Medium,
                category: RecommendationCategory::Traceability,
                problem: format!("'{}' has no relationship to any other artifact", node),
                impact: RecommendationImpact {
                    scope: ImpactScope::Element,
                    affected_elements: vec![node.clone()],
                    severity: Severity::Medium,
                },
                solution: RecommendationSolution {
                    description: "Reference the artifact from a use case, or remove it".to_string(),
                    steps: vec![format!(
                        "Decide whether '{}' is still needed; wire it in or delete it",
                        node
                    )],
                    executables: vec![],
                },
                benefits: vec!["Keeps the model free of dead weight".to_string()],
                effort: RecommendationEffort {
                    hours: 2.0,
                    complexity: SolutionComplexity::Simple,
                },
                rationale: RecommendationRationale {
                    dependency_issue: Some("isolated node".to_string()),
                    ..Default::default()
                },
            });
        }

        for importance in &input.graph.node_importance {
            if importance.in_degree < 10 {
                break; // sorted by in-degree, nothing further qualifies
            }
            recommendations.push(Recommendation {
                id: recommendation_id(self.name(), &format!("hub:{}", importance.node_id)),
                title: format!("Reduce fan-in of '{}'", importance.node_id),
                priority: Priority::Medium,
                category: RecommendationCategory::Architecture,
                problem: format!(
                    "'{}' is referenced by {} artifacts and concentrates risk",
                    importance.node_id, importance.in_degree
                ),
                impact: RecommendationImpact {
                    scope: ImpactScope::Module,
                    affected_elements: vec![importance.node_id.clone()],
                    severity: Severity::Medium,
                },
                solution: RecommendationSolution {
                    description: "Split the artifact by responsibility".to_string(),
                    steps: vec![
                        "Cluster the referrers by what they need".to_string(),
                        "Extract one artifact per cluster".to_string(),
                    ],
                    executables: vec![],
                },
                benefits: vec!["Smaller blast radius for changes".to_string()],
                effort: RecommendationEffort {
                    hours: 12.0,
                    complexity: SolutionComplexity::Complex,
                },
                rationale: RecommendationRationale {
                    dependency_issue: Some(format!("in-degree {}", importance.in_degree)),
                    ..Default::default()
                },
            });
        }

        recommendations
    }
}

/// Forwards coherence issues as recommendations, priority inherited from the
/// issue severity.
pub struct CoherenceStrategy;

impl RecommendationStrategy for CoherenceStrategy {
    fn name(&self) -> &'static str {
        "coherence"
    }

    fn generate(&self, input: &RecommendationInput<'_>) -> Vec<Recommendation> {
        input
            .coherence
            .issues
            .iter()
            .map(|issue| {
                let priority = match issue.severity {
                    Severity::Critical => Priority::Critical,
                    Severity::High => Priority::High,
                    Severity::Medium => Priority::Medium,
                    Severity::Low | Severity::Info => Priority::Low,
                };
                let title = match issue.kind {
                    CoherenceIssueKind::ScreenSequenceMismatch => {
                        "Align main-flow screens with the screen flow"
                    }
                    CoherenceIssueKind::TransitionMissing => "Add the missing screen transition",
                    CoherenceIssueKind::StartScreenMismatch => "Fix the declared start screen",
                    CoherenceIssueKind::EndScreenMismatch => "Fix the declared end screens",
                    CoherenceIssueKind::PrerequisiteUsecaseMissing => {
                        "Resolve the missing prerequisite use case"
                    }
                    CoherenceIssueKind::PrerequisitePriorityMismatch => {
                        "Reconcile prerequisite priorities"
                    }
                    CoherenceIssueKind::PrerequisiteCircularDependency => {
                        "Break the prerequisite cycle"
                    }
                    CoherenceIssueKind::UnresolvedReference => "Fix the dangling reference",
                    CoherenceIssueKind::DuplicateStepId => "Deduplicate step ids",
                    CoherenceIssueKind::ReturnTargetMissing => {
                        "Point the alternative flow at an existing step"
                    }
                };
                Recommendation {
                    id: recommendation_id(
                        self.name(),
                        &format!("{}:{:?}:{}", issue.use_case_id, issue.kind, issue.description),
                    ),
                    title: title.to_string(),
                    priority,
                    category: RecommendationCategory::Quality,
                    problem: issue.description.clone(),
                    impact: RecommendationImpact {
                        scope: ImpactScope::Element,
                        affected_elements: vec![issue.use_case_id.clone()],
                        severity: issue.severity,
                    },
                    solution: RecommendationSolution {
                        description: title.to_string(),
                        steps: vec![issue.description.clone()],
                        executables: vec![],
                    },
                    benefits: vec!["Use cases and screen flows tell the same story".to_string()],
                    effort: RecommendationEffort {
                        hours: 2.0,
                        complexity: SolutionComplexity::Simple,
                    },
                    rationale: RecommendationRationale {
                        best_practice: Some(
                            "a use case and its screen flow must describe the same journey"
                                .to_string(),
                        ),
                        ..Default::default()
                    },
                }
            })
            .collect()
    }
}
