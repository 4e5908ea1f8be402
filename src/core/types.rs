use serde::{Deserialize, Serialize};

/// Priority of an artifact or a recommendation. Ordering follows
/// `critical > high > medium > low`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

impl Priority {
    pub fn rank(&self) -> u8 {
        match self {
            Priority::Critical => 4,
            Priority::High => 3,
            Priority::Medium => 2,
            Priority::Low => 1,
        }
    }
}

/// Severity of an issue, cycle, or validation finding.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Low,
    Medium,
    High,
    Critical,
}

/// The five orthogonal quality dimensions of the maturity model.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Structure,
    Detail,
    Traceability,
    Testability,
    Maintainability,
}

impl Dimension {
    pub const ALL: [Dimension; 5] = [
        Dimension::Structure,
        Dimension::Detail,
        Dimension::Traceability,
        Dimension::Testability,
        Dimension::Maintainability,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Dimension::Structure => "structure",
            Dimension::Detail => "detail",
            Dimension::Traceability => "traceability",
            Dimension::Testability => "testability",
            Dimension::Maintainability => "maintainability",
        }
    }
}

/// Element kinds that the maturity assessor scores.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ElementType {
    #[serde(rename = "business-requirement")]
    BusinessRequirement,
    #[serde(rename = "actor")]
    Actor,
    #[serde(rename = "usecase")]
    UseCase,
}

/// Authored complexity rating of a use case.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Simple,
    Medium,
    Complex,
    Epic,
}

/// Implementation complexity of a recommended solution.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SolutionComplexity {
    Simple,
    Moderate,
    Complex,
}

/// Coarse effort estimate derived from counts of open items.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum EffortBucket {
    Small,
    Medium,
    Large,
    XLarge,
}

impl EffortBucket {
    /// Bucket for the number of unsatisfied criteria on an element.
    pub fn from_unsatisfied_count(count: usize) -> Self {
        match count {
            0..=3 => EffortBucket::Small,
            4..=8 => EffortBucket::Medium,
            9..=15 => EffortBucket::Large,
            _ => EffortBucket::XLarge,
        }
    }

    /// Bucket for the number of impacted nodes in a change-impact query.
    pub fn from_impact_count(count: usize) -> Self {
        match count {
            0..=3 => EffortBucket::Small,
            4..=10 => EffortBucket::Medium,
            11..=20 => EffortBucket::Large,
            _ => EffortBucket::XLarge,
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::Critical => write!(f, "critical"),
            Priority::High => write!(f, "high"),
            Priority::Medium => write!(f, "medium"),
            Priority::Low => write!(f, "low"),
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Critical => write!(f, "critical"),
            Severity::High => write!(f, "high"),
            Severity::Medium => write!(f, "medium"),
            Severity::Low => write!(f, "low"),
            Severity::Info => write!(f, "info"),
        }
    }
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl std::fmt::Display for ElementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ElementType::BusinessRequirement => write!(f, "business-requirement"),
            ElementType::Actor => write!(f, "actor"),
            ElementType::UseCase => write!(f, "usecase"),
        }
    }
}

impl std::fmt::Display for EffortBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EffortBucket::Small => write!(f, "small"),
            EffortBucket::Medium => write!(f, "medium"),
            EffortBucket::Large => write!(f, "large"),
            EffortBucket::XLarge => write!(f, "xlarge"),
        }
    }
}

impl std::fmt::Display for SolutionComplexity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolutionComplexity::Simple => write!(f, "simple"),
            SolutionComplexity::Moderate => write!(f, "moderate"),
            SolutionComplexity::Complex => write!(f, "complex"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_ordering() {
        assert!(Priority::Critical > Priority::High);
        assert!(Priority::High > Priority::Medium);
        assert!(Priority::Medium > Priority::Low);
        assert_eq!(Priority::Critical.rank(), 4);
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Critical > Severity::High);
        assert!(Severity::Low > Severity::Info);
    }

    #[test]
    fn test_effort_buckets() {
        assert_eq!(EffortBucket::from_unsatisfied_count(0), EffortBucket::Small);
        assert_eq!(EffortBucket::from_unsatisfied_count(3), EffortBucket::Small);
        assert_eq!(EffortBucket::from_unsatisfied_count(8), EffortBucket::Medium);
        assert_eq!(EffortBucket::from_unsatisfied_count(15), EffortBucket::Large);
        assert_eq!(EffortBucket::from_unsatisfied_count(16), EffortBucket::XLarge);

        assert_eq!(EffortBucket::from_impact_count(3), EffortBucket::Small);
        assert_eq!(EffortBucket::from_impact_count(10), EffortBucket::Medium);
        assert_eq!(EffortBucket::from_impact_count(20), EffortBucket::Large);
        assert_eq!(EffortBucket::from_impact_count(21), EffortBucket::XLarge);
    }

    #[test]
    fn test_serde_tags() {
        assert_eq!(serde_json::to_string(&Priority::High).unwrap(), "\"high\"");
        assert_eq!(
            serde_json::to_string(&ElementType::BusinessRequirement).unwrap(),
            "\"business-requirement\""
        );
        let p: Priority = serde_json::from_str("\"critical\"").unwrap();
        assert_eq!(p, Priority::Critical);
    }
}
