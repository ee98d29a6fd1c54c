use serde::Serialize;
use shr_models::Identifier;
use std::fmt;

/// Problem found while expanding a model
///
/// Issues never abort a run: the engine records them and keeps going with a
/// best-effort result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpansionIssue {
    pub severity: IssueSeverity,
    pub kind: IssueKind,
    /// Element being expanded when the issue was found
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element: Option<Identifier>,
    pub message: String,
}

impl ExpansionIssue {
    pub fn error(kind: IssueKind, message: impl Into<String>) -> Self {
        Self {
            severity: IssueSeverity::Error,
            kind,
            element: None,
            message: message.into(),
        }
    }

    pub fn warning(kind: IssueKind, message: impl Into<String>) -> Self {
        Self {
            severity: IssueSeverity::Warning,
            kind,
            element: None,
            message: message.into(),
        }
    }

    pub fn with_element(mut self, element: Identifier) -> Self {
        self.element = Some(element);
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == IssueSeverity::Error
    }
}

impl fmt::Display for ExpansionIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueSeverity {
    Error,
    Warning,
}

impl fmt::Display for IssueSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => write!(f, "Error"),
            Self::Warning => write!(f, "Warning"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueKind {
    /// Unresolvable base, field or mapping source
    Reference,
    /// Circular `basedOn` chain
    Cycle,
    /// Incompatible override or constraint
    Merge,
    /// Mapping rule problem
    Mapping,
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Reference => "reference",
            Self::Cycle => "cycle",
            Self::Merge => "merge",
            Self::Mapping => "mapping",
        };
        write!(f, "{}", s)
    }
}

/// Result of an expansion run
#[derive(Debug, Clone)]
pub struct ExpansionOutcome {
    pub specifications: shr_models::Specifications,
    pub issues: Vec<ExpansionIssue>,
}

impl ExpansionOutcome {
    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(ExpansionIssue::is_error)
    }

    pub fn error_count(&self) -> usize {
        self.issues.iter().filter(|i| i.is_error()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == IssueSeverity::Warning)
            .count()
    }

    /// Issues recorded while expanding `id`
    pub fn issues_for<'a>(
        &'a self,
        id: &'a Identifier,
    ) -> impl Iterator<Item = &'a ExpansionIssue> + 'a {
        self.issues
            .iter()
            .filter(move |i| i.element.as_ref() == Some(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_by_severity() {
        let outcome = ExpansionOutcome {
            specifications: Default::default(),
            issues: vec![
                ExpansionIssue::error(IssueKind::Merge, "bad override"),
                ExpansionIssue::warning(IssueKind::Mapping, "target item differs"),
                ExpansionIssue::error(IssueKind::Reference, "missing base"),
            ],
        };

        assert!(outcome.has_errors());
        assert_eq!(outcome.error_count(), 2);
        assert_eq!(outcome.warning_count(), 1);
    }

    #[test]
    fn serializes_for_reports() {
        let issue = ExpansionIssue::warning(IssueKind::Mapping, "shr.test.A: maps to X")
            .with_element(Identifier::new("shr.test", "A"));
        let json = serde_json::to_value(&issue).unwrap();

        assert_eq!(json["severity"], "warning");
        assert_eq!(json["kind"], "mapping");
        assert_eq!(json["element"]["name"], "A");
        assert_eq!(issue.to_string(), "shr.test.A: maps to X");
    }
}
