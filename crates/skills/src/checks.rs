//! Data-driven document checks.
//!
//! Every structural requirement, quality heuristic, and threat pattern is a
//! [`Check`] record. A list of records is compiled once into a [`CheckSet`]
//! and evaluated in order, producing one [`Finding`] per failed check.

use {regex::Regex, serde::Serialize};

use crate::error::Result;

/// Severity level for a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
        }
    }
}

/// What a check asserts about a document.
#[derive(Debug, Clone, Copy)]
pub enum Rule {
    /// The text must contain a match.
    Present(&'static str),
    /// The text must not contain a match.
    Absent(&'static str),
    /// The file name must match.
    FileName(&'static str),
    /// The text must be at least this many characters long.
    MinLength(usize),
    /// The text must contain something other than whitespace.
    NonBlank,
}

/// A single check record.
#[derive(Debug, Clone, Copy)]
pub struct Check {
    /// Stable identifier, e.g. `metadata-name`.
    pub id: &'static str,
    /// Label shown in reports.
    pub name: &'static str,
    pub rule: Rule,
    pub severity: Severity,
    /// Corrective hint shown next to the label.
    pub hint: &'static str,
}

/// A failed check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub id: &'static str,
    pub check: &'static str,
    pub severity: Severity,
    pub hint: &'static str,
}

impl Finding {
    fn from_check(check: &Check) -> Self {
        Self {
            id: check.id,
            check: check.name,
            severity: check.severity,
            hint: check.hint,
        }
    }
}

#[derive(Debug)]
enum CompiledRule {
    Present(Regex),
    Absent(Regex),
    FileName(Regex),
    MinLength(usize),
    NonBlank,
}

impl CompiledRule {
    fn compile(rule: Rule) -> Result<Self> {
        Ok(match rule {
            Rule::Present(p) => Self::Present(Regex::new(p)?),
            Rule::Absent(p) => Self::Absent(Regex::new(p)?),
            Rule::FileName(p) => Self::FileName(Regex::new(p)?),
            Rule::MinLength(n) => Self::MinLength(n),
            Rule::NonBlank => Self::NonBlank,
        })
    }

    fn passes(&self, file_name: Option<&str>, text: &str) -> bool {
        match self {
            Self::Present(re) => re.is_match(text),
            Self::Absent(re) => !re.is_match(text),
            // Content-only evaluation has no name to judge.
            Self::FileName(re) => file_name.is_none_or(|name| re.is_match(name)),
            Self::MinLength(n) => text.chars().count() >= *n,
            Self::NonBlank => !text.trim().is_empty(),
        }
    }
}

/// An ordered list of compiled checks.
#[derive(Debug)]
pub struct CheckSet {
    checks: Vec<(Check, CompiledRule)>,
}

impl CheckSet {
    /// Compile `checks`, keeping their order.
    pub fn compile(checks: &[Check]) -> Result<Self> {
        let checks = checks
            .iter()
            .map(|c| Ok((*c, CompiledRule::compile(c.rule)?)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { checks })
    }

    /// Evaluate every check against the text (and the file name, when known).
    pub fn evaluate(&self, file_name: Option<&str>, text: &str) -> Vec<Finding> {
        self.checks
            .iter()
            .filter(|(_, rule)| !rule.passes(file_name, text))
            .map(|(check, _)| Finding::from_check(check))
            .collect()
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &[Check] = &[
        Check {
            id: "greeting",
            name: "Greeting",
            rule: Rule::Present(r"(?im)^hello\b"),
            severity: Severity::Error,
            hint: "Say hello.",
        },
        Check {
            id: "no-shouting",
            name: "No shouting",
            rule: Rule::Absent(r"!!!"),
            severity: Severity::Warning,
            hint: "Calm down.",
        },
        Check {
            id: "name",
            name: "File name",
            rule: Rule::FileName(r"^[a-z]+\.md$"),
            severity: Severity::Error,
            hint: "Lowercase only.",
        },
        Check {
            id: "length",
            name: "Length",
            rule: Rule::MinLength(10),
            severity: Severity::Warning,
            hint: "Say more.",
        },
    ];

    #[test]
    fn findings_follow_check_order() {
        let set = CheckSet::compile(SAMPLE).unwrap();
        let findings = set.evaluate(Some("Bad.md"), "nope!!!");
        let ids: Vec<_> = findings.iter().map(|f| f.id).collect();
        assert_eq!(ids, vec!["greeting", "no-shouting", "name", "length"]);
        assert_eq!(findings[1].severity, Severity::Warning);
    }

    #[test]
    fn passing_text_has_no_findings() {
        let set = CheckSet::compile(SAMPLE).unwrap();
        assert!(set.evaluate(Some("good.md"), "intro\nHello there").is_empty());
    }

    #[test]
    fn filename_rule_is_skipped_without_a_name() {
        let set = CheckSet::compile(SAMPLE).unwrap();
        let findings = set.evaluate(None, "hello world, calm");
        assert!(findings.is_empty());
    }

    #[test]
    fn min_length_counts_characters_not_bytes() {
        let set = CheckSet::compile(&[SAMPLE[3]]).unwrap();
        // Ten characters, twenty bytes.
        assert!(set.evaluate(None, "éééééééééé").is_empty());
        assert_eq!(set.evaluate(None, "ééé").len(), 1);
    }

    #[test]
    fn invalid_pattern_fails_to_compile() {
        let bad = Check {
            id: "bad",
            name: "Bad",
            rule: Rule::Present("(unclosed"),
            severity: Severity::Error,
            hint: "",
        };
        assert!(CheckSet::compile(&[bad]).is_err());
    }
}
