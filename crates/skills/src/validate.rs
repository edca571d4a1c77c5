//! Skill document validation.
//!
//! A document is checked against, in order:
//! 1. the file name policy (lowercase, hyphen-separated, `.md`),
//! 2. the required section structure,
//! 3. quality heuristics (length, structure, placeholders),
//! 4. the content-safety patterns from [`crate::threats`].
//!
//! Naming and structure problems are errors; everything else is a warning.

use std::path::{Path, PathBuf};

use {serde::Serialize, tracing::debug};

use crate::{
    checks::{Check, CheckSet, Finding, Rule, Severity},
    error::{Error, Result},
    scan::scan_markdown,
    threats::ThreatScanner,
};

/// Documents shorter than this are flagged as too thin to be useful.
pub const MIN_CONTENT_LENGTH: usize = 500;

pub const FILENAME_CHECK: Check = Check {
    id: "filename",
    name: "Filename format",
    rule: Rule::FileName(r"^[a-z0-9]+(?:-[a-z0-9]+)*\.md$"),
    severity: Severity::Error,
    hint: "Filename must be lowercase, hyphenated, and end in .md (e.g. \"my-skill.md\").",
};

pub const STRUCTURE_CHECKS: &[Check] = &[
    Check {
        id: "title",
        name: "Title (H1)",
        rule: Rule::Present(r"(?m)^#[ \t]+\S"),
        severity: Severity::Error,
        hint: "Must start with a top-level heading: # Role: ...",
    },
    Check {
        id: "metadata",
        name: "## Metadata",
        rule: Rule::Present(r"(?im)^##[ \t]+metadata\b"),
        severity: Severity::Error,
        hint: "Include Name, Version, and Focus fields.",
    },
    Check {
        id: "metadata-name",
        name: "Metadata: Name",
        rule: Rule::Present(r"(?im)^[ \t]*[-*][ \t]+(?:\*\*name\*\*|name[ \t]*:)"),
        severity: Severity::Error,
        hint: "Add \"- **Name**: your-skill-name\" under Metadata.",
    },
    Check {
        id: "metadata-version",
        name: "Metadata: Version",
        rule: Rule::Present(r"(?im)^[ \t]*[-*][ \t]+(?:\*\*version\*\*|version[ \t]*:)"),
        severity: Severity::Error,
        hint: "Add \"- **Version**: x.y\" under Metadata.",
    },
    Check {
        id: "expert-purpose",
        name: "## Expert Purpose / Role",
        rule: Rule::Present(r"(?im)^##[ \t]+(?:expert[ \t]+purpose|role)\b"),
        severity: Severity::Error,
        hint: "Describe what the skill does and its mission.",
    },
    Check {
        id: "use-when",
        name: "## Use This Skill When",
        rule: Rule::Present(r"(?im)^##[ \t]+use[ \t]+this[ \t]+skill[ \t]+when\b"),
        severity: Severity::Error,
        hint: "List the scenarios where this skill should be activated.",
    },
    Check {
        id: "instructions",
        name: "## Instructions / Constraints / Checklist",
        rule: Rule::Present(
            r"(?im)^##[ \t]+(?:instructions|constraints|(?:[a-z&]+[ \t]+)*checklist)\b",
        ),
        severity: Severity::Error,
        hint: "Define rules, constraints, or a checklist for the skill.",
    },
    Check {
        id: "response-format",
        name: "## Response Format / Output Format",
        rule: Rule::Present(
            r"(?im)^##[ \t]+(?:response[ \t]+format|output[ \t]+format|final[ \t]+output|instructions[ \t]+for[ \t]+response)\b",
        ),
        severity: Severity::Error,
        hint: "Specify the structured output the skill should produce.",
    },
    Check {
        id: "behavioral-traits",
        name: "## Behavioral Traits",
        rule: Rule::Present(r"(?im)^##[ \t]+behavioral[ \t]+traits\b"),
        severity: Severity::Error,
        hint: "Define personality and decision-making characteristics.",
    },
];

pub const QUALITY_CHECKS: &[Check] = &[
    Check {
        id: "min-length",
        name: "Minimum length",
        rule: Rule::MinLength(MIN_CONTENT_LENGTH),
        severity: Severity::Warning,
        hint: "Skill files should be at least 500 characters to be meaningful.",
    },
    Check {
        id: "not-empty",
        name: "No empty file",
        rule: Rule::NonBlank,
        severity: Severity::Warning,
        hint: "File is empty.",
    },
    Check {
        id: "structured-content",
        name: "Has bullet points or tables",
        rule: Rule::Present(r"(?m)^[ \t]*(?:[-*+][ \t]+\S|\|)"),
        severity: Severity::Warning,
        hint: "Skills should use bullet points or tables for structured content.",
    },
    Check {
        id: "no-placeholders",
        name: "No TODO/FIXME placeholders",
        rule: Rule::Absent(r"(?i)\b(?:TODO|FIXME|PLACEHOLDER|TBD)\b"),
        severity: Severity::Warning,
        hint: "Remove TODO/FIXME/TBD placeholders before submitting.",
    },
];

/// How a single document fared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Pass,
    Warn,
    Fail,
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pass => write!(f, "PASS"),
            Self::Warn => write!(f, "WARN"),
            Self::Fail => write!(f, "FAIL"),
        }
    }
}

/// Findings for one document. Never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub file_name: String,
    pub path: Option<PathBuf>,
    pub errors: Vec<Finding>,
    pub warnings: Vec<Finding>,
}

impl ValidationReport {
    #[must_use]
    pub fn outcome(&self) -> Outcome {
        if !self.errors.is_empty() {
            Outcome::Fail
        } else if !self.warnings.is_empty() {
            Outcome::Warn
        } else {
            Outcome::Pass
        }
    }
}

/// Totals across a validation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ValidationSummary {
    pub files: usize,
    pub errors: usize,
    pub warnings: usize,
}

impl ValidationSummary {
    pub fn from_reports(reports: &[ValidationReport]) -> Self {
        reports.iter().fold(Self::default(), |acc, r| Self {
            files: acc.files + 1,
            errors: acc.errors + r.errors.len(),
            warnings: acc.warnings + r.warnings.len(),
        })
    }

    /// Warnings alone never fail a run.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.errors == 0
    }
}

/// Structure validator combined with the threat scanner.
#[derive(Debug)]
pub struct SkillValidator {
    filename: CheckSet,
    structure: CheckSet,
    quality: CheckSet,
    threats: ThreatScanner,
}

impl SkillValidator {
    /// Validator with the built-in check tables.
    pub fn standard() -> Result<Self> {
        Ok(Self {
            filename: CheckSet::compile(&[FILENAME_CHECK])?,
            structure: CheckSet::compile(STRUCTURE_CHECKS)?,
            quality: CheckSet::compile(QUALITY_CHECKS)?,
            threats: ThreatScanner::standard()?,
        })
    }

    /// Validate raw text under the given file name.
    pub fn validate_document(&self, file_name: &str, text: &str) -> ValidationReport {
        let findings = self
            .filename
            .evaluate(Some(file_name), text)
            .into_iter()
            .chain(self.structure.evaluate(None, text))
            .chain(self.quality.evaluate(None, text))
            .chain(self.threats.scan(text));

        let (errors, warnings): (Vec<Finding>, Vec<Finding>) =
            findings.partition(|f| f.severity == Severity::Error);
        ValidationReport {
            file_name: file_name.to_string(),
            path: None,
            errors,
            warnings,
        }
    }

    /// Read and validate a file. Bytes that are not UTF-8 are replaced, not rejected.
    pub fn validate_file(&self, path: &Path) -> Result<ValidationReport> {
        let bytes = std::fs::read(path)?;
        let text = String::from_utf8_lossy(&bytes);
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut report = self.validate_document(&file_name, &text);
        report.path = Some(path.to_path_buf());
        debug!(path = %path.display(), outcome = %report.outcome(), "validated skill");
        Ok(report)
    }
}

/// Files a `validate` run should cover.
///
/// Explicit paths must all exist; the first missing one is an error naming it.
/// Without explicit paths every markdown file under `default_dir` is used, and
/// a missing `default_dir` simply yields nothing.
pub fn resolve_targets(explicit: &[PathBuf], default_dir: &Path) -> Result<Vec<PathBuf>> {
    if !explicit.is_empty() {
        if let Some(missing) = explicit.iter().find(|p| !p.is_file()) {
            return Err(Error::not_found("file", missing.clone()));
        }
        return Ok(explicit.to_vec());
    }

    if !default_dir.is_dir() {
        debug!(dir = %default_dir.display(), "default skills directory absent");
        return Ok(Vec::new());
    }
    scan_markdown(default_dir)
}
