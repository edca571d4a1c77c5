//! Content-safety heuristics for skill documents.
//!
//! Lexical matches only: false positives are expected, and every hit is a
//! warning rather than an error.

use crate::{
    checks::{Check, CheckSet, Finding, Rule, Severity},
    error::Result,
};

pub const THREAT_CHECKS: &[Check] = &[
    Check {
        id: "prompt-injection",
        name: "THREAT: Prompt Injection: 'ignore previous instructions'",
        rule: Rule::Absent(r"(?i)\bignore\s+(?:all\s+)?(?:previous|all|prior)\s+instructions\b"),
        severity: Severity::Warning,
        hint: "Skills must not instruct the assistant to discard its existing instructions.",
    },
    Check {
        id: "privilege-escalation",
        name: "THREAT: Privilege Escalation: 'always approve'",
        rule: Rule::Absent(r"(?i)\balways\s+approve\b"),
        severity: Severity::Warning,
        hint: "Never pre-approve actions on the user's behalf.",
    },
    Check {
        id: "remote-execution",
        name: "THREAT: Unverifiable Dependency: 'curl | bash'",
        rule: Rule::Absent(r"(?i)\b(?:curl|wget)\s[^\n]*\|\s*(?:sudo\s+)?(?:ba|z|da)?sh\b"),
        severity: Severity::Warning,
        hint: "Download, verify, then execute; do not pipe remote scripts into a shell.",
    },
    Check {
        id: "hardcoded-secret",
        name: "THREAT: Hardcoded Secret Detected",
        rule: Rule::Absent(
            r"\b(?:sk-[A-Za-z0-9_-]{20,}|AIza[A-Za-z0-9_-]{35}|ghp_[A-Za-z0-9]{36}|AKIA[0-9A-Z]{16})",
        ),
        severity: Severity::Warning,
        hint: "Remove credentials; reference them by name instead.",
    },
    Check {
        id: "env-access",
        name: "THREAT: Environment Variable Access",
        rule: Rule::Absent(r"(?i)\b(?:process\.env|os\.environ|os\.getenv|std::env::var)"),
        severity: Severity::Warning,
        hint: "Reading the process environment can leak secrets into the conversation.",
    },
    Check {
        id: "safety-bypass",
        name: "THREAT: Safety Bypass: '--no-verify'",
        rule: Rule::Absent(r"(?i)--no-verify\b"),
        severity: Severity::Warning,
        hint: "Do not skip hooks or verification steps.",
    },
];

/// Applies the threat patterns to document text.
#[derive(Debug)]
pub struct ThreatScanner {
    checks: CheckSet,
}

impl ThreatScanner {
    /// Scanner with the built-in [`THREAT_CHECKS`].
    pub fn standard() -> Result<Self> {
        Self::with_checks(THREAT_CHECKS)
    }

    pub fn with_checks(checks: &[Check]) -> Result<Self> {
        Ok(Self {
            checks: CheckSet::compile(checks)?,
        })
    }

    /// One finding per matching pattern, in pattern order.
    pub fn scan(&self, text: &str) -> Vec<Finding> {
        self.checks.evaluate(None, text)
    }
}
