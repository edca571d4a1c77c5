//! `agentic-vault validate`: structure, quality, and content-safety checks.
//!
//! Prints `PASS`, `WARN`, or `FAIL` per file with its findings, then a summary.
//! Exits 1 when any file has errors; warnings never fail the run.

use std::path::PathBuf;

use {
    agentic_vault_skills::{
        checks::Finding,
        validate::{Outcome, SkillValidator, ValidationReport, ValidationSummary, resolve_targets},
    },
    anyhow::Result,
};

use crate::{Context, style::Palette};

pub fn handle_validate(ctx: &Context, paths: &[PathBuf]) -> Result<()> {
    let p = ctx.palette;
    let default_dir = &ctx.config.validate.default_dir;
    let validator = SkillValidator::standard()?;
    let files = resolve_targets(paths, default_dir)?;

    println!("{}Validating {} skill file(s){}\n", p.bold, files.len(), p.reset);
    if files.is_empty() {
        println!(
            "{}No skill files found in {}{}",
            p.dim,
            default_dir.display(),
            p.reset
        );
    }

    let mut reports = Vec::with_capacity(files.len());
    for file in &files {
        let report = validator.validate_file(file)?;
        print!("{}", render_report(&report, p));
        reports.push(report);
    }

    let summary = ValidationSummary::from_reports(&reports);
    println!("{}", render_summary(&summary, p));

    if !summary.passed() {
        std::process::exit(1);
    }
    Ok(())
}

fn render_report(report: &ValidationReport, p: Palette) -> String {
    let outcome = report.outcome();
    let color = match outcome {
        Outcome::Pass => p.green,
        Outcome::Warn => p.yellow,
        Outcome::Fail => p.red,
    };
    let shown = report
        .path
        .as_ref()
        .map_or_else(|| report.file_name.clone(), |path| path.display().to_string());

    let mut out = format!("  [{color}{outcome}{}] {shown}\n", p.reset);
    for finding in &report.errors {
        push_finding(&mut out, finding, p.red, "✗", p);
    }
    for finding in &report.warnings {
        push_finding(&mut out, finding, p.yellow, "!", p);
    }
    out
}

fn push_finding(out: &mut String, finding: &Finding, color: &str, mark: &str, p: Palette) {
    out.push_str(&format!(
        "      {color}{mark}{} {} {}— {}{}\n",
        p.reset, finding.check, p.dim, finding.hint, p.reset
    ));
}

fn render_summary(summary: &ValidationSummary, p: Palette) -> String {
    let status = if summary.passed() {
        format!("{}passed{}", p.green, p.reset)
    } else {
        format!("{}failed{}", p.red, p.reset)
    };
    format!(
        "\n{}Results:{} {} file(s), {} error(s), {} warning(s) — {status}",
        p.bold, p.reset, summary.files, summary.errors, summary.warnings
    )
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn plain() -> Palette {
        Palette::new(false)
    }

    #[test]
    fn failing_report_lists_errors_then_warnings() {
        let validator = SkillValidator::standard().unwrap();
        let report = validator.validate_document("Draft.md", "# Draft\nTODO\n");
        let text = render_report(&report, plain());

        assert!(text.starts_with("  [FAIL] Draft.md\n"));
        let filename = text.find("Filename format").unwrap();
        let placeholder = text.find("No TODO/FIXME placeholders").unwrap();
        assert!(filename < placeholder);
        assert!(text.contains("      ✗ Filename format — "));
        assert!(text.contains("      ! Minimum length — "));
    }

    #[test]
    fn report_prefers_path_when_known() {
        let validator = SkillValidator::standard().unwrap();
        let mut report = validator.validate_document("a.md", "");
        report.path = Some(PathBuf::from("skills/a.md"));
        assert!(render_report(&report, plain()).starts_with("  [FAIL] skills/a.md\n"));
    }

    #[test]
    fn summary_line_counts() {
        let summary = ValidationSummary {
            files: 3,
            errors: 0,
            warnings: 2,
        };
        assert_eq!(
            render_summary(&summary, plain()),
            "\nResults: 3 file(s), 0 error(s), 2 warning(s) — passed"
        );

        let failed = ValidationSummary {
            errors: 1,
            ..summary
        };
        assert!(render_summary(&failed, plain()).ends_with("1 error(s), 2 warning(s) — failed"));
    }
}
