use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::cli::ValidateArgs;
use crate::config_discovery;
use crate::fixer::has_include;
use crate::report::{FalsePositive, Issue, IssueKind, Report, ValidatedReport};

pub fn run(args: ValidateArgs) -> Result<()> {
    let config = config_discovery::load_config(args.config.as_deref())?;

    let report_path = PathBuf::from(args.report.as_deref().unwrap_or(&config.project.report));
    let project_root = PathBuf::from(
        args.project_dir
            .as_deref()
            .unwrap_or(&config.project.root),
    );

    let report = Report::load(&report_path)
        .with_context(|| format!("failed to load report from {}", report_path.display()))?;

    let validated = validate_report(&report, &project_root);

    let output_path = match &args.output {
        Some(path) => PathBuf::from(path),
        None => report_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join("validated_dependency_report.json"),
    };
    validated
        .save(&output_path)
        .with_context(|| format!("failed to save validated report to {}", output_path.display()))?;

    println!(
        "Validation complete: {} valid issue(s), {} false positive(s)",
        validated.valid_count, validated.false_positive_count
    );
    println!("Validated report saved to {}", output_path.display());

    Ok(())
}

/// Re-check every issue against the current project state.
///
/// Only missing_include entries can be proven stale on disk; other kinds
/// pass through as valid.
pub fn validate_report(report: &Report, project_root: &Path) -> ValidatedReport {
    let mut valid_issues = Vec::new();
    let mut false_positives = Vec::new();

    for issue in &report.issues {
        match check_issue(issue, project_root) {
            Some(reason) => {
                debug!(message = %issue.message, reason, "dropping stale issue");
                false_positives.push(FalsePositive {
                    issue: issue.clone(),
                    reason: reason.to_string(),
                });
            }
            None => valid_issues.push(issue.clone()),
        }
    }

    ValidatedReport {
        total_issues: report.issues.len(),
        valid_count: valid_issues.len(),
        false_positive_count: false_positives.len(),
        valid_issues,
        false_positives,
    }
}

/// Reason an issue no longer applies, or None when it still stands
fn check_issue(issue: &Issue, project_root: &Path) -> Option<&'static str> {
    if issue.kind != IssueKind::MissingInclude {
        return None;
    }

    let file = issue.file.as_deref()?;
    let include = issue.first_quoted()?;

    let full_path = project_root.join(file);
    if !full_path.exists() {
        return Some("File not found");
    }

    let content = std::fs::read(&full_path)
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        .unwrap_or_default();
    if has_include(&content, include) {
        return Some("Include already exists");
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn report_with(issues: Vec<Issue>) -> Report {
        Report {
            project: ".".to_string(),
            modules: 0,
            types_defined: 0,
            include_paths: vec![],
            issues,
        }
    }

    #[test]
    fn test_deleted_file_is_false_positive() {
        let temp = TempDir::new().unwrap();
        let report = report_with(vec![Issue::missing_include("Source/Gone.h", "Core.h")]);

        let validated = validate_report(&report, temp.path());
        assert_eq!(validated.valid_count, 0);
        assert_eq!(validated.false_positive_count, 1);
        assert_eq!(validated.false_positives[0].reason, "File not found");
    }

    #[test]
    fn test_present_include_is_false_positive() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("Source")).unwrap();
        fs::write(
            temp.path().join("Source/Turret.h"),
            "#include \"CoreMinimal.h\"\n",
        )
        .unwrap();

        let report = report_with(vec![Issue::missing_include(
            "Source/Turret.h",
            "CoreMinimal.h",
        )]);

        let validated = validate_report(&report, temp.path());
        assert_eq!(validated.false_positive_count, 1);
        assert_eq!(
            validated.false_positives[0].reason,
            "Include already exists"
        );
    }

    #[test]
    fn test_still_missing_include_stays_valid() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("Source")).unwrap();
        fs::write(temp.path().join("Source/Turret.h"), "#pragma once\n").unwrap();

        let report = report_with(vec![Issue::missing_include(
            "Source/Turret.h",
            "GameTypes.h",
        )]);

        let validated = validate_report(&report, temp.path());
        assert_eq!(validated.valid_count, 1);
        assert_eq!(validated.false_positive_count, 0);
    }

    #[test]
    fn test_other_issue_kinds_pass_through() {
        let temp = TempDir::new().unwrap();
        let report = report_with(vec![
            Issue::circular_dependency(&["A.h".to_string(), "B.h".to_string()]),
            Issue::interface_mismatch("Source/Turret.h", "OnHit_Implementation"),
        ]);

        let validated = validate_report(&report, temp.path());
        assert_eq!(validated.valid_count, 2);
        assert_eq!(validated.total_issues, 2);
    }
}
