//! Dependency report model
//!
//! The crawler writes a `Report`, the fixer consumes one, and the validator
//! rewrites one into a `ValidatedReport`. Issue messages carry their
//! arguments in single quotes so downstream passes can recover them without
//! a second schema.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to read report {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("report {path} is not valid JSON")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write report {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode report")]
    Encode(#[from] serde_json::Error),
}

/// Issue categories reported by the crawler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// An include directive whose target cannot be located
    MissingInclude,
    /// A declared module dependency with no matching module
    MissingModule,
    /// A declared module dependency no header references
    UnusedDependency,
    /// A dependency cycle in the graph
    CircularDependency,
    /// An `_Implementation` method marked `override`
    InterfaceMismatch,
}

/// A single finding, addressed to a file where one applies
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    #[serde(rename = "type")]
    pub kind: IssueKind,

    pub message: String,
}

impl Issue {
    pub fn missing_include(file: &str, include: &str) -> Self {
        Self {
            file: Some(file.to_string()),
            kind: IssueKind::MissingInclude,
            message: format!("Cannot find include file: '{include}'"),
        }
    }

    pub fn missing_module(build_file: &str, module: &str, dependency: &str) -> Self {
        Self {
            file: Some(build_file.to_string()),
            kind: IssueKind::MissingModule,
            message: format!("Cannot find module '{dependency}' declared by '{module}'"),
        }
    }

    pub fn unused_dependency(build_file: &str, module: &str, dependency: &str) -> Self {
        Self {
            file: Some(build_file.to_string()),
            kind: IssueKind::UnusedDependency,
            message: format!(
                "Module '{module}' declares dependency '{dependency}' that no header references"
            ),
        }
    }

    pub fn circular_dependency(cycle: &[String]) -> Self {
        let mut rendered = cycle.join(" -> ");
        if let Some(first) = cycle.first() {
            rendered.push_str(" -> ");
            rendered.push_str(first);
        }
        Self {
            file: None,
            kind: IssueKind::CircularDependency,
            message: format!("Circular dependency detected: {rendered}"),
        }
    }

    pub fn interface_mismatch(file: &str, method: &str) -> Self {
        let base = method.replace("_Implementation", "");
        Self {
            file: Some(file.to_string()),
            kind: IssueKind::InterfaceMismatch,
            message: format!(
                "Method '{method}' contains '_Implementation' suffix but uses override - \
                 interface method should be '{base}'"
            ),
        }
    }

    /// First single-quoted argument of the message (the include file for
    /// missing_include, the dependency for missing_module)
    pub fn first_quoted(&self) -> Option<&str> {
        self.message.split('\'').nth(1)
    }

    /// Second single-quoted argument of the message (the dependency for
    /// unused_dependency)
    pub fn second_quoted(&self) -> Option<&str> {
        self.message.split('\'').nth(3)
    }
}

/// Crawler output, serialized as `dependency_report.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Project root the scan ran against
    pub project: String,
    /// Number of modules found via Build.cs files
    pub modules: usize,
    /// Number of UCLASS/USTRUCT/UENUM/interface definitions found
    pub types_defined: usize,
    /// Include search paths collected from Build.cs files
    pub include_paths: Vec<String>,
    pub issues: Vec<Issue>,
}

fn write_json(path: &Path, json: String) -> Result<(), ReportError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|source| ReportError::Write {
                path: path.to_path_buf(),
                source,
            })?;
        }
    }
    fs::write(path, json).map_err(|source| ReportError::Write {
        path: path.to_path_buf(),
        source,
    })
}

impl Report {
    pub fn load(path: &Path) -> Result<Self, ReportError> {
        let content = fs::read_to_string(path).map_err(|source| ReportError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&content).map_err(|source| ReportError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), ReportError> {
        let json = serde_json::to_string_pretty(self)?;
        write_json(path, json)
    }
}

/// A report entry the validator proved stale, with the reason it was dropped
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FalsePositive {
    pub issue: Issue,
    pub reason: String,
}

/// Validator output, serialized as `validated_dependency_report.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidatedReport {
    pub valid_issues: Vec<Issue>,
    pub false_positives: Vec<FalsePositive>,
    pub total_issues: usize,
    pub valid_count: usize,
    pub false_positive_count: usize,
}

impl ValidatedReport {
    pub fn save(&self, path: &Path) -> Result<(), ReportError> {
        let json = serde_json::to_string_pretty(self)?;
        write_json(path, json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_kind_serializes_snake_case() {
        let issue = Issue::missing_include("Source/Game/Foo.h", "Bar.h");
        let json = serde_json::to_value(&issue).unwrap();
        assert_eq!(json["type"], "missing_include");
        assert_eq!(json["file"], "Source/Game/Foo.h");
        assert_eq!(json["message"], "Cannot find include file: 'Bar.h'");
    }

    #[test]
    fn test_quoted_arguments_round_trip() {
        let issue = Issue::missing_include("Foo.h", "Core/Bar.h");
        assert_eq!(issue.first_quoted(), Some("Core/Bar.h"));

        let issue = Issue::unused_dependency("Source/Game/Game.Build.cs", "Game", "Slate");
        assert_eq!(issue.first_quoted(), Some("Game"));
        assert_eq!(issue.second_quoted(), Some("Slate"));
    }

    #[test]
    fn test_circular_dependency_closes_the_loop() {
        let issue = Issue::circular_dependency(&["A.h".to_string(), "B.h".to_string()]);
        assert_eq!(
            issue.message,
            "Circular dependency detected: A.h -> B.h -> A.h"
        );
        assert!(issue.file.is_none());
    }

    #[test]
    fn test_report_load_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dependency_report.json");

        let report = Report {
            project: ".".to_string(),
            modules: 2,
            types_defined: 3,
            include_paths: vec!["Source/Game/Public".to_string()],
            issues: vec![Issue::missing_include("Foo.h", "Bar.h")],
        };
        report.save(&path).unwrap();

        let loaded = Report::load(&path).unwrap();
        assert_eq!(loaded.modules, 2);
        assert_eq!(loaded.issues.len(), 1);
        assert_eq!(loaded.issues[0].kind, IssueKind::MissingInclude);
    }

    #[test]
    fn test_load_rejects_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            Report::load(&path),
            Err(ReportError::Parse { .. })
        ));
    }
}
