/// Acceptance tests for `depforge fix`
///
/// Reports are written by hand so each test controls exactly which repairs
/// the fixer attempts.
mod common;

use common::UnrealProject;
use predicates::prelude::*;
use serde_json::json;

fn write_report(project: &UnrealProject, issues: serde_json::Value) {
    let report = json!({
        "project": ".",
        "modules": 1,
        "types_defined": 0,
        "include_paths": [],
        "issues": issues,
    });
    project.write(
        "dependency_report.json",
        &serde_json::to_string_pretty(&report).unwrap(),
    );
}

#[test]
fn test_fix_inserts_missing_include() {
    let project = UnrealProject::new();
    project.write(
        "Source/Game/Public/Turret.h",
        "#pragma once\n\n#include \"CoreMinimal.h\"\n\nclass ATurret {};\n",
    );
    project.write("Source/Game/Public/Types/GameTypes.h", "#pragma once\n");
    write_report(
        &project,
        json!([{
            "file": "Source/Game/Public/Turret.h",
            "type": "missing_include",
            "message": "Cannot find include file: 'GameTypes.h'",
        }]),
    );

    project
        .depforge()
        .arg("fix")
        .assert()
        .success()
        .stdout(predicate::str::contains("Fixed 1 dependency issue"));

    let content = project.read("Source/Game/Public/Turret.h");
    assert!(content.contains("#include \"Types/GameTypes.h\""));
}

#[test]
fn test_fix_skips_existing_include() {
    let project = UnrealProject::new();
    let header = "#include \"CoreMinimal.h\"\n";
    project.write("Source/Game/Turret.h", header);
    write_report(
        &project,
        json!([{
            "file": "Source/Game/Turret.h",
            "type": "missing_include",
            "message": "Cannot find include file: 'CoreMinimal.h'",
        }]),
    );

    project
        .depforge()
        .arg("fix")
        .assert()
        .success()
        .stdout(predicate::str::contains("Fixed 0 dependency issue"));

    assert_eq!(project.read("Source/Game/Turret.h"), header);
}

#[test]
fn test_fix_tops_up_core_modules() {
    let project = UnrealProject::new();
    project.build_cs("Game", &["Core"]);
    write_report(&project, json!([]));

    project
        .depforge()
        .arg("fix")
        .assert()
        .success()
        .stdout(predicate::str::contains("Fixed 1 dependency issue"));

    let content = project.read("Source/Game/Game.Build.cs");
    assert!(content.contains("\"CoreUObject\""));
    assert!(content.contains("\"Engine\""));
}

#[test]
fn test_fix_dry_run_writes_nothing() {
    let project = UnrealProject::new();
    let build_cs = project.build_cs("Game", &["Core"]);
    let original = std::fs::read_to_string(&build_cs).unwrap();
    write_report(&project, json!([]));

    project
        .depforge()
        .args(["fix", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("dry run"));

    assert_eq!(std::fs::read_to_string(&build_cs).unwrap(), original);
}

#[test]
fn test_fix_removes_unused_dependency_when_asked() {
    let project = UnrealProject::new();
    project.build_cs("Game", &["Core", "CoreUObject", "Engine", "Net"]);
    write_report(
        &project,
        json!([{
            "file": "Source/Game/Game.Build.cs",
            "type": "unused_dependency",
            "message": "Module 'Game' declares dependency 'Net' that no header references",
        }]),
    );

    // Without the flag the declaration stays
    project.depforge().arg("fix").assert().success();
    assert!(project.read("Source/Game/Game.Build.cs").contains("\"Net\""));

    project
        .depforge()
        .args(["fix", "--remove-unused"])
        .assert()
        .success();
    let content = project.read("Source/Game/Game.Build.cs");
    assert!(!content.contains("\"Net\""));
    assert!(content.contains("\"Core\""));
}

#[test]
fn test_fix_missing_report_fails() {
    let project = UnrealProject::new();

    project
        .depforge()
        .arg("fix")
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load report"));
}
