// Common test utilities shared across acceptance tests
//
// Each test materializes a small Unreal project tree in its own temp
// directory and runs the depforge binary with the temp dir as working
// directory, so reports land inside the fixture and tests can run in
// parallel without sharing state.

use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A throwaway Unreal project fixture
pub struct UnrealProject {
    temp_dir: TempDir,
}

impl UnrealProject {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Run depforge with the project root as working directory
    pub fn depforge(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_depforge"));
        cmd.current_dir(self.root());
        cmd
    }

    pub fn write(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.root().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path
    }

    /// Write a Build.cs for `module` under Source/<module>/
    pub fn build_cs(&self, module: &str, public_deps: &[&str]) -> PathBuf {
        let deps = public_deps
            .iter()
            .map(|d| format!("\"{d}\""))
            .collect::<Vec<_>>()
            .join(", ");
        let content = format!(
            "using UnrealBuildTool;\n\n\
             public class {module} : ModuleRules\n\
             {{\n\
                 public {module}(ReadOnlyTargetRules Target) : base(Target)\n\
                 {{\n\
                     PublicDependencyModuleNames.AddRange(new string[] {{ {deps} }});\n\
                 }}\n\
             }}\n"
        );
        self.write(&format!("Source/{module}/{module}.Build.cs"), &content)
    }

    pub fn read(&self, rel: &str) -> String {
        fs::read_to_string(self.root().join(rel)).unwrap()
    }

    pub fn exists(&self, rel: &str) -> bool {
        self.root().join(rel).exists()
    }

    /// Parse the generated dependency report
    pub fn report(&self) -> serde_json::Value {
        serde_json::from_str(&self.read("dependency_report.json")).unwrap()
    }

    /// Issue entries of a given type from the report
    pub fn issues_of_kind(&self, kind: &str) -> Vec<serde_json::Value> {
        self.report()["issues"]
            .as_array()
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .filter(|issue| issue["type"] == kind)
            .collect()
    }
}
