use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Complete Depforge configuration (loaded from TOML file)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DepforgeConfig {
    #[serde(default)]
    pub project: ProjectConfig,

    #[serde(default)]
    pub scan: ScanConfig,

    #[serde(default)]
    pub engine: EngineConfig,

    #[serde(default)]
    pub fix: FixConfig,
}

/// Project layout configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Project root directory
    #[serde(default = "default_project_root")]
    pub root: String,

    /// Report output path (relative to the working directory)
    #[serde(default = "default_report_path")]
    pub report: String,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            root: default_project_root(),
            report: default_report_path(),
        }
    }
}

/// Scanner configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Directory names skipped during scanning (generated output trees)
    #[serde(default = "default_exclude_dirs")]
    pub exclude_dirs: Vec<String>,

    /// Root directories searched when resolving include paths
    #[serde(default = "default_source_roots")]
    pub source_roots: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            exclude_dirs: default_exclude_dirs(),
            source_roots: default_source_roots(),
        }
    }
}

/// Unreal Engine installation and built-in name tables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Candidate engine install locations, probed in order.
    /// UNREAL_ENGINE_DIR is always probed last.
    #[serde(default = "default_engine_search_paths")]
    pub search_paths: Vec<String>,

    /// Engine headers that resolve to themselves and are never "missing"
    #[serde(default = "default_known_includes")]
    pub known_includes: Vec<String>,

    /// Engine modules that are valid dependency targets without a Build.cs
    #[serde(default = "default_known_modules")]
    pub known_modules: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            search_paths: default_engine_search_paths(),
            known_includes: default_known_includes(),
            known_modules: default_known_modules(),
        }
    }
}

/// Fixer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixConfig {
    /// Modules every Build.cs is expected to depend on
    #[serde(default = "default_core_modules")]
    pub core_modules: Vec<String>,

    /// Extra module appended to Build.cs files whose path contains the key
    /// (e.g. "Sessions" -> "OnlineSubsystem")
    #[serde(default = "default_path_modules")]
    pub path_modules: Vec<PathModuleRule>,
}

impl Default for FixConfig {
    fn default() -> Self {
        Self {
            core_modules: default_core_modules(),
            path_modules: default_path_modules(),
        }
    }
}

/// Path-triggered module dependency rule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathModuleRule {
    /// Substring matched against the Build.cs path
    pub path_contains: String,
    /// Module appended when the substring matches
    pub module: String,
}

fn default_project_root() -> String {
    ".".to_string()
}

fn default_report_path() -> String {
    "dependency_report.json".to_string()
}

fn default_exclude_dirs() -> Vec<String> {
    ["Intermediate", "Binaries", "Saved", "DerivedDataCache"]
        .map(String::from)
        .to_vec()
}

fn default_source_roots() -> Vec<String> {
    ["Source", "Plugins"].map(String::from).to_vec()
}

fn default_engine_search_paths() -> Vec<String> {
    [
        "C:/Program Files/Epic Games/UE_5.5",
        "C:/Program Files/Epic Games/UE_5.4",
        "C:/Program Files/Epic Games/UE_5.3",
        "/opt/unreal-engine",
    ]
    .map(String::from)
    .to_vec()
}

fn default_known_includes() -> Vec<String> {
    [
        "CoreMinimal.h",
        "Modules/ModuleManager.h",
        "UObject/NoExportTypes.h",
        "UObject/Interface.h",
        "Components/ActorComponent.h",
        "GameFramework/Actor.h",
        "OnlineSubsystem.h",
        "OnlineSessionSettings.h",
        "OnlineSubsystemTypes.h",
        "HAL/ThreadSafeBool.h",
        "Templates/SharedPointer.h",
        "Containers/Ticker.h",
    ]
    .map(String::from)
    .to_vec()
}

fn default_known_modules() -> Vec<String> {
    [
        "Core",
        "CoreUObject",
        "Engine",
        "InputCore",
        "Slate",
        "SlateCore",
        "UMG",
        "Projects",
        "ApplicationCore",
        "NetCore",
        "Sockets",
        "Networking",
        "OnlineSubsystem",
        "OnlineSubsystemUtils",
        "DeveloperSettings",
        "GameplayTags",
        "RHI",
        "RenderCore",
    ]
    .map(String::from)
    .to_vec()
}

fn default_core_modules() -> Vec<String> {
    ["Core", "CoreUObject", "Engine"].map(String::from).to_vec()
}

fn default_path_modules() -> Vec<PathModuleRule> {
    vec![PathModuleRule {
        path_contains: "Sessions".to_string(),
        module: "OnlineSubsystem".to_string(),
    }]
}

impl DepforgeConfig {
    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: DepforgeConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;

        Ok(config)
    }

    /// Generate example configuration as TOML string
    pub fn example() -> String {
        let config = DepforgeConfig {
            project: ProjectConfig {
                root: ".".to_string(),
                report: "dependency_report.json".to_string(),
            },
            ..Default::default()
        };

        toml::to_string_pretty(&config).unwrap()
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.project.root.is_empty() {
            anyhow::bail!("project.root must be set");
        }

        if self.project.report.is_empty() {
            anyhow::bail!("project.report must be set");
        }

        if self.scan.source_roots.is_empty() {
            anyhow::bail!("scan.source_roots must name at least one directory");
        }

        for rule in &self.fix.path_modules {
            if rule.path_contains.is_empty() || rule.module.is_empty() {
                anyhow::bail!("fix.path_modules entries need both path_contains and module");
            }
        }

        Ok(())
    }

    /// True when the module is a project-external engine module
    pub fn is_engine_module(&self, name: &str) -> bool {
        self.engine.known_modules.iter().any(|m| m == name)
    }

    /// True when the include is a well-known engine header
    pub fn is_engine_include(&self, include: &str) -> bool {
        self.engine.known_includes.iter().any(|i| i == include)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DepforgeConfig::default();
        assert_eq!(config.project.root, ".");
        assert_eq!(config.project.report, "dependency_report.json");
        assert!(config.scan.exclude_dirs.contains(&"Intermediate".into()));
        assert!(config.engine.known_modules.contains(&"Core".into()));
        config.validate().unwrap();
    }

    #[test]
    fn test_parse_partial_config() {
        let config: DepforgeConfig = toml::from_str(
            r#"
            [project]
            root = "Game"

            [scan]
            exclude_dirs = ["Intermediate"]
            "#,
        )
        .unwrap();

        assert_eq!(config.project.root, "Game");
        assert_eq!(config.scan.exclude_dirs, vec!["Intermediate".to_string()]);
        // Untouched sections keep their defaults
        assert_eq!(config.project.report, "dependency_report.json");
        assert!(config.is_engine_include("CoreMinimal.h"));
    }

    #[test]
    fn test_validate_rejects_empty_root() {
        let mut config = DepforgeConfig::default();
        config.project.root = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_example_round_trips() {
        let example = DepforgeConfig::example();
        let parsed: DepforgeConfig = toml::from_str(&example).unwrap();
        parsed.validate().unwrap();
    }
}
