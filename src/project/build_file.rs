//! Build.cs module descriptor parsing
//!
//! UnrealBuildTool descriptors are C# source, but the dependency metadata
//! lives in a handful of stereotyped `AddRange(new string[] { ... })` calls
//! that regex extraction handles reliably.

use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

fn public_deps_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"PublicDependencyModuleNames\.AddRange\(\s*new\s+string\[\]\s*\{([^}]+)\}\s*\)")
            .unwrap()
    })
}

fn private_deps_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"PrivateDependencyModuleNames\.AddRange\(\s*new\s+string\[\]\s*\{([^}]+)\}\s*\)",
        )
        .unwrap()
    })
}

fn include_paths_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"PublicIncludePaths\.AddRange\(\s*new\s+string\[\]\s*\{([^}]+)\}\s*\)").unwrap()
    })
}

fn quoted_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#""([^"]+)""#).unwrap())
}

/// Parsed `*.Build.cs` module descriptor
#[derive(Debug, Clone)]
pub struct BuildFile {
    /// Module name ("Game" from `Game.Build.cs`)
    pub module: String,
    /// Path relative to the project root, forward slashes
    pub rel_path: String,
    pub public_deps: Vec<String>,
    pub private_deps: Vec<String>,
    /// Include search paths, with `ModuleDirectory` resolved
    pub include_paths: Vec<String>,
}

/// Module name for a Build.cs path: `Source/Game/Game.Build.cs` -> `Game`
pub fn module_name(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_str()?;
    name.strip_suffix(".Build.cs")
        .or_else(|| name.strip_suffix(".build.cs"))
        .map(str::to_string)
}

/// Extract quoted entries from every capture of `re` in `content`
fn extract_quoted(re: &Regex, content: &str) -> Vec<String> {
    re.captures_iter(content)
        .flat_map(|cap| {
            let block = cap.get(1).map_or("", |m| m.as_str()).to_string();
            quoted_re()
                .captures_iter(&block)
                .map(|q| q[1].to_string())
                .collect::<Vec<_>>()
        })
        .collect()
}

impl BuildFile {
    /// Parse a Build.cs file's content. `path` is the absolute location on
    /// disk (used to resolve `ModuleDirectory`), `rel_path` the
    /// project-relative form recorded in reports.
    pub fn parse(path: &Path, rel_path: &str, content: &str) -> Option<Self> {
        let module = module_name(path)?;

        let public_deps = extract_quoted(public_deps_re(), content);
        let private_deps = extract_quoted(private_deps_re(), content);

        let module_dir = path.parent().map(|p| p.to_string_lossy().into_owned());
        let include_paths = extract_quoted(include_paths_re(), content)
            .into_iter()
            .map(|p| match &module_dir {
                Some(dir) if p.contains("ModuleDirectory") => p.replace("ModuleDirectory", dir),
                _ => p,
            })
            .collect();

        Some(Self {
            module,
            rel_path: rel_path.to_string(),
            public_deps,
            private_deps,
            include_paths,
        })
    }

    /// Public and private dependencies in declaration order
    pub fn all_deps(&self) -> impl Iterator<Item = &str> {
        self.public_deps
            .iter()
            .chain(self.private_deps.iter())
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const GAME_BUILD_CS: &str = r#"
using UnrealBuildTool;

public class Game : ModuleRules
{
    public Game(ReadOnlyTargetRules Target) : base(Target)
    {
        PCHUsage = PCHUsageMode.UseExplicitOrSharedPCHs;

        PublicDependencyModuleNames.AddRange(new string[] {
            "Core",
            "CoreUObject",
            "Engine"
        });

        PrivateDependencyModuleNames.AddRange(new string[] { "Slate", "SlateCore" });

        PublicIncludePaths.AddRange(new string[] {
            "ModuleDirectory/Public"
        });
    }
}
"#;

    #[test]
    fn test_module_name_strips_build_suffix() {
        assert_eq!(
            module_name(&PathBuf::from("Source/Game/Game.Build.cs")),
            Some("Game".to_string())
        );
        assert_eq!(
            module_name(&PathBuf::from("Source/Net/net.build.cs")),
            Some("net".to_string())
        );
        assert_eq!(module_name(&PathBuf::from("Source/Game/Game.cs")), None);
    }

    #[test]
    fn test_parse_dependencies() {
        let path = PathBuf::from("/project/Source/Game/Game.Build.cs");
        let build = BuildFile::parse(&path, "Source/Game/Game.Build.cs", GAME_BUILD_CS).unwrap();

        assert_eq!(build.module, "Game");
        assert_eq!(build.public_deps, vec!["Core", "CoreUObject", "Engine"]);
        assert_eq!(build.private_deps, vec!["Slate", "SlateCore"]);
        assert_eq!(build.all_deps().count(), 5);
    }

    #[test]
    fn test_parse_resolves_module_directory() {
        let path = PathBuf::from("/project/Source/Game/Game.Build.cs");
        let build = BuildFile::parse(&path, "Source/Game/Game.Build.cs", GAME_BUILD_CS).unwrap();

        assert_eq!(
            build.include_paths,
            vec!["/project/Source/Game/Public".to_string()]
        );
    }

    #[test]
    fn test_parse_without_dependency_blocks() {
        let path = PathBuf::from("/project/Source/Empty/Empty.Build.cs");
        let build = BuildFile::parse(
            &path,
            "Source/Empty/Empty.Build.cs",
            "public class Empty : ModuleRules {}",
        )
        .unwrap();

        assert!(build.public_deps.is_empty());
        assert!(build.private_deps.is_empty());
        assert!(build.include_paths.is_empty());
    }
}
