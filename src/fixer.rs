//! Automated repairs driven by a crawler report
//!
//! The fixer edits project files in place: inserting missing includes with
//! a corrected path, topping up Build.cs files that lack the core engine
//! modules, and (opt-in) removing declared dependencies no header uses.

use anyhow::{Context, Result};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::DepforgeConfig;
use crate::report::{Issue, IssueKind, Report};

fn include_block_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"(?:#include\s+[<"][^\n]*[>"][^\S\n]*\n)+"#).unwrap())
}

fn public_deps_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"PublicDependencyModuleNames\.AddRange\(\s*new\s+string\[\]\s*\{([^}]*)\}\s*\)")
            .unwrap()
    })
}

fn deps_blocks_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?:Public|Private)DependencyModuleNames\.AddRange\(\s*new\s+string\[\]\s*\{([^}]*)\}\s*\)",
        )
        .unwrap()
    })
}

/// Probe configured engine install locations, then UNREAL_ENGINE_DIR
pub fn detect_engine_install(config: &DepforgeConfig) -> Option<PathBuf> {
    let env_dir = std::env::var("UNREAL_ENGINE_DIR").ok();
    config
        .engine
        .search_paths
        .iter()
        .map(String::as_str)
        .chain(env_dir.as_deref())
        .map(PathBuf::from)
        .find(|p| p.is_dir())
}

pub struct Fixer<'a> {
    project_root: PathBuf,
    config: &'a DepforgeConfig,
    dry_run: bool,
    remove_unused: bool,
    applied: usize,
}

impl<'a> Fixer<'a> {
    pub fn new(
        project_root: impl Into<PathBuf>,
        config: &'a DepforgeConfig,
        dry_run: bool,
        remove_unused: bool,
    ) -> Self {
        Self {
            project_root: project_root.into(),
            config,
            dry_run,
            remove_unused,
            applied: 0,
        }
    }

    /// Apply every fixable issue in the report, then top up Build.cs core
    /// dependencies. Returns the number of files changed.
    pub fn apply(&mut self, report: &Report) -> Result<usize> {
        info!(issues = report.issues.len(), "applying fixes from report");

        for issue in &report.issues {
            match issue.kind {
                IssueKind::MissingInclude => self.fix_missing_include(issue)?,
                IssueKind::UnusedDependency if self.remove_unused => {
                    self.remove_unused_dependency(issue)?
                }
                _ => {}
            }
        }

        self.update_build_files()?;

        Ok(self.applied)
    }

    fn fix_missing_include(&mut self, issue: &Issue) -> Result<()> {
        let (Some(file), Some(include)) = (issue.file.as_deref(), issue.first_quoted()) else {
            warn!(message = %issue.message, "malformed missing_include issue, skipping");
            return Ok(());
        };

        let full_path = self.project_root.join(file);
        if !full_path.exists() {
            warn!(file, "file not found, skipping");
            return Ok(());
        }

        let content = read_lossy(&full_path)
            .with_context(|| format!("failed to read {}", full_path.display()))?;

        if has_include(&content, include) {
            debug!(file, include, "include already present, skipping");
            return Ok(());
        }

        let Some(corrected) = self.resolve_include_path(include, file) else {
            debug!(file, include, "no resolvable path for include, skipping");
            return Ok(());
        };

        let line = format!("#include \"{corrected}\"\n");
        let new_content = match include_block_re().find(&content) {
            Some(block) => {
                let mut updated = String::with_capacity(content.len() + line.len());
                updated.push_str(&content[..block.end()]);
                updated.push_str(&line);
                updated.push_str(&content[block.end()..]);
                updated
            }
            None => format!("{line}{content}"),
        };

        self.write(&full_path, file, &new_content)?;
        info!(file, include = %corrected, "added include");
        Ok(())
    }

    /// Find the correct path for an include file
    fn resolve_include_path(&self, include: &str, source_file: &str) -> Option<String> {
        // Well-known engine headers resolve to themselves
        if self.config.is_engine_include(include) {
            return Some(include.to_string());
        }

        // Generated headers are produced by UHT, never inserted by hand
        if include.ends_with(".generated.h") {
            return None;
        }

        // Search the project's source roots for the file
        if let Some(found) = self.find_in_source_roots(include) {
            let source_dir = self
                .project_root
                .join(source_file)
                .parent()
                .map(Path::to_path_buf)?;
            let rel = relative_path(&source_dir, &found);
            return Some(rel.to_string_lossy().replace('\\', "/"));
        }

        // Fall back to the include as written
        Some(include.to_string())
    }

    fn find_in_source_roots(&self, include: &str) -> Option<PathBuf> {
        let needle = format!("/{}", include.trim_start_matches('/'));

        for source_root in &self.config.scan.source_roots {
            let base = self.project_root.join(source_root);
            if !base.is_dir() {
                continue;
            }
            for entry in WalkDir::new(&base)
                .sort_by_file_name()
                .into_iter()
                .filter_map(Result::ok)
            {
                if !entry.file_type().is_file() {
                    continue;
                }
                let path_str = entry.path().to_string_lossy().replace('\\', "/");
                if path_str.ends_with(&needle) {
                    return Some(entry.into_path());
                }
            }
        }

        None
    }

    /// Ensure every Build.cs declares the configured core modules, plus any
    /// path-triggered extras (e.g. Sessions modules get OnlineSubsystem)
    fn update_build_files(&mut self) -> Result<()> {
        let exclude = &self.config.scan.exclude_dirs;
        let build_files: Vec<PathBuf> = WalkDir::new(&self.project_root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                !(e.depth() > 0
                    && e.file_type().is_dir()
                    && e.file_name()
                        .to_str()
                        .is_some_and(|name| exclude.iter().any(|d| d == name)))
            })
            .filter_map(Result::ok)
            .filter(|e| {
                e.file_type().is_file()
                    && e.file_name()
                        .to_str()
                        .is_some_and(|n| n.ends_with(".Build.cs") || n.ends_with(".build.cs"))
            })
            .map(|e| e.into_path())
            .collect();

        for build_file in build_files {
            self.update_build_file(&build_file)?;
        }

        Ok(())
    }

    fn update_build_file(&mut self, path: &Path) -> Result<()> {
        let content =
            read_lossy(path).with_context(|| format!("failed to read {}", path.display()))?;

        if !content.contains("PublicDependencyModuleNames") {
            return Ok(());
        }

        let path_str = path.to_string_lossy().replace('\\', "/");
        let mut additions: Vec<&str> = self
            .config
            .fix
            .core_modules
            .iter()
            .map(String::as_str)
            .filter(|m| !content.contains(*m))
            .collect();
        additions.extend(
            self.config
                .fix
                .path_modules
                .iter()
                .filter(|rule| {
                    path_str.contains(&rule.path_contains) && !content.contains(&rule.module)
                })
                .map(|rule| rule.module.as_str()),
        );

        if additions.is_empty() {
            return Ok(());
        }

        let Some(section) = public_deps_re()
            .captures(&content)
            .and_then(|cap| cap.get(1))
        else {
            return Ok(());
        };

        let mut new_section = section.as_str().trim_end().to_string();
        for module in &additions {
            new_section.push_str(",\n            \"");
            new_section.push_str(module);
            new_section.push('"');
        }

        let mut new_content = String::with_capacity(content.len() + 64);
        new_content.push_str(&content[..section.start()]);
        new_content.push_str(&new_section);
        new_content.push_str(&content[section.end()..]);

        let rel = path
            .strip_prefix(&self.project_root)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/");
        self.write(path, &rel, &new_content)?;
        info!(file = %rel, modules = ?additions, "updated module dependencies");
        Ok(())
    }

    fn remove_unused_dependency(&mut self, issue: &Issue) -> Result<()> {
        let (Some(file), Some(dep)) = (issue.file.as_deref(), issue.second_quoted()) else {
            warn!(message = %issue.message, "malformed unused_dependency issue, skipping");
            return Ok(());
        };

        // Never strip the core modules, whatever the report says
        if self.config.fix.core_modules.iter().any(|m| m == dep) {
            return Ok(());
        }

        let full_path = self.project_root.join(file);
        if !full_path.exists() {
            warn!(file, "Build.cs not found, skipping");
            return Ok(());
        }

        let content = read_lossy(&full_path)
            .with_context(|| format!("failed to read {}", full_path.display()))?;

        let entry_trailing = Regex::new(&format!(r#""{}"\s*,\s*"#, regex::escape(dep)))?;
        let entry_leading = Regex::new(&format!(r#",\s*"{}""#, regex::escape(dep)))?;

        let mut new_content = content.clone();
        // Only rewrite inside dependency AddRange blocks, back to front so
        // earlier match offsets stay valid
        let blocks: Vec<(usize, usize)> = deps_blocks_re()
            .captures_iter(&content)
            .filter_map(|cap| cap.get(1).map(|m| (m.start(), m.end())))
            .collect();
        for (start, end) in blocks.into_iter().rev() {
            let block = &new_content[start..end];
            let replaced = entry_trailing.replace(block, "");
            let replaced = entry_leading.replace(&replaced, "").into_owned();
            new_content.replace_range(start..end, &replaced);
        }

        if new_content == content {
            debug!(file, dep, "dependency not present, skipping");
            return Ok(());
        }

        self.write(&full_path, file, &new_content)?;
        info!(file, dep, "removed unused dependency");
        Ok(())
    }

    fn write(&mut self, path: &Path, rel: &str, content: &str) -> Result<()> {
        if self.dry_run {
            info!(file = %rel, "dry run, not writing");
        } else {
            fs::write(path, content)
                .with_context(|| format!("failed to write {}", path.display()))?;
        }
        self.applied += 1;
        Ok(())
    }
}

/// True when the file already carries the include in quote or angle form
pub fn has_include(content: &str, include: &str) -> bool {
    content.contains(&format!("#include \"{include}\""))
        || content.contains(&format!("#include <{include}>"))
}

/// Relative path from `from_dir` to `target`
fn relative_path(from_dir: &Path, target: &Path) -> PathBuf {
    let from: Vec<_> = from_dir.components().collect();
    let to: Vec<_> = target.components().collect();
    let common = from
        .iter()
        .zip(to.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut rel = PathBuf::new();
    for _ in common..from.len() {
        rel.push("..");
    }
    for comp in &to[common..] {
        rel.push(comp);
    }
    rel
}

fn read_lossy(path: &Path) -> Result<String> {
    let bytes = fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
