//! Project directory scanner
//!
//! Walks the project tree once, parses every Build.cs and header, and
//! assembles the results into a [`ProjectScan`]: the dependency graph plus
//! the lookup tables the issue checks run against.

use anyhow::{Context, Result};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::config::DepforgeConfig;
use crate::graph::DependencyGraph;
use crate::project::build_file::BuildFile;
use crate::project::header::{self, HeaderInfo};
use crate::report::Issue;

/// Everything one pass over the project produced
#[derive(Debug, Default)]
pub struct ProjectScan {
    pub root: PathBuf,
    pub build_files: Vec<BuildFile>,
    /// Include search paths collected from Build.cs files
    pub include_paths: Vec<String>,
    /// Header rel path -> owning module (resolved via its `FOO_API` macro)
    pub module_map: HashMap<String, String>,
    /// Reflected type name -> defining header rel path
    pub type_definitions: HashMap<String, String>,
    /// Header rel path -> parsed info
    pub headers: HashMap<String, HeaderInfo>,
    /// Header rel path -> raw content, kept for existence checks and fixes
    pub file_contents: HashMap<String, String>,
    pub graph: DependencyGraph,
    pub issues: Vec<Issue>,
}

pub struct Scanner<'a> {
    root: PathBuf,
    config: &'a DepforgeConfig,
}

impl<'a> Scanner<'a> {
    pub fn new(root: impl Into<PathBuf>, config: &'a DepforgeConfig) -> Self {
        Self {
            root: root.into(),
            config,
        }
    }

    /// Walk the project and parse all Build.cs and header files
    pub fn scan(&self) -> Result<ProjectScan> {
        let mut scan = ProjectScan {
            root: self.root.clone(),
            ..Default::default()
        };

        if !self.root.is_dir() {
            anyhow::bail!("project directory not found: {}", self.root.display());
        }

        let exclude = &self.config.scan.exclude_dirs;
        let mut build_paths = Vec::new();
        let mut header_paths = Vec::new();

        let walker = WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                !(e.depth() > 0
                    && e.file_type().is_dir()
                    && e.file_name()
                        .to_str()
                        .is_some_and(|name| exclude.iter().any(|d| d == name)))
            });

        for entry in walker {
            let entry = entry.context("failed to walk project directory")?;
            if !entry.file_type().is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy();
            if name.ends_with(".Build.cs") || name.ends_with(".build.cs") {
                build_paths.push(entry.into_path());
            } else if name.ends_with(".h") {
                header_paths.push(entry.into_path());
            }
        }

        for path in &build_paths {
            self.scan_build_file(path, &mut scan);
        }
        for path in &header_paths {
            self.scan_header(path, &mut scan);
        }
        scan.link_headers();

        debug!(
            modules = scan.build_files.len(),
            headers = scan.headers.len(),
            edges = scan.graph.edge_count(),
            "project scan complete"
        );

        Ok(scan)
    }

    fn scan_build_file(&self, path: &Path, scan: &mut ProjectScan) {
        let rel = self.rel_path(path);
        let Some(content) = read_lossy(path) else {
            warn!(file = %rel, "failed to read Build.cs file");
            return;
        };

        let Some(build) = BuildFile::parse(path, &rel, &content) else {
            return;
        };

        debug!(module = %build.module, file = %rel, "found module");
        for dep in build.all_deps() {
            scan.graph.add_edge(&build.module, dep);
        }
        scan.include_paths.extend(build.include_paths.iter().cloned());
        scan.build_files.push(build);
    }

    fn scan_header(&self, path: &Path, scan: &mut ProjectScan) {
        let rel = self.rel_path(path);
        let Some(content) = read_lossy(path) else {
            warn!(file = %rel, "failed to read header");
            return;
        };

        let info = header::parse(&content);
        debug!(file = %rel, includes = info.includes.len(), "analyzed header");

        if let Some(macro_module) = &info.module {
            // API macros are SHOUTY module names; map back to the Build.cs
            // module when one matches, otherwise keep the macro's name
            let module = scan
                .build_files
                .iter()
                .find(|b| b.module.eq_ignore_ascii_case(macro_module))
                .map(|b| b.module.clone())
                .unwrap_or_else(|| macro_module.clone());
            scan.module_map.insert(rel.clone(), module);
        }

        for ty in &info.types {
            scan.type_definitions.insert(ty.name.clone(), rel.clone());
        }
        for interface in &info.interfaces {
            scan.type_definitions.insert(interface.clone(), rel.clone());
        }

        for method in &info.implementation_overrides {
            scan.issues.push(Issue::interface_mismatch(&rel, method));
        }

        scan.file_contents.insert(rel.clone(), content);
        scan.headers.insert(rel, info);
    }

    fn rel_path(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/")
    }
}

fn read_lossy(path: &Path) -> Option<String> {
    fs::read(path)
        .ok()
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
}

impl ProjectScan {
    /// Names of modules that have a Build.cs in this project
    pub fn project_modules(&self) -> HashSet<&str> {
        self.build_files.iter().map(|b| b.module.as_str()).collect()
    }

    /// Add header include edges to the graph, pointing at the scanned
    /// header when the include resolves to one and at the bare include
    /// name otherwise. Runs after all headers are read so includes can
    /// resolve forward as well as backward.
    fn link_headers(&mut self) {
        let mut rels: Vec<String> = self.headers.keys().cloned().collect();
        rels.sort_unstable();

        let mut edges = Vec::new();
        for rel in &rels {
            for include in &self.headers[rel].includes {
                let target = self
                    .resolve_to_header(rel, &include.path)
                    .unwrap_or_else(|| include.path.clone());
                edges.push((rel.clone(), target));
            }
        }
        for (from, to) in edges {
            self.graph.add_edge(&from, &to);
        }
    }

    /// Flag quote includes whose target exists nowhere the compiler would
    /// look: next to the including header, at the project root, or under a
    /// collected include path. Engine headers and generated headers are
    /// never flagged.
    pub fn check_missing_includes(&mut self, config: &DepforgeConfig) {
        let mut headers: Vec<&String> = self.headers.keys().collect();
        headers.sort_unstable();

        let mut found = Vec::new();
        for rel in headers {
            let info = &self.headers[rel];
            for include in info.includes.iter().filter(|i| !i.angle) {
                let target = include.path.as_str();
                if target.ends_with(".generated.h") || config.is_engine_include(target) {
                    continue;
                }
                if self.resolves(rel, target) {
                    continue;
                }
                debug!(file = %rel, include = %target, "missing include");
                found.push(Issue::missing_include(rel, target));
            }
        }
        self.issues.extend(found);
    }

    fn resolves(&self, from_rel: &str, include: &str) -> bool {
        // Relative to the including header's directory
        if let Some(parent) = Path::new(from_rel).parent() {
            let sibling = normalize_rel(&parent.join(include));
            if self.file_contents.contains_key(&sibling)
                || self.root.join(&sibling).exists()
            {
                return true;
            }
        }

        // Relative to the project root
        if self.file_contents.contains_key(include) || self.root.join(include).exists() {
            return true;
        }

        // Under a collected include path
        self.include_paths
            .iter()
            .any(|ip| Path::new(ip).join(include).exists())
    }

    /// Check declared module dependencies: flag targets that are neither a
    /// project module nor a known engine module, and project-module targets
    /// no header of the declaring module references.
    pub fn check_module_deps(&mut self, config: &DepforgeConfig) {
        let project_modules: HashSet<String> =
            self.project_modules().iter().map(|s| s.to_string()).collect();
        let used = self.used_modules();

        let mut found = Vec::new();
        for build in &self.build_files {
            for dep in build.all_deps() {
                if dep == build.module {
                    continue;
                }
                if project_modules.contains(dep) {
                    let is_used = used
                        .get(&build.module)
                        .is_some_and(|set| set.contains(dep));
                    if !is_used {
                        found.push(Issue::unused_dependency(
                            &build.rel_path,
                            &build.module,
                            dep,
                        ));
                    }
                } else if !config.is_engine_module(dep) {
                    found.push(Issue::missing_module(&build.rel_path, &build.module, dep));
                }
            }
        }
        self.issues.extend(found);
    }

    /// Module -> set of project modules its headers actually include
    fn used_modules(&self) -> HashMap<String, HashSet<String>> {
        let mut used: HashMap<String, HashSet<String>> = HashMap::new();

        for (rel, info) in &self.headers {
            let Some(from_module) = self.module_map.get(rel) else {
                continue;
            };
            for include in &info.includes {
                let Some(target_rel) = self.resolve_to_header(rel, &include.path) else {
                    continue;
                };
                if let Some(to_module) = self.module_map.get(&target_rel) {
                    if to_module != from_module {
                        used.entry(from_module.clone())
                            .or_default()
                            .insert(to_module.clone());
                    }
                }
            }
        }

        used
    }

    /// Map an include string back to a scanned header's rel path
    fn resolve_to_header(&self, from_rel: &str, include: &str) -> Option<String> {
        if let Some(parent) = Path::new(from_rel).parent() {
            let sibling = normalize_rel(&parent.join(include));
            if self.file_contents.contains_key(&sibling) {
                return Some(sibling);
            }
        }
        if self.file_contents.contains_key(include) {
            return Some(include.to_string());
        }
        let suffix = format!("/{include}");
        self.file_contents
            .keys()
            .find(|rel| rel.ends_with(&suffix))
            .cloned()
    }

    /// Report non-trivial cycles anywhere in the graph
    pub fn detect_cycles(&mut self) {
        for cycle in self.graph.cycles() {
            debug!(cycle = %cycle.join(" -> "), "circular dependency");
            self.issues.push(Issue::circular_dependency(&cycle));
        }
    }

    /// Module-level graph of declared dependencies, for DOT export
    pub fn module_graph(&self) -> DependencyGraph {
        let mut graph = DependencyGraph::new();
        for build in &self.build_files {
            for dep in build.all_deps() {
                graph.add_edge(&build.module, dep);
            }
        }
        graph
    }

    pub fn report(&self) -> crate::report::Report {
        crate::report::Report {
            project: self.root.to_string_lossy().into_owned(),
            modules: self.build_files.len(),
            types_defined: self.type_definitions.len(),
            include_paths: self.include_paths.clone(),
            issues: self.issues.clone(),
        }
    }
}

/// Normalize `a/b/../c` segments out of a relative path
fn normalize_rel(path: &Path) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for comp in path.components() {
        match comp.as_os_str().to_str() {
            Some("..") => {
                parts.pop();
            }
            Some(".") | None => {}
            Some(p) => parts.push(p),
        }
    }
    parts.join("/")
}
