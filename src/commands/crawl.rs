use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use tracing::info;

use crate::cli::CrawlArgs;
use crate::cli_utils::depforge_prefix;
use crate::config_discovery;
use crate::project::Scanner;
use crate::report::Issue;

pub fn run(args: CrawlArgs) -> Result<()> {
    let config = config_discovery::load_config(args.config.as_deref())?;

    let project_root = PathBuf::from(
        args.project_dir
            .as_deref()
            .unwrap_or(&config.project.root),
    );
    let report_path = PathBuf::from(args.report.as_deref().unwrap_or(&config.project.report));

    println!("🔍 Scanning project: {}", project_root.display());

    let mut scan = Scanner::new(&project_root, &config)
        .scan()
        .context("project scan failed")?;

    scan.check_missing_includes(&config);
    scan.check_module_deps(&config);
    scan.detect_cycles();

    let report = scan.report();
    report
        .save(&report_path)
        .with_context(|| format!("failed to save report to {}", report_path.display()))?;
    info!(report = %report_path.display(), issues = report.issues.len(), "report written");

    if let Some(graph_path) = &args.graph {
        let dot = scan.module_graph().to_dot();
        fs::write(graph_path, dot)
            .with_context(|| format!("failed to write graph to {graph_path}"))?;
        println!("📈 Module graph saved to {graph_path}");
    }

    print_summary(&report.issues, &scan, args.verbose);
    println!(
        "{} report saved to {}",
        depforge_prefix(),
        report_path.display()
    );

    if report.issues.is_empty() {
        println!("\n✅ Dependency analysis completed - no issues found");
        Ok(())
    } else {
        println!(
            "\n⚠️  Dependency analysis completed with {} issue(s). See report for details.",
            report.issues.len()
        );
        std::process::exit(1);
    }
}

fn print_summary(issues: &[Issue], scan: &crate::project::ProjectScan, verbose: bool) {
    println!("\n📊 Dependency Analysis Summary");
    println!("  📦 Modules found: {}", scan.build_files.len());
    println!("  🏷️  Type definitions: {}", scan.type_definitions.len());
    println!("  ❌ Issues detected: {}", issues.len());

    if verbose {
        for build in &scan.build_files {
            println!("    📦 {} ({})", build.module, build.rel_path);
        }
        for path in &scan.include_paths {
            println!("    📁 Include path: {path}");
        }
    }

    if issues.is_empty() {
        return;
    }

    // Group issues by file; project-wide issues go under "project"
    let mut by_file: BTreeMap<&str, Vec<&Issue>> = BTreeMap::new();
    for issue in issues {
        by_file
            .entry(issue.file.as_deref().unwrap_or("project"))
            .or_default()
            .push(issue);
    }

    println!("\n❌ Issues by file:");
    for (file, file_issues) in by_file {
        println!("  📄 {file}:");
        for issue in file_issues {
            println!("    • {}", issue.message);
        }
    }
}
