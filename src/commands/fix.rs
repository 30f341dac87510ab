use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::cli::FixArgs;
use crate::cli_utils::depforge_prefix;
use crate::config_discovery;
use crate::fixer::{detect_engine_install, Fixer};
use crate::report::Report;

pub fn run(args: FixArgs) -> Result<()> {
    let config = config_discovery::load_config(args.config.as_deref())?;

    let report_path = PathBuf::from(args.report.as_deref().unwrap_or(&config.project.report));
    let project_root = PathBuf::from(
        args.project_dir
            .as_deref()
            .unwrap_or(&config.project.root),
    );

    let report = Report::load(&report_path)
        .with_context(|| format!("failed to load report from {}", report_path.display()))?;

    println!(
        "🔍 Found {} issue(s) in {}",
        report.issues.len(),
        report_path.display()
    );

    match detect_engine_install(&config) {
        Some(engine) => println!("✅ Found Unreal Engine at: {}", engine.display()),
        None => println!(
            "⚠️  Could not auto-detect Unreal Engine path. Some fixes may not be applied."
        ),
    }

    let mut fixer = Fixer::new(
        project_root.as_path(),
        &config,
        args.dry_run,
        args.remove_unused,
    );
    let applied = fixer.apply(&report)?;

    if args.dry_run {
        println!(
            "{} dry run: {} file(s) would change",
            depforge_prefix(),
            applied
        );
    } else {
        println!("✅ Fixed {applied} dependency issue(s)");
    }

    Ok(())
}
