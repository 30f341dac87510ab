use anyhow::Result;
use std::env;
use std::path::{Path, PathBuf};

use crate::cli::DoctorArgs;
use crate::config_discovery;
use crate::fixer::detect_engine_install;

pub fn run(args: DoctorArgs) -> Result<()> {
    println!("🔍 Depforge Doctor - Project Configuration Check\n");

    let mut all_ok = true;

    // Check 1: Depforge binary
    if let Ok(exe_path) = env::current_exe() {
        println!("✅ Depforge binary found: {}", exe_path.display());
        if args.verbose {
            println!("   Version: {}", env!("CARGO_PKG_VERSION"));
        }
    } else {
        println!("❌ Could not determine Depforge binary path");
        all_ok = false;
    }

    // Check 2: Configuration discovery
    let current_dir = env::current_dir()?;
    let config = match config_discovery::discover_config(&current_dir)? {
        Some(config_path) => {
            println!("✅ Configuration found: {}", config_path.display());
            crate::config::DepforgeConfig::from_file(&config_path)?
        }
        None => {
            println!("ℹ️  No depforge.toml found (using defaults)");
            if args.verbose {
                println!("   Run 'depforge config generate > depforge.toml' to create one");
            }
            crate::config::DepforgeConfig::default()
        }
    };

    // Check 3: Project layout
    let project_root = PathBuf::from(
        args.project_dir
            .as_deref()
            .unwrap_or(&config.project.root),
    );
    if project_root.is_dir() {
        println!("✅ Project directory exists: {}", project_root.display());

        match find_uproject(&project_root) {
            Some(uproject) => println!("✅ Unreal project file: {}", uproject.display()),
            None => {
                println!("⚠️  No .uproject file found in {}", project_root.display());
            }
        }

        if project_root.join("Source").is_dir() {
            println!("✅ Source directory present");
        } else {
            println!("❌ No Source directory - is this an Unreal project?");
            all_ok = false;
        }
    } else {
        println!("❌ Project directory not found: {}", project_root.display());
        all_ok = false;
    }

    // Check 4: Engine installation
    match detect_engine_install(&config) {
        Some(engine) => println!("✅ Unreal Engine found at: {}", engine.display()),
        None => {
            println!("⚠️  Could not auto-detect Unreal Engine");
            println!("   Set UNREAL_ENGINE_DIR or engine.search_paths in depforge.toml");
        }
    }

    // Check 5: Previous report
    let report_path = Path::new(&config.project.report);
    if report_path.exists() {
        println!("✅ Dependency report present: {}", report_path.display());
    } else {
        println!("ℹ️  No dependency report yet (run 'depforge crawl')");
    }

    // Check 6: Environment variables
    if args.verbose {
        println!("\n📋 Environment Variables:");
        let env_vars = [
            "DEPFORGE_CONFIG",
            "DEPFORGE_PROJECT_DIR",
            "DEPFORGE_REPORT",
            "DEPFORGE_LOG_FORMAT",
            "UNREAL_ENGINE_DIR",
        ];

        let mut any_set = false;
        for var in &env_vars {
            if let Ok(value) = env::var(var) {
                println!("   {var} = {value}");
                any_set = true;
            }
        }

        if !any_set {
            println!("   (None set)");
        }
    }

    // Summary
    println!();
    if all_ok {
        println!("✅ All checks passed! Depforge is ready to run.");
    } else {
        println!("⚠️  Some issues detected. Please fix the items marked with ❌ above.");
        std::process::exit(1);
    }

    Ok(())
}

fn find_uproject(project_root: &Path) -> Option<PathBuf> {
    std::fs::read_dir(project_root)
        .ok()?
        .filter_map(Result::ok)
        .map(|e| e.path())
        .find(|p| p.extension().is_some_and(|ext| ext == "uproject"))
}
