use anyhow::Result;
use tracing::info;

use crate::cli::ConfigCommands;
use crate::config::DepforgeConfig;

pub fn run(command: ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Validate { path } => validate(&path),
        ConfigCommands::Generate => generate(),
        ConfigCommands::Show { config } => show(config),
    }
}

fn validate(path: &str) -> Result<()> {
    info!("Validating config file: {}", path);

    let config = DepforgeConfig::from_file(path)?;
    config.validate()?;

    println!("✓ Configuration file is valid: {path}");
    println!("\nSummary:");
    println!("  - Project root: {}", config.project.root);
    println!("  - Report path: {}", config.project.report);
    println!("  - Excluded dirs: {}", config.scan.exclude_dirs.join(", "));
    println!(
        "  - Engine search paths: {}",
        config.engine.search_paths.len()
    );
    println!(
        "  - Known engine modules: {}",
        config.engine.known_modules.len()
    );

    Ok(())
}

fn generate() -> Result<()> {
    info!("Generating example config");

    println!("{}", DepforgeConfig::example());

    Ok(())
}

fn show(config_path: Option<String>) -> Result<()> {
    info!("Showing effective configuration");

    let config = if let Some(path) = config_path {
        DepforgeConfig::from_file(path)?
    } else {
        DepforgeConfig::default()
    };

    println!("Effective Configuration:\n");
    println!("{}", toml::to_string_pretty(&config)?);

    Ok(())
}
