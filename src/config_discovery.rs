use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::config::DepforgeConfig;

/// Discovers Depforge configuration by traversing up the directory tree
pub fn discover_config(start_dir: &Path) -> Result<Option<PathBuf>> {
    let mut current = start_dir.to_path_buf();

    loop {
        let config_path = current.join("depforge.toml");
        if config_path.exists() {
            return Ok(Some(config_path));
        }

        // Try to go up one level
        match current.parent() {
            Some(parent) => current = parent.to_path_buf(),
            None => break,
        }
    }

    // Fallback to global config
    if let Some(home) = dirs::home_dir() {
        let global_config = home.join(".config/depforge/config.toml");
        if global_config.exists() {
            return Ok(Some(global_config));
        }
    }

    Ok(None)
}

/// Loads configuration with auto-discovery support
///
/// If `explicit_path` is provided, loads config from that path. Otherwise,
/// auto-discovers config by traversing up the directory tree from cwd and
/// falls back to defaults when nothing is found.
pub fn load_config(explicit_path: Option<&str>) -> Result<DepforgeConfig> {
    if let Some(config_path) = explicit_path {
        return DepforgeConfig::from_file(config_path);
    }

    let current_dir =
        std::env::current_dir().context("Failed to get current directory for config discovery")?;

    match discover_config(&current_dir)? {
        Some(discovered_path) => {
            tracing::info!("[depforge] Using config: {}", discovered_path.display());
            DepforgeConfig::from_file(&discovered_path)
        }
        None => {
            tracing::debug!("[depforge] No configuration file found, using defaults");
            Ok(DepforgeConfig::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_discovers_config_in_parent_dir() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("depforge.toml"), "[project]\nroot = \".\"\n").unwrap();

        let nested = temp.path().join("Source/Game");
        fs::create_dir_all(&nested).unwrap();

        let found = discover_config(&nested).unwrap();
        assert_eq!(found, Some(temp.path().join("depforge.toml")));
    }
}
