//! Subcommand implementations.

pub mod config;
pub mod process;
pub mod schemas;

use std::path::{Path, PathBuf};

use invex_core::{invoice_registry, InvexConfig, SchemaRegistry};

/// Default config location: `<config_dir>/invex/config.json`.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("invex")
        .join("config.json")
}

/// Resolve the config file: explicit `--config`, else the default location.
pub fn config_path(explicit: Option<&str>) -> PathBuf {
    explicit.map(PathBuf::from).unwrap_or_else(default_config_path)
}

/// Load the config file (defaults when absent) and apply environment overrides.
pub fn load_config(explicit: Option<&str>) -> anyhow::Result<InvexConfig> {
    let path = config_path(explicit);
    let mut config = if path.exists() {
        InvexConfig::from_file(&path)?
    } else if explicit.is_some() {
        anyhow::bail!("Config file not found: {}", path.display());
    } else {
        InvexConfig::default()
    };
    config.apply_env()?;
    Ok(config)
}

/// Schemas from `override_path`, else from the config, else the built-in set.
pub fn load_registry(override_path: Option<&Path>, config: &InvexConfig) -> anyhow::Result<SchemaRegistry> {
    match override_path.or(config.schemas.as_deref()) {
        Some(path) => Ok(SchemaRegistry::from_file(path)?),
        None => Ok(invoice_registry()?),
    }
}
