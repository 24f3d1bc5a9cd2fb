mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    // Try default locations
    let default_paths = [
        "./config.toml",
        "./linguarr.toml",
        "~/.config/linguarr/config.toml",
        "/etc/linguarr/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    // Return default config if no file found
    Ok(Config::default())
}

/// Validate configuration
fn validate_config(config: &Config) -> Result<()> {
    for catalog in &config.catalogs {
        if catalog.enabled && catalog.api_key.is_empty() {
            anyhow::bail!("Catalog '{}' is enabled but has no API key", catalog.name);
        }
        if catalog.enabled && catalog.url.is_empty() {
            anyhow::bail!("Catalog '{}' is enabled but has no URL", catalog.name);
        }
    }

    if config.settings.probe_concurrency == 0 {
        anyhow::bail!("settings.probe_concurrency must be at least 1");
    }
    if config.settings.remediation_concurrency == 0 {
        anyhow::bail!("settings.remediation_concurrency must be at least 1");
    }
    if config.settings.language_codes.is_empty() {
        anyhow::bail!("settings.language_codes must not be empty");
    }

    Ok(())
}
