use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_UNASSIGNED_LABEL: &str = "Unassigned";

/// Top-level application configuration, persisted as TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Valid values for a ticket's location.
    #[serde(default = "default_locations")]
    pub locations: Vec<String>,
    /// People or roles a ticket can be assigned to.
    #[serde(default = "default_responsibles")]
    pub responsibles: Vec<String>,
    /// Sentinel entry meaning nobody owns the ticket yet.
    #[serde(default = "default_unassigned_label")]
    pub unassigned_label: String,
    #[serde(default)]
    pub log: LogConfig,
}

/// Log file settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Default tracing directive, overridden by `RUST_LOG` and `-v`.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log file path. Defaults to `ticketdesk.log` in the config directory.
    #[serde(default)]
    pub file: Option<PathBuf>,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

fn default_locations() -> Vec<String> {
    vec![
        "Building A".to_string(),
        "Building B".to_string(),
        "Cafeteria".to_string(),
        "Library".to_string(),
        "Parking Lot".to_string(),
        "Gymnasium".to_string(),
    ]
}

fn default_responsibles() -> Vec<String> {
    vec![
        "Maintenance Crew".to_string(),
        "Electrician".to_string(),
        "Technician".to_string(),
    ]
}

fn default_unassigned_label() -> String {
    DEFAULT_UNASSIGNED_LABEL.to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            locations: default_locations(),
            responsibles: default_responsibles(),
            unassigned_label: default_unassigned_label(),
            log: LogConfig::default(),
        }
    }
}

impl AppConfig {
    /// Responsible options in display order, with the unassigned sentinel first
    /// and no duplicates.
    pub fn responsible_options(&self) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        let mut options = vec![self.unassigned_label.clone()];
        seen.insert(self.unassigned_label.clone());
        for name in &self.responsibles {
            if !name.is_empty() && seen.insert(name.clone()) {
                options.push(name.clone());
            }
        }
        options
    }

    /// Location options in display order, deduplicated.
    pub fn location_options(&self) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        self.locations
            .iter()
            .filter(|loc| !loc.is_empty() && seen.insert(loc.as_str()))
            .cloned()
            .collect()
    }

    pub fn log_file(&self) -> Result<PathBuf> {
        match &self.log.file {
            Some(path) => Ok(path.clone()),
            None => Ok(config_dir()?.join("ticketdesk.log")),
        }
    }
}

/// Returns the ticketdesk config directory path (`~/.config/ticketdesk/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME not set")?;
    Ok(PathBuf::from(home).join(".config").join("ticketdesk"))
}

/// Returns the config file path (`~/.config/ticketdesk/config.toml`).
pub fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

/// Load the config from `path`. Returns `Ok(None)` if the file does not exist.
pub fn load_config_from(path: &Path) -> Result<Option<AppConfig>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let config: AppConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(Some(config))
}

/// Load the config from the default location, falling back to defaults.
pub fn load_config() -> Result<AppConfig> {
    let path = config_path()?;
    Ok(load_config_from(&path)?.unwrap_or_default())
}
