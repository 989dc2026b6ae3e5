use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Database location. Default: ~/.timeline/timeline.db
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    /// chrono format used when rendering dates. Default: "%d-%m-%Y"
    #[serde(default = "default_date_format")]
    pub date_format: String,

    /// Maximum tracing level written to stderr. Default: "warn"
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            database_path: None,
            date_format: default_date_format(),
            log_level: default_log_level(),
        }
    }
}

fn default_date_format() -> String {
    "%d-%m-%Y".to_string()
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Config {
    /// Resolved database path, falling back to the default location.
    pub fn db_path(&self) -> Result<PathBuf> {
        match self.database_path {
            Some(ref path) => Ok(path.clone()),
            None => db_path(),
        }
    }

    /// Parsed `log_level`; unknown values fall back to `WARN`.
    pub fn tracing_level(&self) -> tracing::Level {
        self.log_level
            .parse()
            .unwrap_or(tracing::Level::WARN)
    }

    /// Render a date with `date_format`. An unusable format string falls
    /// back to ISO 8601 instead of panicking mid-render.
    pub fn format_date(&self, date: chrono::NaiveDate) -> String {
        let mut out = String::new();
        match write!(out, "{}", date.format(&self.date_format)) {
            Ok(()) => out,
            Err(_) => date.format("%F").to_string(),
        }
    }
}

/// Returns the base config directory: ~/.timeline/
pub fn base_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("could not determine home directory")?;
    Ok(home.join(".timeline"))
}

/// Returns the default path to the `SQLite` database
pub fn db_path() -> Result<PathBuf> {
    Ok(base_dir()?.join("timeline.db"))
}

pub fn config_path() -> Result<PathBuf> {
    Ok(base_dir()?.join("config.toml"))
}

/// Ensure the config directory exists
pub fn ensure_dirs() -> Result<()> {
    let base = base_dir()?;
    fs::create_dir_all(&base).context("failed to create ~/.timeline/")?;
    Ok(())
}

/// Load config from ~/.timeline/config.toml (or return defaults if it doesn't exist)
pub fn load() -> Result<Config> {
    load_from(&config_path()?)
}

pub fn load_from(path: &Path) -> Result<Config> {
    if path.exists() {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config: Config =
            toml::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))?;
        Ok(config)
    } else {
        Ok(Config::default())
    }
}
