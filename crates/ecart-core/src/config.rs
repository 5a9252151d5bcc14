//! Report configuration
//!
//! Loaded from TOML, falling back to built-in defaults when no file exists:
//!
//! ```toml
//! [report]
//! designated_centres = ["Finance", "IT"]
//! column_padding = 2
//! ```
//!
//! The `ECART_DESIGNATED_CENTRES` environment variable (comma-separated)
//! takes precedence over the file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::spreadsheet::DEFAULT_COLUMN_PADDING;

/// Environment override for the designated centre list
pub const DESIGNATED_CENTRES_ENV: &str = "ECART_DESIGNATED_CENTRES";

/// Centres whose individual expenses appear on the ledger sheet
pub const DEFAULT_DESIGNATED_CENTRES: [&str; 2] = ["Finance", "IT"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportConfig {
    pub designated_centres: Vec<String>,
    /// Extra characters added to the longest value when sizing columns
    pub column_padding: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            designated_centres: DEFAULT_DESIGNATED_CENTRES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            column_padding: DEFAULT_COLUMN_PADDING,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    report: Option<RawReport>,
}

#[derive(Debug, Deserialize)]
struct RawReport {
    designated_centres: Option<Vec<String>>,
    column_padding: Option<usize>,
}

impl ReportConfig {
    /// Parse TOML content; missing keys keep their defaults
    pub fn parse(content: &str) -> Result<Self> {
        let raw: RawConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

        let mut config = Self::default();
        if let Some(report) = raw.report {
            if let Some(centres) = report.designated_centres {
                config.designated_centres = centres;
            }
            if let Some(padding) = report.column_padding {
                config.column_padding = padding;
            }
        }
        Ok(config)
    }

    /// Load from `path`, or from [`default_config_path`] when None, then
    /// apply the environment override
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path.map(Path::to_path_buf).or_else(default_config_path);

        let mut config = match path {
            Some(path) if path.exists() => {
                debug!("Loading report config from {}", path.display());
                let content = fs::read_to_string(&path).map_err(|e| {
                    Error::Config(format!("Failed to read {}: {}", path.display(), e))
                })?;
                Self::parse(&content)?
            }
            _ => Self::default(),
        };

        if let Ok(value) = std::env::var(DESIGNATED_CENTRES_ENV) {
            config.apply_designated_override(&value);
        }
        Ok(config)
    }

    /// Replace the designated centres with a comma-separated list
    ///
    /// Blank entries are dropped; an entirely blank value leaves the list
    /// unchanged.
    pub fn apply_designated_override(&mut self, value: &str) {
        let centres: Vec<String> = value
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        if !centres.is_empty() {
            self.designated_centres = centres;
        }
    }
}

/// `<config dir>/ecart/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("ecart").join("config.toml"))
}
