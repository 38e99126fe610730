use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use volboard::{CategoryRules, Record, Settings, normalize_json};

use crate::output::OutputManager;

/// Settings and derived helpers shared by the list commands
pub struct AppContext {
    pub settings: Settings,
    /// Where the settings came from, if a file was found
    pub config_path: Option<PathBuf>,
    pub rules: CategoryRules,
}

impl AppContext {
    /// Load settings from `explicit`, or from the nearest `volboard.toml`
    /// above the current directory.
    pub fn load(explicit: Option<&Path>, output: &OutputManager) -> Result<Self> {
        let (settings, config_path) = match explicit {
            Some(path) => {
                let settings = Settings::load(path)
                    .with_context(|| format!("Failed to load config from {}", path.display()))?;
                (settings, Some(path.to_path_buf()))
            }
            None => {
                let current_dir = std::env::current_dir().context("Failed to get current directory")?;
                Settings::find(&current_dir).context("Failed to load volboard.toml")?
            }
        };

        let rules = settings.category_rules().context("Invalid category keywords")?;
        let context = Self {
            settings,
            config_path,
            rules,
        };

        match &context.config_path {
            Some(path) => output.verbose(&format!("Using config {}", path.display())),
            None => output.verbose("No volboard.toml found, using defaults"),
        }
        Ok(context)
    }

    /// Read and normalize a JSON payload of opportunities.
    pub async fn read_records(&self, path: &Path) -> Result<Vec<Record>> {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let records =
            normalize_json(&content, &self.rules).with_context(|| format!("Failed to parse {}", path.display()))?;
        log::debug!("loaded {} records from {}", records.len(), path.display());
        Ok(records)
    }
}
