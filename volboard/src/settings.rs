use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::errors::{ListError, ListResult};
use crate::normalize::CategoryRules;
use crate::query::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, PageLimits};
use crate::view::{DEFAULT_SEARCH_DEBOUNCE, ListView};

/// Name of the configuration file looked up by [`Settings::find`].
pub const CONFIG_FILE_NAME: &str = "volboard.toml";

/// Configuration stored in `volboard.toml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub listing: ListingSettings,
    #[serde(default)]
    pub categories: CategorySettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingSettings {
    #[serde(default = "default_page_size")]
    pub default_page_size: u64,
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u64,
    #[serde(default = "default_search_debounce_ms")]
    pub search_debounce_ms: u64,
}

impl Default for ListingSettings {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
            search_debounce_ms: default_search_debounce_ms(),
        }
    }
}

fn default_page_size() -> u64 {
    DEFAULT_PAGE_SIZE
}

fn default_max_page_size() -> u64 {
    MAX_PAGE_SIZE
}

fn default_search_debounce_ms() -> u64 {
    DEFAULT_SEARCH_DEBOUNCE.as_millis() as u64
}

/// Keyword overrides for category inference.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategorySettings {
    /// Category assigned when no keyword matches.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<String>,
    #[serde(default)]
    pub keywords: BTreeMap<String, Vec<String>>,
}

impl Settings {
    /// Parse settings from TOML text and validate them.
    pub fn from_toml_str(content: &str) -> ListResult<Self> {
        let settings: Settings = toml::from_str(content).map_err(|err| ListError::Config {
            message: format!("failed to parse {CONFIG_FILE_NAME}: {err}").into(),
        })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from an explicit path.
    pub fn load(path: &Path) -> ListResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Look for `volboard.toml` in `start` and its ancestors. Missing config
    /// yields the defaults.
    pub fn find(start: &Path) -> ListResult<(Self, Option<PathBuf>)> {
        match Self::locate(start) {
            Some(path) => Ok((Self::load(&path)?, Some(path))),
            None => Ok((Self::default(), None)),
        }
    }

    fn locate(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();
        loop {
            let candidate = current.join(CONFIG_FILE_NAME);
            if candidate.is_file() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    pub fn validate(&self) -> ListResult<()> {
        let listing = &self.listing;
        if listing.max_page_size == 0 {
            return Err(ListError::Config {
                message: "listing.max_page_size must be at least 1".into(),
            });
        }
        if listing.default_page_size == 0 || listing.default_page_size > listing.max_page_size {
            return Err(ListError::Config {
                message: format!(
                    "listing.default_page_size must be between 1 and {}",
                    listing.max_page_size
                )
                .into(),
            });
        }
        Ok(())
    }

    pub fn page_limits(&self) -> PageLimits {
        PageLimits {
            default_page_size: self.listing.default_page_size,
            max_page_size: self.listing.max_page_size,
        }
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.listing.search_debounce_ms)
    }

    pub fn category_rules(&self) -> ListResult<CategoryRules> {
        if self.categories.keywords.is_empty() && self.categories.fallback.is_none() {
            return Ok(CategoryRules::default());
        }
        CategoryRules::with_overrides(&self.categories.keywords, self.categories.fallback.as_deref())
    }

    /// A fresh list view configured from these settings.
    pub fn list_view(&self) -> ListView {
        ListView::new(self.listing.default_page_size, self.search_debounce())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.listing.default_page_size, 10);
        assert_eq!(settings.listing.max_page_size, 100);
        assert_eq!(settings.search_debounce(), Duration::from_millis(250));
        assert!(settings.categories.keywords.is_empty());
    }

    #[test]
    fn test_settings_serialization() {
        let settings = Settings::default();
        let toml_str = toml::to_string_pretty(&settings).unwrap();
        assert!(toml_str.contains("default_page_size"));
        assert!(toml_str.contains("search_debounce_ms"));
        assert_eq!(Settings::from_toml_str(&toml_str).unwrap(), settings);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let settings = Settings::from_toml_str(
            r#"
            [listing]
            default_page_size = 20

            [categories.keywords]
            animals = ["shelter"]
            "#,
        )
        .unwrap();
        assert_eq!(settings.listing.default_page_size, 20);
        assert_eq!(settings.listing.max_page_size, MAX_PAGE_SIZE);
        let rules = settings.category_rules().unwrap();
        assert_eq!(rules.infer("Animal shelter", ""), "animals");
    }

    #[test]
    fn rejects_inconsistent_page_sizes() {
        let err = Settings::from_toml_str("[listing]\ndefault_page_size = 50\nmax_page_size = 20\n").unwrap_err();
        assert!(matches!(err, ListError::Config { .. }));
        assert!(Settings::from_toml_str("[listing]\nmax_page_size = 0\n").is_err());
        assert!(Settings::from_toml_str("listing = 3").is_err());
    }
}
