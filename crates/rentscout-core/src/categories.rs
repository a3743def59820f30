use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{ClusteringConfig, ConfigError, SearchOptions};

fn default_true() -> bool {
    true
}

/// One configured amenity category as written in `categories.yaml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryConfig {
    pub id: String,
    /// Free-text query sent to the amenity lookup, e.g. `"coffee shop"`.
    pub query: String,
    /// Display color as `#rrggbb`.
    pub color: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_true")]
    pub visible: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoriesFile {
    pub categories: Vec<CategoryConfig>,
    #[serde(default)]
    pub search: SearchOptions,
    #[serde(default)]
    pub clustering: ClusteringConfig,
}

impl CategoriesFile {
    /// Parse and validate a categories document.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the YAML is malformed or fails validation.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let file: CategoriesFile = serde_yaml::from_str(content)?;
        validate_categories(&file)?;
        Ok(file)
    }
}

/// Load and validate the category configuration from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_categories(path: &Path) -> Result<CategoriesFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::CategoriesFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    CategoriesFile::from_yaml(&content)
}

fn validate_categories(file: &CategoriesFile) -> Result<(), ConfigError> {
    if file.categories.is_empty() {
        return Err(ConfigError::Validation(
            "at least one category must be configured".to_string(),
        ));
    }

    let mut seen_ids = HashSet::new();

    for category in &file.categories {
        if category.id.trim().is_empty() {
            return Err(ConfigError::Validation(
                "category id must be non-empty".to_string(),
            ));
        }

        if category.query.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "category '{}' has an empty query",
                category.id
            )));
        }

        if !is_hex_color(&category.color) {
            return Err(ConfigError::Validation(format!(
                "category '{}' has invalid color '{}'; expected #rrggbb",
                category.id, category.color
            )));
        }

        if !seen_ids.insert(category.id.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate category id: '{}'",
                category.id
            )));
        }
    }

    file.search.validate()?;
    file.clustering.validate()?;

    Ok(())
}

fn is_hex_color(value: &str) -> bool {
    value
        .strip_prefix('#')
        .is_some_and(|hex| hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()))
}
