use crate::error::{InspectError, Result};
use inspect_common::{Category, Fallback};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Overrides `storage_root` when set.
pub const ROOT_ENV: &str = "VEHICLE_INSPECT_ROOT";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root of the `<manufacturer>/<date>/<vehicle>` tree.
    pub storage_root: Option<PathBuf>,
    /// Regular-weight TTF used by the PDF and PNG renderers.
    pub font_regular: Option<PathBuf>,
    /// Bold TTF for titles. Falls back to the regular font.
    pub font_bold: Option<PathBuf>,
    /// Category assumed when the reference sheet has none.
    pub default_category: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage_root: None,
            font_regular: None,
            font_bold: None,
            default_category: inspect_common::DEFAULT_CATEGORY_CODE.to_string(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| InspectError::Config("home directory not found".into()))?;
        Ok(home.join(".config").join("vehicle-inspect").join("config.json"))
    }

    /// Storage root, environment first.
    pub fn storage_root(&self) -> Result<PathBuf> {
        if let Some(root) = std::env::var_os(ROOT_ENV).filter(|v| !v.is_empty()) {
            return Ok(PathBuf::from(root));
        }
        self.storage_root.clone().ok_or_else(|| {
            InspectError::Config(format!(
                "storage root not set (use `config --set-root` or {ROOT_ENV})"
            ))
        })
    }

    /// Detected category, or the configured default when detection fell back.
    pub fn category_or_default(&self, detected: Fallback<Category>) -> Category {
        if detected.is_default() {
            Category::from_code(&self.default_category)
        } else {
            detected.into_inner()
        }
    }
}
