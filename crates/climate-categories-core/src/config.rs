use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CategorizationError, Result};

const CONFIG_FILE: &str = "config.toml";

/// Default config template with rich comments
const DEFAULT_CONFIG_TEMPLATE: &str = r#"# climate-categories configuration file
# Location: ~/.climate-categories/config.toml

[library]
# Directories scanned for categorization sets. A set is a directory holding
# metadata.csv and data.csv (and hierarchy.csv for hierarchical sets).
# A leading "~" is replaced by the home directory.
# Example: paths = ["/usr/share/climate-categories", "~/my-categories"]
paths = []

[export]
# Field delimiter for CSV export (a single ASCII character)
delimiter = ","

# Whether hierarchical exports carry a level column
include_level = true
"#;

/// Global configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub library: LibraryConfig,

    #[serde(default)]
    pub export: ExportConfig,
}

/// Where categorization sets live
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct LibraryConfig {
    #[serde(default)]
    pub paths: Vec<PathBuf>,
}

/// Tabular export settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExportConfig {
    #[serde(default = "default_delimiter")]
    pub delimiter: String,

    #[serde(default = "default_include_level")]
    pub include_level: bool,
}

fn default_delimiter() -> String {
    ",".to_string()
}

fn default_include_level() -> bool {
    true
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
            include_level: default_include_level(),
        }
    }
}

impl LibraryConfig {
    /// Configured paths with a leading `~` replaced by the home directory
    pub fn resolved_paths(&self) -> Vec<PathBuf> {
        self.paths.iter().map(|p| expand_home(p)).collect()
    }
}

fn expand_home(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match dirs::home_dir() {
        Some(home) => home.join(rest),
        None => path.to_path_buf(),
    }
}

impl ExportConfig {
    /// Delimiter as the byte the CSV writer expects
    pub fn delimiter_byte(&self) -> Result<u8> {
        parse_delimiter(&self.delimiter)
    }
}

impl Config {
    /// Load config from base directory
    pub fn load(base_dir: &Path) -> Result<Self> {
        let path = base_dir.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)?;
        let config: Config =
            toml::from_str(&content).map_err(|e| CategorizationError::ConfigParse {
                path: path.clone(),
                message: e.to_string(),
            })?;

        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Save config to base directory
    pub fn save(&self, base_dir: &Path) -> Result<()> {
        let path = base_dir.join(CONFIG_FILE);
        fs::create_dir_all(base_dir)?;

        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    /// Get config file path
    pub fn path(base_dir: &Path) -> PathBuf {
        base_dir.join(CONFIG_FILE)
    }

    /// Initialize config with default template (rich comments)
    pub fn init(base_dir: &Path) -> Result<PathBuf> {
        let path = base_dir.join(CONFIG_FILE);
        fs::create_dir_all(base_dir)?;

        if !path.exists() {
            fs::write(&path, DEFAULT_CONFIG_TEMPLATE)?;
        }

        Ok(path)
    }

    /// Get a config value by dot-notation key
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "library.paths" => Some(format!("{:?}", self.library.paths)),
            "export.delimiter" => Some(self.export.delimiter.clone()),
            "export.include_level" => Some(self.export.include_level.to_string()),
            _ => None,
        }
    }

    /// Set a config value by dot-notation key
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "library.paths" => {
                self.library.paths = parse_string_list(value)
                    .into_iter()
                    .map(PathBuf::from)
                    .collect();
                Ok(())
            }
            "export.delimiter" => {
                parse_delimiter(value)?;
                self.export.delimiter = value.to_string();
                Ok(())
            }
            "export.include_level" => {
                self.export.include_level =
                    value
                        .parse()
                        .map_err(|_| CategorizationError::InvalidConfigValue {
                            key: key.to_string(),
                            value: value.to_string(),
                            message: "expected true or false".to_string(),
                        })?;
                Ok(())
            }
            _ => Err(CategorizationError::ConfigKeyNotFound {
                key: key.to_string(),
            }),
        }
    }

    /// List all config keys with their current values
    pub fn list(&self) -> Vec<(String, String)> {
        ["library.paths", "export.delimiter", "export.include_level"]
            .into_iter()
            .filter_map(|key| self.get(key).map(|value| (key.to_string(), value)))
            .collect()
    }
}

fn parse_delimiter(value: &str) -> Result<u8> {
    match value.as_bytes() {
        [b] if b.is_ascii() => Ok(*b),
        _ => Err(CategorizationError::InvalidConfigValue {
            key: "export.delimiter".to_string(),
            value: value.to_string(),
            message: "expected a single ASCII character".to_string(),
        }),
    }
}

/// Parse a comma-separated or JSON-like list string
fn parse_string_list(value: &str) -> Vec<String> {
    let trimmed = value.trim();

    // JSON array format: ["a", "b"]
    let inner = if trimmed.starts_with('[') && trimmed.ends_with(']') {
        &trimmed[1..trimmed.len() - 1]
    } else {
        trimmed
    };

    inner
        .split(',')
        .map(|s| s.trim().trim_matches('"').trim_matches('\'').to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
