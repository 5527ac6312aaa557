//! Configuration types and parsing for duckmig.yml

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file names probed by [`MigrationConfig::load_from_dir`], in order.
pub const CONFIG_FILE_NAMES: [&str; 2] = ["duckmig.yml", "duckmig.yaml"];

/// Settings for one migration stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MigrationConfig {
    /// Directory holding the migration files
    #[serde(default = "default_directory")]
    pub directory: PathBuf,

    /// Database (schema) containing the ledger table
    #[serde(default = "default_database")]
    pub database: String,

    /// Ledger table name
    #[serde(default = "default_table")]
    pub table: String,

    /// Scope identifier partitioning a shared ledger table
    #[serde(default)]
    pub identifier: Option<String>,

    /// Storage policy hint recorded on the ledger table
    #[serde(default)]
    pub storage_policy: Option<String>,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            directory: default_directory(),
            database: default_database(),
            table: default_table(),
            identifier: None,
            storage_policy: None,
        }
    }
}

fn default_directory() -> PathBuf {
    PathBuf::from("migrations")
}

fn default_database() -> String {
    "migrations".to_string()
}

fn default_table() -> String {
    "migrations".to_string()
}

impl MigrationConfig {
    /// Load configuration from a file
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::io(path, e))?;
        let config: MigrationConfig = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a directory, looking for duckmig.yml or
    /// duckmig.yaml. Returns `None` when neither exists.
    pub fn load_from_dir(dir: &Path) -> CoreResult<Option<Self>> {
        for file_name in CONFIG_FILE_NAMES {
            let path = dir.join(file_name);
            if path.exists() {
                return Self::load(&path).map(Some);
            }
        }
        Ok(None)
    }

    /// Fully-qualified ledger table (`database.table`)
    pub fn qualified_table(&self) -> String {
        format!("{}.{}", self.database, self.table)
    }

    /// Scope identifier, treating an empty string as unscoped
    pub fn scope(&self) -> Option<&str> {
        self.identifier.as_deref().filter(|s| !s.is_empty())
    }

    /// Validate the configuration.
    ///
    /// Database and table names are interpolated into DDL, so they must be
    /// plain identifiers.
    pub fn validate(&self) -> CoreResult<()> {
        for (field, value) in [("database", &self.database), ("table", &self.table)] {
            if !is_plain_identifier(value) {
                return Err(CoreError::ConfigInvalid {
                    message: format!(
                        "{field} '{value}' must start with a letter or '_' and contain only letters, digits, or '_'"
                    ),
                });
            }
        }
        if self.directory.as_os_str().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "directory cannot be empty".to_string(),
            });
        }
        if let Some(policy) = &self.storage_policy {
            if policy.contains('\'') {
                return Err(CoreError::ConfigInvalid {
                    message: format!("storage_policy '{policy}' must not contain a quote"),
                });
            }
        }
        Ok(())
    }
}

fn is_plain_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
