//! Configuration types and parsing for lineage config files

use crate::error::{CoreError, CoreResult};
use crate::schema::{parse_document, Schema};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Lineage configuration, read from YAML (`.yml`/`.yaml`) or JSON (`.json`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LineageConfig {
    /// SQL dialect for parsing and type mapping
    #[serde(default)]
    pub dialect: Dialect,

    /// Table -> column -> declared type
    #[serde(default)]
    pub schema: Schema,

    /// Extra function signatures: function name -> return type tag
    #[serde(default)]
    pub functions: HashMap<String, String>,
}

/// SQL dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// BigQuery Standard SQL
    BigQuery,
    /// DuckDB SQL dialect
    #[default]
    DuckDb,
    /// Snowflake SQL dialect
    Snowflake,
    /// PostgreSQL dialect
    #[serde(alias = "postgresql")]
    Postgres,
}

impl Dialect {
    /// Name understood by the SQL layer's dialect lookup
    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::BigQuery => "bigquery",
            Dialect::DuckDb => "duckdb",
            Dialect::Snowflake => "snowflake",
            Dialect::Postgres => "postgres",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dialect {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bigquery" => Ok(Dialect::BigQuery),
            "duckdb" => Ok(Dialect::DuckDb),
            "snowflake" => Ok(Dialect::Snowflake),
            "postgres" | "postgresql" => Ok(Dialect::Postgres),
            other => Err(CoreError::ConfigInvalid {
                message: format!(
                    "Unknown dialect '{}' (expected bigquery, duckdb, snowflake or postgres)",
                    other
                ),
            }),
        }
    }
}

impl LineageConfig {
    /// Load configuration from a file
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: LineageConfig = parse_document(path, &content)?;
        config.validate()?;
        log::debug!(
            "Loaded config from {} (dialect {}, {} tables, {} functions)",
            path.display(),
            config.dialect,
            config.schema.len(),
            config.functions.len()
        );
        Ok(config)
    }

    /// Validate the configuration
    fn validate(&self) -> CoreResult<()> {
        self.schema.validate()?;

        if let Some((name, _)) = self
            .functions
            .iter()
            .find(|(name, tag)| name.trim().is_empty() || tag.trim().is_empty())
        {
            return Err(CoreError::ConfigInvalid {
                message: format!("Function signature '{}' needs a name and a return type", name),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
