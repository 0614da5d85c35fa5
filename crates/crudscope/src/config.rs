//! Per-entity overrides.
//!
//! Loaded from TOML or JSON, keyed by entity name (or list operation name,
//! or item type name):
//!
//! ```toml
//! [entities.Pet]
//! keyField = "slug"
//! selectorPath = "data"
//! syncMode = "on-demand"
//! predicateMapping = "rest-simple"
//! nextPagePath = "links.next"
//! ```

use crate::entity::{PredicateMapping, SyncMode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Error loading an override file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid TOML overrides: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid JSON overrides: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid override for '{entity}': {reason}")]
    Invalid { entity: String, reason: String },
}

/// User-supplied corrections for one entity. Every field wins over inference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct EntityOverride {
    /// Field identifying unique rows.
    pub key_field: Option<String>,
    /// Dotted path from the response root to the item array.
    pub selector_path: Option<String>,
    pub sync_mode: Option<SyncMode>,
    pub predicate_mapping: Option<PredicateMapping>,
    /// Dotted path to the next page parameter in a response page.
    pub next_page_path: Option<String>,
}

/// All overrides, keyed by entity, operation or type name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[serde(default, deny_unknown_fields)]
pub struct Overrides {
    pub entities: BTreeMap<String, EntityOverride>,
}

impl Overrides {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let overrides: Self = toml::from_str(content)?;
        overrides.validate()?;
        Ok(overrides)
    }

    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        let overrides: Self = serde_json::from_str(content)?;
        overrides.validate()?;
        Ok(overrides)
    }

    /// Load overrides from a file. `.json` files are parsed as JSON,
    /// everything else as TOML.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        tracing::debug!(path = %path.display(), json = is_json, "loading overrides");
        if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_toml_str(&content)
        }
    }

    /// Reject overrides that are well-typed but cannot mean anything.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (entity, entry) in &self.entities {
            let invalid = |reason: &str| ConfigError::Invalid {
                entity: entity.clone(),
                reason: reason.to_string(),
            };
            if entity.trim().is_empty() {
                return Err(invalid("entity name is empty"));
            }
            if entry.key_field.as_deref().is_some_and(|k| k.trim().is_empty()) {
                return Err(invalid("keyField is empty"));
            }
            for (name, path) in [
                ("selectorPath", &entry.selector_path),
                ("nextPagePath", &entry.next_page_path),
            ] {
                if path
                    .as_deref()
                    .is_some_and(|p| p.split('.').any(|segment| segment.trim().is_empty()))
                {
                    return Err(invalid(&format!("{name} has an empty path segment")));
                }
            }
        }
        Ok(())
    }

    /// The override registered under the first of `names` that has one,
    /// with the key it was found under.
    pub fn find<'a>(&'a self, names: &[&str]) -> Option<(&'a str, &'a EntityOverride)> {
        names.iter().find_map(|name| {
            self.entities
                .get_key_value(*name)
                .map(|(key, entry)| (key.as_str(), entry))
        })
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

/// JSON Schema of the override file format, for editor validation.
#[cfg(feature = "schema")]
pub fn overrides_json_schema() -> serde_json::Value {
    schemars::schema_for!(Overrides).to_value()
}
