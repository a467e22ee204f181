//! Converter configuration
//!
//! Holds the base URL used to mint record URIs and the two micro-format
//! delimiters. Loaded from TOML or built in code; the mapping tables are
//! configured separately (see [`crate::resolve::MappingTables`]).

use std::fmt;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use url::Url;

use crate::error::{ConvertError, Result};
use crate::vocab::DEFAULT_BASE_URL;

/// Default separator between entries of a micro-format field
pub const DEFAULT_ENTRY_SEPARATOR: &str = " // ";

/// Default separator between sub-fields of one entry
pub const DEFAULT_PAIR_SEPARATOR: &str = " || ";

/// Kind of record an identifier refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityType {
    Citation,
    Authority,
}

impl EntityType {
    /// Guess the entity type from a record id (`CBA...` is an authority)
    pub fn from_record_id(record_id: &str) -> Self {
        if record_id.trim_start().starts_with("CBA") {
            EntityType::Authority
        } else {
            EntityType::Citation
        }
    }

    /// Path segment used in record URIs
    pub fn path_segment(&self) -> &'static str {
        match self {
            EntityType::Citation => "citation",
            EntityType::Authority => "authority",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path_segment())
    }
}

/// Options shared by every field converter
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConverterConfig {
    /// Base URL for record URIs, e.g. `https://data.isiscb.org`
    pub base_url: String,
    /// Separator between entries (`" // "`)
    pub entry_separator: String,
    /// Separator between sub-fields inside an entry (`" || "`)
    pub pair_separator: String,
    /// Maximum length of raw-value snippets in log lines
    pub snippet_len: usize,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            entry_separator: DEFAULT_ENTRY_SEPARATOR.to_string(),
            pair_separator: DEFAULT_PAIR_SEPARATOR.to_string(),
            snippet_len: 120,
        }
    }
}

impl ConverterConfig {
    /// Default configuration with a different base URL
    pub fn with_base_url(base_url: &str) -> Result<Self> {
        let config = Self {
            base_url: base_url.to_string(),
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML document; missing keys keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML configuration file
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConvertError::LoadError {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml_str(&content)
    }

    /// Check that the base URL is absolute and the delimiters are usable
    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.base_url)?;
        if self.entry_separator.is_empty() || self.pair_separator.is_empty() {
            return Err(ConvertError::LoadError {
                path: "configuration".to_string(),
                reason: "separators must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Build `{base_url}/{citation|authority}/{id}`
    pub fn entity_uri(&self, entity_type: EntityType, id: &str) -> String {
        format!(
            "{}/{}/{}",
            self.base_url.trim_end_matches('/'),
            entity_type.path_segment(),
            id.trim()
        )
    }

    pub fn authority_uri(&self, id: &str) -> String {
        self.entity_uri(EntityType::Authority, id)
    }

    pub fn citation_uri(&self, id: &str) -> String {
        self.entity_uri(EntityType::Citation, id)
    }
}
