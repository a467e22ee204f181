//! Field converters
//!
//! Every field converter exposes the same contract to the record pipeline:
//! `convert(raw, record_id)` returns a JSON-LD fragment and never fails.
//! Absent or blank input yields an empty fragment; an `Err` from the
//! converter's own work is logged with the record id and a snippet of the
//! raw value, and also yields an empty fragment.

use serde_json::{Map, Value};
use tracing::{error, warn};

use crate::aggregate::Aggregator;
use crate::config::ConverterConfig;
use crate::decode::decode;
use crate::error::Result;
use crate::pipeline::Row;
use crate::record::{AttributeRecord, DecodedRecord, LinkedDataRecord, RecordKind, RelationshipRecord};
use crate::resolve::MappingTables;
use crate::tokenize::tokenize;

/// Default length of raw-value snippets in log lines
pub const DEFAULT_SNIPPET_LEN: usize = 120;

/// A converter for one column of a record
pub trait FieldConverter: Send + Sync {
    /// Column name, used in log lines
    fn field(&self) -> &str;

    /// Convert a non-blank raw value
    fn try_convert(&self, raw: &str, record_id: &str) -> Result<Map<String, Value>>;

    /// Maximum snippet length for log lines
    fn snippet_len(&self) -> usize {
        DEFAULT_SNIPPET_LEN
    }

    /// Convert a raw value, absorbing every failure
    fn convert(&self, raw: Option<&str>, record_id: &str) -> Map<String, Value> {
        let Some(raw) = raw.filter(|r| !r.trim().is_empty()) else {
            return Map::new();
        };
        match self.try_convert(raw, record_id) {
            Ok(fragment) => fragment,
            Err(e) => {
                error!(
                    record_id = %record_id,
                    field = self.field(),
                    value = %snippet(raw, self.snippet_len()),
                    "Field conversion failed: {}", e
                );
                Map::new()
            }
        }
    }

    /// Convert the converter's cells of a row
    ///
    /// Reads the column named by [`field`](Self::field). Converters that
    /// combine several columns override this.
    fn convert_row(&self, row: &Row, record_id: &str) -> Map<String, Value> {
        self.convert(row.get(self.field()).map(String::as_str), record_id)
    }

    /// Convert a JSON cell; anything other than a string yields `{}`
    fn convert_value(&self, raw: &Value, record_id: &str) -> Map<String, Value> {
        match raw {
            Value::String(s) => self.convert(Some(s), record_id),
            _ => Map::new(),
        }
    }
}

/// Trimmed text of a row cell, `None` when absent or blank
pub fn cell<'r>(row: &'r Row, column: &str) -> Option<&'r str> {
    row.get(column)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
}

/// Truncate `raw` to at most `max` characters for logging
pub fn snippet(raw: &str, max: usize) -> String {
    let mut chars = raw.chars();
    let head: String = chars.by_ref().take(max).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

/// Tokenize and decode a field, dropping invalid entries with a warning
pub fn decode_entries(
    raw: &str,
    kind: RecordKind,
    record_id: &str,
    config: &ConverterConfig,
) -> Vec<DecodedRecord> {
    tokenize(raw, &config.entry_separator, &config.pair_separator)
        .into_iter()
        .filter_map(|entry| match decode(&entry, kind) {
            Ok(record) => Some(record),
            Err(reason) => {
                warn!(
                    record_id = %record_id,
                    position = entry.position,
                    entry = %snippet(&entry.source, config.snippet_len),
                    "Discarding invalid entry: {}", reason
                );
                None
            }
        })
        .collect()
}

fn relationships(records: Vec<DecodedRecord>) -> Vec<RelationshipRecord> {
    records
        .into_iter()
        .filter_map(|r| match r {
            DecodedRecord::Relationship(rel) => Some(rel),
            _ => None,
        })
        .collect()
}

/// `Related Authorities` of a citation or an authority
#[derive(Debug, Clone, Copy)]
pub struct RelatedAuthoritiesConverter<'a> {
    config: &'a ConverterConfig,
    aggregator: Aggregator<'a>,
    kind: RecordKind,
}

impl<'a> RelatedAuthoritiesConverter<'a> {
    /// Authorities related to a citation (authors, subjects, publishers, ...)
    pub fn for_citations(config: &'a ConverterConfig, tables: &'a MappingTables) -> Self {
        Self {
            config,
            aggregator: Aggregator::new(config, tables),
            kind: RecordKind::CitationAuthority,
        }
    }

    /// Authorities related to an authority (broader/narrower terms, ...)
    pub fn for_authorities(config: &'a ConverterConfig, tables: &'a MappingTables) -> Self {
        Self {
            config,
            aggregator: Aggregator::new(config, tables),
            kind: RecordKind::AuthorityAuthority,
        }
    }
}

impl FieldConverter for RelatedAuthoritiesConverter<'_> {
    fn field(&self) -> &str {
        "Related Authorities"
    }

    fn snippet_len(&self) -> usize {
        self.config.snippet_len
    }

    fn try_convert(&self, raw: &str, record_id: &str) -> Result<Map<String, Value>> {
        let records = relationships(decode_entries(raw, self.kind, record_id, self.config));
        Ok(self
            .aggregator
            .aggregate_relationships(self.kind, &records)
            .into_fragment())
    }
}

/// `Related Citations` of a citation
#[derive(Debug, Clone, Copy)]
pub struct RelatedCitationsConverter<'a> {
    config: &'a ConverterConfig,
    aggregator: Aggregator<'a>,
}

impl<'a> RelatedCitationsConverter<'a> {
    pub fn new(config: &'a ConverterConfig, tables: &'a MappingTables) -> Self {
        Self {
            config,
            aggregator: Aggregator::new(config, tables),
        }
    }
}

impl FieldConverter for RelatedCitationsConverter<'_> {
    fn field(&self) -> &str {
        "Related Citations"
    }

    fn snippet_len(&self) -> usize {
        self.config.snippet_len
    }

    fn try_convert(&self, raw: &str, record_id: &str) -> Result<Map<String, Value>> {
        let kind = RecordKind::CitationCitation;
        let records = relationships(decode_entries(raw, kind, record_id, self.config));
        Ok(self
            .aggregator
            .aggregate_relationships(kind, &records)
            .into_fragment())
    }
}

/// `Attributes` of either record type
#[derive(Debug, Clone, Copy)]
pub struct AttributesConverter<'a> {
    config: &'a ConverterConfig,
    aggregator: Aggregator<'a>,
}

impl<'a> AttributesConverter<'a> {
    pub fn new(config: &'a ConverterConfig, tables: &'a MappingTables) -> Self {
        Self {
            config,
            aggregator: Aggregator::new(config, tables),
        }
    }
}

impl FieldConverter for AttributesConverter<'_> {
    fn field(&self) -> &str {
        "Attributes"
    }

    fn snippet_len(&self) -> usize {
        self.config.snippet_len
    }

    fn try_convert(&self, raw: &str, record_id: &str) -> Result<Map<String, Value>> {
        let records: Vec<AttributeRecord> =
            decode_entries(raw, RecordKind::Attribute, record_id, self.config)
                .into_iter()
                .filter_map(|r| match r {
                    DecodedRecord::Attribute(attr) => Some(attr),
                    _ => None,
                })
                .collect();
        Ok(self.aggregator.aggregate_attributes(&records).into_fragment())
    }
}

/// `Linked Data` of either record type
#[derive(Debug, Clone, Copy)]
pub struct LinkedDataConverter<'a> {
    config: &'a ConverterConfig,
    aggregator: Aggregator<'a>,
}

impl<'a> LinkedDataConverter<'a> {
    pub fn new(config: &'a ConverterConfig, tables: &'a MappingTables) -> Self {
        Self {
            config,
            aggregator: Aggregator::new(config, tables),
        }
    }
}

impl FieldConverter for LinkedDataConverter<'_> {
    fn field(&self) -> &str {
        "Linked Data"
    }

    fn snippet_len(&self) -> usize {
        self.config.snippet_len
    }

    fn try_convert(&self, raw: &str, record_id: &str) -> Result<Map<String, Value>> {
        let records: Vec<LinkedDataRecord> =
            decode_entries(raw, RecordKind::LinkedData, record_id, self.config)
                .into_iter()
                .filter_map(|r| match r {
                    DecodedRecord::LinkedData(link) => Some(link),
                    _ => None,
                })
                .collect();
        Ok(self.aggregator.aggregate_linked_data(&records).into_fragment())
    }
}
