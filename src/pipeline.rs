//! Record pipeline
//!
//! Assembles one JSON-LD document per CSV row by running the field
//! converters of the row's record type and merging their fragments, and
//! converts batches of rows in parallel.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use indexmap::IndexMap;
use rayon::prelude::*;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::config::{ConverterConfig, EntityType};
use crate::convert::{
    AttributesConverter, FieldConverter, LinkedDataConverter, RelatedAuthoritiesConverter,
    RelatedCitationsConverter,
};
use crate::error::{ConvertError, Result};
use crate::fields::{
    AbstractConverter, AuthorityMetadataConverter, ClassificationConverter, DescriptionConverter,
    NameConverter, RecordIdConverter, RecordNatureConverter, RecordTypeConverter,
    RedirectConverter, TitleConverter,
};
use crate::merge::merge_fragment;
use crate::resolve::MappingTables;
use crate::vocab::base_context;

/// One CSV row: column name to cell text, in header order
pub type Row = IndexMap<String, String>;

pub const RECORD_ID: &str = "Record ID";
pub const RECORD_TYPE: &str = "Record Type";
pub const RECORD_NATURE: &str = "Record Nature";
pub const TITLE: &str = "Title";
pub const ABSTRACT: &str = "Abstract";
pub const DESCRIPTION: &str = "Description";
pub const REDIRECT: &str = "Redirect";
pub const RELATED_AUTHORITIES_COLUMN: &str = "Related Authorities";
pub const RELATED_CITATIONS_COLUMN: &str = "Related Citations";
pub const ATTRIBUTES_COLUMN: &str = "Attributes";
pub const LINKED_DATA_COLUMN: &str = "Linked Data";
pub const NAME: &str = "Name";
pub const LAST_NAME: &str = "Last Name";
pub const FIRST_NAME: &str = "First Name";
pub const NAME_SUFFIX: &str = "Name Suffix";
pub const NAME_PREFERRED: &str = "Name Preferred";
pub const CLASSIFICATION_SYSTEM: &str = "Classification System";
pub const CLASSIFICATION_CODE: &str = "Classification Code";
pub const STAFF_NOTES: &str = "Staff Notes";
pub const RECORD_HISTORY: &str = "Record History";
pub const CREATED_DATE: &str = "Created Date";
pub const MODIFIED_DATE: &str = "Modified Date";
pub const CREATOR: &str = "Creator";
pub const MODIFIER: &str = "Modifier";
pub const RELATED_CITATIONS_COUNT: &str = "Related Citations Count";

/// Options for row conversion
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    /// Treat every row as this record type instead of guessing from the
    /// record id
    pub entity_type: Option<EntityType>,
}

/// Result of a batch conversion
#[derive(Debug)]
pub struct BatchResult {
    /// Converted documents, in input order
    pub documents: Vec<Value>,
    pub stats: BatchStats,
}

/// Statistics from a batch conversion
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchStats {
    /// Rows seen
    pub total: usize,
    /// Rows converted into documents
    pub converted: usize,
    /// Rows skipped (no record id)
    pub failed: usize,
}

/// Converts rows of an IsisCB export into JSON-LD documents
#[derive(Debug, Clone)]
pub struct RecordConverter {
    config: ConverterConfig,
    tables: MappingTables,
    options: ConvertOptions,
}

impl RecordConverter {
    pub fn new(config: ConverterConfig, tables: MappingTables) -> Self {
        Self {
            config,
            tables,
            options: ConvertOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ConvertOptions) -> Self {
        self.options = options;
        self
    }

    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    pub fn tables(&self) -> &MappingTables {
        &self.tables
    }

    /// Convert one row into a document
    pub fn convert_row(&self, row: &Row) -> Result<Value> {
        let record_id = row
            .get(RECORD_ID)
            .map(|id| id.trim())
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ConvertError::MissingColumn(RECORD_ID.to_string()))?;

        let entity_type = self
            .options
            .entity_type
            .unwrap_or_else(|| EntityType::from_record_id(record_id));
        debug!(record_id = %record_id, entity_type = %entity_type, "Converting record");

        let config = &self.config;
        let tables = &self.tables;
        let record_id_converter = RecordIdConverter::new(config, entity_type);
        let related_citations = RelatedCitationsConverter::new(config, tables);
        let attributes = AttributesConverter::new(config, tables);
        let linked_data = LinkedDataConverter::new(config, tables);

        let mut doc = Document::new(row, record_id);
        match entity_type {
            EntityType::Citation => {
                doc.apply(RECORD_ID, &record_id_converter)
                    .apply(RECORD_TYPE, &RecordTypeConverter)
                    .apply(RECORD_NATURE, &RecordNatureConverter)
                    .apply(TITLE, &TitleConverter)
                    .apply(ABSTRACT, &AbstractConverter)
                    .apply(
                        RELATED_AUTHORITIES_COLUMN,
                        &RelatedAuthoritiesConverter::for_citations(config, tables),
                    )
                    .apply(RELATED_CITATIONS_COLUMN, &related_citations)
                    .apply(ATTRIBUTES_COLUMN, &attributes)
                    .apply(LINKED_DATA_COLUMN, &linked_data);
            }
            EntityType::Authority => {
                doc.apply(RECORD_ID, &record_id_converter)
                    .apply(RECORD_TYPE, &RecordTypeConverter)
                    .apply(RECORD_NATURE, &RecordNatureConverter)
                    .apply(REDIRECT, &RedirectConverter::new(config))
                    .apply_row(&NameConverter)
                    .apply(DESCRIPTION, &DescriptionConverter)
                    .apply_row(&ClassificationConverter)
                    .apply(LINKED_DATA_COLUMN, &linked_data)
                    .apply(ATTRIBUTES_COLUMN, &attributes)
                    .apply(
                        RELATED_AUTHORITIES_COLUMN,
                        &RelatedAuthoritiesConverter::for_authorities(config, tables),
                    )
                    .apply_row(&AuthorityMetadataConverter);
            }
        }

        Ok(doc.finish())
    }

    /// Convert rows in parallel; rows without a record id are skipped and
    /// counted as failed
    pub fn convert_rows(&self, rows: &[Row]) -> BatchResult {
        let results: Vec<Result<Value>> = rows.par_iter().map(|row| self.convert_row(row)).collect();

        let mut stats = BatchStats {
            total: rows.len(),
            ..BatchStats::default()
        };
        let mut documents = Vec::with_capacity(results.len());
        for (index, result) in results.into_iter().enumerate() {
            match result {
                Ok(doc) => {
                    stats.converted += 1;
                    documents.push(doc);
                }
                Err(e) => {
                    stats.failed += 1;
                    warn!(row = index + 1, "Skipping row: {}", e);
                }
            }
        }

        info!(
            total = stats.total,
            converted = stats.converted,
            failed = stats.failed,
            "Batch conversion finished"
        );
        BatchResult { documents, stats }
    }
}

/// A document under assembly from the cells of one row
struct Document<'r> {
    row: &'r Row,
    record_id: &'r str,
    fields: Map<String, Value>,
}

impl<'r> Document<'r> {
    fn new(row: &'r Row, record_id: &'r str) -> Self {
        let mut fields = Map::new();
        fields.insert("@context".to_string(), base_context());
        Self {
            row,
            record_id,
            fields,
        }
    }

    /// Convert one column and merge the fragment into the document
    fn apply(&mut self, column: &str, converter: &dyn FieldConverter) -> &mut Self {
        let raw = self.row.get(column).map(String::as_str);
        let fragment = converter.convert(raw, self.record_id);
        merge_fragment(&mut self.fields, fragment);
        self
    }

    /// Run a converter over the whole row and merge its fragment
    fn apply_row(&mut self, converter: &dyn FieldConverter) -> &mut Self {
        let fragment = converter.convert_row(self.row, self.record_id);
        merge_fragment(&mut self.fields, fragment);
        self
    }

    fn finish(self) -> Value {
        Value::Object(self.fields)
    }
}

/// Read rows from CSV with a header line
///
/// Short rows are accepted; their missing trailing columns are absent
/// from the row.
pub fn read_rows<R: Read>(reader: R) -> Result<Vec<Row>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();

    let mut rows = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        let row: Row = headers
            .iter()
            .zip(record.iter())
            .map(|(column, cell)| (column.trim().to_string(), cell.to_string()))
            .collect();
        rows.push(row);
    }
    Ok(rows)
}

/// Read rows from a CSV file
pub fn read_rows_from_path(path: &Path) -> Result<Vec<Row>> {
    if !path.is_file() {
        return Err(ConvertError::InvalidPath(path.to_path_buf()));
    }
    let file = File::open(path).map_err(|e| ConvertError::LoadError {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    read_rows(file)
}

/// Serialize documents as a JSON array
pub fn to_json_string(documents: &[Value], pretty: bool) -> Result<String> {
    if pretty {
        Ok(serde_json::to_string_pretty(documents)?)
    } else {
        Ok(serde_json::to_string(documents)?)
    }
}
