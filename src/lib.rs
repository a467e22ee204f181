//! IsisCB JSON-LD Conversion Library
//!
//! This library converts records of the IsisCB history-of-science
//! bibliography (citations and authorities) into JSON-LD documents that
//! combine Dublin Core, Schema.org, SKOS, BIBO and FOAF terms with an
//! `isiscb:` extension vocabulary.
//!
//! # Overview
//!
//! IsisCB exports pack related records into single cells using a
//! micro-format:
//!
//! ```text
//! ACR_ID ACR1 || ACRType Author || AuthorityID CBA1 // ACR_ID ACR2 || ...
//! ```
//!
//! Each such field goes through:
//!
//! 1. [`mod@tokenize`]: split into entries and `Key value` sub-fields
//! 2. [`mod@decode`]: build a typed record, discarding entries without a type
//!    or target
//! 3. [`resolve`]: map the relationship type onto vocabulary properties
//! 4. [`aggregate`]: group, order and project the records, and keep a
//!    lossless list of all of them
//!
//! The [`convert`] and [`fields`] converters wrap these steps behind a
//! contract that never fails, and [`pipeline`] assembles whole documents
//! from CSV rows.
//!
//! # Usage
//!
//! ## Convert a single field
//!
//! ```
//! use isiscb_jsonld::{ConverterConfig, FieldConverter, MappingTables, RelatedAuthoritiesConverter};
//!
//! let config = ConverterConfig::default();
//! let tables = MappingTables::standard();
//! let converter = RelatedAuthoritiesConverter::for_citations(&config, &tables);
//!
//! let fragment = converter.convert(
//!     Some("ACRType Author || AuthorityID CBA000023541 || AuthorityName Dauben, Joseph Warren"),
//!     "CBB001180697",
//! );
//! assert!(fragment.contains_key("dc:creator"));
//! ```
//!
//! ## Convert a CSV export
//!
//! ```ignore
//! use isiscb_jsonld::{read_rows_from_path, to_json_string, ConverterConfig, MappingTables, RecordConverter};
//!
//! let rows = read_rows_from_path(Path::new("citations.csv"))?;
//! let converter = RecordConverter::new(ConverterConfig::default(), MappingTables::standard());
//! let result = converter.convert_rows(&rows);
//!
//! println!("{}", to_json_string(&result.documents, true)?);
//! ```

pub mod aggregate;
pub mod config;
pub mod convert;
pub mod decode;
pub mod error;
pub mod fields;
pub mod merge;
pub mod pipeline;
pub mod record;
pub mod resolve;
pub mod tokenize;
pub mod vocab;

// Re-export main types for convenience
pub use crate::aggregate::{Aggregation, Aggregator, Projection};
pub use crate::config::{ConverterConfig, EntityType};
pub use crate::convert::{
    AttributesConverter, FieldConverter, LinkedDataConverter, RelatedAuthoritiesConverter,
    RelatedCitationsConverter,
};
pub use crate::decode::decode;
pub use crate::error::{ConvertError, InvalidEntry, Result};
pub use crate::pipeline::{
    read_rows, read_rows_from_path, to_json_string, BatchResult, BatchStats, ConvertOptions,
    RecordConverter, Row,
};
pub use crate::record::{
    AttributeRecord, Category, DecodedRecord, LinkedDataRecord, RecordKind, RelationshipRecord,
};
pub use crate::resolve::{MappingTable, MappingTables, PropertyMapping};
pub use crate::tokenize::{tokenize, RawEntry};
pub use crate::vocab::{
    ATTRIBUTES, ISISCB_NS, ISISCB_PREFIX, LINKED_DATA, RELATED_AUTHORITIES, RELATED_CITATIONS,
};
