//! Relationship type resolution
//!
//! Maps a raw relationship (or attribute) type label onto a standard
//! vocabulary property, its equivalents and a type URI. Tables are plain
//! values built once and passed by reference, so tests can swap in their
//! own.

use std::collections::HashMap;

use crate::record::RecordKind;
use crate::vocab::ISISCB_PREFIX;

/// Vocabulary properties for one relationship type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyMapping {
    /// Property the standard-vocabulary projection is published under
    pub primary_property: Option<String>,
    /// Properties that receive the same projection
    pub equivalent_properties: Vec<String>,
    /// `@type` of the lossless relationship object
    pub type_uri: String,
}

impl PropertyMapping {
    /// Mapping used for types missing from the table
    pub fn unmapped(raw_type: &str) -> Self {
        Self {
            primary_property: None,
            equivalent_properties: Vec::new(),
            type_uri: format!("{}{}", ISISCB_PREFIX, lower_camel(raw_type)),
        }
    }

    /// Primary property followed by its equivalents
    pub fn properties(&self) -> impl Iterator<Item = &str> {
        self.primary_property
            .iter()
            .chain(self.equivalent_properties.iter())
            .map(String::as_str)
    }
}

/// Relationship types of one field, keyed case- and separator-insensitively
#[derive(Debug, Clone, Default)]
pub struct MappingTable {
    entries: HashMap<String, PropertyMapping>,
}

impl MappingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a type whose type URI is derived from its label
    pub fn with(mut self, raw_type: &str, primary: &str, equivalents: &[&str]) -> Self {
        self.insert(
            raw_type,
            PropertyMapping {
                primary_property: Some(primary.to_string()),
                equivalent_properties: equivalents.iter().map(|p| p.to_string()).collect(),
                type_uri: format!("{}{}", ISISCB_PREFIX, lower_camel(raw_type)),
            },
        );
        self
    }

    pub fn insert(&mut self, raw_type: &str, mapping: PropertyMapping) {
        self.entries.insert(lookup_key(raw_type), mapping);
    }

    pub fn get(&self, raw_type: &str) -> Option<&PropertyMapping> {
        self.entries.get(&lookup_key(raw_type))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The full set of tables consulted during conversion
#[derive(Debug, Clone, Default)]
pub struct MappingTables {
    pub citation_authority: MappingTable,
    pub authority_authority: MappingTable,
    pub citation_citation: MappingTable,
    pub attribute: MappingTable,
}

impl MappingTables {
    /// The IsisCB vocabulary mappings
    pub fn standard() -> Self {
        Self {
            citation_authority: citation_authority_table(),
            authority_authority: authority_authority_table(),
            citation_citation: citation_citation_table(),
            attribute: attribute_table(),
        }
    }

    /// Table consulted for a record kind (linked data has none)
    pub fn table(&self, kind: RecordKind) -> Option<&MappingTable> {
        match kind {
            RecordKind::CitationAuthority => Some(&self.citation_authority),
            RecordKind::AuthorityAuthority => Some(&self.authority_authority),
            RecordKind::CitationCitation => Some(&self.citation_citation),
            RecordKind::Attribute => Some(&self.attribute),
            RecordKind::LinkedData => None,
        }
    }

    /// Resolve a raw type label; unknown labels fall back to a generated
    /// `isiscb:` type URI with no properties
    pub fn resolve(&self, raw_type: &str, kind: RecordKind) -> PropertyMapping {
        self.table(kind)
            .and_then(|table| table.get(raw_type))
            .cloned()
            .unwrap_or_else(|| PropertyMapping::unmapped(raw_type))
    }
}

fn citation_authority_table() -> MappingTable {
    let mut table = MappingTable::new()
        .with("Author", "dc:creator", &["schema:author"])
        .with("Editor", "schema:editor", &["bibo:editor"])
        .with("Subject", "dc:subject", &["schema:about"])
        .with("Category", "isiscb:category", &[])
        .with("Publisher", "dc:publisher", &["schema:publisher"])
        .with("Periodical", "schema:isPartOf", &["dcterms:isPartOf"])
        .with("School", "schema:school", &[])
        .with("Book Series", "isiscb:bookSeries", &[])
        .with("Meeting", "bibo:presentedAt", &[])
        .with("Distributor", "schema:distributor", &[])
        .with("Institution", "isiscb:institution", &[])
        .with("Archival Repository", "isiscb:archivalRepository", &[])
        .with("Maintaining Institution", "isiscb:maintainingInstitution", &[]);

    for contributor in [
        "Advisor",
        "Contributor",
        "Translator",
        "Committee Member",
        "Interviewer",
        "Guest",
        "Writer",
        "Performer",
        "Researcher",
        "Director",
        "Producer",
        "Organizer",
        "Host",
    ] {
        table = table.with(contributor, "dc:contributor", &["schema:contributor"]);
    }
    table
}

fn authority_authority_table() -> MappingTable {
    MappingTable::new()
        .with("Broader Term", "skos:broader", &[])
        .with("Narrower Term", "skos:narrower", &[])
        .with("Parent Institution", "isiscb:parentInstitution", &["skos:broader"])
        .with("Child Institution", "isiscb:childInstitution", &["skos:narrower"])
        .with("Related Term", "skos:related", &[])
        .with("Use", "skos:exactMatch", &[])
        .with("Used For", "skos:closeMatch", &[])
}

fn citation_citation_table() -> MappingTable {
    MappingTable::new()
        .with("Is Reviewed By", "isiscb:isReviewedBy", &[])
        .with("Reviews", "isiscb:reviews", &[])
        .with("Includes Series Article", "isiscb:includesSeriesArticle", &[])
        .with("Is Part Of", "dcterms:isPartOf", &[])
        .with("Has Part", "dcterms:hasPart", &[])
        .with("References", "dcterms:references", &[])
        .with("Is Referenced By", "dcterms:isReferencedBy", &[])
        .with("Succeeds", "dcterms:succeeds", &[])
        .with("Precedes", "dcterms:precedes", &[])
        .with("Replaces", "dcterms:replaces", &[])
        .with("Is Replaced By", "dcterms:isReplacedBy", &[])
}

fn attribute_table() -> MappingTable {
    MappingTable::new()
        .with("JournalAbbr", "bibo:shortTitle", &["isiscb:journalAbbreviation"])
        .with("GeographicEntityType", "isiscb:geographicEntityType", &[])
        .with("CountryCode", "schema:addressCountry", &[])
}

fn words(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
}

/// Table key: alphanumerics only, upper-cased
pub fn lookup_key(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_uppercase)
        .collect()
}

/// `"Book Series"` -> `"BOOK_SERIES"`
pub fn upper_snake(raw: &str) -> String {
    words(raw)
        .map(|word| word.to_uppercase())
        .collect::<Vec<_>>()
        .join("_")
}

/// `"Is Reviewed By"` -> `"isReviewedBy"`
///
/// Splits on every non-alphanumeric character; the first word is
/// lower-cased, later words get an upper-case initial and a lower-case
/// remainder.
pub fn lower_camel(raw: &str) -> String {
    let mut result = String::with_capacity(raw.len());
    for (i, word) in words(raw).enumerate() {
        if i == 0 {
            result.push_str(&word.to_lowercase());
            continue;
        }
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            result.extend(first.to_uppercase());
            result.push_str(&chars.as_str().to_lowercase());
        }
    }
    result
}

/// Grouping key for a relationship type within a field
pub fn normalize_type(raw: &str, kind: RecordKind) -> String {
    match kind {
        RecordKind::CitationCitation => lower_camel(raw),
        _ => upper_snake(raw),
    }
}
