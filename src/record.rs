//! Typed records decoded from micro-format entries
//!
//! A decoded entry is one of three shapes: a relationship to another
//! record, a structured attribute, or an external identifier. Records are
//! created per conversion call and owned by it.

use serde_json::Value;

/// Which micro-format field an entry came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    /// `Related Authorities` of a citation
    CitationAuthority,
    /// `Related Authorities` of an authority
    AuthorityAuthority,
    /// `Related Citations` of a citation
    CitationCitation,
    /// `Attributes` of either record type
    Attribute,
    /// `Linked Data` of either record type
    LinkedData,
}

impl RecordKind {
    /// Whether entries of this kind are relationships to other records
    pub fn is_relationship(&self) -> bool {
        matches!(
            self,
            RecordKind::CitationAuthority
                | RecordKind::AuthorityAuthority
                | RecordKind::CitationCitation
        )
    }
}

/// Aggregation shape for a group of relationships
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// People or organisations in a role, ordered by display order
    Contributor,
    /// Subjects and categories, in source order
    Subject,
    /// Properties holding one value; the first entry in source order wins
    Single,
    /// Related authorities, in source order
    Related,
    /// Links to other citations
    Citation,
}

const CONTRIBUTOR_TYPES: &[&str] = &[
    "AUTHOR",
    "EDITOR",
    "ADVISOR",
    "CONTRIBUTOR",
    "TRANSLATOR",
    "COMMITTEE_MEMBER",
    "INTERVIEWER",
    "GUEST",
    "WRITER",
    "PERFORMER",
    "RESEARCHER",
    "DIRECTOR",
    "PRODUCER",
    "ORGANIZER",
    "HOST",
];

const SINGLE_TYPES: &[&str] = &[
    "PUBLISHER",
    "PERIODICAL",
    "SCHOOL",
    "BOOK_SERIES",
    "MEETING",
    "DISTRIBUTOR",
];

impl Category {
    /// Classify a normalized relationship type
    pub fn classify(kind: RecordKind, normalized_type: &str) -> Self {
        match kind {
            RecordKind::CitationCitation => Category::Citation,
            RecordKind::CitationAuthority => {
                if CONTRIBUTOR_TYPES.contains(&normalized_type) {
                    Category::Contributor
                } else if normalized_type == "SUBJECT" || normalized_type == "CATEGORY" {
                    Category::Subject
                } else if SINGLE_TYPES.contains(&normalized_type) {
                    Category::Single
                } else {
                    Category::Related
                }
            }
            RecordKind::AuthorityAuthority | RecordKind::Attribute | RecordKind::LinkedData => {
                Category::Related
            }
        }
    }
}

/// A typed link from the converted record to another record
#[derive(Debug, Clone, PartialEq)]
pub struct RelationshipRecord {
    pub kind: RecordKind,
    pub category: Category,
    /// Type label exactly as it appeared in the source
    pub relationship_type_raw: String,
    /// Grouping key (`BOOK_SERIES`, or `isReviewedBy` for citation links)
    pub normalized_type: String,
    pub target_id: String,
    pub target_name: Option<String>,
    pub display_name: Option<String>,
    pub display_order: Option<String>,
    pub target_type: Option<String>,
    pub target_status: Option<String>,
    pub relationship_id: Option<String>,
    pub relationship_status: Option<String>,
    /// 0-based position of the source entry in its field
    pub position: usize,
}

impl RelationshipRecord {
    /// Display name when present and non-empty, otherwise the target name
    pub fn name(&self) -> Option<&str> {
        [self.display_name.as_deref(), self.target_name.as_deref()]
            .into_iter()
            .flatten()
            .find(|n| !n.trim().is_empty())
    }

    /// Numeric display order, falling back to the 1-based source position
    pub fn order_key(&self) -> f64 {
        self.parsed_order().unwrap_or((self.position + 1) as f64)
    }

    /// Display order as it is published: the source value when numeric,
    /// otherwise the 1-based source position
    pub fn order_label(&self) -> String {
        match (self.parsed_order(), &self.display_order) {
            (Some(_), Some(raw)) => raw.trim().to_string(),
            _ => (self.position + 1).to_string(),
        }
    }

    /// Role name for contributor projections (`author`, `committee_member`)
    pub fn role(&self) -> String {
        self.normalized_type.to_lowercase()
    }

    fn parsed_order(&self) -> Option<f64> {
        self.display_order
            .as_deref()
            .and_then(|raw| raw.trim().parse::<f64>().ok())
            .filter(|order| order.is_finite())
    }
}

/// A structured, non-relational attribute (dates, abbreviations, codes)
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeRecord {
    pub id: Option<String>,
    pub status: Option<String>,
    pub attribute_type: String,
    /// Raw `AttributeValue` text
    pub raw_value: Option<String>,
    /// Parsed numeric/array form of the raw value, when it has one
    pub value: Option<Value>,
    pub free_form_value: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub description: Option<String>,
    pub position: usize,
}

impl AttributeRecord {
    /// First element of the structured value, or the value itself when
    /// it is a scalar
    pub fn first_value(&self) -> Option<&Value> {
        match &self.value {
            Some(Value::Array(items)) => items.first(),
            Some(Value::Null) | None => None,
            Some(other) => Some(other),
        }
    }

    /// Element `index` of a structured array value
    pub fn value_at(&self, index: usize) -> Option<&Value> {
        match &self.value {
            Some(Value::Array(items)) => items.get(index),
            _ => None,
        }
    }
}

/// External identifiers of one type (DOI, VIAF, ISBN, URI, ...)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkedDataRecord {
    pub link_type: String,
    pub values: Vec<String>,
}

/// Result of decoding a single entry
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedRecord {
    Relationship(RelationshipRecord),
    Attribute(AttributeRecord),
    LinkedData(LinkedDataRecord),
}
