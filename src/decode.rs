//! Entry decoding
//!
//! Turns the sub-fields of one tokenized entry into a typed record using
//! the field-name convention of its record kind. Purely structural: no
//! vocabulary lookup happens here.

use serde_json::Value;
use tracing::debug;

use crate::error::InvalidEntry;
use crate::record::{
    AttributeRecord, Category, DecodedRecord, LinkedDataRecord, RecordKind, RelationshipRecord,
};
use crate::resolve::normalize_type;
use crate::tokenize::RawEntry;

/// Sub-field names of a relationship entry
#[derive(Debug, Clone, Copy)]
pub struct RelationshipFields {
    pub relationship_type: &'static str,
    pub target_id: &'static str,
    pub target_name: &'static str,
    pub display_name: Option<&'static str>,
    pub display_order: Option<&'static str>,
    pub target_type: &'static str,
    pub target_status: &'static str,
    pub relationship_id: &'static str,
    pub relationship_status: &'static str,
}

/// Authority relationships (`ACR...` keys, used by citations and
/// authorities alike)
pub const AUTHORITY_RELATION_FIELDS: RelationshipFields = RelationshipFields {
    relationship_type: "ACRType",
    target_id: "AuthorityID",
    target_name: "AuthorityName",
    display_name: Some("ACRNameForDisplayInCitation"),
    display_order: Some("ACRDisplayOrder"),
    target_type: "AuthorityType",
    target_status: "AuthorityStatus",
    relationship_id: "ACR_ID",
    relationship_status: "ACRStatus",
};

/// Citation-to-citation relationships (`CCR...` keys)
pub const CITATION_RELATION_FIELDS: RelationshipFields = RelationshipFields {
    relationship_type: "CCRType",
    target_id: "CitationID",
    target_name: "CitationTitle",
    display_name: None,
    display_order: None,
    target_type: "CitationType",
    target_status: "CitationStatus",
    relationship_id: "CCR_ID",
    relationship_status: "CCRStatus",
};

/// Field-name table for a relationship kind
pub fn relationship_fields(kind: RecordKind) -> Option<&'static RelationshipFields> {
    match kind {
        RecordKind::CitationAuthority | RecordKind::AuthorityAuthority => {
            Some(&AUTHORITY_RELATION_FIELDS)
        }
        RecordKind::CitationCitation => Some(&CITATION_RELATION_FIELDS),
        RecordKind::Attribute | RecordKind::LinkedData => None,
    }
}

/// Decode one entry as a record of the given kind
pub fn decode(entry: &RawEntry, kind: RecordKind) -> Result<DecodedRecord, InvalidEntry> {
    if entry.is_empty() {
        return Err(InvalidEntry::Empty);
    }

    if kind.is_relationship() {
        return decode_relationship(entry, kind).map(DecodedRecord::Relationship);
    }
    match kind {
        RecordKind::LinkedData => decode_linked_data(entry).map(DecodedRecord::LinkedData),
        _ => decode_attribute(entry).map(DecodedRecord::Attribute),
    }
}

fn owned(value: Option<&str>) -> Option<String> {
    value.map(|v| v.trim().to_string())
}

fn decode_relationship(
    entry: &RawEntry,
    kind: RecordKind,
) -> Result<RelationshipRecord, InvalidEntry> {
    let fields = relationship_fields(kind).ok_or(InvalidEntry::MissingType)?;

    let raw_type = entry
        .get_non_empty(fields.relationship_type)
        .ok_or(InvalidEntry::MissingType)?
        .trim();
    let target_id = entry
        .get_non_empty(fields.target_id)
        .ok_or(InvalidEntry::MissingTarget)?
        .trim();

    let normalized_type = normalize_type(raw_type, kind);
    let category = Category::classify(kind, &normalized_type);

    Ok(RelationshipRecord {
        kind,
        category,
        relationship_type_raw: raw_type.to_string(),
        normalized_type,
        target_id: target_id.to_string(),
        target_name: owned(entry.get_non_empty(fields.target_name)),
        display_name: owned(fields.display_name.and_then(|k| entry.get_non_empty(k))),
        display_order: owned(fields.display_order.and_then(|k| entry.get_non_empty(k))),
        target_type: owned(entry.get_non_empty(fields.target_type)),
        target_status: owned(entry.get_non_empty(fields.target_status)),
        relationship_id: owned(entry.get_non_empty(fields.relationship_id)),
        relationship_status: owned(entry.get_non_empty(fields.relationship_status)),
        position: entry.position,
    })
}

fn decode_attribute(entry: &RawEntry) -> Result<AttributeRecord, InvalidEntry> {
    let attribute_type = entry
        .get_non_empty("AttributeType")
        .ok_or(InvalidEntry::MissingType)?
        .trim()
        .to_string();

    let raw_value = owned(entry.get_non_empty("AttributeValue"));
    let value = raw_value.as_deref().and_then(parse_structured_value);

    Ok(AttributeRecord {
        id: owned(entry.get_non_empty("AttributeID")),
        status: owned(entry.get_non_empty("AttributeStatus")),
        attribute_type,
        raw_value,
        value,
        free_form_value: owned(entry.get_non_empty("AttributeFreeFormValue")),
        start: owned(entry.get_non_empty("AttributeStart")),
        end: owned(entry.get_non_empty("AttributeEnd")),
        description: owned(entry.get_non_empty("AttributeDescription")),
        position: entry.position,
    })
}

fn decode_linked_data(entry: &RawEntry) -> Result<LinkedDataRecord, InvalidEntry> {
    let link_type = entry
        .get_non_empty("Type")
        .ok_or(InvalidEntry::MissingType)?
        .trim()
        .to_string();
    let urn = entry
        .get_non_empty("URN")
        .ok_or(InvalidEntry::MissingValue)?
        .trim()
        .to_string();

    Ok(LinkedDataRecord {
        link_type,
        values: vec![urn],
    })
}

/// Parse `AttributeValue` text into its numeric/array form
///
/// Exports wrap lists in double brackets (`[[1847, 1918]]`); one layer is
/// stripped before parsing. Plain numbers and JSON arrays parse as-is;
/// anything else has no structured form.
pub fn parse_structured_value(raw: &str) -> Option<Value> {
    let raw = raw.trim();
    if raw.starts_with("[[") && raw.ends_with("]]") && raw.len() >= 4 {
        let inner = format!("[{}]", &raw[2..raw.len() - 2]);
        return match serde_json::from_str::<Value>(&inner) {
            Ok(value) => Some(value),
            Err(e) => {
                debug!("Could not parse attribute value {:?}: {}", raw, e);
                None
            }
        };
    }

    match serde_json::from_str::<Value>(raw) {
        Ok(value @ (Value::Number(_) | Value::Array(_))) => Some(value),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenize::tokenize;
    use serde_json::json;

    fn entry(raw: &str) -> RawEntry {
        tokenize(raw, " // ", " || ").remove(0)
    }

    fn relationship(raw: &str, kind: RecordKind) -> RelationshipRecord {
        match decode(&entry(raw), kind) {
            Ok(DecodedRecord::Relationship(r)) => r,
            other => panic!("expected relationship, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_citation_authority() {
        let r = relationship(
            "ACR_ID ACR1 || ACRStatus Active || ACRType Author || ACRDisplayOrder 1.0 || \
             ACRNameForDisplayInCitation Joseph W. Dauben || AuthorityID CBA000023541 || \
             AuthorityStatus Active || AuthorityType Person || AuthorityName Dauben, Joseph Warren",
            RecordKind::CitationAuthority,
        );
        assert_eq!(r.relationship_type_raw, "Author");
        assert_eq!(r.normalized_type, "AUTHOR");
        assert_eq!(r.category, Category::Contributor);
        assert_eq!(r.target_id, "CBA000023541");
        assert_eq!(r.target_name.as_deref(), Some("Dauben, Joseph Warren"));
        assert_eq!(r.display_name.as_deref(), Some("Joseph W. Dauben"));
        assert_eq!(r.display_order.as_deref(), Some("1.0"));
        assert_eq!(r.target_type.as_deref(), Some("Person"));
        assert_eq!(r.target_status.as_deref(), Some("Active"));
        assert_eq!(r.relationship_id.as_deref(), Some("ACR1"));
        assert_eq!(r.relationship_status.as_deref(), Some("Active"));
    }

    #[test]
    fn test_decode_citation_citation() {
        let r = relationship(
            "CCR_ID CCR9 || CCRStatus Active || CCRType Is Reviewed By || CitationID CBB1 || \
             CitationTitle A Review of Things || CitationType Review",
            RecordKind::CitationCitation,
        );
        assert_eq!(r.normalized_type, "isReviewedBy");
        assert_eq!(r.category, Category::Citation);
        assert_eq!(r.target_name.as_deref(), Some("A Review of Things"));
        assert_eq!(r.target_type.as_deref(), Some("Review"));
        assert_eq!(r.relationship_id.as_deref(), Some("CCR9"));
        assert_eq!(r.display_name, None);
    }

    #[test]
    fn test_missing_required_fields() {
        assert_eq!(
            decode(&entry("ACRType Author || AuthorityName X"), RecordKind::CitationAuthority),
            Err(InvalidEntry::MissingTarget)
        );
        assert_eq!(
            decode(&entry("AuthorityID CBA1"), RecordKind::CitationAuthority),
            Err(InvalidEntry::MissingType)
        );
        assert_eq!(
            decode(&entry("ACRType || AuthorityID CBA1"), RecordKind::CitationAuthority),
            Err(InvalidEntry::MissingType)
        );
        assert_eq!(
            decode(&RawEntry::default(), RecordKind::CitationAuthority),
            Err(InvalidEntry::Empty)
        );
    }

    #[test]
    fn test_blank_display_name_ignored() {
        let r = relationship(
            "ACRType Editor || AuthorityID CBA2 || ACRNameForDisplayInCitation  || AuthorityName Smith",
            RecordKind::CitationAuthority,
        );
        assert_eq!(r.display_name, None);
        assert_eq!(r.name(), Some("Smith"));
    }

    #[test]
    fn test_blank_target_name_ignored() {
        let r = relationship(
            "ACRType Author || AuthorityID CBA1 || AuthorityName ",
            RecordKind::CitationAuthority,
        );
        assert_eq!(r.target_name, None);
        assert_eq!(r.name(), None);
    }

    #[test]
    fn test_decode_attribute() {
        let record = decode(
            &entry(
                "AttributeID ATT1 || AttributeStatus Active || AttributeType BirthToDeathDates || \
                 AttributeValue [[1847, 1918]] || AttributeFreeFormValue 1847-1918",
            ),
            RecordKind::Attribute,
        );
        let Ok(DecodedRecord::Attribute(attr)) = record else {
            panic!("expected attribute");
        };
        assert_eq!(attr.attribute_type, "BirthToDeathDates");
        assert_eq!(attr.value, Some(json!([1847, 1918])));
        assert_eq!(attr.free_form_value.as_deref(), Some("1847-1918"));
        assert_eq!(attr.id.as_deref(), Some("ATT1"));
    }

    #[test]
    fn test_decode_attribute_requires_type() {
        assert_eq!(
            decode(&entry("AttributeValue 12"), RecordKind::Attribute),
            Err(InvalidEntry::MissingType)
        );
    }

    #[test]
    fn test_decode_linked_data() {
        let record = decode(&entry("Type DOI || URN 10.1000/182"), RecordKind::LinkedData);
        assert_eq!(
            record,
            Ok(DecodedRecord::LinkedData(LinkedDataRecord {
                link_type: "DOI".to_string(),
                values: vec!["10.1000/182".to_string()],
            }))
        );
        assert_eq!(
            decode(&entry("Type VIAF || URN"), RecordKind::LinkedData),
            Err(InvalidEntry::MissingValue)
        );
    }

    #[test]
    fn test_parse_structured_value() {
        assert_eq!(parse_structured_value("[[1847, 1918]]"), Some(json!([1847, 1918])));
        assert_eq!(parse_structured_value("[[1910]]"), Some(json!([1910])));
        assert_eq!(parse_structured_value("1910"), Some(json!(1910)));
        assert_eq!(parse_structured_value("[1, 2]"), Some(json!([1, 2])));
        assert_eq!(parse_structured_value("[[oops]]"), None);
        assert_eq!(parse_structured_value("J. Hist. Sci."), None);
        assert_eq!(parse_structured_value("\"quoted\""), None);
    }
}
