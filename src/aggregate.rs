//! Relationship aggregation
//!
//! Folds decoded records of one field into two views of the same facts:
//!
//! 1. the standard-vocabulary projection: one value per relationship group,
//!    shaped by the group's [`Category`] and published under the resolved
//!    primary property and its equivalents
//! 2. the lossless list: every valid record in source order, published
//!    under the field's container key (`isiscb:relatedAuthorities`, ...)
//!
//! Groups are keyed by normalized type and kept in order of first
//! appearance, so output order depends only on input order.

use indexmap::IndexMap;
use serde_json::{json, Map, Value};

use crate::config::ConverterConfig;
use crate::merge::merge_property;
use crate::record::{AttributeRecord, Category, LinkedDataRecord, RecordKind, RelationshipRecord};
use crate::resolve::{lookup_key, MappingTables, PropertyMapping};
use crate::vocab::{authority_classes, ATTRIBUTES, LINKED_DATA, RELATED_AUTHORITIES, RELATED_CITATIONS};

/// A projected value and the properties it is published under
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    /// Group the projection was built from (normalized type, attribute
    /// type or identifier type)
    pub category_key: String,
    pub properties: Vec<String>,
    pub value: Value,
}

/// Both views of one field
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation {
    /// Standard-vocabulary projections in group order
    pub by_category: Vec<Projection>,
    /// Lossless records in source order
    pub full_list: Vec<Value>,
    /// Key the lossless list is published under
    pub container: &'static str,
}

impl Aggregation {
    fn new(container: &'static str) -> Self {
        Self {
            by_category: Vec::new(),
            full_list: Vec::new(),
            container,
        }
    }

    fn project(&mut self, category_key: &str, mapping: &PropertyMapping, value: Value) {
        let properties: Vec<String> = mapping.properties().map(String::from).collect();
        if properties.is_empty() {
            return;
        }
        self.by_category.push(Projection {
            category_key: category_key.to_string(),
            properties,
            value,
        });
    }

    fn project_to(&mut self, category_key: &str, property: &str, value: Value) {
        self.by_category.push(Projection {
            category_key: category_key.to_string(),
            properties: vec![property.to_string()],
            value,
        });
    }

    /// Output mapping for the field
    ///
    /// Projections sharing a property are merged (lists concatenate, the
    /// first single value wins). The container key is omitted when no
    /// valid record was seen.
    pub fn into_fragment(self) -> Map<String, Value> {
        let mut fragment = Map::new();
        for projection in self.by_category {
            for property in &projection.properties {
                merge_property(&mut fragment, property, projection.value.clone());
            }
        }
        if !self.full_list.is_empty() {
            fragment.insert(self.container.to_string(), Value::Array(self.full_list));
        }
        fragment
    }
}

/// Container key for a record kind
pub fn container_key(kind: RecordKind) -> &'static str {
    match kind {
        RecordKind::CitationAuthority | RecordKind::AuthorityAuthority => RELATED_AUTHORITIES,
        RecordKind::CitationCitation => RELATED_CITATIONS,
        RecordKind::Attribute => ATTRIBUTES,
        RecordKind::LinkedData => LINKED_DATA,
    }
}

/// Aggregates decoded records using shared configuration and tables
#[derive(Debug, Clone, Copy)]
pub struct Aggregator<'a> {
    config: &'a ConverterConfig,
    tables: &'a MappingTables,
}

impl<'a> Aggregator<'a> {
    pub fn new(config: &'a ConverterConfig, tables: &'a MappingTables) -> Self {
        Self { config, tables }
    }

    /// Aggregate relationships of one field (all of the same `kind`)
    pub fn aggregate_relationships(
        &self,
        kind: RecordKind,
        records: &[RelationshipRecord],
    ) -> Aggregation {
        let mut aggregation = Aggregation::new(container_key(kind));

        let mut groups: IndexMap<&str, Vec<&RelationshipRecord>> = IndexMap::new();
        for record in records {
            let mapping = self.tables.resolve(&record.relationship_type_raw, kind);
            aggregation
                .full_list
                .push(self.lossless_relationship(record, &mapping));
            groups
                .entry(record.normalized_type.as_str())
                .or_default()
                .push(record);
        }

        for (normalized_type, group) in groups {
            let Some(first) = group.first() else {
                continue;
            };
            let mapping = self.tables.resolve(&first.relationship_type_raw, kind);
            if mapping.primary_property.is_none() {
                continue;
            }
            let value = self.project_group(kind, first.category, group);
            aggregation.project(normalized_type, &mapping, value);
        }

        aggregation
    }

    fn project_group(
        &self,
        kind: RecordKind,
        category: Category,
        mut group: Vec<&RelationshipRecord>,
    ) -> Value {
        match category {
            Category::Contributor => {
                group.sort_by(|a, b| a.order_key().total_cmp(&b.order_key()));
                Value::Array(group.into_iter().map(|r| self.person_object(r)).collect())
            }
            Category::Subject => {
                Value::Array(group.into_iter().map(|r| self.entity_object(r)).collect())
            }
            Category::Single => group
                .first()
                .map(|r| self.entity_object(r))
                .unwrap_or(Value::Null),
            Category::Related if kind == RecordKind::AuthorityAuthority => Value::Array(
                group
                    .into_iter()
                    .map(|r| self.related_authority_object(r))
                    .collect(),
            ),
            Category::Related => {
                Value::Array(group.into_iter().map(|r| self.entity_object(r)).collect())
            }
            Category::Citation => {
                Value::Array(group.into_iter().map(|r| self.citation_object(r)).collect())
            }
        }
    }

    fn person_object(&self, record: &RelationshipRecord) -> Value {
        let mut obj = Map::new();
        obj.insert("@id".to_string(), json!(self.config.authority_uri(&record.target_id)));
        obj.insert("@type".to_string(), json!(person_or_organization(record)));
        if let Some(name) = record.name() {
            obj.insert("name".to_string(), json!(name));
        }
        let position = record.order_label();
        let role = record.role();
        obj.insert("position".to_string(), json!(position));
        obj.insert("isiscb:position".to_string(), json!(position));
        obj.insert("role".to_string(), json!(role));
        obj.insert("isiscb:role".to_string(), json!(role));
        if let Some(t) = &record.target_type {
            obj.insert("isiscb:authorityType".to_string(), json!(t));
        }
        Value::Object(obj)
    }

    fn entity_object(&self, record: &RelationshipRecord) -> Value {
        let mut obj = Map::new();
        obj.insert("@id".to_string(), json!(self.config.authority_uri(&record.target_id)));
        if let Some(classes) = record.target_type.as_deref().and_then(authority_classes) {
            obj.insert("@type".to_string(), json!(classes));
        }
        if let Some(name) = record.name() {
            obj.insert("name".to_string(), json!(name));
        }
        if let Some(t) = &record.target_type {
            obj.insert("isiscb:type".to_string(), json!(t));
        }
        Value::Object(obj)
    }

    fn related_authority_object(&self, record: &RelationshipRecord) -> Value {
        let mut obj = Map::new();
        obj.insert("@id".to_string(), json!(self.config.authority_uri(&record.target_id)));
        if let Some(name) = record.name() {
            obj.insert("skos:prefLabel".to_string(), json!(name));
            obj.insert("schema:name".to_string(), json!(name));
        }
        if let Some(t) = &record.target_type {
            let classes = authority_classes(t).unwrap_or(&["skos:Concept"][..]);
            obj.insert("@type".to_string(), json!(classes));
        }
        Value::Object(obj)
    }

    fn citation_object(&self, record: &RelationshipRecord) -> Value {
        let mut obj = Map::new();
        obj.insert("@id".to_string(), json!(self.config.citation_uri(&record.target_id)));
        if let Some(title) = &record.target_name {
            obj.insert("dc:title".to_string(), json!(title));
        }
        if let Some(t) = &record.target_type {
            obj.insert("isiscb:citationType".to_string(), json!(t));
        }
        Value::Object(obj)
    }

    fn lossless_relationship(&self, record: &RelationshipRecord, mapping: &PropertyMapping) -> Value {
        let mut obj = Map::new();
        obj.insert("@type".to_string(), json!(mapping.type_uri));
        obj.insert(
            "isiscb:relationshipType".to_string(),
            json!(record.relationship_type_raw),
        );
        obj.insert("isiscb:normalizedType".to_string(), json!(record.normalized_type));

        let (reference, name_key, type_key, status_key, uri) = match record.kind {
            RecordKind::CitationCitation => (
                "isiscb:citation",
                "isiscb:citationTitle",
                "isiscb:citationType",
                "isiscb:citationStatus",
                self.config.citation_uri(&record.target_id),
            ),
            _ => (
                "isiscb:authority",
                "isiscb:authorityName",
                "isiscb:authorityType",
                "isiscb:authorityStatus",
                self.config.authority_uri(&record.target_id),
            ),
        };
        obj.insert(reference.to_string(), json!({ "@id": uri }));

        let optional = [
            (name_key, &record.target_name),
            ("isiscb:displayName", &record.display_name),
            ("isiscb:displayOrder", &record.display_order),
            (type_key, &record.target_type),
            (status_key, &record.target_status),
            ("isiscb:relationshipID", &record.relationship_id),
            ("isiscb:relationshipStatus", &record.relationship_status),
        ];
        for (key, value) in optional {
            if let Some(v) = value {
                obj.insert(key.to_string(), json!(v));
            }
        }
        Value::Object(obj)
    }

    /// Aggregate the attributes of one record
    pub fn aggregate_attributes(&self, records: &[AttributeRecord]) -> Aggregation {
        let mut aggregation = Aggregation::new(ATTRIBUTES);

        for record in records {
            let mapping = self.tables.resolve(&record.attribute_type, RecordKind::Attribute);
            aggregation
                .full_list
                .push(lossless_attribute(record, &mapping));
            self.project_attribute(&mut aggregation, record, &mapping);
        }

        aggregation
    }

    fn project_attribute(
        &self,
        aggregation: &mut Aggregation,
        record: &AttributeRecord,
        mapping: &PropertyMapping,
    ) {
        let key = record.attribute_type.as_str();
        match AttributeShape::classify(key) {
            AttributeShape::BirthToDeath => {
                let birth = record.value_at(0).and_then(year_text);
                let death = record.value_at(1).and_then(year_text);
                if let Some(b) = &birth {
                    aggregation.project_to(key, "schema:birthDate", json!(b));
                }
                if let Some(d) = &death {
                    aggregation.project_to(key, "schema:deathDate", json!(d));
                }
                if let (Some(b), Some(d)) = (birth, death) {
                    let range = record
                        .free_form_value
                        .clone()
                        .unwrap_or_else(|| format!("{}-{}", b, d));
                    aggregation.project_to(key, "schema:birthDeathDate", json!(range));
                }
            }
            AttributeShape::Birth | AttributeShape::Death => {
                let property = if AttributeShape::classify(key) == AttributeShape::Birth {
                    "schema:birthDate"
                } else {
                    "schema:deathDate"
                };
                let year = record
                    .first_value()
                    .and_then(year_text)
                    .or_else(|| record.raw_value.as_deref().and_then(bracketed_year));
                if let Some(year) = year {
                    aggregation.project_to(key, property, json!(year));
                }
            }
            AttributeShape::Flourished => {
                if let Some(year) = record.first_value().and_then(year_text) {
                    aggregation.project_to(key, "isiscb:flourishedDate", json!(year));
                    if let Some(display) = &record.free_form_value {
                        aggregation.project_to(key, "isiscb:flourishedDisplayValue", json!(display));
                    }
                }
            }
            AttributeShape::GeographicEntityType => {
                if let Some(geo_type) = &record.raw_value {
                    aggregation.project(key, mapping, json!(geo_type));
                    if let Some(place) = place_class(geo_type) {
                        aggregation.project_to(key, "@type", json!(place));
                    }
                }
            }
            AttributeShape::Mapped => {
                if let Some(value) = &record.raw_value {
                    aggregation.project(key, mapping, json!(value));
                }
            }
        }
    }

    /// Aggregate the external identifiers of one record
    pub fn aggregate_linked_data(&self, records: &[LinkedDataRecord]) -> Aggregation {
        let mut aggregation = Aggregation::new(LINKED_DATA);

        let mut grouped: IndexMap<&str, Vec<&str>> = IndexMap::new();
        for record in records {
            let values = grouped.entry(record.link_type.as_str()).or_default();
            values.extend(record.values.iter().map(String::as_str));
        }

        for (link_type, values) in &grouped {
            aggregation
                .full_list
                .push(json!({ "type": link_type, "values": values }));
        }

        let identifiers: Vec<Value> = ["DOI", "ISBN"]
            .iter()
            .flat_map(|wanted| {
                grouped
                    .iter()
                    .filter(move |(t, _)| t.eq_ignore_ascii_case(wanted))
                    .flat_map(move |(_, values)| {
                        values.iter().map(move |v| {
                            json!({"@type": "PropertyValue", "propertyID": wanted, "value": v})
                        })
                    })
            })
            .collect();
        if let Some(value) = one_or_many(identifiers) {
            aggregation.project_to("DOI/ISBN", "schema:identifier", value);
        }

        let uris: Vec<Value> = grouped
            .iter()
            .filter(|(t, _)| t.eq_ignore_ascii_case("URI"))
            .flat_map(|(_, values)| values.iter().map(|v| json!(v)))
            .collect();
        if let Some(value) = one_or_many(uris) {
            aggregation.project_to("URI", "schema:sameAs", value);
        }

        aggregation
    }
}

/// Projection shapes for attribute types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttributeShape {
    BirthToDeath,
    Birth,
    Death,
    Flourished,
    GeographicEntityType,
    Mapped,
}

impl AttributeShape {
    fn classify(attribute_type: &str) -> Self {
        match lookup_key(attribute_type).as_str() {
            "BIRTHTODEATHDATES" => AttributeShape::BirthToDeath,
            "BIRTHDATE" => AttributeShape::Birth,
            "DEATHDATE" => AttributeShape::Death,
            "FLOURISHEDDATE" => AttributeShape::Flourished,
            "GEOGRAPHICENTITYTYPE" => AttributeShape::GeographicEntityType,
            _ => AttributeShape::Mapped,
        }
    }
}

fn lossless_attribute(record: &AttributeRecord, mapping: &PropertyMapping) -> Value {
    let mut obj = Map::new();
    obj.insert("@type".to_string(), json!(mapping.type_uri));
    obj.insert("type".to_string(), json!(record.attribute_type));
    obj.insert(
        "value".to_string(),
        record.value.clone().unwrap_or(Value::Null),
    );
    let optional = [
        ("id", &record.id),
        ("status", &record.status),
        ("rawValue", &record.raw_value),
        ("freeFormValue", &record.free_form_value),
        ("start", &record.start),
        ("end", &record.end),
        ("description", &record.description),
    ];
    for (key, value) in optional {
        if let Some(v) = value {
            obj.insert(key.to_string(), json!(v));
        }
    }
    Value::Object(obj)
}

fn person_or_organization(record: &RelationshipRecord) -> &'static str {
    let is_organization = record
        .target_type
        .as_deref()
        .and_then(authority_classes)
        .map(|classes| classes.contains(&"schema:Organization"))
        .unwrap_or(false);
    if is_organization {
        "schema:Organization"
    } else {
        "schema:Person"
    }
}

fn place_class(geo_type: &str) -> Option<&'static str> {
    match geo_type.trim() {
        "City" => Some("schema:City"),
        "Country" => Some("schema:Country"),
        "State" => Some("schema:State"),
        "Province" => Some("schema:AdministrativeArea"),
        _ => None,
    }
}

/// Render a structured date component as text
fn year_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.trim().to_string()),
        other => Some(other.to_string()),
    }
}

/// First `[digits]` group in free text
fn bracketed_year(raw: &str) -> Option<String> {
    let mut rest = raw;
    while let Some(open) = rest.find('[') {
        let after = &rest[open + 1..];
        let digits: String = after.chars().take_while(|c| c.is_ascii_digit()).collect();
        if !digits.is_empty() && after[digits.len()..].starts_with(']') {
            return Some(digits);
        }
        rest = after;
    }
    None
}

fn one_or_many(mut values: Vec<Value>) -> Option<Value> {
    match values.len() {
        0 => None,
        1 => values.pop(),
        _ => Some(Value::Array(values)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::decode;
    use crate::record::DecodedRecord;
    use crate::tokenize::tokenize;

    fn relationships(raw: &str, kind: RecordKind) -> Vec<RelationshipRecord> {
        tokenize(raw, " // ", " || ")
            .iter()
            .filter_map(|e| match decode(e, kind) {
                Ok(DecodedRecord::Relationship(r)) => Some(r),
                _ => None,
            })
            .collect()
    }

    fn attributes(raw: &str) -> Vec<AttributeRecord> {
        tokenize(raw, " // ", " || ")
            .iter()
            .filter_map(|e| match decode(e, RecordKind::Attribute) {
                Ok(DecodedRecord::Attribute(a)) => Some(a),
                _ => None,
            })
            .collect()
    }

    fn linked(raw: &str) -> Vec<LinkedDataRecord> {
        tokenize(raw, " // ", " || ")
            .iter()
            .filter_map(|e| match decode(e, RecordKind::LinkedData) {
                Ok(DecodedRecord::LinkedData(l)) => Some(l),
                _ => None,
            })
            .collect()
    }

    fn aggregate(raw: &str, kind: RecordKind) -> Map<String, Value> {
        let config = ConverterConfig::default();
        let tables = MappingTables::standard();
        Aggregator::new(&config, &tables)
            .aggregate_relationships(kind, &relationships(raw, kind))
            .into_fragment()
    }

    #[test]
    fn test_authors_sorted_by_display_order() {
        let fragment = aggregate(
            "ACRType Author || ACRDisplayOrder 2.0 || AuthorityID CBA2 || AuthorityName Second // \
             ACRType Author || ACRDisplayOrder 1.0 || AuthorityID CBA1 || AuthorityName First",
            RecordKind::CitationAuthority,
        );
        let creators = fragment["dc:creator"].as_array().unwrap();
        assert_eq!(creators[0]["name"], json!("First"));
        assert_eq!(creators[0]["position"], json!("1.0"));
        assert_eq!(creators[1]["name"], json!("Second"));
        assert_eq!(fragment["schema:author"], fragment["dc:creator"]);

        // lossless list keeps source order
        let full = fragment[RELATED_AUTHORITIES].as_array().unwrap();
        assert_eq!(full[0]["isiscb:authorityName"], json!("Second"));
    }

    #[test]
    fn test_missing_order_uses_source_position() {
        let fragment = aggregate(
            "ACRType Author || AuthorityID CBA1 || AuthorityName A // \
             ACRType Author || ACRDisplayOrder 1.5 || AuthorityID CBA2 || AuthorityName B // \
             ACRType Author || ACRDisplayOrder n/a || AuthorityID CBA3 || AuthorityName C",
            RecordKind::CitationAuthority,
        );
        let names: Vec<&Value> = fragment["dc:creator"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| &c["name"])
            .collect();
        assert_eq!(names, vec![&json!("A"), &json!("B"), &json!("C")]);
        assert_eq!(fragment["dc:creator"][2]["position"], json!("3"));
    }

    #[test]
    fn test_person_type_guess() {
        let fragment = aggregate(
            "ACRType Author || AuthorityID CBA1 || AuthorityType Institution // \
             ACRType Author || AuthorityID CBA2",
            RecordKind::CitationAuthority,
        );
        assert_eq!(fragment["dc:creator"][0]["@type"], json!("schema:Organization"));
        assert_eq!(fragment["dc:creator"][1]["@type"], json!("schema:Person"));
    }

    #[test]
    fn test_contributors_share_property() {
        let fragment = aggregate(
            "ACRType Translator || AuthorityID CBA1 // \
             ACRType Advisor || AuthorityID CBA2 // \
             ACRType Translator || AuthorityID CBA3",
            RecordKind::CitationAuthority,
        );
        let contributors = fragment["dc:contributor"].as_array().unwrap();
        assert_eq!(contributors.len(), 3);
        assert_eq!(contributors[0]["role"], json!("translator"));
        assert_eq!(contributors[1]["role"], json!("translator"));
        assert_eq!(contributors[2]["isiscb:role"], json!("advisor"));
    }

    #[test]
    fn test_single_first_wins() {
        let fragment = aggregate(
            "ACRType Publisher || AuthorityID CBA1 || AuthorityName First Press // \
             ACRType Publisher || AuthorityID CBA2 || AuthorityName Second Press",
            RecordKind::CitationAuthority,
        );
        assert_eq!(fragment["dc:publisher"]["name"], json!("First Press"));
        assert_eq!(fragment["schema:publisher"]["name"], json!("First Press"));
        assert_eq!(fragment[RELATED_AUTHORITIES].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_subjects_keep_source_order() {
        let fragment = aggregate(
            "ACRType Subject || AuthorityID CBA9 || AuthorityName Optics || AuthorityType Concept // \
             ACRType Subject || AuthorityID CBA3 || AuthorityName Kepler || AuthorityType Person",
            RecordKind::CitationAuthority,
        );
        let subjects = fragment["dc:subject"].as_array().unwrap();
        assert_eq!(subjects[0]["name"], json!("Optics"));
        assert_eq!(subjects[0]["@type"], json!(["skos:Concept"]));
        assert_eq!(subjects[1]["@type"], json!(["schema:Person", "foaf:Person"]));
        assert_eq!(fragment["schema:about"], fragment["dc:subject"]);
    }

    #[test]
    fn test_unknown_type_only_in_lossless_list() {
        let fragment = aggregate(
            "ACRType Guest Lecturer || AuthorityID CBA1 || AuthorityName Someone",
            RecordKind::CitationAuthority,
        );
        assert_eq!(fragment.len(), 1);
        let full = fragment[RELATED_AUTHORITIES].as_array().unwrap();
        assert_eq!(full[0]["@type"], json!("isiscb:guestLecturer"));
        assert_eq!(full[0]["isiscb:normalizedType"], json!("GUEST_LECTURER"));
    }

    #[test]
    fn test_authority_hierarchy() {
        let fragment = aggregate(
            "ACRType Broader Term || AuthorityID CBA1 || AuthorityName Physics || AuthorityType Concept // \
             ACRType Parent Institution || AuthorityID CBA2 || AuthorityName University || AuthorityType Institution",
            RecordKind::AuthorityAuthority,
        );
        let broader = fragment["skos:broader"].as_array().unwrap();
        assert_eq!(broader.len(), 2);
        assert_eq!(broader[0]["skos:prefLabel"], json!("Physics"));
        assert_eq!(broader[1]["@type"], json!(["schema:Organization", "foaf:Organization"]));
        assert_eq!(fragment["isiscb:parentInstitution"][0]["schema:name"], json!("University"));
    }

    #[test]
    fn test_authority_cross_references() {
        let fragment = aggregate(
            "ACRType Use || AuthorityID CBA1 || AuthorityName Optics || AuthorityType Concept // \
             ACRType Used For || AuthorityID CBA2 || AuthorityName Dioptrics || AuthorityType Spaceship",
            RecordKind::AuthorityAuthority,
        );
        assert_eq!(
            fragment["skos:exactMatch"],
            json!([{
                "@id": "https://data.isiscb.org/authority/CBA1",
                "skos:prefLabel": "Optics",
                "schema:name": "Optics",
                "@type": ["skos:Concept"]
            }])
        );
        let close = fragment["skos:closeMatch"].as_array().unwrap();
        assert_eq!(close[0]["@id"], json!("https://data.isiscb.org/authority/CBA2"));
        assert_eq!(close[0]["@type"], json!(["skos:Concept"]));
    }

    #[test]
    fn test_institution_types_are_lists() {
        let fragment = aggregate(
            "ACRType Institution || AuthorityID CBA1 || AuthorityName MIT || AuthorityType Institution // \
             ACRType Archival Repository || AuthorityID CBA2 || AuthorityName Royal Society // \
             ACRType Maintaining Institution || AuthorityID CBA3 || AuthorityName Smithsonian // \
             ACRType Institution || AuthorityID CBA4 || AuthorityName Caltech",
            RecordKind::CitationAuthority,
        );
        let institutions = fragment["isiscb:institution"].as_array().unwrap();
        assert_eq!(institutions.len(), 2);
        assert_eq!(institutions[0]["name"], json!("MIT"));
        assert_eq!(
            institutions[0]["@type"],
            json!(["schema:Organization", "foaf:Organization"])
        );
        assert_eq!(institutions[1]["name"], json!("Caltech"));
        assert_eq!(fragment["isiscb:archivalRepository"][0]["name"], json!("Royal Society"));
        assert_eq!(
            fragment["isiscb:maintainingInstitution"],
            json!([{"@id": "https://data.isiscb.org/authority/CBA3", "name": "Smithsonian"}])
        );
    }

    #[test]
    fn test_single_valued_types() {
        let fragment = aggregate(
            "ACRType Book Series || AuthorityID CBA1 || AuthorityName Studies || AuthorityType Serial Publication // \
             ACRType Book Series || AuthorityID CBA2 || AuthorityName Other Studies // \
             ACRType Meeting || AuthorityID CBA3 || AuthorityName HSS Annual Meeting || AuthorityType Event // \
             ACRType Distributor || AuthorityID CBA4 || AuthorityName Books Inc",
            RecordKind::CitationAuthority,
        );
        assert_eq!(
            fragment["isiscb:bookSeries"],
            json!({
                "@id": "https://data.isiscb.org/authority/CBA1",
                "@type": ["bibo:Periodical"],
                "name": "Studies",
                "isiscb:type": "Serial Publication"
            })
        );
        assert_eq!(fragment["bibo:presentedAt"]["name"], json!("HSS Annual Meeting"));
        assert_eq!(fragment["bibo:presentedAt"]["@type"], json!(["schema:Event"]));
        assert_eq!(
            fragment["schema:distributor"],
            json!({"@id": "https://data.isiscb.org/authority/CBA4", "name": "Books Inc"})
        );
    }

    #[test]
    fn test_blank_authority_name_omitted() {
        let fragment = aggregate(
            "ACRType Author || AuthorityID CBA1 || AuthorityName ",
            RecordKind::CitationAuthority,
        );
        let creator = fragment["dc:creator"][0].as_object().unwrap();
        assert!(!creator.contains_key("name"));
        let full = fragment[RELATED_AUTHORITIES][0].as_object().unwrap();
        assert!(!full.contains_key("isiscb:authorityName"));
    }

    #[test]
    fn test_citation_relationships() {
        let fragment = aggregate(
            "CCR_ID CCR1 || CCRType Is Reviewed By || CitationID CBB2 || CitationTitle Review One || CitationType Review // \
             CCRType Is Reviewed By || CitationID CBB3",
            RecordKind::CitationCitation,
        );
        let reviews = fragment["isiscb:isReviewedBy"].as_array().unwrap();
        assert_eq!(reviews.len(), 2);
        assert_eq!(
            reviews[0],
            json!({
                "@id": "https://data.isiscb.org/citation/CBB2",
                "dc:title": "Review One",
                "isiscb:citationType": "Review"
            })
        );
        let full = fragment[RELATED_CITATIONS].as_array().unwrap();
        assert_eq!(full[0]["isiscb:citation"]["@id"], json!("https://data.isiscb.org/citation/CBB2"));
        assert_eq!(full[0]["isiscb:relationshipID"], json!("CCR1"));
        assert_eq!(full[0]["@type"], json!("isiscb:isReviewedBy"));
    }

    #[test]
    fn test_empty_input_yields_empty_fragment() {
        assert!(aggregate("", RecordKind::CitationAuthority).is_empty());
    }

    #[test]
    fn test_attribute_projections() {
        let config = ConverterConfig::default();
        let tables = MappingTables::standard();
        let records = attributes(
            "AttributeType BirthToDeathDates || AttributeValue [[1847, 1918]] || AttributeFreeFormValue 1847-1918 // \
             AttributeType Birth date || AttributeValue ca. [1850] // \
             AttributeType JournalAbbr || AttributeValue J. Hist. Sci. // \
             AttributeType GeographicEntityType || AttributeValue City",
        );
        let fragment = Aggregator::new(&config, &tables)
            .aggregate_attributes(&records)
            .into_fragment();

        assert_eq!(fragment["schema:birthDate"], json!("1847"));
        assert_eq!(fragment["schema:deathDate"], json!("1918"));
        assert_eq!(fragment["schema:birthDeathDate"], json!("1847-1918"));
        assert_eq!(fragment["bibo:shortTitle"], json!("J. Hist. Sci."));
        assert_eq!(fragment["isiscb:journalAbbreviation"], json!("J. Hist. Sci."));
        assert_eq!(fragment["isiscb:geographicEntityType"], json!("City"));
        assert_eq!(fragment["@type"], json!("schema:City"));

        let full = fragment[ATTRIBUTES].as_array().unwrap();
        assert_eq!(full.len(), 4);
        assert_eq!(full[0]["value"], json!([1847, 1918]));
        assert_eq!(full[0]["@type"], json!("isiscb:birthtodeathdates"));
        assert_eq!(full[0]["type"], json!("BirthToDeathDates"));
        assert_eq!(full[2]["value"], Value::Null);
        assert_eq!(full[2]["rawValue"], json!("J. Hist. Sci."));
    }

    #[test]
    fn test_country_code() {
        let config = ConverterConfig::default();
        let tables = MappingTables::standard();
        let records = attributes("AttributeType CountryCode || AttributeValue FR");
        let fragment = Aggregator::new(&config, &tables)
            .aggregate_attributes(&records)
            .into_fragment();
        assert_eq!(fragment["schema:addressCountry"], json!("FR"));
        assert_eq!(fragment[ATTRIBUTES][0]["@type"], json!("isiscb:countrycode"));
    }

    #[test]
    fn test_birth_date_from_brackets() {
        let config = ConverterConfig::default();
        let tables = MappingTables::standard();
        let records = attributes("AttributeType Death date || AttributeValue d. [1642]");
        let fragment = Aggregator::new(&config, &tables)
            .aggregate_attributes(&records)
            .into_fragment();
        assert_eq!(fragment["schema:deathDate"], json!("1642"));
    }

    #[test]
    fn test_flourished_date() {
        let config = ConverterConfig::default();
        let tables = MappingTables::standard();
        let records = attributes(
            "AttributeType FlourishedDate || AttributeValue [[1200]] || AttributeFreeFormValue 13th century",
        );
        let fragment = Aggregator::new(&config, &tables)
            .aggregate_attributes(&records)
            .into_fragment();
        assert_eq!(fragment["isiscb:flourishedDate"], json!("1200"));
        assert_eq!(fragment["isiscb:flourishedDisplayValue"], json!("13th century"));
    }

    #[test]
    fn test_linked_data() {
        let config = ConverterConfig::default();
        let tables = MappingTables::standard();
        let records = linked(
            "Type DOI || URN 10.1000/182 // Type ISBN || URN 978-0-00-000000-2 // \
             Type URI || URN https://example.org/a // Type VIAF || URN 12345",
        );
        let fragment = Aggregator::new(&config, &tables)
            .aggregate_linked_data(&records)
            .into_fragment();

        let ids = fragment["schema:identifier"].as_array().unwrap();
        assert_eq!(ids.len(), 2);
        assert_eq!(ids[0]["propertyID"], json!("DOI"));
        assert_eq!(ids[1]["value"], json!("978-0-00-000000-2"));
        assert_eq!(fragment["schema:sameAs"], json!("https://example.org/a"));
        assert_eq!(
            fragment[LINKED_DATA],
            json!([
                {"type": "DOI", "values": ["10.1000/182"]},
                {"type": "ISBN", "values": ["978-0-00-000000-2"]},
                {"type": "URI", "values": ["https://example.org/a"]},
                {"type": "VIAF", "values": ["12345"]}
            ])
        );
    }

    #[test]
    fn test_linked_data_single_identifier_is_object() {
        let config = ConverterConfig::default();
        let tables = MappingTables::standard();
        let records = linked("Type DOI || URN 10.1/x // Type URI || URN a // Type URI || URN b");
        let fragment = Aggregator::new(&config, &tables)
            .aggregate_linked_data(&records)
            .into_fragment();
        assert_eq!(
            fragment["schema:identifier"],
            json!({"@type": "PropertyValue", "propertyID": "DOI", "value": "10.1/x"})
        );
        assert_eq!(fragment["schema:sameAs"], json!(["a", "b"]));
        assert_eq!(fragment[LINKED_DATA][1]["values"], json!(["a", "b"]));
    }

    #[test]
    fn test_linked_data_isbn_only() {
        let config = ConverterConfig::default();
        let tables = MappingTables::standard();
        let records = linked("Type isbn || URN 978-0-691-11713-3 // Type VIAF || URN 99");
        let fragment = Aggregator::new(&config, &tables)
            .aggregate_linked_data(&records)
            .into_fragment();
        assert_eq!(
            fragment["schema:identifier"],
            json!({"@type": "PropertyValue", "propertyID": "ISBN", "value": "978-0-691-11713-3"})
        );
        assert!(fragment.get("schema:sameAs").is_none());
    }

    #[test]
    fn test_bracketed_year() {
        assert_eq!(bracketed_year("ca. [1850]"), Some("1850".to_string()));
        assert_eq!(bracketed_year("[x] [17]"), Some("17".to_string()));
        assert_eq!(bracketed_year("1850"), None);
        assert_eq!(bracketed_year("[1850"), None);
    }
}
