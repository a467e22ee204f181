//! Vocabulary definitions for IsisCB JSON-LD output
//!
//! Namespace prefixes, the base `@context`, the container keys used for
//! lossless lists, and the record-type tables that map IsisCB record types
//! onto standard vocabulary classes.

use serde_json::{json, Map, Value};

/// IsisCB extension namespace
pub const ISISCB_NS: &str = "https://ontology.isiscb.org/vocabulary/";

/// Prefix used for generated extension terms
pub const ISISCB_PREFIX: &str = "isiscb:";

/// Default base URL for record URIs
pub const DEFAULT_BASE_URL: &str = "https://data.isiscb.org";

/// Namespace prefixes declared in every document context
pub const NAMESPACES: &[(&str, &str)] = &[
    ("dc", "http://purl.org/dc/elements/1.1/"),
    ("dcterms", "http://purl.org/dc/terms/"),
    ("schema", "http://schema.org/"),
    ("bibo", "http://purl.org/ontology/bibo/"),
    ("foaf", "http://xmlns.com/foaf/0.1/"),
    ("skos", "http://www.w3.org/2004/02/skos/core#"),
    ("prism", "http://prismstandard.org/namespaces/basic/2.0/"),
    ("isiscb", ISISCB_NS),
];

/// Equivalent properties declared as aliases of their primary property
const PROPERTY_EQUIVALENCES: &[(&str, &str)] = &[
    ("schema:name", "dc:title"),
    ("isiscb:title", "dc:title"),
    ("schema:author", "dc:creator"),
    ("isiscb:author", "dc:creator"),
    ("schema:datePublished", "dc:date"),
    ("isiscb:publicationDate", "dc:date"),
    ("schema:publisher", "dc:publisher"),
    ("schema:about", "dc:subject"),
    ("schema:inLanguage", "dc:language"),
    ("schema:identifier", "dc:identifier"),
];

/// Lossless list of citation/authority relationships
pub const RELATED_AUTHORITIES: &str = "isiscb:relatedAuthorities";

/// Lossless list of citation-to-citation relationships
pub const RELATED_CITATIONS: &str = "isiscb:relatedCitations";

/// Lossless list of structured attributes
pub const ATTRIBUTES: &str = "isiscb:attributes";

/// Lossless list of external identifiers grouped by type
pub const LINKED_DATA: &str = "isiscb:linkedData";

/// Authority record types to standard classes
pub const AUTHORITY_TYPES: &[(&str, &[&str])] = &[
    ("Person", &["schema:Person", "foaf:Person"]),
    ("Institution", &["schema:Organization", "foaf:Organization"]),
    ("Geographic Term", &["schema:Place"]),
    ("Concept", &["skos:Concept"]),
    ("Time Period", &["dcterms:PeriodOfTime"]),
    ("Serial Publication", &["bibo:Periodical"]),
    ("Event", &["schema:Event"]),
    ("Creative Work", &["schema:CreativeWork"]),
    ("Category Division", &["skos:Collection"]),
    ("Cross-reference", &["skos:Collection"]),
];

/// Citation record types to standard classes
pub const CITATION_TYPES: &[(&str, &[&str])] = &[
    ("Book", &["bibo:Book", "schema:Book"]),
    ("Article", &["bibo:Article", "schema:ScholarlyArticle"]),
    ("Thesis", &["bibo:Thesis", "schema:Thesis"]),
    ("Chapter", &["bibo:Chapter", "schema:Chapter"]),
    ("Review", &["bibo:AcademicArticle", "schema:Review"]),
    ("Essay", &["bibo:AcademicArticle"]),
    ("Website", &["schema:WebSite"]),
    ("Conference Proceeding", &["bibo:Proceedings"]),
    ("Conference Paper", &["bibo:AcademicArticle", "schema:Article"]),
];

/// Look up the standard classes for an authority type
pub fn authority_classes(authority_type: &str) -> Option<&'static [&'static str]> {
    lookup(AUTHORITY_TYPES, authority_type)
}

/// Look up the standard classes for a citation type
pub fn citation_classes(citation_type: &str) -> Option<&'static [&'static str]> {
    lookup(CITATION_TYPES, citation_type)
}

fn lookup(
    table: &'static [(&'static str, &'static [&'static str])],
    key: &str,
) -> Option<&'static [&'static str]> {
    let key = key.trim();
    table
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(key))
        .map(|(_, classes)| *classes)
}

/// Base `@context` shared by citation and authority documents
pub fn base_context() -> Value {
    let mut context = Map::new();
    for (prefix, iri) in NAMESPACES {
        context.insert((*prefix).to_string(), json!(iri));
    }
    for (equivalent, primary) in PROPERTY_EQUIVALENCES {
        context.insert((*equivalent).to_string(), json!({ "@id": primary }));
    }
    Value::Object(context)
}
