//! Simple field converters
//!
//! Identifier, type, status and text columns, plus the authority
//! converters that combine several columns of a row (names,
//! classification, administrative metadata). These share the
//! [`FieldConverter`] contract with the micro-format converters.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use crate::config::{ConverterConfig, EntityType};
use crate::convert::{cell, FieldConverter};
use crate::error::Result;
use crate::pipeline::{
    Row, CLASSIFICATION_CODE, CLASSIFICATION_SYSTEM, CREATED_DATE, CREATOR, FIRST_NAME,
    LAST_NAME, MODIFIED_DATE, MODIFIER, NAME, NAME_PREFERRED, NAME_SUFFIX, RECORD_HISTORY,
    RECORD_TYPE, RELATED_CITATIONS_COUNT, STAFF_NOTES,
};
use crate::vocab::{authority_classes, citation_classes, ISISCB_PREFIX};

fn without_spaces(value: &str) -> String {
    value.chars().filter(|c| !c.is_whitespace()).collect()
}

/// `Record ID`: the document `@id`
#[derive(Debug, Clone, Copy)]
pub struct RecordIdConverter<'a> {
    config: &'a ConverterConfig,
    entity_type: EntityType,
}

impl<'a> RecordIdConverter<'a> {
    pub fn new(config: &'a ConverterConfig, entity_type: EntityType) -> Self {
        Self {
            config,
            entity_type,
        }
    }
}

impl FieldConverter for RecordIdConverter<'_> {
    fn field(&self) -> &str {
        "Record ID"
    }

    fn try_convert(&self, raw: &str, _record_id: &str) -> Result<Map<String, Value>> {
        let id = raw.trim();
        let mut fragment = Map::new();
        fragment.insert(
            "@id".to_string(),
            json!(self.config.entity_uri(self.entity_type, id)),
        );
        fragment.insert("isiscb:recordID".to_string(), json!(id));
        Ok(fragment)
    }
}

/// `Record Type`: standard classes plus an `isiscb:` class
///
/// Authority ids (`CBA...`) use the authority-type table, everything else
/// the citation-type table.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordTypeConverter;

impl FieldConverter for RecordTypeConverter {
    fn field(&self) -> &str {
        "Record Type"
    }

    fn convert(&self, raw: Option<&str>, record_id: &str) -> Map<String, Value> {
        match raw.map(str::trim).filter(|r| !r.is_empty()) {
            Some(value) => self.try_convert(value, record_id).unwrap_or_default(),
            None => {
                warn!(record_id = %record_id, "Empty record type");
                let mut fragment = Map::new();
                fragment.insert("@type".to_string(), json!("isiscb:UnknownType"));
                fragment
            }
        }
    }

    fn try_convert(&self, raw: &str, record_id: &str) -> Result<Map<String, Value>> {
        let value = raw.trim();
        let standard = match EntityType::from_record_id(record_id) {
            EntityType::Authority => authority_classes(value),
            EntityType::Citation => citation_classes(value),
        };

        let mut types: Vec<String> = match standard {
            Some(classes) => classes.iter().map(|c| c.to_string()).collect(),
            None => vec!["isiscb:UnmappedType".to_string()],
        };
        types.push(format!("{}{}", ISISCB_PREFIX, without_spaces(value)));

        let mut fragment = Map::new();
        fragment.insert("@type".to_string(), json!(types));
        Ok(fragment)
    }
}

/// `Record Nature`: publication status
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordNatureConverter;

impl FieldConverter for RecordNatureConverter {
    fn field(&self) -> &str {
        "Record Nature"
    }

    fn try_convert(&self, raw: &str, _record_id: &str) -> Result<Map<String, Value>> {
        // "Active (visible)" -> "Active"
        let status = raw.split('(').next().unwrap_or(raw).trim();
        let mapped = match status {
            "Active" => "isiscb:statusActive".to_string(),
            "Inactive" => "isiscb:statusInactive".to_string(),
            "Delete" => "isiscb:statusMarkedForDeletion".to_string(),
            "Redirect" => "isiscb:statusRedirect".to_string(),
            other => format!("{}status{}", ISISCB_PREFIX, without_spaces(other)),
        };

        let mut fragment = Map::new();
        fragment.insert("isiscb:recordStatus".to_string(), json!(mapped));
        fragment.insert("isiscb:recordNatureOriginal".to_string(), json!(raw));
        Ok(fragment)
    }
}

/// `Redirect`: target authority of a redirected record
#[derive(Debug, Clone, Copy)]
pub struct RedirectConverter<'a> {
    config: &'a ConverterConfig,
}

impl<'a> RedirectConverter<'a> {
    pub fn new(config: &'a ConverterConfig) -> Self {
        Self { config }
    }
}

impl FieldConverter for RedirectConverter<'_> {
    fn field(&self) -> &str {
        "Redirect"
    }

    fn try_convert(&self, raw: &str, _record_id: &str) -> Result<Map<String, Value>> {
        let mut fragment = Map::new();
        fragment.insert(
            "isiscb:redirectsTo".to_string(),
            json!({ "@id": self.config.authority_uri(raw) }),
        );
        Ok(fragment)
    }
}

/// `Title` of a citation
///
/// A citation always carries `dc:title`, so a blank title is emitted as
/// `""` with a warning instead of being skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct TitleConverter;

impl FieldConverter for TitleConverter {
    fn field(&self) -> &str {
        "Title"
    }

    fn convert(&self, raw: Option<&str>, record_id: &str) -> Map<String, Value> {
        match raw.map(str::trim).filter(|r| !r.is_empty()) {
            Some(title) => self.try_convert(title, record_id).unwrap_or_default(),
            None => {
                warn!(record_id = %record_id, "Empty title");
                let mut fragment = Map::new();
                fragment.insert("dc:title".to_string(), json!(""));
                fragment
            }
        }
    }

    fn try_convert(&self, raw: &str, _record_id: &str) -> Result<Map<String, Value>> {
        let title = raw.trim();
        let mut fragment = Map::new();
        fragment.insert("dc:title".to_string(), json!(title));
        fragment.insert("schema:name".to_string(), json!(title));
        Ok(fragment)
    }
}

/// `Abstract` of a citation
#[derive(Debug, Clone, Copy, Default)]
pub struct AbstractConverter;

impl FieldConverter for AbstractConverter {
    fn field(&self) -> &str {
        "Abstract"
    }

    fn try_convert(&self, raw: &str, _record_id: &str) -> Result<Map<String, Value>> {
        let text = raw.trim();
        let mut fragment = Map::new();
        fragment.insert("dc:abstract".to_string(), json!(text));
        fragment.insert("schema:abstract".to_string(), json!(text));
        Ok(fragment)
    }
}

/// `Description` of an authority
#[derive(Debug, Clone, Copy, Default)]
pub struct DescriptionConverter;

const ALSO_KNOWN_AS: &[&str] = &["AKA ", "Also known as "];

impl DescriptionConverter {
    /// Alternate name from a leading `AKA ...,` clause
    fn alternate_name(description: &str) -> Option<&str> {
        let clause = description.split(',').next().unwrap_or(description);
        ALSO_KNOWN_AS
            .iter()
            .find_map(|prefix| {
                clause
                    .get(..prefix.len())
                    .filter(|head| head.eq_ignore_ascii_case(prefix))
                    .map(|_| clause[prefix.len()..].trim())
            })
            .filter(|name| !name.is_empty())
    }
}

impl FieldConverter for DescriptionConverter {
    fn field(&self) -> &str {
        "Description"
    }

    fn try_convert(&self, raw: &str, _record_id: &str) -> Result<Map<String, Value>> {
        let description = raw.trim();
        let mut fragment = Map::new();
        fragment.insert("dc:description".to_string(), json!(description));
        fragment.insert("schema:description".to_string(), json!(description));
        if let Some(name) = Self::alternate_name(description) {
            fragment.insert("skos:altLabel".to_string(), json!([name]));
        }
        Ok(fragment)
    }
}

/// Name columns of an authority row
#[derive(Debug, Default)]
struct NameCells<'r> {
    record_type: Option<&'r str>,
    name: Option<&'r str>,
    preferred: Option<&'r str>,
    last: Option<&'r str>,
    first: Option<&'r str>,
    suffix: Option<&'r str>,
}

/// Authority names
///
/// Reads `Name`, `Name Preferred` and, for persons, the name parts. The
/// preferred form is the display label when present and the plain name
/// then becomes an alternate label. Geographic terms also get
/// `schema:placeName` and time periods `dcterms:temporal`.
///
/// `convert` on a single value treats it as the `Name` column.
#[derive(Debug, Clone, Copy, Default)]
pub struct NameConverter;

impl NameConverter {
    fn fragment(cells: &NameCells<'_>) -> Map<String, Value> {
        let mut fragment = Map::new();
        let label = cells.preferred.or(cells.name);
        if let Some(label) = label {
            fragment.insert("schema:name".to_string(), json!(label));
            fragment.insert("skos:prefLabel".to_string(), json!(label));
        }

        match (cells.record_type, label) {
            (Some("Person"), _) => {
                let parts = [
                    ("schema:familyName", cells.last),
                    ("schema:givenName", cells.first),
                    ("schema:nameSuffix", cells.suffix),
                ];
                for (key, part) in parts {
                    if let Some(part) = part {
                        fragment.insert(key.to_string(), json!(part));
                    }
                }
            }
            (Some("Geographic Term"), Some(label)) => {
                fragment.insert("schema:placeName".to_string(), json!(label));
            }
            (Some("Time Period"), Some(label)) => {
                fragment.insert("dcterms:temporal".to_string(), json!(label));
            }
            _ => {}
        }

        if let (Some(preferred), Some(name)) = (cells.preferred, cells.name) {
            if preferred != name {
                fragment.insert("isiscb:namePreferred".to_string(), json!(preferred));
                fragment.insert("skos:altLabel".to_string(), json!([name]));
            }
        }
        fragment
    }
}

impl FieldConverter for NameConverter {
    fn field(&self) -> &str {
        NAME
    }

    fn try_convert(&self, raw: &str, _record_id: &str) -> Result<Map<String, Value>> {
        Ok(Self::fragment(&NameCells {
            name: Some(raw.trim()),
            ..NameCells::default()
        }))
    }

    fn convert_row(&self, row: &Row, _record_id: &str) -> Map<String, Value> {
        Self::fragment(&NameCells {
            record_type: cell(row, RECORD_TYPE),
            name: cell(row, NAME),
            preferred: cell(row, NAME_PREFERRED),
            last: cell(row, LAST_NAME),
            first: cell(row, FIRST_NAME),
            suffix: cell(row, NAME_SUFFIX),
        })
    }
}

const CLASSIFICATION_SCHEMES: &[&str] = &["Guerlac", "Whitrow", "Weldon", "SHOT", "Proper name"];

/// Classification system and code of an authority
///
/// Concepts and category divisions are SKOS concepts: the system becomes
/// their scheme and the code their notation, split into main and sub
/// category at a single `-`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassificationConverter;

impl ClassificationConverter {
    fn fragment(
        record_type: Option<&str>,
        system: Option<&str>,
        code: Option<&str>,
    ) -> Map<String, Value> {
        let mut fragment = Map::new();
        let is_concept = matches!(record_type, Some("Concept" | "Category Division"));

        if let Some(system) = system {
            fragment.insert("isiscb:classificationSystem".to_string(), json!(system));
            if is_concept {
                fragment.insert(
                    "skos:inScheme".to_string(),
                    json!({ "skos:prefLabel": system }),
                );
            }
            if let Some(scheme) = CLASSIFICATION_SCHEMES.iter().find(|s| system.contains(*s)) {
                fragment.insert("isiscb:classificationScheme".to_string(), json!(scheme));
            }
        }

        if let Some(code) = code {
            fragment.insert("isiscb:classificationCode".to_string(), json!(code));
            if is_concept {
                fragment.insert("skos:notation".to_string(), json!(code));
                match code.split_once('-') {
                    Some((main, sub)) if !sub.contains('-') => {
                        fragment.insert("isiscb:mainCategory".to_string(), json!(main));
                        fragment.insert("isiscb:subCategory".to_string(), json!(sub));
                    }
                    Some(_) => {}
                    None => {
                        fragment.insert("isiscb:mainCategory".to_string(), json!(code));
                    }
                }
            }
        }
        fragment
    }
}

impl FieldConverter for ClassificationConverter {
    fn field(&self) -> &str {
        CLASSIFICATION_SYSTEM
    }

    fn try_convert(&self, raw: &str, _record_id: &str) -> Result<Map<String, Value>> {
        Ok(Self::fragment(None, Some(raw.trim()), None))
    }

    fn convert_row(&self, row: &Row, _record_id: &str) -> Map<String, Value> {
        Self::fragment(
            cell(row, RECORD_TYPE),
            cell(row, CLASSIFICATION_SYSTEM),
            cell(row, CLASSIFICATION_CODE),
        )
    }
}

static NOTE_METADATA: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\{([^{}]*?)\}").ok());
static LIFE_YEARS: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(\d{4})-(\d{4})?").ok());
static BULK_CHANGE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)bulk change #(\d+)").ok());

/// Administrative metadata of an authority: staff notes, record history,
/// creation and modification, related-citation count
///
/// `{key: value}` groups inside staff notes are published as structured
/// metadata; a `Birth and Death dates` group also yields birth and death
/// years. `convert` on a single value treats it as the `Staff Notes`
/// column.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthorityMetadataConverter;

impl AuthorityMetadataConverter {
    fn staff_notes(notes: &str, fragment: &mut Map<String, Value>) {
        fragment.insert("isiscb:staffNotes".to_string(), json!(notes));

        let Some(pattern) = NOTE_METADATA.as_ref() else {
            return;
        };
        let items: Vec<(Option<&str>, &str)> = pattern
            .captures_iter(notes)
            .filter_map(|c| c.get(1))
            .map(|group| match group.as_str().split_once(':') {
                Some((key, value)) => (Some(key.trim()), value.trim()),
                None => (None, group.as_str().trim()),
            })
            .collect();
        if items.is_empty() {
            return;
        }

        let metadata: Vec<Value> = items
            .iter()
            .map(|(key, value)| match key {
                Some(key) => json!({ "key": key, "value": value }),
                None => json!({ "value": value }),
            })
            .collect();
        fragment.insert("isiscb:staffNotesMetadata".to_string(), Value::Array(metadata));

        let life_dates = items
            .iter()
            .find(|(key, _)| key.is_some_and(|k| k.contains("Birth and Death dates")))
            .map(|(_, value)| *value);
        if let Some(dates) = life_dates {
            fragment.insert("isiscb:birthDeathDatesFromNotes".to_string(), json!(dates));
            if let Some(years) = LIFE_YEARS.as_ref().and_then(|re| re.captures(dates)) {
                if let Some(birth) = years.get(1) {
                    fragment.insert("schema:birthDate".to_string(), json!(birth.as_str()));
                }
                if let Some(death) = years.get(2) {
                    fragment.insert("schema:deathDate".to_string(), json!(death.as_str()));
                }
            }
        }
    }

    fn record_history(history: &str, fragment: &mut Map<String, Value>) {
        fragment.insert("isiscb:recordHistory".to_string(), json!(history));
        let ids: Vec<&str> = BULK_CHANGE
            .as_ref()
            .map(|re| {
                re.captures_iter(history)
                    .filter_map(|c| c.get(1))
                    .map(|m| m.as_str())
                    .collect()
            })
            .unwrap_or_default();
        if !ids.is_empty() {
            fragment.insert("isiscb:bulkChangeIds".to_string(), json!(ids));
        }
    }

    /// `Name (username)` as a person object, anything else as text
    fn agent(raw: &str) -> Value {
        let account = raw
            .split_once('(')
            .and_then(|(name, rest)| rest.split_once(')').map(|(user, _)| (name, user)));
        match account {
            Some((name, user)) => json!({
                "schema:name": name.trim(),
                "isiscb:username": user.trim()
            }),
            None => json!(raw),
        }
    }

    fn fragment(row: &Row, record_id: &str) -> Map<String, Value> {
        let mut fragment = Map::new();
        if let Some(notes) = cell(row, STAFF_NOTES) {
            Self::staff_notes(notes, &mut fragment);
        }
        if let Some(history) = cell(row, RECORD_HISTORY) {
            Self::record_history(history, &mut fragment);
        }
        for (column, key) in [(CREATED_DATE, "dc:created"), (MODIFIED_DATE, "dc:modified")] {
            if let Some(date) = cell(row, column) {
                fragment.insert(key.to_string(), json!(date));
            }
        }
        for (column, key) in [(CREATOR, "dc:creator"), (MODIFIER, "isiscb:modifier")] {
            if let Some(agent) = cell(row, column) {
                fragment.insert(key.to_string(), Self::agent(agent));
            }
        }
        if let Some(count) = cell(row, RELATED_CITATIONS_COUNT) {
            let value = match count.parse::<i64>() {
                Ok(n) => json!(n),
                Err(_) => {
                    debug!(record_id = %record_id, count, "Non-numeric related citations count");
                    json!(count)
                }
            };
            fragment.insert("isiscb:relatedCitationsCount".to_string(), value);
        }
        fragment
    }
}

impl FieldConverter for AuthorityMetadataConverter {
    fn field(&self) -> &str {
        STAFF_NOTES
    }

    fn try_convert(&self, raw: &str, _record_id: &str) -> Result<Map<String, Value>> {
        let mut fragment = Map::new();
        Self::staff_notes(raw.trim(), &mut fragment);
        Ok(fragment)
    }

    fn convert_row(&self, row: &Row, record_id: &str) -> Map<String, Value> {
        Self::fragment(row, record_id)
    }
}
