//! Micro-format tokenizer
//!
//! IsisCB exports pack structured sub-records into a single CSV cell:
//!
//! ```text
//! ACR_ID ACR1 || ACRType Author || AuthorityID CBA1 // ACR_ID ACR2 || ...
//! ```
//!
//! Entries are separated by the entry separator (`" // "`), sub-fields by
//! the pair separator (`" || "`), and each sub-field is `Key value` split on
//! the first space only, so values keep their inner spaces.

use indexmap::IndexMap;

/// One entry of a micro-format field: sub-field keys to raw values, in
/// source order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawEntry {
    /// 0-based position of the entry among the field's non-empty entries
    pub position: usize,
    /// The segment this entry was parsed from
    pub source: String,
    fields: IndexMap<String, String>,
}

impl RawEntry {
    /// Value of a sub-field, if the key is present
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Value of a sub-field, treating blank values as absent
    pub fn get_non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.trim().is_empty())
    }

    /// Sub-fields in source order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Insert a sub-field; a repeated key keeps its first position but takes
    /// the last value
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(key.into(), value.into());
    }
}

/// Split a raw field into entries and each entry into sub-fields
///
/// Blank segments are dropped. Never fails: an empty input yields an empty
/// sequence.
pub fn tokenize(raw: &str, entry_sep: &str, pair_sep: &str) -> Vec<RawEntry> {
    if raw.trim().is_empty() || entry_sep.is_empty() {
        return Vec::new();
    }

    raw.split(entry_sep)
        .filter(|segment| !segment.trim().is_empty())
        .enumerate()
        .map(|(position, segment)| parse_entry(segment, pair_sep, position))
        .collect()
}

/// Parse one entry segment into its sub-fields
pub fn parse_entry(segment: &str, pair_sep: &str, position: usize) -> RawEntry {
    let mut entry = RawEntry {
        position,
        source: segment.trim().to_string(),
        fields: IndexMap::new(),
    };

    let parts: Vec<&str> = if pair_sep.is_empty() {
        vec![segment]
    } else {
        segment.split(pair_sep).collect()
    };

    for part in parts {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let (key, value) = split_key_value(part);
        entry.insert(key, value);
    }

    entry
}

/// Split a sub-field on its first space
fn split_key_value(part: &str) -> (&str, &str) {
    match part.split_once(' ') {
        Some((key, value)) => (key, value.trim()),
        None => (part, ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENTRY: &str = " // ";
    const PAIR: &str = " || ";

    #[test]
    fn test_tokenize_two_entries() {
        let entries = tokenize(
            "ACR_ID ACR1 || ACRType Author // ACR_ID ACR2 || ACRType Editor",
            ENTRY,
            PAIR,
        );
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].get("ACR_ID"), Some("ACR1"));
        assert_eq!(entries[0].get("ACRType"), Some("Author"));
        assert_eq!(entries[1].get("ACRType"), Some("Editor"));
        assert_eq!(entries[1].position, 1);
    }

    #[test]
    fn test_first_space_rule() {
        let entries = tokenize("ACRNameForDisplayInCitation Joseph W. Dauben", ENTRY, PAIR);
        assert_eq!(entries.len(), 1);
        assert_eq!(
            entries[0].get("ACRNameForDisplayInCitation"),
            Some("Joseph W. Dauben")
        );
    }

    #[test]
    fn test_key_without_value() {
        let entries = tokenize("ACRStatus || ACRType Author", ENTRY, PAIR);
        assert_eq!(entries[0].get("ACRStatus"), Some(""));
        assert_eq!(entries[0].get_non_empty("ACRStatus"), None);
        assert_eq!(entries[0].len(), 2);
    }

    #[test]
    fn test_blank_segments_dropped() {
        let entries = tokenize("ACRType Author //    // ACRType Editor // ", ENTRY, PAIR);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].position, 0);
        assert_eq!(entries[1].position, 1);
    }

    #[test]
    fn test_empty_input() {
        assert!(tokenize("", ENTRY, PAIR).is_empty());
        assert!(tokenize("   ", ENTRY, PAIR).is_empty());
    }

    #[test]
    fn test_repeated_key_last_wins() {
        let entries = tokenize("ACRType Author || ACRType Editor || AuthorityID CBA1", ENTRY, PAIR);
        let keys: Vec<&str> = entries[0].iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["ACRType", "AuthorityID"]);
        assert_eq!(entries[0].get("ACRType"), Some("Editor"));
    }

    #[test]
    fn test_custom_separators() {
        let entries = tokenize("a 1;b 2|a 3", "|", ";");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].get("b"), Some("2"));
        assert_eq!(entries[1].get("a"), Some("3"));
    }

    #[test]
    fn test_source_kept_for_logging() {
        let entries = tokenize("  Type DOI || URN 10.1000/182  ", ENTRY, PAIR);
        assert_eq!(entries[0].source, "Type DOI || URN 10.1000/182");
    }
}
