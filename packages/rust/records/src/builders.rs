//! Entity builders: shape a [`RecordSet`] into the collection a template reads.
//!
//! - manuscripts, locations: a sequence in record order
//! - stanzas: a sequence stable-sorted by `line_code`, byte-wise
//! - translations: a mapping keyed by `line_code`, later records winning

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, instrument, warn};

use lasfera_shared::{BuildConfig, EntityKind, LINE_CODE_FIELD, RecordOrdering, Result, SferaError};

use crate::line_code::check_line_codes;
use crate::loader::{RecordSet, SourceRecord};

/// The emitted form of one entity type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EntityCollection {
    /// Serialized as a JSON array.
    Sequence(Vec<Value>),
    /// Serialized as a JSON object, insertion-ordered.
    Keyed(Map<String, Value>),
}

impl EntityCollection {
    /// Number of entries (array items or object keys).
    pub fn len(&self) -> usize {
        match self {
            Self::Sequence(items) => items.len(),
            Self::Keyed(map) => map.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Pretty-printed JSON with two-space indentation.
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| SferaError::validation(format!("JSON serialization failed: {e}")))
    }
}

/// Shape the records of one entity kind.
#[instrument(skip_all, fields(entity = %kind, records = records.len()))]
pub fn build_collection(
    kind: EntityKind,
    records: RecordSet,
    config: &BuildConfig,
) -> Result<EntityCollection> {
    let collection = match kind {
        EntityKind::Manuscripts | EntityKind::Locations => {
            build_sequence(records, config.ordering)
        }
        EntityKind::Stanzas => build_stanzas(records, config.strict_line_codes)?,
        EntityKind::Translations => build_translations(records, config.strict_line_codes)?,
    };

    debug!(count = collection.len(), "collection shaped");
    Ok(collection)
}

/// Records as a sequence, in listing order or sorted by key.
pub fn build_sequence(mut records: RecordSet, ordering: RecordOrdering) -> EntityCollection {
    if ordering == RecordOrdering::Key {
        records.sort_by_key();
    }
    EntityCollection::Sequence(records.into_iter().map(|r| r.value).collect())
}

/// Records as a sequence ordered by `line_code`.
///
/// Precondition: codes are uniformly zero-padded dotted decimals; checked by
/// [`check_line_codes`]. Ties keep record order.
pub fn build_stanzas(records: RecordSet, strict: bool) -> Result<EntityCollection> {
    let mut keyed = with_line_codes(EntityKind::Stanzas, records)?;
    check_line_codes(
        EntityKind::Stanzas,
        keyed.iter().map(|(code, record)| (record.key.as_str(), code.as_str())),
        strict,
    )?;

    keyed.sort_by(|(a, _), (b, _)| a.as_bytes().cmp(b.as_bytes()));

    Ok(EntityCollection::Sequence(
        keyed.into_iter().map(|(_, record)| record.value).collect(),
    ))
}

/// Records re-keyed by their own `line_code`.
///
/// A duplicate code replaces the earlier value but keeps the earlier position.
pub fn build_translations(records: RecordSet, strict: bool) -> Result<EntityCollection> {
    let keyed = with_line_codes(EntityKind::Translations, records)?;
    check_line_codes(
        EntityKind::Translations,
        keyed.iter().map(|(code, record)| (record.key.as_str(), code.as_str())),
        strict,
    )?;

    let mut map = Map::new();
    for (code, record) in keyed {
        if map.insert(code.clone(), record.value).is_some() {
            warn!(line_code = %code, record = %record.key, "duplicate line_code, keeping later record");
        }
    }

    Ok(EntityCollection::Keyed(map))
}

/// Pair every record with its `line_code`, failing on the first record
/// that lacks one.
fn with_line_codes(kind: EntityKind, records: RecordSet) -> Result<Vec<(String, SourceRecord)>> {
    records
        .into_iter()
        .map(|record| {
            let code = line_code_of(kind, &record)?.to_string();
            Ok((code, record))
        })
        .collect()
}

fn line_code_of(kind: EntityKind, record: &SourceRecord) -> Result<&str> {
    match record.value.get(LINE_CODE_FIELD) {
        None | Some(Value::Null) => Err(SferaError::missing_field(
            kind.as_str(),
            &record.key,
            LINE_CODE_FIELD,
        )),
        Some(Value::String(code)) => Ok(code.as_str()),
        Some(other) => Err(SferaError::invalid_field(
            kind.as_str(),
            &record.key,
            LINE_CODE_FIELD,
            format!("expected a string, found {}", value_type(other)),
        )),
    }
}

fn value_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn set(records: &[(&str, Value)]) -> RecordSet {
        records
            .iter()
            .map(|(key, value)| SourceRecord::new(*key, value.clone()))
            .collect()
    }

    fn stanza(code: &str) -> Value {
        json!({ "line_code": code, "language": "it", "text": format!("stanza {code}") })
    }

    fn codes(collection: &EntityCollection) -> Vec<String> {
        match collection {
            EntityCollection::Sequence(items) => items
                .iter()
                .map(|v| v["line_code"].as_str().unwrap().to_string())
                .collect(),
            EntityCollection::Keyed(map) => map.keys().cloned().collect(),
        }
    }

    #[test]
    fn sequence_keeps_listing_order() {
        let records = set(&[
            ("vat2", json!({"siglum": "Vat2"})),
            ("bnf1", json!({"siglum": "BnF1"})),
        ]);
        let out = build_sequence(records, RecordOrdering::Listing);
        assert_eq!(
            out,
            EntityCollection::Sequence(vec![json!({"siglum": "Vat2"}), json!({"siglum": "BnF1"})])
        );
    }

    #[test]
    fn sequence_sorted_by_key_when_requested() {
        let records = set(&[
            ("vat2", json!({"siglum": "Vat2"})),
            ("bnf1", json!({"siglum": "BnF1"})),
        ]);
        let out = build_sequence(records, RecordOrdering::Key);
        assert_eq!(
            out,
            EntityCollection::Sequence(vec![json!({"siglum": "BnF1"}), json!({"siglum": "Vat2"})])
        );
    }

    #[test]
    fn stanzas_sorted_bytewise() {
        let records = set(&[
            ("c", stanza("01.10.01")),
            ("a", stanza("02.01.01")),
            ("b", stanza("01.02.01")),
        ]);
        let out = build_stanzas(records, true).expect("build");
        assert_eq!(codes(&out), ["01.02.01", "01.10.01", "02.01.01"]);
    }

    #[test]
    fn stanza_order_is_monotonic() {
        let input = ["03.04.01", "01.01.08", "02.07.03", "01.01.02", "04.01.01"];
        let records: RecordSet = input
            .iter()
            .map(|code| SourceRecord::new(*code, stanza(code)))
            .collect();
        let out = codes(&build_stanzas(records, true).expect("build"));
        assert_eq!(out.len(), input.len());
        assert!(out.windows(2).all(|w| w[0].as_bytes() <= w[1].as_bytes()));
    }

    #[test]
    fn stanza_without_line_code_is_fatal() {
        let records = set(&[("ok", stanza("01.01.01")), ("orphan", json!({"text": "?"}))]);
        let err = build_stanzas(records, true).unwrap_err();
        match err {
            SferaError::MissingField { record, field, .. } => {
                assert_eq!(record, "orphan");
                assert_eq!(field, "line_code");
            }
            other => panic!("expected missing field, got {other:?}"),
        }
    }

    #[test]
    fn null_line_code_and_null_record_are_missing() {
        let err = build_stanzas(set(&[("a", json!({"line_code": null}))]), true).unwrap_err();
        assert!(matches!(err, SferaError::MissingField { .. }));

        let err = build_translations(set(&[("blank", Value::Null)]), true).unwrap_err();
        assert!(matches!(err, SferaError::MissingField { .. }));
    }

    #[test]
    fn numeric_line_code_is_invalid() {
        let err = build_stanzas(set(&[("a", json!({"line_code": 1.1}))]), true).unwrap_err();
        assert!(matches!(err, SferaError::InvalidField { .. }));
        assert!(err.to_string().contains("a number"));
    }

    #[test]
    fn unpadded_line_codes_rejected_in_strict_mode() {
        let records = set(&[("a", stanza("1.2.1")), ("b", stanza("01.10.01"))]);
        let err = build_stanzas(records, true).unwrap_err();
        assert!(matches!(err, SferaError::Validation { .. }));
    }

    #[test]
    fn unpadded_line_codes_sorted_anyway_when_lenient() {
        let records = set(&[("a", stanza("1.2.1")), ("b", stanza("01.10.01"))]);
        let out = build_stanzas(records, false).expect("build");
        assert_eq!(codes(&out), ["01.10.01", "1.2.1"]);
    }

    #[test]
    fn translations_keyed_by_line_code() {
        let records = set(&[
            ("file-a", json!({"line_code": "01.01.02", "translated_text": "B"})),
            ("file-b", json!({"line_code": "01.01.01", "translated_text": "A"})),
        ]);
        let out = build_translations(records, true).expect("build");
        assert_eq!(codes(&out), ["01.01.02", "01.01.01"]);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn duplicate_translation_keeps_last_in_first_position() {
        let records = set(&[
            ("x", json!({"line_code": "01.01.01", "translated_text": "first"})),
            ("y", json!({"line_code": "01.01.02", "translated_text": "other"})),
            ("z", json!({"line_code": "01.01.01", "translated_text": "second"})),
        ]);
        let out = build_translations(records, true).expect("build");
        let EntityCollection::Keyed(map) = out else {
            panic!("expected keyed collection");
        };
        assert_eq!(map.len(), 2);
        assert_eq!(map.keys().next().map(String::as_str), Some("01.01.01"));
        assert_eq!(map["01.01.01"]["translated_text"], json!("second"));
    }

    #[test]
    fn build_collection_dispatches_by_kind() {
        let config = BuildConfig {
            data_dir: "data".into(),
            output_dir: "out".into(),
            ordering: RecordOrdering::Listing,
            strict_line_codes: true,
        };
        let records = set(&[("t", json!({"line_code": "01.01.01"}))]);
        let out = build_collection(EntityKind::Translations, records, &config).expect("build");
        assert!(matches!(out, EntityCollection::Keyed(_)));

        let records = set(&[("l", json!({"id": "tunisi"}))]);
        let out = build_collection(EntityKind::Locations, records, &config).expect("build");
        assert!(matches!(out, EntityCollection::Sequence(_)));
    }

    #[test]
    fn pretty_json_uses_two_space_indent() {
        let out = EntityCollection::Sequence(vec![json!({"id": "roma"})]);
        assert_eq!(out.to_json_pretty().unwrap(), "[\n  {\n    \"id\": \"roma\"\n  }\n]");
    }
}
