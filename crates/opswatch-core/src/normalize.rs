//! Canonicalization of loosely-typed wire records.
//!
//! Tracker problems and warnings are meant to be `string → string` maps,
//! but the backend does not always serialize them that way. Depending on
//! the server build a record arrives as a JSON object, as a list of
//! `[key, value]` pairs, as a list of `{"key": .., "value": ..}` entries, or
//! not at all. [`to_map`] folds every one of those into a [`RecordMap`].
//!
//! Normalization never fails. Non-string values are rendered as text
//! (`null` becomes the empty string) so a malformed record still displays.

use std::collections::{BTreeMap, HashMap};

use serde::Deserialize;
use serde_json::Value;

/// Canonical form of a wire record. Sorted, so key order never matters.
pub type RecordMap = BTreeMap<String, String>;

/// A single `{key, value}` entry in the list form of a record.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct WireEntry {
    /// Entry key.
    #[serde(alias = "Key")]
    pub key: String,
    /// Entry value.
    #[serde(alias = "Value", default)]
    pub value: Value,
}

/// A record as delivered by the transport.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum WireRecord {
    /// Missing or `null`.
    #[default]
    Absent,
    /// A true JSON object.
    Object(serde_json::Map<String, Value>),
    /// An ordered list of `[key, value]` pairs.
    Pairs(Vec<(String, Value)>),
    /// An ordered list of `{key, value}` entries.
    Entries(Vec<WireEntry>),
}

impl WireRecord {
    /// Build a record from `(key, value)` string pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::Pairs(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), Value::String(v.into())))
                .collect(),
        )
    }
}

impl From<RecordMap> for WireRecord {
    fn from(map: RecordMap) -> Self {
        Self::Object(
            map.into_iter()
                .map(|(k, v)| (k, Value::String(v)))
                .collect(),
        )
    }
}

impl From<&RecordMap> for WireRecord {
    fn from(map: &RecordMap) -> Self {
        Self::from(map.clone())
    }
}

impl From<HashMap<String, String>> for WireRecord {
    fn from(map: HashMap<String, String>) -> Self {
        Self::from(map.into_iter().collect::<RecordMap>())
    }
}

/// Convert a wire record into its canonical map.
///
/// For list forms a repeated key keeps its last value.
pub fn to_map(record: &WireRecord) -> RecordMap {
    match record {
        WireRecord::Absent => RecordMap::new(),
        WireRecord::Object(object) => object
            .iter()
            .map(|(k, v)| (k.clone(), value_text(v)))
            .collect(),
        WireRecord::Pairs(pairs) => pairs
            .iter()
            .map(|(k, v)| (k.clone(), value_text(v)))
            .collect(),
        WireRecord::Entries(entries) => entries
            .iter()
            .map(|e| (e.key.clone(), value_text(&e.value)))
            .collect(),
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
