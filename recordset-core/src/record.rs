//! Dynamic, attribute-addressed records.
//!
//! A [`DynamicRecord`] is an insertion-ordered mapping from string keys to
//! [`Value`]s. Nested mappings are always stored as `DynamicRecord` and nested
//! sequences as [`RecordCollection`](crate::collection::RecordCollection): the
//! normalization happens when plain data is converted into a `Value`, which
//! covers construction and every [`DynamicRecord::set`]. Reads hand out
//! references to what is stored and never allocate.

use std::collections::HashSet;

use bson::Document;
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de::Error as _, ser::SerializeMap};
use serde_json::Value as JsonValue;

use crate::{
    error::{RecordError, RecordResult},
    value::{Value, normalize},
};

/// A key/value entity with attribute-style access.
///
/// Equality ignores key order. Cloning produces a fully independent deep copy.
///
/// # Example
///
/// ```ignore
/// use recordset::prelude::*;
/// use serde_json::json;
///
/// let mut person = DynamicRecord::from_json(json!({ "name": "Alice", "address": { "city": "Paris" } }))?;
/// assert_eq!(person.get("name")?, &Value::from("Alice"));
///
/// person.set("tags", json!(["admin", "ops"]));
/// assert!(person.get("tags")?.as_collection().is_some());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DynamicRecord {
    fields: IndexMap<String, Value>,
}

impl DynamicRecord {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self { fields: IndexMap::new() }
    }

    /// Builds a record from a plain JSON object, deep-normalizing nested values.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::TypeMismatch`] if `raw` is not a JSON object.
    pub fn from_json(raw: JsonValue) -> RecordResult<Self> {
        match normalize(raw) {
            Value::Record(record) => Ok(record),
            other => Err(RecordError::type_mismatch("from_json", "record", other.type_name())),
        }
    }

    /// Builds a record from a BSON document, deep-normalizing nested values.
    pub fn from_bson(doc: Document) -> Self {
        doc.into_iter()
            .map(|(key, value)| (key, Value::from(value)))
            .collect()
    }

    /// Builds a record from any serializable struct or map.
    ///
    /// # Errors
    ///
    /// Fails if `value` cannot be serialized, or does not serialize to a map.
    pub fn from_serializable<S: Serialize>(value: &S) -> RecordResult<Self> {
        Self::from_json(serde_json::to_value(value)?)
    }

    /// Returns the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::UnknownAttribute`] if the key is absent.
    pub fn get(&self, key: &str) -> RecordResult<&Value> {
        self.fields
            .get(key)
            .ok_or_else(|| RecordError::UnknownAttribute(key.to_string()))
    }

    /// Returns the value stored under `key`, or `None` if the key is absent.
    pub fn get_opt(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Stores `value` under `key`, returning the previous value if any.
    ///
    /// Plain JSON/BSON values are normalized on the way in, so a mapping is
    /// stored as a record and a sequence as a collection.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(key.into(), value.into())
    }

    /// Removes `key`, returning its value. The order of the remaining keys is kept.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::UnknownAttribute`] if the key is absent.
    pub fn delete(&mut self, key: &str) -> RecordResult<Value> {
        self.fields
            .shift_remove(key)
            .ok_or_else(|| RecordError::UnknownAttribute(key.to_string()))
    }

    /// Returns `true` if `key` is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Returns the number of keys.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the record has no keys.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates over the keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.fields.keys()
    }

    /// Iterates over the values in insertion order.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.fields.values()
    }

    /// Iterates over key/value pairs in insertion order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Value> {
        self.fields.iter()
    }

    /// Projects the record onto `keys`.
    ///
    /// The projection keeps the record's own key order. An empty key list
    /// yields an empty record.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::UnknownAttribute`] naming the first requested key
    /// that does not exist.
    pub fn select<I, S>(&self, keys: I) -> RecordResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut wanted = HashSet::new();
        for key in keys {
            let key = key.as_ref();
            if !self.fields.contains_key(key) {
                return Err(RecordError::UnknownAttribute(key.to_string()));
            }
            wanted.insert(key.to_string());
        }

        Ok(self
            .fields
            .iter()
            .filter(|(key, _)| wanted.contains(key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect())
    }

    /// Dynamic form of [`DynamicRecord::select`] for keys held in a [`Value`].
    ///
    /// # Errors
    ///
    /// - [`RecordError::TypeMismatch`] if `keys` is not a collection.
    /// - [`RecordError::TypeMismatch`] if an element of `keys` is not text.
    /// - [`RecordError::UnknownAttribute`] if a key does not exist.
    pub fn select_value(&self, keys: &Value) -> RecordResult<Self> {
        let Value::Collection(items) = keys else {
            return Err(RecordError::type_mismatch("select", "collection", keys.type_name()));
        };

        let names = items
            .iter()
            .map(|item| {
                item.as_str()
                    .ok_or_else(|| RecordError::type_mismatch("select", "str", item.type_name()))
            })
            .collect::<RecordResult<Vec<_>>>()?;

        self.select(names)
    }

    /// Recursively unwraps the record into a plain JSON object.
    pub fn to_json(&self) -> JsonValue {
        JsonValue::Object(
            self.fields
                .iter()
                .map(|(key, value)| (key.clone(), value.to_json()))
                .collect(),
        )
    }

    /// Recursively unwraps the record into a BSON document.
    pub fn to_bson(&self) -> Document {
        let mut doc = Document::new();
        for (key, value) in &self.fields {
            doc.insert(key.clone(), value.to_bson());
        }
        doc
    }

    /// Returns a pretty-printed rendering of the record.
    pub fn inspect(&self) -> RecordResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl<K, V> FromIterator<(K, V)> for DynamicRecord
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

impl IntoIterator for DynamicRecord {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

impl<'a> IntoIterator for &'a DynamicRecord {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

impl TryFrom<JsonValue> for DynamicRecord {
    type Error = RecordError;

    fn try_from(raw: JsonValue) -> RecordResult<Self> {
        Self::from_json(raw)
    }
}

impl From<Document> for DynamicRecord {
    fn from(doc: Document) -> Self {
        Self::from_bson(doc)
    }
}

impl Serialize for DynamicRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for DynamicRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = JsonValue::deserialize(deserializer)?;
        Self::from_json(raw).map_err(D::Error::custom)
    }
}
