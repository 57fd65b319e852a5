//! The dynamic value carried by records and collections.
//!
//! A [`Value`] is either a primitive (null, bool, int, float, text), a nested
//! [`DynamicRecord`], or a nested [`RecordCollection`]. Plain data coming from
//! JSON or BSON is deep-normalized when it is converted into a `Value`: every
//! mapping becomes a `DynamicRecord` and every sequence becomes a
//! `RecordCollection`. Reads never re-wrap anything.

use std::{cmp::Ordering, fmt};

use bson::{Bson, Document};
use serde::{Deserialize, Deserializer, Serialize, Serializer, ser::SerializeSeq};
use serde_json::{Map, Number, Value as JsonValue};

use crate::{collection::RecordCollection, record::DynamicRecord};

/// Runtime value stored in a [`DynamicRecord`] or a [`RecordCollection`].
///
/// `Int` and `Float` are distinct runtime types: operators that demand the same
/// type on both sides reject an `int` compared against a `float`.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    /// Absent or null value.
    #[default]
    Null,
    /// Boolean value.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Floating point number.
    Float(f64),
    /// Text.
    Str(String),
    /// Nested record.
    Record(DynamicRecord),
    /// Nested sequence.
    Collection(RecordCollection),
}

impl Value {
    /// Returns the runtime type name used in error messages and type checks.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::Record(_) => "record",
            Value::Collection(_) => "collection",
        }
    }

    /// Returns `true` if both values have the same runtime type.
    pub fn same_type(&self, other: &Value) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }

    /// Returns `true` for `Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns `true` for `Int` and `Float`.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Float(_))
    }

    /// Returns `true` for numbers and text, the element kinds `distinct()` accepts.
    pub fn is_primitive(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Float(_) | Value::Str(_))
    }

    /// Returns the text of a `Str`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer of an `Int`.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the value as a float, widening integers.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::Float(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the boolean of a `Bool`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the nested record of a `Record`.
    pub fn as_record(&self) -> Option<&DynamicRecord> {
        match self {
            Value::Record(record) => Some(record),
            _ => None,
        }
    }

    /// Returns the nested collection of a `Collection`.
    pub fn as_collection(&self) -> Option<&RecordCollection> {
        match self {
            Value::Collection(collection) => Some(collection),
            _ => None,
        }
    }

    /// Compares two values that have a natural order.
    ///
    /// Integers and floats compare numerically with each other; text, booleans
    /// and collections (lexicographically) compare within their own type.
    /// Returns `None` for null, records, mixed types, and NaN.
    pub fn try_cmp(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::Int(a), Value::Float(b)) => (*a as f64).partial_cmp(b),
            (Value::Float(a), Value::Int(b)) => a.partial_cmp(&(*b as f64)),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
            (Value::Collection(a), Value::Collection(b)) => {
                for (left, right) in a.iter().zip(b.iter()) {
                    match left.try_cmp(right)? {
                        Ordering::Equal => continue,
                        ordering => return Some(ordering),
                    }
                }
                Some(a.len().cmp(&b.len()))
            }
            _ => None,
        }
    }

    /// Equality where an integer equals a float of the same numeric value.
    ///
    /// Used by bare-keyword equality and by `in`/`nin` membership.
    pub fn loosely_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => (*a as f64) == *b,
            _ => self == other,
        }
    }

    /// Renders the value the way it appears inside a criteria listing:
    /// text is quoted, everything else uses [`fmt::Display`].
    pub fn repr(&self) -> String {
        match self {
            Value::Str(s) => format!("{s:?}"),
            other => other.to_string(),
        }
    }

    /// Recursively unwraps this value into plain JSON.
    ///
    /// Non-finite floats have no JSON representation and become `null`.
    pub fn to_json(&self) -> JsonValue {
        match self {
            Value::Null => JsonValue::Null,
            Value::Bool(b) => JsonValue::Bool(*b),
            Value::Int(n) => JsonValue::Number(Number::from(*n)),
            Value::Float(n) => Number::from_f64(*n).map_or(JsonValue::Null, JsonValue::Number),
            Value::Str(s) => JsonValue::String(s.clone()),
            Value::Record(record) => JsonValue::Object(
                record
                    .iter()
                    .map(|(key, value)| (key.clone(), value.to_json()))
                    .collect::<Map<_, _>>(),
            ),
            Value::Collection(collection) => {
                JsonValue::Array(collection.iter().map(Value::to_json).collect())
            }
        }
    }

    /// Recursively unwraps this value into plain BSON.
    pub fn to_bson(&self) -> Bson {
        match self {
            Value::Null => Bson::Null,
            Value::Bool(b) => Bson::Boolean(*b),
            Value::Int(n) => Bson::Int64(*n),
            Value::Float(n) => Bson::Double(*n),
            Value::Str(s) => Bson::String(s.clone()),
            Value::Record(record) => Bson::Document(record.to_bson()),
            Value::Collection(collection) => {
                Bson::Array(collection.iter().map(Value::to_bson).collect())
            }
        }
    }
}

/// Deep-normalizes plain JSON into a [`Value`].
///
/// Objects become [`DynamicRecord`]s (key order preserved), arrays become
/// [`RecordCollection`]s. Integers that do not fit in `i64` are kept as floats.
pub fn normalize(raw: JsonValue) -> Value {
    match raw {
        JsonValue::Null => Value::Null,
        JsonValue::Bool(b) => Value::Bool(b),
        JsonValue::Number(n) => match n.as_i64() {
            Some(i) => Value::Int(i),
            None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
        },
        JsonValue::String(s) => Value::Str(s),
        JsonValue::Array(items) => {
            Value::Collection(items.into_iter().map(normalize).collect())
        }
        JsonValue::Object(map) => Value::Record(
            map.into_iter()
                .map(|(key, value)| (key, normalize(value)))
                .collect(),
        ),
    }
}

/// Deep-normalizes plain BSON into a [`Value`].
///
/// Date-times become milliseconds since the Unix epoch; BSON types without a
/// counterpart (object ids, binaries, ...) become their textual rendering.
pub fn normalize_bson(raw: Bson) -> Value {
    match raw {
        Bson::Null | Bson::Undefined => Value::Null,
        Bson::Boolean(b) => Value::Bool(b),
        Bson::Int32(n) => Value::Int(i64::from(n)),
        Bson::Int64(n) => Value::Int(n),
        Bson::Double(n) => Value::Float(n),
        Bson::String(s) => Value::Str(s),
        Bson::DateTime(dt) => Value::Int(dt.timestamp_millis()),
        Bson::Array(items) => Value::Collection(items.into_iter().map(normalize_bson).collect()),
        Bson::Document(doc) => Value::Record(DynamicRecord::from_bson(doc)),
        other => Value::Str(other.to_string()),
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => f.write_str(s),
            other => write!(f, "{}", other.to_json()),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(n) => serializer.serialize_i64(*n),
            Value::Float(n) => serializer.serialize_f64(*n),
            Value::Str(s) => serializer.serialize_str(s),
            Value::Record(record) => record.serialize(serializer),
            Value::Collection(collection) => {
                let mut seq = serializer.serialize_seq(Some(collection.len()))?;
                for item in collection.iter() {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        JsonValue::deserialize(deserializer).map(normalize)
    }
}

impl From<JsonValue> for Value {
    fn from(raw: JsonValue) -> Self {
        normalize(raw)
    }
}

impl From<Bson> for Value {
    fn from(raw: Bson) -> Self {
        normalize_bson(raw)
    }
}

impl From<Document> for Value {
    fn from(doc: Document) -> Self {
        Value::Record(DynamicRecord::from_bson(doc))
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Null
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

macro_rules! int_conversions {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(n: $ty) -> Self {
                    Value::Int(i64::from(n))
                }
            }
        )*
    };
}

int_conversions!(i8, i16, i32, i64, u8, u16, u32);

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        i64::try_from(n).map_or(Value::Float(n as f64), Value::Int)
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        i64::try_from(n).map_or(Value::Float(n as f64), Value::Int)
    }
}

impl From<isize> for Value {
    fn from(n: isize) -> Self {
        Value::Int(n as i64)
    }
}

impl From<f32> for Value {
    fn from(n: f32) -> Self {
        Value::Float(f64::from(n))
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Value::Str(s.clone())
    }
}

impl From<DynamicRecord> for Value {
    fn from(record: DynamicRecord) -> Self {
        Value::Record(record)
    }
}

impl From<RecordCollection> for Value {
    fn from(collection: RecordCollection) -> Self {
        Value::Collection(collection)
    }
}

impl<V: Into<Value>> From<Vec<V>> for Value {
    fn from(items: Vec<V>) -> Self {
        Value::Collection(items.into_iter().map(Into::into).collect())
    }
}

impl<V: Into<Value>> From<Option<V>> for Value {
    fn from(value: Option<V>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}
