//! Ordered collections with a chained query surface.
//!
//! A [`RecordCollection`] is an ordered sequence of elements, usually
//! [`Value`]s holding [`DynamicRecord`](crate::record::DynamicRecord)s, but any
//! element type implementing [`AttributeReadable`] can be queried. Every
//! transformation returns a new collection; the receiver is never mutated.
//!
//! # Query Surface
//!
//! - [`RecordCollection::filter`] - keep elements matching queries and keyword criteria
//! - [`RecordCollection::find_by`] - the single element matching keyword criteria
//! - [`RecordCollection::order_by`] - stable sort by natural order, attribute or function
//! - [`RecordCollection::group_by`] - partition by a key function
//! - [`RecordCollection::limit`] / [`RecordCollection::offset`] - clamped slicing
//! - [`RecordCollection::distinct`] - deduplicate by value or by fields
//! - [`RecordCollection::all`] - shallow copy
//!
//! # Example
//!
//! ```ignore
//! use recordset::prelude::*;
//! use serde_json::json;
//!
//! let people = RecordCollection::try_from_json(json!([
//!     { "name": "Alice", "age": 25 },
//!     { "name": "Dave", "age": 30 },
//! ]))?;
//!
//! let found = people.filter_by(&criteria! { "age__gt" => 25, "name__contains" => "v" })?;
//! assert_eq!(found.len(), 1);
//!
//! let by_age = people.order_by("age", true)?;
//! ```

use std::{
    cmp::Ordering,
    collections::{HashMap, HashSet},
    fmt,
    hash::Hash,
    ops::Deref,
};

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::{
    attribute::{AttributeReadable, Invocable},
    config::MatchConfig,
    error::{RecordError, RecordResult},
    evaluator::filter_elements,
    mapper::{SequenceMapper, Selector},
    query::{Criteria, Node, Query},
    value::{Value, normalize},
};

/// An ordered sequence of elements supporting chained queries.
///
/// The collection dereferences to a slice, so `len`, `iter`, `first`, `last`
/// and indexing come from `[T]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordCollection<T = Value> {
    items: Vec<T>,
}

impl<T> Default for RecordCollection<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T> RecordCollection<T> {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an element.
    pub fn push(&mut self, item: T) {
        self.items.push(item);
    }

    /// Returns the elements as a slice.
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// Consumes the collection, returning its elements.
    pub fn into_vec(self) -> Vec<T> {
        self.items
    }
}

impl RecordCollection<Value> {
    /// Builds a collection from a plain JSON array, deep-normalizing every element.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::TypeMismatch`] if `raw` is not an array.
    pub fn try_from_json(raw: JsonValue) -> RecordResult<Self> {
        match normalize(raw) {
            Value::Collection(collection) => Ok(collection),
            other => Err(RecordError::type_mismatch("from_json", "collection", other.type_name())),
        }
    }

    /// Recursively unwraps the collection into a plain JSON array.
    pub fn to_json(&self) -> JsonValue {
        JsonValue::Array(self.items.iter().map(Value::to_json).collect())
    }
}

impl<T: Clone> RecordCollection<T> {
    /// Returns a shallow copy of the collection.
    pub fn all(&self) -> Self {
        self.clone()
    }

    /// Returns the first `count` elements. A count past the end is clamped.
    pub fn limit(&self, count: usize) -> Self {
        self.items.iter().take(count).cloned().collect()
    }

    /// Returns the elements after the first `count`. A count past the end
    /// yields an empty collection.
    pub fn offset(&self, count: usize) -> Self {
        self.items.iter().skip(count).cloned().collect()
    }

    /// Returns the first `count` elements.
    pub fn first_n(&self, count: usize) -> Self {
        self.limit(count)
    }

    /// Returns the last `count` elements, in their original order.
    pub fn last_n(&self, count: usize) -> Self {
        self.offset(self.items.len().saturating_sub(count))
    }

    /// Partitions the elements by `key_fn`.
    ///
    /// Elements keep their original relative order inside each group. The
    /// order of the groups themselves is unspecified.
    pub fn group_by<K, F>(&self, key_fn: F) -> HashMap<K, RecordCollection<T>>
    where
        K: Hash + Eq,
        F: Fn(&T) -> K,
    {
        let mut groups: HashMap<K, RecordCollection<T>> = HashMap::new();
        for item in &self.items {
            groups.entry(key_fn(item)).or_default().push(item.clone());
        }

        tracing::debug!(elements = self.items.len(), groups = groups.len(), "grouped collection");
        groups
    }
}

impl<T: AttributeReadable + Clone> RecordCollection<T> {
    /// Keeps the elements for which every query and every keyword criterion
    /// holds, in original order.
    ///
    /// The children of all positional queries and one predicate per keyword
    /// form a single conjunction.
    ///
    /// # Errors
    ///
    /// - [`RecordError::InvalidOperator`] if a keyword has an unknown operator suffix
    /// - the first evaluation error raised by any element
    ///
    /// # Example
    ///
    /// ```ignore
    /// let adults = Query::from(Predicate::gte("age", 18));
    /// let result = people.filter(&[adults], &criteria! { "country" => "France" })?;
    /// ```
    pub fn filter(&self, queries: &[Query], criteria: &Criteria) -> RecordResult<Self> {
        self.filter_with(queries, criteria, &MatchConfig::default())
    }

    /// Like [`RecordCollection::filter`] with keyword criteria only.
    pub fn filter_by(&self, criteria: &Criteria) -> RecordResult<Self> {
        self.filter(&[], criteria)
    }

    /// Like [`RecordCollection::filter`], resolving bare keywords with `config`.
    pub fn filter_with(&self, queries: &[Query], criteria: &Criteria, config: &MatchConfig) -> RecordResult<Self> {
        let mut nodes: Vec<Node> = queries
            .iter()
            .flat_map(|query| query.nodes().iter().cloned())
            .collect();
        nodes.extend(Query::from_criteria_with(criteria, config)?.into_nodes());

        tracing::debug!(filters = nodes.len(), elements = self.items.len(), "filtering collection");

        let matched = filter_elements(&self.items, &nodes)?;
        tracing::debug!(matched = matched.len(), "filtered collection");

        Ok(Self { items: matched })
    }

    /// Returns the single element matching `criteria`.
    ///
    /// # Errors
    ///
    /// - [`RecordError::RecordNotFound`] if nothing matches
    /// - [`RecordError::MultipleRecordsFound`] if more than one element matches
    /// - any error [`RecordCollection::filter_by`] returns
    pub fn find_by(&self, criteria: &Criteria) -> RecordResult<T> {
        let mut matched = self.filter_by(criteria)?.into_vec();
        match matched.len() {
            0 => Err(RecordError::RecordNotFound(criteria.to_string())),
            1 => Ok(matched.remove(0)),
            _ => Err(RecordError::MultipleRecordsFound(criteria.to_string())),
        }
    }

    /// Sorts the elements by `key`. The sort is stable; with `reverse` the
    /// order is descending and tied elements keep their original order.
    ///
    /// # Errors
    ///
    /// - [`RecordError::InvalidOrdering`] for a natural key on non-numeric elements
    /// - [`RecordError::UnknownAttribute`] for an attribute key missing on an element
    /// - [`RecordError::TypeMismatch`] if two sort keys cannot be compared
    ///
    /// # Example
    ///
    /// ```ignore
    /// let by_age = people.order_by("age", false)?;
    /// let by_name_len = people.order_by(OrderKey::function(|p: &Value| {
    ///     p.attribute("name").map_or(0, |n| n.to_string().len())
    /// }), true)?;
    /// let numbers = scores.order_by(OrderKey::Natural, false)?;
    /// ```
    pub fn order_by(&self, key: impl Into<OrderKey<T>>, reverse: bool) -> RecordResult<Self> {
        let key = key.into();

        let mut keyed = Vec::with_capacity(self.items.len());
        for item in &self.items {
            let sort_key = match &key {
                OrderKey::Natural => match item.as_value() {
                    Some(value) if value.is_numeric() => value.clone(),
                    Some(value) => return Err(RecordError::InvalidOrdering(value.type_name())),
                    None => return Err(RecordError::InvalidOrdering(item.kind())),
                },
                OrderKey::Attribute(name) => item.get_attribute(name)?.into_owned(),
                OrderKey::Function(key_fn) => key_fn(item),
            };
            keyed.push((sort_key, item));
        }

        let mut failure = None;
        keyed.sort_by(|(left, _), (right, _)| {
            let ordering = match left.try_cmp(right) {
                Some(ordering) => ordering,
                // NaN sorts as equal to its neighbours.
                None if left.is_numeric() && right.is_numeric() => Ordering::Equal,
                None => {
                    failure.get_or_insert_with(|| {
                        RecordError::type_mismatch("order_by", left.type_name(), right.type_name())
                    });
                    Ordering::Equal
                }
            };
            if reverse { ordering.reverse() } else { ordering }
        });

        if let Some(err) = failure {
            return Err(err);
        }

        tracing::debug!(key = ?key, reverse, elements = keyed.len(), "ordered collection");
        Ok(keyed.into_iter().map(|(_, item)| item.clone()).collect())
    }

    /// Removes duplicates, keeping first occurrences.
    ///
    /// Without fields the elements themselves are compared and must be
    /// integers, floats or text. With fields, the tuple of those attribute
    /// values is compared.
    ///
    /// # Errors
    ///
    /// - [`RecordError::MissingField`] if no fields are given and an element is not a primitive
    /// - [`RecordError::UnknownField`] if a field is missing on the first element
    /// - [`RecordError::UnknownAttribute`] if a field is missing on a later element
    pub fn distinct(&self, fields: &[&str]) -> RecordResult<Self> {
        let mut keys = Vec::with_capacity(self.items.len());

        if fields.is_empty() {
            for item in &self.items {
                match item.as_value() {
                    Some(value @ (Value::Int(_) | Value::Float(_) | Value::Str(_))) => {
                        keys.push(vec![DistinctKey::from(value)]);
                    }
                    Some(value) => return Err(RecordError::MissingField(value.type_name())),
                    None => return Err(RecordError::MissingField(item.kind())),
                }
            }
        } else {
            let Some(first) = self.items.first() else {
                return Ok(Self::new());
            };
            if let Some(field) = fields.iter().find(|field| first.attribute(field).is_none()) {
                return Err(RecordError::UnknownField { field: field.to_string(), kind: first.kind() });
            }

            for item in &self.items {
                let key = fields
                    .iter()
                    .map(|field| item.get_attribute(field).map(|value| DistinctKey::from(value.as_ref())))
                    .collect::<RecordResult<Vec<_>>>()?;
                keys.push(key);
            }
        }

        let mut seen = HashSet::with_capacity(keys.len());
        let unique: Self = self
            .items
            .iter()
            .zip(keys)
            .filter(|(_, key)| seen.insert(key.clone()))
            .map(|(item, _)| item.clone())
            .collect();

        tracing::debug!(?fields, before = self.items.len(), after = unique.len(), "deduplicated collection");
        Ok(unique)
    }
}

impl<T: Invocable> RecordCollection<T> {
    /// Applies `selector` to every element.
    ///
    /// Shorthand for a [`SequenceMapper`] over the whole collection.
    ///
    /// ```ignore
    /// let names = people.map("name")?;
    /// let shouted = names.map(":upper")?;
    /// ```
    pub fn map<S>(&self, selector: S) -> RecordResult<RecordCollection>
    where
        S: TryInto<Selector<T>>,
        RecordError: From<S::Error>,
    {
        SequenceMapper::new(&self.items, selector.try_into()?).apply()
    }
}

impl<T: Serialize> RecordCollection<T> {
    /// Renders the collection as pretty-printed JSON.
    pub fn inspect(&self) -> RecordResult<String> {
        Ok(serde_json::to_string_pretty(&self.items)?)
    }
}

impl<T> Deref for RecordCollection<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.items
    }
}

impl<T> From<Vec<T>> for RecordCollection<T> {
    fn from(items: Vec<T>) -> Self {
        Self { items }
    }
}

impl<T> FromIterator<T> for RecordCollection<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self { items: iter.into_iter().collect() }
    }
}

impl<T> Extend<T> for RecordCollection<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.items.extend(iter);
    }
}

impl<T> IntoIterator for RecordCollection<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a RecordCollection<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// The key a collection is ordered by.
pub enum OrderKey<T> {
    /// The elements themselves, which must all be numeric.
    Natural,
    /// A named attribute of every element.
    Attribute(String),
    /// The value returned by a function of the element.
    Function(Box<dyn Fn(&T) -> Value>),
}

impl<T> OrderKey<T> {
    /// Orders by the named attribute of every element.
    pub fn attribute(name: impl Into<String>) -> Self {
        OrderKey::Attribute(name.into())
    }

    /// Orders by the value `key_fn` returns for each element.
    pub fn function<F, K>(key_fn: F) -> Self
    where
        F: Fn(&T) -> K + 'static,
        K: Into<Value>,
    {
        OrderKey::Function(Box::new(move |item| key_fn(item).into()))
    }
}

impl<T> fmt::Debug for OrderKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderKey::Natural => f.write_str("Natural"),
            OrderKey::Attribute(name) => f.debug_tuple("Attribute").field(name).finish(),
            OrderKey::Function(_) => f.write_str("Function(..)"),
        }
    }
}

/// An empty name means natural order.
impl<T> From<&str> for OrderKey<T> {
    fn from(name: &str) -> Self {
        if name.is_empty() {
            OrderKey::Natural
        } else {
            OrderKey::Attribute(name.to_string())
        }
    }
}

impl<T> From<String> for OrderKey<T> {
    fn from(name: String) -> Self {
        OrderKey::from(name.as_str())
    }
}

/// Null selects natural order and text names an attribute.
impl<T> TryFrom<Value> for OrderKey<T> {
    type Error = RecordError;

    fn try_from(value: Value) -> RecordResult<Self> {
        match value {
            Value::Null => Ok(OrderKey::Natural),
            Value::Str(name) => Ok(OrderKey::from(name)),
            other => Err(RecordError::InvalidKeyType(other.type_name())),
        }
    }
}

/// Hashable projection of a [`Value`] used as a deduplication key.
///
/// Integral floats collapse onto integers so that `1` and `1.0` are the same
/// key, and record fields are compared regardless of their order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum DistinctKey {
    Null,
    Bool(bool),
    Int(i64),
    Float(u64),
    Str(String),
    Seq(Vec<DistinctKey>),
    Map(Vec<(String, DistinctKey)>),
}

impl From<&Value> for DistinctKey {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => DistinctKey::Null,
            Value::Bool(b) => DistinctKey::Bool(*b),
            Value::Int(n) => DistinctKey::Int(*n),
            Value::Float(n) if n.fract() == 0.0 && *n >= i64::MIN as f64 && *n < i64::MAX as f64 => {
                DistinctKey::Int(*n as i64)
            }
            Value::Float(n) => DistinctKey::Float(n.to_bits()),
            Value::Str(s) => DistinctKey::Str(s.clone()),
            Value::Collection(items) => DistinctKey::Seq(items.iter().map(DistinctKey::from).collect()),
            Value::Record(record) => {
                let mut fields: Vec<_> = record
                    .iter()
                    .map(|(key, value)| (key.clone(), DistinctKey::from(value)))
                    .collect();
                fields.sort_by(|(a, _), (b, _)| a.cmp(b));
                DistinctKey::Map(fields)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::Predicate;
    use serde_json::json;

    fn people() -> RecordCollection {
        RecordCollection::try_from_json(json!([
            { "name": "Alice", "age": 25, "gender": "female" },
            { "name": "Bob", "age": 40, "gender": "male" },
            { "name": "Charlie", "age": 30, "gender": "male" },
            { "name": "Dave", "age": 30, "gender": "male" },
        ]))
        .unwrap()
    }

    fn names(collection: &RecordCollection) -> Vec<String> {
        collection
            .iter()
            .map(|person| person.get_attribute("name").unwrap().to_string())
            .collect()
    }

    #[test]
    fn try_from_json_requires_array() {
        assert_eq!(people().len(), 4);
        assert!(RecordCollection::try_from_json(json!({ "a": 1 })).is_err());
    }

    #[test]
    fn filter_by_combines_keywords() {
        let people = people();
        let criteria = Criteria::new().with("age__gt", 25).with("name__contains", "v");
        assert_eq!(names(&people.filter_by(&criteria).unwrap()), ["Dave"]);

        let none = people.filter_by(&Criteria::new().with("age", 100)).unwrap();
        assert!(none.is_empty());

        assert_eq!(people.filter_by(&Criteria::new()).unwrap(), people.all());
    }

    #[test]
    fn filter_flattens_positional_queries() {
        let people = people();
        let males = Query::from(Predicate::new("gender", None, "male"));
        let thirty = Query::from(Predicate::exact("age", 30));

        let result = people.filter(&[males, thirty], &Criteria::new()).unwrap();
        assert_eq!(names(&result), ["Charlie", "Dave"]);
    }

    #[test]
    fn filter_reports_invalid_operator() {
        assert_eq!(
            people().filter_by(&Criteria::new().with("name__notValid", "i")).unwrap_err(),
            RecordError::InvalidOperator("notValid".into())
        );
    }

    #[test]
    fn filter_with_disables_pattern_fallback() {
        let config = MatchConfig::builder().regex_fallback(false).build();
        let criteria = Criteria::new().with("name", "Al");

        assert_eq!(people().filter_by(&criteria).unwrap().len(), 1);
        assert!(people().filter_with(&[], &criteria, &config).unwrap().is_empty());
    }

    #[test]
    fn find_by_requires_exactly_one_match() {
        let people = people();

        let bob = people.find_by(&Criteria::new().with("name", "Bob")).unwrap();
        assert_eq!(bob.get_attribute("age").unwrap().as_ref(), &Value::Int(40));

        assert_eq!(
            people.find_by(&Criteria::new().with("name__contains", "i")).unwrap_err(),
            RecordError::MultipleRecordsFound(r#"{name__contains: "i"}"#.into())
        );
        assert_eq!(
            people.find_by(&Criteria::new().with("age", 99)).unwrap_err(),
            RecordError::RecordNotFound("{age: 99}".into())
        );
    }

    #[test]
    fn order_by_attribute_is_stable() {
        let ordered = people().order_by("age", false).unwrap();
        assert_eq!(names(&ordered), ["Alice", "Charlie", "Dave", "Bob"]);

        let reversed = people().order_by("age", true).unwrap();
        assert_eq!(names(&reversed), ["Bob", "Charlie", "Dave", "Alice"]);
    }

    #[test]
    fn order_by_function() {
        let key = OrderKey::function(|person: &Value| {
            person.attribute("name").map_or(0, |name| name.to_string().len())
        });
        let ordered = people().order_by(key, false).unwrap();
        assert_eq!(names(&ordered), ["Bob", "Dave", "Alice", "Charlie"]);
    }

    #[test]
    fn order_by_natural_requires_numbers() {
        let numbers: RecordCollection = vec![Value::Int(3), Value::Float(1.5), Value::Int(2)].into();
        assert_eq!(
            numbers.order_by(OrderKey::Natural, false).unwrap().into_vec(),
            vec![Value::Float(1.5), Value::Int(2), Value::Int(3)]
        );

        assert_eq!(
            people().order_by("", false).unwrap_err(),
            RecordError::InvalidOrdering("record")
        );
    }

    #[test]
    fn order_by_rejects_incomparable_keys() {
        let mixed = RecordCollection::try_from_json(json!([{ "k": 1 }, { "k": "a" }])).unwrap();
        assert!(matches!(
            mixed.order_by("k", false),
            Err(RecordError::TypeMismatch { ref op, .. }) if op == "order_by"
        ));
        assert!(people().order_by("email", false).is_err());
    }

    #[test]
    fn order_key_from_dynamic_value() {
        assert!(matches!(OrderKey::<Value>::try_from(Value::Null), Ok(OrderKey::Natural)));
        assert!(matches!(OrderKey::<Value>::try_from(Value::from("age")), Ok(OrderKey::Attribute(_))));
        assert_eq!(
            OrderKey::<Value>::try_from(Value::Int(1)).unwrap_err(),
            RecordError::InvalidKeyType("int")
        );
    }

    #[test]
    fn group_by_partitions_in_order() {
        let groups = people().group_by(|person| person.get_attribute("gender").unwrap().to_string());
        assert_eq!(groups.len(), 2);
        assert_eq!(names(&groups["male"]), ["Bob", "Charlie", "Dave"]);
        assert_eq!(names(&groups["female"]), ["Alice"]);
    }

    #[test]
    fn limit_and_offset_clamp() {
        let people = people();
        assert_eq!(names(&people.limit(2)), ["Alice", "Bob"]);
        assert_eq!(people.limit(10).len(), 4);
        assert_eq!(names(&people.offset(3)), ["Dave"]);
        assert!(people.offset(10).is_empty());
        assert_eq!(names(&people.last_n(2)), ["Charlie", "Dave"]);
        assert_eq!(people.last_n(10).len(), 4);
        assert_eq!(names(&people.first_n(1)), ["Alice"]);
    }

    #[test]
    fn distinct_primitives() {
        let values: RecordCollection = vec![
            Value::Int(1),
            Value::from("a"),
            Value::Float(1.0),
            Value::from("a"),
            Value::Float(2.5),
        ]
        .into();
        assert_eq!(
            values.distinct(&[]).unwrap().into_vec(),
            vec![Value::Int(1), Value::from("a"), Value::Float(2.5)]
        );

        assert_eq!(people().distinct(&[]).unwrap_err(), RecordError::MissingField("record"));
    }

    #[test]
    fn distinct_by_fields() {
        let people = people();
        assert_eq!(names(&people.distinct(&["gender"]).unwrap()), ["Alice", "Bob"]);
        assert_eq!(people.distinct(&["gender", "age"]).unwrap().len(), 3);
        assert_eq!(
            people.distinct(&["email"]).unwrap_err(),
            RecordError::UnknownField { field: "email".into(), kind: "record" }
        );
        assert!(RecordCollection::<Value>::new().distinct(&["x"]).unwrap().is_empty());
    }

    #[test]
    fn map_reads_attributes_and_methods() {
        let people = people();
        let names = people.map("name").unwrap();
        assert_eq!(names.len(), 4);
        assert_eq!(names.map(":upper").unwrap()[0], Value::from("ALICE"));
        assert!(people.map("").is_err());
    }

    #[test]
    fn inspect_renders_pretty_json() {
        let numbers: RecordCollection = vec![Value::Int(1)].into();
        assert_eq!(numbers.inspect().unwrap(), "[\n  1\n]");
    }
}
