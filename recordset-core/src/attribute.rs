//! Attribute access and method invocation on collection elements.
//!
//! The query engine never requires its elements to be [`DynamicRecord`]s. An
//! element only needs to answer [`AttributeReadable::attribute`] to be filtered,
//! ordered by attribute name, or deduplicated by field. Plain structs implement
//! the trait by hand or through `#[derive(Attributes)]`.
//!
//! [`Invocable`] is the counterpart used by method selectors of the
//! [`SequenceMapper`](crate::mapper::SequenceMapper).

use std::borrow::Cow;

use crate::{
    error::{RecordError, RecordResult},
    record::DynamicRecord,
    value::Value,
};

/// Read access to named attributes of an element.
///
/// # Manual Implementation
///
/// ```ignore
/// use std::borrow::Cow;
/// use recordset::prelude::*;
///
/// struct Person {
///     name: String,
///     age: u32,
/// }
///
/// impl AttributeReadable for Person {
///     fn attribute(&self, name: &str) -> Option<Cow<'_, Value>> {
///         match name {
///             "name" => Some(Cow::Owned(Value::from(&self.name))),
///             "age" => Some(Cow::Owned(Value::from(self.age))),
///             _ => None,
///         }
///     }
///
///     fn kind(&self) -> &'static str {
///         "Person"
///     }
/// }
/// ```
pub trait AttributeReadable {
    /// Returns the value of attribute `name`, or `None` if it does not exist.
    fn attribute(&self, name: &str) -> Option<Cow<'_, Value>>;

    /// Returns a short name for the element's kind, used in error messages.
    fn kind(&self) -> &'static str;

    /// Returns the element itself as a [`Value`] when it is one.
    ///
    /// Natural ordering and field-less `distinct` only work on elements that
    /// expose themselves this way.
    fn as_value(&self) -> Option<&Value> {
        None
    }

    /// Like [`AttributeReadable::attribute`], failing with
    /// [`RecordError::UnknownAttribute`] when the attribute is absent.
    fn get_attribute(&self, name: &str) -> RecordResult<Cow<'_, Value>> {
        self.attribute(name)
            .ok_or_else(|| RecordError::UnknownAttribute(name.to_string()))
    }
}

/// Named method invocation on an element, used by `:method` selectors.
///
/// The default implementation knows no methods, so `impl Invocable for T {}`
/// is enough for elements that are only ever mapped by attribute or function.
pub trait Invocable: AttributeReadable {
    /// Invokes `method` with `args`.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::UnknownMethod`] if the element has no such method.
    fn invoke(&self, method: &str, _args: &[Value]) -> RecordResult<Value> {
        Err(RecordError::UnknownMethod { method: method.to_string(), kind: self.kind() })
    }
}

/// Methods understood by [`Value`] and [`DynamicRecord`].
pub const BUILTIN_METHODS: &[&str] = &[
    "to_string",
    "upper",
    "lower",
    "trim",
    "len",
    "is_empty",
    "abs",
    "to_float",
    "keys",
    "values",
    "get",
    "startswith",
    "endswith",
    "contains",
];

/// Error for a built-in method called on the wrong receiver or arguments.
fn unsupported(method: &str, receiver: &'static str, args: &[Value]) -> RecordError {
    if BUILTIN_METHODS.contains(&method) {
        let right = args.first().map_or("none", Value::type_name);
        RecordError::type_mismatch(method, receiver, right)
    } else {
        RecordError::UnknownMethod { method: method.to_string(), kind: receiver }
    }
}

impl AttributeReadable for Value {
    fn attribute(&self, name: &str) -> Option<Cow<'_, Value>> {
        match self {
            Value::Record(record) => record.attribute(name),
            _ => None,
        }
    }

    fn kind(&self) -> &'static str {
        self.type_name()
    }

    fn as_value(&self) -> Option<&Value> {
        Some(self)
    }
}

impl Invocable for Value {
    fn invoke(&self, method: &str, args: &[Value]) -> RecordResult<Value> {
        if let Value::Record(record) = self {
            return record.invoke(method, args);
        }

        let result = match (method, self, args) {
            ("to_string", value, []) => Value::Str(value.to_string()),
            ("upper", Value::Str(s), []) => Value::Str(s.to_uppercase()),
            ("lower", Value::Str(s), []) => Value::Str(s.to_lowercase()),
            ("trim", Value::Str(s), []) => Value::Str(s.trim().to_string()),
            ("len", Value::Str(s), []) => Value::from(s.chars().count()),
            ("len", Value::Collection(items), []) => Value::from(items.len()),
            ("is_empty", Value::Str(s), []) => Value::Bool(s.is_empty()),
            ("is_empty", Value::Collection(items), []) => Value::Bool(items.is_empty()),
            ("abs", Value::Int(n), []) => Value::Int(n.saturating_abs()),
            ("abs", Value::Float(n), []) => Value::Float(n.abs()),
            ("to_float", Value::Int(n), []) => Value::Float(*n as f64),
            ("to_float", Value::Float(n), []) => Value::Float(*n),
            ("startswith", Value::Str(s), [Value::Str(prefix)]) => Value::Bool(s.starts_with(prefix.as_str())),
            ("endswith", Value::Str(s), [Value::Str(suffix)]) => Value::Bool(s.ends_with(suffix.as_str())),
            ("contains", Value::Str(s), [Value::Str(needle)]) => Value::Bool(s.contains(needle.as_str())),
            ("contains", Value::Collection(items), [needle]) => {
                Value::Bool(items.iter().any(|item| item.loosely_equals(needle)))
            }
            _ => return Err(unsupported(method, self.type_name(), args)),
        };

        Ok(result)
    }
}

impl AttributeReadable for DynamicRecord {
    fn attribute(&self, name: &str) -> Option<Cow<'_, Value>> {
        self.get_opt(name).map(Cow::Borrowed)
    }

    fn kind(&self) -> &'static str {
        "record"
    }
}

impl Invocable for DynamicRecord {
    fn invoke(&self, method: &str, args: &[Value]) -> RecordResult<Value> {
        let result = match (method, args) {
            ("to_string", []) => Value::Str(Value::Record(self.clone()).to_string()),
            ("len", []) => Value::from(self.len()),
            ("is_empty", []) => Value::Bool(self.is_empty()),
            ("keys", []) => Value::Collection(self.keys().map(Value::from).collect()),
            ("values", []) => Value::Collection(self.values().cloned().collect()),
            ("get", [Value::Str(key)]) => self.get(key)?.clone(),
            ("contains", [Value::Str(key)]) => Value::Bool(self.contains_key(key)),
            _ => return Err(unsupported(method, "record", args)),
        };

        Ok(result)
    }
}

impl<T: AttributeReadable + ?Sized> AttributeReadable for &T {
    fn attribute(&self, name: &str) -> Option<Cow<'_, Value>> {
        (**self).attribute(name)
    }

    fn kind(&self) -> &'static str {
        (**self).kind()
    }

    fn as_value(&self) -> Option<&Value> {
        (**self).as_value()
    }
}

impl<T: Invocable + ?Sized> Invocable for &T {
    fn invoke(&self, method: &str, args: &[Value]) -> RecordResult<Value> {
        (**self).invoke(method, args)
    }
}
