//! Applying a selector across a bounded, filtered, ordered sequence.
//!
//! A [`SequenceMapper`] takes a slice and a [`Selector`] and runs a fixed
//! pipeline: keep the first `cap` elements, reverse them if requested, sort
//! them with the comparator if one is given (stable), drop those rejected by
//! the filter, then apply the selector to every survivor.
//!
//! # Example
//!
//! ```ignore
//! use recordset::mapper::{SequenceMapper, Selector};
//!
//! let upper_names = SequenceMapper::new(&names, Selector::parse(":upper")?)
//!     .cap(10)
//!     .filter(|name| !name.is_null())
//!     .apply()?;
//!
//! let ages: Vec<Value> = SequenceMapper::new(&people, Selector::parse("age")?)
//!     .reversed()
//!     .collect_into()?;
//! ```

use std::{cmp::Ordering, fmt};

use crate::{
    attribute::Invocable,
    collection::RecordCollection,
    error::{RecordError, RecordResult},
    value::Value,
};

/// Prefix marking a method selector, e.g. `:upper`.
pub const METHOD_MARKER: char = ':';
/// Optional prefix marking an attribute selector, e.g. `.name`.
pub const ATTRIBUTE_MARKER: char = '.';

/// What to extract from, or compute on, each element.
pub enum Selector<T> {
    /// Call a function with the element.
    Function(Box<dyn Fn(&T) -> RecordResult<Value>>),
    /// Invoke a named method of the element.
    Method(String),
    /// Read a named attribute of the element.
    Attribute(String),
}

impl<T> Selector<T> {
    /// Parses `:method`, `.attribute` or a bare `attribute`.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::InvalidSelector`] for an empty name (including a
    /// bare marker) or a name containing whitespace.
    pub fn parse(text: &str) -> RecordResult<Self> {
        let (name, is_method) = match text.strip_prefix(METHOD_MARKER) {
            Some(method) => (method, true),
            None => (text.strip_prefix(ATTRIBUTE_MARKER).unwrap_or(text), false),
        };

        if name.is_empty() || name.chars().any(char::is_whitespace) {
            return Err(RecordError::InvalidSelector(format!("{text:?}")));
        }

        Ok(if is_method {
            Selector::Method(name.to_string())
        } else {
            Selector::Attribute(name.to_string())
        })
    }

    /// A function selector that cannot fail.
    pub fn function<F, V>(select: F) -> Self
    where
        F: Fn(&T) -> V + 'static,
        V: Into<Value>,
    {
        Selector::Function(Box::new(move |item| Ok(select(item).into())))
    }

    /// A function selector that may fail.
    pub fn try_function<F>(select: F) -> Self
    where
        F: Fn(&T) -> RecordResult<Value> + 'static,
    {
        Selector::Function(Box::new(select))
    }

    /// Invokes `name` on every element.
    pub fn method(name: impl Into<String>) -> Self {
        Selector::Method(name.into())
    }

    /// Reads attribute `name` of every element.
    pub fn attribute(name: impl Into<String>) -> Self {
        Selector::Attribute(name.into())
    }
}

impl<T: Invocable> Selector<T> {
    /// Applies the selector to one element. `args` are only passed to methods.
    pub fn select(&self, item: &T, args: &[Value]) -> RecordResult<Value> {
        match self {
            Selector::Function(select) => select(item),
            Selector::Method(name) => item.invoke(name, args),
            Selector::Attribute(name) => Ok(item.get_attribute(name)?.into_owned()),
        }
    }
}

impl<T> fmt::Debug for Selector<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Function(_) => f.write_str("Function(..)"),
            Selector::Method(name) => write!(f, "Method({name:?})"),
            Selector::Attribute(name) => write!(f, "Attribute({name:?})"),
        }
    }
}

impl<T> TryFrom<&str> for Selector<T> {
    type Error = RecordError;

    fn try_from(text: &str) -> RecordResult<Self> {
        Selector::parse(text)
    }
}

impl<T> TryFrom<String> for Selector<T> {
    type Error = RecordError;

    fn try_from(text: String) -> RecordResult<Self> {
        Selector::parse(&text)
    }
}

impl<T> TryFrom<Value> for Selector<T> {
    type Error = RecordError;

    fn try_from(value: Value) -> RecordResult<Self> {
        match value {
            Value::Str(text) => Selector::parse(&text),
            other => Err(RecordError::InvalidSelector(other.repr())),
        }
    }
}

/// Builder for one pass of the mapping pipeline.
pub struct SequenceMapper<'a, T> {
    items: &'a [T],
    selector: Selector<T>,
    filter: Option<Box<dyn Fn(&T) -> bool + 'a>>,
    cap: Option<usize>,
    reverse: bool,
    comparator: Option<Box<dyn Fn(&T, &T) -> Ordering + 'a>>,
    args: Vec<Value>,
}

impl<'a, T> SequenceMapper<'a, T> {
    /// Creates a mapper over `items` with no cap, filter, or ordering.
    pub fn new(items: &'a [T], selector: Selector<T>) -> Self {
        Self {
            items,
            selector,
            filter: None,
            cap: None,
            reverse: false,
            comparator: None,
            args: Vec::new(),
        }
    }

    /// Keeps only the elements for which `keep` returns `true`.
    pub fn filter(mut self, keep: impl Fn(&T) -> bool + 'a) -> Self {
        self.filter = Some(Box::new(keep));
        self
    }

    /// Considers only the first `cap` elements.
    pub fn cap(mut self, cap: usize) -> Self {
        self.cap = Some(cap);
        self
    }

    /// Reverses the capped elements before sorting and filtering.
    pub fn reversed(mut self) -> Self {
        self.reverse = true;
        self
    }

    /// Sorts the capped elements with `compare` before filtering.
    pub fn sort_by(mut self, compare: impl Fn(&T, &T) -> Ordering + 'a) -> Self {
        self.comparator = Some(Box::new(compare));
        self
    }

    /// Arguments passed to every method invocation.
    pub fn args(mut self, args: Vec<Value>) -> Self {
        self.args = args;
        self
    }

    fn survivors(&self) -> Vec<&'a T> {
        let cap = self.cap.unwrap_or(self.items.len());
        let mut survivors: Vec<&'a T> = self.items.iter().take(cap).collect();

        if self.reverse {
            survivors.reverse();
        }
        if let Some(compare) = &self.comparator {
            survivors.sort_by(|a, b| compare(*a, *b));
        }
        if let Some(keep) = &self.filter {
            survivors.retain(|item| keep(*item));
        }

        survivors
    }
}

impl<T: Invocable> SequenceMapper<'_, T> {
    /// Runs the pipeline and collects the results into a [`RecordCollection`].
    pub fn apply(self) -> RecordResult<RecordCollection> {
        self.collect_into()
    }

    /// Runs the pipeline and collects the results into any `FromIterator<Value>`.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by the selector.
    pub fn collect_into<B: FromIterator<Value>>(self) -> RecordResult<B> {
        let survivors = self.survivors();
        tracing::debug!(
            selector = ?self.selector,
            elements = self.items.len(),
            selected = survivors.len(),
            "mapping sequence"
        );

        survivors
            .into_iter()
            .map(|item| self.selector.select(item, &self.args))
            .collect()
    }
}
