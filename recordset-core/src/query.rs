//! Predicate and query construction for record collections.
//!
//! This module provides the filter algebra evaluated by
//! [`RecordCollection::filter`](crate::collection::RecordCollection::filter):
//!
//! - [`Operator`]: the fixed operator table (`lt`, `gt`, `lte`, `gte`,
//!   `endswith`, `startswith`, `contains`, `in`, `nin`, `not`)
//! - [`Predicate`]: one attribute/operator/value comparison
//! - [`Query`]: a tree of predicates and sub-queries, evaluated as a conjunction
//! - [`Criteria`]: keyword criteria such as `"age__gt" => 25`
//! - [`QueryVisitor`]: the traversal used by the evaluator and the renderer
//!
//! # Keyword Criteria
//!
//! A keyword `attribute__operator` decomposes into a predicate with that
//! operator. A bare keyword `attribute` has no operator and is resolved when the
//! predicate is built: a text value that compiles as a regular expression is
//! matched as a pattern anchored at the start of the attribute, anything else is
//! compared for equality.
//!
//! ```ignore
//! use recordset::prelude::*;
//!
//! let adults = Query::from(Predicate::gte("age", 18));
//! let named = Query::from(Predicate::parse("name__startswith", "J")?);
//!
//! // AND flattens both operands into one query.
//! let both = adults & named;
//! ```
//!
//! # Composition
//!
//! `q1 & q2` concatenates the children of both queries. `q1 | q2` builds a new
//! query whose two children are `q1` and `q2`. Because every query evaluates as
//! "all children are true", `q1 | q2` currently behaves like `q1 & q2`.

use std::{cmp::Ordering, fmt, ops::{BitAnd, BitOr}, str::FromStr};

use regex::{Regex, RegexBuilder};

use crate::{
    attribute::AttributeReadable,
    config::MatchConfig,
    error::{RecordError, RecordResult},
    evaluator::RecordEvaluator,
    value::Value,
};

/// Separator between the attribute and the operator in a keyword.
pub const OPERATOR_SEPARATOR: &str = "__";

/// Comparison operators usable as keyword suffixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// Less than. Both operands must share a type.
    Lt,
    /// Greater than. Both operands must share a type.
    Gt,
    /// Less than or equal. Both operands must share a type.
    Lte,
    /// Greater than or equal. Both operands must share a type.
    Gte,
    /// Text ends with the value.
    EndsWith,
    /// Text starts with the value.
    StartsWith,
    /// Text contains the value as a substring.
    Contains,
    /// Attribute is a member of the value collection.
    In,
    /// Attribute is not a member of the value collection.
    Nin,
    /// Attribute differs from the value. Both operands must share a type.
    Not,
}

impl Operator {
    /// Every operator, in table order.
    pub const ALL: [Operator; 10] = [
        Operator::Lt,
        Operator::Gt,
        Operator::Lte,
        Operator::Gte,
        Operator::EndsWith,
        Operator::StartsWith,
        Operator::Contains,
        Operator::In,
        Operator::Nin,
        Operator::Not,
    ];

    /// Returns the keyword suffix of this operator.
    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Lt => "lt",
            Operator::Gt => "gt",
            Operator::Lte => "lte",
            Operator::Gte => "gte",
            Operator::EndsWith => "endswith",
            Operator::StartsWith => "startswith",
            Operator::Contains => "contains",
            Operator::In => "in",
            Operator::Nin => "nin",
            Operator::Not => "not",
        }
    }

    /// Returns `true` for `lt`, `gt`, `lte` and `gte`.
    pub fn is_ordering(self) -> bool {
        matches!(self, Operator::Lt | Operator::Gt | Operator::Lte | Operator::Gte)
    }

    /// Returns `true` for the operators that only accept text operands.
    pub fn is_text(self) -> bool {
        matches!(self, Operator::EndsWith | Operator::StartsWith | Operator::Contains)
    }

    /// Evaluates an ordering operator given the ordering of attribute vs value.
    ///
    /// Non-ordering operators always yield `false`.
    pub fn eval_ordering(self, ordering: Ordering) -> bool {
        match self {
            Operator::Lt => ordering == Ordering::Less,
            Operator::Gt => ordering == Ordering::Greater,
            Operator::Lte => ordering != Ordering::Greater,
            Operator::Gte => ordering != Ordering::Less,
            _ => false,
        }
    }
}

impl FromStr for Operator {
    type Err = RecordError;

    fn from_str(s: &str) -> RecordResult<Self> {
        Operator::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| RecordError::InvalidOperator(s.to_string()))
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a predicate compares, decided once when the predicate is built.
#[derive(Debug, Clone)]
pub enum Comparison {
    /// Apply an explicit operator.
    Operator(Operator),
    /// Match the attribute text against a pattern anchored at its start.
    Pattern(Regex),
    /// Compare for equality.
    Equality,
}

impl Comparison {
    /// Resolves a predicate that was given no operator.
    ///
    /// Text that compiles as a pattern (within the configured size limit) is
    /// matched as a pattern when the fallback is enabled. Everything else is
    /// compared for equality.
    pub fn resolve_bare(value: &Value, config: &MatchConfig) -> Self {
        match value {
            Value::Str(raw) if config.regex_fallback => RegexBuilder::new(raw)
                .size_limit(config.regex_size_limit)
                .build()
                .map_or(Comparison::Equality, Comparison::Pattern),
            _ => Comparison::Equality,
        }
    }
}

/// A single attribute/operator/value comparison.
///
/// # Example
///
/// ```ignore
/// use recordset::query::{Operator, Predicate};
///
/// let older = Predicate::new("age", Some(Operator::Gt), 25);
/// let parsed = Predicate::parse("name__contains", "v")?;
/// let pattern = Predicate::new("name", None, "^A.*"); // matched as a pattern
/// ```
#[derive(Debug, Clone)]
pub struct Predicate {
    attribute: String,
    operator: Option<Operator>,
    value: Value,
    comparison: Comparison,
}

impl Predicate {
    /// Creates a predicate with the default [`MatchConfig`].
    pub fn new(attribute: impl Into<String>, operator: Option<Operator>, value: impl Into<Value>) -> Self {
        Self::with_config(attribute, operator, value, &MatchConfig::default())
    }

    /// Creates a predicate, resolving a missing operator with `config`.
    pub fn with_config(
        attribute: impl Into<String>,
        operator: Option<Operator>,
        value: impl Into<Value>,
        config: &MatchConfig,
    ) -> Self {
        let value = value.into();
        let comparison = match operator {
            Some(op) => Comparison::Operator(op),
            None => Comparison::resolve_bare(&value, config),
        };

        Self { attribute: attribute.into(), operator, value, comparison }
    }

    /// Builds a predicate from a keyword such as `age__gt` or `name`.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::InvalidOperator`] if the suffix after the first
    /// `__` is not a known operator.
    pub fn parse(key: &str, value: impl Into<Value>) -> RecordResult<Self> {
        Self::parse_with(key, value, &MatchConfig::default())
    }

    /// Like [`Predicate::parse`], resolving a bare keyword with `config`.
    pub fn parse_with(key: &str, value: impl Into<Value>, config: &MatchConfig) -> RecordResult<Self> {
        match key.split_once(OPERATOR_SEPARATOR) {
            Some((attribute, suffix)) => {
                let operator = suffix.parse::<Operator>()?;
                Ok(Self::with_config(attribute, Some(operator), value, config))
            }
            None => Ok(Self::with_config(key, None, value, config)),
        }
    }

    /// Creates a predicate matching the attribute text against `pattern`,
    /// anchored at the start. Use this for patterns with flags, e.g.
    /// `(?i)` for case-insensitive matching.
    pub fn pattern(attribute: impl Into<String>, pattern: Regex) -> Self {
        Self {
            attribute: attribute.into(),
            operator: None,
            value: Value::Str(pattern.as_str().to_string()),
            comparison: Comparison::Pattern(pattern),
        }
    }

    /// Compiles `pattern` and creates a pattern predicate.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::InvalidPattern`] if the pattern does not compile.
    pub fn regex(attribute: impl Into<String>, pattern: &str) -> RecordResult<Self> {
        Ok(Self::pattern(attribute, Regex::new(pattern)?))
    }

    /// Creates an equality predicate that never falls back to pattern matching.
    pub fn exact(attribute: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            attribute: attribute.into(),
            operator: None,
            value: value.into(),
            comparison: Comparison::Equality,
        }
    }

    /// Attribute is less than `value`.
    pub fn lt(attribute: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(attribute, Some(Operator::Lt), value)
    }

    /// Attribute is greater than `value`.
    pub fn gt(attribute: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(attribute, Some(Operator::Gt), value)
    }

    /// Attribute is less than or equal to `value`.
    pub fn lte(attribute: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(attribute, Some(Operator::Lte), value)
    }

    /// Attribute is greater than or equal to `value`.
    pub fn gte(attribute: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(attribute, Some(Operator::Gte), value)
    }

    /// Attribute text starts with `value`.
    pub fn starts_with(attribute: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(attribute, Some(Operator::StartsWith), value)
    }

    /// Attribute text ends with `value`.
    pub fn ends_with(attribute: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(attribute, Some(Operator::EndsWith), value)
    }

    /// Attribute text contains `value`.
    pub fn contains(attribute: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(attribute, Some(Operator::Contains), value)
    }

    /// Attribute is a member of the `value` collection.
    pub fn is_in(attribute: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(attribute, Some(Operator::In), value)
    }

    /// Attribute is not a member of the `value` collection.
    pub fn not_in(attribute: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(attribute, Some(Operator::Nin), value)
    }

    /// Attribute differs from `value`.
    pub fn not(attribute: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(attribute, Some(Operator::Not), value)
    }

    /// Returns the attribute name.
    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    /// Returns the explicit operator, if any.
    pub fn operator(&self) -> Option<Operator> {
        self.operator
    }

    /// Returns the comparison value.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Returns how the predicate compares, as resolved when it was built.
    pub fn comparison(&self) -> &Comparison {
        &self.comparison
    }

    /// Evaluates the predicate against one element.
    pub fn evaluate<T: AttributeReadable + ?Sized>(&self, element: &T) -> RecordResult<bool> {
        RecordEvaluator::new(element).visit_predicate(self)
    }
}

/// A child of a [`Query`]: either a predicate or a nested query.
#[derive(Debug, Clone)]
pub enum Node {
    /// A single comparison.
    Predicate(Predicate),
    /// A nested query.
    Query(Query),
}

impl From<Predicate> for Node {
    fn from(predicate: Predicate) -> Self {
        Node::Predicate(predicate)
    }
}

impl From<Query> for Node {
    fn from(query: Query) -> Self {
        Node::Query(query)
    }
}

/// A composable group of predicates and sub-queries.
///
/// A query is true for an element when every child is true. An empty query is
/// true for every element.
#[derive(Debug, Clone, Default)]
pub struct Query {
    nodes: Vec<Node>,
}

impl Query {
    /// Creates an empty query.
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Creates a query from its children.
    pub fn from_nodes<I, N>(nodes: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<Node>,
    {
        Self { nodes: nodes.into_iter().map(Into::into).collect() }
    }

    /// Builds one predicate per keyword of `criteria`.
    pub fn from_criteria(criteria: &Criteria) -> RecordResult<Self> {
        Self::from_criteria_with(criteria, &MatchConfig::default())
    }

    /// Like [`Query::from_criteria`], resolving bare keywords with `config`.
    pub fn from_criteria_with(criteria: &Criteria, config: &MatchConfig) -> RecordResult<Self> {
        criteria
            .iter()
            .map(|(key, value)| Predicate::parse_with(key, value.clone(), config).map(Node::from))
            .collect::<RecordResult<Vec<_>>>()
            .map(|nodes| Self { nodes })
    }

    /// Appends a child.
    pub fn with(mut self, node: impl Into<Node>) -> Self {
        self.nodes.push(node.into());
        self
    }

    /// Returns the children.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Consumes the query, returning its children.
    pub fn into_nodes(self) -> Vec<Node> {
        self.nodes
    }

    /// Returns the number of direct children.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the query has no children.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Conjunction: a flat query holding the children of both operands.
    pub fn and(mut self, other: Query) -> Self {
        self.nodes.extend(other.nodes);
        self
    }

    /// Disjunction: a query whose two children are the operands themselves.
    ///
    /// Evaluation is a conjunction of children, so the result is currently
    /// true only when both operands are true.
    pub fn or(self, other: Query) -> Self {
        Self { nodes: vec![Node::Query(self), Node::Query(other)] }
    }

    /// Evaluates the query against one element.
    pub fn evaluate<T: AttributeReadable + ?Sized>(&self, element: &T) -> RecordResult<bool> {
        RecordEvaluator::new(element).visit_query(&self.nodes)
    }
}

impl From<Predicate> for Query {
    fn from(predicate: Predicate) -> Self {
        Self { nodes: vec![Node::Predicate(predicate)] }
    }
}

impl BitAnd for Query {
    type Output = Query;

    fn bitand(self, rhs: Query) -> Query {
        self.and(rhs)
    }
}

impl BitOr for Query {
    type Output = Query;

    fn bitor(self, rhs: Query) -> Query {
        self.or(rhs)
    }
}

/// Ordered keyword criteria for `filter` and `find_by`.
///
/// # Example
///
/// ```ignore
/// use recordset::{criteria, query::Criteria};
///
/// let built = Criteria::new().with("age__gt", 25).with("name__contains", "v");
/// let literal = criteria! { "age__gt" => 25, "name__contains" => "v" };
/// assert_eq!(built, literal);
/// assert_eq!(built.to_string(), r#"{age__gt: 25, name__contains: "v"}"#);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Criteria {
    entries: Vec<(String, Value)>,
}

impl Criteria {
    /// Creates empty criteria.
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Adds a keyword and its value.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push(key, value);
        self
    }

    /// Adds a keyword and its value in place.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.entries.push((key.into(), value.into()));
    }

    /// Iterates over keywords and values in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Returns the number of keywords.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no keywords.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Criteria {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

impl fmt::Display for Criteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (index, (key, value)) in self.entries.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{key}: {}", value.repr())?;
        }
        f.write_str("}")
    }
}

/// Traversal over a query tree.
///
/// [`RecordEvaluator`] implements it to decide whether an element matches;
/// the renderer behind `Display for Query` implements it to print the tree.
pub trait QueryVisitor {
    type Output;
    type Error: Into<RecordError>;

    fn visit_query(&mut self, nodes: &[Node]) -> Result<Self::Output, Self::Error>;
    fn visit_predicate(&mut self, predicate: &Predicate) -> Result<Self::Output, Self::Error>;

    fn visit_node(&mut self, node: &Node) -> Result<Self::Output, Self::Error> {
        match node {
            Node::Predicate(predicate) => self.visit_predicate(predicate),
            Node::Query(query) => self.visit_query(query.nodes()),
        }
    }
}

/// Renders a query as `(age__gt=25 & name="v")`.
struct QueryRenderer;

impl QueryVisitor for QueryRenderer {
    type Output = String;
    type Error = RecordError;

    fn visit_query(&mut self, nodes: &[Node]) -> RecordResult<String> {
        let parts = nodes
            .iter()
            .map(|node| self.visit_node(node))
            .collect::<RecordResult<Vec<_>>>()?;
        Ok(format!("({})", parts.join(" & ")))
    }

    fn visit_predicate(&mut self, predicate: &Predicate) -> RecordResult<String> {
        Ok(predicate.to_string())
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.operator {
            Some(op) => write!(f, "{}{OPERATOR_SEPARATOR}{op}={}", self.attribute, self.value.repr()),
            None => write!(f, "{}={}", self.attribute, self.value.repr()),
        }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = QueryRenderer.visit_query(&self.nodes).map_err(|_| fmt::Error)?;
        f.write_str(&rendered)
    }
}
