//! Query evaluation against in-memory elements.
//!
//! [`RecordEvaluator`] walks a query tree for one element and decides whether
//! the element matches. Unlike a lenient filter, evaluation errors (unknown
//! attributes, operands of the wrong type) are propagated to the caller.

use crate::{
    attribute::AttributeReadable,
    error::{RecordError, RecordResult},
    query::{Comparison, Node, Operator, Predicate, QueryVisitor},
    value::Value,
};

/// Evaluates queries against a single element.
pub struct RecordEvaluator<'a, T: ?Sized> {
    element: &'a T,
}

impl<'a, T: AttributeReadable + ?Sized> RecordEvaluator<'a, T> {
    /// Creates an evaluator for `element`.
    pub fn new(element: &'a T) -> Self {
        Self { element }
    }

    /// Evaluates a conjunction of nodes.
    pub fn evaluate(&mut self, nodes: &[Node]) -> RecordResult<bool> {
        self.visit_query(nodes)
    }
}

/// Keeps the elements for which every node holds, preserving their order.
///
/// # Errors
///
/// Returns the first evaluation error encountered.
pub fn filter_elements<'a, T>(
    elements: impl IntoIterator<Item = &'a T>,
    nodes: &[Node],
) -> RecordResult<Vec<T>>
where
    T: AttributeReadable + Clone + 'a,
{
    let mut matched = Vec::new();
    for element in elements {
        if RecordEvaluator::new(element).evaluate(nodes)? {
            matched.push(element.clone());
        }
    }

    Ok(matched)
}

impl<T: AttributeReadable + ?Sized> QueryVisitor for RecordEvaluator<'_, T> {
    type Output = bool;
    type Error = RecordError;

    fn visit_query(&mut self, nodes: &[Node]) -> RecordResult<bool> {
        for node in nodes {
            if !self.visit_node(node)? {
                return Ok(false);
            }
        }

        Ok(true)
    }

    fn visit_predicate(&mut self, predicate: &Predicate) -> RecordResult<bool> {
        let attribute = self.element.get_attribute(predicate.attribute())?;
        let result = compare(&attribute, predicate.comparison(), predicate.value())?;

        tracing::trace!(predicate = %predicate, result, "evaluated predicate");
        Ok(result)
    }
}

/// Applies a resolved comparison to the attribute value `left` and the
/// predicate value `right`.
pub fn compare(left: &Value, comparison: &Comparison, right: &Value) -> RecordResult<bool> {
    match comparison {
        Comparison::Operator(op) => apply_operator(*op, left, right),
        Comparison::Pattern(pattern) => match left {
            Value::Str(text) => Ok(pattern.find(text).is_some_and(|found| found.start() == 0)),
            other => Err(RecordError::type_mismatch("match", other.type_name(), "str")),
        },
        Comparison::Equality => Ok(left.loosely_equals(right)),
    }
}

fn apply_operator(op: Operator, left: &Value, right: &Value) -> RecordResult<bool> {
    let mismatch = || RecordError::type_mismatch(op.as_str(), left.type_name(), right.type_name());

    match op {
        Operator::Lt | Operator::Gt | Operator::Lte | Operator::Gte => {
            if !left.same_type(right) || matches!(left, Value::Null | Value::Record(_)) {
                return Err(mismatch());
            }
            match left.try_cmp(right) {
                Some(ordering) => Ok(op.eval_ordering(ordering)),
                // NaN has no ordering and satisfies no comparison.
                None if left.is_numeric() => Ok(false),
                None => Err(mismatch()),
            }
        }
        Operator::Not => {
            if !left.same_type(right) {
                return Err(mismatch());
            }
            Ok(left != right)
        }
        Operator::StartsWith | Operator::EndsWith | Operator::Contains => match (left, right) {
            (Value::Str(text), Value::Str(needle)) => Ok(match op {
                Operator::StartsWith => text.starts_with(needle.as_str()),
                Operator::EndsWith => text.ends_with(needle.as_str()),
                _ => text.contains(needle.as_str()),
            }),
            _ => Err(mismatch()),
        },
        Operator::In | Operator::Nin => match right {
            Value::Collection(members) => {
                let found = members.iter().any(|member| member.loosely_equals(left));
                Ok(if op == Operator::In { found } else { !found })
            }
            _ => Err(mismatch()),
        },
    }
}
