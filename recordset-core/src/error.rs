//! Error types and result types for record and collection operations.
//!
//! Every fallible operation in this crate returns a [`RecordResult<T>`]. The
//! variants of [`RecordError`] always carry the operator, field, or key involved
//! so that a failure can be diagnosed from its message alone.

use serde_json::Error as SerdeJsonError;
use thiserror::Error;

/// Represents all possible errors raised by records, queries, and collections.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// The operands of an operator (or the argument of a projection) have
    /// incompatible runtime types.
    #[error("unsupported operand type(s) for {op}: '{left}' and '{right}'")]
    TypeMismatch {
        /// The operator or operation that rejected its operands.
        op: String,
        /// Type name of the left operand (the attribute value).
        left: &'static str,
        /// Type name of the right operand (the comparison value).
        right: &'static str,
    },
    /// An operator suffix is not part of the fixed operator table.
    #[error("Invalid operator {0}")]
    InvalidOperator(String),
    /// The requested attribute does not exist.
    #[error("no such attribute: {0}")]
    UnknownAttribute(String),
    /// `find_by` matched nothing. Carries the rendered criteria.
    #[error("no record found for {0}")]
    RecordNotFound(String),
    /// `find_by` matched more than one element. Carries the rendered criteria.
    #[error("more than one record found for {0}")]
    MultipleRecordsFound(String),
    /// Natural ordering was requested on a collection holding non-numeric elements.
    #[error("all elements must be integers or floats to order without a key, found '{0}'")]
    InvalidOrdering(&'static str),
    /// The ordering key is neither an attribute name nor a function.
    #[error("order key must be an attribute name or a function, got '{0}'")]
    InvalidKeyType(&'static str),
    /// `distinct` without fields was called on non-primitive elements.
    #[error("at least one field must be provided to deduplicate '{0}' elements")]
    MissingField(&'static str),
    /// A `distinct` field does not exist on the first element.
    #[error("field '{field}' does not exist on {kind}")]
    UnknownField {
        /// The missing field.
        field: String,
        /// Kind of the element the field was looked up on.
        kind: &'static str,
    },
    /// The mapper selector has an unsupported shape.
    #[error("invalid selector: {0}")]
    InvalidSelector(String),
    /// A method selector named a method the element does not provide.
    #[error("no such method '{method}' on {kind}")]
    UnknownMethod {
        /// The method that was requested.
        method: String,
        /// Kind of the element the method was invoked on.
        kind: &'static str,
    },
    /// An explicitly supplied pattern failed to compile.
    #[error("invalid regex pattern: {0}")]
    InvalidPattern(String),
    /// Conversion between records and a plain document format failed.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// A specialized `Result` type for record operations.
pub type RecordResult<T> = Result<T, RecordError>;

impl RecordError {
    /// Builds a [`RecordError::TypeMismatch`] for the given operator and operand types.
    pub fn type_mismatch(op: impl Into<String>, left: &'static str, right: &'static str) -> Self {
        RecordError::TypeMismatch { op: op.into(), left, right }
    }
}

impl From<SerdeJsonError> for RecordError {
    fn from(err: SerdeJsonError) -> Self {
        RecordError::Serialization(err.to_string())
    }
}

impl From<regex::Error> for RecordError {
    fn from(err: regex::Error) -> Self {
        RecordError::InvalidPattern(err.to_string())
    }
}

impl From<std::convert::Infallible> for RecordError {
    fn from(never: std::convert::Infallible) -> Self {
        match never {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_mismatch_names_operator_and_types() {
        let err = RecordError::type_mismatch("gt", "int", "str");
        assert_eq!(err.to_string(), "unsupported operand type(s) for gt: 'int' and 'str'");
    }

    #[test]
    fn unknown_field_names_field_and_kind() {
        let err = RecordError::UnknownField { field: "email".into(), kind: "Person" };
        assert_eq!(err.to_string(), "field 'email' does not exist on Person");
    }

    #[test]
    fn regex_errors_become_invalid_pattern() {
        let err: RecordError = regex::Regex::new("[").unwrap_err().into();
        assert!(matches!(err, RecordError::InvalidPattern(_)));
    }
}
