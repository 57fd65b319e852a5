//! Convenient re-exports of commonly used types from recordset.
//!
//! ```ignore
//! use recordset::prelude::*;
//! ```
//!
//! This provides access to:
//! - Values, records and collections
//! - Attribute traits and the `Attributes` derive
//! - Query construction and keyword criteria
//! - The sequence mapper
//! - Configuration and error types

pub use recordset_core::{
    attribute::{AttributeReadable, Invocable},
    collection::{OrderKey, RecordCollection},
    config::{MatchConfig, MatchConfigBuilder},
    criteria,
    error::{RecordError, RecordResult},
    mapper::{SequenceMapper, Selector},
    query::{Comparison, Criteria, Node, Operator, Predicate, Query, QueryVisitor},
    record::DynamicRecord,
    value::Value,
};
pub use recordset_macros::Attributes;
