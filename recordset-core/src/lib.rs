//! In-memory dynamic records with a small chained query engine.
//!
//! This crate is the core of the recordset project and provides:
//!
//! - **Dynamic values** ([`value`]) - The [`Value`](value::Value) carried by records and collections
//! - **Records** ([`record`]) - Insertion-ordered, deep-normalized key/value records
//! - **Attribute access** ([`attribute`]) - Traits that let any element type be queried
//! - **Query algebra** ([`query`]) - Operators, predicates, composable queries and keyword criteria
//! - **Evaluation** ([`evaluator`]) - Matching queries against elements
//! - **Collections** ([`collection`]) - The chained query surface (`filter`, `find_by`, `order_by`, ...)
//! - **Mapping** ([`mapper`]) - Applying a function, method or attribute across a sequence
//! - **Configuration** ([`config`]) - How bare keywords resolve to pattern or equality matching
//! - **Error handling** ([`error`]) - The error and result types shared by every operation
//!
//! # Example
//!
//! ```ignore
//! use recordset_core::{criteria, collection::RecordCollection};
//! use serde_json::json;
//!
//! let people = RecordCollection::try_from_json(json!([
//!     { "name": "Alice", "age": 25 },
//!     { "name": "Bob", "age": 40 },
//! ]))?;
//!
//! let bob = people.find_by(&criteria! { "name" => "Bob" })?;
//! ```

#[allow(unused_extern_crates)]
extern crate self as recordset_core;

pub mod attribute;
pub mod collection;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod mapper;
pub mod query;
pub mod record;
pub mod value;

/// Builds [`Criteria`](query::Criteria) from `key => value` pairs, in order.
///
/// ```ignore
/// let criteria = criteria! { "age__gt" => 25, "name__contains" => "v" };
/// let empty = criteria! {};
/// ```
#[macro_export]
macro_rules! criteria {
    () => {
        $crate::query::Criteria::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {
        $crate::query::Criteria::new()$(.with($key, $value))+
    };
}
