//! Main recordset crate: dynamic records and chained in-memory queries.
//!
//! This crate is the primary entry point for users of the recordset
//! framework. It re-exports the core types from `recordset-core` and the
//! `Attributes` derive from `recordset-macros`.
//!
//! # Features
//!
//! - **Dynamic records** - Insertion-ordered key/value records built from JSON or BSON
//! - **Chained queries** - `filter`, `find_by`, `order_by`, `group_by`, `limit`, `offset`, `distinct`
//! - **Keyword criteria** - `"age__gt" => 25` style predicates with a pattern-matching fallback
//! - **Any element type** - Plain structs become queryable with `#[derive(Attributes)]`
//!
//! # Quick Start
//!
//! ```ignore
//! use recordset::prelude::*;
//! use serde_json::json;
//!
//! let people = RecordCollection::try_from_json(json!([
//!     { "name": "Alice", "age": 25, "gender": "female" },
//!     { "name": "Bob", "age": 40, "gender": "male" },
//!     { "name": "Charlie", "age": 30, "gender": "male" },
//!     { "name": "Dave", "age": 30, "gender": "male" },
//! ]))?;
//!
//! // Keyword criteria are combined with AND.
//! let dave = people.filter_by(&criteria! { "age__gt" => 25, "name__contains" => "v" })?;
//!
//! // Queries compose and can be mixed with criteria.
//! let men = Query::from(Predicate::new("gender", None, "male"));
//! let thirty = Query::from(Predicate::exact("age", 30));
//! let both = people.filter(&[men & thirty], &Criteria::new())?;
//!
//! // Stable ordering and chained slicing.
//! let youngest_two = people.order_by("age", false)?.limit(2);
//! ```
//!
//! # Plain Structs
//!
//! ```ignore
//! use recordset::prelude::*;
//!
//! #[derive(Clone, Attributes)]
//! struct Person {
//!     name: String,
//!     age: u32,
//! }
//!
//! let people: RecordCollection<Person> = vec![
//!     Person { name: "John".into(), age: 25 },
//!     Person { name: "Jane".into(), age: 31 },
//! ].into();
//!
//! let jane = people.find_by(&criteria! { "age__gt" => 30 })?;
//! ```

#[allow(unused_extern_crates)]
extern crate self as recordset;

pub mod prelude;

pub use recordset_core::{
    attribute, collection, config, criteria, error, evaluator, mapper, query, record, value,
};
pub use recordset_macros::Attributes;

// Re-export the interchange crates for convenience
pub use bson;
pub use regex;
pub use serde_json;
