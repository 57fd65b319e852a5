//! Procedural macros for the recordset project.
//!
//! This crate provides compile-time code generation for the recordset
//! framework. It is re-exported by the `recordset` crate and is not meant to be
//! depended on directly.
//!
//! # Available Macros
//!
//! - [`Attributes`] - Make a plain struct queryable by implementing `AttributeReadable`

#[allow(unused_extern_crates)]
extern crate self as recordset_macros;

mod attrs;
mod derive;

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

/// Derives `AttributeReadable` for a struct with named fields.
///
/// Every field becomes an attribute readable by queries, ordering and
/// `distinct`. Field values are cloned and converted with `Value::from`, so each
/// field type must implement `Clone` and `Into<Value>`.
///
/// The derive also adds an `ATTRIBUTES` constant listing the attribute names
/// in declaration order.
///
/// # Field Attributes
///
/// | Attribute | Effect |
/// |-----------|--------|
/// | `#[attribute(skip)]` | The field is not readable |
/// | `#[attribute(rename = "...")]` | The field is readable under another name |
///
/// # Example
///
/// ```ignore
/// use recordset::prelude::*;
///
/// #[derive(Clone, Attributes)]
/// struct Person {
///     name: String,
///     #[attribute(rename = "years")]
///     age: u32,
///     #[attribute(skip)]
///     password: String,
/// }
///
/// assert_eq!(Person::ATTRIBUTES, &["name", "years"]);
///
/// let people: RecordCollection<Person> = load_people().into();
/// let adults = people.filter_by(&criteria! { "years__gte" => 18 })?;
/// ```
#[proc_macro_derive(Attributes, attributes(attribute))]
pub fn attributes_derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    derive::attributes_derive_impl(input)
        .unwrap_or_else(|err| err.to_compile_error())
        .into()
}
