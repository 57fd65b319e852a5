//! Implementation of `#[derive(Attributes)]`.

use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Error, Fields, Result, spanned::Spanned};

use crate::attrs::parse_field_attrs;

pub fn attributes_derive_impl(input: DeriveInput) -> Result<TokenStream> {
    let struct_name = &input.ident;
    let kind = struct_name.to_string();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return Err(Error::new(
                    input.span(),
                    "Attributes can only be derived for structs with named fields",
                ));
            }
        },
        _ => {
            return Err(Error::new(input.span(), "Attributes can only be derived for structs"));
        }
    };

    let mut names: Vec<String> = Vec::new();
    let mut arms: Vec<TokenStream> = Vec::new();

    for field in fields {
        let field_name = field
            .ident
            .as_ref()
            .ok_or_else(|| Error::new(field.span(), "expected named field"))?;

        let attr = parse_field_attrs(&field.attrs)?;
        if attr.skip {
            continue;
        }

        let exposed = attr.rename.unwrap_or_else(|| field_name.to_string());
        if names.contains(&exposed) {
            return Err(Error::new(field.span(), format!("duplicate attribute name '{exposed}'")));
        }

        arms.push(quote! {
            #exposed => ::core::option::Option::Some(::std::borrow::Cow::Owned(
                ::recordset::value::Value::from(::core::clone::Clone::clone(&self.#field_name))
            )),
        });
        names.push(exposed);
    }

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics #struct_name #ty_generics #where_clause {
            /// Attribute names readable on this type, in declaration order.
            pub const ATTRIBUTES: &'static [&'static str] = &[#(#names),*];
        }

        impl #impl_generics ::recordset::attribute::AttributeReadable for #struct_name #ty_generics #where_clause {
            fn attribute(
                &self,
                name: &str,
            ) -> ::core::option::Option<::std::borrow::Cow<'_, ::recordset::value::Value>> {
                match name {
                    #(#arms)*
                    _ => ::core::option::Option::None,
                }
            }

            fn kind(&self) -> &'static str {
                #kind
            }
        }
    })
}
