//! Parsing of the `#[attribute(...)]` field attributes.

use syn::{
    Attribute, Error, Expr, ExprLit, Lit, Meta, Result, Token,
    parse::{Parse, ParseStream},
    punctuated::Punctuated,
    spanned::Spanned,
};

/// Field-level options from `#[attribute(...)]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldAttr {
    /// The field is not exposed.
    pub skip: bool,
    /// Name the field is exposed under (default: the field name).
    pub rename: Option<String>,
}

impl Parse for FieldAttr {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut attr = FieldAttr::default();

        let content: Punctuated<Meta, Token![,]> = Punctuated::parse_terminated(input)?;

        for meta in content {
            match &meta {
                Meta::Path(path) if path.is_ident("skip") => {
                    attr.skip = true;
                }
                Meta::NameValue(nv) if nv.path.is_ident("rename") => match &nv.value {
                    Expr::Lit(ExprLit { lit: Lit::Str(name), .. }) => {
                        if name.value().is_empty() {
                            return Err(Error::new(name.span(), "rename must not be empty"));
                        }
                        attr.rename = Some(name.value());
                    }
                    other => {
                        return Err(Error::new(other.span(), "rename must be a string literal"));
                    }
                },
                _ => {
                    return Err(Error::new(
                        meta.span(),
                        "unknown attribute option. Expected: skip or rename = \"...\"",
                    ));
                }
            }
        }

        Ok(attr)
    }
}

/// Extracts the `#[attribute(...)]` options of a field.
pub fn parse_field_attrs(attrs: &[Attribute]) -> Result<FieldAttr> {
    for attr in attrs {
        if attr.path().is_ident("attribute") {
            return attr.parse_args::<FieldAttr>();
        }
    }
    Ok(FieldAttr::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(tokens: &str) -> Result<FieldAttr> {
        syn::parse_str::<FieldAttr>(tokens)
    }

    #[test]
    fn skip() {
        let attr = parse("skip").unwrap();
        assert!(attr.skip);
        assert_eq!(attr.rename, None);
    }

    #[test]
    fn rename() {
        let attr = parse(r#"rename = "years""#).unwrap();
        assert!(!attr.skip);
        assert_eq!(attr.rename.as_deref(), Some("years"));
    }

    #[test]
    fn empty_rename_is_rejected() {
        let err = parse(r#"rename = """#).unwrap_err();
        assert!(err.to_string().contains("must not be empty"));
    }

    #[test]
    fn non_literal_rename_is_rejected() {
        assert!(parse("rename = years").is_err());
    }

    #[test]
    fn unknown_option_is_rejected() {
        let err = parse("flatten").unwrap_err();
        assert!(err.to_string().contains("unknown attribute option"));
    }

    #[test]
    fn field_without_attribute_uses_defaults() {
        let field: syn::Field = syn::parse_quote! {
            #[serde(default)]
            name: String
        };
        assert_eq!(parse_field_attrs(&field.attrs).unwrap(), FieldAttr::default());
    }
}
