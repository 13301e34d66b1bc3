use syn::parse::Parser;
use syn::{Lit, Meta, punctuated::Punctuated, token::Comma};

/// Struct-level configuration parsed from `#[entity(...)]`.
#[derive(Debug, Default)]
pub(crate) struct EntityAttrs {
    pub name: Option<String>,
    pub name_field: Option<String>,
    pub code_field: Option<String>,
}

/// Field kind requested via `#[entity(...)]` markers. Absent means scalar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum KindAttr {
    Binary,
    Image,
    Reference,
    Collection,
}

/// Field-level configuration parsed from `#[entity(...)]`.
#[derive(Debug, Default)]
pub(crate) struct FieldAttrs {
    pub kind: Option<KindAttr>,
    pub scale: Option<u32>,
    pub name_field: bool,
    pub code_field: bool,
}

/// Parses entity metadata from struct-level attributes.
/// Looks for `#[entity(...)]` attributes and extracts configuration.
pub(crate) fn parse_entity_attrs(attrs: &[syn::Attribute]) -> Result<EntityAttrs, syn::Error> {
    let mut parsed = EntityAttrs::default();

    for attr in attrs {
        if attr.path().is_ident("entity")
            && let Meta::List(meta_list) = &attr.meta
        {
            let metas =
                Punctuated::<Meta, Comma>::parse_terminated.parse2(meta_list.tokens.clone())?;
            for item in metas {
                if let Meta::NameValue(nv) = item {
                    if let syn::Expr::Lit(expr_lit) = &nv.value
                        && let Lit::Str(s) = &expr_lit.lit
                    {
                        let value = s.value();
                        if nv.path.is_ident("name") {
                            parsed.name = Some(value);
                        } else if nv.path.is_ident("name_field") {
                            parsed.name_field = Some(value);
                        } else if nv.path.is_ident("code_field") {
                            parsed.code_field = Some(value);
                        } else {
                            return Err(syn::Error::new_spanned(
                                &nv.path,
                                "unknown entity attribute",
                            ));
                        }
                    }
                } else {
                    return Err(syn::Error::new_spanned(
                        item,
                        "expected `name = \"...\"`, `name_field = \"...\"` or `code_field = \"...\"`",
                    ));
                }
            }
        }
    }
    Ok(parsed)
}

/// Parses field configuration from `#[entity(...)]` attributes on a field.
///
/// Supported forms:
/// - `#[entity(binary)]`, `#[entity(image)]`, `#[entity(reference)]`,
///   `#[entity(collection)]` (kind markers)
/// - `#[entity(scale = 2)]` (declared decimal scale)
/// - `#[entity(name_field)]`, `#[entity(code_field)]` (label designation)
pub(crate) fn parse_field_attrs(field: &syn::Field) -> Result<FieldAttrs, syn::Error> {
    let mut parsed = FieldAttrs::default();

    for attr in &field.attrs {
        if attr.path().is_ident("entity")
            && let Meta::List(meta_list) = &attr.meta
        {
            let metas =
                Punctuated::<Meta, Comma>::parse_terminated.parse2(meta_list.tokens.clone())?;
            for item in metas {
                match item {
                    Meta::Path(path) => {
                        let kind = if path.is_ident("binary") {
                            Some(KindAttr::Binary)
                        } else if path.is_ident("image") {
                            Some(KindAttr::Image)
                        } else if path.is_ident("reference") {
                            Some(KindAttr::Reference)
                        } else if path.is_ident("collection") {
                            Some(KindAttr::Collection)
                        } else {
                            None
                        };
                        if let Some(kind) = kind {
                            if parsed.kind.is_some() {
                                return Err(syn::Error::new_spanned(
                                    path,
                                    "conflicting kind markers on one field",
                                ));
                            }
                            parsed.kind = Some(kind);
                        } else if path.is_ident("name_field") {
                            parsed.name_field = true;
                        } else if path.is_ident("code_field") {
                            parsed.code_field = true;
                        } else {
                            return Err(syn::Error::new_spanned(path, "unknown entity attribute"));
                        }
                    }
                    Meta::NameValue(nv) if nv.path.is_ident("scale") => {
                        if let syn::Expr::Lit(expr_lit) = &nv.value
                            && let Lit::Int(i) = &expr_lit.lit
                        {
                            parsed.scale = Some(i.base10_parse()?);
                        } else {
                            return Err(syn::Error::new_spanned(
                                &nv.value,
                                "scale expects an integer literal",
                            ));
                        }
                    }
                    other => {
                        return Err(syn::Error::new_spanned(other, "unknown entity attribute"));
                    }
                }
            }
        }
    }
    Ok(parsed)
}
