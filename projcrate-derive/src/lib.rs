mod attribute_parser;
mod field_analyzer;

use proc_macro::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields, parse_macro_input};

use attribute_parser::KindAttr;

/// Derives the `projcrate::Entity` trait for a struct with named fields.
///
/// Builds the static property-descriptor table at compile time and generates
/// the `id`/`version`/`get` accessors. The struct must declare
/// `id: Option<i64>` and `version: Option<i64>` fields.
///
/// ```rust,ignore
/// #[derive(Entity)]
/// pub struct Contact {
///     pub id: Option<i64>,
///     pub version: Option<i64>,
///     pub name: Option<String>,
///     pub code: Option<String>,
///     #[entity(scale = 2)]
///     pub balance: Option<Decimal>,
///     #[entity(reference)]
///     pub title: Option<Title>,
///     #[entity(collection)]
///     pub addresses: Vec<Address>,
/// }
/// ```
#[proc_macro_derive(Entity, attributes(entity))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

struct FieldInfo<'a> {
    field: &'a syn::Field,
    ident: &'a syn::Ident,
    name: String,
    kind: Option<KindAttr>,
    scale: Option<u32>,
    optional: bool,
}

fn expand(input: &DeriveInput) -> Result<proc_macro2::TokenStream, syn::Error> {
    let ident = &input.ident;

    let Data::Struct(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            ident,
            "Entity can only be derived for structs",
        ));
    };
    let Fields::Named(named) = &data.fields else {
        return Err(syn::Error::new_spanned(
            ident,
            "Entity requires named fields",
        ));
    };

    let struct_attrs = attribute_parser::parse_entity_attrs(&input.attrs)?;
    let entity_name = struct_attrs.name.unwrap_or_else(|| ident.to_string());

    let mut infos = Vec::new();
    let mut name_field = struct_attrs.name_field;
    let mut code_field = struct_attrs.code_field;

    for field in &named.named {
        let field_ident = field.ident.as_ref().expect("named field");
        let attrs = attribute_parser::parse_field_attrs(field)?;
        let name = field_ident.to_string();

        if attrs.name_field && name_field.is_none() {
            name_field = Some(name.clone());
        }
        if attrs.code_field && code_field.is_none() {
            code_field = Some(name.clone());
        }

        infos.push(FieldInfo {
            field,
            ident: field_ident,
            name,
            kind: attrs.kind,
            scale: attrs.scale,
            optional: field_analyzer::field_is_optional(field),
        });
    }

    for required in ["id", "version"] {
        if !infos.iter().any(|f| f.name == required) {
            return Err(syn::Error::new_spanned(
                ident,
                format!("Entity requires a `{required}: Option<i64>` field"),
            ));
        }
    }

    // The label lookups default to the properties literally named "name"
    // and "code" when nothing was designated explicitly.
    if name_field.is_none() && infos.iter().any(|f| f.name == "name") {
        name_field = Some("name".to_string());
    }
    if code_field.is_none() && infos.iter().any(|f| f.name == "code") {
        code_field = Some("code".to_string());
    }

    let properties: Vec<proc_macro2::TokenStream> = infos
        .iter()
        .map(property_entry)
        .collect::<Result<_, _>>()?;
    let arms: Vec<proc_macro2::TokenStream> = infos
        .iter()
        .map(|info| accessor_arm(info, &entity_name))
        .collect();

    let name_field = option_str(name_field.as_deref());
    let code_field = option_str(code_field.as_deref());

    Ok(quote! {
        #[automatically_derived]
        impl projcrate::Entity for #ident {
            fn meta(&self) -> &'static projcrate::EntityMeta {
                static META: projcrate::EntityMeta = projcrate::EntityMeta {
                    name: #entity_name,
                    properties: &[#(#properties),*],
                    name_field: #name_field,
                    code_field: #code_field,
                };
                &META
            }

            fn id(&self) -> ::core::option::Option<i64> {
                self.id
            }

            fn version(&self) -> ::core::option::Option<i64> {
                self.version
            }

            fn get(
                &self,
                name: &str,
            ) -> ::core::result::Result<projcrate::PropertyValue<'_>, projcrate::AccessError>
            {
                match name {
                    #(#arms)*
                    _ => ::core::result::Result::Err(
                        projcrate::AccessError::unknown_property(#entity_name, name),
                    ),
                }
            }

            fn resolve(&self) -> &dyn projcrate::Entity {
                self
            }
        }
    })
}

fn option_str(value: Option<&str>) -> proc_macro2::TokenStream {
    match value {
        Some(s) => quote! { ::core::option::Option::Some(#s) },
        None => quote! { ::core::option::Option::None },
    }
}

/// One `projcrate::Property` entry of the static descriptor table.
fn property_entry(info: &FieldInfo) -> Result<proc_macro2::TokenStream, syn::Error> {
    let name = &info.name;
    let kind = match info.kind {
        None => quote! { projcrate::PropertyKind::Scalar },
        Some(KindAttr::Binary) => quote! { projcrate::PropertyKind::Binary },
        Some(KindAttr::Image) => quote! { projcrate::PropertyKind::Image },
        Some(KindAttr::Reference) => {
            let target = relation_target(info)?;
            quote! { projcrate::PropertyKind::Reference { target: #target } }
        }
        Some(KindAttr::Collection) => {
            let target = relation_target(info)?;
            quote! { projcrate::PropertyKind::Collection { target: #target } }
        }
    };
    let scale = match info.scale {
        Some(scale) => quote! { ::core::option::Option::Some(#scale) },
        None => quote! { ::core::option::Option::None },
    };
    Ok(quote! {
        projcrate::Property { name: #name, kind: #kind, scale: #scale }
    })
}

fn relation_target(info: &FieldInfo) -> Result<String, syn::Error> {
    field_analyzer::type_name(field_analyzer::target_type(&info.field.ty)).ok_or_else(|| {
        syn::Error::new_spanned(&info.field.ty, "cannot resolve relation target type")
    })
}

/// One `match` arm of the generated `get` accessor.
fn accessor_arm(info: &FieldInfo, entity_name: &str) -> proc_macro2::TokenStream {
    let name = &info.name;
    let ident = info.ident;

    let value = match info.kind {
        None if field_analyzer::is_decimal(&info.field.ty) => {
            if info.optional {
                quote! {
                    match self.#ident {
                        ::core::option::Option::Some(value) => {
                            projcrate::PropertyValue::Decimal(value)
                        }
                        ::core::option::Option::None => projcrate::PropertyValue::Scalar(
                            projcrate::serde_json::Value::Null,
                        ),
                    }
                }
            } else {
                quote! { projcrate::PropertyValue::Decimal(self.#ident) }
            }
        }
        None => quote! {
            projcrate::PropertyValue::Scalar(
                projcrate::serde_json::to_value(&self.#ident)
                    .map_err(|e| projcrate::AccessError::scalar(#entity_name, #name, e))?,
            )
        },
        Some(KindAttr::Binary) => bytes_accessor(info, quote! { projcrate::PropertyValue::Binary }),
        Some(KindAttr::Image) => bytes_accessor(info, quote! { projcrate::PropertyValue::Image }),
        Some(KindAttr::Reference) => {
            if info.optional {
                quote! {
                    projcrate::PropertyValue::Reference(
                        self.#ident
                            .as_ref()
                            .map(|value| value as &dyn projcrate::Entity),
                    )
                }
            } else {
                quote! {
                    projcrate::PropertyValue::Reference(::core::option::Option::Some(
                        &self.#ident as &dyn projcrate::Entity,
                    ))
                }
            }
        }
        Some(KindAttr::Collection) => {
            if info.optional {
                quote! {
                    match &self.#ident {
                        ::core::option::Option::Some(items) => projcrate::PropertyValue::Collection(
                            items
                                .iter()
                                .map(|value| value as &dyn projcrate::Entity)
                                .collect(),
                        ),
                        ::core::option::Option::None => projcrate::PropertyValue::Scalar(
                            projcrate::serde_json::Value::Null,
                        ),
                    }
                }
            } else {
                quote! {
                    projcrate::PropertyValue::Collection(
                        self.#ident
                            .iter()
                            .map(|value| value as &dyn projcrate::Entity)
                            .collect(),
                    )
                }
            }
        }
    };

    quote! {
        #name => ::core::result::Result::Ok(#value),
    }
}

fn bytes_accessor(info: &FieldInfo, variant: proc_macro2::TokenStream) -> proc_macro2::TokenStream {
    let ident = info.ident;
    if info.optional {
        quote! {
            match &self.#ident {
                ::core::option::Option::Some(bytes) => #variant(bytes.as_slice()),
                ::core::option::Option::None => projcrate::PropertyValue::Scalar(
                    projcrate::serde_json::Value::Null,
                ),
            }
        }
    } else {
        quote! { #variant(self.#ident.as_slice()) }
    }
}
