/// Returns true if the field's type is `Option<…>` (including `std::option::Option<…>`).
pub(crate) fn field_is_optional(field: &syn::Field) -> bool {
    if let syn::Type::Path(type_path) = &field.ty {
        // Look at the *last* segment in the path to see if its identifier is "Option"
        if let Some(last_seg) = type_path.path.segments.last() {
            last_seg.ident == "Option"
        } else {
            false
        }
    } else {
        false
    }
}

/// Strips one layer of the named wrapper (`Option<T>`, `Vec<T>`, `Box<T>`)
/// and returns the inner type, or the type itself when it is not wrapped.
pub(crate) fn unwrap_type<'a>(ty: &'a syn::Type, wrapper: &str) -> &'a syn::Type {
    if let syn::Type::Path(type_path) = ty
        && let Some(last_seg) = type_path.path.segments.last()
        && last_seg.ident == wrapper
        && let syn::PathArguments::AngleBracketed(args) = &last_seg.arguments
        && let Some(syn::GenericArgument::Type(inner)) = args.args.first()
    {
        inner
    } else {
        ty
    }
}

/// Resolves the entity type a reference or collection field points at,
/// seeing through `Option`, `Vec`, and `Box` wrappers.
/// For example `Option<Box<Customer>>` and `Vec<Customer>` both resolve to `Customer`.
pub(crate) fn target_type(ty: &syn::Type) -> &syn::Type {
    let ty = unwrap_type(ty, "Option");
    let ty = unwrap_type(ty, "Vec");
    unwrap_type(ty, "Box")
}

/// Last path segment identifier of a type, used as the target type name in
/// the property table.
pub(crate) fn type_name(ty: &syn::Type) -> Option<String> {
    if let syn::Type::Path(type_path) = ty {
        type_path
            .path
            .segments
            .last()
            .map(|seg| seg.ident.to_string())
    } else {
        None
    }
}

/// Returns true if the type (after unwrapping `Option`) is a `Decimal`.
pub(crate) fn is_decimal(ty: &syn::Type) -> bool {
    type_name(unwrap_type(ty, "Option")).as_deref() == Some("Decimal")
}
