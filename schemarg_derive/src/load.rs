mod args;
mod attribute;
mod field;

fn incompatible_error(field_name: &syn::Ident, left: &str, right: &str) -> syn::Error {
    syn::Error::new(
        field_name.span(),
        format!("Invalid - field cannot be both `{left}` and `{right}`."),
    )
}
