// Resource services
pub mod items;
pub mod products;

pub use items::{ItemParams, ItemService};
pub use products::{ProductParams, ProductService};

use validator::ValidationErrors;

/// Trims a submitted value, treating blank input as absent
pub(crate) fn normalize_optional_string(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .and_then(|v| if v.is_empty() { None } else { Some(v) })
}

/// Flattens validation errors into `"<Field> <message>"` strings, ordered by `fields`
pub(crate) fn full_messages(errors: &ValidationErrors, fields: &[&'static str]) -> Vec<String> {
    let field_errors = errors.field_errors();

    fields
        .iter()
        .filter_map(|field| field_errors.get(*field).map(|errs| (*field, errs)))
        .flat_map(|(field, errs)| {
            errs.iter().map(move |err| {
                let message = err
                    .message
                    .as_deref()
                    .unwrap_or_else(|| err.code.as_ref());
                format!("{} {}", humanize(field), message)
            })
        })
        .collect()
}

fn humanize(field: &str) -> String {
    let words = field.replace('_', " ");
    let mut chars = words.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
