//! Naming rules shared by the generators

use heck::ToSnakeCase;

/// Uppercase the first character, leaving the rest untouched.
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// English plural of a type name, good enough for identifiers.
pub fn pluralize(word: &str) -> String {
    let lower = word.to_ascii_lowercase();
    if lower.ends_with('y')
        && !lower.ends_with("ay")
        && !lower.ends_with("ey")
        && !lower.ends_with("oy")
        && !lower.ends_with("uy")
    {
        format!("{}ies", &word[..word.len() - 1])
    } else if lower.ends_with('s')
        || lower.ends_with('x')
        || lower.ends_with('z')
        || lower.ends_with("ch")
        || lower.ends_with("sh")
    {
        format!("{}es", word)
    } else {
        format!("{}s", word)
    }
}

/// Table name for an object type: snake_case plural (`BookReview` -> `book_reviews`).
pub fn table_name(type_name: &str) -> String {
    pluralize(type_name).to_snake_case()
}

/// Reference column for a relation field (`author` -> `author_id`).
pub fn foreign_key_column(name: &str) -> String {
    format!("{}_id", name.to_snake_case())
}
