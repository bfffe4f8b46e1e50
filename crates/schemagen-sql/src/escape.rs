//! Identifier and literal quoting for MySQL DDL

/// Quote an identifier with backticks, doubling embedded backticks.
pub fn quote_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// Quote a comma-separated identifier list, e.g. for index columns.
pub fn quote_identifiers<S: AsRef<str>>(names: &[S]) -> String {
    names
        .iter()
        .map(|n| quote_identifier(n.as_ref()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Quote a string literal with single quotes.
pub fn quote_literal(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 2);
    result.push('\'');
    for c in s.chars() {
        match c {
            '\\' => result.push_str("\\\\"),
            '\'' => result.push_str("''"),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            '\0' => result.push_str("\\0"),
            c => result.push(c),
        }
    }
    result.push('\'');
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_identifier() {
        assert_eq!(quote_identifier("authors"), "`authors`");
        assert_eq!(quote_identifier("odd`name"), "`odd``name`");
    }

    #[test]
    fn test_quote_identifiers() {
        assert_eq!(quote_identifiers(&["handle", "org"]), "`handle`, `org`");
    }

    #[test]
    fn test_quote_literal() {
        assert_eq!(quote_literal("hello"), "'hello'");
        assert_eq!(quote_literal("it's"), "'it''s'");
        assert_eq!(quote_literal(r"C:\tmp"), r"'C:\\tmp'");
    }
}
