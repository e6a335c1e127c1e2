/// Wraps a string in double quotes, escaping backslashes and quotes.
pub fn wrap_value(value: &str) -> String {
    // Escape backslashes first so the quote escapes survive.
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Formats a list as `[a, b, c]` for log fields.
pub fn bracket_list<S: AsRef<str>>(items: &[S]) -> String {
    let joined = items
        .iter()
        .map(|s| s.as_ref())
        .collect::<Vec<_>>()
        .join(", ");
    format!("[{}]", joined)
}

/// Drops empty strings, keeping the order of the rest.
pub fn non_empty(items: Vec<String>) -> Vec<String> {
    items.into_iter().filter(|s| !s.is_empty()).collect()
}
