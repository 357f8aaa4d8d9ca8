//! String utility functions

/// Uppercase the first character and lowercase the rest
///
/// ```
/// use beerpy_server::utils::string::capitalize;
///
/// assert_eq!(capitalize("email"), "Email");
/// assert_eq!(capitalize("USER"), "User");
/// ```
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Truncate text to max length with ellipsis
pub fn truncate(text: &str, max_len: usize) -> String {
    let text = text.trim();
    if text.chars().count() > max_len {
        format!("{}...", text.chars().take(max_len).collect::<String>())
    } else {
        text.to_string()
    }
}
