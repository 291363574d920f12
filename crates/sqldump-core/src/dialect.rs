//! MySQL literal and identifier escaping
//!
//! These are the text primitives every dump statement is built from. They
//! follow the rules of `mysql_real_escape_string`. The dump preamble resets
//! `SQL_MODE`, so a replay session always honours backslash escapes whatever
//! mode the source server ran with.

/// Escape a string for inclusion between single quotes.
///
/// Backslash-escapes NUL, newline, carriage return, backslash, both quote
/// characters and Ctrl-Z. The surrounding quotes are not added.
pub fn escape_string(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + text.len() / 8);
    for ch in text.chars() {
        match ch {
            '\0' => escaped.push_str("\\0"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\\' => escaped.push_str("\\\\"),
            '\'' => escaped.push_str("\\'"),
            '"' => escaped.push_str("\\\""),
            '\x1a' => escaped.push_str("\\Z"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Quote an identifier (database, table or column name) with backticks
pub fn quote_identifier(identifier: &str) -> String {
    format!("`{}`", identifier.replace('`', "``"))
}

/// Render raw bytes as a hexadecimal string literal (`X'0aff'`)
pub fn hex_literal(bytes: &[u8]) -> String {
    let mut literal = String::with_capacity(bytes.len() * 2 + 3);
    literal.push_str("X'");
    for b in bytes {
        literal.push_str(&format!("{:02x}", b));
    }
    literal.push('\'');
    literal
}
