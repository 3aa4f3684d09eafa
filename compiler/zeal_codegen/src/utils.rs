//! Text helpers shared by the emitters.

/// Escape `s` for use inside a C string literal.
pub fn escape_c_string(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            '\0' => escaped.push_str("\\0"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// `SL("name")`, the string-and-length pair of the current family's helpers.
pub(crate) fn sl(name: &str) -> String {
    format!("SL(\"{}\")", escape_c_string(name))
}

/// `SS("name")`, the legacy hash-key pair (length includes the terminator).
pub(crate) fn ss(name: &str) -> String {
    format!("SS(\"{}\")", escape_c_string(name))
}
