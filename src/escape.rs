use std::fmt::Write;

/// Escapes `s` so it fits in a single field of a tab-separated line.
///
/// Backslash, tab, line feed and carriage return use their C escapes; other
/// control characters (all below U+00A0) become `\xNN`.
pub fn escape_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            c if c.is_control() => {
                let _ = write!(out, "\\x{:02x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out
}
