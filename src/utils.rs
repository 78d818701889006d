//! Shared utility functions used across modules.

use crate::constants::SPINNER_CHARS;

/// Keep the first `max_chars` characters of `s`.
///
/// Counts Unicode scalar values, so a multi-byte character is never split.
pub fn take_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Truncate a string to `max_len` characters, appending "..." if truncated.
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len > 3 {
        format!("{}...", take_chars(s, max_len - 3))
    } else {
        take_chars(s, max_len).to_string()
    }
}

/// Get the spinner character for the current tick.
pub fn spinner_char(tick: u64) -> &'static str {
    SPINNER_CHARS[(tick % SPINNER_CHARS.len() as u64) as usize]
}

/// Get animated loading dots for the current tick.
pub fn loading_dots(tick: u64) -> &'static str {
    match tick % 4 {
        0 => "",
        1 => ".",
        2 => "..",
        _ => "...",
    }
}
