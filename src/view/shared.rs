/// Shorten `s` to its first and last `max_len / 2` characters joined by "…",
/// if it is longer than `max_len` characters. Safe for multi-byte UTF-8.
pub fn truncate_middle(s: &str, max_len: usize) -> String {
    let char_count = s.chars().count();
    if char_count <= max_len {
        return s.to_string();
    }
    let half = max_len / 2;
    let head: String = s.chars().take(half).collect();
    let tail: String = s.chars().skip(char_count - half).collect();
    format!("{}…{}", head, tail)
}

/// Column at which `text` must start to end flush with the right edge.
pub fn right_align(text: &str, width: u16) -> u16 {
    width.saturating_sub(text.chars().count() as u16)
}
