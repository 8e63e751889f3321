/// Escapes characters that are unsafe in file names.
///
/// Replaced characters:
/// - `/`, `\` -> `_` (path separators)
/// - `:`, `*`, `?`, `<`, `>`, `|` -> `_` (reserved on Windows)
/// - `"` -> `'`
/// - control characters (0x00-0x1F) -> `_`
///
/// Leading/trailing whitespace and dots are trimmed; an empty result
/// becomes `"unnamed"`.
pub fn escape_filename(filename: &str) -> String {
    let mut result = String::with_capacity(filename.len());

    for c in filename.chars() {
        match c {
            '/' | '\\' => result.push('_'),
            ':' | '*' | '?' | '<' | '>' | '|' => result.push('_'),
            '"' => result.push('\''),
            c if c.is_control() => result.push('_'),
            _ => result.push(c),
        }
    }

    let result = result.trim_matches(|c: char| c.is_whitespace() || c == '.');

    if result.is_empty() {
        "unnamed".to_string()
    } else {
        result.to_string()
    }
}

/// Returns the first `max_chars` characters of `s`, never splitting a
/// multi-byte character.
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Converts a byte count to whole megabytes, rounded to the nearest MB.
///
/// Display only; limit enforcement compares raw bytes.
pub fn bytes_to_mb(bytes: u64) -> u64 {
    (bytes as f64 / (1024.0 * 1024.0)).round() as u64
}
