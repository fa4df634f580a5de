//! Text helpers for building inline probe bodies.

/// Formats a byte count with binary units, rounded to two decimals.
///
/// ```text
/// 0        -> "0 B"
/// 1536     -> "1.5 KB"
/// 5242880  -> "5 MB"
/// ```
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = (value * 100.0).round() / 100.0;
    if rounded.fract() == 0.0 {
        format!("{} {}", rounded as u64, UNITS[unit])
    } else {
        // Trim trailing zeros ("1.50" -> "1.5")
        let text = format!("{:.2}", rounded);
        format!(
            "{} {}",
            text.trim_end_matches('0').trim_end_matches('.'),
            UNITS[unit]
        )
    }
}

/// Returns the first `max_chars` characters of `text`, or `None` when the
/// text is already short enough.
pub fn truncate_chars(text: &str, max_chars: usize) -> Option<&str> {
    text.char_indices()
        .nth(max_chars)
        .map(|(byte_index, _)| &text[..byte_index])
}
