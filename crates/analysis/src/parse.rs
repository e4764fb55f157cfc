//! Explicit parsing of free-text model output.

/// First integer in `raw`, clamped to `[min, max]`.
///
/// Model answers such as `"72"`, `"Difficulty: 72/100"` or `"-5"` all parse;
/// text without any digit yields `None`.
pub fn parse_score(raw: &str, min: u32, max: u32) -> Option<u32> {
    let bytes = raw.as_bytes();
    let start = bytes.iter().position(u8::is_ascii_digit)?;
    let end = bytes[start..]
        .iter()
        .position(|b| !b.is_ascii_digit())
        .map_or(bytes.len(), |n| start + n);
    let negative = start > 0 && bytes[start - 1] == b'-';

    if negative {
        return Some(min);
    }
    // Overlong digit runs saturate at the upper bound.
    let value = raw[start..end].parse::<u64>().unwrap_or(u64::MAX);
    Some(value.clamp(u64::from(min), u64::from(max)) as u32)
}

/// Collapse model output into a single trimmed line list, dropping bullets
/// and surrounding quotes.
pub(crate) fn clean_text(raw: &str) -> String {
    raw.lines()
        .map(|line| {
            line.trim()
                .trim_start_matches(['*', '-', '•'])
                .trim()
                .trim_matches('"')
        })
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
