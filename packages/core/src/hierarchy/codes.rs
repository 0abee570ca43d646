//! Code Allocation
//!
//! Computes the next free numeric `code` / `code_number` from the current
//! snapshot. Codes come from one global sequence shared by every level.
//!
//! The allocator is a read-time max scan, not a persisted counter: two
//! callers allocating from the same snapshot receive the same code, and the
//! loser's insert is rejected as a duplicate key by the store.

use crate::models::Locality;

/// Parse the leading integer of a code.
///
/// Leading whitespace and a sign are accepted, and parsing stops at the first
/// non-digit, so `"12b"` is 12. Returns `None` when no digits lead the string
/// or the value does not fit an `i64`; the allocator ignores such oversized
/// codes the same way it ignores non-numeric legacy codes.
pub fn parse_code(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    if digits_end == 0 {
        return None;
    }

    let value: i64 = rest[..digits_end].parse().ok()?;
    Some(if negative { -value } else { value })
}

/// Next unused `code`: one past the largest numeric code, or `"1"`.
pub fn next_code(localities: &[Locality]) -> String {
    next_in_sequence(localities.iter().map(|l| l.code.as_str()))
}

/// Next unused `code_number`, computed independently of `code`.
pub fn next_code_number(localities: &[Locality]) -> String {
    next_in_sequence(localities.iter().map(|l| l.code_number.as_str()))
}

fn next_in_sequence<'a>(codes: impl Iterator<Item = &'a str>) -> String {
    match codes.filter_map(parse_code).max() {
        Some(max) => max.saturating_add(1).to_string(),
        None => "1".to_string(),
    }
}
