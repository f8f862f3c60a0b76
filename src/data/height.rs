//! Height cell parsing.
//!
//! Heights arrive as free text in two flavours:
//!
//! - Yale Myers Forest: a number optionally followed by a note in parentheses,
//!   e.g. `4.5 (crown)`.
//! - Synthesis sheets: a number, a range such as `0.3 - 1.3` (reported as its
//!   midpoint), or a placeholder such as `none`.

/// Parse a Yale Myers Forest height such as `4.5 (crown)`.
pub fn parse_annotated_height(raw: &str) -> Option<f64> {
    let s = raw.trim();
    let s = match s.split_once('(') {
        Some((head, _)) => head.trim(),
        None => s,
    };
    parse_finite(s)
}

/// Parse a synthesis-sheet height, resolving ranges to their midpoint.
pub fn parse_synthesis_height(raw: &str) -> Option<f64> {
    let s = raw.trim();
    if s.is_empty() || s.eq_ignore_ascii_case("none") || s.eq_ignore_ascii_case("nan") {
        return None;
    }
    // Known typo in the published table.
    let s = s.replace("0..6", "0.6");

    if let Some((lo, hi)) = split_range(&s) {
        return Some((lo + hi) / 2.0);
    }
    parse_finite(&s)
}

/// `a - b` where `a` may carry a leading minus and both sides are digits/dots.
fn split_range(s: &str) -> Option<(f64, f64)> {
    let (sign, body) = match s.strip_prefix('-') {
        Some(rest) => (-1.0, rest),
        None => (1.0, s),
    };
    let (left, right) = body.split_once('-')?;
    let left = left.trim_end();
    let right = right.trim_start();
    if !is_decimal_token(left) || !is_decimal_token(right) {
        return None;
    }
    let lo = sign * left.parse::<f64>().ok()?;
    let hi = right.parse::<f64>().ok()?;
    Some((lo, hi))
}

fn is_decimal_token(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit() || c == '.')
}

fn parse_finite(s: &str) -> Option<f64> {
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}
