// Utility helpers for parsing, basic statistics and text layout.
//
// This module centralizes the "dirty" cell handling so the rest of the code
// can assume clean, typed values.
use num_format::{Locale, ToFormattedString};

/// Parse a spreadsheet cell into `f64`, forgiving the formatting issues that
/// are common in CSV exports.
///
/// - Accepts `Option<&str>` so callers can pass through optional fields.
/// - Trims whitespace.
/// - Retries without thousands separators like `","` if the plain parse
///   fails, but only when the commas sit on three-digit group boundaries
///   (`1,234.5` parses, `1,2,3` does not).
/// - Returns `None` for anything that cannot be parsed or is not finite
///   (`NaN`, `inf`).
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    let v = match s.parse::<f64>() {
        Ok(v) => v,
        Err(_) if has_thousands_groups(s) => s.replace(',', "").parse::<f64>().ok()?,
        Err(_) => return None,
    };
    v.is_finite().then_some(v)
}

// `[-+]d{1,3}(,ddd)+` before an optional fractional part.
fn has_thousands_groups(s: &str) -> bool {
    let unsigned = s.strip_prefix(['-', '+']).unwrap_or(s);
    let int_part = unsigned.split('.').next().unwrap_or("");
    let mut groups = int_part.split(',');
    let lead_ok = groups
        .next()
        .is_some_and(|g| (1..=3).contains(&g.len()) && g.bytes().all(|b| b.is_ascii_digit()));
    let mut rest = groups.peekable();
    lead_ok
        && rest.peek().is_some()
        && rest.all(|g| g.len() == 3 && g.bytes().all(|b| b.is_ascii_digit()))
}

/// Linear-interpolation quantile of an ascending slice, `p` in `[0, 1]`.
///
/// Matches the usual "closest ranks with interpolation" definition: the
/// position is `(n - 1) * p` and the result interpolates between its floor
/// and ceiling neighbours.
pub fn quantile_sorted(sorted: &[f64], p: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let h = (sorted.len() - 1) as f64 * p.clamp(0.0, 1.0);
    let lo = h.floor() as usize;
    let hi = h.ceil() as usize;
    Some(sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo]))
}

/// Sort a copy of the finite values ascending.
pub fn sorted_values(v: &[f64]) -> Vec<f64> {
    let mut out: Vec<f64> = v.iter().copied().filter(|x| x.is_finite()).collect();
    // All values are finite here so `total_cmp` agrees with numeric order.
    out.sort_by(|a, b| a.total_cmp(b));
    out
}

pub fn median(v: &[f64]) -> Option<f64> {
    quantile_sorted(&sorted_values(v), 0.5)
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Format a floating-point value with:
    // - a fixed number of decimal places, and
    // - locale-aware thousands separators (e.g., `1,234,567.89`).
    let abs_n = n.abs();
    // First, format to a plain fixed-decimal string like `1234567.89`.
    let s = format!("{:.*}", decimals, abs_n);
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    // Use `num-format` to insert commas into the integer portion; past the
    // `u64` range the digit string is grouped directly.
    let mut res = match int_part.parse::<u64>() {
        Ok(int_val) => int_val.to_formatted_string(&Locale::en),
        Err(_) => group_digits(int_part),
    };
    if let Some(frac) = frac_part {
        if decimals > 0 {
            res.push('.');
            res.push_str(frac);
        }
    }
    // Values that round to zero print without a sign.
    let rounds_to_zero = s.chars().all(|c| c == '0' || c == '.');
    if n.is_sign_negative() && !rounds_to_zero {
        format!("-{}", res)
    } else {
        res
    }
}

// "12345678" -> "12,345,678"
fn group_digits(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}

/// Greedy word wrap to at most `max_chars` characters per line.
///
/// A single word longer than `max_chars` gets a line of its own rather than
/// being split. Empty or whitespace-only input yields no lines.
pub fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut cur = String::new();
    let mut cur_len = 0usize;
    for word in text.split_whitespace() {
        let wlen = word.chars().count();
        let sep = usize::from(cur_len > 0);
        if cur_len + sep + wlen <= max_chars || cur_len == 0 {
            if sep == 1 {
                cur.push(' ');
            }
            cur.push_str(word);
            cur_len += sep + wlen;
        } else {
            lines.push(std::mem::take(&mut cur));
            cur.push_str(word);
            cur_len = wlen;
        }
    }
    if !cur.is_empty() {
        lines.push(cur);
    }
    lines
}
