//! Human-readable byte sizes and durations.

use serde_json::Value;

const BYTE_UNITS: [&str; 9] = ["B", "kB", "MB", "GB", "TB", "PB", "EB", "ZB", "YB"];

/// Format a byte count with decimal (power of 1000) units, e.g. `1.2 kB`.
///
/// Values of ten or more in the chosen unit, and whole values, are shown
/// without decimals; everything else keeps one decimal.
pub fn format_bytes(bytes: i64) -> String {
    let sign = if bytes < 0 { "-" } else { "" };
    let mut num = bytes.unsigned_abs() as f64;
    if num < 1.0 {
        return format!("{}{} B", sign, num);
    }

    let exponent = ((num.ln() / 1000f64.ln()).floor() as usize).min(BYTE_UNITS.len() - 1);
    num /= 1000f64.powi(exponent as i32);
    let unit = BYTE_UNITS[exponent];

    if num >= 10.0 || num.fract() == 0.0 {
        format!("{}{:.0} {}", sign, num, unit)
    } else {
        format!("{}{:.1} {}", sign, num, unit)
    }
}

/// Format a millisecond count, e.g. `120ms`, `1.5s`, `1m 5.4s`, `2h 3m`.
pub fn format_millis(millis: i64) -> String {
    let sign = if millis < 0 { "-" } else { "" };
    let ms = millis.unsigned_abs();

    if ms < 1000 {
        return format!("{}{}ms", sign, ms);
    }

    let total_secs = ms / 1000;
    let days = total_secs / 86_400;
    let parts = [
        (days / 365, "y"),
        (days % 365, "d"),
        ((total_secs / 3600) % 24, "h"),
        ((total_secs / 60) % 60, "m"),
    ];

    let mut out: Vec<String> = parts
        .iter()
        .filter(|(value, _)| *value > 0)
        .map(|(value, unit)| format!("{}{}", value, unit))
        .collect();

    // Seconds are floored to one decimal and lose a trailing `.0`.
    let tenths = (ms % 60_000) / 100;
    if tenths > 0 {
        if tenths % 10 == 0 {
            out.push(format!("{}s", tenths / 10));
        } else {
            out.push(format!("{}.{}s", tenths / 10, tenths % 10));
        }
    }

    format!("{}{}", sign, out.join(" "))
}

/// Permissive integer parse used for size and latency fields.
///
/// Numbers are truncated toward zero. Strings yield their leading integer
/// (`"120ms"` is 120, `" 42"` is 42). Values outside the `i64` range and
/// anything else are `None`.
pub fn parse_leading_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(truncate_to_i64)),
        Value::String(s) => {
            let s = s.trim_start();
            let (negative, digits) = match s.as_bytes().first() {
                Some(b'-') => (true, &s[1..]),
                Some(b'+') => (false, &s[1..]),
                _ => (false, s),
            };
            let end = digits
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(digits.len());
            let parsed: i64 = digits[..end].parse().ok()?;
            Some(if negative { -parsed } else { parsed })
        }
        _ => None,
    }
}

/// Truncate a float toward zero, refusing values that do not fit an `i64`.
pub(crate) fn truncate_to_i64(f: f64) -> Option<i64> {
    let t = f.trunc();
    // i64::MAX as f64 rounds up to 2^63, which is already out of range.
    if t.is_finite() && t >= i64::MIN as f64 && t < i64::MAX as f64 {
        Some(t as i64)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(999), "999 B");
        assert_eq!(format_bytes(1000), "1 kB");
        assert_eq!(format_bytes(1234), "1.2 kB");
        assert_eq!(format_bytes(12_345), "12 kB");
        assert_eq!(format_bytes(5_500_000), "5.5 MB");
        assert_eq!(format_bytes(-1234), "-1.2 kB");
    }

    #[test]
    fn millis() {
        assert_eq!(format_millis(0), "0ms");
        assert_eq!(format_millis(120), "120ms");
        assert_eq!(format_millis(1000), "1s");
        assert_eq!(format_millis(1500), "1.5s");
        assert_eq!(format_millis(1599), "1.5s");
        assert_eq!(format_millis(61_000), "1m 1s");
        assert_eq!(format_millis(65_432), "1m 5.4s");
        assert_eq!(format_millis(3_600_000), "1h");
        assert_eq!(format_millis(90_061_000), "1d 1h 1m 1s");
        assert_eq!(format_millis(-5), "-5ms");
    }

    #[test]
    fn leading_int() {
        assert_eq!(parse_leading_int(&json!(120)), Some(120));
        assert_eq!(parse_leading_int(&json!(120.9)), Some(120));
        assert_eq!(parse_leading_int(&json!("120ms")), Some(120));
        assert_eq!(parse_leading_int(&json!("  -7")), Some(-7));
        assert_eq!(parse_leading_int(&json!("abc")), None);
        assert_eq!(parse_leading_int(&json!("")), None);
        assert_eq!(parse_leading_int(&json!(true)), None);
        assert_eq!(parse_leading_int(&json!({"n": 1})), None);
    }

    #[test]
    fn leading_int_rejects_out_of_range() {
        assert_eq!(parse_leading_int(&json!(1e300)), None);
        assert_eq!(parse_leading_int(&json!(-1e300)), None);
        assert_eq!(parse_leading_int(&json!(u64::MAX)), None);
        assert_eq!(parse_leading_int(&json!("99999999999999999999")), None);
        assert_eq!(parse_leading_int(&json!(i64::MAX)), Some(i64::MAX));
        assert_eq!(parse_leading_int(&json!(9.0e15)), Some(9_000_000_000_000_000));
    }
}
