/// One tolerance for everything
#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: f64,
    pub rel: f64,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

pub fn nearly_equal(a: f64, b: f64, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

/// `v` if finite, else 0. Stored numbers are always finite.
pub fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() { v } else { 0.0 }
}

/// Parse user-entered text into a number, never failing.
///
/// Leading whitespace is skipped and the longest decimal prefix is used, so
/// `"2.5 m"` reads as 2.5. Empty, unparsable, or non-finite input yields 0.
pub fn parse_lenient(input: &str) -> f64 {
    let s = input.trim_start();
    let bytes = s.as_bytes();
    let mut pos = 0;

    let negative = match bytes.first() {
        Some(b'-') => {
            pos = 1;
            true
        }
        Some(b'+') => {
            pos = 1;
            false
        }
        _ => false,
    };

    let int_start = pos;
    while pos < bytes.len() && bytes[pos].is_ascii_digit() {
        pos += 1;
    }
    let int_part = &s[int_start..pos];

    let mut frac_part = "";
    if pos < bytes.len() && bytes[pos] == b'.' {
        let frac_start = pos + 1;
        let mut end = frac_start;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
        frac_part = &s[frac_start..end];
        if !frac_part.is_empty() || !int_part.is_empty() {
            pos = end;
        }
    }

    if int_part.is_empty() && frac_part.is_empty() {
        return 0.0;
    }

    let mut exp_part = "";
    if pos < bytes.len() && matches!(bytes[pos], b'e' | b'E') {
        let mut end = pos + 1;
        if end < bytes.len() && matches!(bytes[end], b'+' | b'-') {
            end += 1;
        }
        let digits_start = end;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
        if end > digits_start {
            exp_part = &s[pos + 1..end];
        }
    }

    let mut normalized = String::with_capacity(pos + 2);
    if negative {
        normalized.push('-');
    }
    normalized.push_str(if int_part.is_empty() { "0" } else { int_part });
    if !frac_part.is_empty() {
        normalized.push('.');
        normalized.push_str(frac_part);
    }
    if !exp_part.is_empty() {
        normalized.push('e');
        normalized.push_str(exp_part);
    }

    match normalized.parse::<f64>() {
        // -0 collapses to 0 like any other falsy parse
        Ok(v) if v.is_finite() && v != 0.0 => v,
        _ => 0.0,
    }
}

/// Shortest decimal text that parses back to the same value.
pub fn format_number(v: f64) -> String {
    if v.is_finite() {
        format!("{}", v)
    } else {
        "0".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearly_equal_basic() {
        let tol = Tolerances {
            abs: 1e-12,
            rel: 1e-9,
        };
        assert!(nearly_equal(1.0, 1.0 + 1e-12, tol));
        assert!(nearly_equal(0.0, 1e-13, tol));
        assert!(!nearly_equal(1.0, 1.0 + 1e-6, tol));
    }

    #[test]
    fn non_finite_folds_to_zero() {
        assert_eq!(finite_or_zero(2.5), 2.5);
        assert_eq!(finite_or_zero(f64::NAN), 0.0);
        assert_eq!(finite_or_zero(f64::INFINITY), 0.0);
        assert_eq!(finite_or_zero(f64::NEG_INFINITY), 0.0);
    }

    #[test]
    fn parse_plain_numbers() {
        assert_eq!(parse_lenient("42"), 42.0);
        assert_eq!(parse_lenient("2.5"), 2.5);
        assert_eq!(parse_lenient("-3.25"), -3.25);
        assert_eq!(parse_lenient("+7"), 7.0);
        assert_eq!(parse_lenient("1e3"), 1000.0);
        assert_eq!(parse_lenient("1.5E-2"), 0.015);
    }

    #[test]
    fn parse_uses_numeric_prefix() {
        assert_eq!(parse_lenient("  12.5 m2"), 12.5);
        assert_eq!(parse_lenient("3.0abc"), 3.0);
        assert_eq!(parse_lenient(".5"), 0.5);
        assert_eq!(parse_lenient("5."), 5.0);
        assert_eq!(parse_lenient("4e"), 4.0);
        assert_eq!(parse_lenient("4e+"), 4.0);
    }

    #[test]
    fn parse_garbage_defaults_to_zero() {
        assert_eq!(parse_lenient(""), 0.0);
        assert_eq!(parse_lenient("   "), 0.0);
        assert_eq!(parse_lenient("Length"), 0.0);
        assert_eq!(parse_lenient("."), 0.0);
        assert_eq!(parse_lenient("-"), 0.0);
        assert_eq!(parse_lenient("1e999"), 0.0);
        assert!(parse_lenient("-0").is_sign_positive());
    }

    #[test]
    fn format_round_trips() {
        for v in [0.0, 50.0, 2.5, 0.6, 0.1 + 0.2, -12.75, 1234567.125] {
            assert_eq!(parse_lenient(&format_number(v)), v);
        }
        assert_eq!(format_number(50.0), "50");
        assert_eq!(format_number(2.5), "2.5");
    }
}
