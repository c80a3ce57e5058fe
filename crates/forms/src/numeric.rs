//! Browser-style number parsing.
//!
//! Form values are strings. Warnings parse them permissively: the longest
//! numeric prefix wins and anything unparseable becomes NaN, which compares
//! false against every threshold.

/// Parse the longest numeric prefix of `input`, or NaN.
pub fn parse_float(input: &str) -> f64 {
    let trimmed = input.trim_start();
    let (negative, unsigned) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };

    let magnitude = if unsigned.starts_with("Infinity") {
        f64::INFINITY
    } else {
        let len = numeric_prefix_len(unsigned);
        if len == 0 {
            return f64::NAN;
        }
        match unsigned.get(..len).map(str::parse::<f64>) {
            Some(Ok(value)) => value,
            _ => return f64::NAN,
        }
    };

    if negative { -magnitude } else { magnitude }
}

/// Whether the whole of `input` (surrounding whitespace aside) is a finite number.
pub fn is_numeric(input: &str) -> bool {
    let trimmed = input.trim();
    !trimmed.is_empty()
        && trimmed
            .parse::<f64>()
            .map(f64::is_finite)
            .unwrap_or(false)
}

/// Length of `digits [. digits] [e [+-] digits]` at the start of `s`.
fn numeric_prefix_len(s: &str) -> usize {
    let bytes = s.as_bytes();
    let digits_from = |start: usize| {
        bytes
            .iter()
            .skip(start)
            .take_while(|b| b.is_ascii_digit())
            .count()
    };

    let int_digits = digits_from(0);
    let mut end = int_digits;
    let mut mantissa_digits = int_digits;

    if bytes.get(end) == Some(&b'.') {
        let frac_digits = digits_from(end + 1);
        mantissa_digits += frac_digits;
        if mantissa_digits > 0 {
            end += 1 + frac_digits;
        }
    }

    if mantissa_digits == 0 {
        return 0;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let sign = usize::from(matches!(bytes.get(end + 1), Some(b'+' | b'-')));
        let exp_digits = digits_from(end + 1 + sign);
        if exp_digits > 0 {
            end += 1 + sign + exp_digits;
        }
    }

    end
}
