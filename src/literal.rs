//! Numeric literal parsing for SysY.
//!
//! Integer literals are decimal, octal (`0...`) or hex (`0x...`); values that
//! exceed `i32` wrap, so `2147483648` round-trips through unary minus to
//! `INT_MIN` the way C frontends read it. Float literals are IEEE-754 single
//! precision in decimal or hex (`0x1.8p3`) notation.

/// Parses an integer literal as matched by the lexer.
pub fn parse_int(text: &str) -> i32 {
    let (radix, digits) = if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        (16, hex)
    } else if text.len() > 1 && text.starts_with('0') {
        (8, &text[1..])
    } else {
        (10, text)
    };
    let mut value: u32 = 0;
    for ch in digits.chars() {
        let digit = ch.to_digit(radix).unwrap_or(0);
        value = value.wrapping_mul(radix).wrapping_add(digit);
    }
    value as i32
}

/// Parses a float literal as matched by the lexer.
pub fn parse_float(text: &str) -> f32 {
    if text.starts_with("0x") || text.starts_with("0X") {
        parse_hex_float(&text[2..])
    } else {
        // The lexer only matches well-formed decimal float forms, all of
        // which `str::parse` accepts.
        text.parse::<f32>().unwrap_or(0.0)
    }
}

/// Hex float: `hexdigits[.hexdigits]p[+-]dec`, value = mantissa * 2^exp.
fn parse_hex_float(body: &str) -> f32 {
    let (mantissa, exponent) = match body.split_once(['p', 'P']) {
        Some(parts) => parts,
        None => (body, "0"),
    };
    let (int_part, frac_part) = match mantissa.split_once('.') {
        Some((i, f)) => (i, f),
        None => (mantissa, ""),
    };

    let mut value = 0.0f64;
    for ch in int_part.chars() {
        value = value * 16.0 + ch.to_digit(16).unwrap_or(0) as f64;
    }
    let mut scale = 1.0 / 16.0;
    for ch in frac_part.chars() {
        value += ch.to_digit(16).unwrap_or(0) as f64 * scale;
        scale /= 16.0;
    }

    let exp = exponent.parse::<i32>().unwrap_or(0);
    (value * 2f64.powi(exp)) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimal_int() {
        assert_eq!(parse_int("0"), 0);
        assert_eq!(parse_int("42"), 42);
        assert_eq!(parse_int("2147483647"), i32::MAX);
    }

    #[test]
    fn int_min_literal_wraps() {
        // "-2147483648" lexes as unary minus over 2147483648.
        assert_eq!(parse_int("2147483648"), i32::MIN);
        assert_eq!(parse_int("2147483648").wrapping_neg(), i32::MIN);
    }

    #[test]
    fn octal_int() {
        assert_eq!(parse_int("017"), 15);
        assert_eq!(parse_int("00"), 0);
    }

    #[test]
    fn hex_int() {
        assert_eq!(parse_int("0x1F"), 31);
        assert_eq!(parse_int("0XffffFFFF"), -1);
    }

    #[test]
    fn decimal_float() {
        assert_eq!(parse_float("1.5"), 1.5);
        assert_eq!(parse_float("1."), 1.0);
        assert_eq!(parse_float(".25"), 0.25);
        assert_eq!(parse_float("1e2"), 100.0);
        assert_eq!(parse_float("3.14e-2"), 0.0314);
    }

    #[test]
    fn hex_float() {
        assert_eq!(parse_float("0x1p0"), 1.0);
        assert_eq!(parse_float("0x1.8p1"), 3.0);
        assert_eq!(parse_float("0x.8p0"), 0.5);
        assert_eq!(parse_float("0x10p-4"), 1.0);
    }
}
