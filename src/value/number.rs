//! Validation and decoding of integer and float literals.

use crate::syntax::SyntaxKind;

/// Test if `digits` is a non-empty run of `radix` digits where every
/// underscore sits between two digits.
pub(crate) fn check_digit_groups(digits: &str, radix: u32) -> Result<(), String> {
    if digits.is_empty() {
        return Err("expected digits".into());
    }
    if digits.starts_with('_') || digits.ends_with('_') || digits.contains("__") {
        return Err("underscores must be surrounded by digits".into());
    }
    match digits.chars().find(|c| *c != '_' && !c.is_digit(radix)) {
        Some(c) => Err(format!("invalid digit `{}` for base {}", c, radix)),
        None => Ok(()),
    }
}

fn split_sign(text: &str) -> (bool, &str) {
    match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    }
}

/// Whether `text` is signed (`+` or `-`).
pub(crate) fn has_sign(text: &str) -> bool {
    text.starts_with('+') || text.starts_with('-')
}

/// Strict float grammar: `[sign] int ( frac [exp] | exp )`.
pub(crate) fn check_float(text: &str) -> Result<(), String> {
    let (_, unsigned) = split_sign(text);
    let (mantissa, exponent) = match unsigned.find(|c| c == 'e' || c == 'E') {
        Some(i) => (&unsigned[..i], Some(&unsigned[i + 1..])),
        None => (unsigned, None),
    };
    let (integral, fraction) = match mantissa.split_once('.') {
        Some((integral, fraction)) => (integral, Some(fraction)),
        None => (mantissa, None),
    };
    if fraction.is_none() && exponent.is_none() {
        return Err("expected a fraction or an exponent".into());
    }
    check_decimal(integral)?;
    if let Some(fraction) = fraction {
        check_digit_groups(fraction, 10)?;
    }
    if let Some(exponent) = exponent {
        // the exponent may have leading zeros
        check_digit_groups(split_sign(exponent).1, 10)?;
    }
    Ok(())
}

/// Unsigned decimal digits without leading zeros.
pub(crate) fn check_decimal(digits: &str) -> Result<(), String> {
    check_digit_groups(digits, 10)?;
    if digits.len() > 1 && digits.starts_with('0') {
        return Err("leading zeros are not allowed".into());
    }
    Ok(())
}

pub(crate) fn parse_integer(text: &str, kind: SyntaxKind) -> Result<i64, String> {
    let (radix, digits) = match kind {
        SyntaxKind::INTEGER_HEX => (16, text.get(2..).unwrap_or_default()),
        SyntaxKind::INTEGER_OCT => (8, text.get(2..).unwrap_or_default()),
        SyntaxKind::INTEGER_BIN => (2, text.get(2..).unwrap_or_default()),
        _ => (10, text),
    };
    let cleaned: String = digits.chars().filter(|c| *c != '_').collect();
    i64::from_str_radix(&cleaned, radix)
        .map_err(|_| format!("integer `{}` does not fit in 64 bits", text))
}

pub(crate) fn parse_float(text: &str) -> Result<f64, String> {
    let (negative, unsigned) = split_sign(text);
    let value = match unsigned {
        "inf" => f64::INFINITY,
        "nan" => f64::NAN,
        _ => {
            let cleaned: String = text.chars().filter(|c| *c != '_').collect();
            let value = cleaned
                .parse::<f64>()
                .map_err(|_| format!("invalid float `{}`", text))?;
            if !value.is_finite() {
                return Err(format!("float `{}` does not fit in 64 bits", text));
            }
            return Ok(value);
        }
    };
    Ok(if negative { -value } else { value })
}
