//! Tolerant numeric and text coercion for untyped upstream fields.
//!
//! RDW rows carry numbers as strings, empty strings, `null`, or omit them
//! entirely. [`to_number`] mirrors the conversion open-data consumers
//! usually apply (absent becomes NaN, `null` and `""` become 0), and
//! [`to_safe_number`] layers the zero fallback on top so that NaN never
//! reaches an aggregate.

use serde_json::Value;

/// Converts a possibly-absent JSON value to a number.
///
/// Returns NaN for absent values, arrays, objects, and strings that do not
/// spell a number. Infinities are preserved.
#[must_use]
pub fn to_number(value: Option<&Value>) -> f64 {
    match value {
        None | Some(Value::Array(_) | Value::Object(_)) => f64::NAN,
        Some(Value::Null) => 0.0,
        Some(Value::Bool(b)) => f64::from(u8::from(*b)),
        Some(Value::Number(n)) => n.as_f64().unwrap_or(f64::NAN),
        Some(Value::String(s)) => parse_numeric_str(s),
    }
}

/// Converts a possibly-absent JSON value to a number, with 0 in place of
/// NaN.
///
/// Zero, negative and fractional values pass through unchanged.
#[must_use]
pub fn to_safe_number(value: Option<&Value>) -> f64 {
    let number = to_number(value);
    if number.is_nan() { 0.0 } else { number }
}

/// Renders a scalar field as text. Absent, `null` and structured values
/// become an empty string.
#[must_use]
pub fn to_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        None | Some(Value::Null | Value::Array(_) | Value::Object(_)) => String::new(),
    }
}

fn parse_numeric_str(s: &str) -> f64 {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return 0.0;
    }

    match trimmed {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }

    if let Some(radix_value) = parse_radix_prefixed(trimmed) {
        return radix_value;
    }

    // Rust also accepts "inf" and "nan" spellings; only plain decimal
    // notation counts here.
    let is_decimal = trimmed
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | '+' | '-' | 'e' | 'E'));
    if !is_decimal {
        return f64::NAN;
    }

    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

#[allow(clippy::cast_precision_loss)]
fn parse_radix_prefixed(s: &str) -> Option<f64> {
    let (radix, digits) = match s.get(..2)? {
        "0x" | "0X" => (16, &s[2..]),
        "0o" | "0O" => (8, &s[2..]),
        "0b" | "0B" => (2, &s[2..]),
        _ => return None,
    };
    Some(
        u64::from_str_radix(digits, radix)
            .map(|n| n as f64)
            .unwrap_or(f64::NAN),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unparseable_input_coerces_to_zero() {
        for value in [json!(""), json!(null), json!("abc"), json!("12abc"), json!([1])] {
            assert!(
                to_safe_number(Some(&value)).abs() < f64::EPSILON,
                "{value} did not coerce to 0"
            );
        }
        assert!(to_safe_number(None).abs() < f64::EPSILON);
    }

    #[test]
    fn numeric_strings_parse() {
        assert!((to_safe_number(Some(&json!("42"))) - 42.0).abs() < f64::EPSILON);
        assert!((to_safe_number(Some(&json!(" 2.5 "))) - 2.5).abs() < f64::EPSILON);
        assert!((to_safe_number(Some(&json!("1e3"))) - 1000.0).abs() < f64::EPSILON);
        assert!((to_safe_number(Some(&json!("0x1A"))) - 26.0).abs() < f64::EPSILON);
    }

    #[test]
    fn negative_and_fractional_numbers_pass_through() {
        assert!((to_safe_number(Some(&json!(-3.5))) + 3.5).abs() < f64::EPSILON);
        assert!((to_safe_number(Some(&json!("-0.25"))) + 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn booleans_become_one_or_zero() {
        assert!((to_safe_number(Some(&json!(true))) - 1.0).abs() < f64::EPSILON);
        assert!(to_safe_number(Some(&json!(false))).abs() < f64::EPSILON);
    }

    #[test]
    fn absent_is_nan_but_null_is_zero() {
        assert!(to_number(None).is_nan());
        assert!(to_number(Some(&json!(null))).abs() < f64::EPSILON);
    }

    #[test]
    fn rust_only_float_spellings_are_rejected() {
        assert!(to_number(Some(&json!("inf"))).is_nan());
        assert!(to_number(Some(&json!("NaN"))).is_nan());
        assert!(to_number(Some(&json!("Infinity"))).is_infinite());
    }

    #[test]
    fn text_renders_scalars() {
        assert_eq!(to_text(Some(&json!("363_P1"))), "363_P1");
        assert_eq!(to_text(Some(&json!(363))), "363");
        assert_eq!(to_text(None), "");
        assert_eq!(to_text(Some(&json!({"a": 1}))), "");
    }
}
