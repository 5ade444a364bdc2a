//! Attribute value extraction
//!
//! Turns one annotation occurrence into at most one typed [`Attribute`].
//! Numeric arguments are first rewritten as canonical decimal text and then
//! parsed as `f64`, so integer and floating literals of any radix or suffix
//! convert the same way.

use tracing::{debug, warn};

use super::attribute::{Attribute, AttributeKind, Range};
use super::error::ExtractError;
use crate::parser::ast::{Annotation, AnnotationArg};

/// Extract the attributes of a member, in annotation order.
///
/// The `meta` marker and unknown annotations produce nothing.
pub fn extract_attributes(annotations: &[Annotation]) -> Vec<Attribute> {
    annotations.iter().filter_map(extract_attribute).collect()
}

/// Extract one annotation.
pub fn extract_attribute(annotation: &Annotation) -> Option<Attribute> {
    let kind = match AttributeKind::from_tag(&annotation.name) {
        Some(kind) => kind,
        None => {
            debug!(annotation = %annotation.name, "ignoring unrecognized annotation");
            return None;
        }
    };

    match kind {
        AttributeKind::Meta => None,
        AttributeKind::Info => Some(extract_info(annotation)),
        AttributeKind::Range => Some(extract_range(annotation)),
        AttributeKind::Step => Some(extract_step(annotation)),
    }
}

fn extract_info(annotation: &Annotation) -> Attribute {
    let text = annotation
        .args
        .iter()
        .find_map(|arg| match arg {
            AnnotationArg::Str(text) => Some(text.clone()),
            _ => None,
        })
        .unwrap_or_default();
    Attribute::Info(text)
}

fn extract_range(annotation: &Annotation) -> Attribute {
    let mut range = Range::new();
    for value in numeric_args(annotation) {
        range.push_sample(value);
    }

    if !range.is_complete() {
        warn!(
            line = annotation.span.line,
            samples = range.samples(),
            "range annotation has fewer than two numeric arguments"
        );
    }
    Attribute::Range(range)
}

fn extract_step(annotation: &Annotation) -> Attribute {
    match numeric_args(annotation).next() {
        Some(step) => Attribute::Step(step),
        None => {
            warn!(
                line = annotation.span.line,
                "step annotation has no numeric argument, using 0"
            );
            Attribute::Step(0.0)
        }
    }
}

/// Numeric arguments of an annotation, in order.
///
/// String arguments are not numeric and are passed over; arguments that
/// fail to convert are logged and skipped.
fn numeric_args(annotation: &Annotation) -> impl Iterator<Item = f64> + '_ {
    annotation
        .args
        .iter()
        .filter_map(move |arg| match numeric_value(arg) {
            Ok(value) => value,
            Err(err) => {
                warn!(
                    annotation = %annotation.name,
                    line = annotation.span.line,
                    error = %err,
                    "skipping annotation argument"
                );
                None
            }
        })
}

/// Numeric value of an argument; `None` for string arguments.
pub fn numeric_value(arg: &AnnotationArg) -> Result<Option<f64>, ExtractError> {
    let (text, decimal) = match arg {
        AnnotationArg::Str(_) => return Ok(None),
        AnnotationArg::Int(text) => (text, integer_to_decimal(text)?),
        AnnotationArg::Float(text) => (text, float_to_decimal(text)?),
        AnnotationArg::Expr(text) => {
            return Err(ExtractError::NotNumeric { text: text.clone() });
        }
    };

    decimal
        .parse::<f64>()
        .map(Some)
        .map_err(|_| ExtractError::InvalidFloat { text: text.clone() })
}

/// Canonical decimal text of an integer literal.
///
/// Handles a leading sign, digit separators, `u`/`l`/`z` suffixes and the
/// `0x`, `0b` and leading-`0` octal radix forms.
pub fn integer_to_decimal(text: &str) -> Result<String, ExtractError> {
    let invalid = || ExtractError::InvalidInteger {
        text: text.to_string(),
    };

    let (negative, body) = split_sign(text);
    let hex = strip_prefix_ci(body, "0x").is_some();
    if !separators_between_digits(body, hex) {
        return Err(invalid());
    }
    let cleaned: String = body.chars().filter(|&c| c != '\'').collect();
    let digits = cleaned.trim_end_matches(['u', 'U', 'l', 'L', 'z', 'Z']);

    let (radix, digits) = if let Some(hex) = strip_prefix_ci(digits, "0x") {
        (16, hex)
    } else if let Some(binary) = strip_prefix_ci(digits, "0b") {
        (2, binary)
    } else if digits.len() > 1 && digits.starts_with('0') {
        (8, &digits[1..])
    } else {
        (10, digits)
    };

    if digits.is_empty() {
        return Err(invalid());
    }
    let magnitude = u128::from_str_radix(digits, radix).map_err(|_| invalid())?;

    Ok(if negative && magnitude != 0 {
        format!("-{}", magnitude)
    } else {
        magnitude.to_string()
    })
}

/// Canonical decimal text of a floating literal.
pub fn float_to_decimal(text: &str) -> Result<String, ExtractError> {
    let (negative, body) = split_sign(text);
    if strip_prefix_ci(body, "0x").is_some() {
        return Err(ExtractError::HexFloat {
            text: text.to_string(),
        });
    }

    let invalid = || ExtractError::InvalidFloat {
        text: text.to_string(),
    };
    if !separators_between_digits(body, false) {
        return Err(invalid());
    }

    let cleaned: String = body.chars().filter(|&c| c != '\'').collect();
    let digits = cleaned.trim_end_matches(['f', 'F', 'l', 'L']);
    let value: f64 = digits.parse().map_err(|_| invalid())?;
    if !value.is_finite() {
        return Err(ExtractError::OutOfRange {
            text: text.to_string(),
        });
    }

    Ok(if negative { format!("{}", -value) } else { format!("{}", value) })
}

/// Every `'` separator must sit between two digits of the literal's radix.
fn separators_between_digits(body: &str, hex: bool) -> bool {
    let is_digit = |c: Option<&u8>| match c {
        Some(c) if hex => c.is_ascii_hexdigit(),
        Some(c) => c.is_ascii_digit(),
        None => false,
    };

    let bytes = body.as_bytes();
    bytes.iter().enumerate().all(|(i, &b)| {
        b != b'\'' || (i > 0 && is_digit(bytes.get(i - 1)) && is_digit(bytes.get(i + 1)))
    })
}

fn split_sign(text: &str) -> (bool, &str) {
    if let Some(rest) = text.strip_prefix('-') {
        (true, rest)
    } else {
        (false, text.strip_prefix('+').unwrap_or(text))
    }
}

fn strip_prefix_ci<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &text[prefix.len()..])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::token::Span;

    fn annotation(name: &str, args: Vec<AnnotationArg>) -> Annotation {
        Annotation::new(name, args, Span::default())
    }

    fn int(text: &str) -> AnnotationArg {
        AnnotationArg::Int(text.to_string())
    }

    fn float(text: &str) -> AnnotationArg {
        AnnotationArg::Float(text.to_string())
    }

    fn string(text: &str) -> AnnotationArg {
        AnnotationArg::Str(text.to_string())
    }

    #[test]
    fn test_integer_to_decimal() {
        assert_eq!(integer_to_decimal("42").unwrap(), "42");
        assert_eq!(integer_to_decimal("-17").unwrap(), "-17");
        assert_eq!(integer_to_decimal("0x1F").unwrap(), "31");
        assert_eq!(integer_to_decimal("0B101").unwrap(), "5");
        assert_eq!(integer_to_decimal("017").unwrap(), "15");
        assert_eq!(integer_to_decimal("1'000'000ull").unwrap(), "1000000");
        assert_eq!(integer_to_decimal("0").unwrap(), "0");
        assert_eq!(integer_to_decimal("-0").unwrap(), "0");
        assert!(matches!(
            integer_to_decimal("09"),
            Err(ExtractError::InvalidInteger { .. })
        ));
    }

    #[test]
    fn test_misplaced_separators_are_rejected() {
        assert_eq!(integer_to_decimal("0xF'F").unwrap(), "255");
        assert_eq!(integer_to_decimal("0b1'0").unwrap(), "2");
        for text in ["1'", "1''0", "0x'1", "0b'1", "1'u"] {
            assert!(
                matches!(integer_to_decimal(text), Err(ExtractError::InvalidInteger { .. })),
                "{} should be rejected",
                text
            );
        }
        for text in ["1'.5", "1.'5", "1.5'", "2'e3"] {
            assert!(
                matches!(float_to_decimal(text), Err(ExtractError::InvalidFloat { .. })),
                "{} should be rejected",
                text
            );
        }
    }

    #[test]
    fn test_out_of_range_float_is_rejected() {
        assert!(matches!(
            float_to_decimal("1e400"),
            Err(ExtractError::OutOfRange { .. })
        ));
        assert!(matches!(
            float_to_decimal("-1e400f"),
            Err(ExtractError::OutOfRange { .. })
        ));
        assert_eq!(float_to_decimal("1e300").unwrap(), format!("{}", 1e300f64));
    }

    #[test]
    fn test_range_skips_infinite_sample() {
        let attr = extract_attribute(&annotation(
            "range",
            vec![float("1e400"), int("2"), float("0.75")],
        ));
        assert_eq!(
            attr,
            Some(Attribute::Range(Range::from_samples([2.0, 0.75])))
        );
    }

    #[test]
    fn test_float_to_decimal() {
        assert_eq!(float_to_decimal("2.5").unwrap(), "2.5");
        assert_eq!(float_to_decimal("-1.5e2f").unwrap(), "-150");
        assert_eq!(float_to_decimal(".5").unwrap(), "0.5");
        assert_eq!(float_to_decimal("1'000.25").unwrap(), "1000.25");
        assert!(matches!(
            float_to_decimal("0x1p4"),
            Err(ExtractError::HexFloat { .. })
        ));
    }

    #[test]
    fn test_meta_and_unknown_produce_nothing() {
        assert_eq!(extract_attribute(&annotation("meta", vec![])), None);
        assert_eq!(
            extract_attribute(&annotation("color", vec![string("red")])),
            None
        );
    }

    #[test]
    fn test_info_takes_first_string() {
        let attr = extract_attribute(&annotation("info", vec![int("1"), string("a"), string("b")]));
        assert_eq!(attr, Some(Attribute::Info("a".to_string())));

        let attr = extract_attribute(&annotation("info", vec![]));
        assert_eq!(attr, Some(Attribute::Info(String::new())));
    }

    #[test]
    fn test_range_accumulates_numeric_samples() {
        let attr = extract_attribute(&annotation(
            "range",
            vec![int("3"), float("7.0"), string("x"), int("1"), int("0x9")],
        ));
        assert_eq!(
            attr,
            Some(Attribute::Range(Range::from_samples([3.0, 7.0, 1.0, 9.0])))
        );
    }

    #[test]
    fn test_range_skips_failed_samples() {
        let attr = extract_attribute(&annotation(
            "range",
            vec![
                int("5"),
                AnnotationArg::Expr("N*2".to_string()),
                float("0x1p3"),
                int("1"),
            ],
        ));
        assert_eq!(
            attr,
            Some(Attribute::Range(Range::from_samples([5.0, 1.0])))
        );
    }

    #[test]
    fn test_step_takes_first_number() {
        let attr = extract_attribute(&annotation("step", vec![string("s"), float("0.5"), int("2")]));
        assert_eq!(attr, Some(Attribute::Step(0.5)));

        let attr = extract_attribute(&annotation("step", vec![]));
        assert_eq!(attr, Some(Attribute::Step(0.0)));
    }

    #[test]
    fn test_extract_attributes_keeps_order() {
        let attrs = extract_attributes(&[
            annotation("meta", vec![]),
            annotation("step", vec![int("2")]),
            annotation("info", vec![string("doc")]),
        ]);
        assert_eq!(
            attrs,
            vec![Attribute::Step(2.0), Attribute::Info("doc".to_string())]
        );
    }
}
