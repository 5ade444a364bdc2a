//! Property tests for range accumulation and numeric conversion

use cxxrefl_engine::parser::{AnnotationArg, Lexer, Token};
use cxxrefl_engine::reflect::extract::{integer_to_decimal, numeric_value};
use cxxrefl_engine::Range;
use proptest::prelude::*;

/// Lex a single numeric literal and convert it the way annotation
/// arguments are converted.
fn literal_value(text: &str) -> Result<f64, String> {
    let tokens = Lexer::new(text)
        .tokenize()
        .map_err(|errors| format!("{} did not lex: {:?}", text, errors))?;
    if tokens.len() != 2 {
        return Err(format!("{} lexed as {} tokens", text, tokens.len() - 1));
    }

    let arg = match &tokens[0].0 {
        Token::IntLiteral(spelling) => AnnotationArg::Int(spelling.clone()),
        Token::FloatLiteral(spelling) => AnnotationArg::Float(spelling.clone()),
        other => return Err(format!("{} lexed as {:?}", text, other)),
    };
    match numeric_value(&arg) {
        Ok(Some(value)) => Ok(value),
        Ok(None) => Err(format!("{} has no numeric value", text)),
        Err(err) => Err(err.to_string()),
    }
}

/// Insert a `'` between every group of three digits, counting from the right.
fn with_separators(digits: &str) -> String {
    let mut grouped = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('\'');
        }
        grouped.push(c);
    }
    grouped
}

proptest! {
    #[test]
    fn range_bounds_cover_all_samples(samples in prop::collection::vec(-1.0e6f64..1.0e6, 2..32)) {
        let range = Range::from_samples(samples.iter().copied());

        prop_assert!(range.min() <= range.max());
        let lowest = samples.iter().copied().fold(f64::INFINITY, f64::min);
        let highest = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        prop_assert_eq!(range.min(), lowest);
        prop_assert_eq!(range.max(), highest);
    }

    #[test]
    fn range_bounds_only_widen(samples in prop::collection::vec(-1.0e6f64..1.0e6, 2..32)) {
        let mut range = Range::new();
        range.push_sample(samples[0]);
        range.push_sample(samples[1]);

        for &sample in &samples[2..] {
            let (min, max) = (range.min(), range.max());
            range.push_sample(sample);
            prop_assert!(range.min() <= min);
            prop_assert!(range.max() >= max);
        }
    }

    #[test]
    fn integer_radix_forms_agree(value in 0u64..u64::MAX) {
        let decimal = value.to_string();
        prop_assert_eq!(integer_to_decimal(&decimal).unwrap(), decimal.clone());
        prop_assert_eq!(integer_to_decimal(&format!("{:#x}u", value)).unwrap(), decimal.clone());
        prop_assert_eq!(integer_to_decimal(&format!("{:#b}", value)).unwrap(), decimal);
    }

    #[test]
    fn integer_literal_spellings_lex_and_convert(value in any::<u64>()) {
        let expected = value as f64;
        let decimal = value.to_string();

        prop_assert_eq!(literal_value(&decimal), Ok(expected));
        prop_assert_eq!(literal_value(&format!("{}ull", decimal)), Ok(expected));
        prop_assert_eq!(literal_value(&with_separators(&decimal)), Ok(expected));
        prop_assert_eq!(literal_value(&format!("{:#x}", value)), Ok(expected));
        prop_assert_eq!(literal_value(&format!("{:#X}u", value)), Ok(expected));
        prop_assert_eq!(literal_value(&format!("{:#b}", value)), Ok(expected));
        prop_assert_eq!(literal_value(&format!("0b{}L", with_separators(&format!("{:b}", value)))), Ok(expected));
    }

    #[test]
    fn floating_literal_spellings_lex_and_convert(value in 0.0f64..1.0e12) {
        let fixed = format!("{:?}", value);
        prop_assert_eq!(literal_value(&fixed), Ok(value));
        prop_assert_eq!(literal_value(&format!("{}f", fixed)), Ok(value));
        prop_assert_eq!(literal_value(&format!("{:e}", value)), Ok(value));
        prop_assert_eq!(literal_value(&format!("{:E}L", value)), Ok(value));

        if let Some((whole, fraction)) = fixed.split_once('.') {
            let grouped = format!("{}.{}", with_separators(whole), fraction);
            prop_assert_eq!(literal_value(&grouped), Ok(value));
            if whole == "0" {
                prop_assert_eq!(literal_value(&format!(".{}", fraction)), Ok(value));
            }
        }
    }

    #[test]
    fn fractions_with_many_digits_lex(whole in 0u32..100_000, fraction in 0u32..1_000_000) {
        let text = format!("{}.{:06}", whole, fraction);
        let expected: f64 = text.parse().unwrap();
        prop_assert_eq!(literal_value(&text), Ok(expected));
        prop_assert_eq!(literal_value(&format!(".{:06}", fraction)), Ok(format!("0.{:06}", fraction).parse::<f64>().unwrap()));
    }
}
