//! Property tests for lab value parsing.

use dialyze_predict::{parse_lab_number, sanitize_lab_input};
use proptest::prelude::*;

proptest! {
    #[test]
    fn parses_formatted_numbers(value in -1.0e6f64..1.0e6f64) {
        let text = format!("{}", value);
        prop_assert_eq!(parse_lab_number(&text), Some(value));
    }

    #[test]
    fn ignores_trailing_units(value in 0.0f64..1000.0, unit in "[ a-zA-Z/]{0,8}") {
        let text = format!("{}{}", value, unit);
        prop_assert_eq!(parse_lab_number(&text), Some(value));
    }

    #[test]
    fn never_panics(text in "\\PC*") {
        let _ = parse_lab_number(&text);
    }

    #[test]
    fn sanitized_input_only_has_digits_and_dots(text in "\\PC*") {
        let cleaned = sanitize_lab_input(&text);
        prop_assert!(cleaned.chars().all(|c| c.is_ascii_digit() || c == '.'));
    }
}
