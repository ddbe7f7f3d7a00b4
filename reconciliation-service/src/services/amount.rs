//! Normalization of noisy monetary text.
//!
//! Amounts arrive from OCR and LLM output as text like `"₹1,250.00"`,
//! `"INR 300"` or `"£50.5 only"`. Only ASCII digits and `.` are kept, in
//! order; an empty result means zero and anything else must parse as a
//! plain non-negative decimal.

use rust_decimal::Decimal;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("{raw:?} does not contain a valid decimal (kept {filtered:?})")]
    Malformed { raw: String, filtered: String },

    #[error("adding {left} and {right} overflows")]
    Overflow { left: Decimal, right: Decimal },
}

/// Convert noisy amount text to a non-negative decimal.
pub fn normalize_amount(raw: &str) -> Result<Decimal, AmountError> {
    let filtered: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    if filtered.is_empty() {
        return Ok(Decimal::ZERO);
    }

    let malformed = || AmountError::Malformed {
        raw: raw.to_string(),
        filtered: filtered.clone(),
    };

    let (int_part, frac_part) = match filtered.split_once('.') {
        Some((int_part, frac_part)) => (int_part, frac_part),
        None => (filtered.as_str(), ""),
    };
    if frac_part.contains('.') || (int_part.is_empty() && frac_part.is_empty()) {
        return Err(malformed());
    }

    // "5." and ".5" are accepted; rebuild them as "5" and "0.5".
    let int_part = if int_part.is_empty() { "0" } else { int_part };
    let canonical = if frac_part.is_empty() {
        int_part.to_string()
    } else {
        format!("{}.{}", int_part, frac_part)
    };

    Decimal::from_str(&canonical).map_err(|_| malformed())
}

/// Sum two normalized amounts.
pub fn add_amounts(left: Decimal, right: Decimal) -> Result<Decimal, AmountError> {
    left.checked_add(right)
        .ok_or(AmountError::Overflow { left, right })
}

/// Render an amount the way balances are stored: shortest exact form with at
/// least one fractional digit (`100` -> `"100.0"`, `150.50` -> `"150.5"`).
pub fn render_amount(value: Decimal) -> String {
    let value = value.normalize();
    if value.scale() == 0 {
        format!("{}.0", value)
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn strips_currency_symbols_and_separators() {
        assert_eq!(normalize_amount("₹100").unwrap(), dec("100"));
        assert_eq!(normalize_amount("£50.5").unwrap(), dec("50.5"));
        assert_eq!(normalize_amount("INR 1,250.75 only").unwrap(), dec("1250.75"));
        // The dot of an "Rs." prefix is kept and turns into a decimal point.
        assert_eq!(normalize_amount("Rs.300").unwrap(), dec("0.300"));
    }

    #[test]
    fn empty_or_digitless_text_is_zero() {
        assert_eq!(normalize_amount("").unwrap(), Decimal::ZERO);
        assert_eq!(normalize_amount("N/A").unwrap(), Decimal::ZERO);
        assert_eq!(normalize_amount("₹ -- ").unwrap(), Decimal::ZERO);
    }

    #[test]
    fn sign_characters_are_dropped() {
        let value = normalize_amount("-42.10").unwrap();
        assert_eq!(value, dec("42.10"));
        assert!(value >= Decimal::ZERO);
    }

    #[test]
    fn two_separators_are_malformed() {
        assert!(matches!(
            normalize_amount("1.2.3"),
            Err(AmountError::Malformed { .. })
        ));
        assert!(matches!(
            normalize_amount("₹1.250.00"),
            Err(AmountError::Malformed { .. })
        ));
    }

    #[test]
    fn lone_separator_is_malformed() {
        assert!(matches!(
            normalize_amount("."),
            Err(AmountError::Malformed { .. })
        ));
    }

    #[test]
    fn dangling_separators_are_accepted() {
        assert_eq!(normalize_amount("5.").unwrap(), dec("5"));
        assert_eq!(normalize_amount(".5").unwrap(), dec("0.5"));
    }

    #[test]
    fn out_of_range_values_are_malformed() {
        let huge = "9".repeat(40);
        assert!(matches!(
            normalize_amount(&huge),
            Err(AmountError::Malformed { .. })
        ));
    }

    fn config() -> ProptestConfig {
        ProptestConfig {
            cases: std::env::var("PROPTEST_CASES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(256),
            failure_persistence: None,
            ..ProptestConfig::default()
        }
    }

    /// Noise with no `.` at all; short enough to stay within decimal range.
    fn undotted() -> impl Strategy<Value = String> {
        "[^.]{0,12}"
    }

    proptest! {
        #![proptest_config(config())]

        #[test]
        fn undotted_noise_is_never_negative(raw in undotted()) {
            let value = normalize_amount(&raw).unwrap();
            prop_assert!(value >= Decimal::ZERO);
            if !raw.chars().any(|c| c.is_ascii_digit()) {
                prop_assert_eq!(value, Decimal::ZERO);
            }
        }

        #[test]
        fn single_separator_noise_is_never_negative(left in undotted(), right in undotted()) {
            let raw = format!("{}.{}", left, right);
            match normalize_amount(&raw) {
                Ok(value) => prop_assert!(value >= Decimal::ZERO),
                Err(AmountError::Malformed { .. }) => {
                    // Only a lone separator with no digits is rejected.
                    prop_assert!(!raw.chars().any(|c| c.is_ascii_digit()));
                }
                Err(e) => prop_assert!(false, "unexpected error {}", e),
            }
        }
    }

    #[test]
    fn signs_and_brackets_are_dropped() {
        for raw in ["-1", "--5.5", "₹-0.01", "(100)", "+7"] {
            let value = normalize_amount(raw).unwrap();
            assert!(value >= Decimal::ZERO, "{raw} normalized to {value}");
        }
    }

    #[test]
    fn renders_with_one_fractional_digit_minimum() {
        assert_eq!(render_amount(dec("100")), "100.0");
        assert_eq!(render_amount(dec("150.50")), "150.5");
        assert_eq!(render_amount(Decimal::ZERO), "0.0");
        assert_eq!(render_amount(dec("0.05")), "0.05");
    }

    #[test]
    fn adding_renders_exactly() {
        let total = add_amounts(dec("100.0"), dec("50.5")).unwrap();
        assert_eq!(render_amount(total), "150.5");

        let total = add_amounts(dec("0.1"), dec("0.2")).unwrap();
        assert_eq!(render_amount(total), "0.3");
    }

    #[test]
    fn overflow_is_reported() {
        assert!(matches!(
            add_amounts(Decimal::MAX, Decimal::ONE),
            Err(AmountError::Overflow { .. })
        ));
    }
}
