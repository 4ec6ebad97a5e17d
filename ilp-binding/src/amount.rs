//! Conversion of decimal currency amounts into ILP packet amounts.
//!
//! ILP amounts are unsigned integers in the currency's minor unit, so a
//! decimal amount is shifted by the ISO-4217 exponent of its currency.

use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::error::IlpError;
use crate::types::Money;

/// Exponent used for currencies not listed in [`CURRENCY_EXPONENTS`].
pub const DEFAULT_EXPONENT: u32 = 2;

/// ISO-4217 currencies whose minor unit is not hundredths.
pub const CURRENCY_EXPONENTS: &[(&str, u32)] = &[
    ("BHD", 3),
    ("BIF", 0),
    ("CLF", 4),
    ("CLP", 0),
    ("DJF", 0),
    ("GNF", 0),
    ("IQD", 3),
    ("ISK", 0),
    ("JOD", 3),
    ("JPY", 0),
    ("KMF", 0),
    ("KRW", 0),
    ("KWD", 3),
    ("LYD", 3),
    ("OMR", 3),
    ("PYG", 0),
    ("RWF", 0),
    ("TND", 3),
    ("UGX", 0),
    ("UYI", 0),
    ("UYW", 4),
    ("VND", 0),
    ("VUV", 0),
    ("XAF", 0),
    ("XOF", 0),
    ("XPF", 0),
];

/// Returns the minor-unit exponent of a currency.
#[must_use]
pub fn currency_exponent(currency: &str) -> u32 {
    CURRENCY_EXPONENTS
        .iter()
        .find(|(code, _)| code.eq_ignore_ascii_case(currency))
        .map_or(DEFAULT_EXPONENT, |(_, exponent)| *exponent)
}

/// Scales a decimal amount to its integer ILP representation.
///
/// `USD 100.25` becomes `"10025"`, `JPY 500` stays `"500"`.
///
/// # Errors
///
/// Returns [`IlpError::InvalidAmount`] if the amount does not parse, is
/// negative, has more decimals than the currency allows, or exceeds the
/// UInt64 range once scaled.
pub fn to_ilp_amount(money: &Money) -> Result<String, IlpError> {
    let invalid = |reason: &str| {
        IlpError::InvalidAmount(format!("{} {}: {reason}", money.amount, money.currency))
    };

    let value = Decimal::from_str(money.amount.trim()).map_err(|e| invalid(&e.to_string()))?;
    if value.is_sign_negative() && !value.is_zero() {
        return Err(invalid("negative amount"));
    }
    let factor = Decimal::from(10u64.pow(currency_exponent(&money.currency)));
    let scaled = value
        .checked_mul(factor)
        .ok_or_else(|| invalid("amount overflows"))?;
    if !scaled.fract().is_zero() {
        return Err(invalid("more decimal places than the currency allows"));
    }
    let units = scaled
        .trunc()
        .to_u64()
        .ok_or_else(|| invalid("amount exceeds UInt64 range"))?;
    Ok(units.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_exponent_lookup() {
        assert_eq!(currency_exponent("USD"), 2);
        assert_eq!(currency_exponent("JPY"), 0);
        assert_eq!(currency_exponent("kwd"), 3);
        assert_eq!(currency_exponent("XXX"), DEFAULT_EXPONENT);
    }

    #[test]
    fn test_to_ilp_amount_scales_by_exponent() {
        assert_eq!(to_ilp_amount(&Money::new("USD", "100")).unwrap(), "10000");
        assert_eq!(to_ilp_amount(&Money::new("USD", "100.25")).unwrap(), "10025");
        assert_eq!(to_ilp_amount(&Money::new("USD", "0.5")).unwrap(), "50");
        assert_eq!(to_ilp_amount(&Money::new("JPY", "500")).unwrap(), "500");
        assert_eq!(to_ilp_amount(&Money::new("BHD", "1.005")).unwrap(), "1005");
        assert_eq!(to_ilp_amount(&Money::new("USD", "0")).unwrap(), "0");
    }

    #[test]
    fn test_to_ilp_amount_rejects_excess_precision() {
        let err = to_ilp_amount(&Money::new("USD", "1.001")).unwrap_err();
        assert!(matches!(err, IlpError::InvalidAmount(_)));
        let err = to_ilp_amount(&Money::new("JPY", "1.5")).unwrap_err();
        assert!(matches!(err, IlpError::InvalidAmount(_)));
    }

    #[test]
    fn test_to_ilp_amount_rejects_negative_and_garbage() {
        assert!(to_ilp_amount(&Money::new("USD", "-1")).is_err());
        assert!(to_ilp_amount(&Money::new("USD", "abc")).is_err());
        assert!(to_ilp_amount(&Money::new("USD", "")).is_err());
    }

    #[test]
    fn test_to_ilp_amount_rejects_overflow() {
        let err = to_ilp_amount(&Money::new("USD", "999999999999999999999")).unwrap_err();
        assert!(matches!(err, IlpError::InvalidAmount(_)));
    }
}
