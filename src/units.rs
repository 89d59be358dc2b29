//! Conversions between human amounts and smallest-unit integers.
//!
//! Everything here is exact. Inputs with more fractional digits than the token has
//! decimals are rejected rather than rounded, and nothing passes through `f64`.

use alloy::primitives::{
    U256,
    utils::{ParseUnits, format_units, parse_units},
};
use rust_decimal::Decimal;

use crate::{Error, Result};

/// Decimals of ether-like tokens.
pub const ETHER_DECIMALS: u8 = 18;

/// Parses a decimal string such as `"1.5"` into smallest units.
///
/// ```
/// use stakesdk::{U256, units::parse_amount};
///
/// assert_eq!(parse_amount("1.5", 6).unwrap(), U256::from(1_500_000));
/// assert!(parse_amount("0.0000001", 6).is_err());
/// ```
pub fn parse_amount(amount: &str, decimals: u8) -> Result<U256> {
    let amount = amount.trim();
    if amount.starts_with('-') {
        return Err(Error::Units(format!("negative amount {amount}")));
    }

    if let Some((_, fraction)) = amount.split_once('.') {
        if fraction.len() > decimals as usize {
            return Err(Error::Units(format!(
                "{amount} has more than {decimals} fractional digits"
            )));
        }
    }

    match parse_units(amount, decimals).map_err(|err| Error::Units(format!("{amount}: {err}")))? {
        ParseUnits::U256(value) => Ok(value),
        ParseUnits::I256(_) => Err(Error::Units(format!("negative amount {amount}"))),
    }
}

/// Formats smallest units as a decimal string, e.g. `1500000` with 6 decimals is `"1.500000"`.
pub fn format_amount(amount: U256, decimals: u8) -> Result<String> {
    format_units(amount, decimals).map_err(|err| Error::Units(err.to_string()))
}

/// Converts a [`Decimal`] into smallest units.
pub fn to_smallest_unit(amount: Decimal, decimals: u8) -> Result<U256> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(Error::Units(format!("negative amount {amount}")));
    }
    parse_amount(&amount.normalize().to_string(), decimals)
}

/// Converts smallest units into a [`Decimal`].
///
/// Fails if the value doesn't fit in a `Decimal` (28 significant digits).
pub fn from_smallest_unit(amount: U256, decimals: u8) -> Result<Decimal> {
    let mantissa = i128::try_from(amount)
        .map_err(|_| Error::Units(format!("{amount} does not fit in a decimal")))?;
    Decimal::try_from_i128_with_scale(mantissa, decimals as u32)
        .map(|value| value.normalize())
        .map_err(|err| Error::Units(format!("{amount}: {err}")))
}

#[cfg(test)]
mod tests {
    use rust_decimal::dec;

    use super::*;

    #[test]
    fn test_parse_amount() {
        assert_eq!(
            parse_amount("100", ETHER_DECIMALS).unwrap(),
            U256::from(100u128 * 10u128.pow(18))
        );
        assert_eq!(
            parse_amount("0.000000000000000001", ETHER_DECIMALS).unwrap(),
            U256::from(1)
        );
        // well past f64 precision
        assert_eq!(
            parse_amount("123456789.123456789123456789", ETHER_DECIMALS).unwrap(),
            "123456789123456789123456789".parse::<U256>().unwrap()
        );
        assert!(parse_amount("0.0000000000000000001", ETHER_DECIMALS).is_err());
        assert!(parse_amount("-1", ETHER_DECIMALS).is_err());
        assert!(parse_amount("abc", ETHER_DECIMALS).is_err());
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(
            format_amount(U256::from(1_500_000), 6).unwrap(),
            "1.500000"
        );
    }

    #[test]
    fn test_decimal_conversions() {
        assert_eq!(
            to_smallest_unit(dec!(2.5), 6).unwrap(),
            U256::from(2_500_000)
        );
        assert!(to_smallest_unit(dec!(-2.5), 6).is_err());
        assert!(to_smallest_unit(dec!(0.0000001), 6).is_err());

        assert_eq!(
            from_smallest_unit(U256::from(2_500_000), 6).unwrap(),
            dec!(2.5)
        );
        assert!(from_smallest_unit(U256::MAX, ETHER_DECIMALS).is_err());
    }
}
