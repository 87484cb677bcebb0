//! Prices
//!
//! Every amount in the crate is a [`Money`] in an ISO currency. Arithmetic that can
//! lose precision (division, percentages) is done on minor units in [`Decimal`] space
//! and rounded half away from zero.

use decimal_percentage::Percentage;
use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};
use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

/// A monetary amount in an ISO currency.
pub type Price = Money<'static, Currency>;

/// Errors raised by minor-unit arithmetic.
#[derive(Debug, Error, PartialEq)]
pub enum PriceError {
    /// The calculation overflowed or could not be represented in minor units.
    #[error("price calculation overflowed or was not representable")]
    Conversion,

    /// Division by zero was requested.
    #[error("cannot divide a price by zero")]
    DivideByZero,

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Zero in the given currency.
pub fn zero(currency: &'static Currency) -> Price {
    Money::from_minor(0, currency)
}

/// Sum a list of prices, starting from zero in `currency`.
///
/// # Errors
///
/// Returns [`PriceError::Money`] if any price is in a different currency.
pub fn sum<'p>(
    prices: impl IntoIterator<Item = &'p Price>,
    currency: &'static Currency,
) -> Result<Price, PriceError> {
    prices
        .into_iter()
        .try_fold(zero(currency), |acc, price| Ok(acc.add(*price)?))
}

/// Divide a price by a whole number, rounding to the nearest minor unit.
///
/// # Errors
///
/// Returns [`PriceError::DivideByZero`] for a zero divisor, or
/// [`PriceError::Conversion`] if the result cannot be represented.
pub fn divide(price: &Price, divisor: usize) -> Result<Price, PriceError> {
    if divisor == 0 {
        return Err(PriceError::DivideByZero);
    }

    let minor = Decimal::from_i64(price.to_minor_units()).ok_or(PriceError::Conversion)?;
    let divisor = Decimal::from_usize(divisor).ok_or(PriceError::Conversion)?;

    let divided = minor
        .checked_div(divisor)
        .ok_or(PriceError::Conversion)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(PriceError::Conversion)?;

    Ok(Money::from_minor(divided, price.currency()))
}

/// Multiply a price by a whole quantity.
///
/// # Errors
///
/// Returns [`PriceError::Conversion`] on overflow.
pub fn multiply(price: &Price, quantity: u32) -> Result<Price, PriceError> {
    let minor = price
        .to_minor_units()
        .checked_mul(i64::from(quantity))
        .ok_or(PriceError::Conversion)?;

    Ok(Money::from_minor(minor, price.currency()))
}

/// Calculate `percent` of an amount in minor units.
///
/// # Errors
///
/// Returns [`PriceError::Conversion`] if the calculation overflows.
pub fn percent_of_minor(percent: &Percentage, minor: i64) -> Result<i64, PriceError> {
    let minor = Decimal::from_i64(minor).ok_or(PriceError::Conversion)?;

    ((*percent) * Decimal::ONE)
        .checked_mul(minor)
        .ok_or(PriceError::Conversion)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(PriceError::Conversion)
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{BRL, USD};
    use testresult::TestResult;

    use super::*;

    #[test]
    fn sum_adds_prices() -> TestResult {
        let prices = [Money::from_minor(30_00, BRL), Money::from_minor(50_00, BRL)];

        assert_eq!(sum(&prices, BRL)?, Money::from_minor(80_00, BRL));

        Ok(())
    }

    #[test]
    fn sum_of_nothing_is_zero() -> TestResult {
        let empty: [Price; 0] = [];

        assert_eq!(sum(&empty, BRL)?, zero(BRL));

        Ok(())
    }

    #[test]
    fn sum_rejects_mixed_currencies() {
        let prices = [Money::from_minor(100, BRL), Money::from_minor(100, USD)];

        assert!(matches!(sum(&prices, BRL), Err(PriceError::Money(_))));
    }

    #[test]
    fn divide_rounds_half_away_from_zero() -> TestResult {
        let price = Money::from_minor(1001, BRL);

        assert_eq!(divide(&price, 2)?, Money::from_minor(501, BRL));
        assert_eq!(divide(&price, 3)?, Money::from_minor(334, BRL));

        Ok(())
    }

    #[test]
    fn divide_by_zero_is_rejected() {
        let price = Money::from_minor(1000, BRL);

        assert_eq!(divide(&price, 0), Err(PriceError::DivideByZero));
    }

    #[test]
    fn multiply_scales_by_quantity() -> TestResult {
        let price = Money::from_minor(54_00, BRL);

        assert_eq!(multiply(&price, 3)?, Money::from_minor(162_00, BRL));

        Ok(())
    }

    #[test]
    fn multiply_overflow_is_rejected() {
        let price = Money::from_minor(i64::MAX, BRL);

        assert_eq!(multiply(&price, 2), Err(PriceError::Conversion));
    }

    #[test]
    fn percent_of_minor_calculates_correctly() -> TestResult {
        let percent = Percentage::from(0.10);

        assert_eq!(percent_of_minor(&percent, 60_00)?, 6_00);

        Ok(())
    }

    #[test]
    fn percent_of_minor_overflow_returns_error() {
        let percent = Percentage::from(2.0);

        assert_eq!(
            percent_of_minor(&percent, i64::MAX),
            Err(PriceError::Conversion)
        );
    }
}
