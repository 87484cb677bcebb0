//! Pricing
//!
//! Half-and-half prices are computed in two stages. The base price combines the
//! per-flavor prices for the chosen size using the category's [`PricingRule`]; option
//! modifiers are then added, the category discount applied, and the result multiplied
//! by quantity.
//!
//! The running total shown while flavors are still being picked and the price the
//! item is committed at are separate functions: [`preview_base_price`] accepts a
//! partial selection, [`committed_base_price`] insists on a full one.

use std::{fmt, str::FromStr};

use decimal_percentage::Percentage;
use rusty_money::{Money, MoneyError, iso::Currency};
use serde::Deserialize;
use thiserror::Error;

use crate::{
    options::GroupKind,
    prices::{self, Price, PriceError},
    selection::SelectedOption,
};

/// Errors raised while pricing a half-and-half item.
#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    /// A price was requested for an empty flavor list.
    #[error("cannot price an item with no flavors")]
    NoFlavors,

    /// More flavors than slots.
    #[error("at most {max} flavors allowed, got {selected}")]
    TooManyFlavors {
        /// Number of flavor slots
        max: usize,
        /// Number of flavors supplied
        selected: usize,
    },

    /// A committed price needs every slot filled.
    #[error("select {required} flavors (selected {selected})")]
    IncompleteSelection {
        /// Number of flavor slots
        required: usize,
        /// Number of flavors supplied
        selected: usize,
    },

    /// A half-and-half item needs at least one slot.
    #[error("max flavors must be at least 1")]
    InvalidMaxFlavors,

    /// Quantity must be positive.
    #[error("quantity must be at least 1")]
    InvalidQuantity,

    /// Minor-unit arithmetic failed.
    #[error(transparent)]
    Price(#[from] PriceError),

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// How flavor prices combine into one base price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PricingRule {
    /// Charge the most expensive flavor.
    #[default]
    Highest,

    /// Charge the average flavor price.
    Average,

    /// Charge each flavor's share; arithmetically identical to [`PricingRule::Average`]
    /// over a full selection.
    Sum,
}

impl fmt::Display for PricingRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PricingRule::Highest => "highest",
            PricingRule::Average => "average",
            PricingRule::Sum => "sum",
        })
    }
}

/// Error returned when parsing an unknown pricing rule.
#[derive(Debug, Error, PartialEq)]
#[error("unknown pricing rule: {0}")]
pub struct UnknownPricingRule(pub String);

impl FromStr for PricingRule {
    type Err = UnknownPricingRule;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "highest" | "maior" => Ok(PricingRule::Highest),
            "average" | "media" | "média" => Ok(PricingRule::Average),
            "sum" | "soma" => Ok(PricingRule::Sum),
            _ => Err(UnknownPricingRule(s.to_string())),
        }
    }
}

/// Base price for a possibly partial flavor selection.
///
/// With fewer than `max_flavors` flavors the result is divided across all slots, so
/// the preview grows as flavors are added.
///
/// # Errors
///
/// - [`PricingError::InvalidMaxFlavors`]: `max_flavors` is zero.
/// - [`PricingError::NoFlavors`]: `flavor_prices` is empty.
/// - [`PricingError::TooManyFlavors`]: more prices than slots.
/// - [`PricingError::Price`] / [`PricingError::Money`]: arithmetic failure.
pub fn preview_base_price(
    rule: PricingRule,
    flavor_prices: &[Price],
    max_flavors: usize,
) -> Result<Price, PricingError> {
    if max_flavors == 0 {
        return Err(PricingError::InvalidMaxFlavors);
    }

    let first = flavor_prices.first().ok_or(PricingError::NoFlavors)?;

    if flavor_prices.len() > max_flavors {
        return Err(PricingError::TooManyFlavors {
            max: max_flavors,
            selected: flavor_prices.len(),
        });
    }

    let partial = flavor_prices.len() < max_flavors;

    let base = match rule {
        PricingRule::Highest => {
            let highest = flavor_prices
                .iter()
                .max_by_key(|price| price.to_minor_units())
                .unwrap_or(first);

            if partial {
                prices::divide(highest, max_flavors)?
            } else {
                *highest
            }
        }
        PricingRule::Average | PricingRule::Sum => {
            let total = prices::sum(flavor_prices, first.currency())?;
            let denominator = if partial { max_flavors } else { flavor_prices.len() };

            prices::divide(&total, denominator)?
        }
    };

    Ok(base)
}

/// Base price for a full flavor selection.
///
/// # Errors
///
/// - [`PricingError::IncompleteSelection`]: fewer flavor prices than `max_flavors`.
/// - Any error from [`preview_base_price`].
pub fn committed_base_price(
    rule: PricingRule,
    flavor_prices: &[Price],
    max_flavors: usize,
) -> Result<Price, PricingError> {
    if !flavor_prices.is_empty() && flavor_prices.len() < max_flavors {
        return Err(PricingError::IncompleteSelection {
            required: max_flavors,
            selected: flavor_prices.len(),
        });
    }

    preview_base_price(rule, flavor_prices, max_flavors)
}

/// Sum of option price modifiers.
///
/// Crust modifiers count as zero unless `allow_crust_extra_price` is set.
///
/// # Errors
///
/// Returns [`PricingError::Money`] if an option is priced in another currency.
pub fn options_total(
    selected: &[SelectedOption],
    allow_crust_extra_price: bool,
    currency: &'static Currency,
) -> Result<Price, PricingError> {
    let charged = selected
        .iter()
        .filter(|option| allow_crust_extra_price || option.kind != GroupKind::Crust)
        .map(|option| &option.price);

    Ok(prices::sum(charged, currency)?)
}

/// Apply a percentage discount, returning `(discount amount, discounted price)`.
///
/// # Errors
///
/// Returns [`PricingError::Price`] if the percentage cannot be applied safely.
pub fn apply_discount(
    subtotal: &Price,
    percent: &Percentage,
) -> Result<(Price, Price), PricingError> {
    let discount_minor = prices::percent_of_minor(percent, subtotal.to_minor_units())?;
    let discount = Money::from_minor(discount_minor, subtotal.currency());

    Ok((discount, (*subtotal).sub(discount)?))
}

/// Unit price times quantity.
///
/// # Errors
///
/// - [`PricingError::InvalidQuantity`]: `quantity` is zero.
/// - [`PricingError::Price`]: the product overflows.
pub fn line_total(unit_price: &Price, quantity: u32) -> Result<Price, PricingError> {
    if quantity == 0 {
        return Err(PricingError::InvalidQuantity);
    }

    Ok(prices::multiply(unit_price, quantity)?)
}

/// Full price breakdown of one line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceBreakdown {
    /// Combined flavor price
    pub base: Price,

    /// Charged option modifiers
    pub options: Price,

    /// Base plus options
    pub subtotal: Price,

    /// Discount taken off the subtotal
    pub discount: Price,

    /// Price of one item
    pub unit_price: Price,

    /// Number of items
    pub quantity: u32,

    /// Unit price times quantity
    pub total: Price,
}

/// Combine a base price and option total into a line breakdown.
///
/// # Errors
///
/// - [`PricingError::InvalidQuantity`]: `quantity` is zero.
/// - [`PricingError::Money`] / [`PricingError::Price`]: arithmetic failure.
pub fn quote(
    base: Price,
    options: Price,
    discount: &Percentage,
    quantity: u32,
) -> Result<PriceBreakdown, PricingError> {
    let subtotal = base.add(options)?;
    let (discount, unit_price) = apply_discount(&subtotal, discount)?;
    let total = line_total(&unit_price, quantity)?;

    Ok(PriceBreakdown {
        base,
        options,
        subtotal,
        discount,
        unit_price,
        quantity,
        total,
    })
}
