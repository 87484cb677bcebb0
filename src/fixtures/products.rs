//! Product Fixtures

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, prelude::ToPrimitive};
use rusty_money::{
    Money,
    iso::{BRL, Currency, EUR, GBP, USD},
};
use serde::Deserialize;

use crate::{
    fixtures::FixtureError,
    options::{GroupKind, OptionGroup, OptionItem, SelectionType},
    prices::Price,
};

/// Flavor product in YAML
#[derive(Debug, Deserialize)]
pub struct ProductFixture {
    /// Lookup key, e.g. `calabresa`
    pub key: String,

    /// Product name
    pub name: String,

    /// Category key
    pub category: String,

    /// Base price (e.g., "45.00 BRL")
    pub price: String,

    /// Option groups attached to the product, size group included
    #[serde(default)]
    pub option_groups: Vec<OptionGroupFixture>,
}

/// Option group in YAML
#[derive(Debug, Deserialize)]
pub struct OptionGroupFixture {
    /// Group name
    pub name: String,

    /// Group kind; inferred from the name when missing
    #[serde(default)]
    pub kind: Option<GroupKind>,

    /// Single or multiple selection
    #[serde(default)]
    pub selection: SelectionType,

    /// Whether the group must be answered
    #[serde(default)]
    pub required: bool,

    /// Minimum number of options
    #[serde(default)]
    pub min_selections: usize,

    /// Maximum number of options
    #[serde(default)]
    pub max_selections: Option<usize>,

    /// Options in sort order
    #[serde(default)]
    pub options: Vec<PricedFixture>,
}

/// Any named, priced row: option, size, dough type or crust flavor
#[derive(Debug, Deserialize)]
pub struct PricedFixture {
    /// Display name
    pub name: String,

    /// Price (e.g., "8.00 BRL")
    pub price: String,
}

impl PricedFixture {
    /// Parse the price of this row.
    ///
    /// # Errors
    ///
    /// Returns an error if the price is malformed.
    pub fn parsed_price(&self) -> Result<Price, FixtureError> {
        let (minor_units, currency) = parse_price(&self.price)?;

        Ok(Money::from_minor(minor_units, currency))
    }
}

impl TryFrom<OptionGroupFixture> for OptionGroup {
    type Error = FixtureError;

    fn try_from(fixture: OptionGroupFixture) -> Result<Self, Self::Error> {
        let kind = fixture
            .kind
            .unwrap_or_else(|| GroupKind::infer(&fixture.name));

        let options = fixture
            .options
            .iter()
            .map(|option| Ok(OptionItem::new(option.name.clone(), option.parsed_price()?)))
            .collect::<Result<Vec<_>, FixtureError>>()?;

        let mut group =
            OptionGroup::new(fixture.name, kind, fixture.selection).with_options(options);

        if fixture.max_selections.is_some() {
            group = group.with_max_selections(fixture.max_selections);
        }

        group.min_selections = fixture.min_selections;

        if fixture.required {
            group = group.required();
        }

        Ok(group)
    }
}

/// Parse price string (e.g., "45.00 BRL") into minor units and currency
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY",
/// if the amount cannot be parsed as a decimal, or if the currency code
/// is not recognized.
pub fn parse_price(s: &str) -> Result<(i64, &'static Currency), FixtureError> {
    let parts: Vec<&str> = s.split_whitespace().collect();

    if parts.len() != 2 {
        return Err(FixtureError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    }

    let amount = parts
        .first()
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?
        .parse::<Decimal>()
        .map_err(|_err| FixtureError::InvalidPrice(s.to_string()))?;

    let minor_units = amount
        .checked_mul(Decimal::new(100, 0))
        .and_then(|value| value.round_dp(0).to_i64())
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    let currency_code = parts
        .get(1)
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    let currency = match *currency_code {
        "BRL" => BRL,
        "GBP" => GBP,
        "USD" => USD,
        "EUR" => EUR,
        other => return Err(FixtureError::UnknownCurrency(other.to_string())),
    };

    Ok((minor_units, currency))
}

/// Parse percentage string (e.g., "10%" or "0.10") into a `Percentage`
///
/// # Errors
///
/// Returns an error if the string cannot be parsed or falls outside 0-100%.
pub fn parse_percentage(s: &str) -> Result<Percentage, FixtureError> {
    let trimmed = s.trim();

    let value = match trimmed.strip_suffix('%') {
        Some(percent_str) => {
            percent_str
                .trim()
                .parse::<f64>()
                .map_err(|_err| FixtureError::InvalidPercentage(s.to_string()))?
                / 100.0
        }
        None => trimmed
            .parse::<f64>()
            .map_err(|_err| FixtureError::InvalidPercentage(s.to_string()))?,
    };

    if !(0.0..=1.0).contains(&value) {
        return Err(FixtureError::InvalidPercentage(s.to_string()));
    }

    Ok(Percentage::from(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_price_reads_reais() -> Result<(), FixtureError> {
        let (minor, currency) = parse_price("45.90 BRL")?;

        assert_eq!(minor, 45_90);
        assert_eq!(currency, BRL);

        Ok(())
    }

    #[test]
    fn parse_price_rejects_invalid_format() {
        let result = parse_price("45.00BRL");

        assert!(matches!(result, Err(FixtureError::InvalidPrice(_))));
    }

    #[test]
    fn parse_price_rejects_unknown_currency() {
        let result = parse_price("2.99 ABC");

        assert!(matches!(result, Err(FixtureError::UnknownCurrency(code)) if code == "ABC"));
    }

    #[test]
    fn parse_percentage_accepts_both_formats() -> Result<(), FixtureError> {
        assert_eq!(parse_percentage(" 10% ")?, Percentage::from(0.10));
        assert_eq!(parse_percentage("0.10")?, Percentage::from(0.10));

        Ok(())
    }

    #[test]
    fn parse_percentage_rejects_out_of_range() {
        assert!(matches!(
            parse_percentage("150%"),
            Err(FixtureError::InvalidPercentage(_))
        ));
        assert!(matches!(
            parse_percentage("-0.5"),
            Err(FixtureError::InvalidPercentage(_))
        ));
    }

    #[test]
    fn group_kind_is_inferred_when_missing() -> Result<(), FixtureError> {
        let fixture: OptionGroupFixture = serde_norway::from_str(
            "name: Bordas Recheadas\noptions:\n  - name: Catupiry\n    price: \"8.00 BRL\"\n",
        )?;

        let group = OptionGroup::try_from(fixture)?;

        assert_eq!(group.kind, GroupKind::Crust);
        assert_eq!(group.max_selections, Some(1));
        assert_eq!(group.options.len(), 1);

        Ok(())
    }

    #[test]
    fn explicit_kind_wins_over_name() -> Result<(), FixtureError> {
        let fixture: OptionGroupFixture = serde_norway::from_str(
            "name: Massa extra\nkind: addon\nselection: multiple\nmax_selections: 2\n",
        )?;

        let group = OptionGroup::try_from(fixture)?;

        assert_eq!(group.kind, GroupKind::Addon);
        assert_eq!(group.selection, SelectionType::Multiple);
        assert_eq!(group.max_selections, Some(2));

        Ok(())
    }
}
