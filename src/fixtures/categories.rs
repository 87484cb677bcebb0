//! Category Fixtures

use serde::Deserialize;

use crate::{
    config::HalfHalfConfig,
    fixtures::{
        FixtureError,
        products::{PricedFixture, parse_percentage},
    },
    options::ReferencePolicy,
    pricing::PricingRule,
};

/// Category in YAML
#[derive(Debug, Deserialize)]
pub struct CategoryFixture {
    /// Display name
    pub name: String,

    /// Half-and-half behaviour
    #[serde(default)]
    pub half_half: HalfHalfFixture,

    /// Fallback sizes with one flat price each
    #[serde(default)]
    pub sizes: Vec<PricedFixture>,

    /// Dough types table
    #[serde(default)]
    pub dough_types: Vec<PricedFixture>,

    /// Crust flavors linked to the category
    #[serde(default)]
    pub crust_flavors: Vec<PricedFixture>,
}

/// Half-and-half configuration in YAML; every field is optional
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct HalfHalfFixture {
    /// Number of flavor slots
    pub max_flavors: usize,

    /// `highest`, `average` or `sum`
    pub pricing_rule: PricingRule,

    /// Offer stuffed crusts
    pub allow_crust: bool,

    /// Charge for stuffed crusts
    pub allow_crust_extra_price: bool,

    /// Offer addons
    pub allow_addons: bool,

    /// `cheapest`, `first`, `most_expensive` or `all`
    pub option_source: ReferencePolicy,

    /// Discount (e.g., "10%")
    pub discount: Option<String>,
}

impl Default for HalfHalfFixture {
    fn default() -> Self {
        let config = HalfHalfConfig::default();

        Self {
            max_flavors: config.max_flavors,
            pricing_rule: config.pricing_rule,
            allow_crust: config.allow_crust,
            allow_crust_extra_price: config.allow_crust_extra_price,
            allow_addons: config.allow_addons,
            option_source: config.option_source,
            discount: None,
        }
    }
}

impl TryFrom<&HalfHalfFixture> for HalfHalfConfig {
    type Error = FixtureError;

    fn try_from(fixture: &HalfHalfFixture) -> Result<Self, Self::Error> {
        let config = HalfHalfConfig {
            max_flavors: fixture.max_flavors,
            pricing_rule: fixture.pricing_rule,
            allow_crust: fixture.allow_crust,
            allow_crust_extra_price: fixture.allow_crust_extra_price,
            allow_addons: fixture.allow_addons,
            option_source: fixture.option_source,
            discount: fixture
                .discount
                .as_deref()
                .map(parse_percentage)
                .transpose()?
                .unwrap_or_else(|| HalfHalfConfig::default().discount),
        };

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use decimal_percentage::Percentage;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn missing_fields_use_defaults() -> TestResult {
        let fixture: CategoryFixture = serde_norway::from_str("name: Pizzas\n")?;

        let config = HalfHalfConfig::try_from(&fixture.half_half)?;

        assert_eq!(config, HalfHalfConfig::default());
        assert!(fixture.sizes.is_empty());

        Ok(())
    }

    #[test]
    fn half_half_settings_are_read() -> TestResult {
        let fixture: CategoryFixture = serde_norway::from_str(
            "name: Pizzas\n\
             half_half:\n  \
               max_flavors: 3\n  \
               pricing_rule: average\n  \
               allow_crust_extra_price: false\n  \
               option_source: most_expensive\n  \
               discount: \"10%\"\n",
        )?;

        let config = HalfHalfConfig::try_from(&fixture.half_half)?;

        assert_eq!(config.max_flavors, 3);
        assert_eq!(config.pricing_rule, PricingRule::Average);
        assert!(!config.allow_crust_extra_price);
        assert_eq!(config.option_source, ReferencePolicy::MostExpensive);
        assert_eq!(config.discount, Percentage::from(0.10));

        Ok(())
    }

    #[test]
    fn zero_slots_is_rejected() -> TestResult {
        let fixture: HalfHalfFixture = serde_norway::from_str("max_flavors: 0\n")?;

        assert!(matches!(
            HalfHalfConfig::try_from(&fixture),
            Err(FixtureError::Config(_))
        ));

        Ok(())
    }
}
