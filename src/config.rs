//! Category configuration

use decimal_percentage::Percentage;
use thiserror::Error;

use crate::{options::ReferencePolicy, pricing::PricingRule};

/// Errors raised by invalid category configuration.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// A half-and-half item needs at least one flavor slot.
    #[error("max flavors must be at least 1, got {0}")]
    InvalidMaxFlavors(usize),
}

/// Per-category half-and-half behaviour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HalfHalfConfig {
    /// Number of flavor slots in one item
    pub max_flavors: usize,

    /// How flavor prices combine into the base price
    pub pricing_rule: PricingRule,

    /// Offer stuffed crust choices
    pub allow_crust: bool,

    /// Charge the crust price modifier; when unset the crust is free
    pub allow_crust_extra_price: bool,

    /// Offer addon groups
    pub allow_addons: bool,

    /// Which flavor's option groups populate the options step
    pub option_source: ReferencePolicy,

    /// Discount applied to base plus options
    pub discount: Percentage,
}

impl Default for HalfHalfConfig {
    fn default() -> Self {
        Self {
            max_flavors: 2,
            pricing_rule: PricingRule::Highest,
            allow_crust: true,
            allow_crust_extra_price: true,
            allow_addons: true,
            option_source: ReferencePolicy::Cheapest,
            discount: Percentage::from(0.0),
        }
    }
}

impl HalfHalfConfig {
    /// Check the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidMaxFlavors`] when `max_flavors` is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_flavors == 0 {
            return Err(ConfigError::InvalidMaxFlavors(self.max_flavors));
        }

        Ok(())
    }

    /// Whether the wizard shows an options step at all.
    pub fn has_options_step(&self) -> bool {
        self.allow_crust || self.allow_addons
    }
}
