//! Size resolution
//!
//! Each flavor may carry its own size group whose option prices are absolute prices
//! ("Grande: R$ 55,00"), not modifiers. The sizes offered for a half-and-half item are
//! the union of every flavor's sizes; a flavor that lacks a size is charged its base
//! price for it. When no flavor has a size group, the category size table is used with
//! one flat price per size.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tracing::debug;

use crate::{
    names::normalize_name,
    options::OptionGroup,
    prices::{self, Price, PriceError},
    products::{FlavorProduct, ProductUuid},
};

/// Category-level size row, used when flavors have no size groups.
#[derive(Debug, Clone, PartialEq)]
pub struct CategorySize {
    /// Display name
    pub name: String,

    /// Flat price for any flavor
    pub price: Price,
}

/// A size offered for the item, with a price for every candidate flavor.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSize {
    /// Normalized size name
    pub key: String,

    /// First-seen display name
    pub label: String,

    /// Price shown next to the size
    pub display_price: Price,

    /// Price per flavor, in flavor order
    pub flavor_prices: SmallVec<[(ProductUuid, Price); 4]>,
}

impl ResolvedSize {
    /// Price of one flavor at this size.
    pub fn price_for(&self, flavor: ProductUuid) -> Option<Price> {
        self.flavor_prices
            .iter()
            .find(|(uuid, _)| *uuid == flavor)
            .map(|(_, price)| *price)
    }
}

/// Map each normalized size name of a size group to its absolute price.
pub fn size_table(group: &OptionGroup) -> FxHashMap<String, Price> {
    let mut table = FxHashMap::default();

    for option in &group.options {
        table.entry(normalize_name(&option.name)).or_insert(option.price);
    }

    table
}

/// Resolve the sizes offered across flavors from their size groups.
///
/// `size_groups` pairs each flavor with its size group, if it has one. Returns an empty
/// list when no flavor has a size group.
pub fn resolve_sizes(
    flavors: &[FlavorProduct],
    size_groups: &FxHashMap<ProductUuid, OptionGroup>,
) -> Vec<ResolvedSize> {
    let mut order: Vec<(String, String)> = Vec::new();
    let mut tables: FxHashMap<ProductUuid, FxHashMap<String, Price>> = FxHashMap::default();

    for flavor in flavors {
        let Some(group) = size_groups.get(&flavor.uuid) else {
            continue;
        };

        for option in &group.options {
            let key = normalize_name(&option.name);

            if !order.iter().any(|(seen, _)| *seen == key) {
                order.push((key, option.name.trim().to_string()));
            }
        }

        tables.insert(flavor.uuid, size_table(group));
    }

    let sizes: Vec<ResolvedSize> = order
        .into_iter()
        .filter_map(|(key, label)| {
            let flavor_prices: SmallVec<[(ProductUuid, Price); 4]> = flavors
                .iter()
                .map(|flavor| {
                    let price = tables
                        .get(&flavor.uuid)
                        .and_then(|table| table.get(&key))
                        .copied()
                        .unwrap_or(flavor.price);

                    (flavor.uuid, price)
                })
                .collect();

            // The first flavor that defines the size sets the displayed price.
            let display_price = flavors
                .iter()
                .find_map(|flavor| tables.get(&flavor.uuid)?.get(&key).copied())?;

            Some(ResolvedSize {
                key,
                label,
                display_price,
                flavor_prices,
            })
        })
        .collect();

    debug!(
        flavors = flavors.len(),
        sizes = sizes.len(),
        "resolved per-flavor sizes"
    );

    sizes
}

/// Resolve sizes from the category size table, charging the flat price for every flavor.
pub fn resolve_category_sizes(
    flavors: &[FlavorProduct],
    category_sizes: &[CategorySize],
) -> Vec<ResolvedSize> {
    let mut sizes: Vec<ResolvedSize> = Vec::with_capacity(category_sizes.len());

    for size in category_sizes {
        let key = normalize_name(&size.name);

        if sizes.iter().any(|resolved| resolved.key == key) {
            continue;
        }

        sizes.push(ResolvedSize {
            key,
            label: size.name.trim().to_string(),
            display_price: size.price,
            flavor_prices: flavors.iter().map(|flavor| (flavor.uuid, size.price)).collect(),
        });
    }

    sizes
}

/// Per-slot price shown as a hint next to a size: `display_price / max_flavors`.
///
/// Display only. The committed price comes from the pricing rule applied to the chosen
/// flavors' own prices, and the hints need not add up to it.
///
/// # Errors
///
/// Returns [`PriceError::DivideByZero`] when `max_flavors` is zero.
pub fn half_price_hint(size: &ResolvedSize, max_flavors: usize) -> Result<Price, PriceError> {
    prices::divide(&size.display_price, max_flavors)
}
