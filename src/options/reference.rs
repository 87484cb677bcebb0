//! Reference flavor selection
//!
//! Dough, crust and addon choices for a half-and-half item come from one flavor's
//! option groups (or from all of them, when the category says so).

use serde::Deserialize;
use smallvec::SmallVec;

use crate::{prices::Price, products::ProductUuid};

/// Which flavor's option groups populate the options step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferencePolicy {
    /// The cheapest flavor for the chosen size.
    #[default]
    Cheapest,

    /// The first flavor picked.
    First,

    /// The most expensive flavor for the chosen size.
    MostExpensive,

    /// Every selected flavor, with groups merged by name.
    All,
}

/// Pick the reference flavor from `(flavor, resolved price)` pairs in selection order.
///
/// Ties go to the earlier flavor. [`ReferencePolicy::All`] picks the first flavor.
pub fn pick_reference(
    policy: ReferencePolicy,
    priced: &[(ProductUuid, Price)],
) -> Option<ProductUuid> {
    let minor = |(_, price): &&(ProductUuid, Price)| price.to_minor_units();

    let picked = match policy {
        ReferencePolicy::First | ReferencePolicy::All => priced.first(),
        ReferencePolicy::Cheapest => priced.iter().min_by_key(minor),
        // `max_by_key` keeps the last maximum; reverse so the earliest wins ties.
        ReferencePolicy::MostExpensive => priced.iter().rev().max_by_key(minor),
    };

    picked.map(|(uuid, _)| *uuid)
}

/// Flavors whose option groups should be fetched under `policy`.
pub fn option_sources(
    policy: ReferencePolicy,
    priced: &[(ProductUuid, Price)],
) -> SmallVec<[ProductUuid; 4]> {
    match policy {
        ReferencePolicy::All => priced.iter().map(|(uuid, _)| *uuid).collect(),
        _ => pick_reference(policy, priced).into_iter().collect(),
    }
}
