//! Products

use crate::{prices::Price, uuids::TypedUuid};

/// Product UUID
pub type ProductUuid = TypedUuid<FlavorProduct>;

/// Category UUID
pub type CategoryUuid = TypedUuid<Category>;

/// Category marker type.
#[derive(Debug)]
pub struct Category;

/// A product that can fill one slot of a half-and-half item.
#[derive(Debug, Clone, PartialEq)]
pub struct FlavorProduct {
    /// Product identifier
    pub uuid: ProductUuid,

    /// Display name
    pub name: String,

    /// Base price, used when no size-specific price exists
    pub price: Price,

    /// Category the product belongs to
    pub category: CategoryUuid,
}

impl FlavorProduct {
    /// Create a flavor product with a fresh identifier.
    pub fn new(name: impl Into<String>, price: Price, category: CategoryUuid) -> Self {
        Self {
            uuid: ProductUuid::new(),
            name: name.into(),
            price,
            category,
        }
    }
}
