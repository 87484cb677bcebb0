//! Menu store
//!
//! Read-only access to the menu tables the resolver needs. Every query filters by one
//! identifier and returns rows in sort order.

use async_trait::async_trait;
use mockall::automock;
use thiserror::Error;

use crate::{
    options::{CrustFlavor, DoughType, OptionGroup},
    products::{CategoryUuid, ProductUuid},
    sizes::CategorySize,
};

pub mod memory;

pub use memory::InMemoryMenuStore;

/// Errors raised by a menu store.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
    /// The store could not be reached or failed mid-query.
    #[error("menu store unavailable: {0}")]
    Unavailable(String),
}

/// Read-only menu tables.
#[automock]
#[async_trait]
pub trait MenuStore: Send + Sync {
    /// All option groups attached to a product, size groups included.
    async fn product_option_groups(
        &self,
        product: ProductUuid,
    ) -> Result<Vec<OptionGroup>, StoreError>;

    /// The product's size group, if it has one.
    async fn product_size_group(
        &self,
        product: ProductUuid,
    ) -> Result<Option<OptionGroup>, StoreError>;

    /// Category-level size table.
    async fn category_sizes(
        &self,
        category: CategoryUuid,
    ) -> Result<Vec<CategorySize>, StoreError>;

    /// Dough types offered in a category.
    async fn dough_types(&self, category: CategoryUuid) -> Result<Vec<DoughType>, StoreError>;

    /// Crust flavors linked to a category.
    async fn crust_flavors(
        &self,
        category: CategoryUuid,
    ) -> Result<Vec<CrustFlavor>, StoreError>;
}
