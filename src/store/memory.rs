//! In-memory menu store

use async_trait::async_trait;
use rustc_hash::FxHashMap;

use crate::{
    options::{CrustFlavor, DoughType, GroupKind, OptionGroup},
    products::{CategoryUuid, ProductUuid},
    sizes::CategorySize,
    store::{MenuStore, StoreError},
};

/// Menu tables held in memory, typically loaded from a fixture.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMenuStore {
    option_groups: FxHashMap<ProductUuid, Vec<OptionGroup>>,
    category_sizes: FxHashMap<CategoryUuid, Vec<CategorySize>>,
    dough_types: FxHashMap<CategoryUuid, Vec<DoughType>>,
    crust_flavors: FxHashMap<CategoryUuid, Vec<CrustFlavor>>,
}

impl InMemoryMenuStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach an option group to a product, after any already attached.
    pub fn add_option_group(&mut self, product: ProductUuid, group: OptionGroup) -> &mut Self {
        self.option_groups.entry(product).or_default().push(group);
        self
    }

    /// Add a row to a category's size table.
    pub fn add_category_size(&mut self, category: CategoryUuid, size: CategorySize) -> &mut Self {
        self.category_sizes.entry(category).or_default().push(size);
        self
    }

    /// Add a dough type to a category.
    pub fn add_dough_type(&mut self, category: CategoryUuid, dough: DoughType) -> &mut Self {
        self.dough_types.entry(category).or_default().push(dough);
        self
    }

    /// Link a crust flavor to a category.
    pub fn add_crust_flavor(&mut self, category: CategoryUuid, crust: CrustFlavor) -> &mut Self {
        self.crust_flavors.entry(category).or_default().push(crust);
        self
    }
}

#[async_trait]
impl MenuStore for InMemoryMenuStore {
    async fn product_option_groups(
        &self,
        product: ProductUuid,
    ) -> Result<Vec<OptionGroup>, StoreError> {
        Ok(self.option_groups.get(&product).cloned().unwrap_or_default())
    }

    async fn product_size_group(
        &self,
        product: ProductUuid,
    ) -> Result<Option<OptionGroup>, StoreError> {
        Ok(self
            .option_groups
            .get(&product)
            .and_then(|groups| groups.iter().find(|group| group.kind == GroupKind::Size))
            .cloned())
    }

    async fn category_sizes(
        &self,
        category: CategoryUuid,
    ) -> Result<Vec<CategorySize>, StoreError> {
        Ok(self.category_sizes.get(&category).cloned().unwrap_or_default())
    }

    async fn dough_types(&self, category: CategoryUuid) -> Result<Vec<DoughType>, StoreError> {
        Ok(self.dough_types.get(&category).cloned().unwrap_or_default())
    }

    async fn crust_flavors(
        &self,
        category: CategoryUuid,
    ) -> Result<Vec<CrustFlavor>, StoreError> {
        Ok(self.crust_flavors.get(&category).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::{Money, iso::BRL};
    use testresult::TestResult;

    use crate::options::{OptionItem, OptionUuid, SelectionType};

    use super::*;

    #[tokio::test]
    async fn size_group_is_found_among_product_groups() -> TestResult {
        let product = ProductUuid::new();
        let mut store = InMemoryMenuStore::new();

        store
            .add_option_group(
                product,
                OptionGroup::new("Adicionais", GroupKind::Addon, SelectionType::Multiple),
            )
            .add_option_group(
                product,
                OptionGroup::new("Tamanho", GroupKind::Size, SelectionType::Single)
                    .with_options([OptionItem::new("Grande", Money::from_minor(55_00, BRL))]),
            );

        let size = store.product_size_group(product).await?;

        assert_eq!(size.map(|group| group.name), Some("Tamanho".to_string()));
        assert_eq!(store.product_option_groups(product).await?.len(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn unknown_ids_return_empty_rows() -> TestResult {
        let store = InMemoryMenuStore::new();
        let category = CategoryUuid::new();

        assert!(store.product_option_groups(ProductUuid::new()).await?.is_empty());
        assert_eq!(store.product_size_group(ProductUuid::new()).await?, None);
        assert!(store.category_sizes(category).await?.is_empty());
        assert!(store.dough_types(category).await?.is_empty());
        assert!(store.crust_flavors(category).await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn category_tables_keep_insertion_order() -> TestResult {
        let category = CategoryUuid::new();
        let mut store = InMemoryMenuStore::new();

        for name in ["Tradicional", "Integral", "Fina"] {
            store.add_dough_type(
                category,
                DoughType {
                    uuid: OptionUuid::new(),
                    name: name.to_string(),
                    price: Money::from_minor(0, BRL),
                },
            );
        }

        let names: Vec<String> = store
            .dough_types(category)
            .await?
            .into_iter()
            .map(|dough| dough.name)
            .collect();

        assert_eq!(names, vec!["Tradicional", "Integral", "Fina"]);

        Ok(())
    }
}
