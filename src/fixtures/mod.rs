//! Fixtures
//!
//! Menus are described in YAML under `<base>/menus/<name>.yml`: categories with their
//! half-and-half settings and tables, and flavor products with their option groups.
//! Loading a menu fills an [`InMemoryMenuStore`].

use std::{fs, path::PathBuf, sync::Arc};

use rustc_hash::FxHashMap;
use rusty_money::{Money, iso::Currency};
use serde::Deserialize;
use thiserror::Error;

use crate::{
    config::{ConfigError, HalfHalfConfig},
    fixtures::{
        categories::CategoryFixture,
        products::{PricedFixture, ProductFixture, parse_price},
    },
    options::{CrustFlavor, DoughType, OptionGroup, OptionUuid},
    prices::Price,
    products::{CategoryUuid, FlavorProduct},
    session::{HalfHalfSession, SessionError},
    sizes::CategorySize,
    store::InMemoryMenuStore,
};

pub mod categories;
pub mod products;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Invalid percentage format
    #[error("Invalid percentage format: {0}")]
    InvalidPercentage(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Currency mismatch between prices
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// No prices loaded yet
    #[error("No prices loaded yet; currency unknown")]
    NoCurrency,

    /// Category not found
    #[error("Category not found: {0}")]
    CategoryNotFound(String),

    /// Product not found
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Product key used twice
    #[error("Duplicate product key: {0}")]
    DuplicateProduct(String),

    /// Invalid category configuration
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Session could not be opened
    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Menu file layout
#[derive(Debug, Deserialize)]
pub struct MenuFile {
    /// Map of category key -> category fixture
    pub categories: FxHashMap<String, CategoryFixture>,

    /// Flavor products in menu order
    #[serde(default)]
    pub products: Vec<ProductFixture>,
}

/// A loaded category.
#[derive(Debug, Clone)]
pub struct MenuCategory {
    /// Generated identifier
    pub uuid: CategoryUuid,

    /// Display name
    pub name: String,

    /// Half-and-half settings
    pub config: HalfHalfConfig,
}

/// Fixture
#[derive(Debug)]
pub struct Fixture {
    /// Base path for fixture files
    base_path: PathBuf,

    /// Menu tables
    store: InMemoryMenuStore,

    /// Category key -> category
    categories: FxHashMap<String, MenuCategory>,

    /// Products in menu order
    products: Vec<FlavorProduct>,

    /// Product key -> index into `products`
    product_keys: FxHashMap<String, usize>,

    /// Currency for the fixture set
    currency: Option<&'static Currency>,
}

impl Fixture {
    /// Create a new empty fixture with default base path
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a new empty fixture with custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            store: InMemoryMenuStore::new(),
            categories: FxHashMap::default(),
            products: Vec::new(),
            product_keys: FxHashMap::default(),
            currency: None,
        }
    }

    /// Create a fixture from the default base path and load one menu
    ///
    /// # Errors
    ///
    /// Returns an error if the menu cannot be loaded.
    pub fn from_menu(name: &str) -> Result<Self, FixtureError> {
        let mut fixture = Self::new();

        fixture.load_menu(name)?;

        Ok(fixture)
    }

    /// Load a menu from `<base>/menus/<name>.yml`
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, if prices mix currencies,
    /// or if a product refers to an unknown category.
    pub fn load_menu(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("menus").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;

        self.load_menu_str(&contents)
    }

    /// Load a menu from YAML text
    ///
    /// # Errors
    ///
    /// See [`Fixture::load_menu`].
    pub fn load_menu_str(&mut self, contents: &str) -> Result<&mut Self, FixtureError> {
        let menu: MenuFile = serde_norway::from_str(contents)?;

        for (key, category) in menu.categories {
            self.load_category(key, &category)?;
        }

        for product in menu.products {
            self.load_product(product)?;
        }

        Ok(self)
    }

    fn load_category(
        &mut self,
        key: String,
        fixture: &CategoryFixture,
    ) -> Result<(), FixtureError> {
        let uuid = CategoryUuid::new();
        let config = HalfHalfConfig::try_from(&fixture.half_half)?;

        for size in &fixture.sizes {
            let price = self.price(size)?;

            self.store.add_category_size(
                uuid,
                CategorySize {
                    name: size.name.clone(),
                    price,
                },
            );
        }

        for dough in &fixture.dough_types {
            let price = self.price(dough)?;

            self.store.add_dough_type(
                uuid,
                DoughType {
                    uuid: OptionUuid::new(),
                    name: dough.name.clone(),
                    price,
                },
            );
        }

        for crust in &fixture.crust_flavors {
            let price = self.price(crust)?;

            self.store.add_crust_flavor(
                uuid,
                CrustFlavor {
                    uuid: OptionUuid::new(),
                    name: crust.name.clone(),
                    price,
                },
            );
        }

        self.categories.insert(
            key,
            MenuCategory {
                uuid,
                name: fixture.name.clone(),
                config,
            },
        );

        Ok(())
    }

    fn load_product(&mut self, fixture: ProductFixture) -> Result<(), FixtureError> {
        if self.product_keys.contains_key(&fixture.key) {
            return Err(FixtureError::DuplicateProduct(fixture.key));
        }

        let category = self.category(&fixture.category)?.uuid;

        let (minor_units, currency) = parse_price(&fixture.price)?;
        self.check_currency(currency)?;

        let product = FlavorProduct::new(
            fixture.name,
            Money::from_minor(minor_units, currency),
            category,
        );

        for group in fixture.option_groups {
            for option in &group.options {
                self.price(option)?;
            }

            self.store
                .add_option_group(product.uuid, OptionGroup::try_from(group)?);
        }

        self.product_keys.insert(fixture.key, self.products.len());
        self.products.push(product);

        Ok(())
    }

    fn price(&mut self, fixture: &PricedFixture) -> Result<Price, FixtureError> {
        let price = fixture.parsed_price()?;

        self.check_currency(price.currency())?;

        Ok(price)
    }

    fn check_currency(&mut self, currency: &'static Currency) -> Result<(), FixtureError> {
        match self.currency {
            Some(existing) if existing != currency => Err(FixtureError::CurrencyMismatch(
                existing.iso_alpha_code.to_string(),
                currency.iso_alpha_code.to_string(),
            )),
            Some(_) => Ok(()),
            None => {
                self.currency = Some(currency);

                Ok(())
            }
        }
    }

    /// Get a category by key
    ///
    /// # Errors
    ///
    /// Returns an error if the category key is not found.
    pub fn category(&self, key: &str) -> Result<&MenuCategory, FixtureError> {
        self.categories
            .get(key)
            .ok_or_else(|| FixtureError::CategoryNotFound(key.to_string()))
    }

    /// Get a product by key
    ///
    /// # Errors
    ///
    /// Returns an error if the product key is not found.
    pub fn product(&self, key: &str) -> Result<&FlavorProduct, FixtureError> {
        self.product_keys
            .get(key)
            .and_then(|idx| self.products.get(*idx))
            .ok_or_else(|| FixtureError::ProductNotFound(key.to_string()))
    }

    /// Products of a category, in menu order
    ///
    /// # Errors
    ///
    /// Returns an error if the category key is not found.
    pub fn flavors(&self, category: &str) -> Result<Vec<FlavorProduct>, FixtureError> {
        let uuid = self.category(category)?.uuid;

        Ok(self
            .products
            .iter()
            .filter(|product| product.category == uuid)
            .cloned()
            .collect())
    }

    /// Menu tables loaded so far
    pub fn store(&self) -> &InMemoryMenuStore {
        &self.store
    }

    /// Get the currency of the fixture set
    ///
    /// # Errors
    ///
    /// Returns an error if no prices have been loaded yet.
    pub fn currency(&self) -> Result<&'static Currency, FixtureError> {
        self.currency.ok_or(FixtureError::NoCurrency)
    }

    /// Open a half-and-half session for a category, backed by this fixture's store
    ///
    /// # Errors
    ///
    /// Returns an error if the category is unknown, no prices are loaded, or the
    /// category configuration is invalid.
    pub fn open_session(&self, category: &str) -> Result<HalfHalfSession, FixtureError> {
        let menu_category = self.category(category)?;

        Ok(HalfHalfSession::open(
            menu_category.config,
            menu_category.uuid,
            self.flavors(category)?,
            Arc::new(self.store.clone()),
            self.currency()?,
        )?)
    }
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::{fs, path::Path};

    use rusty_money::iso::BRL;
    use testresult::TestResult;

    use crate::{options::GroupKind, store::MenuStore};

    use super::*;

    const MENU: &str = r#"
categories:
  pizzas:
    name: Pizzas
    half_half:
      pricing_rule: highest
    dough_types:
      - name: Tradicional
        price: "0.00 BRL"
    crust_flavors:
      - name: Catupiry
        price: "8.00 BRL"
products:
  - key: calabresa
    name: Calabresa
    category: pizzas
    price: "45.00 BRL"
    option_groups:
      - name: Tamanho
        options:
          - name: Grande
            price: "55.00 BRL"
  - key: margherita
    name: Margherita
    category: pizzas
    price: "42.00 BRL"
"#;

    fn write_menu(base: &Path, name: &str, contents: &str) -> TestResult {
        let dir = base.join("menus");

        fs::create_dir_all(&dir)?;
        fs::write(dir.join(format!("{name}.yml")), contents)?;

        Ok(())
    }

    #[tokio::test]
    async fn menu_fills_store_and_products() -> TestResult {
        let mut fixture = Fixture::new();

        fixture.load_menu_str(MENU)?;

        let category = fixture.category("pizzas")?.uuid;
        let calabresa = fixture.product("calabresa")?;

        assert_eq!(calabresa.price.to_minor_units(), 45_00);
        assert_eq!(fixture.currency()?, BRL);
        assert_eq!(fixture.flavors("pizzas")?.len(), 2);

        let size = fixture.store().product_size_group(calabresa.uuid).await?;

        assert_eq!(size.map(|group| group.kind), Some(GroupKind::Size));
        assert_eq!(fixture.store().dough_types(category).await?.len(), 1);
        assert_eq!(fixture.store().crust_flavors(category).await?.len(), 1);

        Ok(())
    }

    #[test]
    fn menu_loads_from_base_path() -> TestResult {
        let dir = tempfile::tempdir()?;

        write_menu(dir.path(), "casa", MENU)?;

        let mut fixture = Fixture::with_base_path(dir.path());

        fixture.load_menu("casa")?;

        assert_eq!(fixture.product("margherita")?.name, "Margherita");

        Ok(())
    }

    #[test]
    fn missing_menu_file_is_io_error() -> TestResult {
        let dir = tempfile::tempdir()?;
        let mut fixture = Fixture::with_base_path(dir.path());

        assert!(matches!(
            fixture.load_menu("nowhere"),
            Err(FixtureError::Io(_))
        ));

        Ok(())
    }

    #[test]
    fn mixed_currencies_are_rejected() {
        let menu = MENU.replace("\"42.00 BRL\"", "\"42.00 EUR\"");
        let mut fixture = Fixture::new();

        assert!(matches!(
            fixture.load_menu_str(&menu),
            Err(FixtureError::CurrencyMismatch(expected, found))
                if expected == "BRL" && found == "EUR"
        ));
    }

    #[test]
    fn product_in_unknown_category_is_rejected() {
        let menu = MENU.replace(
            "category: pizzas\n    price: \"42.00",
            "category: esfihas\n    price: \"42.00",
        );
        let mut fixture = Fixture::new();

        assert!(matches!(
            fixture.load_menu_str(&menu),
            Err(FixtureError::CategoryNotFound(key)) if key == "esfihas"
        ));
    }

    #[test]
    fn duplicate_product_key_is_rejected() {
        let menu = MENU.replace("key: margherita", "key: calabresa");
        let mut fixture = Fixture::new();

        assert!(matches!(
            fixture.load_menu_str(&menu),
            Err(FixtureError::DuplicateProduct(key)) if key == "calabresa"
        ));
    }

    #[test]
    fn unknown_keys_report_not_found() {
        let fixture = Fixture::new();

        assert!(matches!(
            fixture.product("calabresa"),
            Err(FixtureError::ProductNotFound(_))
        ));
        assert!(matches!(
            fixture.category("pizzas"),
            Err(FixtureError::CategoryNotFound(_))
        ));
        assert!(matches!(fixture.currency(), Err(FixtureError::NoCurrency)));
    }

    #[test]
    fn session_opens_for_category() -> TestResult {
        let mut fixture = Fixture::new();

        fixture.load_menu_str(MENU)?;

        let session = fixture.open_session("pizzas")?;

        assert_eq!(session.candidates().len(), 2);

        Ok(())
    }
}
