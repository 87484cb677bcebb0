//! Cart emission
//!
//! A finished half-and-half item becomes one cart line. Its unit price already includes
//! every option, so the options attached to the line are zero-priced descriptions. A
//! sentinel "Meio a meio" option carries the flavor product ids for stock deduction
//! further down the line.

use async_trait::async_trait;
use mockall::automock;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::{
    options::{GroupKind, OptionGroupUuid, OptionUuid},
    prices::{self, Price},
    products::{FlavorProduct, ProductUuid},
    selection::SelectedOption,
    sizes::ResolvedSize,
    uuids::TypedUuid,
};

/// Name of the sentinel option carrying the flavor ids.
pub const HALF_HALF_OPTION_NAME: &str = "Meio a meio";

/// Cart line UUID
pub type CartLineUuid = TypedUuid<CartLineItem>;

/// Errors raised by a cart store.
#[derive(Debug, Error, PartialEq)]
pub enum CartError {
    /// The cart rejected the line.
    #[error("cart rejected line: {0}")]
    Rejected(String),
}

/// An option attached to a cart line.
#[derive(Debug, Clone, PartialEq)]
pub struct CartOption {
    /// Source group, if the option came from one
    pub group_id: Option<OptionGroupUuid>,

    /// Group display name
    pub group_name: String,

    /// Source option, if the option came from one
    pub option_id: Option<OptionUuid>,

    /// Option display name
    pub name: String,

    /// Price charged on top of the unit price; always zero for half-and-half lines
    pub price: Price,

    /// Flavor products making up the item, set on the sentinel option only
    pub half_half_flavor_product_ids: Option<Vec<ProductUuid>>,
}

/// One line in the cart.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLineItem {
    /// Line identifier
    pub uuid: CartLineUuid,

    /// Product the line is filed under: the reference flavor
    pub product_id: ProductUuid,

    /// Price of one item, options and discount included
    pub unit_price: Price,

    /// Number of items
    pub quantity: u32,

    /// Human-readable description of flavors, size and options
    pub notes: String,

    /// Options, zero-priced, plus the half-and-half sentinel
    pub options: Vec<CartOption>,
}

impl CartLineItem {
    /// Flavor product ids from the sentinel option, if present.
    pub fn half_half_flavor_product_ids(&self) -> Option<&[ProductUuid]> {
        self.options
            .iter()
            .find_map(|option| option.half_half_flavor_product_ids.as_deref())
    }
}

/// Everything needed to emit a half-and-half line.
#[derive(Debug)]
pub struct LineRequest<'a> {
    /// Reference flavor
    pub reference: ProductUuid,

    /// Flavors in selection order
    pub flavors: &'a [FlavorProduct],

    /// Number of flavor slots
    pub max_flavors: usize,

    /// Chosen size
    pub size: &'a ResolvedSize,

    /// Chosen options
    pub options: &'a [SelectedOption],

    /// Price of one item
    pub unit_price: Price,

    /// Number of items
    pub quantity: u32,

    /// Free-form customer notes
    pub customer_notes: Option<&'a str>,
}

/// Build the cart line for a half-and-half item.
pub fn build_line_item(request: &LineRequest<'_>) -> CartLineItem {
    let zero = prices::zero(request.unit_price.currency());

    let mut options: Vec<CartOption> = request
        .options
        .iter()
        .map(|option| CartOption {
            group_id: Some(option.group),
            group_name: option.group_name.clone(),
            option_id: Some(option.option),
            name: option.name.clone(),
            price: zero,
            half_half_flavor_product_ids: None,
        })
        .collect();

    options.push(CartOption {
        group_id: None,
        group_name: HALF_HALF_OPTION_NAME.to_string(),
        option_id: None,
        name: HALF_HALF_OPTION_NAME.to_string(),
        price: zero,
        half_half_flavor_product_ids: Some(request.flavors.iter().map(|f| f.uuid).collect()),
    });

    CartLineItem {
        uuid: CartLineUuid::new(),
        product_id: request.reference,
        unit_price: request.unit_price,
        quantity: request.quantity,
        notes: line_notes(request),
        options,
    }
}

/// Describe flavors, size and options, e.g.
/// `Meio a meio Grande: 1/2 Calabresa, 1/2 Margherita | Massa: Tradicional | Obs: sem cebola`.
pub fn line_notes(request: &LineRequest<'_>) -> String {
    let fraction = format!("1/{}", request.max_flavors);

    let flavors = request
        .flavors
        .iter()
        .map(|flavor| format!("{fraction} {}", flavor.name))
        .collect::<Vec<_>>()
        .join(", ");

    let mut sections = vec![format!(
        "{HALF_HALF_OPTION_NAME} {}: {flavors}",
        request.size.label
    )];

    for (label, kind) in [
        ("Massa", GroupKind::Dough),
        ("Borda", GroupKind::Crust),
        ("Adicionais", GroupKind::Addon),
    ] {
        let names = request
            .options
            .iter()
            .filter(|option| option.kind == kind)
            .map(|option| option.name.as_str())
            .collect::<Vec<_>>();

        if !names.is_empty() {
            sections.push(format!("{label}: {}", names.join(", ")));
        }
    }

    if let Some(customer_notes) = request
        .customer_notes
        .map(str::trim)
        .filter(|text| !text.is_empty())
    {
        sections.push(format!("Obs: {customer_notes}"));
    }

    sections.join(" | ")
}

/// The cart the finished item is added to.
#[automock]
#[async_trait]
pub trait CartStore: Send + Sync {
    /// Add a line to the cart.
    async fn add_item(&self, item: CartLineItem) -> Result<(), CartError>;
}

/// Cart held in memory.
#[derive(Debug, Default)]
pub struct InMemoryCart {
    lines: Mutex<Vec<CartLineItem>>,
}

impl InMemoryCart {
    /// Create an empty cart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the cart lines.
    pub async fn lines(&self) -> Vec<CartLineItem> {
        self.lines.lock().await.clone()
    }
}

#[async_trait]
impl CartStore for InMemoryCart {
    async fn add_item(&self, item: CartLineItem) -> Result<(), CartError> {
        self.lines.lock().await.push(item);

        Ok(())
    }
}
