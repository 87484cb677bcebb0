//! Half-and-half session
//!
//! One [`HalfHalfSession`] lives for as long as the customer has the half-and-half
//! dialog open. It owns the wizard, the selections and the loaded menu data, and drops
//! all of it on close. Closing (dropping) the session cancels any load still in flight.

use std::{fmt, sync::Arc, time::Duration};

use rusty_money::iso::Currency;
use smallvec::SmallVec;
use thiserror::Error;
use tracing::{Span, debug, info};

use crate::{
    cart::{CartError, CartLineItem, CartStore, LineRequest, build_line_item},
    config::{ConfigError, HalfHalfConfig},
    loader::{self, LoadContext, OptionsState, SizesState},
    names::normalize_name,
    options::{
        CategorizedGroups, OptionGroup, OptionGroupUuid, OptionUuid, option_sources,
        pick_reference,
    },
    prices::Price,
    pricing::{self, PriceBreakdown, PricingError},
    products::{CategoryUuid, FlavorProduct, ProductUuid},
    selection::{FlavorSelection, OptionSelection, SelectedOption, SelectionError},
    sizes::ResolvedSize,
    store::MenuStore,
    wizard::{Step, Wizard, WizardError},
};

/// Errors surfaced to the customer while building a half-and-half item.
///
/// The `Display` text is meant to be shown as-is.
#[derive(Debug, Error, PartialEq)]
pub enum SessionError {
    /// The category configuration is unusable.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A size is needed first.
    #[error("choose a size first")]
    NoSizeSelected,

    /// The size is not offered for this item.
    #[error("size {0} is not available")]
    UnknownSize(String),

    /// At least one flavor is needed first.
    #[error("choose at least one flavor")]
    NoFlavors,

    /// The flavor is not a candidate for this item.
    #[error("flavor {0} is not available")]
    UnknownFlavor(ProductUuid),

    /// The number of flavors does not match the number of slots.
    #[error("select {required} flavors (selected {selected})")]
    FlavorCountMismatch {
        /// Number of flavor slots
        required: usize,
        /// Number of flavors picked
        selected: usize,
    },

    /// The option group is not offered for this item.
    #[error("option group {0} is not available")]
    UnknownGroup(OptionGroupUuid),

    /// Quantity must be at least one.
    #[error("quantity must be at least 1")]
    InvalidQuantity,

    /// Step navigation failed.
    #[error(transparent)]
    Wizard(#[from] WizardError),

    /// A selection change was rejected.
    #[error(transparent)]
    Selection(#[from] SelectionError),

    /// Pricing failed.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// The cart rejected the item.
    #[error(transparent)]
    Cart(#[from] CartError),
}

/// State of one open half-and-half dialog.
pub struct HalfHalfSession {
    config: HalfHalfConfig,
    category: CategoryUuid,
    candidates: Vec<FlavorProduct>,
    currency: &'static Currency,
    store: Arc<dyn MenuStore>,
    ctx: LoadContext,
    wizard: Wizard,
    sizes: Option<SizesState>,
    size: Option<ResolvedSize>,
    flavors: FlavorSelection,
    options: Option<(SmallVec<[ProductUuid; 4]>, OptionsState)>,
    chosen: OptionSelection,
    quantity: u32,
    notes: Option<String>,
}

impl fmt::Debug for HalfHalfSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HalfHalfSession")
            .field("category", &self.category)
            .field("step", &self.wizard.current())
            .field("size", &self.size.as_ref().map(|size| &size.label))
            .field("flavors", &self.flavors.len())
            .field("quantity", &self.quantity)
            .finish_non_exhaustive()
    }
}

impl HalfHalfSession {
    /// Open a session for one category.
    ///
    /// `candidates` are the flavor products the customer may pick from.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Config`] if the configuration is invalid.
    pub fn open(
        config: HalfHalfConfig,
        category: CategoryUuid,
        candidates: Vec<FlavorProduct>,
        store: Arc<dyn MenuStore>,
        currency: &'static Currency,
    ) -> Result<Self, SessionError> {
        config.validate()?;

        debug!(%category, candidates = candidates.len(), "opened half-and-half session");

        Ok(Self {
            config,
            category,
            candidates,
            currency,
            store,
            ctx: LoadContext::new(),
            wizard: Wizard::new(config.has_options_step()),
            sizes: None,
            size: None,
            flavors: FlavorSelection::new(config.max_flavors),
            options: None,
            chosen: OptionSelection::default(),
            quantity: 1,
            notes: None,
        })
    }

    /// Give every load a deadline.
    #[must_use]
    pub fn with_load_deadline(mut self, deadline: Duration) -> Self {
        self.ctx = std::mem::take(&mut self.ctx).with_deadline(deadline);
        self
    }

    /// Category configuration.
    pub fn config(&self) -> &HalfHalfConfig {
        &self.config
    }

    /// Flavor products the customer may pick from.
    pub fn candidates(&self) -> &[FlavorProduct] {
        &self.candidates
    }

    /// Cancellation handle shared by this session's loads.
    pub fn load_context(&self) -> &LoadContext {
        &self.ctx
    }

    /// Current wizard step.
    pub fn step(&self) -> Step {
        self.wizard.current()
    }

    /// Whether the current step is the one that adds to the cart.
    pub fn is_last_step(&self) -> bool {
        self.wizard.is_last()
    }

    /// Advance the wizard.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Wizard`] when leaving the size step without a size, or
    /// when already at the last step.
    pub fn next_step(&mut self) -> Result<Step, SessionError> {
        Ok(self.wizard.next(self.size.is_some())?)
    }

    /// Go back one step.
    pub fn back_step(&mut self) -> Step {
        self.wizard.back()
    }

    /// Load the sizes on offer.
    ///
    /// Sizes are fetched once per session; later calls return the first result.
    pub async fn load_sizes(&mut self) -> &SizesState {
        if let Some(state) = self.sizes.take() {
            return self.sizes.insert(state);
        }

        let state = loader::load_sizes(
            self.store.as_ref(),
            &self.candidates,
            self.category,
            &self.ctx,
        )
        .await;

        self.sizes.insert(state)
    }

    /// Sizes on offer, empty until loaded.
    pub fn sizes(&self) -> &[ResolvedSize] {
        self.sizes.as_ref().map(SizesState::sizes).unwrap_or_default()
    }

    /// Pick a size by name.
    ///
    /// Sizes change flavor prices and with them the reference flavor. When it changes,
    /// answers that came from its option groups are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::UnknownSize`] if no loaded size matches `name`.
    pub fn select_size(&mut self, name: &str) -> Result<&ResolvedSize, SessionError> {
        let key = normalize_name(name);

        let size = self
            .sizes()
            .iter()
            .find(|size| size.key == key)
            .cloned()
            .ok_or_else(|| SessionError::UnknownSize(name.to_string()))?;

        self.size = Some(size);
        self.forget_stale_options();

        self.size.as_ref().ok_or(SessionError::NoSizeSelected)
    }

    /// The chosen size.
    pub fn selected_size(&self) -> Option<&ResolvedSize> {
        self.size.as_ref()
    }

    /// Pick a candidate flavor, or un-pick it if already picked.
    ///
    /// Returns whether the flavor is picked afterwards. If the reference flavor
    /// changes, answers that came from its option groups are dropped; dough and crust
    /// table answers are kept.
    ///
    /// # Errors
    ///
    /// - [`SessionError::UnknownFlavor`]: the flavor is not a candidate.
    /// - [`SessionError::Selection`]: every slot is taken.
    pub fn toggle_flavor(&mut self, flavor: ProductUuid) -> Result<bool, SessionError> {
        let product = self
            .candidates
            .iter()
            .find(|candidate| candidate.uuid == flavor)
            .ok_or(SessionError::UnknownFlavor(flavor))?;

        let picked = self.flavors.toggle(product)?;

        self.forget_stale_options();

        Ok(picked)
    }

    /// Picked flavors.
    pub fn flavors(&self) -> &FlavorSelection {
        &self.flavors
    }

    /// Load the option groups for the picked flavors.
    ///
    /// Groups are reloaded only when the source flavors change. Answers to groups that
    /// are no longer offered are dropped.
    ///
    /// # Errors
    ///
    /// - [`SessionError::NoSizeSelected`]: no size is chosen.
    /// - [`SessionError::NoFlavors`]: no flavor is picked.
    pub async fn load_options(&mut self) -> Result<&OptionsState, SessionError> {
        let size = self.size.as_ref().ok_or(SessionError::NoSizeSelected)?;

        if self.flavors.is_empty() {
            return Err(SessionError::NoFlavors);
        }

        let priced = self.priced_flavors(size);
        let sources = option_sources(self.config.option_source, &priced);

        let state = match self.options.take() {
            Some((cached, state)) if cached == sources => state,
            _ => {
                loader::load_options(
                    self.store.as_ref(),
                    &sources,
                    self.category,
                    &self.config,
                    &self.ctx,
                )
                .await
            }
        };

        match state.groups() {
            Some(groups) => self.chosen.retain_groups(groups.iter()),
            None => self.chosen = OptionSelection::default(),
        }

        let (_, state) = &*self.options.insert((sources, state));

        Ok(state)
    }

    /// Option groups to ask, empty until loaded.
    pub fn option_groups(&self) -> impl Iterator<Item = &OptionGroup> {
        self.options
            .as_ref()
            .and_then(|(_, state)| state.groups())
            .into_iter()
            .flat_map(CategorizedGroups::iter)
    }

    /// Answer an option group.
    ///
    /// # Errors
    ///
    /// - [`SessionError::UnknownGroup`]: the group is not offered.
    /// - [`SessionError::Selection`]: the option is not in the group, or the group is
    ///   full.
    pub fn choose_option(
        &mut self,
        group: OptionGroupUuid,
        option: OptionUuid,
    ) -> Result<(), SessionError> {
        let offered = self
            .options
            .as_ref()
            .and_then(|(_, state)| state.groups())
            .and_then(|groups| groups.iter().find(|candidate| candidate.uuid == group))
            .ok_or(SessionError::UnknownGroup(group))?;

        Ok(self.chosen.choose(offered, option)?)
    }

    /// Drop every answer to an option group.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::UnknownGroup`] if the group is not offered.
    pub fn clear_option(&mut self, group: OptionGroupUuid) -> Result<(), SessionError> {
        if !self.option_groups().any(|candidate| candidate.uuid == group) {
            return Err(SessionError::UnknownGroup(group));
        }

        self.chosen.clear(group);

        Ok(())
    }

    /// Options answered so far.
    pub fn selected_options(&self) -> &[SelectedOption] {
        self.chosen.selected()
    }

    /// Set the number of items.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidQuantity`] for zero.
    pub fn set_quantity(&mut self, quantity: u32) -> Result<(), SessionError> {
        if quantity == 0 {
            return Err(SessionError::InvalidQuantity);
        }

        self.quantity = quantity;

        Ok(())
    }

    /// Set free-form customer notes.
    pub fn set_notes(&mut self, notes: impl Into<String>) {
        self.notes = Some(notes.into());
    }

    /// Running price for the current, possibly partial, selection.
    ///
    /// # Errors
    ///
    /// - [`SessionError::NoSizeSelected`]: no size is chosen.
    /// - [`SessionError::Pricing`]: no flavor is picked, or arithmetic failed.
    pub fn preview(&self) -> Result<PriceBreakdown, SessionError> {
        let size = self.size.as_ref().ok_or(SessionError::NoSizeSelected)?;
        let flavor_prices = self.flavor_prices(size);

        let base = pricing::preview_base_price(
            self.config.pricing_rule,
            &flavor_prices,
            self.config.max_flavors,
        )?;

        self.price_with_options(base)
    }

    /// Validate the selection, price it and add it to the cart.
    ///
    /// When the wizard has an options step, option groups are loaded first if they are
    /// missing or stale.
    ///
    /// # Errors
    ///
    /// - [`SessionError::NoSizeSelected`]: no size is chosen.
    /// - [`SessionError::FlavorCountMismatch`]: fewer flavors than slots.
    /// - [`SessionError::Selection`]: an option group constraint is violated.
    /// - [`SessionError::Pricing`]: arithmetic failed.
    /// - [`SessionError::Cart`]: the cart rejected the line.
    #[tracing::instrument(
        name = "session.add_to_cart",
        skip(self, cart),
        fields(
            category = %self.category,
            flavors = self.flavors.len(),
            unit_price = tracing::field::Empty
        ),
        err
    )]
    pub async fn add_to_cart(
        &mut self,
        cart: &dyn CartStore,
    ) -> Result<CartLineItem, SessionError> {
        if self.size.is_none() {
            return Err(SessionError::NoSizeSelected);
        }

        if self.flavors.len() != self.config.max_flavors {
            return Err(SessionError::FlavorCountMismatch {
                required: self.config.max_flavors,
                selected: self.flavors.len(),
            });
        }

        if self.wizard.has_options_step() {
            self.load_options().await?;
            self.chosen.validate(self.option_groups())?;
        }

        let size = self.size.as_ref().ok_or(SessionError::NoSizeSelected)?;
        let flavor_prices = self.flavor_prices(size);

        let base = pricing::committed_base_price(
            self.config.pricing_rule,
            &flavor_prices,
            self.config.max_flavors,
        )?;

        let breakdown = self.price_with_options(base)?;

        let priced = self.priced_flavors(size);
        let flavors: Vec<FlavorProduct> = self.flavors.iter().cloned().collect();

        let reference = pick_reference(self.config.option_source, &priced)
            .ok_or(SessionError::NoFlavors)?;

        let line = build_line_item(&LineRequest {
            reference,
            flavors: &flavors,
            max_flavors: self.config.max_flavors,
            size,
            options: self.chosen.selected(),
            unit_price: breakdown.unit_price,
            quantity: breakdown.quantity,
            customer_notes: self.notes.as_deref(),
        });

        Span::current().record("unit_price", tracing::field::display(line.unit_price));

        cart.add_item(line.clone()).await?;

        info!(
            line_uuid = %line.uuid,
            product_uuid = %line.product_id,
            "added half-and-half item"
        );

        Ok(line)
    }

    /// Discard loaded groups whose source flavors no longer match the selection.
    fn forget_stale_options(&mut self) {
        let Some(size) = self.size.as_ref() else {
            return;
        };

        let sources = option_sources(self.config.option_source, &self.priced_flavors(size));

        let state = match self.options.take() {
            Some((cached, state)) if cached != sources => state,
            current => {
                self.options = current;
                return;
            }
        };

        debug!(sources = sources.len(), "reference flavor changed, dropping options");

        match state.groups() {
            Some(groups) => self
                .chosen
                .retain(|chosen| groups.is_table_row(chosen.group, chosen.option)),
            None => self.chosen = OptionSelection::default(),
        }
    }

    fn priced_flavors(&self, size: &ResolvedSize) -> SmallVec<[(ProductUuid, Price); 4]> {
        self.flavors
            .iter()
            .map(|flavor| {
                (
                    flavor.uuid,
                    size.price_for(flavor.uuid).unwrap_or(flavor.price),
                )
            })
            .collect()
    }

    fn flavor_prices(&self, size: &ResolvedSize) -> SmallVec<[Price; 4]> {
        self.priced_flavors(size)
            .into_iter()
            .map(|(_, price)| price)
            .collect()
    }

    fn price_with_options(&self, base: Price) -> Result<PriceBreakdown, SessionError> {
        let options = pricing::options_total(
            self.chosen.selected(),
            self.config.allow_crust_extra_price,
            self.currency,
        )?;

        Ok(pricing::quote(
            base,
            options,
            &self.config.discount,
            self.quantity,
        )?)
    }
}

impl Drop for HalfHalfSession {
    fn drop(&mut self) {
        self.ctx.cancel();
    }
}
