//! Fatia prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{CartError, CartLineItem, CartOption, CartStore, InMemoryCart},
    config::{ConfigError, HalfHalfConfig},
    fixtures::{Fixture, FixtureError},
    loader::{LoadContext, LoadError, OptionsState, SizesState},
    options::{
        CategorizedGroups, GroupKind, OptionGroup, OptionItem, ReferencePolicy, SelectionType,
    },
    prices::Price,
    pricing::{PriceBreakdown, PricingError, PricingRule},
    products::{CategoryUuid, FlavorProduct, ProductUuid},
    quote::{Quote, QuoteError},
    selection::{FlavorSelection, OptionSelection, SelectedOption, SelectionError},
    session::{HalfHalfSession, SessionError},
    sizes::ResolvedSize,
    store::{InMemoryMenuStore, MenuStore, StoreError},
    wizard::{Step, Wizard},
};
