//! Loading
//!
//! Sizes and options are fetched from the [`MenuStore`] in concurrent batches. Every
//! batch races a [`CancellationToken`] and an optional deadline, so a dialog that is
//! closed mid-fetch stops waiting instead of applying stale results.
//!
//! Failures never reach the customer as errors: they are logged and the dialog shows
//! its empty state. The state still records whether it came from an empty menu or a
//! failed fetch.

use std::{future::Future, time::Duration};

use futures::future::join_all;
use rustc_hash::FxHashMap;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::{
    config::HalfHalfConfig,
    options::{CategorizedGroups, categorize},
    products::{CategoryUuid, FlavorProduct, ProductUuid},
    sizes::{ResolvedSize, resolve_category_sizes, resolve_sizes},
    store::{MenuStore, StoreError},
};

/// Errors raised while loading menu data.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum LoadError {
    /// The load was cancelled, usually because the dialog closed.
    #[error("load cancelled")]
    Cancelled,

    /// The load did not finish before the deadline.
    #[error("load exceeded deadline of {0:?}")]
    DeadlineExceeded(Duration),

    /// The store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Cancellation and deadline for a batch of loads.
#[derive(Debug, Clone, Default)]
pub struct LoadContext {
    cancel: CancellationToken,
    deadline: Option<Duration>,
}

impl LoadContext {
    /// A context with no deadline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a per-batch deadline.
    #[must_use]
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Cancel every load using this context.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Whether the context has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Run one store call under this context.
    ///
    /// # Errors
    ///
    /// - [`LoadError::Cancelled`]: the context was cancelled first.
    /// - [`LoadError::DeadlineExceeded`]: the deadline elapsed first.
    /// - [`LoadError::Store`]: the store call failed.
    pub async fn run<T, F>(&self, fetch: F) -> Result<T, LoadError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        let guarded = async {
            match self.deadline {
                Some(deadline) => match tokio::time::timeout(deadline, fetch).await {
                    Ok(result) => result.map_err(LoadError::from),
                    Err(_elapsed) => Err(LoadError::DeadlineExceeded(deadline)),
                },
                None => fetch.await.map_err(LoadError::from),
            }
        };

        tokio::select! {
            biased;
            () = self.cancel.cancelled() => Err(LoadError::Cancelled),
            result = guarded => result,
        }
    }
}

/// Where resolved sizes came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeSource {
    /// Per-flavor size groups
    Flavors,

    /// Category size table
    Category,
}

/// Outcome of loading sizes.
#[derive(Debug, Clone, PartialEq)]
pub enum SizesState {
    /// Sizes to offer.
    Ready {
        /// Resolved sizes in display order
        sizes: Vec<ResolvedSize>,
        /// Where they came from
        source: SizeSource,
    },

    /// Neither the flavors nor the category define any size.
    NotConfigured,

    /// The load failed; shown to the customer as "no sizes configured".
    Unavailable(LoadError),
}

impl SizesState {
    /// Resolved sizes, empty unless ready.
    pub fn sizes(&self) -> &[ResolvedSize] {
        match self {
            SizesState::Ready { sizes, .. } => sizes,
            SizesState::NotConfigured | SizesState::Unavailable(_) => &[],
        }
    }
}

/// Outcome of loading option groups.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionsState {
    /// Groups to ask.
    Ready(CategorizedGroups),

    /// There is nothing to ask for this item.
    NotConfigured,

    /// The load failed; shown to the customer as "no options available".
    Unavailable(LoadError),
}

impl OptionsState {
    /// Groups to ask, if ready.
    pub fn groups(&self) -> Option<&CategorizedGroups> {
        match self {
            OptionsState::Ready(groups) => Some(groups),
            OptionsState::NotConfigured | OptionsState::Unavailable(_) => None,
        }
    }
}

/// Load the sizes offered for a set of candidate flavors.
///
/// Per-flavor size groups are fetched concurrently. When none exists the category size
/// table is used instead.
#[tracing::instrument(
    name = "load_sizes",
    skip_all,
    fields(category = %category, flavors = flavors.len())
)]
pub async fn load_sizes<S>(
    store: &S,
    flavors: &[FlavorProduct],
    category: CategoryUuid,
    ctx: &LoadContext,
) -> SizesState
where
    S: MenuStore + ?Sized,
{
    match try_load_sizes(store, flavors, category, ctx).await {
        Ok(state) => state,
        Err(error) => {
            warn!(%error, "failed to load sizes");

            SizesState::Unavailable(error)
        }
    }
}

async fn try_load_sizes<S>(
    store: &S,
    flavors: &[FlavorProduct],
    category: CategoryUuid,
    ctx: &LoadContext,
) -> Result<SizesState, LoadError>
where
    S: MenuStore + ?Sized,
{
    let fetches = flavors.iter().map(|flavor| async move {
        store
            .product_size_group(flavor.uuid)
            .await
            .map(|group| (flavor.uuid, group))
    });

    let fetched = ctx
        .run(async {
            join_all(fetches)
                .await
                .into_iter()
                .collect::<Result<Vec<_>, StoreError>>()
        })
        .await?;

    let size_groups: FxHashMap<ProductUuid, _> = fetched
        .into_iter()
        .filter_map(|(uuid, group)| {
            group
                .filter(|group| !group.options.is_empty())
                .map(|group| (uuid, group))
        })
        .collect();

    if !size_groups.is_empty() {
        let sizes = resolve_sizes(flavors, &size_groups);

        if !sizes.is_empty() {
            return Ok(SizesState::Ready {
                sizes,
                source: SizeSource::Flavors,
            });
        }
    }

    debug!("no per-flavor size groups, falling back to category sizes");

    let category_sizes = ctx.run(store.category_sizes(category)).await?;
    let sizes = resolve_category_sizes(flavors, &category_sizes);

    if sizes.is_empty() {
        return Ok(SizesState::NotConfigured);
    }

    Ok(SizesState::Ready {
        sizes,
        source: SizeSource::Category,
    })
}

/// Load and categorize the option groups for a half-and-half item.
///
/// `sources` are the flavors whose groups are used (see
/// [`crate::options::option_sources`]). Their groups, the category dough types and the
/// category crust flavors are fetched concurrently.
#[tracing::instrument(
    name = "load_options",
    skip_all,
    fields(category = %category, sources = sources.len())
)]
pub async fn load_options<S>(
    store: &S,
    sources: &[ProductUuid],
    category: CategoryUuid,
    config: &HalfHalfConfig,
    ctx: &LoadContext,
) -> OptionsState
where
    S: MenuStore + ?Sized,
{
    match try_load_options(store, sources, category, config, ctx).await {
        Ok(state) => state,
        Err(error) => {
            warn!(%error, "failed to load options");

            OptionsState::Unavailable(error)
        }
    }
}

async fn try_load_options<S>(
    store: &S,
    sources: &[ProductUuid],
    category: CategoryUuid,
    config: &HalfHalfConfig,
    ctx: &LoadContext,
) -> Result<OptionsState, LoadError>
where
    S: MenuStore + ?Sized,
{
    let groups = async {
        join_all(
            sources
                .iter()
                .map(|product| store.product_option_groups(*product)),
        )
        .await
        .into_iter()
        .collect::<Result<Vec<_>, StoreError>>()
    };

    let crusts = async {
        if config.allow_crust {
            store.crust_flavors(category).await
        } else {
            Ok(Vec::new())
        }
    };

    let (groups, dough_types, crust_flavors) = ctx
        .run(async { tokio::try_join!(groups, store.dough_types(category), crusts) })
        .await?;

    let categorized = categorize(
        groups.into_iter().flatten().collect(),
        &dough_types,
        &crust_flavors,
        config,
    );

    if categorized.is_empty() {
        return Ok(OptionsState::NotConfigured);
    }

    Ok(OptionsState::Ready(categorized))
}

#[cfg(test)]
mod tests {
    use rusty_money::{Money, iso::BRL};
    use testresult::TestResult;

    use crate::{
        options::{DoughType, GroupKind, OptionGroup, OptionItem, OptionUuid, SelectionType},
        sizes::CategorySize,
        store::{InMemoryMenuStore, MockMenuStore},
    };

    use super::*;

    fn flavor(name: &str, minor: i64, category: CategoryUuid) -> FlavorProduct {
        FlavorProduct::new(name, Money::from_minor(minor, BRL), category)
    }

    fn size_group(options: &[(&str, i64)]) -> OptionGroup {
        OptionGroup::new("Tamanho", GroupKind::Size, SelectionType::Single).with_options(
            options
                .iter()
                .map(|(name, minor)| OptionItem::new(*name, Money::from_minor(*minor, BRL))),
        )
    }

    #[tokio::test]
    async fn sizes_come_from_flavor_groups() {
        let category = CategoryUuid::new();
        let calabresa = flavor("Calabresa", 45_00, category);
        let mut store = InMemoryMenuStore::new();

        store.add_option_group(calabresa.uuid, size_group(&[("Grande", 55_00)]));

        let state = load_sizes(&store, &[calabresa], category, &LoadContext::new()).await;

        assert!(matches!(
            state,
            SizesState::Ready {
                source: SizeSource::Flavors,
                ..
            }
        ));
        assert_eq!(state.sizes().len(), 1);
    }

    #[tokio::test]
    async fn sizes_fall_back_to_category_table() {
        let category = CategoryUuid::new();
        let calabresa = flavor("Calabresa", 45_00, category);
        let mut store = InMemoryMenuStore::new();

        store.add_category_size(
            category,
            CategorySize {
                name: "Grande".to_string(),
                price: Money::from_minor(60_00, BRL),
            },
        );

        let state = load_sizes(&store, &[calabresa], category, &LoadContext::new()).await;

        assert!(matches!(
            state,
            SizesState::Ready {
                source: SizeSource::Category,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn no_sizes_anywhere_is_not_configured() {
        let category = CategoryUuid::new();
        let store = InMemoryMenuStore::new();

        let state = load_sizes(
            &store,
            &[flavor("Calabresa", 45_00, category)],
            category,
            &LoadContext::new(),
        )
        .await;

        assert_eq!(state, SizesState::NotConfigured);
    }

    #[tokio::test]
    async fn store_failure_degrades_to_unavailable() {
        let category = CategoryUuid::new();
        let mut store = MockMenuStore::new();

        store
            .expect_product_size_group()
            .returning(|_| Err(StoreError::Unavailable("connection reset".to_string())));

        let state = load_sizes(
            &store,
            &[flavor("Calabresa", 45_00, category)],
            category,
            &LoadContext::new(),
        )
        .await;

        assert_eq!(
            state,
            SizesState::Unavailable(LoadError::Store(StoreError::Unavailable(
                "connection reset".to_string()
            )))
        );
        assert!(state.sizes().is_empty());
    }

    #[tokio::test]
    async fn cancelled_context_stops_loading() {
        let category = CategoryUuid::new();
        let store = InMemoryMenuStore::new();
        let ctx = LoadContext::new();

        ctx.cancel();

        let state = load_sizes(
            &store,
            &[flavor("Calabresa", 45_00, category)],
            category,
            &ctx,
        )
        .await;

        assert_eq!(state, SizesState::Unavailable(LoadError::Cancelled));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_store_hits_deadline() {
        let ctx = LoadContext::new().with_deadline(Duration::from_millis(50));

        let result: Result<(), LoadError> = ctx
            .run(async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(())
            })
            .await;

        assert_eq!(
            result,
            Err(LoadError::DeadlineExceeded(Duration::from_millis(50)))
        );
    }

    #[tokio::test]
    async fn options_are_loaded_and_categorized() -> TestResult {
        let category = CategoryUuid::new();
        let reference = ProductUuid::new();
        let mut store = InMemoryMenuStore::new();

        store
            .add_option_group(reference, size_group(&[("Grande", 55_00)]))
            .add_option_group(
                reference,
                OptionGroup::new("Adicionais", GroupKind::Addon, SelectionType::Multiple)
                    .with_options([OptionItem::new("Bacon", Money::from_minor(4_00, BRL))]),
            )
            .add_dough_type(
                category,
                DoughType {
                    uuid: OptionUuid::new(),
                    name: "Tradicional".to_string(),
                    price: Money::from_minor(0, BRL),
                },
            );

        let state = load_options(
            &store,
            &[reference],
            category,
            &HalfHalfConfig::default(),
            &LoadContext::new(),
        )
        .await;

        let groups = state.groups().ok_or("expected option groups")?;

        assert!(groups.dough.is_some());
        assert!(groups.crust.is_none());
        assert_eq!(groups.addons.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn crust_table_is_not_queried_when_crust_disabled() {
        let category = CategoryUuid::new();
        let reference = ProductUuid::new();
        let mut store = MockMenuStore::new();

        store
            .expect_product_option_groups()
            .returning(|_| Ok(Vec::new()));
        store.expect_dough_types().returning(|_| Ok(Vec::new()));
        store.expect_crust_flavors().never();

        let config = HalfHalfConfig {
            allow_crust: false,
            ..HalfHalfConfig::default()
        };

        let state = load_options(&store, &[reference], category, &config, &LoadContext::new())
            .await;

        assert_eq!(state, OptionsState::NotConfigured);
    }
}
