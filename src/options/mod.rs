//! Option Groups
//!
//! Option groups are the questions asked after the flavors are chosen, such as the
//! dough or the stuffed crust. Each group carries an explicit [`GroupKind`]
//! set when the record was entered; labels are only read for records that predate it.

use serde::Deserialize;

use crate::{
    names::{contains_any, normalize_name},
    prices::Price,
    uuids::TypedUuid,
};

pub mod categorize;
pub mod merge;
pub mod reference;

pub use categorize::{
    CategorizedGroups, CrustFlavor, DoughType, categorize, crust_group, dough_group,
};
pub use merge::merge_groups;
pub use reference::{ReferencePolicy, option_sources, pick_reference};

/// Option group UUID
pub type OptionGroupUuid = TypedUuid<OptionGroup>;

/// Option UUID
pub type OptionUuid = TypedUuid<OptionItem>;

/// What an option group is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupKind {
    /// Pizza size; option prices are absolute size prices.
    Size,

    /// Dough type; single choice.
    Dough,

    /// Stuffed crust flavor; optional single choice.
    Crust,

    /// Anything else: extras, toppings, drinks.
    Addon,
}

impl GroupKind {
    /// Infer a kind from a legacy group label.
    ///
    /// Only used when importing records that predate the explicit `kind` field.
    pub fn infer(name: &str) -> Self {
        let normalized = normalize_name(name);

        if contains_any(&normalized, &["tamanho"]) {
            GroupKind::Size
        } else if contains_any(&normalized, &["massa"]) {
            GroupKind::Dough
        } else if contains_any(&normalized, &["borda", "crust", "rechead"]) {
            GroupKind::Crust
        } else {
            GroupKind::Addon
        }
    }
}

/// How many options of a group may be picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionType {
    /// Exactly zero or one option.
    #[default]
    Single,

    /// Any number of options, up to the group's maximum.
    Multiple,
}

/// A single answer within an option group.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionItem {
    /// Option identifier
    pub uuid: OptionUuid,

    /// Display name
    pub name: String,

    /// Absolute price for size options, price modifier for everything else
    pub price: Price,
}

impl OptionItem {
    /// Create an option with a fresh identifier.
    pub fn new(name: impl Into<String>, price: Price) -> Self {
        Self {
            uuid: OptionUuid::new(),
            name: name.into(),
            price,
        }
    }
}

/// A named set of related choices.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionGroup {
    /// Group identifier
    pub uuid: OptionGroupUuid,

    /// Display name
    pub name: String,

    /// What the group is used for
    pub kind: GroupKind,

    /// Single or multiple selection
    pub selection: SelectionType,

    /// Whether at least one option must be picked
    pub required: bool,

    /// Minimum number of options to pick when the group is answered
    pub min_selections: usize,

    /// Maximum number of options to pick, unbounded when `None`
    pub max_selections: Option<usize>,

    /// Options, in sort order
    pub options: Vec<OptionItem>,
}

impl OptionGroup {
    /// Create an empty, optional group with a fresh identifier.
    pub fn new(name: impl Into<String>, kind: GroupKind, selection: SelectionType) -> Self {
        Self {
            uuid: OptionGroupUuid::new(),
            name: name.into(),
            kind,
            selection,
            required: false,
            min_selections: 0,
            max_selections: match selection {
                SelectionType::Single => Some(1),
                SelectionType::Multiple => None,
            },
            options: Vec::new(),
        }
    }

    /// Mark the group as required.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self.min_selections = self.min_selections.max(1);
        self
    }

    /// Replace the group's options.
    #[must_use]
    pub fn with_options(mut self, options: impl IntoIterator<Item = OptionItem>) -> Self {
        self.options = options.into_iter().collect();
        self
    }

    /// Set the maximum number of selections.
    #[must_use]
    pub fn with_max_selections(mut self, max: Option<usize>) -> Self {
        self.max_selections = max;
        self
    }

    /// Find an option by identifier.
    pub fn option(&self, uuid: OptionUuid) -> Option<&OptionItem> {
        self.options.iter().find(|option| option.uuid == uuid)
    }

    /// Find an option by (normalized) name.
    pub fn option_named(&self, name: &str) -> Option<&OptionItem> {
        let wanted = normalize_name(name);

        self.options
            .iter()
            .find(|option| normalize_name(&option.name) == wanted)
    }

    /// Minimum number of selections this group demands.
    pub fn effective_min(&self) -> usize {
        if self.required {
            self.min_selections.max(1)
        } else {
            self.min_selections
        }
    }

    /// Key groups are merged on: normalized name and selection type.
    pub fn merge_key(&self) -> (String, SelectionType) {
        (normalize_name(&self.name), self.selection)
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::{Money, iso::BRL};

    use super::*;

    #[test]
    fn infer_kind_from_legacy_labels() {
        assert_eq!(GroupKind::infer("Tamanhos"), GroupKind::Size);
        assert_eq!(GroupKind::infer("Tipo de Massa"), GroupKind::Dough);
        assert_eq!(GroupKind::infer("Bordas"), GroupKind::Crust);
        assert_eq!(GroupKind::infer("Stuffed Crust"), GroupKind::Crust);
        assert_eq!(GroupKind::infer("Recheadas"), GroupKind::Crust);
        assert_eq!(GroupKind::infer("Adicionais"), GroupKind::Addon);
    }

    #[test]
    fn single_groups_default_to_one_selection() {
        let single = OptionGroup::new("Borda", GroupKind::Crust, SelectionType::Single);
        let multiple = OptionGroup::new("Extras", GroupKind::Addon, SelectionType::Multiple);

        assert_eq!(single.max_selections, Some(1));
        assert_eq!(multiple.max_selections, None);
    }

    #[test]
    fn required_groups_demand_at_least_one() {
        let group = OptionGroup::new("Massa", GroupKind::Dough, SelectionType::Single).required();

        assert_eq!(group.effective_min(), 1);
    }

    #[test]
    fn option_named_ignores_case_and_accents() {
        let catupiry = OptionItem::new("Catupiry", Money::from_minor(8_00, BRL));
        let uuid = catupiry.uuid;
        let group = OptionGroup::new("Borda", GroupKind::Crust, SelectionType::Single)
            .with_options([catupiry]);

        assert_eq!(group.option_named("  CATUPÍRY ").map(|o| o.uuid), Some(uuid));
        assert_eq!(group.option(uuid).map(|o| o.name.as_str()), Some("Catupiry"));
    }

    #[test]
    fn merge_key_normalizes_name() {
        let a = OptionGroup::new("Bordas", GroupKind::Crust, SelectionType::Single);
        let b = OptionGroup::new(" BORDAS", GroupKind::Crust, SelectionType::Single);
        let c = OptionGroup::new("Bordas", GroupKind::Crust, SelectionType::Multiple);

        assert_eq!(a.merge_key(), b.merge_key());
        assert_ne!(a.merge_key(), c.merge_key());
    }
}
