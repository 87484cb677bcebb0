//! Selection state
//!
//! What the customer has picked so far: a bounded list of flavors and the answers to
//! each option group.

use smallvec::SmallVec;
use thiserror::Error;

use crate::{
    options::{GroupKind, OptionGroup, OptionGroupUuid, OptionUuid, SelectionType},
    prices::Price,
    products::{FlavorProduct, ProductUuid},
};

/// Errors raised while changing a selection.
#[derive(Debug, Error, PartialEq)]
pub enum SelectionError {
    /// Every flavor slot is already taken.
    #[error("maximum of {max} flavors reached")]
    MaxFlavorsReached {
        /// Number of flavor slots
        max: usize,
    },

    /// The option does not belong to the group.
    #[error("option {0} is not part of group {1}")]
    UnknownOption(OptionUuid, String),

    /// A group already has as many options as it allows.
    #[error("choose at most {max} options in {group}")]
    MaxSelectionsReached {
        /// Group name
        group: String,
        /// Maximum number of options
        max: usize,
    },

    /// A group has fewer options than it demands.
    #[error("choose at least {min} options in {group}")]
    MissingRequired {
        /// Group name
        group: String,
        /// Minimum number of options
        min: usize,
    },
}

/// An answered option, with everything needed to price and describe it.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedOption {
    /// Group the option was picked from
    pub group: OptionGroupUuid,

    /// Group display name
    pub group_name: String,

    /// Picked option
    pub option: OptionUuid,

    /// Option display name
    pub name: String,

    /// Kind of the group, used to zero crust prices
    pub kind: GroupKind,

    /// Price modifier
    pub price: Price,
}

/// Flavors picked for one item, in the order they were picked.
#[derive(Debug, Clone)]
pub struct FlavorSelection {
    max: usize,
    flavors: SmallVec<[FlavorProduct; 4]>,
}

impl FlavorSelection {
    /// Create an empty selection with `max` slots.
    pub fn new(max: usize) -> Self {
        Self {
            max,
            flavors: SmallVec::new(),
        }
    }

    /// Pick a flavor, or un-pick it if it is already selected.
    ///
    /// Returns whether the flavor is selected afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::MaxFlavorsReached`] when adding to a full selection.
    pub fn toggle(&mut self, flavor: &FlavorProduct) -> Result<bool, SelectionError> {
        if self.remove(flavor.uuid) {
            return Ok(false);
        }

        if self.is_full() {
            return Err(SelectionError::MaxFlavorsReached { max: self.max });
        }

        self.flavors.push(flavor.clone());

        Ok(true)
    }

    /// Remove a flavor, returning whether it was selected.
    pub fn remove(&mut self, uuid: ProductUuid) -> bool {
        let before = self.flavors.len();

        self.flavors.retain(|flavor| flavor.uuid != uuid);

        self.flavors.len() != before
    }

    /// Whether a flavor is selected.
    pub fn contains(&self, uuid: ProductUuid) -> bool {
        self.flavors.iter().any(|flavor| flavor.uuid == uuid)
    }

    /// Whether every slot is taken.
    pub fn is_full(&self) -> bool {
        self.flavors.len() >= self.max
    }

    /// Number of slots.
    pub fn max(&self) -> usize {
        self.max
    }

    /// Number of flavors picked.
    pub fn len(&self) -> usize {
        self.flavors.len()
    }

    /// Whether nothing is picked.
    pub fn is_empty(&self) -> bool {
        self.flavors.is_empty()
    }

    /// Iterate over the picked flavors in selection order.
    pub fn iter(&self) -> impl Iterator<Item = &FlavorProduct> {
        self.flavors.iter()
    }

    /// Identifiers of the picked flavors in selection order.
    pub fn uuids(&self) -> SmallVec<[ProductUuid; 4]> {
        self.flavors.iter().map(|flavor| flavor.uuid).collect()
    }
}

/// Answers to option groups, in the order they were given.
#[derive(Debug, Clone, Default)]
pub struct OptionSelection {
    chosen: Vec<SelectedOption>,
}

impl OptionSelection {
    /// Pick an option from a group.
    ///
    /// Single-choice groups replace their current answer. Multiple-choice groups toggle
    /// the option.
    ///
    /// # Errors
    ///
    /// - [`SelectionError::UnknownOption`]: the option is not in the group.
    /// - [`SelectionError::MaxSelectionsReached`]: a multiple-choice group is full.
    pub fn choose(
        &mut self,
        group: &OptionGroup,
        option: OptionUuid,
    ) -> Result<(), SelectionError> {
        let item = group
            .option(option)
            .ok_or_else(|| SelectionError::UnknownOption(option, group.name.clone()))?;

        match group.selection {
            SelectionType::Single => self.clear(group.uuid),
            SelectionType::Multiple => {
                if self.is_chosen(group.uuid, option) {
                    self.chosen
                        .retain(|chosen| !(chosen.group == group.uuid && chosen.option == option));

                    return Ok(());
                }

                if let Some(max) = group.max_selections
                    && self.count(group.uuid) >= max
                {
                    return Err(SelectionError::MaxSelectionsReached {
                        group: group.name.clone(),
                        max,
                    });
                }
            }
        }

        self.chosen.push(SelectedOption {
            group: group.uuid,
            group_name: group.name.clone(),
            option: item.uuid,
            name: item.name.clone(),
            kind: group.kind,
            price: item.price,
        });

        Ok(())
    }

    /// Drop every answer for a group.
    pub fn clear(&mut self, group: OptionGroupUuid) {
        self.chosen.retain(|chosen| chosen.group != group);
    }

    /// Drop answers for groups that are no longer offered.
    pub fn retain_groups<'g>(&mut self, groups: impl IntoIterator<Item = &'g OptionGroup>) {
        let offered: SmallVec<[OptionGroupUuid; 8]> =
            groups.into_iter().map(|group| group.uuid).collect();

        self.chosen.retain(|chosen| offered.contains(&chosen.group));
    }

    /// Keep only the answers matching `keep`.
    pub fn retain(&mut self, keep: impl FnMut(&SelectedOption) -> bool) {
        self.chosen.retain(keep);
    }

    /// Whether an option is currently chosen.
    pub fn is_chosen(&self, group: OptionGroupUuid, option: OptionUuid) -> bool {
        self.chosen
            .iter()
            .any(|chosen| chosen.group == group && chosen.option == option)
    }

    /// Number of answers for a group.
    pub fn count(&self, group: OptionGroupUuid) -> usize {
        self.chosen
            .iter()
            .filter(|chosen| chosen.group == group)
            .count()
    }

    /// All answers in the order they were given.
    pub fn selected(&self) -> &[SelectedOption] {
        &self.chosen
    }

    /// Check every group's minimum and maximum.
    ///
    /// # Errors
    ///
    /// - [`SelectionError::MissingRequired`]: a group has too few answers.
    /// - [`SelectionError::MaxSelectionsReached`]: a group has too many answers.
    pub fn validate<'g>(
        &self,
        groups: impl IntoIterator<Item = &'g OptionGroup>,
    ) -> Result<(), SelectionError> {
        for group in groups {
            let count = self.count(group.uuid);
            let min = group.effective_min();

            if count < min {
                return Err(SelectionError::MissingRequired {
                    group: group.name.clone(),
                    min,
                });
            }

            if let Some(max) = group.max_selections
                && count > max
            {
                return Err(SelectionError::MaxSelectionsReached {
                    group: group.name.clone(),
                    max,
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::{Money, iso::BRL};
    use testresult::TestResult;

    use crate::{options::OptionItem, products::CategoryUuid};

    use super::*;

    fn flavor(name: &str, minor: i64) -> FlavorProduct {
        FlavorProduct::new(name, Money::from_minor(minor, BRL), CategoryUuid::new())
    }

    fn group(name: &str, kind: GroupKind, selection: SelectionType, options: &[&str]) -> OptionGroup {
        OptionGroup::new(name, kind, selection).with_options(
            options
                .iter()
                .map(|option| OptionItem::new(*option, Money::from_minor(2_00, BRL))),
        )
    }

    fn option_uuid(group: &OptionGroup, name: &str) -> OptionUuid {
        group
            .option_named(name)
            .map_or_else(OptionUuid::new, |option| option.uuid)
    }

    #[test]
    fn selecting_past_max_flavors_is_rejected() -> TestResult {
        let mut selection = FlavorSelection::new(2);

        selection.toggle(&flavor("Calabresa", 45_00))?;
        selection.toggle(&flavor("Margherita", 42_00))?;

        let result = selection.toggle(&flavor("Portuguesa", 48_00));

        assert_eq!(result, Err(SelectionError::MaxFlavorsReached { max: 2 }));
        assert_eq!(selection.len(), 2);

        Ok(())
    }

    #[test]
    fn toggling_a_selected_flavor_removes_it() -> TestResult {
        let mut selection = FlavorSelection::new(2);
        let calabresa = flavor("Calabresa", 45_00);

        assert!(selection.toggle(&calabresa)?);
        assert!(!selection.toggle(&calabresa)?);
        assert!(selection.is_empty());

        Ok(())
    }

    #[test]
    fn flavors_keep_selection_order() -> TestResult {
        let mut selection = FlavorSelection::new(3);
        let a = flavor("A", 1);
        let b = flavor("B", 1);

        selection.toggle(&b)?;
        selection.toggle(&a)?;

        assert_eq!(selection.uuids().as_slice(), &[b.uuid, a.uuid]);

        Ok(())
    }

    #[test]
    fn single_choice_replaces_previous_answer() -> TestResult {
        let dough = group(
            "Massa",
            GroupKind::Dough,
            SelectionType::Single,
            &["Tradicional", "Integral"],
        );
        let mut options = OptionSelection::default();

        options.choose(&dough, option_uuid(&dough, "Tradicional"))?;
        options.choose(&dough, option_uuid(&dough, "Integral"))?;

        assert_eq!(options.count(dough.uuid), 1);
        assert!(options.is_chosen(dough.uuid, option_uuid(&dough, "Integral")));

        Ok(())
    }

    #[test]
    fn multiple_choice_toggles_and_respects_max() -> TestResult {
        let extras = group(
            "Adicionais",
            GroupKind::Addon,
            SelectionType::Multiple,
            &["Bacon", "Cebola", "Milho"],
        )
        .with_max_selections(Some(2));
        let mut options = OptionSelection::default();

        options.choose(&extras, option_uuid(&extras, "Bacon"))?;
        options.choose(&extras, option_uuid(&extras, "Cebola"))?;

        let result = options.choose(&extras, option_uuid(&extras, "Milho"));

        assert_eq!(
            result,
            Err(SelectionError::MaxSelectionsReached {
                group: "Adicionais".to_string(),
                max: 2
            })
        );

        options.choose(&extras, option_uuid(&extras, "Bacon"))?;

        assert_eq!(options.count(extras.uuid), 1);

        Ok(())
    }

    #[test]
    fn unknown_option_is_rejected() {
        let dough = group("Massa", GroupKind::Dough, SelectionType::Single, &["Tradicional"]);
        let stray = OptionUuid::new();

        let result = OptionSelection::default().choose(&dough, stray);

        assert_eq!(
            result,
            Err(SelectionError::UnknownOption(stray, "Massa".to_string()))
        );
    }

    #[test]
    fn required_dough_must_be_answered() -> TestResult {
        let dough = group("Massa", GroupKind::Dough, SelectionType::Single, &["Tradicional"])
            .required();
        let crust = group("Borda", GroupKind::Crust, SelectionType::Single, &["Catupiry"]);
        let mut options = OptionSelection::default();

        assert_eq!(
            options.validate([&dough, &crust]),
            Err(SelectionError::MissingRequired {
                group: "Massa".to_string(),
                min: 1
            })
        );

        options.choose(&dough, option_uuid(&dough, "Tradicional"))?;

        assert_eq!(options.validate([&dough, &crust]), Ok(()));

        Ok(())
    }

    #[test]
    fn retain_groups_drops_stale_answers() -> TestResult {
        let dough = group("Massa", GroupKind::Dough, SelectionType::Single, &["Tradicional"]);
        let crust = group("Borda", GroupKind::Crust, SelectionType::Single, &["Catupiry"]);
        let mut options = OptionSelection::default();

        options.choose(&dough, option_uuid(&dough, "Tradicional"))?;
        options.choose(&crust, option_uuid(&crust, "Catupiry"))?;
        options.retain_groups([&dough]);

        assert_eq!(options.selected().len(), 1);

        Ok(())
    }

    #[test]
    fn retain_keeps_matching_answers_in_order() -> TestResult {
        let addons = group(
            "Adicionais",
            GroupKind::Addon,
            SelectionType::Multiple,
            &["Bacon", "Milho", "Ovo"],
        );
        let mut options = OptionSelection::default();

        for name in ["Ovo", "Bacon", "Milho"] {
            options.choose(&addons, option_uuid(&addons, name))?;
        }

        options.retain(|chosen| chosen.name != "Bacon");

        let names: Vec<&str> = options.selected().iter().map(|o| o.name.as_str()).collect();

        assert_eq!(names, vec!["Ovo", "Milho"]);

        Ok(())
    }
}
