//! Option group categorization

use smallvec::SmallVec;
use tracing::debug;

use crate::{
    config::HalfHalfConfig,
    names::normalize_name,
    options::{
        GroupKind, OptionGroup, OptionGroupUuid, OptionItem, OptionUuid, SelectionType,
        merge::{merge_groups, merge_into_one},
    },
    prices::Price,
};

/// Row of the dough-types table.
#[derive(Debug, Clone, PartialEq)]
pub struct DoughType {
    /// Dough identifier, reused as the option identifier
    pub uuid: OptionUuid,

    /// Display name
    pub name: String,

    /// Price modifier
    pub price: Price,
}

/// Row of the crust-flavor linking table.
#[derive(Debug, Clone, PartialEq)]
pub struct CrustFlavor {
    /// Crust identifier, reused as the option identifier
    pub uuid: OptionUuid,

    /// Display name
    pub name: String,

    /// Price modifier
    pub price: Price,
}

/// Option groups sorted into the three sections of the options step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategorizedGroups {
    /// Single dough group, if any dough is configured
    pub dough: Option<OptionGroup>,

    /// Single crust group, if crusts are offered
    pub crust: Option<OptionGroup>,

    /// Addon groups, merged by name
    pub addons: Vec<OptionGroup>,

    /// Answers backed by the dough and crust tables, valid for any reference flavor
    pub table_rows: SmallVec<[(OptionGroupUuid, OptionUuid); 8]>,
}

impl CategorizedGroups {
    /// Iterate over every group in display order: dough, crust, addons.
    pub fn iter(&self) -> impl Iterator<Item = &OptionGroup> {
        self.dough
            .iter()
            .chain(self.crust.iter())
            .chain(self.addons.iter())
    }

    /// Find a group by (normalized) name.
    pub fn group_named(&self, name: &str) -> Option<&OptionGroup> {
        let wanted = normalize_name(name);

        self.iter()
            .find(|group| normalize_name(&group.name) == wanted)
    }

    /// Whether an answer comes from the dough or crust table.
    pub fn is_table_row(&self, group: OptionGroupUuid, option: OptionUuid) -> bool {
        self.table_rows.contains(&(group, option))
    }

    /// Whether there is nothing to ask.
    pub fn is_empty(&self) -> bool {
        self.dough.is_none() && self.crust.is_none() && self.addons.is_empty()
    }
}

/// Build the synthetic dough group from the dough-types table.
///
/// The group takes the first row's identifier.
pub fn dough_group(types: &[DoughType]) -> Option<OptionGroup> {
    let first = types.first()?;

    let mut group = OptionGroup::new("Massa", GroupKind::Dough, SelectionType::Single)
        .required()
        .with_options(types.iter().map(|dough| OptionItem {
            uuid: dough.uuid,
            name: dough.name.clone(),
            price: dough.price,
        }));

    group.uuid = first.uuid.cast();

    Some(group)
}

/// Build the synthetic crust group from the crust-flavor linking table.
///
/// The group takes the first row's identifier.
pub fn crust_group(flavors: &[CrustFlavor]) -> Option<OptionGroup> {
    let first = flavors.first()?;

    let mut group = OptionGroup::new("Borda", GroupKind::Crust, SelectionType::Single).with_options(
        flavors.iter().map(|crust| OptionItem {
            uuid: crust.uuid,
            name: crust.name.clone(),
            price: crust.price,
        }),
    );

    group.uuid = first.uuid.cast();

    Some(group)
}

/// Sort groups fetched for the reference flavor(s) into dough, crust and addons.
///
/// Size groups are dropped. Dough and crust groups collapse into a single group each,
/// with the synthetic table-backed group first. Crust and addons are only kept when the
/// category enables them.
pub fn categorize(
    reference_groups: Vec<OptionGroup>,
    dough_types: &[DoughType],
    crust_flavors: &[CrustFlavor],
    config: &HalfHalfConfig,
) -> CategorizedGroups {
    let mut dough = dough_group(dough_types).into_iter().collect::<Vec<_>>();
    let mut crust = crust_group(crust_flavors).into_iter().collect::<Vec<_>>();
    let mut addons = Vec::new();

    for group in reference_groups {
        match group.kind {
            GroupKind::Size => {}
            GroupKind::Dough => dough.push(group),
            GroupKind::Crust => crust.push(group),
            GroupKind::Addon => addons.push(group),
        }
    }

    let mut categorized = CategorizedGroups {
        dough: merge_into_one(dough),
        crust: if config.allow_crust {
            merge_into_one(crust)
        } else {
            None
        },
        addons: if config.allow_addons {
            merge_groups(addons)
        } else {
            Vec::new()
        },
        table_rows: SmallVec::new(),
    };

    if let Some(group) = &categorized.dough {
        let rows = dough_types.iter().map(|dough| (group.uuid, dough.uuid));
        categorized.table_rows.extend(rows);
    }

    if let Some(group) = &categorized.crust {
        let rows = crust_flavors.iter().map(|crust| (group.uuid, crust.uuid));
        categorized.table_rows.extend(rows);
    }

    debug!(
        dough = categorized.dough.is_some(),
        crust = categorized.crust.is_some(),
        addons = categorized.addons.len(),
        "categorized option groups"
    );

    categorized
}
