//! Option group merging

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

use crate::{names::normalize_name, options::OptionGroup};

/// Merge groups sharing a normalized name and selection type.
///
/// The first group seen for a key keeps its identifier, name, kind and limits; later
/// groups contribute options whose normalized name is not already present. A merged
/// group is required if any of its sources was.
pub fn merge_groups(groups: impl IntoIterator<Item = OptionGroup>) -> Vec<OptionGroup> {
    let mut merged: Vec<OptionGroup> = Vec::new();
    let mut index = FxHashMap::default();
    let mut seen = 0_usize;

    for group in groups {
        seen += 1;

        let key = group.merge_key();

        if let Some(existing) = index.get(&key).and_then(|&idx| merged.get_mut(idx)) {
            absorb(existing, group);
        } else {
            index.insert(key, merged.len());
            merged.push(deduplicated(group));
        }
    }

    debug!(seen, merged = merged.len(), "merged option groups");

    merged
}

/// Fold every group into the first one, regardless of name.
pub(crate) fn merge_into_one(groups: impl IntoIterator<Item = OptionGroup>) -> Option<OptionGroup> {
    let mut groups = groups.into_iter();
    let first = deduplicated(groups.next()?);

    Some(groups.fold(first, |mut acc, group| {
        absorb(&mut acc, group);
        acc
    }))
}

fn absorb(target: &mut OptionGroup, other: OptionGroup) {
    target.required |= other.required;
    target.min_selections = target.min_selections.max(other.min_selections);

    let mut names: FxHashSet<String> = target
        .options
        .iter()
        .map(|option| normalize_name(&option.name))
        .collect();

    for option in other.options {
        if names.insert(normalize_name(&option.name)) {
            target.options.push(option);
        }
    }
}

fn deduplicated(mut group: OptionGroup) -> OptionGroup {
    let mut names = FxHashSet::default();

    group
        .options
        .retain(|option| names.insert(normalize_name(&option.name)));

    group
}
