//! Category property inheritance
//!
//! A product form shows the properties of the product's category followed by
//! those of every ancestor, most specific first. Parent references come from
//! user-edited data, so the walk tolerates dangling references and cycles.

use std::collections::{HashMap, HashSet};

use shared::models::{Category, Property};

/// Upper bound on parent hops, independent of cycle detection
pub const MAX_CATEGORY_DEPTH: usize = 64;

/// Resolve every property applicable to `category_id`.
///
/// Returns the target's own properties in declared order, then each ancestor's,
/// nearest first. Names repeated along the chain are kept at every level.
/// An unknown category or one without own properties yields an empty list
/// (an uncategorized product has no properties to fill).
pub fn resolve_properties(category_id: &str, categories: &[Category]) -> Vec<Property> {
    let chain = category_path(category_id, categories);
    let Some(target) = chain.first() else {
        return Vec::new();
    };
    if target.properties.is_empty() {
        return Vec::new();
    }

    chain
        .iter()
        .flat_map(|category| category.properties.iter().cloned())
        .collect()
}

/// The category followed by its resolvable ancestors, target first.
///
/// The walk stops silently at a parent id that matches nothing, and with a
/// warning when a category repeats or the chain exceeds [`MAX_CATEGORY_DEPTH`].
pub fn category_path<'a>(category_id: &str, categories: &'a [Category]) -> Vec<&'a Category> {
    let mut by_id: HashMap<&str, &Category> = HashMap::with_capacity(categories.len());
    for category in categories {
        // First record wins on duplicate ids
        by_id.entry(category.id.as_str()).or_insert(category);
    }

    let Some(&target) = by_id.get(category_id) else {
        return Vec::new();
    };

    let mut visited: HashSet<&str> = HashSet::from([target.id.as_str()]);
    let mut chain = vec![target];
    let mut current = target;

    while let Some(parent_id) = current.parent_id.as_deref() {
        if !visited.insert(parent_id) {
            tracing::warn!(
                category_id = %category_id,
                repeated = %parent_id,
                "Category parent chain is cyclic, stopping walk"
            );
            break;
        }
        if chain.len() > MAX_CATEGORY_DEPTH {
            tracing::warn!(
                category_id = %category_id,
                depth = chain.len(),
                "Category parent chain too deep, stopping walk"
            );
            break;
        }
        let Some(&parent) = by_id.get(parent_id) else {
            break;
        };
        chain.push(parent);
        current = parent;
    }

    chain
}
