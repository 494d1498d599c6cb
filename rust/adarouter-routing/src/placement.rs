//! Placement Discovery: computes candidate adapter-sets for a table.
//!
//! The router assumes a query can be answered either by one full-
//! replica adapter or by one pre-picked stitched combination; it does
//! not plan cross-adapter joins dynamically (spec.md §4.2).

use crate::catalog::Catalog;
use crate::types::{AdapterId, ColumnId, PlacementSet};
use std::collections::BTreeSet;

/// Compute the candidate placement sets that jointly cover every
/// column of `table`.
///
/// 1. Every adapter whose placed columns equal the full column set is,
///    on its own, a singleton candidate.
/// 2. If no singleton covers the table, build one synthetic combined
///    placement: start from the adapter with the most placed columns,
///    then for each still-uncovered column pick any adapter that has
///    it (the first one the catalog returns).
pub fn discover_placements<C: Catalog + ?Sized>(catalog: &C, table: &str) -> Vec<PlacementSet> {
    let columns = catalog.column_ids(table);
    let full: BTreeSet<ColumnId> = columns.iter().copied().collect();
    let placements = catalog.placements_by_adapter(table);

    let singletons: Vec<PlacementSet> = placements
        .iter()
        .filter(|(_, cols)| {
            let covered: BTreeSet<ColumnId> = cols.iter().copied().collect();
            covered == full
        })
        .map(|(adapter, _)| PlacementSet::singleton(*adapter))
        .collect();

    if !singletons.is_empty() {
        return singletons;
    }

    if placements.is_empty() {
        return Vec::new();
    }

    let anchor = placements
        .iter()
        .max_by_key(|(_, cols)| cols.len())
        .map(|(adapter, _)| *adapter)
        .expect("placements is non-empty");

    let mut chosen = BTreeSet::from([anchor]);
    let mut covered: BTreeSet<ColumnId> = placements[&anchor].iter().copied().collect();

    for column in &columns {
        if covered.contains(column) {
            continue;
        }
        if let Some((adapter, _)) = placements
            .iter()
            .find(|(_, cols)| cols.contains(column))
        {
            chosen.insert(*adapter);
            covered.extend(placements[adapter].iter().copied());
        }
    }

    vec![PlacementSet(chosen)]
}
