//! Ancillary DDL surfaces: out of scope for routing logic itself, but
//! the router is consulted by the DDL path for store placement
//! decisions (spec.md §4.7).

use crate::catalog::Catalog;
use crate::types::AdapterId;

/// Candidate stores for placing a new table: every known data store.
pub fn stores_for_create_table<C: Catalog + ?Sized>(known_adapters: &[AdapterId]) -> Vec<AdapterId> {
    known_adapters.to_vec()
}

/// Candidate stores for adding a column to an existing table: every
/// adapter already hosting the table.
pub fn stores_for_add_column<C: Catalog + ?Sized>(
    catalog: &C,
    table: &str,
) -> Vec<AdapterId> {
    catalog
        .placements_by_adapter(table)
        .into_keys()
        .collect()
}

/// Truncate is delegated to the adapter; the core has no default
/// behavior and surfaces only the contract an adapter must implement.
pub trait TruncateAdapter {
    /// Truncate the table on this adapter. Adapters that cannot
    /// truncate (e.g. an append-only blockchain source) return an
    /// error rather than silently no-opping.
    fn truncate(&self, table: &str) -> Result<(), TruncateError>;
}

#[derive(Debug, thiserror::Error)]
pub enum TruncateError {
    #[error("adapter does not support truncate")]
    Unsupported,
    #[error("truncate failed: {0}")]
    Failed(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::InMemoryCatalog;

    #[test]
    fn create_table_returns_all_known_adapters() {
        let known = vec![1, 2, 3];
        assert_eq!(stores_for_create_table::<InMemoryCatalog>(&known), known);
    }

    #[test]
    fn add_column_returns_hosting_adapters_only() {
        let mut catalog = InMemoryCatalog::new();
        catalog.add_table("t", vec![1]);
        catalog.add_placement("t", 10, vec![1]);
        catalog.add_placement("t", 20, vec![1]);

        let mut stores = stores_for_add_column(&catalog, "t");
        stores.sort();
        assert_eq!(stores, vec![10, 20]);
    }
}
