//! Catalog collaborator: the external system-of-record for tables,
//! columns, and adapter placements.
//!
//! Modeled as a trait per spec.md §6's inbound collaborator contract,
//! with an in-memory reference implementation for tests and the demo
//! binary — never meant as a production adapter.

use crate::types::{AdapterId, ColumnId};
use std::collections::BTreeMap;

/// System-of-record for schemas, tables, columns, and placements,
/// external to the router.
pub trait Catalog {
    /// For `table`, the columns placed on each adapter.
    fn placements_by_adapter(&self, table: &str) -> BTreeMap<AdapterId, Vec<ColumnId>>;

    /// The table's full column set, in column order.
    fn column_ids(&self, table: &str) -> Vec<ColumnId>;

    /// Human-readable name of an adapter.
    fn adapter_unique_name(&self, adapter: AdapterId) -> Option<String>;
}

/// In-memory `Catalog` for tests and the bundled demo binary.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    tables: BTreeMap<String, Vec<ColumnId>>,
    placements: BTreeMap<String, BTreeMap<AdapterId, Vec<ColumnId>>>,
    adapter_names: BTreeMap<AdapterId, String>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_table(&mut self, table: &str, columns: Vec<ColumnId>) {
        self.tables.insert(table.to_string(), columns);
    }

    pub fn add_placement(&mut self, table: &str, adapter: AdapterId, columns: Vec<ColumnId>) {
        self.placements
            .entry(table.to_string())
            .or_default()
            .insert(adapter, columns);
    }

    pub fn name_adapter(&mut self, adapter: AdapterId, name: &str) {
        self.adapter_names.insert(adapter, name.to_string());
    }

    /// Remove an adapter's placements everywhere it appears, mirroring
    /// the `dropPlacements` side effect on the catalog's own view.
    pub fn drop_adapter(&mut self, adapter: AdapterId) {
        for placements in self.placements.values_mut() {
            placements.remove(&adapter);
        }
        self.adapter_names.remove(&adapter);
    }
}

impl Catalog for InMemoryCatalog {
    fn placements_by_adapter(&self, table: &str) -> BTreeMap<AdapterId, Vec<ColumnId>> {
        self.placements.get(table).cloned().unwrap_or_default()
    }

    fn column_ids(&self, table: &str) -> Vec<ColumnId> {
        self.tables.get(table).cloned().unwrap_or_default()
    }

    fn adapter_unique_name(&self, adapter: AdapterId) -> Option<String> {
        self.adapter_names.get(&adapter).cloned()
    }
}
