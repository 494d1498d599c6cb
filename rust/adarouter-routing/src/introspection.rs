//! Introspection Surface: read-only tabular view of the routing table
//! for diagnostics.
//!
//! No direct teacher analogue in the retrieved files; built from
//! spec.md §6's description of the introspection page, kept in the
//! same plain `std::fmt` style the rest of the crate uses for
//! `Display` impls.

use crate::table::RoutingTable;
use crate::types::{PlacementSet, QueryClass, Weight};
use std::fmt;

/// One row of the introspection table: the query class and its
/// rendered cell for every known placement set, in registry order.
#[derive(Debug, Clone)]
pub struct IntrospectionRow {
    pub query_class: QueryClass,
    pub cells: Vec<(PlacementSet, String)>,
}

/// A snapshot of the whole routing table suitable for rendering as a
/// diagnostic page: one row per query class, one column per known
/// placement set.
#[derive(Debug, Clone)]
pub struct IntrospectionView {
    pub columns: Vec<PlacementSet>,
    /// Human-readable label for each column, in the same order, joining
    /// per-adapter names from the known-adapters registry (spec.md §3)
    /// with `+`. Falls back to the bare adapter id when unlabeled.
    pub column_labels: Vec<String>,
    pub rows: Vec<IntrospectionRow>,
}

impl IntrospectionView {
    /// Render the current state of `table`. Computed on demand; never
    /// cached, matching "refreshed on demand" in spec.md §6.
    pub async fn capture(table: &RoutingTable) -> Self {
        let columns = table.known_placements().await;

        let mut column_labels = Vec::with_capacity(columns.len());
        for ps in &columns {
            let mut parts = Vec::new();
            for adapter in ps.adapters() {
                let part = table
                    .adapter_label(adapter)
                    .await
                    .unwrap_or_else(|| adapter.to_string());
                parts.push(part);
            }
            column_labels.push(parts.join("+"));
        }

        let mut rows = Vec::new();
        for query_class in table.query_classes().await {
            let Some(row) = table.get(&query_class).await else {
                continue;
            };
            let cells = columns
                .iter()
                .map(|ps| {
                    let cell = row
                        .get(ps)
                        .map(render_weight)
                        .unwrap_or_else(|| Weight::NoPlacement.to_string());
                    (ps.clone(), cell)
                })
                .collect();
            rows.push(IntrospectionRow { query_class, cells });
        }
        Self {
            columns,
            column_labels,
            rows,
        }
    }
}

/// Render a cell: percent weight as-is, `"Unknown"` for `Missing`,
/// `"-"` for `NoPlacement` (spec.md §6).
fn render_weight(weight: &Weight) -> String {
    weight.to_string()
}

impl fmt::Display for IntrospectionView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QC")?;
        for (column, label) in self.columns.iter().zip(&self.column_labels) {
            write!(f, "\t{column} ({label})")?;
        }
        writeln!(f)?;

        for row in &self.rows {
            write!(f, "{}", row.query_class)?;
            for (_, cell) in &row.cells {
                write!(f, "\t{cell}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::QueryClass;

    #[tokio::test]
    async fn capture_renders_sentinel_cells() {
        let table = RoutingTable::new();
        let ps_a = crate::types::PlacementSet::singleton(1);
        table
            .initialize_row(QueryClass::new("C1"), &[ps_a.clone()])
            .await;

        let view = IntrospectionView::capture(&table).await;
        assert_eq!(view.rows.len(), 1);
        assert_eq!(view.rows[0].cells[0].1, "Unknown");
    }

    #[tokio::test]
    async fn capture_labels_columns_from_the_adapter_registry() {
        let table = RoutingTable::new();
        let ps_a = crate::types::PlacementSet::singleton(1);
        let ps_b = crate::types::PlacementSet::singleton(2);
        table
            .initialize_row(QueryClass::new("C1"), &[ps_a.clone(), ps_b.clone()])
            .await;
        table
            .register_adapter_label(1, "mongo-primary".to_string())
            .await;

        let view = IntrospectionView::capture(&table).await;
        let label_for = |ps: &PlacementSet| {
            let idx = view.columns.iter().position(|c| c == ps).unwrap();
            view.column_labels[idx].clone()
        };
        assert_eq!(label_for(&ps_a), "mongo-primary");
        assert_eq!(label_for(&ps_b), "2");
    }
}
