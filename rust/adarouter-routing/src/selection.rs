//! Selection Policy: per-query choice of placement set from a routing
//! row.
//!
//! Weighted-random selection accepts a pluggable random source so it
//! can be made deterministic under test, per spec.md §9.

use crate::error::{Result, RoutingError};
use crate::types::{PlacementSet, QueryClass, RoutingRow, Weight};
use rand::Rng;

/// Source of randomness for weighted-random selection. Implementors
/// return a uniformly distributed integer in `[1, 100]`.
pub trait RandomSource {
    fn roll(&mut self) -> u32;
}

/// `RandomSource` backed by `rand::thread_rng`.
#[derive(Debug, Default)]
pub struct ThreadRandomSource;

impl RandomSource for ThreadRandomSource {
    fn roll(&mut self) -> u32 {
        rand::thread_rng().gen_range(1..=100)
    }
}

/// Deterministic `RandomSource` for tests: always returns the same
/// fixed value.
#[derive(Debug, Clone, Copy)]
pub struct FixedRandomSource(pub u32);

impl RandomSource for FixedRandomSource {
    fn roll(&mut self) -> u32 {
        self.0
    }
}

/// Choose one placement set from `row` for `query_class`, given the
/// configured short-running similarity threshold (zero disables
/// weighted choice; see spec.md §4.5).
pub fn select(
    query_class: &QueryClass,
    row: &RoutingRow,
    similar_short: u32,
    random: &mut impl RandomSource,
) -> Result<PlacementSet> {
    if let Some((placement, _)) = row.iter().find(|(_, w)| w.is_missing()) {
        return Ok(placement.clone());
    }

    if similar_short == 0 {
        return row
            .iter()
            .find(|(_, w)| matches!(w, Weight::Percent(100)))
            .map(|(ps, _)| ps.clone())
            .ok_or_else(|| RoutingError::SelectionExhausted(query_class.clone()));
    }

    let roll = random.roll().clamp(1, 100);
    let mut running = 0u32;
    for (placement, weight) in row {
        running += weight.as_share();
        if running >= roll {
            return Ok(placement.clone());
        }
    }

    Err(RoutingError::SelectionExhausted(query_class.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    fn qc() -> QueryClass {
        QueryClass::new("C1")
    }

    #[test]
    fn exploration_returns_first_missing_entry() {
        let mut row: RoutingRow = IndexMap::new();
        let ps_a = PlacementSet::singleton(1);
        let ps_b = PlacementSet::singleton(2);
        row.insert(ps_a.clone(), Weight::Missing);
        row.insert(ps_b, Weight::Missing);

        let mut rng = FixedRandomSource(50);
        let chosen = select(&qc(), &row, 150, &mut rng).unwrap();
        assert_eq!(chosen, ps_a);
    }

    #[test]
    fn deterministic_when_similar_short_is_zero() {
        let mut row: RoutingRow = IndexMap::new();
        let ps_a = PlacementSet::singleton(1);
        let ps_b = PlacementSet::singleton(2);
        row.insert(ps_a.clone(), Weight::Percent(100));
        row.insert(ps_b, Weight::Percent(0));

        let mut rng = FixedRandomSource(99);
        let chosen = select(&qc(), &row, 0, &mut rng).unwrap();
        assert_eq!(chosen, ps_a);
    }

    #[test]
    fn weighted_random_picks_by_accumulated_share() {
        let mut row: RoutingRow = IndexMap::new();
        let ps_a = PlacementSet::singleton(1);
        let ps_b = PlacementSet::singleton(2);
        row.insert(ps_a.clone(), Weight::Percent(67));
        row.insert(ps_b.clone(), Weight::Percent(33));

        let mut rng = FixedRandomSource(67);
        assert_eq!(select(&qc(), &row, 150, &mut rng).unwrap(), ps_a);

        let mut rng = FixedRandomSource(68);
        assert_eq!(select(&qc(), &row, 150, &mut rng).unwrap(), ps_b);
    }

    #[test]
    fn malformed_row_reports_selection_exhausted() {
        let mut row: RoutingRow = IndexMap::new();
        row.insert(PlacementSet::singleton(1), Weight::Percent(0));

        let mut rng = FixedRandomSource(50);
        let err = select(&qc(), &row, 150, &mut rng).unwrap_err();
        assert!(matches!(err, RoutingError::SelectionExhausted(_)));
    }
}
