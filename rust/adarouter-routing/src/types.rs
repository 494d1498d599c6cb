//! Core data model for the adaptive routing engine.
//!
//! A routing row preserves insertion order because the selection
//! policy's exploration and weighted-random rules are defined in terms
//! of iteration order (see [`RoutingRow`]).

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Opaque equivalence-class fingerprint produced by the query class
/// hasher.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QueryClass(pub String);

impl QueryClass {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QueryClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Small non-negative integer identifying a storage adapter, assigned
/// by the catalog.
pub type AdapterId = u32;

/// Identifier of a column within a table, as assigned by the catalog.
pub type ColumnId = u32;

/// A set of adapter ids that together provide every column of a given
/// table. Equality is by set membership; used as a routing row key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlacementSet(pub BTreeSet<AdapterId>);

impl PlacementSet {
    pub fn singleton(adapter: AdapterId) -> Self {
        Self(BTreeSet::from([adapter]))
    }

    pub fn from_adapters(adapters: impl IntoIterator<Item = AdapterId>) -> Self {
        Self(adapters.into_iter().collect())
    }

    pub fn adapters(&self) -> impl Iterator<Item = AdapterId> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for PlacementSet {
    /// Renders as `[1, 2]`, the form the feedback reference tag
    /// embeds (see [`crate::intake`]).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, adapter) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{adapter}")?;
        }
        write!(f, "]")
    }
}

/// Selection probability for one placement set within a routing row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Weight {
    /// This placement cannot serve this query class.
    NoPlacement,
    /// No timing sample has been observed yet.
    Missing,
    /// Selection probability in percent, `0..=100`.
    Percent(u8),
}

impl Weight {
    /// Construct a percent weight, clamping to the valid range.
    pub fn percent(value: u8) -> Self {
        Self::Percent(value.min(100))
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Weight::Missing)
    }

    pub fn is_no_placement(&self) -> bool {
        matches!(self, Weight::NoPlacement)
    }

    /// Numeric contribution to a running weighted-random sum. Sentinel
    /// values contribute zero.
    pub fn as_share(&self) -> u32 {
        match self {
            Weight::Percent(p) => *p as u32,
            _ => 0,
        }
    }
}

impl fmt::Display for Weight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Weight::NoPlacement => f.write_str("-"),
            Weight::Missing => f.write_str("Unknown"),
            Weight::Percent(p) => write!(f, "{p}"),
        }
    }
}

/// Mapping `PlacementSet -> Weight` for one query class. Order
/// matters: the selection policy iterates rows in insertion order.
pub type RoutingRow = IndexMap<PlacementSet, Weight>;

/// A single execution-time observation: the placement set and query
/// class the query ran under, and the elapsed time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingSample {
    pub query_class: QueryClass,
    pub placement_set: PlacementSet,
    pub nanos: u64,
}

/// Event forwarded to the external monitoring service whenever an
/// execution completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingEvent {
    pub query_class: QueryClass,
    pub placement_set: PlacementSet,
    pub nanos: u64,
}

/// One retained timing observation as reported back by the monitoring
/// service, keyed by the placement set that served it.
///
/// spec.md §6 describes `getRoutingDataPoints` as AID-keyed, but §4.4
/// requires grouping by `PS` to compute per-placement mean times; for
/// a synthetic (multi-adapter) `PS` those are not interchangeable.
/// This keys by `PlacementSet` directly, which is what the refresher
/// actually consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataPoint {
    pub query_class: QueryClass,
    pub placement_set: PlacementSet,
    pub nanos: u64,
}

/// Which hashing strategy `classify` uses, re-exported here for
/// convenience alongside the rest of the data model.
pub use adarouter_config::QueryClassProvider;
