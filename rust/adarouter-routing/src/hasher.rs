//! Query Class Hasher: reduces a logical plan to a stable fingerprint.
//!
//! Replaces the source's inheritance-based plan visitor with a sum
//! type over logical operator kinds and a single dispatch function, per
//! spec.md §9's "plan-visitor polymorphism" design note. No dynamic
//! class hierarchy is needed.

use crate::types::{QueryClass, QueryClassProvider};
use std::collections::BTreeSet;

/// One node of a logical query plan, reduced to the discriminators the
/// structural-shuttle strategy cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogicalOperator {
    TableScan { qualified_name: String },
    Aggregate { agg_call_list: String },
    Filter,
    Project { arity: usize },
    Join { lhs_table: String, rhs_table: String },
    Sort,
    Union,
    Intersect,
    Minus,
    Exchange { distribution_kind: String },
    Correlate,
    Match { qualified_name: String },
    Values,
    Other { operator_kind: String },
}

impl LogicalOperator {
    /// Structural discriminator string for this node, or `None` for
    /// operators treated as terminal (no discriminator contributed).
    fn discriminator(&self) -> Option<String> {
        match self {
            LogicalOperator::TableScan { qualified_name } => {
                Some(format!("TableScan#{qualified_name}"))
            }
            LogicalOperator::Aggregate { agg_call_list } => {
                Some(format!("LogicalAggregate#{agg_call_list}"))
            }
            LogicalOperator::Filter => Some("LogicalFilter".to_string()),
            LogicalOperator::Project { arity } => Some(format!("LogicalProject#{arity}")),
            LogicalOperator::Join {
                lhs_table,
                rhs_table,
            } => Some(format!("LogicalJoin#{lhs_table}#{rhs_table}")),
            LogicalOperator::Sort => Some("LogicalSort".to_string()),
            LogicalOperator::Union => Some("LogicalUnion".to_string()),
            LogicalOperator::Intersect => Some("LogicalIntersect".to_string()),
            LogicalOperator::Minus => Some("LogicalMinus".to_string()),
            LogicalOperator::Exchange { distribution_kind } => {
                Some(format!("LogicalExchange#{distribution_kind}"))
            }
            LogicalOperator::Correlate => Some("LogicalCorrelate".to_string()),
            LogicalOperator::Match { qualified_name } => {
                Some(format!("LogicalMatch#{qualified_name}"))
            }
            LogicalOperator::Values => None,
            LogicalOperator::Other { operator_kind } => Some(format!("other#{operator_kind}")),
        }
    }
}

/// A literal value appearing in a plan node, as seen by the
/// parameterizer strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Literal {
    Int(i64),
    Text(String),
    Bool(bool),
    Null,
}

/// Top-level statement kind a plan was built for. Anything other than
/// `Query` is a modification query (spec.md §4.1): these are never
/// classified and never touch the routing table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatementKind {
    #[default]
    Query,
    Insert,
    Update,
    Delete,
    Merge,
}

/// A logical plan: an ordered sequence of operators (in traversal
/// order) plus the literal constants embedded in it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogicalPlan {
    pub kind: StatementKind,
    pub operators: Vec<LogicalOperator>,
    pub literals: Vec<Literal>,
}

impl LogicalPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_operator(mut self, op: LogicalOperator) -> Self {
        self.operators.push(op);
        self
    }

    pub fn with_literal(mut self, literal: Literal) -> Self {
        self.literals.push(literal);
        self
    }

    pub fn with_kind(mut self, kind: StatementKind) -> Self {
        self.kind = kind;
        self
    }

    /// True for INSERT/UPDATE/DELETE/MERGE plans, which bypass the
    /// query class hasher and the routing table entirely.
    pub fn is_modification(&self) -> bool {
        !matches!(self.kind, StatementKind::Query)
    }
}

/// Reduce a logical plan to its query class under the given strategy.
///
/// Deterministic: the same plan yields the same [`QueryClass`] across
/// calls, and the hasher carries no state between invocations.
pub fn classify(plan: &LogicalPlan, provider: QueryClassProvider) -> QueryClass {
    match provider {
        QueryClassProvider::StructuralShuttle => classify_structural(plan),
        QueryClassProvider::Parameterizer => classify_parameterized(plan),
    }
}

/// Walk the operator tree, collecting structural discriminators into
/// a stably ordered set.
fn classify_structural(plan: &LogicalPlan) -> QueryClass {
    let discriminators: BTreeSet<String> = plan
        .operators
        .iter()
        .filter_map(LogicalOperator::discriminator)
        .collect();

    let rendered = format!(
        "{{{}}}",
        discriminators.into_iter().collect::<Vec<_>>().join(", ")
    );
    QueryClass::new(rendered)
}

/// Rewrite the plan by extracting literal constants into positional
/// parameters, then emit the plan's canonical comparison string.
/// Literals collapse so `x = 3` and `x = 7` hash alike.
fn classify_parameterized(plan: &LogicalPlan) -> QueryClass {
    let mut canonical = String::new();
    for (i, op) in plan.operators.iter().enumerate() {
        if i > 0 {
            canonical.push('|');
        }
        canonical.push_str(&canonical_operator_form(op));
    }
    canonical.push_str("#params=");
    canonical.push_str(&plan.literals.len().to_string());
    QueryClass::new(canonical)
}

/// Canonical form of an operator with any literal-bearing content
/// replaced by a `?` placeholder, matching the parameterizer's
/// collapse-literals contract.
fn canonical_operator_form(op: &LogicalOperator) -> String {
    match op {
        LogicalOperator::TableScan { qualified_name } => format!("TableScan#{qualified_name}"),
        LogicalOperator::Aggregate { .. } => "LogicalAggregate#?".to_string(),
        LogicalOperator::Filter => "LogicalFilter#?".to_string(),
        LogicalOperator::Project { arity } => format!("LogicalProject#{arity}"),
        LogicalOperator::Join {
            lhs_table,
            rhs_table,
        } => format!("LogicalJoin#{lhs_table}#{rhs_table}"),
        LogicalOperator::Sort => "LogicalSort".to_string(),
        LogicalOperator::Union => "LogicalUnion".to_string(),
        LogicalOperator::Intersect => "LogicalIntersect".to_string(),
        LogicalOperator::Minus => "LogicalMinus".to_string(),
        LogicalOperator::Exchange { distribution_kind } => {
            format!("LogicalExchange#{distribution_kind}")
        }
        LogicalOperator::Correlate => "LogicalCorrelate".to_string(),
        LogicalOperator::Match { qualified_name } => format!("LogicalMatch#{qualified_name}"),
        LogicalOperator::Values => "LogicalValues".to_string(),
        LogicalOperator::Other { operator_kind } => format!("other#{operator_kind}"),
    }
}
