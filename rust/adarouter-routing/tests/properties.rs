//! Universal invariants from spec.md §8, as property tests.

use adarouter_config::QueryClassProvider;
use adarouter_routing::hasher::{classify, LogicalOperator, LogicalPlan, Literal};
use adarouter_routing::selection::{select, FixedRandomSource};
use adarouter_routing::types::{PlacementSet, QueryClass, RoutingRow, Weight};
use indexmap::IndexMap;
use proptest::prelude::*;

fn arb_literal() -> impl Strategy<Value = Literal> {
    prop_oneof![
        any::<i64>().prop_map(Literal::Int),
        "[a-z]{1,8}".prop_map(Literal::Text),
        any::<bool>().prop_map(Literal::Bool),
        Just(Literal::Null),
    ]
}

fn arb_plan() -> impl Strategy<Value = LogicalPlan> {
    (
        "[a-z]{1,6}",
        proptest::collection::vec(arb_literal(), 0..4),
    )
        .prop_map(|(table, literals)| {
            let mut plan = LogicalPlan::new().with_operator(LogicalOperator::TableScan {
                qualified_name: table,
            });
            for literal in literals {
                plan = plan.with_literal(literal);
            }
            plan
        })
}

proptest! {
    /// Invariant 3: classify is deterministic.
    #[test]
    fn classify_is_deterministic(plan in arb_plan()) {
        let a = classify(&plan, QueryClassProvider::StructuralShuttle);
        let b = classify(&plan, QueryClassProvider::StructuralShuttle);
        prop_assert_eq!(a, b);

        let a = classify(&plan, QueryClassProvider::Parameterizer);
        let b = classify(&plan, QueryClassProvider::Parameterizer);
        prop_assert_eq!(a, b);
    }

    /// Invariant 4: parameterizer invariance — two plans differing
    /// only in literal constants map to equal query classes.
    #[test]
    fn parameterizer_invariant_under_literal_substitution(
        table in "[a-z]{1,6}",
        literals_a in proptest::collection::vec(arb_literal(), 0..4),
        literals_b in proptest::collection::vec(arb_literal(), 0..4),
    ) {
        prop_assume!(literals_a.len() == literals_b.len());

        let mut plan_a = LogicalPlan::new().with_operator(LogicalOperator::TableScan {
            qualified_name: table.clone(),
        });
        for l in literals_a {
            plan_a = plan_a.with_literal(l);
        }

        let mut plan_b = LogicalPlan::new().with_operator(LogicalOperator::TableScan {
            qualified_name: table,
        });
        for l in literals_b {
            plan_b = plan_b.with_literal(l);
        }

        prop_assert_eq!(
            classify(&plan_a, QueryClassProvider::Parameterizer),
            classify(&plan_b, QueryClassProvider::Parameterizer)
        );
    }

    /// Invariant 5: as long as any placement set is Missing, selection
    /// returns exactly that placement set (the first one, in row
    /// order).
    #[test]
    fn exploration_always_wins_over_weighted_random(
        missing_index in 0usize..4,
        num_entries in 1usize..5,
        roll in 1u32..=100,
    ) {
        let missing_index = missing_index % num_entries;
        let mut row: RoutingRow = IndexMap::new();
        for i in 0..num_entries {
            let ps = PlacementSet::singleton(i as u32);
            let weight = if i == missing_index {
                Weight::Missing
            } else {
                Weight::Percent(0)
            };
            row.insert(ps, weight);
        }

        let qc = QueryClass::new("C");
        let mut rng = FixedRandomSource(roll);
        let chosen = select(&qc, &row, 150, &mut rng).unwrap();
        assert_eq!(chosen, PlacementSet::singleton(missing_index as u32));
    }
}
