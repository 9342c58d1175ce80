//! Property-based tests for the cost model and selector invariants (spec §8).

use mindexer_core::config::{CandidateConfig, CostConfig, SelectionConfig};
use mindexer_core::driver::MemoryDriver;
use mindexer_core::estimator::{EstimateCache, Estimator};
use mindexer_core::sampler::SampleHandle;
use mindexer_core::scorer::Scorer;
use mindexer_core::selector::select;
use mindexer_core::{candidate::generate_candidates, Predicate, Query};
use proptest::prelude::*;
use serde_json::json;
use std::sync::Arc;

fn field_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("a".to_string()),
        Just("b".to_string()),
        Just("c".to_string()),
        Just("d".to_string()),
    ]
}

fn value_strategy() -> impl Strategy<Value = i64> {
    0i64..5
}

/// Generates a small equality-only query over 1-3 distinct fields.
fn query_strategy() -> impl Strategy<Value = Query> {
    prop::collection::hash_map(field_strategy(), value_strategy(), 1..4).prop_map(|pairs| {
        let mut builder = Query::builder();
        // HashMap iteration order is unspecified, but a Query's own field
        // order only needs to be *some* fixed order for a given input map,
        // not reproduce any particular insertion order here.
        let mut entries: Vec<_> = pairs.into_iter().collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        for (field, value) in entries {
            builder = builder.filter(field, Predicate::equality(value));
        }
        builder.build()
    })
}

fn synthetic_collection() -> Vec<serde_json::Value> {
    (0..2000)
        .map(|i| {
            json!({
                "a": i % 5,
                "b": (i / 5) % 5,
                "c": (i / 25) % 5,
                "d": (i / 125) % 5,
            })
        })
        .collect()
}

fn scorer_over<'a>(
    docs: Vec<serde_json::Value>,
    cache: &'a EstimateCache,
    estimator: &'a Estimator,
    cost: &'a CostConfig,
) -> Scorer<'a> {
    let count = docs.len() as u64;
    Scorer::new(estimator, cache, cost, count)
}

fn run_async<F: std::future::Future>(fut: F) -> F::Output {
    tokio::runtime::Runtime::new().unwrap().block_on(fut)
}

proptest! {
    /// Property 2 (spec §8): benefit(q, c) = 0 when no filter field of `q`
    /// matches the first field of `c`.
    #[test]
    fn prop_benefit_zero_when_candidate_first_field_not_in_filter(
        query in query_strategy(),
        other_field in field_strategy(),
    ) {
        let fields = query.fields();
        prop_assume!(!fields.contains(&other_field));

        let docs = synthetic_collection();
        let count = docs.len() as u64;
        let driver: Arc<dyn mindexer_core::Driver> = Arc::new(MemoryDriver::new(docs));
        let estimator = Estimator::new(driver, SampleHandle { namespace: String::new(), sample_size: count, collection_count: count });
        let cache = EstimateCache::new();
        let cost = CostConfig::default();
        let scorer = Scorer::new(&estimator, &cache, &cost, count);

        let candidate = vec![other_field];
        let benefit = run_async(scorer.benefit(&query, &candidate)).unwrap();
        prop_assert_eq!(benefit, 0.0);
    }

    /// Property 4 (spec §8): `is_subset(c) ∧ limit = L ⇒ est ≤ L` (and so the
    /// resulting index cost can never exceed the limit-bounded estimate).
    #[test]
    fn prop_limit_caps_benefit_cost_contribution(
        query in query_strategy(),
        limit in 1u64..20,
    ) {
        let candidate = query.fields();
        let mut limited = query;
        limited.limit = Some(limit);

        let docs = synthetic_collection();
        let count = docs.len() as u64;
        let driver: Arc<dyn mindexer_core::Driver> = Arc::new(MemoryDriver::new(docs));
        let estimator = Estimator::new(driver, SampleHandle { namespace: String::new(), sample_size: count, collection_count: count });
        let cache = EstimateCache::new();
        let cost = CostConfig::default();
        let scorer = Scorer::new(&estimator, &cache, &cost, count);

        let benefit = run_async(scorer.benefit(&limited, &candidate)).unwrap();
        // index_cost is bounded above by (ixscan + (k-1)*field_cost + fetch) * limit
        let k = candidate.len() as f64;
        let max_index_cost = (cost.ixscan_cost + (k - 1.0) * cost.index_field_cost + cost.fetch_cost) * limit as f64;
        prop_assert!(benefit >= count as f64 - max_index_cost - 1e-6);
    }

    /// Property (spec §8): the selector never returns more recommendations
    /// than there are candidates, and never more than `max_indexes` when set.
    #[test]
    fn prop_selector_result_bounded_by_candidates_and_cap(
        queries in prop::collection::vec(query_strategy(), 1..6),
        max_indexes in 0usize..4,
    ) {
        let docs = synthetic_collection();
        let count = docs.len() as u64;
        let driver: Arc<dyn mindexer_core::Driver> = Arc::new(MemoryDriver::new(docs));
        let estimator = Estimator::new(driver, SampleHandle { namespace: String::new(), sample_size: count, collection_count: count });
        let cache = EstimateCache::new();
        let cost = CostConfig::default();
        let scorer = scorer_over(synthetic_collection(), &cache, &estimator, &cost);

        let candidates = generate_candidates(&queries, &CandidateConfig::default());
        let matrix = run_async(scorer.build_matrix(&queries, candidates.clone())).unwrap();
        let num_candidates = matrix.candidates.len();
        let selection = SelectionConfig { max_indexes };
        let recommendations = select(matrix, &selection);

        prop_assert!(recommendations.len() <= num_candidates);
        if max_indexes > 0 {
            prop_assert!(recommendations.len() <= max_indexes);
        }
    }

    /// Determinism: selecting twice from the same matrix gives the same
    /// ordered result.
    #[test]
    fn prop_selection_is_deterministic(
        queries in prop::collection::vec(query_strategy(), 1..6),
    ) {
        let docs = synthetic_collection();
        let count = docs.len() as u64;

        let driver1: Arc<dyn mindexer_core::Driver> = Arc::new(MemoryDriver::new(docs.clone()));
        let estimator1 = Estimator::new(driver1, SampleHandle { namespace: String::new(), sample_size: count, collection_count: count });
        let cache1 = EstimateCache::new();
        let cost = CostConfig::default();
        let scorer1 = Scorer::new(&estimator1, &cache1, &cost, count);
        let candidates1 = generate_candidates(&queries, &CandidateConfig::default());
        let matrix1 = run_async(scorer1.build_matrix(&queries, candidates1)).unwrap();
        let result1 = select(matrix1, &SelectionConfig::default());

        let driver2: Arc<dyn mindexer_core::Driver> = Arc::new(MemoryDriver::new(docs));
        let estimator2 = Estimator::new(driver2, SampleHandle { namespace: String::new(), sample_size: count, collection_count: count });
        let cache2 = EstimateCache::new();
        let scorer2 = Scorer::new(&estimator2, &cache2, &cost, count);
        let candidates2 = generate_candidates(&queries, &CandidateConfig::default());
        let matrix2 = run_async(scorer2.build_matrix(&queries, candidates2)).unwrap();
        let result2 = select(matrix2, &SelectionConfig::default());

        prop_assert_eq!(
            result1.iter().map(|r| r.candidate.clone()).collect::<Vec<_>>(),
            result2.iter().map(|r| r.candidate.clone()).collect::<Vec<_>>()
        );
    }
}
