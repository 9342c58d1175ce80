//! Cost model and benefit matrix construction (spec §4.5).
//!
//! For every (query, candidate) pair the scorer computes how much reading
//! cost a compound index would remove from that query, relative to a full
//! collection scan. The greedy selector in [`crate::selector`] only ever
//! reads the resulting dense matrix — it never recomputes a benefit itself.

use crate::candidate::IndexCandidate;
use crate::config::CostConfig;
use crate::estimator::{EstimateCache, Estimator};
use crate::error::EngineError;
use crate::query::Query;
use indexmap::IndexSet;

/// Dense benefit matrix: `rows[i][j]` is the benefit of candidate `j` for
/// query `i`. Candidates keep first-seen insertion order (spec §9 "impose
/// a deterministic order, e.g. first-seen"), via an `IndexSet` rather than
/// a `HashSet`/`BTreeSet`, so tie-breaks in the selector are reproducible.
pub struct BenefitMatrix {
    pub candidates: IndexSet<IndexCandidate>,
    pub rows: Vec<Vec<f64>>,
}

impl BenefitMatrix {
    pub fn candidate_index(&self, candidate: &IndexCandidate) -> Option<usize> {
        self.candidates.get_index_of(candidate)
    }
}

pub struct Scorer<'a> {
    estimator: &'a Estimator,
    cache: &'a EstimateCache,
    config: &'a CostConfig,
    collection_count: f64,
}

impl<'a> Scorer<'a> {
    pub fn new(
        estimator: &'a Estimator,
        cache: &'a EstimateCache,
        config: &'a CostConfig,
        collection_count: u64,
    ) -> Self {
        Self { estimator, cache, config, collection_count: collection_count as f64 }
    }

    /// Builds the full benefit matrix for every (query, candidate) pair.
    pub async fn build_matrix(
        &self,
        queries: &[Query],
        candidates: Vec<IndexCandidate>,
    ) -> Result<BenefitMatrix, EngineError> {
        let candidate_set: IndexSet<IndexCandidate> = candidates.into_iter().collect();
        let mut rows = Vec::with_capacity(queries.len());
        for query in queries {
            let mut row = Vec::with_capacity(candidate_set.len());
            for candidate in &candidate_set {
                row.push(self.benefit(query, candidate).await?);
            }
            rows.push(row);
        }
        Ok(BenefitMatrix { candidates: candidate_set, rows })
    }

    /// §4.5 benefit(query, candidate).
    pub async fn benefit(&self, query: &Query, candidate: &IndexCandidate) -> Result<f64, EngineError> {
        let filtered_query = query.index_intersect(candidate);
        if filtered_query.is_filter_empty() {
            return Ok(0.0);
        }

        let est = self.cache.get_or_estimate(self.estimator, &filtered_query).await?;
        let key_query = query.index_number_key_query(candidate);
        let mut key_est = self.cache.get_or_estimate(self.estimator, &key_query).await?;
        let mut est = est;

        if let Some(limit) = query.limit {
            if query.is_subset(candidate) {
                let limit = limit as f64;
                est = est.min(limit);
                key_est = key_est.min(limit);
            }
        }

        let mut index_cost = (self.config.ixscan_cost
            + (candidate.len().saturating_sub(1)) as f64 * self.config.index_field_cost)
            * key_est;
        if !query.is_covered(candidate) {
            index_cost += self.config.fetch_cost * est;
        }

        let mut benefit = self.collection_count - index_cost;

        if query.can_use_sort(candidate) {
            let sort_estimate = self.cache.get_or_estimate(self.estimator, query).await?.max(1.0);
            benefit += sort_estimate * sort_estimate.log2() * self.config.sort_cost;
        }

        Ok(benefit)
    }
}
