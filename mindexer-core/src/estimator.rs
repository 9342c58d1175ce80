//! Cardinality estimation by scaling up counts measured against the sample
//! (spec §4.3 "Horvitz–Thompson-style scale-up").

use crate::driver::Driver;
use crate::error::EngineError;
use crate::query::Query;
use crate::sampler::SampleHandle;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

pub struct Estimator {
    driver: Arc<dyn Driver>,
    sample: SampleHandle,
}

impl Estimator {
    pub fn new(driver: Arc<dyn Driver>, sample: SampleHandle) -> Self {
        Self { driver, sample }
    }

    /// Scaled-up estimate of how many documents (or, for a key-count query,
    /// how many distinct index entries) a query touches in the full
    /// collection.
    ///
    /// `m * (N / n)`, where `m` is the matching count measured against the
    /// sample, `N` the full collection count and `n` the sample size.
    pub async fn estimate(&self, query: &Query) -> Result<f64, EngineError> {
        let matched = if query.is_key_count {
            self.driver
                .distinct_count(&self.sample.namespace, &query.fields(), query.filter())
                .await?
        } else {
            self.driver
                .count_documents(&self.sample.namespace, query.filter())
                .await?
        };
        Ok(matched as f64 * self.sample.scale_factor())
    }
}

/// Memoizes [`Estimator::estimate`] by structural query equality, scoped to
/// a single engine run (spec §5: "the same (query, candidate) estimate is
/// requested repeatedly during selection; cache it for the run").
#[derive(Default)]
pub struct EstimateCache {
    entries: Mutex<HashMap<Query, f64>>,
}

impl EstimateCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get_or_estimate(
        &self,
        estimator: &Estimator,
        query: &Query,
    ) -> Result<f64, EngineError> {
        if let Some(cached) = self.entries.lock().get(query).copied() {
            return Ok(cached);
        }
        let estimate = estimator.estimate(query).await?;
        self.entries.lock().insert(query.clone(), estimate);
        Ok(estimate)
    }
}
