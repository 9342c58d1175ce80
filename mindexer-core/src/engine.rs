//! Top-level orchestration (spec §2 "Data flow").
//!
//! `Engine::recommend` wires the Sampler, candidate generator, Scorer and
//! greedy Selector together: materialize a sample, build candidates from
//! the workload, score every (query, candidate) pair, run the greedy
//! selection, then drop the sample before returning.

use crate::candidate::generate_candidates;
use crate::config::EngineConfig;
use crate::driver::Driver;
use crate::error::EngineError;
use crate::estimator::{EstimateCache, Estimator};
use crate::sampler::Sampler;
use crate::scorer::Scorer;
use crate::selector::{select, Recommendation};
use crate::workload::Workload;
use std::sync::Arc;

pub struct Engine {
    driver: Arc<dyn Driver>,
    config: EngineConfig,
}

impl Engine {
    pub fn new(driver: Arc<dyn Driver>, config: EngineConfig) -> Self {
        Self { driver, config }
    }

    /// Runs one full recommendation cycle for `workload` against `source_db`/
    /// `source_namespace`. Always drops the materialized sample before
    /// returning, including on the error path, so a failed run never leaks
    /// a sample namespace.
    pub async fn recommend(
        &self,
        source_db: &str,
        source_namespace: &str,
        workload: &Workload,
    ) -> Result<Vec<Recommendation>, EngineError> {
        self.config
            .validate()
            .map_err(|e| EngineError::Driver(e))?;

        let sampler = Sampler::new(self.driver.clone(), self.config.sampling.clone());
        let sample = sampler.ensure_sample(source_db, source_namespace).await?;

        let result = self.recommend_against_sample(&sample, workload).await;

        if let Err(drop_err) = sampler.drop_sample(&sample).await {
            tracing::warn!(error = %drop_err, "failed to drop sample after recommendation run");
        }

        result
    }

    async fn recommend_against_sample(
        &self,
        sample: &crate::sampler::SampleHandle,
        workload: &Workload,
    ) -> Result<Vec<Recommendation>, EngineError> {
        if workload.queries.is_empty() {
            return Ok(Vec::new());
        }

        let candidates = generate_candidates(&workload.queries, &self.config.candidates);
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let estimator = Estimator::new(self.driver.clone(), sample.clone());
        let cache = EstimateCache::new();
        let scorer = Scorer::new(&estimator, &cache, &self.config.cost, sample.collection_count);
        let matrix = scorer.build_matrix(&workload.queries, candidates).await?;

        Ok(select(matrix, &self.config.selection))
    }
}
