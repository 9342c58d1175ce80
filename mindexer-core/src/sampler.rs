//! Sample lifecycle management (spec §4.2).
//!
//! A `Sampler` owns exactly one materialized sample collection per engine
//! run: it decides the sample size, reuses an already-compatible persisted
//! sample if one exists, or asks the driver to materialize a fresh one, and
//! drops it again once the engine is done estimating.

use crate::config::SamplingConfig;
use crate::driver::Driver;
use crate::error::EngineError;
use crate::query::FilterMap;
use std::sync::Arc;

/// A materialized sample: its namespace, how many documents it holds, and
/// the full source-collection count it was scaled down from.
#[derive(Debug, Clone)]
pub struct SampleHandle {
    pub namespace: String,
    pub sample_size: u64,
    pub collection_count: u64,
}

impl SampleHandle {
    /// Horvitz–Thompson scale factor: `N / n`.
    pub fn scale_factor(&self) -> f64 {
        self.collection_count as f64 / self.sample_size as f64
    }
}

pub struct Sampler {
    driver: Arc<dyn Driver>,
    config: SamplingConfig,
}

impl Sampler {
    pub fn new(driver: Arc<dyn Driver>, config: SamplingConfig) -> Self {
        Self { driver, config }
    }

    /// Computes the sample size for a collection of `collection_count`
    /// documents, reuses a persisted sample of that same size if one is
    /// already present in `config.sample_db`, otherwise materializes a
    /// fresh one, and returns a handle describing it.
    ///
    /// Fatal preconditions (spec §7): the source collection must be
    /// non-empty, and the configured sample database must not be the
    /// source database itself.
    pub async fn ensure_sample(
        &self,
        source_db: &str,
        namespace: &str,
    ) -> Result<SampleHandle, EngineError> {
        if self.config.sample_db == source_db {
            return Err(EngineError::AssertSampleDbDistinct);
        }

        let collection_count = self.driver.count().await?;
        if collection_count == 0 {
            return Err(EngineError::EmptyCollection);
        }

        let sample_size = self.target_sample_size(collection_count);
        let sample_namespace = format!("{}.{}", self.config.sample_db, namespace);

        let existing = self
            .driver
            .count_documents(&sample_namespace, &FilterMap::default())
            .await?;
        if existing == sample_size {
            tracing::debug!(
                collection_count,
                sample_size,
                sample_db = %self.config.sample_db,
                "reusing compatible persisted sample"
            );
            return Ok(SampleHandle {
                namespace: sample_namespace,
                sample_size,
                collection_count,
            });
        }

        tracing::debug!(
            collection_count,
            sample_size,
            sample_db = %self.config.sample_db,
            "materializing sample"
        );
        self.driver
            .materialize_sample(&sample_namespace, sample_size)
            .await
            .map_err(|e| EngineError::SampleUnavailable(e.to_string()))?;

        Ok(SampleHandle {
            namespace: sample_namespace,
            sample_size,
            collection_count,
        })
    }

    /// §4.2: explicit `sample_size` wins when set; otherwise `N * sample_ratio`,
    /// floored at `min(N, min_sample_size)`.
    fn target_sample_size(&self, collection_count: u64) -> u64 {
        if let Some(explicit) = self.config.sample_size {
            return explicit.min(collection_count);
        }
        let floor = self.config.min_sample_size.min(collection_count);
        let scaled = (collection_count as f64 * self.config.sample_ratio).ceil() as u64;
        scaled.max(floor).min(collection_count)
    }

    pub async fn drop_sample(&self, handle: &SampleHandle) -> Result<(), EngineError> {
        tracing::debug!(sample_db = %handle.namespace, "dropping sample");
        self.driver.drop(&handle.namespace).await
    }
}
