//! Error kinds for the recommendation engine (spec §7).
//!
//! `UnsupportedQuery` is the only recoverable kind: the profile ingester
//! catches it per-entry and skips the offending query. Every other variant
//! is fatal — the engine never emits partial recommendations, since a
//! partial workload would bias the greedy selector's totals.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// A filter used an operator the query model doesn't recognize.
    /// Policy: skip, warn, continue — never fatal on its own.
    #[error("unsupported query: {0}")]
    UnsupportedQuery(String),

    /// The source collection has zero documents. Fatal, aborts before sampling.
    #[error("source collection is empty")]
    EmptyCollection,

    /// `sample_db` configured equal to the source database.
    #[error("sample database must be distinct from the source database")]
    AssertSampleDbDistinct,

    /// The driver failed to materialize a sample collection.
    #[error("sample unavailable: {0}")]
    SampleUnavailable(String),

    /// Any lower-level I/O failure surfaced by the driver during estimation.
    #[error("driver error: {0}")]
    Driver(#[source] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
