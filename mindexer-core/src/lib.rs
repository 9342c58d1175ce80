//! mindexer-core — sample-based index recommendation engine
//!
//! This crate provides the recommendation pipeline for a single document
//! collection:
//! - A normalized query model (`query`)
//! - Sample lifecycle management (`sampler`)
//! - Cardinality estimation against the sample (`estimator`)
//! - Candidate compound-index generation (`candidate`)
//! - A closed-form cost model (`scorer`)
//! - Greedy, marginal-benefit index selection (`selector`)
//! - The database boundary (`driver`) and workload ingestion (`workload`)

pub mod candidate;
pub mod config;
pub mod driver;
pub mod engine;
pub mod error;
pub mod estimator;
pub mod query;
pub mod sampler;
pub mod scorer;
pub mod selector;
pub mod value;
pub mod workload;

pub use candidate::{generate_candidates, IndexCandidate};
pub use config::EngineConfig;
pub use driver::{Driver, MemoryDriver};
pub use engine::Engine;
pub use error::{EngineError, Result};
pub use query::{FilterMap, Predicate, Query, QueryBuilder, Sort};
pub use sampler::{SampleHandle, Sampler};
pub use scorer::{BenefitMatrix, Scorer};
pub use selector::Recommendation;
pub use value::ScalarValue;
pub use workload::{Workload, WorkloadEntry};
