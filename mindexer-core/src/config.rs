//! Engine configuration (spec §6 tunables, §9 "Global tunables become an
//! explicit `EngineConfig` value").
//!
//! Follows the teacher's `ServerConfig` shape: one top-level struct
//! composed of smaller `Settings`/`Config` groups, each with a `Default`
//! impl, all `serde`-derived so a deployment can override them from TOML.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level engine configuration. No process-level state: every
/// subsystem (`Sampler`, `Scorer`, `Selector`) is constructed with an
/// `EngineConfig` passed in explicitly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EngineConfig {
    pub sampling: SamplingConfig,
    pub candidates: CandidateConfig,
    pub cost: CostConfig,
    pub selection: SelectionConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sampling: SamplingConfig::default(),
            candidates: CandidateConfig::default(),
            cost: CostConfig::default(),
            selection: SelectionConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a TOML file. Every field must be present;
    /// callers who want partial overrides should start from
    /// `toml::to_string(&EngineConfig::default())` and edit that.
    pub fn from_toml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> anyhow::Result<Self> {
        let config: EngineConfig = toml::from_str(text)?;
        Ok(config)
    }

    /// Basic self-consistency checks beyond what `AssertSampleDbDistinct`
    /// covers (that check needs the source database name, which this
    /// struct doesn't hold).
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.sampling.sample_ratio <= 0.0 || self.sampling.sample_ratio >= 1.0 {
            anyhow::bail!(
                "sample_ratio must be in (0, 1), got {}",
                self.sampling.sample_ratio
            );
        }
        if self.candidates.max_index_fields == 0 {
            anyhow::bail!("max_index_fields must be at least 1");
        }
        Ok(())
    }
}

/// Sampling tunables (spec §4.2).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SamplingConfig {
    /// Target fraction of the collection to sample.
    pub sample_ratio: f64,
    /// Explicit sample size; overrides `sample_ratio` when set.
    pub sample_size: Option<u64>,
    /// Database used to hold the persisted sample collection.
    pub sample_db: String,
    /// Floor below which the sampler always samples `min(N, min_sample_size)`.
    pub min_sample_size: u64,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            sample_ratio: 0.001,
            sample_size: None,
            sample_db: "mindexer_samples".to_string(),
            min_sample_size: 1000,
        }
    }
}

/// Candidate generation tunables (spec §4.4).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CandidateConfig {
    /// Maximum number of fields in a candidate compound index.
    pub max_index_fields: usize,
}

impl Default for CandidateConfig {
    fn default() -> Self {
        Self { max_index_fields: 3 }
    }
}

/// Cost model constants (spec §4.5).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CostConfig {
    pub ixscan_cost: f64,
    pub index_field_cost: f64,
    pub fetch_cost: f64,
    pub sort_cost: f64,
}

impl Default for CostConfig {
    fn default() -> Self {
        Self {
            ixscan_cost: 0.4,
            index_field_cost: 0.05,
            fetch_cost: 9.5,
            sort_cost: 10.0,
        }
    }
}

/// Greedy selector tunables (spec §4.6).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SelectionConfig {
    /// Maximum number of indexes to recommend. `0` means unlimited.
    pub max_indexes: usize,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self { max_indexes: 0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec_tunables() {
        let config = EngineConfig::default();
        assert_eq!(config.sampling.sample_ratio, 0.001);
        assert_eq!(config.sampling.sample_db, "mindexer_samples");
        assert_eq!(config.candidates.max_index_fields, 3);
        assert_eq!(config.selection.max_indexes, 0);
        assert_eq!(config.cost.ixscan_cost, 0.4);
        assert_eq!(config.cost.index_field_cost, 0.05);
        assert_eq!(config.cost.fetch_cost, 9.5);
        assert_eq!(config.cost.sort_cost, 10.0);
        assert_eq!(config.sampling.min_sample_size, 1000);
    }

    #[test]
    fn validate_rejects_bad_sample_ratio() {
        let mut config = EngineConfig::default();
        config.sampling.sample_ratio = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_sample_ratio() {
        let mut config = EngineConfig::default();
        config.sampling.sample_ratio = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn round_trips_through_toml() {
        let config = EngineConfig::default();
        let text = toml::to_string(&config).unwrap();
        let parsed = EngineConfig::from_toml_str(&text).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn partial_toml_falls_back_to_defaults_for_missing_sections() {
        let err = EngineConfig::from_toml_str("").unwrap_err();
        // serde requires all fields present unless marked `default`; this
        // documents the current strictness rather than silently guessing.
        assert!(err.to_string().contains("missing field"));
    }
}
