//! Workload ingestion (spec §7 "Unsupported operators ... skip, warn,
//! continue").
//!
//! A `Workload` is a profile of raw queries as a document database's
//! profiler would log them: a filter expression, plus optional sort, limit
//! and projection. Parsing never fails the whole run — an entry whose
//! filter uses an operator outside the supported set is logged and dropped.

use crate::query::{normalize_filter, Query};
use serde::Deserialize;
use std::collections::BTreeSet;

/// One profiled query entry, the shape a profiler log line would take.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkloadEntry {
    pub filter: serde_json::Value,
    #[serde(default)]
    pub sort: Vec<String>,
    #[serde(default)]
    pub limit: Option<u64>,
    #[serde(default)]
    pub projection: Vec<String>,
}

/// The queries an engine run scores candidates against.
#[derive(Debug, Clone, Default)]
pub struct Workload {
    pub queries: Vec<Query>,
}

impl Workload {
    /// Parses a workload from newline-delimited JSON (one [`WorkloadEntry`]
    /// per line, the shape a profiler export takes). Entries that fail to
    /// normalize are skipped with a warning, never fatal.
    pub fn from_jsonlines(text: &str) -> Self {
        let mut queries = Vec::new();
        for (line_no, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str::<WorkloadEntry>(line) {
                Ok(entry) => match entry.into_query() {
                    Ok(query) => queries.push(query),
                    Err(err) => {
                        tracing::warn!(line = line_no + 1, error = %err, "skipping unsupported query");
                    }
                },
                Err(err) => {
                    tracing::warn!(line = line_no + 1, error = %err, "skipping malformed workload entry");
                }
            }
        }
        Self { queries }
    }
}

impl WorkloadEntry {
    pub fn into_query(self) -> Result<Query, crate::error::EngineError> {
        let filter = normalize_filter(&self.filter)?;
        let mut builder = Query::builder();
        for (field, predicate) in filter.iter() {
            builder = builder.filter(field.clone(), predicate.clone());
        }
        if !self.sort.is_empty() {
            builder = builder.sort(self.sort);
        }
        if let Some(limit) = self.limit {
            builder = builder.limit(limit);
        }
        if !self.projection.is_empty() {
            let projection: BTreeSet<String> = self.projection.into_iter().collect();
            builder = builder.project(projection);
        }
        Ok(builder.build())
    }
}
