//! The boundary between the engine and a real document database (spec §2
//! "out of scope: the database driver, defined only by the interfaces the
//! core uses").
//!
//! `Driver` is the one trait a production integration has to implement.
//! [`MemoryDriver`] is an in-memory double used by tests, benchmarks and
//! `mindexer-cli`'s demo mode — it never talks to a real database, it just
//! holds documents in a `Vec` and evaluates filters the way a document
//! database's own executor would.

use crate::error::EngineError;
use crate::query::{FilterMap, Predicate};
use crate::value::ScalarValue;
use async_trait::async_trait;
use rand::Rng;
use std::cmp::Ordering as CmpOrdering;
use std::sync::Mutex;

/// Operations the engine needs from a document database.
///
/// Object-safe so callers can hold a `dyn Driver` behind an `Arc`; every
/// method is async because a real implementation talks to a remote server.
#[async_trait]
pub trait Driver: Send + Sync {
    /// Full document count of the source collection.
    async fn count(&self) -> Result<u64, EngineError>;

    /// Documents in `namespace` matching `filter`. Implementations may push
    /// the filter server-side rather than materializing every match; the
    /// engine itself only calls this when it genuinely needs the rows
    /// (never for estimation, which goes through `count_documents`/
    /// `distinct_count` instead).
    async fn find(
        &self,
        namespace: &str,
        filter: &FilterMap,
    ) -> Result<Vec<serde_json::Value>, EngineError>;

    /// Number of documents in `namespace` matching `filter`.
    async fn count_documents(&self, namespace: &str, filter: &FilterMap) -> Result<u64, EngineError>;

    /// Number of distinct combinations of `fields`' values among documents
    /// in `namespace` matching `filter` — used for the key-count estimate
    /// (spec §4.3 "Derived key-count queries").
    async fn distinct_count(
        &self,
        namespace: &str,
        fields: &[String],
        filter: &FilterMap,
    ) -> Result<u64, EngineError>;

    /// Materialize a uniform random sample of `size` documents from the
    /// source collection into `dest_namespace`.
    async fn materialize_sample(&self, dest_namespace: &str, size: u64) -> Result<(), EngineError>;

    /// Drop a namespace (idempotent — dropping an absent namespace is not
    /// an error).
    async fn drop(&self, namespace: &str) -> Result<(), EngineError>;

    /// Create a compound index on `namespace` over `fields`, in order. Used
    /// only by the before/after benchmark harness, never by the engine
    /// itself (spec §6) — recommending an index does not apply it.
    async fn create_index(&self, namespace: &str, fields: &[String]) -> Result<(), EngineError>;

    /// Run every query in `workload` against `namespace` and report total
    /// wall-clock time in milliseconds. Benchmark-harness only; lets a
    /// caller measure the effect of `create_index` before/after a
    /// recommendation is applied.
    async fn execute_workload(
        &self,
        namespace: &str,
        workload: &[FilterMap],
    ) -> Result<u64, EngineError>;
}

/// An in-memory [`Driver`] holding the source collection as a
/// `Vec<serde_json::Value>`, plus zero or more named sample namespaces
/// materialized from it.
pub struct MemoryDriver {
    source: Vec<serde_json::Value>,
    namespaces: Mutex<std::collections::HashMap<String, Vec<serde_json::Value>>>,
    /// `(namespace, ordered field list)` pairs created via `create_index`.
    /// Tracked only so the benchmark harness can inspect what it built;
    /// never consulted by `find`/`count_documents`/`distinct_count`, which
    /// always scan — this driver has no real index structure to speed them up.
    indexes: Mutex<Vec<(String, Vec<String>)>>,
}

impl MemoryDriver {
    pub fn new(source: Vec<serde_json::Value>) -> Self {
        Self {
            source,
            namespaces: Mutex::new(std::collections::HashMap::new()),
            indexes: Mutex::new(Vec::new()),
        }
    }

    fn documents_in(&self, namespace: &str) -> Vec<serde_json::Value> {
        if namespace.is_empty() {
            return self.source.clone();
        }
        self.namespaces
            .lock()
            .unwrap()
            .get(namespace)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl Driver for MemoryDriver {
    async fn count(&self) -> Result<u64, EngineError> {
        Ok(self.source.len() as u64)
    }

    async fn find(
        &self,
        namespace: &str,
        filter: &FilterMap,
    ) -> Result<Vec<serde_json::Value>, EngineError> {
        let docs = self.documents_in(namespace);
        Ok(docs.into_iter().filter(|doc| matches_filter(doc, filter)).collect())
    }

    async fn count_documents(&self, namespace: &str, filter: &FilterMap) -> Result<u64, EngineError> {
        let docs = self.documents_in(namespace);
        Ok(docs.iter().filter(|doc| matches_filter(doc, filter)).count() as u64)
    }

    async fn distinct_count(
        &self,
        namespace: &str,
        _fields: &[String],
        filter: &FilterMap,
    ) -> Result<u64, EngineError> {
        // A non-unique secondary index always disambiguates same-valued
        // entries with the document's own id, so "distinct index entries
        // touched" is the same count as "documents matched" — `fields` is
        // kept on the trait to mirror a real driver's `distinct()`-shaped
        // call, but doesn't change the count here.
        let docs = self.documents_in(namespace);
        Ok(docs.iter().filter(|doc| matches_filter(doc, filter)).count() as u64)
    }

    async fn materialize_sample(&self, dest_namespace: &str, size: u64) -> Result<(), EngineError> {
        if self.source.is_empty() {
            return Err(EngineError::EmptyCollection);
        }
        let sample = reservoir_sample(&self.source, size as usize);
        self.namespaces
            .lock()
            .unwrap()
            .insert(dest_namespace.to_string(), sample);
        Ok(())
    }

    async fn drop(&self, namespace: &str) -> Result<(), EngineError> {
        self.namespaces.lock().unwrap().remove(namespace);
        Ok(())
    }

    async fn create_index(&self, namespace: &str, fields: &[String]) -> Result<(), EngineError> {
        self.indexes.lock().unwrap().push((namespace.to_string(), fields.to_vec()));
        Ok(())
    }

    async fn execute_workload(
        &self,
        namespace: &str,
        workload: &[FilterMap],
    ) -> Result<u64, EngineError> {
        let docs = self.documents_in(namespace);
        let start = std::time::Instant::now();
        for filter in workload {
            let _ = docs.iter().filter(|doc| matches_filter(doc, filter)).count();
        }
        Ok(start.elapsed().as_millis() as u64)
    }
}

/// Uniform reservoir sampling (Algorithm R), so every document has an
/// equal chance of being retained regardless of collection size.
fn reservoir_sample(source: &[serde_json::Value], size: usize) -> Vec<serde_json::Value> {
    if size >= source.len() {
        return source.to_vec();
    }
    let mut rng = rand::thread_rng();
    let mut reservoir: Vec<serde_json::Value> = source[..size].to_vec();
    for (idx, doc) in source.iter().enumerate().skip(size) {
        let j = rng.gen_range(0..=idx);
        if j < size {
            reservoir[j] = doc.clone();
        }
    }
    reservoir
}

/// Whether `doc` satisfies every predicate in `filter` (logical AND across
/// fields, the same conjunction semantics `Query::index_intersect` assumes).
pub fn matches_filter(doc: &serde_json::Value, filter: &FilterMap) -> bool {
    filter.iter().all(|(field, predicate)| matches_predicate(doc, field, predicate))
}

fn matches_predicate(doc: &serde_json::Value, field: &str, predicate: &Predicate) -> bool {
    let doc_value = doc.get(field).and_then(ScalarValue::from_json);
    match predicate {
        Predicate::Equality(expected) => doc_value.as_ref() == Some(expected),
        Predicate::In(values) => doc_value.map(|v| values.contains(&v)).unwrap_or(false),
        Predicate::Range { lo, hi, lo_incl, hi_incl } => match doc_value {
            Some(v) => {
                let above_lo = match lo {
                    None => true,
                    Some(lo) => match v.cmp(lo) {
                        CmpOrdering::Greater => true,
                        CmpOrdering::Equal => *lo_incl,
                        CmpOrdering::Less => false,
                    },
                };
                let below_hi = match hi {
                    None => true,
                    Some(hi) => match v.cmp(hi) {
                        CmpOrdering::Less => true,
                        CmpOrdering::Equal => *hi_incl,
                        CmpOrdering::Greater => false,
                    },
                };
                above_lo && below_hi
            }
            None => false,
        },
        Predicate::Conjunction(predicates) => {
            predicates.iter().all(|p| matches_predicate(doc, field, p))
        }
        Predicate::Any => doc_value.is_some(),
    }
}
