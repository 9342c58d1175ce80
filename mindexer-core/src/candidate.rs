//! Candidate compound-index generation (spec §4.4).
//!
//! For a query's filter fields, every permutation up to `max_index_fields`
//! long is a candidate index. Field order matters — an index on `(a, b)`
//! serves a different set of queries than one on `(b, a)` — so candidates
//! are permutations, not combinations.

use crate::config::CandidateConfig;
use crate::query::Query;
use std::collections::HashSet;

/// A candidate compound index: an ordered, non-empty list of field names.
pub type IndexCandidate = Vec<String>;

/// Generates every candidate in first-seen order across the workload,
/// deduplicated, excluding the degenerate single-field `_id` candidate
/// (already indexed by every document database by default).
pub fn generate_candidates(queries: &[Query], config: &CandidateConfig) -> Vec<IndexCandidate> {
    let mut seen = HashSet::new();
    let mut candidates = Vec::new();

    for query in queries {
        let fields = query.fields();
        let max_len = fields.len().min(config.max_index_fields);
        for k in 1..=max_len {
            permutations_of_length(&fields, k, &mut |candidate: &[String]| {
                if candidate == ["_id".to_string()] {
                    return;
                }
                if seen.insert(candidate.to_vec()) {
                    candidates.push(candidate.to_vec());
                }
            });
        }
    }

    candidates
}

/// Emits every k-length permutation of `fields` (which itself has no
/// duplicates, since a `Query`'s filter map has unique keys) via callback,
/// avoiding an intermediate allocation per permutation's caller.
fn permutations_of_length(fields: &[String], k: usize, emit: &mut impl FnMut(&[String])) {
    fn backtrack(
        fields: &[String],
        k: usize,
        used: &mut Vec<bool>,
        current: &mut Vec<String>,
        emit: &mut impl FnMut(&[String]),
    ) {
        if current.len() == k {
            emit(current);
            return;
        }
        for (idx, field) in fields.iter().enumerate() {
            if used[idx] {
                continue;
            }
            used[idx] = true;
            current.push(field.clone());
            backtrack(fields, k, used, current, emit);
            current.pop();
            used[idx] = false;
        }
    }

    let mut used = vec![false; fields.len()];
    let mut current = Vec::with_capacity(k);
    backtrack(fields, k, &mut used, &mut current, emit);
}
