//! Query Abstract Syntax Tree (AST) definitions (spec §3, §4.1).
//!
//! A `Query` is a normalized read request: an ordered filter over
//! equality/range/`$in`/conjunction predicates, plus sort, limit and
//! projection metadata. It is immutable once constructed and hashable by
//! structural equality, the way the spec requires for the Estimate Cache
//! to be effective.

use crate::value::ScalarValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A single-field predicate, or a conjunction of several on the same field
/// (e.g. `x > 3 AND x < 10`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Predicate {
    Equality(ScalarValue),
    /// Invariant: non-empty.
    In(Vec<ScalarValue>),
    /// Invariant: at least one of `lo`/`hi` is set.
    Range {
        lo: Option<ScalarValue>,
        hi: Option<ScalarValue>,
        lo_incl: bool,
        hi_incl: bool,
    },
    /// Several predicates on the same field. Never contains a nested
    /// `Conjunction` — constructors flatten instead.
    Conjunction(Vec<Predicate>),
    /// Derived-only marker meaning "this field is present, any value".
    /// Produced solely by [`Query::index_number_key_query`] when widening
    /// a range/`$in` predicate on the last retained candidate field; never
    /// constructed directly from a filter expression.
    Any,
}

impl Predicate {
    pub fn equality(value: impl Into<ScalarValue>) -> Self {
        Predicate::Equality(value.into())
    }

    pub fn in_values(values: Vec<ScalarValue>) -> Self {
        assert!(!values.is_empty(), "Predicate::In requires at least one value");
        Predicate::In(values)
    }

    pub fn range(
        lo: Option<ScalarValue>,
        hi: Option<ScalarValue>,
        lo_incl: bool,
        hi_incl: bool,
    ) -> Self {
        assert!(lo.is_some() || hi.is_some(), "Predicate::Range requires at least one bound");
        Predicate::Range { lo, hi, lo_incl, hi_incl }
    }

    /// True for `Equality`, used by the cost model to decide whether a
    /// candidate field strips out of the sort-relevant equality prefix
    /// (spec §4.1 `can_use_sort`).
    pub fn is_equality(&self) -> bool {
        matches!(self, Predicate::Equality(_))
    }

    /// True for the kinds the `index_number_key_query` widening applies to.
    fn is_widenable(&self) -> bool {
        matches!(self, Predicate::Range { .. } | Predicate::In(_))
    }
}

/// An ordered, duplicate-free field→predicate map.
///
/// A plain `HashMap`/`IndexMap` won't do: the spec requires `fields()` to
/// return "insertion order of the original expression", and structural
/// equality (for the Estimate Cache key) must respect that order too. A
/// `Vec` of pairs gives both for free via `#[derive(PartialEq, Eq, Hash)]`,
/// at the cost of O(n) field lookup — acceptable since a candidate index
/// has at most `MAX_INDEX_FIELDS` fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct FilterMap(Vec<(String, Predicate)>);

impl FilterMap {
    pub fn get(&self, field: &str) -> Option<&Predicate> {
        self.0.iter().find(|(f, _)| f == field).map(|(_, p)| p)
    }

    pub fn insert(&mut self, field: String, predicate: Predicate) {
        match self.0.iter_mut().find(|(f, _)| *f == field) {
            Some((_, existing)) => *existing = predicate,
            None => self.0.push((field, predicate)),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.iter().map(|(f, _)| f)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn last_key(&self) -> Option<&String> {
        self.0.last().map(|(f, _)| f)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(String, Predicate)> {
        self.0.iter()
    }
}

/// Sort specification. Direction is tracked but ignored for scoring (spec §3).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Sort {
    pub fields: Vec<String>,
}

impl Sort {
    pub fn new(fields: Vec<String>) -> Self {
        Self { fields }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A normalized query (spec §3).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Query {
    filter: FilterMap,
    pub sort: Sort,
    pub limit: Option<u64>,
    /// `None` means no projection was specified, so the query needs the
    /// full document back — never covered by an index regardless of
    /// candidate, the way a bare `find(filter)` with no `.project(...)`
    /// forces a heap fetch. `Some(fields)` narrows that to exactly the
    /// named output fields.
    pub projection: Option<BTreeSet<String>>,
    /// Set only on the derived query returned by `index_number_key_query`;
    /// tells the estimator to run a distinct-key count instead of a
    /// document-match count.
    pub is_key_count: bool,
}

impl Query {
    pub fn new() -> Self {
        Self {
            filter: FilterMap::default(),
            sort: Sort::default(),
            limit: None,
            projection: None,
            is_key_count: false,
        }
    }

    pub fn builder() -> QueryBuilder {
        QueryBuilder::default()
    }

    /// Ordered sequence of filter fields, insertion order of the original
    /// expression (spec §3 "Derived: fields()").
    pub fn fields(&self) -> Vec<String> {
        self.filter.keys().cloned().collect()
    }

    pub fn filter(&self) -> &FilterMap {
        &self.filter
    }

    pub fn predicate(&self, field: &str) -> Option<&Predicate> {
        self.filter.get(field)
    }

    pub fn is_filter_empty(&self) -> bool {
        self.filter.is_empty()
    }

    /// All fields this query reads: filter ∪ sort ∪ projection. Only
    /// meaningful when `projection.is_some()` — callers needing the
    /// covered-query check should go through [`Query::is_covered`], which
    /// also accounts for an absent projection meaning "the whole document".
    pub fn referenced_fields(&self) -> BTreeSet<String> {
        let mut fields: BTreeSet<String> = self.filter.keys().cloned().collect();
        fields.extend(self.sort.fields.iter().cloned());
        if let Some(projection) = &self.projection {
            fields.extend(projection.iter().cloned());
        }
        fields
    }

    /// §4.1 `index_intersect`: walk `candidate` left-to-right, keeping
    /// exactly the fields present in `self.filter`, stopping at the first
    /// candidate field absent from the filter. `sort`/`limit`/`projection`
    /// are copied unchanged.
    pub fn index_intersect(&self, candidate: &[String]) -> Query {
        let mut filter = FilterMap::default();
        for field in candidate {
            match self.filter.get(field) {
                Some(predicate) => filter.insert(field.clone(), predicate.clone()),
                None => break,
            }
        }
        Query {
            filter,
            sort: self.sort.clone(),
            limit: self.limit,
            projection: self.projection.clone(),
            is_key_count: false,
        }
    }

    /// §4.1 `index_number_key_query`: the prefix-intersection, but with a
    /// range/`$in` predicate on the *last* retained field widened to "any
    /// value of that field" — the estimator then counts distinct index
    /// entries touched, not matching documents.
    pub fn index_number_key_query(&self, candidate: &[String]) -> Query {
        let mut query = self.index_intersect(candidate);
        if let Some(last_field) = query.filter.last_key().cloned() {
            if query.filter.get(&last_field).unwrap().is_widenable() {
                query.filter.insert(last_field, Predicate::Any);
            }
        }
        query.is_key_count = true;
        query
    }

    /// §4.1 `is_subset`: every filter field of `self` appears in `candidate`.
    pub fn is_subset(&self, candidate: &[String]) -> bool {
        self.filter.keys().all(|field| candidate.contains(field))
    }

    /// §4.1 `is_covered`: with no projection, the query needs the full
    /// document, which an index scan alone never provides. With an
    /// explicit projection, every field read by the query (filter ∪ sort ∪
    /// projection) must appear in `candidate`.
    pub fn is_covered(&self, candidate: &[String]) -> bool {
        if self.projection.is_none() {
            return false;
        }
        self.referenced_fields()
            .iter()
            .all(|field| candidate.contains(field))
    }

    /// §4.1 `can_use_sort`: strip a maximal prefix of candidate fields with
    /// equality predicates in this query, and check the remaining candidate
    /// prefix equals `sort` exactly.
    pub fn can_use_sort(&self, candidate: &[String]) -> bool {
        if self.sort.is_empty() {
            return false;
        }
        let mut idx = 0;
        while idx < candidate.len() {
            let is_equality_field = self
                .filter
                .get(&candidate[idx])
                .map(Predicate::is_equality)
                .unwrap_or(false);
            if is_equality_field {
                idx += 1;
            } else {
                break;
            }
        }
        let remaining = &candidate[idx..];
        remaining.len() == self.sort.fields.len()
            && remaining.iter().zip(&self.sort.fields).all(|(a, b)| a == b)
    }
}

impl Default for Query {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder used by tests and the profile-to-`Query` normalizer.
#[derive(Default)]
pub struct QueryBuilder {
    filter: FilterMap,
    sort: Sort,
    limit: Option<u64>,
    projection: Option<BTreeSet<String>>,
}

impl QueryBuilder {
    pub fn filter(mut self, field: impl Into<String>, predicate: Predicate) -> Self {
        self.filter.insert(field.into(), predicate);
        self
    }

    pub fn sort(mut self, fields: Vec<String>) -> Self {
        self.sort = Sort::new(fields);
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn project(mut self, fields: impl IntoIterator<Item = String>) -> Self {
        self.projection.get_or_insert_with(BTreeSet::new).extend(fields);
        self
    }

    pub fn build(self) -> Query {
        Query {
            filter: self.filter,
            sort: self.sort,
            limit: self.limit,
            projection: self.projection,
            is_key_count: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn fields_preserve_insertion_order() {
        let q = Query::builder()
            .filter("b", Predicate::equality(1i64))
            .filter("a", Predicate::equality(2i64))
            .build();
        assert_eq!(q.fields(), vec!["b".to_string(), "a".to_string()]);
    }

    #[test]
    fn index_intersect_stops_at_first_missing_field() {
        let q = Query::builder()
            .filter("a", Predicate::equality(1i64))
            .filter("c", Predicate::equality(3i64))
            .build();
        let intersected = q.index_intersect(&fields(&["a", "b", "c"]));
        assert_eq!(intersected.fields(), vec!["a".to_string()]);
    }

    #[test]
    fn index_intersect_copies_sort_limit_projection() {
        let q = Query::builder()
            .filter("a", Predicate::equality(1i64))
            .sort(vec!["s".to_string()])
            .limit(10)
            .project(vec!["p".to_string()])
            .build();
        let intersected = q.index_intersect(&fields(&["a"]));
        assert_eq!(intersected.sort, q.sort);
        assert_eq!(intersected.limit, q.limit);
        assert_eq!(intersected.projection, q.projection);
    }

    #[test]
    fn index_number_key_query_widens_range_on_last_field() {
        let q = Query::builder()
            .filter("a", Predicate::equality(1i64))
            .filter("b", Predicate::range(Some(ScalarValue::Int(5)), None, false, false))
            .build();
        let ekq = q.index_number_key_query(&fields(&["a", "b"]));
        assert!(ekq.is_key_count);
        assert_eq!(ekq.predicate("a"), Some(&Predicate::Equality(ScalarValue::Int(1))));
        assert_eq!(ekq.predicate("b"), Some(&Predicate::Any));
    }

    #[test]
    fn index_number_key_query_equality_only_prefix_is_unchanged() {
        // Open question in spec §9: equality-only prefixes collapse to the
        // same filter as `index_intersect`.
        let q = Query::builder()
            .filter("a", Predicate::equality(1i64))
            .filter("b", Predicate::equality(2i64))
            .build();
        let fq = q.index_intersect(&fields(&["a", "b"]));
        let ekq = q.index_number_key_query(&fields(&["a", "b"]));
        assert_eq!(ekq.filter(), fq.filter());
    }

    #[test]
    fn is_subset_true_iff_all_filter_fields_in_candidate() {
        let q = Query::builder()
            .filter("a", Predicate::equality(1i64))
            .filter("b", Predicate::equality(2i64))
            .build();
        assert!(q.is_subset(&fields(&["a", "b", "c"])));
        assert!(!q.is_subset(&fields(&["a"])));
    }

    #[test]
    fn is_covered_requires_sort_and_projection_fields_too() {
        let q = Query::builder()
            .filter("a", Predicate::equality(1i64))
            .sort(vec!["b".to_string()])
            .project(vec!["c".to_string()])
            .build();
        assert!(!q.is_covered(&fields(&["a", "b"])));
        assert!(q.is_covered(&fields(&["a", "b", "c"])));
    }

    #[test]
    fn is_covered_is_always_false_without_an_explicit_projection() {
        // No `.project(...)` call means the caller wants the whole
        // document back, which an index scan alone never provides.
        let q = Query::builder().filter("a", Predicate::equality(1i64)).build();
        assert!(!q.is_covered(&fields(&["a"])));
    }

    #[test]
    fn can_use_sort_strips_equality_prefix() {
        let q = Query::builder()
            .filter("a", Predicate::equality(1i64))
            .sort(vec!["b".to_string()])
            .build();
        assert!(q.can_use_sort(&fields(&["a", "b"])));
        assert!(!q.can_use_sort(&fields(&["a", "c"])));
        assert!(!q.can_use_sort(&fields(&["b", "a"])));
    }

    #[test]
    fn can_use_sort_false_when_no_sort_requested() {
        let q = Query::builder().filter("a", Predicate::equality(1i64)).build();
        assert!(!q.can_use_sort(&fields(&["a"])));
    }

    #[test]
    fn can_use_sort_only_strips_equality_not_range() {
        let q = Query::builder()
            .filter("a", Predicate::range(Some(ScalarValue::Int(1)), None, true, false))
            .sort(vec!["b".to_string()])
            .build();
        // `a` is a Range predicate, not Equality, so it is not stripped:
        // the remaining candidate prefix is `[a, b]`, which does not equal
        // the requested sort `[b]`.
        assert!(!q.can_use_sort(&fields(&["a", "b"])));
    }

    #[test]
    fn structural_equality_is_hash_stable() {
        use std::collections::HashSet;
        let a = Query::builder().filter("x", Predicate::equality(1i64)).build();
        let b = Query::builder().filter("x", Predicate::equality(1i64)).build();
        let mut set = HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
    }
}
