//! Query model for the index recommendation engine.
//!
//! Normalizes a raw profiled filter expression into the `Query` AST that
//! every other module (candidate generation, estimation, scoring) operates
//! on.

pub mod ast;
pub mod normalize;

pub use ast::{FilterMap, Predicate, Query, QueryBuilder, Sort};
pub use normalize::normalize_filter;
