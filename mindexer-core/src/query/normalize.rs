//! Normalizes a raw profiled filter expression (a JSON object, the shape a
//! document database's profiler logs a query's filter as) into the
//! `Predicate`/`FilterMap` half of a [`Query`] (spec §3, §7).
//!
//! Recognizes `$eq`, `$in`, `$gt`, `$gte`, `$lt`, `$lte`, bare scalar
//! equality, and implicit multi-key conjunction (several top-level fields,
//! ANDed together). Anything else — an unrecognized operator, a nested
//! logical operator like `$or`, a field whose value is an array or object —
//! is rejected with [`EngineError::UnsupportedQuery`] so the profile
//! ingester can skip that one entry rather than fail the whole workload.

use crate::error::EngineError;
use crate::query::ast::{FilterMap, Predicate};
use crate::value::ScalarValue;
use serde_json::Value;

pub fn normalize_filter(expr: &Value) -> Result<FilterMap, EngineError> {
    let object = expr
        .as_object()
        .ok_or_else(|| EngineError::UnsupportedQuery(format!("filter is not an object: {expr}")))?;

    let mut filter = FilterMap::default();
    for (field, value) in object.iter() {
        let predicate = normalize_field_value(field, value)?;
        filter.insert(field.clone(), predicate);
    }
    Ok(filter)
}

fn normalize_field_value(field: &str, value: &Value) -> Result<Predicate, EngineError> {
    if let Some(scalar) = ScalarValue::from_json(value) {
        return Ok(Predicate::equality(scalar));
    }

    let object = match value.as_object() {
        Some(object) => object,
        None => {
            return Err(EngineError::UnsupportedQuery(format!(
                "field {field} has an unsupported literal value: {value}"
            )))
        }
    };

    if let Some(eq) = object.get("$eq") {
        let scalar = ScalarValue::from_json(eq).ok_or_else(|| {
            EngineError::UnsupportedQuery(format!("field {field}: $eq has a non-scalar operand"))
        })?;
        return Ok(Predicate::equality(scalar));
    }

    if let Some(values) = object.get("$in") {
        let values = values.as_array().ok_or_else(|| {
            EngineError::UnsupportedQuery(format!("field {field}: $in operand is not an array"))
        })?;
        if values.is_empty() {
            return Err(EngineError::UnsupportedQuery(format!(
                "field {field}: $in operand is empty"
            )));
        }
        let scalars = values
            .iter()
            .map(ScalarValue::from_json)
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| {
                EngineError::UnsupportedQuery(format!("field {field}: $in contains a non-scalar"))
            })?;
        return Ok(Predicate::in_values(scalars));
    }

    let mut lo = None;
    let mut lo_incl = false;
    let mut hi = None;
    let mut hi_incl = false;
    let mut recognized_range_key = false;

    for (op, bound) in object.iter() {
        let scalar = match op.as_str() {
            "$gt" | "$gte" | "$lt" | "$lte" => ScalarValue::from_json(bound).ok_or_else(|| {
                EngineError::UnsupportedQuery(format!("field {field}: {op} has a non-scalar operand"))
            })?,
            other => {
                return Err(EngineError::UnsupportedQuery(format!(
                    "field {field}: unrecognized operator {other}"
                )))
            }
        };
        recognized_range_key = true;
        match op.as_str() {
            "$gt" => {
                lo = Some(scalar);
                lo_incl = false;
            }
            "$gte" => {
                lo = Some(scalar);
                lo_incl = true;
            }
            "$lt" => {
                hi = Some(scalar);
                hi_incl = false;
            }
            "$lte" => {
                hi = Some(scalar);
                hi_incl = true;
            }
            _ => unreachable!(),
        }
    }

    if recognized_range_key {
        Ok(Predicate::range(lo, hi, lo_incl, hi_incl))
    } else {
        Err(EngineError::UnsupportedQuery(format!(
            "field {field}: empty operator object"
        )))
    }
}
