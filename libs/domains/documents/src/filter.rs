//! Translation of caller-supplied `where` documents into store filters.
//!
//! Metadata keys are addressed under the `metadata.` payload path. Supported
//! operators: implicit equality, `$eq`, `$ne`, `$gt`, `$gte`, `$lt`, `$lte`,
//! `$in`, and the combinators `$and` / `$or`.

use qdrant_client::qdrant::{Condition, Filter, Range};
use serde_json::Value;

use crate::error::{DocumentError, DocumentResult};

fn metadata_path(key: &str) -> String {
    format!("metadata.{key}")
}

/// Translate a `where` document into a store filter.
pub fn translate_where(doc: &Value) -> DocumentResult<Filter> {
    let obj = doc.as_object().ok_or_else(|| {
        DocumentError::Validation("where filter must be a JSON object".to_string())
    })?;

    let mut must = Vec::new();
    let mut should = Vec::new();

    for (key, value) in obj {
        match key.as_str() {
            "$and" => {
                for sub in combinator_operands(key, value)? {
                    must.push(Condition::from(translate_where(sub)?));
                }
            }
            "$or" => {
                for sub in combinator_operands(key, value)? {
                    should.push(Condition::from(translate_where(sub)?));
                }
            }
            _ if key.starts_with('$') => {
                return Err(DocumentError::Validation(format!(
                    "unsupported where operator '{key}'"
                )));
            }
            _ => must.push(field_condition(key, value)?),
        }
    }

    Ok(Filter {
        must,
        should,
        ..Default::default()
    })
}

fn combinator_operands<'a>(key: &str, value: &'a Value) -> DocumentResult<&'a Vec<Value>> {
    value.as_array().ok_or_else(|| {
        DocumentError::Validation(format!("'{key}' expects an array of filters"))
    })
}

fn field_condition(key: &str, value: &Value) -> DocumentResult<Condition> {
    match value {
        Value::String(_) | Value::Number(_) | Value::Bool(_) => equality_condition(key, value),
        Value::Object(ops) => {
            let (op, operand) = match ops.iter().next() {
                Some(entry) if ops.len() == 1 => entry,
                _ => {
                    return Err(DocumentError::Validation(format!(
                        "field '{key}' expects exactly one operator"
                    )));
                }
            };
            operator_condition(key, op, operand)
        }
        _ => Err(DocumentError::Validation(format!(
            "unsupported where value for field '{key}'"
        ))),
    }
}

fn operator_condition(key: &str, op: &str, operand: &Value) -> DocumentResult<Condition> {
    match op {
        "$eq" => equality_condition(key, operand),
        "$ne" => Ok(Condition::from(Filter {
            must_not: vec![equality_condition(key, operand)?],
            ..Default::default()
        })),
        "$gt" | "$gte" | "$lt" | "$lte" => {
            let bound = operand.as_f64().ok_or_else(|| {
                DocumentError::Validation(format!("'{op}' on '{key}' expects a number"))
            })?;
            let range = match op {
                "$gt" => Range {
                    gt: Some(bound),
                    ..Default::default()
                },
                "$gte" => Range {
                    gte: Some(bound),
                    ..Default::default()
                },
                "$lt" => Range {
                    lt: Some(bound),
                    ..Default::default()
                },
                _ => Range {
                    lte: Some(bound),
                    ..Default::default()
                },
            };
            Ok(Condition::range(metadata_path(key), range))
        }
        "$in" => in_condition(key, operand),
        _ => Err(DocumentError::Validation(format!(
            "unsupported where operator '{op}' on field '{key}'"
        ))),
    }
}

fn equality_condition(key: &str, value: &Value) -> DocumentResult<Condition> {
    let path = metadata_path(key);
    match value {
        Value::String(s) => Ok(Condition::matches(path, s.clone())),
        Value::Bool(b) => Ok(Condition::matches(path, *b)),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Condition::matches(path, i))
            } else {
                // Floats have no match clause in the store; an exact range
                // expresses the same predicate.
                let f = n.as_f64().ok_or_else(|| {
                    DocumentError::Validation(format!("unrepresentable number for '{key}'"))
                })?;
                Ok(Condition::range(
                    path,
                    Range {
                        gte: Some(f),
                        lte: Some(f),
                        ..Default::default()
                    },
                ))
            }
        }
        _ => Err(DocumentError::Validation(format!(
            "equality on '{key}' expects a scalar"
        ))),
    }
}

fn in_condition(key: &str, operand: &Value) -> DocumentResult<Condition> {
    let values = operand.as_array().ok_or_else(|| {
        DocumentError::Validation(format!("'$in' on '{key}' expects an array"))
    })?;

    if values.iter().all(|v| v.is_string()) {
        let keywords: Vec<String> = values
            .iter()
            .filter_map(|v| v.as_str())
            .map(str::to_string)
            .collect();
        return Ok(Condition::matches(metadata_path(key), keywords));
    }

    if values.iter().all(|v| v.as_i64().is_some()) {
        let integers: Vec<i64> = values.iter().filter_map(|v| v.as_i64()).collect();
        return Ok(Condition::matches(metadata_path(key), integers));
    }

    Err(DocumentError::Validation(format!(
        "'$in' on '{key}' expects all strings or all integers"
    )))
}
