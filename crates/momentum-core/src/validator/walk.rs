//! Completeness walk over a parsed payload.
//!
//! Only levels that are actually reachable count toward the total: when
//! `daily_plans` is absent, the per-day fields are never counted, so a
//! missing subtree costs exactly one field.

use serde_json::{Map, Value};

use super::fences::strip_code_fences;
use super::report::CompletenessReport;
use super::schema::{Schema, SchemaNode};

#[derive(Default)]
struct Tally {
    total: usize,
    present: usize,
    missing: Vec<String>,
}

fn join(path: &str, name: &str) -> String {
    if path.is_empty() {
        name.to_string()
    } else {
        format!("{path}.{name}")
    }
}

fn is_present(value: Option<&Value>) -> bool {
    matches!(value, Some(v) if !v.is_null())
}

fn walk(node: &SchemaNode, object: &Map<String, Value>, path: &str, tally: &mut Tally) {
    let empty = Map::new();

    for field in &node.fields {
        tally.total += 1;
        let field_path = join(path, &field.name);
        let value = object.get(&field.name);

        if !is_present(value) {
            tally.missing.push(field_path);
            continue;
        }
        tally.present += 1;

        let (Some(child), Some(value)) = (&field.child, value) else {
            continue;
        };
        match value {
            Value::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    // A non-object element has none of the child's fields.
                    let item_object = item.as_object().unwrap_or(&empty);
                    walk(child, item_object, &format!("{field_path}[{i}]"), tally);
                }
            }
            Value::Object(inner) => walk(child, inner, &field_path, tally),
            _ => walk(child, &empty, &field_path, tally),
        }
    }
}

/// Check an already-parsed payload against `schema`.
pub fn validate_value(value: &Value, schema: &Schema) -> CompletenessReport {
    let Some(object) = value.as_object() else {
        return CompletenessReport::unparsable();
    };
    let mut tally = Tally::default();
    walk(&schema.root, object, "", &mut tally);
    CompletenessReport::from_counts(tally.total, tally.present, tally.missing)
}

/// Strip code fences, parse, and validate a raw model response.
///
/// Returns the parsed value alongside the report so callers can act on
/// the chosen strategy. The value is `None` when parsing failed.
pub fn parse_and_validate(raw: &str, schema: &Schema) -> (Option<Value>, CompletenessReport) {
    let text = strip_code_fences(raw);
    match serde_json::from_str::<Value>(text) {
        Ok(value) if value.is_object() => {
            let report = validate_value(&value, schema);
            (Some(value), report)
        }
        Ok(_) => (None, CompletenessReport::unparsable()),
        Err(e) => {
            tracing::debug!(error = %e, schema = %schema.name, "model response is not JSON");
            (None, CompletenessReport::unparsable())
        }
    }
}

pub fn validate_response(raw: &str, schema: &Schema) -> CompletenessReport {
    parse_and_validate(raw, schema).1
}

fn fill(node: &SchemaNode, object: &mut Map<String, Value>) -> usize {
    let mut inserted = 0;

    for field in &node.fields {
        if !is_present(object.get(&field.name)) {
            object.insert(field.name.clone(), field.default.clone());
            inserted += 1;
        }

        let Some(child) = &field.child else {
            continue;
        };
        let Some(value) = object.get_mut(&field.name) else {
            continue;
        };
        match value {
            Value::Array(items) => {
                for item in items.iter_mut() {
                    if !item.is_object() {
                        *item = Value::Object(Map::new());
                    }
                    if let Value::Object(inner) = item {
                        inserted += fill(child, inner);
                    }
                }
            }
            Value::Object(inner) => inserted += fill(child, inner),
            other => {
                let mut inner = Map::new();
                inserted += fill(child, &mut inner);
                *other = Value::Object(inner);
            }
        }
    }
    inserted
}

/// Insert schema defaults for every missing reachable field.
///
/// Returns the number of values inserted. Afterwards the payload validates
/// as complete. A non-object payload is left alone and reports 0.
pub fn apply_defaults(value: &mut Value, schema: &Schema) -> usize {
    match value.as_object_mut() {
        Some(object) => fill(&schema.root, object),
        None => 0,
    }
}
