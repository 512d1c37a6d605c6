//! Request handlers, grouped per resource.

pub mod bookings;
pub mod health;
pub mod reviews;
pub mod tours;
pub mod users;

use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};

/// Success envelope for a single document, with optional field projection.
pub(crate) fn document<T: Serialize>(value: &T, fields: Option<&[String]>) -> Json<Value> {
    let data = project(serde_json::to_value(value).unwrap_or(Value::Null), fields);
    Json(json!({ "status": "success", "data": data }))
}

/// Success envelope for a collection, with a result count and optional
/// field projection.
pub(crate) fn collection<T: Serialize>(items: &[T], fields: Option<&[String]>) -> Json<Value> {
    let data: Vec<Value> = items
        .iter()
        .map(|item| project(serde_json::to_value(item).unwrap_or(Value::Null), fields))
        .collect();
    Json(json!({ "status": "success", "results": data.len(), "data": data }))
}

/// Apply a `fields` include-list to a JSON object. The id always survives
/// projection; non-objects pass through untouched.
fn project(value: Value, fields: Option<&[String]>) -> Value {
    let Some(fields) = fields else {
        return value;
    };
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(key, _)| key == "id" || fields.iter().any(|f| f == key))
                .collect(),
        ),
        other => other,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn projection_keeps_requested_fields_and_id() {
        let value = json!({ "id": "x", "name": "n", "price": 5, "secret": false });
        let fields = vec!["name".to_string(), "price".to_string()];
        let projected = project(value, Some(&fields));
        let map = projected.as_object().unwrap();
        assert_eq!(map.len(), 3);
        assert!(map.contains_key("id"));
        assert!(!map.contains_key("secret"));
    }

    #[test]
    fn no_fields_means_everything() {
        let value = json!({ "a": 1, "b": 2 });
        assert_eq!(project(value.clone(), None), value);
    }
}
