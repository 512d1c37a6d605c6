//! Query-plan evaluation over in-memory collections.
//!
//! Entities are viewed through their JSON representation so the same
//! camelCase field names work here as in the query string, and RFC 3339
//! timestamps order correctly under plain string comparison.

use serde::Serialize;
use serde_json::Value;
use trailbound_core::query::{Comparison, Filter, QueryPlan, SortKey};

/// Apply a plan's filters, sort, and pagination to a collection.
///
/// Field projection is a response-shaping concern and is applied at the
/// HTTP boundary, not here. Unknown comparison operators match nothing
/// they can check, so they pass every item; the SQL backend is the strict
/// one.
pub fn apply_plan<T: Serialize + Clone>(items: &[T], plan: &QueryPlan) -> Vec<T> {
    let mut viewed: Vec<(Value, T)> = items
        .iter()
        .map(|item| {
            (
                serde_json::to_value(item).unwrap_or(Value::Null),
                item.clone(),
            )
        })
        .collect();

    viewed.retain(|(view, _)| plan.filters.iter().all(|f| matches_filter(view, f)));
    viewed.sort_by(|(a, _), (b, _)| compare_by_keys(a, b, &plan.sort));

    viewed
        .into_iter()
        .skip(usize::try_from(plan.skip).unwrap_or(usize::MAX))
        .take(usize::try_from(plan.limit).unwrap_or(usize::MAX))
        .map(|(_, item)| item)
        .collect()
}

fn matches_filter(view: &Value, filter: &Filter) -> bool {
    let Some(field) = view.get(&filter.field) else {
        return false;
    };
    match &filter.op {
        Comparison::Eq => eq_matches(field, &filter.value),
        Comparison::Gte => ordering(field, &filter.value).is_some_and(std::cmp::Ordering::is_ge),
        Comparison::Gt => ordering(field, &filter.value).is_some_and(std::cmp::Ordering::is_gt),
        Comparison::Lte => ordering(field, &filter.value).is_some_and(std::cmp::Ordering::is_le),
        Comparison::Lt => ordering(field, &filter.value).is_some_and(std::cmp::Ordering::is_lt),
        Comparison::Other(_) => true,
    }
}

fn eq_matches(field: &Value, raw: &str) -> bool {
    match field {
        Value::String(s) => s == raw,
        Value::Bool(b) => raw.parse::<bool>() == Ok(*b),
        Value::Number(n) => raw
            .parse::<f64>()
            .is_ok_and(|v| n.as_f64().is_some_and(|f| (f - v).abs() < f64::EPSILON)),
        _ => false,
    }
}

fn ordering(field: &Value, raw: &str) -> Option<std::cmp::Ordering> {
    match field {
        Value::Number(n) => {
            let lhs = n.as_f64()?;
            let rhs = raw.parse::<f64>().ok()?;
            lhs.partial_cmp(&rhs)
        }
        Value::String(s) => Some(s.as_str().cmp(raw)),
        _ => None,
    }
}

fn compare_by_keys(a: &Value, b: &Value, keys: &[SortKey]) -> std::cmp::Ordering {
    for key in keys {
        let ord = compare_values(a.get(&key.field), b.get(&key.field));
        let ord = if key.descending { ord.reverse() } else { ord };
        if ord != std::cmp::Ordering::Equal {
            return ord;
        }
    }
    std::cmp::Ordering::Equal
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> std::cmp::Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(std::cmp::Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(_), None) => std::cmp::Ordering::Greater,
        (None, Some(_)) => std::cmp::Ordering::Less,
        _ => std::cmp::Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;
    use trailbound_core::query::ListQuery;

    #[derive(Debug, Clone, PartialEq, Serialize)]
    #[serde(rename_all = "camelCase")]
    struct Row {
        name: String,
        price: i64,
        created_at: String,
    }

    fn rows() -> Vec<Row> {
        vec![
            Row {
                name: "a".into(),
                price: 300,
                created_at: "2026-01-03T00:00:00Z".into(),
            },
            Row {
                name: "b".into(),
                price: 100,
                created_at: "2026-01-01T00:00:00Z".into(),
            },
            Row {
                name: "c".into(),
                price: 200,
                created_at: "2026-01-02T00:00:00Z".into(),
            },
        ]
    }

    #[test]
    fn default_plan_sorts_newest_first() {
        let out = apply_plan(&rows(), &QueryPlan::default());
        let names: Vec<_> = out.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["a", "c", "b"]);
    }

    #[test]
    fn numeric_filters_compare_numerically() {
        let plan = ListQuery::new(vec![("price[gte]".to_string(), "200".to_string())]).translate();
        let out = apply_plan(&rows(), &plan);
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|r| r.price >= 200));
    }

    #[test]
    fn pagination_slices_after_sort() {
        let plan = ListQuery::new(vec![
            ("sort".to_string(), "price".to_string()),
            ("page".to_string(), "2".to_string()),
            ("limit".to_string(), "2".to_string()),
        ])
        .translate();
        let out = apply_plan(&rows(), &plan);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].price, 300);
    }
}
