//! Dynamic SQL rendering of query plans.
//!
//! Each store declares a whitelist of filterable/sortable columns mapping
//! the API's camelCase names to column names with their value type. Plans
//! referencing anything outside the whitelist, or carrying an operator the
//! translator passed through unrecognized, are rejected as client errors
//! before any SQL runs. Values always go through bind parameters.
//!
//! Field projection is response shaping and happens at the HTTP boundary;
//! queries always select full rows.

use chrono::{DateTime, Utc};
use sqlx::{Postgres, QueryBuilder};
use trailbound_core::error::{Error, Result};
use trailbound_core::query::{Comparison, QueryPlan};

/// Value type of a whitelisted column, driving string-to-bind coercion.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Kind {
    Int,
    Float,
    Bool,
    Text,
    Timestamp,
}

/// One whitelisted column.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Column {
    /// camelCase name used by the API.
    pub api: &'static str,
    /// Column name in the table.
    pub name: &'static str,
    pub kind: Kind,
}

pub(crate) const fn col(api: &'static str, name: &'static str, kind: Kind) -> Column {
    Column { api, name, kind }
}

fn lookup<'a>(columns: &'a [Column], api: &str) -> Option<&'a Column> {
    columns.iter().find(|c| c.api == api)
}

/// Append WHERE / ORDER BY / LIMIT / OFFSET for `plan` onto a builder that
/// already holds the SELECT. `has_where` says whether the builder already
/// opened a WHERE clause (fixed scoping like `tour_id = ...`).
pub(crate) fn push_plan(
    qb: &mut QueryBuilder<'_, Postgres>,
    plan: &QueryPlan,
    columns: &[Column],
    mut has_where: bool,
) -> Result<()> {
    for filter in &plan.filters {
        let column = lookup(columns, &filter.field)
            .ok_or_else(|| Error::validation(format!("cannot filter on field {}", filter.field)))?;
        let op = match &filter.op {
            Comparison::Eq => "=",
            Comparison::Gte => ">=",
            Comparison::Gt => ">",
            Comparison::Lte => "<=",
            Comparison::Lt => "<",
            Comparison::Other(name) => {
                return Err(Error::validation(format!(
                    "unsupported filter operator {name}"
                )));
            }
        };
        qb.push(if has_where { " AND " } else { " WHERE " });
        has_where = true;
        qb.push(column.name);
        qb.push(" ");
        qb.push(op);
        qb.push(" ");
        push_typed_bind(qb, column, &filter.value)?;
    }

    let mut first_sort = true;
    for key in &plan.sort {
        let column = lookup(columns, &key.field)
            .ok_or_else(|| Error::validation(format!("cannot sort by field {}", key.field)))?;
        qb.push(if first_sort { " ORDER BY " } else { ", " });
        first_sort = false;
        qb.push(column.name);
        qb.push(if key.descending { " DESC" } else { " ASC" });
    }

    qb.push(" LIMIT ");
    qb.push_bind(i64::try_from(plan.limit).unwrap_or(i64::MAX));
    qb.push(" OFFSET ");
    qb.push_bind(i64::try_from(plan.skip).unwrap_or(i64::MAX));
    Ok(())
}

fn push_typed_bind(
    qb: &mut QueryBuilder<'_, Postgres>,
    column: &Column,
    raw: &str,
) -> Result<()> {
    let bad_value =
        || Error::validation(format!("invalid value {raw:?} for field {}", column.api));
    match column.kind {
        Kind::Int => qb.push_bind(raw.trim().parse::<i64>().map_err(|_| bad_value())?),
        Kind::Float => qb.push_bind(raw.trim().parse::<f64>().map_err(|_| bad_value())?),
        Kind::Bool => qb.push_bind(raw.trim().parse::<bool>().map_err(|_| bad_value())?),
        Kind::Text => qb.push_bind(raw.to_string()),
        Kind::Timestamp => qb.push_bind(
            raw.trim()
                .parse::<DateTime<Utc>>()
                .map_err(|_| bad_value())?,
        ),
    };
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use trailbound_core::query::ListQuery;

    const COLUMNS: &[Column] = &[
        col("duration", "duration", Kind::Int),
        col("price", "price", Kind::Int),
        col("ratingsAverage", "ratings_average", Kind::Float),
        col("secret", "secret", Kind::Bool),
        col("difficulty", "difficulty", Kind::Text),
        col("createdAt", "created_at", Kind::Timestamp),
    ];

    fn render(pairs: &[(&str, &str)]) -> Result<String> {
        let plan = ListQuery::new(
            pairs
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string())),
        )
        .translate();
        let mut qb = QueryBuilder::new("SELECT * FROM tours");
        push_plan(&mut qb, &plan, COLUMNS, false)?;
        Ok(qb.sql().to_string())
    }

    #[test]
    fn filters_sort_and_pagination_render_in_order() {
        let sql = render(&[
            ("duration[gte]", "5"),
            ("difficulty", "easy"),
            ("sort", "price,-ratingsAverage"),
            ("page", "2"),
            ("limit", "10"),
        ])
        .unwrap();
        assert_eq!(
            sql,
            "SELECT * FROM tours WHERE duration >= $1 AND difficulty = $2 \
             ORDER BY price ASC, ratings_average DESC LIMIT $3 OFFSET $4"
        );
    }

    #[test]
    fn default_plan_renders_default_sort() {
        let sql = render(&[]).unwrap();
        assert_eq!(
            sql,
            "SELECT * FROM tours ORDER BY created_at DESC LIMIT $1 OFFSET $2"
        );
    }

    #[test]
    fn scoped_queries_extend_an_open_where() {
        let plan = ListQuery::new(vec![("price[lt]".to_string(), "500".to_string())]).translate();
        let mut qb = QueryBuilder::new("SELECT * FROM tours WHERE secret = FALSE");
        push_plan(&mut qb, &plan, COLUMNS, true).unwrap();
        assert!(qb.sql().starts_with("SELECT * FROM tours WHERE secret = FALSE AND price < $1"));
    }

    #[test]
    fn unknown_field_is_a_client_error() {
        assert!(matches!(
            render(&[("passwordHash", "x")]),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            render(&[("sort", "passwordHash")]),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn unknown_operator_is_a_client_error() {
        let err = render(&[("duration[between]", "3")]).unwrap_err();
        assert!(matches!(err, Error::Validation(ref m) if m.contains("between")));
    }

    #[test]
    fn mistyped_values_are_client_errors() {
        assert!(matches!(
            render(&[("duration[gte]", "soon")]),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            render(&[("secret", "maybe")]),
            Err(Error::Validation(_))
        ));
    }
}
