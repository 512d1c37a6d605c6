//! Translation of untyped HTTP query strings into structured query plans.
//!
//! A [`ListQuery`] wraps the raw `(key, value)` pairs of a request query
//! string and builds up a [`QueryPlan`] through four independent, composable
//! steps: [`ListQuery::filter`], [`ListQuery::sort`],
//! [`ListQuery::limit_fields`] and [`ListQuery::paginate`]. The translator
//! knows nothing about which entity it targets; repository backends execute
//! the resulting plan against their own storage.
//!
//! ```
//! use trailbound_core::query::{Comparison, ListQuery};
//!
//! let plan = ListQuery::new(vec![
//!     ("duration[gte]".to_string(), "5".to_string()),
//!     ("sort".to_string(), "price,-ratingsAverage".to_string()),
//!     ("page".to_string(), "2".to_string()),
//!     ("limit".to_string(), "10".to_string()),
//! ])
//! .translate();
//!
//! assert_eq!(plan.filters[0].op, Comparison::Gte);
//! assert_eq!(plan.skip, 10);
//! ```

use serde::{Deserialize, Serialize};

/// Keys consumed by the non-filter steps; `filter()` drops them.
pub const RESERVED_KEYS: [&str; 4] = ["page", "sort", "limit", "fields"];

/// Default page when `page` is absent or unparseable (1-indexed).
pub const DEFAULT_PAGE: u64 = 1;
/// Default page size when `limit` is absent or unparseable.
pub const DEFAULT_LIMIT: u64 = 100;
/// Default sort field when `sort` is absent: newest first.
pub const DEFAULT_SORT_FIELD: &str = "createdAt";

/// Comparison operator of a single filter condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Comparison {
    /// Field equals value.
    Eq,
    /// Field greater than or equal to value.
    Gte,
    /// Field strictly greater than value.
    Gt,
    /// Field less than or equal to value.
    Lte,
    /// Field strictly less than value.
    Lt,
    /// An operator the translator does not recognize. Carried through
    /// unmodified; each backend decides whether to reject it.
    Other(String),
}

/// A single filter condition. Values stay as strings; backends coerce them
/// to the column's type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    /// API-facing field name (camelCase).
    pub field: String,
    /// Comparison operator.
    pub op: Comparison,
    /// Raw value from the query string.
    pub value: String,
}

/// A single sort key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    /// API-facing field name.
    pub field: String,
    /// Descending order when set (`-` prefix in the query string).
    pub descending: bool,
}

/// Structured query plan: filters, sort order, projection and pagination.
///
/// The default plan matches a query string with no parameters: no filters,
/// newest-first sort, all public fields, first page of [`DEFAULT_LIMIT`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryPlan {
    /// Filter conditions, combined with AND.
    pub filters: Vec<Filter>,
    /// Sort keys in priority order.
    pub sort: Vec<SortKey>,
    /// Projection: `None` means all public fields. Internal versioning
    /// metadata is never exposed either way.
    pub fields: Option<Vec<String>>,
    /// Records to skip.
    pub skip: u64,
    /// Records to take.
    pub limit: u64,
}

impl Default for QueryPlan {
    fn default() -> Self {
        Self {
            filters: Vec::new(),
            sort: vec![SortKey {
                field: DEFAULT_SORT_FIELD.to_string(),
                descending: true,
            }],
            fields: None,
            skip: 0,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl QueryPlan {
    /// Opt-in visibility decorator: exclude secret tours. Call sites decide
    /// explicitly; no filter is ever injected behind the caller's back.
    #[must_use]
    pub fn with_public_tours(mut self) -> Self {
        self.filters.push(Filter {
            field: "secret".to_string(),
            op: Comparison::Eq,
            value: "false".to_string(),
        });
        self
    }

    /// Preset for the "top 5 cheap" alias route: five best-rated tours,
    /// cheapest first among equals, with a reduced field set.
    #[must_use]
    pub fn top_five_cheap() -> Self {
        Self {
            filters: Vec::new(),
            sort: vec![
                SortKey {
                    field: "ratingsAverage".to_string(),
                    descending: true,
                },
                SortKey {
                    field: "price".to_string(),
                    descending: false,
                },
            ],
            fields: Some(
                ["name", "price", "ratingsAverage", "summary", "difficulty"]
                    .iter()
                    .map(ToString::to_string)
                    .collect(),
            ),
            skip: 0,
            limit: 5,
        }
    }
}

/// Builder over the raw query pairs. Each step consumes and returns `self`
/// so steps chain in any order; steps not invoked leave the plan's defaults
/// in place.
#[derive(Debug, Clone)]
pub struct ListQuery {
    pairs: Vec<(String, String)>,
    plan: QueryPlan,
}

impl ListQuery {
    /// Wrap the raw `(key, value)` pairs of a query string.
    #[must_use]
    pub fn new(pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            pairs: pairs.into_iter().collect(),
            plan: QueryPlan::default(),
        }
    }

    /// Interpret every non-reserved key as a filter condition.
    ///
    /// `duration[gte]=5` and `duration.gte=5` parse identically to a
    /// greater-or-equal comparison; a bare `difficulty=easy` is equality.
    /// Unrecognized operator names pass through as [`Comparison::Other`].
    #[must_use]
    pub fn filter(mut self) -> Self {
        for (key, value) in &self.pairs {
            if RESERVED_KEYS.contains(&key.as_str()) {
                continue;
            }
            let (field, op) = parse_filter_key(key);
            self.plan.filters.push(Filter {
                field,
                op,
                value: value.clone(),
            });
        }
        self
    }

    /// Apply the `sort` parameter: a comma-separated field list, each
    /// optionally prefixed `-` for descending. Absent, the default
    /// newest-first order stands.
    #[must_use]
    pub fn sort(mut self) -> Self {
        if let Some(raw) = self.value_of("sort") {
            let keys: Vec<SortKey> = raw
                .split(',')
                .filter(|s| !s.is_empty() && *s != "-")
                .map(|s| {
                    s.strip_prefix('-').map_or_else(
                        || SortKey {
                            field: s.to_string(),
                            descending: false,
                        },
                        |field| SortKey {
                            field: field.to_string(),
                            descending: true,
                        },
                    )
                })
                .collect();
            if !keys.is_empty() {
                self.plan.sort = keys;
            }
        }
        self
    }

    /// Apply the `fields` projection parameter: a comma-separated
    /// include-list. Absent, all public fields are returned.
    #[must_use]
    pub fn limit_fields(mut self) -> Self {
        if let Some(raw) = self.value_of("fields") {
            let fields: Vec<String> = raw
                .split(',')
                .filter(|s| !s.is_empty())
                .map(ToString::to_string)
                .collect();
            if !fields.is_empty() {
                self.plan.fields = Some(fields);
            }
        }
        self
    }

    /// Apply `page` and `limit`: skip = (page-1)*limit, take = limit.
    /// Non-numeric or nonpositive values fall back to the defaults rather
    /// than propagating as invalid skip/take.
    #[must_use]
    pub fn paginate(mut self) -> Self {
        let page = self
            .value_of("page")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|p| *p >= 1)
            .unwrap_or(DEFAULT_PAGE);
        let limit = self
            .value_of("limit")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|l| *l >= 1)
            .unwrap_or(DEFAULT_LIMIT);
        self.plan.skip = (page - 1).saturating_mul(limit);
        self.plan.limit = limit;
        self
    }

    /// Finish the chain and hand out the plan.
    #[must_use]
    pub fn plan(self) -> QueryPlan {
        self.plan
    }

    /// Run all four steps and return the plan.
    #[must_use]
    pub fn translate(self) -> QueryPlan {
        self.filter().sort().limit_fields().paginate().plan()
    }

    fn value_of(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Split a filter key into field and operator. Supports the bracketed form
/// `field[op]` and the dotted form `field.op`; anything else is equality.
fn parse_filter_key(key: &str) -> (String, Comparison) {
    let parsed = key
        .strip_suffix(']')
        .and_then(|rest| rest.split_once('['))
        .or_else(|| key.split_once('.'));

    match parsed {
        Some((field, op)) if !field.is_empty() && !op.is_empty() => {
            (field.to_string(), parse_operator(op))
        }
        _ => (key.to_string(), Comparison::Eq),
    }
}

fn parse_operator(op: &str) -> Comparison {
    match op {
        "gte" => Comparison::Gte,
        "gt" => Comparison::Gt,
        "lte" => Comparison::Lte,
        "lt" => Comparison::Lt,
        other => Comparison::Other(other.to_string()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn bracketed_and_dotted_forms_parse_identically() {
        let bracketed = ListQuery::new(pairs(&[("duration[gte]", "5")])).translate();
        let dotted = ListQuery::new(pairs(&[("duration.gte", "5")])).translate();
        assert_eq!(bracketed.filters, dotted.filters);
        assert_eq!(
            bracketed.filters,
            vec![Filter {
                field: "duration".to_string(),
                op: Comparison::Gte,
                value: "5".to_string(),
            }]
        );
    }

    #[test]
    fn bare_key_is_equality() {
        let plan = ListQuery::new(pairs(&[("difficulty", "easy")])).translate();
        assert_eq!(plan.filters[0].op, Comparison::Eq);
        assert_eq!(plan.filters[0].field, "difficulty");
    }

    #[test]
    fn unknown_operator_passes_through() {
        let plan = ListQuery::new(pairs(&[("duration[between]", "5")])).translate();
        assert_eq!(plan.filters[0].op, Comparison::Other("between".to_string()));
    }

    #[test]
    fn reserved_keys_are_dropped_from_filters() {
        let plan = ListQuery::new(pairs(&[
            ("page", "3"),
            ("sort", "price"),
            ("limit", "10"),
            ("fields", "name"),
            ("price[lte]", "500"),
        ]))
        .translate();
        assert_eq!(plan.filters.len(), 1);
        assert_eq!(plan.filters[0].field, "price");
    }

    #[test]
    fn default_sort_is_newest_first() {
        let plan = ListQuery::new(Vec::new()).translate();
        assert_eq!(
            plan.sort,
            vec![SortKey {
                field: "createdAt".to_string(),
                descending: true,
            }]
        );
    }

    #[test]
    fn sort_parses_mixed_directions() {
        let plan = ListQuery::new(pairs(&[("sort", "price,-ratingsAverage")])).translate();
        assert_eq!(
            plan.sort,
            vec![
                SortKey {
                    field: "price".to_string(),
                    descending: false,
                },
                SortKey {
                    field: "ratingsAverage".to_string(),
                    descending: true,
                },
            ]
        );
    }

    #[test]
    fn fields_projection_splits_on_commas() {
        let plan = ListQuery::new(pairs(&[("fields", "name,price,duration")])).translate();
        assert_eq!(
            plan.fields,
            Some(vec![
                "name".to_string(),
                "price".to_string(),
                "duration".to_string(),
            ])
        );
    }

    #[test]
    fn pagination_computes_skip_and_take() {
        let plan = ListQuery::new(pairs(&[("page", "2"), ("limit", "10")])).translate();
        assert_eq!(plan.skip, 10);
        assert_eq!(plan.limit, 10);
    }

    #[test]
    fn pagination_defaults_when_absent() {
        let plan = ListQuery::new(Vec::new()).translate();
        assert_eq!(plan.skip, 0);
        assert_eq!(plan.limit, DEFAULT_LIMIT);
    }

    #[test]
    fn non_numeric_pagination_falls_back_to_defaults() {
        let plan = ListQuery::new(pairs(&[("page", "abc"), ("limit", "-3")])).translate();
        assert_eq!(plan.skip, 0);
        assert_eq!(plan.limit, DEFAULT_LIMIT);
    }

    #[test]
    fn steps_compose_in_any_order() {
        let raw = pairs(&[("duration[gte]", "5"), ("sort", "price"), ("page", "2")]);
        let forward = ListQuery::new(raw.clone())
            .filter()
            .sort()
            .limit_fields()
            .paginate()
            .plan();
        let reversed = ListQuery::new(raw)
            .paginate()
            .limit_fields()
            .sort()
            .filter()
            .plan();
        assert_eq!(forward, reversed);
    }

    #[test]
    fn public_tours_decorator_adds_secret_filter() {
        let plan = QueryPlan::default().with_public_tours();
        assert_eq!(plan.filters.last().unwrap().field, "secret");
        assert_eq!(plan.filters.last().unwrap().op, Comparison::Eq);
    }

    #[test]
    fn top_five_cheap_preset() {
        let plan = QueryPlan::top_five_cheap();
        assert_eq!(plan.limit, 5);
        assert!(plan.sort[0].descending);
        assert_eq!(plan.sort[1].field, "price");
    }

    proptest! {
        #[test]
        fn comparison_operators_map_one_to_one(value in 0u32..100_000, op_idx in 0usize..4) {
            let ops = ["gte", "gt", "lte", "lt"];
            let expected = [Comparison::Gte, Comparison::Gt, Comparison::Lte, Comparison::Lt];
            let key = format!("duration[{}]", ops[op_idx]);
            let plan = ListQuery::new(vec![(key, value.to_string())]).translate();
            prop_assert_eq!(plan.filters.len(), 1);
            prop_assert_eq!(&plan.filters[0].op, &expected[op_idx]);
            prop_assert_eq!(&plan.filters[0].value, &value.to_string());
        }

        #[test]
        fn pagination_never_underflows(page in any::<String>(), limit in any::<String>()) {
            let plan = ListQuery::new(vec![
                ("page".to_string(), page),
                ("limit".to_string(), limit),
            ])
            .translate();
            prop_assert!(plan.limit >= 1);
            // skip is always a multiple of the effective limit
            prop_assert_eq!(plan.skip % plan.limit, 0);
        }
    }
}
