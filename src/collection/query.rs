//! # Sorting and Pagination
//!
//! Sorting is applied to the whole collection before the page is cut.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Default page size
pub const DEFAULT_PAGE_LIMIT: usize = 10;

/// Largest page size
pub const MAX_PAGE_LIMIT: usize = 100;

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "asc" => Some(SortOrder::Asc),
            "desc" => Some(SortOrder::Desc),
            _ => None,
        }
    }
}

/// Read options for a collection listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub sort: Option<String>,
    pub order: SortOrder,
}

impl ListQuery {
    pub fn sorted_by(field: impl Into<String>, order: SortOrder) -> Self {
        Self {
            sort: Some(field.into()),
            order,
        }
    }
}

/// Offset/limit window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub offset: usize,
    pub limit: usize,
}

impl PageRequest {
    /// Limit is clamped into `1..=MAX_PAGE_LIMIT`.
    pub fn new(offset: usize, limit: usize) -> Self {
        Self {
            offset,
            limit: limit.clamp(1, MAX_PAGE_LIMIT),
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(0, DEFAULT_PAGE_LIMIT)
    }
}

/// One page of a sorted collection
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub data: Vec<Value>,
    pub total: usize,
    pub offset: usize,
    pub limit: usize,
    pub has_more: bool,
}

/// Sorts records in place by one field.
///
/// Null or missing values go last when ascending and first when
/// descending. The sort is stable.
pub fn sort_records(records: &mut [Value], field: &str, order: SortOrder) {
    records.sort_by(|a, b| {
        let cmp = compare_field_values(a.get(field), b.get(field));
        match order {
            SortOrder::Asc => cmp,
            SortOrder::Desc => cmp.reverse(),
        }
    });
}

/// Cuts a page out of already sorted records.
pub fn paginate(records: Vec<Value>, page: PageRequest) -> Page {
    let total = records.len();
    let data = records
        .into_iter()
        .skip(page.offset)
        .take(page.limit)
        .collect();

    Page {
        data,
        total,
        offset: page.offset,
        limit: page.limit,
        has_more: page.offset.saturating_add(page.limit) < total,
    }
}

/// Ascending comparison with null/missing treated as greatest
fn compare_field_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());

    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => compare_present(a, b),
    }
}

fn compare_present(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .unwrap_or(0.0)
            .partial_cmp(&y.as_f64().unwrap_or(0.0))
            .unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Array(x), Value::Array(y)) => x.len().cmp(&y.len()),
        _ => kind_rank(a).cmp(&kind_rank(b)),
    }
}

fn kind_rank(value: &Value) -> u8 {
    match value {
        Value::Bool(_) => 0,
        Value::Number(_) => 1,
        Value::String(_) => 2,
        Value::Array(_) => 3,
        Value::Object(_) => 4,
        Value::Null => 5,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ids(records: &[Value]) -> Vec<Value> {
        records.iter().map(|r| r["n"].clone()).collect()
    }

    #[test]
    fn test_nulls_go_to_the_far_end() {
        let mut records = vec![json!({"n": 3}), json!({"n": null}), json!({"n": 1})];

        sort_records(&mut records, "n", SortOrder::Asc);
        assert_eq!(ids(&records), vec![json!(1), json!(3), Value::Null]);

        sort_records(&mut records, "n", SortOrder::Desc);
        assert_eq!(ids(&records), vec![Value::Null, json!(3), json!(1)]);
    }

    #[test]
    fn test_missing_field_sorts_like_null() {
        let mut records = vec![json!({}), json!({"n": "b"}), json!({"n": "a"})];
        sort_records(&mut records, "n", SortOrder::Asc);
        assert_eq!(records[0]["n"], json!("a"));
        assert_eq!(records[2], json!({}));
    }

    #[test]
    fn test_booleans_and_mixed_kinds() {
        let mut records = vec![json!({"n": "x"}), json!({"n": true}), json!({"n": 2}), json!({"n": false})];
        sort_records(&mut records, "n", SortOrder::Asc);
        assert_eq!(
            ids(&records),
            vec![json!(false), json!(true), json!(2), json!("x")]
        );
    }

    #[test]
    fn test_pagination_window() {
        let records: Vec<Value> = (1..=25).map(|n| json!({"n": n})).collect();

        let last = paginate(records.clone(), PageRequest::new(20, 10));
        assert_eq!(last.data.len(), 5);
        assert_eq!(last.total, 25);
        assert!(!last.has_more);

        let middle = paginate(records, PageRequest::new(10, 10));
        assert_eq!(middle.data.len(), 10);
        assert_eq!(middle.data[0]["n"], json!(11));
        assert!(middle.has_more);
    }

    #[test]
    fn test_limit_clamped() {
        assert_eq!(PageRequest::new(0, 0).limit, 1);
        assert_eq!(PageRequest::new(0, 500).limit, MAX_PAGE_LIMIT);
        assert_eq!(PageRequest::default().limit, DEFAULT_PAGE_LIMIT);
    }

    #[test]
    fn test_page_wire_shape() {
        let page = paginate(vec![json!({"n": 1})], PageRequest::default());
        let wire = serde_json::to_value(page).unwrap();
        assert_eq!(wire["hasMore"], json!(false));
        assert_eq!(wire["total"], json!(1));
    }

    #[test]
    fn test_sort_order_parse() {
        assert_eq!(SortOrder::parse("DESC"), Some(SortOrder::Desc));
        assert_eq!(SortOrder::parse("asc"), Some(SortOrder::Asc));
        assert_eq!(SortOrder::parse("up"), None);
    }
}
