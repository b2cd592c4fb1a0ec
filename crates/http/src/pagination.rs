//! Pagination, sorting, and filter extraction for list endpoints.

use std::collections::HashMap;

use serde::Serialize;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 100;

const DEFAULT_SORT: &str = "created_at";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_sql(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Parameters extracted from a list endpoint's query string.
///
/// `sort_by` is constrained to the caller-provided whitelist; anything else
/// falls back to `created_at`. That whitelist is what keeps user input out
/// of `ORDER BY` clauses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageParams {
    pub page: u32,
    pub limit: u32,
    pub sort_by: String,
    pub order: SortOrder,
    pub filters: HashMap<String, String>,
}

impl PageParams {
    /// Extract pagination/sorting/filter parameters from a parsed query
    /// string (e.g. axum's `Query<HashMap<String, String>>`).
    pub fn from_query(query: &HashMap<String, String>, allowed_sorts: &[&str]) -> Self {
        let page = query
            .get("page")
            .and_then(|v| v.parse().ok())
            .filter(|&p| p >= 1)
            .unwrap_or(DEFAULT_PAGE);

        let limit = query
            .get("limit")
            .and_then(|v| v.parse().ok())
            .filter(|&l| (1..=MAX_LIMIT).contains(&l))
            .unwrap_or(DEFAULT_LIMIT);

        let sort_by = query
            .get("sort_by")
            .filter(|v| allowed_sorts.contains(&v.as_str()))
            .map(String::as_str)
            .unwrap_or(DEFAULT_SORT)
            .to_string();

        let order = match query.get("order").map(|v| v.to_lowercase()).as_deref() {
            Some("asc") => SortOrder::Asc,
            _ => SortOrder::Desc,
        };

        let filters = query
            .iter()
            .filter(|(key, _)| !matches!(key.as_str(), "page" | "limit" | "sort_by" | "order"))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        Self {
            page,
            limit,
            sort_by,
            order,
            filters,
        }
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }
}

/// Standard paginated response envelope.
#[derive(Debug, Clone, Serialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub page: u32,
    pub limit: u32,
    pub total_items: u64,
    pub total_pages: u64,
}

impl<T> Paginated<T> {
    pub fn new(data: Vec<T>, total_items: u64, params: &PageParams) -> Self {
        let total_pages = total_items.div_ceil(u64::from(params.limit));

        Self {
            data,
            page: params.page,
            limit: params.limit,
            total_items,
            total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults_apply_when_query_is_empty() {
        let params = PageParams::from_query(&HashMap::new(), &["created_at", "name"]);

        assert_eq!(params.page, DEFAULT_PAGE);
        assert_eq!(params.limit, DEFAULT_LIMIT);
        assert_eq!(params.sort_by, "created_at");
        assert_eq!(params.order, SortOrder::Desc);
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn out_of_range_values_fall_back() {
        let params = PageParams::from_query(
            &query(&[("page", "0"), ("limit", "9999"), ("order", "sideways")]),
            &["created_at"],
        );

        assert_eq!(params.page, DEFAULT_PAGE);
        assert_eq!(params.limit, DEFAULT_LIMIT);
        assert_eq!(params.order, SortOrder::Desc);
    }

    #[test]
    fn sort_column_outside_whitelist_falls_back() {
        let params = PageParams::from_query(
            &query(&[("sort_by", "password_hash; DROP TABLE users")]),
            &["created_at", "name"],
        );

        assert_eq!(params.sort_by, "created_at");
    }

    #[test]
    fn filters_exclude_reserved_keys() {
        let params = PageParams::from_query(
            &query(&[("page", "2"), ("limit", "25"), ("status", "active")]),
            &["created_at"],
        );

        assert_eq!(params.page, 2);
        assert_eq!(params.limit, 25);
        assert_eq!(params.offset(), 25);
        assert_eq!(params.filters.get("status").unwrap(), "active");
        assert!(!params.filters.contains_key("page"));
    }

    #[test]
    fn response_envelope_computes_total_pages() {
        let params = PageParams::from_query(&query(&[("limit", "10")]), &["created_at"]);
        let page = Paginated::new(vec![1, 2, 3], 23, &params);

        assert_eq!(page.total_pages, 3);
        assert_eq!(page.total_items, 23);
    }

    #[test]
    fn empty_result_has_zero_pages() {
        let params = PageParams::from_query(&HashMap::new(), &["created_at"]);
        let page: Paginated<u32> = Paginated::new(Vec::new(), 0, &params);

        assert_eq!(page.total_pages, 0);
    }
}
