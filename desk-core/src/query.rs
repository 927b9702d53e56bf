//! List query parameters and the paginated result shape.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const MAX_PAGE_SIZE: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDir {
    Asc,
    Desc,
}

impl SortDir {
    pub fn parse(s: &str) -> Self {
        if s.eq_ignore_ascii_case("asc") {
            SortDir::Asc
        } else {
            SortDir::Desc
        }
    }
}

impl Default for SortDir {
    fn default() -> Self {
        SortDir::Desc
    }
}

/// Caller-supplied list filters: free-text search, sort, pagination.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListQuery {
    pub search: Option<String>,
    pub sort: Option<String>,
    pub dir: SortDir,
    pub page: usize,
    pub per_page: usize,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            search: None,
            sort: None,
            dir: SortDir::default(),
            page: 1,
            per_page: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ListQuery {
    /// Parse from a flat query-string map.
    ///
    /// Out-of-range values are clamped rather than rejected: page >= 1,
    /// 1 <= per_page <= [`MAX_PAGE_SIZE`].
    pub fn from_map(query: &HashMap<String, String>) -> Self {
        let search = query
            .get("search")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        let sort = query
            .get("sort")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        let dir = query
            .get("dir")
            .map(|s| SortDir::parse(s))
            .unwrap_or_default();
        let page = query
            .get("page")
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(1)
            .max(1);
        let per_page = query
            .get("per_page")
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);

        Self {
            search,
            sort,
            dir,
            page,
            per_page,
        }
    }
}

/// One page of records plus total count and page metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub per_page: usize,
    pub total_pages: usize,
}

impl Page<Value> {
    /// An empty page for the given query; used for deny-scoped lists.
    pub fn empty(query: &ListQuery) -> Self {
        Self {
            data: Vec::new(),
            total: 0,
            page: query.page,
            per_page: query.per_page,
            total_pages: 0,
        }
    }

    /// Paginate an already scoped, filtered, sorted record set.
    pub fn paginate(records: Vec<Value>, query: &ListQuery) -> Self {
        let total = records.len();
        let per_page = query.per_page.max(1);
        let total_pages = total.div_ceil(per_page);
        let start = query.page.saturating_sub(1).saturating_mul(per_page);
        let data = records.into_iter().skip(start).take(per_page).collect();

        Self {
            data,
            total,
            page: query.page,
            per_page,
            total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn from_map_defaults_and_clamps() {
        let q = ListQuery::from_map(&HashMap::new());
        assert_eq!(q.page, 1);
        assert_eq!(q.per_page, DEFAULT_PAGE_SIZE);
        assert_eq!(q.dir, SortDir::Desc);
        assert!(q.search.is_none());

        let mut map = HashMap::new();
        map.insert("page".to_string(), "0".to_string());
        map.insert("per_page".to_string(), "5000".to_string());
        map.insert("dir".to_string(), "ASC".to_string());
        map.insert("search".to_string(), "  ".to_string());
        let q = ListQuery::from_map(&map);
        assert_eq!(q.page, 1);
        assert_eq!(q.per_page, MAX_PAGE_SIZE);
        assert_eq!(q.dir, SortDir::Asc);
        assert!(q.search.is_none());
    }

    #[test]
    fn paginate_slices_and_counts() {
        let records: Vec<Value> = (0..23).map(|i| json!({"n": i})).collect();
        let query = ListQuery {
            page: 3,
            per_page: 10,
            ..Default::default()
        };

        let page = Page::paginate(records, &query);
        assert_eq!(page.total, 23);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.data.len(), 3);
        assert_eq!(page.data[0]["n"], 20);
    }

    #[test]
    fn paginate_past_the_end_is_empty_not_an_error() {
        let records: Vec<Value> = (0..3).map(|i| json!({"n": i})).collect();
        let query = ListQuery {
            page: 9,
            per_page: 10,
            ..Default::default()
        };

        let page = Page::paginate(records, &query);
        assert_eq!(page.total, 3);
        assert!(page.data.is_empty());
    }
}
