//! List requests, result pages and pagination utilities

use crate::core::error::RequestError;
use crate::core::filter::FilterSelection;
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Default page size used when a query string omits `itemsPerPage`
pub const DEFAULT_ITEMS_PER_PAGE: u64 = 10;

/// Query string prefix for filter keys (`filter.status=active`)
pub const FILTER_PREFIX: &str = "filter.";

/// A single list request
///
/// Pages start at 1. Filters are applied in insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListRequest {
    pub page: u64,
    pub items_per_page: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub filters: IndexMap<String, FilterSelection>,
}

impl ListRequest {
    pub fn new(page: u64, items_per_page: u64) -> Self {
        Self {
            page,
            items_per_page,
            search: None,
            filters: IndexMap::new(),
        }
    }

    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn with_filter(mut self, key: impl Into<String>, selection: FilterSelection) -> Self {
        self.filters.insert(key.into(), selection);
        self
    }

    /// Add a filter from a raw dropdown value (`"all"` and `""` mean no filter)
    pub fn with_ui_filter(self, key: impl Into<String>, raw: &str) -> Self {
        self.with_filter(key, FilterSelection::from_ui(raw))
    }

    /// The search term, if one is present and non-empty
    pub fn search_term(&self) -> Option<&str> {
        self.search.as_deref().filter(|s| !s.is_empty())
    }

    /// Check page and page size
    pub fn validate(&self) -> Result<(), RequestError> {
        if self.page == 0 {
            return Err(RequestError::InvalidPage { page: self.page });
        }
        if self.items_per_page == 0 {
            return Err(RequestError::InvalidPageSize {
                items_per_page: self.items_per_page,
            });
        }
        Ok(())
    }

    /// Zero-based inclusive row window for this page
    pub fn range(&self) -> Result<RowRange, RequestError> {
        self.validate()?;

        let out_of_range = || RequestError::PageOutOfRange {
            page: self.page,
            items_per_page: self.items_per_page,
        };
        let from = (self.page - 1)
            .checked_mul(self.items_per_page)
            .ok_or_else(out_of_range)?;
        let to = from
            .checked_add(self.items_per_page - 1)
            .ok_or_else(out_of_range)?;

        Ok(RowRange { from, to })
    }
}

/// Zero-based, inclusive row window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowRange {
    pub from: u64,
    pub to: u64,
}

impl RowRange {
    /// Number of rows the window can hold
    pub fn capacity(&self) -> u64 {
        self.to - self.from + 1
    }
}

/// Query string parameters for a list endpoint
///
/// # Example
/// ```text
/// GET /lists/vehicles?page=2&itemsPerPage=10
/// GET /lists/vehicles?search=ABC&filter.status=active
/// GET /lists/vehicles?filter.status=all        (no status filter)
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQueryParams {
    /// Page number (starts at 1)
    pub page: u64,

    /// Number of items per page
    pub items_per_page: u64,

    /// Free-text search term
    pub search: Option<String>,

    /// Raw dropdown values keyed by filter key, in query string order
    pub filters: IndexMap<String, String>,
}

impl Default for ListQueryParams {
    fn default() -> Self {
        Self {
            page: 1,
            items_per_page: DEFAULT_ITEMS_PER_PAGE,
            search: None,
            filters: IndexMap::new(),
        }
    }
}

impl ListQueryParams {
    /// Parse decoded query string pairs
    ///
    /// Unknown parameters are ignored.
    pub fn from_pairs(
        pairs: impl IntoIterator<Item = (String, String)>,
    ) -> Result<Self, RequestError> {
        let mut params = Self::default();

        for (name, value) in pairs {
            match name.as_str() {
                "page" => params.page = parse_number(&name, &value)?,
                "itemsPerPage" | "items_per_page" => {
                    params.items_per_page = parse_number(&name, &value)?
                }
                "search" => params.search = Some(value),
                _ => {
                    if let Some(key) = name.strip_prefix(FILTER_PREFIX) {
                        if !key.is_empty() {
                            params.filters.insert(key.to_string(), value);
                        }
                    }
                }
            }
        }

        Ok(params)
    }

    pub fn into_request(self) -> ListRequest {
        let filters = self
            .filters
            .into_iter()
            .map(|(key, raw)| {
                let selection = FilterSelection::from_ui(&raw);
                (key, selection)
            })
            .collect();

        ListRequest {
            page: self.page,
            items_per_page: self.items_per_page,
            search: self.search,
            filters,
        }
    }
}

fn parse_number(name: &str, value: &str) -> Result<u64, RequestError> {
    value
        .trim()
        .parse()
        .map_err(|_| RequestError::InvalidParameter {
            name: name.to_string(),
            value: value.to_string(),
        })
}

/// One page of a list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListPage {
    /// Rows of the requested page, transformed
    pub data: Vec<Value>,

    /// Rows matching filters and search across all pages
    pub total: u64,
}

impl ListPage {
    pub fn pagination(&self, request: &ListRequest) -> PaginationMeta {
        PaginationMeta::new(request.page, request.items_per_page, self.total)
    }

    /// Deserialize every row into `T`
    pub fn into_typed<T: DeserializeOwned>(self) -> serde_json::Result<TypedListPage<T>> {
        let data = self
            .data
            .into_iter()
            .map(serde_json::from_value)
            .collect::<serde_json::Result<Vec<T>>>()?;

        Ok(TypedListPage {
            data,
            total: self.total,
        })
    }
}

/// A page whose rows have been deserialized
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypedListPage<T> {
    pub data: Vec<T>,
    pub total: u64,
}

/// Paginated response structure
#[derive(Debug, Serialize)]
pub struct PaginatedResponse {
    /// The page rows
    pub data: Vec<Value>,

    /// Total number of matching rows
    pub total: u64,

    /// Pagination metadata
    pub pagination: PaginationMeta,
}

impl PaginatedResponse {
    pub fn new(page: ListPage, request: &ListRequest) -> Self {
        let pagination = page.pagination(request);
        Self {
            data: page.data,
            total: page.total,
            pagination,
        }
    }
}

/// Pagination metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationMeta {
    /// Current page number (starts at 1)
    pub page: u64,

    /// Number of items per page
    pub limit: u64,

    /// Total number of items (after filters)
    pub total: u64,

    /// Total number of pages
    pub total_pages: u64,

    /// Whether there is a next page
    pub has_next: bool,

    /// Whether there is a previous page
    pub has_prev: bool,
}

impl PaginationMeta {
    pub fn new(page: u64, limit: u64, total: u64) -> Self {
        // Ensure limit is at least 1 to avoid division by zero
        let limit = limit.max(1);
        let page = page.max(1);
        let total_pages = total.div_ceil(limit);
        let start = (page - 1).saturating_mul(limit);

        Self {
            page,
            limit,
            total,
            total_pages,
            has_next: start.saturating_add(limit) < total,
            has_prev: page > 1,
        }
    }
}
