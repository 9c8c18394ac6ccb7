use serde::{Deserialize, Serialize};

/// Largest page size a list request may ask for.
pub const MAX_PAGE_SIZE: usize = 100;

/// Page-based parameters for list operations (`?page=2&limit=5`).
#[derive(Debug, Clone, Deserialize)]
pub struct PageParams {
    /// 1-based page number. Values below 1 clamp to 1.
    #[serde(default = "default_page")]
    pub page: i64,

    /// Records per page.
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    10
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            page: default_page(),
            limit: default_limit(),
        }
    }
}

impl PageParams {
    pub fn new(page: i64, limit: i64) -> Self {
        Self { page, limit }
    }

    /// Page clamped to at least 1.
    pub fn page(&self) -> usize {
        usize::try_from(self.page.max(1)).unwrap_or(usize::MAX)
    }

    /// Limit clamped to `1..=MAX_PAGE_SIZE`.
    pub fn limit(&self) -> usize {
        self.limit.clamp(1, MAX_PAGE_SIZE as i64) as usize
    }

    /// Number of records to skip.
    pub fn offset(&self) -> usize {
        (self.page() - 1).saturating_mul(self.limit())
    }
}

/// Pagination metadata returned alongside a page of records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// Current page (1-based).
    pub current: usize,
    /// Total number of pages.
    pub total: usize,
    /// Whether pages exist after this one.
    pub has_more: bool,
    /// Total number of records across all pages.
    #[serde(default)]
    pub count: usize,
}

impl Pagination {
    pub fn new(params: &PageParams, count: usize) -> Self {
        let limit = params.limit();
        let current = params.page();
        let total = count.div_ceil(limit);
        Self {
            current,
            total,
            has_more: current < total,
            count,
        }
    }
}

/// One page of records.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T: Serialize> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

impl<T: Serialize> Page<T> {
    /// Slice an already-ordered collection according to `params`.
    pub fn slice(all: Vec<T>, params: &PageParams) -> Self {
        let pagination = Pagination::new(params, all.len());
        let items = all
            .into_iter()
            .skip(params.offset())
            .take(params.limit())
            .collect();
        Self { items, pagination }
    }
}

/// Generate a new random ID (UUIDv4, no dashes).
pub fn new_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Whether `id` has the shape produced by [`new_id`]: 32 lowercase hex chars.
pub fn is_valid_id(id: &str) -> bool {
    id.len() == 32 && id.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

/// Get the current time as an RFC 3339 string.
pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}
