//! Query domain: filter parameters and the remote query derived from them.
//!
//! `FilterState` holds what the user picked; `QueryDescriptor` is the exact
//! parameter set sent to the markets endpoint. The descriptor is always a pure
//! projection of the filter, so two equal filters can never produce different
//! requests.

pub mod state;

use crate::shared::{CoinId, Currency, PageSize, SortOrder};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU32;

pub use state::{Dispatch, QueryState, RequestLifecycle};

/// Upper bound reported as the listing's row count when nothing else is configured.
pub const DEFAULT_APPROX_TOTAL_ROWS: u64 = 10_000;

// ─── FilterState ─────────────────────────────────────────────────────────────

/// The five user-controlled filter parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterState {
    pub currency: Currency,
    pub sort_order: SortOrder,
    pub page_size: PageSize,
    pub page_number: NonZeroU32,
    pub search_identifier: Option<CoinId>,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            currency: Currency::Usd,
            sort_order: SortOrder::MarketCapDesc,
            page_size: PageSize::default(),
            page_number: NonZeroU32::MIN,
            search_identifier: None,
        }
    }
}

impl FilterState {
    pub fn descriptor(&self) -> QueryDescriptor {
        QueryDescriptor::from(self)
    }
}

// ─── QueryDescriptor ─────────────────────────────────────────────────────────

/// Parameters of one `GET /coins/markets` request.
///
/// Serializes to the query string with `ids` omitted entirely when no search is
/// active. The API answers `ids=` (present but empty) with zero rows, so absence
/// and the empty string are deliberately distinct values here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct QueryDescriptor {
    pub vs_currency: Currency,
    pub order: SortOrder,
    pub per_page: u32,
    pub page: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ids: Option<String>,
}

impl From<&FilterState> for QueryDescriptor {
    fn from(filter: &FilterState) -> Self {
        Self {
            vs_currency: filter.currency,
            order: filter.sort_order,
            per_page: filter.page_size.get(),
            page: filter.page_number.get(),
            ids: filter
                .search_identifier
                .as_ref()
                .map(|id| id.as_str().to_string()),
        }
    }
}

impl QueryDescriptor {
    /// URL-encoded query string, e.g. `vs_currency=usd&order=market_cap_desc&per_page=10&page=1`.
    pub fn to_query_string(&self) -> Result<String, serde_urlencoded::ser::Error> {
        serde_urlencoded::to_string(self)
    }
}

// ─── PageInfo ────────────────────────────────────────────────────────────────

/// Pagination metadata for the table footer.
///
/// `approx_total_rows` is a configured upper bound, not a live count: the
/// markets endpoint does not report how many rows match a paginated query.
/// Treat page counts derived from it as an approximation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    pub page_number: u32,
    pub page_size: u32,
    pub page_size_options: [u32; 5],
    pub approx_total_rows: u64,
}

impl PageInfo {
    pub fn new(filter: &FilterState, approx_total_rows: u64) -> Self {
        Self {
            page_number: filter.page_number.get(),
            page_size: filter.page_size.get(),
            page_size_options: PageSize::OPTIONS,
            approx_total_rows,
        }
    }

    /// Approximate number of pages at the current page size.
    pub fn approx_page_count(&self) -> u64 {
        self.approx_total_rows.div_ceil(u64::from(self.page_size.max(1)))
    }
}

// ─── Validation ──────────────────────────────────────────────────────────────

/// Rejected filter input. The filter keeps its current value when this is returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    UnknownCurrency(String),
    UnknownSortOrder(String),
    InvalidPageSize(u32),
    InvalidPageNumber(u32),
}

impl fmt::Display for FilterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterError::UnknownCurrency(c) => write!(f, "Unknown currency {c:?}"),
            FilterError::UnknownSortOrder(o) => write!(f, "Unknown sort order {o:?}"),
            FilterError::InvalidPageSize(n) => write!(
                f,
                "Invalid page size {n} (expected one of {:?})",
                PageSize::OPTIONS
            ),
            FilterError::InvalidPageNumber(n) => write!(f, "Invalid page number {n}"),
        }
    }
}

impl std::error::Error for FilterError {}
