//! Query state container: app-owned, SDK-provided update logic.
//!
//! `QueryState` is sans-IO: commands mutate the filter and hand back a
//! [`Dispatch`] ticket when a fetch is needed. Whoever executes the fetch
//! reports the outcome through [`QueryState::complete`], where the sequence
//! gate decides whether it may touch visible state.

use super::{FilterError, FilterState, PageInfo, QueryDescriptor};
use crate::domain::catalog::{Catalog, CatalogEntry};
use crate::domain::market::{Instrument, MarketPage};
use crate::error::ErrorKind;
use crate::shared::{CoinId, Currency, PageSize, SortOrder};
use std::num::NonZeroU32;
use std::sync::Arc;

/// A fetch the caller must execute, tagged with its sequence number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    pub seq: u64,
    pub descriptor: QueryDescriptor,
}

/// Visible request lifecycle.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestLifecycle {
    /// Nothing dispatched yet.
    Idle,
    Loading,
    Succeeded(Arc<MarketPage>),
    Failed(ErrorKind),
}

impl RequestLifecycle {
    pub fn is_loading(&self) -> bool {
        matches!(self, RequestLifecycle::Loading)
    }
}

/// Single source of truth for the filter and the request lifecycle.
///
/// The last good page and the last error are tracked independently, so a
/// failure after a success is represented without discarding the rows.
#[derive(Debug, Clone, Default)]
pub struct QueryState {
    filter: FilterState,
    /// Uncommitted search box text.
    search_input: String,
    /// Descriptor of the highest-sequence dispatch, in flight or completed.
    last_dispatched: Option<QueryDescriptor>,
    issued_seq: u64,
    settled_seq: u64,
    last_good: Option<Arc<MarketPage>>,
    last_error: Option<ErrorKind>,
    revision: u64,
}

impl QueryState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filter(filter: FilterState) -> Self {
        Self {
            filter,
            ..Self::default()
        }
    }

    // ── Read access ──────────────────────────────────────────────────────

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn descriptor(&self) -> QueryDescriptor {
        QueryDescriptor::from(&self.filter)
    }

    pub fn search_input(&self) -> &str {
        &self.search_input
    }

    pub fn is_loading(&self) -> bool {
        self.issued_seq > self.settled_seq
    }

    pub fn lifecycle(&self) -> RequestLifecycle {
        if self.is_loading() {
            RequestLifecycle::Loading
        } else if let Some(err) = &self.last_error {
            RequestLifecycle::Failed(err.clone())
        } else if let Some(page) = &self.last_good {
            RequestLifecycle::Succeeded(Arc::clone(page))
        } else {
            RequestLifecycle::Idle
        }
    }

    /// Rows the table should display: the last accepted success, even if a
    /// later request failed.
    pub fn last_good(&self) -> Option<&Arc<MarketPage>> {
        self.last_good.as_ref()
    }

    pub fn last_error(&self) -> Option<&ErrorKind> {
        self.last_error.as_ref()
    }

    /// The error to show the user: only when there are no rows to fall back on.
    pub fn visible_error(&self) -> Option<&ErrorKind> {
        match self.last_good {
            Some(_) => None,
            None => self.last_error.as_ref(),
        }
    }

    pub fn latest_seq(&self) -> u64 {
        self.issued_seq
    }

    pub fn last_dispatched(&self) -> Option<&QueryDescriptor> {
        self.last_dispatched.as_ref()
    }

    /// Bumped on every change a renderer could observe.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn page_info(&self, approx_total_rows: u64) -> PageInfo {
        PageInfo::new(&self.filter, approx_total_rows)
    }

    /// Catalog entries matching the pending search input, capped at `limit`.
    pub fn suggestions<'c>(&self, catalog: &'c Catalog, limit: usize) -> Vec<&'c CatalogEntry> {
        let mut matches = catalog.find_by_prefix(self.search_input.trim_start());
        matches.truncate(limit);
        matches
    }

    // ── Commands ─────────────────────────────────────────────────────────

    pub fn set_currency(&mut self, currency: Currency) -> Option<Dispatch> {
        self.update(|f| f.currency = currency)
    }

    /// Parses `code` against the supported currencies. Unknown codes leave the
    /// current currency in place.
    pub fn set_currency_code(&mut self, code: &str) -> Result<Option<Dispatch>, FilterError> {
        let currency = code
            .parse::<Currency>()
            .map_err(|_| FilterError::UnknownCurrency(code.to_string()))?;
        Ok(self.set_currency(currency))
    }

    pub fn set_sort_order(&mut self, order: SortOrder) -> Option<Dispatch> {
        self.update(|f| f.sort_order = order)
    }

    pub fn set_sort_order_code(&mut self, code: &str) -> Result<Option<Dispatch>, FilterError> {
        let order = code
            .parse::<SortOrder>()
            .map_err(|_| FilterError::UnknownSortOrder(code.to_string()))?;
        Ok(self.set_sort_order(order))
    }

    /// Sets page number and page size together. Both are validated before
    /// either is written, so a rejected call changes nothing.
    pub fn set_page(
        &mut self,
        page_number: u32,
        page_size: u32,
    ) -> Result<Option<Dispatch>, FilterError> {
        let number =
            NonZeroU32::new(page_number).ok_or(FilterError::InvalidPageNumber(page_number))?;
        let size = PageSize::new(page_size).ok_or(FilterError::InvalidPageSize(page_size))?;
        Ok(self.update(|f| {
            f.page_number = number;
            f.page_size = size;
        }))
    }

    /// Sets the search identifier. Empty (or blank) input removes the filter.
    pub fn set_search_term(&mut self, identifier_or_empty: &str) -> Option<Dispatch> {
        let term = identifier_or_empty.trim();
        let next = (!term.is_empty()).then(|| CoinId::from(term));
        self.update(|f| f.search_identifier = next)
    }

    /// Removes the search filter and empties the pending search input.
    pub fn clear_search(&mut self) -> Option<Dispatch> {
        self.set_search_input("");
        self.set_search_term("")
    }

    /// Updates the search box text without touching the filter.
    pub fn set_search_input(&mut self, text: &str) {
        if self.search_input != text {
            self.search_input = text.to_string();
            self.revision += 1;
        }
    }

    /// Resolves a display name through the catalog and filters by the match.
    ///
    /// An unknown name clears the search filter instead of reporting an error:
    /// typing something unrecognised falls back to the unfiltered listing.
    pub fn select_search_name(&mut self, name: &str, catalog: &Catalog) -> Option<Dispatch> {
        self.set_search_input(name);
        let resolved = catalog.find_by_exact_name(name.trim()).cloned();
        match resolved {
            Some(id) => self.set_search_term(id.as_str()),
            None => {
                tracing::debug!(name, "No catalog match, search filter cleared");
                self.set_search_term("")
            }
        }
    }

    /// Commits the pending search input as if the user picked it by name.
    pub fn commit_search_input(&mut self, catalog: &Catalog) -> Option<Dispatch> {
        let input = self.search_input.clone();
        self.select_search_name(&input, catalog)
    }

    /// Dispatches if the current descriptor differs from the last dispatched one.
    pub fn sync(&mut self) -> Option<Dispatch> {
        let descriptor = self.descriptor();
        if self.last_dispatched.as_ref() == Some(&descriptor) {
            return None;
        }
        Some(self.issue(descriptor))
    }

    /// Dispatches the current descriptor unconditionally, e.g. to retry after
    /// a failure without changing any filter.
    pub fn refresh(&mut self) -> Dispatch {
        let descriptor = self.descriptor();
        self.issue(descriptor)
    }

    /// Records the outcome of `dispatch`.
    ///
    /// Only the highest-sequence dispatch may update visible state; anything
    /// older (or already settled) is rejected with [`ErrorKind::Stale`] and
    /// leaves the state untouched.
    pub fn complete(
        &mut self,
        dispatch: Dispatch,
        outcome: Result<Vec<Instrument>, ErrorKind>,
    ) -> Result<(), ErrorKind> {
        if dispatch.seq != self.issued_seq || dispatch.seq <= self.settled_seq {
            return Err(ErrorKind::Stale {
                seq: dispatch.seq,
                latest: self.issued_seq,
            });
        }

        match outcome {
            Ok(instruments) => {
                self.last_good = Some(Arc::new(MarketPage::new(dispatch.descriptor, instruments)));
                self.last_error = None;
            }
            Err(kind) => {
                self.last_error = Some(kind);
            }
        }
        self.settled_seq = dispatch.seq;
        self.revision += 1;
        Ok(())
    }

    fn update(&mut self, mutate: impl FnOnce(&mut FilterState)) -> Option<Dispatch> {
        let before = self.filter.clone();
        mutate(&mut self.filter);
        if self.filter != before {
            self.revision += 1;
        }
        self.sync()
    }

    fn issue(&mut self, descriptor: QueryDescriptor) -> Dispatch {
        self.issued_seq += 1;
        self.last_dispatched = Some(descriptor.clone());
        self.revision += 1;
        Dispatch {
            seq: self.issued_seq,
            descriptor,
        }
    }
}
