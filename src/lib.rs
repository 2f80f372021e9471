//! # Coin Listings
//!
//! Client-side core of a cryptocurrency market listings viewer: a paginated,
//! sortable, currency-switchable table of coins with name search.
//!
//! ## Architecture
//!
//! The crate is organized in layers:
//!
//! 1. **Core**: shared newtypes, domain models, and the sans-IO `QueryState`
//!    (always available, no I/O)
//! 2. **HTTP API**: `ListingsHttp` with retry policies
//! 3. **High-Level Client**: `ListingsClient` with nested sub-clients and a catalog cache
//! 4. **Session**: `ViewerSession`, which executes dispatches against a
//!    `MarketDataSource` and discards superseded responses
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use coin_listings::prelude::*;
//!
//! let client = ListingsClient::builder().build()?;
//! let session = client.session().build();
//!
//! session.start().await;
//! session.set_currency(Currency::Eur).await;
//! session.set_page(2, 20).await?;
//!
//! let view = session.snapshot().await;
//! for coin in view.instruments() {
//!     println!("{} {}", coin.name, fmt::price(&coin.current_price, view.filter.currency));
//! }
//! ```

// ── Layer 1: Core ────────────────────────────────────────────────────────────

/// Shared newtypes used across all domains.
pub mod shared;

/// Domain modules (vertical slices): types, wire types, conversions, state.
pub mod domain;

/// Unified SDK error types.
pub mod error;

/// Network URL constants.
pub mod network;

// ── Layer 2: HTTP API ────────────────────────────────────────────────────────

/// HTTP client with retry policies.
#[cfg(feature = "http")]
pub mod http;

// ── Layer 3: High-Level Client ───────────────────────────────────────────────

/// `ListingsClient`, the primary entry point.
#[cfg(feature = "http")]
pub mod client;

// ── Layer 4: Session ─────────────────────────────────────────────────────────

/// Async viewer session over the query state.
#[cfg(feature = "http")]
pub mod session;

// ── Prelude ──────────────────────────────────────────────────────────────────

pub mod prelude {
    // Shared newtypes
    pub use crate::shared::{CoinId, Currency, PageSize, SortOrder};

    // Formatting helpers
    pub use crate::shared::fmt;

    // Domain types
    pub use crate::domain::catalog::{Catalog, CatalogEntry, MatchMode};
    pub use crate::domain::market::{Instrument, MarketPage};
    pub use crate::domain::query::{
        FilterError, FilterState, PageInfo, QueryDescriptor, DEFAULT_APPROX_TOTAL_ROWS,
    };

    // State container
    pub use crate::domain::query::{Dispatch, QueryState, RequestLifecycle};

    // Errors
    pub use crate::error::{ErrorKind, HttpError, SdkError};

    // Network
    pub use crate::network::DEFAULT_API_URL;

    // HTTP client + sub-clients
    #[cfg(feature = "http")]
    pub use crate::client::{ListingsClient, ListingsClientBuilder, MarketsClient};
    #[cfg(feature = "http")]
    pub use crate::http::retry::{RetryConfig, RetryPolicy};

    // Session
    #[cfg(feature = "http")]
    pub use crate::session::{
        CatalogStatus, DispatchOutcome, MarketDataSource, ViewSnapshot, ViewerSession,
        ViewerSessionBuilder,
    };
}
