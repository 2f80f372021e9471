//! Market domain: one row of the coin listings table.

#[cfg(feature = "http")]
pub mod client;
mod convert;
pub mod wire;

use crate::domain::query::QueryDescriptor;
use crate::shared::CoinId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ─── Instrument ──────────────────────────────────────────────────────────────

/// A listed coin as shown in the table.
///
/// Numeric fields the API omitted or sent as `null` are `Decimal::ZERO`, the
/// additive identity, so change columns render as "no change" instead of
/// failing the row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instrument {
    pub id: CoinId,
    pub symbol: String,
    pub name: String,
    pub icon_url: String,
    pub current_price: Decimal,
    pub circulating_supply: Decimal,
    pub market_cap: Decimal,
    pub market_cap_rank: Option<u32>,
    pub price_change_24h: Decimal,
    pub price_change_percentage_24h: Decimal,
}

// ─── MarketPage ──────────────────────────────────────────────────────────────

/// The full result of one accepted markets fetch.
///
/// Replaced wholesale on every accepted success; never patched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketPage {
    /// The query that produced these rows.
    pub descriptor: QueryDescriptor,
    pub instruments: Vec<Instrument>,
    pub fetched_at: DateTime<Utc>,
}

impl MarketPage {
    pub fn new(descriptor: QueryDescriptor, instruments: Vec<Instrument>) -> Self {
        Self {
            descriptor,
            instruments,
            fetched_at: Utc::now(),
        }
    }

    pub fn len(&self) -> usize {
        self.instruments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }
}
