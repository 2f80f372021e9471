//! Conversion: CoinMarketResponse → Instrument.

use super::wire;
use super::Instrument;
use crate::shared::CoinId;
use rust_decimal::prelude::*;

fn decimal_or_zero(value: Option<f64>) -> Decimal {
    value.and_then(Decimal::from_f64).unwrap_or(Decimal::ZERO)
}

impl From<wire::CoinMarketResponse> for Instrument {
    fn from(source: wire::CoinMarketResponse) -> Self {
        let name = source
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| source.id.clone());

        Instrument {
            name,
            symbol: source.symbol.unwrap_or_default(),
            icon_url: source.image.unwrap_or_default(),
            current_price: decimal_or_zero(source.current_price),
            circulating_supply: decimal_or_zero(source.circulating_supply),
            market_cap: decimal_or_zero(source.market_cap),
            market_cap_rank: source.market_cap_rank,
            price_change_24h: decimal_or_zero(source.price_change_24h),
            price_change_percentage_24h: decimal_or_zero(source.price_change_percentage_24h),
            id: CoinId::from(source.id),
        }
    }
}
