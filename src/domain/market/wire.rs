//! Wire types for the markets listing (REST).

use crate::shared::serde_util::{lenient_f64, lenient_u32};
use serde::{Deserialize, Serialize};

/// One element of the `GET /coins/markets` response array.
///
/// Every field except `id` is optional: the API routinely sends `null` for
/// supply and change figures of thinly traded coins.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CoinMarketResponse {
    pub id: String,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64::deserialize")]
    pub current_price: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64::deserialize")]
    pub market_cap: Option<f64>,
    #[serde(default, deserialize_with = "lenient_u32::deserialize")]
    pub market_cap_rank: Option<u32>,
    #[serde(default, deserialize_with = "lenient_f64::deserialize")]
    pub circulating_supply: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64::deserialize")]
    pub price_change_24h: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64::deserialize")]
    pub price_change_percentage_24h: Option<f64>,
}
