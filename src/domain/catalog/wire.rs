//! Wire types for the bulk coin listing (REST).

use serde::{Deserialize, Serialize};

/// One element of the `GET /coins/list` response array.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CoinListEntry {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub name: String,
}
