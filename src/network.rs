//! Network URL constants for the market-data API.

/// Default REST API base URL (public CoinGecko v3).
pub const DEFAULT_API_URL: &str = "https://api.coingecko.com/api/v3";

/// Path of the paginated markets listing.
pub const MARKETS_PATH: &str = "/coins/markets";

/// Path of the bulk coin catalog (`{id, symbol, name}` for every listed coin).
pub const COIN_LIST_PATH: &str = "/coins/list";
