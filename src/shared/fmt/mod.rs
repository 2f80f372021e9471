//! Human-readable formatting for listing table cells.
//!
//! Missing numeric fields arrive as `Decimal::ZERO` (see `domain::market`), so
//! every helper here renders zero rather than failing or printing a placeholder.

pub mod decimal;
pub mod num;

pub use decimal::{abbreviate, percent_change, price, signed_price, trend, Trend};
