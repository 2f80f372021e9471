//! Conversion: CoinListEntry → CatalogEntry, and the bulk listing → Catalog.

use super::wire;
use super::{Catalog, CatalogEntry, CatalogEntryError};
use crate::shared::CoinId;

impl TryFrom<wire::CoinListEntry> for CatalogEntry {
    type Error = CatalogEntryError;

    fn try_from(source: wire::CoinListEntry) -> Result<Self, Self::Error> {
        let id = source.id.trim();
        if id.is_empty() {
            return Err(CatalogEntryError::MissingIdentifier);
        }
        let name = source.name.trim();
        if name.is_empty() {
            return Err(CatalogEntryError::MissingName(id.to_string()));
        }
        Ok(CatalogEntry {
            identifier: CoinId::from(id),
            display_name: name.to_string(),
            symbol: source.symbol,
        })
    }
}

impl From<Vec<wire::CoinListEntry>> for Catalog {
    /// Builds the catalog in response order, skipping rows that cannot be
    /// searched for.
    fn from(rows: Vec<wire::CoinListEntry>) -> Self {
        let total = rows.len();
        let catalog: Catalog = rows
            .into_iter()
            .filter_map(|row| match CatalogEntry::try_from(row) {
                Ok(entry) => Some(entry),
                Err(err) => {
                    tracing::debug!("Skipping catalog row: {}", err);
                    None
                }
            })
            .collect();
        if catalog.len() < total {
            tracing::debug!(kept = catalog.len(), total, "Catalog rows skipped");
        }
        catalog
    }
}
