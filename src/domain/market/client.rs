//! Markets sub-client: paginated listing fetches.

use crate::client::ListingsClient;
use crate::domain::market::Instrument;
use crate::domain::query::{FilterState, QueryDescriptor};
use crate::error::SdkError;

/// Sub-client for the markets listing.
pub struct Markets<'a> {
    pub(crate) client: &'a ListingsClient,
}

impl<'a> Markets<'a> {
    /// Fetch one page of listings exactly as described by `descriptor`.
    pub async fn list(&self, descriptor: &QueryDescriptor) -> Result<Vec<Instrument>, SdkError> {
        let rows = self.client.http.get_markets(descriptor).await?;
        Ok(rows.into_iter().map(Instrument::from).collect())
    }

    /// Fetch the page a filter projects to.
    pub async fn list_for(&self, filter: &FilterState) -> Result<Vec<Instrument>, SdkError> {
        self.list(&filter.descriptor()).await
    }
}
