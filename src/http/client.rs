//! Low-level HTTP client: `ListingsHttp`.
//!
//! One method per API endpoint. Returns wire types (conversion to domain types
//! happens in the sub-clients). Internal to the SDK: `ListingsClient` wraps this.

use crate::domain::catalog::wire::CoinListEntry;
use crate::domain::market::wire::CoinMarketResponse;
use crate::domain::query::QueryDescriptor;
use crate::error::HttpError;
use crate::http::retry::{RetryConfig, RetryPolicy};
use crate::network::{COIN_LIST_PATH, MARKETS_PATH};

use reqwest::header::RETRY_AFTER;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Low-level HTTP client for the market-data REST API.
#[derive(Clone)]
pub struct ListingsHttp {
    base_url: String,
    client: Client,
    retry: RetryPolicy,
}

impl ListingsHttp {
    pub fn new(base_url: &str, timeout: Duration, retry: RetryPolicy) -> Result<Self, HttpError> {
        let mut builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        {
            builder = builder.timeout(timeout).pool_max_idle_per_host(4);
        }
        #[cfg(target_arch = "wasm32")]
        let _ = timeout;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: builder.build()?,
            retry,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ── Markets ──────────────────────────────────────────────────────────

    pub async fn get_markets(
        &self,
        descriptor: &QueryDescriptor,
    ) -> Result<Vec<CoinMarketResponse>, HttpError> {
        let query = descriptor
            .to_query_string()
            .map_err(|e| HttpError::InvalidQuery(e.to_string()))?;
        let url = format!("{}{}?{}", self.base_url, MARKETS_PATH, query);
        self.get(&url).await
    }

    // ── Catalog ──────────────────────────────────────────────────────────

    pub async fn get_coin_list(&self) -> Result<Vec<CoinListEntry>, HttpError> {
        let url = format!("{}{}", self.base_url, COIN_LIST_PATH);
        self.get(&url).await
    }

    // ── Internal HTTP methods ────────────────────────────────────────────

    async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T, HttpError> {
        let Some(config) = self.retry.config() else {
            return self.do_get(url).await;
        };
        self.get_with_retry(url, &config).await
    }

    async fn get_with_retry<T: DeserializeOwned>(
        &self,
        url: &str,
        config: &RetryConfig,
    ) -> Result<T, HttpError> {
        let mut last_error = None;

        for attempt in 0..=config.max_retries {
            match self.do_get::<T>(url).await {
                Ok(resp) => return Ok(resp),
                Err(e) => {
                    let (should_retry, hint) = match &e {
                        HttpError::ServerError { status, .. } => {
                            (config.is_retryable_status(*status), None)
                        }
                        HttpError::RateLimited { retry_after_ms } => (
                            config.is_retryable_status(429),
                            retry_after_ms.map(Duration::from_millis),
                        ),
                        HttpError::Timeout => (true, None),
                        HttpError::Reqwest(re) => {
                            #[cfg(not(target_arch = "wasm32"))]
                            let retryable = re.is_connect() || re.is_timeout() || re.is_request();
                            #[cfg(target_arch = "wasm32")]
                            let retryable = re.is_timeout() || re.is_request();
                            (retryable, None)
                        }
                        _ => (false, None),
                    };

                    if should_retry && attempt < config.max_retries {
                        let delay = config.delay_for_attempt(attempt, hint);
                        tracing::debug!(
                            attempt = attempt + 1,
                            max = config.max_retries,
                            delay_ms = delay.as_millis() as u64,
                            "Retrying request to {}",
                            url
                        );
                        futures_timer::Delay::new(delay).await;
                        last_error = Some(e);
                    } else {
                        return Err(e);
                    }
                }
            }
        }

        Err(HttpError::MaxRetriesExceeded {
            attempts: config.max_retries + 1,
            last_error: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "unknown".to_string()),
        })
    }

    async fn do_get<T: DeserializeOwned>(&self, url: &str) -> Result<T, HttpError> {
        let resp = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;
        let status = resp.status();

        if status.is_success() {
            return Ok(resp.json::<T>().await?);
        }

        let status_code = status.as_u16();
        if status_code == 429 {
            let retry_after_ms = resp
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(parse_retry_after_ms);
            return Err(HttpError::RateLimited { retry_after_ms });
        }

        let body_text = resp.text().await.unwrap_or_default();
        match status_code {
            404 => Err(HttpError::NotFound(body_text)),
            408 => Err(HttpError::Timeout),
            400..=499 => Err(HttpError::BadRequest(body_text)),
            _ => Err(HttpError::ServerError {
                status: status_code,
                body: body_text,
            }),
        }
    }
}

/// `Retry-After` in delta-seconds form. HTTP-date values are ignored and fall
/// back to the configured backoff.
fn parse_retry_after_ms(value: &str) -> Option<u64> {
    value
        .trim()
        .parse::<u64>()
        .ok()
        .map(|secs| secs.saturating_mul(1000))
}
