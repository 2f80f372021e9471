//! Session-level tests against a scripted market-data source.
//!
//! Every fetch parks until the test answers it, so completion order is chosen
//! explicitly instead of left to the scheduler.

#![cfg(feature = "http")]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use tokio::sync::{oneshot, Notify};
use tokio::task::JoinHandle;
use tokio::time::timeout;

use coin_listings::prelude::*;

const STEP_TIMEOUT: Duration = Duration::from_secs(5);

type Reply = Result<Vec<Instrument>, ErrorKind>;

struct Pending {
    descriptor: QueryDescriptor,
    reply: oneshot::Sender<Reply>,
}

impl Pending {
    fn answer(self, reply: Reply) {
        let _ = self.reply.send(reply);
    }
}

struct ScriptedSource {
    pending: Mutex<VecDeque<Pending>>,
    arrived: Notify,
    catalog: Result<Vec<CatalogEntry>, ErrorKind>,
    catalog_delay: Option<Duration>,
    market_calls: AtomicUsize,
    catalog_calls: AtomicUsize,
}

fn default_catalog() -> Vec<CatalogEntry> {
    vec![
        CatalogEntry::new("bitcoin", "Bitcoin"),
        CatalogEntry::new("bitcoin-cash", "Bitcoin Cash"),
        CatalogEntry::new("bittensor", "Bittensor"),
        CatalogEntry::new("ethereum", "Ethereum"),
    ]
}

impl ScriptedSource {
    fn new() -> Arc<Self> {
        Self::with_catalog(Ok(default_catalog()))
    }

    fn with_catalog(catalog: Result<Vec<CatalogEntry>, ErrorKind>) -> Arc<Self> {
        Self::build(catalog, None)
    }

    /// A source whose catalog fetch takes long enough for callers to overlap.
    fn with_slow_catalog(delay: Duration) -> Arc<Self> {
        Self::build(Ok(default_catalog()), Some(delay))
    }

    fn build(
        catalog: Result<Vec<CatalogEntry>, ErrorKind>,
        catalog_delay: Option<Duration>,
    ) -> Arc<Self> {
        Arc::new(Self {
            pending: Mutex::new(VecDeque::new()),
            arrived: Notify::new(),
            catalog,
            catalog_delay,
            market_calls: AtomicUsize::new(0),
            catalog_calls: AtomicUsize::new(0),
        })
    }

    fn catalog_calls(&self) -> usize {
        self.catalog_calls.load(Ordering::SeqCst)
    }

    /// Wait for the next fetch the session issues.
    async fn next_request(&self) -> Pending {
        timeout(STEP_TIMEOUT, async {
            loop {
                if let Some(p) = self.pending.lock().unwrap().pop_front() {
                    return p;
                }
                self.arrived.notified().await;
            }
        })
        .await
        .expect("timed out waiting for a markets fetch")
    }

    fn market_calls(&self) -> usize {
        self.market_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MarketDataSource for ScriptedSource {
    async fn fetch_markets(&self, descriptor: &QueryDescriptor) -> Result<Vec<Instrument>, ErrorKind> {
        self.market_calls.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = oneshot::channel();
        self.pending.lock().unwrap().push_back(Pending {
            descriptor: descriptor.clone(),
            reply: tx,
        });
        self.arrived.notify_one();
        rx.await
            .unwrap_or_else(|_| Err(ErrorKind::NetworkFailure("request dropped".into())))
    }

    async fn fetch_catalog(&self) -> Result<Vec<CatalogEntry>, ErrorKind> {
        self.catalog_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.catalog_delay {
            tokio::time::sleep(delay).await;
        }
        self.catalog.clone()
    }
}

fn instrument(id: &str, price: i64) -> Instrument {
    Instrument {
        id: CoinId::from(id),
        symbol: id.chars().take(3).collect(),
        name: id.to_string(),
        icon_url: format!("https://example.com/{id}.png"),
        current_price: Decimal::from(price),
        circulating_supply: Decimal::ZERO,
        market_cap: Decimal::from(price * 1_000),
        market_cap_rank: None,
        price_change_24h: Decimal::ZERO,
        price_change_percentage_24h: Decimal::ZERO,
    }
}

fn rows(prefix: &str, n: usize) -> Vec<Instrument> {
    (0..n)
        .map(|i| instrument(&format!("{prefix}-{i}"), 100 - i as i64))
        .collect()
}

fn session_for(source: &Arc<ScriptedSource>) -> ViewerSession {
    let source: Arc<dyn MarketDataSource> = source.clone();
    ViewerSession::new(source)
}

async fn finish(handle: JoinHandle<DispatchOutcome>) -> DispatchOutcome {
    timeout(STEP_TIMEOUT, handle)
        .await
        .expect("command did not finish")
        .expect("command task panicked")
}

/// Start a session and let the initial fetch succeed with `n` rows.
async fn loaded_session(source: &Arc<ScriptedSource>, n: usize) -> ViewerSession {
    let session = session_for(source);
    let start = tokio::spawn({
        let s = session.clone();
        async move { s.start().await }
    });
    source.next_request().await.answer(Ok(rows("usd", n)));
    assert_eq!(finish(start).await, DispatchOutcome::Applied { seq: 1 });
    session
}

// ── Scenario A: initial load ─────────────────────────────────────────────────

#[tokio::test]
async fn test_initial_load_shows_loading_then_rows() {
    let source = ScriptedSource::new();
    let session = session_for(&source);

    assert_eq!(session.snapshot().await.lifecycle, RequestLifecycle::Idle);

    let start = tokio::spawn({
        let s = session.clone();
        async move { s.start().await }
    });
    let first = source.next_request().await;
    assert_eq!(
        first.descriptor.to_query_string().unwrap(),
        "vs_currency=usd&order=market_cap_desc&per_page=10&page=1"
    );
    assert!(session.snapshot().await.is_loading());

    first.answer(Ok(rows("usd", 10)));
    assert_eq!(finish(start).await, DispatchOutcome::Applied { seq: 1 });

    let view = session.snapshot().await;
    assert!(matches!(view.lifecycle, RequestLifecycle::Succeeded(_)));
    assert_eq!(view.instruments().len(), 10);
    assert!(view.visible_error.is_none());
    assert_eq!(view.page_info.approx_total_rows, DEFAULT_APPROX_TOTAL_ROWS);
}

// ── Scenario B: rapid currency change, newer answers first ───────────────────

#[tokio::test]
async fn test_late_response_for_old_currency_is_discarded() {
    let source = ScriptedSource::new();
    let session = session_for(&source);

    let start = tokio::spawn({
        let s = session.clone();
        async move { s.start().await }
    });
    let usd = source.next_request().await;

    let switch = tokio::spawn({
        let s = session.clone();
        async move { s.set_currency(Currency::Eur).await }
    });
    let eur = source.next_request().await;
    assert_eq!(eur.descriptor.vs_currency, Currency::Eur);

    eur.answer(Ok(rows("eur", 3)));
    assert_eq!(finish(switch).await, DispatchOutcome::Applied { seq: 2 });

    usd.answer(Ok(rows("usd", 10)));
    assert_eq!(finish(start).await, DispatchOutcome::Superseded { seq: 1 });

    let view = session.snapshot().await;
    let page = view.rows.as_ref().expect("rows visible");
    assert_eq!(page.descriptor.vs_currency, Currency::Eur);
    assert_eq!(page.len(), 3);
    assert!(!view.is_loading());
}

// ── Rapid currency change, older answers first ───────────────────────────────

#[tokio::test]
async fn test_early_response_for_old_currency_keeps_loading() {
    let source = ScriptedSource::new();
    let session = session_for(&source);

    let start = tokio::spawn({
        let s = session.clone();
        async move { s.start().await }
    });
    let usd = source.next_request().await;
    let switch = tokio::spawn({
        let s = session.clone();
        async move { s.set_currency(Currency::Eur).await }
    });
    let eur = source.next_request().await;

    usd.answer(Ok(rows("usd", 10)));
    assert_eq!(finish(start).await, DispatchOutcome::Superseded { seq: 1 });

    let view = session.snapshot().await;
    assert!(view.is_loading());
    assert!(view.rows.is_none());

    eur.answer(Ok(rows("eur", 4)));
    assert_eq!(finish(switch).await, DispatchOutcome::Applied { seq: 2 });
    let view = session.snapshot().await;
    assert_eq!(view.rows.unwrap().descriptor.vs_currency, Currency::Eur);
}

// ── Scenario D: failure after success keeps the old rows ─────────────────────

#[tokio::test]
async fn test_failure_after_success_keeps_rows() {
    let source = ScriptedSource::new();
    let session = loaded_session(&source, 10).await;

    let page = tokio::spawn({
        let s = session.clone();
        async move { s.set_page(2, 10).await.unwrap() }
    });
    let req = source.next_request().await;
    assert_eq!(req.descriptor.page, 2);
    req.answer(Err(ErrorKind::NetworkFailure("HTTP 503".into())));
    assert_eq!(finish(page).await, DispatchOutcome::Applied { seq: 2 });

    let view = session.snapshot().await;
    assert!(matches!(view.lifecycle, RequestLifecycle::Failed(_)));
    assert_eq!(view.instruments().len(), 10);
    assert!(view.visible_error.is_none());
}

#[tokio::test]
async fn test_failure_without_rows_is_visible_and_refresh_recovers() {
    let source = ScriptedSource::new();
    let session = session_for(&source);

    let start = tokio::spawn({
        let s = session.clone();
        async move { s.start().await }
    });
    source.next_request().await.answer(Err(ErrorKind::Timeout));
    finish(start).await;
    assert_eq!(session.snapshot().await.visible_error, Some(ErrorKind::Timeout));

    let retry = tokio::spawn({
        let s = session.clone();
        async move { s.refresh().await }
    });
    let req = source.next_request().await;
    assert_eq!(req.descriptor, FilterState::default().descriptor());
    req.answer(Ok(rows("usd", 2)));
    assert_eq!(finish(retry).await, DispatchOutcome::Applied { seq: 2 });

    let view = session.snapshot().await;
    assert!(view.visible_error.is_none());
    assert_eq!(view.instruments().len(), 2);
}

// ── Filter commands ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_setting_current_values_issues_no_fetch() {
    let source = ScriptedSource::new();
    let session = loaded_session(&source, 10).await;

    assert_eq!(session.set_currency(Currency::Usd).await, DispatchOutcome::Unchanged);
    assert_eq!(
        session.set_sort_order(SortOrder::MarketCapDesc).await,
        DispatchOutcome::Unchanged
    );
    assert_eq!(session.set_page(1, 10).await.unwrap(), DispatchOutcome::Unchanged);
    assert_eq!(session.set_search_term("").await, DispatchOutcome::Unchanged);
    assert_eq!(session.start().await, DispatchOutcome::Unchanged);
    assert_eq!(source.market_calls(), 1);
}

#[tokio::test]
async fn test_invalid_input_is_rejected_without_fetch() {
    let source = ScriptedSource::new();
    let session = loaded_session(&source, 10).await;
    let before = session.snapshot().await;

    let err = session.set_page(3, 25).await.unwrap_err();
    assert!(matches!(err, SdkError::Filter(FilterError::InvalidPageSize(25))));
    assert!(session.set_page(0, 20).await.is_err());
    assert!(session.set_currency_code("gbp").await.is_err());
    assert!(session.set_sort_order_code("volume_desc").await.is_err());

    let after = session.snapshot().await;
    assert_eq!(after.filter, before.filter);
    assert_eq!(after.revision, before.revision);
    assert_eq!(source.market_calls(), 1);
}

#[tokio::test]
async fn test_page_change_is_one_atomic_fetch() {
    let source = ScriptedSource::new();
    let session = loaded_session(&source, 10).await;

    let page = tokio::spawn({
        let s = session.clone();
        async move { s.set_page(3, 50).await.unwrap() }
    });
    let req = source.next_request().await;
    assert_eq!((req.descriptor.page, req.descriptor.per_page), (3, 50));
    req.answer(Ok(rows("usd", 50)));
    finish(page).await;

    assert_eq!(source.market_calls(), 2);
    let info = session.snapshot().await.page_info;
    assert_eq!((info.page_number, info.page_size), (3, 50));
}

#[tokio::test]
async fn test_sort_order_code_dispatches_ascending() {
    let source = ScriptedSource::new();
    let session = loaded_session(&source, 10).await;

    let sort = tokio::spawn({
        let s = session.clone();
        async move { s.set_sort_order_code("market_cap_asc").await.unwrap() }
    });
    let req = source.next_request().await;
    assert_eq!(req.descriptor.order, SortOrder::MarketCapAsc);
    req.answer(Ok(rows("asc", 10)));
    assert_eq!(finish(sort).await, DispatchOutcome::Applied { seq: 2 });
}

// ── Search ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_search_by_name_then_clear_omits_ids() {
    let source = ScriptedSource::new();
    let session = loaded_session(&source, 10).await;

    let pick = tokio::spawn({
        let s = session.clone();
        async move { s.select_search_name("Bitcoin Cash").await }
    });
    let req = source.next_request().await;
    assert_eq!(req.descriptor.ids.as_deref(), Some("bitcoin-cash"));
    req.answer(Ok(vec![instrument("bitcoin-cash", 420)]));
    finish(pick).await;

    let clear = tokio::spawn({
        let s = session.clone();
        async move { s.clear_search().await }
    });
    let req = source.next_request().await;
    assert_eq!(req.descriptor.ids, None);
    assert!(!req.descriptor.to_query_string().unwrap().contains("ids"));
    req.answer(Ok(rows("usd", 10)));
    finish(clear).await;

    assert_eq!(session.snapshot().await.search_input, "");
}

#[tokio::test]
async fn test_unknown_name_falls_back_to_unfiltered() {
    let source = ScriptedSource::new();
    let session = loaded_session(&source, 10).await;

    assert_eq!(
        session.select_search_name("Not A Coin").await,
        DispatchOutcome::Unchanged
    );
    let view = session.snapshot().await;
    assert!(view.filter.search_identifier.is_none());
    assert_eq!(view.search_input, "Not A Coin");
}

#[tokio::test]
async fn test_typing_suggests_and_commit_filters() {
    let source = ScriptedSource::new();
    let session = loaded_session(&source, 10).await;

    let suggestions = session.set_search_input("bit").await;
    let ids: Vec<_> = suggestions.iter().map(|e| e.identifier.as_str()).collect();
    assert_eq!(ids, vec!["bitcoin", "bitcoin-cash", "bittensor"]);
    assert_eq!(source.market_calls(), 1);

    session.set_search_input("ethereum").await;
    let commit = tokio::spawn({
        let s = session.clone();
        async move { s.commit_search_input().await }
    });
    let req = source.next_request().await;
    assert_eq!(req.descriptor.ids.as_deref(), Some("ethereum"));
    req.answer(Ok(vec![instrument("ethereum", 3000)]));
    finish(commit).await;

    assert_eq!(source.catalog_calls(), 1);
}

#[tokio::test]
async fn test_catalog_failure_degrades_search() {
    let source = ScriptedSource::with_catalog(Err(ErrorKind::NetworkFailure("HTTP 500".into())));
    let session = loaded_session(&source, 10).await;

    assert!(session.set_search_input("bit").await.is_empty());
    assert!(matches!(
        session.catalog_status().await,
        CatalogStatus::Unavailable(ErrorKind::CatalogUnavailable(_))
    ));

    assert_eq!(
        session.select_search_name("Bitcoin").await,
        DispatchOutcome::Unchanged
    );
    // Failed loads are only retried explicitly.
    assert_eq!(source.catalog_calls(), 1);
    assert!(session.load_catalog().await.is_err());
    assert_eq!(source.catalog_calls(), 2);
}

#[tokio::test]
async fn test_concurrent_typing_fetches_catalog_once() {
    let source = ScriptedSource::with_slow_catalog(Duration::from_millis(50));
    let session = loaded_session(&source, 10).await;

    let (b, bi, bit) = tokio::join!(
        session.set_search_input("b"),
        session.set_search_input("bi"),
        session.set_search_input("bit"),
    );

    assert_eq!(source.catalog_calls(), 1);
    assert_eq!(bit.len(), 3);
    assert!(!b.is_empty() && !bi.is_empty());
    assert_eq!(
        session.catalog_status().await,
        CatalogStatus::Loaded { entries: 4 }
    );

    session.load_catalog().await.unwrap();
    assert_eq!(source.catalog_calls(), 1);
}

#[tokio::test]
async fn test_concurrent_explicit_loads_share_one_fetch() {
    let source = ScriptedSource::with_slow_catalog(Duration::from_millis(50));
    let session = session_for(&source);

    let (first, second) = tokio::join!(session.load_catalog(), session.load_catalog());
    assert_eq!(first, Ok(4));
    assert_eq!(second, Ok(4));
    assert_eq!(source.catalog_calls(), 1);
}

// ── Subscription ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_listeners_see_each_visible_change() {
    let source = ScriptedSource::new();
    let session = session_for(&source);

    let seen: Arc<Mutex<Vec<(u64, bool)>>> = Arc::default();
    session
        .subscribe({
            let seen = Arc::clone(&seen);
            move |view: &ViewSnapshot| seen.lock().unwrap().push((view.revision, view.is_loading()))
        })
        .await;

    let start = tokio::spawn({
        let s = session.clone();
        async move { s.start().await }
    });
    source.next_request().await.answer(Ok(rows("usd", 10)));
    finish(start).await;

    assert_eq!(session.set_currency(Currency::Usd).await, DispatchOutcome::Unchanged);

    let seen = seen.lock().unwrap().clone();
    assert_eq!(seen.len(), 2);
    assert!(seen[0].1);
    assert!(!seen[1].1);
    assert!(seen[0].0 < seen[1].0);
}
