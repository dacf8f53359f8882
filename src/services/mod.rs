use std::future::Future;
use std::sync::Arc;

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::cache::ExpiringCache;
use crate::config::Category;
use crate::error::Result;
use crate::provider::MarketDataProvider;

pub mod core;
pub mod discover;
pub mod history;
pub mod insights;
pub mod reports;
pub mod search;
pub mod sparkline;

pub use self::core::CoreDataService;
pub use discover::DiscoverService;
pub use history::{HistoryQuery, HistoryService};
pub use insights::InsightsService;
pub use reports::{FullReport, ReportField, ReportsService};
pub use search::SearchService;
pub use sparkline::{
    iso_week_key, resample, SparklinePeriod, SparklinePoint, SparklineResponse, SparklineService,
};

/// The full accessor stack, sharing one provider and one cache instance.
pub struct Services {
    pub core: CoreDataService,
    pub search: SearchService,
    pub history: HistoryService,
    pub insights: InsightsService,
    pub discover: DiscoverService,
    pub sparkline: SparklineService,
    pub reports: ReportsService,
}

impl Services {
    pub fn new(provider: Arc<dyn MarketDataProvider>, cache: Arc<ExpiringCache>) -> Self {
        let core = CoreDataService::new(provider.clone(), cache.clone());
        let insights = InsightsService::new(provider.clone(), cache.clone());
        Self {
            search: SearchService::new(provider.clone(), cache.clone()),
            history: HistoryService::new(provider.clone(), cache.clone()),
            discover: DiscoverService::new(provider.clone(), cache.clone()),
            sparkline: SparklineService::new(provider.clone(), cache.clone()),
            reports: ReportsService::new(provider, cache, core.clone(), insights.clone()),
            core,
            insights,
        }
    }
}

/// Cache-aside accessor shared by every data category.
///
/// Serves an unexpired entry straight from the store; otherwise awaits the
/// fetch, stores the fresh value under the category TTL and returns it.
/// Failures are propagated unchanged and never cached, so a stale-but-held
/// entry stays in place until a later fetch succeeds.
pub(crate) async fn fetch_with_cache<T, F>(
    cache: &ExpiringCache,
    category: Category,
    key: &str,
    fetch: F,
) -> Result<T>
where
    T: Serialize + DeserializeOwned,
    F: Future<Output = Result<T>>,
{
    if let Some(entry) = cache.get(key) {
        if entry.is_fresh(Utc::now()) {
            log::info!(
                "Cache HIT [{}]: {} (Cache: {}, Expires at: {})",
                category.name(),
                key,
                category.label(),
                entry.expires_at.format("%Y-%m-%d %H:%M:%S"),
            );
            return Ok(serde_json::from_value(entry.value)?);
        }
    }

    log::info!("Cache MISS [{}]: {} - fetching from provider", category.name(), key);

    match fetch.await {
        Ok(value) => {
            cache.set(key, serde_json::to_value(&value)?, category.ttl());
            Ok(value)
        }
        Err(err) => {
            log::error!("Fetch failed [{}]: {}: {}", category.name(), key, err);
            Err(err)
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::{Duration, TimeZone, Utc};
    use serde_json::Value;

    use crate::error::{AppError, Result};
    use crate::provider::{
        ChartQuery, ChartQuote, ChartResponse, DividendEvent, MarketDataProvider,
    };

    /// Hand-rolled provider double: preloaded per-method responses plus a
    /// call counter. A `None` slot makes the corresponding call fail.
    #[derive(Default)]
    pub struct MockProvider {
        pub search_response: Option<Value>,
        pub quote_response: Option<Value>,
        pub quote_many_response: Option<Value>,
        pub summary_response: Option<Value>,
        pub chart_response: Option<ChartResponse>,
        pub dividends_response: Option<Vec<DividendEvent>>,
        pub recommendations_response: Option<Value>,
        pub insights_response: Option<Value>,
        pub calls: AtomicUsize,
        pub last_chart_query: Mutex<Option<ChartQuery>>,
        pub last_dividend_window: Mutex<Option<(String, String)>>,
        pub last_modules: Mutex<Option<Vec<String>>>,
    }

    impl MockProvider {
        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn answer<T: Clone>(&self, slot: &Option<T>, what: &str) -> Result<T> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            slot.clone()
                .ok_or_else(|| AppError::upstream(format!("mock {} failure", what)))
        }
    }

    #[async_trait]
    impl MarketDataProvider for MockProvider {
        async fn search(&self, _query: &str, _news_count: Option<u32>) -> Result<Value> {
            self.answer(&self.search_response, "search")
        }

        async fn quote(&self, _symbol: &str) -> Result<Value> {
            self.answer(&self.quote_response, "quote")
        }

        async fn quote_many(&self, _symbols: &[&str]) -> Result<Value> {
            self.answer(&self.quote_many_response, "quote_many")
        }

        async fn quote_summary(&self, _symbol: &str, modules: &[&str]) -> Result<Value> {
            *self.last_modules.lock().unwrap() =
                Some(modules.iter().map(|m| m.to_string()).collect());
            self.answer(&self.summary_response, "quote_summary")
        }

        async fn chart(&self, _symbol: &str, query: &ChartQuery) -> Result<ChartResponse> {
            *self.last_chart_query.lock().unwrap() = Some(query.clone());
            self.answer(&self.chart_response, "chart")
        }

        async fn dividends(
            &self,
            _symbol: &str,
            period1: &str,
            period2: &str,
        ) -> Result<Vec<DividendEvent>> {
            *self.last_dividend_window.lock().unwrap() =
                Some((period1.to_string(), period2.to_string()));
            self.answer(&self.dividends_response, "dividends")
        }

        async fn recommendations(&self, _symbol: &str) -> Result<Value> {
            self.answer(&self.recommendations_response, "recommendations")
        }

        async fn insights(&self, _symbol: &str) -> Result<Value> {
            self.answer(&self.insights_response, "insights")
        }
    }

    /// `count` consecutive daily closes starting at `start` (midnight UTC).
    pub fn daily_quotes(start: chrono::NaiveDate, count: usize) -> Vec<ChartQuote> {
        (0..count)
            .map(|offset| {
                let date = start + Duration::days(offset as i64);
                let midnight = date.and_hms_opt(0, 0, 0).unwrap();
                ChartQuote {
                    date: Utc.from_utc_datetime(&midnight),
                    open: Some(100.0 + offset as f64),
                    high: Some(101.0 + offset as f64),
                    low: Some(99.0 + offset as f64),
                    close: Some(100.5 + offset as f64),
                    adjclose: Some(100.5 + offset as f64),
                    volume: Some(1_000_000),
                }
            })
            .collect()
    }

    pub fn chart_response(quotes: Vec<ChartQuote>) -> ChartResponse {
        ChartResponse {
            meta: serde_json::json!({"symbol": "TEST"}),
            quotes,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::Duration;
    use serde_json::json;

    use super::*;
    use crate::error::AppError;

    #[tokio::test]
    async fn hit_returns_cached_value_without_fetching() {
        let cache = ExpiringCache::new();
        cache.set("etf_price_SPY", json!(500.0), Category::Price.ttl());

        let fetches = AtomicUsize::new(0);
        let value: f64 = fetch_with_cache(&cache, Category::Price, "etf_price_SPY", async {
            fetches.fetch_add(1, Ordering::SeqCst);
            Ok(1.0)
        })
        .await
        .unwrap();

        assert_eq!(value, 500.0);
        assert_eq!(fetches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn miss_fetches_and_stores_with_category_ttl() {
        let cache = ExpiringCache::new();

        let value: f64 = fetch_with_cache(&cache, Category::Price, "etf_price_SPY", async {
            Ok(500.0)
        })
        .await
        .unwrap();
        assert_eq!(value, 500.0);

        let entry = cache.get("etf_price_SPY").unwrap();
        assert_eq!(entry.value, json!(500.0));

        let remaining = entry.expires_at - chrono::Utc::now();
        assert!(remaining > Duration::seconds(55));
        assert!(remaining <= Category::Price.ttl());
    }

    #[tokio::test]
    async fn expired_entry_triggers_refetch() {
        let cache = ExpiringCache::new();
        cache.set("k", json!(1.0), Duration::seconds(-5));

        let value: f64 = fetch_with_cache(&cache, Category::Price, "k", async { Ok(2.0) })
            .await
            .unwrap();

        assert_eq!(value, 2.0);
        assert_eq!(cache.get("k").unwrap().value, json!(2.0));
    }

    #[tokio::test]
    async fn failures_are_propagated_and_never_cached() {
        let cache = ExpiringCache::new();

        let result: Result<f64> = fetch_with_cache(&cache, Category::Price, "k", async {
            Err(AppError::upstream("boom"))
        })
        .await;

        assert!(matches!(result, Err(AppError::Upstream(_))));
        assert!(cache.get("k").is_none());
    }

    #[tokio::test]
    async fn failure_leaves_stale_entry_untouched() {
        let cache = ExpiringCache::new();
        cache.set("k", json!(1.0), Duration::seconds(-5));

        let result: Result<f64> = fetch_with_cache(&cache, Category::Price, "k", async {
            Err(AppError::upstream("boom"))
        })
        .await;

        assert!(result.is_err());
        // The stale slot survives until a later fetch succeeds.
        assert_eq!(cache.get("k").unwrap().value, json!(1.0));
    }
}
