use std::sync::Arc;

use serde_json::Value;

use crate::cache::ExpiringCache;
use crate::config::Category;
use crate::error::Result;
use crate::provider::MarketDataProvider;

use super::fetch_with_cache;

/// Fundamentals modules requested for the info view.
const INFO_MODULES: &[&str] = &["price", "summaryProfile", "fundProfile"];

/// Cached access to the two core per-symbol views: profile info and the
/// point-in-time quote.
#[derive(Clone)]
pub struct CoreDataService {
    provider: Arc<dyn MarketDataProvider>,
    cache: Arc<ExpiringCache>,
}

impl CoreDataService {
    pub fn new(provider: Arc<dyn MarketDataProvider>, cache: Arc<ExpiringCache>) -> Self {
        Self { provider, cache }
    }

    pub async fn info(&self, symbol: &str) -> Result<Value> {
        let key = Category::Info.key_for(symbol);
        fetch_with_cache(&self.cache, Category::Info, &key, async {
            self.provider.quote_summary(symbol, INFO_MODULES).await
        })
        .await
    }

    pub async fn price(&self, symbol: &str) -> Result<Value> {
        let key = Category::Price.key_for(symbol);
        fetch_with_cache(&self.cache, Category::Price, &key, async {
            self.provider.quote(symbol).await
        })
        .await
    }
}
