use std::sync::Arc;

use serde_json::Value;

use crate::cache::ExpiringCache;
use crate::config::Category;
use crate::error::Result;
use crate::provider::MarketDataProvider;

use super::fetch_with_cache;

/// Fundamentals modules describing what a fund holds and how it performed.
const HOLDINGS_MODULES: &[&str] = &["topHoldings", "fundPerformance", "assetProfile"];

/// Cached access to research-flavored views: recommendations, insights and
/// fund holdings.
#[derive(Clone)]
pub struct InsightsService {
    provider: Arc<dyn MarketDataProvider>,
    cache: Arc<ExpiringCache>,
}

impl InsightsService {
    pub fn new(provider: Arc<dyn MarketDataProvider>, cache: Arc<ExpiringCache>) -> Self {
        Self { provider, cache }
    }

    pub async fn recommendations(&self, symbol: &str) -> Result<Value> {
        let key = Category::Recommendations.key_for(symbol);
        fetch_with_cache(&self.cache, Category::Recommendations, &key, async {
            self.provider.recommendations(symbol).await
        })
        .await
    }

    pub async fn insights(&self, symbol: &str) -> Result<Value> {
        let key = Category::Insights.key_for(symbol);
        fetch_with_cache(&self.cache, Category::Insights, &key, async {
            self.provider.insights(symbol).await
        })
        .await
    }

    pub async fn holdings(&self, symbol: &str) -> Result<Value> {
        let key = Category::Holdings.key_for(symbol);
        fetch_with_cache(&self.cache, Category::Holdings, &key, async {
            self.provider.quote_summary(symbol, HOLDINGS_MODULES).await
        })
        .await
    }
}
