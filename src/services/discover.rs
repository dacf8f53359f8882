use std::sync::Arc;

use serde_json::Value;

use crate::cache::ExpiringCache;
use crate::config::{Category, FEATURED_SYMBOLS};
use crate::error::Result;
use crate::provider::MarketDataProvider;

use super::fetch_with_cache;

/// Cached quotes for the curated featured list.
#[derive(Clone)]
pub struct DiscoverService {
    provider: Arc<dyn MarketDataProvider>,
    cache: Arc<ExpiringCache>,
}

impl DiscoverService {
    pub fn new(provider: Arc<dyn MarketDataProvider>, cache: Arc<ExpiringCache>) -> Self {
        Self { provider, cache }
    }

    pub async fn featured(&self) -> Result<Value> {
        let key = Category::FeaturedList.key_for("");
        fetch_with_cache(&self.cache, Category::FeaturedList, &key, async {
            self.provider.quote_many(FEATURED_SYMBOLS).await
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::services::testing::MockProvider;

    #[tokio::test]
    async fn featured_list_is_cached_under_a_single_key() {
        let provider = Arc::new(MockProvider {
            quote_many_response: Some(json!([{"symbol": "ESGV"}, {"symbol": "QQQM"}])),
            ..MockProvider::default()
        });
        let cache = Arc::new(ExpiringCache::new());
        let service = DiscoverService::new(provider.clone(), cache.clone());

        service.featured().await.unwrap();
        service.featured().await.unwrap();

        assert_eq!(provider.call_count(), 1);
        assert!(cache.get("etf_featured_list").is_some());
    }
}
