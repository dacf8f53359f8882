use std::sync::Arc;

use serde_json::Value;

use crate::cache::ExpiringCache;
use crate::config::Category;
use crate::error::Result;
use crate::provider::MarketDataProvider;

use super::fetch_with_cache;

/// Cached free-text instrument search.
#[derive(Clone)]
pub struct SearchService {
    provider: Arc<dyn MarketDataProvider>,
    cache: Arc<ExpiringCache>,
}

impl SearchService {
    pub fn new(provider: Arc<dyn MarketDataProvider>, cache: Arc<ExpiringCache>) -> Self {
        Self { provider, cache }
    }

    /// Full search response (matching quotes plus any attached news).
    pub async fn search(&self, query: &str) -> Result<Value> {
        let key = Category::Search.key_for(query);
        fetch_with_cache(&self.cache, Category::Search, &key, async {
            self.provider.search(query, None).await
        })
        .await
    }
}
