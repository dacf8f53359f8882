use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cache::ExpiringCache;
use crate::config::Category;
use crate::error::Result;
use crate::provider::MarketDataProvider;

use super::{fetch_with_cache, CoreDataService, InsightsService};

/// Headlines requested per news lookup.
const NEWS_COUNT: u32 = 10;

/// One slot of the consolidated report: either the sub-fetch payload or an
/// explanatory error marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReportField {
    Failed { error: String },
    Data(Value),
}

impl ReportField {
    fn from_result(result: Result<Value>, message: &str) -> Self {
        match result {
            Ok(value) => ReportField::Data(value),
            Err(_) => ReportField::Failed {
                error: message.to_string(),
            },
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ReportField::Failed { .. })
    }
}

/// Consolidated per-symbol view assembled from six independent sub-fetches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FullReport {
    pub symbol: String,
    #[serde(rename = "generatedAt")]
    pub generated_at: String,
    pub details: ReportField,
    pub price: ReportField,
    pub news: Value,
    pub holdings: ReportField,
    pub insights: ReportField,
    pub recommendations: Value,
}

/// News lookups plus the full-report aggregator.
#[derive(Clone)]
pub struct ReportsService {
    provider: Arc<dyn MarketDataProvider>,
    cache: Arc<ExpiringCache>,
    core: CoreDataService,
    insights: InsightsService,
}

impl ReportsService {
    pub fn new(
        provider: Arc<dyn MarketDataProvider>,
        cache: Arc<ExpiringCache>,
        core: CoreDataService,
        insights: InsightsService,
    ) -> Self {
        Self {
            provider,
            cache,
            core,
            insights,
        }
    }

    /// Recent headlines attached to a symbol.
    pub async fn news(&self, symbol: &str) -> Result<Value> {
        let key = Category::News.key_for(symbol);
        fetch_with_cache(&self.cache, Category::News, &key, async {
            let result = self.provider.search(symbol, Some(NEWS_COUNT)).await?;
            Ok(result
                .get("news")
                .cloned()
                .unwrap_or_else(|| Value::Array(Vec::new())))
        })
        .await
    }

    /// Consolidated view over six concurrent sub-fetches. Each sub-fetch
    /// runs through its own accessor and keeps its own cache and TTL; a
    /// failed one degrades to a field-level marker instead of failing the
    /// report. The composite itself is cached briefly.
    pub async fn full_report(&self, symbol: &str) -> Result<FullReport> {
        let key = Category::FullReport.key_for(symbol);
        fetch_with_cache(&self.cache, Category::FullReport, &key, async {
            let (details, price, news, holdings, insights, recommendations) = futures::join!(
                self.core.info(symbol),
                self.core.price(symbol),
                self.news(symbol),
                self.insights.holdings(symbol),
                self.insights.insights(symbol),
                self.insights.recommendations(symbol),
            );

            Ok(FullReport {
                symbol: symbol.to_string(),
                generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
                details: ReportField::from_result(details, "Failed to fetch details"),
                price: ReportField::from_result(price, "Failed to fetch price"),
                news: news.unwrap_or_else(|_| Value::Array(Vec::new())),
                holdings: ReportField::from_result(holdings, "Failed to fetch holdings"),
                insights: ReportField::from_result(insights, "Failed to fetch insights"),
                recommendations: recommendations.unwrap_or_else(|_| Value::Array(Vec::new())),
            })
        })
        .await
    }
}
