use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::cache::ExpiringCache;
use crate::config::Category;
use crate::error::Result;
use crate::provider::{ChartQuery, ChartResponse, DividendEvent, MarketDataProvider};
use crate::utils::today_string;

use super::fetch_with_cache;

/// Dividend lookups always cover the full available history.
const DIVIDENDS_EPOCH_START: &str = "1970-01-01";

/// Caller-facing window for the history accessor. Field order drives the
/// cache-key serialization, so keep it stable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<String>,
}

/// Cached access to historical candles and dividend events.
#[derive(Clone)]
pub struct HistoryService {
    provider: Arc<dyn MarketDataProvider>,
    cache: Arc<ExpiringCache>,
}

impl HistoryService {
    pub fn new(provider: Arc<dyn MarketDataProvider>, cache: Arc<ExpiringCache>) -> Self {
        Self { provider, cache }
    }

    /// Historical (or intraday, depending on `interval`) series for a
    /// symbol over the requested window.
    pub async fn history(&self, symbol: &str, query: &HistoryQuery) -> Result<ChartResponse> {
        let key = format!(
            "{}_{}",
            Category::History.key_for(symbol),
            serde_json::to_string(query)?
        );
        let chart_query = to_chart_query(query)?;
        fetch_with_cache(&self.cache, Category::History, &key, async {
            self.provider.chart(symbol, &chart_query).await
        })
        .await
    }

    /// Every dividend the symbol ever paid, oldest first.
    pub async fn dividends(&self, symbol: &str) -> Result<Vec<DividendEvent>> {
        let key = Category::Dividends.key_for(symbol);
        fetch_with_cache(&self.cache, Category::Dividends, &key, async {
            self.provider
                .dividends(symbol, DIVIDENDS_EPOCH_START, &today_string())
                .await
        })
        .await
    }
}

/// Normalize the caller's window into provider chart arguments.
///
/// An explicit from/to pair wins over `range`. The upstream rejects a
/// zero-width window, so `from == to` widens to a one-day window by
/// advancing `period2` a single calendar day.
pub(crate) fn to_chart_query(query: &HistoryQuery) -> Result<ChartQuery> {
    let mut chart = ChartQuery {
        interval: query.interval.clone(),
        ..ChartQuery::default()
    };

    if query.from.is_some() || query.to.is_some() {
        chart.period1 = query.from.clone();
        if let Some(to) = &query.to {
            if query.from.as_deref() == Some(to.as_str()) {
                let date = NaiveDate::parse_from_str(to, "%Y-%m-%d")?;
                let next_day = date + Duration::days(1);
                chart.period2 = Some(next_day.format("%Y-%m-%d").to_string());
            } else {
                chart.period2 = Some(to.clone());
            }
        }
    } else if query.range.is_some() {
        chart.range = query.range.clone();
    }

    Ok(chart)
}
