use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

pub mod yahoo;

pub use yahoo::YahooProvider;

/// Query forwarded to the provider's chart endpoint once the service layer
/// has normalized the caller's window.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period2: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<String>,
}

/// One bar of the raw historical series. Any field may be missing for
/// halted sessions; consumers filter on `close`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartQuote {
    pub date: DateTime<Utc>,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub adjclose: Option<f64>,
    pub volume: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartResponse {
    pub meta: Value,
    pub quotes: Vec<ChartQuote>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DividendEvent {
    pub date: NaiveDate,
    pub amount: f64,
}

/// The remote market-data source. Every call is an independent network
/// round-trip that can fail or be slow; callers decide how a failure is
/// surfaced.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Free-text symbol search; `news_count` asks for attached headlines.
    async fn search(&self, query: &str, news_count: Option<u32>) -> Result<Value>;

    /// Point-in-time quote for one symbol.
    async fn quote(&self, symbol: &str) -> Result<Value>;

    /// Point-in-time quotes for a batch of symbols.
    async fn quote_many(&self, symbols: &[&str]) -> Result<Value>;

    /// Fundamentals data, one object per requested module.
    async fn quote_summary(&self, symbol: &str, modules: &[&str]) -> Result<Value>;

    /// Historical or intraday price series.
    async fn chart(&self, symbol: &str, query: &ChartQuery) -> Result<ChartResponse>;

    /// Dividend events between two `YYYY-MM-DD` dates.
    async fn dividends(&self, symbol: &str, period1: &str, period2: &str)
        -> Result<Vec<DividendEvent>>;

    /// Analyst recommendations related to a symbol.
    async fn recommendations(&self, symbol: &str) -> Result<Value>;

    /// Research insights for a symbol.
    async fn insights(&self, symbol: &str) -> Result<Value>;
}
