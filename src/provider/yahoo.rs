use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use reqwest::header::USER_AGENT;
use reqwest::Client;
use serde_json::Value;

use crate::error::{AppError, Context, Result};

use super::{ChartQuery, ChartQuote, ChartResponse, DividendEvent, MarketDataProvider};

const SEARCH_ENDPOINT: &str = "https://query1.finance.yahoo.com/v1/finance/search";
const QUOTE_ENDPOINT: &str = "https://query1.finance.yahoo.com/v7/finance/quote";
const QUOTE_SUMMARY_ENDPOINT: &str = "https://query1.finance.yahoo.com/v10/finance/quoteSummary";
const CHART_ENDPOINT: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
const RECOMMENDATIONS_ENDPOINT: &str =
    "https://query1.finance.yahoo.com/v6/finance/recommendationsbysymbol";
const INSIGHTS_ENDPOINT: &str = "https://query1.finance.yahoo.com/ws/insights/v2/finance/insights";

const PROVIDER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Async client for Yahoo's public finance endpoints.
pub struct YahooProvider {
    client: Client,
}

impl YahooProvider {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to construct provider HTTP client")?;
        Ok(Self { client })
    }

    async fn get_json(&self, url: &str, query: &[(&str, String)]) -> Result<Value> {
        let response = self
            .client
            .get(url)
            .header(USER_AGENT, PROVIDER_USER_AGENT)
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::upstream(format!(
                "Request to {} failed with status {}",
                url, status
            )));
        }

        let body = response.text().await?;
        serde_json::from_str(&body)
            .map_err(|_| AppError::upstream(format!("Malformed JSON payload from {}", url)))
    }
}

#[async_trait::async_trait]
impl MarketDataProvider for YahooProvider {
    async fn search(&self, query: &str, news_count: Option<u32>) -> Result<Value> {
        let mut params = vec![("q", query.to_string())];
        if let Some(count) = news_count {
            params.push(("newsCount", count.to_string()));
        }
        self.get_json(SEARCH_ENDPOINT, &params).await
    }

    async fn quote(&self, symbol: &str) -> Result<Value> {
        let root = self
            .get_json(QUOTE_ENDPOINT, &[("symbols", symbol.to_string())])
            .await?;
        let quotes = parse_quote_list(&root)?;
        quotes
            .first()
            .cloned()
            .ok_or_else(|| AppError::upstream(format!("No quote data for {}", symbol)))
    }

    async fn quote_many(&self, symbols: &[&str]) -> Result<Value> {
        let root = self
            .get_json(QUOTE_ENDPOINT, &[("symbols", symbols.join(","))])
            .await?;
        Ok(Value::Array(parse_quote_list(&root)?))
    }

    async fn quote_summary(&self, symbol: &str, modules: &[&str]) -> Result<Value> {
        let url = format!("{}/{}", QUOTE_SUMMARY_ENDPOINT, symbol);
        let root = self
            .get_json(&url, &[("modules", modules.join(","))])
            .await?;
        parse_summary_result(&root, symbol)
    }

    async fn chart(&self, symbol: &str, query: &ChartQuery) -> Result<ChartResponse> {
        let url = format!("{}/{}", CHART_ENDPOINT, symbol);
        let params = chart_params(query)?;
        let root = self.get_json(&url, &params).await?;
        parse_chart_body(&root, symbol)
    }

    async fn dividends(
        &self,
        symbol: &str,
        period1: &str,
        period2: &str,
    ) -> Result<Vec<DividendEvent>> {
        let url = format!("{}/{}", CHART_ENDPOINT, symbol);
        let params = vec![
            ("interval", "1d".to_string()),
            ("period1", date_param(period1)?),
            ("period2", date_param(period2)?),
            ("events", "div".to_string()),
        ];
        let root = self.get_json(&url, &params).await?;
        parse_dividends(&root, symbol)
    }

    async fn recommendations(&self, symbol: &str) -> Result<Value> {
        let url = format!("{}/{}", RECOMMENDATIONS_ENDPOINT, symbol);
        let root = self.get_json(&url, &[]).await?;
        finance_result(&root)
            .ok_or_else(|| AppError::upstream(format!("No recommendation data for {}", symbol)))
    }

    async fn insights(&self, symbol: &str) -> Result<Value> {
        let root = self
            .get_json(INSIGHTS_ENDPOINT, &[("symbol", symbol.to_string())])
            .await?;
        finance_result(&root)
            .ok_or_else(|| AppError::upstream(format!("No insights data for {}", symbol)))
    }
}

/// Translate the normalized chart query into endpoint parameters. Explicit
/// dates go over the wire as unix seconds; `range` passes through.
fn chart_params(query: &ChartQuery) -> Result<Vec<(&'static str, String)>> {
    let mut params = Vec::new();

    if let Some(interval) = &query.interval {
        params.push(("interval", interval.clone()));
    }
    if let Some(period1) = &query.period1 {
        params.push(("period1", date_param(period1)?));
    }
    if let Some(period2) = &query.period2 {
        params.push(("period2", date_param(period2)?));
    }
    if let Some(range) = &query.range {
        params.push(("range", range.clone()));
    }

    Ok(params)
}

fn date_param(value: &str) -> Result<String> {
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")?;
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| AppError::message(format!("Unrepresentable date: {}", value)))?;
    Ok(midnight.and_utc().timestamp().to_string())
}

fn parse_quote_list(root: &Value) -> Result<Vec<Value>> {
    root["quoteResponse"]["result"]
        .as_array()
        .cloned()
        .ok_or_else(|| AppError::upstream("Malformed quote payload".to_string()))
}

fn parse_summary_result(root: &Value, symbol: &str) -> Result<Value> {
    let result = &root["quoteSummary"]["result"];
    result
        .get(0)
        .filter(|value| !value.is_null())
        .cloned()
        .ok_or_else(|| AppError::upstream(format!("No summary data for {}", symbol)))
}

fn finance_result(root: &Value) -> Option<Value> {
    let result = &root["finance"]["result"];
    if result.is_null() {
        None
    } else {
        Some(result.clone())
    }
}

fn parse_chart_body(root: &Value, symbol: &str) -> Result<ChartResponse> {
    let chart = &root["chart"];

    if let Some(description) = chart["error"]["description"].as_str() {
        return Err(AppError::upstream(format!(
            "Chart request for {} failed: {}",
            symbol, description
        )));
    }

    let result = chart["result"]
        .get(0)
        .ok_or_else(|| AppError::upstream(format!("No chart data for {}", symbol)))?;

    let meta = result["meta"].clone();

    // An empty window legitimately has no timestamp array at all.
    let timestamps = match result["timestamp"].as_array() {
        Some(timestamps) => timestamps,
        None => {
            return Ok(ChartResponse {
                meta,
                quotes: Vec::new(),
            })
        }
    };

    let quote = &result["indicators"]["quote"][0];
    let adjclose = &result["indicators"]["adjclose"][0]["adjclose"];

    let mut quotes = Vec::with_capacity(timestamps.len());
    for (idx, raw) in timestamps.iter().enumerate() {
        let Some(seconds) = raw.as_i64() else {
            continue;
        };
        let Some(date) = DateTime::<Utc>::from_timestamp(seconds, 0) else {
            continue;
        };

        quotes.push(ChartQuote {
            date,
            open: series_value(quote, "open", idx),
            high: series_value(quote, "high", idx),
            low: series_value(quote, "low", idx),
            close: series_value(quote, "close", idx),
            adjclose: adjclose.get(idx).and_then(Value::as_f64),
            volume: quote["volume"].get(idx).and_then(Value::as_u64),
        });
    }

    Ok(ChartResponse { meta, quotes })
}

fn series_value(quote: &Value, field: &str, idx: usize) -> Option<f64> {
    quote[field].get(idx).and_then(Value::as_f64)
}

fn parse_dividends(root: &Value, symbol: &str) -> Result<Vec<DividendEvent>> {
    if root["chart"]["result"].get(0).is_none() {
        return Err(AppError::upstream(format!(
            "No dividend history for {}",
            symbol
        )));
    }

    // Symbols that never paid a dividend come back without an events block.
    let events = match root["chart"]["result"][0]["events"]["dividends"].as_object() {
        Some(events) => events,
        None => return Ok(Vec::new()),
    };

    let mut dividends = Vec::with_capacity(events.len());
    for entry in events.values() {
        let Some(amount) = entry["amount"].as_f64() else {
            continue;
        };
        let Some(seconds) = entry["date"].as_i64() else {
            continue;
        };
        let Some(date) = DateTime::<Utc>::from_timestamp(seconds, 0) else {
            continue;
        };

        dividends.push(DividendEvent {
            date: date.date_naive(),
            amount,
        });
    }

    dividends.sort_by_key(|event| event.date);
    Ok(dividends)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_chart_payload_with_gaps() {
        let sample: Value = serde_json::from_str(
            r#"{
                "chart": {
                    "result": [{
                        "meta": {"symbol": "SPY", "regularMarketPrice": 520.1},
                        "timestamp": [1704326400, 1704412800, 1704499200],
                        "indicators": {
                            "quote": [{
                                "open": [469.2, null, 470.8],
                                "high": [470.0, null, 472.3],
                                "low": [468.1, null, 470.1],
                                "close": [469.9, null, 471.5],
                                "volume": [71200000, null, 68900000]
                            }],
                            "adjclose": [{"adjclose": [469.9, null, 471.5]}]
                        }
                    }],
                    "error": null
                }
            }"#,
        )
        .unwrap();

        let parsed = parse_chart_body(&sample, "SPY").unwrap();

        assert_eq!(parsed.quotes.len(), 3);
        assert_eq!(parsed.meta["symbol"], "SPY");
        assert_eq!(parsed.quotes[0].close, Some(469.9));
        assert_eq!(parsed.quotes[1].close, None);
        assert_eq!(parsed.quotes[2].volume, Some(68_900_000));
        assert!(parsed.quotes[0].date < parsed.quotes[2].date);
    }

    #[test]
    fn chart_error_description_becomes_upstream_error() {
        let sample: Value = serde_json::from_str(
            r#"{"chart": {"result": null, "error": {"code": "Not Found", "description": "No data found, symbol may be delisted"}}}"#,
        )
        .unwrap();

        let err = parse_chart_body(&sample, "NOPE").unwrap_err();
        assert!(matches!(err, AppError::Upstream(_)));
    }

    #[test]
    fn empty_window_yields_no_quotes() {
        let sample: Value = serde_json::from_str(
            r#"{"chart": {"result": [{"meta": {"symbol": "SPY"}}], "error": null}}"#,
        )
        .unwrap();

        let parsed = parse_chart_body(&sample, "SPY").unwrap();
        assert!(parsed.quotes.is_empty());
    }

    #[test]
    fn parses_dividend_events_sorted_by_date() {
        let sample: Value = serde_json::from_str(
            r#"{
                "chart": {
                    "result": [{
                        "meta": {},
                        "events": {
                            "dividends": {
                                "1711108800": {"amount": 1.59, "date": 1711108800},
                                "1702558800": {"amount": 1.58, "date": 1702558800}
                            }
                        }
                    }]
                }
            }"#,
        )
        .unwrap();

        let dividends = parse_dividends(&sample, "SPY").unwrap();

        assert_eq!(dividends.len(), 2);
        assert!(dividends[0].date < dividends[1].date);
        assert_eq!(dividends[0].amount, 1.58);
    }

    #[test]
    fn dividendless_symbol_yields_empty_list() {
        let sample: Value =
            serde_json::from_str(r#"{"chart": {"result": [{"meta": {}}]}}"#).unwrap();
        assert!(parse_dividends(&sample, "GROW").unwrap().is_empty());
    }

    #[test]
    fn summary_without_result_is_an_upstream_error() {
        let sample: Value =
            serde_json::from_str(r#"{"quoteSummary": {"result": null, "error": null}}"#).unwrap();
        let err = parse_summary_result(&sample, "SPY").unwrap_err();
        assert!(matches!(err, AppError::Upstream(_)));
    }

    #[test]
    fn quote_list_requires_the_result_array() {
        let ok: Value = serde_json::from_str(
            r#"{"quoteResponse": {"result": [{"symbol": "SPY"}], "error": null}}"#,
        )
        .unwrap();
        assert_eq!(parse_quote_list(&ok).unwrap().len(), 1);

        let bad: Value = serde_json::from_str(r#"{"unexpected": true}"#).unwrap();
        assert!(parse_quote_list(&bad).is_err());
    }

    #[test]
    fn date_params_are_unix_seconds() {
        assert_eq!(date_param("1970-01-01").unwrap(), "0");
        assert_eq!(date_param("2024-01-01").unwrap(), "1704067200");
        assert!(date_param("not-a-date").is_err());
    }
}
