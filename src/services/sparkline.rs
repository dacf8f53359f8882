use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{Datelike, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::cache::ExpiringCache;
use crate::config::Category;
use crate::error::{AppError, Result};
use crate::provider::{ChartQuery, ChartQuote, MarketDataProvider};

use super::fetch_with_cache;

/// Lookback window of a sparkline request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SparklinePeriod {
    #[default]
    OneMonth,
    ThreeMonths,
    SixMonths,
    OneYear,
}

impl SparklinePeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            SparklinePeriod::OneMonth => "1m",
            SparklinePeriod::ThreeMonths => "3m",
            SparklinePeriod::SixMonths => "6m",
            SparklinePeriod::OneYear => "1y",
        }
    }

    fn lookback_months(&self) -> u32 {
        match self {
            SparklinePeriod::OneMonth => 1,
            SparklinePeriod::ThreeMonths => 3,
            SparklinePeriod::SixMonths => 6,
            SparklinePeriod::OneYear => 12,
        }
    }

    /// Short lookbacks keep raw daily points; long ones collapse to weeks.
    fn is_short(&self) -> bool {
        matches!(self, SparklinePeriod::OneMonth | SparklinePeriod::ThreeMonths)
    }
}

impl FromStr for SparklinePeriod {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "1m" => Ok(SparklinePeriod::OneMonth),
            "3m" => Ok(SparklinePeriod::ThreeMonths),
            "6m" => Ok(SparklinePeriod::SixMonths),
            "1y" => Ok(SparklinePeriod::OneYear),
            other => Err(AppError::message(format!(
                "Unknown sparkline period: {}",
                other
            ))),
        }
    }
}

/// One chart point: unix seconds and price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SparklinePoint {
    pub t: i64,
    pub p: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SparklineResponse {
    pub symbol: String,
    pub period: String,
    pub data: Vec<SparklinePoint>,
}

/// Cached compact chart series: fetches the raw daily window on a miss and
/// resamples it before storing.
#[derive(Clone)]
pub struct SparklineService {
    provider: Arc<dyn MarketDataProvider>,
    cache: Arc<ExpiringCache>,
}

impl SparklineService {
    pub fn new(provider: Arc<dyn MarketDataProvider>, cache: Arc<ExpiringCache>) -> Self {
        Self { provider, cache }
    }

    pub async fn sparkline(
        &self,
        symbol: &str,
        period: SparklinePeriod,
        max_points: usize,
    ) -> Result<SparklineResponse> {
        let key = format!(
            "{}_{}_{}",
            Category::Sparkline.key_for(symbol),
            period.as_str(),
            max_points
        );
        let window = chart_window(period);
        fetch_with_cache(&self.cache, Category::Sparkline, &key, async {
            let history = self.provider.chart(symbol, &window).await?;
            let data = resample(&history.quotes, period, max_points)?;
            Ok(SparklineResponse {
                symbol: symbol.to_string(),
                period: period.as_str().to_string(),
                data,
            })
        })
        .await
    }
}

/// Daily chart window covering the requested lookback, ending today.
fn chart_window(period: SparklinePeriod) -> ChartQuery {
    let today = Utc::now().date_naive();
    let start = today - Months::new(period.lookback_months());
    ChartQuery {
        interval: Some("1d".to_string()),
        period1: Some(start.format("%Y-%m-%d").to_string()),
        period2: Some(today.format("%Y-%m-%d").to_string()),
        range: None,
    }
}

/// Downsample a raw price series into a bounded, chronologically ordered
/// chart sequence.
///
/// Series that already fit are passed through unchanged. Oversized short
/// lookbacks keep only the most recent `max_points` (deliberate recency
/// bias). Oversized long lookbacks collapse to the last observation of
/// each ISO week; that path emits one point per distinct week and does not
/// re-apply the `max_points` cap.
pub fn resample(
    raw: &[ChartQuote],
    period: SparklinePeriod,
    max_points: usize,
) -> Result<Vec<SparklinePoint>> {
    let usable: Vec<(chrono::DateTime<Utc>, f64)> = raw
        .iter()
        .filter_map(|quote| quote.close.map(|close| (quote.date, close)))
        .collect();

    if usable.is_empty() {
        return Err(AppError::no_data("sparkline series"));
    }

    let mut points: Vec<SparklinePoint> = if usable.len() <= max_points {
        usable
            .iter()
            .map(|&(date, close)| SparklinePoint {
                t: date.timestamp(),
                p: close,
            })
            .collect()
    } else if period.is_short() {
        usable[usable.len() - max_points..]
            .iter()
            .map(|&(date, close)| SparklinePoint {
                t: date.timestamp(),
                p: close,
            })
            .collect()
    } else {
        // Last observation of each ISO week, in input order per week.
        let mut weeks: BTreeMap<i32, SparklinePoint> = BTreeMap::new();
        for &(date, close) in &usable {
            weeks.insert(
                iso_week_key(date.date_naive()),
                SparklinePoint {
                    t: date.timestamp(),
                    p: close,
                },
            );
        }
        weeks.into_values().collect()
    };

    points.sort_by_key(|point| point.t);
    Ok(points)
}

/// Year-qualified ISO week number, e.g. 2024-01-04 -> 202401. ISO weeks
/// are Thursday-anchored, so early-January dates can belong to the
/// previous year's final week.
pub fn iso_week_key(date: NaiveDate) -> i32 {
    let week = date.iso_week();
    week.year() * 100 + week.week() as i32
}
