use std::path::Path;

use chrono::{DateTime, Utc};

use crate::error::{Context, Result};
use crate::provider::ChartQuote;

const HISTORY_HEADER: &[&str] = &["date", "open", "high", "low", "close", "adjclose", "volume"];

/// Persist fetched candles to disk so a chart can be reloaded without
/// refetching. Missing fields are written as empty columns.
pub fn save_history_csv<P: AsRef<Path>>(file_path: P, quotes: &[ChartQuote]) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(file_path.as_ref()).context("Failed to create CSV writer")?;

    writer.write_record(HISTORY_HEADER)?;

    for quote in quotes {
        writer.write_record(&[
            quote.date.to_rfc3339(),
            float_field(quote.open),
            float_field(quote.high),
            float_field(quote.low),
            float_field(quote.close),
            float_field(quote.adjclose),
            quote.volume.map(|v| v.to_string()).unwrap_or_default(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

/// Load a snapshot produced by `save_history_csv` back into memory.
pub fn load_history_csv<P: AsRef<Path>>(file_path: P) -> Result<Vec<ChartQuote>> {
    let mut reader =
        csv::Reader::from_path(file_path.as_ref()).context("Failed to open CSV file")?;

    let mut quotes = Vec::new();
    for result in reader.records() {
        let record = result.context("Failed to read history record")?;

        let Some(date_field) = record.get(0) else {
            continue;
        };
        let date = DateTime::parse_from_rfc3339(date_field)
            .with_context(|| format!("Invalid date in history record: {}", date_field))?
            .with_timezone(&Utc);

        let float_at = |idx: usize| {
            record
                .get(idx)
                .filter(|field| !field.is_empty())
                .and_then(|field| field.parse::<f64>().ok())
        };

        quotes.push(ChartQuote {
            date,
            open: float_at(1),
            high: float_at(2),
            low: float_at(3),
            close: float_at(4),
            adjclose: float_at(5),
            volume: record
                .get(6)
                .filter(|field| !field.is_empty())
                .and_then(|field| field.parse::<u64>().ok()),
        });
    }

    Ok(quotes)
}

fn float_field(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use std::fs;

    use chrono::TimeZone;

    use super::*;

    #[test]
    fn history_round_trips_through_csv() {
        let quotes = vec![
            ChartQuote {
                date: Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap(),
                open: Some(469.2),
                high: Some(470.0),
                low: Some(468.1),
                close: Some(469.9),
                adjclose: Some(469.9),
                volume: Some(71_200_000),
            },
            ChartQuote {
                date: Utc.with_ymd_and_hms(2024, 1, 3, 0, 0, 0).unwrap(),
                open: None,
                high: None,
                low: None,
                close: None,
                adjclose: None,
                volume: None,
            },
        ];

        let path = std::env::temp_dir().join("etf_cli_history_roundtrip.csv");
        save_history_csv(&path, &quotes).unwrap();
        let loaded = load_history_csv(&path).unwrap();
        let _ = fs::remove_file(&path);

        assert_eq!(loaded, quotes);
    }
}
