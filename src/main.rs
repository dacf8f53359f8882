mod cli;

use std::sync::Arc;

use clap::Parser;
use env_logger::Env;
use serde::Serialize;

use etf_cli::cache::ExpiringCache;
use etf_cli::error::Result;
use etf_cli::provider::YahooProvider;
use etf_cli::records;
use etf_cli::services::{HistoryQuery, Services, SparklinePeriod};
use etf_cli::utils::current_human_timestamp;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let provider = Arc::new(YahooProvider::new()?);
    let cache = Arc::new(ExpiringCache::new());
    let services = Services::new(provider, cache);

    match cli.command {
        Commands::Search { query } => {
            print_json(&services.search.search(&query).await?)?;
        }
        Commands::Info { symbol } => {
            print_json(&services.core.info(&symbol).await?)?;
        }
        Commands::Price { symbol } => {
            print_json(&services.core.price(&symbol).await?)?;
        }
        Commands::History {
            symbol,
            from,
            to,
            range,
            interval,
            out,
        } => {
            let query = HistoryQuery {
                interval: Some(interval),
                from,
                to,
                range,
            };
            let history = services.history.history(&symbol, &query).await?;
            match out {
                Some(path) => {
                    records::save_history_csv(&path, &history.quotes)?;
                    println!(
                        "Saved {} candles for {} to {} on {}.",
                        history.quotes.len(),
                        symbol,
                        path,
                        current_human_timestamp()
                    );
                }
                None => print_json(&history)?,
            }
        }
        Commands::Dividends { symbol } => {
            print_json(&services.history.dividends(&symbol).await?)?;
        }
        Commands::Sparkline {
            symbol,
            period,
            points,
        } => {
            let period = period.parse::<SparklinePeriod>()?;
            let sparkline = services
                .sparkline
                .sparkline(&symbol, period, points as usize)
                .await?;
            print_json(&sparkline)?;
        }
        Commands::News { symbol } => {
            print_json(&services.reports.news(&symbol).await?)?;
        }
        Commands::Holdings { symbol } => {
            print_json(&services.insights.holdings(&symbol).await?)?;
        }
        Commands::Insights { symbol } => {
            print_json(&services.insights.insights(&symbol).await?)?;
        }
        Commands::Recommendations { symbol } => {
            print_json(&services.insights.recommendations(&symbol).await?)?;
        }
        Commands::Featured => {
            print_json(&services.discover.featured().await?)?;
        }
        Commands::Report { symbol } => {
            print_json(&services.reports.full_report(&symbol).await?)?;
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
