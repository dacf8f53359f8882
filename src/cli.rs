use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "etf-cli")]
#[command(about = "Fetch cached ETF market data: quotes, history, fundamentals and news")]
#[command(version = "0.1.0")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search instruments by name or symbol
    Search {
        query: String,
    },

    /// Detailed profile for a symbol
    Info {
        symbol: String,
    },

    /// Current quote for a symbol
    Price {
        symbol: String,
    },

    /// Historical candles for a symbol
    History {
        symbol: String,

        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// End date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,

        /// Provider range such as 1mo, 6mo, 1y or max
        #[arg(long)]
        range: Option<String>,

        /// Bar interval such as 1d, 1wk or an intraday 1m/5m/1h
        #[arg(long, default_value = "1d")]
        interval: String,

        /// Write the candles to a CSV file instead of printing JSON
        #[arg(long)]
        out: Option<String>,
    },

    /// Full dividend history for a symbol
    Dividends {
        symbol: String,
    },

    /// Compact chart series for a symbol
    Sparkline {
        symbol: String,

        /// Lookback window: 1m, 3m, 6m or 1y
        #[arg(long, default_value = "1m")]
        period: String,

        /// Maximum points in the series
        #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u16).range(30..=100))]
        points: u16,
    },

    /// Recent news for a symbol
    News {
        symbol: String,
    },

    /// Fund holdings and performance for a symbol
    Holdings {
        symbol: String,
    },

    /// Research insights for a symbol
    Insights {
        symbol: String,
    },

    /// Analyst recommendations for a symbol
    Recommendations {
        symbol: String,
    },

    /// Quotes for the featured list
    Featured,

    /// Consolidated report for a symbol
    Report {
        symbol: String,
    },
}
