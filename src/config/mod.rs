use chrono::Duration;

/// Symbols served by the featured-list endpoint.
pub const FEATURED_SYMBOLS: &[&str] = &[
    "ESGV", "QQQM", "FTEC", "SOXQ", "VGK", "IAUM", "KOMP", "EPP",
];

/// Data categories served by the cache-aside layer. Each category owns its
/// TTL, its log label and its cache-key prefix; the table is builtin and
/// read-only at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Search,
    Price,
    Info,
    History,
    Dividends,
    Recommendations,
    Insights,
    Holdings,
    News,
    FullReport,
    FeaturedList,
    Sparkline,
}

impl Category {
    /// How long a fresh entry of this category stays servable.
    pub fn ttl(&self) -> Duration {
        match self {
            Category::Search => Duration::minutes(5),
            Category::Price => Duration::seconds(60),
            Category::Info => Duration::hours(24),
            Category::History => Duration::hours(1),
            Category::Dividends => Duration::hours(1),
            Category::Recommendations => Duration::hours(1),
            Category::Insights => Duration::hours(24),
            Category::Holdings => Duration::hours(24),
            Category::News => Duration::minutes(15),
            Category::FullReport => Duration::seconds(30),
            Category::FeaturedList => Duration::hours(1),
            Category::Sparkline => Duration::hours(1),
        }
    }

    /// Short human-readable TTL used in cache log lines.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Search => "5m",
            Category::Price => "60s",
            Category::Info => "24h",
            Category::History => "1h",
            Category::Dividends => "1h",
            Category::Recommendations => "1h",
            Category::Insights => "24h",
            Category::Holdings => "24h",
            Category::News => "15m",
            Category::FullReport => "30s",
            Category::FeaturedList => "1h",
            Category::Sparkline => "1h",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Category::Search => "Search",
            Category::Price => "Price",
            Category::Info => "Info",
            Category::History => "History",
            Category::Dividends => "Dividends",
            Category::Recommendations => "Recommendations",
            Category::Insights => "Insights",
            Category::Holdings => "Holdings",
            Category::News => "News",
            Category::FullReport => "Full Report",
            Category::FeaturedList => "Featured List",
            Category::Sparkline => "Sparkline",
        }
    }

    fn key_prefix(&self) -> &'static str {
        match self {
            Category::Search => "etf_search",
            Category::Price => "etf_price",
            Category::Info => "etf_info",
            Category::History => "etf_history",
            Category::Dividends => "etf_dividends",
            Category::Recommendations => "etf_recommendations",
            Category::Insights => "etf_insights",
            Category::Holdings => "etf_holdings",
            Category::News => "etf_news",
            Category::FullReport => "etf_full_report",
            Category::FeaturedList => "etf_featured_list",
            Category::Sparkline => "etf_sparkline",
        }
    }

    /// Cache key for a subject-scoped entry. Categories without a subject
    /// (the featured list) use the bare prefix.
    pub fn key_for(&self, subject: &str) -> String {
        if subject.is_empty() {
            self.key_prefix().to_string()
        } else {
            format!("{}_{}", self.key_prefix(), subject)
        }
    }
}
