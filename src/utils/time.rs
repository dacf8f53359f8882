use chrono::{Local, Utc};

/// Today's calendar date in the provider's `YYYY-MM-DD` query format.
pub fn today_string() -> String {
    Utc::now().date_naive().format("%Y-%m-%d").to_string()
}

pub fn current_human_timestamp() -> String {
    Local::now().format("%Y-%m-%d %H:%M").to_string()
}
