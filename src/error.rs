use thiserror::Error;

pub use anyhow::Context;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),
    #[error(transparent)]
    Chrono(#[from] chrono::ParseError),
    #[error(transparent)]
    Join(#[from] tokio::task::JoinError),
    #[error("upstream request failed: {0}")]
    Upstream(String),
    #[error("no data available for {0}")]
    NoData(String),
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AppError {
    pub fn message<T: Into<String>>(msg: T) -> Self {
        AppError::Message(msg.into())
    }

    pub fn upstream<T: Into<String>>(msg: T) -> Self {
        AppError::Upstream(msg.into())
    }

    pub fn no_data<T: Into<String>>(subject: T) -> Self {
        AppError::NoData(subject.into())
    }

    /// True for the client-visible "nothing to chart" condition, distinct
    /// from an upstream failure.
    pub fn is_no_data(&self) -> bool {
        matches!(self, AppError::NoData(_))
    }
}
