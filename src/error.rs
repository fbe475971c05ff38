use thiserror::Error;

/// Application error types.
#[derive(Error, Debug)]
pub enum AppError {
    /// Not enough bars, an empty provider response, or a failed fetch.
    #[error("Data unavailable: {0}")]
    DataUnavailable(String),

    /// Non-finite input or output in the indicator/scoring pipeline.
    #[error("Computation error: {0}")]
    Computation(String),

    /// The messaging collaborator rejected or failed to send a payload.
    #[error("Delivery failure: {0}")]
    Delivery(String),

    #[error("External API error: {0}")]
    ExternalApi(String),

    #[error("Configuration error: {0}")]
    Config(String),

    /// Always stored without its request URL, which can carry credentials.
    #[error(transparent)]
    Reqwest(reqwest::Error),

    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),
}

impl AppError {
    /// Short machine-friendly kind, used in logs and error notices.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::DataUnavailable(_) => "data_unavailable",
            AppError::Computation(_) => "computation",
            AppError::Delivery(_) => "delivery",
            AppError::ExternalApi(_) => "external_api",
            AppError::Config(_) => "config",
            AppError::Reqwest(_) => "http",
            AppError::SerdeJson(_) => "decode",
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Reqwest(err.without_url())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
