use thiserror::Error;

#[derive(Debug, Error)]
pub enum StepsError {
    #[error("no Flow SID")]
    MissingArgument,

    #[error("missing environment variable TWILIO_ACCOUNT_SID and/or TWILIO_AUTH_TOKEN")]
    MissingCredentials,

    #[error("invalid timezone: {0}")]
    UnknownTimeZone(String),

    #[error("invalid date/time: {0}")]
    InvalidDateTime(String),

    #[error("end date/time is before start date/time")]
    InvertedRange,

    #[error("unable to get Flow {flow}: {reason}")]
    RemoteFetchFailure { flow: String, reason: String },

    #[error("API request failed with HTTP {status}: {message}")]
    Api { status: u16, message: String },

    #[error("unexpected API response: {0}")]
    UnexpectedResponse(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StepsError>;
