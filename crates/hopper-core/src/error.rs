use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Classifier transport error: status {status}: {body}")]
    ClassifierTransport { status: u16, body: String },

    #[error("Classifier parse error: {0}")]
    ClassifierParse(#[from] serde_json::Error),

    #[error("Classifier returned no content")]
    ClassifierEmptyResponse,

    #[error("Cache read error: {0}")]
    CacheRead(String),

    #[error("Cache write error: {0}")]
    CacheWrite(String),

    #[error("Invalid or missing API key")]
    InvalidApiKey,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
