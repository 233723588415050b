use hmac::digest::InvalidLength;
use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Validation Error: {0}")]
    Validation(String),

    #[error("Configuration Error: {0}")]
    Configuration(String),

    #[error("Upstream Error: storage responded {status}")]
    Upstream { status: StatusCode, body: String },

    #[error("Execute Request Error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Sign Error: {0}")]
    Sign(String),

    #[error("Decode Error: content is not valid base64: {0}")]
    Decode(#[from] base64::DecodeError),
}

impl From<InvalidLength> for Error {
    fn from(e: InvalidLength) -> Self {
        Self::Sign(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
