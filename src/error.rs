use thiserror::Error;

/// Errors raised while setting up a router or parsing caller input.
///
/// Wire-level failures never surface here: the router reports them through
/// the response and reason codes of a `GatewayResponse`.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Config parse error: {0}")]
    ConfigParseError(#[from] toml::de::Error),
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
    #[error("Invalid field argument: {0}")]
    InvalidField(String),
    #[error("HTTP client error: {0}")]
    HttpClientError(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, GatewayError>;
