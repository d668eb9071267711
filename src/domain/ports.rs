use async_trait::async_trait;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

use crate::domain::outcome::{REASON_BUGCHECK, REASON_RESPONSE_READ_TIMEOUT, REASON_UNABLE_TO_CONNECT};

/// Where a single request is sent, resolved once per call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub protocol: String,
    pub host: String,
    pub port: u16,
    pub path: String,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
}

impl Endpoint {
    pub fn url(&self) -> String {
        format!("{}://{}:{}{}", self.protocol, self.host, self.port, self.path)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url())
    }
}

/// Failures while talking to one host. All of them are failover eligible.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("connection refused")]
    ConnectionRefused,
    #[error("timed out waiting for response")]
    Timeout,
    #[error("{0}")]
    Other(String),
}

impl TransportError {
    /// Reason code reported for this failure.
    pub fn reason_code(&self) -> &'static str {
        match self {
            TransportError::ConnectionRefused => REASON_UNABLE_TO_CONNECT,
            TransportError::Timeout => REASON_RESPONSE_READ_TIMEOUT,
            TransportError::Other(_) => REASON_BUGCHECK,
        }
    }
}

/// Posts a serialized request to one host and returns the raw reply.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post(&self, endpoint: &Endpoint, body: &str) -> Result<String, TransportError>;
}

/// Picks where an untargeted host list starts.
pub trait HostRotation: Send + Sync {
    /// Returns a start index in `0..len`. Only called with `len > 1`.
    fn start_index(&self, len: usize) -> usize;
}

pub type TransportBox = Box<dyn Transport>;

#[async_trait]
impl<T: Transport + ?Sized> Transport for Box<T> {
    async fn post(&self, endpoint: &Endpoint, body: &str) -> Result<String, TransportError> {
        (**self).post(endpoint, body).await
    }
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    async fn post(&self, endpoint: &Endpoint, body: &str) -> Result<String, TransportError> {
        (**self).post(endpoint, body).await
    }
}
