use crate::domain::ports::{Endpoint, Transport, TransportError};
use crate::error::Result;
use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;
use tracing::instrument;

const XML_CONTENT_TYPE: &str = "text/xml";

/// Posts serialized requests over HTTP(S) with reqwest.
///
/// The shared client is built with the configured connect timeout. An
/// endpoint asking for a different connect timeout gets a one-off client;
/// read timeouts are applied per request.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    connect_timeout: Duration,
}

impl HttpTransport {
    /// Creates a transport whose pooled client uses `connect_timeout`.
    pub fn new(connect_timeout: Duration) -> Result<Self> {
        let client = Self::build_client(connect_timeout)?;
        Ok(Self {
            client,
            connect_timeout,
        })
    }

    fn build_client(connect_timeout: Duration) -> reqwest::Result<Client> {
        Client::builder().connect_timeout(connect_timeout).build()
    }

    fn client_for(&self, endpoint: &Endpoint) -> std::result::Result<Client, TransportError> {
        if endpoint.connect_timeout == self.connect_timeout {
            return Ok(self.client.clone());
        }
        Self::build_client(endpoint.connect_timeout).map_err(classify)
    }
}

fn classify(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else if err.is_connect() {
        TransportError::ConnectionRefused
    } else {
        TransportError::Other(err.to_string())
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[instrument(skip(self, body), fields(url = %endpoint))]
    async fn post(
        &self,
        endpoint: &Endpoint,
        body: &str,
    ) -> std::result::Result<String, TransportError> {
        let response = self
            .client_for(endpoint)?
            .post(endpoint.url())
            .header(CONTENT_TYPE, XML_CONTENT_TYPE)
            .timeout(endpoint.read_timeout)
            .body(body.to_string())
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Other(format!("unexpected HTTP status {status}")));
        }
        response.text().await.map_err(classify)
    }
}
