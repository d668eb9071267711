use crate::domain::ports::{Endpoint, Transport, TransportError};
use crate::domain::response::RESPONSE_ROOT;
use async_trait::async_trait;
use quick_xml::escape::partial_escape;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Mutex;

/// One request seen by a [`ScriptedTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub endpoint: Endpoint,
    pub body: String,
}

/// An in-memory transport that plays back scripted replies in order.
///
/// Every call is recorded so the sequence of hosts and request bodies can be
/// inspected afterwards. Clones share the same script and call log, which
/// lets a test keep a handle while the router owns another.
#[derive(Debug, Default, Clone)]
pub struct ScriptedTransport {
    replies: Arc<Mutex<VecDeque<Result<String, TransportError>>>>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl ScriptedTransport {
    /// Creates a transport that answers with `replies`, one per call.
    ///
    /// Once the script runs out every further call is refused.
    pub fn new<I>(replies: I) -> Self
    where
        I: IntoIterator<Item = Result<String, TransportError>>,
    {
        Self {
            replies: Arc::new(Mutex::new(replies.into_iter().collect())),
            calls: Arc::default(),
        }
    }

    /// Appends a reply to the end of the script.
    pub async fn push(&self, reply: Result<String, TransportError>) {
        self.replies.lock().await.push_back(reply);
    }

    pub async fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().await.clone()
    }

    /// Hosts contacted so far, in call order.
    pub async fn hosts(&self) -> Vec<String> {
        self.calls
            .lock()
            .await
            .iter()
            .map(|call| call.endpoint.host.clone())
            .collect()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn post(&self, endpoint: &Endpoint, body: &str) -> Result<String, TransportError> {
        self.calls.lock().await.push(RecordedCall {
            endpoint: endpoint.clone(),
            body: body.to_string(),
        });
        self.replies
            .lock()
            .await
            .pop_front()
            .unwrap_or(Err(TransportError::ConnectionRefused))
    }
}

/// Renders a gateway reply document from field pairs.
pub fn render_response(fields: &[(&str, &str)]) -> String {
    let mut xml = format!("<{RESPONSE_ROOT}>");
    for (key, value) in fields {
        xml.push_str(&format!("<{key}>{}</{key}>", partial_escape(*value)));
    }
    xml.push_str(&format!("</{RESPONSE_ROOT}>"));
    xml
}
