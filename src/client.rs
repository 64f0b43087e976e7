//! HTTP forwarding sink
//!
//! Reference [`LogSink`] that POSTs each record as JSON to a collector
//! endpoint. Connection and serialization problems come back as
//! [`SinkError`]; the middleware's dispatch layer decides what to do with
//! them.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::error::SinkError;
use crate::record::LogRecord;
use crate::sink::LogSink;

/// Sink that forwards records to an HTTP collector.
#[derive(Debug, Clone)]
pub struct HttpSink {
    endpoint: String,
    api_key: Option<String>,
    client: Client,
}

impl HttpSink {
    /// Sink posting to `endpoint`. The underlying client is built once,
    /// with a 5 second request timeout.
    pub fn new(endpoint: impl Into<String>) -> Result<Self, SinkError> {
        let client = Client::builder().timeout(Duration::from_secs(5)).build()?;

        Ok(Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            api_key: None,
            client,
        })
    }

    /// Authenticate requests to the collector with a bearer token.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }
}

#[async_trait]
impl LogSink for HttpSink {
    async fn persist(&self, record: LogRecord) -> Result<(), SinkError> {
        let mut request = self.client.post(&self.endpoint).json(&record);
        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            return Err(SinkError::Rejected(response.status()));
        }

        Ok(())
    }
}
