//! Log sinks
//!
//! A sink is the external collaborator that stores records. The middleware
//! treats persistence as fire-and-forget: a failed persist call is logged
//! to the diagnostic channel and dropped, it never reaches the response
//! path.

use async_trait::async_trait;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::warn;

use crate::error::SinkError;
use crate::record::LogRecord;

/// Destination for assembled records.
///
/// `persist` receives the record by value: it is handed over exactly once
/// and the middleware keeps no copy.
#[async_trait]
pub trait LogSink: Send + Sync {
    async fn persist(&self, record: LogRecord) -> Result<(), SinkError>;
}

/// In-memory sink backed by a shared vector.
///
/// Clones share the same storage, so one handle can be installed in the
/// middleware while another inspects what was recorded.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    records: Arc<Mutex<Vec<LogRecord>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far.
    pub fn records(&self) -> Vec<LogRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl LogSink for MemorySink {
    async fn persist(&self, record: LogRecord) -> Result<(), SinkError> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record);
        Ok(())
    }
}

/// Sink that drops every record.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

#[async_trait]
impl LogSink for NullSink {
    async fn persist(&self, _record: LogRecord) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Hand `record` to the sink; a failure is logged and swallowed.
pub(crate) async fn dispatch(sink: &dyn LogSink, record: LogRecord) {
    if let Err(err) = sink.persist(record).await {
        warn!(error = %err, "request log dropped by sink");
    }
}
