//! # ApiTrail Actix SDK
//!
//! Per-request audit logging middleware for Actix-Web applications.
//!
//! This SDK watches every request passing through a wrapped app or scope and
//! hands one structured record per request to a pluggable sink. It's designed
//! with these principles:
//!
//! - **Transparent**: The response reaching the client is exactly what the
//!   handler produced, logged or not
//! - **Fail-safe**: A sink that errors out is logged and ignored, it never
//!   interrupts request handling
//! - **Selective**: Method filters and custom predicates decide per request
//!   whether a record is kept, after the outcome is known
//! - **Redacting**: Sensitive field names are replaced with a substitute
//!   marker before anything leaves the process
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use actix_web::{App, HttpServer, web, HttpResponse};
//! use apitrail_actix::{ApiTrailMiddleware, MemorySink};
//!
//! #[actix_web::main]
//! async fn main() -> std::io::Result<()> {
//!     let sink = MemorySink::new();
//!
//!     HttpServer::new(move || {
//!         App::new()
//!             .wrap(ApiTrailMiddleware::new(sink.clone()))
//!             .service(web::resource("/").to(|| async {
//!                 HttpResponse::Ok().body("Hello!")
//!             }))
//!     })
//!     .bind("0.0.0.0:8080")?
//!     .run()
//!     .await
//! }
//! ```
//!
//! ## Configuration
//!
//! Defaults come from [`Config::default`], optionally overridden by
//! environment variables via [`Config::from_env`]:
//!
//! - `APITRAIL_DECODE_REQUEST_BODY`: capture request bodies (`true`/`false`)
//! - `APITRAIL_PATH_LENGTH`: maximum recorded path length in characters
//!
//! Everything else (method filters, sensitive fields, the substitute marker,
//! custom predicates) is set through [`Config::builder`].
//!
//! ## How It Works
//!
//! 1. The timer starts and, when enabled, the request body is captured and
//!    restored for the handler
//! 2. The request passes through to your handlers unchanged
//! 3. The response body is buffered into a snapshot (streaming responses are
//!    passed through unbuffered)
//! 4. The logging gate runs with the full outcome in hand; filtered requests
//!    cost nothing further
//! 5. The assembled record is handed to the sink; sink errors are logged to
//!    the diagnostic channel and dropped
//!
//! ## Architecture
//!
//! The SDK is structured into focused modules:
//!
//! - `middleware`: Actix-Web middleware implementation
//! - `config`: Configuration, builder, and environment loading
//! - `policy`: Method filters and the custom gate predicate
//! - `record`: The log record and its assembly from a finished exchange
//! - `redact`: Sensitive-field replacement and nested-literal cleaning
//! - `sink`: The persistence trait plus in-memory and null sinks
//! - `client`: HTTP sink for forwarding records to a collector service
//! - `address`: Client address resolution from forwarding headers
//! - `timer`: Request duration measurement
//! - `error`: Custom error types for clean error handling

pub mod address;
pub mod client;
pub mod config;
pub mod error;
pub mod middleware;
pub mod policy;
pub mod record;
pub mod redact;
pub mod sink;
pub mod timer;

mod request_body_capture;
mod response_body_capture;

// Re-export main components for easy access
pub use client::HttpSink;
pub use config::{Config, ConfigBuilder};
pub use error::{ConfigError, SinkError};
pub use middleware::ApiTrailMiddleware;
pub use policy::{LoggingMethods, ShouldLog};
pub use record::{
    HandlerMeta, LogRecord, Principal, RequestSnapshot, ResponseSnapshot, ANONYMOUS_USER,
};
pub use redact::{Redactor, DEFAULT_CLEANED_SUBSTITUTE, SENSITIVE_FIELDS};
pub use sink::{LogSink, MemorySink, NullSink};

/// Convenience prelude for importing common types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::middleware::ApiTrailMiddleware;
    pub use crate::record::LogRecord;
    pub use crate::sink::{LogSink, MemorySink};
}
