//! Log record assembly
//!
//! Defines the record handed to sinks, the plain-value snapshots of a
//! request and its response, and the builder that fills a record from the
//! two. Handler identity and the authenticated principal are read from
//! request extensions, where the host application or its auth middleware
//! deposits them.

use actix_web::http::{Method, StatusCode};
use actix_web::web::{Bytes, Query};
use actix_web::{HttpMessage, HttpRequest};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use uuid::Uuid;

use crate::address::resolve_remote_addr;
use crate::config::Config;
use crate::timer::RequestTimer;

/// Username recorded for requests with no authenticated principal.
pub const ANONYMOUS_USER: &str = "AnonymousUser";

/// One audit entry describing a handled request.
///
/// Either fully populated and handed to the sink exactly once, or never
/// constructed. Durability is the sink's responsibility.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LogRecord {
    /// Record identifier assigned at assembly time
    pub id: Uuid,

    /// Arrival timestamp of the request
    pub requested_at: DateTime<Utc>,

    /// Whole milliseconds between arrival and completion, never negative
    pub response_ms: u64,

    /// Normalized client address, or the raw source string if unparseable
    pub remote_addr: String,

    pub host: String,

    /// Request path, truncated to the configured maximum length
    pub path: String,

    pub method: String,

    /// Identity of the matched handler, if the application supplied one
    pub view: Option<String>,

    /// Handler action, or the lower-cased HTTP method when no action is known
    pub view_method: String,

    /// Opaque principal id, absent for anonymous callers
    pub user: Option<String>,

    /// Username snapshot, kept even if the principal is later deleted
    pub username_persistent: String,

    pub status_code: u16,

    /// Redacted query parameters
    pub query_params: Value,

    /// Captured request body text, empty when capture is disabled
    pub data: Value,

    /// Redacted response payload, null for streaming responses
    pub response: Value,

    /// Formatted error trace when request handling failed
    pub errors: Option<String>,
}

/// Authenticated principal, deposited into request extensions by the host
/// application's auth layer.
#[derive(Debug, Clone)]
pub struct Principal {
    pub id: String,
    pub username: String,
}

impl Principal {
    pub fn new(id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
        }
    }
}

/// Identity of the matched request handler, deposited into request
/// extensions by the handler or a routing adapter.
#[derive(Debug, Clone)]
pub struct HandlerMeta {
    pub module: String,
    pub name: String,
    /// Matched action name, when the handler distinguishes actions
    pub action: Option<String>,
}

impl HandlerMeta {
    pub fn new(module: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            name: name.into(),
            action: None,
        }
    }

    /// Derive module and name from a marker type.
    pub fn of<T: ?Sized>() -> Self {
        let full = std::any::type_name::<T>();
        match full.rsplit_once("::") {
            Some((module, name)) => Self::new(module, name),
            None => Self::new("", full),
        }
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    /// Fully qualified handler name.
    pub fn view_name(&self) -> String {
        if self.module.is_empty() {
            self.name.clone()
        } else {
            format!("{}::{}", self.module, self.name)
        }
    }
}

/// Plain-value snapshot of an incoming request, as shown to the logging
/// gate and the record builder.
///
/// Taken before the inner service runs; the framework request itself is
/// never retained across that call, since routing requires sole ownership
/// of the request's shared state. The extension payloads are re-read once
/// the handler has finished, because that is when handlers deposit them.
#[derive(Debug, Clone)]
pub struct RequestSnapshot {
    pub method: Method,
    pub path: String,
    pub host: String,
    pub query_string: String,
    /// Raw `X-Forwarded-For` header value, when present
    pub forwarded_for: Option<String>,
    /// Connection peer rendered as `ip:port` text
    pub peer_addr: Option<String>,
    pub meta: Option<HandlerMeta>,
    pub principal: Option<Principal>,
}

impl RequestSnapshot {
    /// Copy the fields the gate and the builder need out of the request.
    pub fn capture(req: &HttpRequest) -> Self {
        Self {
            method: req.method().clone(),
            path: req.path().to_string(),
            host: req.connection_info().host().to_string(),
            query_string: req.query_string().to_string(),
            forwarded_for: req
                .headers()
                .get("x-forwarded-for")
                .and_then(|value| value.to_str().ok())
                .map(str::to_owned),
            peer_addr: req.peer_addr().map(|addr| addr.to_string()),
            meta: req.extensions().get::<HandlerMeta>().cloned(),
            principal: req.extensions().get::<Principal>().cloned(),
        }
    }

    /// Re-read the extension payloads from `req`.
    pub fn refresh_extensions(&mut self, req: &HttpRequest) {
        let extensions = req.extensions();
        self.meta = extensions.get::<HandlerMeta>().cloned();
        self.principal = extensions.get::<Principal>().cloned();
    }
}

/// Status and body of a finalized response, as shown to the logging gate
/// and the record builder. `body` is `None` for streaming responses.
#[derive(Debug, Clone)]
pub struct ResponseSnapshot {
    pub status: StatusCode,
    pub body: Option<Bytes>,
}

impl ResponseSnapshot {
    /// Lossily decoded body text, `None` for streaming responses.
    pub fn body_text(&self) -> Option<String> {
        self.body
            .as_ref()
            .map(|body| String::from_utf8_lossy(body).into_owned())
    }
}

/// Assembles [`LogRecord`]s from finished request/response pairs.
pub struct RecordBuilder<'a> {
    config: &'a Config,
}

impl<'a> RecordBuilder<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// Build the record for one request. `now` is the completion instant
    /// used for the elapsed-time computation.
    pub fn assemble(
        &self,
        request: &RequestSnapshot,
        timer: &RequestTimer,
        data: String,
        outcome: &ResponseSnapshot,
        errors: Option<String>,
        now: DateTime<Utc>,
    ) -> LogRecord {
        let redactor = self.config.redactor();

        let remote_addr = resolve_remote_addr(
            request.forwarded_for.as_deref(),
            request.peer_addr.as_deref(),
        );

        let method = request.method.as_str().to_string();
        let view_method = request
            .meta
            .as_ref()
            .and_then(|meta| meta.action.clone())
            .unwrap_or_else(|| method.to_lowercase());

        let query_params =
            match Query::<HashMap<String, String>>::from_query(&request.query_string) {
                Ok(params) => {
                    let map: Map<String, Value> = params
                        .into_inner()
                        .into_iter()
                        .map(|(key, value)| (key, Value::String(value)))
                        .collect();
                    redactor.clean(Value::Object(map))
                }
                Err(_) => Value::Object(Map::new()),
            };

        let response = match &outcome.body {
            Some(body) => redactor.clean_body(body),
            None => Value::Null,
        };

        LogRecord {
            id: Uuid::new_v4(),
            requested_at: timer.started_at(),
            response_ms: timer.elapsed_ms(now),
            remote_addr,
            host: request.host.clone(),
            path: request
                .path
                .chars()
                .take(self.config.path_length)
                .collect(),
            method,
            view: request.meta.as_ref().map(HandlerMeta::view_name),
            view_method,
            user: request
                .principal
                .as_ref()
                .map(|principal| principal.id.clone()),
            username_persistent: request
                .principal
                .as_ref()
                .map(|principal| principal.username.clone())
                .unwrap_or_else(|| ANONYMOUS_USER.to_string()),
            status_code: outcome.status.as_u16(),
            query_params,
            data: Value::String(data),
            response,
            errors,
        }
    }
}
