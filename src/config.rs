//! Middleware configuration
//!
//! Configuration is an explicit object handed to the middleware at
//! construction time, one per wrapped app or scope. The builder validates
//! fail-fast rules, so a misconfigured middleware cannot be constructed at
//! all. Environment loading covers the process-wide switches; per-instance
//! policy goes through the builder.

use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::error::ConfigError;
use crate::policy::{LoggingMethods, ShouldLog};
use crate::record::{RequestSnapshot, ResponseSnapshot};
use crate::redact::{Redactor, DEFAULT_CLEANED_SUBSTITUTE};

/// Default maximum number of path characters kept on a record.
pub const DEFAULT_PATH_LENGTH: usize = 200;

const ENV_DECODE_REQUEST_BODY: &str = "APITRAIL_DECODE_REQUEST_BODY";
const ENV_PATH_LENGTH: &str = "APITRAIL_PATH_LENGTH";

/// Configuration for one middleware instance.
///
/// Build with [`Config::builder`]:
///
/// ```
/// use actix_web::http::Method;
/// use apitrail_actix::{Config, LoggingMethods};
///
/// let config = Config::builder()
///     .logging_methods(LoggingMethods::only([Method::POST]))
///     .sensitive_field("token")
///     .build()
///     .unwrap();
/// assert_eq!(config.cleaned_substitute(), "********");
/// ```
///
/// [`Config::from_env`] additionally reads the process-wide switches:
///
/// - `APITRAIL_DECODE_REQUEST_BODY`: "true"/"1"/"yes" to capture request bodies
/// - `APITRAIL_PATH_LENGTH`: maximum path characters kept on a record
#[derive(Clone)]
pub struct Config {
    /// Whether request bodies are captured
    pub decode_request_body: bool,

    /// Maximum path characters kept on a record
    pub path_length: usize,

    /// Method-based logging policy
    pub logging_methods: LoggingMethods,

    redactor: Redactor,
    should_log: Option<ShouldLog>,
}

impl Config {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Defaults overlaid with the process-wide environment switches.
    ///
    /// An unparseable value is a loud error: configuration problems surface
    /// at startup, never at request time.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        if let Ok(value) = std::env::var(ENV_DECODE_REQUEST_BODY) {
            let decode = matches!(value.to_lowercase().as_str(), "true" | "1" | "yes");
            builder = builder.decode_request_body(decode);
        }

        if let Ok(value) = std::env::var(ENV_PATH_LENGTH) {
            match value.parse::<usize>() {
                Ok(length) => builder = builder.path_length(length),
                Err(_) => {
                    return Err(ConfigError::InvalidEnv {
                        name: ENV_PATH_LENGTH.to_string(),
                        value,
                    })
                }
            }
        }

        builder.build()
    }

    /// Wrap config in Arc for sharing across workers.
    pub fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Gate decision for one request/response pair.
    ///
    /// A custom predicate replaces the method policy entirely; otherwise the
    /// method policy decides.
    pub fn should_log(&self, request: &RequestSnapshot, outcome: &ResponseSnapshot) -> bool {
        match &self.should_log {
            Some(predicate) => predicate(request, outcome),
            None => self.logging_methods.allows(&request.method),
        }
    }

    /// The marker stored in place of redacted values.
    pub fn cleaned_substitute(&self) -> &str {
        self.redactor.substitute()
    }

    pub(crate) fn redactor(&self) -> &Redactor {
        &self.redactor
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            decode_request_body: true,
            path_length: DEFAULT_PATH_LENGTH,
            logging_methods: LoggingMethods::All,
            redactor: Redactor::default(),
            should_log: None,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("decode_request_body", &self.decode_request_body)
            .field("path_length", &self.path_length)
            .field("logging_methods", &self.logging_methods)
            .field("redactor", &self.redactor)
            .field("custom_should_log", &self.should_log.is_some())
            .finish()
    }
}

/// Builder for [`Config`]; validation happens in [`build`](Self::build).
#[derive(Default)]
pub struct ConfigBuilder {
    decode_request_body: Option<bool>,
    path_length: Option<usize>,
    logging_methods: LoggingMethods,
    sensitive_fields: HashSet<String>,
    cleaned_substitute: Option<Value>,
    should_log: Option<ShouldLog>,
}

impl ConfigBuilder {
    /// Capture request bodies. Defaults to true.
    pub fn decode_request_body(mut self, decode: bool) -> Self {
        self.decode_request_body = Some(decode);
        self
    }

    /// Maximum path characters kept on a record. Defaults to 200.
    pub fn path_length(mut self, length: usize) -> Self {
        self.path_length = Some(length);
        self
    }

    /// Method-based logging policy. Defaults to logging everything.
    pub fn logging_methods(mut self, methods: LoggingMethods) -> Self {
        self.logging_methods = methods;
        self
    }

    /// Mark one extra field name as sensitive, case-insensitively.
    pub fn sensitive_field(mut self, field: impl Into<String>) -> Self {
        self.sensitive_fields.insert(field.into());
        self
    }

    /// Mark extra field names as sensitive, case-insensitively.
    pub fn sensitive_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sensitive_fields
            .extend(fields.into_iter().map(Into::into));
        self
    }

    /// Marker stored in place of redacted values. Must be a JSON string;
    /// anything else fails [`build`](Self::build).
    pub fn cleaned_substitute(mut self, marker: impl Into<Value>) -> Self {
        self.cleaned_substitute = Some(marker.into());
        self
    }

    /// Custom gate predicate over the request snapshot and the finalized
    /// response. Replaces the method policy entirely for this instance.
    pub fn should_log<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&RequestSnapshot, &ResponseSnapshot) -> bool + Send + Sync + 'static,
    {
        self.should_log = Some(Arc::new(predicate));
        self
    }

    /// Validate and produce the configuration.
    pub fn build(self) -> Result<Config, ConfigError> {
        let substitute = match self.cleaned_substitute {
            None => DEFAULT_CLEANED_SUBSTITUTE.to_string(),
            Some(Value::String(marker)) => marker,
            Some(other) => return Err(ConfigError::NonStringSubstitute(other)),
        };

        Ok(Config {
            decode_request_body: self.decode_request_body.unwrap_or(true),
            path_length: self.path_length.unwrap_or(DEFAULT_PATH_LENGTH),
            logging_methods: self.logging_methods,
            redactor: Redactor::new(self.sensitive_fields, substitute),
            should_log: self.should_log,
        })
    }
}
