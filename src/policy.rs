//! Logging gate policy
//!
//! Decides which request/response pairs produce a record. The default logs
//! everything; a method filter narrows that to an allow-set; a custom
//! predicate replaces the method policy entirely, the two are never
//! combined.

use actix_web::http::Method;
use std::collections::HashSet;
use std::sync::Arc;

use crate::record::{RequestSnapshot, ResponseSnapshot};

/// Method-based logging policy.
#[derive(Debug, Clone, Default)]
pub enum LoggingMethods {
    /// Log every request regardless of method
    #[default]
    All,
    /// Log only requests whose method is in the set
    Only(HashSet<Method>),
}

impl LoggingMethods {
    /// Restrict logging to the given methods.
    pub fn only<I>(methods: I) -> Self
    where
        I: IntoIterator<Item = Method>,
    {
        Self::Only(methods.into_iter().collect())
    }

    /// Whether a request with `method` falls under this policy.
    pub fn allows(&self, method: &Method) -> bool {
        match self {
            Self::All => true,
            Self::Only(methods) => methods.contains(method),
        }
    }
}

/// Custom gate predicate, evaluated against the request snapshot and the
/// finalized response. Configuring one bypasses the method policy for that
/// instance.
pub type ShouldLog = Arc<dyn Fn(&RequestSnapshot, &ResponseSnapshot) -> bool + Send + Sync>;
