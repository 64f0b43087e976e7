//! Actix-Web middleware that records request audit trails
//!
//! Wraps an app or scope, watches every request passing through, and hands
//! one [`LogRecord`] per logged request to the configured sink. The
//! response returned to the client is byte-identical to what the handler
//! produced, whether or not a record was emitted.
//!
//! Per request, in order: the timer starts, the request body is captured
//! (when enabled) and restored, the inner service runs, the response body
//! is buffered into a snapshot, the gate decides, and on a positive
//! decision the assembled record is dispatched to the sink.

use actix_web::{
    body::{BoxBody, MessageBody},
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error,
};
use chrono::Utc;
use futures::future::{ok, LocalBoxFuture, Ready};
use std::rc::Rc;
use std::sync::Arc;

use crate::config::Config;
use crate::record::{RecordBuilder, RequestSnapshot, ResponseSnapshot};
use crate::request_body_capture::capture_request_body;
use crate::response_body_capture::capture_response_body;
use crate::sink::{dispatch, LogSink};
use crate::timer::RequestTimer;

/// Audit logging middleware for Actix-Web.
///
/// Add it to an app or scope via `.wrap()`:
///
/// ```rust,no_run
/// use actix_web::{web, App, HttpResponse};
/// use apitrail_actix::{ApiTrailMiddleware, MemorySink};
///
/// let sink = MemorySink::new();
/// let app = App::new()
///     .wrap(ApiTrailMiddleware::new(sink.clone()))
///     .route("/", web::get().to(|| async { HttpResponse::Ok().body("hi") }));
/// ```
///
/// Wrapping a `web::scope` instead gives that scope its own [`Config`],
/// which is how per-handler policy (method filters, extra sensitive
/// fields, custom predicates) is expressed.
pub struct ApiTrailMiddleware {
    config: Arc<Config>,
    sink: Arc<dyn LogSink>,
}

impl ApiTrailMiddleware {
    /// Middleware with the default configuration.
    pub fn new(sink: impl LogSink + 'static) -> Self {
        Self::with_config(Config::default(), sink)
    }

    /// Middleware with an explicit configuration.
    pub fn with_config(config: Config, sink: impl LogSink + 'static) -> Self {
        Self {
            config: config.into_arc(),
            sink: Arc::new(sink),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for ApiTrailMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type InitError = ();
    type Transform = ApiTrailMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(ApiTrailMiddlewareService {
            service: Rc::new(service),
            config: Arc::clone(&self.config),
            sink: Arc::clone(&self.sink),
        })
    }
}

/// The per-worker service created by [`ApiTrailMiddleware`].
pub struct ApiTrailMiddlewareService<S> {
    service: Rc<S>,
    config: Arc<Config>,
    sink: Arc<dyn LogSink>,
}

impl<S, B> Service<ServiceRequest> for ApiTrailMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, mut req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let config = Arc::clone(&self.config);
        let sink = Arc::clone(&self.sink);

        Box::pin(async move {
            let timer = RequestTimer::start();

            let data = if config.decode_request_body {
                capture_request_body(&mut req).await
            } else {
                String::new()
            };

            // Plain values only; routing needs sole ownership of the
            // request's shared state during the inner call, so no handle to
            // it may be held across `service.call`.
            let mut request = RequestSnapshot::capture(req.request());

            match service.call(req).await {
                Ok(res) => {
                    // Handlers insert the principal and handler metadata
                    // while the call runs; re-read them now that it is done.
                    request.refresh_extensions(res.request());

                    let errors = res.response().error().map(|err| format!("{err:?}"));
                    let (res, body) = capture_response_body(res).await;
                    let outcome = ResponseSnapshot {
                        status: res.status(),
                        body,
                    };

                    if config.should_log(&request, &outcome) {
                        let record = RecordBuilder::new(&config).assemble(
                            &request,
                            &timer,
                            data,
                            &outcome,
                            errors,
                            Utc::now(),
                        );
                        dispatch(sink.as_ref(), record).await;
                    }

                    Ok(res)
                }
                Err(err) => {
                    // The error propagates unchanged; the record is built
                    // from the response it will render to.
                    let response = err.error_response();
                    let status = response.status();
                    let body = response.into_body().try_into_bytes().ok();
                    let outcome = ResponseSnapshot { status, body };

                    if config.should_log(&request, &outcome) {
                        let record = RecordBuilder::new(&config).assemble(
                            &request,
                            &timer,
                            data,
                            &outcome,
                            Some(format!("{err:?}")),
                            Utc::now(),
                        );
                        dispatch(sink.as_ref(), record).await;
                    }

                    Err(err)
                }
            }
        })
    }
}
