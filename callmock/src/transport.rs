//! Client-side interception: a `tower::Service` standing in for the network.
//!
//! # Design
//! `MockTransport` intercepts every outgoing request before transmission and
//! drives the shared counter → policy → match → respond pipeline. It is
//! cheaply cloneable (all state behind one `Arc`), so concurrent callers of
//! the same harness instance share the counter and the policy. Exercise it
//! the way services are exercised in tests: `tower::ServiceExt::oneshot`, or
//! mount it wherever a `Service` is accepted.

use std::convert::Infallible;
use std::error::Error;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::http::{Request, Response};
use tower::util::BoxCloneSyncService;
use tower::{BoxError, Service, ServiceExt};

use callmock_core::{Call, Calls, NoopReporter, Reporter};

use crate::handler::{handle_call, Dispatcher};

/// A mock client transport: every request is answered from the configured
/// calls without touching the network.
#[derive(Clone)]
pub struct MockTransport {
    shared: Arc<Shared>,
}

struct Shared {
    dispatcher: Dispatcher,
    forward: Option<BoxCloneSyncService<Request<Body>, Response<Body>, Infallible>>,
}

impl MockTransport {
    /// A verifying transport over the given sequencing policy.
    ///
    /// Registers the end-of-test completeness check with the sink; the sink
    /// owner must run its cleanup hooks exactly once at test end.
    pub fn new(reporter: Arc<dyn Reporter>, calls: Calls) -> Self {
        Self {
            shared: Arc::new(Shared {
                dispatcher: Dispatcher::new(reporter, calls),
                forward: None,
            }),
        }
    }

    /// A pass-through transport forwarding every request to `service`
    /// (an `axum::Router`, for example) with no verification, a call count
    /// fixed at one, and a no-op sink.
    pub fn pass_through<S>(service: S) -> Self
    where
        S: Service<Request<Body>, Response = Response<Body>, Error = Infallible>
            + Clone
            + Send
            + Sync
            + 'static,
        S::Future: Send,
    {
        Self {
            shared: Arc::new(Shared {
                dispatcher: Dispatcher::new(
                    Arc::new(NoopReporter),
                    Calls::Static(vec![Call::default()]),
                ),
                forward: Some(BoxCloneSyncService::new(service)),
            }),
        }
    }
}

impl Service<Request<Body>> for MockTransport {
    type Response = Response<Body>;
    type Error = BoxError;
    type Future = Pin<Box<dyn Future<Output = Result<Response<Body>, BoxError>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), BoxError>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let shared = self.shared.clone();

        Box::pin(async move { shared.round_trip(req).await })
    }
}

impl Shared {
    async fn round_trip(&self, req: Request<Body>) -> Result<Response<Body>, BoxError> {
        let (reporter, call) = self.dispatcher.begin();

        let Some(call) = call else {
            reporter.fatal("no expected calls left".to_string());

            // The request still counts as sent; hand back a degenerate empty
            // response instead of blocking the caller.
            return Ok(Response::new(Body::empty()));
        };

        if let Some(err) = &call.do_error {
            return Err(Box::new(TransportError(err.clone())));
        }

        if let Some(forward) = &self.forward {
            return match forward.clone().oneshot(req).await {
                Ok(response) => Ok(response),
                Err(never) => match never {},
            };
        }

        Ok(handle_call(reporter.as_ref(), req, &call).await)
    }
}

/// The injected transport failure of a [`Call`], as returned to the caller.
///
/// Displays as the underlying error; the shared cause is reachable through
/// [`Error::source`].
#[derive(Debug, Clone)]
pub struct TransportError(Arc<dyn Error + Send + Sync>);

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Error for TransportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(self.0.as_ref())
    }
}
