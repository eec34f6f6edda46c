//! The shared exchange pipeline behind both harness adapters.
//!
//! # Design
//! `Dispatcher` owns the per-harness state: the sink, the sequencing policy,
//! and the invocation counter. The counter is the only shared mutable state on
//! the hot path; an atomic fetch-and-increment hands every concurrent caller a
//! distinct 1-based invocation number with no lost updates. The policy and the
//! matcher are pure, so nothing else is synchronized.
//!
//! `handle_call` is the respond half: read the observed body, run the matcher,
//! synthesize the canned response, sleep out the configured delay. Encoding
//! and construction failures are reported through the sink, never panicked.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response};
use http_body_util::BodyExt;

use callmock_core::{matcher, with_call_number, Call, Calls, Reporter};

pub(crate) struct Dispatcher {
    reporter: Arc<dyn Reporter>,
    calls: Calls,
    called_times: Arc<AtomicU64>,
}

impl Dispatcher {
    /// Builds the dispatcher and registers the end-of-test completeness check
    /// with the sink.
    pub(crate) fn new(reporter: Arc<dyn Reporter>, calls: Calls) -> Self {
        let dispatcher = Self {
            reporter,
            calls,
            called_times: Arc::new(AtomicU64::new(0)),
        };

        dispatcher.register_done_check();

        dispatcher
    }

    fn register_done_check(&self) {
        // The hook lives inside the sink; holding the sink strongly from its
        // own hook would keep it alive forever.
        let reporter = Arc::downgrade(&self.reporter);
        let calls = self.calls.clone();
        let called_times = self.called_times.clone();

        self.reporter.cleanup(Box::new(move || {
            let Some(reporter) = reporter.upgrade() else {
                return;
            };

            if !calls.done(called_times.load(Ordering::SeqCst)) {
                reporter.error("assert handler calls, not all calls were handled".to_string());
            }
        }));
    }

    /// Claims the next invocation number and resolves its expected call.
    ///
    /// The returned sink prefixes every message with the invocation number.
    pub(crate) fn begin(&self) -> (Arc<dyn Reporter>, Option<Call>) {
        let called_times = self.called_times.fetch_add(1, Ordering::SeqCst) + 1;
        let reporter = with_call_number(self.reporter.clone(), called_times);
        let call = self.calls.call(called_times).cloned();

        tracing::trace!(called_times, found = call.is_some(), "dispatch expected call");

        (reporter, call)
    }

    /// The server-side entry point: counter, policy, match, respond.
    ///
    /// An unanswered invocation is a structural violation: report fatal and
    /// hand back a degenerate empty response so the peer is not left hanging.
    pub(crate) async fn serve(&self, req: Request<Body>) -> Response<Body> {
        let (reporter, call) = self.begin();

        let Some(call) = call else {
            reporter.fatal("no expected calls left".to_string());

            return Response::new(Body::empty());
        };

        handle_call(reporter.as_ref(), req, &call).await
    }
}

/// Verify the observed request against the call's input and synthesize its
/// response, delayed if the call asks for it.
pub(crate) async fn handle_call(t: &dyn Reporter, req: Request<Body>, call: &Call) -> Response<Body> {
    let (parts, body) = req.into_parts();

    match body.collect().await {
        Ok(collected) => {
            let body = collected.to_bytes();
            matcher::compare_input(t, &parts, &body, &call.input);
        }
        Err(err) => {
            // The body could not be read; the other three dimensions are
            // still checked.
            t.error(format!("read body from request, {err}"));
            matcher::compare_method(t, &parts.method, &call.input.method);
            matcher::compare_url(t, &parts.uri, call.input.url.as_ref());
            matcher::compare_header(t, &parts.headers, &call.input.header);
        }
    }

    let response = build_response(t, &call.response);

    if !call.delay.is_zero() {
        tokio::time::sleep(call.delay).await;
    }

    response
}

/// Synthesize an HTTP response from a canned [`callmock_core::Response`].
///
/// Status 0 defaults to 200; headers are copied verbatim in key-then-value
/// order; body failures produce an empty body and a report.
pub(crate) fn build_response(t: &dyn Reporter, response: &callmock_core::Response) -> Response<Body> {
    let status_code = if response.status_code == 0 {
        200
    } else {
        response.status_code
    };

    let mut builder = Response::builder().status(status_code);

    for (key, value) in response.header.iter() {
        builder = builder.header(key, value);
    }

    let body = match response.body.bytes() {
        Ok(bytes) => bytes,
        Err(err) => {
            t.error(format!("get response body bytes, unexpected error: {err}"));

            Vec::new()
        }
    };

    match builder.body(Body::from(body)) {
        Ok(response) => response,
        Err(err) => {
            t.error(format!("write response, unexpected error: {err}"));

            Response::new(Body::empty())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::http::{HeaderValue, StatusCode};

    use callmock_core::{Body as CallBody, RecordingReporter, Response as ResponseSpec};

    #[test]
    fn zero_status_code_defaults_to_200() {
        let t = RecordingReporter::new();
        let response = build_response(&t, &ResponseSpec::default());

        assert_eq!(response.status(), StatusCode::OK);
        assert!(t.errors().is_empty());
    }

    #[test]
    fn response_headers_are_copied_verbatim() {
        let mut header = axum::http::HeaderMap::new();
        header.append("x-my-headers", HeaderValue::from_static("a"));
        header.append("x-my-headers", HeaderValue::from_static("b"));

        let t = RecordingReporter::new();
        let response = build_response(
            &t,
            &ResponseSpec {
                status_code: 404,
                body: CallBody::raw("Not Found"),
                header,
            },
        );

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let values: Vec<_> = response.headers().get_all("x-my-headers").iter().collect();
        assert_eq!(values, ["a", "b"]);
    }

    #[tokio::test]
    async fn unencodable_response_body_is_reported_and_replaced_with_empty() {
        struct Broken;

        impl serde::Serialize for Broken {
            fn serialize<S: serde::Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
                Err(serde::ser::Error::custom("broken response"))
            }
        }

        let t = RecordingReporter::new();
        let response = build_response(
            &t,
            &ResponseSpec {
                status_code: 200,
                body: CallBody::json(&Broken),
                header: Default::default(),
            },
        );

        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert!(body.is_empty());

        let errors = t.errors();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("get response body bytes, unexpected error: "));
        assert!(errors[0].contains("broken response"));
    }

    #[test]
    fn invalid_status_code_is_reported_with_a_degenerate_response() {
        let t = RecordingReporter::new();
        let response = build_response(
            &t,
            &ResponseSpec {
                status_code: 19,
                ..ResponseSpec::default()
            },
        );

        assert_eq!(response.status(), StatusCode::OK);

        let errors = t.errors();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("write response, unexpected error: "));
    }
}
