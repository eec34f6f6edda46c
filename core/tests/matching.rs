//! Full verification scenarios across the call model, matcher, and sink.
//!
//! # Design
//! Builds real `http::Request` values, splits them into parts the way the
//! harness does, and asserts the exact accumulated report list — one message
//! per broken dimension, in the engine's deterministic order.

use std::sync::Arc;

use http::{HeaderMap, HeaderValue, Method, Request};
use url::Url;

use callmock_core::matcher::compare_input;
use callmock_core::{with_call_number, Body, Input, RecordingReporter};

fn verify(reporter: &RecordingReporter, request: Request<&[u8]>, input: &Input) {
    let (parts, body) = request.into_parts();
    compare_input(reporter, &parts, body, input);
}

#[test]
fn matching_request_reports_nothing() {
    let mut header = HeaderMap::new();
    header.append("x-my-header", HeaderValue::from_static("Hello"));

    let request = Request::builder()
        .method(Method::POST)
        .uri("/any/target?key=value&key=value&name=Dima")
        .header("x-my-header", "Hello")
        .header("user-agent", "ignored")
        .body(b"Hello World!".as_slice())
        .unwrap();

    let input = Input {
        method: Method::POST,
        body: Body::raw("Hello World!"),
        header,
        url: Some(Url::parse("http://localhost:1000/any/target?key=value&key=value&name=Dima").unwrap()),
    };

    let reporter = RecordingReporter::new();
    verify(&reporter, request, &input);

    assert!(reporter.errors().is_empty());
    assert!(reporter.fatals().is_empty());
}

#[test]
fn every_broken_dimension_is_reported_independently() {
    let mut header = HeaderMap::new();
    header.append("x-my-header", HeaderValue::from_static("Hello"));

    let request = Request::builder()
        .method(Method::POST)
        .uri("/any/target")
        .body(b"Hello World!".as_slice())
        .unwrap();

    let input = Input {
        method: Method::PUT,
        body: Body::raw("HelloWorld!"),
        header,
        url: Some(Url::parse("http://localhost:1000/any/targt?key=value").unwrap()),
    };

    let reporter = RecordingReporter::new();
    verify(&reporter, request, &input);

    assert_eq!(
        reporter.errors(),
        [
            "wrong r.Method, expected PUT, actual POST",
            "wrong url.Path, expected /any/targt, actual /any/target",
            "wrong url query values by key key, expect [value], actual []",
            "body not equal, expected HelloWorld! actual Hello World!",
            "wrong header values by key x-my-header, expect [Hello], actual []",
        ]
    );
}

#[test]
fn multi_value_header_key_adds_one_more_report() {
    let mut header = HeaderMap::new();
    header.append("x-my-header", HeaderValue::from_static("Hello"));
    header.append("x-my-headers", HeaderValue::from_static("Hello"));
    header.append("x-my-headers", HeaderValue::from_static("Hello"));
    header.append("x-my-headers", HeaderValue::from_static("Hello"));

    let request = Request::builder()
        .method(Method::POST)
        .uri("/any/target")
        .body(b"Hello World!".as_slice())
        .unwrap();

    let input = Input {
        method: Method::PUT,
        body: Body::raw("HelloWorld!"),
        header,
        url: Some(Url::parse("http://localhost:1000/any/targt?key=value").unwrap()),
    };

    let reporter = RecordingReporter::new();
    verify(&reporter, request, &input);

    assert_eq!(
        reporter.errors(),
        [
            "wrong r.Method, expected PUT, actual POST",
            "wrong url.Path, expected /any/targt, actual /any/target",
            "wrong url query values by key key, expect [value], actual []",
            "body not equal, expected HelloWorld! actual Hello World!",
            "wrong header values by key x-my-header, expect [Hello], actual []",
            "wrong header values by key x-my-headers, expect [Hello,Hello,Hello], actual []",
        ]
    );
}

#[test]
fn reports_through_a_numbered_sink_carry_the_invocation_prefix() {
    let reporter = Arc::new(RecordingReporter::new());
    let numbered = with_call_number(reporter.clone(), 3);

    let request = Request::builder()
        .method(Method::POST)
        .uri("/any/target")
        .body(b"".as_slice())
        .unwrap();

    let input = Input {
        method: Method::PUT,
        ..Input::default()
    };

    let (parts, body) = request.into_parts();
    compare_input(numbered.as_ref(), &parts, body, &input);

    assert_eq!(
        reporter.errors(),
        ["3 call, wrong r.Method, expected PUT, actual POST"]
    );
}
