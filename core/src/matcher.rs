//! The verification engine: structural comparison of an observed request
//! against an expected [`Input`].
//!
//! # Design
//! Four independent checks — method, URL, body, header — each reporting zero
//! or more mismatches through the sink. All four always run; this is
//! multi-error accumulation, never fail-fast, so a single bad exchange shows
//! every broken dimension at once. Expected-side keys drive the query and
//! header comparisons: keys the expectation does not mention are ignored on
//! the observed request. Expected keys are visited in sorted order so report
//! order is deterministic across runs.
//!
//! Message templates are stable, parseable strings; external assertions match
//! on them, so they must not be reworded.

use std::collections::BTreeMap;

use http::header::HeaderName;
use http::request::Parts;
use http::{HeaderMap, Method, Uri};
use url::{form_urlencoded, Url};

use crate::body::Body;
use crate::call::Input;
use crate::reporter::Reporter;

/// Run all four checks of `input` against an observed request, with the body
/// already read into `body`.
pub fn compare_input(t: &dyn Reporter, parts: &Parts, body: &[u8], input: &Input) {
    compare_method(t, &parts.method, &input.method);
    compare_url(t, &parts.uri, input.url.as_ref());
    compare_body(t, body, &input.body);
    compare_header(t, &parts.headers, &input.header);
}

/// Exact method equality.
pub fn compare_method(t: &dyn Reporter, actual: &Method, expected: &Method) {
    if actual != expected {
        t.error(format!("wrong r.Method, expected {expected}, actual {actual}"));
    }
}

/// Path and query comparison, skipped entirely when no URL is expected.
///
/// The path must match by string equality, without normalization. Other URL
/// fields (scheme, host, port) are ignored.
pub fn compare_url(t: &dyn Reporter, actual: &Uri, expected: Option<&Url>) {
    let Some(expected) = expected else {
        return;
    };

    if actual.path() != expected.path() {
        t.error(format!(
            "wrong url.Path, expected {}, actual {}",
            expected.path(),
            actual.path()
        ));
    }

    compare_query(t, actual.query().unwrap_or(""), expected.query().unwrap_or(""));
}

/// Per-key query parameter comparison.
///
/// Only expected keys matter; for each, the ordered value list must equal the
/// observed request's list for that key exactly.
pub fn compare_query(t: &dyn Reporter, actual: &str, expected: &str) {
    let expected = query_values(expected);
    if expected.is_empty() {
        return;
    }

    let actual = query_values(actual);

    for (key, expected_values) in &expected {
        let actual_values = actual.get(key).cloned().unwrap_or_default();

        if &actual_values != expected_values {
            t.error(format!(
                "wrong url query values by key {key}, expect [{}], actual [{}]",
                expected_values.join(","),
                actual_values.join(","),
            ));
        }
    }
}

fn query_values(query: &str) -> BTreeMap<String, Vec<String>> {
    let mut values: BTreeMap<String, Vec<String>> = BTreeMap::new();

    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        values.entry(key.into_owned()).or_default().push(value.into_owned());
    }

    values
}

/// Byte-for-byte body comparison.
///
/// An encoding failure on the expected side is itself a reportable error, and
/// only the equality check is skipped.
pub fn compare_body(t: &dyn Reporter, actual: &[u8], expected: &Body) {
    let expected_bytes = match expected.bytes() {
        Ok(bytes) => bytes,
        Err(err) => {
            t.error(format!("read input body, {err}"));

            return;
        }
    };

    if expected_bytes.as_slice() != actual {
        t.error(format!(
            "body not equal, expected {} actual {}",
            String::from_utf8_lossy(&expected_bytes),
            String::from_utf8_lossy(actual),
        ));
    }
}

/// Per-key header comparison, expected keys only, in sorted key order.
pub fn compare_header(t: &dyn Reporter, actual: &HeaderMap, expected: &HeaderMap) {
    let mut keys: Vec<&HeaderName> = expected.keys().collect();
    keys.sort_by_key(|key| key.as_str());

    for key in keys {
        let expected_values = header_values(expected, key);
        let actual_values = header_values(actual, key);

        if actual_values != expected_values {
            t.error(format!(
                "wrong header values by key {key}, expect [{}], actual [{}]",
                expected_values.join(","),
                actual_values.join(","),
            ));
        }
    }
}

fn header_values(header: &HeaderMap, key: &HeaderName) -> Vec<String> {
    header
        .get_all(key)
        .iter()
        .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
        .collect()
}

/// Status code equality, for verifying replayed responses.
pub fn compare_status_code(t: &dyn Reporter, actual: u16, expected: u16) {
    if actual != expected {
        t.error(format!(
            "wrong response status code, expected {expected}, actual {actual}"
        ));
    }
}
