//! The call model: one expected request/response exchange.
//!
//! # Design
//! These types describe an exchange as plain data, owned by the sequencing
//! policy that holds them. A `Call` is immutable once constructed and `Clone`
//! because the cyclic policy hands the same call to many invocations. The
//! expected request shape borrows the `http` crate's `Method` and `HeaderMap`
//! so the harness compares against real request parts without conversions.

use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use http::header::CONTENT_TYPE;
use http::{HeaderMap, HeaderValue, Method};
use url::Url;

use crate::body::Body;

/// One expected exchange: the request shape to verify and the response to
/// replay, plus an optional injected transport error and response delay.
#[derive(Debug, Clone, Default)]
pub struct Call {
    pub input: Input,
    pub response: Response,

    /// When set, the client-side transport returns this error instead of
    /// producing a response, simulating a connection failure. The matcher is
    /// not run. Server-side harnesses ignore it.
    pub do_error: Option<Arc<dyn Error + Send + Sync>>,

    /// Pause before the response is handed back, simulating latency.
    /// Zero means no delay.
    pub delay: Duration,
}

/// The expected shape of an observed request.
///
/// Only the fields present drive verification: expected header keys are
/// checked and unmentioned keys ignored; when `url` is set only its path and
/// query parameters are compared.
#[derive(Debug, Clone, Default)]
pub struct Input {
    pub method: Method,
    pub body: Body,
    pub header: HeaderMap,
    pub url: Option<Url>,
}

/// The canned reply replayed for a matched call.
#[derive(Debug, Clone, Default)]
pub struct Response {
    /// Zero means "default to 200".
    pub status_code: u16,
    pub body: Body,
    pub header: HeaderMap,
}

/// Append `Content-Type: application/json` to `header` and return it.
pub fn json_content_type_header(header: HeaderMap) -> HeaderMap {
    content_type_header(HeaderValue::from_static("application/json"), header)
}

/// Append a `Content-Type` entry to `header` and return it.
pub fn content_type_header(content_type: HeaderValue, mut header: HeaderMap) -> HeaderMap {
    header.append(CONTENT_TYPE, content_type);

    header
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_content_type_is_appended() {
        let header = json_content_type_header(HeaderMap::new());
        assert_eq!(header.get(CONTENT_TYPE).unwrap(), "application/json");
    }

    #[test]
    fn content_type_preserves_existing_entries() {
        let mut header = HeaderMap::new();
        header.append(CONTENT_TYPE, HeaderValue::from_static("text/plain"));

        let header = content_type_header(HeaderValue::from_static("application/json"), header);

        let values: Vec<_> = header.get_all(CONTENT_TYPE).iter().collect();
        assert_eq!(values, ["text/plain", "application/json"]);
    }

    #[test]
    fn default_call_has_no_error_and_no_delay() {
        let call = Call::default();
        assert!(call.do_error.is_none());
        assert!(call.delay.is_zero());
        assert_eq!(call.input.method, Method::GET);
        assert_eq!(call.response.status_code, 0);
    }
}
