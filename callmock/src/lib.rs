//! HTTP call mocking for tests: declare the exchanges you expect, intercept
//! real or simulated calls, verify every request, replay canned responses.
//!
//! # Overview
//! Two harnesses drive one verification pipeline:
//! - [`MockTransport`] — a `tower::Service` intercepting outgoing requests
//!   before they reach the network (exercise clients without a server).
//! - [`MockServer`] — a real listening endpoint on an ephemeral localhost
//!   port (exercise clients over actual HTTP).
//!
//! Both claim a distinct invocation number per request from a shared atomic
//! counter, resolve the expected call through a sequencing policy ([`Calls`]),
//! verify the observed request against its [`Input`], and hand back the
//! canned [`Response`]. Mismatches accumulate through the injected
//! [`Reporter`] sink; at test end the sink's cleanup hooks assert every
//! expected call was exercised.
//!
//! The data model, policies, matcher, and sink live in `callmock-core` and
//! are re-exported here.

pub mod server;
pub mod transport;

mod handler;

pub use callmock_core::{
    content_type_header, json_content_type_header, matcher, with_call_number, Body, BodyError,
    Call, Calls, Input, NoopReporter, RecordingReporter, Reporter, Response,
};
pub use server::MockServer;
pub use transport::{MockTransport, TransportError};
