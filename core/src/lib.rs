//! Call-matching core for HTTP test mocking.
//!
//! # Overview
//! Describes expected request/response exchanges as plain data, decides which
//! expectation answers the Nth invocation, and structurally verifies an
//! observed request against its expectation — all without touching the
//! network. The interception harness in the `callmock` crate executes the
//! actual exchanges and routes every observed request through this crate.
//!
//! # Design
//! - Everything here is deterministic and I/O-free: policies and the matcher
//!   are pure functions of their inputs and need no locking.
//! - Mismatches are accumulated, never thrown: each check reports through an
//!   injected [`Reporter`] sink and keeps going.
//! - Message templates are stable strings so sink-side assertions can match
//!   on them.

pub mod body;
pub mod call;
pub mod calls;
pub mod error;
pub mod matcher;
pub mod reporter;

pub use body::Body;
pub use call::{content_type_header, json_content_type_header, Call, Input, Response};
pub use calls::Calls;
pub use error::BodyError;
pub use reporter::{with_call_number, NoopReporter, RecordingReporter, Reporter};
