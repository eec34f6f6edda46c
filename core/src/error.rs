//! Error types for body producers.
//!
//! # Design
//! Encoding gets a dedicated variant because it is the only way a `Body` can
//! fail: the stored value's `Serialize` impl rejected it. The serde message is
//! kept as a plain string so the error stays `Clone` and can be replayed by a
//! cyclic policy that hands the same call to many invocations.

use std::fmt;

/// Errors returned by [`Body::bytes`](crate::Body::bytes).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyError {
    /// The stored value could not be encoded to JSON.
    Encoding(String),
}

impl fmt::Display for BodyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BodyError::Encoding(msg) => write!(f, "encode json value, {msg}"),
        }
    }
}

impl std::error::Error for BodyError {}
