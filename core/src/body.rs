//! Byte producers for expected request bodies and canned response bodies.
//!
//! # Design
//! `Body` is a closed set of variants behind an opaque struct: raw bytes,
//! JSON-encoded values, Base64-encoded bytes, and the empty body. JSON
//! encoding runs eagerly in the constructor and a failure is stored instead of
//! panicking, so it surfaces from [`Body::bytes`] at verification time and can
//! be routed to the reporting sink. The default value is the empty body, which
//! is how an absent body on an `Input` or `Response` is represented.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::Serialize;

use crate::error::BodyError;

/// A producer of raw bytes, used both to describe the expected bytes of a
/// request body and to supply the bytes of a canned response body.
#[derive(Debug, Clone, Default)]
pub struct Body {
    kind: Kind,
}

#[derive(Debug, Clone, Default)]
enum Kind {
    #[default]
    Empty,
    Raw(Vec<u8>),
    Json(Result<Vec<u8>, String>),
    Base64(String),
}

impl Body {
    /// A body producing zero bytes. Equivalent to `Body::default()`.
    pub fn empty() -> Self {
        Self { kind: Kind::Empty }
    }

    /// A body producing the given bytes verbatim. Never fails.
    pub fn raw(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            kind: Kind::Raw(bytes.into()),
        }
    }

    /// A body producing the JSON encoding of `value`.
    ///
    /// Encoding happens here; if the value is not serializable the failure is
    /// stored and returned from [`Body::bytes`] as [`BodyError::Encoding`].
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Self {
        Self {
            kind: Kind::Json(serde_json::to_vec(value).map_err(|err| err.to_string())),
        }
    }

    /// A body producing the standard-alphabet Base64 encoding of `raw`.
    /// Response-body helper; there is no decoding counterpart.
    pub fn base64(raw: impl AsRef<[u8]>) -> Self {
        Self {
            kind: Kind::Base64(STANDARD.encode(raw)),
        }
    }

    /// Produce the body's bytes.
    pub fn bytes(&self) -> Result<Vec<u8>, BodyError> {
        match &self.kind {
            Kind::Empty => Ok(Vec::new()),
            Kind::Raw(bytes) => Ok(bytes.clone()),
            Kind::Json(Ok(bytes)) => Ok(bytes.clone()),
            Kind::Json(Err(message)) => Err(BodyError::Encoding(message.clone())),
            Kind::Base64(encoded) => Ok(encoded.clone().into_bytes()),
        }
    }
}
