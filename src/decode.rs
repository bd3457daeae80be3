// Turns a raw `(status, body)` pair into a typed outcome. The status alone
// decides which schema the body is read with: 2xx bodies are read as the
// caller's success type, everything else as the service-wide standard error.

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Status and body of a response, fully read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn new(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        RawResponse {
            status,
            body: body.into(),
        }
    }
}

/// Uniform body the service returns for errors, and for calls whose success
/// carries nothing but a message. Both fields are required; a body missing
/// either one does not match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandardResponse {
    pub msg: String,
    pub status_code: u16,
}

/// Outcome of decoding one response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Decoded<T> {
    /// 2xx with a body matching `T`.
    Success(T),
    /// Non-2xx with a body matching [`StandardResponse`].
    Failure(StandardResponse),
    /// Body did not match the schema the status called for.
    Malformed { status: u16, body: String },
}

impl<T> Decoded<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, Decoded::Success(_))
    }

    /// Collapse into a `Result`, mapping a standard error to
    /// [`Error::Remote`] and an unreadable body to [`Error::Malformed`].
    pub fn into_result(self) -> Result<T> {
        match self {
            Decoded::Success(payload) => Ok(payload),
            Decoded::Failure(err) => Err(Error::Remote(err)),
            Decoded::Malformed { status, body } => Err(Error::Malformed { status, body }),
        }
    }
}

/// Decode `raw` as `T` on success or as [`StandardResponse`] otherwise.
///
/// An empty success body is read as JSON `null`, so endpoints that answer
/// with no content decode cleanly into `()`, `Option<_>` or
/// `serde_json::Value`.
pub fn decode<T: DeserializeOwned>(raw: &RawResponse) -> Decoded<T> {
    let body = if raw.body.iter().all(u8::is_ascii_whitespace) {
        &b"null"[..]
    } else {
        &raw.body[..]
    };

    let malformed = || Decoded::Malformed {
        status: raw.status.as_u16(),
        body: String::from_utf8_lossy(&raw.body).into_owned(),
    };

    if raw.status.is_success() {
        serde_json::from_slice(body).map_or_else(|_| malformed(), Decoded::Success)
    } else {
        serde_json::from_slice(body).map_or_else(|_| malformed(), Decoded::Failure)
    }
}
