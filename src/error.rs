// Error type shared by every layer of the library. The binary turns these
// into a printed message and a non-zero exit status; nothing in here logs.

use std::path::PathBuf;

use thiserror::Error;

use crate::decode::StandardResponse;
use crate::middleware::MiddlewareError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Coarse classification of an [`Error`], used by callers that need to
/// decide how to report a failure rather than what exactly went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Persisted config missing or malformed. Fixed by running `boxee init`.
    Config,
    /// A required value was empty. Caught before any network call.
    Validation,
    /// Bad service address or a transport failure.
    Connection,
    /// Empty or rejected credential.
    Auth,
    /// Response body did not match the expected schema.
    Decode,
    /// Well-formed standard error returned by the service.
    Remote,
    /// Batch input could not be read.
    Input,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("config file not found at {}. Run `boxee init` to get started", .path.display())]
    ConfigNotFound { path: PathBuf },

    #[error("failed to read config file {}", .path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed config file {}", .path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("failed to serialize config")]
    ConfigSerialize(#[source] serde_yaml::Error),

    #[error("failed to write config file {}", .path.display())]
    ConfigWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{field} cannot be empty")]
    EmptyField { field: &'static str },

    #[error("invalid service address `{address}`: {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("failed to build HTTP client")]
    ClientBuild(#[source] reqwest::Error),

    #[error("failed to encode request body")]
    Encode(#[source] serde_json::Error),

    #[error("request failed")]
    Transport(#[from] reqwest::Error),

    #[error("unauthenticated")]
    Unauthenticated(#[from] MiddlewareError),

    #[error("service returned {}: {}", .0.status_code, .0.msg)]
    Remote(StandardResponse),

    #[error("malformed response with status {status}")]
    Malformed { status: u16, body: String },

    #[error("failed to read batch input {}", .path.display())]
    BatchInput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::ConfigNotFound { .. }
            | Error::ConfigRead { .. }
            | Error::ConfigParse { .. }
            | Error::ConfigSerialize(_)
            | Error::ConfigWrite { .. } => ErrorKind::Config,
            Error::EmptyField { .. } | Error::Encode(_) => ErrorKind::Validation,
            Error::InvalidAddress { .. } | Error::ClientBuild(_) | Error::Transport(_) => {
                ErrorKind::Connection
            }
            Error::Unauthenticated(_) => ErrorKind::Auth,
            Error::Remote(_) => ErrorKind::Remote,
            Error::Malformed { .. } => ErrorKind::Decode,
            Error::BatchInput { .. } => ErrorKind::Input,
        }
    }
}

/// Fails with [`Error::EmptyField`] when `value` is empty.
pub fn require<'a>(field: &'static str, value: &'a str) -> Result<&'a str> {
    if value.is_empty() {
        return Err(Error::EmptyField { field });
    }
    Ok(value)
}
