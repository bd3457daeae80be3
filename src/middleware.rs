// Request editors run against every outgoing request, in the order they were
// registered on the client, right before it is handed to the transport.

use reqwest::blocking::Request;
use reqwest::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use thiserror::Error;

/// Header carrying the session token on authenticated calls.
pub const AUTH_HEADER: &str = "X-Boxee-Auth";

const JSON: &str = "application/json";

#[derive(Debug, Error)]
pub enum MiddlewareError {
    #[error("empty credential for {header} header")]
    EmptyCredential { header: &'static str },

    #[error("credential is not a valid {header} header value")]
    InvalidCredential {
        header: &'static str,
        #[source]
        source: reqwest::header::InvalidHeaderValue,
    },
}

type EditFn = dyn Fn(&mut Request) -> Result<(), MiddlewareError> + Send + Sync;

/// A named request editor.
pub struct Middleware {
    name: &'static str,
    edit: Box<EditFn>,
}

impl Middleware {
    pub fn new<F>(name: &'static str, edit: F) -> Self
    where
        F: Fn(&mut Request) -> Result<(), MiddlewareError> + Send + Sync + 'static,
    {
        Middleware {
            name,
            edit: Box::new(edit),
        }
    }

    /// Sets `Content-Type: application/json`. Never fails.
    pub fn content_type() -> Self {
        Middleware::new("content-type", |req| {
            req.headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static(JSON));
            Ok(())
        })
    }

    /// Sets the JSON content type and the [`AUTH_HEADER`] carrying `token`
    /// verbatim. Fails without touching the request when `token` is empty or
    /// only whitespace.
    pub fn auth_header(token: impl Into<String>) -> Self {
        let token = token.into();
        Middleware::new("auth-header", move |req| {
            if token.trim().is_empty() {
                return Err(MiddlewareError::EmptyCredential {
                    header: AUTH_HEADER,
                });
            }
            let mut value = HeaderValue::from_str(&token).map_err(|source| {
                MiddlewareError::InvalidCredential {
                    header: AUTH_HEADER,
                    source,
                }
            })?;
            value.set_sensitive(true);

            let headers = req.headers_mut();
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON));
            headers.insert(HeaderName::from_static("x-boxee-auth"), value);
            Ok(())
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn apply(&self, req: &mut Request) -> Result<(), MiddlewareError> {
        (self.edit)(req)
    }
}

impl std::fmt::Debug for Middleware {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Middleware").field("name", &self.name).finish()
    }
}
