// Blocking HTTP client bound to one service address and one fixed list of
// request editors. A client is built once per invocation; the editor list
// cannot change after `build`, so headers are never attached twice.

use std::sync::Arc;
use std::time::Duration;

use reqwest::blocking::{Body, Request};
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::decode::{decode, Decoded, RawResponse};
use crate::error::{Error, Result};
use crate::middleware::Middleware;

/// Sends a fully edited request and reads the whole response.
pub trait Transport: Send + Sync {
    fn send(&self, request: Request) -> Result<RawResponse>;
}

/// [`Transport`] backed by `reqwest`'s blocking client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::blocking::Client,
}

impl HttpTransport {
    /// `timeout` of `None` disables the request timeout.
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(Error::ClientBuild)?;
        Ok(HttpTransport { http })
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: Request) -> Result<RawResponse> {
        let response = self.http.execute(request)?;
        let status = response.status();
        let body = response.bytes()?.to_vec();
        Ok(RawResponse { status, body })
    }
}

pub struct ClientBuilder {
    address: String,
    timeout: Option<Duration>,
    middleware: Vec<Middleware>,
    transport: Option<Arc<dyn Transport>>,
}

impl ClientBuilder {
    pub fn new(address: impl Into<String>) -> Self {
        ClientBuilder {
            address: address.into(),
            timeout: None,
            middleware: Vec::new(),
            transport: None,
        }
    }

    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Append one editor. Editors run in the order they were attached.
    pub fn attach(mut self, middleware: Middleware) -> Self {
        self.middleware.push(middleware);
        self
    }

    /// Send through `transport` instead of a fresh [`HttpTransport`].
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Validate the address and produce the client. No network activity.
    pub fn build(self) -> Result<AuthenticatedClient> {
        let base = parse_address(&self.address)?;
        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(HttpTransport::new(self.timeout)?),
        };
        Ok(AuthenticatedClient {
            base,
            middleware: self.middleware,
            transport,
        })
    }
}

/// Parse `address` as a base URL for the service.
pub fn parse_address(address: &str) -> Result<Url> {
    let invalid = |reason: String| Error::InvalidAddress {
        address: address.to_owned(),
        reason,
    };
    let url = Url::parse(address).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme `{}`", url.scheme())));
    }
    if url.cannot_be_a_base() || url.host_str().is_none() {
        return Err(invalid("missing host".to_owned()));
    }
    Ok(url)
}

pub struct AuthenticatedClient {
    base: Url,
    middleware: Vec<Middleware>,
    transport: Arc<dyn Transport>,
}

impl AuthenticatedClient {
    pub fn middleware(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.middleware.iter().map(Middleware::name)
    }

    /// Build the request, run every editor in order and send it. If an
    /// editor fails nothing is sent.
    pub fn execute<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&B>,
    ) -> Result<RawResponse> {
        let url = self.url(path, query)?;
        let mut request = Request::new(method, url);
        if let Some(body) = body {
            let bytes = serde_json::to_vec(body).map_err(Error::Encode)?;
            *request.body_mut() = Some(Body::from(bytes));
        }

        for middleware in &self.middleware {
            middleware.apply(&mut request)?;
        }

        debug!(method = %request.method(), url = %request.url(), "sending request");
        let response = self.transport.send(request)?;
        debug!(status = response.status.as_u16(), "received response");
        Ok(response)
    }

    /// [`AuthenticatedClient::execute`] followed by [`decode`].
    pub fn call<T, B>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&B>,
    ) -> Result<Decoded<T>>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let raw = self.execute(method, path, query, body)?;
        Ok(decode(&raw))
    }

    fn url(&self, path: &str, query: &[(&str, &str)]) -> Result<Url> {
        let joined = format!(
            "{}/{}",
            self.base.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        let mut url = Url::parse(&joined).map_err(|e| Error::InvalidAddress {
            address: joined.clone(),
            reason: e.to_string(),
        })?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }
}

impl std::fmt::Debug for AuthenticatedClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthenticatedClient")
            .field("base", &self.base.as_str())
            .field("middleware", &self.middleware)
            .finish()
    }
}
