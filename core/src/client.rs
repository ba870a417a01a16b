//! Authenticated dispatch to the NowCerts API.
//!
//! # Design
//! `NowCerts` owns the credentials, the cached bearer token and a
//! `Transport`. Every call goes through `fire`, which builds the URL, makes
//! sure a live token is cached, assembles headers and the body, and decodes
//! the JSON payload. Remote error statuses are returned as data; only a dead
//! transport, a failed token fetch, or an undecodable body become errors.

use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::config::{NowCertsOptions, CLIENT_ID, TOKEN_PATH, USER_AGENT};
use crate::error::{Error, Result};
use crate::http::{HttpMethod, HttpRequest, HttpResponse, RequestBody, Transport, UreqTransport};
use crate::query::{build_url, Query};
use crate::token::{is_token_expired, TokenCache, TokenRequest, TokenResponse};

/// Per-call options for `NowCerts::fire`.
#[derive(Debug, Clone, Default)]
pub struct FireOptions {
    pub method: HttpMethod,
    pub headers: Vec<(String, String)>,
    pub query: Query,
    pub body: RequestBody,
}

impl FireOptions {
    pub fn new(method: HttpMethod) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn query(mut self, query: Query) -> Self {
        self.query = query;
        self
    }

    pub fn body(mut self, body: RequestBody) -> Self {
        self.body = body;
        self
    }
}

/// A decoded response together with the raw one it came from.
#[derive(Debug, Clone)]
pub struct Fired<T> {
    pub response: HttpResponse,
    pub payload: T,
}

/// Client for the NowCerts REST API.
///
/// Cheap to share behind an `Arc`; the only mutable state is the cached
/// token.
pub struct NowCerts {
    username: String,
    password: String,
    options: NowCertsOptions,
    base_url: String,
    token: TokenCache,
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for NowCerts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NowCerts")
            .field("username", &self.username)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl NowCerts {
    pub fn new(username: impl Into<String>, password: impl Into<String>, options: NowCertsOptions) -> Self {
        Self::with_transport(username, password, options, Arc::new(UreqTransport::new()))
    }

    pub fn with_transport(
        username: impl Into<String>,
        password: impl Into<String>,
        options: NowCertsOptions,
        transport: Arc<dyn Transport>,
    ) -> Self {
        let base_url = options.base_url();
        Self {
            username: username.into(),
            password: password.into(),
            options,
            base_url,
            token: TokenCache::default(),
            transport,
        }
    }

    pub fn options(&self) -> &NowCertsOptions {
        &self.options
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// The cached bearer token, without refreshing it.
    pub fn current_token(&self) -> Option<String> {
        self.token.get()
    }

    /// Sends a request to `path` (relative to the configured host) and
    /// decodes the JSON response into `T`.
    ///
    /// A token is fetched first when none is cached or the cached one has
    /// expired. If that fetch yields no token the request is not sent and
    /// `Error::Auth` is returned.
    pub fn fire<T: DeserializeOwned>(&self, path: &str, options: FireOptions) -> Result<Fired<T>> {
        let url = build_url(&self.base_url, path, &options.query)?;
        let token = self.valid_token()?;

        let mut headers = options.headers;
        set_header(&mut headers, "Authorization", format!("Bearer {token}"));
        self.send(options.method, url, headers, &options.body)
    }

    /// `fire` with an untyped JSON payload.
    pub fn fire_json(&self, path: &str, options: FireOptions) -> Result<Fired<serde_json::Value>> {
        self.fire(path, options)
    }

    /// Returns a live token, fetching one while holding the cache lock so
    /// concurrent callers share a single refresh.
    fn valid_token(&self) -> Result<String> {
        let mut cached = self.token.lock();
        if let Some(token) = cached.as_deref().filter(|t| !is_token_expired(Some(*t))) {
            return Ok(token.to_string());
        }

        log::debug!(target: "token", "no valid token cached, requesting a new one");
        let fetched = self.fetch_token()?;
        let token = match fetched.access_token.filter(|t| !t.is_empty()) {
            Some(token) => token,
            None => {
                log::warn!(
                    target: "token",
                    "token request failed: {}",
                    fetched.error.as_deref().unwrap_or("no token returned")
                );
                return Err(Error::Auth {
                    error: fetched.error,
                    error_description: fetched.error_description,
                });
            }
        };
        *cached = Some(token.clone());
        Ok(token)
    }

    fn fetch_token(&self) -> Result<TokenResponse> {
        let body = RequestBody::json(&TokenRequest {
            grant_type: "password",
            client_id: CLIENT_ID,
            username: &self.username,
            password: &self.password,
        })?;
        let url = build_url(&self.base_url, TOKEN_PATH, &Query::new())?;
        let fired: Fired<TokenResponse> = self.send(HttpMethod::Post, url, Vec::new(), &body)?;
        Ok(fired.payload)
    }

    fn send<T: DeserializeOwned>(
        &self,
        method: HttpMethod,
        url: String,
        mut headers: Vec<(String, String)>,
        body: &RequestBody,
    ) -> Result<Fired<T>> {
        let (content_type, body) = body.encode()?;
        set_header(&mut headers, "Accept", "application/json");
        set_header(&mut headers, "Content-Type", content_type);
        set_header(&mut headers, "User-Agent", USER_AGENT);

        let request = HttpRequest {
            method,
            url,
            headers,
            body,
        };
        log::debug!(target: "http", "{} {}", method.as_str(), request.url);

        let response = self.transport.execute(&request)?;
        match serde_json::from_str(&response.body) {
            Ok(payload) => Ok(Fired { response, payload }),
            Err(e) => {
                log::warn!(target: "http", "undecodable response from {} (HTTP {})", request.url, response.status);
                Err(Error::decode(response, e))
            }
        }
    }
}

/// Replaces any header with the same case-insensitive name.
fn set_header(headers: &mut Vec<(String, String)>, name: &str, value: impl Into<String>) {
    headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
    headers.push((name.to_string(), value.into()));
}
