//! Blocking HTTP transport
//!
//! The resolver only needs one capability from the network: GET a URL and
//! report the post-redirect URL together with the body. [`Transport`] is
//! that capability; [`HttpTransport`] implements it with
//! `reqwest::blocking`. Retry and timeout policy live here, not in the
//! resolver.

use std::io::Read;

use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::Url;

use crate::config::ResolverConfig;
use crate::error::TransportError;

/// Response of a successful GET
pub struct TransportResponse {
    /// URL the body was served from, after following redirects
    pub effective_url: String,
    /// Response body, read lazily
    pub body: Box<dyn Read + Send>,
}

impl TransportResponse {
    pub fn new(effective_url: impl Into<String>, body: Box<dyn Read + Send>) -> Self {
        Self {
            effective_url: effective_url.into(),
            body,
        }
    }

    /// Read the whole body into memory
    pub fn bytes(mut self) -> Result<Vec<u8>, TransportError> {
        let mut buf = Vec::new();
        self.body.read_to_end(&mut buf)?;
        Ok(buf)
    }

    /// Read the whole body as UTF-8 text
    pub fn text(self) -> Result<String, TransportError> {
        let bytes = self.bytes()?;
        Ok(String::from_utf8(bytes)?)
    }
}

impl std::fmt::Debug for TransportResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportResponse")
            .field("effective_url", &self.effective_url)
            .finish_non_exhaustive()
    }
}

/// GET capability consumed by repository hosts
pub trait Transport {
    /// Fetch `url`, following redirects. Non-success statuses are errors.
    fn get(&self, url: &str) -> Result<TransportResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn get(&self, url: &str) -> Result<TransportResponse, TransportError> {
        (**self).get(url)
    }
}

/// [`Transport`] backed by a blocking reqwest client
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::blocking::Client,
    api_base: Url,
    token: Option<String>,
}

impl HttpTransport {
    /// Build a client with the configured timeouts and User-Agent
    pub fn new(config: &ResolverConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json, */*"));

        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .build()
            .context("Failed to create HTTP client")?;

        let api_base = Url::parse(config.api_base())
            .with_context(|| format!("Invalid api_base_url '{}'", config.api_base_url))?;

        Ok(Self {
            client,
            api_base,
            token: config.token.clone(),
        })
    }

    /// The token is only ever sent to the API origin (same scheme, host and
    /// port) under the API base path, never to raw-content or archive
    /// redirects on other hosts.
    fn authorization_for(&self, url: &str) -> Option<String> {
        let token = self.token.as_ref()?;
        let url = Url::parse(url).ok()?;
        self.is_api_url(&url).then(|| format!("token {}", token))
    }

    fn is_api_url(&self, url: &Url) -> bool {
        let base = &self.api_base;
        if url.scheme() != base.scheme()
            || url.host_str() != base.host_str()
            || url.port_or_known_default() != base.port_or_known_default()
        {
            return false;
        }

        let base_path = base.path().trim_end_matches('/');
        base_path.is_empty()
            || url.path() == base_path
            || url
                .path()
                .strip_prefix(base_path)
                .is_some_and(|rest| rest.starts_with('/'))
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str) -> Result<TransportResponse, TransportError> {
        tracing::debug!(url, "GET");

        let mut request = self.client.get(url);
        if let Some(auth) = self.authorization_for(url) {
            request = request.header(AUTHORIZATION, auth);
        }

        let response = request.send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let effective_url = response.url().to_string();
        if effective_url != url {
            tracing::debug!(from = url, to = %effective_url, "followed redirect");
        }

        Ok(TransportResponse::new(effective_url, Box::new(response)))
    }
}
