use crate::error::{Error, FalError, Result};
use reqwest::{header::AUTHORIZATION, RequestBuilder};
use serde::Serialize;
use std::sync::Arc;

pub const DEFAULT_BASE_URL: &str = "https://fal.run";
pub const CREDENTIAL_KEY: &str = "FAL_KEY";
pub const BASE_URL_KEY: &str = "FAL_BASE_URL";

/// Authenticated HTTP client for fal's synchronous inference endpoints.
#[derive(Clone)]
pub struct Client {
    inner: reqwest::Client,
    api_key: Arc<str>,
    base_url: Arc<str>,
}

impl Client {
    /// Creates a new client.
    ///
    /// If `api_key` is `None`, the `FAL_KEY` environment variable (or `.env` entry) is used instead.
    /// Fails with [`Error::MissingCredential`] when neither is available.
    pub fn new(api_key: Option<&str>) -> Result<Self> {
        let api_key: Arc<str> = match api_key {
            Some(key) => key.into(),
            None => dotenv::var(CREDENTIAL_KEY)
                .map_err(|_| Error::MissingCredential)?
                .into(),
        };

        if api_key.trim().is_empty() {
            return Err(Error::MissingCredential);
        }

        let base_url = dotenv::var(BASE_URL_KEY).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        return Ok(Self {
            inner: reqwest::Client::new(),
            api_key,
            base_url: base_url.trim_end_matches('/').into(),
        });
    }

    /// Points the client at a different host (a proxy, or a local stand-in).
    #[inline]
    pub fn with_base_url(mut self, base_url: impl AsRef<str>) -> Self {
        self.base_url = base_url.as_ref().trim_end_matches('/').into();
        self
    }

    /// Replaces the underlying HTTP client, keeping credentials and base URL.
    #[inline]
    pub fn with_http_client(mut self, inner: reqwest::Client) -> Self {
        self.inner = inner;
        self
    }

    #[inline]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Runs `model` synchronously with the given arguments, returning the raw response body.
    pub async fn run<A: ?Sized + Serialize>(
        &self,
        model: &str,
        arguments: &A,
    ) -> Result<serde_json::Value> {
        let url = format!("{}/{}", self.base_url, model.trim_start_matches('/'));

        #[cfg(feature = "tracing")]
        tracing::debug!(%url, "running model");

        let resp = self.post(url).json(arguments).send().await?;
        let status = resp.status();
        let body = resp.bytes().await?;

        if !status.is_success() {
            return Err(match serde_json::from_slice::<FalError>(&body) {
                Ok(err) => Error::Fal(err.with_status(status.as_u16())),
                Err(_) => Error::msg(format!(
                    "[{}] {}",
                    status.as_u16(),
                    String::from_utf8_lossy(&body).trim()
                )),
            });
        }

        if body.is_empty() {
            return Err(Error::msg("Empty response"));
        }

        return Ok(serde_json::from_slice(&body)?);
    }

    /// Plain GET, without credentials, for fetching generated files.
    #[inline]
    pub fn get(&self, url: impl reqwest::IntoUrl) -> RequestBuilder {
        self.inner.get(url)
    }

    #[inline]
    fn post(&self, url: impl reqwest::IntoUrl) -> RequestBuilder {
        self.inner
            .post(url)
            .header(AUTHORIZATION, format!("Key {}", self.api_key))
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish_non_exhaustive()
    }
}

impl AsRef<Client> for Client {
    #[inline]
    fn as_ref(&self) -> &Client {
        self
    }
}
