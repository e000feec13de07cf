//! `ApiClient`: one HTTP request per call against the backend.

use std::sync::{Arc, PoisonError, RwLock};

use bookstore_core::pagination::Page;
use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::config::ApiConfig;
use crate::envelope;
use crate::error::ApiError;

/// Query parameters for a request.
pub type Query<'a> = &'a [(&'a str, String)];

/// Client for the bookstore backend.
///
/// Cheap to clone; clones share the HTTP connection pool and bearer token.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    http: reqwest::Client,
    base_url: Url,
    token: RwLock<Option<SecretString>>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("token", &self.has_token().then_some("[REDACTED]"))
            .finish()
    }
}

impl ApiClient {
    /// Create a client for the configured backend.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("bookstore-client/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                http,
                base_url: config.base_url.clone(),
                token: RwLock::new(None),
            }),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Attach `token` as `Authorization: Bearer` to every later request.
    pub fn set_token(&self, token: SecretString) {
        *self
            .inner
            .token
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(token);
    }

    pub fn clear_token(&self) {
        *self
            .inner
            .token
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }

    #[must_use]
    pub fn has_token(&self) -> bool {
        self.inner
            .token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    fn bearer(&self) -> Option<String> {
        self.inner
            .token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|t| t.expose_secret().to_string())
    }

    /// Build the URL for `path` (slash-separated, each segment percent-encoded)
    /// with `query` appended.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidUrl`] if the base URL cannot take path
    /// segments or `path` contains a `.` or `..` segment.
    pub fn endpoint(&self, path: &str, query: Query<'_>) -> Result<Url, ApiError> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        self.endpoint_segments(&segments, query)
    }

    /// Build the URL from segments taken verbatim: a `/` inside a segment is
    /// encoded as `%2F` instead of starting a new one. Use this for any
    /// segment that comes from user input.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidUrl`] if the base URL cannot take path
    /// segments or a segment is empty, `.` or `..`.
    pub fn endpoint_segments(&self, segments: &[&str], query: Query<'_>) -> Result<Url, ApiError> {
        if let Some(bad) = segments.iter().copied().find(|s| matches!(*s, "" | "." | "..")) {
            return Err(ApiError::InvalidUrl(format!("path segment {bad:?}")));
        }
        let mut url = self.inner.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|()| ApiError::InvalidUrl(self.inner.base_url.to_string()))?;
            path.pop_if_empty();
            path.extend(segments);
        }
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    /// Send one request and decode the success payload.
    #[instrument(skip_all, fields(method = %method, path = %url.path()))]
    async fn send<B, T>(&self, method: Method, url: Url, body: Option<&B>) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let mut request = self.inner.http.request(method, url);
        if let Some(token) = self.bearer() {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let err = envelope::error_from_body(status.as_u16(), &text);
            debug!(status = %status, error = %err, "request failed");
            return Err(err);
        }

        envelope::decode(&text).inspect_err(|e| {
            warn!(
                error = %e,
                body = %text.chars().take(500).collect::<String>(),
                "failed to decode response"
            );
        })
    }

    /// `GET path?query`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the payload does not decode.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: Query<'_>,
    ) -> Result<T, ApiError> {
        self.send::<(), T>(Method::GET, self.endpoint(path, query)?, None)
            .await
    }

    /// `GET` on a path given as verbatim segments (see
    /// [`ApiClient::endpoint_segments`]).
    ///
    /// # Errors
    ///
    /// Returns an error if a segment is unusable, the request fails or the
    /// payload does not decode.
    pub async fn get_segments<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: Query<'_>,
    ) -> Result<T, ApiError> {
        let url = self.endpoint_segments(segments, query)?;
        self.send::<(), T>(Method::GET, url, None).await
    }

    /// `POST path` with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the payload does not decode.
    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(Method::POST, self.endpoint(path, &[])?, Some(body))
            .await
    }

    /// `POST path?query` without a body.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the payload does not decode.
    pub async fn post_empty<T: DeserializeOwned>(
        &self,
        path: &str,
        query: Query<'_>,
    ) -> Result<T, ApiError> {
        self.send::<(), T>(Method::POST, self.endpoint(path, query)?, None)
            .await
    }

    /// `PUT path` with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the payload does not decode.
    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(Method::PUT, self.endpoint(path, &[])?, Some(body))
            .await
    }

    /// `PUT path` without a body.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the payload does not decode.
    pub async fn put_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send::<(), T>(Method::PUT, self.endpoint(path, &[])?, None)
            .await
    }

    /// `DELETE path`, ignoring whatever the server returns on success.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.send::<(), serde::de::IgnoredAny>(Method::DELETE, self.endpoint(path, &[])?, None)
            .await?;
        Ok(())
    }

    /// `GET` that fails open: any error is logged and `T::default()` returned.
    pub async fn get_or_default<T>(&self, path: &str, query: Query<'_>) -> T
    where
        T: DeserializeOwned + Default,
    {
        match self.get(path, query).await {
            Ok(value) => value,
            Err(e) => {
                warn!(path = %path, error = %e, "read failed, showing empty result");
                T::default()
            }
        }
    }

    /// Paged `GET`. Accepts either a page object or a bare array (wrapped as
    /// one page).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the payload does not decode.
    pub async fn try_get_page<T>(&self, path: &str, query: Query<'_>) -> Result<Page<T>, ApiError>
    where
        T: DeserializeOwned,
    {
        Ok(match self.get::<PageOrList<T>>(path, query).await? {
            PageOrList::Page(page) => page,
            PageOrList::List(items) => Page::single(items),
        })
    }

    /// Paged `GET` that fails open to an empty page.
    pub async fn get_page<T>(&self, path: &str, query: Query<'_>) -> Page<T>
    where
        T: DeserializeOwned,
    {
        match self.try_get_page(path, query).await {
            Ok(page) => page,
            Err(e) => {
                warn!(path = %path, error = %e, "paged read failed, showing empty page");
                Page::empty()
            }
        }
    }

    /// Single-resource `GET` that fails open to `None`.
    pub async fn get_optional<T: DeserializeOwned>(&self, path: &str) -> Option<T> {
        match self.get::<Option<T>>(path, &[]).await {
            Ok(value) => value,
            Err(e) if e.is_not_found() => {
                debug!(path = %path, "resource not found");
                None
            }
            Err(e) => {
                warn!(path = %path, error = %e, "read failed");
                None
            }
        }
    }
}

#[derive(serde::Deserialize)]
#[serde(untagged)]
enum PageOrList<T> {
    List(Vec<T>),
    Page(Page<T>),
}
