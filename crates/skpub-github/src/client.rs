//! Authenticated GitHub API requests.
//!
//! [`GithubClient`] builds requests carrying the mandatory headers and hands
//! them to a [`Transport`]. Any non-2xx response becomes
//! [`GithubError::Api`] with the redacted request attached, so diagnostics
//! never contain the credential.

use std::fmt;
use std::future::Future;
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tokio_util::io::ReaderStream;
use tracing::debug;

use crate::token::REDACTED_AUTHORIZATION;
use crate::{GithubError, GithubResult, Token};

/// Default REST API base URL.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Default release asset upload base URL.
pub const DEFAULT_UPLOADS_URL: &str = "https://uploads.github.com";

/// Default `User-Agent` header.
pub const DEFAULT_USER_AGENT: &str = "skpub-release-agent";

/// Versioned media type sent as `Accept`.
pub const ACCEPT: &str = "application/vnd.github.v3+json";

/// HTTP methods used against the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    /// Returns the method name as sent on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request payload.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// No body.
    Empty,
    /// A JSON document.
    Json(Value),
    /// A local file streamed as the raw body.
    File { path: PathBuf, len: u64 },
}

/// A single API request.
#[derive(Clone)]
pub struct ApiRequest {
    /// HTTP method.
    pub method: Method,
    /// Absolute URL, including any query string.
    pub url: String,
    /// Header name/value pairs, in insertion order.
    pub headers: Vec<(String, String)>,
    /// Request payload.
    pub body: RequestBody,
}

impl ApiRequest {
    /// Creates a request without headers or body.
    #[must_use]
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: RequestBody::Empty,
        }
    }

    /// Adds a header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Sets a JSON body.
    #[must_use]
    pub fn with_json(mut self, json: Value) -> Self {
        self.body = RequestBody::Json(json);
        self
    }

    /// Sets a streamed file body.
    #[must_use]
    pub fn with_file(mut self, path: impl Into<PathBuf>, len: u64) -> Self {
        self.body = RequestBody::File {
            path: path.into(),
            len,
        };
        self
    }

    /// Looks up a header value, ignoring case.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Returns the JSON body, if any.
    #[must_use]
    pub fn json(&self) -> Option<&Value> {
        match &self.body {
            RequestBody::Json(json) => Some(json),
            _ => None,
        }
    }

    /// Serializes the request with the `Authorization` header masked.
    #[must_use]
    pub fn redacted(&self) -> Value {
        let headers: Map<String, Value> = self
            .headers
            .iter()
            .map(|(name, value)| {
                let value = if name.eq_ignore_ascii_case("authorization") {
                    REDACTED_AUTHORIZATION
                } else {
                    value.as_str()
                };
                (name.clone(), Value::String(value.to_string()))
            })
            .collect();

        let mut request = Map::new();
        request.insert("method".to_string(), Value::from(self.method.as_str()));
        request.insert("url".to_string(), Value::from(self.url.as_str()));
        request.insert("headers".to_string(), Value::Object(headers));
        match &self.body {
            RequestBody::Empty => {}
            RequestBody::Json(json) => {
                request.insert("json".to_string(), json.clone());
            }
            RequestBody::File { path, len } => {
                request.insert(
                    "file".to_string(),
                    serde_json::json!({ "path": path.display().to_string(), "len": len }),
                );
            }
        }
        Value::Object(request)
    }
}

impl fmt::Debug for ApiRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ApiRequest({})", self.redacted())
    }
}

/// Builds the error for a non-2xx response.
///
/// The response body is parsed as JSON when possible (kept raw under `body`
/// otherwise) and the redacted request is attached under `request`.
#[must_use]
pub fn api_error(request: &ApiRequest, status: u16, body: &str) -> GithubError {
    let mut details = match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => map,
        Ok(other) => Map::from_iter([("body".to_string(), other)]),
        Err(_) => Map::from_iter([("body".to_string(), Value::from(body))]),
    };
    details.insert("request".to_string(), request.redacted());

    let details = serde_json::to_string_pretty(&Value::Object(details))
        .unwrap_or_else(|_| body.to_string());

    GithubError::Api { status, details }
}

/// Sends a request and resolves with the raw response body.
pub trait Transport: Send + Sync {
    /// Performs the request.
    ///
    /// Resolves with the body of any 2xx response. Fails with
    /// [`GithubError::Transport`] when no response was received and with
    /// [`GithubError::Api`] on any other status.
    fn send(&self, request: ApiRequest) -> impl Future<Output = GithubResult<String>> + Send;
}

/// [`Transport`] backed by `reqwest`.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Creates a transport with a default HTTP client.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    async fn execute(&self, request: ApiRequest) -> GithubResult<String> {
        let transport_error = |source| GithubError::Transport {
            url: request.url.clone(),
            source,
        };

        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self.client.request(method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }

        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(json) => builder.json(json),
            RequestBody::File { path, .. } => {
                let file = tokio::fs::File::open(path)
                    .await
                    .map_err(|source| GithubError::Asset {
                        path: path.clone(),
                        source,
                    })?;
                builder.body(reqwest::Body::wrap_stream(ReaderStream::new(file)))
            }
        };

        let response = builder.send().await.map_err(transport_error)?;
        let status = response.status();
        let body = response.text().await.map_err(transport_error)?;

        if !status.is_success() {
            return Err(api_error(&request, status.as_u16(), &body));
        }

        Ok(body)
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: ApiRequest) -> impl Future<Output = GithubResult<String>> + Send {
        self.execute(request)
    }
}

/// Endpoint and identification settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    /// REST API base URL.
    pub api_url: String,
    /// Asset upload base URL.
    pub uploads_url: String,
    /// `User-Agent` header value.
    pub user_agent: String,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            uploads_url: DEFAULT_UPLOADS_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Authenticated GitHub API client.
pub struct GithubClient<T = HttpTransport> {
    transport: T,
    token: Token,
    settings: ClientSettings,
}

impl GithubClient<HttpTransport> {
    /// Creates a client talking to github.com over HTTP.
    #[must_use]
    pub fn new(token: Token) -> Self {
        Self::with_transport(HttpTransport::new(), token, ClientSettings::default())
    }
}

impl<T: Transport> GithubClient<T> {
    /// Creates a client over the given transport.
    #[must_use]
    pub fn with_transport(transport: T, token: Token, settings: ClientSettings) -> Self {
        Self {
            transport,
            token,
            settings,
        }
    }

    /// Returns the underlying transport.
    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Resolves a path such as `/user` against the API base URL.
    #[must_use]
    pub fn api_url(&self, path: &str) -> String {
        format!("{}{path}", self.settings.api_url.trim_end_matches('/'))
    }

    /// Resolves a path against the uploads base URL.
    #[must_use]
    pub fn uploads_url(&self, path: &str) -> String {
        format!("{}{path}", self.settings.uploads_url.trim_end_matches('/'))
    }

    /// Starts a request with the `Accept`, `Authorization` and
    /// `User-Agent` headers set.
    #[must_use]
    pub fn request(&self, method: Method, url: impl Into<String>) -> ApiRequest {
        ApiRequest::new(method, url)
            .with_header("Accept", ACCEPT)
            .with_header("Authorization", self.token.authorization())
            .with_header("User-Agent", self.settings.user_agent.as_str())
    }

    /// Sends a request and returns the raw body.
    ///
    /// # Errors
    ///
    /// Returns the transport's error unchanged.
    pub async fn send(&self, request: ApiRequest) -> GithubResult<String> {
        debug!(method = %request.method, url = %request.url, "sending GitHub request");
        self.transport.send(request).await
    }

    /// Sends a request and decodes the JSON response.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not a valid `D`.
    pub async fn send_json<D: DeserializeOwned>(
        &self,
        request: ApiRequest,
        what: &'static str,
    ) -> GithubResult<D> {
        let body = self.send(request).await?;
        serde_json::from_str(&body).map_err(|source| GithubError::Decode { what, source })
    }

    /// Fetches and decodes `GET {api}{path}`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body cannot be decoded.
    pub async fn get_json<D: DeserializeOwned>(
        &self,
        path: &str,
        what: &'static str,
    ) -> GithubResult<D> {
        let request = self.request(Method::Get, self.api_url(path));
        self.send_json(request, what).await
    }
}
