use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;

use gidata_types::GiDataError;

/// HTTP verbs used by the backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `DELETE`
    Delete,
}

impl Method {
    /// Upper-case verb.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Delete => "DELETE",
        }
    }
}

/// A request relative to the transport's base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    /// Verb.
    pub method: Method,
    /// Path starting with `/`.
    pub path: String,
    /// Optional body.
    pub body: Option<Vec<u8>>,
    /// Content type of `body`.
    pub content_type: Option<String>,
}

impl HttpRequest {
    /// Body-less request.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            content_type: None,
        }
    }

    /// Attach a raw body.
    #[must_use]
    pub fn body(mut self, bytes: Vec<u8>, content_type: impl Into<String>) -> Self {
        self.body = Some(bytes);
        self.content_type = Some(content_type.into());
        self
    }

    /// Attach a JSON body.
    ///
    /// # Errors
    /// Returns `Data` when `value` cannot be serialized.
    pub fn json<T: Serialize + ?Sized>(self, value: &T) -> Result<Self, GiDataError> {
        let bytes = serde_json::to_vec(value)?;
        Ok(self.body(bytes, "application/json"))
    }

    /// Body decoded as UTF-8 JSON, when there is one.
    #[must_use]
    pub fn json_body(&self) -> Option<serde_json::Value> {
        self.body
            .as_deref()
            .and_then(|b| serde_json::from_slice(b).ok())
    }
}

/// A response as returned by a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Raw body.
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Build a response.
    #[must_use]
    pub const fn new(status: u16, body: Vec<u8>) -> Self {
        Self { status, body }
    }

    /// Map statuses `>= 400` to `Upstream(Status)` carrying the body text.
    ///
    /// # Errors
    /// Returns the status error for failing responses.
    pub fn error_for_status(self) -> Result<Self, GiDataError> {
        if self.status >= 400 {
            return Err(GiDataError::upstream_status(self.status, self.text()));
        }
        Ok(self)
    }

    /// Body as lossy UTF-8.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Decode the body as JSON.
    ///
    /// # Errors
    /// Returns `Data` if the body is not valid JSON for `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, GiDataError> {
        serde_json::from_slice(&self.body).map_err(|e| {
            GiDataError::data(format!("unexpected response body: {e}"))
        })
    }
}

/// Byte-level HTTP plumbing shared by every driver of a client.
///
/// Implementations attach the bearer token to every request and map statuses
/// `>= 400` to `Upstream(Status)` (see [`HttpResponse::error_for_status`]).
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Base URL requests are relative to.
    fn base_url(&self) -> &str;

    /// Send a request.
    async fn send(&self, req: HttpRequest) -> Result<HttpResponse, GiDataError>;
}

impl<'a> dyn HttpTransport + 'a {
    /// `GET path` and decode the JSON body.
    ///
    /// # Errors
    /// Propagates transport and decode failures.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, GiDataError> {
        self.send(HttpRequest::new(Method::Get, path)).await?.json()
    }

    /// `POST path` with a JSON body and decode the JSON response.
    ///
    /// # Errors
    /// Propagates transport and decode failures.
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, GiDataError>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let req = HttpRequest::new(Method::Post, path).json(body)?;
        self.send(req).await?.json()
    }

    /// `POST path` with a JSON body and return the raw response bytes.
    ///
    /// # Errors
    /// Propagates transport failures.
    pub async fn post_json_bytes<B>(&self, path: &str, body: &B) -> Result<Vec<u8>, GiDataError>
    where
        B: Serialize + Sync + ?Sized,
    {
        let req = HttpRequest::new(Method::Post, path).json(body)?;
        Ok(self.send(req).await?.body)
    }

    /// `POST path` with a raw body.
    ///
    /// # Errors
    /// Propagates transport failures.
    pub async fn post_bytes(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<HttpResponse, GiDataError> {
        self.send(HttpRequest::new(Method::Post, path).body(bytes, content_type))
            .await
    }

    /// `DELETE path`.
    ///
    /// # Errors
    /// Propagates transport failures.
    pub async fn delete(&self, path: &str) -> Result<HttpResponse, GiDataError> {
        self.send(HttpRequest::new(Method::Delete, path)).await
    }
}

/// Supplies bearer tokens and tells which backend flavour they belong to.
#[async_trait]
pub trait CredentialManager: Send + Sync {
    /// Current access token (refreshed by the implementation as needed).
    async fn bearer(&self) -> Result<String, GiDataError>;

    /// Whether the credentials target the cloud backend.
    fn is_cloud_environment(&self) -> bool {
        false
    }
}

/// Fixed access token with an explicit environment flag.
#[derive(Debug, Clone)]
pub struct StaticCredentials {
    token: String,
    cloud: bool,
}

impl StaticCredentials {
    /// Token for an on-premise backend.
    pub fn local(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            cloud: false,
        }
    }

    /// Token for the cloud backend.
    pub fn cloud(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            cloud: true,
        }
    }
}

#[async_trait]
impl CredentialManager for StaticCredentials {
    async fn bearer(&self) -> Result<String, GiDataError> {
        Ok(self.token.clone())
    }

    fn is_cloud_environment(&self) -> bool {
        self.cloud
    }
}
