use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};

use gidata_core::{CredentialManager, GiDataError, HttpRequest, HttpResponse, HttpTransport, Method};

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(160);

/// [`HttpTransport`] over a shared `reqwest::Client`.
///
/// A fresh bearer token is requested from the credential manager for every
/// request, so refreshing is entirely the manager's business.
pub struct ReqwestTransport {
    client: reqwest::Client,
    base_url: String,
    credentials: Arc<dyn CredentialManager>,
}

impl ReqwestTransport {
    /// Transport for `base_url` with the given request timeout.
    ///
    /// # Errors
    /// Returns `Upstream(Connection)` if the HTTP client cannot be built.
    pub fn new(
        base_url: &str,
        credentials: Arc<dyn CredentialManager>,
        timeout: Duration,
    ) -> Result<Self, GiDataError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GiDataError::connection(format!("http client: {e}")))?;
        Ok(Self::with_client(client, base_url, credentials))
    }

    /// Wrap an existing client, e.g. one with custom TLS roots or a proxy.
    #[must_use]
    pub fn with_client(
        client: reqwest::Client,
        base_url: &str,
        credentials: Arc<dyn CredentialManager>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
        }
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}/{path}", self.base_url)
        }
    }
}

fn map_reqwest_error(e: &reqwest::Error, operation: &str) -> GiDataError {
    if e.is_timeout() {
        GiDataError::timeout(operation)
    } else {
        GiDataError::connection(e.to_string())
    }
}

const fn verb(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Delete => reqwest::Method::DELETE,
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "gidata_http::transport::send",
            skip(self, req),
            fields(method = req.method.as_str(), path = %req.path),
        )
    )]
    async fn send(&self, req: HttpRequest) -> Result<HttpResponse, GiDataError> {
        let operation = format!("{} {}", req.method.as_str(), req.path);
        let token = self.credentials.bearer().await?;
        let mut builder = self
            .client
            .request(verb(req.method), self.url(&req.path))
            .header(AUTHORIZATION, format!("Bearer {token}"));
        if let Some(body) = req.body {
            let content_type = req
                .content_type
                .unwrap_or_else(|| "application/json".to_string());
            builder = builder.header(CONTENT_TYPE, content_type).body(body);
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(url = %self.url(&req.path), "request");

        let resp = builder
            .send()
            .await
            .map_err(|e| map_reqwest_error(&e, &operation))?;
        let status = resp.status().as_u16();
        let body = resp
            .bytes()
            .await
            .map_err(|e| map_reqwest_error(&e, &operation))?;

        #[cfg(feature = "tracing")]
        {
            tracing::debug!(status, len = body.len(), "response");
            if status >= 400 {
                let text = String::from_utf8_lossy(&body);
                tracing::debug!(body = %text.chars().take(500).collect::<String>(), "error body");
            }
        }

        HttpResponse::new(status, body.to_vec()).error_for_status()
    }
}
