use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use gidata_core::{GiDataError, HttpRequest, HttpResponse, HttpTransport, Method};

type Responder = Arc<dyn Fn(&HttpRequest) -> Result<HttpResponse, GiDataError> + Send + Sync>;

struct Route {
    method: Method,
    path: String,
    prefix: bool,
    responder: Responder,
}

impl Route {
    fn matches(&self, req: &HttpRequest) -> bool {
        self.method == req.method
            && if self.prefix {
                req.path.starts_with(&self.path)
            } else {
                req.path == self.path
            }
    }
}

/// Scripted HTTP transport that records every request.
///
/// Routes are matched in registration order. A path ending in `*` matches by
/// prefix. Unmatched requests fail with HTTP 404.
pub struct MockHttp {
    base_url: String,
    routes: Mutex<Vec<Route>>,
    calls: Mutex<Vec<HttpRequest>>,
    delay: Option<Duration>,
}

impl Default for MockHttp {
    fn default() -> Self {
        Self::new("http://mock.local:8090")
    }
}

impl MockHttp {
    /// Empty mock for `base_url`.
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            routes: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
            delay: None,
        }
    }

    /// Delay every response, e.g. to widen race windows in concurrency tests.
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Answer `method path` with `responder`.
    #[must_use]
    pub fn on<F>(self, method: Method, path: &str, responder: F) -> Self
    where
        F: Fn(&HttpRequest) -> Result<HttpResponse, GiDataError> + Send + Sync + 'static,
    {
        let (path, prefix) = path
            .strip_suffix('*')
            .map_or_else(|| (path.to_string(), false), |p| (p.to_string(), true));
        self.routes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Route {
                method,
                path,
                prefix,
                responder: Arc::new(responder),
            });
        self
    }

    /// Answer `method path` with a fixed JSON body and status 200.
    #[must_use]
    pub fn on_json(self, method: Method, path: &str, body: serde_json::Value) -> Self {
        let bytes = body.to_string().into_bytes();
        self.on(method, path, move |_| Ok(HttpResponse::new(200, bytes.clone())))
    }

    /// Answer `method path` with raw bytes and status 200.
    #[must_use]
    pub fn on_bytes(self, method: Method, path: &str, body: Vec<u8>) -> Self {
        self.on(method, path, move |_| Ok(HttpResponse::new(200, body.clone())))
    }

    /// Answer `method path` with the given status and body text.
    #[must_use]
    pub fn on_status(self, method: Method, path: &str, status: u16, body: &str) -> Self {
        let body = body.to_string();
        self.on(method, path, move |_| {
            HttpResponse::new(status, body.clone().into_bytes()).error_for_status()
        })
    }

    /// Every request received so far.
    #[must_use]
    pub fn calls(&self) -> Vec<HttpRequest> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of requests for exactly `method path`.
    #[must_use]
    pub fn count(&self, method: Method, path: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.method == method && c.path == path)
            .count()
    }

    /// Number of requests whose path starts with `prefix`.
    #[must_use]
    pub fn count_prefix(&self, method: Method, prefix: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.method == method && c.path.starts_with(prefix))
            .count()
    }

    /// JSON bodies of all requests to `method path`, in order.
    #[must_use]
    pub fn json_bodies(&self, method: Method, path: &str) -> Vec<serde_json::Value> {
        self.calls()
            .iter()
            .filter(|c| c.method == method && c.path == path)
            .filter_map(HttpRequest::json_body)
            .collect()
    }
}

#[async_trait]
impl HttpTransport for MockHttp {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn send(&self, req: HttpRequest) -> Result<HttpResponse, GiDataError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(req.clone());
        let responder = self
            .routes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|r| r.matches(&req))
            .map(|r| Arc::clone(&r.responder));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match responder {
            Some(f) => f(&req)?.error_for_status(),
            None => Err(GiDataError::upstream_status(
                404,
                format!("no mock route for {} {}", req.method.as_str(), req.path),
            )),
        }
    }
}
