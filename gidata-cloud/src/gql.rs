use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use gidata_core::{GiDataError, GraphQlError, HttpTransport, UpstreamError};

#[derive(Serialize)]
struct QueryBody<'a> {
    query: &'a str,
}

fn path_segment(v: &serde_json::Value) -> String {
    match v {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn graphql_errors(raw: &serde_json::Value) -> Vec<GraphQlError> {
    raw.get("errors")
        .and_then(serde_json::Value::as_array)
        .map(|list| {
            list.iter()
                .map(|e| GraphQlError {
                    message: e
                        .get("message")
                        .and_then(serde_json::Value::as_str)
                        .unwrap_or("unknown GraphQL error")
                        .to_string(),
                    path: e
                        .get("path")
                        .and_then(serde_json::Value::as_array)
                        .map(|p| p.iter().map(path_segment).collect())
                        .unwrap_or_default(),
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Posts `{"query": ...}` documents to the GraphQL endpoint.
#[derive(Clone)]
pub struct GqlClient {
    http: Arc<dyn HttpTransport>,
    path: String,
}

impl GqlClient {
    /// Client for the endpoint at `path` (e.g. `/__api__/gql`).
    pub fn new(http: Arc<dyn HttpTransport>, path: impl Into<String>) -> Self {
        Self {
            http,
            path: path.into(),
        }
    }

    /// Run `query` and return its `data` object.
    ///
    /// # Errors
    /// Returns `Upstream(GraphQl)` with every reported error when the response
    /// carries a non-empty `errors` array, and `Data` when `data` is absent.
    pub async fn query_raw(&self, query: &str) -> Result<serde_json::Value, GiDataError> {
        #[cfg(feature = "tracing")]
        tracing::debug!(target: "gidata_cloud::gql", len = query.len(), "query");

        let mut raw: serde_json::Value = self
            .http
            .post_json(&self.path, &QueryBody { query })
            .await?;
        let errors = graphql_errors(&raw);
        if !errors.is_empty() {
            #[cfg(feature = "tracing")]
            tracing::warn!(target: "gidata_cloud::gql", count = errors.len(), "graphql errors");
            return Err(UpstreamError::GraphQl(errors).into());
        }
        match raw.get_mut("data").map(serde_json::Value::take) {
            Some(data) if !data.is_null() => Ok(data),
            _ => Err(GiDataError::data("GraphQL response has no data")),
        }
    }

    /// Run `query` and decode `data[field]` as `T`.
    ///
    /// # Errors
    /// As [`query_raw`](Self::query_raw), plus `Data` when the field is missing
    /// or has an unexpected shape.
    pub async fn query_field<T: DeserializeOwned>(
        &self,
        query: &str,
        field: &str,
    ) -> Result<T, GiDataError> {
        let mut data = self.query_raw(query).await?;
        let value = data
            .get_mut(field)
            .map(serde_json::Value::take)
            .ok_or_else(|| GiDataError::data(format!("GraphQL response lacks {field}")))?;
        serde_json::from_value(value)
            .map_err(|e| GiDataError::data(format!("unexpected {field} payload: {e}")))
    }
}
