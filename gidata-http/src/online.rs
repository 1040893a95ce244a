use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::envelope::Envelope;
use gidata_core::driver::{OnlineProvider, StructureProvider};
use gidata_core::{
    GiDataError, HttpTransport, OnlineFunction, OnlineVariable, SourceId, StreamSource,
    StreamVariable,
};

const ONLINE_DATA: &str = "/online/data";
const ONLINE_VARIABLES: &str = "/online/structure/variables";

#[derive(Serialize)]
struct OnlineBody<'a> {
    #[serde(rename = "Variables")]
    variables: Vec<String>,
    #[serde(rename = "Values", skip_serializing_if = "Option::is_none")]
    values: Option<Vec<f64>>,
    #[serde(rename = "Function")]
    function: &'a str,
}

#[derive(Deserialize, Default)]
struct OnlineValues {
    #[serde(rename = "Values", default)]
    values: Vec<serde_json::Value>,
}

fn scalar(v: &serde_json::Value) -> Option<f64> {
    match v {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::Array(items) => items.iter().rev().find_map(serde_json::Value::as_f64),
        serde_json::Value::Object(map) => map.get("Value").and_then(serde_json::Value::as_f64),
        _ => None,
    }
}

/// The `/online/...` current-value surface, shared by the REST and cloud drivers.
#[derive(Clone)]
pub struct RestOnline {
    http: Arc<dyn HttpTransport>,
}

impl RestOnline {
    /// Online surface over `http`.
    #[must_use]
    pub fn new(http: Arc<dyn HttpTransport>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl OnlineProvider for RestOnline {
    async fn list_variables(&self) -> Result<Vec<OnlineVariable>, GiDataError> {
        let env: Envelope<Vec<OnlineVariable>> = self.http.get_json(ONLINE_VARIABLES).await?;
        Ok(env.data)
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "gidata_http::online::read", skip(self, variables), fields(n = variables.len()))
    )]
    async fn read(&self, variables: &[Uuid]) -> Result<BTreeMap<Uuid, f64>, GiDataError> {
        if variables.is_empty() {
            return Err(GiDataError::invalid_arg("no variables to read"));
        }
        let body = OnlineBody {
            variables: variables.iter().map(ToString::to_string).collect(),
            values: None,
            function: OnlineFunction::Read.as_str(),
        };
        let env: Envelope<OnlineValues> = self.http.post_json(ONLINE_DATA, &body).await?;
        let values = env.data.values;
        if values.len() != variables.len() {
            return Err(GiDataError::data(format!(
                "requested {} online values, got {}",
                variables.len(),
                values.len()
            )));
        }
        variables
            .iter()
            .zip(&values)
            .map(|(id, raw)| {
                scalar(raw)
                    .map(|v| (*id, v))
                    .ok_or_else(|| GiDataError::data(format!("no numeric value for {id}")))
            })
            .collect()
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "gidata_http::online::write", skip(self, values), fields(n = values.len()))
    )]
    async fn write(&self, values: &[(Uuid, f64)]) -> Result<(), GiDataError> {
        if values.is_empty() {
            return Err(GiDataError::invalid_arg("no values to write"));
        }
        let body = OnlineBody {
            variables: values.iter().map(|(id, _)| id.to_string()).collect(),
            values: Some(values.iter().map(|(_, v)| *v).collect()),
            function: OnlineFunction::Write.as_str(),
        };
        self.http.post_json_bytes(ONLINE_DATA, &body).await?;
        Ok(())
    }
}

/// Stream structure published under `/{root}/structure/sources`.
#[derive(Clone)]
pub struct RestStructure {
    http: Arc<dyn HttpTransport>,
    root: String,
}

impl RestStructure {
    /// Structure surface rooted at `/{root}` (`buffer`, `history`, `kafka`, ...).
    pub fn new(http: Arc<dyn HttpTransport>, root: impl Into<String>) -> Self {
        Self {
            http,
            root: root.into(),
        }
    }
}

#[async_trait]
impl StructureProvider for RestStructure {
    async fn list_sources(&self) -> Result<Vec<StreamSource>, GiDataError> {
        let path = format!("/{}/structure/sources", self.root);
        let env: Envelope<Vec<StreamSource>> = self.http.get_json(&path).await?;
        Ok(env.data)
    }

    async fn list_stream_variables(
        &self,
        source: &SourceId,
    ) -> Result<Vec<StreamVariable>, GiDataError> {
        let path = format!("/{}/structure/sources/{source}/variables", self.root);
        let env: Envelope<Vec<StreamVariable>> = self.http.get_json(&path).await?;
        Ok(env
            .data
            .into_iter()
            .map(|mut v| {
                v.sid = source.clone();
                v
            })
            .collect())
    }
}
