use std::sync::Arc;

use async_trait::async_trait;
use futures::future::try_join_all;
use serde::Deserialize;
use uuid::Uuid;

use crate::cache::{FieldCache, FieldInfo, SourceMapping, WireMapping};
use crate::gql::GqlClient;
use crate::query::{self, ExportColumn};
use gidata_core::driver::{
    BufferProvider, ExportProvider, ImportProvider, OnlineProvider, StructureProvider,
};
use gidata_core::import::{ImportKind, run_import_session};
use gidata_core::timeseries::assemble_raw;
use gidata_core::window::prepare_fetch;
use gidata_core::{
    Clock, CloudConfig, CsvImportSettings, DataDriver, DataRequest, ExportFormat, ExportRequest,
    GiDataError, HttpTransport, LogSettings, SourceId, SystemClock, TabularFrame, TimeWindow,
    VariableSelector,
};
use gidata_http::{RestOnline, RestStructure};

#[derive(Deserialize)]
struct RawPayload {
    #[serde(default)]
    data: Vec<Vec<Option<f64>>>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ExportPayload {
    File { file: String },
    Text(String),
}

/// Selectors grouped by source, groups in order of first appearance.
fn group_by_source(selectors: &[VariableSelector]) -> Vec<(&SourceId, Vec<&VariableSelector>)> {
    let mut groups: Vec<(&SourceId, Vec<&VariableSelector>)> = Vec::new();
    for s in selectors {
        match groups.iter_mut().find(|(sid, _)| **sid == s.source) {
            Some((_, members)) => members.push(s),
            None => groups.push((&s.source, vec![s])),
        }
    }
    groups
}

async fn load_mapping(gql: GqlClient, sid: String) -> Result<SourceMapping, GiDataError> {
    let wire: WireMapping = gql
        .query_field(&query::variable_mapping(&sid), "variableMapping")
        .await?;
    Ok(wire.into())
}

/// GI.cloud driver.
///
/// Implements online, structure, buffer, export and import. History fetches
/// are served by the REST history driver.
pub struct CloudGqlDriver {
    http: Arc<dyn HttpTransport>,
    gql: GqlClient,
    cache: FieldCache,
    clock: Arc<dyn Clock>,
    config: CloudConfig,
    online: RestOnline,
    structure: RestStructure,
}

impl CloudGqlDriver {
    /// Driver over `http` with the given endpoint layout.
    #[must_use]
    pub fn new(http: Arc<dyn HttpTransport>, config: CloudConfig) -> Self {
        Self {
            gql: GqlClient::new(Arc::clone(&http), config.graphql_path.clone()),
            online: RestOnline::new(Arc::clone(&http)),
            structure: RestStructure::new(Arc::clone(&http), config.structure_root.clone()),
            cache: FieldCache::new(),
            clock: Arc::new(SystemClock),
            config,
            http,
        }
    }

    /// Resolve relative windows against `clock` instead of the wall clock.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// The field cache shared by all fetches of this driver.
    #[must_use]
    pub const fn field_cache(&self) -> &FieldCache {
        &self.cache
    }

    async fn resolve(
        &self,
        sid: &str,
        variables: &[Uuid],
    ) -> Result<(Arc<SourceMapping>, Vec<FieldInfo>), GiDataError> {
        let gql = self.gql.clone();
        let owned = sid.to_string();
        self.cache
            .resolve(sid, variables, move || load_mapping(gql, owned))
            .await
    }

    async fn fetch_source(
        &self,
        source: &SourceId,
        members: &[&VariableSelector],
        from_ms: f64,
        to_ms: f64,
    ) -> Result<TabularFrame, GiDataError> {
        let sid = source.to_string();
        let variables: Vec<Uuid> = members.iter().map(|s| s.variable).collect();
        let (_, infos) = self.resolve(&sid, &variables).await?;
        let fields: Vec<String> = infos.into_iter().map(|f| f.field).collect();

        let raw: RawPayload = self
            .gql
            .query_field(&query::raw(&sid, &fields, from_ms, to_ms), "Raw")
            .await?;
        let order: Vec<String> = members.iter().map(|s| s.column_key()).collect();
        assemble_raw(&order, &raw.data)
    }

    async fn export_csv(&self, req: &ExportRequest) -> Result<Vec<u8>, GiDataError> {
        let (from, to) = prepare_fetch(&req.selectors, &req.window, req.points, self.clock.as_ref())?;
        let groups = group_by_source(&req.selectors);
        let [(source, members)] = groups.as_slice() else {
            return Err(GiDataError::invalid_arg(
                "a cloud CSV export must select variables of exactly one source",
            ));
        };
        let sid = source.to_string();
        let variables: Vec<Uuid> = members.iter().map(|s| s.variable).collect();
        let (mapping, infos) = self.resolve(&sid, &variables).await?;
        let columns: Vec<ExportColumn> = infos
            .into_iter()
            .map(|f| ExportColumn {
                alias: query::export_alias(
                    &f.name,
                    &mapping.name,
                    &self.config.default_aggregation,
                    &f.unit,
                ),
                name: f.field,
            })
            .collect();

        let payload: ExportPayload = self
            .gql
            .query_field(
                &query::export_csv(&sid, &columns, from, to, &req.csv),
                "exportCSV",
            )
            .await?;
        Ok(match payload {
            ExportPayload::File { file } | ExportPayload::Text(file) => file.into_bytes(),
        })
    }

    async fn export_udbf(&self, req: &ExportRequest) -> Result<Vec<u8>, GiDataError> {
        let (from, to) = prepare_fetch(&req.selectors, &req.window, req.points, self.clock.as_ref())?;
        let body = DataRequest::new(from, to, &req.selectors, req.points).with_format("udbf");
        let path = format!("/{}/data", req.domain.as_str());
        self.http.post_json_bytes(&path, &body).await
    }
}

impl DataDriver for CloudGqlDriver {
    fn name(&self) -> &'static str {
        "gidata-cloud"
    }

    fn as_online_provider(&self) -> Option<&dyn OnlineProvider> {
        Some(&self.online as &dyn OnlineProvider)
    }

    fn as_structure_provider(&self) -> Option<&dyn StructureProvider> {
        Some(&self.structure as &dyn StructureProvider)
    }

    fn as_buffer_provider(&self) -> Option<&dyn BufferProvider> {
        Some(self as &dyn BufferProvider)
    }

    fn as_export_provider(&self) -> Option<&dyn ExportProvider> {
        Some(self as &dyn ExportProvider)
    }

    fn as_import_provider(&self) -> Option<&dyn ImportProvider> {
        Some(self as &dyn ImportProvider)
    }
}

#[async_trait]
impl BufferProvider for CloudGqlDriver {
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "gidata_cloud::driver::fetch_buffer",
            skip(self, selectors, window),
            fields(n = selectors.len()),
        )
    )]
    async fn fetch_buffer(
        &self,
        selectors: &[VariableSelector],
        window: TimeWindow,
        points: u32,
    ) -> Result<TabularFrame, GiDataError> {
        let (from, to) = prepare_fetch(selectors, &window, points, self.clock.as_ref())?;
        let groups = group_by_source(selectors);
        let frames = try_join_all(
            groups
                .iter()
                .map(|(source, members)| self.fetch_source(source, members, from, to)),
        )
        .await?;

        let order: Vec<String> = selectors.iter().map(VariableSelector::column_key).collect();
        let frame = TabularFrame::outer_join(frames).select_columns(&order)?;

        #[cfg(feature = "tracing")]
        tracing::debug!(rows = frame.len(), sources = groups.len(), "joined raw frames");

        Ok(frame.downsample(usize::try_from(points).unwrap_or(usize::MAX)))
    }
}

#[async_trait]
impl ExportProvider for CloudGqlDriver {
    async fn export(&self, req: &ExportRequest) -> Result<Vec<u8>, GiDataError> {
        match req.format {
            ExportFormat::Csv => self.export_csv(req).await,
            ExportFormat::Udbf => self.export_udbf(req).await,
        }
    }
}

#[async_trait]
impl ImportProvider for CloudGqlDriver {
    async fn import_csv(
        &self,
        bytes: Vec<u8>,
        target: &LogSettings,
        settings: &CsvImportSettings,
    ) -> Result<(), GiDataError> {
        run_import_session(
            self.http.as_ref(),
            ImportKind::Csv,
            target,
            Some(settings),
            bytes,
        )
        .await
    }

    async fn import_udbf(&self, bytes: Vec<u8>, target: &LogSettings) -> Result<(), GiDataError> {
        run_import_session(self.http.as_ref(), ImportKind::Udbf, target, None, bytes).await
    }
}
