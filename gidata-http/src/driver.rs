use std::sync::Arc;

use async_trait::async_trait;

use crate::envelope::Envelope;
use crate::online::{RestOnline, RestStructure};
use gidata_core::driver::{
    BufferProvider, ExportProvider, HistoryProvider, ImportProvider, MeasurementProvider,
    OnlineProvider, StructureProvider,
};
use gidata_core::import::{ImportKind, run_import_session};
use gidata_core::timeseries::assemble_equidistant;
use gidata_core::window::prepare_fetch;
use gidata_core::{
    Clock, CsvImportSettings, DataDriver, DataRequest, DataResponse, Domain, ExportFormat,
    ExportRequest, GiDataError, HistoryMeasurement, HttpTransport, LogSettings, SourceId,
    SystemClock, TabularFrame, TimeWindow, VariableSelector,
};

/// REST driver for one data domain.
///
/// The buffer instance serves online values, buffer structure, buffer fetches
/// and exports. The history instance serves history structure, measurements,
/// history fetches, exports and imports.
pub struct HttpTimeSeriesDriver {
    http: Arc<dyn HttpTransport>,
    clock: Arc<dyn Clock>,
    domain: Domain,
    online: RestOnline,
    structure: RestStructure,
}

impl HttpTimeSeriesDriver {
    /// Driver for `domain` using the wall clock.
    #[must_use]
    pub fn new(http: Arc<dyn HttpTransport>, domain: Domain) -> Self {
        Self {
            online: RestOnline::new(Arc::clone(&http)),
            structure: RestStructure::new(Arc::clone(&http), domain.as_str()),
            clock: Arc::new(SystemClock),
            http,
            domain,
        }
    }

    /// Buffer-domain driver.
    #[must_use]
    pub fn buffer(http: Arc<dyn HttpTransport>) -> Self {
        Self::new(http, Domain::Buffer)
    }

    /// History-domain driver.
    #[must_use]
    pub fn history(http: Arc<dyn HttpTransport>) -> Self {
        Self::new(http, Domain::History)
    }

    /// Resolve relative windows against `clock` instead of the wall clock.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Domain this driver serves.
    #[must_use]
    pub const fn domain(&self) -> Domain {
        self.domain
    }

    fn data_path(&self) -> String {
        format!("/{}/data", self.domain.as_str())
    }

    fn request(
        &self,
        selectors: &[VariableSelector],
        window: &TimeWindow,
        points: u32,
    ) -> Result<DataRequest, GiDataError> {
        let (from, to) = prepare_fetch(selectors, window, points, self.clock.as_ref())?;
        let req = DataRequest::new(from, to, selectors, points);
        Ok(match self.domain {
            Domain::History => req.with_var_mapping(),
            Domain::Buffer => req,
        })
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "gidata_http::driver::fetch",
            skip(self, selectors, window),
            fields(domain = self.domain.as_str(), n = selectors.len()),
        )
    )]
    async fn fetch(
        &self,
        selectors: &[VariableSelector],
        window: TimeWindow,
        points: u32,
    ) -> Result<TabularFrame, GiDataError> {
        let body = self.request(selectors, &window, points)?;
        let resp: DataResponse = self.http.post_json(&self.data_path(), &body).await?;
        let ts = resp.into_first()?;
        let order: Vec<String> = selectors.iter().map(VariableSelector::column_key).collect();
        let frame = assemble_equidistant(&order, &ts)?;

        #[cfg(feature = "tracing")]
        tracing::debug!(rows = frame.len(), "assembled frame");

        Ok(frame)
    }

    fn require_history(&self, what: &str) -> Result<(), GiDataError> {
        if self.domain == Domain::History {
            Ok(())
        } else {
            Err(GiDataError::not_supported(format!(
                "{what} on {}",
                self.domain
            )))
        }
    }
}

impl DataDriver for HttpTimeSeriesDriver {
    fn name(&self) -> &'static str {
        match self.domain {
            Domain::Buffer => "gidata-http/buffer",
            Domain::History => "gidata-http/history",
        }
    }

    fn as_online_provider(&self) -> Option<&dyn OnlineProvider> {
        match self.domain {
            Domain::Buffer => Some(&self.online as &dyn OnlineProvider),
            Domain::History => None,
        }
    }

    fn as_structure_provider(&self) -> Option<&dyn StructureProvider> {
        Some(&self.structure as &dyn StructureProvider)
    }

    fn as_measurement_provider(&self) -> Option<&dyn MeasurementProvider> {
        match self.domain {
            Domain::History => Some(self as &dyn MeasurementProvider),
            Domain::Buffer => None,
        }
    }

    fn as_buffer_provider(&self) -> Option<&dyn BufferProvider> {
        match self.domain {
            Domain::Buffer => Some(self as &dyn BufferProvider),
            Domain::History => None,
        }
    }

    fn as_history_provider(&self) -> Option<&dyn HistoryProvider> {
        match self.domain {
            Domain::History => Some(self as &dyn HistoryProvider),
            Domain::Buffer => None,
        }
    }

    fn as_export_provider(&self) -> Option<&dyn ExportProvider> {
        Some(self as &dyn ExportProvider)
    }

    fn as_import_provider(&self) -> Option<&dyn ImportProvider> {
        match self.domain {
            Domain::History => Some(self as &dyn ImportProvider),
            Domain::Buffer => None,
        }
    }
}

#[async_trait]
impl BufferProvider for HttpTimeSeriesDriver {
    async fn fetch_buffer(
        &self,
        selectors: &[VariableSelector],
        window: TimeWindow,
        points: u32,
    ) -> Result<TabularFrame, GiDataError> {
        if self.domain != Domain::Buffer {
            return Err(GiDataError::not_supported("buffer"));
        }
        self.fetch(selectors, window, points).await
    }
}

#[async_trait]
impl HistoryProvider for HttpTimeSeriesDriver {
    async fn fetch_history(
        &self,
        selectors: &[VariableSelector],
        window: TimeWindow,
        points: u32,
    ) -> Result<TabularFrame, GiDataError> {
        self.require_history("history")?;
        self.fetch(selectors, window, points).await
    }
}

#[async_trait]
impl MeasurementProvider for HttpTimeSeriesDriver {
    async fn list_measurements(
        &self,
        source: &SourceId,
    ) -> Result<Vec<HistoryMeasurement>, GiDataError> {
        self.require_history("measurements")?;
        let path = format!("/history/structure/sources/{source}/measurements");
        let env: Envelope<Vec<HistoryMeasurement>> = self.http.get_json(&path).await?;
        Ok(env.data)
    }
}

#[async_trait]
impl ExportProvider for HttpTimeSeriesDriver {
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "gidata_http::driver::export",
            skip(self, req),
            fields(domain = req.domain.as_str(), format = req.format.as_str()),
        )
    )]
    async fn export(&self, req: &ExportRequest) -> Result<Vec<u8>, GiDataError> {
        if req.domain != self.domain {
            return Err(GiDataError::invalid_arg(format!(
                "{} export sent to the {} driver",
                req.domain, self.domain
            )));
        }
        let body = self.request(&req.selectors, &req.window, req.points)?;
        let body = match req.format {
            ExportFormat::Csv => body.with_format("csv").with_csv(req.csv.clone()),
            ExportFormat::Udbf => body.with_format("udbf"),
        };
        self.http.post_json_bytes(&self.data_path(), &body).await
    }
}

#[async_trait]
impl ImportProvider for HttpTimeSeriesDriver {
    async fn import_csv(
        &self,
        bytes: Vec<u8>,
        target: &LogSettings,
        settings: &CsvImportSettings,
    ) -> Result<(), GiDataError> {
        self.require_history("import")?;
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
        self.require_history("import")?;
        run_import_session(self.http.as_ref(), ImportKind::Udbf, target, None, bytes).await
    }
}
