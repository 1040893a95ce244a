use std::collections::BTreeMap;

use async_trait::async_trait;
use uuid::Uuid;

use crate::stream::UpdateStream;
use crate::timeseries::TabularFrame;
use gidata_types::{
    Capability, CsvImportSettings, ExportRequest, GiDataError, HistoryMeasurement, LogSettings,
    OnlineVariable, SourceId, StreamSource, StreamVariable, TimeWindow, VariableSelector,
};

/// Focused role trait for drivers exposing current values.
#[async_trait]
pub trait OnlineProvider: Send + Sync {
    /// List the variables of the online surface.
    async fn list_variables(&self) -> Result<Vec<OnlineVariable>, GiDataError>;

    /// Read the current value of each variable.
    async fn read(&self, variables: &[Uuid]) -> Result<BTreeMap<Uuid, f64>, GiDataError>;

    /// Write values, in the given order.
    async fn write(&self, values: &[(Uuid, f64)]) -> Result<(), GiDataError>;
}

/// Focused role trait for drivers that enumerate sources and their variables.
#[async_trait]
pub trait StructureProvider: Send + Sync {
    /// List all sources of the driver's domain.
    async fn list_sources(&self) -> Result<Vec<StreamSource>, GiDataError>;

    /// List the variables of `source`, each tagged with `sid = source`.
    async fn list_stream_variables(
        &self,
        source: &SourceId,
    ) -> Result<Vec<StreamVariable>, GiDataError>;
}

/// Focused role trait for drivers that enumerate recorded measurements.
#[async_trait]
pub trait MeasurementProvider: Send + Sync {
    /// List the measurements recorded for `source`.
    async fn list_measurements(
        &self,
        source: &SourceId,
    ) -> Result<Vec<HistoryMeasurement>, GiDataError>;
}

/// Focused role trait for drivers that fetch windows of the rolling buffer.
#[async_trait]
pub trait BufferProvider: Send + Sync {
    /// Fetch `selectors` over `window`, keeping at most `points` rows.
    async fn fetch_buffer(
        &self,
        selectors: &[VariableSelector],
        window: TimeWindow,
        points: u32,
    ) -> Result<TabularFrame, GiDataError>;
}

/// Focused role trait for drivers that fetch windows of persisted history.
#[async_trait]
pub trait HistoryProvider: Send + Sync {
    /// Fetch `selectors` over `window`, keeping at most `points` rows.
    async fn fetch_history(
        &self,
        selectors: &[VariableSelector],
        window: TimeWindow,
        points: u32,
    ) -> Result<TabularFrame, GiDataError>;
}

/// Focused role trait for drivers that produce bulk exports.
#[async_trait]
pub trait ExportProvider: Send + Sync {
    /// Export as raw file bytes.
    async fn export(&self, req: &ExportRequest) -> Result<Vec<u8>, GiDataError>;
}

/// Focused role trait for drivers that accept bulk imports.
///
/// Every call opens exactly one import session and closes it before returning.
#[async_trait]
pub trait ImportProvider: Send + Sync {
    /// Import a CSV file into `target`.
    async fn import_csv(
        &self,
        bytes: Vec<u8>,
        target: &LogSettings,
        settings: &CsvImportSettings,
    ) -> Result<(), GiDataError>;

    /// Import a UDBF file into `target`.
    async fn import_udbf(&self, bytes: Vec<u8>, target: &LogSettings) -> Result<(), GiDataError>;
}

/// A source of live variable updates.
#[async_trait]
pub trait UpdateSource: Send + Sync {
    /// Subscribe to `variables` with the source's default options.
    async fn stream_updates(&self, variables: &[Uuid]) -> Result<UpdateStream, GiDataError>;
}

/// Main driver trait implemented by backend crates. Exposes capability discovery.
///
/// A `None` accessor is a declared capability gap; callers turn it into
/// `NotSupported`.
pub trait DataDriver: Send + Sync {
    /// A stable identifier for logs (e.g. "gidata-http/buffer").
    fn name(&self) -> &'static str;

    /// If implemented, returns a trait object for current values.
    fn as_online_provider(&self) -> Option<&dyn OnlineProvider> {
        None
    }
    /// If implemented, returns a trait object for source/variable listing.
    fn as_structure_provider(&self) -> Option<&dyn StructureProvider> {
        None
    }
    /// If implemented, returns a trait object for measurement listing.
    fn as_measurement_provider(&self) -> Option<&dyn MeasurementProvider> {
        None
    }
    /// If implemented, returns a trait object for buffer fetches.
    fn as_buffer_provider(&self) -> Option<&dyn BufferProvider> {
        None
    }
    /// If implemented, returns a trait object for history fetches.
    fn as_history_provider(&self) -> Option<&dyn HistoryProvider> {
        None
    }
    /// If implemented, returns a trait object for exports.
    fn as_export_provider(&self) -> Option<&dyn ExportProvider> {
        None
    }
    /// If implemented, returns a trait object for imports.
    fn as_import_provider(&self) -> Option<&dyn ImportProvider> {
        None
    }

    /// Capabilities this driver advertises through its accessors.
    fn capabilities(&self) -> Vec<Capability> {
        let mut out = Vec::new();
        if self.as_online_provider().is_some() {
            out.push(Capability::Online);
        }
        if self.as_structure_provider().is_some() {
            out.push(Capability::Structure);
        }
        if self.as_measurement_provider().is_some() {
            out.push(Capability::Measurements);
        }
        if self.as_buffer_provider().is_some() {
            out.push(Capability::Buffer);
        }
        if self.as_history_provider().is_some() {
            out.push(Capability::History);
        }
        if self.as_export_provider().is_some() {
            out.push(Capability::Export);
        }
        if self.as_import_provider().is_some() {
            out.push(Capability::Import);
        }
        out
    }

    /// Whether the driver advertises `cap`.
    fn supports(&self, cap: Capability) -> bool {
        self.capabilities().contains(&cap)
    }
}
