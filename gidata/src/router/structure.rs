use crate::GiData;
use crate::router::role;
use gidata_core::{
    Capability, GiDataError, HistoryMeasurement, SourceId, StreamSource, StreamVariable,
};

impl GiData {
    /// Sources of the buffer domain.
    ///
    /// # Errors
    /// `NotSupported` if the buffer driver cannot enumerate sources.
    pub async fn list_buffer_sources(&self) -> Result<Vec<StreamSource>, GiDataError> {
        role(self.buffer.as_structure_provider(), Capability::Structure)?
            .list_sources()
            .await
    }

    /// Variables of a buffer source, each tagged with its source id.
    ///
    /// # Errors
    /// `NotSupported` if the buffer driver cannot enumerate sources.
    pub async fn list_stream_variables(
        &self,
        source: &SourceId,
    ) -> Result<Vec<StreamVariable>, GiDataError> {
        role(self.buffer.as_structure_provider(), Capability::Structure)?
            .list_stream_variables(source)
            .await
    }

    /// Sources of the history domain.
    ///
    /// # Errors
    /// `NotSupported` if the history driver cannot enumerate sources.
    pub async fn list_history_sources(&self) -> Result<Vec<StreamSource>, GiDataError> {
        role(self.history.as_structure_provider(), Capability::Structure)?
            .list_sources()
            .await
    }

    /// Variables of a history source.
    ///
    /// # Errors
    /// `NotSupported` if the history driver cannot enumerate sources.
    pub async fn list_history_variables(
        &self,
        source: &SourceId,
    ) -> Result<Vec<StreamVariable>, GiDataError> {
        role(self.history.as_structure_provider(), Capability::Structure)?
            .list_stream_variables(source)
            .await
    }

    /// Measurements recorded for a history source.
    ///
    /// # Errors
    /// `NotSupported` if the history driver cannot list measurements.
    pub async fn list_history_measurements(
        &self,
        source: &SourceId,
    ) -> Result<Vec<HistoryMeasurement>, GiDataError> {
        role(self.history.as_measurement_provider(), Capability::Measurements)?
            .list_measurements(source)
            .await
    }
}
