use crate::GiData;
use crate::router::role;
use gidata_core::driver::ImportProvider;
use gidata_core::{
    Capability, CsvImportSettings, Domain, ExportRequest, GiDataError, LogSettings,
};

impl GiData {
    /// Export a window as CSV or UDBF bytes, through the driver of `req.domain`.
    ///
    /// # Errors
    /// `NotSupported` if that driver cannot export, else validation or backend errors.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "gidata::router::transfer::export",
            skip(self, req),
            fields(domain = %req.domain, format = req.format.as_str()),
        )
    )]
    pub async fn export(&self, req: &ExportRequest) -> Result<Vec<u8>, GiDataError> {
        let driver = match req.domain {
            Domain::Buffer => &self.buffer,
            Domain::History => &self.history,
        };
        role(driver.as_export_provider(), Capability::Export)?
            .export(req)
            .await
    }

    /// Importing goes to the buffer driver when it accepts uploads (cloud),
    /// otherwise to the history driver.
    fn importer(&self) -> Result<&dyn ImportProvider, GiDataError> {
        match self.buffer.as_import_provider() {
            Some(p) => Ok(p),
            None => role(self.history.as_import_provider(), Capability::Import),
        }
    }

    /// Upload a CSV file into a new history measurement.
    ///
    /// Exactly one import session is opened and closed.
    ///
    /// # Errors
    /// `Session` if the backend rejects the upload; `SessionCleanup` if closing
    /// the session failed as well.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "gidata::router::transfer::import_csv",
            skip(self, bytes, target, settings),
            fields(len = bytes.len()),
        )
    )]
    pub async fn import_csv(
        &self,
        bytes: Vec<u8>,
        target: &LogSettings,
        settings: &CsvImportSettings,
    ) -> Result<(), GiDataError> {
        self.importer()?.import_csv(bytes, target, settings).await
    }

    /// Upload a UDBF file into a new history measurement.
    ///
    /// # Errors
    /// As for [`import_csv`](Self::import_csv).
    pub async fn import_udbf(&self, bytes: Vec<u8>, target: &LogSettings) -> Result<(), GiDataError> {
        self.importer()?.import_udbf(bytes, target).await
    }
}
