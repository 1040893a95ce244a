use std::collections::BTreeMap;

use uuid::Uuid;

use crate::GiData;
use crate::router::role;
use gidata_core::{Capability, GiDataError, OnlineVariable};

impl GiData {
    /// List the online variables of the device.
    ///
    /// # Errors
    /// `NotSupported` if the buffer driver has no online surface, else whatever
    /// the backend reports.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "gidata::router::online::list_variables", skip(self))
    )]
    pub async fn list_variables(&self) -> Result<Vec<OnlineVariable>, GiDataError> {
        role(self.buffer.as_online_provider(), Capability::Online)?
            .list_variables()
            .await
    }

    /// Read the current value of each variable.
    ///
    /// # Errors
    /// `InvalidArg` for an empty list, `NotSupported` without an online surface.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "gidata::router::online::read_online",
            skip(self, variables),
            fields(n = variables.len()),
        )
    )]
    pub async fn read_online(&self, variables: &[Uuid]) -> Result<BTreeMap<Uuid, f64>, GiDataError> {
        role(self.buffer.as_online_provider(), Capability::Online)?
            .read(variables)
            .await
    }

    /// Write values through the REST online endpoint.
    ///
    /// # Errors
    /// `InvalidArg` for an empty list, `NotSupported` without an online surface.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "gidata::router::online::write_online",
            skip(self, values),
            fields(n = values.len()),
        )
    )]
    pub async fn write_online(&self, values: &[(Uuid, f64)]) -> Result<(), GiDataError> {
        role(self.buffer.as_online_provider(), Capability::Online)?
            .write(values)
            .await
    }
}
