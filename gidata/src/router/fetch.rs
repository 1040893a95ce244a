use crate::GiData;
use crate::router::role;
use gidata_core::{Capability, GiDataError, TabularFrame, TimeWindow, VariableSelector};

impl GiData {
    /// Fetch a window of the rolling buffer.
    ///
    /// Columns follow `selectors` order and are keyed by variable id. Relative
    /// bounds are resolved against the client clock.
    ///
    /// # Errors
    /// `InvalidArg` for empty or duplicate selectors, zero points or a malformed
    /// window, before any request is made. Backend failures propagate unchanged.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "gidata::router::fetch::fetch_buffer",
            skip(self, selectors, window),
            fields(n = selectors.len(), driver = self.buffer.name()),
        )
    )]
    pub async fn fetch_buffer(
        &self,
        selectors: &[VariableSelector],
        window: TimeWindow,
        points: u32,
    ) -> Result<TabularFrame, GiDataError> {
        role(self.buffer.as_buffer_provider(), Capability::Buffer)?
            .fetch_buffer(selectors, window, points)
            .await
    }

    /// Fetch a window of persisted history.
    ///
    /// # Errors
    /// Same validation as [`fetch_buffer`](Self::fetch_buffer).
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "gidata::router::fetch::fetch_history",
            skip(self, selectors, window),
            fields(n = selectors.len()),
        )
    )]
    pub async fn fetch_history(
        &self,
        selectors: &[VariableSelector],
        window: TimeWindow,
        points: u32,
    ) -> Result<TabularFrame, GiDataError> {
        role(self.history.as_history_provider(), Capability::History)?
            .fetch_history(selectors, window, points)
            .await
    }
}
