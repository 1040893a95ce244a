//! Blocking access for callers without an async runtime.
//!
//! [`run_sync`] drives one future to completion from synchronous code:
//! - outside any runtime it uses the given [`Executor`], building a throwaway
//!   current-thread runtime for [`Executor::Ambient`];
//! - inside a multi-thread runtime it parks the worker with `block_in_place`
//!   and drives the future on the executor's handle, or the current one;
//! - inside a current-thread runtime it runs the future on a scoped helper
//!   thread, so the outer loop is paused but never asked to drive itself
//!   re-entrantly.
//!
//! Tasks spawned by a future outlive the call only when it runs on a
//! persistent runtime. [`BlockingGiData`] therefore always holds one: its own,
//! or the handle it was given.

use std::collections::BTreeMap;
use std::future::Future;

use tokio::runtime::{Builder, Handle, Runtime, RuntimeFlavor};
use uuid::Uuid;

use crate::GiData;
use gidata_core::{
    CsvImportSettings, ExportRequest, GiDataError, HistoryMeasurement, LogSettings,
    OnlineFunction, OnlineVariable, SourceId, StreamSource, StreamVariable, TabularFrame,
    TimeWindow, VariableSelector,
};

/// Where [`run_sync`] runs a future.
#[derive(Debug, Clone, Default)]
pub enum Executor {
    /// The caller's multi-thread runtime if there is one, else a fresh
    /// current-thread runtime per call, dropped afterwards along with any
    /// task the future spawned.
    #[default]
    Ambient,
    /// An existing runtime. It must be a multi-thread runtime, since only
    /// those drive I/O without an owner inside `Runtime::block_on`.
    Handle(Handle),
}

fn throwaway_runtime() -> Result<Runtime, GiDataError> {
    Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| GiDataError::Other(format!("cannot start runtime: {e}")))
}

/// Block on `fut` from a thread that is not inside any runtime.
fn detached<F: Future>(executor: &Executor, fut: F) -> Result<F::Output, GiDataError> {
    match executor {
        Executor::Handle(handle) => Ok(handle.block_on(fut)),
        Executor::Ambient => Ok(throwaway_runtime()?.block_on(fut)),
    }
}

fn on_helper_thread<F>(executor: &Executor, fut: F) -> Result<F::Output, GiDataError>
where
    F: Future + Send,
    F::Output: Send,
{
    std::thread::scope(|scope| {
        scope
            .spawn(move || detached(executor, fut))
            .join()
            .map_err(|_| GiDataError::Other("sync bridge helper thread panicked".into()))?
    })
}

/// Drive `fut` to completion from synchronous code.
///
/// # Errors
/// Returns `Other` only if a runtime could not be created or the helper
/// thread panicked; the future's own output is returned as is.
pub fn run_sync<F>(executor: &Executor, fut: F) -> Result<F::Output, GiDataError>
where
    F: Future + Send,
    F::Output: Send,
{
    match Handle::try_current() {
        Ok(current) if current.runtime_flavor() == RuntimeFlavor::CurrentThread => {
            on_helper_thread(executor, fut)
        }
        Ok(current) => {
            let handle = match executor {
                Executor::Handle(handle) => handle.clone(),
                Executor::Ambient => current,
            };
            Ok(tokio::task::block_in_place(|| handle.block_on(fut)))
        }
        Err(_) => detached(executor, fut),
    }
}

/// Blocking wrapper over every request/response operation of [`GiData`].
///
/// Streams stay async-only; use [`inner`](Self::inner) for them.
///
/// Every call runs on one persistent runtime, so the online socket and
/// pooled HTTP connections opened by one call serve the next.
pub struct BlockingGiData {
    inner: GiData,
    executor: Executor,
    runtime: Option<Runtime>,
}

impl BlockingGiData {
    /// Wrap `inner` with a private single-worker runtime.
    ///
    /// Reusing one runtime keeps pooled HTTP connections alive between calls.
    ///
    /// # Errors
    /// Returns `Other` if the runtime cannot be started.
    pub fn new(inner: GiData) -> Result<Self, GiDataError> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("gidata-blocking")
            .enable_all()
            .build()
            .map_err(|e| GiDataError::Other(format!("cannot start runtime: {e}")))?;
        Ok(Self {
            inner,
            executor: Executor::Handle(runtime.handle().clone()),
            runtime: Some(runtime),
        })
    }

    /// Wrap `inner`, running calls on an existing multi-thread runtime.
    #[must_use]
    pub const fn with_handle(inner: GiData, handle: Handle) -> Self {
        Self {
            inner,
            executor: Executor::Handle(handle),
            runtime: None,
        }
    }

    /// The async client.
    #[must_use]
    pub const fn inner(&self) -> &GiData {
        &self.inner
    }

    fn run<T, F>(&self, fut: F) -> Result<T, GiDataError>
    where
        F: Future<Output = Result<T, GiDataError>> + Send,
        T: Send,
    {
        run_sync(&self.executor, fut)?
    }

    /// See [`GiData::list_variables`].
    ///
    /// # Errors
    /// As the async call.
    pub fn list_variables(&self) -> Result<Vec<OnlineVariable>, GiDataError> {
        self.run(self.inner.list_variables())
    }

    /// See [`GiData::read_online`].
    ///
    /// # Errors
    /// As the async call.
    pub fn read_online(&self, variables: &[Uuid]) -> Result<BTreeMap<Uuid, f64>, GiDataError> {
        self.run(self.inner.read_online(variables))
    }

    /// See [`GiData::write_online`].
    ///
    /// # Errors
    /// As the async call.
    pub fn write_online(&self, values: &[(Uuid, f64)]) -> Result<(), GiDataError> {
        self.run(self.inner.write_online(values))
    }

    /// See [`GiData::publish_online`].
    ///
    /// # Errors
    /// As the async call.
    pub fn publish_online(
        &self,
        values: &BTreeMap<Uuid, f64>,
        function: OnlineFunction,
    ) -> Result<(), GiDataError> {
        self.run(self.inner.publish_online(values, function))
    }

    /// See [`GiData::list_buffer_sources`].
    ///
    /// # Errors
    /// As the async call.
    pub fn list_buffer_sources(&self) -> Result<Vec<StreamSource>, GiDataError> {
        self.run(self.inner.list_buffer_sources())
    }

    /// See [`GiData::list_stream_variables`].
    ///
    /// # Errors
    /// As the async call.
    pub fn list_stream_variables(
        &self,
        source: &SourceId,
    ) -> Result<Vec<StreamVariable>, GiDataError> {
        self.run(self.inner.list_stream_variables(source))
    }

    /// See [`GiData::list_history_sources`].
    ///
    /// # Errors
    /// As the async call.
    pub fn list_history_sources(&self) -> Result<Vec<StreamSource>, GiDataError> {
        self.run(self.inner.list_history_sources())
    }

    /// See [`GiData::list_history_variables`].
    ///
    /// # Errors
    /// As the async call.
    pub fn list_history_variables(
        &self,
        source: &SourceId,
    ) -> Result<Vec<StreamVariable>, GiDataError> {
        self.run(self.inner.list_history_variables(source))
    }

    /// See [`GiData::list_history_measurements`].
    ///
    /// # Errors
    /// As the async call.
    pub fn list_history_measurements(
        &self,
        source: &SourceId,
    ) -> Result<Vec<HistoryMeasurement>, GiDataError> {
        self.run(self.inner.list_history_measurements(source))
    }

    /// See [`GiData::fetch_buffer`].
    ///
    /// # Errors
    /// As the async call.
    pub fn fetch_buffer(
        &self,
        selectors: &[VariableSelector],
        window: TimeWindow,
        points: u32,
    ) -> Result<TabularFrame, GiDataError> {
        self.run(self.inner.fetch_buffer(selectors, window, points))
    }

    /// See [`GiData::fetch_history`].
    ///
    /// # Errors
    /// As the async call.
    pub fn fetch_history(
        &self,
        selectors: &[VariableSelector],
        window: TimeWindow,
        points: u32,
    ) -> Result<TabularFrame, GiDataError> {
        self.run(self.inner.fetch_history(selectors, window, points))
    }

    /// See [`GiData::export`].
    ///
    /// # Errors
    /// As the async call.
    pub fn export(&self, req: &ExportRequest) -> Result<Vec<u8>, GiDataError> {
        self.run(self.inner.export(req))
    }

    /// See [`GiData::import_csv`].
    ///
    /// # Errors
    /// As the async call.
    pub fn import_csv(
        &self,
        bytes: Vec<u8>,
        target: &LogSettings,
        settings: &CsvImportSettings,
    ) -> Result<(), GiDataError> {
        self.run(self.inner.import_csv(bytes, target, settings))
    }

    /// See [`GiData::import_udbf`].
    ///
    /// # Errors
    /// As the async call.
    pub fn import_udbf(&self, bytes: Vec<u8>, target: &LogSettings) -> Result<(), GiDataError> {
        self.run(self.inner.import_udbf(bytes, target))
    }

    /// See [`GiData::close`].
    pub fn close(&self) {
        let _ = run_sync(&self.executor, self.inner.close());
    }
}

impl Drop for BlockingGiData {
    fn drop(&mut self) {
        // a runtime must not be dropped from inside another one
        if let Some(rt) = self.runtime.take()
            && Handle::try_current().is_ok()
        {
            rt.shutdown_background();
        }
    }
}
