use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use serde::Deserialize;
use uuid::Uuid;

use gidata_core::GiDataError;

/// GraphQL column backing one variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldInfo {
    /// Column name used in `Raw`/`exportCSV` queries.
    pub field: String,
    /// Variable display name.
    pub name: String,
    /// Physical unit.
    pub unit: String,
}

/// Everything a structure query reports for one source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceMapping {
    /// Display name of the source (stream).
    pub name: String,
    /// Variable id to column.
    pub fields: HashMap<Uuid, FieldInfo>,
}

#[derive(Deserialize)]
struct WireVariable {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    unit: String,
}

#[derive(Deserialize)]
struct WireColumn {
    name: String,
    #[serde(default)]
    variables: Vec<WireVariable>,
}

/// `variableMapping` payload.
#[derive(Deserialize)]
pub(crate) struct WireMapping {
    #[serde(default)]
    name: String,
    #[serde(default)]
    columns: Vec<WireColumn>,
}

impl From<WireMapping> for SourceMapping {
    fn from(w: WireMapping) -> Self {
        let mut fields = HashMap::new();
        for col in w.columns {
            for var in col.variables {
                // ids that are not UUIDs can never be selected
                if let Ok(id) = Uuid::parse_str(&var.id) {
                    fields.insert(
                        id,
                        FieldInfo {
                            field: col.name.clone(),
                            name: var.name,
                            unit: var.unit,
                        },
                    );
                }
            }
        }
        Self {
            name: w.name,
            fields,
        }
    }
}

#[derive(Default)]
struct SourceEntry {
    snapshot: Mutex<Arc<SourceMapping>>,
    refresh: tokio::sync::Mutex<()>,
    generation: AtomicU64,
}

impl SourceEntry {
    fn current(&self) -> Arc<SourceMapping> {
        Arc::clone(&self.snapshot.lock().unwrap_or_else(PoisonError::into_inner))
    }

    fn merge(&self, update: SourceMapping) {
        let mut slot = self.snapshot.lock().unwrap_or_else(PoisonError::into_inner);
        let mut next = SourceMapping::clone(&slot);
        if !update.name.is_empty() {
            next.name = update.name;
        }
        next.fields.extend(update.fields);
        *slot = Arc::new(next);
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}

fn lookup(mapping: &SourceMapping, variables: &[Uuid]) -> Result<Vec<FieldInfo>, Uuid> {
    variables
        .iter()
        .map(|v| mapping.fields.get(v).cloned().ok_or(*v))
        .collect()
}

/// Variable-id to GraphQL field cache, keyed by source id.
///
/// Entries are created lazily and only ever grow. Reads use an immutable
/// `Arc` snapshot; refreshes are serialized per source so concurrent misses
/// trigger one structure query.
#[derive(Default)]
pub struct FieldCache {
    sources: Mutex<HashMap<String, Arc<SourceEntry>>>,
}

impl FieldCache {
    /// Empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&self, sid: &str) -> Arc<SourceEntry> {
        let mut map = self.sources.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(map.entry(sid.to_string()).or_default())
    }

    /// Current snapshot for `sid`, empty if it was never loaded.
    #[must_use]
    pub fn snapshot(&self, sid: &str) -> Arc<SourceMapping> {
        self.entry(sid).current()
    }

    /// Number of completed refreshes of `sid`.
    #[must_use]
    pub fn generation(&self, sid: &str) -> u64 {
        self.entry(sid).generation.load(Ordering::SeqCst)
    }

    /// Resolve `variables` of `sid` to fields, in order.
    ///
    /// On a miss the per-source refresh guard is taken and the snapshot checked
    /// again. If no other refresh completed in the meantime, `refresh` runs once
    /// and its result is merged in.
    ///
    /// # Errors
    /// Returns `LookupFailure` for the first variable still unknown after the
    /// refresh, or whatever `refresh` failed with.
    pub async fn resolve<F, Fut>(
        &self,
        sid: &str,
        variables: &[Uuid],
        refresh: F,
    ) -> Result<(Arc<SourceMapping>, Vec<FieldInfo>), GiDataError>
    where
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<SourceMapping, GiDataError>> + Send,
    {
        let entry = self.entry(sid);
        let seen = entry.generation.load(Ordering::SeqCst);
        let snap = entry.current();
        if let Ok(found) = lookup(&snap, variables) {
            return Ok((snap, found));
        }

        let _guard = entry.refresh.lock().await;
        let snap = entry.current();
        if let Ok(found) = lookup(&snap, variables) {
            return Ok((snap, found));
        }
        if entry.generation.load(Ordering::SeqCst) == seen {
            #[cfg(feature = "tracing")]
            tracing::debug!(target: "gidata_cloud::cache", sid, "refreshing field mapping");
            entry.merge(refresh().await?);
        }
        let snap = entry.current();
        match lookup(&snap, variables) {
            Ok(found) => Ok((snap, found)),
            Err(missing) => Err(GiDataError::lookup(sid, missing)),
        }
    }
}
