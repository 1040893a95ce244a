use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One tick of a live update stream: the latest value per variable.
///
/// WebSocket and Kafka streams both yield this shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableUpdate {
    /// Variable id to value.
    pub values: BTreeMap<Uuid, f64>,
    /// Client-side receive time.
    pub received_at: DateTime<Utc>,
}

impl VariableUpdate {
    /// Tick received now.
    #[must_use]
    pub fn new(values: BTreeMap<Uuid, f64>) -> Self {
        Self {
            values,
            received_at: Utc::now(),
        }
    }

    /// Value of `variable` in this tick, if present.
    #[must_use]
    pub fn get(&self, variable: &Uuid) -> Option<f64> {
        self.values.get(variable).copied()
    }

    /// Keep only the listed variables.
    #[must_use]
    pub fn retain_only(mut self, wanted: &[Uuid]) -> Self {
        self.values.retain(|k, _| wanted.contains(k));
        self
    }

    /// True when the tick carries no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
