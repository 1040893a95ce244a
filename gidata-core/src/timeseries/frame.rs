use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use gidata_types::GiDataError;

/// One named column of a frame; `None` marks a missing sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Column key (variable id as hyphenated lowercase UUID).
    pub name: String,
    /// One cell per index row.
    pub values: Vec<Option<f64>>,
}

impl Column {
    /// Build a column.
    pub fn new(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

/// Time-indexed table with one float column per variable.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TabularFrame {
    index: Vec<DateTime<Utc>>,
    columns: Vec<Column>,
}

impl TabularFrame {
    /// Build a frame, checking that every column matches the index length.
    ///
    /// # Errors
    /// Returns `Data` when a column length differs from the index length.
    pub fn new(index: Vec<DateTime<Utc>>, columns: Vec<Column>) -> Result<Self, GiDataError> {
        if let Some(bad) = columns.iter().find(|c| c.values.len() != index.len()) {
            return Err(GiDataError::data(format!(
                "column {} has {} rows, index has {}",
                bad.name,
                bad.values.len(),
                index.len()
            )));
        }
        Ok(Self { index, columns })
    }

    /// Frame with the given columns and no rows.
    #[must_use]
    pub fn empty(names: &[String]) -> Self {
        Self {
            index: Vec::new(),
            columns: names.iter().map(|n| Column::new(n.clone(), Vec::new())).collect(),
        }
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// True when there are no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// `(rows, columns)`.
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        (self.index.len(), self.columns.len())
    }

    /// Time index.
    #[must_use]
    pub fn index(&self) -> &[DateTime<Utc>] {
        &self.index
    }

    /// Columns in order.
    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Column keys in order.
    #[must_use]
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Look up a column by key.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Reorder (and restrict) the columns to `order`.
    ///
    /// # Errors
    /// Returns `Data` if a requested column is missing.
    pub fn select_columns(mut self, order: &[String]) -> Result<Self, GiDataError> {
        let mut out = Vec::with_capacity(order.len());
        for name in order {
            let pos = self
                .columns
                .iter()
                .position(|c| &c.name == name)
                .ok_or_else(|| GiDataError::data(format!("response lacks column {name}")))?;
            out.push(self.columns.swap_remove(pos));
        }
        self.columns = out;
        Ok(self)
    }

    /// Keep every `ceil(len / points)`-th row, starting with the first.
    ///
    /// Frames with at most `points` rows are returned unchanged. This is pure
    /// decimation and does not aggregate.
    #[must_use]
    pub fn downsample(self, points: usize) -> Self {
        let len = self.index.len();
        if points == 0 || len <= points {
            return self;
        }
        let stride = len.div_ceil(points);
        Self {
            index: self.index.into_iter().step_by(stride).collect(),
            columns: self
                .columns
                .into_iter()
                .map(|c| Column {
                    name: c.name,
                    values: c.values.into_iter().step_by(stride).collect(),
                })
                .collect(),
        }
    }

    /// Sort rows chronologically. Rows with equal timestamps keep their order.
    #[must_use]
    pub fn sorted(self) -> Self {
        if self.index.windows(2).all(|w| w[0] <= w[1]) {
            return self;
        }
        let mut order: Vec<usize> = (0..self.index.len()).collect();
        order.sort_by_key(|&i| self.index[i]);
        Self {
            index: order.iter().map(|&i| self.index[i]).collect(),
            columns: self
                .columns
                .iter()
                .map(|c| Column {
                    name: c.name.clone(),
                    values: order.iter().map(|&i| c.values[i]).collect(),
                })
                .collect(),
        }
    }

    /// Outer-join frames on their time index.
    ///
    /// The result holds the union of all timestamps in chronological order and
    /// the columns of every input, left to right; absent cells are `None`.
    #[must_use]
    pub fn outer_join(mut frames: Vec<Self>) -> Self {
        if frames.len() <= 1 {
            return frames.pop().map(Self::sorted).unwrap_or_default();
        }
        let width: usize = frames.iter().map(|f| f.columns.len()).sum();
        let mut rows: BTreeMap<DateTime<Utc>, Vec<Option<f64>>> = BTreeMap::new();
        let mut names = Vec::with_capacity(width);
        let mut offset = 0usize;
        for frame in &frames {
            for (r, ts) in frame.index.iter().enumerate() {
                let row = rows.entry(*ts).or_insert_with(|| vec![None; width]);
                for (c, col) in frame.columns.iter().enumerate() {
                    if let Some(v) = col.values[r] {
                        row[offset + c] = Some(v);
                    }
                }
            }
            names.extend(frame.columns.iter().map(|c| c.name.clone()));
            offset += frame.columns.len();
        }
        let mut columns: Vec<Column> = names
            .into_iter()
            .map(|n| Column::new(n, Vec::with_capacity(rows.len())))
            .collect();
        let mut index = Vec::with_capacity(rows.len());
        for (ts, row) in rows {
            index.push(ts);
            for (col, v) in columns.iter_mut().zip(row) {
                col.values.push(v);
            }
        }
        Self { index, columns }
    }
}
