use polars::prelude::*;

use super::frame::TabularFrame;
use gidata_types::GiDataError;

/// Conversion into a polars `DataFrame`.
pub trait ToDataFrame {
    /// Build a frame with a naive `time` column (ns since the epoch, UTC) followed by
    /// the value columns.
    ///
    /// # Errors
    /// Returns `Data` if polars rejects the columns.
    fn to_dataframe(&self) -> Result<DataFrame, GiDataError>;
}

impl ToDataFrame for TabularFrame {
    fn to_dataframe(&self) -> Result<DataFrame, GiDataError> {
        let nanos: Vec<Option<i64>> = self
            .index()
            .iter()
            .map(chrono::DateTime::timestamp_nanos_opt)
            .collect();
        let time = Series::new("time".into(), nanos)
            .cast(&DataType::Datetime(TimeUnit::Nanoseconds, None))
            .map_err(|e| GiDataError::data(e.to_string()))?;
        let mut cols: Vec<Column> = Vec::with_capacity(self.columns().len() + 1);
        cols.push(time.into());
        for c in self.columns() {
            cols.push(Series::new(c.name.as_str().into(), c.values.clone()).into());
        }
        DataFrame::new(cols).map_err(|e| GiDataError::data(e.to_string()))
    }
}
