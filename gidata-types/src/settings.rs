//! Request options for export, import and live subscriptions.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::selector::{TimeWindow, VariableSelector};

/// Data domain a request addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Domain {
    /// Rolling in-memory buffer.
    #[default]
    Buffer,
    /// Persisted history.
    History,
}

impl Domain {
    /// URL path segment of the domain.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Buffer => "buffer",
            Self::History => "history",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bulk export file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExportFormat {
    /// Delimited text.
    Csv,
    /// Universal Data Bin File.
    Udbf,
}

impl ExportFormat {
    /// Wire `Format` value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Udbf => "udbf",
        }
    }
}

/// CSV layout for exports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CsvSettings {
    /// Free text written above the table.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header_text: Option<String>,
    /// Emit a column header row.
    pub add_column_header: bool,
    /// Header of the timestamp column.
    pub date_time_header: String,
    /// strftime-style timestamp format.
    pub date_time_format: String,
    /// Column separator.
    pub column_separator: String,
    /// Decimal separator.
    pub decimal_separator: String,
    /// Row holding variable names.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_row_index: Option<i32>,
    /// Row holding units.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_row_index: Option<i32>,
    /// First data row.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub values_start_row_index: Option<i32>,
    /// First data column.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub values_start_column_index: Option<i32>,
}

impl Default for CsvSettings {
    fn default() -> Self {
        Self {
            header_text: None,
            add_column_header: true,
            date_time_header: "datetime".to_string(),
            date_time_format: "%Y-%m-%d %H:%M:%S.%%0us".to_string(),
            column_separator: ";".to_string(),
            decimal_separator: ".".to_string(),
            name_row_index: None,
            unit_row_index: None,
            values_start_row_index: None,
            values_start_column_index: None,
        }
    }
}

/// CSV layout the server should expect on import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CsvImportSettings {
    /// Column separator.
    pub column_separator: String,
    /// Decimal separator.
    pub decimal_separator: String,
    /// Row holding variable names.
    pub name_row_index: i32,
    /// Row holding units, `-1` for none.
    pub unit_row_index: i32,
    /// First data row.
    pub values_start_row_index: i32,
    /// First data column.
    pub values_start_column_index: i32,
    /// Timestamp format of the first column.
    pub date_time_fmt_column1: String,
    /// Timestamp format of the second column.
    pub date_time_fmt_column2: String,
    /// Timestamp format of the third column.
    pub date_time_fmt_column3: String,
}

impl Default for CsvImportSettings {
    fn default() -> Self {
        Self {
            column_separator: ";".to_string(),
            decimal_separator: ",".to_string(),
            name_row_index: 0,
            unit_row_index: -1,
            values_start_row_index: 1,
            values_start_column_index: 1,
            date_time_fmt_column1: "%Y-%m-%d %H:%M:%S.%F".to_string(),
            date_time_fmt_column2: String::new(),
            date_time_fmt_column3: String::new(),
        }
    }
}

/// Destination of an import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogSettings {
    /// Target source id.
    #[serde(rename = "SourceID")]
    pub source_id: String,
    /// Target source display name.
    #[serde(rename = "SourceName")]
    pub source_name: String,
    /// Measurement to create; server-chosen when absent.
    #[serde(rename = "MeasurementName", skip_serializing_if = "Option::is_none")]
    pub measurement_name: Option<String>,
}

impl LogSettings {
    /// Target `source_id`/`source_name` with a server-chosen measurement name.
    pub fn new(source_id: impl Into<String>, source_name: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            source_name: source_name.into(),
            measurement_name: None,
        }
    }

    /// Name the measurement created by the import.
    #[must_use]
    pub fn measurement(mut self, name: impl Into<String>) -> Self {
        self.measurement_name = Some(name.into());
        self
    }
}

/// Parameters of a bulk export.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportRequest {
    /// Domain to export from.
    pub domain: Domain,
    /// Output format.
    pub format: ExportFormat,
    /// Variables to include, in column order.
    pub selectors: Vec<VariableSelector>,
    /// Time window.
    pub window: TimeWindow,
    /// Point budget handed to the server.
    pub points: u32,
    /// CSV layout; ignored for UDBF.
    pub csv: CsvSettings,
}

impl ExportRequest {
    /// CSV export with default layout.
    #[must_use]
    pub fn csv(domain: Domain, selectors: Vec<VariableSelector>, window: TimeWindow) -> Self {
        Self {
            domain,
            format: ExportFormat::Csv,
            selectors,
            window,
            points: 2048,
            csv: CsvSettings::default(),
        }
    }

    /// UDBF export.
    #[must_use]
    pub fn udbf(domain: Domain, selectors: Vec<VariableSelector>, window: TimeWindow) -> Self {
        Self {
            format: ExportFormat::Udbf,
            ..Self::csv(domain, selectors, window)
        }
    }

    /// Override the point budget.
    #[must_use]
    pub const fn points(mut self, points: u32) -> Self {
        self.points = points;
        self
    }

    /// Override the CSV layout.
    #[must_use]
    pub fn csv_settings(mut self, csv: CsvSettings) -> Self {
        self.csv = csv;
        self
    }
}

/// Function field of an online read/write message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OnlineFunction {
    /// Read current values.
    Read,
    /// Write values.
    #[default]
    Write,
}

impl OnlineFunction {
    /// Wire `Function` value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
        }
    }
}

/// Options of a WebSocket tick subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnlineSubscription {
    /// Push interval in milliseconds.
    pub interval_ms: u64,
    /// Extended payloads (per-value metadata).
    pub extended: bool,
    /// Push only when a value changed.
    pub on_change: bool,
    /// Decimal precision, `-1` for server default.
    pub precision: i32,
}

impl Default for OnlineSubscription {
    fn default() -> Self {
        Self {
            interval_ms: 1,
            extended: true,
            on_change: true,
            precision: -1,
        }
    }
}

/// Options of a Kafka subscription.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct KafkaSubscription {
    /// Consumer group; the configured default when `None`.
    pub group_id: Option<String>,
    /// Use TLS towards the brokers.
    pub ssl: bool,
}
