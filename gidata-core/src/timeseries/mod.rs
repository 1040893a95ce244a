/// Conversion of wire payloads into frames.
pub mod assemble;
/// Optional polars conversion.
#[cfg(feature = "dataframe")]
pub mod dataframe;
/// The tabular frame type and its joins and downsampling.
pub mod frame;

pub use assemble::{assemble_equidistant, assemble_raw, ms_to_datetime};
pub use frame::{Column, TabularFrame};
