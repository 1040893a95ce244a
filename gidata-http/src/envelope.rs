use serde::Deserialize;

/// `{"Success": .., "Data": ..}` wrapper of the REST responses.
///
/// A missing `Data` field decodes to `T::default()`.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    /// Server success flag.
    #[serde(rename = "Success", default)]
    pub success: bool,
    /// Payload.
    #[serde(rename = "Data", default)]
    pub data: T,
}
