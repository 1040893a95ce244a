pub mod fetch;
pub mod online;
pub mod stream;
pub mod structure;
pub mod transfer;

use gidata_core::{Capability, GiDataError};

/// Turn a missing role into `NotSupported`.
pub(crate) fn role<T: ?Sized>(found: Option<&T>, cap: Capability) -> Result<&T, GiDataError> {
    found.ok_or_else(|| GiDataError::not_supported(cap.as_str()))
}
