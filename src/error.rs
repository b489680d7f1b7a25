// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Error types shared by every backend.
//!
//! Fallible operations return [`Result`].  At the host boundary the outcome is
//! flattened into a [`ResultCode`], which is what the plugin ABI understands.

/// Failure classes of the resource layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Null, zero or inconsistent input, detected before any backend call.
    #[error("Invalid parameter")]
    InvalidParameter,
    /// The backend could not allocate the resource.
    #[error("Out of memory")]
    OutOfMemory,
    /// Any other backend failure.
    #[error("Unknown backend failure")]
    Unknown,
}

pub type Result<T> = std::result::Result<T, Error>;

/// Host-visible result codes.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultCode {
    Ok = 0,
    InvalidParameter = 1,
    OutOfMemory = 2,
    Unknown = 3,
}

impl From<Error> for ResultCode {
    fn from(value: Error) -> Self {
        match value {
            Error::InvalidParameter => ResultCode::InvalidParameter,
            Error::OutOfMemory => ResultCode::OutOfMemory,
            Error::Unknown => ResultCode::Unknown,
        }
    }
}

impl<T> From<Result<T>> for ResultCode {
    fn from(value: Result<T>) -> Self {
        match value {
            Ok(_) => ResultCode::Ok,
            Err(e) => e.into(),
        }
    }
}

impl ResultCode {
    pub fn is_ok(self) -> bool {
        self == ResultCode::Ok
    }
}
