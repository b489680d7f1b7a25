// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
use std::fmt::Display;

/// Failure to open a wgpu device.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    NoSuchAdapter,
    RequestDeviceError(#[from] wgpu::RequestDeviceError),
}

impl Display for RequestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestError::NoSuchAdapter => write!(f, "No such adapter"),
            RequestError::RequestDeviceError(e) => write!(f, "{}", e),
        }
    }
}

/// Classifies an error captured by an error scope.
pub(super) fn translate(error: &wgpu::Error) -> crate::Error {
    match error {
        wgpu::Error::OutOfMemory { .. } => crate::Error::OutOfMemory,
        wgpu::Error::Validation { .. } => crate::Error::InvalidParameter,
        _ => crate::Error::Unknown,
    }
}
