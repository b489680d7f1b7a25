// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Software backend: the resource layer over an emulated immediate-context device.

mod device;
mod format;
mod interface;

pub use device::{
    BindFlags, BufferDesc, CpuAccess, DEFAULT_COMMANDS_PER_POLL, Device, MapMode, Mapped,
    NativeError, NativeFormat, QueryId, ROW_PITCH_ALIGNMENT, Region, ResourceId, Stats,
    TextureDesc2D, Usage,
};
pub use format::texture_format;
pub use interface::SoftInterface;
