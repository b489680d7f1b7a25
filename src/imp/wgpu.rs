// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! wgpu backend.

mod bound_device;
mod buffer;
mod error;
mod fence;
mod interface;
mod pixel_format;
mod texture;

pub use bound_device::WgpuDevice;
pub use error::RequestError;
pub use interface::WgpuInterface;
pub use pixel_format::wgpu_format;

pub(crate) type TextureResource = wgpu::Texture;
pub(crate) type BufferResource = wgpu::Buffer;
