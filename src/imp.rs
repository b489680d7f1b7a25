// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
Backend implementations.

The software backend is always available.  Hardware backends are compiled in by
cargo feature.
*/

use crate::interface::{Config, GraphicsInterface};
use std::ffi::c_void;

pub mod soft;

#[cfg(feature = "backend_wgpu")]
pub mod wgpu;

/// Native object behind a [`crate::Texture2D`].
#[derive(Debug)]
pub(crate) enum NativeTexture {
    Soft(soft::ResourceId),
    #[cfg(feature = "backend_wgpu")]
    Wgpu(wgpu::TextureResource),
}

/// Native object behind a [`crate::Buffer`].
#[derive(Debug)]
pub(crate) enum NativeBuffer {
    Soft(soft::ResourceId),
    #[cfg(feature = "backend_wgpu")]
    Wgpu(wgpu::BufferResource),
}

impl NativeTexture {
    pub(crate) fn soft(&self) -> Option<soft::ResourceId> {
        match self {
            NativeTexture::Soft(id) => Some(*id),
            #[cfg(feature = "backend_wgpu")]
            _ => None,
        }
    }

    #[cfg(feature = "backend_wgpu")]
    pub(crate) fn wgpu(&self) -> Option<&wgpu::TextureResource> {
        match self {
            NativeTexture::Wgpu(resource) => Some(resource),
            _ => None,
        }
    }
}

impl NativeBuffer {
    pub(crate) fn soft(&self) -> Option<soft::ResourceId> {
        match self {
            NativeBuffer::Soft(id) => Some(*id),
            #[cfg(feature = "backend_wgpu")]
            _ => None,
        }
    }

    #[cfg(feature = "backend_wgpu")]
    pub(crate) fn wgpu(&self) -> Option<&wgpu::BufferResource> {
        match self {
            NativeBuffer::Wgpu(resource) => Some(resource),
            _ => None,
        }
    }
}

/// A native device handed over by the host.
#[derive(Debug, Clone)]
pub enum NativeDevice {
    Software(soft::Device),
    #[cfg(feature = "backend_wgpu")]
    Wgpu(wgpu::WgpuDevice),
}

impl NativeDevice {
    /**
    Recovers a device from a host pointer.

    Returns `None` for a null pointer or a renderer this build has no backend for.

    # Safety
    A non-null `ptr` must point to a live device of the type named by `renderer`:
    a [`soft::Device`] for [`crate::Renderer::Software`], a [`wgpu::WgpuDevice`]
    for [`crate::Renderer::Wgpu`].  The device is cloned; the host keeps ownership
    of the pointee.
    */
    pub unsafe fn from_raw(ptr: *mut c_void, renderer: crate::Renderer) -> Option<NativeDevice> {
        if ptr.is_null() {
            return None;
        }
        match renderer {
            // SAFETY: upheld by caller
            crate::Renderer::Software => {
                Some(NativeDevice::Software(unsafe { &*ptr.cast::<soft::Device>() }.clone()))
            }
            #[cfg(feature = "backend_wgpu")]
            crate::Renderer::Wgpu => {
                Some(NativeDevice::Wgpu(unsafe { &*ptr.cast::<wgpu::WgpuDevice>() }.clone()))
            }
            _ => None,
        }
    }

    pub fn into_interface(self, config: Config) -> Box<dyn GraphicsInterface> {
        match self {
            NativeDevice::Software(device) => {
                Box::new(soft::SoftInterface::with_config(Some(device), config))
            }
            #[cfg(feature = "backend_wgpu")]
            NativeDevice::Wgpu(device) => Box::new(wgpu::WgpuInterface::with_config(device, config)),
        }
    }
}
