// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
The backend contract.

[`GraphicsInterface`] is implemented once per native API.  Every operation runs
synchronously on the calling thread and either completes or fails immediately
with an [`Error`]; the one exception is [`GraphicsInterface::sync`], which blocks
until previously submitted GPU work has finished.

# Mappability

Whether a read or write can go straight through a CPU mapping is decided by the
native usage of the resource, which in turn follows from the [`ResourceFlags`]
passed at creation.  Reads of resources that cannot be mapped are redirected
through a staging mirror (see [`crate::staging`]) and pay for a `sync()`; writes
to them become a bounded device-side update and never wait.
*/

use crate::descriptor::{BufferDesc, TextureDesc};
use crate::error::{Error, Result};
use crate::fence::DEFAULT_POLL_INTERVAL;
use crate::formats::{BufferKind, ResourceFlags, TextureFormat};
use crate::imp;
use crate::staging::STAGING_TEXTURE_CAPACITY;
use std::ffi::c_void;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Native API family behind a backend.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceType {
    Unknown = 0,
    D3D9 = 1,
    D3D11 = 2,
    D3D12 = 3,
    OpenGL = 4,
    Vulkan = 5,
    /// The emulated immediate-context device in [`crate::soft`].
    Software = 6,
    Wgpu = 7,
}

/// Which side of a host device reset is being reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetPhase {
    BeforeReset,
    AfterReset,
}

/// Runtime knobs shared by every backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Texture mirrors kept before the staging cache is bulk-evicted.
    pub staging_texture_capacity: usize,
    /// Sleep between fence polls in `sync()`.
    pub sync_poll_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            staging_texture_capacity: STAGING_TEXTURE_CAPACITY,
            sync_poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// Identity of one backend instance.  Handles remember who created them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstanceId(u64);

impl InstanceId {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        InstanceId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/**
A 2D texture owned by the caller.

Handles are not `Clone`.  Release one by passing it to
[`GraphicsInterface::release_texture_2d`]; after that it no longer exists.
*/
#[derive(Debug)]
#[must_use = "textures must be released through the interface that created them"]
pub struct Texture2D {
    pub(crate) owner: InstanceId,
    pub(crate) desc: TextureDesc,
    pub(crate) native: imp::NativeTexture,
}

impl Texture2D {
    pub fn desc(&self) -> &TextureDesc {
        &self.desc
    }
}

/// A GPU buffer owned by the caller.
#[derive(Debug)]
#[must_use = "buffers must be released through the interface that created them"]
pub struct Buffer {
    pub(crate) owner: InstanceId,
    pub(crate) desc: BufferDesc,
    pub(crate) native: imp::NativeBuffer,
}

impl Buffer {
    pub fn desc(&self) -> &BufferDesc {
        &self.desc
    }
}

/**
Uniform resource access across native APIs.

All transfer sizes are in bytes.  Texture data crossing this interface is
always tightly packed (`width * texel_size` bytes per row).
*/
pub trait GraphicsInterface {
    fn device_type(&self) -> DeviceType;

    /// The native device this backend wraps, or null for an inert backend.
    fn device_ptr(&self) -> *mut c_void;

    /// `false` when the backend was constructed without a native device.
    fn is_valid(&self) -> bool;

    /// Blocks until all GPU work submitted so far has completed.
    fn sync(&mut self);

    /// Drops every staging mirror.
    fn clear_staging(&mut self);

    /// Host reset hook.  Transient resources are dropped before the reset.
    fn on_device_reset(&mut self, phase: ResetPhase) {
        if phase == ResetPhase::BeforeReset {
            self.clear_staging();
        }
    }

    /// `data`, if present, is tightly packed and covers the whole texture.
    fn create_texture_2d(
        &mut self,
        width: u32,
        height: u32,
        format: TextureFormat,
        data: Option<&[u8]>,
        flags: ResourceFlags,
    ) -> Result<Texture2D>;

    /// Destroys `texture`.  A handle from another backend instance is handed back untouched.
    fn release_texture_2d(&mut self, texture: Texture2D) -> Option<Texture2D>;

    /// Reads the first `read_size` bytes of `texture` into `dst`.
    fn read_texture_2d(
        &mut self,
        dst: &mut [u8],
        read_size: usize,
        texture: &Texture2D,
        width: u32,
        height: u32,
        format: TextureFormat,
    ) -> Result<()>;

    /// Writes `write_size` bytes of `src` to the start of `texture`.
    fn write_texture_2d(
        &mut self,
        texture: &Texture2D,
        width: u32,
        height: u32,
        format: TextureFormat,
        src: &[u8],
        write_size: usize,
    ) -> Result<()>;

    fn create_buffer(
        &mut self,
        size: usize,
        kind: BufferKind,
        data: Option<&[u8]>,
        flags: ResourceFlags,
    ) -> Result<Buffer>;

    /// Destroys `buffer`.  A handle from another backend instance is handed back untouched.
    fn release_buffer(&mut self, buffer: Buffer) -> Option<Buffer>;

    fn read_buffer(
        &mut self,
        dst: &mut [u8],
        buffer: &Buffer,
        read_size: usize,
        kind: BufferKind,
    ) -> Result<()>;

    fn write_buffer(
        &mut self,
        buffer: &Buffer,
        src: &[u8],
        write_size: usize,
        kind: BufferKind,
    ) -> Result<()>;

    /// Tears the backend down, staging cache included.
    fn release(self: Box<Self>) {}
}

/*
Parameter checks shared by the backends.  Each returns the validated descriptor
so the backend does not have to re-derive it.
*/

pub(crate) fn check_texture_create(
    width: u32,
    height: u32,
    format: TextureFormat,
    data: Option<&[u8]>,
) -> Result<TextureDesc> {
    let desc = TextureDesc::new(width, height, format)?;
    if data.is_some_and(|d| d.len() < desc.byte_len()) {
        return Err(Error::InvalidParameter);
    }
    Ok(desc)
}

pub(crate) fn check_buffer_create(
    size: usize,
    kind: BufferKind,
    data: Option<&[u8]>,
) -> Result<BufferDesc> {
    let desc = BufferDesc::new(size, kind)?;
    if data.is_some_and(|d| d.len() < size) {
        return Err(Error::InvalidParameter);
    }
    Ok(desc)
}

/// Validates a texture transfer of `size` bytes against a caller slice of `len` bytes.
pub(crate) fn check_texture_transfer(
    owner: InstanceId,
    texture: &Texture2D,
    width: u32,
    height: u32,
    format: TextureFormat,
    len: usize,
    size: usize,
) -> Result<TextureDesc> {
    let desc = texture.desc;
    if texture.owner != owner
        || desc.width != width
        || desc.height != height
        || desc.format != format
        || len < size
        || size > desc.byte_len()
    {
        return Err(Error::InvalidParameter);
    }
    Ok(desc)
}

/// As [`check_texture_transfer`], and the written bytes must be whole texels.
pub(crate) fn check_texture_write(
    owner: InstanceId,
    texture: &Texture2D,
    width: u32,
    height: u32,
    format: TextureFormat,
    len: usize,
    size: usize,
) -> Result<TextureDesc> {
    let desc = check_texture_transfer(owner, texture, width, height, format, len, size)?;
    if size % format.texel_size() != 0 {
        return Err(Error::InvalidParameter);
    }
    Ok(desc)
}

pub(crate) fn check_buffer_transfer(
    owner: InstanceId,
    buffer: &Buffer,
    kind: BufferKind,
    len: usize,
    size: usize,
) -> Result<BufferDesc> {
    let desc = buffer.desc;
    if buffer.owner != owner || desc.kind != kind || len < size || size > desc.size {
        return Err(Error::InvalidParameter);
    }
    Ok(desc)
}
