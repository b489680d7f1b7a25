// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
use super::device::{
    BindFlags, BufferDesc as NativeBufferDesc, CpuAccess, Device, MapMode, NativeError, QueryId,
    Region, ResourceId, TextureDesc2D, Usage,
};
use super::format::texture_format;
use crate::descriptor::{StagingKey, TextureDesc};
use crate::error::{Error, Result};
use crate::fence::{self, Fence};
use crate::formats::{BufferKind, ResourceFlags, TextureFormat};
use crate::imp::{NativeBuffer, NativeTexture};
use crate::interface::{
    Buffer, Config, DeviceType, GraphicsInterface, InstanceId, Texture2D, check_buffer_create,
    check_buffer_transfer, check_texture_create, check_texture_transfer,
    check_texture_write,
};
use crate::pitch::{ceil_div, copy_region};
use crate::staging::{StagingBuffers, StagingCache};
use std::ffi::c_void;

fn translate(error: NativeError) -> Error {
    match error {
        NativeError::OutOfMemory => Error::OutOfMemory,
        NativeError::InvalidArg => Error::InvalidParameter,
        NativeError::WasStillDrawing => Error::Unknown,
    }
}

fn buffer_bind(kind: BufferKind) -> BindFlags {
    match kind {
        BufferKind::Index => BindFlags::INDEX_BUFFER,
        BufferKind::Vertex => BindFlags::VERTEX_BUFFER,
        BufferKind::Constant => BindFlags::CONSTANT_BUFFER,
        BufferKind::Compute => BindFlags::SHADER_RESOURCE | BindFlags::UNORDERED_ACCESS,
    }
}

/// Usage class, bind flags and CPU access derived from creation flags.
fn usage_for(flags: ResourceFlags, bind: BindFlags) -> (Usage, BindFlags, CpuAccess) {
    let mut usage = Usage::Default;
    let mut cpu_access = CpuAccess::empty();
    let mut bind = bind;
    if flags.contains(ResourceFlags::CPU_WRITE) {
        usage = Usage::Dynamic;
        cpu_access |= CpuAccess::WRITE;
    }
    if flags.contains(ResourceFlags::CPU_READ) {
        usage = Usage::Staging;
        cpu_access |= CpuAccess::READ;
        bind = BindFlags::empty();
    }
    (usage, bind, cpu_access)
}

/// Event query on the emulated device.
#[derive(Debug)]
struct SoftFence {
    device: Device,
    query: QueryId,
}

impl Fence for SoftFence {
    fn signal(&mut self) {
        self.device.end(self.query);
    }

    fn is_complete(&mut self) -> bool {
        self.device.get_data(self.query)
    }
}

/**
Backend over the emulated immediate-context device.

Constructed without a device it is inert: [`GraphicsInterface::is_valid`]
reports `false`, the device type is [`DeviceType::Unknown`] and every operation
fails with [`Error::InvalidParameter`].
*/
#[derive(Debug)]
pub struct SoftInterface {
    id: InstanceId,
    device: Option<Device>,
    fence: Option<SoftFence>,
    config: Config,
    staging_textures: StagingCache<ResourceId>,
    staging_buffers: StagingBuffers<ResourceId>,
}

impl SoftInterface {
    pub fn new(device: Device) -> Self {
        Self::with_config(Some(device), Config::default())
    }

    pub fn inert() -> Self {
        Self::with_config(None, Config::default())
    }

    pub fn with_config(device: Option<Device>, config: Config) -> Self {
        let fence = device.as_ref().map(|device| SoftFence {
            device: device.clone(),
            query: device.create_query(),
        });
        SoftInterface {
            id: InstanceId::next(),
            device,
            fence,
            staging_textures: StagingCache::new(config.staging_texture_capacity),
            staging_buffers: StagingBuffers::new(),
            config,
        }
    }

    pub fn device(&self) -> Option<&Device> {
        self.device.as_ref()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn staging_textures(&self) -> &StagingCache<ResourceId> {
        &self.staging_textures
    }

    pub fn staging_buffers(&self) -> &StagingBuffers<ResourceId> {
        &self.staging_buffers
    }

    fn live_device(&self) -> Result<&Device> {
        self.device.as_ref().ok_or(Error::InvalidParameter)
    }

    fn texture_id(texture: &Texture2D) -> Result<ResourceId> {
        texture.native.soft().ok_or(Error::InvalidParameter)
    }

    fn buffer_id(buffer: &Buffer) -> Result<ResourceId> {
        buffer.native.soft().ok_or(Error::InvalidParameter)
    }

    fn staging_texture(&mut self, desc: &TextureDesc) -> Result<ResourceId> {
        let device = self.device.as_ref().ok_or(Error::InvalidParameter)?;
        let format = texture_format(desc.format);
        let key = StagingKey::texture(desc, format.code());
        let native = TextureDesc2D {
            width: desc.width,
            height: desc.height,
            format,
            usage: Usage::Staging,
            bind: BindFlags::empty(),
            cpu_access: CpuAccess::READ,
        };
        self.staging_textures
            .acquire(
                key,
                *desc,
                || {
                    device.create_texture_2d(&native, None).map_err(|e| {
                        logwise::error_sync!(
                            "read_texture_2d: staging texture allocation failed: {e}",
                            e = logwise::privacy::LogIt(&e)
                        );
                        Error::OutOfMemory
                    })
                },
                |mirror| device.release(mirror),
            )
            .copied()
    }

    fn staging_buffer(&mut self, kind: BufferKind, size: usize) -> Result<ResourceId> {
        let device = self.device.as_ref().ok_or(Error::InvalidParameter)?;
        self.staging_buffers
            .acquire(
                kind,
                size,
                |size| {
                    let native = NativeBufferDesc {
                        byte_width: size,
                        usage: Usage::Staging,
                        bind: BindFlags::empty(),
                        cpu_access: CpuAccess::READ | CpuAccess::WRITE,
                    };
                    device.create_buffer(&native, None).map_err(|e| {
                        logwise::error_sync!(
                            "read_buffer: staging buffer allocation failed: {e}",
                            e = logwise::privacy::LogIt(&e)
                        );
                        Error::OutOfMemory
                    })
                },
                |mirror| device.release(mirror),
            )
            .copied()
    }

    /// Maps `id` for reading and copies `size` tightly packed bytes out of it.
    fn read_mapped(device: &Device, id: ResourceId, dst: &mut [u8], row_bytes: usize, size: usize) -> Result<()> {
        let mapped = device.map(id, MapMode::Read).map_err(|e| {
            logwise::error_sync!("read: map failed: {e}", e = logwise::privacy::LogIt(&e));
            translate(e)
        })?;
        copy_region(dst, row_bytes, &mapped, mapped.row_pitch(), row_bytes, size);
        Ok(())
    }

    /// Maps `id` for writing, falling back to a discard map when the resource is busy.
    fn write_mapped(device: &Device, id: ResourceId, src: &[u8], row_bytes: usize, size: usize) -> Result<()> {
        let mut mapped = match device.map(id, MapMode::Write) {
            Ok(mapped) => mapped,
            Err(_) => device.map(id, MapMode::WriteDiscard).map_err(|e| {
                logwise::error_sync!("write: map failed: {e}", e = logwise::privacy::LogIt(&e));
                translate(e)
            })?,
        };
        let pitch = mapped.row_pitch();
        copy_region(&mut mapped, pitch, src, row_bytes, row_bytes, size);
        Ok(())
    }
}

impl GraphicsInterface for SoftInterface {
    fn device_type(&self) -> DeviceType {
        match self.device {
            Some(_) => DeviceType::Software,
            None => DeviceType::Unknown,
        }
    }

    fn device_ptr(&self) -> *mut c_void {
        match &self.device {
            Some(device) => device.as_ptr(),
            None => std::ptr::null_mut(),
        }
    }

    fn is_valid(&self) -> bool {
        self.device.is_some()
    }

    fn sync(&mut self) {
        if let Some(fence) = self.fence.as_mut() {
            let polls = fence::wait(fence, self.config.sync_poll_interval);
            logwise::trace_sync!("sync: completed after {polls} pending polls", polls = polls);
        }
    }

    fn clear_staging(&mut self) {
        let Some(device) = self.device.as_ref() else {
            return;
        };
        self.staging_textures.clear(|mirror| device.release(mirror));
        self.staging_buffers.clear(|mirror| device.release(mirror));
    }

    fn create_texture_2d(
        &mut self,
        width: u32,
        height: u32,
        format: TextureFormat,
        data: Option<&[u8]>,
        flags: ResourceFlags,
    ) -> Result<Texture2D> {
        let desc = check_texture_create(width, height, format, data)?;
        let device = self.live_device()?;
        let (usage, bind, cpu_access) = usage_for(flags, BindFlags::SHADER_RESOURCE);
        let native = TextureDesc2D {
            width,
            height,
            format: texture_format(format),
            usage,
            bind,
            cpu_access,
        };
        let id = device
            .create_texture_2d(&native, data.map(|d| (d, desc.row_bytes())))
            .map_err(translate)?;
        Ok(Texture2D {
            owner: self.id,
            desc,
            native: NativeTexture::Soft(id),
        })
    }

    fn release_texture_2d(&mut self, texture: Texture2D) -> Option<Texture2D> {
        if texture.owner != self.id {
            logwise::warn_sync!("release_texture_2d: texture belongs to another backend instance");
            return Some(texture);
        }
        if let (Some(device), Ok(id)) = (self.device.as_ref(), Self::texture_id(&texture)) {
            device.release(id);
        }
        None
    }

    fn read_texture_2d(
        &mut self,
        dst: &mut [u8],
        read_size: usize,
        texture: &Texture2D,
        width: u32,
        height: u32,
        format: TextureFormat,
    ) -> Result<()> {
        if read_size == 0 {
            return Ok(());
        }
        let desc = check_texture_transfer(self.id, texture, width, height, format, dst.len(), read_size)?;
        let id = Self::texture_id(texture)?;
        let device = self.live_device()?.clone();
        let mappable = device
            .texture_desc(id)
            .is_some_and(|d| d.cpu_access.contains(CpuAccess::READ));
        let row_bytes = desc.row_bytes();
        if mappable {
            return Self::read_mapped(&device, id, dst, row_bytes, read_size);
        }
        let staging = self.staging_texture(&desc)?;
        device.copy_resource(staging, id);
        //mapping does not wait for the copy
        self.sync();
        Self::read_mapped(&device, staging, dst, row_bytes, read_size)
    }

    fn write_texture_2d(
        &mut self,
        texture: &Texture2D,
        width: u32,
        height: u32,
        format: TextureFormat,
        src: &[u8],
        write_size: usize,
    ) -> Result<()> {
        if write_size == 0 {
            return Ok(());
        }
        let desc = check_texture_write(self.id, texture, width, height, format, src.len(), write_size)?;
        let id = Self::texture_id(texture)?;
        let device = self.live_device()?;
        let mappable = device
            .texture_desc(id)
            .is_some_and(|d| d.cpu_access.contains(CpuAccess::WRITE));
        let row_bytes = desc.row_bytes();
        if mappable {
            return Self::write_mapped(device, id, src, row_bytes, write_size);
        }
        let texel = format.texel_size();
        let texels = write_size / texel;
        let full_rows = (texels / width as usize) as u32;
        if full_rows > 0 {
            let region = Region {
                left: 0,
                top: 0,
                right: width,
                bottom: full_rows,
            };
            device.update_subresource(id, &region, src, row_bytes);
        }
        let rest = (texels % width as usize) as u32;
        if rest > 0 {
            debug_assert_eq!(ceil_div(texels, width as usize), full_rows as usize + 1);
            let region = Region {
                left: 0,
                top: full_rows,
                right: rest,
                bottom: full_rows + 1,
            };
            let offset = full_rows as usize * row_bytes;
            device.update_subresource(id, &region, &src[offset..write_size], row_bytes);
        }
        Ok(())
    }

    fn create_buffer(
        &mut self,
        size: usize,
        kind: BufferKind,
        data: Option<&[u8]>,
        flags: ResourceFlags,
    ) -> Result<Buffer> {
        let desc = check_buffer_create(size, kind, data)?;
        let device = self.live_device()?;
        let (usage, bind, cpu_access) = usage_for(flags, buffer_bind(kind));
        let native = NativeBufferDesc {
            byte_width: size,
            usage,
            bind,
            cpu_access,
        };
        let id = device.create_buffer(&native, data).map_err(translate)?;
        Ok(Buffer {
            owner: self.id,
            desc,
            native: NativeBuffer::Soft(id),
        })
    }

    fn release_buffer(&mut self, buffer: Buffer) -> Option<Buffer> {
        if buffer.owner != self.id {
            logwise::warn_sync!("release_buffer: buffer belongs to another backend instance");
            return Some(buffer);
        }
        if let (Some(device), Ok(id)) = (self.device.as_ref(), Self::buffer_id(&buffer)) {
            device.release(id);
        }
        None
    }

    fn read_buffer(
        &mut self,
        dst: &mut [u8],
        buffer: &Buffer,
        read_size: usize,
        kind: BufferKind,
    ) -> Result<()> {
        if read_size == 0 {
            return Ok(());
        }
        check_buffer_transfer(self.id, buffer, kind, dst.len(), read_size)?;
        let id = Self::buffer_id(buffer)?;
        let device = self.live_device()?.clone();
        let mappable = device
            .buffer_desc(id)
            .is_some_and(|d| d.cpu_access.contains(CpuAccess::READ));
        if mappable {
            return Self::read_mapped(&device, id, dst, read_size, read_size);
        }
        let staging = self.staging_buffer(kind, read_size)?;
        device.copy_buffer_region(staging, id, read_size);
        self.sync();
        Self::read_mapped(&device, staging, dst, read_size, read_size)
    }

    fn write_buffer(
        &mut self,
        buffer: &Buffer,
        src: &[u8],
        write_size: usize,
        kind: BufferKind,
    ) -> Result<()> {
        if write_size == 0 {
            return Ok(());
        }
        check_buffer_transfer(self.id, buffer, kind, src.len(), write_size)?;
        let id = Self::buffer_id(buffer)?;
        let device = self.live_device()?;
        let mappable = device
            .buffer_desc(id)
            .is_some_and(|d| d.cpu_access.contains(CpuAccess::WRITE));
        if mappable {
            return Self::write_mapped(device, id, src, write_size, write_size);
        }
        let region = Region {
            left: 0,
            top: 0,
            right: write_size as u32,
            bottom: 1,
        };
        device.update_subresource(id, &region, &src[..write_size], write_size);
        Ok(())
    }
}

impl Drop for SoftInterface {
    fn drop(&mut self) {
        self.clear_staging();
    }
}
