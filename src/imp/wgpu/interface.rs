// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
use super::bound_device::WgpuDevice;
use super::buffer::{self as buf, aligned};
use super::fence::WgpuFence;
use super::pixel_format::format_code;
use super::texture::{self as tex, padded_row_bytes};
use crate::descriptor::{StagingKey, TextureDesc};
use crate::error::{Error, Result};
use crate::fence;
use crate::formats::{BufferKind, ResourceFlags, TextureFormat};
use crate::imp::{NativeBuffer, NativeTexture};
use crate::interface::{
    Buffer, Config, DeviceType, GraphicsInterface, InstanceId, Texture2D, check_buffer_create,
    check_buffer_transfer, check_texture_create, check_texture_transfer,
    check_texture_write,
};
use crate::pitch::copy_region;
use crate::staging::{StagingBuffers, StagingCache};
use std::ffi::c_void;
use std::sync::Arc;
use wgpu::{BufferUsages, MapMode};

/// Backend over a wgpu device.
#[derive(Debug)]
pub struct WgpuInterface {
    id: InstanceId,
    device: Arc<WgpuDevice>,
    mappable_primary: bool,
    fence: WgpuFence,
    config: Config,
    staging_textures: StagingCache<wgpu::Buffer>,
    staging_buffers: StagingBuffers<wgpu::Buffer>,
}

impl WgpuInterface {
    pub fn new(device: WgpuDevice) -> Self {
        Self::with_config(device, Config::default())
    }

    pub fn with_config(device: WgpuDevice, config: Config) -> Self {
        let mappable_primary = device.mappable_primary_buffers();
        logwise::info_sync!(
            "wgpu backend, mappable primary buffers: {mappable}",
            mappable = mappable_primary
        );
        WgpuInterface {
            id: InstanceId::next(),
            fence: WgpuFence::new(device.clone()),
            device: Arc::new(device),
            mappable_primary,
            staging_textures: StagingCache::new(config.staging_texture_capacity),
            staging_buffers: StagingBuffers::new(),
            config,
        }
    }

    pub fn device(&self) -> &WgpuDevice {
        &self.device
    }

    pub fn staging_textures(&self) -> &StagingCache<wgpu::Buffer> {
        &self.staging_textures
    }

    pub fn staging_buffers(&self) -> &StagingBuffers<wgpu::Buffer> {
        &self.staging_buffers
    }

    fn texture_ref(texture: &Texture2D) -> Result<&wgpu::Texture> {
        texture.native.wgpu().ok_or(Error::InvalidParameter)
    }

    fn buffer_ref(buffer: &Buffer) -> Result<&wgpu::Buffer> {
        buffer.native.wgpu().ok_or(Error::InvalidParameter)
    }

    fn readback_texture(&mut self, desc: &TextureDesc) -> Result<wgpu::Buffer> {
        let device = &self.device;
        let key = StagingKey::texture(desc, format_code(desc.format));
        let size = padded_row_bytes(desc) * desc.height as usize;
        self.staging_textures
            .acquire(
                key,
                *desc,
                || {
                    buf::create(
                        device,
                        "graphics_interface staging texture",
                        size,
                        BufferUsages::MAP_READ | BufferUsages::COPY_DST,
                        None,
                    )
                    .map_err(|e| {
                        logwise::error_sync!("read_texture_2d: staging allocation failed");
                        match e {
                            Error::InvalidParameter => e,
                            _ => Error::OutOfMemory,
                        }
                    })
                },
                drop,
            )
            .cloned()
    }

    fn readback_buffer(&mut self, kind: BufferKind, size: usize) -> Result<wgpu::Buffer> {
        let device = &self.device;
        self.staging_buffers
            .acquire(
                kind,
                aligned(size),
                |size| {
                    buf::create(
                        device,
                        "graphics_interface staging buffer",
                        size,
                        BufferUsages::MAP_READ | BufferUsages::COPY_DST,
                        None,
                    )
                    .map_err(|_| {
                        logwise::error_sync!("read_buffer: staging allocation failed");
                        Error::OutOfMemory
                    })
                },
                drop,
            )
            .cloned()
    }
}

impl GraphicsInterface for WgpuInterface {
    fn device_type(&self) -> DeviceType {
        DeviceType::Wgpu
    }

    fn device_ptr(&self) -> *mut c_void {
        Arc::as_ptr(&self.device).cast_mut().cast()
    }

    fn is_valid(&self) -> bool {
        true
    }

    fn sync(&mut self) {
        let polls = fence::wait(&mut self.fence, self.config.sync_poll_interval);
        logwise::trace_sync!("sync: completed after {polls} pending polls", polls = polls);
    }

    fn clear_staging(&mut self) {
        self.staging_textures.clear(drop);
        self.staging_buffers.clear(drop);
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
        let max = self.device.device.limits().max_texture_dimension_2d;
        if width > max || height > max {
            return Err(Error::InvalidParameter);
        }
        if !flags.is_empty() {
            logwise::trace_sync!("create_texture_2d: wgpu textures are never host-mappable");
        }
        let gpu_texture = tex::create(&self.device, &desc)?;
        if let Some(data) = data {
            tex::write(&self.device, &gpu_texture, &desc, data, desc.byte_len());
        }
        Ok(Texture2D {
            owner: self.id,
            desc,
            native: NativeTexture::Wgpu(gpu_texture),
        })
    }

    fn release_texture_2d(&mut self, texture: Texture2D) -> Option<Texture2D> {
        if texture.owner != self.id {
            logwise::warn_sync!("release_texture_2d: texture belongs to another backend instance");
            return Some(texture);
        }
        if let Ok(t) = Self::texture_ref(&texture) {
            t.destroy();
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
        let gpu_texture = Self::texture_ref(texture)?;
        let readback = self.readback_texture(&desc)?;
        tex::copy_to_readback(&self.device, gpu_texture, &desc, &readback);
        self.sync();
        let slice = readback.slice(..);
        self.device.map(slice, MapMode::Read)?;
        let view = slice.get_mapped_range();
        let row_bytes = desc.row_bytes();
        copy_region(dst, row_bytes, &view, padded_row_bytes(&desc), row_bytes, read_size);
        drop(view);
        readback.unmap();
        Ok(())
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
        let gpu_texture = Self::texture_ref(texture)?;
        tex::write(&self.device, gpu_texture, &desc, src, write_size);
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
        if aligned(size) as u64 > self.device.device.limits().max_buffer_size {
            return Err(Error::InvalidParameter);
        }
        let usage = buf::buffer_usage(kind, flags, self.mappable_primary);
        let gpu_buffer = buf::create(&self.device, "graphics_interface buffer", size, usage, data)?;
        Ok(Buffer {
            owner: self.id,
            desc,
            native: NativeBuffer::Wgpu(gpu_buffer),
        })
    }

    fn release_buffer(&mut self, buffer: Buffer) -> Option<Buffer> {
        if buffer.owner != self.id {
            logwise::warn_sync!("release_buffer: buffer belongs to another backend instance");
            return Some(buffer);
        }
        if let Ok(b) = Self::buffer_ref(&buffer) {
            b.destroy();
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
        let gpu_buffer = Self::buffer_ref(buffer)?;
        if gpu_buffer.usage().contains(BufferUsages::MAP_READ) {
            return buf::read_mapped(&self.device, gpu_buffer, dst, read_size);
        }
        let readback = self.readback_buffer(kind, read_size)?;
        let mut encoder = self
            .device
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("graphics_interface readback"),
            });
        encoder.copy_buffer_to_buffer(gpu_buffer, 0, &readback, 0, aligned(read_size) as u64);
        self.device.queue.submit(std::iter::once(encoder.finish()));
        self.sync();
        buf::read_mapped(&self.device, &readback, dst, read_size)
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
        let gpu_buffer = Self::buffer_ref(buffer)?;
        let src = &src[..write_size];
        if gpu_buffer.usage().contains(BufferUsages::MAP_WRITE) {
            buf::write_mapped(&self.device, gpu_buffer, src)
        } else {
            buf::write_queued(&self.device, gpu_buffer, src)
        }
    }
}
