// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
Buffer creation and mapping for the wgpu backend.

wgpu only lets buffers with `MAP_READ`/`MAP_WRITE` usage be mapped.  Without
`MAPPABLE_PRIMARY_BUFFERS` those usages combine with nothing but `COPY_DST` and
`COPY_SRC` respectively, so:

- `CPU_READ` yields a readback-class buffer (`MAP_READ | COPY_DST`) that cannot
  be bound, like a staging resource.
- `CPU_WRITE` only yields a mappable buffer when the feature is available;
  otherwise the buffer stays bindable and writes go through the queue.
*/

use super::bound_device::WgpuDevice;
use crate::error::{Error, Result};
use crate::formats::{BufferKind, ResourceFlags};
use crate::pitch::align_up;
use wgpu::{BufferDescriptor, BufferUsages, MapMode};

/// Buffer sizes and copy extents must be multiples of this.
pub(super) const ALIGNMENT: usize = wgpu::COPY_BUFFER_ALIGNMENT as usize;

pub(super) const fn aligned(size: usize) -> usize {
    align_up(size, ALIGNMENT)
}

const fn kind_usage(kind: BufferKind) -> BufferUsages {
    match kind {
        BufferKind::Index => BufferUsages::INDEX,
        BufferKind::Vertex => BufferUsages::VERTEX,
        BufferKind::Constant => BufferUsages::UNIFORM,
        BufferKind::Compute => BufferUsages::STORAGE,
    }
}

pub(super) fn buffer_usage(
    kind: BufferKind,
    flags: ResourceFlags,
    mappable_primary: bool,
) -> BufferUsages {
    let base = kind_usage(kind) | BufferUsages::COPY_SRC | BufferUsages::COPY_DST;
    let mut usage = base;
    if flags.contains(ResourceFlags::CPU_READ) {
        usage = if mappable_primary {
            base | BufferUsages::MAP_READ
        } else {
            BufferUsages::MAP_READ | BufferUsages::COPY_DST
        };
    }
    if flags.contains(ResourceFlags::CPU_WRITE) && mappable_primary {
        usage |= BufferUsages::MAP_WRITE;
    }
    usage
}

/// Creates a buffer of at least `size` bytes, optionally initialized from `data`.
pub(super) fn create(
    device: &WgpuDevice,
    label: &str,
    size: usize,
    usage: BufferUsages,
    data: Option<&[u8]>,
) -> Result<wgpu::Buffer> {
    let descriptor = BufferDescriptor {
        label: Some(label),
        size: aligned(size) as u64,
        usage,
        mapped_at_creation: data.is_some(),
    };
    let buffer = device.scoped(|d| d.create_buffer(&descriptor))?;
    if let Some(data) = data {
        let mut entire_map = buffer.slice(..).get_mapped_range_mut();
        entire_map[..size].copy_from_slice(&data[..size]);
        drop(entire_map);
        buffer.unmap();
    }
    Ok(buffer)
}

/// Maps the first `size` bytes of `buffer` for reading and copies them into `dst`.
pub(super) fn read_mapped(device: &WgpuDevice, buffer: &wgpu::Buffer, dst: &mut [u8], size: usize) -> Result<()> {
    let slice = buffer.slice(..aligned(size) as u64);
    device.map(slice, MapMode::Read)?;
    let view = slice.get_mapped_range();
    dst[..size].copy_from_slice(&view[..size]);
    drop(view);
    buffer.unmap();
    Ok(())
}

/**
Writes `src` to the start of a `MAP_WRITE` buffer.

If the mapping cannot be established the data is handed to the queue instead,
which stages it without waiting for the buffer to become idle.
*/
pub(super) fn write_mapped(device: &WgpuDevice, buffer: &wgpu::Buffer, src: &[u8]) -> Result<()> {
    let slice = buffer.slice(..aligned(src.len()) as u64);
    match device.map(slice, MapMode::Write) {
        Ok(()) => {
            let mut view = slice.get_mapped_range_mut();
            view[..src.len()].copy_from_slice(src);
            drop(view);
            buffer.unmap();
            Ok(())
        }
        Err(e) => {
            if buffer.usage().contains(BufferUsages::COPY_DST) {
                write_queued(device, buffer, src)
            } else {
                logwise::error_sync!("write_buffer: map failed and buffer is not a copy destination");
                Err(e)
            }
        }
    }
}

/// Stages `src` through the queue.  The length must be a multiple of [`ALIGNMENT`].
pub(super) fn write_queued(device: &WgpuDevice, buffer: &wgpu::Buffer, src: &[u8]) -> Result<()> {
    if src.len() % ALIGNMENT != 0 {
        return Err(Error::InvalidParameter);
    }
    device.queue.write_buffer(buffer, 0, src);
    device.flush();
    Ok(())
}
