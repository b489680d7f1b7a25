// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
Texture creation, upload and readback for the wgpu backend.

wgpu textures are never host-mappable.  Reads go through a readback buffer whose
rows are padded to `COPY_BYTES_PER_ROW_ALIGNMENT`; writes go through
`Queue::write_texture`, which accepts tightly packed rows.
*/

use super::bound_device::WgpuDevice;
use super::pixel_format::wgpu_format;
use crate::descriptor::TextureDesc;
use crate::error::Result;
use crate::pitch::align_up;
use wgpu::{Extent3d, TexelCopyBufferInfo, TexelCopyBufferLayout, TexelCopyTextureInfo};

pub(super) const TEXTURE_USAGE: wgpu::TextureUsages = wgpu::TextureUsages::TEXTURE_BINDING
    .union(wgpu::TextureUsages::COPY_DST)
    .union(wgpu::TextureUsages::COPY_SRC);

/// Row stride of a readback buffer for `desc`.
pub(super) fn padded_row_bytes(desc: &TextureDesc) -> usize {
    align_up(desc.row_bytes(), wgpu::COPY_BYTES_PER_ROW_ALIGNMENT as usize)
}

pub(super) fn create(device: &WgpuDevice, desc: &TextureDesc) -> Result<wgpu::Texture> {
    let descriptor = wgpu::TextureDescriptor {
        label: Some("graphics_interface texture"),
        size: Extent3d {
            width: desc.width,
            height: desc.height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu_format(desc.format),
        usage: TEXTURE_USAGE,
        view_formats: &[],
    };
    device.scoped(|d| d.create_texture(&descriptor))
}

fn upload(device: &WgpuDevice, texture: &wgpu::Texture, y: u32, width: u32, rows: u32, data: &[u8], row_bytes: usize) {
    device.queue.write_texture(
        TexelCopyTextureInfo {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d { x: 0, y, z: 0 },
            aspect: wgpu::TextureAspect::All,
        },
        data,
        TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(row_bytes as u32),
            rows_per_image: Some(rows),
        },
        Extent3d {
            width,
            height: rows,
            depth_or_array_layers: 1,
        },
    );
}

/**
Uploads the first `size` tightly packed bytes of `src`.

Whole rows go in one region; a trailing partial row becomes a second,
narrower region so nothing past `size` is touched.
*/
pub(super) fn write(device: &WgpuDevice, texture: &wgpu::Texture, desc: &TextureDesc, src: &[u8], size: usize) {
    let row_bytes = desc.row_bytes();
    let texel = desc.format.texel_size();
    let texels = size / texel;
    let full_rows = (texels / desc.width as usize) as u32;
    if full_rows > 0 {
        upload(device, texture, 0, desc.width, full_rows, src, row_bytes);
    }
    let rest = (texels % desc.width as usize) as u32;
    if rest > 0 {
        let offset = full_rows as usize * row_bytes;
        upload(device, texture, full_rows, rest, 1, &src[offset..size], row_bytes);
    }
    device.flush();
}

/// Records and submits a copy of the whole texture into `readback`.
pub(super) fn copy_to_readback(device: &WgpuDevice, texture: &wgpu::Texture, desc: &TextureDesc, readback: &wgpu::Buffer) {
    let mut encoder = device
        .device
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("graphics_interface readback"),
        });
    encoder.copy_texture_to_buffer(
        TexelCopyTextureInfo {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        TexelCopyBufferInfo {
            buffer: readback,
            layout: TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(padded_row_bytes(desc) as u32),
                rows_per_image: Some(desc.height),
            },
        },
        Extent3d {
            width: desc.width,
            height: desc.height,
            depth_or_array_layers: 1,
        },
    );
    device.queue.submit(std::iter::once(encoder.finish()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::TextureFormat;

    #[test]
    fn readback_rows_are_padded() {
        let desc = TextureDesc::new(3, 2, TextureFormat::RGBAu8).unwrap();
        assert_eq!(padded_row_bytes(&desc), 256);
        let desc = TextureDesc::new(64, 2, TextureFormat::RGBAf32).unwrap();
        assert_eq!(padded_row_bytes(&desc), 1024);
    }
}
