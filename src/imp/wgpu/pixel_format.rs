// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
use crate::formats::TextureFormat;

pub const fn wgpu_format(format: TextureFormat) -> wgpu::TextureFormat {
    match format {
        TextureFormat::RGBAu8 => wgpu::TextureFormat::Rgba8Unorm,
        TextureFormat::RGBAf16 => wgpu::TextureFormat::Rgba16Float,
        TextureFormat::RGf16 => wgpu::TextureFormat::Rg16Float,
        TextureFormat::Rf16 => wgpu::TextureFormat::R16Float,
        TextureFormat::RGBAf32 => wgpu::TextureFormat::Rgba32Float,
        TextureFormat::RGf32 => wgpu::TextureFormat::Rg32Float,
        TextureFormat::Rf32 => wgpu::TextureFormat::R32Float,
        TextureFormat::RGBAi32 => wgpu::TextureFormat::Rgba32Sint,
        TextureFormat::RGi32 => wgpu::TextureFormat::Rg32Sint,
        TextureFormat::Ri32 => wgpu::TextureFormat::R32Sint,
    }
}

/// Distinguishes native formats inside staging keys.
pub const fn format_code(format: TextureFormat) -> u16 {
    //wgpu formats carry no stable numeric code; the table order serves
    0x100 | format as u16
}
