// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
use super::device::NativeFormat;
use crate::formats::TextureFormat;

pub const fn texture_format(format: TextureFormat) -> NativeFormat {
    match format {
        TextureFormat::RGBAu8 => NativeFormat::R8G8B8A8Typeless,
        TextureFormat::RGBAf16 => NativeFormat::R16G16B16A16Float,
        TextureFormat::RGf16 => NativeFormat::R16G16Float,
        TextureFormat::Rf16 => NativeFormat::R16Float,
        TextureFormat::RGBAf32 => NativeFormat::R32G32B32A32Float,
        TextureFormat::RGf32 => NativeFormat::R32G32Float,
        TextureFormat::Rf32 => NativeFormat::R32Float,
        TextureFormat::RGBAi32 => NativeFormat::R32G32B32A32Sint,
        TextureFormat::RGi32 => NativeFormat::R32G32Sint,
        TextureFormat::Ri32 => NativeFormat::R32Sint,
    }
}
