// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Logical texture formats, buffer kinds and resource flags.
//!
//! These types are backend-agnostic.  Each backend owns a translation table
//! from them to its native descriptors (see `imp::soft::format` and
//! `imp::wgpu::format`).
//!
//! # Texel sizes
//!
//! | Format    | Channels | Bytes |
//! |-----------|----------|-------|
//! | `RGBAu8`  | 4        | 4     |
//! | `RGBAf16` | 4        | 8     |
//! | `RGf16`   | 2        | 4     |
//! | `Rf16`    | 1        | 2     |
//! | `RGBAf32` | 4        | 16    |
//! | `RGf32`   | 2        | 8     |
//! | `Rf32`    | 1        | 4     |
//! | `RGBAi32` | 4        | 16    |
//! | `RGi32`   | 2        | 8     |
//! | `Ri32`    | 1        | 4     |

pub use half::f16;

/// Texture formats understood by every backend.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    /// 8-bit normalized RGBA.
    RGBAu8 = 0,
    RGBAf16 = 1,
    RGf16 = 2,
    Rf16 = 3,
    RGBAf32 = 4,
    RGf32 = 5,
    Rf32 = 6,
    RGBAi32 = 7,
    RGi32 = 8,
    Ri32 = 9,
}

impl TextureFormat {
    pub const ALL: [TextureFormat; 10] = [
        TextureFormat::RGBAu8,
        TextureFormat::RGBAf16,
        TextureFormat::RGf16,
        TextureFormat::Rf16,
        TextureFormat::RGBAf32,
        TextureFormat::RGf32,
        TextureFormat::Rf32,
        TextureFormat::RGBAi32,
        TextureFormat::RGi32,
        TextureFormat::Ri32,
    ];

    /// Converts a host-side format code.
    pub const fn from_raw(raw: i32) -> Option<TextureFormat> {
        match raw {
            0 => Some(TextureFormat::RGBAu8),
            1 => Some(TextureFormat::RGBAf16),
            2 => Some(TextureFormat::RGf16),
            3 => Some(TextureFormat::Rf16),
            4 => Some(TextureFormat::RGBAf32),
            5 => Some(TextureFormat::RGf32),
            6 => Some(TextureFormat::Rf32),
            7 => Some(TextureFormat::RGBAi32),
            8 => Some(TextureFormat::RGi32),
            9 => Some(TextureFormat::Ri32),
            _ => None,
        }
    }

    pub const fn channels(self) -> usize {
        match self {
            TextureFormat::RGBAu8
            | TextureFormat::RGBAf16
            | TextureFormat::RGBAf32
            | TextureFormat::RGBAi32 => 4,
            TextureFormat::RGf16 | TextureFormat::RGf32 | TextureFormat::RGi32 => 2,
            TextureFormat::Rf16 | TextureFormat::Rf32 | TextureFormat::Ri32 => 1,
        }
    }

    /// Bytes per channel.
    pub const fn channel_size(self) -> usize {
        match self {
            TextureFormat::RGBAu8 => 1,
            TextureFormat::RGBAf16 | TextureFormat::RGf16 | TextureFormat::Rf16 => 2,
            TextureFormat::RGBAf32
            | TextureFormat::RGf32
            | TextureFormat::Rf32
            | TextureFormat::RGBAi32
            | TextureFormat::RGi32
            | TextureFormat::Ri32 => 4,
        }
    }

    pub const fn texel_size(self) -> usize {
        self.channels() * self.channel_size()
    }

    /// Tightly packed row size for `width` texels.
    pub const fn row_pitch(self, width: u32) -> usize {
        width as usize * self.texel_size()
    }
}

/// What a buffer is bound as on the GPU.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferKind {
    Index = 0,
    Vertex = 1,
    Constant = 2,
    Compute = 3,
}

impl BufferKind {
    pub const COUNT: usize = 4;
    pub const ALL: [BufferKind; BufferKind::COUNT] = [
        BufferKind::Index,
        BufferKind::Vertex,
        BufferKind::Constant,
        BufferKind::Compute,
    ];

    pub const fn from_raw(raw: i32) -> Option<BufferKind> {
        match raw {
            0 => Some(BufferKind::Index),
            1 => Some(BufferKind::Vertex),
            2 => Some(BufferKind::Constant),
            3 => Some(BufferKind::Compute),
            _ => None,
        }
    }

    pub(crate) const fn slot(self) -> usize {
        self as usize
    }
}

bitflags::bitflags! {
    /// CPU access requested at creation time.
    ///
    /// Without either flag the resource is GPU-only.  `CPU_WRITE` alone selects a
    /// write-optimized usage class; `CPU_READ` selects a staging-class resource,
    /// which can be mapped directly for reading.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ResourceFlags: u32 {
        const CPU_READ = 0x1;
        const CPU_WRITE = 0x2;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn texel_sizes() {
        let sizes: Vec<usize> = TextureFormat::ALL.iter().map(|f| f.texel_size()).collect();
        assert_eq!(sizes, vec![4, 8, 4, 2, 16, 8, 4, 16, 8, 4]);
    }

    #[test]
    fn raw_codes() {
        for format in TextureFormat::ALL {
            assert_eq!(TextureFormat::from_raw(format as i32), Some(format));
        }
        assert_eq!(TextureFormat::from_raw(10), None);
        assert_eq!(TextureFormat::from_raw(-1), None);
        for kind in BufferKind::ALL {
            assert_eq!(BufferKind::from_raw(kind as i32), Some(kind));
        }
        assert_eq!(BufferKind::from_raw(4), None);
    }

    #[test]
    fn flags_combine() {
        let both = ResourceFlags::CPU_READ | ResourceFlags::CPU_WRITE;
        assert!(both.contains(ResourceFlags::CPU_READ));
        assert!(ResourceFlags::default().is_empty());
        assert_eq!(ResourceFlags::from_bits(0x4), None);
    }
}
