// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Logical descriptors: the backend-agnostic shape of a resource.

use crate::error::{Error, Result};
use crate::formats::{BufferKind, TextureFormat};

/// Largest width or height accepted for a texture.  Staging keys pack each
/// dimension into 24 bits.
pub const MAX_TEXTURE_DIMENSION: u32 = (1 << 24) - 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureDesc {
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
}

impl TextureDesc {
    /// Validates the shape; zero or oversized dimensions are rejected.
    pub fn new(width: u32, height: u32, format: TextureFormat) -> Result<Self> {
        if width == 0
            || height == 0
            || width > MAX_TEXTURE_DIMENSION
            || height > MAX_TEXTURE_DIMENSION
        {
            return Err(Error::InvalidParameter);
        }
        Ok(TextureDesc {
            width,
            height,
            format,
        })
    }

    /// Tight row size in bytes.
    pub fn row_bytes(&self) -> usize {
        self.format.row_pitch(self.width)
    }

    /// Tightly packed size of the whole texture.
    pub fn byte_len(&self) -> usize {
        self.row_bytes() * self.height as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferDesc {
    pub size: usize,
    pub kind: BufferKind,
}

impl BufferDesc {
    pub fn new(size: usize, kind: BufferKind) -> Result<Self> {
        if size == 0 || size > u32::MAX as usize {
            return Err(Error::InvalidParameter);
        }
        Ok(BufferDesc { size, kind })
    }
}

/**
Key identifying a texture staging mirror.

Width, height and the backend's native format code each occupy their own bit
range, so distinct descriptors never share a key.
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StagingKey(u64);

impl StagingKey {
    pub fn texture(desc: &TextureDesc, native_format: u16) -> Self {
        debug_assert!(desc.width <= MAX_TEXTURE_DIMENSION);
        debug_assert!(desc.height <= MAX_TEXTURE_DIMENSION);
        StagingKey(desc.width as u64 | (desc.height as u64) << 24 | (native_format as u64) << 48)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}
