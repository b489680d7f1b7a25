// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
Pointer-based entry points for hosts calling across an ABI.

These mirror [`GraphicsInterface`] with untyped buffers, integer codes and
[`ResultCode`] returns.  Handles cross the boundary as boxed pointers: a
`create_*` call writes a pointer that stays valid until it is passed to the
matching `release_*` call.

Checks happen in a fixed order: a zero transfer size returns
[`ResultCode::Ok`] before anything else is looked at, then null pointers,
negative dimensions and unknown codes return [`ResultCode::InvalidParameter`]
without touching any resource.

# Safety
Every function here is `unsafe`.  Non-null data pointers must be valid for the
stated number of bytes, and handle pointers must come from the corresponding
`create_*` call on the same interface and not have been released.
*/

use crate::descriptor::TextureDesc;
use crate::error::{Error, Result, ResultCode};
use crate::formats::{BufferKind, ResourceFlags, TextureFormat};
use crate::interface::{Buffer, DeviceType, GraphicsInterface, Texture2D};
use std::ffi::c_void;
use std::mem::MaybeUninit;

fn dimensions(width: i32, height: i32) -> Result<(u32, u32)> {
    match (u32::try_from(width), u32::try_from(height)) {
        (Ok(w), Ok(h)) => Ok((w, h)),
        _ => Err(Error::InvalidParameter),
    }
}

fn texture_format(format: i32) -> Result<TextureFormat> {
    TextureFormat::from_raw(format).ok_or(Error::InvalidParameter)
}

fn buffer_kind(kind: i32) -> Result<BufferKind> {
    BufferKind::from_raw(kind).ok_or(Error::InvalidParameter)
}

fn resource_flags(flags: u32) -> Result<ResourceFlags> {
    ResourceFlags::from_bits(flags).ok_or(Error::InvalidParameter)
}

pub fn device_type(gi: &dyn GraphicsInterface) -> DeviceType {
    gi.device_type()
}

pub fn device_ptr(gi: &dyn GraphicsInterface) -> *mut c_void {
    gi.device_ptr()
}

pub fn sync(gi: &mut dyn GraphicsInterface) {
    gi.sync()
}

/// `data`, if non-null, must cover the whole tightly packed texture.
pub unsafe fn create_texture_2d(
    gi: &mut dyn GraphicsInterface,
    dst: *mut *mut Texture2D,
    width: i32,
    height: i32,
    format: i32,
    data: *const c_void,
    flags: u32,
) -> ResultCode {
    let result = (|| -> Result<()> {
        if dst.is_null() {
            return Err(Error::InvalidParameter);
        }
        let (width, height) = dimensions(width, height)?;
        let format = texture_format(format)?;
        let flags = resource_flags(flags)?;
        let desc = TextureDesc::new(width, height, format)?;
        // SAFETY: caller guarantees `data` covers the texture
        let data = (!data.is_null())
            .then(|| unsafe { std::slice::from_raw_parts(data.cast::<u8>(), desc.byte_len()) });
        let texture = gi.create_texture_2d(width, height, format, data, flags)?;
        // SAFETY: checked non-null above
        unsafe { dst.write(Box::into_raw(Box::new(texture))) };
        Ok(())
    })();
    result.into()
}

/**
Null is ignored.  A texture from another backend instance is left alive and the
pointer stays valid, so it can still be released against its own backend.
*/
pub unsafe fn release_texture_2d(gi: &mut dyn GraphicsInterface, texture: *mut Texture2D) {
    if texture.is_null() {
        return;
    }
    // SAFETY: pointer came from create_texture_2d
    let value = unsafe { texture.read() };
    match gi.release_texture_2d(value) {
        // SAFETY: the allocation is still live; put the handle back
        Some(foreign) => unsafe { texture.write(foreign) },
        // SAFETY: the value was moved out above, so only the allocation is freed
        None => drop(unsafe { Box::from_raw(texture.cast::<MaybeUninit<Texture2D>>()) }),
    }
}

pub unsafe fn read_texture_2d(
    gi: &mut dyn GraphicsInterface,
    dst: *mut c_void,
    read_size: usize,
    texture: *const Texture2D,
    width: i32,
    height: i32,
    format: i32,
) -> ResultCode {
    if read_size == 0 {
        return ResultCode::Ok;
    }
    let result = (|| -> Result<()> {
        if dst.is_null() || texture.is_null() {
            return Err(Error::InvalidParameter);
        }
        let (width, height) = dimensions(width, height)?;
        let format = texture_format(format)?;
        // SAFETY: upheld by caller
        let (dst, texture) = unsafe {
            (
                std::slice::from_raw_parts_mut(dst.cast::<u8>(), read_size),
                &*texture,
            )
        };
        gi.read_texture_2d(dst, read_size, texture, width, height, format)
    })();
    result.into()
}

pub unsafe fn write_texture_2d(
    gi: &mut dyn GraphicsInterface,
    texture: *const Texture2D,
    width: i32,
    height: i32,
    format: i32,
    src: *const c_void,
    write_size: usize,
) -> ResultCode {
    if write_size == 0 {
        return ResultCode::Ok;
    }
    let result = (|| -> Result<()> {
        if src.is_null() || texture.is_null() {
            return Err(Error::InvalidParameter);
        }
        let (width, height) = dimensions(width, height)?;
        let format = texture_format(format)?;
        // SAFETY: upheld by caller
        let (src, texture) = unsafe {
            (
                std::slice::from_raw_parts(src.cast::<u8>(), write_size),
                &*texture,
            )
        };
        gi.write_texture_2d(texture, width, height, format, src, write_size)
    })();
    result.into()
}

/// `data`, if non-null, must cover `size` bytes.
pub unsafe fn create_buffer(
    gi: &mut dyn GraphicsInterface,
    dst: *mut *mut Buffer,
    size: usize,
    kind: i32,
    data: *const c_void,
    flags: u32,
) -> ResultCode {
    let result = (|| -> Result<()> {
        if dst.is_null() {
            return Err(Error::InvalidParameter);
        }
        let kind = buffer_kind(kind)?;
        let flags = resource_flags(flags)?;
        // SAFETY: caller guarantees `data` covers `size` bytes
        let data = (!data.is_null())
            .then(|| unsafe { std::slice::from_raw_parts(data.cast::<u8>(), size) });
        let buffer = gi.create_buffer(size, kind, data, flags)?;
        // SAFETY: checked non-null above
        unsafe { dst.write(Box::into_raw(Box::new(buffer))) };
        Ok(())
    })();
    result.into()
}

/// Null is ignored.  As with [`release_texture_2d`], a foreign buffer stays alive.
pub unsafe fn release_buffer(gi: &mut dyn GraphicsInterface, buffer: *mut Buffer) {
    if buffer.is_null() {
        return;
    }
    // SAFETY: pointer came from create_buffer
    let value = unsafe { buffer.read() };
    match gi.release_buffer(value) {
        // SAFETY: the allocation is still live; put the handle back
        Some(foreign) => unsafe { buffer.write(foreign) },
        // SAFETY: the value was moved out above, so only the allocation is freed
        None => drop(unsafe { Box::from_raw(buffer.cast::<MaybeUninit<Buffer>>()) }),
    }
}

pub unsafe fn read_buffer(
    gi: &mut dyn GraphicsInterface,
    dst: *mut c_void,
    buffer: *const Buffer,
    read_size: usize,
    kind: i32,
) -> ResultCode {
    if read_size == 0 {
        return ResultCode::Ok;
    }
    let result = (|| -> Result<()> {
        if dst.is_null() || buffer.is_null() {
            return Err(Error::InvalidParameter);
        }
        let kind = buffer_kind(kind)?;
        // SAFETY: upheld by caller
        let (dst, buffer) = unsafe {
            (
                std::slice::from_raw_parts_mut(dst.cast::<u8>(), read_size),
                &*buffer,
            )
        };
        gi.read_buffer(dst, buffer, read_size, kind)
    })();
    result.into()
}

pub unsafe fn write_buffer(
    gi: &mut dyn GraphicsInterface,
    buffer: *const Buffer,
    src: *const c_void,
    write_size: usize,
    kind: i32,
) -> ResultCode {
    if write_size == 0 {
        return ResultCode::Ok;
    }
    let result = (|| -> Result<()> {
        if src.is_null() || buffer.is_null() {
            return Err(Error::InvalidParameter);
        }
        let kind = buffer_kind(kind)?;
        // SAFETY: upheld by caller
        let (src, buffer) = unsafe {
            (
                std::slice::from_raw_parts(src.cast::<u8>(), write_size),
                &*buffer,
            )
        };
        gi.write_buffer(buffer, src, write_size, kind)
    })();
    result.into()
}
