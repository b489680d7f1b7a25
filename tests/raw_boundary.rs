// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Pointer-based entry points.

use graphics_interface::{
    Buffer, BufferKind, GraphicsInterface, ResourceFlags, ResultCode, Texture2D, TextureFormat,
    raw, soft,
};
use std::ffi::c_void;
use std::ptr;

fn interface() -> (soft::Device, Box<dyn GraphicsInterface>) {
    let device = soft::Device::new();
    (device.clone(), Box::new(soft::SoftInterface::new(device)))
}

#[test]
fn texture_round_trip() {
    let (device, mut gi) = interface();
    let data: Vec<u8> = (0..5 * 2 * 8).map(|i| i as u8).collect();
    let mut texture: *mut Texture2D = ptr::null_mut();
    let code = unsafe {
        raw::create_texture_2d(
            gi.as_mut(),
            &mut texture,
            5,
            2,
            TextureFormat::RGf32 as i32,
            data.as_ptr().cast(),
            0,
        )
    };
    assert_eq!(code, ResultCode::Ok);
    assert!(!texture.is_null());

    let mut out = vec![0u8; data.len()];
    let code = unsafe {
        raw::read_texture_2d(
            gi.as_mut(),
            out.as_mut_ptr().cast(),
            out.len(),
            texture,
            5,
            2,
            TextureFormat::RGf32 as i32,
        )
    };
    assert_eq!(code, ResultCode::Ok);
    assert_eq!(out, data);

    let update = vec![0x33u8; data.len()];
    let code = unsafe {
        raw::write_texture_2d(
            gi.as_mut(),
            texture,
            5,
            2,
            TextureFormat::RGf32 as i32,
            update.as_ptr().cast(),
            update.len(),
        )
    };
    assert_eq!(code, ResultCode::Ok);
    unsafe {
        raw::read_texture_2d(
            gi.as_mut(),
            out.as_mut_ptr().cast(),
            out.len(),
            texture,
            5,
            2,
            TextureFormat::RGf32 as i32,
        )
    };
    assert_eq!(out, update);

    unsafe { raw::release_texture_2d(gi.as_mut(), texture) };
    drop(gi);
    assert_eq!(device.live_resources(), 0);
}

#[test]
fn buffer_round_trip() {
    let (device, mut gi) = interface();
    let data: Vec<u8> = (0..200).map(|i| (i * 3) as u8).collect();
    let mut buffer: *mut Buffer = ptr::null_mut();
    let flags = (ResourceFlags::CPU_READ | ResourceFlags::CPU_WRITE).bits();
    let code = unsafe {
        raw::create_buffer(
            gi.as_mut(),
            &mut buffer,
            data.len(),
            BufferKind::Compute as i32,
            ptr::null(),
            flags,
        )
    };
    assert_eq!(code, ResultCode::Ok);
    let code = unsafe {
        raw::write_buffer(
            gi.as_mut(),
            buffer,
            data.as_ptr().cast(),
            data.len(),
            BufferKind::Compute as i32,
        )
    };
    assert_eq!(code, ResultCode::Ok);
    let mut out = vec![0u8; data.len()];
    let code = unsafe {
        raw::read_buffer(
            gi.as_mut(),
            out.as_mut_ptr().cast(),
            buffer,
            out.len(),
            BufferKind::Compute as i32,
        )
    };
    assert_eq!(code, ResultCode::Ok);
    assert_eq!(out, data);
    unsafe { raw::release_buffer(gi.as_mut(), buffer) };
    assert_eq!(device.live_resources(), 0);
}

#[test]
fn null_pointers_are_invalid() {
    let (device, mut gi) = interface();
    let mut buffer: *mut Buffer = ptr::null_mut();
    unsafe {
        raw::create_buffer(gi.as_mut(), &mut buffer, 16, BufferKind::Vertex as i32, ptr::null(), 0)
    };
    let before = device.stats();
    let mut out = [0u8; 16];

    let code = unsafe {
        raw::read_buffer(gi.as_mut(), ptr::null_mut(), buffer, 16, BufferKind::Vertex as i32)
    };
    assert_eq!(code, ResultCode::InvalidParameter);
    let code = unsafe {
        raw::read_buffer(
            gi.as_mut(),
            out.as_mut_ptr().cast(),
            ptr::null(),
            16,
            BufferKind::Vertex as i32,
        )
    };
    assert_eq!(code, ResultCode::InvalidParameter);
    let code = unsafe {
        raw::write_buffer(gi.as_mut(), buffer, ptr::null(), 16, BufferKind::Vertex as i32)
    };
    assert_eq!(code, ResultCode::InvalidParameter);
    let code = unsafe {
        raw::write_texture_2d(
            gi.as_mut(),
            ptr::null(),
            1,
            1,
            TextureFormat::RGBAu8 as i32,
            out.as_ptr().cast(),
            4,
        )
    };
    assert_eq!(code, ResultCode::InvalidParameter);
    let code = unsafe {
        raw::create_texture_2d(
            gi.as_mut(),
            ptr::null_mut(),
            1,
            1,
            TextureFormat::RGBAu8 as i32,
            ptr::null(),
            0,
        )
    };
    assert_eq!(code, ResultCode::InvalidParameter);
    assert_eq!(device.stats(), before);

    //zero size wins over null pointers
    let code = unsafe {
        raw::read_buffer(gi.as_mut(), ptr::null_mut(), ptr::null(), 0, BufferKind::Vertex as i32)
    };
    assert_eq!(code, ResultCode::Ok);

    unsafe { raw::release_buffer(gi.as_mut(), buffer) };
    unsafe { raw::release_buffer(gi.as_mut(), ptr::null_mut()) };
    unsafe { raw::release_texture_2d(gi.as_mut(), ptr::null_mut()) };
}

#[test]
fn bad_codes_are_invalid() {
    let (_device, mut gi) = interface();
    let mut texture: *mut Texture2D = ptr::null_mut();
    let bad_format = unsafe {
        raw::create_texture_2d(gi.as_mut(), &mut texture, 4, 4, 42, ptr::null(), 0)
    };
    assert_eq!(bad_format, ResultCode::InvalidParameter);
    let negative = unsafe {
        raw::create_texture_2d(
            gi.as_mut(),
            &mut texture,
            -4,
            4,
            TextureFormat::Rf32 as i32,
            ptr::null(),
            0,
        )
    };
    assert_eq!(negative, ResultCode::InvalidParameter);
    let zero = unsafe {
        raw::create_texture_2d(
            gi.as_mut(),
            &mut texture,
            0,
            4,
            TextureFormat::Rf32 as i32,
            ptr::null(),
            0,
        )
    };
    assert_eq!(zero, ResultCode::InvalidParameter);
    let bad_flags = unsafe {
        raw::create_texture_2d(
            gi.as_mut(),
            &mut texture,
            4,
            4,
            TextureFormat::Rf32 as i32,
            ptr::null(),
            0x80,
        )
    };
    assert_eq!(bad_flags, ResultCode::InvalidParameter);
    assert!(texture.is_null());

    let mut buffer: *mut Buffer = ptr::null_mut();
    let bad_kind = unsafe {
        raw::create_buffer(gi.as_mut(), &mut buffer, 16, 7, ptr::null(), 0)
    };
    assert_eq!(bad_kind, ResultCode::InvalidParameter);
    let empty = unsafe {
        raw::create_buffer(gi.as_mut(), &mut buffer, 0, BufferKind::Index as i32, ptr::null(), 0)
    };
    assert_eq!(empty, ResultCode::InvalidParameter);
    assert!(buffer.is_null());
}

#[test]
fn out_of_memory_code() {
    let (device, mut gi) = interface();
    device.set_memory_budget(Some(0));
    let mut buffer: *mut Buffer = ptr::null_mut();
    let code = unsafe {
        raw::create_buffer(gi.as_mut(), &mut buffer, 64, BufferKind::Constant as i32, ptr::null(), 0)
    };
    assert_eq!(code, ResultCode::OutOfMemory);
    assert!(buffer.is_null());
}

#[test]
fn device_introspection() {
    let (device, mut gi) = interface();
    assert_eq!(raw::device_ptr(gi.as_ref()), device.as_ptr() as *mut c_void);
    assert_eq!(raw::device_type(gi.as_ref()) as i32, 6);
    raw::sync(gi.as_mut());
}

#[test]
fn foreign_release_keeps_the_handle() {
    let (device, mut owner) = interface();
    let (_other_device, mut other) = interface();
    let mut texture: *mut Texture2D = ptr::null_mut();
    let code = unsafe {
        raw::create_texture_2d(
            owner.as_mut(),
            &mut texture,
            2,
            2,
            TextureFormat::Ri32 as i32,
            ptr::null(),
            0,
        )
    };
    assert_eq!(code, ResultCode::Ok);
    unsafe { raw::release_texture_2d(other.as_mut(), texture) };
    assert_eq!(device.live_resources(), 1);

    //the pointer is still usable against its own backend
    let mut out = [0xffu8; 16];
    let code = unsafe {
        raw::read_texture_2d(
            owner.as_mut(),
            out.as_mut_ptr().cast(),
            out.len(),
            texture,
            2,
            2,
            TextureFormat::Ri32 as i32,
        )
    };
    assert_eq!(code, ResultCode::Ok);
    assert_eq!(out, [0; 16]);
    unsafe { raw::release_texture_2d(owner.as_mut(), texture) };
    assert_eq!(device.live_resources(), 1);
    drop(owner);
    assert_eq!(device.live_resources(), 0);
}
