// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Host lifecycle events driving the device registry.

use graphics_interface::{
    BufferKind, Config, DeviceEvent, DeviceRegistry, DeviceType, NativeDevice, Renderer,
    ResourceFlags, TextureFormat, soft,
};
use std::ffi::c_void;

fn host_ptr(device: &soft::Device) -> *mut c_void {
    device as *const soft::Device as *mut c_void
}

fn notify(registry: &mut DeviceRegistry, device: *mut c_void, renderer: Renderer, event: DeviceEvent) {
    unsafe { registry.set_graphics_device(device, renderer as i32, event as i32) };
}

#[test]
fn initialize_use_shutdown() {
    let device = soft::Device::new();
    let mut registry = DeviceRegistry::new();
    assert!(!registry.is_active());
    notify(&mut registry, host_ptr(&device), Renderer::Software, DeviceEvent::Initialize);

    let gi = registry.interface_mut().unwrap();
    assert_eq!(gi.device_type(), DeviceType::Software);
    let buffer = gi
        .create_buffer(32, BufferKind::Constant, Some(&[9; 32]), ResourceFlags::empty())
        .unwrap();
    let mut out = [0u8; 32];
    gi.read_buffer(&mut out, &buffer, 32, BufferKind::Constant).unwrap();
    assert_eq!(out, [9; 32]);
    gi.release_buffer(buffer);
    //the staging mirror is still cached
    assert_eq!(device.live_resources(), 1);

    notify(&mut registry, std::ptr::null_mut(), Renderer::Software, DeviceEvent::Shutdown);
    assert!(!registry.is_active());
    assert_eq!(device.live_resources(), 0);
}

#[test]
fn reset_events_reach_the_backend() {
    let device = soft::Device::new();
    let mut registry = DeviceRegistry::new();
    registry.initialize(Some(NativeDevice::Software(device.clone())));
    let gi = registry.interface_mut().unwrap();
    let texture = gi
        .create_texture_2d(4, 4, TextureFormat::RGBAf16, None, ResourceFlags::empty())
        .unwrap();
    let mut out = vec![0; 4 * 4 * 8];
    let out_len = out.len();
    gi.read_texture_2d(&mut out, out_len, &texture, 4, 4, TextureFormat::RGBAf16)
        .unwrap();
    assert_eq!(device.live_resources(), 2);

    notify(&mut registry, std::ptr::null_mut(), Renderer::Software, DeviceEvent::BeforeReset);
    assert_eq!(device.live_resources(), 1);
    notify(&mut registry, std::ptr::null_mut(), Renderer::Software, DeviceEvent::AfterReset);
    assert!(registry.is_active());

    let gi = registry.interface_mut().unwrap();
    gi.release_texture_2d(texture);
    assert_eq!(device.live_resources(), 0);
}

#[test]
fn reinitialize_replaces_backend() {
    let first = soft::Device::new();
    let second = soft::Device::new();
    let mut registry = DeviceRegistry::with_config(Config::default());
    notify(&mut registry, host_ptr(&first), Renderer::Software, DeviceEvent::Initialize);
    let gi = registry.interface_mut().unwrap();
    let buffer = gi
        .create_buffer(8, BufferKind::Index, None, ResourceFlags::empty())
        .unwrap();
    let mut out = [0u8; 8];
    gi.read_buffer(&mut out, &buffer, 8, BufferKind::Index).unwrap();
    gi.release_buffer(buffer);

    notify(&mut registry, host_ptr(&second), Renderer::Software, DeviceEvent::Initialize);
    assert_eq!(first.live_resources(), 0);
    assert_eq!(registry.interface().unwrap().device_ptr(), second.as_ptr());
}

#[test]
fn unsupported_and_unknown_inputs() {
    let device = soft::Device::new();
    let mut registry = DeviceRegistry::new();
    notify(&mut registry, host_ptr(&device), Renderer::D3D11, DeviceEvent::Initialize);
    assert!(!registry.is_active());

    unsafe { registry.set_graphics_device(host_ptr(&device), 55, 0) };
    assert!(!registry.is_active());
    unsafe { registry.set_graphics_device(host_ptr(&device), 100, 9) };
    assert!(!registry.is_active());

    //a null pointer for a real renderer yields an inert backend
    notify(&mut registry, std::ptr::null_mut(), Renderer::Software, DeviceEvent::Initialize);
    let gi = registry.interface_mut().unwrap();
    assert!(!gi.is_valid());
    assert!(gi
        .create_texture_2d(1, 1, TextureFormat::RGBAu8, None, ResourceFlags::empty())
        .is_err());
}

#[test]
fn dropping_the_registry_releases_everything() {
    let device = soft::Device::new();
    {
        let mut registry = DeviceRegistry::new();
        registry.initialize(Some(NativeDevice::Software(device.clone())));
        let gi = registry.interface_mut().unwrap();
        let buffer = gi
            .create_buffer(16, BufferKind::Vertex, None, ResourceFlags::empty())
            .unwrap();
        let mut out = [0u8; 16];
        gi.read_buffer(&mut out, &buffer, 16, BufferKind::Vertex).unwrap();
        gi.release_buffer(buffer);
        assert_eq!(device.live_resources(), 1);
    }
    assert_eq!(device.live_resources(), 0);
}
