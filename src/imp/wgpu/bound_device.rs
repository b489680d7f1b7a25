// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
use super::error::{RequestError, translate};
use crate::error::{Error, Result};
use wgpu::{ErrorFilter, MapMode, PollType, Trace};

/**
A wgpu device and its queue.

This is what a host hands over for [`crate::Renderer::Wgpu`].  Both halves are
reference counted by wgpu, so clones drive the same device.
*/
#[derive(Debug, Clone)]
pub struct WgpuDevice {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
}

impl WgpuDevice {
    pub fn new(device: wgpu::Device, queue: wgpu::Queue) -> Self {
        WgpuDevice { device, queue }
    }

    /// Opens the default adapter, enabling mappable primary buffers where supported.
    pub async fn request() -> std::result::Result<WgpuDevice, RequestError> {
        let instance = wgpu::Instance::default();
        let options = wgpu::RequestAdapterOptions {
            power_preference: Default::default(),
            force_fallback_adapter: false,
            compatible_surface: None,
        };
        let adapter = instance
            .request_adapter(&options)
            .await
            .map_err(|_| RequestError::NoSuchAdapter)?;
        let descriptor = wgpu::DeviceDescriptor {
            label: wgpu::Label::from("graphics_interface"),
            required_features: adapter.features() & wgpu::Features::MAPPABLE_PRIMARY_BUFFERS,
            required_limits: adapter.limits(),
            memory_hints: Default::default(),
            trace: Trace::Off,
        };
        let (device, queue) = adapter.request_device(&descriptor).await?;
        logwise::info_sync!(
            "opened wgpu device on {adapter}",
            adapter = logwise::privacy::LogIt(&adapter.get_info().name)
        );
        Ok(WgpuDevice { device, queue })
    }

    pub(super) fn mappable_primary_buffers(&self) -> bool {
        self.device
            .features()
            .contains(wgpu::Features::MAPPABLE_PRIMARY_BUFFERS)
    }

    /// Runs `f` inside out-of-memory and validation error scopes.
    pub(super) fn scoped<T>(&self, f: impl FnOnce(&wgpu::Device) -> T) -> Result<T> {
        self.device.push_error_scope(ErrorFilter::OutOfMemory);
        self.device.push_error_scope(ErrorFilter::Validation);
        let value = f(&self.device);
        let validation = test_executors::sleep_on(self.device.pop_error_scope());
        let out_of_memory = test_executors::sleep_on(self.device.pop_error_scope());
        match out_of_memory.or(validation) {
            None => Ok(value),
            Some(e) => {
                logwise::error_sync!("wgpu error: {e}", e = logwise::privacy::LogIt(&e));
                Err(translate(&e))
            }
        }
    }

    /// Submits pending queue writes so later submissions and maps observe them.
    pub(super) fn flush(&self) {
        self.queue.submit(std::iter::empty());
    }

    /// Maps `slice` and blocks until the mapping resolves.
    pub(super) fn map(&self, slice: wgpu::BufferSlice<'_>, mode: MapMode) -> Result<()> {
        let (s, r) = r#continue::continuation();
        slice.map_async(mode, move |result| {
            s.send(result);
        });
        if let Err(e) = self.device.poll(PollType::Wait) {
            logwise::error_sync!("map: device poll failed: {e}", e = logwise::privacy::LogIt(&e));
            return Err(Error::Unknown);
        }
        test_executors::sleep_on(r).map_err(|e| {
            logwise::warn_sync!("map_async failed: {e}", e = logwise::privacy::LogIt(&e));
            Error::Unknown
        })
    }
}
