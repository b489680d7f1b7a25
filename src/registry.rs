// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
Device registry: which backend is active, driven by host lifecycle events.

The host reports its graphics device through a single callback carrying an
untyped device pointer, a renderer code and an event code.  The registry turns
that into at most one live [`GraphicsInterface`].

```
use graphics_interface::{DeviceRegistry, DeviceType, NativeDevice, soft};

let device = soft::Device::new();
let mut registry = DeviceRegistry::new();
registry.initialize(Some(NativeDevice::Software(device)));
assert_eq!(registry.interface().map(|gi| gi.device_type()), Some(DeviceType::Software));
registry.shutdown();
assert!(!registry.is_active());
```
*/

use crate::imp::NativeDevice;
use crate::imp::soft::SoftInterface;
use crate::interface::{Config, GraphicsInterface, ResetPhase};
use std::ffi::c_void;

/// Host lifecycle events, with the host's numeric codes.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceEvent {
    Initialize = 0,
    Shutdown = 1,
    BeforeReset = 2,
    AfterReset = 3,
}

impl DeviceEvent {
    pub const fn from_raw(raw: i32) -> Option<DeviceEvent> {
        match raw {
            0 => Some(DeviceEvent::Initialize),
            1 => Some(DeviceEvent::Shutdown),
            2 => Some(DeviceEvent::BeforeReset),
            3 => Some(DeviceEvent::AfterReset),
            _ => None,
        }
    }
}

/**
Renderer codes reported by the host.

Codes below 100 are the host engine's own; only `Null` is handled here (as an
inert backend).  `Software` and `Wgpu` name the backends this crate implements.
*/
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Renderer {
    OpenGL = 0,
    D3D9 = 1,
    D3D11 = 2,
    Gcm = 3,
    /// No GPU, as in batch mode.
    Null = 4,
    Hollywood = 5,
    Xenon = 6,
    OpenGLES = 7,
    OpenGLES20Mobile = 8,
    Molehill = 9,
    OpenGLES20Desktop = 10,
    Software = 100,
    Wgpu = 101,
}

impl Renderer {
    pub const fn from_raw(raw: i32) -> Option<Renderer> {
        match raw {
            0 => Some(Renderer::OpenGL),
            1 => Some(Renderer::D3D9),
            2 => Some(Renderer::D3D11),
            3 => Some(Renderer::Gcm),
            4 => Some(Renderer::Null),
            5 => Some(Renderer::Hollywood),
            6 => Some(Renderer::Xenon),
            7 => Some(Renderer::OpenGLES),
            8 => Some(Renderer::OpenGLES20Mobile),
            9 => Some(Renderer::Molehill),
            10 => Some(Renderer::OpenGLES20Desktop),
            100 => Some(Renderer::Software),
            101 => Some(Renderer::Wgpu),
            _ => None,
        }
    }

    /// Whether this build has a backend for the renderer.
    pub const fn is_supported(self) -> bool {
        match self {
            Renderer::Null | Renderer::Software => true,
            Renderer::Wgpu => cfg!(feature = "backend_wgpu"),
            _ => false,
        }
    }
}

/// Owns the active backend, if any.
#[derive(Default)]
pub struct DeviceRegistry {
    config: Config,
    active: Option<Box<dyn GraphicsInterface>>,
}

impl std::fmt::Debug for DeviceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceRegistry")
            .field("config", &self.config)
            .field("active", &self.active.as_ref().map(|gi| gi.device_type()))
            .finish()
    }
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// `config` applies to every backend this registry creates.
    pub fn with_config(config: Config) -> Self {
        DeviceRegistry {
            config,
            active: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn interface(&self) -> Option<&dyn GraphicsInterface> {
        match &self.active {
            Some(gi) => Some(gi.as_ref()),
            None => None,
        }
    }

    pub fn interface_mut(&mut self) -> Option<&mut dyn GraphicsInterface> {
        match &mut self.active {
            Some(gi) => Some(gi.as_mut()),
            None => None,
        }
    }

    /**
    Activates a backend for `device`, releasing any previous one first.

    `None` installs an inert backend: it reports itself invalid and rejects
    every operation.
    */
    pub fn initialize(&mut self, device: Option<NativeDevice>) {
        self.shutdown();
        let gi: Box<dyn GraphicsInterface> = match device {
            Some(device) => device.into_interface(self.config.clone()),
            None => Box::new(SoftInterface::with_config(None, self.config.clone())),
        };
        logwise::info_sync!(
            "graphics device initialized: {kind}",
            kind = logwise::privacy::LogIt(&gi.device_type())
        );
        self.active = Some(gi);
    }

    /// Releases the active backend.
    pub fn shutdown(&mut self) {
        if let Some(gi) = self.active.take() {
            logwise::info_sync!(
                "graphics device shut down: {kind}",
                kind = logwise::privacy::LogIt(&gi.device_type())
            );
            gi.release();
        }
    }

    /// Forwards a host reset to the active backend.
    pub fn reset(&mut self, phase: ResetPhase) {
        match self.active.as_mut() {
            Some(gi) => gi.on_device_reset(phase),
            None => {
                logwise::warn_sync!(
                    "device reset with no active backend: {phase}",
                    phase = logwise::privacy::LogIt(&phase)
                );
            }
        }
    }

    /**
    Host callback entry point.

    Unknown event or renderer codes are logged and ignored.  An `Initialize`
    for a renderer without a backend releases the current backend and leaves
    the registry inactive.

    # Safety
    For `Initialize` with a supported renderer, `device` must be null or satisfy
    the contract of [`NativeDevice::from_raw`].  Other events ignore `device`.
    */
    pub unsafe fn set_graphics_device(&mut self, device: *mut c_void, renderer: i32, event: i32) {
        let Some(event) = DeviceEvent::from_raw(event) else {
            logwise::warn_sync!("ignoring unknown device event {event}", event = event);
            return;
        };
        match event {
            DeviceEvent::Initialize => {
                let Some(renderer) = Renderer::from_raw(renderer) else {
                    logwise::warn_sync!("ignoring unknown renderer {renderer}", renderer = renderer);
                    return;
                };
                if !renderer.is_supported() {
                    logwise::warn_sync!(
                        "renderer {renderer} is not supported",
                        renderer = logwise::privacy::LogIt(&renderer)
                    );
                    self.shutdown();
                    return;
                }
                // SAFETY: upheld by caller
                let native = match renderer {
                    Renderer::Null => None,
                    _ => unsafe { NativeDevice::from_raw(device, renderer) },
                };
                if native.is_none() && renderer != Renderer::Null {
                    logwise::warn_sync!(
                        "null device for {renderer}, installing inert backend",
                        renderer = logwise::privacy::LogIt(&renderer)
                    );
                }
                self.initialize(native);
            }
            DeviceEvent::Shutdown => self.shutdown(),
            DeviceEvent::BeforeReset => self.reset(ResetPhase::BeforeReset),
            DeviceEvent::AfterReset => self.reset(ResetPhase::AfterReset),
        }
    }
}

impl Drop for DeviceRegistry {
    fn drop(&mut self) {
        self.shutdown();
    }
}
