/*! graphics_interface is the resource layer of a GPU particle-simulation plugin.

A host engine hands the plugin its graphics device; the simulation then needs
to create buffers and textures on that device and move bytes in and out of them.
This crate provides one contract for that, [`GraphicsInterface`], implemented
once per native API.

The hard part is that GPU resources are not uniformly reachable from the CPU.
Depending on how a resource was created it may or may not be mappable, and a
device-side copy may still be in flight when the CPU looks at the result.  The
layer hides this:

| Resource created with | Read                                         | Write                                   |
|-----------------------|----------------------------------------------|-----------------------------------------|
| `CPU_READ`            | map directly                                 | map directly (or queue, see backend)    |
| `CPU_WRITE`           | staging mirror, copy, `sync()`, map          | map; busy resources fall back to discard |
| neither               | staging mirror, copy, `sync()`, map          | bounded device-side update, no staging  |

Staging mirrors are cached ([`staging`]).  Texture mirrors are keyed by shape
and format and bulk-evicted when the cache fills up; buffer mirrors get one slot
per [`BufferKind`].  Copies between caller memory (always tightly packed) and
mapped memory (rows possibly padded) go through [`pitch::copy_region`].

# Backends

| Backend  | Module    | Native API                                      |
|----------|-----------|-------------------------------------------------|
| Software | [`soft`]  | emulated immediate-context device, always built |
| Wgpu     | `wgpu`    | [wgpu](https://wgpu.rs), feature `backend_wgpu` |

The software backend emulates the obligations of a classic immediate-context
API (usage classes, padded rows, queued copies, event queries), so everything
above can be exercised without a GPU.

# Host integration

[`DeviceRegistry`] follows the host's device lifecycle.  It receives the raw
device callback, instantiates the matching backend and forwards reset events.
[`raw`] exposes pointer-based entry points returning [`ResultCode`] for hosts
that call across an ABI.

```
use graphics_interface::{GraphicsInterface, ResourceFlags, TextureFormat, soft};

let mut gi = soft::SoftInterface::new(soft::Device::new());
let texels: Vec<u8> = (0..48).collect();
let texture = gi
    .create_texture_2d(3, 4, TextureFormat::RGBAu8, Some(&texels), ResourceFlags::empty())
    .unwrap();
let mut out = vec![0; texels.len()];
let out_len = out.len();
gi.read_texture_2d(&mut out, out_len, &texture, 3, 4, TextureFormat::RGBAu8).unwrap();
assert_eq!(out, texels);
gi.release_texture_2d(texture);
```
*/

pub mod descriptor;
pub mod error;
pub mod fence;
pub mod formats;
mod imp;
mod interface;
pub mod pitch;
pub mod raw;
mod registry;
pub mod staging;

pub use descriptor::{BufferDesc, StagingKey, TextureDesc};
pub use error::{Error, Result, ResultCode};
pub use formats::{BufferKind, ResourceFlags, TextureFormat, f16};
pub use imp::NativeDevice;
pub use imp::soft;
#[cfg(feature = "backend_wgpu")]
pub use imp::wgpu;
pub use interface::{Buffer, Config, DeviceType, GraphicsInterface, InstanceId, ResetPhase, Texture2D};
pub use registry::{DeviceEvent, DeviceRegistry, Renderer};
