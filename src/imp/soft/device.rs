// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
An emulated immediate-context device.

This is the "native API" behind the software backend.  It behaves like a
classic immediate-context 3D API closely enough for the resource layer to have
the same obligations it has against real hardware:

- Resources have a usage class (`Default`, `Dynamic`, `Staging`) and CPU access
  flags; only resources with the matching access flag can be mapped.
- Texture rows are padded to [`ROW_PITCH_ALIGNMENT`] bytes.
- Device-side copies and default-usage updates are queued, and only execute when
  the GPU makes progress, which happens while an event query is polled.  Mapping
  never waits for queued work, so reading a copy destination before its query
  completes observes stale data.
- Dynamic resources only accept discard maps.  A plain write map of a resource
  still referenced by queued work fails with [`NativeError::WasStillDrawing`].
- An optional allocation budget makes creation fail with
  [`NativeError::OutOfMemory`].

The device is a cheaply cloneable handle; clones share one device.  Like a real
driver it serializes access to its own state internally.
*/

use crate::pitch::align_up;
use std::collections::{HashMap, VecDeque};
use std::ffi::c_void;
use std::ops::{Deref, DerefMut};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Row pitch alignment of every texture allocation.
pub const ROW_PITCH_ALIGNMENT: usize = 256;

/// Queued commands executed per query poll.
pub const DEFAULT_COMMANDS_PER_POLL: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QueryId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Usage {
    /// GPU read/write, no CPU access.
    Default,
    /// CPU write (discard only), GPU read.
    Dynamic,
    /// CPU-accessible copy target/source; not bindable.
    Staging,
}

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CpuAccess: u32 {
        const READ = 0x1;
        const WRITE = 0x2;
    }
}

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct BindFlags: u32 {
        const VERTEX_BUFFER = 0x1;
        const INDEX_BUFFER = 0x2;
        const CONSTANT_BUFFER = 0x4;
        const SHADER_RESOURCE = 0x8;
        const UNORDERED_ACCESS = 0x80;
    }
}

/// Native texel formats.  Discriminants are the native format codes.
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeFormat {
    R32G32B32A32Float = 2,
    R32G32B32A32Sint = 4,
    R16G16B16A16Float = 10,
    R32G32Float = 16,
    R32G32Sint = 18,
    R8G8B8A8Typeless = 27,
    R16G16Float = 34,
    R32Float = 41,
    R32Sint = 43,
    R16Float = 54,
}

impl NativeFormat {
    pub const fn code(self) -> u16 {
        self as u16
    }

    pub const fn bytes_per_texel(self) -> usize {
        match self {
            NativeFormat::R32G32B32A32Float | NativeFormat::R32G32B32A32Sint => 16,
            NativeFormat::R16G16B16A16Float
            | NativeFormat::R32G32Float
            | NativeFormat::R32G32Sint => 8,
            NativeFormat::R8G8B8A8Typeless
            | NativeFormat::R16G16Float
            | NativeFormat::R32Float
            | NativeFormat::R32Sint => 4,
            NativeFormat::R16Float => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureDesc2D {
    pub width: u32,
    pub height: u32,
    pub format: NativeFormat,
    pub usage: Usage,
    pub bind: BindFlags,
    pub cpu_access: CpuAccess,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferDesc {
    pub byte_width: usize,
    pub usage: Usage,
    pub bind: BindFlags,
    pub cpu_access: CpuAccess,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapMode {
    Read,
    Write,
    WriteDiscard,
}

/// A box in texels (bytes for buffers).  `right`/`bottom` are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum NativeError {
    #[error("out of memory")]
    OutOfMemory,
    #[error("invalid argument")]
    InvalidArg,
    #[error("resource is still referenced by queued GPU work")]
    WasStillDrawing,
}

/// Counters for everything the device has been asked to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Stats {
    pub default_created: usize,
    pub dynamic_created: usize,
    pub staging_created: usize,
    pub released: usize,
    pub copies: usize,
    pub partial_updates: usize,
    pub maps_read: usize,
    pub maps_write: usize,
    pub maps_discard: usize,
    pub failed_maps: usize,
    pub query_ends: usize,
    pub query_polls: usize,
}

#[derive(Debug)]
enum Storage {
    Texture {
        desc: TextureDesc2D,
        row_pitch: usize,
        data: Vec<u8>,
    },
    Buffer {
        desc: BufferDesc,
        data: Vec<u8>,
    },
}

impl Storage {
    fn data(&self) -> &[u8] {
        match self {
            Storage::Texture { data, .. } | Storage::Buffer { data, .. } => data,
        }
    }
    fn data_mut(&mut self) -> &mut Vec<u8> {
        match self {
            Storage::Texture { data, .. } | Storage::Buffer { data, .. } => data,
        }
    }
    fn usage(&self) -> Usage {
        match self {
            Storage::Texture { desc, .. } => desc.usage,
            Storage::Buffer { desc, .. } => desc.usage,
        }
    }
    fn cpu_access(&self) -> CpuAccess {
        match self {
            Storage::Texture { desc, .. } => desc.cpu_access,
            Storage::Buffer { desc, .. } => desc.cpu_access,
        }
    }
    fn row_pitch(&self) -> usize {
        match self {
            Storage::Texture { row_pitch, .. } => *row_pitch,
            Storage::Buffer { data, .. } => data.len(),
        }
    }
    fn texel_size(&self) -> usize {
        match self {
            Storage::Texture { desc, .. } => desc.format.bytes_per_texel(),
            Storage::Buffer { .. } => 1,
        }
    }
}

#[derive(Debug)]
struct Resource {
    storage: Storage,
    mapped: bool,
}

#[derive(Debug)]
enum CopySource {
    Live(ResourceId),
    /// Contents captured when a discard map detached the source.
    Detached(Vec<u8>),
}

#[derive(Debug)]
enum Command {
    Copy {
        dst: ResourceId,
        src: CopySource,
        /// `None` copies the whole resource.
        bytes: Option<usize>,
    },
    Update {
        dst: ResourceId,
        region: Region,
        data: Vec<u8>,
        src_pitch: usize,
    },
}

impl Command {
    fn references(&self, id: ResourceId) -> bool {
        match self {
            Command::Copy { dst, src, .. } => {
                *dst == id || matches!(src, CopySource::Live(s) if *s == id)
            }
            Command::Update { dst, .. } => *dst == id,
        }
    }
}

#[derive(Debug)]
struct DeviceState {
    resources: HashMap<ResourceId, Resource>,
    next_id: u64,
    /// Queued commands tagged with their submission sequence number.
    pending: VecDeque<(u64, Command)>,
    next_seq: u64,
    queries: HashMap<QueryId, Option<u64>>,
    next_query: u64,
    budget: Option<usize>,
    allocated: usize,
    commands_per_poll: usize,
    stats: Stats,
}

impl DeviceState {
    fn allocate(&mut self, storage: Storage) -> Result<ResourceId, NativeError> {
        let len = storage.data().len();
        if let Some(budget) = self.budget {
            if self.allocated + len > budget {
                return Err(NativeError::OutOfMemory);
            }
        }
        match storage.usage() {
            Usage::Default => self.stats.default_created += 1,
            Usage::Dynamic => self.stats.dynamic_created += 1,
            Usage::Staging => self.stats.staging_created += 1,
        }
        self.allocated += len;
        self.next_id += 1;
        let id = ResourceId(self.next_id);
        self.resources.insert(
            id,
            Resource {
                storage,
                mapped: false,
            },
        );
        Ok(id)
    }

    fn enqueue(&mut self, command: Command) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.push_back((seq, command));
    }

    fn execute(&mut self, command: Command) {
        match command {
            Command::Copy { dst, src, bytes } => {
                let src_data = match src {
                    CopySource::Live(id) => match self.resources.get(&id) {
                        Some(r) => r.storage.data().to_vec(),
                        None => return,
                    },
                    CopySource::Detached(data) => data,
                };
                let Some(dst) = self.resources.get_mut(&dst) else {
                    return;
                };
                let dst_data = dst.storage.data_mut();
                let len = bytes
                    .unwrap_or(usize::MAX)
                    .min(src_data.len())
                    .min(dst_data.len());
                dst_data[..len].copy_from_slice(&src_data[..len]);
            }
            Command::Update {
                dst,
                region,
                data,
                src_pitch,
            } => {
                if let Some(dst) = self.resources.get_mut(&dst) {
                    apply_update(&mut dst.storage, &region, &data, src_pitch);
                }
            }
        }
    }

    /// Executes queued commands with a sequence number below `marker`, at most `limit` of them.
    fn advance(&mut self, marker: u64, limit: usize) {
        for _ in 0..limit {
            match self.pending.front() {
                Some((seq, _)) if *seq < marker => {
                    if let Some((_, command)) = self.pending.pop_front() {
                        self.execute(command);
                    }
                }
                _ => break,
            }
        }
    }

    fn is_referenced(&self, id: ResourceId) -> bool {
        self.pending.iter().any(|(_, c)| c.references(id))
    }

    /// Detaches `id` from queued work ahead of a discard map.
    fn detach(&mut self, id: ResourceId) {
        let snapshot = match self.resources.get(&id) {
            Some(r) => r.storage.data().to_vec(),
            None => return,
        };
        self.pending.retain(|(_, c)| match c {
            Command::Copy { dst, .. } | Command::Update { dst, .. } => *dst != id,
        });
        for (_, command) in self.pending.iter_mut() {
            if let Command::Copy { src, .. } = command {
                if matches!(src, CopySource::Live(s) if *s == id) {
                    *src = CopySource::Detached(snapshot.clone());
                }
            }
        }
    }
}

fn apply_update(storage: &mut Storage, region: &Region, data: &[u8], src_pitch: usize) {
    let texel = storage.texel_size();
    let dst_pitch = storage.row_pitch();
    let row_len = (region.right - region.left) as usize * texel;
    let dst_data = storage.data_mut();
    for (i, row) in (region.top..region.bottom).enumerate() {
        let d = row as usize * dst_pitch + region.left as usize * texel;
        let s = i * src_pitch;
        if d + row_len > dst_data.len() || s + row_len > data.len() {
            return;
        }
        dst_data[d..d + row_len].copy_from_slice(&data[s..s + row_len]);
    }
}

/// Handle to an emulated device.  Clones refer to the same device.
#[derive(Debug, Clone)]
pub struct Device {
    state: Arc<Mutex<DeviceState>>,
}

impl Default for Device {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Device {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }
}

impl Eq for Device {}

impl Device {
    pub fn new() -> Self {
        Device {
            state: Arc::new(Mutex::new(DeviceState {
                resources: HashMap::new(),
                next_id: 0,
                pending: VecDeque::new(),
                next_seq: 0,
                queries: HashMap::new(),
                next_query: 0,
                budget: None,
                allocated: 0,
                commands_per_poll: DEFAULT_COMMANDS_PER_POLL,
                stats: Stats::default(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, DeviceState> {
        //the state stays consistent across a panicking caller
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Address identifying this device.
    pub fn as_ptr(&self) -> *mut c_void {
        Arc::as_ptr(&self.state).cast_mut().cast()
    }

    /// Limits total bytes allocated; `None` removes the limit.
    pub fn set_memory_budget(&self, budget: Option<usize>) {
        self.lock().budget = budget;
    }

    pub fn allocated_bytes(&self) -> usize {
        self.lock().allocated
    }

    /// How many queued commands the GPU retires per query poll.
    pub fn set_commands_per_poll(&self, commands: usize) {
        self.lock().commands_per_poll = commands.max(1);
    }

    pub fn stats(&self) -> Stats {
        self.lock().stats
    }

    pub fn live_resources(&self) -> usize {
        self.lock().resources.len()
    }

    pub fn pending_commands(&self) -> usize {
        self.lock().pending.len()
    }

    /// Executes all queued work, as if the GPU caught up on its own.
    pub fn flush(&self) {
        let mut state = self.lock();
        let marker = state.next_seq;
        let limit = state.pending.len();
        state.advance(marker, limit);
    }

    /// Zero-filled backing store of `len` bytes, or `OutOfMemory` when it cannot exist.
    fn zeroed(&self, len: Option<usize>) -> Result<Vec<u8>, NativeError> {
        let len = len.ok_or(NativeError::OutOfMemory)?;
        {
            let state = self.lock();
            if state
                .budget
                .is_some_and(|budget| state.allocated.saturating_add(len) > budget)
            {
                return Err(NativeError::OutOfMemory);
            }
        }
        let mut data = Vec::new();
        data.try_reserve_exact(len)
            .map_err(|_| NativeError::OutOfMemory)?;
        data.resize(len, 0);
        Ok(data)
    }

    /// `initial` is `(data, row pitch of data)`.
    pub fn create_texture_2d(
        &self,
        desc: &TextureDesc2D,
        initial: Option<(&[u8], usize)>,
    ) -> Result<ResourceId, NativeError> {
        if desc.width == 0 || desc.height == 0 {
            return Err(NativeError::InvalidArg);
        }
        if desc.usage == Usage::Staging && !desc.bind.is_empty() {
            return Err(NativeError::InvalidArg);
        }
        if desc.usage == Usage::Default && !desc.cpu_access.is_empty() {
            return Err(NativeError::InvalidArg);
        }
        let texel = desc.format.bytes_per_texel();
        let row_bytes = desc.width as usize * texel;
        let row_pitch = align_up(row_bytes, ROW_PITCH_ALIGNMENT);
        let data = self.zeroed(row_pitch.checked_mul(desc.height as usize))?;
        let mut storage = Storage::Texture {
            desc: *desc,
            row_pitch,
            data,
        };
        if let Some((data, pitch)) = initial {
            if pitch < row_bytes || data.len() < pitch * (desc.height as usize - 1) + row_bytes {
                return Err(NativeError::InvalidArg);
            }
            let full = Region {
                left: 0,
                top: 0,
                right: desc.width,
                bottom: desc.height,
            };
            apply_update(&mut storage, &full, data, pitch);
        }
        self.lock().allocate(storage)
    }

    pub fn create_buffer(
        &self,
        desc: &BufferDesc,
        initial: Option<&[u8]>,
    ) -> Result<ResourceId, NativeError> {
        if desc.byte_width == 0 {
            return Err(NativeError::InvalidArg);
        }
        if desc.usage == Usage::Staging && !desc.bind.is_empty() {
            return Err(NativeError::InvalidArg);
        }
        if desc.usage == Usage::Default && !desc.cpu_access.is_empty() {
            return Err(NativeError::InvalidArg);
        }
        let mut data = self.zeroed(Some(desc.byte_width))?;
        if let Some(initial) = initial {
            if initial.len() < desc.byte_width {
                return Err(NativeError::InvalidArg);
            }
            data.copy_from_slice(&initial[..desc.byte_width]);
        }
        self.lock().allocate(Storage::Buffer { desc: *desc, data })
    }

    /// Destroys a resource.  Queued work that references it is skipped.
    pub fn release(&self, id: ResourceId) {
        let mut state = self.lock();
        if let Some(r) = state.resources.remove(&id) {
            state.allocated -= r.storage.data().len();
            state.stats.released += 1;
        }
    }

    pub fn texture_desc(&self, id: ResourceId) -> Option<TextureDesc2D> {
        match self.lock().resources.get(&id).map(|r| &r.storage) {
            Some(Storage::Texture { desc, .. }) => Some(*desc),
            _ => None,
        }
    }

    pub fn buffer_desc(&self, id: ResourceId) -> Option<BufferDesc> {
        match self.lock().resources.get(&id).map(|r| &r.storage) {
            Some(Storage::Buffer { desc, .. }) => Some(*desc),
            _ => None,
        }
    }

    /// Queues a whole-resource copy.  Mismatched resources are ignored at execution.
    pub fn copy_resource(&self, dst: ResourceId, src: ResourceId) {
        let mut state = self.lock();
        state.stats.copies += 1;
        state.enqueue(Command::Copy {
            dst,
            src: CopySource::Live(src),
            bytes: None,
        });
    }

    /// Queues a copy of the first `bytes` bytes of `src` into `dst`.
    pub fn copy_buffer_region(&self, dst: ResourceId, src: ResourceId, bytes: usize) {
        let mut state = self.lock();
        state.stats.copies += 1;
        state.enqueue(Command::Copy {
            dst,
            src: CopySource::Live(src),
            bytes: Some(bytes),
        });
    }

    /**
    Updates `region` of `dst` from `data`, whose rows are `src_pitch` bytes apart.

    Default-usage resources are updated by the GPU, so the update is queued.  CPU
    accessible resources live in host memory and are updated immediately.
    Like the API it models, this reports no errors; invalid requests are dropped.
    */
    pub fn update_subresource(&self, dst: ResourceId, region: &Region, data: &[u8], src_pitch: usize) {
        let mut state = self.lock();
        state.stats.partial_updates += 1;
        if region.right <= region.left || region.bottom <= region.top {
            return;
        }
        let usage = match state.resources.get(&dst) {
            Some(r) => r.storage.usage(),
            None => return,
        };
        if usage == Usage::Default {
            state.enqueue(Command::Update {
                dst,
                region: *region,
                data: data.to_vec(),
                src_pitch,
            });
        } else if let Some(resource) = state.resources.get_mut(&dst) {
            apply_update(&mut resource.storage, region, data, src_pitch);
        }
    }

    /// Maps a resource for CPU access.  The mapping ends when the guard drops.
    pub fn map(&self, id: ResourceId, mode: MapMode) -> Result<Mapped<'_>, NativeError> {
        let mut state = self.lock();
        let result = Self::check_map(&mut state, id, mode);
        match result {
            Ok(()) => {
                match mode {
                    MapMode::Read => state.stats.maps_read += 1,
                    MapMode::Write => state.stats.maps_write += 1,
                    MapMode::WriteDiscard => state.stats.maps_discard += 1,
                }
                if let Some(r) = state.resources.get_mut(&id) {
                    r.mapped = true;
                }
                Ok(Mapped { state, id })
            }
            Err(e) => {
                state.stats.failed_maps += 1;
                Err(e)
            }
        }
    }

    fn check_map(state: &mut DeviceState, id: ResourceId, mode: MapMode) -> Result<(), NativeError> {
        let (access, usage, mapped) = match state.resources.get(&id) {
            Some(r) => (r.storage.cpu_access(), r.storage.usage(), r.mapped),
            None => return Err(NativeError::InvalidArg),
        };
        if mapped {
            return Err(NativeError::InvalidArg);
        }
        match mode {
            MapMode::Read => {
                if !access.contains(CpuAccess::READ) {
                    return Err(NativeError::InvalidArg);
                }
            }
            MapMode::Write => {
                if !access.contains(CpuAccess::WRITE) || usage == Usage::Dynamic {
                    return Err(NativeError::InvalidArg);
                }
                if state.is_referenced(id) {
                    return Err(NativeError::WasStillDrawing);
                }
            }
            MapMode::WriteDiscard => {
                if !access.contains(CpuAccess::WRITE) {
                    return Err(NativeError::InvalidArg);
                }
                state.detach(id);
                if let Some(r) = state.resources.get_mut(&id) {
                    r.storage.data_mut().fill(0);
                }
            }
        }
        Ok(())
    }

    pub fn create_query(&self) -> QueryId {
        let mut state = self.lock();
        state.next_query += 1;
        let id = QueryId(state.next_query);
        state.queries.insert(id, None);
        id
    }

    /// Places an event query behind everything queued so far.
    pub fn end(&self, query: QueryId) {
        let mut state = self.lock();
        state.stats.query_ends += 1;
        let marker = state.next_seq;
        if let Some(q) = state.queries.get_mut(&query) {
            *q = Some(marker);
        }
    }

    /**
    Polls an event query.

    Each poll lets the GPU retire a few queued commands.  Returns `true` once
    every command queued before the matching [`Device::end`] has executed.
    A query that was never ended reports `false`.
    */
    pub fn get_data(&self, query: QueryId) -> bool {
        let mut state = self.lock();
        state.stats.query_polls += 1;
        let Some(Some(marker)) = state.queries.get(&query).copied() else {
            return false;
        };
        let limit = state.commands_per_poll;
        state.advance(marker, limit);
        !state.pending.iter().any(|(seq, _)| *seq < marker)
    }
}

/**
A live CPU mapping.

Holds the device for the duration of the mapping.  Dropping the guard unmaps.
*/
pub struct Mapped<'a> {
    state: MutexGuard<'a, DeviceState>,
    id: ResourceId,
}

impl Mapped<'_> {
    /// Bytes between consecutive rows; the whole length for buffers.
    pub fn row_pitch(&self) -> usize {
        self.resource().storage.row_pitch()
    }

    fn resource(&self) -> &Resource {
        &self.state.resources[&self.id]
    }
}

impl Deref for Mapped<'_> {
    type Target = [u8];
    fn deref(&self) -> &[u8] {
        self.resource().storage.data()
    }
}

impl DerefMut for Mapped<'_> {
    fn deref_mut(&mut self) -> &mut [u8] {
        let id = self.id;
        match self.state.resources.get_mut(&id) {
            Some(r) => r.storage.data_mut(),
            None => &mut [],
        }
    }
}

impl Drop for Mapped<'_> {
    fn drop(&mut self) {
        let id = self.id;
        if let Some(r) = self.state.resources.get_mut(&id) {
            r.mapped = false;
        }
    }
}

impl std::fmt::Debug for Mapped<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mapped")
            .field("id", &self.id)
            .field("row_pitch", &self.row_pitch())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texture(usage: Usage, cpu_access: CpuAccess) -> TextureDesc2D {
        TextureDesc2D {
            width: 3,
            height: 4,
            format: NativeFormat::R8G8B8A8Typeless,
            usage,
            bind: if usage == Usage::Staging {
                BindFlags::empty()
            } else {
                BindFlags::SHADER_RESOURCE
            },
            cpu_access,
        }
    }

    fn wait(device: &Device, query: QueryId) {
        device.end(query);
        while !device.get_data(query) {}
    }

    #[test]
    fn rows_are_padded() {
        let device = Device::new();
        let id = device
            .create_texture_2d(&texture(Usage::Staging, CpuAccess::READ), None)
            .unwrap();
        let mapped = device.map(id, MapMode::Read).unwrap();
        assert_eq!(mapped.row_pitch(), 256);
        assert_eq!(mapped.len(), 256 * 4);
    }

    #[test]
    fn map_requires_access() {
        let device = Device::new();
        let id = device
            .create_texture_2d(&texture(Usage::Default, CpuAccess::empty()), None)
            .unwrap();
        assert_eq!(device.map(id, MapMode::Read).err(), Some(NativeError::InvalidArg));
        assert_eq!(device.stats().failed_maps, 1);
    }

    #[test]
    fn copies_wait_for_the_query() {
        let device = Device::new();
        let initial: Vec<u8> = (0..48).collect();
        let src = device
            .create_texture_2d(&texture(Usage::Default, CpuAccess::empty()), Some((&initial, 12)))
            .unwrap();
        let dst = device
            .create_texture_2d(&texture(Usage::Staging, CpuAccess::READ), None)
            .unwrap();
        device.copy_resource(dst, src);
        {
            let mapped = device.map(dst, MapMode::Read).unwrap();
            assert!(mapped.iter().all(|b| *b == 0), "copy executed without a query");
        }
        let query = device.create_query();
        wait(&device, query);
        let mapped = device.map(dst, MapMode::Read).unwrap();
        assert_eq!(&mapped[256..268], &initial[12..24]);
    }

    #[test]
    fn dynamic_write_needs_discard() {
        let device = Device::new();
        let id = device
            .create_texture_2d(&texture(Usage::Dynamic, CpuAccess::WRITE), None)
            .unwrap();
        assert_eq!(device.map(id, MapMode::Write).err(), Some(NativeError::InvalidArg));
        assert!(device.map(id, MapMode::WriteDiscard).is_ok());
    }

    #[test]
    fn busy_resource_refuses_write_map() {
        let device = Device::new();
        let desc = BufferDesc {
            byte_width: 8,
            usage: Usage::Staging,
            bind: BindFlags::empty(),
            cpu_access: CpuAccess::READ | CpuAccess::WRITE,
        };
        let a = device.create_buffer(&desc, Some(&[7; 8])).unwrap();
        let b = device.create_buffer(&desc, None).unwrap();
        device.copy_resource(b, a);
        assert_eq!(
            device.map(a, MapMode::Write).err(),
            Some(NativeError::WasStillDrawing)
        );
        {
            let mut mapped = device.map(a, MapMode::WriteDiscard).unwrap();
            mapped[0] = 1;
        }
        //the queued copy still sees the contents from before the discard
        device.flush();
        let mapped = device.map(b, MapMode::Read).unwrap();
        assert_eq!(&mapped[..], &[7; 8]);
    }

    #[test]
    fn budget_limits_allocation() {
        let device = Device::new();
        device.set_memory_budget(Some(1024));
        let ok = device
            .create_texture_2d(&texture(Usage::Default, CpuAccess::empty()), None)
            .unwrap();
        assert_eq!(
            device
                .create_texture_2d(&texture(Usage::Default, CpuAccess::empty()), None)
                .err(),
            Some(NativeError::OutOfMemory)
        );
        device.release(ok);
        assert_eq!(device.allocated_bytes(), 0);
        assert_eq!(device.live_resources(), 0);
    }

    #[test]
    fn unbacked_allocation_is_out_of_memory() {
        let device = Device::new();
        let mut desc = texture(Usage::Default, CpuAccess::empty());
        desc.width = 1 << 22;
        desc.height = 1 << 22;
        desc.format = NativeFormat::R32G32B32A32Float;
        assert_eq!(
            device.create_texture_2d(&desc, None).err(),
            Some(NativeError::OutOfMemory)
        );
        let buffer = BufferDesc {
            byte_width: usize::MAX,
            usage: Usage::Default,
            bind: BindFlags::VERTEX_BUFFER,
            cpu_access: CpuAccess::empty(),
        };
        assert_eq!(device.create_buffer(&buffer, None).err(), Some(NativeError::OutOfMemory));
        assert_eq!(device.live_resources(), 0);
        assert_eq!(device.stats(), Stats::default());
    }

    #[test]
    fn staging_update_is_immediate() {
        let device = Device::new();
        let id = device
            .create_texture_2d(&texture(Usage::Staging, CpuAccess::READ), None)
            .unwrap();
        let region = Region {
            left: 0,
            top: 0,
            right: 3,
            bottom: 1,
        };
        device.update_subresource(id, &region, &[9; 12], 12);
        assert_eq!(device.pending_commands(), 0);
        let mapped = device.map(id, MapMode::Read).unwrap();
        assert_eq!(&mapped[..12], &[9; 12]);
    }
}
