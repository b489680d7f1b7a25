// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
use super::bound_device::WgpuDevice;
use crate::fence::Fence;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use wgpu::PollType;

/**
Completion fence built on `on_submitted_work_done`.

Each signal gets a generation number; the callback records the highest
generation that has completed, so a late callback from an earlier signal
cannot complete a newer one.
*/
#[derive(Debug)]
pub(super) struct WgpuFence {
    device: WgpuDevice,
    signaled: u64,
    completed: Arc<AtomicU64>,
}

impl WgpuFence {
    pub(super) fn new(device: WgpuDevice) -> Self {
        WgpuFence {
            device,
            signaled: 0,
            completed: Arc::new(AtomicU64::new(0)),
        }
    }
}

impl Fence for WgpuFence {
    fn signal(&mut self) {
        self.signaled += 1;
        let generation = self.signaled;
        let completed = self.completed.clone();
        self.device.flush();
        self.device.queue.on_submitted_work_done(move || {
            completed.fetch_max(generation, Ordering::Release);
        });
    }

    fn is_complete(&mut self) -> bool {
        if let Err(e) = self.device.device.poll(PollType::Poll) {
            //a lost device never completes anything
            logwise::error_sync!("sync: device poll failed: {e}", e = logwise::privacy::LogIt(&e));
            return true;
        }
        self.completed.load(Ordering::Acquire) >= self.signaled
    }
}
