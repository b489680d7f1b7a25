// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
GPU completion fences.

A fence is signaled after a batch of device-side work is submitted, then polled
until the GPU reports that everything submitted before the signal has finished.
[`wait`] is the single blocking primitive of the crate: it polls with a short
sleep between attempts rather than spinning.
*/

use std::time::Duration;

/// Default sleep between fence polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_micros(100);

pub trait Fence {
    /// Places the fence behind all previously submitted work.
    fn signal(&mut self);
    /// Polls once.  Returns `true` when all work before the last signal is done.
    fn is_complete(&mut self) -> bool;
}

/// Signals `fence` and blocks until it completes.
///
/// Returns how many polls reported incomplete work.
pub fn wait<F: Fence + ?Sized>(fence: &mut F, poll_interval: Duration) -> usize {
    let _interval = logwise::perfwarn_begin!("fence::wait");
    fence.signal();
    let mut pending_polls = 0;
    while !fence.is_complete() {
        pending_polls += 1;
        std::thread::sleep(poll_interval);
    }
    pending_polls
}
