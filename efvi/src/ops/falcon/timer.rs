//! Falcon event-queue timer and read-pointer registers.

use super::regs::*;
use crate::ops::TimerMode;
use crate::state::InitFlags;
use crate::vi::Vi;

/// Write the timer command register.
pub fn write(vi: &mut Vi, mode: TimerMode, ticks: u32) {
    let mut w = [0u32; 1];
    TIMER_MODE.set(&mut w, mode as u64, vi.checks);
    TIMER_VAL.set(&mut w, ticks as u64, vi.checks);
    vi.io.write32(vi.regs.evq_timer, w[0]);
}

/// Single write of the read pointer, in entries.
pub fn eventq_prime(vi: &mut Vi) {
    vi.state.require(InitFlags::EVQ, vi.checks);
    let mut w = [0u32; 1];
    EVQ_RPTR.set(&mut w, vi.evq.read_index() as u64, vi.checks);
    vi.io.write32(vi.regs.evq_rptr, w[0]);
}
