//! EF10 event-queue timer and read-pointer registers.

use super::regs::*;
use crate::ops::TimerMode;
use crate::state::InitFlags;
use crate::vi::Vi;

/// Write the timer register.
pub fn write(vi: &mut Vi, mode: TimerMode, ticks: u32) {
    let mut w = [0u32; 1];
    TIMER_MODE.set(&mut w, mode as u64, vi.checks);
    TIMER_VAL.set(&mut w, ticks as u64, vi.checks);
    vi.io.write32(vi.regs.evq_timer, w[0]);
}

/// The read pointer is wider than the register's data field, so it goes
/// over in two indirect writes: high part, then low part.
pub fn eventq_prime(vi: &mut Vi) {
    vi.state.require(InitFlags::EVQ, vi.checks);
    let rptr = vi.evq.read_index() as u64;
    let shift = EVQ_IND_RPTR.width;

    let mut high = [0u32; 1];
    EVQ_IND_RPTR_FLAGS.set(&mut high, EVQ_IND_RPTR_FLAGS_HIGH, vi.checks);
    EVQ_IND_RPTR.set(&mut high, rptr >> shift, vi.checks);
    vi.io.write32(vi.regs.evq_rptr, high[0]);

    let mut low = [0u32; 1];
    EVQ_IND_RPTR_FLAGS.set(&mut low, EVQ_IND_RPTR_FLAGS_LOW, vi.checks);
    EVQ_IND_RPTR.set(&mut low, rptr & EVQ_IND_RPTR.max_value(), vi.checks);
    vi.io.write32(vi.regs.evq_rptr, low[0]);
}
