//! Initialization-state tracking.
//!
//! Each VI records which of its subsystems have been set up. Setup follows a
//! fixed order; every later operation names the flag it depends on.
//!
//! ```text
//!   NIC ──> IO ──┬──> RXQ ──┬──> EVQ ──> TIMER
//!                └──> TXQ ──┘
//!   RXQ ──> RX_TIMESTAMPING      TXQ ──> TX_TIMESTAMPING
//!   NIC ──> OUT_FLAGS
//! ```

use crate::codec::Strictness;

bitflags::bitflags! {
    /// Completed setup steps of a VI.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
    pub struct InitFlags: u32 {
        const NIC             = 0x1;
        const IO              = 0x2;
        const RXQ             = 0x4;
        const TXQ             = 0x8;
        const EVQ             = 0x10;
        const TIMER           = 0x20;
        const RX_TIMESTAMPING = 0x40;
        const TX_TIMESTAMPING = 0x80;
        const OUT_FLAGS       = 0x100;
    }
}

/// Per-VI initialization bitmask.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct InitState {
    flags: InitFlags,
}

impl InitState {
    pub const fn new() -> Self {
        Self { flags: InitFlags::empty() }
    }

    /// Record a completed step. Idempotent.
    #[inline]
    pub fn mark(&mut self, flag: InitFlags) {
        self.flags |= flag;
    }

    #[inline]
    pub fn is_set(&self, flag: InitFlags) -> bool {
        self.flags.contains(flag)
    }

    #[inline]
    pub fn flags(&self) -> InitFlags {
        self.flags
    }

    /// Precondition: every bit of `flag` is set.
    #[inline]
    #[track_caller]
    pub fn require(&self, flag: InitFlags, checks: Strictness) {
        checks.assert(
            self.is_set(flag),
            format_args!("VI not initialized: need {:?}, have {:?}", flag, self.flags),
        );
    }

    /// Precondition: at least one bit of `flags` is set.
    #[inline]
    #[track_caller]
    pub fn require_any(&self, flags: InitFlags, checks: Strictness) {
        checks.assert(
            self.flags.intersects(flags),
            format_args!("VI not initialized: need any of {:?}, have {:?}", flags, self.flags),
        );
    }
}
