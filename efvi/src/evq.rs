//! Event queue ring and the drain loop.
//!
//! # Entry states
//! ```text
//!   word1       word0
//!   ffffffff    ffffffff   empty: hardware has not written this slot
//!   xxxxxxxx    xxxxxxxx   present: decode, reset to all-ones, advance
//!   ffffffff    xxxxxxxx   torn: DMA still in flight, stop here
//!   xxxxxxxx    ffffffff   torn
//! ```
//!
//! The read cursor moves only past entries that were fully decoded, so a torn
//! entry is picked up intact by a later poll.

use crate::dma::DmaRegion;
use crate::error::{Error, Result};
use crate::event::Event;
use crate::io::barriers::rmb;
use crate::ops::GenerationOps;
use crate::state::InitFlags;
use crate::vi::Vi;

/// Size of one event entry in bytes.
pub const EVENT_SIZE: usize = 8;

/// Marker word of an unwritten half-entry.
pub const EMPTY_WORD: u32 = u32::MAX;

/// What the slot under the read cursor holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Empty,
    Torn,
    Present([u32; 2]),
}

/// Event queue memory plus the software read cursor.
#[derive(Debug)]
pub struct EventRing {
    ring: DmaRegion,
    entries: u32,
    /// Free-running byte offset of the next entry to read.
    ptr: u32,
}

impl EventRing {
    /// Ring with no entries, used before `init_evq`.
    pub fn empty() -> Self {
        Self {
            ring: DmaRegion::empty(),
            entries: 0,
            ptr: 0,
        }
    }

    /// Bind `ring` as an event queue of `entries` slots and mark every slot
    /// empty.
    pub fn new(ring: DmaRegion, entries: u32) -> Result<Self> {
        if !entries.is_power_of_two() {
            return Err(Error::InvalidRingSize(entries));
        }
        if ring.len() < entries as usize * EVENT_SIZE {
            return Err(Error::InvalidConfig("event queue memory too small"));
        }
        ring.fill(0xff);
        Ok(Self { ring, entries, ptr: 0 })
    }

    #[inline]
    pub fn entries(&self) -> u32 {
        self.entries
    }

    /// Byte mask applied to the read pointer.
    #[inline]
    pub fn mask(&self) -> u32 {
        (self.entries as usize * EVENT_SIZE).saturating_sub(1) as u32
    }

    /// Free-running read pointer in bytes.
    #[inline]
    pub fn read_ptr(&self) -> u32 {
        self.ptr
    }

    /// Index of the next entry to read.
    #[inline]
    pub fn read_index(&self) -> u32 {
        (self.ptr & self.mask()) / EVENT_SIZE as u32
    }

    /// Ring memory, for handing to the driver.
    pub fn ring(&self) -> &DmaRegion {
        &self.ring
    }

    /// Inspect the slot under the cursor without consuming it.
    pub fn peek(&self) -> Slot {
        if self.entries == 0 {
            return Slot::Empty;
        }
        let offset = (self.ptr & self.mask()) as usize;
        let lo = self.ring.read32(offset);
        let hi = self.ring.read32(offset + 4);
        match (lo == EMPTY_WORD, hi == EMPTY_WORD) {
            (true, true) => Slot::Empty,
            (false, false) => Slot::Present([lo, hi]),
            _ => Slot::Torn,
        }
    }

    /// Check whether the `n`th slot ahead of the cursor has been written.
    /// Offsets at or past the ring size are never written ahead.
    pub fn is_written_ahead(&self, n: u32) -> bool {
        if n >= self.entries {
            return false;
        }
        let offset = (self.ptr.wrapping_add(n * EVENT_SIZE as u32) & self.mask()) as usize;
        let words = self.ring.read_words(offset);
        words[0] != EMPTY_WORD && words[1] != EMPTY_WORD
    }

    /// Reset the slot under the cursor to empty and advance.
    pub(crate) fn consume(&mut self) {
        if self.entries == 0 {
            return;
        }
        let offset = (self.ptr & self.mask()) as usize;
        self.ring.write_words(offset, [EMPTY_WORD, EMPTY_WORD]);
        self.ptr = self.ptr.wrapping_add(EVENT_SIZE as u32);
    }
}

/// Drain decoded events into `out`.
///
/// Stops at the first empty or torn slot, or when `out` is full.
///
/// # Returns
/// Number of events written to the front of `out`.
pub fn poll<O: GenerationOps + ?Sized>(ops: &O, vi: &mut Vi, out: &mut [Event]) -> usize {
    vi.state.require(InitFlags::EVQ, vi.checks);

    let mut n = 0;
    while n < out.len() {
        let raw = match vi.evq.peek() {
            Slot::Present(raw) => raw,
            Slot::Torn => {
                log::trace!("evq: torn entry at {}, deferring", vi.evq.read_index());
                break;
            }
            Slot::Empty => break,
        };
        rmb();
        let decoded = ops.decode_event(vi, raw);
        vi.evq.consume();
        if let Some(ev) = decoded {
            log::trace!("evq: {:?}", ev);
            out[n] = ev;
            n += 1;
        }
    }
    n
}
