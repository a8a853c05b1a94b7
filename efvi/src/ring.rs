//! Descriptor ring state for the RX and TX queues.
//!
//! # Cursor model
//! ```text
//!   removed            added
//!      │                 │
//!  ────┼─────────────────┼───────────
//!      │ owned by device │ free slots
//! ```
//! `added` and `removed` are free-running counters; the slot index is the
//! counter masked by `entries - 1`. One slot is kept free so a full ring never
//! looks empty to the device.

use alloc::vec;
use alloc::vec::Vec;

use crate::dma::DmaRegion;
use crate::error::{Error, Result};

/// Size of one RX or TX descriptor in bytes.
pub const DESC_SIZE: usize = 8;

/// One descriptor ring plus the caller ids of the buffers it holds.
#[derive(Debug)]
pub struct DescriptorQueue {
    ring: DmaRegion,
    entries: u32,
    added: u32,
    removed: u32,
    ids: Vec<u32>,
    /// RX: previous event left a packet unfinished.
    pub(crate) in_jumbo: bool,
    /// RX (EF10): low bits of the last completed descriptor pointer.
    pub(crate) last_desc_lbits: u32,
}

impl DescriptorQueue {
    /// Queue with no slots, used until the ring is initialized.
    pub fn empty() -> Self {
        Self {
            ring: DmaRegion::empty(),
            entries: 0,
            added: 0,
            removed: 0,
            ids: Vec::new(),
            in_jumbo: false,
            last_desc_lbits: 0,
        }
    }

    /// Bind `ring` as a queue of `entries` descriptors.
    pub fn new(ring: DmaRegion, entries: u32) -> Result<Self> {
        if !entries.is_power_of_two() {
            return Err(Error::InvalidRingSize(entries));
        }
        if ring.len() < entries as usize * DESC_SIZE {
            return Err(Error::InvalidConfig("descriptor ring memory too small"));
        }
        Ok(Self {
            ring,
            entries,
            added: 0,
            removed: 0,
            ids: vec![0; entries as usize],
            in_jumbo: false,
            last_desc_lbits: 0,
        })
    }

    #[inline]
    pub fn entries(&self) -> u32 {
        self.entries
    }

    #[inline]
    pub fn mask(&self) -> u32 {
        self.entries.saturating_sub(1)
    }

    #[inline]
    pub fn added(&self) -> u32 {
        self.added
    }

    #[inline]
    pub fn removed(&self) -> u32 {
        self.removed
    }

    /// Descriptors posted and not yet completed.
    #[inline]
    pub fn fill_level(&self) -> u32 {
        self.added.wrapping_sub(self.removed)
    }

    /// Descriptors that can still be posted.
    #[inline]
    pub fn space(&self) -> u32 {
        self.mask().saturating_sub(self.fill_level())
    }

    /// Ring memory, for handing to the driver.
    pub fn ring(&self) -> &DmaRegion {
        &self.ring
    }

    /// Write descriptor `desc` into the next free slot and remember `id`.
    pub(crate) fn post(&mut self, desc: [u32; 2], id: u32) -> Result<()> {
        if self.space() == 0 {
            return Err(Error::QueueFull);
        }
        let slot = (self.added & self.mask()) as usize;
        self.ring.write_words(slot * DESC_SIZE, desc);
        self.ids[slot] = id;
        self.added = self.added.wrapping_add(1);
        Ok(())
    }

    /// Retire the oldest outstanding descriptor, returning its id.
    pub(crate) fn complete_one(&mut self) -> Option<u32> {
        if self.fill_level() == 0 {
            return None;
        }
        let id = self.ids[(self.removed & self.mask()) as usize];
        self.removed = self.removed.wrapping_add(1);
        Some(id)
    }

    /// Retire up to `n` descriptors at once, returning the counter value of
    /// the first and how many were actually retired. Their ids stay readable
    /// through [`Self::id_at`] until the slots are posted again.
    pub(crate) fn retire(&mut self, n: u32) -> (u32, u32) {
        let first = self.removed;
        let retired = n.min(self.fill_level());
        self.removed = self.removed.wrapping_add(retired);
        (first, retired)
    }

    /// Id of the descriptor in slot `index & mask`.
    pub(crate) fn id_at(&self, index: u32) -> u32 {
        self.ids
            .get((index & self.mask()) as usize)
            .copied()
            .unwrap_or(0)
    }

    /// Write pointer as seen by the doorbell register.
    #[inline]
    pub(crate) fn write_ptr(&self) -> u32 {
        self.added & self.mask()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn queue(entries: u32) -> DescriptorQueue {
        let ring = DmaRegion::alloc_zeroed(entries as usize * DESC_SIZE).unwrap();
        DescriptorQueue::new(ring, entries).unwrap()
    }

    #[test]
    fn test_rejects_non_power_of_two() {
        let ring = DmaRegion::alloc_zeroed(100 * DESC_SIZE).unwrap();
        assert_eq!(DescriptorQueue::new(ring, 100).unwrap_err(), Error::InvalidRingSize(100));
    }

    #[test]
    fn test_rejects_short_ring() {
        let ring = DmaRegion::alloc_zeroed(DESC_SIZE).unwrap();
        assert!(DescriptorQueue::new(ring, 8).is_err());
    }

    #[test]
    fn test_post_until_full() {
        let mut q = queue(4);
        assert_eq!(q.space(), 3);
        for id in 0..3 {
            q.post([id, 0], id).unwrap();
        }
        assert_eq!(q.post([9, 0], 9), Err(Error::QueueFull));
        assert_eq!(q.fill_level(), 3);
        assert_eq!(q.ring().read32(2 * DESC_SIZE), 2);
    }

    #[test]
    fn test_complete_returns_ids_in_order() {
        let mut q = queue(4);
        q.post([0, 0], 10).unwrap();
        q.post([0, 0], 11).unwrap();
        assert_eq!(q.complete_one(), Some(10));
        assert_eq!(q.complete_one(), Some(11));
        assert_eq!(q.complete_one(), None);
    }

    #[test]
    fn test_wraps_around() {
        let mut q = queue(4);
        for round in 0..10 {
            q.post([0, 0], round).unwrap();
            assert_eq!(q.complete_one(), Some(round));
        }
        assert_eq!(q.write_ptr(), 10 & 3);
    }

    #[test]
    fn test_retire_batch() {
        let mut q = queue(8);
        for id in 0..4 {
            q.post([0, 0], 100 + id).unwrap();
        }
        let (first, retired) = q.retire(3);
        assert_eq!((first, retired), (0, 3));
        assert_eq!(q.id_at(first + 2), 102);
        assert_eq!(q.fill_level(), 1);
    }

    #[test]
    fn test_retire_caps_at_fill_level() {
        let mut q = queue(8);
        for id in 0..2 {
            q.post([0, 0], id).unwrap();
        }
        assert_eq!(q.retire(5), (0, 2));
        assert_eq!(q.fill_level(), 0);
        assert_eq!(q.retire(3), (2, 0));
        assert_eq!(q.fill_level(), 0);
    }

    #[test]
    fn test_empty_queue_has_no_space() {
        let mut q = DescriptorQueue::empty();
        assert_eq!(q.space(), 0);
        assert_eq!(q.post([0, 0], 0), Err(Error::QueueFull));
        assert_eq!(q.id_at(5), 0);
    }
}
