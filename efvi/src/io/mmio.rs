//! MMIO register window of one VI.
//!
//! # Safety
//! - Mapped windows must stay mapped for the lifetime of the region
//! - Register offsets are 4-byte aligned
//!
//! Writes outside the window are dropped rather than faulting, so an
//! uninitialized VI (empty window) cannot scribble on memory.

use alloc::alloc::{alloc_zeroed, dealloc, Layout};
use core::ptr::{self, NonNull};

/// Size of the per-VI register page.
pub const IO_PAGE_SIZE: usize = 4096;

enum Backing {
    Heap(Layout),
    Mapped,
}

/// Doorbell / timer register window.
pub struct IoRegion {
    base: NonNull<u8>,
    len: usize,
    backing: Backing,
}

impl IoRegion {
    /// Window with no registers, used until `init_io`.
    pub const fn empty() -> Self {
        Self {
            base: NonNull::dangling(),
            len: 0,
            backing: Backing::Mapped,
        }
    }

    /// Host-memory window standing in for a device page.
    ///
    /// Written values can be read back, which lets software models and tests
    /// observe doorbells.
    pub fn alloc(len: usize) -> Option<Self> {
        if len == 0 {
            return Some(Self::empty());
        }
        let layout = Layout::from_size_align(len, 8).ok()?;
        // SAFETY: layout has non-zero size.
        let base = NonNull::new(unsafe { alloc_zeroed(layout) })?;
        Some(Self {
            base,
            len,
            backing: Backing::Heap(layout),
        })
    }

    /// Wrap a mapped device register page.
    ///
    /// # Safety
    /// `base` must be a valid MMIO mapping of at least `len` bytes.
    pub unsafe fn from_raw(base: *mut u8, len: usize) -> Option<Self> {
        Some(Self {
            base: NonNull::new(base)?,
            len,
            backing: Backing::Mapped,
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    fn valid(&self, offset: usize) -> bool {
        offset % 4 == 0 && offset + 4 <= self.len
    }

    /// Write a 32-bit register.
    #[inline]
    pub fn write32(&self, offset: usize, value: u32) {
        if !self.valid(offset) {
            log::trace!("io: dropped write {:#x} to offset {:#x}", value, offset);
            return;
        }
        // SAFETY: offset checked against the window.
        unsafe { ptr::write_volatile(self.base.as_ptr().add(offset) as *mut u32, value) }
    }

    /// Read a 32-bit register. Offsets outside the window read as zero.
    #[inline]
    pub fn read32(&self, offset: usize) -> u32 {
        if !self.valid(offset) {
            return 0;
        }
        // SAFETY: offset checked against the window.
        unsafe { ptr::read_volatile(self.base.as_ptr().add(offset) as *const u32) }
    }
}

impl Drop for IoRegion {
    fn drop(&mut self) {
        if let Backing::Heap(layout) = self.backing {
            // SAFETY: allocated in `alloc` with this layout.
            unsafe { dealloc(self.base.as_ptr(), layout) }
        }
    }
}

impl core::fmt::Debug for IoRegion {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("IoRegion")
            .field("base", &self.base)
            .field("len", &self.len)
            .finish()
    }
}

// Safety: owned by one VI; single-threaded use.
unsafe impl Send for IoRegion {}
