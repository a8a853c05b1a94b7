//! DMA region backing a descriptor or event ring.
//!
//! The adapter writes to this memory behind the CPU's back, so every access is
//! volatile and goes through `&self`. Two backings exist:
//!
//! - **Heap**: page-aligned, zeroed allocation owned by the region. Used when
//!   the ring lives in host memory the driver maps for the device, and by tests
//!   that play the adapter's role.
//! - **Mapped**: caller-provided memory (e.g. an mmap of the driver's ring).

use alloc::alloc::{alloc_zeroed, dealloc, Layout};
use core::ptr::{self, NonNull};

/// Alignment of heap-backed regions.
pub const REGION_ALIGN: usize = 4096;

enum Backing {
    Heap(Layout),
    Mapped,
}

/// Ring memory shared between CPU and device.
pub struct DmaRegion {
    /// CPU pointer to the first byte.
    base: NonNull<u8>,
    /// Size in bytes.
    len: usize,
    backing: Backing,
}

impl DmaRegion {
    /// Zero-length region used before a ring is initialized.
    pub const fn empty() -> Self {
        Self {
            base: NonNull::dangling(),
            len: 0,
            backing: Backing::Mapped,
        }
    }

    /// Allocate a zeroed, page-aligned region of `len` bytes.
    ///
    /// Returns `None` if the allocator fails.
    pub fn alloc_zeroed(len: usize) -> Option<Self> {
        if len == 0 {
            return Some(Self::empty());
        }
        let layout = Layout::from_size_align(len, REGION_ALIGN).ok()?;
        // SAFETY: layout has non-zero size.
        let raw = unsafe { alloc_zeroed(layout) };
        let base = NonNull::new(raw)?;
        Some(Self {
            base,
            len,
            backing: Backing::Heap(layout),
        })
    }

    /// Wrap externally mapped memory.
    ///
    /// # Safety
    /// - `base` must be valid for reads and writes of `len` bytes for the
    ///   lifetime of the region
    /// - `base` must be 8-byte aligned
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

    /// CPU address of the region, for handing to the driver.
    #[inline]
    pub fn as_ptr(&self) -> *const u8 {
        self.base.as_ptr()
    }

    #[inline]
    fn in_bounds(&self, offset: usize, size: usize) -> bool {
        offset % size == 0 && offset.checked_add(size).is_some_and(|end| end <= self.len)
    }

    /// Volatile 32-bit read. Out-of-range or misaligned offsets read as zero.
    #[inline]
    pub fn read32(&self, offset: usize) -> u32 {
        if !self.in_bounds(offset, 4) {
            return 0;
        }
        // SAFETY: bounds and alignment checked above.
        unsafe { ptr::read_volatile(self.base.as_ptr().add(offset) as *const u32) }
    }

    /// Volatile 32-bit write. Out-of-range or misaligned offsets are ignored.
    #[inline]
    pub fn write32(&self, offset: usize, value: u32) {
        if !self.in_bounds(offset, 4) {
            return;
        }
        // SAFETY: bounds and alignment checked above.
        unsafe { ptr::write_volatile(self.base.as_ptr().add(offset) as *mut u32, value) }
    }

    /// Volatile 64-bit read as two little-endian words.
    #[inline]
    pub fn read_words(&self, offset: usize) -> [u32; 2] {
        [self.read32(offset), self.read32(offset + 4)]
    }

    /// Volatile 64-bit write as two little-endian words, low word first.
    #[inline]
    pub fn write_words(&self, offset: usize, words: [u32; 2]) {
        self.write32(offset, words[0]);
        self.write32(offset + 4, words[1]);
    }

    /// Volatile 64-bit write.
    #[inline]
    pub fn write_qword(&self, offset: usize, value: u64) {
        self.write_words(offset, [value as u32, (value >> 32) as u32]);
    }

    /// Fill the whole region with `byte`.
    pub fn fill(&self, byte: u8) {
        if self.len == 0 {
            return;
        }
        // SAFETY: region is valid for `len` bytes.
        unsafe { ptr::write_bytes(self.base.as_ptr(), byte, self.len) }
    }
}

impl Drop for DmaRegion {
    fn drop(&mut self) {
        if let Backing::Heap(layout) = self.backing {
            // SAFETY: allocated in `alloc_zeroed` with this layout.
            unsafe { dealloc(self.base.as_ptr(), layout) }
        }
    }
}

impl core::fmt::Debug for DmaRegion {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DmaRegion")
            .field("base", &self.base)
            .field("len", &self.len)
            .finish()
    }
}

// Safety: the region is owned by exactly one VI, which is designed for
// single-threaded use. Moving it between threads is fine.
unsafe impl Send for DmaRegion {}
