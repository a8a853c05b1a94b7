//! Memory barriers around ring and doorbell access.

use core::sync::atomic::{fence, Ordering};

/// Order prior writes (descriptors) before later writes (doorbell).
#[inline]
pub fn wmb() {
    fence(Ordering::Release);
}

/// Order a ring read (event present) before reads of the rest of the entry.
#[inline]
pub fn rmb() {
    fence(Ordering::Acquire);
}
