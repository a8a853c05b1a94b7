//! Consistency checks with a runtime strictness switch.
//!
//! Strict mode turns layout skew and contract violations into immediate
//! panics so they are caught before a malformed descriptor reaches hardware.
//! Production mode skips every check on the hot path; the caller's contract
//! is trusted.

use core::fmt;

/// Enforcement regime for programmer/consistency errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strictness {
    /// Violations are fatal assertions.
    Strict,
    /// Violations are not checked.
    Production,
}

impl Strictness {
    /// Regime matching the build: strict with debug assertions, else production.
    pub const fn from_build() -> Self {
        if cfg!(debug_assertions) {
            Strictness::Strict
        } else {
            Strictness::Production
        }
    }

    #[inline]
    pub const fn is_strict(self) -> bool {
        matches!(self, Strictness::Strict)
    }

    /// Fatal assertion in strict mode, no-op otherwise.
    #[inline]
    #[track_caller]
    pub fn assert(self, cond: bool, what: fmt::Arguments<'_>) {
        if self.is_strict() && !cond {
            fatal(what);
        }
    }

    /// Compare a decoder's assumed field width with the table's declared width.
    #[inline]
    #[track_caller]
    pub fn width_check(self, assumed: u32, declared: u32) {
        if self.is_strict() && assumed != declared {
            fatal(format_args!(
                "field width skew: assumed {} bits, table declares {}",
                assumed, declared
            ));
        }
    }

    /// Verify `value` fits in `width` bits.
    #[inline]
    #[track_caller]
    pub fn range_check(self, value: u128, width: u32) {
        if self.is_strict() && !fits(value, width) {
            fatal(format_args!(
                "value {:#x} does not fit in {} bits",
                value, width
            ));
        }
    }
}

impl Default for Strictness {
    fn default() -> Self {
        Self::from_build()
    }
}

#[inline]
fn fits(value: u128, width: u32) -> bool {
    width >= 128 || value >> width == 0
}

#[cold]
#[track_caller]
fn fatal(what: fmt::Arguments<'_>) -> ! {
    log::error!("consistency check failed: {}", what);
    panic!("consistency check failed: {}", what);
}
