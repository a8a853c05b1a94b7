//! Field extraction and construction.

use super::check::Strictness;

/// Location of a named field inside a multi-word record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitField {
    /// Low bit number, from bit 0 of word 0.
    pub lbn: u32,
    /// Width in bits.
    pub width: u32,
}

impl BitField {
    pub const fn new(lbn: u32, width: u32) -> Self {
        Self { lbn, width }
    }

    /// Single-bit flag at `lbn`.
    pub const fn bit(lbn: u32) -> Self {
        Self { lbn, width: 1 }
    }

    /// Index of the word holding the field's low bit.
    #[inline]
    pub const fn word(&self) -> usize {
        (self.lbn / 32) as usize
    }

    /// One past the field's highest bit.
    #[inline]
    pub const fn end(&self) -> u32 {
        self.lbn + self.width
    }

    /// Number of 32-bit words the field touches.
    #[inline]
    pub const fn words_spanned(&self) -> u32 {
        if self.width == 0 {
            return 0;
        }
        (self.end() - 1) / 32 - self.lbn / 32 + 1
    }

    /// Largest value the field can hold (saturates at `u64::MAX`).
    #[inline]
    pub const fn max_value(&self) -> u64 {
        if self.width >= 64 {
            u64::MAX
        } else {
            (1u64 << self.width) - 1
        }
    }

    /// Read the field.
    #[inline]
    pub fn get(&self, words: &[u32]) -> u64 {
        extract(words, self.lbn, self.width)
    }

    /// Read a one-bit field as a flag.
    #[inline]
    pub fn test(&self, words: &[u32]) -> bool {
        self.get(words) != 0
    }

    /// Write the field, range-checking `value` under `checks`.
    #[inline]
    #[track_caller]
    pub fn set(&self, words: &mut [u32], value: u64, checks: Strictness) {
        checks.range_check(value as u128, self.width);
        insert(words, self.lbn, self.width, value);
    }

    /// Read the field after checking the caller's assumed width.
    #[inline]
    #[track_caller]
    pub fn get_checked(&self, words: &[u32], assumed_width: u32, checks: Strictness) -> u64 {
        checks.width_check(assumed_width, self.width);
        self.get(words)
    }
}

#[inline]
const fn mask32(width: u32) -> u32 {
    if width >= 32 {
        u32::MAX
    } else {
        (1u32 << width) - 1
    }
}

/// Extract up to 64 bits. Values wider than 64 bits are truncated.
#[inline]
pub fn extract(words: &[u32], lbn: u32, width: u32) -> u64 {
    // Fast path: field confined to one word.
    let shift = lbn % 32;
    if shift + width <= 32 {
        let word = words[(lbn / 32) as usize];
        return ((word >> shift) & mask32(width)) as u64;
    }
    extract_wide(words, lbn, width) as u64
}

/// Extract up to 128 bits, walking each word boundary the field crosses.
pub fn extract_wide(words: &[u32], lbn: u32, width: u32) -> u128 {
    let mut value = 0u128;
    let mut taken = 0u32;
    let mut bit = lbn;

    while taken < width {
        let word = words[(bit / 32) as usize];
        let shift = bit % 32;
        let chunk = (32 - shift).min(width - taken);

        let part = (word >> shift) & mask32(chunk);
        value |= (part as u128) << taken;

        taken += chunk;
        bit += chunk;
    }

    value
}

/// Insert up to 64 bits. Bits of `value` above `width` are discarded.
#[inline]
pub fn insert(words: &mut [u32], lbn: u32, width: u32, value: u64) {
    insert_wide(words, lbn, width, value as u128);
}

/// Insert up to 128 bits, splitting `value` across the same boundaries
/// [`extract_wide`] reads. Other fields in the touched words are preserved.
pub fn insert_wide(words: &mut [u32], lbn: u32, width: u32, value: u128) {
    let mut placed = 0u32;
    let mut bit = lbn;

    while placed < width {
        let idx = (bit / 32) as usize;
        let shift = bit % 32;
        let chunk = (32 - shift).min(width - placed);

        let field_mask = mask32(chunk) << shift;
        let part = ((value >> placed) as u32) & mask32(chunk);
        words[idx] = (words[idx] & !field_mask) | (part << shift);

        placed += chunk;
        bit += chunk;
    }
}
