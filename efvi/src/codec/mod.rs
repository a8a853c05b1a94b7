//! Bit-field codec for firmware-defined records.
//!
//! Hardware events and descriptors are little-endian records of one to four
//! 32-bit words. Fields are addressed by low bit number (LBN, counted from bit 0
//! of word 0) and width, and may straddle word boundaries.
//!
//! ```text
//!        word 0                    word 1                    word 2
//! ┌────────────────────────┬────────────────────────┬────────────────────────┐
//! │31        lbn          0│63                    32│95                    64│
//! │██████████▒▒▒▒▒▒        │              ██████████│                        │
//! └────────────────────────┴────────────────────────┴────────────────────────┘
//!   low part = word0 >> lbn       high part = word1 & mask(width - (32 - lbn))
//! ```
//!
//! One algorithm handles every boundary: it walks the words the field touches
//! and moves at most 32 bits per step.

pub mod check;
pub mod field;
pub mod table;

pub use check::Strictness;
pub use field::{extract, extract_wide, insert, insert_wide, BitField};
pub use table::{FieldTable, LayoutError};

/// Maximum record size in 32-bit words.
pub const MAX_RECORD_WORDS: usize = 4;

/// Split a 64-bit little-endian qword into the codec's word order.
#[inline]
pub const fn qword_to_words(qword: u64) -> [u32; 2] {
    [qword as u32, (qword >> 32) as u32]
}

/// Join two words back into a qword.
#[inline]
pub const fn words_to_qword(words: [u32; 2]) -> u64 {
    (words[0] as u64) | ((words[1] as u64) << 32)
}
