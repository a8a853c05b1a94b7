//! Packed-stream receive: buffer layout and credit accounting.
//!
//! In packed-stream mode the adapter writes many packets back to back into
//! one large buffer. Each packet is preceded by an 8-byte prefix and followed
//! by a gap; the next packet starts at the following 64-byte boundary.
//!
//! ```text
//!  buffer
//!  ├─ 0 .. 256          reserved (first packet's metadata lands here)
//!  ├─ 256               prefix │ packet bytes │ gap ≥ 64 ─┐
//!  │                                                    │ align 64
//!  ├─ next              prefix │ packet bytes │ gap  <───┘
//!  ...
//! ```
//!
//! Unpacking rewrites the hardware prefix into a [`PackedStreamPacket`]
//! placed `PS_METADATA_OFFSET` bytes before the packet's DMA start, inside
//! the previous packet's gap.
//!
//! # Credits
//! The adapter stops writing once the host has consumed its credits. One
//! credit covers `PS_SPACE_PER_CREDIT` bytes of buffer space and is spent
//! each time consumption crosses a 64 KiB boundary.

use core::mem::size_of;

use crate::codec::Strictness;
use crate::dma::align_up;
use crate::error::{Error, Result};
use crate::ops::ef10::regs::{PS_PREFIX_CAP_LEN, PS_PREFIX_ORIG_LEN, PS_PREFIX_SIZE, PS_PREFIX_TSTAMP};

/// Gap the adapter leaves after each packet.
pub const PS_PACKET_GAP: usize = 64;

/// DMA alignment of each packet.
pub const PS_ALIGNMENT: usize = 64;

/// Distance from a packet's DMA start back to its metadata. Leaves room for
/// an empty option record after the metadata.
pub const PS_METADATA_OFFSET: usize = size_of::<PackedStreamPacket>() + size_of::<u32>();

/// Space reserved at the start of each buffer before the first DMA.
pub const PS_DMA_START_OFFSET: usize = 256;

/// Buffer bytes covered by one credit.
pub const PS_SPACE_PER_CREDIT: usize = 0x10000;

const _: () = assert!(size_of::<PackedStreamPacket>() == 16);
const _: () = assert!(PS_DMA_START_OFFSET % PS_ALIGNMENT == 0);
const _: () = assert!(PS_DMA_START_OFFSET >= PS_METADATA_OFFSET);
const _: () = assert!(PS_METADATA_OFFSET <= PS_PACKET_GAP);
const _: () = assert!(PS_SPACE_PER_CREDIT % PS_ALIGNMENT == 0);

/// Per-packet metadata in a packed-stream buffer.
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PackedStreamPacket {
    /// Offset from this metadata to the next packet's metadata.
    pub next_offset: u16,
    /// Offset from this metadata to the packet bytes.
    pub pkt_start_offset: u8,
    pub flags: u8,
    /// Bytes captured into the buffer.
    pub cap_len: u16,
    /// Length of the packet on the wire.
    pub orig_len: u16,
    pub ts_sec: u32,
    pub ts_nsec: u32,
}

impl PackedStreamPacket {
    /// Serialize in the in-buffer layout.
    pub fn to_bytes(&self) -> [u8; 16] {
        let mut out = [0u8; 16];
        out[0..2].copy_from_slice(&self.next_offset.to_le_bytes());
        out[2] = self.pkt_start_offset;
        out[3] = self.flags;
        out[4..6].copy_from_slice(&self.cap_len.to_le_bytes());
        out[6..8].copy_from_slice(&self.orig_len.to_le_bytes());
        out[8..12].copy_from_slice(&self.ts_sec.to_le_bytes());
        out[12..16].copy_from_slice(&self.ts_nsec.to_le_bytes());
        out
    }
}

/// Parse the packet whose DMA starts at `dma_offset` and write its metadata
/// into the buffer.
///
/// # Returns
/// The packet metadata and the DMA offset of the next packet.
///
/// # Errors
/// - `Error::Truncated`: the prefix or packet extends past `buffer`
/// - `Error::InvalidAddress`: `dma_offset` is misaligned or leaves no room
///   for metadata
pub fn unpack(
    buffer: &mut [u8],
    dma_offset: usize,
    ts_correction: i32,
    checks: Strictness,
) -> Result<(PackedStreamPacket, usize)> {
    if dma_offset % PS_ALIGNMENT != 0 || dma_offset < PS_METADATA_OFFSET {
        return Err(Error::InvalidAddress);
    }
    let prefix_end = dma_offset + PS_PREFIX_SIZE;
    let prefix = buffer.get(dma_offset..prefix_end).ok_or(Error::Truncated)?;
    let words = [
        u32::from_le_bytes([prefix[0], prefix[1], prefix[2], prefix[3]]),
        u32::from_le_bytes([prefix[4], prefix[5], prefix[6], prefix[7]]),
    ];

    let cap_len = PS_PREFIX_CAP_LEN.get_checked(&words, 16, checks) as u16;
    let orig_len = PS_PREFIX_ORIG_LEN.get_checked(&words, 16, checks) as u16;
    let tstamp = PS_PREFIX_TSTAMP.get_checked(&words, 32, checks) as u32;

    if prefix_end + cap_len as usize > buffer.len() {
        return Err(Error::Truncated);
    }

    let next = align_up(prefix_end + cap_len as usize + PS_PACKET_GAP, PS_ALIGNMENT);
    let next_offset = u16::try_from(next - dma_offset).map_err(|_| Error::Truncated)?;

    let pkt = PackedStreamPacket {
        next_offset,
        pkt_start_offset: (PS_METADATA_OFFSET + PS_PREFIX_SIZE) as u8,
        flags: 0,
        cap_len,
        orig_len,
        ts_sec: 0,
        ts_nsec: tstamp.wrapping_add_signed(ts_correction),
    };

    let meta = dma_offset - PS_METADATA_OFFSET;
    buffer[meta..meta + size_of::<PackedStreamPacket>()].copy_from_slice(&pkt.to_bytes());

    Ok((pkt, next))
}

/// Credit counter for one packed-stream VI.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PackedStreamCredit {
    credits: u32,
    /// Bytes of buffer space consumed so far.
    pos: u64,
    /// `pos` at the previous update.
    last_pos: u64,
}

impl PackedStreamCredit {
    pub const fn new(credits: u32) -> Self {
        Self {
            credits,
            pos: 0,
            last_pos: 0,
        }
    }

    #[inline]
    pub fn credits(&self) -> u32 {
        self.credits
    }

    #[inline]
    pub fn position(&self) -> u64 {
        self.pos
    }

    /// Record `bytes` of buffer space used.
    #[inline]
    pub fn consume(&mut self, bytes: usize) {
        self.pos = self.pos.wrapping_add(bytes as u64);
    }

    /// 64 KiB boundaries crossed since the last update, not yet spent.
    pub fn pending(&self) -> u32 {
        let per = PS_SPACE_PER_CREDIT as u64;
        (self.pos / per).wrapping_sub(self.last_pos / per) as u32
    }

    /// Spend one credit per 64 KiB boundary crossed since the last update.
    ///
    /// # Returns
    /// Number of boundaries crossed.
    pub fn update_credit(&mut self) -> u32 {
        let crossed = self.pending();
        self.last_pos = self.pos;
        self.credits = self.credits.saturating_sub(crossed);
        crossed
    }

    /// Credits returned by the adapter.
    #[inline]
    pub fn replenish(&mut self, n: u32) {
        self.credits = self.credits.saturating_add(n);
    }

    /// Whether another buffer may be posted.
    #[inline]
    pub fn can_post(&self) -> bool {
        self.credits > 0
    }
}
