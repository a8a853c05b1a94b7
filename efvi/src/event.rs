//! Decoded completion events.

bitflags::bitflags! {
    /// Per-packet receive flags.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
    pub struct RxFlags: u16 {
        /// First buffer of a packet.
        const SOP         = 1 << 0;
        /// More buffers of this packet follow.
        const CONT        = 1 << 1;
        /// Multicast frame.
        const MCAST       = 1 << 2;
        /// Multicast hash matched the filter.
        const MATCH_MCAST = 1 << 3;
        /// Packed stream: hardware moved on to the next buffer.
        const PS_NEXT_BUFFER = 1 << 4;
    }
}

/// Why a received packet was discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscardReason {
    /// Frame truncated (ran out of descriptors mid-packet).
    Trunc,
    /// Ethernet CRC failed.
    CrcBad,
    /// IP or L4 checksum failed.
    CsumBad,
    /// Multicast filter mismatch.
    McastMismatch,
    /// Any other hardware-reported error.
    Other,
}

/// Why a transmit failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxErrorKind {
    /// Descriptor referenced a buffer this VI does not own.
    BufOwner,
    /// Packet exceeded the maximum size.
    TooBig,
    /// Adapter rejected the packet.
    PktErr,
    /// Any other error.
    Other,
}

/// One decoded completion from the event queue.
///
/// Events are plain values; they live only as long as the caller keeps them.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Placeholder for unused slots of an output buffer.
    #[default]
    Empty,
    /// One receive descriptor completed.
    Rx {
        q_id: u32,
        /// Caller's id for the buffer.
        rq_id: u32,
        /// Bytes written, including any RX prefix.
        len: u32,
        flags: RxFlags,
    },
    /// Several receive descriptors completed; ids come from `receive_unbundle`.
    RxMulti {
        q_id: u32,
        /// Ring counter of the first completed descriptor.
        first: u32,
        n_descs: u32,
        flags: RxFlags,
    },
    /// Packet received into a descriptor but flagged bad.
    RxDiscard {
        q_id: u32,
        rq_id: u32,
        len: u32,
        reason: DiscardReason,
    },
    /// Packets landed in the current packed-stream buffer.
    RxPackedStream {
        q_id: u32,
        n_pkts: u32,
        flags: RxFlags,
    },
    /// Transmit descriptors completed up to (not including) `desc_id`.
    Tx { q_id: u32, desc_id: u32 },
    /// Transmit failed.
    TxError {
        q_id: u32,
        desc_id: u32,
        kind: TxErrorKind,
    },
    /// Event-queue timer expired.
    Timer { q_id: u32 },
    /// Software-generated event.
    Software { data: u32 },
}

impl Event {
    /// Queue label of events that carry one.
    pub fn q_id(&self) -> Option<u32> {
        match *self {
            Event::Rx { q_id, .. }
            | Event::RxMulti { q_id, .. }
            | Event::RxDiscard { q_id, .. }
            | Event::RxPackedStream { q_id, .. }
            | Event::Tx { q_id, .. }
            | Event::TxError { q_id, .. }
            | Event::Timer { q_id } => Some(q_id),
            Event::Empty | Event::Software { .. } => None,
        }
    }

    pub fn is_rx(&self) -> bool {
        matches!(
            self,
            Event::Rx { .. } | Event::RxMulti { .. } | Event::RxDiscard { .. } | Event::RxPackedStream { .. }
        )
    }

    pub fn is_tx(&self) -> bool {
        matches!(self, Event::Tx { .. } | Event::TxError { .. })
    }
}
