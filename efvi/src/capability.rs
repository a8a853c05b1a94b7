//! Hardware capability identifiers.
//!
//! Values are part of the driver ABI and never renumbered; new capabilities
//! are appended.

/// A queryable adapter capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum Capability {
    /// Programmed I/O buffers for low-latency send.
    Pio = 0,
    /// Size of one PIO buffer in bytes.
    PioBufferSize = 1,
    /// Number of PIO buffers.
    PioBufferCount = 2,
    /// Transmitted multicast can be looped back to local receivers.
    HwMulticastLoopback = 3,
    /// Received multicast can be replicated to several VIs.
    HwMulticastReplication = 4,
    HwRxTimestamping = 5,
    HwTxTimestamping = 6,
    /// Packed-stream receive mode.
    PackedStream = 7,
    /// Bitwise-or of supported packed-stream buffer sizes in bytes.
    PackedStreamBufferSizes = 8,
    Vports = 9,
    /// DMA addresses may be physical.
    PhysMode = 10,
    /// DMA addresses go through the buffer table.
    BufferMode = 11,
    MulticastFilterChaining = 12,
    MacSpoofing = 13,
    RxFilterTypeUdpLocal = 14,
    RxFilterTypeTcpLocal = 15,
    RxFilterTypeUdpFull = 16,
    RxFilterTypeTcpFull = 17,
    RxFilterTypeIpVlan = 18,
    RxFilterTypeUdp6Local = 19,
    RxFilterTypeTcp6Local = 20,
    RxFilterTypeEthLocal = 21,
    RxFilterTypeEthLocalVlan = 22,
    /// Firmware variant running the RX path.
    RxFwVariant = 23,
    /// Firmware variant running the TX path.
    TxFwVariant = 24,
}

impl Capability {
    /// Every capability, in ABI order.
    pub const ALL: [Capability; 25] = [
        Capability::Pio,
        Capability::PioBufferSize,
        Capability::PioBufferCount,
        Capability::HwMulticastLoopback,
        Capability::HwMulticastReplication,
        Capability::HwRxTimestamping,
        Capability::HwTxTimestamping,
        Capability::PackedStream,
        Capability::PackedStreamBufferSizes,
        Capability::Vports,
        Capability::PhysMode,
        Capability::BufferMode,
        Capability::MulticastFilterChaining,
        Capability::MacSpoofing,
        Capability::RxFilterTypeUdpLocal,
        Capability::RxFilterTypeTcpLocal,
        Capability::RxFilterTypeUdpFull,
        Capability::RxFilterTypeTcpFull,
        Capability::RxFilterTypeIpVlan,
        Capability::RxFilterTypeUdp6Local,
        Capability::RxFilterTypeTcp6Local,
        Capability::RxFilterTypeEthLocal,
        Capability::RxFilterTypeEthLocalVlan,
        Capability::RxFwVariant,
        Capability::TxFwVariant,
    ];

    /// Decode a raw capability number.
    pub fn from_u32(raw: u32) -> Option<Self> {
        Self::ALL.get(raw as usize).copied()
    }

    #[inline]
    pub const fn as_u32(self) -> u32 {
        self as u32
    }

    /// True for the receive filter type capabilities.
    pub const fn is_rx_filter_type(self) -> bool {
        matches!(
            self,
            Capability::RxFilterTypeUdpLocal
                | Capability::RxFilterTypeTcpLocal
                | Capability::RxFilterTypeUdpFull
                | Capability::RxFilterTypeTcpFull
                | Capability::RxFilterTypeIpVlan
                | Capability::RxFilterTypeUdp6Local
                | Capability::RxFilterTypeTcp6Local
                | Capability::RxFilterTypeEthLocal
                | Capability::RxFilterTypeEthLocalVlan
        )
    }
}
