//! VI configuration and the resources handed over by the driver.

use crate::codec::Strictness;
use crate::dma::DmaRegion;
use crate::io::IoRegion;

bitflags::bitflags! {
    /// Optional VI features requested at open time.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
    pub struct ViFlags: u32 {
        /// RX ring carries packed-stream buffers instead of one packet per buffer.
        const RX_PACKED_STREAM = 1 << 0;
        /// Hardware timestamps on received packets.
        const RX_TIMESTAMPS    = 1 << 1;
        /// Hardware timestamps on transmit completions.
        const TX_TIMESTAMPS    = 1 << 2;
        /// Never push descriptors inline through the doorbell.
        const TX_PUSH_DISABLE  = 1 << 3;
    }
}

/// Default RX buffer length.
pub const DEFAULT_RX_BUF_LEN: u32 = 2048;

/// Default ring entry count.
pub const DEFAULT_RING_ENTRIES: u32 = 512;

/// Per-VI configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViConfig {
    /// RX descriptor ring entries, zero for no RX queue.
    pub rxq_entries: u32,
    /// TX descriptor ring entries, zero for no TX queue.
    pub txq_entries: u32,
    /// Event-queue entries.
    pub evq_entries: u32,
    /// Bytes per RX buffer.
    pub rx_buf_len: u32,
    /// Timer tick in nanoseconds; `None` uses the generation default.
    pub timer_quantum_ns: Option<u32>,
    pub flags: ViFlags,
    /// Packed-stream credits granted at open.
    pub ps_credits: u32,
    /// Added to raw RX timestamps, in ticks.
    pub rx_ts_correction: i32,
    /// Added to raw TX timestamps, in ticks.
    pub tx_ts_correction: i32,
    pub strictness: Strictness,
}

impl Default for ViConfig {
    fn default() -> Self {
        Self {
            rxq_entries: DEFAULT_RING_ENTRIES,
            txq_entries: DEFAULT_RING_ENTRIES,
            evq_entries: DEFAULT_RING_ENTRIES * 2,
            rx_buf_len: DEFAULT_RX_BUF_LEN,
            timer_quantum_ns: None,
            flags: ViFlags::empty(),
            ps_credits: 0,
            rx_ts_correction: 0,
            tx_ts_correction: 0,
            strictness: Strictness::default(),
        }
    }
}

impl ViConfig {
    /// Builder-style flag setter.
    pub fn with_flags(mut self, flags: ViFlags) -> Self {
        self.flags |= flags;
        self
    }

    /// Builder-style strictness setter.
    pub fn with_strictness(mut self, strictness: Strictness) -> Self {
        self.strictness = strictness;
        self
    }

    #[inline]
    pub fn packed_stream(&self) -> bool {
        self.flags.contains(ViFlags::RX_PACKED_STREAM)
    }
}

/// Memory the driver maps for one VI.
#[derive(Debug)]
pub struct ViResources {
    /// Doorbell and timer registers.
    pub io: IoRegion,
    pub rxq: DmaRegion,
    pub txq: DmaRegion,
    pub evq: DmaRegion,
}

impl ViResources {
    /// Heap-backed resources sized for `config`, for host-memory operation.
    pub fn alloc(config: &ViConfig) -> Option<Self> {
        let desc = crate::ring::DESC_SIZE;
        Some(Self {
            io: IoRegion::alloc(crate::io::mmio::IO_PAGE_SIZE)?,
            rxq: DmaRegion::alloc_zeroed(config.rxq_entries as usize * desc)?,
            txq: DmaRegion::alloc_zeroed(config.txq_entries as usize * desc)?,
            evq: DmaRegion::alloc_zeroed(config.evq_entries as usize * crate::evq::EVENT_SIZE)?,
        })
    }
}
