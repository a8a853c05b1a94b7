//! The virtual interface: one queue set of one adapter.
//!
//! A [`Vi`] owns its rings, its register window and its bookkeeping. It is
//! bound to one generation's operations table at construction; every
//! hardware-specific step is delegated through that table.
//!
//! # Lifecycle
//! ```text
//!   Vi::new ─> init_io ─> init_rxq / init_txq ─> init_evq ─> init_timer
//!                                                   │
//!             receive / transmit / eventq_poll <────┘
//! ```
//! [`Vi::open`] runs the whole sequence from a [`ViConfig`] and the
//! driver-provided [`ViResources`].
//!
//! # Threading
//! Single owner, single poller. Nothing here blocks.

use crate::codec::Strictness;
use crate::config::{ViConfig, ViFlags, ViResources};
use crate::dma::DmaRegion;
use crate::error::{Error, Result};
use crate::event::Event;
use crate::evq::{EventRing, Slot};
use crate::io::barriers::wmb;
use crate::io::IoRegion;
use crate::ops::{Generation, GenerationOps, RegisterMap};
use crate::packed_stream::{self, PackedStreamCredit, PackedStreamPacket};
use crate::ring::DescriptorQueue;
use crate::state::{InitFlags, InitState};

/// Request id stored for TX fragments that are not the last of a packet.
pub const NO_REQUEST_ID: u32 = u32::MAX;

/// Largest batch an `RxMulti` event can report.
pub const RECEIVE_BATCH: usize = 15;

/// One virtual interface.
#[derive(Debug)]
pub struct Vi {
    pub(crate) ops: &'static dyn GenerationOps,
    pub(crate) config: ViConfig,
    pub(crate) checks: Strictness,
    pub(crate) state: InitState,
    pub(crate) io: IoRegion,
    pub(crate) rxq: DescriptorQueue,
    pub(crate) txq: DescriptorQueue,
    pub(crate) evq: EventRing,
    pub(crate) regs: RegisterMap,
    pub(crate) rx_prefix_len: u32,
    pub(crate) timer_quantum_ns: u32,
    pub(crate) ps: PackedStreamCredit,
    pub(crate) rx_ts_correction: i32,
    pub(crate) tx_ts_correction: i32,
    out_flags: ViFlags,
}

impl Vi {
    // ═══════════════════════════════════════════════════════════════════════
    // CONSTRUCTION
    // ═══════════════════════════════════════════════════════════════════════

    /// Bind a fresh VI to `ops`. Only NIC is initialized afterwards.
    pub fn new(ops: &'static dyn GenerationOps, config: ViConfig) -> Self {
        let mut vi = Self {
            ops,
            config,
            checks: config.strictness,
            state: InitState::new(),
            io: IoRegion::empty(),
            rxq: DescriptorQueue::empty(),
            txq: DescriptorQueue::empty(),
            evq: EventRing::empty(),
            regs: RegisterMap::default(),
            rx_prefix_len: 0,
            timer_quantum_ns: ops.geometry().timer_quantum_ns,
            ps: PackedStreamCredit::new(config.ps_credits),
            rx_ts_correction: 0,
            tx_ts_correction: 0,
            out_flags: ViFlags::empty(),
        };
        ops.init(&mut vi);
        vi
    }

    /// Build and fully initialize a VI.
    ///
    /// # Arguments
    /// - `ops`: generation operations table
    /// - `config`: ring sizes and features
    /// - `resources`: register window and ring memory from the driver
    ///
    /// # Returns
    /// - `Err(Error::InvalidRingSize)`: a ring size the generation rejects
    /// - `Err(Error::NotSupported)`: packed stream on a generation without it
    /// - `Err(Error::InvalidConfig)`: no RX or TX queue, or ring memory too small
    pub fn open(
        ops: &'static dyn GenerationOps,
        config: ViConfig,
        resources: ViResources,
    ) -> Result<Self> {
        let geometry = ops.geometry();
        geometry.check_dmaq(config.rxq_entries)?;
        geometry.check_dmaq(config.txq_entries)?;
        geometry.check_evq(config.evq_entries)?;
        if config.rxq_entries == 0 && config.txq_entries == 0 {
            return Err(Error::InvalidConfig("VI needs an RX or TX queue"));
        }
        if config.packed_stream() && (!geometry.packed_stream || config.rxq_entries == 0) {
            return Err(Error::NotSupported);
        }

        let ViResources { io, rxq, txq, evq } = resources;
        let mut vi = Self::new(ops, config);
        vi.init_io(io);
        if config.rxq_entries > 0 {
            vi.init_rxq(rxq, config.rxq_entries)?;
        }
        if config.txq_entries > 0 {
            vi.init_txq(txq, config.txq_entries)?;
        }
        vi.init_evq(evq, config.evq_entries)?;
        vi.init_timer();
        if config.flags.contains(ViFlags::RX_TIMESTAMPS) && config.rxq_entries > 0 {
            vi.init_rx_timestamping(config.rx_ts_correction);
        }
        if config.flags.contains(ViFlags::TX_TIMESTAMPS) && config.txq_entries > 0 {
            vi.init_tx_timestamping(config.tx_ts_correction);
        }
        vi.init_out_flags(config.flags);

        log::debug!(
            "vi: opened {} rxq={} txq={} evq={}",
            ops.generation().name(),
            config.rxq_entries,
            config.txq_entries,
            config.evq_entries
        );
        Ok(vi)
    }

    /// Attach the register window.
    pub fn init_io(&mut self, io: IoRegion) {
        self.state.require(InitFlags::NIC, self.checks);
        self.io = io;
        self.state.mark(InitFlags::IO);
    }

    /// Attach the RX descriptor ring.
    pub fn init_rxq(&mut self, ring: DmaRegion, entries: u32) -> Result<()> {
        self.state.require(InitFlags::IO, self.checks);
        self.ops.geometry().check_dmaq(entries)?;
        self.rxq = DescriptorQueue::new(ring, entries)?;
        self.state.mark(InitFlags::RXQ);
        log::debug!("vi: rxq {} entries", entries);
        Ok(())
    }

    /// Attach the TX descriptor ring.
    pub fn init_txq(&mut self, ring: DmaRegion, entries: u32) -> Result<()> {
        self.state.require(InitFlags::IO, self.checks);
        self.ops.geometry().check_dmaq(entries)?;
        self.txq = DescriptorQueue::new(ring, entries)?;
        self.state.mark(InitFlags::TXQ);
        log::debug!("vi: txq {} entries", entries);
        Ok(())
    }

    /// Attach the event queue ring and mark every entry empty.
    pub fn init_evq(&mut self, ring: DmaRegion, entries: u32) -> Result<()> {
        self.state
            .require_any(InitFlags::RXQ | InitFlags::TXQ, self.checks);
        self.ops.geometry().check_evq(entries)?;
        self.evq = EventRing::new(ring, entries)?;
        self.state.mark(InitFlags::EVQ);
        log::debug!("vi: evq {} entries", entries);
        Ok(())
    }

    pub fn init_timer(&mut self) {
        self.state.require(InitFlags::EVQ, self.checks);
        self.state.mark(InitFlags::TIMER);
    }

    /// Enable RX timestamps; `correction` is added to every raw stamp.
    pub fn init_rx_timestamping(&mut self, correction: i32) {
        self.state.require(InitFlags::RXQ, self.checks);
        self.rx_ts_correction = correction;
        self.state.mark(InitFlags::RX_TIMESTAMPING);
    }

    /// Enable TX timestamps; `correction` is added to every raw stamp.
    pub fn init_tx_timestamping(&mut self, correction: i32) {
        self.state.require(InitFlags::TXQ, self.checks);
        self.tx_ts_correction = correction;
        self.state.mark(InitFlags::TX_TIMESTAMPING);
    }

    /// Record the features actually granted to this VI.
    pub fn init_out_flags(&mut self, flags: ViFlags) {
        self.state.require(InitFlags::NIC, self.checks);
        self.out_flags = flags;
        self.state.mark(InitFlags::OUT_FLAGS);
    }

    // ═══════════════════════════════════════════════════════════════════════
    // ACCESSORS
    // ═══════════════════════════════════════════════════════════════════════

    pub fn generation(&self) -> Generation {
        self.ops.generation()
    }

    pub fn ops(&self) -> &'static dyn GenerationOps {
        self.ops
    }

    pub fn config(&self) -> &ViConfig {
        &self.config
    }

    pub fn strictness(&self) -> Strictness {
        self.checks
    }

    pub fn init_flags(&self) -> InitFlags {
        self.state.flags()
    }

    pub fn out_flags(&self) -> ViFlags {
        self.out_flags
    }

    /// Bytes of metadata the adapter writes ahead of each received packet.
    pub fn rx_prefix_len(&self) -> u32 {
        self.rx_prefix_len
    }

    pub fn timer_quantum_ns(&self) -> u32 {
        self.timer_quantum_ns
    }

    pub fn rx_ts_correction(&self) -> i32 {
        self.rx_ts_correction
    }

    pub fn tx_ts_correction(&self) -> i32 {
        self.tx_ts_correction
    }

    pub fn io(&self) -> &IoRegion {
        &self.io
    }

    pub fn rxq(&self) -> &DescriptorQueue {
        &self.rxq
    }

    pub fn txq(&self) -> &DescriptorQueue {
        &self.txq
    }

    pub fn evq(&self) -> &EventRing {
        &self.evq
    }

    // ═══════════════════════════════════════════════════════════════════════
    // RECEIVE
    // ═══════════════════════════════════════════════════════════════════════

    /// Queue an RX buffer without telling the adapter.
    ///
    /// # Returns
    /// - `Err(Error::QueueFull)`: no free descriptor
    /// - `Err(Error::NoCredit)`: packed stream with credits exhausted
    pub fn receive_init(&mut self, addr: u64, id: u32) -> Result<()> {
        self.state.require(InitFlags::RXQ, self.checks);
        let len = if self.config.packed_stream() {
            if !self.ps.can_post() {
                return Err(Error::NoCredit);
            }
            0
        } else {
            self.config.rx_buf_len
        };
        let desc = self.ops.rx_desc(addr, len, self.checks);
        self.rxq.post(desc, id)
    }

    /// Publish queued RX buffers to the adapter.
    pub fn receive_push(&mut self) {
        self.state.require(InitFlags::RXQ, self.checks);
        wmb();
        self.ops.rx_doorbell(self);
    }

    /// Queue and publish one RX buffer.
    pub fn receive(&mut self, addr: u64, id: u32) -> Result<()> {
        self.receive_init(addr, id)?;
        self.receive_push();
        Ok(())
    }

    /// Buffer ids completed by an RX event.
    ///
    /// Call before reposting buffers: the ids of an `RxMulti` batch live in
    /// ring slots that new posts overwrite.
    ///
    /// # Returns
    /// Number of ids written to `ids`.
    pub fn receive_unbundle(&self, ev: &Event, ids: &mut [u32]) -> usize {
        match *ev {
            Event::RxMulti { first, n_descs, .. } => {
                self.checks.assert(
                    ids.len() >= n_descs as usize,
                    format_args!("unbundle buffer holds {} of {} ids", ids.len(), n_descs),
                );
                let n = (n_descs as usize).min(ids.len());
                for (i, slot) in ids[..n].iter_mut().enumerate() {
                    *slot = self.rxq.id_at(first.wrapping_add(i as u32));
                }
                n
            }
            Event::Rx { rq_id, .. } | Event::RxDiscard { rq_id, .. } => match ids.first_mut() {
                Some(slot) => {
                    *slot = rq_id;
                    1
                }
                None => 0,
            },
            _ => 0,
        }
    }

    pub fn receive_fill_level(&self) -> u32 {
        self.rxq.fill_level()
    }

    pub fn receive_space(&self) -> u32 {
        self.rxq.space()
    }

    pub fn receive_capacity(&self) -> u32 {
        self.rxq.mask()
    }

    // ═══════════════════════════════════════════════════════════════════════
    // TRANSMIT
    // ═══════════════════════════════════════════════════════════════════════

    /// Queue one single-buffer packet without telling the adapter.
    pub fn transmit_init(&mut self, addr: u64, len: u32, id: u32) -> Result<()> {
        self.state.require(InitFlags::TXQ, self.checks);
        let desc = self.ops.tx_desc(addr, len, false, self.checks);
        self.txq.post(desc, id)
    }

    /// Queue one packet spread over several buffers.
    ///
    /// Only the last fragment carries `id`; all-or-nothing on queue space.
    pub fn transmitv_init(&mut self, frags: &[(u64, u32)], id: u32) -> Result<()> {
        self.state.require(InitFlags::TXQ, self.checks);
        if frags.is_empty() {
            return Err(Error::InvalidConfig("packet has no fragments"));
        }
        if (self.txq.space() as usize) < frags.len() {
            return Err(Error::QueueFull);
        }
        let last = frags.len() - 1;
        for (i, &(addr, len)) in frags.iter().enumerate() {
            let cont = i != last;
            let desc = self.ops.tx_desc(addr, len, cont, self.checks);
            self.txq.post(desc, if cont { NO_REQUEST_ID } else { id })?;
        }
        Ok(())
    }

    /// Publish queued TX descriptors to the adapter.
    pub fn transmit_push(&mut self) {
        self.state.require(InitFlags::TXQ, self.checks);
        wmb();
        self.ops.tx_doorbell(self);
    }

    /// Queue and publish one packet.
    pub fn transmit(&mut self, addr: u64, len: u32, id: u32) -> Result<()> {
        self.transmit_init(addr, len, id)?;
        self.transmit_push();
        Ok(())
    }

    /// Retire the TX descriptors a `Tx` or `TxError` event completed.
    ///
    /// # Returns
    /// Number of packet ids written to `ids`. If `ids` fills up, call again
    /// with the same event to collect the rest.
    pub fn transmit_unbundle(&mut self, ev: &Event, ids: &mut [u32]) -> usize {
        let desc_id = match *ev {
            Event::Tx { desc_id, .. } | Event::TxError { desc_id, .. } => desc_id,
            _ => return 0,
        };
        let mask = self.txq.mask();
        let mut n = 0;
        while n < ids.len() && self.txq.removed() & mask != desc_id {
            let Some(id) = self.txq.complete_one() else {
                break;
            };
            if id != NO_REQUEST_ID {
                ids[n] = id;
                n += 1;
            }
        }
        n
    }

    pub fn transmit_fill_level(&self) -> u32 {
        self.txq.fill_level()
    }

    pub fn transmit_space(&self) -> u32 {
        self.txq.space()
    }

    // ═══════════════════════════════════════════════════════════════════════
    // EVENT QUEUE & TIMER
    // ═══════════════════════════════════════════════════════════════════════

    /// Drain up to `out.len()` events. Returns immediately.
    pub fn eventq_poll(&mut self, out: &mut [Event]) -> usize {
        let ops = self.ops;
        ops.eventq_poll(self, out)
    }

    /// Arm the event queue wakeup.
    pub fn eventq_prime(&mut self) {
        let ops = self.ops;
        ops.eventq_prime(self);
    }

    /// An event is ready to be polled.
    pub fn eventq_has_event(&self) -> bool {
        self.state.require(InitFlags::EVQ, self.checks);
        matches!(self.evq.peek(), Slot::Present(_))
    }

    /// At least `n` events are ready.
    pub fn eventq_has_many_events(&self, n: u32) -> bool {
        self.state.require(InitFlags::EVQ, self.checks);
        n == 0 || self.evq.is_written_ahead(n - 1)
    }

    pub fn eventq_capacity(&self) -> u32 {
        self.evq.entries()
    }

    pub fn timer_prime(&mut self, usec: u32) {
        let ops = self.ops;
        ops.timer_prime(self, usec);
    }

    pub fn timer_run(&mut self, usec: u32) {
        let ops = self.ops;
        ops.timer_run(self, usec);
    }

    pub fn timer_clear(&mut self) {
        let ops = self.ops;
        ops.timer_clear(self);
    }

    pub fn timer_zero(&mut self) {
        let ops = self.ops;
        ops.timer_zero(self);
    }

    // ═══════════════════════════════════════════════════════════════════════
    // PACKED STREAM
    // ═══════════════════════════════════════════════════════════════════════

    pub fn packed_stream_credits(&self) -> u32 {
        self.ps.credits()
    }

    /// Spend credits for buffer space consumed since the last call and report
    /// them to the adapter. Nothing is spent unless the doorbell write
    /// succeeds.
    ///
    /// # Returns
    /// Credits spent by this call, or `NotSupported` outside packed-stream
    /// mode.
    pub fn packed_stream_update_credit(&mut self) -> Result<u32> {
        self.state.require(InitFlags::RXQ, self.checks);
        self.require_packed_stream()?;
        let crossed = self.ps.pending();
        if crossed > 0 {
            let ops = self.ops;
            ops.packed_stream_credit_doorbell(self, crossed)?;
        }
        self.ps.update_credit();
        if crossed > 0 {
            log::trace!("vi: spent {} ps credits, {} left", crossed, self.ps.credits());
        }
        Ok(crossed)
    }

    /// Credits handed back by the adapter.
    pub fn packed_stream_replenish(&mut self, credits: u32) -> Result<()> {
        self.state.require(InitFlags::RXQ, self.checks);
        self.require_packed_stream()?;
        self.ps.replenish(credits);
        Ok(())
    }

    /// Unpack the packet at `dma_offset` in a packed-stream buffer and account
    /// for the space it used.
    pub fn packed_stream_unpack(
        &mut self,
        buffer: &mut [u8],
        dma_offset: usize,
    ) -> Result<(PackedStreamPacket, usize)> {
        self.state.require(InitFlags::RXQ, self.checks);
        self.require_packed_stream()?;
        let (pkt, next) =
            packed_stream::unpack(buffer, dma_offset, self.rx_ts_correction, self.checks)?;
        self.ps.consume(next - dma_offset);
        Ok((pkt, next))
    }

    fn require_packed_stream(&self) -> Result<()> {
        if self.config.packed_stream() {
            Ok(())
        } else {
            Err(Error::NotSupported)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::{EF10_OPS, FALCON_OPS};

    fn config(strictness: Strictness) -> ViConfig {
        ViConfig {
            rxq_entries: 512,
            txq_entries: 512,
            evq_entries: 1024,
            ..ViConfig::default()
        }
        .with_strictness(strictness)
    }

    fn open(ops: &'static dyn GenerationOps, config: ViConfig) -> Vi {
        let res = ViResources::alloc(&config).unwrap();
        Vi::open(ops, config, res).unwrap()
    }

    // ==================== Init State ====================

    #[test]
    fn test_new_marks_nic_only() {
        let vi = Vi::new(&EF10_OPS, config(Strictness::Strict));
        assert_eq!(vi.init_flags(), InitFlags::NIC);
    }

    #[test]
    fn test_open_runs_full_sequence() {
        let cfg = config(Strictness::Strict).with_flags(ViFlags::RX_TIMESTAMPS);
        let vi = open(&EF10_OPS, cfg);
        let flags = vi.init_flags();
        for f in [
            InitFlags::NIC,
            InitFlags::IO,
            InitFlags::RXQ,
            InitFlags::TXQ,
            InitFlags::EVQ,
            InitFlags::TIMER,
            InitFlags::RX_TIMESTAMPING,
            InitFlags::OUT_FLAGS,
        ] {
            assert!(flags.contains(f), "missing {:?}", f);
        }
        assert!(!flags.contains(InitFlags::TX_TIMESTAMPING));
        assert_eq!(vi.rx_prefix_len(), 14);
    }

    #[test]
    #[should_panic(expected = "VI not initialized")]
    fn test_poll_before_evq_panics_in_strict_mode() {
        let mut vi = Vi::new(&EF10_OPS, config(Strictness::Strict));
        let mut out = [Event::default(); 4];
        vi.eventq_poll(&mut out);
    }

    #[test]
    fn test_poll_before_evq_is_noop_in_production() {
        let mut vi = Vi::new(&EF10_OPS, config(Strictness::Production));
        let mut out = [Event::default(); 4];
        assert_eq!(vi.eventq_poll(&mut out), 0);
        vi.eventq_prime();
        vi.timer_prime(10);
        assert_eq!(vi.receive_init(0x1000, 1), Err(Error::QueueFull));
    }

    #[test]
    #[should_panic(expected = "VI not initialized")]
    fn test_timer_requires_timer_flag() {
        let mut vi = Vi::new(&FALCON_OPS, config(Strictness::Strict));
        vi.timer_run(5);
    }

    // ==================== Open Validation ====================

    #[test]
    fn test_open_rejects_bad_ring_size() {
        let cfg = ViConfig { rxq_entries: 100, ..config(Strictness::Strict) };
        let res = ViResources::alloc(&config(Strictness::Strict)).unwrap();
        assert_eq!(
            Vi::open(&EF10_OPS, cfg, res).unwrap_err(),
            Error::InvalidRingSize(100)
        );
    }

    #[test]
    fn test_open_rejects_packed_stream_on_falcon() {
        let cfg = config(Strictness::Strict).with_flags(ViFlags::RX_PACKED_STREAM);
        let res = ViResources::alloc(&cfg).unwrap();
        assert_eq!(Vi::open(&FALCON_OPS, cfg, res).unwrap_err(), Error::NotSupported);
    }

    #[test]
    fn test_open_requires_a_queue() {
        let cfg = ViConfig { rxq_entries: 0, txq_entries: 0, ..config(Strictness::Strict) };
        let res = ViResources::alloc(&cfg).unwrap();
        assert!(matches!(
            Vi::open(&EF10_OPS, cfg, res),
            Err(Error::InvalidConfig(_))
        ));
    }

    // ==================== Polling ====================

    #[test]
    fn test_empty_ring_poll_is_idempotent() {
        let mut vi = open(&FALCON_OPS, config(Strictness::Strict));
        let mut out = [Event::default(); 8];
        for _ in 0..3 {
            assert_eq!(vi.eventq_poll(&mut out), 0);
        }
        assert!(!vi.eventq_has_event());
        assert_eq!(vi.evq().read_ptr(), 0);
    }

    #[test]
    fn test_poll_with_empty_output_buffer() {
        let mut vi = open(&EF10_OPS, config(Strictness::Strict));
        vi.evq().ring().write_words(0, [0, 7 << 28]);
        assert_eq!(vi.eventq_poll(&mut []), 0);
        assert!(vi.eventq_has_event());
    }

    #[test]
    fn test_many_events_bounded_by_ring_size() {
        let mut vi = open(&EF10_OPS, config(Strictness::Strict));
        vi.evq().ring().write_words(0, [0, 7 << 28]);
        assert!(vi.eventq_has_many_events(1));
        assert!(!vi.eventq_has_many_events(2));
        assert!(!vi.eventq_has_many_events(vi.eventq_capacity() + 1));
        assert!(!vi.eventq_has_many_events(u32::MAX));
    }

    // ==================== Packed Stream ====================

    /// A Falcon VI with packed stream requested, built by hand since `open`
    /// refuses it. Its credit doorbell always fails.
    fn falcon_packed_stream(credits: u32) -> Vi {
        let mut cfg = config(Strictness::Strict).with_flags(ViFlags::RX_PACKED_STREAM);
        cfg.ps_credits = credits;
        let res = ViResources::alloc(&cfg).unwrap();
        let mut vi = Vi::new(&FALCON_OPS, cfg);
        vi.init_io(res.io);
        vi.init_rxq(res.rxq, cfg.rxq_entries).unwrap();
        vi
    }

    fn write_prefix(buf: &mut [u8], at: usize, cap: u16) {
        buf[at + 4..at + 6].copy_from_slice(&cap.to_le_bytes());
        buf[at + 6..at + 8].copy_from_slice(&cap.to_le_bytes());
    }

    #[test]
    fn test_packed_stream_calls_need_packed_stream_mode() {
        let mut cfg = config(Strictness::Strict);
        cfg.ps_credits = 5;
        let mut vi = open(&FALCON_OPS, cfg);
        let mut buf = alloc::vec![0u8; 4096];
        write_prefix(&mut buf, packed_stream::PS_DMA_START_OFFSET, 100);

        assert_eq!(
            vi.packed_stream_unpack(&mut buf, packed_stream::PS_DMA_START_OFFSET),
            Err(Error::NotSupported)
        );
        assert_eq!(vi.packed_stream_update_credit(), Err(Error::NotSupported));
        assert_eq!(vi.packed_stream_replenish(3), Err(Error::NotSupported));
        assert_eq!(vi.packed_stream_credits(), 5);
        assert_eq!(vi.ps.position(), 0);
    }

    #[test]
    fn test_failed_doorbell_spends_nothing() {
        let mut vi = falcon_packed_stream(5);
        let mut buf = alloc::vec![0u8; 2 * packed_stream::PS_SPACE_PER_CREDIT];
        let mut off = packed_stream::PS_DMA_START_OFFSET;
        for _ in 0..2 {
            write_prefix(&mut buf, off, 60000);
            off = vi.packed_stream_unpack(&mut buf, off).unwrap().1;
        }
        for _ in 0..2 {
            assert_eq!(vi.packed_stream_update_credit(), Err(Error::NotSupported));
            assert_eq!(vi.packed_stream_credits(), 5);
            assert_eq!(vi.ps.pending(), 1);
        }
    }

    #[test]
    #[should_panic(expected = "VI not initialized")]
    fn test_replenish_requires_rxq() {
        let cfg = config(Strictness::Strict).with_flags(ViFlags::RX_PACKED_STREAM);
        let mut vi = Vi::new(&EF10_OPS, cfg);
        let _ = vi.packed_stream_replenish(1);
    }

    #[test]
    #[should_panic(expected = "VI not initialized")]
    fn test_unpack_requires_rxq() {
        let cfg = config(Strictness::Strict).with_flags(ViFlags::RX_PACKED_STREAM);
        let mut vi = Vi::new(&EF10_OPS, cfg);
        let mut buf = alloc::vec![0u8; 4096];
        let _ = vi.packed_stream_unpack(&mut buf, packed_stream::PS_DMA_START_OFFSET);
    }

    // ==================== Transmit ====================

    #[test]
    fn test_transmitv_tags_last_fragment() {
        let mut vi = open(&EF10_OPS, config(Strictness::Strict));
        vi.transmitv_init(&[(0x1000, 100), (0x2000, 50)], 7).unwrap();
        assert_eq!(vi.transmit_fill_level(), 2);

        let ev = Event::Tx { q_id: 0, desc_id: 2 };
        let mut ids = [0u32; 4];
        assert_eq!(vi.transmit_unbundle(&ev, &mut ids), 1);
        assert_eq!(ids[0], 7);
        assert_eq!(vi.transmit_fill_level(), 0);
    }

    #[test]
    fn test_transmitv_all_or_nothing() {
        let cfg = ViConfig { txq_entries: 512, ..config(Strictness::Strict) };
        let mut vi = open(&EF10_OPS, cfg);
        let frags = [(0u64, 1u32); 600];
        assert_eq!(vi.transmitv_init(&frags, 1), Err(Error::QueueFull));
        assert_eq!(vi.transmit_fill_level(), 0);
    }
}
