//! EF10 (SFC9000 series) generation.
//!
//! Differences from Falcon:
//! - RX events batch descriptor completions (4-bit pointer low bits)
//! - read-pointer prime is two indirect writes
//! - packed-stream receive with credit flow control
//! - optional 14-byte RX prefix carrying the timestamp

pub mod event;
pub mod regs;
pub mod timer;

use crate::capability::Capability;
use crate::codec::{FieldTable, Strictness};
use crate::config::ViFlags;
use crate::driver::{NicFeatures, NicInfo};
use crate::error::Result;
use crate::event::Event;
use crate::ops::{Generation, GenerationOps, Geometry, RegisterMap, TimerMode};
use crate::state::InitFlags;
use crate::vi::Vi;

use regs::*;

/// Packed-stream buffer sizes the adapter accepts (bytes, or-ed).
pub const PS_BUFFER_SIZES: u64 = (1 << 16) | (1 << 20);

/// EF10 operations table.
pub struct Ef10Ops;

/// Shared instance bound into every EF10 VI.
pub static EF10_OPS: Ef10Ops = Ef10Ops;

static GEOMETRY: Geometry = Geometry {
    dmaq_sizes: &[512, 1024, 2048, 4096],
    evq_sizes: &[512, 1024, 2048, 4096, 8192, 16384],
    timer_quantum_ns: TIMER_QUANTUM_NS,
    timer_value: TIMER_VAL,
    packed_stream: true,
};

impl GenerationOps for Ef10Ops {
    fn generation(&self) -> Generation {
        Generation::Ef10
    }

    fn geometry(&self) -> &'static Geometry {
        &GEOMETRY
    }

    fn layouts(&self) -> &'static [FieldTable] {
        &LAYOUTS
    }

    fn init(&self, vi: &mut Vi) {
        for table in LAYOUTS.iter() {
            table.enforce(vi.checks);
        }
        vi.regs = RegisterMap {
            evq_rptr: EVQ_RPTR_REG,
            evq_timer: EVQ_TMR_REG,
            rx_desc_upd: RX_DESC_UPD_REG,
            tx_desc_upd: TX_DESC_UPD_REG,
        };
        vi.rx_prefix_len = if vi.config.flags.contains(ViFlags::RX_TIMESTAMPS) {
            RX_PREFIX_SIZE
        } else {
            0
        };
        vi.timer_quantum_ns = vi.config.timer_quantum_ns.unwrap_or(TIMER_QUANTUM_NS);
        vi.state.mark(InitFlags::NIC);
        log::debug!(
            "ef10: vi init, layout v{}, rx prefix {} bytes",
            LAYOUT_VERSION,
            vi.rx_prefix_len
        );
    }

    fn eventq_prime(&self, vi: &mut Vi) {
        timer::eventq_prime(vi);
    }

    fn decode_event(&self, vi: &mut Vi, raw: [u32; 2]) -> Option<Event> {
        event::decode(vi, raw)
    }

    fn timer_write(&self, vi: &mut Vi, mode: TimerMode, ticks: u32) {
        timer::write(vi, mode, ticks);
    }

    fn rx_desc(&self, addr: u64, len: u32, checks: Strictness) -> [u32; 2] {
        let mut d = [0u32; 2];
        RX_KER_BUF_ADDR.set(&mut d, addr, checks);
        RX_KER_BYTE_CNT.set(&mut d, len as u64, checks);
        d
    }

    fn tx_desc(&self, addr: u64, len: u32, cont: bool, checks: Strictness) -> [u32; 2] {
        let mut d = [0u32; 2];
        TX_KER_BUF_ADDR.set(&mut d, addr, checks);
        TX_KER_BYTE_CNT.set(&mut d, len as u64, checks);
        TX_KER_CONT.set(&mut d, cont as u64, checks);
        TX_KER_TYPE.set(&mut d, 0, checks);
        d
    }

    fn packed_stream_credit_doorbell(&self, vi: &Vi, credits: u32) -> Result<()> {
        let max = RX_DESC_MAGIC_DATA.max_value() as u32;
        let mut left = credits;
        while left > 0 {
            let chunk = left.min(max);
            let mut w = [0u32; 1];
            RX_DESC_MAGIC_DOORBELL.set(&mut w, 1, vi.checks);
            RX_DESC_MAGIC_CMD.set(&mut w, RX_DESC_MAGIC_CMD_PS_CREDITS, vi.checks);
            RX_DESC_MAGIC_DATA.set(&mut w, chunk as u64, vi.checks);
            vi.io.write32(vi.regs.rx_desc_upd, w[0]);
            left -= chunk;
        }
        Ok(())
    }

    fn capability(&self, nic: &NicInfo, cap: Capability) -> Option<u64> {
        let flag = |f: NicFeatures| nic.has(f).then_some(1);
        match cap {
            Capability::Pio => flag(NicFeatures::PIO),
            Capability::PioBufferSize => nic
                .has(NicFeatures::PIO)
                .then_some(nic.pio_buffer_size as u64),
            Capability::PioBufferCount => nic
                .has(NicFeatures::PIO)
                .then_some(nic.pio_buffer_count as u64),
            Capability::HwMulticastLoopback => flag(NicFeatures::MCAST_LOOPBACK),
            Capability::HwMulticastReplication => flag(NicFeatures::MCAST_REPLICATION),
            Capability::HwRxTimestamping => flag(NicFeatures::RX_TIMESTAMPS),
            Capability::HwTxTimestamping => flag(NicFeatures::TX_TIMESTAMPS),
            Capability::PackedStream => flag(NicFeatures::PACKED_STREAM),
            Capability::PackedStreamBufferSizes => nic
                .has(NicFeatures::PACKED_STREAM)
                .then_some(PS_BUFFER_SIZES),
            Capability::Vports => flag(NicFeatures::VPORTS),
            Capability::PhysMode | Capability::BufferMode => Some(1),
            Capability::MulticastFilterChaining => flag(NicFeatures::MCAST_FILTER_CHAINING),
            Capability::MacSpoofing => flag(NicFeatures::MAC_SPOOFING),
            Capability::RxFwVariant => Some(nic.rx_fw_variant as u64),
            Capability::TxFwVariant => Some(nic.tx_fw_variant as u64),
            c if c.is_rx_filter_type() => Some(1),
            _ => None,
        }
    }
}
