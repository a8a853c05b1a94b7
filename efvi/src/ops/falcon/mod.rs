//! Falcon (SFC4000) generation.
//!
//! One event per completed RX descriptor, single-write read-pointer prime,
//! no packed stream and no RX prefix.

pub mod event;
pub mod regs;
pub mod timer;

use crate::capability::Capability;
use crate::codec::{FieldTable, Strictness};
use crate::driver::NicInfo;
use crate::event::Event;
use crate::ops::{Generation, GenerationOps, Geometry, RegisterMap, TimerMode};
use crate::state::InitFlags;
use crate::vi::Vi;

use regs::*;

/// Falcon operations table.
pub struct FalconOps;

/// Shared instance bound into every Falcon VI.
pub static FALCON_OPS: FalconOps = FalconOps;

static GEOMETRY: Geometry = Geometry {
    dmaq_sizes: &[512, 1024, 2048, 4096],
    evq_sizes: &[512, 1024, 2048, 4096, 8192, 16384, 32768],
    timer_quantum_ns: TIMER_QUANTUM_NS,
    timer_value: TIMER_VAL,
    packed_stream: false,
};

impl GenerationOps for FalconOps {
    fn generation(&self) -> Generation {
        Generation::Falcon
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
            evq_timer: TIMER_CMD_REG,
            rx_desc_upd: RX_DESC_UPD_REG,
            tx_desc_upd: TX_DESC_UPD_REG,
        };
        vi.rx_prefix_len = 0;
        vi.timer_quantum_ns = vi.config.timer_quantum_ns.unwrap_or(TIMER_QUANTUM_NS);
        vi.state.mark(InitFlags::NIC);
        log::debug!("falcon: vi init, layout v{}", LAYOUT_VERSION);
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
        RX_KER_BUF_SIZE.set(&mut d, len as u64, checks);
        d
    }

    fn tx_desc(&self, addr: u64, len: u32, cont: bool, checks: Strictness) -> [u32; 2] {
        let mut d = [0u32; 2];
        TX_KER_BUF_ADDR.set(&mut d, addr, checks);
        TX_KER_BYTE_COUNT.set(&mut d, len as u64, checks);
        TX_KER_CONT.set(&mut d, cont as u64, checks);
        d
    }

    fn capability(&self, _nic: &NicInfo, cap: Capability) -> Option<u64> {
        match cap {
            Capability::PhysMode | Capability::BufferMode => Some(1),
            Capability::RxFilterTypeUdpLocal
            | Capability::RxFilterTypeTcpLocal
            | Capability::RxFilterTypeUdpFull
            | Capability::RxFilterTypeTcpFull => Some(1),
            _ => None,
        }
    }
}
