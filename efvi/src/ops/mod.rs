//! Per-generation hardware operations.
//!
//! Every supported adapter generation provides one static, immutable
//! operations table. A VI is bound to exactly one table at construction and
//! never switches; all VIs of a generation share the same table.
//!
//! ```text
//!   Generation::Falcon ──> &FALCON_OPS ─┐
//!                                       ├──> &'static dyn GenerationOps
//!   Generation::Ef10   ──> &EF10_OPS  ──┘         (stored in Vi)
//! ```
//!
//! # Supported Devices
//! - Falcon: SFC4000 A/B
//! - EF10: SFC9120, SFC9140, SFC9220, SFC9250

pub mod ef10;
pub mod falcon;

use crate::capability::Capability;
use crate::codec::{BitField, FieldTable, Strictness};
use crate::driver::NicInfo;
use crate::error::{Error, Result};
use crate::event::Event;
use crate::state::InitFlags;
use crate::vi::Vi;

pub use ef10::EF10_OPS;
pub use falcon::FALCON_OPS;

/// PCI vendor ID of every supported adapter.
pub const SOLARFLARE_VENDOR_ID: u16 = 0x1924;

/// Write pointer field of the RX/TX doorbell registers.
pub const DESC_WPTR: BitField = BitField::new(0, 12);

/// Adapter hardware generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Generation {
    Falcon,
    Ef10,
}

impl Generation {
    /// Operations table for this generation.
    pub fn ops(self) -> &'static dyn GenerationOps {
        match self {
            Generation::Falcon => &FALCON_OPS,
            Generation::Ef10 => &EF10_OPS,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Generation::Falcon => "falcon",
            Generation::Ef10 => "ef10",
        }
    }

    /// PCI device IDs belonging to this generation.
    pub const fn supported_devices(self) -> &'static [u16] {
        match self {
            Generation::Falcon => &[0x0703, 0x0710],
            Generation::Ef10 => &[0x0903, 0x0923, 0x0a03, 0x0b03],
        }
    }

    /// Identify the generation from PCI IDs.
    ///
    /// # Returns
    /// `None` for foreign vendors and unknown devices.
    pub fn from_pci_ids(vendor: u16, device: u16) -> Option<Self> {
        if vendor != SOLARFLARE_VENDOR_ID {
            return None;
        }
        [Generation::Falcon, Generation::Ef10]
            .into_iter()
            .find(|g| g.supported_devices().contains(&device))
    }
}

/// Ring geometry and timer limits of a generation.
#[derive(Debug)]
pub struct Geometry {
    /// Permitted RX/TX ring entry counts.
    pub dmaq_sizes: &'static [u32],
    /// Permitted event-queue entry counts.
    pub evq_sizes: &'static [u32],
    /// Default timer tick in nanoseconds.
    pub timer_quantum_ns: u32,
    /// Timer count field of the timer register.
    pub timer_value: BitField,
    /// Packed-stream receive is available.
    pub packed_stream: bool,
}

impl Geometry {
    pub fn check_dmaq(&self, entries: u32) -> Result<()> {
        if entries == 0 || self.dmaq_sizes.contains(&entries) {
            Ok(())
        } else {
            Err(Error::InvalidRingSize(entries))
        }
    }

    pub fn check_evq(&self, entries: u32) -> Result<()> {
        if self.evq_sizes.contains(&entries) {
            Ok(())
        } else {
            Err(Error::InvalidRingSize(entries))
        }
    }
}

/// Register offsets inside the VI's register window.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RegisterMap {
    pub evq_rptr: usize,
    pub evq_timer: usize,
    pub rx_desc_upd: usize,
    pub tx_desc_upd: usize,
}

/// Hardware timer modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum TimerMode {
    Disabled = 0,
    /// Count down from now.
    ImmediateStart = 1,
    /// Count down once the next event arrives.
    TriggerStart = 2,
    /// Interrupt hold-off.
    IntHoldoff = 3,
}

/// Convert microseconds to timer ticks, rounding up and clamping to the
/// width of `value`.
pub fn usec_to_ticks(usec: u32, quantum_ns: u32, value: BitField) -> u32 {
    if quantum_ns == 0 {
        return 0;
    }
    let ticks = (usec as u64 * 1000).div_ceil(quantum_ns as u64);
    ticks.min(value.max_value()) as u32
}

/// Operations a hardware generation implements.
///
/// Implementations are stateless; all mutable state lives in the [`Vi`].
pub trait GenerationOps: Sync {
    fn generation(&self) -> Generation;

    fn geometry(&self) -> &'static Geometry;

    /// Record layouts used by this generation's codec.
    fn layouts(&self) -> &'static [FieldTable];

    /// Generation-specific VI setup: register map, RX prefix, timer quantum.
    ///
    /// Marks NIC. Layout tables are validated here in strict mode.
    fn init(&self, vi: &mut Vi);

    /// Hand the current read pointer to hardware so the next event wakes a
    /// sleeping consumer.
    fn eventq_prime(&self, vi: &mut Vi);

    /// Decode one raw event entry.
    ///
    /// # Returns
    /// `None` for entries consumed without producing an event.
    fn decode_event(&self, vi: &mut Vi, raw: [u32; 2]) -> Option<Event>;

    /// Drain up to `out.len()` events. Never blocks.
    fn eventq_poll(&self, vi: &mut Vi, out: &mut [Event]) -> usize {
        crate::evq::poll(self, vi, out)
    }

    /// Program the timer register.
    fn timer_write(&self, vi: &mut Vi, mode: TimerMode, ticks: u32);

    /// Arm the timer to start counting on the next event.
    fn timer_prime(&self, vi: &mut Vi, usec: u32) {
        vi.state.require(InitFlags::TIMER, vi.checks);
        let ticks = usec_to_ticks(usec, vi.timer_quantum_ns, self.geometry().timer_value);
        self.timer_write(vi, TimerMode::TriggerStart, ticks);
    }

    /// Start the timer now.
    fn timer_run(&self, vi: &mut Vi, usec: u32) {
        vi.state.require(InitFlags::TIMER, vi.checks);
        let ticks = usec_to_ticks(usec, vi.timer_quantum_ns, self.geometry().timer_value);
        self.timer_write(vi, TimerMode::ImmediateStart, ticks);
    }

    /// Disable the timer, cancelling any pending wake.
    fn timer_clear(&self, vi: &mut Vi) {
        vi.state.require(InitFlags::TIMER, vi.checks);
        self.timer_write(vi, TimerMode::Disabled, 0);
    }

    /// Reset the count to zero, leaving the timer armed.
    fn timer_zero(&self, vi: &mut Vi) {
        vi.state.require(InitFlags::TIMER, vi.checks);
        self.timer_write(vi, TimerMode::ImmediateStart, 0);
    }

    /// Build an RX descriptor.
    fn rx_desc(&self, addr: u64, len: u32, checks: Strictness) -> [u32; 2];

    /// Build a TX descriptor; `cont` marks a non-final fragment.
    fn tx_desc(&self, addr: u64, len: u32, cont: bool, checks: Strictness) -> [u32; 2];

    /// Publish newly posted RX descriptors.
    fn rx_doorbell(&self, vi: &Vi) {
        let mut w = [0u32; 1];
        DESC_WPTR.set(&mut w, vi.rxq.write_ptr() as u64, vi.checks);
        vi.io.write32(vi.regs.rx_desc_upd, w[0]);
    }

    /// Publish newly posted TX descriptors.
    fn tx_doorbell(&self, vi: &Vi) {
        let mut w = [0u32; 1];
        DESC_WPTR.set(&mut w, vi.txq.write_ptr() as u64, vi.checks);
        vi.io.write32(vi.regs.tx_desc_upd, w[0]);
    }

    /// Return consumed packed-stream credits to the adapter.
    fn packed_stream_credit_doorbell(&self, _vi: &Vi, _credits: u32) -> Result<()> {
        Err(Error::NotSupported)
    }

    /// Value of `cap` for `nic`, `None` if the hardware lacks it.
    fn capability(&self, nic: &NicInfo, cap: Capability) -> Option<u64>;
}

impl core::fmt::Debug for dyn GenerationOps {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GenerationOps")
            .field("generation", &self.generation())
            .finish()
    }
}
