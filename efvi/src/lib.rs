//! User-space virtual interface (VI) core.
//!
//! Direct access to a NIC's descriptor rings and event queue from user space.
//! This crate is the hardware-abstraction layer underneath a kernel-bypass
//! transport: it decodes and builds firmware-defined bit-packed records and
//! drives the event queue and timer of one VI.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                          Vi (vi.rs)                             │
//! │   init state ─ rings ─ registers ─ timer ─ packed-stream credit │
//! ├───────────────────────────┬─────────────────────────────────────┤
//! │  &'static dyn             │  evq.rs                             │
//! │  GenerationOps            │  drain loop, torn-entry deferral    │
//! │   ├── Falcon              │                                     │
//! │   └── EF10                │                                     │
//! ├───────────────────────────┴─────────────────────────────────────┤
//! │  codec: BitField extract/insert, strictness checks, tables      │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use efvi::{Event, Generation, Vi, ViConfig, ViResources};
//!
//! let mut vi = Vi::open(Generation::Ef10.ops(), ViConfig::default(), resources)?;
//! vi.receive(buffer_addr, 0)?;
//!
//! let mut events = [Event::default(); 16];
//! loop {
//!     let n = vi.eventq_poll(&mut events);
//!     for ev in &events[..n] {
//!         // ...
//!     }
//! }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod addr;
pub mod capability;
pub mod codec;
pub mod config;
pub mod dma;
pub mod driver;
pub mod error;
pub mod event;
pub mod evq;
pub mod io;
pub mod ops;
pub mod packed_stream;
pub mod ring;
pub mod state;
pub mod vi;

pub use capability::Capability;
pub use codec::{BitField, Strictness};
pub use config::{ViConfig, ViFlags, ViResources};
pub use driver::{Driver, DriverHandle, NicFeatures, NicInfo, ProtectionDomain};
pub use error::{Error, Result};
pub use event::{DiscardReason, Event, RxFlags, TxErrorKind};
pub use ops::{Generation, GenerationOps};
pub use state::InitFlags;
pub use vi::Vi;
