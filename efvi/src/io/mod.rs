//! Register window and ordering primitives.
//!
//! These are the fundamental building blocks the generation ops use to talk
//! to the adapter.

pub mod barriers;
pub mod mmio;

pub use mmio::IoRegion;
