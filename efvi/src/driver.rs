//! Driver handles, protection domains and capability queries.
//!
//! The driver owns the list of adapters and a table of open handles.
//! Protection domains are allocated against one adapter and belong to the
//! handle that allocated them. Capability queries go through a domain so the
//! answer reflects the adapter the caller will actually use.
//!
//! ```text
//!   Driver
//!    ├── nics: [NicInfo, ...]
//!    └── table (spin::Mutex)
//!         ├── open handles
//!         └── protection domains ─> (owner handle, nic index)
//! ```

use alloc::vec::Vec;
use spin::Mutex;

use crate::capability::Capability;
use crate::error::{Error, Result};
use crate::ops::Generation;

bitflags::bitflags! {
    /// Firmware and board features of one adapter.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
    pub struct NicFeatures: u32 {
        const PIO                   = 1 << 0;
        const PACKED_STREAM         = 1 << 1;
        const RX_TIMESTAMPS         = 1 << 2;
        const TX_TIMESTAMPS         = 1 << 3;
        const MCAST_LOOPBACK        = 1 << 4;
        const MCAST_REPLICATION     = 1 << 5;
        const VPORTS                = 1 << 6;
        const MCAST_FILTER_CHAINING = 1 << 7;
        const MAC_SPOOFING          = 1 << 8;
    }
}

/// Description of one adapter as reported by the kernel driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NicInfo {
    pub generation: Generation,
    /// Architecture revision within the generation.
    pub revision: u8,
    pub features: NicFeatures,
    pub pio_buffer_size: u32,
    pub pio_buffer_count: u32,
    pub rx_fw_variant: u32,
    pub tx_fw_variant: u32,
}

impl NicInfo {
    /// Adapter of `generation` with no optional features.
    pub const fn new(generation: Generation) -> Self {
        Self {
            generation,
            revision: 0,
            features: NicFeatures::empty(),
            pio_buffer_size: 0,
            pio_buffer_count: 0,
            rx_fw_variant: 0,
            tx_fw_variant: 0,
        }
    }

    pub const fn with_features(mut self, features: NicFeatures) -> Self {
        self.features = features;
        self
    }

    pub const fn with_pio(mut self, size: u32, count: u32) -> Self {
        self.pio_buffer_size = size;
        self.pio_buffer_count = count;
        self
    }

    pub fn has(&self, feature: NicFeatures) -> bool {
        self.features.contains(feature)
    }
}

/// Handle of an open driver session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DriverHandle(u32);

impl DriverHandle {
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// Protection domain: the DMA address space VIs of one adapter share.
#[derive(Debug, PartialEq, Eq)]
pub struct ProtectionDomain {
    id: u32,
    nic_index: usize,
}

impl ProtectionDomain {
    #[inline]
    pub fn id(&self) -> u32 {
        self.id
    }

    #[inline]
    pub fn nic_index(&self) -> usize {
        self.nic_index
    }
}

#[derive(Debug, Clone, Copy)]
struct PdEntry {
    id: u32,
    owner: DriverHandle,
}

#[derive(Debug, Default)]
struct HandleTable {
    next_handle: u32,
    next_pd: u32,
    open: Vec<DriverHandle>,
    pds: Vec<PdEntry>,
}

impl HandleTable {
    fn is_open(&self, dh: DriverHandle) -> bool {
        self.open.contains(&dh)
    }

    fn owns_pd(&self, dh: DriverHandle, pd: &ProtectionDomain) -> bool {
        self.pds.iter().any(|e| e.id == pd.id && e.owner == dh)
    }
}

/// User-space view of the kernel driver.
#[derive(Debug)]
pub struct Driver {
    nics: Vec<NicInfo>,
    table: Mutex<HandleTable>,
}

impl Driver {
    pub fn new(nics: Vec<NicInfo>) -> Self {
        Self {
            nics,
            table: Mutex::new(HandleTable::default()),
        }
    }

    pub fn nics(&self) -> &[NicInfo] {
        &self.nics
    }

    /// Open a driver session.
    pub fn open(&self) -> DriverHandle {
        let mut t = self.table.lock();
        t.next_handle = t.next_handle.wrapping_add(1);
        let dh = DriverHandle(t.next_handle);
        t.open.push(dh);
        log::debug!("driver: opened handle {}", dh.0);
        dh
    }

    /// Close a session and release every protection domain it owns.
    pub fn close(&self, dh: DriverHandle) -> Result<()> {
        let mut t = self.table.lock();
        if !t.is_open(dh) {
            return Err(Error::InvalidHandle);
        }
        t.open.retain(|&h| h != dh);
        t.pds.retain(|e| e.owner != dh);
        log::debug!("driver: closed handle {}", dh.0);
        Ok(())
    }

    /// Allocate a protection domain on adapter `nic_index`.
    ///
    /// # Returns
    /// - `Err(Error::InvalidHandle)`: `dh` is not open
    /// - `Err(Error::NotFound)`: no such adapter
    pub fn alloc_pd(&self, dh: DriverHandle, nic_index: usize) -> Result<ProtectionDomain> {
        if nic_index >= self.nics.len() {
            return Err(Error::NotFound);
        }
        let mut t = self.table.lock();
        if !t.is_open(dh) {
            return Err(Error::InvalidHandle);
        }
        t.next_pd = t.next_pd.wrapping_add(1);
        let id = t.next_pd;
        t.pds.push(PdEntry { id, owner: dh });
        log::debug!("driver: pd {} on nic {} for handle {}", id, nic_index, dh.0);
        Ok(ProtectionDomain { id, nic_index })
    }

    /// Release a protection domain.
    pub fn free_pd(&self, dh: DriverHandle, pd: ProtectionDomain) -> Result<()> {
        let mut t = self.table.lock();
        if !t.is_open(dh) || !t.owns_pd(dh, &pd) {
            return Err(Error::InvalidHandle);
        }
        t.pds.retain(|e| e.id != pd.id);
        Ok(())
    }

    /// Query a capability of the adapter behind `pd`.
    ///
    /// # Arguments
    /// - `dh`: session issuing the query
    /// - `pd`: protection domain selecting the adapter
    /// - `pd_dh`: session that owns `pd`
    ///
    /// # Returns
    /// - `Ok(value)`: capability present
    /// - `Err(Error::NotSupported)`: generation, revision or firmware lacks it
    /// - `Err(Error::InvalidHandle)`: `dh` not open, or `pd` not a live domain
    ///   of `pd_dh`
    pub fn get_capability(
        &self,
        dh: DriverHandle,
        pd: &ProtectionDomain,
        pd_dh: DriverHandle,
        cap: Capability,
    ) -> Result<u64> {
        {
            let t = self.table.lock();
            if !t.is_open(dh) || !t.is_open(pd_dh) || !t.owns_pd(pd_dh, pd) {
                return Err(Error::InvalidHandle);
            }
        }
        let nic = self.nics.get(pd.nic_index).ok_or(Error::InvalidHandle)?;
        nic.generation
            .ops()
            .capability(nic, cap)
            .ok_or(Error::NotSupported)
    }

    /// [`Driver::get_capability`] with a raw capability number.
    pub fn get_capability_raw(
        &self,
        dh: DriverHandle,
        pd: &ProtectionDomain,
        pd_dh: DriverHandle,
        cap: u32,
    ) -> Result<u64> {
        let cap = Capability::from_u32(cap).ok_or(Error::NotSupported)?;
        self.get_capability(dh, pd, pd_dh, cap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn driver() -> Driver {
        Driver::new(vec![
            NicInfo::new(Generation::Falcon),
            NicInfo::new(Generation::Ef10)
                .with_features(NicFeatures::PIO | NicFeatures::PACKED_STREAM)
                .with_pio(2048, 16),
        ])
    }

    // ==================== Handles ====================

    #[test]
    fn test_open_close() {
        let d = driver();
        let dh = d.open();
        assert!(d.close(dh).is_ok());
        assert_eq!(d.close(dh), Err(Error::InvalidHandle));
    }

    #[test]
    fn test_alloc_pd_requires_open_handle() {
        let d = driver();
        let dh = d.open();
        d.close(dh).unwrap();
        assert_eq!(d.alloc_pd(dh, 0).unwrap_err(), Error::InvalidHandle);
    }

    #[test]
    fn test_alloc_pd_unknown_nic() {
        let d = driver();
        let dh = d.open();
        assert_eq!(d.alloc_pd(dh, 5).unwrap_err(), Error::NotFound);
    }

    // ==================== Capabilities ====================

    #[test]
    fn test_capability_present() {
        let d = driver();
        let dh = d.open();
        let pd = d.alloc_pd(dh, 1).unwrap();
        assert_eq!(d.get_capability(dh, &pd, dh, Capability::Pio), Ok(1));
        assert_eq!(d.get_capability(dh, &pd, dh, Capability::PioBufferSize), Ok(2048));
        assert_eq!(d.get_capability(dh, &pd, dh, Capability::PioBufferCount), Ok(16));
    }

    #[test]
    fn test_capability_not_supported_on_falcon() {
        let d = driver();
        let dh = d.open();
        let pd = d.alloc_pd(dh, 0).unwrap();
        assert_eq!(
            d.get_capability(dh, &pd, dh, Capability::PackedStream),
            Err(Error::NotSupported)
        );
        assert_eq!(d.get_capability(dh, &pd, dh, Capability::BufferMode), Ok(1));
    }

    #[test]
    fn test_capability_missing_feature() {
        let d = driver();
        let dh = d.open();
        let pd = d.alloc_pd(dh, 1).unwrap();
        assert_eq!(
            d.get_capability(dh, &pd, dh, Capability::HwRxTimestamping),
            Err(Error::NotSupported)
        );
    }

    #[test]
    fn test_capability_invalid_handles() {
        let d = driver();
        let a = d.open();
        let b = d.open();
        let pd = d.alloc_pd(a, 1).unwrap();

        // pd belongs to a, not b
        assert_eq!(
            d.get_capability(a, &pd, b, Capability::Pio),
            Err(Error::InvalidHandle)
        );
        // caller handle closed
        d.close(b).unwrap();
        assert_eq!(
            d.get_capability(b, &pd, a, Capability::Pio),
            Err(Error::InvalidHandle)
        );
        // domain freed
        d.free_pd(a, pd).unwrap();
        let stale = ProtectionDomain { id: 1, nic_index: 1 };
        assert_eq!(
            d.get_capability(a, &stale, a, Capability::Pio),
            Err(Error::InvalidHandle)
        );
    }

    #[test]
    fn test_close_releases_domains() {
        let d = driver();
        let dh = d.open();
        let pd = d.alloc_pd(dh, 1).unwrap();
        d.close(dh).unwrap();
        let other = d.open();
        assert_eq!(d.free_pd(other, pd), Err(Error::InvalidHandle));
    }

    #[test]
    fn test_raw_capability_number() {
        let d = driver();
        let dh = d.open();
        let pd = d.alloc_pd(dh, 1).unwrap();
        assert_eq!(d.get_capability_raw(dh, &pd, dh, 0), Ok(1));
        assert_eq!(d.get_capability_raw(dh, &pd, dh, 999), Err(Error::NotSupported));
    }
}
