//! Textual host/port parsing into socket addresses.
//!
//! Used by tools and tests to turn command-line strings such as
//! `"10.0.0.1:8080"` or `"8080"` into addresses. Name lookup is pluggable
//! through [`Resolver`] so `no_std` builds can stay numeric-only.

pub mod parser;

use alloc::vec::Vec;
use core::fmt;
use core::net::{IpAddr, Ipv4Addr, SocketAddrV4};

use crate::error::{Error, Result};

pub use parser::{
    host_port_to_sockaddr, host_port_to_sockaddr_with, hostport_to_addr, hostport_to_addr_with,
    hostport_to_sockaddr, hostport_to_sockaddr_with,
};

/// Host names must be shorter than this, terminator included.
pub const MAX_HOSTNAME_LEN: usize = 100;

/// IPv4 address family number.
pub const AF_INET: u16 = 2;

/// IPv4 socket address with port and address in network byte order.
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SockAddrIn {
    pub family: u16,
    pub port_be: u16,
    pub addr_be: u32,
}

impl SockAddrIn {
    pub fn new(ip: Ipv4Addr, port: u16) -> Self {
        Self {
            family: AF_INET,
            port_be: port.to_be(),
            addr_be: u32::from(ip).to_be(),
        }
    }

    /// Wildcard address with `port`.
    pub fn any(port: u16) -> Self {
        Self::new(Ipv4Addr::UNSPECIFIED, port)
    }

    #[inline]
    pub fn ip(&self) -> Ipv4Addr {
        Ipv4Addr::from(u32::from_be(self.addr_be))
    }

    #[inline]
    pub fn port(&self) -> u16 {
        u16::from_be(self.port_be)
    }
}

impl From<SockAddrIn> for SocketAddrV4 {
    fn from(sa: SockAddrIn) -> Self {
        SocketAddrV4::new(sa.ip(), sa.port())
    }
}

impl fmt::Display for SockAddrIn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.ip(), self.port())
    }
}

/// Host name lookup.
pub trait Resolver {
    /// Addresses of `host`, in preference order.
    ///
    /// # Errors
    /// `Error::NotFound` if the name does not resolve.
    fn lookup(&self, host: &str) -> Result<Vec<IpAddr>>;
}

/// Resolver that knows no names; only numeric addresses parse.
#[derive(Debug, Default, Clone, Copy)]
pub struct NumericResolver;

impl Resolver for NumericResolver {
    fn lookup(&self, host: &str) -> Result<Vec<IpAddr>> {
        log::trace!("addr: no resolver for {:?}", host);
        Err(Error::NotFound)
    }
}

/// Resolver backed by the operating system.
#[cfg(feature = "std")]
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemResolver;

#[cfg(feature = "std")]
impl Resolver for SystemResolver {
    fn lookup(&self, host: &str) -> Result<Vec<IpAddr>> {
        use std::net::ToSocketAddrs;

        let addrs = (host, 0u16).to_socket_addrs().map_err(|e| {
            log::debug!("addr: lookup of {:?} failed: {}", host, e);
            Error::NotFound
        })?;
        let ips: Vec<IpAddr> = addrs.map(|a| a.ip()).collect();
        if ips.is_empty() {
            return Err(Error::NotFound);
        }
        Ok(ips)
    }
}

/// Resolver used by the functions without a `_with` suffix.
#[cfg(feature = "std")]
pub type DefaultResolver = SystemResolver;

/// Resolver used by the functions without a `_with` suffix.
#[cfg(not(feature = "std"))]
pub type DefaultResolver = NumericResolver;
