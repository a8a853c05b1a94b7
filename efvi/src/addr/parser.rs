//! Host/port string parsing.
//!
//! Accepted forms:
//! - `host:port` and `a.b.c.d:port`
//! - `port` (all digits, no colon): wildcard address
//! - `host` (no colon, not all digits): port 0
//!
//! [`hostport_to_addr`] additionally accepts IPv6 literals (`::1:80`,
//! `[::1]:80`) and splits on the last colon.

use core::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

use super::{DefaultResolver, Resolver, SockAddrIn, MAX_HOSTNAME_LEN};
use crate::error::{Error, Result};

fn all_digits(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_digit())
}

fn parse_port(s: &str) -> Result<u16> {
    if s.is_empty() || !all_digits(s) {
        return Err(Error::InvalidAddress);
    }
    s.parse::<u16>().map_err(|_| Error::InvalidAddress)
}

/// Port text that does not parse names an unknown service.
fn service_port(s: &str) -> Result<u16> {
    parse_port(s).map_err(|_| Error::NotFound)
}

fn check_host_len(host: &str) -> Result<()> {
    if host.len() > MAX_HOSTNAME_LEN - 1 {
        return Err(Error::NameTooLong);
    }
    Ok(())
}

/// Dotted quad first, then the resolver's first IPv4 answer.
fn resolve_v4<R: Resolver + ?Sized>(host: &str, resolver: &R) -> Result<Ipv4Addr> {
    if let Ok(ip) = host.parse::<Ipv4Addr>() {
        return Ok(ip);
    }
    resolver
        .lookup(host)?
        .into_iter()
        .find_map(|ip| match ip {
            IpAddr::V4(v4) => Some(v4),
            IpAddr::V6(_) => None,
        })
        .ok_or(Error::NotFound)
}

/// Numeric literal first, then the resolver.
fn resolve_any<R: Resolver + ?Sized>(host: &str, resolver: &R) -> Result<IpAddr> {
    let literal = host
        .strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host);
    if let Ok(ip) = literal.parse::<IpAddr>() {
        return Ok(ip);
    }
    resolver
        .lookup(host)?
        .into_iter()
        .next()
        .ok_or(Error::NotFound)
}

/// Build an IPv4 socket address from a host and a port.
///
/// `None` or an empty host selects the wildcard address.
pub fn host_port_to_sockaddr(host: Option<&str>, port: u16) -> Result<SockAddrIn> {
    host_port_to_sockaddr_with(host, port, &DefaultResolver::default())
}

/// [`host_port_to_sockaddr`] with an explicit resolver.
pub fn host_port_to_sockaddr_with<R: Resolver + ?Sized>(
    host: Option<&str>,
    port: u16,
    resolver: &R,
) -> Result<SockAddrIn> {
    match host.filter(|h| !h.is_empty()) {
        None => Ok(SockAddrIn::any(port)),
        Some(h) => {
            check_host_len(h)?;
            Ok(SockAddrIn::new(resolve_v4(h, resolver)?, port))
        }
    }
}

/// Parse `"host:port"`, `"host"` or `"port"` into an IPv4 socket address.
///
/// # Errors
/// - `Error::NameTooLong`: host part is `MAX_HOSTNAME_LEN` bytes or more
/// - `Error::NotFound`: host does not resolve, or the port is empty,
///   non-numeric or out of range
pub fn hostport_to_sockaddr(hp: &str) -> Result<SockAddrIn> {
    hostport_to_sockaddr_with(hp, &DefaultResolver::default())
}

/// [`hostport_to_sockaddr`] with an explicit resolver.
pub fn hostport_to_sockaddr_with<R: Resolver + ?Sized>(hp: &str, resolver: &R) -> Result<SockAddrIn> {
    let (host, port) = match hp.find(':') {
        Some(idx) => (&hp[..idx], Some(&hp[idx + 1..])),
        None => (hp, None),
    };
    check_host_len(host)?;

    if port.is_none() && all_digits(host) {
        return Ok(SockAddrIn::any(service_port(host)?));
    }

    let ip = resolve_v4(host, resolver)?;
    let port = match port {
        Some(p) => service_port(p)?,
        None => 0,
    };
    Ok(SockAddrIn::new(ip, port))
}

/// Parse a host/port string into an IPv4 or IPv6 socket address.
///
/// Splits on the last colon; text after it must be a non-empty port. A bare
/// port selects the loopback address.
pub fn hostport_to_addr(hp: &str) -> Result<SocketAddr> {
    hostport_to_addr_with(hp, &DefaultResolver::default())
}

/// [`hostport_to_addr`] with an explicit resolver.
pub fn hostport_to_addr_with<R: Resolver + ?Sized>(hp: &str, resolver: &R) -> Result<SocketAddr> {
    // Bare IPv6 literal, e.g. "::1" with no port.
    if let Ok(v6) = hp.parse::<Ipv6Addr>() {
        return Ok(SocketAddr::new(IpAddr::V6(v6), 0));
    }

    let (host, port) = match hp.rfind(':') {
        Some(idx) => {
            let port = &hp[idx + 1..];
            if port.is_empty() {
                return Err(Error::InvalidAddress);
            }
            (&hp[..idx], parse_port(port)?)
        }
        None if all_digits(hp) => ("", parse_port(hp)?),
        None => (hp, 0),
    };

    if host.is_empty() {
        return Ok(SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), port));
    }
    check_host_len(host)?;
    Ok(SocketAddr::new(resolve_any(host, resolver)?, port))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::addr::NumericResolver;
    use alloc::string::String;
    use alloc::vec;
    use alloc::vec::Vec;

    /// Knows a single name.
    struct FixedResolver;

    impl Resolver for FixedResolver {
        fn lookup(&self, host: &str) -> Result<Vec<IpAddr>> {
            match host {
                "nic0.lab" => Ok(vec![
                    IpAddr::V6(Ipv6Addr::LOCALHOST),
                    IpAddr::V4(Ipv4Addr::new(192, 168, 7, 2)),
                ]),
                _ => Err(Error::NotFound),
            }
        }
    }

    const R: NumericResolver = NumericResolver;

    // ==================== host:port ====================

    #[test]
    fn test_dotted_quad_with_port() {
        let sa = hostport_to_sockaddr_with("1.2.3.4:80", &R).unwrap();
        assert_eq!(sa.ip(), Ipv4Addr::new(1, 2, 3, 4));
        assert_eq!(sa.port_be, 80u16.to_be());
        assert_eq!(sa.addr_be.to_ne_bytes(), [1, 2, 3, 4]);
    }

    #[test]
    fn test_port_only_is_wildcard() {
        let sa = hostport_to_sockaddr_with("80", &R).unwrap();
        assert_eq!(sa.ip(), Ipv4Addr::UNSPECIFIED);
        assert_eq!(sa.port(), 80);
    }

    #[test]
    fn test_host_only_has_port_zero() {
        let sa = hostport_to_sockaddr_with("10.1.1.1", &R).unwrap();
        assert_eq!(sa.ip(), Ipv4Addr::new(10, 1, 1, 1));
        assert_eq!(sa.port(), 0);
    }

    #[test]
    fn test_named_host_uses_first_ipv4_answer() {
        let sa = hostport_to_sockaddr_with("nic0.lab:9000", &FixedResolver).unwrap();
        assert_eq!(sa.ip(), Ipv4Addr::new(192, 168, 7, 2));
        assert_eq!(sa.port(), 9000);
    }

    // ==================== Error Cases ====================

    #[test]
    fn test_host_too_long() {
        let mut hp: String = core::iter::repeat('a').take(MAX_HOSTNAME_LEN).collect();
        hp.push_str(":80");
        assert_eq!(hostport_to_sockaddr_with(&hp, &R), Err(Error::NameTooLong));
    }

    #[test]
    fn test_host_at_limit_is_not_too_long() {
        let hp: String = core::iter::repeat('a').take(MAX_HOSTNAME_LEN - 1).collect();
        assert_eq!(hostport_to_sockaddr_with(&hp, &R), Err(Error::NotFound));
    }

    #[test]
    fn test_unresolvable_host() {
        assert_eq!(
            hostport_to_sockaddr_with("no.such.host:80", &R),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn test_bad_port_is_unknown_service() {
        assert_eq!(hostport_to_sockaddr_with("1.2.3.4:http", &R), Err(Error::NotFound));
        assert_eq!(hostport_to_sockaddr_with("1.2.3.4:70000", &R), Err(Error::NotFound));
        assert_eq!(hostport_to_sockaddr_with("1.2.3.4:", &R), Err(Error::NotFound));
        assert_eq!(hostport_to_sockaddr_with("", &R), Err(Error::NotFound));
        assert_eq!(Error::NotFound.errno(), -2);
    }

    // ==================== host + port ====================

    #[test]
    fn test_host_port_wildcard() {
        assert_eq!(host_port_to_sockaddr_with(None, 53, &R), Ok(SockAddrIn::any(53)));
        assert_eq!(host_port_to_sockaddr_with(Some(""), 53, &R), Ok(SockAddrIn::any(53)));
    }

    #[test]
    fn test_host_port_numeric() {
        let sa = host_port_to_sockaddr_with(Some("127.0.0.1"), 7, &R).unwrap();
        assert_eq!(sa.ip(), Ipv4Addr::LOCALHOST);
        assert_eq!(sa.port(), 7);
        assert_eq!(host_port_to_sockaddr_with(Some("nowhere"), 7, &R), Err(Error::NotFound));
    }

    // ==================== IPv4 / IPv6 ====================

    #[test]
    fn test_addr_ipv4() {
        let a = hostport_to_addr_with("10.0.0.1:3000", &R).unwrap();
        assert_eq!(a, SocketAddr::new(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)), 3000));
    }

    #[test]
    fn test_addr_ipv6_last_colon() {
        let a = hostport_to_addr_with("2001:db8::1:9000", &R).unwrap();
        assert_eq!(a.port(), 9000);
        assert_eq!(a.ip(), "2001:db8::1".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn test_addr_ipv6_bracketed() {
        let a = hostport_to_addr_with("[::1]:8080", &R).unwrap();
        assert_eq!(a, SocketAddr::new(IpAddr::V6(Ipv6Addr::LOCALHOST), 8080));
    }

    #[test]
    fn test_addr_bare_ipv6() {
        let a = hostport_to_addr_with("::1", &R).unwrap();
        assert_eq!(a.ip(), IpAddr::V6(Ipv6Addr::LOCALHOST));
        assert_eq!(a.port(), 0);
    }

    #[test]
    fn test_addr_port_only_is_loopback() {
        let a = hostport_to_addr_with("443", &R).unwrap();
        assert_eq!(a, SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 443));
    }

    #[test]
    fn test_addr_empty_port_rejected() {
        assert_eq!(hostport_to_addr_with("1.2.3.4:", &R), Err(Error::InvalidAddress));
    }

    #[test]
    fn test_addr_resolver_keeps_preference_order() {
        let a = hostport_to_addr_with("nic0.lab:1", &FixedResolver).unwrap();
        assert_eq!(a.ip(), IpAddr::V6(Ipv6Addr::LOCALHOST));
    }
}
