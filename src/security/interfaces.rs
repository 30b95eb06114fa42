//! Local interface address enumeration.

use std::io;
use std::net::IpAddr;

/// IP addresses assigned to this host's network interfaces, deduplicated.
#[cfg(unix)]
pub fn local_addresses() -> io::Result<Vec<IpAddr>> {
    use std::net::{SocketAddrV4, SocketAddrV6};

    let mut local = Vec::new();
    for ifaddr in nix::ifaddrs::getifaddrs().map_err(io::Error::from)? {
        let Some(address) = ifaddr.address else {
            continue;
        };
        let ip = if let Some(v4) = address.as_sockaddr_in() {
            IpAddr::V4(*SocketAddrV4::from(*v4).ip())
        } else if let Some(v6) = address.as_sockaddr_in6() {
            IpAddr::V6(*SocketAddrV6::from(*v6).ip())
        } else {
            continue;
        };
        if !local.contains(&ip) {
            local.push(ip);
        }
    }

    tracing::debug!(addresses = ?local, "Enumerated local interface addresses");
    Ok(local)
}

#[cfg(not(unix))]
pub fn local_addresses() -> io::Result<Vec<IpAddr>> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "interface enumeration is not supported on this platform",
    ))
}
