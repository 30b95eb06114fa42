//! IP allow-list admission.
//! Gates every request before any decoding happens.

use std::net::IpAddr;

use thiserror::Error;

use crate::config::AccessConfig;
use crate::security::interfaces;

/// Errors raised by the admission filter.
#[derive(Debug, Error)]
pub enum AccessError {
    /// Remote address is not `host:port` with an IP literal host.
    #[error("rpc: remote client rejected, cannot read its IP: {0:?}")]
    MalformedRemoteAddress(String),

    #[error("rpc: remote client rejected, not allowed by the server")]
    RemoteNotAllowed,

    #[error("rpc: local address list is empty")]
    NoLocalAddresses,

    /// Allow-list entry in the configuration is not an IP address.
    #[error("rpc: invalid allow-list entry {0:?}")]
    InvalidEntry(String),

    #[error("rpc: cannot enumerate local interfaces: {0}")]
    Interfaces(#[from] std::io::Error),
}

/// Allow-list of peer IPs. An empty list admits every peer.
#[derive(Debug, Clone, Default)]
pub struct AccessFilter {
    allow: Vec<IpAddr>,
}

impl AccessFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a filter from the `[access]` configuration section.
    ///
    /// Explicit entries and, if enabled, the local interface addresses are
    /// bound together in one call.
    pub fn from_config(config: &AccessConfig) -> Result<Self, AccessError> {
        let mut allow = config
            .allow
            .iter()
            .map(|entry| {
                entry
                    .trim()
                    .parse::<IpAddr>()
                    .map_err(|_| AccessError::InvalidEntry(entry.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        if config.bind_local {
            let local = interfaces::local_addresses()?;
            if local.is_empty() {
                return Err(AccessError::NoLocalAddresses);
            }
            allow.extend(local);
        }

        let mut filter = Self::new();
        filter.bind(allow);
        Ok(filter)
    }

    /// Replace the permitted set.
    pub fn bind<I>(&mut self, ips: I)
    where
        I: IntoIterator<Item = IpAddr>,
    {
        self.allow = ips.into_iter().map(|ip| ip.to_canonical()).collect();
        tracing::info!(allowed = ?self.allow, "Access filter bound");
    }

    /// Permit only the addresses of this host's network interfaces.
    pub fn bind_local(&mut self) -> Result<(), AccessError> {
        let local = interfaces::local_addresses()?;
        if local.is_empty() {
            return Err(AccessError::NoLocalAddresses);
        }
        self.bind(local);
        Ok(())
    }

    pub fn allowed(&self) -> &[IpAddr] {
        &self.allow
    }

    /// True if every well-formed peer is admitted.
    pub fn is_open(&self) -> bool {
        self.allow.is_empty()
    }

    /// Admit or reject a peer given as `host:port`.
    pub fn check(&self, remote: &str) -> Result<(), AccessError> {
        let ip = parse_remote_ip(remote)?;
        if self.allow.is_empty() || self.allow.contains(&ip) {
            Ok(())
        } else {
            Err(AccessError::RemoteNotAllowed)
        }
    }
}

/// Parse the IP of a `host:port` or `[host]:port` peer address.
///
/// A `%zone` suffix on an IPv6 host is ignored.
fn parse_remote_ip(remote: &str) -> Result<IpAddr, AccessError> {
    let malformed = || AccessError::MalformedRemoteAddress(remote.to_string());
    let host = split_host(remote).ok_or_else(malformed)?;
    let host = host.split_once('%').map_or(host, |(ip, _zone)| ip);
    let ip: IpAddr = host.parse().map_err(|_| malformed())?;
    Ok(ip.to_canonical())
}

fn split_host(remote: &str) -> Option<&str> {
    if let Some(rest) = remote.strip_prefix('[') {
        let (host, port) = rest.split_once(']')?;
        port.strip_prefix(':')?;
        return Some(host);
    }
    let (host, _port) = remote.rsplit_once(':')?;
    if host.contains(':') {
        return None;
    }
    Some(host)
}
