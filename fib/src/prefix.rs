// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Type to represent IP-version neutral network prefixes.

use ipnet::{IpNet, Ipv4Net, Ipv6Net};
use std::fmt::Display;
pub use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum PrefixError {
    #[error("Invalid Prefix: {0}")]
    Invalid(String),
    #[error("Mask length {0} is invalid")]
    InvalidLength(u8),
}

/// The address family of a fib table or a prefix
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub enum FibProtocol {
    Ip4,
    Ip6,
}

impl FibProtocol {
    #[must_use]
    pub fn max_len(&self) -> u8 {
        match self {
            FibProtocol::Ip4 => Prefix::MAX_LEN_IPV4,
            FibProtocol::Ip6 => Prefix::MAX_LEN_IPV6,
        }
    }
}

/// An IPv4 or IPv6 prefix. Host bits are always cleared, so that two prefixes
/// covering the same network compare equal.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub enum Prefix {
    IPV4(Ipv4Net),
    IPV6(Ipv6Net),
}

impl Prefix {
    pub const MAX_LEN_IPV4: u8 = 32;
    pub const MAX_LEN_IPV6: u8 = 128;

    /// Build a [`Prefix`] from an address and a mask length.
    ///
    /// # Errors
    ///
    /// Fails if the length exceeds the maximum for the address family.
    pub fn new(address: IpAddr, len: u8) -> Result<Self, PrefixError> {
        match address {
            IpAddr::V4(a) => Ipv4Net::new(a, len)
                .map(|net| Prefix::IPV4(net.trunc()))
                .map_err(|_| PrefixError::InvalidLength(len)),
            IpAddr::V6(a) => Ipv6Net::new(a, len)
                .map(|net| Prefix::IPV6(net.trunc()))
                .map_err(|_| PrefixError::InvalidLength(len)),
        }
    }

    /// Build 0.0.0.0/0 or ::/0
    #[must_use]
    pub fn root(proto: FibProtocol) -> Self {
        match proto {
            FibProtocol::Ip4 => Self::root_v4(),
            FibProtocol::Ip6 => Self::root_v6(),
        }
    }
    #[must_use]
    pub fn root_v4() -> Self {
        Prefix::IPV4(Ipv4Net::default())
    }
    #[must_use]
    pub fn root_v6() -> Self {
        Prefix::IPV6(Ipv6Net::default())
    }

    /// The unspecified address of family `proto` with the given length, clamped to the
    /// maximum length of the family.
    #[must_use]
    pub fn unspecified(proto: FibProtocol, len: u8) -> Self {
        let len = len.min(proto.max_len());
        match proto {
            FibProtocol::Ip4 => {
                Prefix::IPV4(Ipv4Net::new(Ipv4Addr::UNSPECIFIED, len).unwrap_or_default())
            }
            FibProtocol::Ip6 => {
                Prefix::IPV6(Ipv6Net::new(Ipv6Addr::UNSPECIFIED, len).unwrap_or_default())
            }
        }
    }

    #[must_use]
    pub fn protocol(&self) -> FibProtocol {
        match self {
            Prefix::IPV4(_) => FibProtocol::Ip4,
            Prefix::IPV6(_) => FibProtocol::Ip6,
        }
    }
    #[must_use]
    pub fn is_ipv4(&self) -> bool {
        matches!(self, Prefix::IPV4(_))
    }
    #[must_use]
    pub fn is_ipv6(&self) -> bool {
        matches!(self, Prefix::IPV6(_))
    }

    /// Tell if the network address of this prefix is all zeros
    #[must_use]
    pub fn is_unspecified(&self) -> bool {
        self.as_address().is_unspecified()
    }

    /// The network address of the prefix
    #[must_use]
    pub fn as_address(&self) -> IpAddr {
        match self {
            Prefix::IPV4(p) => IpAddr::V4(p.network()),
            Prefix::IPV6(p) => IpAddr::V6(p.network()),
        }
    }

    #[must_use]
    pub fn length(&self) -> u8 {
        match self {
            Prefix::IPV4(p) => p.prefix_len(),
            Prefix::IPV6(p) => p.prefix_len(),
        }
    }

    /// Tell if `address` falls within this prefix
    #[must_use]
    pub fn covers(&self, address: &IpAddr) -> bool {
        match (self, address) {
            (Prefix::IPV4(p), IpAddr::V4(a)) => p.contains(a),
            (Prefix::IPV6(p), IpAddr::V6(a)) => p.contains(a),
            _ => false,
        }
    }
}

impl From<Ipv4Net> for Prefix {
    fn from(value: Ipv4Net) -> Self {
        Prefix::IPV4(value.trunc())
    }
}
impl From<Ipv6Net> for Prefix {
    fn from(value: Ipv6Net) -> Self {
        Prefix::IPV6(value.trunc())
    }
}
impl From<IpNet> for Prefix {
    fn from(value: IpNet) -> Self {
        match value {
            IpNet::V4(p) => p.into(),
            IpNet::V6(p) => p.into(),
        }
    }
}
/// A host prefix for the given address
impl From<IpAddr> for Prefix {
    fn from(value: IpAddr) -> Self {
        IpNet::from(value).into()
    }
}

impl FromStr for Prefix {
    type Err = PrefixError;

    /// Parses "address/len". A bare address yields a host prefix.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.contains('/') {
            IpNet::from_str(s)
                .map(Prefix::from)
                .map_err(|_| PrefixError::Invalid(s.to_owned()))
        } else {
            IpAddr::from_str(s)
                .map(Prefix::from)
                .map_err(|_| PrefixError::Invalid(s.to_owned()))
        }
    }
}

impl TryFrom<&str> for Prefix {
    type Error = PrefixError;
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Prefix::from_str(value)
    }
}

impl Display for Prefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Prefix::IPV4(p) => write!(f, "{p}"),
            Prefix::IPV6(p) => write!(f, "{p}"),
        }
    }
}

impl Display for FibProtocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FibProtocol::Ip4 => write!(f, "ipv4"),
            FibProtocol::Ip6 => write!(f, "ipv6"),
        }
    }
}
