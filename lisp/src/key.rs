// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Endpoint identifiers and the key that identifies a forwarding entry

use crate::mac::Mac;
use fib::prefix::Prefix;
use std::fmt::Display;

/// An overlay endpoint: an IP prefix for L3 entries or a MAC for L2 ones
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum EndpointId {
    IpPrefix(Prefix),
    Mac(Mac),
}

impl EndpointId {
    #[must_use]
    pub fn as_prefix(&self) -> Option<&Prefix> {
        match self {
            EndpointId::IpPrefix(prefix) => Some(prefix),
            EndpointId::Mac(_) => None,
        }
    }
    #[must_use]
    pub fn as_mac(&self) -> Option<&Mac> {
        match self {
            EndpointId::Mac(mac) => Some(mac),
            EndpointId::IpPrefix(_) => None,
        }
    }
}

impl From<Prefix> for EndpointId {
    fn from(value: Prefix) -> Self {
        EndpointId::IpPrefix(value)
    }
}
impl From<Mac> for EndpointId {
    fn from(value: Mac) -> Self {
        EndpointId::Mac(value)
    }
}

impl Display for EndpointId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EndpointId::IpPrefix(prefix) => prefix.fmt(f),
            EndpointId::Mac(mac) => mac.fmt(f),
        }
    }
}

/// The identity of a forwarding entry
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct FwdEntryKey {
    pub remote: EndpointId,
    pub local: EndpointId,
    pub vni: u32,
}

impl FwdEntryKey {
    ////////////////////////////////////////////////////////////////////////////////
    /// Build the key of an entry. An unspecified local prefix of the other address
    /// family than the remote one is taken as the unspecified prefix of the remote
    /// family with the same length, so that "any source" has a single key.
    ////////////////////////////////////////////////////////////////////////////////
    #[must_use]
    pub fn new(remote: EndpointId, local: EndpointId, vni: u32) -> Self {
        let local = match (&remote, &local) {
            (EndpointId::IpPrefix(rmt), EndpointId::IpPrefix(lcl))
                if lcl.is_unspecified() && lcl.protocol() != rmt.protocol() =>
            {
                EndpointId::IpPrefix(Prefix::unspecified(rmt.protocol(), lcl.length()))
            }
            _ => local,
        };
        Self { remote, local, vni }
    }
}

impl Display for FwdEntryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[vni:{}] {} -> {}", self.vni, self.local, self.remote)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn pfx(s: &str) -> EndpointId {
        EndpointId::IpPrefix(Prefix::from_str(s).unwrap())
    }

    #[test]
    fn test_key_family_inheritance() {
        let k = FwdEntryKey::new(pfx("2001:db8::/32"), pfx("0.0.0.0/0"), 10);
        assert_eq!(k.local, pfx("::/0"));
        assert_eq!(k, FwdEntryKey::new(pfx("2001:db8::/32"), pfx("::/0"), 10));

        let k = FwdEntryKey::new(pfx("10.0.0.0/8"), pfx("::/64"), 10);
        assert_eq!(k.local, pfx("0.0.0.0/32"), "length is clamped to the remote family");
    }

    #[test]
    fn test_key_no_inheritance() {
        /* a specified local prefix is kept as is */
        let k = FwdEntryKey::new(pfx("10.0.0.0/8"), pfx("2001:db8::/32"), 1);
        assert_eq!(k.local, pfx("2001:db8::/32"));

        let m1 = EndpointId::Mac(Mac([0, 0, 0, 0, 0, 1]));
        let k = FwdEntryKey::new(m1, EndpointId::Mac(Mac::ZERO), 1);
        assert_eq!(k.local, EndpointId::Mac(Mac::ZERO));
    }

    #[test]
    fn test_key_equality() {
        let a = FwdEntryKey::new(pfx("10.0.0.0/8"), pfx("0.0.0.0/0"), 1);
        let b = FwdEntryKey::new(pfx("10.0.0.0/8"), pfx("0.0.0.0/0"), 2);
        let c = FwdEntryKey::new(pfx("10.0.0.0/16"), pfx("0.0.0.0/0"), 1);
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_eq!(a, FwdEntryKey::new(pfx("10.1.0.0/8"), pfx("0.0.0.0/0"), 1));
        assert_eq!(a.to_string(), "[vni:1] 0.0.0.0/0 -> 10.0.0.0/8");
    }
}
