// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Mac addresses of overlay endpoints

use arrayvec::ArrayVec;
use std::fmt::Display;

/// An Ethernet MAC address, used as endpoint identifier by L2 entries
#[repr(transparent)]
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub struct Mac(pub [u8; 6]);

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum MacError {
    #[error("invalid mac address: {0}")]
    Invalid(String),
}

impl Mac {
    /// The all-zeros `Mac`. As source address of a flat table key it matches any source.
    pub const ZERO: Mac = Mac([0; 6]);

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self == &Mac::ZERO
    }

    /// The address as the 48 low-order bits of a u64, first octet most significant
    #[must_use]
    pub fn to_u64(&self) -> u64 {
        self.0
            .iter()
            .fold(0u64, |acc, octet| (acc << 8) | u64::from(*octet))
    }
}

impl From<[u8; 6]> for Mac {
    fn from(value: [u8; 6]) -> Self {
        Mac(value)
    }
}

impl TryFrom<&str> for Mac {
    type Error = MacError;

    /// Parses the colon-separated hex notation
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let invalid = || MacError::Invalid(value.to_string());
        let octets = value
            .split(':')
            .try_fold(ArrayVec::<u8, 6>::new(), |mut acc, octet| {
                if octet.len() != 2 || !octet.chars().all(|c| c.is_ascii_hexdigit()) {
                    return Err(invalid());
                }
                let parsed = u8::from_str_radix(octet, 16).map_err(|_| invalid())?;
                acc.try_push(parsed).map_err(|_| invalid())?;
                Ok(acc)
            })?;
        octets.into_inner().map(Mac).map_err(|_| invalid())
    }
}

impl Display for Mac {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mac_parse_display() {
        let mac = Mac::try_from("02:aa:00:0b:cc:ff").unwrap();
        assert_eq!(mac, Mac([0x02, 0xaa, 0x00, 0x0b, 0xcc, 0xff]));
        assert_eq!(mac.to_string(), "02:aa:00:0b:cc:ff");
        assert_eq!(mac.to_u64(), 0x02aa_000b_ccff);
    }

    #[test]
    fn test_mac_parse_bad() {
        assert!(Mac::try_from("02:aa:00:0b:cc").is_err());
        assert!(Mac::try_from("02:aa:00:0b:cc:ff:00").is_err());
        assert!(Mac::try_from("02:aa:00:0b:cc:fg").is_err());
        assert!(Mac::try_from("2:aa:00:0b:cc:ff").is_err());
        assert!(Mac::ZERO.is_zero());
    }
}
