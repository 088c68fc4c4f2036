// Copyright (c) 2025 - Cowboy AI, Inc.
//! Network Value Objects with Validation Invariants

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;
use thiserror::Error;

/// Network validation error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NetworkError {
    #[error("Invalid IPv4 address format: {0}")]
    InvalidIpAddress(String),

    #[error("Invalid CIDR notation: {0}")]
    InvalidCidr(String),

    #[error("Invalid prefix length: {0} (must be 0-32 for IPv4)")]
    InvalidPrefixLength(u8),

    #[error("Host bits set in CIDR block {0} (expected network address {1})")]
    HostBitsSet(String, Ipv4Addr),
}

/// IPv4 CIDR block value object
///
/// Represents a contiguous address range in prefix notation.
/// Invariants:
/// - Valid IPv4 network address
/// - Prefix length 0-32
/// - No host bits set (the address is the first address of the block)
///
/// # Examples
///
/// ```rust
/// use vpc_template::domain::Ipv4Cidr;
///
/// let vpc = Ipv4Cidr::new("172.21.0.0/16").unwrap();
/// let subnet = Ipv4Cidr::new("172.21.1.0/24").unwrap();
/// assert!(vpc.contains(&subnet));
/// assert_eq!(subnet.to_string(), "172.21.1.0/24");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ipv4Cidr {
    network: Ipv4Addr,
    prefix_length: u8,
}

impl Ipv4Cidr {
    /// Maximum IPv4 prefix length
    pub const MAX_PREFIX: u8 = 32;

    /// Parse a CIDR block such as `"10.0.0.0/8"`
    ///
    /// # Invariants
    /// - Prefix length is mandatory and at most 32
    /// - Address must be the network address of the block
    pub fn new(cidr: impl AsRef<str>) -> Result<Self, NetworkError> {
        let cidr = cidr.as_ref();

        let (addr_str, prefix_str) = cidr
            .split_once('/')
            .ok_or_else(|| NetworkError::InvalidCidr(cidr.to_string()))?;

        let address = Ipv4Addr::from_str(addr_str)
            .map_err(|_| NetworkError::InvalidIpAddress(addr_str.to_string()))?;

        // Canonical decimal only: no sign, no leading zeros.
        let canonical = !prefix_str.is_empty()
            && prefix_str.bytes().all(|b| b.is_ascii_digit())
            && (prefix_str == "0" || !prefix_str.starts_with('0'));
        if !canonical {
            return Err(NetworkError::InvalidCidr(cidr.to_string()));
        }

        let prefix_length = prefix_str
            .parse::<u8>()
            .map_err(|_| NetworkError::InvalidCidr(cidr.to_string()))?;

        let block = Self::from_parts(address, prefix_length)?;
        if block.network != address {
            return Err(NetworkError::HostBitsSet(cidr.to_string(), block.network));
        }

        Ok(block)
    }

    /// Build from an address and prefix, masking off any host bits
    pub fn from_parts(address: Ipv4Addr, prefix_length: u8) -> Result<Self, NetworkError> {
        if prefix_length > Self::MAX_PREFIX {
            return Err(NetworkError::InvalidPrefixLength(prefix_length));
        }

        let network = Ipv4Addr::from(u32::from(address) & Self::mask(prefix_length));
        Ok(Self {
            network,
            prefix_length,
        })
    }

    /// Literal block whose address is already aligned to `prefix_length`
    pub(crate) const fn from_network(network: Ipv4Addr, prefix_length: u8) -> Self {
        Self {
            network,
            prefix_length,
        }
    }

    fn mask(prefix_length: u8) -> u32 {
        match prefix_length {
            0 => 0,
            n => u32::MAX << (32 - u32::from(n)),
        }
    }

    /// Network (first) address of the block
    pub fn network(&self) -> Ipv4Addr {
        self.network
    }

    /// Prefix length
    pub fn prefix_length(&self) -> u8 {
        self.prefix_length
    }

    /// First address as an integer
    pub fn first(&self) -> u32 {
        u32::from(self.network)
    }

    /// Last address as an integer
    pub fn last(&self) -> u32 {
        self.first() | !Self::mask(self.prefix_length)
    }

    /// Number of addresses in the block
    pub fn size(&self) -> u64 {
        1u64 << (32 - u32::from(self.prefix_length))
    }

    /// Whether `other` lies entirely inside this block
    pub fn contains(&self, other: &Ipv4Cidr) -> bool {
        self.prefix_length <= other.prefix_length
            && self.first() <= other.first()
            && other.last() <= self.last()
    }

    /// Whether the two blocks share at least one address
    pub fn overlaps(&self, other: &Ipv4Cidr) -> bool {
        self.first() <= other.last() && other.first() <= self.last()
    }

    /// Canonical prefix notation
    pub fn as_cidr(&self) -> String {
        format!("{}/{}", self.network, self.prefix_length)
    }
}

impl fmt::Display for Ipv4Cidr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_cidr())
    }
}

impl FromStr for Ipv4Cidr {
    type Err = NetworkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Serialize for Ipv4Cidr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Ipv4Cidr {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::new(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_cidr_parse() {
        let block = Ipv4Cidr::new("172.21.0.0/16").unwrap();
        assert_eq!(block.network(), Ipv4Addr::new(172, 21, 0, 0));
        assert_eq!(block.prefix_length(), 16);
        assert_eq!(block.size(), 65536);
        assert_eq!(block.as_cidr(), "172.21.0.0/16");
    }

    #[test_case("172.21.0.0" ; "missing prefix")]
    #[test_case("172.21.0.0/33" ; "prefix too long")]
    #[test_case("172.21.0.0/abc" ; "non numeric prefix")]
    #[test_case("172.21.0.0/+16" ; "signed prefix")]
    #[test_case("172.21.0.0/016" ; "leading zero prefix")]
    #[test_case("172.21.0.0/" ; "empty prefix")]
    #[test_case("999.21.0.0/16" ; "bad octet")]
    #[test_case("172.21.1.0/16" ; "host bits set")]
    #[test_case("2001:db8::/32" ; "ipv6 rejected")]
    fn test_invalid_cidr(input: &str) {
        assert!(Ipv4Cidr::new(input).is_err());
    }

    #[test]
    fn test_host_bits_error_names_network() {
        let err = Ipv4Cidr::new("10.1.2.3/8").unwrap_err();
        assert_eq!(
            err,
            NetworkError::HostBitsSet("10.1.2.3/8".to_string(), Ipv4Addr::new(10, 0, 0, 0))
        );
    }

    #[test]
    fn test_zero_and_full_prefix() {
        let all = Ipv4Cidr::new("0.0.0.0/0").unwrap();
        assert_eq!(all.first(), 0);
        assert_eq!(all.last(), u32::MAX);

        let host = Ipv4Cidr::new("10.0.0.7/32").unwrap();
        assert_eq!(host.size(), 1);
        assert_eq!(host.first(), host.last());
    }

    #[test]
    fn test_contains_and_overlaps() {
        let vpc = Ipv4Cidr::new("172.21.0.0/16").unwrap();
        let private_a = Ipv4Cidr::new("172.21.1.0/24").unwrap();
        let public_a = Ipv4Cidr::new("172.21.128.0/24").unwrap();
        let outside = Ipv4Cidr::new("172.22.0.0/24").unwrap();
        let wide = Ipv4Cidr::new("172.21.0.0/20").unwrap();

        assert!(vpc.contains(&private_a));
        assert!(!vpc.contains(&outside));
        assert!(!private_a.contains(&vpc));
        assert!(!private_a.overlaps(&public_a));
        assert!(wide.overlaps(&private_a));
        assert!(private_a.overlaps(&wide));
    }

    #[test]
    fn test_serde_as_string() {
        let block = Ipv4Cidr::new("172.21.130.0/24").unwrap();
        let json = serde_json::to_string(&block).unwrap();
        assert_eq!(json, "\"172.21.130.0/24\"");

        let back: Ipv4Cidr = serde_json::from_str(&json).unwrap();
        assert_eq!(back, block);
        assert!(serde_json::from_str::<Ipv4Cidr>("\"172.21.130.1/24\"").is_err());
    }
}
