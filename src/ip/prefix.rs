//! IPv6 prefix and interface address types.
//!
//! Prefixes are parsed with [`ipnet`]; host offsets work on the `u128` form
//! of [`Ipv6Addr`]. The textual form of these types is what ends up in router
//! configuration and what prefix ordering is based on.

use crate::error::{CompileError, PrefixOwner};
use ipnet::Ipv6Net;
use std::fmt;
use std::net::Ipv6Addr;

/// An IPv6 network prefix with no host bits set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ipv6Prefix {
    net: Ipv6Net,
}

impl Ipv6Prefix {
    /// Parse a declared prefix such as `2001:db8::/64`.
    ///
    /// A prefix with host bits set (`2001:db8::5/64`) is rejected.
    pub fn parse(value: &str, owner: &PrefixOwner) -> Result<Self, CompileError> {
        let invalid = || CompileError::InvalidPrefix {
            owner: owner.clone(),
            value: value.to_string(),
        };

        let net: Ipv6Net = value.trim().parse().map_err(|_| invalid())?;
        if net.addr() != net.network() {
            return Err(invalid());
        }
        Ok(Self { net })
    }

    /// Parse a declared prefix and require it to be exactly `/64`
    pub fn parse_slash64(value: &str, owner: &PrefixOwner) -> Result<Self, CompileError> {
        let prefix = Self::parse(value, owner)?;
        if prefix.len() != 64 {
            return Err(CompileError::InvalidPrefixLength {
                owner: owner.clone(),
                found: prefix.len(),
            });
        }
        Ok(prefix)
    }

    pub fn network(&self) -> Ipv6Addr {
        self.net.network()
    }

    pub fn len(&self) -> u8 {
        self.net.prefix_len()
    }

    /// The `offset`-th host of this prefix, carrying the given prefix length
    pub fn host(&self, offset: u128, len: u8) -> InterfaceAddr {
        InterfaceAddr {
            addr: Ipv6Addr::from(u128::from(self.network()).wrapping_add(offset)),
            len,
        }
    }
}

impl fmt::Display for Ipv6Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.net)
    }
}

/// An address assigned to an interface, with its prefix length
/// (`2001:db8::1/64` on a link, `2001:db8::1/128` on a loopback)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InterfaceAddr {
    addr: Ipv6Addr,
    len: u8,
}

impl InterfaceAddr {
    /// The bare address, as used for BGP neighbor statements
    pub fn addr(&self) -> Ipv6Addr {
        self.addr
    }

    pub fn len(&self) -> u8 {
        self.len
    }
}

impl fmt::Display for InterfaceAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.addr, self.len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner() -> PrefixOwner {
        PrefixOwner::LinkSubnet("L1".to_string())
    }

    #[test]
    fn test_parse_prefix() {
        let prefix = Ipv6Prefix::parse("2001:db8:1::/64", &owner()).unwrap();
        assert_eq!(prefix.len(), 64);
        assert_eq!(prefix.to_string(), "2001:db8:1::/64");
    }

    #[test]
    fn test_host_bits_are_rejected() {
        match Ipv6Prefix::parse("2001:db8:1::42/64", &owner()) {
            Err(CompileError::InvalidPrefix { value, .. }) => assert_eq!(value, "2001:db8:1::42/64"),
            other => panic!("expected InvalidPrefix, got {:?}", other),
        }
        let prefix = Ipv6Prefix::parse("2001:db8:1::/64", &owner()).unwrap();
        assert_eq!(prefix.network(), "2001:db8:1::".parse::<Ipv6Addr>().unwrap());
    }

    #[test]
    fn test_invalid_prefixes() {
        for value in ["2001:db8::", "2001:db8::/129", "10.0.0.0/24", "nonsense/64", "2001:db8::/x"] {
            assert!(
                matches!(Ipv6Prefix::parse(value, &owner()), Err(CompileError::InvalidPrefix { .. })),
                "{} should be rejected",
                value
            );
        }
    }

    #[test]
    fn test_slash64_required() {
        match Ipv6Prefix::parse_slash64("2001:db8::/48", &owner()) {
            Err(CompileError::InvalidPrefixLength { found, .. }) => assert_eq!(found, 48),
            other => panic!("expected InvalidPrefixLength, got {:?}", other),
        }
    }

    #[test]
    fn test_host_offsets() {
        let prefix = Ipv6Prefix::parse("2001:100::/64", &owner()).unwrap();
        assert_eq!(prefix.host(1, 128).to_string(), "2001:100::1/128");
        assert_eq!(prefix.host(2, 64).to_string(), "2001:100::2/64");
        assert_eq!(prefix.host(10, 128).addr().to_string(), "2001:100::a");
    }
}
