//! IPv6 address allocation.
//!
//! This module derives every address used in generated configuration from the
//! pools and subnets declared in the intent document: one /128 loopback per
//! router and one /64 host address per link endpoint.

pub mod prefix;
pub mod allocator;

// Re-export commonly used types
pub use prefix::{InterfaceAddr, Ipv6Prefix};
pub use allocator::{allocate_link_ips, allocate_loopbacks, LinkAddress, LinkAddressTable, LoopbackTable};
