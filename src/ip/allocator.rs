//! Loopback and link address allocation.
//!
//! Addresses are derived, never chosen: router *i* (1-based) of an AS gets
//! `pool + i` as its /128 loopback, and the two endpoints of a link get
//! `subnet + 1` and `subnet + 2` as /64 interface addresses.

use super::prefix::{InterfaceAddr, Ipv6Prefix};
use crate::error::{CompileError, PrefixOwner};
use crate::intent::Intent;
use log::{debug, info};
use std::collections::BTreeMap;

/// Router name -> loopback address
#[derive(Debug, Default)]
pub struct LoopbackTable {
    by_router: BTreeMap<String, InterfaceAddr>,
}

impl LoopbackTable {
    pub fn get(&self, router: &str) -> Option<&InterfaceAddr> {
        self.by_router.get(router)
    }

    /// Loopback of a router, failing if the router was never allocated one
    pub fn require(&self, router: &str) -> Result<&InterfaceAddr, CompileError> {
        self.get(router).ok_or_else(|| CompileError::UnknownRouter {
            router: router.to_string(),
            context: "Loopback lookup".to_string(),
        })
    }

    pub fn len(&self) -> usize {
        self.by_router.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_router.is_empty()
    }
}

/// Address of one (router, interface) pair and the link that claimed it
#[derive(Debug, Clone)]
pub struct LinkAddress {
    pub addr: InterfaceAddr,
    pub link: String,
}

/// (router, interface) -> link address, plus the parsed subnet of every link
#[derive(Debug, Default)]
pub struct LinkAddressTable {
    by_interface: BTreeMap<(String, String), LinkAddress>,
    /// Indexed like `Intent::links`
    subnets: Vec<Ipv6Prefix>,
}

impl LinkAddressTable {
    pub fn get(&self, router: &str, interface: &str) -> Option<&LinkAddress> {
        self.by_interface
            .get(&(router.to_string(), interface.to_string()))
    }

    /// Address of a router interface, failing if no link claimed it
    pub fn require(&self, router: &str, interface: &str) -> Result<&InterfaceAddr, CompileError> {
        self.get(router, interface)
            .map(|la| &la.addr)
            .ok_or_else(|| CompileError::UnknownRouter {
                router: router.to_string(),
                context: format!("Interface {} lookup", interface),
            })
    }

    /// Normalized subnet of the link at `index` in the intent document
    pub fn subnet(&self, index: usize) -> Option<&Ipv6Prefix> {
        self.subnets.get(index)
    }

    pub fn len(&self) -> usize {
        self.by_interface.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_interface.is_empty()
    }
}

/// Allocate one /128 loopback per router from its AS loopback pool.
///
/// # Errors
/// * `InvalidPrefix` / `InvalidPrefixLength` if a pool is not a valid /64
/// * `EmptyRouterSet` if an AS lists no routers
pub fn allocate_loopbacks(intent: &Intent) -> Result<LoopbackTable, CompileError> {
    let mut table = LoopbackTable::default();

    for (asn, as_intent) in &intent.ases {
        let pool = Ipv6Prefix::parse_slash64(
            &as_intent.ip_pools.loopbacks,
            &PrefixOwner::LoopbackPool(*asn),
        )?;

        if as_intent.routers.is_empty() {
            return Err(CompileError::EmptyRouterSet { asn: *asn });
        }

        for (idx, router) in as_intent.routers.iter().enumerate() {
            let loopback = pool.host(idx as u128 + 1, 128);
            debug!("Assigned loopback {} to router {} (AS {})", loopback, router, asn);
            table.by_router.insert(router.clone(), loopback);
        }
    }

    info!("Allocated {} loopback addresses across {} ASes", table.len(), intent.ases.len());
    Ok(table)
}

/// Allocate the two interface addresses of every link.
///
/// # Errors
/// * `InvalidPrefix` / `InvalidPrefixLength` if a subnet is not a valid /64
/// * `EndpointCountMismatch` if a link does not have exactly two endpoints
/// * `DuplicateInterfaceUse` if a (router, interface) pair is claimed twice
pub fn allocate_link_ips(intent: &Intent) -> Result<LinkAddressTable, CompileError> {
    let mut table = LinkAddressTable::default();

    for link in &intent.links {
        let name = link.name();
        let subnet = Ipv6Prefix::parse_slash64(
            &link.subnet_v6,
            &PrefixOwner::LinkSubnet(name.to_string()),
        )?;

        if link.endpoints.len() != 2 {
            return Err(CompileError::EndpointCountMismatch {
                link: name.to_string(),
                found: link.endpoints.len(),
            });
        }

        for (offset, endpoint) in (1u128..).zip(&link.endpoints) {
            let key = (endpoint.router.clone(), endpoint.interface.clone());
            if let Some(existing) = table.by_interface.get(&key) {
                return Err(CompileError::DuplicateInterfaceUse {
                    router: endpoint.router.clone(),
                    interface: endpoint.interface.clone(),
                    first_link: existing.link.clone(),
                    second_link: name.to_string(),
                });
            }

            let addr = subnet.host(offset, 64);
            debug!("Assigned {} to {}:{} (link {})", addr, endpoint.router, endpoint.interface, name);
            table.by_interface.insert(
                key,
                LinkAddress {
                    addr,
                    link: name.to_string(),
                },
            );
        }

        table.subnets.push(subnet);
    }

    info!("Allocated {} interface addresses on {} links", table.len(), intent.links.len());
    Ok(table)
}
