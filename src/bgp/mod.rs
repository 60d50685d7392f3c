//! # BGP block generation
//!
//! Builds the complete `router bgp` block of one router:
//!
//! 1. Interior full mesh over loopbacks, sourced from `Loopback0`.
//! 2. Exterior sessions over the addresses of directly connected inter-AS
//!    links, one per distinct peer address.
//! 3. IPv6 unicast activation with `send-community`; border routers also set
//!    `next-hop-self` towards interior peers. Non-border routers must not,
//!    otherwise the true egress would become unreachable.
//! 4. Route origination.
//! 5. On border routers only, the policy objects of [`policy`] and their
//!    attachment to every exterior neighbor.

pub mod policy;

use crate::error::CompileError;
use crate::intent::Asn;
use crate::orchestrator::CompileContext;
use crate::topology::other_endpoint;
use log::debug;
use policy::{BorderPolicy, Relationship};
use std::collections::BTreeSet;
use std::net::Ipv6Addr;

/// Exterior BGP neighbor of a router
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExteriorPeer {
    pub address: Ipv6Addr,
    pub remote_as: Asn,
    pub router: String,
    pub relationship: Relationship,
}

/// Interior peer addresses of `router`: the loopbacks of every other router of
/// its AS, in AS router-list order. Empty unless interior mode is full mesh.
pub fn interior_peers(ctx: &CompileContext, router: &str) -> Result<Vec<Ipv6Addr>, CompileError> {
    if !ctx.intent.bgp.ibgp.is_full_mesh() {
        return Ok(Vec::new());
    }

    let asn = ctx.router(router)?.asn;
    ctx.autonomous_system(asn)?
        .routers
        .iter()
        .filter(|peer| peer.as_str() != router)
        .map(|peer| ctx.loopbacks.require(peer).map(|lo| lo.addr()))
        .collect()
}

/// Exterior peers of `router`, one per inter-AS link in adjacency order,
/// skipping any peer address already seen
pub fn exterior_peers(ctx: &CompileContext, router: &str) -> Result<Vec<ExteriorPeer>, CompileError> {
    let mut peers: Vec<ExteriorPeer> = Vec::new();

    for link_ref in ctx.adjacency.inter_as_links_of(router) {
        let link = link_ref.link;
        let other = other_endpoint(link, router)?;
        let address = ctx.link_addrs.require(&other.router, &other.interface)?.addr();

        if peers.iter().any(|p| p.address == address) {
            debug!("Router {}: exterior peer {} already declared, skipping link {}", router, address, link.name());
            continue;
        }

        peers.push(ExteriorPeer {
            address,
            remote_as: ctx.router(&other.router)?.asn,
            router: other.router.clone(),
            relationship: Relationship::from_declared(link.relationship.as_deref(), link.name()),
        });
    }

    Ok(peers)
}

/// Prefixes announced by `router`, in emission order
pub fn originated_prefixes(ctx: &CompileContext, router: &str) -> Result<Vec<String>, CompileError> {
    let asn = ctx.router(router)?.asn;
    let border = ctx.adjacency.is_border(router);

    let mut prefixes = vec![ctx.loopbacks.require(router)?.to_string()];

    for link_ref in ctx.adjacency.inter_as_links_of(router) {
        if let Some(subnet) = ctx.link_addrs.subnet(link_ref.index) {
            prefixes.push(subnet.to_string());
        }
    }

    if border {
        // so inbound exterior routes resolve via IGP to any interior loopback
        prefixes.extend(ctx.intra_as_subnets(asn));
        prefixes.extend(ctx.as_loopbacks(asn)?);
    }

    Ok(prefixes)
}

/// SELF address space of an AS: all its loopbacks and intra-AS subnets
pub fn self_prefixes(ctx: &CompileContext, asn: Asn) -> Result<BTreeSet<String>, CompileError> {
    let mut prefixes = ctx.as_loopbacks(asn)?;
    prefixes.extend(ctx.intra_as_subnets(asn));
    Ok(prefixes)
}

/// The full BGP block of `router`, or nothing when BGP is not required
pub fn build_bgp(ctx: &CompileContext, router: &str) -> Result<Vec<String>, CompileError> {
    if !ctx.intent.bgp.required {
        return Ok(Vec::new());
    }

    let local = ctx.router(router)?;
    let asn = local.asn;
    let border = ctx.adjacency.is_border(router);

    let mut lines = vec![
        format!("router bgp {}", asn),
        format!(" bgp router-id {}", local.router_id),
        " bgp log-neighbor-changes".to_string(),
        " no bgp default ipv4-unicast".to_string(),
    ];

    let ibgp_peers = interior_peers(ctx, router)?;
    for peer in &ibgp_peers {
        lines.push(format!(" neighbor {} remote-as {}", peer, asn));
        lines.push(format!(" neighbor {} update-source Loopback0", peer));
    }

    let ebgp_peers = exterior_peers(ctx, router)?;
    for peer in &ebgp_peers {
        lines.push(format!(" neighbor {} remote-as {}", peer.address, peer.remote_as));
    }

    lines.push(" !".to_string());
    lines.push(" address-family ipv6 unicast".to_string());

    for peer in &ibgp_peers {
        lines.push(format!("  neighbor {} activate", peer));
        if border {
            lines.push(format!("  neighbor {} next-hop-self", peer));
        }
        lines.push(format!("  neighbor {} send-community", peer));
    }

    for peer in &ebgp_peers {
        lines.push(format!("  neighbor {} activate", peer.address));
        lines.push(format!("  neighbor {} send-community", peer.address));
    }

    for prefix in originated_prefixes(ctx, router)? {
        lines.push(format!("  network {}", prefix));
    }

    if border {
        let policy = BorderPolicy::build(asn, &self_prefixes(ctx, asn)?);

        // leave the address family to declare the policy objects
        lines.push(" exit-address-family".to_string());
        lines.push("!".to_string());
        lines.extend(policy.lines());

        lines.push(format!("router bgp {}", asn));
        lines.push(" address-family ipv6 unicast".to_string());
        for peer in &ebgp_peers {
            let attachment = peer.relationship.attachment();
            lines.push(format!("  neighbor {} route-map {} out", peer.address, attachment.outbound));
            lines.push(format!("  neighbor {} route-map {} in", peer.address, attachment.inbound));
        }
    }

    lines.push(" exit-address-family".to_string());
    lines.push("exit".to_string());
    lines.push("!".to_string());

    debug!(
        "Router {}: {} interior and {} exterior BGP peers (border: {})",
        router,
        ibgp_peers.len(),
        ebgp_peers.len(),
        border
    );
    Ok(lines)
}
