//! Per-router configuration assembly.
//!
//! Orders every stanza of a router into one text artifact:
//! header, loopback, physical interfaces in adjacency order, IGP process,
//! then the BGP block. Every interface is forced `no shutdown`.

use crate::bgp::build_bgp;
use crate::error::CompileError;
use crate::intent::{Asn, LinkKind};
use crate::orchestrator::CompileContext;
use crate::topology::endpoint_of;

/// Name of the loopback interface carrying the router's /128
pub const LOOPBACK_INTERFACE: &str = "Loopback0";

/// Generated configuration of one router. Immutable once assembled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouterConfig {
    name: String,
    asn: Asn,
    border: bool,
    text: String,
}

impl RouterConfig {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn asn(&self) -> Asn {
        self.asn
    }

    /// Whether the router has at least one inter-AS link
    pub fn is_border(&self) -> bool {
        self.border
    }

    /// Complete command sequence, newline terminated
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text.lines()
    }

    pub fn line_count(&self) -> usize {
        self.text.lines().count()
    }
}

/// Assemble the configuration of `router`
pub fn assemble_router(ctx: &CompileContext, router: &str) -> Result<RouterConfig, CompileError> {
    let local = ctx.router(router)?;
    let igp = ctx.igp(local.asn)?;

    let mut lines: Vec<String> = vec![
        "!".to_string(),
        format!("hostname {}", router),
        "!".to_string(),
        "no ip domain-lookup".to_string(),
        "ipv6 unicast-routing".to_string(),
        "!".to_string(),
    ];

    // Loopback0
    lines.push(format!("interface {}", LOOPBACK_INTERFACE));
    lines.push(" no ip address".to_string());
    lines.push(format!(" ipv6 address {}", ctx.loopbacks.require(router)?));
    lines.extend(igp.interface_lines(None));
    close_interface(&mut lines);

    // Physical interfaces
    for link_ref in ctx.adjacency.links_of(router) {
        let link = link_ref.link;
        let endpoint = endpoint_of(link, router)?;
        let addr = ctx.link_addrs.require(router, &endpoint.interface)?;

        lines.push(format!("interface {}", endpoint.interface));
        lines.push(" no ip address".to_string());
        lines.push(" ipv6 enable".to_string());
        lines.push(format!(" ipv6 address {}", addr));
        // IGP on intra-AS links only
        if link.kind == LinkKind::IntraAs {
            lines.extend(igp.interface_lines(link.ospf_cost));
        }
        close_interface(&mut lines);
    }

    lines.extend(igp.global_lines(&local.router_id));
    lines.extend(build_bgp(ctx, router)?);
    lines.push("!".to_string());

    let mut text = lines.join("\n");
    text.push('\n');

    Ok(RouterConfig {
        name: router.to_string(),
        asn: local.asn,
        border: ctx.adjacency.is_border(router),
        text,
    })
}

/// Interfaces are never left shut down by omission
fn close_interface(lines: &mut Vec<String>) {
    lines.push(" no shutdown".to_string());
    lines.push("exit".to_string());
    lines.push("!".to_string());
}
