//! Router to link adjacency.
//!
//! The index is built in one pass over the links and preserves document
//! order, which is the order interfaces and exterior neighbors appear in
//! generated configuration.

use crate::error::CompileError;
use crate::intent::{Endpoint, LinkIntent};
use std::collections::BTreeMap;

/// A link incident to a router, with its position in the intent document
#[derive(Debug, Clone, Copy)]
pub struct LinkRef<'a> {
    pub index: usize,
    pub link: &'a LinkIntent,
}

/// Router name -> incident links, in document order
#[derive(Debug, Default)]
pub struct AdjacencyIndex<'a> {
    by_router: BTreeMap<&'a str, Vec<LinkRef<'a>>>,
}

impl<'a> AdjacencyIndex<'a> {
    pub fn build(links: &'a [LinkIntent]) -> Self {
        let mut by_router: BTreeMap<&'a str, Vec<LinkRef<'a>>> = BTreeMap::new();
        for (index, link) in links.iter().enumerate() {
            for endpoint in &link.endpoints {
                by_router
                    .entry(endpoint.router.as_str())
                    .or_default()
                    .push(LinkRef { index, link });
            }
        }
        Self { by_router }
    }

    /// Links touching `router`, in document order. Empty for unknown routers.
    pub fn links_of(&self, router: &str) -> &[LinkRef<'a>] {
        self.by_router.get(router).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Inter-AS links touching `router`
    pub fn inter_as_links_of<'s>(&'s self, router: &str) -> impl Iterator<Item = &'s LinkRef<'a>> + 's {
        self.links_of(router).iter().filter(|l| l.link.is_inter_as())
    }

    /// A router is a border router iff it has at least one inter-AS link
    pub fn is_border(&self, router: &str) -> bool {
        self.inter_as_links_of(router).next().is_some()
    }
}

/// The endpoint of `link` that belongs to `router`
pub fn endpoint_of<'l>(link: &'l LinkIntent, router: &str) -> Result<&'l Endpoint, CompileError> {
    match link.endpoints.as_slice() {
        [a, _] if a.router == router => Ok(a),
        [_, b] if b.router == router => Ok(b),
        _ => Err(not_on_link(link, router)),
    }
}

/// The endpoint of `link` on the far side from `router`
pub fn other_endpoint<'l>(link: &'l LinkIntent, router: &str) -> Result<&'l Endpoint, CompileError> {
    match link.endpoints.as_slice() {
        [a, b] if a.router == router => Ok(b),
        [a, b] if b.router == router => Ok(a),
        _ => Err(not_on_link(link, router)),
    }
}

fn not_on_link(link: &LinkIntent, router: &str) -> CompileError {
    CompileError::RouterNotOnLink {
        router: router.to_string(),
        link: link.name().to_string(),
    }
}
