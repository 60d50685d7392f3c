//! Intent document model.
//!
//! The intent document describes autonomous systems, routers, links and the
//! global BGP switches. It is parsed once (see [`crate::intent_loader`]) and
//! never mutated afterwards; every later stage derives read-only tables from it.

use crate::error::CompileError;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::net::Ipv4Addr;

/// Autonomous system number.
///
/// Accepted in the document either as an integer (`100`) or as a numeric
/// string (`"100"`), since JSON object keys are always strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Asn(pub u32);

impl fmt::Display for Asn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

struct AsnVisitor;

impl<'de> Visitor<'de> for AsnVisitor {
    type Value = Asn;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an AS number as integer or numeric string")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Asn, E> {
        u32::try_from(v)
            .map(Asn)
            .map_err(|_| E::custom(format!("AS number {} out of range", v)))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Asn, E> {
        u32::try_from(v)
            .map(Asn)
            .map_err(|_| E::custom(format!("AS number {} out of range", v)))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Asn, E> {
        v.trim()
            .parse::<u32>()
            .map(Asn)
            .map_err(|_| E::custom(format!("invalid AS number '{}'", v)))
    }
}

impl<'de> Deserialize<'de> for Asn {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(AsnVisitor)
    }
}

/// Complete intent document
#[derive(Debug, Clone, Deserialize)]
pub struct Intent {
    pub ases: BTreeMap<Asn, AsIntent>,
    pub routers: BTreeMap<String, RouterIntent>,
    #[serde(default)]
    pub links: Vec<LinkIntent>,
    #[serde(default)]
    pub bgp: BgpIntent,
}

/// One autonomous system
#[derive(Debug, Clone, Deserialize)]
pub struct AsIntent {
    pub ip_pools: IpPools,
    /// Router order is significant: it drives loopback allocation.
    #[serde(default)]
    pub routers: Vec<String>,
    #[serde(default)]
    pub igp: IgpIntent,
}

/// Address pools declared by an AS
#[derive(Debug, Clone, Deserialize)]
pub struct IpPools {
    pub loopbacks: String,
}

/// Interior routing protocol parameters of an AS.
///
/// The variant is kept as free text here and resolved by
/// [`crate::igp::IgpVariant::resolve`], so that an unknown variant is reported
/// with its AS instead of as a generic parse failure.
#[derive(Debug, Clone, Deserialize)]
pub struct IgpIntent {
    #[serde(rename = "type")]
    pub kind: String,
    pub process_id: Option<u32>,
    pub area: Option<IgpArea>,
    pub process_name: Option<String>,
}

impl Default for IgpIntent {
    fn default() -> Self {
        Self {
            kind: "none".to_string(),
            process_id: None,
            area: None,
            process_name: None,
        }
    }
}

/// OSPF area identifier, either numeric (`0`) or dotted (`0.0.0.0`)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum IgpArea {
    Id(u32),
    Dotted(String),
}

impl fmt::Display for IgpArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IgpArea::Id(id) => write!(f, "{}", id),
            IgpArea::Dotted(area) => write!(f, "{}", area),
        }
    }
}

/// One router
#[derive(Debug, Clone, Deserialize)]
pub struct RouterIntent {
    #[serde(rename = "as")]
    pub asn: Asn,
    pub router_id: String,
}

/// Link kind: inside one AS or across two
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    IntraAs,
    InterAs,
}

/// Point-to-point link between two router interfaces
#[derive(Debug, Clone, Deserialize)]
pub struct LinkIntent {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: LinkKind,
    /// Owning AS of an intra-AS link. Defaults to the AS of endpoint 0.
    #[serde(rename = "as", default)]
    pub asn: Option<Asn>,
    pub subnet_v6: String,
    #[serde(default)]
    pub endpoints: Vec<Endpoint>,
    /// Business relationship of the remote side (inter-AS links only)
    #[serde(default)]
    pub relationship: Option<String>,
    #[serde(default)]
    pub ospf_cost: Option<u32>,
}

impl LinkIntent {
    /// Link name used in diagnostics
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or("<unnamed>")
    }

    pub fn is_inter_as(&self) -> bool {
        self.kind == LinkKind::InterAs
    }
}

/// One side of a link
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Endpoint {
    pub router: String,
    pub interface: String,
}

/// Global BGP switches
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BgpIntent {
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub ibgp: IbgpIntent,
}

/// Interior BGP session layout
#[derive(Debug, Clone, Deserialize)]
pub struct IbgpIntent {
    #[serde(default = "default_ibgp_mode")]
    pub mode: String,
}

fn default_ibgp_mode() -> String {
    "full_mesh".to_string()
}

impl Default for IbgpIntent {
    fn default() -> Self {
        Self { mode: default_ibgp_mode() }
    }
}

impl IbgpIntent {
    /// Full mesh is the only interior layout; any other mode emits no interior sessions.
    pub fn is_full_mesh(&self) -> bool {
        matches!(self.mode.as_str(), "full_mesh" | "full-mesh")
    }
}

impl Intent {
    /// Validate cross references between ASes, routers and links.
    ///
    /// Addressing checks (prefix lengths, endpoint counts, interface reuse)
    /// belong to [`crate::ip::allocator`] and IGP checks to [`crate::igp`].
    pub fn validate(&self) -> Result<(), CompileError> {
        // every router listed by an AS must exist, and appear only once overall
        let mut listed = BTreeSet::new();
        for (asn, as_intent) in &self.ases {
            if as_intent.routers.is_empty() {
                return Err(CompileError::EmptyRouterSet { asn: *asn });
            }
            for router in &as_intent.routers {
                if !self.routers.contains_key(router) {
                    return Err(CompileError::UnknownRouter {
                        router: router.clone(),
                        context: format!("AS {} router list", asn),
                    });
                }
                if !listed.insert(router.as_str()) {
                    return Err(CompileError::DuplicateRouterListing {
                        router: router.clone(),
                        asn: *asn,
                    });
                }
            }
        }

        for (name, router) in &self.routers {
            let as_intent = self.ases.get(&router.asn).ok_or_else(|| CompileError::UnknownAs {
                router: name.clone(),
                asn: router.asn,
            })?;
            if !as_intent.routers.iter().any(|r| r == name) {
                return Err(CompileError::RouterNotInAs {
                    router: name.clone(),
                    asn: router.asn,
                });
            }
            if router.router_id.parse::<Ipv4Addr>().is_err() {
                return Err(CompileError::InvalidRouterId {
                    router: name.clone(),
                    value: router.router_id.clone(),
                });
            }
        }

        for link in &self.links {
            for endpoint in &link.endpoints {
                if !self.routers.contains_key(&endpoint.router) {
                    return Err(CompileError::UnknownRouter {
                        router: endpoint.router.clone(),
                        context: format!("Link {}", link.name()),
                    });
                }
            }
            if let Some(asn) = link.asn {
                if !self.ases.contains_key(&asn) {
                    return Err(CompileError::UnknownAs {
                        router: format!("(link {})", link.name()),
                        asn,
                    });
                }
            }
        }

        Ok(())
    }

    /// AS a router belongs to
    pub fn router_as(&self, router: &str) -> Result<Asn, CompileError> {
        self.routers
            .get(router)
            .map(|r| r.asn)
            .ok_or_else(|| CompileError::UnknownRouter {
                router: router.to_string(),
                context: "Router lookup".to_string(),
            })
    }

    /// Owning AS of an intra-AS link: its explicit `as`, else the AS of endpoint 0.
    /// Inter-AS links have no owner.
    pub fn link_owner(&self, link: &LinkIntent) -> Option<Asn> {
        if link.is_inter_as() {
            return None;
        }
        link.asn.or_else(|| {
            link.endpoints
                .first()
                .and_then(|ep| self.routers.get(&ep.router))
                .map(|r| r.asn)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_AS: &str = r#"
ases:
  100:
    ip_pools:
      loopbacks: "2001:100::/64"
    routers: [R1, R2]
    igp:
      type: ospfv3
      process_id: 1
      area: 0
  "200":
    ip_pools:
      loopbacks: "2001:200::/64"
    routers: [R3]
    igp:
      type: ripng
routers:
  R1: { as: 100, router_id: "1.1.1.1" }
  R2: { as: "100", router_id: "2.2.2.2" }
  R3: { as: 200, router_id: "3.3.3.3" }
links:
  - name: L1
    type: intra_as
    subnet_v6: "2001:100:1::/64"
    endpoints:
      - { router: R1, interface: GigabitEthernet1/0 }
      - { router: R2, interface: GigabitEthernet1/0 }
  - name: L2
    type: inter_as
    relationship: provider
    subnet_v6: "2001:12::/64"
    endpoints:
      - { router: R2, interface: GigabitEthernet2/0 }
      - { router: R3, interface: GigabitEthernet1/0 }
bgp:
  required: true
"#;

    #[test]
    fn test_intent_parsing() {
        let intent: Intent = serde_yaml::from_str(TWO_AS).unwrap();
        assert_eq!(intent.ases.len(), 2);
        assert!(intent.ases.contains_key(&Asn(200)));
        assert_eq!(intent.routers["R2"].asn, Asn(100));
        assert_eq!(intent.links[1].kind, LinkKind::InterAs);
        assert!(intent.bgp.required);
        assert!(intent.bgp.ibgp.is_full_mesh());
        assert_eq!(intent.ases[&Asn(100)].igp.area, Some(IgpArea::Id(0)));
        assert!(intent.validate().is_ok());
    }

    #[test]
    fn test_json_string_as_keys() {
        let json = r#"{
            "ases": { "65001": { "ip_pools": { "loopbacks": "2001:db8::/64" }, "routers": ["A"] } },
            "routers": { "A": { "as": "65001", "router_id": "10.0.0.1" } }
        }"#;
        let intent: Intent = serde_json::from_str(json).unwrap();
        assert_eq!(intent.routers["A"].asn, Asn(65001));
        assert_eq!(intent.ases[&Asn(65001)].igp.kind, "none");
        assert!(!intent.bgp.required);
        assert!(intent.validate().is_ok());
    }

    #[test]
    fn test_link_owner() {
        let intent: Intent = serde_yaml::from_str(TWO_AS).unwrap();
        assert_eq!(intent.link_owner(&intent.links[0]), Some(Asn(100)));
        assert_eq!(intent.link_owner(&intent.links[1]), None);

        let mut explicit = intent.links[0].clone();
        explicit.asn = Some(Asn(200));
        assert_eq!(intent.link_owner(&explicit), Some(Asn(200)));
    }

    #[test]
    fn test_validation_errors() {
        let mut intent: Intent = serde_yaml::from_str(TWO_AS).unwrap();
        intent.links[0].endpoints[1].router = "R9".to_string();
        assert!(matches!(intent.validate(), Err(CompileError::UnknownRouter { .. })));

        let mut intent: Intent = serde_yaml::from_str(TWO_AS).unwrap();
        intent.routers.get_mut("R3").unwrap().asn = Asn(300);
        assert!(matches!(intent.validate(), Err(CompileError::UnknownAs { .. })));

        let mut intent: Intent = serde_yaml::from_str(TWO_AS).unwrap();
        intent.routers.get_mut("R1").unwrap().router_id = "one".to_string();
        assert!(matches!(intent.validate(), Err(CompileError::InvalidRouterId { .. })));

        let mut intent: Intent = serde_yaml::from_str(TWO_AS).unwrap();
        intent.ases.get_mut(&Asn(200)).unwrap().routers.push("R1".to_string());
        assert!(matches!(intent.validate(), Err(CompileError::DuplicateRouterListing { .. })));

        let mut intent: Intent = serde_yaml::from_str(TWO_AS).unwrap();
        intent.ases.get_mut(&Asn(100)).unwrap().routers.retain(|r| r != "R2");
        assert!(matches!(intent.validate(), Err(CompileError::RouterNotInAs { .. })));

        // an empty AS is reported as such, not as its routers being unlisted
        let mut intent: Intent = serde_yaml::from_str(TWO_AS).unwrap();
        intent.ases.get_mut(&Asn(200)).unwrap().routers.clear();
        match intent.validate() {
            Err(CompileError::EmptyRouterSet { asn }) => assert_eq!(asn, Asn(200)),
            other => panic!("expected EmptyRouterSet, got {:?}", other),
        }
    }
}
