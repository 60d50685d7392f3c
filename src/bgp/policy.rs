//! # Export policy objects
//!
//! Border routers enforce relationship based route visibility with three kinds
//! of objects:
//!
//! - **Community lists** naming the SELF and CLIENT tags of the local AS.
//! - **Prefix list** `PL-SELF` enumerating the address space the AS owns.
//! - **Route maps**: one inbound tagging map per relationship, and two
//!   outbound maps. Peers and providers only see our own space and our
//!   clients' routes; clients see everything.
//!
//! Every object renders to configuration lines with a fixed, deterministic
//! order.

use crate::intent::Asn;
use log::warn;
use std::collections::BTreeSet;
use std::fmt;

pub const COMM_LIST_SELF: &str = "COMM-SELF";
pub const COMM_LIST_CLIENT: &str = "COMM-CLIENT";
pub const PREFIX_LIST_SELF: &str = "PL-SELF";

pub const RM_IN_CLIENT: &str = "RM-IN-CLIENT";
pub const RM_IN_PEER: &str = "RM-IN-PEER";
pub const RM_IN_PROV: &str = "RM-IN-PROV";
pub const RM_OUT_PEERPROV: &str = "RM-OUT-PEERPROV";
pub const RM_OUT_CLIENT: &str = "RM-OUT-CLIENT";

/// Well-known community suffixes, scoped by the local AS number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommunityTag {
    /// Routes originated by the local AS
    SelfOrigin,
    Client,
    Peer,
    Provider,
}

impl CommunityTag {
    pub fn suffix(self) -> u16 {
        match self {
            CommunityTag::SelfOrigin => 50,
            CommunityTag::Client => 100,
            CommunityTag::Peer => 200,
            CommunityTag::Provider => 300,
        }
    }

    pub fn of(self, asn: Asn) -> Community {
        Community { asn, tag: self }
    }
}

/// A standard community `<asn>:<suffix>`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Community {
    pub asn: Asn,
    pub tag: CommunityTag,
}

impl fmt::Display for Community {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.asn, self.tag.suffix())
    }
}

/// Business relationship of the remote side of an exterior link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relationship {
    Client,
    Peer,
    Provider,
}

impl Relationship {
    /// Classify a declared relationship. Absent or unrecognized values are
    /// treated as `Peer`.
    pub fn from_declared(declared: Option<&str>, link: &str) -> Self {
        match declared {
            None | Some("peer") => Relationship::Peer,
            Some("client") => Relationship::Client,
            Some("provider") => Relationship::Provider,
            Some(other) => {
                warn!("Link {}: unrecognized relationship '{}', treating as peer", link, other);
                Relationship::Peer
            }
        }
    }

    /// Route maps attached to a neighbor with this relationship
    pub fn attachment(self) -> PolicyAttachment {
        match self {
            Relationship::Client => PolicyAttachment {
                outbound: RM_OUT_CLIENT,
                inbound: RM_IN_CLIENT,
            },
            Relationship::Provider => PolicyAttachment {
                outbound: RM_OUT_PEERPROV,
                inbound: RM_IN_PROV,
            },
            Relationship::Peer => PolicyAttachment {
                outbound: RM_OUT_PEERPROV,
                inbound: RM_IN_PEER,
            },
        }
    }

    /// Local preference assigned to routes learned over this relationship
    pub fn local_preference(self) -> u32 {
        match self {
            Relationship::Client => 200,
            Relationship::Peer => 150,
            Relationship::Provider => 50,
        }
    }

    pub fn community_tag(self) -> CommunityTag {
        match self {
            Relationship::Client => CommunityTag::Client,
            Relationship::Peer => CommunityTag::Peer,
            Relationship::Provider => CommunityTag::Provider,
        }
    }
}

/// Outbound and inbound route map names for one neighbor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolicyAttachment {
    pub outbound: &'static str,
    pub inbound: &'static str,
}

/// Permit or deny
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Permit,
    Deny,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Permit => write!(f, "permit"),
            Action::Deny => write!(f, "deny"),
        }
    }
}

/// Standard community list matching a single community
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommunityList {
    pub name: &'static str,
    pub community: Community,
}

impl CommunityList {
    pub fn line(&self) -> String {
        format!("ip community-list standard {} permit {}", self.name, self.community)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixListEntry {
    pub seq: u32,
    pub action: Action,
    pub prefix: String,
}

/// IPv6 prefix list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixList {
    pub name: &'static str,
    pub entries: Vec<PrefixListEntry>,
}

impl PrefixList {
    /// The SELF prefix list: a baseline `deny ::/0` at sequence 5, then one
    /// permit per prefix in ascending textual order, numbered 10, 20, 30...
    pub fn self_prefixes(prefixes: &BTreeSet<String>) -> Self {
        let mut entries = vec![PrefixListEntry {
            seq: 5,
            action: Action::Deny,
            prefix: "::/0".to_string(),
        }];
        entries.extend(prefixes.iter().zip((10u32..).step_by(10)).map(|(prefix, seq)| {
            PrefixListEntry {
                seq,
                action: Action::Permit,
                prefix: prefix.clone(),
            }
        }));
        Self {
            name: PREFIX_LIST_SELF,
            entries,
        }
    }

    pub fn lines(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|e| format!("ipv6 prefix-list {} seq {} {} {}", self.name, e.seq, e.action, e.prefix))
            .collect()
    }
}

/// One sequence of a route map, with its match and set clauses
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMapEntry {
    pub name: &'static str,
    pub action: Action,
    pub seq: u32,
    pub matches: Vec<String>,
    pub sets: Vec<String>,
}

impl RouteMapEntry {
    fn new(name: &'static str, action: Action, seq: u32) -> Self {
        Self {
            name,
            action,
            seq,
            matches: Vec::new(),
            sets: Vec::new(),
        }
    }

    fn match_clause(mut self, clause: String) -> Self {
        self.matches.push(clause);
        self
    }

    fn set_clause(mut self, clause: String) -> Self {
        self.sets.push(clause);
        self
    }

    /// Header, match clauses, set clauses, and a closing `!`
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![format!("route-map {} {} {}", self.name, self.action, self.seq)];
        lines.extend(self.matches.iter().map(|m| format!(" match {}", m)));
        lines.extend(self.sets.iter().map(|s| format!(" set {}", s)));
        lines.push("!".to_string());
        lines
    }
}

/// Inbound map tagging routes learned over `relationship`
fn inbound_tagging(asn: Asn, name: &'static str, relationship: Relationship) -> RouteMapEntry {
    RouteMapEntry::new(name, Action::Permit, 10)
        .set_clause(format!("community {} additive", relationship.community_tag().of(asn)))
        .set_clause(format!("local-preference {}", relationship.local_preference()))
}

/// All policy objects of a border router
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BorderPolicy {
    pub community_lists: Vec<CommunityList>,
    pub prefix_list: PrefixList,
    pub route_maps: Vec<RouteMapEntry>,
}

impl BorderPolicy {
    /// Build the policy objects of AS `asn` whose own address space is `self_prefixes`
    pub fn build(asn: Asn, self_prefixes: &BTreeSet<String>) -> Self {
        let comm_self = CommunityTag::SelfOrigin.of(asn);
        let comm_client = CommunityTag::Client.of(asn);

        let community_lists = vec![
            CommunityList { name: COMM_LIST_SELF, community: comm_self },
            CommunityList { name: COMM_LIST_CLIENT, community: comm_client },
        ];

        let route_maps = vec![
            inbound_tagging(asn, RM_IN_CLIENT, Relationship::Client),
            inbound_tagging(asn, RM_IN_PEER, Relationship::Peer),
            inbound_tagging(asn, RM_IN_PROV, Relationship::Provider),
            RouteMapEntry::new(RM_OUT_PEERPROV, Action::Permit, 10)
                .match_clause(format!("ipv6 address prefix-list {}", PREFIX_LIST_SELF))
                .set_clause(format!("community {} additive", comm_self)),
            RouteMapEntry::new(RM_OUT_PEERPROV, Action::Permit, 20)
                .match_clause(format!("community {}", COMM_LIST_CLIENT)),
            RouteMapEntry::new(RM_OUT_PEERPROV, Action::Deny, 100),
            RouteMapEntry::new(RM_OUT_CLIENT, Action::Permit, 10),
        ];

        Self {
            community_lists,
            prefix_list: PrefixList::self_prefixes(self_prefixes),
            route_maps,
        }
    }

    /// Object declarations, each group followed by a `!` separator
    pub fn lines(&self) -> Vec<String> {
        let mut lines: Vec<String> = self.community_lists.iter().map(CommunityList::line).collect();
        lines.push("!".to_string());
        lines.extend(self.prefix_list.lines());
        lines.push("!".to_string());
        for entry in &self.route_maps {
            lines.extend(entry.lines());
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefixes(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_communities() {
        assert_eq!(CommunityTag::SelfOrigin.of(Asn(100)).to_string(), "100:50");
        assert_eq!(CommunityTag::Client.of(Asn(100)).to_string(), "100:100");
        assert_eq!(CommunityTag::Peer.of(Asn(65001)).to_string(), "65001:200");
        assert_eq!(CommunityTag::Provider.of(Asn(7)).to_string(), "7:300");
    }

    #[test]
    fn test_relationship_classification() {
        assert_eq!(Relationship::from_declared(Some("client"), "L"), Relationship::Client);
        assert_eq!(Relationship::from_declared(Some("provider"), "L"), Relationship::Provider);
        // spellings are matched exactly
        assert_eq!(Relationship::from_declared(Some("Provider "), "L"), Relationship::Peer);
        assert_eq!(Relationship::from_declared(Some("Client"), "L"), Relationship::Peer);
        assert_eq!(Relationship::from_declared(Some("peer"), "L"), Relationship::Peer);
        assert_eq!(Relationship::from_declared(None, "L"), Relationship::Peer);
        assert_eq!(Relationship::from_declared(Some("sibling"), "L"), Relationship::Peer);
    }

    #[test]
    fn test_route_map_selection() {
        let client = Relationship::Client.attachment();
        assert_eq!((client.outbound, client.inbound), ("RM-OUT-CLIENT", "RM-IN-CLIENT"));
        let provider = Relationship::Provider.attachment();
        assert_eq!((provider.outbound, provider.inbound), ("RM-OUT-PEERPROV", "RM-IN-PROV"));
        let peer = Relationship::Peer.attachment();
        assert_eq!((peer.outbound, peer.inbound), ("RM-OUT-PEERPROV", "RM-IN-PEER"));
    }

    #[test]
    fn test_self_prefix_list_order_and_sequence() {
        let list = PrefixList::self_prefixes(&prefixes(&[
            "2001:100::2/128",
            "2001:100:1::/64",
            "2001:100::1/128",
        ]));
        assert_eq!(
            list.lines(),
            vec![
                "ipv6 prefix-list PL-SELF seq 5 deny ::/0",
                "ipv6 prefix-list PL-SELF seq 10 permit 2001:100:1::/64",
                "ipv6 prefix-list PL-SELF seq 20 permit 2001:100::1/128",
                "ipv6 prefix-list PL-SELF seq 30 permit 2001:100::2/128",
            ]
        );
    }

    #[test]
    fn test_local_preference_tiers() {
        assert!(Relationship::Client.local_preference() > Relationship::Peer.local_preference());
        assert!(Relationship::Peer.local_preference() > Relationship::Provider.local_preference());
    }

    #[test]
    fn test_border_policy_lines() {
        let policy = BorderPolicy::build(Asn(100), &prefixes(&["2001:100::1/128"]));
        let lines = policy.lines();
        let expected = vec![
            "ip community-list standard COMM-SELF permit 100:50",
            "ip community-list standard COMM-CLIENT permit 100:100",
            "!",
            "ipv6 prefix-list PL-SELF seq 5 deny ::/0",
            "ipv6 prefix-list PL-SELF seq 10 permit 2001:100::1/128",
            "!",
            "route-map RM-IN-CLIENT permit 10",
            " set community 100:100 additive",
            " set local-preference 200",
            "!",
            "route-map RM-IN-PEER permit 10",
            " set community 100:200 additive",
            " set local-preference 150",
            "!",
            "route-map RM-IN-PROV permit 10",
            " set community 100:300 additive",
            " set local-preference 50",
            "!",
            "route-map RM-OUT-PEERPROV permit 10",
            " match ipv6 address prefix-list PL-SELF",
            " set community 100:50 additive",
            "!",
            "route-map RM-OUT-PEERPROV permit 20",
            " match community COMM-CLIENT",
            "!",
            "route-map RM-OUT-PEERPROV deny 100",
            "!",
            "route-map RM-OUT-CLIENT permit 10",
            "!",
        ];
        assert_eq!(lines, expected);
    }
}
