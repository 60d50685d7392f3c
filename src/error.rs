//! Error types for intent compilation.
//!
//! Every stage of the pipeline returns `Result<T, CompileError>`. All failures
//! are validation failures and abort the whole run: the orchestrator runs every
//! check before any router configuration is generated.

use crate::intent::Asn;
use std::fmt;
use thiserror::Error;

/// The declared prefix an addressing error refers to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrefixOwner {
    /// Loopback pool of an autonomous system
    LoopbackPool(Asn),
    /// Subnet of a named link
    LinkSubnet(String),
}

impl fmt::Display for PrefixOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrefixOwner::LoopbackPool(asn) => write!(f, "AS {} loopback pool", asn),
            PrefixOwner::LinkSubnet(link) => write!(f, "Link {} subnet", link),
        }
    }
}

/// Intent compilation errors
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("{owner} must be /64, got /{found}")]
    InvalidPrefixLength { owner: PrefixOwner, found: u8 },

    #[error("{owner} is not a valid IPv6 prefix: '{value}'")]
    InvalidPrefix { owner: PrefixOwner, value: String },

    #[error("AS {asn} must define a non-empty routers list")]
    EmptyRouterSet { asn: Asn },

    #[error("Link {link} must have exactly 2 endpoints, got {found}")]
    EndpointCountMismatch { link: String, found: usize },

    #[error("Interface reused: {router}:{interface} is claimed by link {first_link} and link {second_link}")]
    DuplicateInterfaceUse {
        router: String,
        interface: String,
        first_link: String,
        second_link: String,
    },

    #[error("Router {router} is not an endpoint of link {link}")]
    RouterNotOnLink { router: String, link: String },

    #[error("AS {asn}: unsupported IGP type '{kind}' (expected none, ospfv3 or ripng)")]
    UnsupportedIgpType { asn: Asn, kind: String },

    #[error("AS {asn}: IGP {kind} requires '{param}'")]
    MissingIgpParameter {
        asn: Asn,
        kind: &'static str,
        param: &'static str,
    },

    #[error("{context} references undeclared router {router}")]
    UnknownRouter { router: String, context: String },

    #[error("Router {router} belongs to undeclared AS {asn}")]
    UnknownAs { router: String, asn: Asn },

    #[error("Router {router} is not listed in the routers of AS {asn}")]
    RouterNotInAs { router: String, asn: Asn },

    #[error("Router {router} is listed more than once across AS router lists (again in AS {asn})")]
    DuplicateRouterListing { router: String, asn: Asn },

    #[error("Router {router} has invalid router-id '{value}' (expected dotted IPv4 form)")]
    InvalidRouterId { router: String, value: String },

    #[error("Failed to read intent document: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON intent document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid YAML intent document: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_carry_context() {
        let err = CompileError::InvalidPrefixLength {
            owner: PrefixOwner::LoopbackPool(Asn(100)),
            found: 48,
        };
        assert_eq!(err.to_string(), "AS 100 loopback pool must be /64, got /48");

        let err = CompileError::DuplicateInterfaceUse {
            router: "R1".to_string(),
            interface: "g1/0".to_string(),
            first_link: "L1".to_string(),
            second_link: "L2".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("R1:g1/0"));
        assert!(msg.contains("L1") && msg.contains("L2"));
    }
}
