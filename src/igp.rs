//! Interior routing stanzas.
//!
//! Each AS picks one IGP variant. The variant produces a global stanza (the
//! routing process) and per-interface lines (process activation). Only the
//! loopback and intra-AS interfaces ever receive interface lines.

use crate::error::CompileError;
use crate::intent::{Asn, IgpArea, IgpIntent};

/// Default RIPng process name
pub const DEFAULT_RIPNG_PROCESS: &str = "RIPNG";

/// Resolved IGP of an autonomous system
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IgpVariant {
    /// No interior routing protocol
    None,
    /// Link-state, area based (OSPFv3)
    Ospfv3 { process_id: u32, area: IgpArea },
    /// Distance-vector (RIPng)
    Ripng { process_name: String },
}

impl IgpVariant {
    /// Resolve the declared IGP of an AS, checking that its variant is
    /// supported and that the parameters it needs are present.
    pub fn resolve(asn: Asn, igp: &IgpIntent) -> Result<Self, CompileError> {
        match igp.kind.as_str() {
            "none" => Ok(IgpVariant::None),
            "ospfv3" => {
                let process_id = igp.process_id.ok_or(CompileError::MissingIgpParameter {
                    asn,
                    kind: "ospfv3",
                    param: "process_id",
                })?;
                let area = igp.area.clone().ok_or(CompileError::MissingIgpParameter {
                    asn,
                    kind: "ospfv3",
                    param: "area",
                })?;
                Ok(IgpVariant::Ospfv3 { process_id, area })
            }
            "ripng" => Ok(IgpVariant::Ripng {
                process_name: igp
                    .process_name
                    .clone()
                    .unwrap_or_else(|| DEFAULT_RIPNG_PROCESS.to_string()),
            }),
            other => Err(CompileError::UnsupportedIgpType {
                asn,
                kind: other.to_string(),
            }),
        }
    }

    /// Global routing-process stanza, terminated by a `!` separator
    pub fn global_lines(&self, router_id: &str) -> Vec<String> {
        match self {
            IgpVariant::None => vec!["!".to_string()],
            IgpVariant::Ospfv3 { process_id, .. } => vec![
                format!("ipv6 router ospf {}", process_id),
                format!(" router-id {}", router_id),
                "exit".to_string(),
                "!".to_string(),
            ],
            IgpVariant::Ripng { process_name } => vec![
                format!("ipv6 router rip {}", process_name),
                "exit".to_string(),
                "!".to_string(),
            ],
        }
    }

    /// Interface activation lines. `cost` is an explicit link cost override
    /// and only has an effect for link-state variants.
    pub fn interface_lines(&self, cost: Option<u32>) -> Vec<String> {
        match self {
            IgpVariant::None => Vec::new(),
            IgpVariant::Ospfv3 { process_id, area } => {
                let mut lines = vec![format!(" ipv6 ospf {} area {}", process_id, area)];
                if let Some(cost) = cost {
                    lines.push(format!(" ipv6 ospf cost {}", cost));
                }
                lines
            }
            IgpVariant::Ripng { process_name } => {
                vec![format!(" ipv6 rip {} enable", process_name)]
            }
        }
    }
}
