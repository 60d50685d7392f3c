//! Compilation orchestrator.
//!
//! This module coordinates the whole run: every validation step executes
//! first, so that any invalid input aborts before a single router
//! configuration exists. Router generation then runs in parallel over the
//! read-only tables, and the finished artifacts are handed to an output sink.

use crate::assembler::{assemble_router, RouterConfig};
use crate::error::CompileError;
use crate::igp::IgpVariant;
use crate::intent::{AsIntent, Asn, Intent, RouterIntent};
use crate::ip::{allocate_link_ips, allocate_loopbacks, LinkAddressTable, LoopbackTable};
use crate::output::ConfigSink;
use crate::topology::AdjacencyIndex;
use log::{debug, info};
use rayon::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

/// Read-only tables shared by every router generator
#[derive(Debug)]
pub struct CompileContext<'a> {
    pub intent: &'a Intent,
    pub loopbacks: LoopbackTable,
    pub link_addrs: LinkAddressTable,
    pub adjacency: AdjacencyIndex<'a>,
    pub igps: BTreeMap<Asn, IgpVariant>,
}

impl<'a> CompileContext<'a> {
    /// Run every validation step and derive the shared tables
    pub fn prepare(intent: &'a Intent) -> Result<Self, CompileError> {
        intent.validate()?;

        let loopbacks = allocate_loopbacks(intent)?;
        let link_addrs = allocate_link_ips(intent)?;

        let mut igps = BTreeMap::new();
        for (asn, as_intent) in &intent.ases {
            igps.insert(*asn, IgpVariant::resolve(*asn, &as_intent.igp)?);
        }

        let adjacency = AdjacencyIndex::build(&intent.links);

        Ok(Self {
            intent,
            loopbacks,
            link_addrs,
            adjacency,
            igps,
        })
    }

    pub fn router(&self, name: &str) -> Result<&'a RouterIntent, CompileError> {
        self.intent
            .routers
            .get(name)
            .ok_or_else(|| CompileError::UnknownRouter {
                router: name.to_string(),
                context: "Router lookup".to_string(),
            })
    }

    pub fn autonomous_system(&self, asn: Asn) -> Result<&'a AsIntent, CompileError> {
        self.intent.ases.get(&asn).ok_or_else(|| CompileError::UnknownAs {
            router: "(lookup)".to_string(),
            asn,
        })
    }

    pub fn igp(&self, asn: Asn) -> Result<&IgpVariant, CompileError> {
        self.igps.get(&asn).ok_or_else(|| CompileError::UnknownAs {
            router: "(IGP lookup)".to_string(),
            asn,
        })
    }

    /// Subnets of all intra-AS links owned by `asn`, in textual order
    pub fn intra_as_subnets(&self, asn: Asn) -> BTreeSet<String> {
        self.intent
            .links
            .iter()
            .enumerate()
            .filter(|(_, link)| self.intent.link_owner(link) == Some(asn))
            .filter_map(|(index, _)| self.link_addrs.subnet(index))
            .map(|subnet| subnet.to_string())
            .collect()
    }

    /// Loopbacks of every router of `asn`, in textual order
    pub fn as_loopbacks(&self, asn: Asn) -> Result<BTreeSet<String>, CompileError> {
        self.autonomous_system(asn)?
            .routers
            .iter()
            .map(|router| self.loopbacks.require(router).map(|lo| lo.to_string()))
            .collect()
    }
}

/// Compile every router of the intent document
pub fn compile(intent: &Intent) -> Result<BTreeMap<String, RouterConfig>, CompileError> {
    compile_routers(intent, &[])
}

/// Compile the selected routers (all of them when `only` is empty).
///
/// The whole document is validated regardless of the selection; an unknown
/// name in `only` is an error.
pub fn compile_routers(
    intent: &Intent,
    only: &[String],
) -> Result<BTreeMap<String, RouterConfig>, CompileError> {
    let ctx = CompileContext::prepare(intent)?;

    for name in only {
        ctx.router(name).map_err(|_| CompileError::UnknownRouter {
            router: name.clone(),
            context: "Router selection".to_string(),
        })?;
    }

    let selected: Vec<&String> = intent
        .routers
        .keys()
        .filter(|name| only.is_empty() || only.contains(*name))
        .collect();

    info!("Generating configuration for {} of {} routers", selected.len(), intent.routers.len());

    let configs = selected
        .par_iter()
        .map(|name| -> Result<(String, RouterConfig), CompileError> {
            let config = assemble_router(&ctx, name)?;
            debug!(
                "Generated {} lines for router {} (AS {}, border: {})",
                config.line_count(),
                name,
                config.asn(),
                config.is_border()
            );
            Ok(((*name).clone(), config))
        })
        .collect::<Result<BTreeMap<_, _>, _>>()?;

    let border = configs.values().filter(|c| c.is_border()).count();
    info!("Compiled {} router configurations ({} border routers)", configs.len(), border);
    Ok(configs)
}

/// Deliver compiled configurations to a sink, in router name order.
/// Returns the number of configurations delivered.
pub fn write_configs(
    configs: &BTreeMap<String, RouterConfig>,
    sink: &mut dyn ConfigSink,
) -> Result<usize, CompileError> {
    for (name, config) in configs {
        sink.deliver(name, config.text())?;
    }
    Ok(configs.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::MemorySink;

    const INTENT: &str = r#"
ases:
  100:
    ip_pools: { loopbacks: "2001:100::/64" }
    routers: [R1, R2]
    igp: { type: ospfv3, process_id: 1, area: 0 }
  200:
    ip_pools: { loopbacks: "2001:200::/64" }
    routers: [R3]
    igp: { type: ripng }
routers:
  R1: { as: 100, router_id: "1.1.1.1" }
  R2: { as: 100, router_id: "2.2.2.2" }
  R3: { as: 200, router_id: "3.3.3.3" }
links:
  - name: L1
    type: intra_as
    subnet_v6: "2001:100:1::/64"
    endpoints:
      - { router: R1, interface: g1/0 }
      - { router: R2, interface: g1/0 }
  - name: L2
    type: inter_as
    relationship: provider
    subnet_v6: "2001:12::/64"
    endpoints:
      - { router: R2, interface: g2/0 }
      - { router: R3, interface: g1/0 }
bgp:
  required: true
"#;

    fn intent() -> Intent {
        serde_yaml::from_str(INTENT).unwrap()
    }

    #[test]
    fn test_context_queries() {
        let intent = intent();
        let ctx = CompileContext::prepare(&intent).unwrap();
        let subnets: Vec<String> = ctx.intra_as_subnets(Asn(100)).into_iter().collect();
        assert_eq!(subnets, vec!["2001:100:1::/64"]);
        assert!(ctx.intra_as_subnets(Asn(200)).is_empty());
        let loopbacks: Vec<String> = ctx.as_loopbacks(Asn(100)).unwrap().into_iter().collect();
        assert_eq!(loopbacks, vec!["2001:100::1/128", "2001:100::2/128"]);
    }

    #[test]
    fn test_compile_all_routers() {
        let configs = compile(&intent()).unwrap();
        assert_eq!(configs.keys().collect::<Vec<_>>(), vec!["R1", "R2", "R3"]);
        assert!(!configs["R1"].is_border());
        assert!(configs["R2"].is_border());
        assert!(configs["R3"].is_border());
    }

    #[test]
    fn test_router_selection() {
        let configs = compile_routers(&intent(), &["R2".to_string()]).unwrap();
        assert_eq!(configs.len(), 1);
        assert!(configs.contains_key("R2"));

        assert!(matches!(
            compile_routers(&intent(), &["R7".to_string()]),
            Err(CompileError::UnknownRouter { .. })
        ));
    }

    #[test]
    fn test_any_invalid_input_aborts_everything() {
        let mut doc = intent();
        doc.ases.get_mut(&Asn(200)).unwrap().igp.kind = "eigrp".to_string();
        assert!(matches!(compile(&doc), Err(CompileError::UnsupportedIgpType { .. })));

        let mut doc = intent();
        doc.links[1].subnet_v6 = "2001:12::/80".to_string();
        assert!(matches!(compile(&doc), Err(CompileError::InvalidPrefixLength { .. })));
    }

    #[test]
    fn test_write_configs_to_sink() {
        let configs = compile(&intent()).unwrap();
        let mut sink = MemorySink::default();
        assert_eq!(write_configs(&configs, &mut sink).unwrap(), 3);
        assert_eq!(sink.delivered[0].0, "R1");
        assert!(sink.delivered[2].1.contains("hostname R3"));
    }
}
