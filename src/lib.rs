//! # NetIntent - IPv6 network intent compiler
//!
//! This library compiles a declarative description of a multi-AS IPv6
//! network (the "intent") into per-router command sequences configuring
//! interior routing and BGP with relationship based export policies.
//!
//! ## Overview
//!
//! Network designers describe autonomous systems, routers, links and the
//! business relationship across every inter-AS link (client, peer or
//! provider) once. The compiler derives everything else deterministically:
//!
//! - **Addressing**: /128 loopbacks from per-AS pools, /64 link addresses
//! - **IGP**: OSPFv3, RIPng or nothing, per AS
//! - **BGP**: interior full mesh, exterior sessions, route origination
//! - **Policy**: communities, the SELF prefix list and route maps on border
//!   routers, so that peers and providers only see our own space and our
//!   clients' routes
//!
//! ## Architecture
//!
//! The library is organized as a pipeline:
//!
//! - `intent`: intent document model and cross-reference validation
//! - `intent_loader`: JSON / YAML loading
//! - `ip`: loopback and link address allocation
//! - `topology`: router to link adjacency
//! - `igp`: interior routing stanzas
//! - `bgp`: BGP block and export policy objects
//! - `assembler`: ordering of all stanzas into one text per router
//! - `orchestrator`: validation up front, parallel generation, output
//! - `output`: sinks receiving the generated text
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use netintent::{intent_loader, orchestrator, output::DirectorySink};
//! use std::path::Path;
//!
//! let intent = intent_loader::load_intent(Path::new("intents/intent.json"))?;
//! let configs = orchestrator::compile(&intent)?;
//!
//! let mut sink = DirectorySink::create(Path::new("configs_gen"))?;
//! orchestrator::write_configs(&configs, &mut sink)?;
//! # Ok::<(), netintent::error::CompileError>(())
//! ```
//!
//! ## Error Handling
//!
//! All failures are validation failures reported as
//! [`error::CompileError`]. Any single failure aborts the whole run before
//! any router configuration is produced.

pub mod error;
pub mod intent;
pub mod intent_loader;
pub mod ip;
pub mod topology;
pub mod igp;
pub mod bgp;
pub mod assembler;
pub mod orchestrator;
pub mod output;

pub use assembler::RouterConfig;
pub use error::CompileError;
pub use intent::Intent;
