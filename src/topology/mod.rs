//! Network topology module.
//!
//! This module indexes the links of the intent document by router and
//! answers the two traversal questions every generator asks: which links
//! touch router R, and what sits on the other side of link L.

pub mod adjacency;

// Re-export key types and functions for easier access
pub use adjacency::{endpoint_of, other_endpoint, AdjacencyIndex, LinkRef};
