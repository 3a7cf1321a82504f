//! Resolved flow graph and its invariants.

pub mod types;
pub mod validate;

pub use types::{EdgeMeta, FlowGraph, FlowIndex, ResolvedEdge, ResolvedNode};
pub use validate::{ConnectivityVerdict, ConvergenceVerdict, validate_connectivity, validate_convergence};
