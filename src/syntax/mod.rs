//! Draft-level flow types shared by the parser and the synthesizer.

pub mod types;

pub use types::{BlockKind, DraftEdge, DraftGraph, DraftNode, EdgeSpec, NodeSpec, Position};
