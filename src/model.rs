//! In-memory representation of a parsed netlist

mod cover;
#[allow(clippy::module_inception)]
mod model;
mod node;
pub mod stats;

pub use cover::{Cover, CoverId};
pub use model::Model;
pub use node::{GateType, Node, NodeId, NodeKind, ResetKind};

pub(crate) use model::ModelBuilder;
