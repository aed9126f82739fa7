//! Nodes of the netlist model

use std::fmt;

use crate::library::CellId;
use crate::model::cover::CoverId;

/// Dense identifier of a node in a [`Model`](crate::model::Model)
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

impl NodeId {
    pub(crate) fn from_index(index: usize) -> NodeId {
        NodeId(index as u32)
    }

    /// Index of the node in the model
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// Asynchronous reset behavior of a flip-flop
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ResetKind {
    /// No reset, or the reset state does not matter
    #[default]
    None,
    /// Reset to 0
    Clear,
    /// Reset to 1
    Preset,
}

/// Primitive gate types
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GateType {
    /// Buffer (identity)
    Buf,
    /// Inverter
    Not,
    /// And gate
    And,
    /// Not-And gate
    Nand,
    /// Or gate
    Or,
    /// Not-Or gate
    Nor,
    /// Exclusive Or gate
    Xor,
    /// Exclusive Not-Or gate
    Xnor,
    /// Constant 0
    Const0,
    /// Constant 1
    Const1,
}

impl GateType {
    /// All gate types, in display order
    pub const ALL: [GateType; 10] = [
        GateType::Buf,
        GateType::Not,
        GateType::And,
        GateType::Nand,
        GateType::Or,
        GateType::Nor,
        GateType::Xor,
        GateType::Xnor,
        GateType::Const0,
        GateType::Const1,
    ];

    /// Whether a gate of this type may have the given number of fanins
    pub fn valid_arity(self, num_fanins: usize) -> bool {
        match self {
            GateType::Buf | GateType::Not => num_fanins == 1,
            GateType::Const0 | GateType::Const1 => num_fanins == 0,
            _ => num_fanins >= 1,
        }
    }
}

impl fmt::Display for GateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GateType::Buf => "BUF",
            GateType::Not => "NOT",
            GateType::And => "AND",
            GateType::Nand => "NAND",
            GateType::Or => "OR",
            GateType::Nor => "NOR",
            GateType::Xor => "XOR",
            GateType::Xnor => "XNOR",
            GateType::Const0 => "CONST0",
            GateType::Const1 => "CONST1",
        };
        write!(f, "{}", s)
    }
}

/// What a node is
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
    /// Primary input
    Input,
    /// Flip-flop; the single fanin is the data input
    Dff {
        /// Asynchronous reset behavior
        reset: ResetKind,
    },
    /// Gate defined by a truth table
    Cover {
        /// The shared truth table
        cover: CoverId,
    },
    /// Instance of a library cell
    Cell {
        /// The cell in the library the model was read with
        cell: CellId,
    },
    /// Primitive gate
    Gate {
        /// The gate type
        gate: GateType,
    },
}

/// A named node with its fanins
#[derive(Clone, Debug)]
pub struct Node {
    pub(crate) name: String,
    pub(crate) kind: NodeKind,
    pub(crate) fanin: Vec<NodeId>,
}

impl Node {
    /// Name of the node
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Kind of the node
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Fanin nodes, in order
    pub fn fanin(&self) -> &[NodeId] {
        &self.fanin
    }

    /// Whether the node is a primary input
    pub fn is_input(&self) -> bool {
        matches!(self.kind, NodeKind::Input)
    }

    /// Whether the node is a flip-flop
    pub fn is_dff(&self) -> bool {
        matches!(self.kind, NodeKind::Dff { .. })
    }

    /// Whether the node is a combinational gate
    pub fn is_gate(&self) -> bool {
        matches!(
            self.kind,
            NodeKind::Cover { .. } | NodeKind::Cell { .. } | NodeKind::Gate { .. }
        )
    }
}
