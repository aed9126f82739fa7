//! The immutable netlist model and the builder that assembles it

use std::fmt;

use crate::library::CellId;
use crate::model::cover::{Cover, CoverId, CoverTable};
use crate::model::node::{GateType, Node, NodeId, NodeKind, ResetKind};

/// A gate-level netlist, as read from a file
///
/// Nodes live in a dense arena indexed by [`NodeId`]. Inputs, outputs and
/// flip-flops are listed in declaration order; combinational gates are listed
/// in topological order, fanins before the gates that read them. The gate
/// list only contains logic reachable from the outputs and the flip-flop
/// data inputs.
#[derive(Debug)]
pub struct Model {
    name: String,
    nodes: Vec<Node>,
    inputs: Vec<NodeId>,
    outputs: Vec<NodeId>,
    dffs: Vec<NodeId>,
    gates: Vec<NodeId>,
    covers: CoverTable,
    clock: Option<NodeId>,
    reset: Option<NodeId>,
}

impl Model {
    /// Name of the model
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of nodes, reachable or not
    pub fn nb_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Number of primary inputs
    pub fn nb_inputs(&self) -> usize {
        self.inputs.len()
    }

    /// Number of primary outputs
    pub fn nb_outputs(&self) -> usize {
        self.outputs.len()
    }

    /// Number of flip-flops
    pub fn nb_dffs(&self) -> usize {
        self.dffs.len()
    }

    /// Number of combinational gates reachable from the outputs
    pub fn nb_gates(&self) -> usize {
        self.gates.len()
    }

    /// Number of distinct truth tables
    pub fn nb_covers(&self) -> usize {
        self.covers.num_covers()
    }

    /// Access a node
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    /// Primary inputs, in declaration order
    pub fn inputs(&self) -> &[NodeId] {
        &self.inputs
    }

    /// Primary outputs, in declaration order
    pub fn outputs(&self) -> &[NodeId] {
        &self.outputs
    }

    /// Flip-flops, in declaration order
    pub fn dffs(&self) -> &[NodeId] {
        &self.dffs
    }

    /// Combinational gates, in topological order
    pub fn gates(&self) -> &[NodeId] {
        &self.gates
    }

    /// Access a truth table
    pub fn cover(&self, id: CoverId) -> &Cover {
        self.covers.cover(id)
    }

    /// The shared clock node, present as soon as the model has a flip-flop
    pub fn clock(&self) -> Option<NodeId> {
        self.clock
    }

    /// The shared reset node, present as soon as a flip-flop has a reset value
    pub fn reset(&self) -> Option<NodeId> {
        self.reset
    }

    /// Find a node by name
    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|n| n.name == name)
            .map(NodeId::from_index)
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "model {}", self.name)?;
        for &id in &self.inputs {
            writeln!(f, "  input {}", self.node(id).name())?;
        }
        for &id in &self.dffs {
            let node = self.node(id);
            writeln!(f, "  dff {} <- {}", node.name(), self.node(node.fanin()[0]).name())?;
        }
        for &id in &self.gates {
            let node = self.node(id);
            write!(f, "  ")?;
            match node.kind() {
                NodeKind::Gate { gate } => write!(f, "{}", gate)?,
                NodeKind::Cover { cover } => write!(f, "cover{}", cover.index())?,
                NodeKind::Cell { cell } => write!(f, "cell{}", cell.index())?,
                NodeKind::Input | NodeKind::Dff { .. } => unreachable!(),
            }
            write!(f, " {} <-", node.name())?;
            for &fid in node.fanin() {
                write!(f, " {}", self.node(fid).name())?;
            }
            writeln!(f)?;
        }
        for &id in &self.outputs {
            writeln!(f, "  output {}", self.node(id).name())?;
        }
        Ok(())
    }
}

struct BuilderNode {
    name: String,
    kind: Option<NodeKind>,
    fanin: Vec<NodeId>,
}

/// Mutable state while a reader assembles a model
///
/// Node slots may be reserved before the statement defining them is seen;
/// the reader checks that every reserved slot got defined before calling
/// [`finish`](ModelBuilder::finish).
#[derive(Default)]
pub(crate) struct ModelBuilder {
    name: String,
    nodes: Vec<BuilderNode>,
    inputs: Vec<NodeId>,
    outputs: Vec<NodeId>,
    dffs: Vec<NodeId>,
    covers: CoverTable,
    clock: Option<NodeId>,
    reset: Option<NodeId>,
}

impl Default for BuilderNode {
    fn default() -> BuilderNode {
        BuilderNode {
            name: String::new(),
            kind: None,
            fanin: Vec::new(),
        }
    }
}

impl ModelBuilder {
    pub fn new() -> ModelBuilder {
        ModelBuilder::default()
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    /// Reserve a slot for a name that may be defined later
    pub fn new_node(&mut self, name: &str) -> NodeId {
        let id = NodeId::from_index(self.nodes.len());
        self.nodes.push(BuilderNode {
            name: name.to_string(),
            ..BuilderNode::default()
        });
        id
    }

    /// Name of a node, for diagnostics
    pub fn name_of(&self, id: NodeId) -> &str {
        &self.nodes[id.index()].name
    }

    /// Whether the node has been given a kind
    pub fn is_defined(&self, id: NodeId) -> bool {
        self.nodes[id.index()].kind.is_some()
    }

    pub fn set_input(&mut self, id: NodeId) {
        self.nodes[id.index()].kind = Some(NodeKind::Input);
        self.inputs.push(id);
    }

    pub fn add_output(&mut self, id: NodeId) {
        self.outputs.push(id);
    }

    pub fn set_dff(&mut self, id: NodeId, data: NodeId, reset: ResetKind) {
        let node = &mut self.nodes[id.index()];
        node.kind = Some(NodeKind::Dff { reset });
        node.fanin = vec![data];
        self.dffs.push(id);
    }

    pub fn set_cover(&mut self, id: NodeId, fanin: Vec<NodeId>, cover: CoverId) {
        let node = &mut self.nodes[id.index()];
        node.kind = Some(NodeKind::Cover { cover });
        node.fanin = fanin;
    }

    pub fn set_cell(&mut self, id: NodeId, fanin: Vec<NodeId>, cell: CellId) {
        let node = &mut self.nodes[id.index()];
        node.kind = Some(NodeKind::Cell { cell });
        node.fanin = fanin;
    }

    pub fn set_gate(&mut self, id: NodeId, gate: GateType, fanin: Vec<NodeId>) {
        let node = &mut self.nodes[id.index()];
        node.kind = Some(NodeKind::Gate { gate });
        node.fanin = fanin;
    }

    /// Create a gate node that has no name of its own in the file
    pub fn add_gate(&mut self, name: String, gate: GateType, fanin: Vec<NodeId>) -> NodeId {
        let id = NodeId::from_index(self.nodes.len());
        self.nodes.push(BuilderNode {
            name,
            kind: Some(NodeKind::Gate { gate }),
            fanin,
        });
        id
    }

    /// Register a truth table, or find the identical one already registered
    pub fn intern_cover(&mut self, num_inputs: usize, cubes: Vec<String>, output: char) -> CoverId {
        self.covers.intern(num_inputs, cubes, output)
    }

    /// The shared clock node, created on the first sequential statement
    pub fn ensure_clock(&mut self) -> NodeId {
        match self.clock {
            Some(id) => id,
            None => {
                let id = self.new_node("$clock");
                self.nodes[id.index()].kind = Some(NodeKind::Input);
                self.clock = Some(id);
                id
            }
        }
    }

    /// The shared reset node, created on the first reset value
    pub fn ensure_reset(&mut self) -> NodeId {
        match self.reset {
            Some(id) => id,
            None => {
                let id = self.new_node("$reset");
                self.nodes[id.index()].kind = Some(NodeKind::Input);
                self.reset = Some(id);
                id
            }
        }
    }

    /// Freeze the model, ordering the gates topologically
    ///
    /// Panics if a reserved node was never defined; the reader rejects the
    /// file before getting here in that case.
    pub fn finish(self) -> Model {
        let nodes: Vec<Node> = self
            .nodes
            .into_iter()
            .map(|n| Node {
                name: n.name,
                kind: n.kind.expect("node left undefined"),
                fanin: n.fanin,
            })
            .collect();

        let mut visited = vec![false; nodes.len()];
        for &id in self.inputs.iter().chain(&self.dffs) {
            visited[id.index()] = true;
        }
        for id in [self.clock, self.reset].into_iter().flatten() {
            visited[id.index()] = true;
        }

        let mut gates = Vec::new();
        let roots = self
            .outputs
            .iter()
            .copied()
            .chain(self.dffs.iter().map(|&id| nodes[id.index()].fanin[0]));
        for root in roots {
            order_gates(root, &nodes, &mut visited, &mut gates);
        }

        Model {
            name: self.name,
            nodes,
            inputs: self.inputs,
            outputs: self.outputs,
            dffs: self.dffs,
            gates,
            covers: self.covers,
            clock: self.clock,
            reset: self.reset,
        }
    }
}

/// Post-order depth-first search appending gates after their fanins
fn order_gates(root: NodeId, nodes: &[Node], visited: &mut [bool], gates: &mut Vec<NodeId>) {
    if visited[root.index()] {
        return;
    }
    visited[root.index()] = true;
    let mut stack: Vec<(NodeId, usize)> = vec![(root, 0)];
    while let Some(top) = stack.last_mut() {
        let id = top.0;
        let fanin = &nodes[id.index()].fanin;
        if top.1 < fanin.len() {
            let child = fanin[top.1];
            top.1 += 1;
            if !visited[child.index()] {
                visited[child.index()] = true;
                stack.push((child, 0));
            }
        } else {
            gates.push(id);
            stack.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topological_order() {
        let mut b = ModelBuilder::new();
        b.set_name("t");
        let a = b.new_node("a");
        b.set_input(a);
        // y reads x, defined in that order but declared y first
        let y = b.new_node("y");
        let x = b.new_node("x");
        b.set_gate(y, GateType::Not, vec![x]);
        b.set_gate(x, GateType::Buf, vec![a]);
        b.add_output(y);
        let m = b.finish();
        assert_eq!(m.gates(), &[x, y]);
        assert_eq!(m.nb_inputs(), 1);
        assert_eq!(m.nb_gates(), 2);
    }

    #[test]
    fn test_unreachable_gates_dropped() {
        let mut b = ModelBuilder::new();
        let a = b.new_node("a");
        b.set_input(a);
        let x = b.new_node("x");
        b.set_gate(x, GateType::Not, vec![a]);
        let dead = b.new_node("dead");
        b.set_gate(dead, GateType::Buf, vec![a]);
        b.add_output(x);
        let m = b.finish();
        assert_eq!(m.gates(), &[x]);
        assert_eq!(m.nb_nodes(), 3);
    }

    #[test]
    fn test_dff_data_is_ordered() {
        let mut b = ModelBuilder::new();
        let a = b.new_node("a");
        b.set_input(a);
        let q = b.new_node("q");
        let d = b.new_node("d");
        b.set_dff(q, d, ResetKind::Clear);
        b.ensure_clock();
        b.ensure_reset();
        b.set_gate(d, GateType::Not, vec![q]);
        b.add_output(q);
        let m = b.finish();
        // d feeds no output, only the flip-flop data input
        assert_eq!(m.gates(), &[d]);
        assert_eq!(m.nb_dffs(), 1);
        assert!(m.clock().is_some());
        assert!(m.reset().is_some());
        // clock and reset stay out of the input list
        assert_eq!(m.nb_inputs(), 1);
    }

    #[test]
    fn test_duplicate_output_listed_once_in_gates() {
        let mut b = ModelBuilder::new();
        let a = b.new_node("a");
        b.set_input(a);
        let x = b.new_node("x");
        b.set_gate(x, GateType::Not, vec![a]);
        b.add_output(x);
        b.add_output(x);
        let m = b.finish();
        assert_eq!(m.nb_outputs(), 2);
        assert_eq!(m.gates(), &[x]);
    }
}
