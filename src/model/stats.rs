//! Statistics on a model, for the command line interface

use std::fmt;

use crate::model::{GateType, Model, NodeKind};

/// Number of nodes of each kind in a model
#[derive(Clone, Debug)]
pub struct ModelStats {
    /// Number of primary inputs
    pub nb_inputs: usize,
    /// Number of primary outputs
    pub nb_outputs: usize,
    /// Number of flip-flops
    pub nb_dff: usize,
    /// Number of truth-table gates
    pub nb_cover: usize,
    /// Number of library-cell instances
    pub nb_cell: usize,
    /// Number of distinct truth tables
    pub nb_unique_covers: usize,
    /// Number of primitive gates of each type, zero counts omitted
    pub gates: Vec<(GateType, usize)>,
}

impl ModelStats {
    /// Total number of combinational gates
    pub fn nb_gates(&self) -> usize {
        self.nb_cover + self.nb_cell + self.gates.iter().map(|(_, n)| n).sum::<usize>()
    }
}

/// Compute the statistics of a model
pub fn stats(model: &Model) -> ModelStats {
    let mut ret = ModelStats {
        nb_inputs: model.nb_inputs(),
        nb_outputs: model.nb_outputs(),
        nb_dff: model.nb_dffs(),
        nb_cover: 0,
        nb_cell: 0,
        nb_unique_covers: model.nb_covers(),
        gates: Vec::new(),
    };
    let mut counts = [0usize; GateType::ALL.len()];
    for &id in model.gates() {
        match model.node(id).kind() {
            NodeKind::Cover { .. } => ret.nb_cover += 1,
            NodeKind::Cell { .. } => ret.nb_cell += 1,
            NodeKind::Gate { gate } => counts[gate as usize] += 1,
            NodeKind::Input | NodeKind::Dff { .. } => (),
        }
    }
    for gate in GateType::ALL {
        if counts[gate as usize] != 0 {
            ret.gates.push((gate, counts[gate as usize]));
        }
    }
    ret
}

impl fmt::Display for ModelStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Stats:")?;
        writeln!(f, "  Inputs: {}", self.nb_inputs)?;
        writeln!(f, "  Outputs: {}", self.nb_outputs)?;
        if self.nb_dff != 0 {
            writeln!(f, "  Dff: {}", self.nb_dff)?;
        }
        writeln!(f, "  Gates: {}", self.nb_gates())?;
        if self.nb_cover != 0 {
            writeln!(
                f,
                "    Cover: {} ({} unique)",
                self.nb_cover, self.nb_unique_covers
            )?;
        }
        if self.nb_cell != 0 {
            writeln!(f, "    Cell: {}", self.nb_cell)?;
        }
        for (gate, n) in &self.gates {
            writeln!(f, "    {}: {}", gate, n)?;
        }
        Ok(())
    }
}
