//! Cell library interface used to resolve `.gate` statements
//!
//! The reader only needs to map cell and pin names to stable identifiers;
//! what a cell computes is the consumer's business. The interface can only
//! describe single-output cells without bidirectional pins, which is exactly
//! what a `.gate` statement may instantiate.

use fxhash::FxHashMap;

/// Opaque identifier for a cell of a library
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CellId(u32);

impl CellId {
    /// Build from an index, for library implementations
    pub fn from_index(index: usize) -> CellId {
        CellId(index as u32)
    }

    /// Index of the cell
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Role of a named pin of a cell
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellPin {
    /// Input pin, by position
    Input(usize),
    /// The single output pin
    Output,
}

/// Name resolution for the cells a `.gate` statement may reference
pub trait CellLibrary {
    /// Look up a cell by name
    fn find_cell(&self, name: &str) -> Option<CellId>;

    /// Number of input pins of a cell
    fn num_inputs(&self, cell: CellId) -> usize;

    /// Look up a pin of a cell by name
    fn find_pin(&self, cell: CellId, name: &str) -> Option<CellPin>;
}

struct CellDef {
    inputs: Vec<String>,
    output: String,
}

/// Minimal in-memory cell library
///
/// Cells are declared by name with their input pin names and output pin name.
#[derive(Default)]
pub struct SimpleCellLibrary {
    cells: Vec<CellDef>,
    dict: FxHashMap<String, CellId>,
}

impl SimpleCellLibrary {
    /// Create an empty library
    pub fn new() -> SimpleCellLibrary {
        SimpleCellLibrary::default()
    }

    /// Declare a cell; a cell declared twice keeps its first definition
    pub fn add_cell(&mut self, name: &str, inputs: &[&str], output: &str) -> CellId {
        if let Some(&id) = self.dict.get(name) {
            return id;
        }
        let id = CellId::from_index(self.cells.len());
        self.cells.push(CellDef {
            inputs: inputs.iter().map(|s| s.to_string()).collect(),
            output: output.to_string(),
        });
        self.dict.insert(name.to_string(), id);
        id
    }

    /// Number of declared cells
    pub fn num_cells(&self) -> usize {
        self.cells.len()
    }
}

impl CellLibrary for SimpleCellLibrary {
    fn find_cell(&self, name: &str) -> Option<CellId> {
        self.dict.get(name).copied()
    }

    fn num_inputs(&self, cell: CellId) -> usize {
        self.cells[cell.index()].inputs.len()
    }

    fn find_pin(&self, cell: CellId, name: &str) -> Option<CellPin> {
        let def = &self.cells[cell.index()];
        if def.output == name {
            return Some(CellPin::Output);
        }
        def.inputs
            .iter()
            .position(|p| p == name)
            .map(CellPin::Input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_library() {
        let mut lib = SimpleCellLibrary::new();
        let and2 = lib.add_cell("and2", &["a", "b"], "o");
        let inv = lib.add_cell("inv", &["a"], "o");
        assert_ne!(and2, inv);
        assert_eq!(lib.find_cell("and2"), Some(and2));
        assert_eq!(lib.find_cell("nand2"), None);
        assert_eq!(lib.num_inputs(and2), 2);
        assert_eq!(lib.find_pin(and2, "b"), Some(CellPin::Input(1)));
        assert_eq!(lib.find_pin(and2, "o"), Some(CellPin::Output));
        assert_eq!(lib.find_pin(inv, "b"), None);
        // redeclaration keeps the first definition
        assert_eq!(lib.add_cell("and2", &["x"], "y"), and2);
        assert_eq!(lib.num_inputs(and2), 2);
    }
}
