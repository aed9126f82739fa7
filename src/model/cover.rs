//! Truth tables in sum-of-products form, shared between the gates that use them

use std::fmt;

use fxhash::FxHashMap;

use crate::expr::Expr;

/// Identifier of a truth table in a model's cover table
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CoverId(u32);

impl CoverId {
    pub(crate) fn from_index(index: usize) -> CoverId {
        CoverId(index as u32)
    }

    /// Index of the cover in the model
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A truth table as a list of input cubes with a common output value
///
/// Each cube is a string over `0`, `1` and `-`, one character per input.
/// The gate output takes the output value on the union of the cubes and its
/// complement elsewhere.
#[derive(Clone, Debug)]
pub struct Cover {
    num_inputs: usize,
    cubes: Vec<String>,
    output: char,
}

impl Cover {
    /// Number of inputs of the gates using this cover
    pub fn num_inputs(&self) -> usize {
        self.num_inputs
    }

    /// Number of cubes
    pub fn num_cubes(&self) -> usize {
        self.cubes.len()
    }

    /// The cubes, in the order they were written
    pub fn cubes(&self) -> &[String] {
        &self.cubes
    }

    /// Output value on the cubes, `'1'` or `'0'`
    ///
    /// `'-'` for the degenerate cover with no cube at all, which is a
    /// constant 0 either way.
    pub fn output_value(&self) -> char {
        self.output
    }

    /// The function of the cover as an expression over its inputs
    pub fn expr(&self) -> Expr {
        let mut terms = Vec::with_capacity(self.cubes.len());
        for cube in &self.cubes {
            let mut lits = Vec::new();
            for (i, c) in cube.chars().enumerate() {
                match c {
                    '1' => lits.push(Expr::var(i)),
                    '0' => lits.push(!Expr::var(i)),
                    _ => (),
                }
            }
            terms.push(Expr::and(lits));
        }
        let on_set = Expr::or(terms);
        if self.output == '0' {
            !on_set
        } else {
            on_set
        }
    }
}

impl fmt::Display for Cover {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for cube in &self.cubes {
            if self.num_inputs == 0 {
                writeln!(f, "{}", self.output)?;
            } else {
                writeln!(f, "{} {}", cube, self.output)?;
            }
        }
        Ok(())
    }
}

/// Deduplicating registry of the covers of a model
///
/// Two `.names` bodies with the same input count, output value and cube
/// rows in the same order share a single cover.
#[derive(Debug, Default)]
pub(crate) struct CoverTable {
    covers: Vec<Cover>,
    dict: FxHashMap<String, CoverId>,
}

impl CoverTable {
    pub fn new() -> CoverTable {
        CoverTable::default()
    }

    /// Return the cover with this exact content, registering it if new
    pub fn intern(&mut self, num_inputs: usize, cubes: Vec<String>, output: char) -> CoverId {
        let mut key = format!("{}:{}", num_inputs, output);
        for cube in &cubes {
            key.push(':');
            key.push_str(cube);
        }
        if let Some(&id) = self.dict.get(&key) {
            return id;
        }
        let id = CoverId::from_index(self.covers.len());
        self.covers.push(Cover {
            num_inputs,
            cubes,
            output,
        });
        self.dict.insert(key, id);
        id
    }

    pub fn num_covers(&self) -> usize {
        self.covers.len()
    }

    pub fn cover(&self, id: CoverId) -> &Cover {
        &self.covers[id.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedup() {
        let mut table = CoverTable::new();
        let a = table.intern(2, vec!["11".to_string()], '1');
        let b = table.intern(2, vec!["11".to_string()], '1');
        assert_eq!(a, b);
        assert_eq!(table.num_covers(), 1);
        // same cubes, different output value
        let c = table.intern(2, vec!["11".to_string()], '0');
        assert_ne!(a, c);
        // cube order matters
        let d = table.intern(2, vec!["1-".to_string(), "-1".to_string()], '1');
        let e = table.intern(2, vec!["-1".to_string(), "1-".to_string()], '1');
        assert_ne!(d, e);
        assert_eq!(table.num_covers(), 4);
    }

    #[test]
    fn test_and_expr() {
        let mut table = CoverTable::new();
        let id = table.intern(2, vec!["11".to_string()], '1');
        let expr = table.cover(id).expr();
        for x0 in [false, true] {
            for x1 in [false, true] {
                assert_eq!(expr.eval(&[x0, x1]), x0 && x1);
            }
        }
    }

    #[test]
    fn test_complemented_expr() {
        let mut table = CoverTable::new();
        // !(x0 & x1), written with output value 0
        let id = table.intern(2, vec!["11".to_string()], '0');
        let expr = table.cover(id).expr();
        assert!(expr.eval(&[false, true]));
        assert!(!expr.eval(&[true, true]));
    }

    #[test]
    fn test_empty_cover_is_constant_zero() {
        let mut table = CoverTable::new();
        let id = table.intern(0, vec![], '-');
        assert_eq!(table.cover(id).expr(), Expr::Const(false));
        // constant 1 written as a single empty cube
        let id = table.intern(0, vec![String::new()], '1');
        assert_eq!(table.cover(id).expr(), Expr::Const(true));
    }
}
