//! Boolean expressions over numbered variables
//!
//! Used to expose the function of a truth-table gate to network consumers,
//! and to check gate semantics in tests.

use std::fmt;
use std::ops::Not;

use itertools::Itertools;

/// Boolean expression tree
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Expr {
    /// Constant true or false
    Const(bool),
    /// Variable by index
    Var(usize),
    /// Negation
    Not(Box<Expr>),
    /// Conjunction; empty means true
    And(Vec<Expr>),
    /// Disjunction; empty means false
    Or(Vec<Expr>),
}

impl Expr {
    /// Variable with the given index
    pub fn var(ind: usize) -> Expr {
        Expr::Var(ind)
    }

    /// Conjunction of the given expressions
    ///
    /// Zero terms give the constant true, a single term is returned as is.
    pub fn and(mut terms: Vec<Expr>) -> Expr {
        match terms.len() {
            0 => Expr::Const(true),
            1 => terms.pop().unwrap(),
            _ => Expr::And(terms),
        }
    }

    /// Disjunction of the given expressions
    ///
    /// Zero terms give the constant false, a single term is returned as is.
    pub fn or(mut terms: Vec<Expr>) -> Expr {
        match terms.len() {
            0 => Expr::Const(false),
            1 => terms.pop().unwrap(),
            _ => Expr::Or(terms),
        }
    }

    /// Number of variables, as one past the highest variable index
    pub fn num_vars(&self) -> usize {
        match self {
            Expr::Const(_) => 0,
            Expr::Var(i) => i + 1,
            Expr::Not(e) => e.num_vars(),
            Expr::And(terms) | Expr::Or(terms) => {
                terms.iter().map(Expr::num_vars).max().unwrap_or(0)
            }
        }
    }

    /// Evaluate with the given variable values
    pub fn eval(&self, values: &[bool]) -> bool {
        match self {
            Expr::Const(b) => *b,
            Expr::Var(i) => values[*i],
            Expr::Not(e) => !e.eval(values),
            Expr::And(terms) => terms.iter().all(|e| e.eval(values)),
            Expr::Or(terms) => terms.iter().any(|e| e.eval(values)),
        }
    }

}

impl Not for Expr {
    type Output = Expr;

    fn not(self) -> Expr {
        match self {
            Expr::Const(b) => Expr::Const(!b),
            Expr::Not(e) => *e,
            e => Expr::Not(Box::new(e)),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // parenthesize a subexpression that binds looser than its context
        fn paren(e: &Expr, in_and: bool) -> String {
            match e {
                Expr::Or(_) if in_and => format!("({})", e),
                _ => format!("{}", e),
            }
        }
        match self {
            Expr::Const(b) => write!(f, "{}", *b as u8),
            Expr::Var(i) => write!(f, "x{}", i),
            Expr::Not(e) => match e.as_ref() {
                Expr::And(_) | Expr::Or(_) => write!(f, "!({})", e),
                e => write!(f, "!{}", e),
            },
            Expr::And(terms) => {
                write!(f, "{}", terms.iter().map(|e| paren(e, true)).join(" & "))
            }
            Expr::Or(terms) => {
                write!(f, "{}", terms.iter().map(|e| paren(e, false)).join(" | "))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors() {
        assert_eq!(Expr::and(vec![]), Expr::Const(true));
        assert_eq!(Expr::or(vec![]), Expr::Const(false));
        assert_eq!(Expr::and(vec![Expr::var(2)]), Expr::var(2));
        assert_eq!(!!Expr::var(0), Expr::var(0));
        assert_eq!(!Expr::Const(false), Expr::Const(true));
    }

    #[test]
    fn test_eval() {
        // x0 & !x1 | x2
        let e = Expr::or(vec![Expr::and(vec![Expr::var(0), !Expr::var(1)]), Expr::var(2)]);
        assert_eq!(e.num_vars(), 3);
        assert!(e.eval(&[true, false, false]));
        assert!(!e.eval(&[true, true, false]));
        assert!(e.eval(&[false, true, true]));
        assert!(!e.eval(&[false, false, false]));
    }

    #[test]
    fn test_display() {
        let e = Expr::and(vec![Expr::var(0), !Expr::var(1)]);
        assert_eq!(format!("{}", e), "x0 & !x1");
        let e = Expr::or(vec![Expr::var(0), Expr::and(vec![Expr::var(1), Expr::var(2)])]);
        assert_eq!(format!("{}", e), "x0 | x1 & x2");
        let e = Expr::and(vec![Expr::or(vec![Expr::var(0), Expr::var(1)]), Expr::var(2)]);
        assert_eq!(format!("{}", e), "(x0 | x1) & x2");
    }
}
