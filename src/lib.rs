//! Gatenet parses gate-level netlists in the blif and bench (ISCAS89)
//! formats into a simple in-memory model.
//!
//! The readers tolerate forward references, collect all diagnostics with
//! source locations instead of stopping at the first problem, deduplicate
//! identical truth tables and hand out the combinational gates in
//! topological order. The [`convert`] module replays a model into any
//! network representation through the [`convert::NetworkBuilder`] trait.
//!
//! ```
//! use gatenet::read_bench;
//!
//! let src = "INPUT(a)\nINPUT(b)\nOUTPUT(y)\ny = AND(a, b)\n";
//! let model = read_bench(src.as_bytes()).unwrap();
//! assert_eq!(model.nb_inputs(), 2);
//! assert_eq!(model.nb_gates(), 1);
//! ```

#![warn(missing_docs)]

pub mod cmd;
pub mod convert;
pub mod expr;
pub mod io;
pub mod library;
pub mod model;

pub use io::{read_bench, read_blif, read_model_file, Diagnostics};
pub use model::{Model, NodeId};
