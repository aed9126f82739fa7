//! Netlist file input

mod bench;
mod blif;
mod diag;
mod ident;
mod scan;

pub use bench::{read_bench, BenchContext, BenchReader, GateHandler};
pub use blif::{read_blif, read_blif_with_library};
pub use diag::{Diagnostic, Diagnostics, Severity};
pub use scan::Loc;

use std::fs::File;
use std::path::Path;

use crate::model::Model;

/// Read a netlist file, guessing its format from the extension
pub fn read_model_file(path: &Path) -> Result<Model, Diagnostics> {
    let mut diags = Diagnostics::new();
    diags.set_file(&path.display().to_string());
    let Some(ext) = path.extension() else {
        diags.failure("no file extension to guess the format from");
        return Err(diags);
    };
    let Ok(f) = File::open(path) else {
        diags.failure("cannot open file");
        return Err(diags);
    };
    let ret = if ext == "blif" {
        read_blif(f)
    } else if ext == "bench" {
        read_bench(f)
    } else {
        diags.failure(format!(
            "unknown file extension {}",
            ext.to_string_lossy()
        ));
        return Err(diags);
    };
    ret.map_err(|mut d| {
        d.set_file(&path.display().to_string());
        d
    })
}
