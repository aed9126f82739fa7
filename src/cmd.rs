//! Command line interface

use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};

use crate::io::read_model_file;
use crate::model::stats::stats;
use crate::model::Model;

/// Netlist parsing command line
#[derive(Parser)]
#[command(name = "gatenet", about = "Gate-level netlist tool", version)]
pub struct Cli {
    /// The command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Show statistics about a netlist
    #[clap(alias = "stats")]
    Show(ShowArgs),
}

/// Command arguments for statistics
#[derive(Args)]
pub struct ShowArgs {
    /// Netlist file (.blif or .bench)
    file: PathBuf,
}

impl ShowArgs {
    /// Run the command
    pub fn run(&self) {
        let model = read_file(&self.file);
        println!("{}", stats(&model));
    }
}

fn read_file(path: &PathBuf) -> Model {
    match read_model_file(path) {
        Ok(model) => model,
        Err(diags) => {
            eprint!("{}", diags);
            process::exit(1);
        }
    }
}
