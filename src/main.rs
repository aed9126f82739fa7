use clap::Parser;

use gatenet::cmd::{Cli, Commands};

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    match &cli.command {
        Commands::Show(a) => a.run(),
    }
}
