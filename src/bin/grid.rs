//! Grid CLI Binary
//!
//! Builds an image from the directory named in a gridfile.

use clap::Parser;
use grid::tooling::cli::{BuildCli, BuildContext};
use std::process;

fn main() {
    let cli = BuildCli::parse();

    if let Err(e) = cli.logging.init_logging() {
        eprintln!("grid: error initializing logging: {}", e);
        process::exit(1);
    }

    let context = BuildContext::new(cli.gridfile.clone());
    match context.execute() {
        Ok(summary) => {
            println!("{}", summary);
        }
        Err(e) => {
            eprintln!("grid: {}", e);
            eprintln!("grid: imaging failed");
            process::exit(1);
        }
    }
}
