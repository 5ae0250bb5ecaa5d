//! Grider CLI Binary
//!
//! Lists directories and prints files stored in an image.

use clap::Parser;
use grid::tooling::cli::{ExplorerCli, ExplorerContext};
use std::io::IsTerminal;
use std::process;

fn main() {
    let cli = ExplorerCli::parse();

    if let Err(e) = cli.logging.init_logging() {
        eprintln!("grider: error initializing logging: {}", e);
        process::exit(1);
    }

    let color = std::io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none();
    let mut context = match ExplorerContext::open(&cli.image) {
        Ok(ctx) => ctx.with_color(color),
        Err(e) => {
            eprintln!("grider: {}", e);
            process::exit(1);
        }
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if let Err(e) = context.execute(&cli.command, &mut out) {
        eprintln!("grider: {}", e);
        process::exit(1);
    }
}
