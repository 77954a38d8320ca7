//! Binary for sboxgates

#![warn(missing_docs)]

mod cmd;

use clap::Parser;

#[doc(hidden)]
fn main() {
    let cli = cmd::Cli::parse();
    cli.run();
}
