//! Command line interface

use std::path::PathBuf;

use clap::Parser;

use sboxgates::dot::write_dot;
use sboxgates::driver::{fresh_state, load_for_resume, synthesize_all};

/// Search for a minimal-gate circuit implementing the built-in S-box
///
/// With no arguments, starts a fresh search for all 8 output bits. Given a state file,
/// resumes synthesizing whichever output bits are still unassigned. Given a state file
/// and `--dot`, prints the loaded circuit as a Graphviz digraph and exits without
/// searching further.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// A previously saved state file to resume from
    file: Option<PathBuf>,

    /// Print the loaded state as a Graphviz digraph instead of synthesizing
    #[arg(long)]
    dot: bool,
}

impl Cli {
    /// Run the CLI to completion, exiting the process with the appropriate code
    pub fn run(&self) -> ! {
        if self.dot {
            let Some(file) = &self.file else {
                eprintln!("Error: --dot requires a state file.");
                std::process::exit(1);
            };
            let state = match load_for_resume(file) {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("Error reading file: {}: {e}", file.display());
                    std::process::exit(1);
                }
            };
            let stdout = std::io::stdout();
            let mut lock = stdout.lock();
            if write_dot(&state, &mut lock).is_err() {
                eprintln!("Error writing Graphviz output.");
                std::process::exit(1);
            }
            std::process::exit(0);
        }

        let mut state = match &self.file {
            None => {
                println!("No state file given - generating circuits from scratch.");
                fresh_state()
            }
            Some(file) => match load_for_resume(file) {
                Ok(s) => {
                    println!("Loaded state from {}", file.display());
                    s
                }
                Err(e) => {
                    eprintln!("Error reading file: {}: {e}", file.display());
                    std::process::exit(1);
                }
            },
        };

        synthesize_all(&mut state);
        std::process::exit(0);
    }
}
