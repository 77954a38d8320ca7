//! Gate-count minimization for 8-bit S-box circuits
//!
//! This crate searches for a small Boolean-gate circuit implementing a fixed 8-bit
//! S-box. It is a Rust implementation of an improved variant of Kwan's bitslice
//! gate-count reduction algorithm: a shared gate network is grown one output bit at a
//! time, greedily reusing existing gates before falling back to a recursive
//! Shannon-expansion split when no small combination of existing gates realizes the
//! target function.
//!
//! The [`synth`] module holds the actual search; [`state`], [`gate`] and
//! [`truth_table`] hold its data model; [`driver`] drives the search across all 8
//! output bits; [`persist`] and [`dot`] handle on-disk state and Graphviz export.

#![warn(missing_docs)]

pub mod dot;
pub mod driver;
pub mod gate;
pub mod persist;
pub mod sbox;
pub mod state;
pub mod synth;
pub mod target;
pub mod truth_table;

pub use gate::{Gate, GateId, GateKind};
pub use sbox::{MAX_GATES, SBOX};
pub use state::State;
pub use synth::create_circuit;
pub use truth_table::TruthTable;
