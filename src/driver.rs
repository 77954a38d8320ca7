//! Drives the synthesizer over all 8 S-box output bits, tightening the gate budget
//! after every success and persisting each new state to disk

use std::path::Path;

use kdam::tqdm;

use crate::sbox::MAX_GATES;
use crate::state::State;
use crate::synth::create_circuit;
use crate::target::generate_sbox_targets;
use crate::truth_table::TruthTable;

/// Synthesize circuits for every S-box output bit not yet assigned in `state`
///
/// For each unassigned output, in ascending order: run [`create_circuit`] on a clone of
/// `state` with the output's target truth table and a full mask; on success, assign
/// the output, assert the (unmasked) result matches the target, save the resulting
/// state to `<assigned-count>-<gates-added>-<outputs>.state` in the current directory,
/// and tighten `state.max_gates` to the gate count just achieved so later outputs can
/// never be more expensive than earlier ones. On failure, report it and move on.
pub fn synthesize_all(state: &mut State) {
    let targets = generate_sbox_targets();
    let pending: Vec<u8> = (0..8u8).filter(|&o| state.outputs[o as usize].is_none()).collect();

    for output in tqdm!(pending.into_iter()) {
        println!("Generating circuit for output {output}...");
        let mut candidate = state.clone();
        let result = create_circuit(
            &mut candidate,
            targets[output as usize],
            TruthTable::ALL_ONES,
            &[],
        );

        let Some(gate) = result else {
            println!("No solution for output {output}.");
            continue;
        };

        assert!(
            candidate.table(gate) == targets[output as usize],
            "synthesized gate does not match the full (unmasked) target"
        );
        candidate.outputs[output as usize] = Some(gate);

        let filename = output_filename(&candidate);
        if let Err(e) = crate::persist::save(&filename, &candidate) {
            eprintln!("Warning: failed to save {filename}: {e}");
        }

        if candidate.num_gates() < state.max_gates {
            println!("New max gates: {}", candidate.num_gates());
        }
        let new_max = candidate.num_gates();
        *state = candidate;
        state.max_gates = new_max;
    }
}

/// Build the output filename for a state that just had an output assigned
///
/// `<k>-<nnn>-<outs>.state`, where `k` is the number of assigned outputs, `nnn` is
/// `num_gates() - 7` zero-padded to 3 digits, and `outs` is the ascending digits of
/// every assigned output.
fn output_filename(state: &State) -> String {
    let assigned: Vec<usize> = (0..8).filter(|&i| state.outputs[i].is_some()).collect();
    let outs: String = assigned.iter().map(|i| i.to_string()).collect();
    let added = state.num_gates().saturating_sub(7);
    format!("{}-{:03}-{}.state", assigned.len(), added, outs)
}

/// Build a fresh state with the 8 input leaves and the compile-time gate cap
pub fn fresh_state() -> State {
    State::with_inputs(MAX_GATES)
}

/// Load a state from `path`, resetting `max_gates` back to the compile-time cap so a
/// resumed run is not stuck with whatever budget the file was saved under
pub fn load_for_resume(path: impl AsRef<Path>) -> std::io::Result<State> {
    let mut state = crate::persist::load(path)?;
    state.max_gates = MAX_GATES;
    Ok(state)
}
