//! The circuit synthesizer: greedy gate reuse, then Shannon-expansion recursion
//!
//! [`create_circuit`] either finds (or builds, in increasingly expensive ways) a gate
//! whose masked truth table matches `target`, reusing whatever is already present in
//! `state` before paying the cost of a recursive split. See the module-level
//! walkthrough in each phase function below; the phases are tried in order and the
//! first one to succeed wins.

use itertools::Itertools;

use crate::gate::GateId;
use crate::state::State;
use crate::truth_table::TruthTable;

/// The maximum number of input bits that may be used as Shannon-split variables along
/// a single recursion path
const MAX_USED_BITS: usize = 6;

/// Find or build a gate whose table matches `target` under `mask`
///
/// Returns the index of an existing gate if one already computes the right (masked)
/// function, or appends the minimal number of new gates this search can find and
/// returns the index of the last one appended. `used_bits` lists the input-bit indices
/// already chosen as Shannon-split variables along the current recursion path; it
/// never holds more than [`MAX_USED_BITS`] entries, enforced by phase 6 failing once
/// that many have been used.
///
/// Returns `None` if no combination within the search's reach (bounded by
/// `state.max_gates` and `MAX_USED_BITS` levels of splitting) realizes the target.
pub fn create_circuit(
    state: &mut State,
    target: TruthTable,
    mask: TruthTable,
    used_bits: &[u8],
) -> Option<GateId> {
    if let Some(g) = reuse_existing(state, target, mask) {
        return Some(g);
    }
    if let Some(g) = reuse_inverse(state, target, mask) {
        return Some(g);
    }
    if let Some(g) = combine_pair(state, target, mask) {
        return Some(g);
    }
    if let Some(g) = combine_pair_inverted(state, target, mask) {
        return Some(g);
    }
    if let Some(g) = combine_triple(state, target, mask) {
        return Some(g);
    }
    shannon_split(state, target, mask, used_bits)
}

/// Phase 1: an existing gate already computes `target` under `mask`
fn reuse_existing(state: &State, target: TruthTable, mask: TruthTable) -> Option<GateId> {
    for (id, gate) in state.iter() {
        if target.eq_masked(&gate.table, &mask) {
            return Some(id);
        }
    }
    None
}

/// Phase 2: the inverse of an existing gate computes `target` under `mask`
fn reuse_inverse(state: &mut State, target: TruthTable, mask: TruthTable) -> Option<GateId> {
    let found = state
        .iter()
        .find(|(_, gate)| target.eq_masked(&!gate.table, &mask))
        .map(|(id, _)| id);
    let id = found?;
    state.not(id)
}

/// Phase 3: two existing gates combine with a single Or/And/Xor to produce `target`
fn combine_pair(state: &mut State, target: TruthTable, mask: TruthTable) -> Option<GateId> {
    let mtarget = target & mask;
    let n = state.num_gates();
    for (i, k) in (0..n).tuple_combinations() {
        let (i, k) = (GateId::from(i), GateId::from(k));
        let ti = state.table(i) & mask;
        let tk = state.table(k) & mask;
        if mtarget.eq(&(ti | tk)) {
            return state.or(i, k);
        }
        if mtarget.eq(&(ti & tk)) {
            return state.and(i, k);
        }
        if mtarget.eq(&(ti ^ tk)) {
            return state.xor(i, k);
        }
    }
    None
}

/// Phase 4: two existing gates combine with a single Nor/Nand/Xnor/OrNot/AndNot
fn combine_pair_inverted(state: &mut State, target: TruthTable, mask: TruthTable) -> Option<GateId> {
    let n = state.num_gates();
    for (i, k) in (0..n).tuple_combinations() {
        let (i, k) = (GateId::from(i), GateId::from(k));
        let ti = state.table(i);
        let tk = state.table(k);
        if target.eq_masked(&!(ti | tk), &mask) {
            return state.nor(i, k);
        }
        if target.eq_masked(&!(ti & tk), &mask) {
            return state.nand(i, k);
        }
        if target.eq_masked(&!(ti ^ tk), &mask) {
            return state.xnor(i, k);
        }
        if target.eq_masked(&(!ti | tk), &mask) {
            return state.or_not(i, k);
        }
        if target.eq_masked(&(!tk | ti), &mask) {
            return state.or_not(k, i);
        }
        if target.eq_masked(&(!ti & tk), &mask) {
            return state.and_not(i, k);
        }
        if target.eq_masked(&(!tk & ti), &mask) {
            return state.and_not(k, i);
        }
    }
    None
}

/// Phase 5: three existing gates combine with two operators to produce `target`
///
/// For each triple `(i, k, m)` with `i < k < m`, every pairing of two gates combined
/// first and then combined with the third is tried — 24 three-gate compositions in
/// total per triple, an exhaustive but still linear-in-triples search.
fn combine_triple(state: &mut State, target: TruthTable, mask: TruthTable) -> Option<GateId> {
    let n = state.num_gates();
    let mtarget = target & mask;
    for (i, k, m) in (0..n).tuple_combinations() {
        let (i, k, m) = (GateId::from(i), GateId::from(k), GateId::from(m));
        let ti = state.table(i) & mask;
        let tk = state.table(k) & mask;
        let tm = state.table(m) & mask;

        let iandk = ti & tk;
        let iork = ti | tk;
        let ixork = ti ^ tk;
        if mtarget.eq(&(iandk & tm)) {
            return state.and3(i, k, m);
        }
        if mtarget.eq(&(iandk | tm)) {
            return state.and_or(i, k, m);
        }
        if mtarget.eq(&(iandk ^ tm)) {
            return state.and_xor(i, k, m);
        }
        if mtarget.eq(&(iork | tm)) {
            return state.or3(i, k, m);
        }
        if mtarget.eq(&(iork & tm)) {
            return state.or_and(i, k, m);
        }
        if mtarget.eq(&(iork ^ tm)) {
            return state.or_xor(i, k, m);
        }
        if mtarget.eq(&(ixork ^ tm)) {
            return state.xor3(i, k, m);
        }
        if mtarget.eq(&(ixork | tm)) {
            return state.xor_or(i, k, m);
        }
        if mtarget.eq(&(ixork & tm)) {
            return state.xor_and(i, k, m);
        }

        let iandm = ti & tm;
        if mtarget.eq(&(iandm | tk)) {
            return state.and_or(i, m, k);
        }
        if mtarget.eq(&(iandm ^ tk)) {
            return state.and_xor(i, m, k);
        }
        let kandm = tk & tm;
        if mtarget.eq(&(kandm | ti)) {
            return state.and_or(k, m, i);
        }
        if mtarget.eq(&(kandm ^ ti)) {
            return state.and_xor(k, m, i);
        }

        let ixorm = ti ^ tm;
        if mtarget.eq(&(ixorm | tk)) {
            return state.xor_or(i, m, k);
        }
        if mtarget.eq(&(ixorm & tk)) {
            return state.xor_and(i, m, k);
        }
        let kxorm = tk ^ tm;
        if mtarget.eq(&(kxorm | ti)) {
            return state.xor_or(k, m, i);
        }
        if mtarget.eq(&(kxorm & ti)) {
            return state.xor_and(k, m, i);
        }

        let iorm = ti | tm;
        if mtarget.eq(&(iorm & tk)) {
            return state.or_and(i, m, k);
        }
        if mtarget.eq(&(iorm ^ tk)) {
            return state.or_xor(i, m, k);
        }
        let korm = tk | tm;
        if mtarget.eq(&(korm & ti)) {
            return state.or_and(k, m, i);
        }
        if mtarget.eq(&(korm ^ ti)) {
            return state.or_xor(k, m, i);
        }
    }
    None
}

/// One multiplexer candidate built during phase 6, and the state that produced it
struct MuxCandidate {
    state: State,
    out: GateId,
}

/// Phase 6: split on an unused input bit and build an And- or Or-multiplexer
///
/// Tries every input bit not already in `used_bits`, in ascending order. For each bit,
/// both the And-multiplexer and Or-multiplexer idioms are attempted on independent
/// clones of `state`; the cheaper of the two (ties favor And) becomes that bit's
/// candidate. The overall cheapest candidate across all bits wins, with ties favoring
/// the first bit considered. On success, `state` is replaced with the winning clone.
fn shannon_split(
    state: &mut State,
    target: TruthTable,
    mask: TruthTable,
    used_bits: &[u8],
) -> Option<GateId> {
    if used_bits.len() >= MAX_USED_BITS {
        return None;
    }

    let mut best: Option<MuxCandidate> = None;

    for bit in 0u8..8 {
        if used_bits.contains(&bit) {
            continue;
        }
        let mut next_used_bits = used_bits.to_vec();
        next_used_bits.push(bit);

        let fsel = state.table(GateId::from(bit as usize));

        let and_candidate = build_and_mux(state, target, mask, fsel, bit, &next_used_bits);
        let or_candidate = build_or_mux(state, target, mask, fsel, bit, &next_used_bits);

        let candidate = match (and_candidate, or_candidate) {
            (Some(a), Some(o)) => {
                if a.state.num_gates() <= o.state.num_gates() {
                    Some(a)
                } else {
                    Some(o)
                }
            }
            (Some(a), None) => Some(a),
            (None, Some(o)) => Some(o),
            (None, None) => None,
        };

        let Some(candidate) = candidate else {
            continue;
        };
        debug_assert!(target.eq_masked(&candidate.state.table(candidate.out), &mask));

        let better = match &best {
            None => true,
            Some(b) => candidate.state.num_gates() < b.state.num_gates(),
        };
        if better {
            best = Some(candidate);
        }
    }

    let best = best?;
    *state = best.state;
    Some(best.out)
}

/// Build the And-multiplexer candidate for a single split bit
///
/// `f = fb XOR ((fb XOR fc) AND bit)`, where `fb` realizes `target` where `bit = 0` and
/// `fc` corrects it to also match where `bit = 1`.
fn build_and_mux(
    state: &State,
    target: TruthTable,
    mask: TruthTable,
    fsel: TruthTable,
    bit: u8,
    used_bits: &[u8],
) -> Option<MuxCandidate> {
    let mut s = state.clone();
    let bit_id = GateId::from(bit as usize);
    let fb = create_circuit(&mut s, target & !fsel, mask & !fsel, used_bits)?;
    let fc = create_circuit(&mut s, s.table(fb) ^ target, mask & fsel, used_bits)?;
    let andg = s.and(fc, bit_id)?;
    let out = s.xor(fb, andg)?;
    Some(MuxCandidate { state: s, out })
}

/// Build the Or-multiplexer candidate for a single split bit
///
/// `f = fd XOR ((fd XOR fe) OR bit)`, where `fd` realizes `target` where `bit = 1` and
/// `fe` corrects it to also match where `bit = 0`.
fn build_or_mux(
    state: &State,
    target: TruthTable,
    mask: TruthTable,
    fsel: TruthTable,
    bit: u8,
    used_bits: &[u8],
) -> Option<MuxCandidate> {
    let mut s = state.clone();
    let bit_id = GateId::from(bit as usize);
    let fd = create_circuit(&mut s, !target & fsel, mask & fsel, used_bits)?;
    let fe = create_circuit(&mut s, s.table(fd) ^ target, mask & !fsel, used_bits)?;
    let org = s.or(fe, bit_id)?;
    let out = s.xor(fd, org)?;
    Some(MuxCandidate { state: s, out })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::GateKind;
    use crate::sbox::MAX_GATES;
    use crate::target::generate_target;

    #[test]
    fn test_single_variable_reused() {
        let mut st = State::with_inputs(MAX_GATES);
        let target = generate_target(3, false);
        let g = create_circuit(&mut st, target, TruthTable::ALL_ONES, &[]).unwrap();
        assert_eq!(g, GateId::new(3));
        assert_eq!(st.num_gates(), 8);
    }

    #[test]
    fn test_inverse_reuse() {
        let mut st = State::with_inputs(MAX_GATES);
        let target = !generate_target(3, false);
        let g = create_circuit(&mut st, target, TruthTable::ALL_ONES, &[]).unwrap();
        assert_eq!(st.num_gates(), 9);
        assert_eq!(g, GateId::new(8));
        assert_eq!(st.gate(g).kind, GateKind::Not);
        assert_eq!(st.gate(g).in1, GateId::new(3));
    }

    #[test]
    fn test_two_gate_and() {
        let mut st = State::with_inputs(MAX_GATES);
        let target = generate_target(0, false) & generate_target(1, false);
        let g = create_circuit(&mut st, target, TruthTable::ALL_ONES, &[]).unwrap();
        assert_eq!(st.num_gates(), 9);
        assert_eq!(g, GateId::new(8));
        assert_eq!(st.gate(g).kind, GateKind::And);
        assert_eq!(st.gate(g).in1, GateId::new(0));
        assert_eq!(st.gate(g).in2, GateId::new(1));
    }

    #[test]
    fn test_reuse_is_smallest_index_and_free() {
        let mut st = State::with_inputs(MAX_GATES);
        // Build a redundant duplicate of gate 0's function, then ask for it again:
        // the search must hand back the original, smallest-index gate at no cost.
        let dup = st.not(GateId::new(0)).unwrap();
        let dup = st.not(dup).unwrap();
        assert_eq!(st.table(dup), st.table(GateId::new(0)));
        let before = st.num_gates();
        let g = create_circuit(
            &mut st,
            st.table(GateId::new(0)),
            TruthTable::ALL_ONES,
            &[],
        )
        .unwrap();
        assert_eq!(g, GateId::new(0));
        assert_eq!(st.num_gates(), before);
    }

    #[test]
    fn test_shannon_split_needed() {
        // A target equal to a multiplexer between two unrelated input bits cannot be
        // built from a single gate, its inverse, or any 2- or 3-gate combination of the
        // 8 inputs, but is realizable via a Shannon split.
        let mut st = State::with_inputs(MAX_GATES);
        let sel = st.table(GateId::new(0));
        let a = st.table(GateId::new(1));
        let b = st.table(GateId::new(2));
        // f = (sel AND a) OR (NOT sel AND b), a real 2-to-1 multiplexer
        let target = (sel & a) | (!sel & b);
        let g = create_circuit(&mut st, target, TruthTable::ALL_ONES, &[]).unwrap();
        assert!(st.table(g).eq_masked(&target, &TruthTable::ALL_ONES));
        assert!(st.num_gates() > 8);
    }

    #[test]
    fn test_sbox_output_0_synthesizes_correctly() {
        let mut st = State::with_inputs(MAX_GATES);
        let target = generate_target(0, true);
        let g = create_circuit(&mut st, target, TruthTable::ALL_ONES, &[]).unwrap();
        assert_eq!(st.table(g), target);
    }

    #[test]
    fn test_budget_prunes_search() {
        let mut st = State::with_inputs(MAX_GATES);
        let target = generate_target(0, true);
        let g = create_circuit(&mut st, target, TruthTable::ALL_ONES, &[]).unwrap();
        let _ = g;
        let n = st.num_gates();

        let mut tight = State::with_inputs(n - 1);
        let result = create_circuit(&mut tight, target, TruthTable::ALL_ONES, &[]);
        match result {
            None => {}
            Some(_) => assert!(tight.num_gates() < n),
        }
    }

    #[test]
    fn test_shannon_split_rejects_full_used_bits() {
        let st = State::with_inputs(MAX_GATES);
        let sel = st.table(GateId::new(6));
        let a = st.table(GateId::new(0));
        let b = st.table(GateId::new(1));
        // A real 2-to-1 multiplexer on bit 6, unreachable via phases 1-5 (same shape
        // as test_shannon_split_needed), so only a split on bit 6 or bit 7 realizes it.
        let target = (sel & a) | (!sel & b);

        // Every other bit is already a split variable: shannon_split must refuse
        // outright once its own cap is hit, before even looking at the remaining bits.
        let used_at_cap: Vec<u8> = (0..6).collect();
        let mut capped = st.clone();
        assert_eq!(
            shannon_split(&mut capped, target, TruthTable::ALL_ONES, &used_at_cap),
            None
        );

        // Sanity: with room for one more split variable, the same target is solvable —
        // proving the None above comes from the cap, not from the target itself.
        let used_with_room: Vec<u8> = (0..5).collect();
        let mut st2 = st.clone();
        let g = shannon_split(&mut st2, target, TruthTable::ALL_ONES, &used_with_room).unwrap();
        assert!(st2.table(g).eq_masked(&target, &TruthTable::ALL_ONES));
    }
}
