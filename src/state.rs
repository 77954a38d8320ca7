//! Shared gate-DAG state

use crate::gate::{Gate, GateId, GateKind};
use crate::sbox::MAX_GATES;
use crate::target::generate_input_targets;
use crate::truth_table::TruthTable;

/// The shared circuit being built
///
/// Gates 0..7 are always the eight input leaves. Growing a `State` is append-only:
/// [`State::add`] is the only way to introduce a new gate, and it always appends at
/// the end, so every gate's inputs necessarily have a strictly smaller index (see
/// [`Gate`]'s invariants). `State` is cheap to [`Clone`] and is cloned whenever the
/// synthesizer forks into independent branches (see [`crate::synth::create_circuit`]
/// phase 6): mutations in one clone never affect another.
#[derive(Debug, Clone)]
pub struct State {
    gates: Vec<Gate>,
    /// Upper bound on the number of gates this state may ever hold
    pub max_gates: usize,
    /// Gate index assigned to each of the 8 S-box output bits, or `None`
    pub outputs: [Option<GateId>; 8],
}

impl State {
    /// Build a fresh state with the eight input leaves populated and no outputs assigned
    pub fn with_inputs(max_gates: usize) -> State {
        let input_tables = generate_input_targets();
        let gates = input_tables.iter().map(|&t| Gate::input(t)).collect();
        State {
            gates,
            max_gates,
            outputs: [None; 8],
        }
    }

    /// Rebuild a state from its raw parts, as read back from a saved file
    ///
    /// Used only by [`crate::persist::read_state`]; does not re-validate the DAG
    /// invariants (the file format is only ever produced by [`crate::persist::save`]).
    pub(crate) fn from_parts(
        gates: Vec<Gate>,
        max_gates: usize,
        outputs: [Option<GateId>; 8],
    ) -> State {
        State {
            gates,
            max_gates,
            outputs,
        }
    }

    /// Number of gates currently in the state, including the 8 input leaves
    pub fn num_gates(&self) -> usize {
        self.gates.len()
    }

    /// Get the gate at the given index
    pub fn gate(&self, id: GateId) -> &Gate {
        &self.gates[id.as_usize()]
    }

    /// Get the truth table of the gate at the given index
    pub fn table(&self, id: GateId) -> TruthTable {
        self.gates[id.as_usize()].table
    }

    /// Iterate over all gates with their index, in ascending order
    pub fn iter(&self) -> impl Iterator<Item = (GateId, &Gate)> {
        self.gates
            .iter()
            .enumerate()
            .map(|(i, g)| (GateId::from(i), g))
    }

    /// Append a new gate, or fail if an input is missing or the budget is exhausted
    ///
    /// Returns `None` if `in1` or `in2` (when required by `kind`) is `GateId::NONE`, or
    /// if `num_gates() == max_gates`. Otherwise appends the gate and returns its index.
    pub fn add(
        &mut self,
        kind: GateKind,
        table: TruthTable,
        in1: GateId,
        in2: GateId,
    ) -> Option<GateId> {
        if in1.is_none() {
            return None;
        }
        if in2.is_none() && !matches!(kind, GateKind::Not) {
            return None;
        }
        debug_assert!(!matches!(kind, GateKind::Input));
        debug_assert!(in1.as_usize() < self.num_gates());
        debug_assert!(matches!(kind, GateKind::Not) || in2.as_usize() < self.num_gates());
        if self.num_gates() >= self.max_gates {
            return None;
        }
        self.gates.push(Gate {
            kind,
            table,
            in1,
            in2,
        });
        Some(GateId::from(self.num_gates() - 1))
    }

    /// Append a `Not` gate inverting `a`
    pub fn not(&mut self, a: GateId) -> Option<GateId> {
        if a.is_none() {
            return None;
        }
        let table = !self.table(a);
        self.add(GateKind::Not, table, a, GateId::NONE)
    }

    /// Append an `And` gate
    pub fn and(&mut self, a: GateId, b: GateId) -> Option<GateId> {
        if a.is_none() || b.is_none() {
            return None;
        }
        let table = self.table(a) & self.table(b);
        self.add(GateKind::And, table, a, b)
    }

    /// Append an `Or` gate
    pub fn or(&mut self, a: GateId, b: GateId) -> Option<GateId> {
        if a.is_none() || b.is_none() {
            return None;
        }
        let table = self.table(a) | self.table(b);
        self.add(GateKind::Or, table, a, b)
    }

    /// Append a `Xor` gate
    pub fn xor(&mut self, a: GateId, b: GateId) -> Option<GateId> {
        if a.is_none() || b.is_none() {
            return None;
        }
        let table = self.table(a) ^ self.table(b);
        self.add(GateKind::Xor, table, a, b)
    }

    /// Append `NOT(AND(a, b))`
    pub fn nand(&mut self, a: GateId, b: GateId) -> Option<GateId> {
        let g = self.and(a, b)?;
        self.not(g)
    }

    /// Append `NOT(OR(a, b))`
    pub fn nor(&mut self, a: GateId, b: GateId) -> Option<GateId> {
        let g = self.or(a, b)?;
        self.not(g)
    }

    /// Append `NOT(XOR(a, b))`
    pub fn xnor(&mut self, a: GateId, b: GateId) -> Option<GateId> {
        let g = self.xor(a, b)?;
        self.not(g)
    }

    /// Append `OR(NOT(a), b)` — only `a` is inverted
    pub fn or_not(&mut self, a: GateId, b: GateId) -> Option<GateId> {
        let na = self.not(a)?;
        self.or(na, b)
    }

    /// Append `AND(NOT(a), b)` — only `a` is inverted
    pub fn and_not(&mut self, a: GateId, b: GateId) -> Option<GateId> {
        let na = self.not(a)?;
        self.and(na, b)
    }

    /// Append `OR(OR(a, b), c)`
    pub fn or3(&mut self, a: GateId, b: GateId, c: GateId) -> Option<GateId> {
        let ab = self.or(a, b)?;
        self.or(ab, c)
    }

    /// Append `AND(AND(a, b), c)`
    pub fn and3(&mut self, a: GateId, b: GateId, c: GateId) -> Option<GateId> {
        let ab = self.and(a, b)?;
        self.and(ab, c)
    }

    /// Append `XOR(XOR(a, b), c)`
    pub fn xor3(&mut self, a: GateId, b: GateId, c: GateId) -> Option<GateId> {
        let ab = self.xor(a, b)?;
        self.xor(ab, c)
    }

    /// Append `OR(AND(a, b), c)`
    pub fn and_or(&mut self, a: GateId, b: GateId, c: GateId) -> Option<GateId> {
        let ab = self.and(a, b)?;
        self.or(ab, c)
    }

    /// Append `XOR(AND(a, b), c)`
    pub fn and_xor(&mut self, a: GateId, b: GateId, c: GateId) -> Option<GateId> {
        let ab = self.and(a, b)?;
        self.xor(ab, c)
    }

    /// Append `OR(XOR(a, b), c)`
    pub fn xor_or(&mut self, a: GateId, b: GateId, c: GateId) -> Option<GateId> {
        let ab = self.xor(a, b)?;
        self.or(ab, c)
    }

    /// Append `AND(XOR(a, b), c)`
    pub fn xor_and(&mut self, a: GateId, b: GateId, c: GateId) -> Option<GateId> {
        let ab = self.xor(a, b)?;
        self.and(ab, c)
    }

    /// Append `AND(OR(a, b), c)`
    pub fn or_and(&mut self, a: GateId, b: GateId, c: GateId) -> Option<GateId> {
        let ab = self.or(a, b)?;
        self.and(ab, c)
    }

    /// Append `XOR(OR(a, b), c)`
    pub fn or_xor(&mut self, a: GateId, b: GateId, c: GateId) -> Option<GateId> {
        let ab = self.or(a, b)?;
        self.xor(ab, c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_state_has_eight_inputs() {
        let st = State::with_inputs(MAX_GATES);
        assert_eq!(st.num_gates(), 8);
        for i in 0..8 {
            assert_eq!(st.gate(GateId::new(i)).kind, GateKind::Input);
        }
    }

    #[test]
    fn test_and_composes_tables() {
        let mut st = State::with_inputs(MAX_GATES);
        let g = st.and(GateId::new(0), GateId::new(1)).unwrap();
        assert_eq!(st.num_gates(), 9);
        let expected = st.table(GateId::new(0)) & st.table(GateId::new(1));
        assert_eq!(st.table(g), expected);
    }

    #[test]
    fn test_budget_exhausted_returns_none() {
        let mut st = State::with_inputs(8);
        assert_eq!(st.add(GateKind::Not, TruthTable::ZERO, GateId::new(0), GateId::NONE), None);
    }

    #[test]
    fn test_add_rejects_missing_input() {
        let mut st = State::with_inputs(MAX_GATES);
        assert_eq!(st.and(GateId::NONE, GateId::new(0)), None);
        assert_eq!(st.not(GateId::NONE), None);
    }

    #[test]
    fn test_and_not_inverts_only_first_operand() {
        let mut st = State::with_inputs(MAX_GATES);
        let g = st.and_not(GateId::new(0), GateId::new(1)).unwrap();
        let expected = !st.table(GateId::new(0)) & st.table(GateId::new(1));
        assert_eq!(st.table(g), expected);
    }

    #[test]
    fn test_composer_short_circuits_on_budget() {
        let mut st = State::with_inputs(9);
        // and3 needs 2 new gates; only 1 slot is left
        assert_eq!(st.and3(GateId::new(0), GateId::new(1), GateId::new(2)), None);
        assert_eq!(st.num_gates(), 9);
    }
}
