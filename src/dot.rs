//! Graphviz rendering of a gate-DAG state

use std::io::{self, Write};

use crate::gate::GateKind;
use crate::state::State;

/// Write `state` to `w` as a Graphviz `digraph`
///
/// Every gate becomes a node labeled `IN n`, `NOT`, `AND`, `OR`, or `XOR`; every gate
/// input becomes an edge into it; and every assigned output becomes an edge from its
/// gate to a node named `out<i>`.
pub fn write_dot(state: &State, w: &mut impl Write) -> io::Result<()> {
    writeln!(w, "digraph sbox {{")?;
    for (id, gate) in state.iter() {
        let label = match gate.kind {
            GateKind::Input => format!("IN {}", id.index()),
            GateKind::Not => "NOT".to_string(),
            GateKind::And => "AND".to_string(),
            GateKind::Or => "OR".to_string(),
            GateKind::Xor => "XOR".to_string(),
        };
        writeln!(w, "  gt{} [label=\"{}\"];", id.index(), label)?;
    }
    for (id, gate) in state.iter() {
        if !gate.in1.is_none() {
            writeln!(w, "  gt{} -> gt{};", gate.in1.index(), id.index())?;
        }
        if !gate.in2.is_none() {
            writeln!(w, "  gt{} -> gt{};", gate.in2.index(), id.index())?;
        }
    }
    for (i, out) in state.outputs.iter().enumerate() {
        if let Some(g) = out {
            writeln!(w, "  gt{} -> out{};", g.index(), i)?;
        }
    }
    writeln!(w, "}}")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::GateId;
    use crate::sbox::MAX_GATES;

    #[test]
    fn test_dot_contains_every_gate_and_output() {
        let mut st = State::with_inputs(MAX_GATES);
        let g = st.and(GateId::new(0), GateId::new(1)).unwrap();
        st.outputs[0] = Some(g);

        let mut buf = Vec::new();
        write_dot(&st, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert!(text.starts_with("digraph sbox {"));
        assert!(text.trim_end().ends_with('}'));
        assert!(text.contains("gt8 [label=\"AND\"]"));
        assert!(text.contains("gt0 -> gt8;"));
        assert!(text.contains("gt1 -> gt8;"));
        assert!(text.contains("gt8 -> out0;"));
        for i in 0..8 {
            assert!(text.contains(&format!("gt{i} [label=\"IN {i}\"]")));
        }
    }

    #[test]
    fn test_dot_has_no_output_edge_when_unassigned() {
        let st = State::with_inputs(MAX_GATES);
        let mut buf = Vec::new();
        write_dot(&st, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(!text.contains("-> out"));
    }
}
