//! Binary persistence of a [`State`] to and from a file
//!
//! This is a private, crate-defined binary image, not an interchange format: there is
//! no requirement that it be readable by any other tool, or even across platforms. It
//! only has to round-trip exactly through [`save`]/[`load`], read and written directly
//! with `std::fs`/`std::io` rather than pulling in a serialization framework for a
//! format nothing else needs to read.

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;

use crate::gate::{Gate, GateId, GateKind};
use crate::sbox::MAX_GATES;
use crate::state::State;
use crate::truth_table::TruthTable;

/// Sentinel written for `GateId::NONE` and unassigned outputs
const NONE_MARKER: u64 = u64::MAX;

fn kind_tag(kind: GateKind) -> u32 {
    match kind {
        GateKind::Input => 0,
        GateKind::Not => 1,
        GateKind::And => 2,
        GateKind::Or => 3,
        GateKind::Xor => 4,
    }
}

fn tag_kind(tag: u32) -> io::Result<GateKind> {
    match tag {
        0 => Ok(GateKind::Input),
        1 => Ok(GateKind::Not),
        2 => Ok(GateKind::And),
        3 => Ok(GateKind::Or),
        4 => Ok(GateKind::Xor),
        _ => Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("unknown gate kind tag {tag}"),
        )),
    }
}

fn gate_id_to_raw(id: GateId) -> u64 {
    if id.is_none() {
        NONE_MARKER
    } else {
        id.index()
    }
}

fn raw_to_gate_id(raw: u64) -> GateId {
    if raw == NONE_MARKER {
        GateId::NONE
    } else {
        GateId::new(raw)
    }
}

/// Write a state to `path`, in this crate's private binary format
///
/// The record layout is: `max_gates: u64`, `num_gates: u64`, 8 output slots (`u64`
/// each, `u64::MAX` for unassigned), then exactly [`MAX_GATES`] fixed-width gate
/// records (`kind: u32`, `table: [u64; 4]`, `in1: u64`, `in2: u64`) — only the first
/// `num_gates` records hold real gates, the rest are zero-filled padding.
pub fn save(path: impl AsRef<Path>, state: &State) -> io::Result<()> {
    let mut f = File::create(path)?;
    write_state(&mut f, state)
}

/// Write a state to an arbitrary writer (used by [`save`] and by tests)
pub fn write_state(w: &mut impl Write, state: &State) -> io::Result<()> {
    w.write_all(&(state.max_gates as u64).to_le_bytes())?;
    w.write_all(&(state.num_gates() as u64).to_le_bytes())?;
    for o in state.outputs.iter() {
        let raw = o.map(gate_id_to_raw).unwrap_or(NONE_MARKER);
        w.write_all(&raw.to_le_bytes())?;
    }
    for i in 0..MAX_GATES {
        if i < state.num_gates() {
            let gate = state.gate(GateId::new(i as u64));
            write_gate(w, gate)?;
        } else {
            write_empty_gate(w)?;
        }
    }
    Ok(())
}

fn write_gate(w: &mut impl Write, gate: &Gate) -> io::Result<()> {
    w.write_all(&kind_tag(gate.kind).to_le_bytes())?;
    for lane in gate.table.lanes() {
        w.write_all(&lane.to_le_bytes())?;
    }
    w.write_all(&gate_id_to_raw(gate.in1).to_le_bytes())?;
    w.write_all(&gate_id_to_raw(gate.in2).to_le_bytes())?;
    Ok(())
}

fn write_empty_gate(w: &mut impl Write) -> io::Result<()> {
    w.write_all(&0u32.to_le_bytes())?;
    w.write_all(&[0u8; 32])?;
    w.write_all(&NONE_MARKER.to_le_bytes())?;
    w.write_all(&NONE_MARKER.to_le_bytes())?;
    Ok(())
}

/// Load a state previously written by [`save`]
pub fn load(path: impl AsRef<Path>) -> io::Result<State> {
    let mut f = File::open(path)?;
    read_state(&mut f)
}

/// Read a state from an arbitrary reader (used by [`load`] and by tests)
pub fn read_state(r: &mut impl Read) -> io::Result<State> {
    let max_gates = read_u64(r)? as usize;
    let num_gates = read_u64(r)? as usize;

    let mut outputs = [None; 8];
    for o in outputs.iter_mut() {
        let raw = read_u64(r)?;
        *o = if raw == NONE_MARKER {
            None
        } else {
            Some(GateId::new(raw))
        };
    }

    let mut gates = Vec::with_capacity(num_gates);
    for i in 0..MAX_GATES {
        let gate = read_gate(r)?;
        if i < num_gates {
            gates.push(gate);
        }
    }

    Ok(State::from_parts(gates, max_gates, outputs))
}

fn read_gate(r: &mut impl Read) -> io::Result<Gate> {
    let tag = read_u32(r)?;
    let kind = tag_kind(tag)?;
    let mut lanes = [0u64; 4];
    for lane in lanes.iter_mut() {
        *lane = read_u64(r)?;
    }
    let in1 = raw_to_gate_id(read_u64(r)?);
    let in2 = raw_to_gate_id(read_u64(r)?);
    Ok(Gate {
        kind,
        table: TruthTable::from_lanes(lanes),
        in1,
        in2,
    })
}

fn read_u64(r: &mut impl Read) -> io::Result<u64> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf)?;
    Ok(u64::from_le_bytes(buf))
}

fn read_u32(r: &mut impl Read) -> io::Result<u32> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::GateId;

    #[test]
    fn test_round_trip_fresh_state() {
        let st = State::with_inputs(MAX_GATES);
        let mut buf = Vec::new();
        write_state(&mut buf, &st).unwrap();
        let loaded = read_state(&mut buf.as_slice()).unwrap();
        assert_eq!(loaded.num_gates(), st.num_gates());
        assert_eq!(loaded.max_gates, st.max_gates);
        for i in 0..st.num_gates() {
            let id = GateId::new(i as u64);
            assert_eq!(loaded.table(id), st.table(id));
            assert_eq!(loaded.gate(id).kind, st.gate(id).kind);
        }
    }

    #[test]
    fn test_round_trip_with_outputs_and_extra_gates() {
        let mut st = State::with_inputs(MAX_GATES);
        let g = st.and(GateId::new(0), GateId::new(1)).unwrap();
        st.outputs[0] = Some(g);
        st.max_gates = 42;

        let mut buf = Vec::new();
        write_state(&mut buf, &st).unwrap();
        let loaded = read_state(&mut buf.as_slice()).unwrap();

        assert_eq!(loaded.max_gates, 42);
        assert_eq!(loaded.outputs[0], Some(g));
        assert_eq!(loaded.outputs[1], None);
        assert_eq!(loaded.num_gates(), 9);
        assert_eq!(loaded.gate(g).in1, GateId::new(0));
        assert_eq!(loaded.gate(g).in2, GateId::new(1));
    }

    #[test]
    fn test_save_and_load_through_a_real_file() {
        let dir = std::env::temp_dir();
        let path = dir.join(format!("sboxgates-test-{}.state", std::process::id()));

        let mut st = State::with_inputs(MAX_GATES);
        let g = st.xor(GateId::new(2), GateId::new(3)).unwrap();
        st.outputs[5] = Some(g);

        save(&path, &st).unwrap();
        let loaded = load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded.num_gates(), st.num_gates());
        assert_eq!(loaded.outputs[5], Some(g));
    }
}
