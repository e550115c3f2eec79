//! Binary persistence of a gate network state.
//!
//! A state is stored as one fixed-size little-endian record so a partially
//! solved S-box can be resumed across runs: `max_gates` and `num_gates` as
//! u64, the eight output slots as u64 (all-ones when unset), then exactly
//! [`MAX_GATES`] 49-byte gate records of kind byte, 256-bit truth table
//! (four u64 words, low word first) and two u64 input indices. Records past
//! `num_gates` are canonical padding, so identical runs write identical
//! files.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use thiserror::Error;

use crate::circuit::{Gate, GateId, GateKind, State, MAX_GATES, NUM_INPUTS, NUM_OUTPUTS};
use crate::ttable::Ttable;

/// On-disk sentinel for "no gate" / "no output".
pub const NO_GATE: u64 = u64::MAX;

/// Total size of a serialized state in bytes.
pub const STATE_SIZE: usize = 8 + 8 + NUM_OUTPUTS * 8 + MAX_GATES * GATE_SIZE;

const GATE_SIZE: usize = 1 + 32 + 8 + 8;

#[derive(Debug, Error)]
pub enum StateError {
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    #[error("gate count {0} outside {NUM_INPUTS}..={MAX_GATES}")]
    BadGateCount(u64),

    #[error("gate budget {0} exceeds {MAX_GATES}")]
    BadGateBudget(u64),

    #[error("unknown gate kind {0}")]
    BadGateKind(u8),

    #[error("gate {gate} references gate {input}, which is not earlier")]
    BadGateInput { gate: u64, input: u64 },

    #[error("output {slot} references gate {index}, which does not exist")]
    BadOutput { slot: usize, index: u64 },
}

fn encode_id(id: Option<GateId>) -> u64 {
    id.map_or(NO_GATE, |id| id as u64)
}

fn kind_byte(kind: GateKind) -> u8 {
    match kind {
        GateKind::Input => 0,
        GateKind::Not => 1,
        GateKind::And => 2,
        GateKind::Or => 3,
        GateKind::Xor => 4,
    }
}

fn kind_from_byte(byte: u8) -> Result<GateKind, StateError> {
    match byte {
        0 => Ok(GateKind::Input),
        1 => Ok(GateKind::Not),
        2 => Ok(GateKind::And),
        3 => Ok(GateKind::Or),
        4 => Ok(GateKind::Xor),
        other => Err(StateError::BadGateKind(other)),
    }
}

fn write_ttable<W: Write>(w: &mut W, table: Ttable) -> Result<(), StateError> {
    for word in table.words() {
        w.write_u64::<LittleEndian>(word)?;
    }
    Ok(())
}

fn read_ttable<R: Read>(r: &mut R) -> Result<Ttable, StateError> {
    let mut words = [0u64; 4];
    for word in words.iter_mut() {
        *word = r.read_u64::<LittleEndian>()?;
    }
    Ok(Ttable::from_words(words))
}

/// Serializes `st` into `w` as one fixed-size record.
pub fn write_state<W: Write>(mut w: W, st: &State) -> Result<(), StateError> {
    w.write_u64::<LittleEndian>(st.max_gates() as u64)?;
    w.write_u64::<LittleEndian>(st.num_gates() as u64)?;
    for slot in 0..NUM_OUTPUTS {
        w.write_u64::<LittleEndian>(encode_id(st.output(slot)))?;
    }
    for gate in st.gates() {
        w.write_u8(kind_byte(gate.kind))?;
        write_ttable(&mut w, gate.table)?;
        w.write_u64::<LittleEndian>(encode_id(gate.in1))?;
        w.write_u64::<LittleEndian>(encode_id(gate.in2))?;
    }
    for _ in st.num_gates()..MAX_GATES {
        w.write_u8(0)?;
        write_ttable(&mut w, Ttable::ZERO)?;
        w.write_u64::<LittleEndian>(NO_GATE)?;
        w.write_u64::<LittleEndian>(NO_GATE)?;
    }
    w.flush()?;
    Ok(())
}

/// Reads a state previously written by [`write_state`], validating the gate
/// count, gate kinds, and the topological ordering of the indices.
pub fn read_state<R: Read>(mut r: R) -> Result<State, StateError> {
    let max_gates = r.read_u64::<LittleEndian>()?;
    if max_gates > MAX_GATES as u64 {
        return Err(StateError::BadGateBudget(max_gates));
    }
    let num_gates = r.read_u64::<LittleEndian>()?;
    if !(NUM_INPUTS as u64..=MAX_GATES as u64).contains(&num_gates) {
        return Err(StateError::BadGateCount(num_gates));
    }

    let mut outputs = [None; NUM_OUTPUTS];
    for (slot, out) in outputs.iter_mut().enumerate() {
        let index = r.read_u64::<LittleEndian>()?;
        if index != NO_GATE {
            if index >= num_gates {
                return Err(StateError::BadOutput { slot, index });
            }
            *out = Some(index as GateId);
        }
    }

    let mut gates = Vec::with_capacity(num_gates as usize);
    for id in 0..MAX_GATES as u64 {
        let kind = kind_from_byte(r.read_u8()?);
        let table = read_ttable(&mut r)?;
        let in1 = r.read_u64::<LittleEndian>()?;
        let in2 = r.read_u64::<LittleEndian>()?;
        if id >= num_gates {
            continue; // Padding record; only its framing matters.
        }
        let kind = kind?;
        let decode = |input: u64| -> Result<Option<GateId>, StateError> {
            if input == NO_GATE {
                return Ok(None);
            }
            if input >= id {
                return Err(StateError::BadGateInput { gate: id, input });
            }
            Ok(Some(input as GateId))
        };
        let (in1, in2) = match kind {
            GateKind::Input => (None, None),
            GateKind::Not => (decode(in1)?, None),
            _ => (decode(in1)?, decode(in2)?),
        };
        gates.push(Gate {
            kind,
            table,
            in1,
            in2,
        });
    }

    Ok(State::from_parts(max_gates as usize, gates, outputs))
}

/// Writes `st` to a file at `path`.
pub fn save_state(path: &Path, st: &State) -> Result<(), StateError> {
    write_state(BufWriter::new(File::create(path)?), st)
}

/// Loads a state from the file at `path`.
pub fn load_state(path: &Path) -> Result<State, StateError> {
    read_state(BufReader::new(File::open(path)?))
}
