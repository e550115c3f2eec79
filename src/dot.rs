//! Graphviz rendering of a gate network.

use std::io::{self, Write};

use crate::circuit::{GateKind, State, NUM_OUTPUTS};

/// Writes `st` as a Graphviz digraph: one node per gate, edges from inputs
/// to the gates they feed, and one `outN` sink per realized output slot.
pub fn write_digraph<W: Write>(mut w: W, st: &State) -> io::Result<()> {
    writeln!(w, "digraph sbox {{")?;
    for (id, gate) in st.gates().iter().enumerate() {
        let label = match gate.kind {
            GateKind::Input => format!("IN {id}"),
            GateKind::Not => "NOT".to_string(),
            GateKind::And => "AND".to_string(),
            GateKind::Or => "OR".to_string(),
            GateKind::Xor => "XOR".to_string(),
        };
        writeln!(w, "  gt{id} [label=\"{label}\"];")?;
    }
    for (id, gate) in st.gates().iter().enumerate() {
        if let Some(in1) = gate.in1 {
            writeln!(w, "  gt{in1} -> gt{id};")?;
        }
        if let Some(in2) = gate.in2 {
            writeln!(w, "  gt{in2} -> gt{id};")?;
        }
    }
    for slot in 0..NUM_OUTPUTS {
        if let Some(id) = st.output(slot) {
            writeln!(w, "  gt{id} -> out{slot};")?;
        }
    }
    writeln!(w, "}}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::MAX_GATES;

    #[test]
    fn test_digraph_lists_gates_edges_and_outputs() {
        let mut st = State::new(MAX_GATES);
        let x = st.xor(0, 1).unwrap();
        let n = st.not(x).unwrap();
        st.set_output(3, n);

        let mut buf = Vec::new();
        write_digraph(&mut buf, &st).unwrap();
        let dot = String::from_utf8(buf).unwrap();

        assert!(dot.starts_with("digraph sbox {"));
        assert!(dot.ends_with("}\n"));
        assert!(dot.contains("  gt0 [label=\"IN 0\"];"));
        assert!(dot.contains("  gt8 [label=\"XOR\"];"));
        assert!(dot.contains("  gt9 [label=\"NOT\"];"));
        assert!(dot.contains("  gt0 -> gt8;"));
        assert!(dot.contains("  gt1 -> gt8;"));
        assert!(dot.contains("  gt8 -> gt9;"));
        assert!(dot.contains("  gt9 -> out3;"));
    }

    #[test]
    fn test_digraph_of_seed_state_has_no_edges() {
        let st = State::new(MAX_GATES);
        let mut buf = Vec::new();
        write_digraph(&mut buf, &st).unwrap();
        let dot = String::from_utf8(buf).unwrap();
        assert!(!dot.contains("->"));
    }
}
