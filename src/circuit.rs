//! Gate network state: an append-only DAG of boolean gates with cached
//! truth tables.
//!
//! Gates reference their inputs by index, so a [`State`] is a flat value and
//! trial copies made during search are plain clones. The eight input gates
//! always occupy indices 0..=7; every later gate only references earlier
//! indices, which makes the gate list a topological order by construction.

use crate::targets;
use crate::ttable::Ttable;

/// Hard capacity of a gate network, fixed by the persistence format.
pub const MAX_GATES: usize = 500;

/// Number of input variables (and input gates) of every network.
pub const NUM_INPUTS: usize = 8;

/// Number of S-box output bits a network can realize.
pub const NUM_OUTPUTS: usize = 8;

/// Index of a gate within a [`State`]'s gate list.
pub type GateId = usize;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GateKind {
    Input,
    Not,
    And,
    Or,
    Xor,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Gate {
    pub kind: GateKind,
    /// Truth table of the function computed at this gate. Derived from the
    /// inputs' tables on append and never mutated afterwards.
    pub table: Ttable,
    pub in1: Option<GateId>,
    pub in2: Option<GateId>,
}

/// A partial gate network together with its gate budget and output slots.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct State {
    max_gates: usize,
    gates: Vec<Gate>,
    outputs: [Option<GateId>; NUM_OUTPUTS],
}

impl State {
    /// Creates a network holding only the eight input gates, with all output
    /// slots unset. `max_gates` bounds the total gate count including the
    /// inputs.
    pub fn new(max_gates: usize) -> State {
        assert!((NUM_INPUTS..=MAX_GATES).contains(&max_gates));
        let mut gates = Vec::with_capacity(max_gates);
        for bit in 0..NUM_INPUTS as u8 {
            gates.push(Gate {
                kind: GateKind::Input,
                table: targets::input_table(bit),
                in1: None,
                in2: None,
            });
        }
        State {
            max_gates,
            gates,
            outputs: [None; NUM_OUTPUTS],
        }
    }

    pub(crate) fn from_parts(
        max_gates: usize,
        gates: Vec<Gate>,
        outputs: [Option<GateId>; NUM_OUTPUTS],
    ) -> State {
        State {
            max_gates,
            gates,
            outputs,
        }
    }

    pub fn num_gates(&self) -> usize {
        self.gates.len()
    }

    pub fn max_gates(&self) -> usize {
        self.max_gates
    }

    /// Raises or lowers the gate budget. Appends fail once the gate count
    /// reaches the budget; an already larger network keeps its gates.
    pub fn set_max_gates(&mut self, max_gates: usize) {
        assert!(max_gates <= MAX_GATES);
        self.max_gates = max_gates;
    }

    pub fn gate(&self, id: GateId) -> &Gate {
        &self.gates[id]
    }

    pub fn gates(&self) -> &[Gate] {
        &self.gates
    }

    /// Truth table of the function computed at gate `id`.
    pub fn table(&self, id: GateId) -> Ttable {
        self.gates[id].table
    }

    pub fn output(&self, slot: usize) -> Option<GateId> {
        self.outputs[slot]
    }

    pub fn set_output(&mut self, slot: usize, id: GateId) {
        assert!(slot < NUM_OUTPUTS);
        assert!(id < self.gates.len());
        self.outputs[slot] = Some(id);
    }

    /// Appends a gate, returning its index, or `None` once the budget is
    /// reached. Input gates exist only from construction.
    fn append(
        &mut self,
        kind: GateKind,
        table: Ttable,
        in1: GateId,
        in2: Option<GateId>,
    ) -> Option<GateId> {
        assert!(kind != GateKind::Input);
        assert!(in1 < self.gates.len());
        if let Some(in2) = in2 {
            assert!(in2 < self.gates.len());
        }
        if self.gates.len() >= self.max_gates {
            return None;
        }
        self.gates.push(Gate {
            kind,
            table,
            in1: Some(in1),
            in2,
        });
        Some(self.gates.len() - 1)
    }

    /// Rewinds to `mark` when a multi-gate chain failed partway, so a failed
    /// chain leaves the gate count untouched.
    fn commit(&mut self, mark: usize, out: Option<GateId>) -> Option<GateId> {
        if out.is_none() {
            self.gates.truncate(mark);
        }
        out
    }

    pub fn not(&mut self, a: GateId) -> Option<GateId> {
        let table = !self.table(a);
        self.append(GateKind::Not, table, a, None)
    }

    pub fn and(&mut self, a: GateId, b: GateId) -> Option<GateId> {
        let table = self.table(a) & self.table(b);
        self.append(GateKind::And, table, a, Some(b))
    }

    pub fn or(&mut self, a: GateId, b: GateId) -> Option<GateId> {
        let table = self.table(a) | self.table(b);
        self.append(GateKind::Or, table, a, Some(b))
    }

    pub fn xor(&mut self, a: GateId, b: GateId) -> Option<GateId> {
        let table = self.table(a) ^ self.table(b);
        self.append(GateKind::Xor, table, a, Some(b))
    }

    /// `!(a & b)`, as an AND feeding a NOT.
    pub fn nand(&mut self, a: GateId, b: GateId) -> Option<GateId> {
        let mark = self.gates.len();
        let out = self.and(a, b).and_then(|g| self.not(g));
        self.commit(mark, out)
    }

    /// `!(a | b)`, as an OR feeding a NOT.
    pub fn nor(&mut self, a: GateId, b: GateId) -> Option<GateId> {
        let mark = self.gates.len();
        let out = self.or(a, b).and_then(|g| self.not(g));
        self.commit(mark, out)
    }

    /// `!(a ^ b)`, as an XOR feeding a NOT.
    pub fn xnor(&mut self, a: GateId, b: GateId) -> Option<GateId> {
        let mark = self.gates.len();
        let out = self.xor(a, b).and_then(|g| self.not(g));
        self.commit(mark, out)
    }

    /// `!a & b`.
    pub fn and_not(&mut self, a: GateId, b: GateId) -> Option<GateId> {
        let mark = self.gates.len();
        let out = self.not(a).and_then(|na| self.and(na, b));
        self.commit(mark, out)
    }

    /// `!a | b`.
    pub fn or_not(&mut self, a: GateId, b: GateId) -> Option<GateId> {
        let mark = self.gates.len();
        let out = self.not(a).and_then(|na| self.or(na, b));
        self.commit(mark, out)
    }

    /// `a & b & c`.
    pub fn and_3(&mut self, a: GateId, b: GateId, c: GateId) -> Option<GateId> {
        let mark = self.gates.len();
        let out = self.and(a, b).and_then(|g| self.and(g, c));
        self.commit(mark, out)
    }

    /// `a | b | c`.
    pub fn or_3(&mut self, a: GateId, b: GateId, c: GateId) -> Option<GateId> {
        let mark = self.gates.len();
        let out = self.or(a, b).and_then(|g| self.or(g, c));
        self.commit(mark, out)
    }

    /// `a ^ b ^ c`.
    pub fn xor_3(&mut self, a: GateId, b: GateId, c: GateId) -> Option<GateId> {
        let mark = self.gates.len();
        let out = self.xor(a, b).and_then(|g| self.xor(g, c));
        self.commit(mark, out)
    }

    /// `(a & b) | c`.
    pub fn and_or(&mut self, a: GateId, b: GateId, c: GateId) -> Option<GateId> {
        let mark = self.gates.len();
        let out = self.and(a, b).and_then(|g| self.or(g, c));
        self.commit(mark, out)
    }

    /// `(a & b) ^ c`.
    pub fn and_xor(&mut self, a: GateId, b: GateId, c: GateId) -> Option<GateId> {
        let mark = self.gates.len();
        let out = self.and(a, b).and_then(|g| self.xor(g, c));
        self.commit(mark, out)
    }

    /// `(a | b) & c`.
    pub fn or_and(&mut self, a: GateId, b: GateId, c: GateId) -> Option<GateId> {
        let mark = self.gates.len();
        let out = self.or(a, b).and_then(|g| self.and(g, c));
        self.commit(mark, out)
    }

    /// `(a | b) ^ c`.
    pub fn or_xor(&mut self, a: GateId, b: GateId, c: GateId) -> Option<GateId> {
        let mark = self.gates.len();
        let out = self.or(a, b).and_then(|g| self.xor(g, c));
        self.commit(mark, out)
    }

    /// `(a ^ b) & c`.
    pub fn xor_and(&mut self, a: GateId, b: GateId, c: GateId) -> Option<GateId> {
        let mark = self.gates.len();
        let out = self.xor(a, b).and_then(|g| self.and(g, c));
        self.commit(mark, out)
    }

    /// `(a ^ b) | c`.
    pub fn xor_or(&mut self, a: GateId, b: GateId, c: GateId) -> Option<GateId> {
        let mark = self.gates.len();
        let out = self.xor(a, b).and_then(|g| self.or(g, c));
        self.commit(mark, out)
    }
}
