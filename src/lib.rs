//! # sboxsynth - low gate count circuits for 8-bit S-boxes
//!
//! Searches for small combinational networks of NOT/AND/OR/XOR gates that
//! jointly realize all eight output bits of an 8-bit S-box, for use in
//! bitslice implementations. The search is an improved version of the
//! algorithm described in Kwan, Matthew: "Reducing the Gate Count of
//! Bitslice DES." IACR Cryptology ePrint Archive 2000 (2000): 51.
//!
//! ## Modules
//!
//! - [`ttable`] - 256-bit truth tables and their bitwise algebra
//! - [`circuit`] - append-only gate network state and typed gate constructors
//! - [`search`] - the recursive reuse/combine/Shannon-split synthesizer
//! - [`targets`] - truth tables for S-box outputs and input variables
//! - [`persist`] - fixed-size binary state files for resumable runs
//! - [`dot`] - Graphviz rendering of a synthesized network

pub mod circuit;
pub mod dot;
pub mod persist;
pub mod search;
pub mod targets;
pub mod ttable;

pub use circuit::{Gate, GateId, GateKind, State, MAX_GATES, NUM_INPUTS, NUM_OUTPUTS};
pub use persist::{load_state, save_state, StateError};
pub use search::{synthesize, UsedBits, MAX_SPLITS};
pub use targets::{input_table, output_table, output_tables, SBOX_ENC};
pub use ttable::Ttable;
