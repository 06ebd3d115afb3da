//! The Simpletron machine core.
//!
//! This module implements the complete Simpletron model:
//! - 100 signed decimal words of memory, addresses 0-99
//! - 5 registers: accumulator, instruction counter, instruction register,
//!   operation code, operand
//! - the 12-operation SML instruction set with a single-step
//!   fetch-decode-execute function

pub mod decode;
pub mod execute;
pub mod memory;
pub mod registers;

pub use decode::{decode, encode, DecodeError, Instruction, Opcode};
pub use execute::{Fault, Machine, MachineState, StepOutcome};
pub use memory::{LoadError, Memory, COMMENT_MARKER, MEMORY_SIZE, WORD_MAX, WORD_MIN};
pub use registers::Registers;
