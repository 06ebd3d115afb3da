//! # Simpletron Emulator
//!
//! An emulator of the Simpletron, the classic teaching computer, and its
//! Simpletron Machine Language (SML): 100 signed decimal words of memory,
//! a single accumulator, and a 12-operation instruction set.
//!
//! The core is a synchronous state machine: load a program, then call
//! [`Machine::step`] in a loop. READ and WRITE never block inside the
//! core; they surface as step outcomes for the driver to handle between
//! steps.

pub mod machine;
pub mod sml;

#[cfg(feature = "tui")]
pub mod tui;

// Re-export commonly used types
pub use machine::{
    decode, encode, DecodeError, Fault, Instruction, LoadError, Machine, MachineState, Memory,
    Opcode, Registers, StepOutcome, MEMORY_SIZE, WORD_MAX, WORD_MIN,
};
pub use sml::{disassemble, disassemble_word, dump, execution_report};

#[cfg(feature = "tui")]
pub use tui::run_debugger;
