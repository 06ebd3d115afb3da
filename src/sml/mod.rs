//! SML source-level tooling built on the machine core.
//!
//! This module provides:
//! - a disassembler (raw words → readable mnemonics)
//! - the execution report / machine dump formatter

pub mod disasm;
pub mod report;

pub use disasm::{disassemble, disassemble_word};
pub use report::{dump, execution_report};
