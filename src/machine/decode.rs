//! Instruction decoder for SML (Simpletron Machine Language).
//!
//! An SML word encodes one instruction as `opcode * 100 + operand`:
//! the high two decimal digits select the operation, the low two are a
//! memory address. Decoding uses truncating division, so the split keeps
//! the sign of the word.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The twelve SML operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Opcode {
    /// Read a word from the driver into memory\[operand\].
    Read,
    /// Write memory\[operand\] to the driver.
    Write,
    /// accumulator := memory\[operand\]
    Load,
    /// memory\[operand\] := accumulator
    Store,
    /// accumulator := accumulator + memory\[operand\]
    Add,
    /// accumulator := accumulator - memory\[operand\]
    Subtract,
    /// accumulator := accumulator / memory\[operand\] (truncating)
    Divide,
    /// accumulator := accumulator * memory\[operand\]
    Multiply,
    /// instructionCounter := operand
    Branch,
    /// instructionCounter := operand if accumulator < 0
    BranchNeg,
    /// instructionCounter := operand if accumulator == 0
    BranchZero,
    /// Stop execution.
    Halt,
}

impl Opcode {
    /// All opcodes, in numeric order.
    pub const ALL: [Opcode; 12] = [
        Opcode::Read,
        Opcode::Write,
        Opcode::Load,
        Opcode::Store,
        Opcode::Add,
        Opcode::Subtract,
        Opcode::Divide,
        Opcode::Multiply,
        Opcode::Branch,
        Opcode::BranchNeg,
        Opcode::BranchZero,
        Opcode::Halt,
    ];

    /// The two-digit numeric code of this operation.
    pub const fn code(self) -> i32 {
        match self {
            Opcode::Read => 10,
            Opcode::Write => 11,
            Opcode::Load => 20,
            Opcode::Store => 21,
            Opcode::Add => 30,
            Opcode::Subtract => 31,
            Opcode::Divide => 32,
            Opcode::Multiply => 33,
            Opcode::Branch => 40,
            Opcode::BranchNeg => 41,
            Opcode::BranchZero => 42,
            Opcode::Halt => 43,
        }
    }

    /// Look up an opcode by its numeric code.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            10 => Some(Opcode::Read),
            11 => Some(Opcode::Write),
            20 => Some(Opcode::Load),
            21 => Some(Opcode::Store),
            30 => Some(Opcode::Add),
            31 => Some(Opcode::Subtract),
            32 => Some(Opcode::Divide),
            33 => Some(Opcode::Multiply),
            40 => Some(Opcode::Branch),
            41 => Some(Opcode::BranchNeg),
            42 => Some(Opcode::BranchZero),
            43 => Some(Opcode::Halt),
            _ => None,
        }
    }

    /// Assembly-style mnemonic.
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Read => "READ",
            Opcode::Write => "WRITE",
            Opcode::Load => "LOAD",
            Opcode::Store => "STORE",
            Opcode::Add => "ADD",
            Opcode::Subtract => "SUBTRACT",
            Opcode::Divide => "DIVIDE",
            Opcode::Multiply => "MULTIPLY",
            Opcode::Branch => "BRANCH",
            Opcode::BranchNeg => "BRANCHNEG",
            Opcode::BranchZero => "BRANCHZERO",
            Opcode::Halt => "HALT",
        }
    }
}

/// A decoded SML instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    pub opcode: Opcode,
    /// Memory address argument, 0-99.
    pub operand: usize,
}

/// Split a raw word into its (operationCode, operand) halves.
///
/// Truncating division and remainder, so a negative word yields a
/// non-positive operation code with a matching-sign operand.
#[inline]
pub const fn split(word: i32) -> (i32, i32) {
    (word / 100, word % 100)
}

/// Decode a raw memory word into an instruction.
pub fn decode(word: i32) -> Result<Instruction, DecodeError> {
    let (code, operand) = split(word);
    let opcode = Opcode::from_code(code).ok_or(DecodeError::InvalidOpcode { code, word })?;
    Ok(Instruction {
        opcode,
        operand: operand as usize,
    })
}

/// Encode an instruction back into its raw word.
pub const fn encode(instr: &Instruction) -> i32 {
    instr.opcode.code() * 100 + instr.operand as i32
}

/// Errors that can occur during instruction decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("invalid operation code {code} (word {word:+05})")]
    InvalidOpcode { code: i32, word: i32 },
}
