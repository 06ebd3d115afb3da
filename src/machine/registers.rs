//! Simpletron register file.
//!
//! The Simpletron has 5 registers:
//! - accumulator: the single arithmetic register
//! - instructionCounter: address of the next instruction to fetch
//! - instructionRegister: the last fetched raw word
//! - operationCode: high two decimal digits of the instruction register
//! - operand: low two decimal digits of the instruction register

use serde::{Deserialize, Serialize};

/// The Simpletron register file.
///
/// `operation_code` and `operand` are derived from `instruction_register`
/// by truncating division and remainder (toward zero, sign of the word),
/// and are kept in sync by every fetch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registers {
    /// The arithmetic register. Nominal range [-9999, 9999]; an
    /// out-of-range value survives an overflow fault for inspection.
    pub accumulator: i32,

    /// Address of the next instruction. 0..=100; 100 means execution
    /// fell off the end of memory.
    pub instruction_counter: usize,

    /// The last raw word fetched from memory.
    pub instruction_register: i32,

    /// instruction_register / 100, truncating toward zero.
    pub operation_code: i32,

    /// instruction_register % 100, same sign as the word.
    pub operand: i32,
}

impl Registers {
    /// Create a register file with all values zeroed.
    pub fn new() -> Self {
        Self {
            accumulator: 0,
            instruction_counter: 0,
            instruction_register: 0,
            operation_code: 0,
            operand: 0,
        }
    }

    /// Reset all registers to zero.
    pub fn reset(&mut self) {
        self.accumulator = 0;
        self.instruction_counter = 0;
        self.instruction_register = 0;
        self.operation_code = 0;
        self.operand = 0;
    }

    /// Latch a fetched word and derive opcode/operand from it.
    pub fn latch(&mut self, word: i32) {
        self.instruction_register = word;
        self.operation_code = word / 100;
        self.operand = word % 100;
    }

    /// Advance the instruction counter by 1. Returns the old value.
    pub fn advance(&mut self) -> usize {
        let old = self.instruction_counter;
        self.instruction_counter += 1;
        old
    }

    /// Set the instruction counter to an absolute address.
    ///
    /// # Panics
    /// Panics if the address is not a valid memory index.
    pub fn branch(&mut self, addr: usize) {
        assert!(addr < super::memory::MEMORY_SIZE, "branch target {} out of range", addr);
        self.instruction_counter = addr;
    }
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_all_zero() {
        let regs = Registers::new();
        assert_eq!(regs.accumulator, 0);
        assert_eq!(regs.instruction_counter, 0);
        assert_eq!(regs.instruction_register, 0);
        assert_eq!(regs.operation_code, 0);
        assert_eq!(regs.operand, 0);
    }

    #[test]
    fn test_latch_derives_opcode_and_operand() {
        let mut regs = Registers::new();
        regs.latch(2007);
        assert_eq!(regs.instruction_register, 2007);
        assert_eq!(regs.operation_code, 20);
        assert_eq!(regs.operand, 7);
    }

    #[test]
    fn test_latch_negative_word_truncates_toward_zero() {
        let mut regs = Registers::new();
        regs.latch(-2007);
        assert_eq!(regs.operation_code, -20);
        assert_eq!(regs.operand, -7);

        regs.latch(-99);
        assert_eq!(regs.operation_code, 0);
        assert_eq!(regs.operand, -99);
    }

    #[test]
    fn test_advance_returns_old_value() {
        let mut regs = Registers::new();
        regs.instruction_counter = 10;
        let old = regs.advance();
        assert_eq!(old, 10);
        assert_eq!(regs.instruction_counter, 11);
    }

    #[test]
    fn test_reset() {
        let mut regs = Registers::new();
        regs.accumulator = 42;
        regs.latch(4300);
        regs.branch(99);
        regs.reset();
        assert_eq!(regs, Registers::new());
    }
}
