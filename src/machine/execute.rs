//! The Simpletron machine and its fetch-decode-execute cycle.
//!
//! The machine never performs I/O and never blocks: a READ instruction
//! surfaces as [`StepOutcome::AwaitingInput`] and the driver delivers the
//! value through [`Machine::supply_input`] before stepping again; a WRITE
//! surfaces as [`StepOutcome::Output`] and the driver pulls the word
//! itself. Runtime faults are terminal for the run until a reset or a
//! fresh load.

use crate::machine::decode::Opcode;
use crate::machine::memory::{LoadError, Memory, MEMORY_SIZE, WORD_MAX, WORD_MIN};
use crate::machine::registers::Registers;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Driver-visible execution state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MachineState {
    /// Freshly constructed, reset, or loaded; nothing executed yet.
    Ready,
    /// At least one instruction executed, more can follow.
    Running,
    /// A READ was fetched; the driver must supply a value.
    AwaitingInput,
    /// HALT executed or the counter ran off the end of memory.
    Halted,
    /// A runtime fault occurred; terminal until reset or load.
    Faulted,
}

/// Runtime execution faults, the negative return codes of the original
/// numeric contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum Fault {
    #[error("division by zero")]
    DivisionByZero,

    #[error("invalid operation code {0}")]
    InvalidOpcode(i32),

    #[error("accumulator overflow ({0})")]
    AccumulatorOverflow(i32),
}

impl Fault {
    /// The numeric error code (-1, -2, -3).
    pub const fn code(self) -> i32 {
        match self {
            Fault::DivisionByZero => -1,
            Fault::InvalidOpcode(_) => -2,
            Fault::AccumulatorOverflow(_) => -3,
        }
    }
}

/// Result of a successful step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// A READ was fetched; the driver must write a value to `addr`
    /// (normally via [`Machine::supply_input`]) before the next step.
    AwaitingInput { addr: usize },
    /// A WRITE was fetched; the driver should read `addr` for output.
    Output { addr: usize },
    /// Any other instruction completed normally.
    Executed(Opcode),
    /// HALT executed, or the counter fell off the end of memory.
    Halted,
}

impl StepOutcome {
    /// The numeric code of the original step contract: the opcode that
    /// executed, with HALT (43) for termination.
    pub const fn code(self) -> i32 {
        match self {
            StepOutcome::AwaitingInput { .. } => Opcode::Read.code(),
            StepOutcome::Output { .. } => Opcode::Write.code(),
            StepOutcome::Executed(op) => op.code(),
            StepOutcome::Halted => Opcode::Halt.code(),
        }
    }
}

/// The Simpletron machine: 100 words of memory, five registers, and the
/// single-step execution function.
#[derive(Clone, Serialize, Deserialize)]
pub struct Machine {
    regs: Registers,
    mem: Memory,
    state: MachineState,
    cycles: u64,
}

impl Machine {
    /// Create a machine with zeroed memory and registers.
    pub fn new() -> Self {
        Self {
            regs: Registers::new(),
            mem: Memory::new(),
            state: MachineState::Ready,
            cycles: 0,
        }
    }

    /// Zero memory and all five registers, from any state. Cannot fail.
    pub fn reset(&mut self) {
        self.regs.reset();
        self.mem.clear();
        self.state = MachineState::Ready;
        self.cycles = 0;
    }

    /// Load an SML program, one source line per memory address.
    ///
    /// Resets first, even before the length check, so a previous program
    /// is cleared on every path. A failed load leaves the partial fill in
    /// memory for the driver to display; the load as a whole still counts
    /// as failed and the previous error taxonomy applies.
    pub fn load<S: AsRef<str>>(&mut self, lines: &[S]) -> Result<(), LoadError> {
        self.reset();
        self.mem.load_lines(lines)
    }

    /// Execute exactly one fetch-decode-execute cycle.
    ///
    /// Stepping a halted machine keeps returning [`StepOutcome::Halted`];
    /// stepping a faulted machine re-executes the faulting instruction
    /// and reproduces the same fault deterministically.
    pub fn step(&mut self) -> Result<StepOutcome, Fault> {
        if self.state == MachineState::Halted {
            return Ok(StepOutcome::Halted);
        }

        // Falling off the end of memory is equivalent to a halt.
        if self.regs.instruction_counter >= MEMORY_SIZE {
            self.state = MachineState::Halted;
            return Ok(StepOutcome::Halted);
        }

        // Fetch and decode into the visible registers.
        let word = self.mem.read(self.regs.instruction_counter);
        self.regs.latch(word);
        self.state = MachineState::Running;

        let opcode = match Opcode::from_code(self.regs.operation_code) {
            Some(op) => op,
            None => {
                self.state = MachineState::Faulted;
                return Err(Fault::InvalidOpcode(self.regs.operation_code));
            }
        };
        let operand = self.regs.operand as usize;

        let mut branched = false;
        let mut outcome = StepOutcome::Executed(opcode);

        match opcode {
            // I/O is the driver's job; the fetch/decode above is the
            // whole in-core effect.
            Opcode::Read => outcome = StepOutcome::AwaitingInput { addr: operand },
            Opcode::Write => outcome = StepOutcome::Output { addr: operand },

            Opcode::Load => self.regs.accumulator = self.mem.read(operand),
            Opcode::Store => self.mem.write(operand, self.regs.accumulator),

            Opcode::Add => self.regs.accumulator += self.mem.read(operand),
            Opcode::Subtract => self.regs.accumulator -= self.mem.read(operand),
            Opcode::Divide => {
                let divisor = self.mem.read(operand);
                if divisor == 0 {
                    self.state = MachineState::Faulted;
                    return Err(Fault::DivisionByZero);
                }
                self.regs.accumulator /= divisor;
            }
            Opcode::Multiply => self.regs.accumulator *= self.mem.read(operand),

            Opcode::Branch => {
                self.regs.branch(operand);
                branched = true;
            }
            Opcode::BranchNeg => {
                if self.regs.accumulator < 0 {
                    self.regs.branch(operand);
                    branched = true;
                }
            }
            Opcode::BranchZero => {
                if self.regs.accumulator == 0 {
                    self.regs.branch(operand);
                    branched = true;
                }
            }

            Opcode::Halt => {
                self.state = MachineState::Halted;
                self.cycles += 1;
                return Ok(StepOutcome::Halted);
            }
        }

        if !branched {
            self.regs.advance();
        }
        self.cycles += 1;

        // Overflow is checked after the counter update; the out-of-range
        // accumulator is kept as-is for inspection.
        if self.regs.accumulator > WORD_MAX || self.regs.accumulator < WORD_MIN {
            self.state = MachineState::Faulted;
            return Err(Fault::AccumulatorOverflow(self.regs.accumulator));
        }

        if matches!(outcome, StepOutcome::AwaitingInput { .. }) {
            self.state = MachineState::AwaitingInput;
        }

        Ok(outcome)
    }

    /// [`Machine::step`] flattened to the original numeric contract:
    /// the executed opcode, HALT (43), or a negative fault code.
    pub fn step_code(&mut self) -> i32 {
        match self.step() {
            Ok(outcome) => outcome.code(),
            Err(fault) => fault.code(),
        }
    }

    /// Deliver the value requested by the last READ.
    ///
    /// Writes the addressed word and moves the machine back to Running.
    /// The value is accepted as-is; an out-of-range one surfaces later as
    /// an overflow fault if used arithmetically.
    pub fn supply_input(&mut self, value: i32) {
        let addr = self.regs.operand as usize;
        self.mem.write(addr, value);
        if self.state == MachineState::AwaitingInput {
            self.state = MachineState::Running;
        }
    }

    // Read-only register views.

    pub fn accumulator(&self) -> i32 {
        self.regs.accumulator
    }

    pub fn instruction_counter(&self) -> usize {
        self.regs.instruction_counter
    }

    pub fn instruction_register(&self) -> i32 {
        self.regs.instruction_register
    }

    pub fn operation_code(&self) -> i32 {
        self.regs.operation_code
    }

    pub fn operand(&self) -> i32 {
        self.regs.operand
    }

    /// The whole 100-word memory, for display.
    pub fn memory(&self) -> &[i32] {
        self.mem.words()
    }

    /// Read a single memory word.
    ///
    /// # Panics
    /// Panics if the address is out of range.
    pub fn memory_at(&self, addr: usize) -> i32 {
        self.mem.read(addr)
    }

    /// Write a single memory word. The only driver-facing mutator;
    /// used to complete a READ outside of [`Machine::supply_input`].
    ///
    /// # Panics
    /// Panics if the address is out of range.
    pub fn write_memory(&mut self, addr: usize, value: i32) {
        self.mem.write(addr, value);
    }

    /// The inline source comment loaded for an address, or `""`.
    pub fn comment_at(&self, addr: usize) -> &str {
        self.mem.comment_at(addr)
    }

    pub fn state(&self) -> MachineState {
        self.state
    }

    /// Instructions executed since the last reset or load.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn is_halted(&self) -> bool {
        self.state == MachineState::Halted
    }

    /// True while another step can still make progress.
    pub fn is_running(&self) -> bool {
        !matches!(self.state, MachineState::Halted | MachineState::Faulted)
    }
}

impl Default for Machine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Machine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Machine")
            .field("state", &self.state)
            .field("cycles", &self.cycles)
            .field("regs", &self.regs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::decode::{encode, Instruction};

    fn load(machine: &mut Machine, lines: &[&str]) {
        machine.load(lines).unwrap();
    }

    #[test]
    fn test_halt_program() {
        let mut machine = Machine::new();
        load(&mut machine, &["4300"]);

        assert_eq!(machine.step(), Ok(StepOutcome::Halted));
        assert!(machine.is_halted());
        assert_eq!(machine.cycles(), 1);
        // The counter is not advanced by HALT.
        assert_eq!(machine.instruction_counter(), 0);
        // Stepping a halted machine stays halted.
        assert_eq!(machine.step(), Ok(StepOutcome::Halted));
        assert_eq!(machine.cycles(), 1);
    }

    #[test]
    fn test_falling_off_memory_halts() {
        let mut machine = Machine::new();
        load(&mut machine, &["4099"]); // BRANCH 99
        assert_eq!(machine.step(), Ok(StepOutcome::Executed(Opcode::Branch)));
        machine.write_memory(99, 1007); // READ at the last address
        assert_eq!(machine.step(), Ok(StepOutcome::AwaitingInput { addr: 7 }));
        assert_eq!(machine.instruction_counter(), 100);
        machine.supply_input(0);
        // Counter is now past the end: halt without touching registers.
        assert_eq!(machine.step(), Ok(StepOutcome::Halted));
        assert_eq!(machine.instruction_register(), 1007);
    }

    #[test]
    fn test_fetch_decode_round_trip() {
        for op in Opcode::ALL {
            for operand in [0usize, 1, 50, 99] {
                let word = encode(&Instruction { opcode: op, operand });
                let mut machine = Machine::new();
                machine.write_memory(0, word);
                // A fault (e.g. divide by zero) is fine here; the fetch
                // latches the registers either way.
                let _ = machine.step();
                assert_eq!(machine.instruction_register(), word);
                assert_eq!(machine.operation_code(), op.code());
                assert_eq!(machine.operand(), operand as i32);
            }
        }
    }

    #[test]
    fn test_load_store_add() {
        let mut machine = Machine::new();
        load(&mut machine, &["2005", "3006", "2107", "4300", "", "0012", "0030"]);

        assert_eq!(machine.step(), Ok(StepOutcome::Executed(Opcode::Load)));
        assert_eq!(machine.accumulator(), 12);
        assert_eq!(machine.step(), Ok(StepOutcome::Executed(Opcode::Add)));
        assert_eq!(machine.accumulator(), 42);
        assert_eq!(machine.step(), Ok(StepOutcome::Executed(Opcode::Store)));
        assert_eq!(machine.memory_at(7), 42);
        assert_eq!(machine.step(), Ok(StepOutcome::Halted));
    }

    #[test]
    fn test_subtract_multiply_divide() {
        let mut machine = Machine::new();
        load(&mut machine, &["2006", "3307", "3108", "3208", "4300", "", "5", "4", "3"]);

        machine.step().unwrap(); // LOAD 6  -> 5
        machine.step().unwrap(); // MUL 7   -> 20
        assert_eq!(machine.accumulator(), 20);
        machine.step().unwrap(); // SUB 8   -> 17
        assert_eq!(machine.accumulator(), 17);
        machine.step().unwrap(); // DIV 8   -> 5 (truncating)
        assert_eq!(machine.accumulator(), 5);
    }

    #[test]
    fn test_divide_by_zero_leaves_state_untouched() {
        let mut machine = Machine::new();
        load(&mut machine, &["3103"]); // DIVIDE by memory[3] == 0

        assert_eq!(machine.step(), Err(Fault::DivisionByZero));
        assert_eq!(machine.accumulator(), 0);
        assert_eq!(machine.instruction_counter(), 0);
        assert_eq!(machine.state(), MachineState::Faulted);
        assert_eq!(machine.cycles(), 0);
        // Re-stepping reproduces the same fault.
        assert_eq!(machine.step(), Err(Fault::DivisionByZero));
    }

    #[test]
    fn test_divide_by_zero_numeric_scenario() {
        let mut machine = Machine::new();
        load(&mut machine, &["3103"]);
        assert_eq!(machine.step_code(), -1);
    }

    #[test]
    fn test_invalid_opcode() {
        let mut machine = Machine::new();
        load(&mut machine, &["9905"]);

        assert_eq!(machine.step(), Err(Fault::InvalidOpcode(99)));
        assert_eq!(machine.instruction_counter(), 0);
        assert_eq!(machine.state(), MachineState::Faulted);
        // Registers still reflect the fetch.
        assert_eq!(machine.instruction_register(), 9905);
        assert_eq!(machine.operand(), 5);

        let mut machine = Machine::new();
        load(&mut machine, &["9905"]);
        assert_eq!(machine.step_code(), -2);
    }

    #[test]
    fn test_accumulator_overflow_after_increment() {
        let mut machine = Machine::new();
        load(&mut machine, &["2002", "3003", "9999", "0001"]);

        machine.step().unwrap(); // accumulator = 9999
        assert_eq!(machine.step(), Err(Fault::AccumulatorOverflow(10000)));
        // Unclamped value retained, counter already advanced.
        assert_eq!(machine.accumulator(), 10000);
        assert_eq!(machine.instruction_counter(), 2);

        let mut machine = Machine::new();
        load(&mut machine, &["2002", "3003", "9999", "0001"]);
        machine.step_code();
        assert_eq!(machine.step_code(), -3);
    }

    #[test]
    fn test_branch_does_not_auto_increment() {
        let mut machine = Machine::new();
        load(&mut machine, &["4005"]);
        assert_eq!(machine.step(), Ok(StepOutcome::Executed(Opcode::Branch)));
        assert_eq!(machine.instruction_counter(), 5);
    }

    #[test]
    fn test_branchneg_taken_and_not_taken() {
        let mut machine = Machine::new();
        load(&mut machine, &["2003", "4105", "", "-1"]);
        machine.step().unwrap(); // accumulator = -1
        machine.step().unwrap(); // BRANCHNEG taken
        assert_eq!(machine.instruction_counter(), 5);

        let mut machine = Machine::new();
        load(&mut machine, &["4105"]);
        machine.step().unwrap(); // accumulator == 0, not negative
        assert_eq!(machine.instruction_counter(), 1);
    }

    #[test]
    fn test_branchzero_taken_and_not_taken() {
        let mut machine = Machine::new();
        load(&mut machine, &["4205"]);
        machine.step().unwrap(); // accumulator == 0, taken
        assert_eq!(machine.instruction_counter(), 5);

        let mut machine = Machine::new();
        load(&mut machine, &["2003", "4205", "", "7"]);
        machine.step().unwrap();
        machine.step().unwrap(); // not taken
        assert_eq!(machine.instruction_counter(), 2);
    }

    #[test]
    fn test_read_write_round_trip_program() {
        // READ 7, READ 8, LOAD 7, ADD 8, STORE 9, WRITE 9, HALT
        let program = ["1007", "1008", "2007", "3008", "2109", "1109", "4300"];
        let mut machine = Machine::new();
        machine.load(&program).unwrap();

        let mut inputs = [5, 3].into_iter();
        let mut outputs = Vec::new();
        let mut executed = 0u64;

        loop {
            match machine.step() {
                Ok(StepOutcome::AwaitingInput { .. }) => {
                    machine.supply_input(inputs.next().unwrap());
                }
                Ok(StepOutcome::Output { addr }) => outputs.push(machine.memory_at(addr)),
                Ok(StepOutcome::Executed(_)) => {}
                Ok(StepOutcome::Halted) => break,
                Err(fault) => panic!("unexpected fault: {fault}"),
            }
            executed += 1;
        }

        assert_eq!(machine.memory_at(9), 8);
        assert_eq!(outputs, vec![8]);
        assert_eq!(machine.cycles(), 7);
        assert_eq!(executed, 6); // the 7th step returned Halted
        assert!(machine.is_halted());
    }

    #[test]
    fn test_read_state_machine() {
        let mut machine = Machine::new();
        load(&mut machine, &["1007", "4300"]);
        assert_eq!(machine.state(), MachineState::Ready);

        assert_eq!(machine.step(), Ok(StepOutcome::AwaitingInput { addr: 7 }));
        assert_eq!(machine.state(), MachineState::AwaitingInput);

        machine.supply_input(42);
        assert_eq!(machine.state(), MachineState::Running);
        assert_eq!(machine.memory_at(7), 42);

        assert_eq!(machine.step(), Ok(StepOutcome::Halted));
    }

    #[test]
    fn test_write_pulls_without_mutation() {
        let mut machine = Machine::new();
        load(&mut machine, &["1105", "4300", "", "", "", "77"]);

        assert_eq!(machine.step(), Ok(StepOutcome::Output { addr: 5 }));
        assert_eq!(machine.memory_at(5), 77);
        assert_eq!(machine.accumulator(), 0);
        assert_eq!(machine.state(), MachineState::Running);
    }

    #[test]
    fn test_out_of_range_input_is_inert_until_used() {
        let mut machine = Machine::new();
        load(&mut machine, &["1007", "4300"]);

        machine.step().unwrap();
        machine.supply_input(123_456); // driver failed to validate
        // Inert if never used arithmetically.
        assert_eq!(machine.step(), Ok(StepOutcome::Halted));
        assert_eq!(machine.memory_at(7), 123_456);

        // Used arithmetically, it overflows naturally.
        let mut machine = Machine::new();
        load(&mut machine, &["1007", "3007", "4300"]);
        machine.step().unwrap();
        machine.supply_input(123_456);
        assert_eq!(machine.step(), Err(Fault::AccumulatorOverflow(123_456)));
    }

    #[test]
    fn test_reset_restores_everything() {
        let mut machine = Machine::new();
        load(&mut machine, &["2003", "3003", "4300", "50 // data"]);
        machine.step().unwrap();
        machine.step().unwrap();

        machine.reset();
        assert_eq!(machine.accumulator(), 0);
        assert_eq!(machine.instruction_counter(), 0);
        assert_eq!(machine.instruction_register(), 0);
        assert_eq!(machine.operation_code(), 0);
        assert_eq!(machine.operand(), 0);
        assert_eq!(machine.cycles(), 0);
        assert_eq!(machine.state(), MachineState::Ready);
        assert!(machine.memory().iter().all(|w| *w == 0));
        assert_eq!(machine.comment_at(3), "");
    }

    #[test]
    fn test_load_resets_even_when_too_large() {
        let mut machine = Machine::new();
        load(&mut machine, &["1234"]);
        assert_eq!(machine.memory_at(0), 1234);

        let oversized: Vec<String> = (0..101).map(|_| "1".to_string()).collect();
        assert!(machine.load(&oversized).is_err());
        // The previous program is gone even on the size-error path.
        assert!(machine.memory().iter().all(|w| *w == 0));
        assert_eq!(machine.state(), MachineState::Ready);
    }
}
