//! Execution report and machine dump formatting.
//!
//! Fixed-width decimal formatting in the classic Simpletron style:
//! words as `%+05d` (`+0000`), addresses as two digits.

use crate::machine::Machine;
use std::fmt::Write as _;

/// Format the registers and the full 10x10 memory grid.
pub fn dump(machine: &Machine) -> String {
    let mut out = String::new();

    out.push_str("REGISTERS:\n");
    let _ = writeln!(out, "accumulator:          {:+05}", machine.accumulator());
    let _ = writeln!(out, "instructionCounter:      {:02}", machine.instruction_counter());
    let _ = writeln!(out, "instructionRegister:  {:+05}", machine.instruction_register());
    let _ = writeln!(out, "operationCode:           {:02}", machine.operation_code());
    let _ = writeln!(out, "operand:                 {:02}", machine.operand());
    out.push('\n');

    out.push_str("MEMORY:\n");
    out.push_str("   ");
    for col in 0..10 {
        let _ = write!(out, "{:>6}", col);
    }
    out.push('\n');

    for (addr, word) in machine.memory().iter().enumerate() {
        if addr % 10 == 0 {
            let _ = write!(out, "{:2} ", addr);
        }
        let _ = write!(out, " {:+05}", word);
        if (addr + 1) % 10 == 0 {
            out.push('\n');
        }
    }

    out
}

/// Assemble the full execution report: the SML source, the console
/// transcript, and the final machine dump.
pub fn execution_report(source: &str, console: &str, machine: &Machine) -> String {
    let mut report = String::new();

    report.push_str("==============================================\n");
    report.push_str("       SIMPLETRON EXECUTION REPORT\n");
    report.push_str("==============================================\n\n");

    report.push_str("--- SML SOURCE ---\n");
    report.push_str(source);
    if !source.ends_with('\n') {
        report.push('\n');
    }
    report.push('\n');

    report.push_str("--- CONSOLE LOG (INPUT/OUTPUT) ---\n");
    report.push_str(console);
    if !console.is_empty() && !console.ends_with('\n') {
        report.push('\n');
    }
    report.push('\n');

    report.push_str("--- FINAL MACHINE DUMP ---\n");
    report.push_str(&dump(machine));

    report
}
