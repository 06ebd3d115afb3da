//! Simpletron Emulator - CLI Entry Point
//!
//! Commands:
//! - `simpletron-emu run <program>` - Load an SML file and run it
//! - `simpletron-emu debug <program>` - Interactive TUI debugger
//! - `simpletron-emu check <program>` - Validate an SML file
//! - `simpletron-emu dump <program>` - Show the loaded machine dump

use clap::{Parser, Subcommand};
use simpletron::{disassemble_word, Fault, LoadError, Machine, StepOutcome, WORD_MAX, WORD_MIN};
use std::io::{self, BufRead, Write};

#[derive(Parser)]
#[command(name = "simpletron-emu")]
#[command(version = "0.1.0")]
#[command(about = "An emulator of the Simpletron teaching computer")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a program until it halts
    Run {
        /// Path to the SML file to execute
        program: String,
        /// Maximum number of instructions to execute
        #[arg(short, long, default_value = "10000")]
        max_cycles: u64,
        /// Show a per-instruction trace
        #[arg(short, long)]
        trace: bool,
        /// Append an execution report to this file afterwards
        #[arg(short, long)]
        report: Option<String>,
        /// Print the final machine state as JSON
        #[arg(short, long)]
        json: bool,
    },
    /// Interactive debugger
    Debug {
        /// Path to the SML file to debug
        program: String,
    },
    /// Validate an SML file without running it
    Check {
        /// Path to the SML file
        program: String,
    },
    /// Load an SML file and print the register/memory dump
    Dump {
        /// Path to the SML file
        program: String,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Run { program, max_cycles, trace, report, json }) => {
            run_program(&program, max_cycles, trace, report.as_deref(), json);
        }
        Some(Commands::Debug { program }) => {
            debug_program(&program);
        }
        Some(Commands::Check { program }) => {
            check_program(&program);
        }
        Some(Commands::Dump { program }) => {
            dump_program(&program);
        }
        None => {
            println!("Simpletron Emulator v0.1.0");
            println!("The classic 100-word teaching computer");
            println!();
            println!("Use --help for available commands");
            println!();
            demo_sample_program();
        }
    }
}

/// Read an SML file and split it into source lines.
fn read_source(path: &str) -> (String, Vec<String>) {
    let source = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("❌ Failed to read file: {}", e);
            std::process::exit(1);
        }
    };
    let lines = source.lines().map(str::to_string).collect();
    (source, lines)
}

/// Load lines into a fresh machine, exiting with the load error on failure.
fn load_or_exit(lines: &[String]) -> Machine {
    let mut machine = Machine::new();
    if let Err(e) = machine.load(lines) {
        eprintln!("❌ Load failed: {}", e);
        std::process::exit(1);
    }
    machine
}

fn run_program(path: &str, max_cycles: u64, trace: bool, report: Option<&str>, json: bool) {
    let (source, lines) = read_source(path);
    let mut machine = load_or_exit(&lines);

    println!("🔧 Running: {} ({} lines)", path, lines.len());
    println!();
    println!("━━━ Execution ━━━");

    let mut console = String::new();
    let stdin = io::stdin();

    while machine.is_running() && machine.cycles() < max_cycles {
        let pc = machine.instruction_counter();

        match machine.step() {
            Ok(StepOutcome::AwaitingInput { addr }) => {
                match prompt_input(&stdin, addr) {
                    Some(value) => {
                        console.push_str(&format!("Input [{:02}]: {}\n", addr, value));
                        machine.supply_input(value);
                    }
                    None => {
                        eprintln!("❌ Invalid input. Execution aborted.");
                        std::process::exit(1);
                    }
                }
            }
            Ok(StepOutcome::Output { addr }) => {
                let value = machine.memory_at(addr);
                println!("Output: {:+05}", value);
                console.push_str(&format!("Output: {:+05}\n", value));
            }
            Ok(StepOutcome::Executed(_)) => {}
            Ok(StepOutcome::Halted) => break,
            Err(fault) => {
                eprintln!("❌ Fatal error at address {:02}: {} (code {})", pc, fault, fault.code());
                finish_run(&machine, &source, &console, report, json, Some(fault));
                std::process::exit(1);
            }
        }

        if trace {
            println!(
                "{:02}: {:<13} acc={:+05}",
                pc,
                disassemble_word(machine.instruction_register()),
                machine.accumulator()
            );
        }
    }

    if machine.is_running() && machine.cycles() >= max_cycles {
        println!();
        println!("⚠️  Reached max cycles limit ({}). Use --max-cycles to increase.", max_cycles);
    } else {
        println!();
        println!("*** Execution finished normally ***");
    }

    finish_run(&machine, &source, &console, report, json, None);
}

/// Print the run summary and emit the optional report/JSON artifacts.
fn finish_run(
    machine: &Machine,
    source: &str,
    console: &str,
    report: Option<&str>,
    json: bool,
    fault: Option<Fault>,
) {
    println!();
    println!("━━━ Result ━━━");
    println!("Cycles: {}", machine.cycles());
    println!("State: {:?}", machine.state());
    if let Some(fault) = fault {
        println!("Fault: {}", fault);
    }
    println!("Accumulator: {:+05}", machine.accumulator());

    if json {
        match serde_json::to_string_pretty(machine) {
            Ok(text) => println!("{}", text),
            Err(e) => eprintln!("❌ Failed to serialize machine state: {}", e),
        }
    }

    if let Some(report_path) = report {
        let text = simpletron::execution_report(source, console, machine);
        let result = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(report_path)
            .and_then(|mut f| writeln!(f, "{}\n", text));
        match result {
            Ok(()) => println!("✓ Report appended to {}", report_path),
            Err(e) => eprintln!("❌ Failed to write report: {}", e),
        }
    }
}

/// Prompt on stdin for a READ value. Returns None on unparsable or
/// out-of-range input; validation is the driver's job, never the core's.
fn prompt_input(stdin: &io::Stdin, addr: usize) -> Option<i32> {
    print!("READ into address {:02}, enter an integer [{}, {}]: ", addr, WORD_MIN, WORD_MAX);
    io::stdout().flush().ok()?;

    let mut line = String::new();
    stdin.lock().read_line(&mut line).ok()?;
    let value: i32 = line.trim().parse().ok()?;

    if (WORD_MIN..=WORD_MAX).contains(&value) {
        Some(value)
    } else {
        None
    }
}

fn debug_program(path: &str) {
    #[cfg(feature = "tui")]
    {
        use simpletron::tui::run_debugger;

        let (_source, lines) = read_source(path);
        // Validate before entering the alternate screen.
        let _ = load_or_exit(&lines);

        println!("🚀 Launching debugger...");
        if let Err(e) = run_debugger(lines) {
            eprintln!("❌ Debugger error: {}", e);
            std::process::exit(1);
        }
    }

    #[cfg(not(feature = "tui"))]
    {
        let _ = path;
        eprintln!("❌ This build has no TUI support (rebuild with the `tui` feature)");
        std::process::exit(1);
    }
}

fn check_program(path: &str) {
    let (_source, lines) = read_source(path);
    let mut machine = Machine::new();

    match machine.load(&lines) {
        Ok(()) => {
            println!("✓ {} loads cleanly ({} lines)", path, lines.len());
        }
        Err(e @ LoadError::ProgramTooLarge { .. }) => {
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("❌ {}", e);
            // The partial fill is still observable; show how far it got.
            let loaded = machine.memory().iter().rposition(|w| *w != 0).map_or(0, |i| i + 1);
            eprintln!("   (memory holds the partial load up to address {:02})", loaded);
            std::process::exit(1);
        }
    }
}

fn dump_program(path: &str) {
    let (_source, lines) = read_source(path);
    let machine = load_or_exit(&lines);
    print!("{}", simpletron::dump(&machine));
}

/// A no-input sample: add two constants and write the sum.
fn demo_sample_program() {
    println!("━━━ Sample Program ━━━");

    let program = [
        "2005 // LOAD 05",
        "3006 // ADD 06",
        "2107 // STORE 07",
        "1107 // WRITE 07",
        "4300 // HALT",
        "0012 // first addend",
        "0030 // second addend",
    ];

    let mut machine = Machine::new();
    machine.load(&program).expect("sample program is valid");

    for line in &program {
        println!("  {}", line);
    }
    println!();

    loop {
        match machine.step() {
            Ok(StepOutcome::Output { addr }) => println!("Output: {:+05}", machine.memory_at(addr)),
            Ok(StepOutcome::Halted) => break,
            Ok(_) => {}
            Err(fault) => {
                eprintln!("❌ Sample program faulted: {}", fault);
                return;
            }
        }
    }

    println!("✓ Halted after {} instructions", machine.cycles());
}
