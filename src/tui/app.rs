//! Debugger application state and logic.

use crate::machine::{Machine, MachineState, StepOutcome, WORD_MAX, WORD_MIN};
use crate::sml::disassemble_word;
use std::collections::HashSet;

/// Debugger application state.
pub struct DebuggerApp {
    /// The machine being debugged.
    pub machine: Machine,
    /// Original SML source lines, one per address.
    pub source: Vec<String>,
    /// Breakpoints (by address).
    pub breakpoints: HashSet<usize>,
    /// Is the debugger running continuously?
    pub running: bool,
    /// Should we quit?
    pub should_quit: bool,
    /// Status message to display.
    pub status: String,
    /// Console transcript (READ/WRITE traffic).
    pub console: Vec<String>,
    /// Address of a pending READ, if the machine awaits input.
    pub pending_read: Option<usize>,
    /// Text being typed for a pending READ.
    pub input_buffer: String,
    /// Memory view scroll offset.
    pub mem_scroll: usize,
}

impl DebuggerApp {
    /// Create a new debugger with a loaded program.
    pub fn new(source: Vec<String>) -> Self {
        let mut machine = Machine::new();
        let _ = machine.load(&source);

        Self {
            machine,
            source,
            breakpoints: HashSet::new(),
            running: false,
            should_quit: false,
            status: "Ready. Press 's' to step, 'r' to run, 'q' to quit.".into(),
            console: Vec::new(),
            pending_read: None,
            input_buffer: String::new(),
            mem_scroll: 0,
        }
    }

    /// Step one instruction.
    pub fn step(&mut self) {
        if self.pending_read.is_some() {
            self.status = "Awaiting READ input. Type a value and press Enter.".into();
            return;
        }
        if !self.machine.is_running() {
            self.status = format!("Machine stopped: {:?}", self.machine.state());
            self.running = false;
            return;
        }

        let pc = self.machine.instruction_counter();
        match self.machine.step() {
            Ok(StepOutcome::AwaitingInput { addr }) => {
                self.pending_read = Some(addr);
                self.input_buffer.clear();
                self.status = format!("READ into address {:02}: type a value, Enter to submit.", addr);
            }
            Ok(StepOutcome::Output { addr }) => {
                let value = self.machine.memory_at(addr);
                self.console.push(format!("Output: {:+05}", value));
                self.status = format!("{:02}: WRITE {:02} -> {:+05}", pc, addr, value);
            }
            Ok(StepOutcome::Executed(_)) => {
                self.status = format!(
                    "{:02}: {}",
                    pc,
                    disassemble_word(self.machine.instruction_register())
                );
            }
            Ok(StepOutcome::Halted) => {
                self.status = format!("Halted after {} instructions.", self.machine.cycles());
                self.running = false;
            }
            Err(fault) => {
                self.status = format!("Fault at {:02}: {} (code {})", pc, fault, fault.code());
                self.console.push(format!("Fault: {}", fault));
                self.running = false;
            }
        }
    }

    /// Start continuous execution. Steps once first so a breakpoint at the
    /// current address does not stop the run before it begins.
    pub fn run(&mut self) {
        self.step();
        if self.machine.is_running() {
            self.running = true;
            self.status = "Running...".into();
        }
    }

    /// Run one iteration of continuous execution.
    pub fn tick(&mut self) {
        if !self.running || self.pending_read.is_some() {
            return;
        }

        if !self.machine.is_running() {
            self.running = false;
            self.status = format!("Stopped after {} instructions.", self.machine.cycles());
            return;
        }

        let pc = self.machine.instruction_counter();
        if self.breakpoints.contains(&pc) {
            self.running = false;
            self.status = format!("Breakpoint at address {:02}", pc);
            return;
        }

        self.step();
    }

    /// Accept one character of READ input.
    pub fn input_char(&mut self, c: char) {
        if self.pending_read.is_some() && (c.is_ascii_digit() || (c == '-' && self.input_buffer.is_empty())) {
            self.input_buffer.push(c);
        }
    }

    /// Delete the last character of READ input.
    pub fn input_backspace(&mut self) {
        if self.pending_read.is_some() {
            self.input_buffer.pop();
        }
    }

    /// Parse and deliver the typed READ value.
    ///
    /// Validation is the driver's job: an unparsable or out-of-range value
    /// is rejected here and never reaches the machine.
    pub fn submit_input(&mut self) {
        let Some(addr) = self.pending_read else { return };

        match self.input_buffer.trim().parse::<i32>() {
            Ok(value) if (WORD_MIN..=WORD_MAX).contains(&value) => {
                self.machine.supply_input(value);
                self.console.push(format!("Input [{:02}]: {}", addr, value));
                self.pending_read = None;
                self.input_buffer.clear();
                self.status = format!("Delivered {} to address {:02}.", value, addr);
            }
            Ok(value) => {
                self.status = format!("{} is outside [{}, {}]. Try again.", value, WORD_MIN, WORD_MAX);
                self.input_buffer.clear();
            }
            Err(_) => {
                self.status = "Not a valid integer. Try again.".into();
                self.input_buffer.clear();
            }
        }
    }

    /// Toggle breakpoint at the current instruction counter.
    pub fn toggle_breakpoint(&mut self) {
        let pc = self.machine.instruction_counter();
        if self.breakpoints.remove(&pc) {
            self.status = format!("Removed breakpoint at address {:02}", pc);
        } else {
            self.breakpoints.insert(pc);
            self.status = format!("Set breakpoint at address {:02}", pc);
        }
    }

    /// Reset the machine and reload the program.
    pub fn reset(&mut self) {
        let _ = self.machine.load(&self.source);
        self.running = false;
        self.pending_read = None;
        self.input_buffer.clear();
        self.console.clear();
        self.status = "Reset. Ready.".into();
    }

    /// True once the machine can make no more progress.
    pub fn is_stopped(&self) -> bool {
        matches!(
            self.machine.state(),
            MachineState::Halted | MachineState::Faulted
        )
    }
}

/// Run the debugger over a validated SML source.
pub fn run_debugger(source: Vec<String>) -> std::io::Result<()> {
    use crossterm::{
        event::{self, Event, KeyCode, KeyEventKind},
        terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
        ExecutableCommand,
    };
    use ratatui::prelude::*;
    use std::io::stdout;
    use std::time::Duration;

    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    // Create app
    let mut app = DebuggerApp::new(source);

    // Main loop
    loop {
        // Draw
        terminal.draw(|frame| {
            super::ui::draw(frame, &app);
        })?;

        // Handle input
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    if app.pending_read.is_some() {
                        // Input mode: the status line is an edit field.
                        match key.code {
                            KeyCode::Char('q') if app.input_buffer.is_empty() => app.should_quit = true,
                            KeyCode::Char(c) => app.input_char(c),
                            KeyCode::Backspace => app.input_backspace(),
                            KeyCode::Enter => app.submit_input(),
                            _ => {}
                        }
                    } else {
                        match key.code {
                            KeyCode::Char('q') => app.should_quit = true,
                            KeyCode::Char('s') => {
                                app.running = false;
                                app.step();
                            }
                            KeyCode::Char('r') => app.run(),
                            KeyCode::Char('p') => {
                                app.running = false;
                                app.status = "Paused.".into();
                            }
                            KeyCode::Char('b') => app.toggle_breakpoint(),
                            KeyCode::Char('x') => app.reset(),
                            KeyCode::Up => {
                                if app.mem_scroll > 0 {
                                    app.mem_scroll -= 1;
                                }
                            }
                            KeyCode::Down => {
                                if app.mem_scroll < 90 {
                                    app.mem_scroll += 1;
                                }
                            }
                            _ => {}
                        }
                    }
                }
            }
        }

        // Tick for continuous running
        if app.running {
            app.tick();
        }

        if app.should_quit {
            break;
        }
    }

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    Ok(())
}
