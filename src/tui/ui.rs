//! UI rendering for the debugger.

use ratatui::{
    prelude::*,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, List, ListItem, Paragraph},
};

use super::app::DebuggerApp;
use crate::machine::MachineState;
use crate::sml::disassemble_word;

/// Main draw function.
pub fn draw(frame: &mut Frame, app: &DebuggerApp) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(frame.area());

    // Left side: program listing, registers, status/input line
    let left_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(10),
            Constraint::Length(7),
            Constraint::Length(3),
        ])
        .split(chunks[0]);

    draw_program(frame, left_chunks[0], app);
    draw_registers(frame, left_chunks[1], app);
    draw_status(frame, left_chunks[2], app);

    // Right side: memory, console, help
    let right_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(10),
            Constraint::Length(8),
            Constraint::Length(4),
        ])
        .split(chunks[1]);

    draw_memory(frame, right_chunks[0], app);
    draw_console(frame, right_chunks[1], app);
    draw_help(frame, right_chunks[2]);
}

/// Draw the SML program listing with the current instruction marked.
fn draw_program(frame: &mut Frame, area: Rect, app: &DebuggerApp) {
    let pc = app.machine.instruction_counter();

    let items: Vec<ListItem> = app
        .source
        .iter()
        .enumerate()
        .map(|(addr, line)| {
            let is_current = addr == pc;
            let prefix = if is_current { "▶ " } else { "  " };
            let bp = if app.breakpoints.contains(&addr) { "●" } else { " " };

            let style = if is_current {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else if app.breakpoints.contains(&addr) {
                Style::default().fg(Color::Red)
            } else {
                Style::default()
            };

            ListItem::new(format!("{} {}{:02}: {}", bp, prefix, addr, line)).style(style)
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .title(" Program ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );

    frame.render_widget(list, area);
}

/// Draw the five Simpletron registers.
fn draw_registers(frame: &mut Frame, area: Rect, app: &DebuggerApp) {
    let m = &app.machine;

    let state_style = match m.state() {
        MachineState::Halted | MachineState::Faulted => Style::default().fg(Color::Red),
        MachineState::AwaitingInput => Style::default().fg(Color::Yellow),
        _ => Style::default().fg(Color::Green),
    };

    let content = vec![
        Line::from(vec![
            Span::raw("accumulator:         "),
            Span::styled(format!("{:+05}", m.accumulator()), Style::default().fg(Color::White)),
        ]),
        Line::from(vec![
            Span::raw("instructionCounter:     "),
            Span::styled(format!("{:02}", m.instruction_counter()), Style::default().fg(Color::Yellow)),
        ]),
        Line::from(vec![
            Span::raw("instructionRegister: "),
            Span::styled(format!("{:+05}", m.instruction_register()), Style::default().fg(Color::White)),
            Span::raw(format!("  ({})", disassemble_word(m.instruction_register()))),
        ]),
        Line::from(vec![
            Span::raw("operationCode: "),
            Span::styled(format!("{:02}", m.operation_code()), Style::default().fg(Color::White)),
            Span::raw("   operand: "),
            Span::styled(format!("{:02}", m.operand()), Style::default().fg(Color::White)),
        ]),
        Line::from(vec![
            Span::raw("Cycles: "),
            Span::styled(format!("{}", m.cycles()), Style::default().fg(Color::Cyan)),
            Span::raw("   State: "),
            Span::styled(format!("{:?}", m.state()), state_style),
        ]),
    ];

    let paragraph = Paragraph::new(content).block(
        Block::default()
            .title(" Registers ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Green)),
    );

    frame.render_widget(paragraph, area);
}

/// Draw the scrollable memory view.
fn draw_memory(frame: &mut Frame, area: Rect, app: &DebuggerApp) {
    let visible_rows = (area.height as usize).saturating_sub(2);
    let start = app.mem_scroll;
    let end = (start + visible_rows).min(app.machine.memory().len());
    let pc = app.machine.instruction_counter();

    let items: Vec<ListItem> = (start..end)
        .map(|addr| {
            let value = app.machine.memory_at(addr);
            let is_pc = addr == pc;

            let mut text = format!("{:02}: {:+05}", addr, value);
            let comment = app.machine.comment_at(addr);
            if !comment.is_empty() {
                text.push_str(&format!("  // {}", comment));
            }

            let style = if is_pc {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else if value != 0 {
                Style::default().fg(Color::White)
            } else {
                Style::default().fg(Color::DarkGray)
            };

            ListItem::new(text).style(style)
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .title(" Memory ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Magenta)),
    );

    frame.render_widget(list, area);
}

/// Draw the READ/WRITE console transcript.
fn draw_console(frame: &mut Frame, area: Rect, app: &DebuggerApp) {
    let visible = (area.height as usize).saturating_sub(2);
    let start = app.console.len().saturating_sub(visible);

    let lines: Vec<Line> = app.console[start..]
        .iter()
        .map(|entry| Line::from(entry.as_str()))
        .collect();

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .title(" Console ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Blue)),
    );

    frame.render_widget(paragraph, area);
}

/// Draw the status bar, doubling as the READ input line.
fn draw_status(frame: &mut Frame, area: Rect, app: &DebuggerApp) {
    let (text, style) = if let Some(addr) = app.pending_read {
        (
            format!("READ [{:02}] > {}_", addr, app.input_buffer),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )
    } else {
        (app.status.clone(), Style::default().fg(Color::White))
    };

    let status = Paragraph::new(text)
        .style(style)
        .block(Block::default().title(" Status ").borders(Borders::ALL));

    frame.render_widget(status, area);
}

/// Draw help panel.
fn draw_help(frame: &mut Frame, area: Rect) {
    let help = Paragraph::new(vec![
        Line::from("s: Step  r: Run  p: Pause  b: Breakpoint"),
        Line::from("x: Reset  ↑↓: Scroll memory  q: Quit"),
    ])
    .style(Style::default().fg(Color::DarkGray))
    .block(Block::default().title(" Help ").borders(Borders::ALL));

    frame.render_widget(help, area);
}
