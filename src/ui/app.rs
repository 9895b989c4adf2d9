//! Main TUI application state and logic

use crate::ascii;
use crate::interpreter::constants::{PLAY_INTERVAL_MS, RUN_STEP_LIMIT};
use crate::interpreter::errors::MachineError;
use crate::interpreter::session::{Session, SessionError};
use crate::parser::parse_program;
use crate::ui::panes::{
    self, DisasmScrollState, MemoryScrollState, RegistersRenderData, StatusRenderData,
};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};
use std::io;
use std::time::{Duration, Instant};

/// Which pane is currently focused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusedPane {
    Disasm,
    Registers,
    Memory,
    Terminal,
}

impl FocusedPane {
    /// Move focus to the next pane (clockwise: disasm -> terminal -> registers -> memory)
    pub fn next(self) -> Self {
        match self {
            FocusedPane::Disasm => FocusedPane::Terminal,
            FocusedPane::Terminal => FocusedPane::Registers,
            FocusedPane::Registers => FocusedPane::Memory,
            FocusedPane::Memory => FocusedPane::Disasm,
        }
    }
}

/// What the line being typed will be sent as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Comma-separated integers
    Numeric,
    /// One line of text, sent as character codes plus a newline
    Ascii,
}

impl InputMode {
    fn prompt(self) -> &'static str {
        match self {
            InputMode::Numeric => "values:",
            InputMode::Ascii => "text:",
        }
    }
}

/// The main application state
pub struct App {
    /// The recorded machine
    pub session: Session,

    /// Currently focused pane
    pub focused_pane: FocusedPane,

    /// Per-pane scroll state
    pub disasm_scroll: DisasmScrollState,
    pub memory_scroll: MemoryScrollState,
    pub terminal_scroll: usize,

    /// Whether the app should quit
    pub should_quit: bool,

    /// Status message to display
    pub status_message: String,

    /// Fault raised by the instruction at the current position
    pub error: Option<MachineError>,

    /// Whether auto-play mode is active
    pub is_playing: bool,

    /// Last time a step was taken in play mode
    pub last_play_time: Instant,

    /// Last time space was pressed (for debouncing)
    pub last_space_press: Instant,

    /// Input line being edited, if any
    pub input_mode: Option<InputMode>,
    pub input_buffer: String,
}

impl App {
    /// Create a new app driving the given session
    pub fn new(session: Session) -> Self {
        App {
            session,
            focused_pane: FocusedPane::Disasm,
            disasm_scroll: DisasmScrollState::default(),
            memory_scroll: MemoryScrollState::default(),
            terminal_scroll: 0,
            should_quit: false,
            status_message: String::from("Ready!"),
            error: None,
            is_playing: false,
            last_play_time: Instant::now(),
            last_space_press: Instant::now()
                .checked_sub(Duration::from_secs(1))
                .unwrap_or(Instant::now()),
            input_mode: None,
            input_buffer: String::new(),
        }
    }

    /// Run the TUI application
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.should_quit {
                break;
            }

            // Handle auto-play mode
            if self.is_playing
                && self.last_play_time.elapsed() >= Duration::from_millis(PLAY_INTERVAL_MS)
            {
                if self.step_forward() {
                    self.status_message = "Playing...".to_string();
                } else {
                    self.is_playing = false;
                }
                self.last_play_time = Instant::now();
            }

            // Use poll with timeout to allow auto-play to work
            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key_event(key);
                    }
                }
            }
        }

        Ok(())
    }

    /// Render the UI
    fn render(&mut self, frame: &mut Frame) {
        let size = frame.area();

        // Create layout: 4 panes in 2 columns, plus status bar at bottom
        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(size);

        let pane_area = main_chunks[0];
        let status_area = main_chunks[1];

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(pane_area);

        // Left column: Disassembly (top) | Terminal (bottom)
        let left_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(columns[0]);

        // Right column: Registers (top) | Memory (bottom)
        let right_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(11), Constraint::Min(0)])
            .split(columns[1]);

        let machine = self.session.machine();

        panes::render_disasm_pane(
            frame,
            left_rows[0],
            machine,
            self.error.is_some(),
            self.focused_pane == FocusedPane::Disasm,
            &mut self.disasm_scroll,
        );

        panes::render_terminal_pane(
            frame,
            left_rows[1],
            machine.output(),
            self.focused_pane == FocusedPane::Terminal,
            &mut self.terminal_scroll,
        );

        panes::render_registers_pane(
            frame,
            right_rows[0],
            RegistersRenderData {
                machine,
                error: self.error.as_ref(),
            },
            self.focused_pane == FocusedPane::Registers,
        );

        panes::render_memory_pane(
            frame,
            right_rows[1],
            machine,
            self.focused_pane == FocusedPane::Memory,
            &mut self.memory_scroll,
        );

        panes::render_status_bar(
            frame,
            status_area,
            StatusRenderData {
                message: &self.status_message,
                current_step: self.session.history_position(),
                total_steps: self.session.total_snapshots(),
                can_extend: !(self.session.at_frontier() && machine.is_halted()),
                is_error: self.error.is_some(),
                is_playing: self.is_playing,
                is_awaiting_input: machine.is_awaiting_input(),
                input_prompt: self
                    .input_mode
                    .map(|mode| (mode.prompt(), self.input_buffer.as_str())),
            },
        );
    }

    /// Handle keyboard events
    fn handle_key_event(&mut self, key: KeyEvent) {
        if let Some(mode) = self.input_mode {
            self.handle_input_key(mode, key);
            return;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.should_quit = true;
            }
            // Number keys step forward N times directly
            KeyCode::Char(c @ '1'..='9') => {
                self.is_playing = false;
                let n = c.to_digit(10).unwrap_or(1) as usize;
                let mut stepped = 0;
                while stepped < n && self.step_forward() {
                    stepped += 1;
                }
                if stepped == n {
                    self.status_message = format!("Stepped forward {} step(s)", stepped);
                }
            }
            KeyCode::Char('i') => self.begin_input(InputMode::Numeric),
            KeyCode::Char('a') => self.begin_input(InputMode::Ascii),
            KeyCode::Tab => {
                self.focused_pane = self.focused_pane.next();
            }
            KeyCode::Left => {
                self.is_playing = false;
                self.step_backward();
            }
            KeyCode::Right => {
                self.is_playing = false;
                if self.step_forward() {
                    self.status_message = "Stepped forward".to_string();
                }
            }
            KeyCode::Up => match self.focused_pane {
                FocusedPane::Disasm => {
                    // Scrolling up makes the current instruction move down visually
                    if let Some(row) = self.disasm_scroll.target_line_row {
                        self.disasm_scroll.target_line_row = Some(row.saturating_add(1));
                    }
                }
                FocusedPane::Memory => {
                    self.memory_scroll.follow_pc = false;
                    self.memory_scroll.offset = self.memory_scroll.offset.saturating_sub(1);
                }
                FocusedPane::Terminal => {
                    self.terminal_scroll = self.terminal_scroll.saturating_sub(1);
                }
                FocusedPane::Registers => {}
            },
            KeyCode::Down => match self.focused_pane {
                FocusedPane::Disasm => {
                    if let Some(row) = self.disasm_scroll.target_line_row {
                        self.disasm_scroll.target_line_row = Some(row.saturating_sub(1));
                    }
                }
                FocusedPane::Memory => {
                    self.memory_scroll.follow_pc = false;
                    self.memory_scroll.offset = self.memory_scroll.offset.saturating_add(1);
                }
                FocusedPane::Terminal => {
                    self.terminal_scroll = self.terminal_scroll.saturating_add(1);
                }
                FocusedPane::Registers => {}
            },
            KeyCode::Char('f') => {
                self.memory_scroll.follow_pc = true;
                self.status_message = "Memory follows pc".to_string();
            }
            KeyCode::Char(' ') => {
                // Toggle auto-play mode (with 200ms debounce to prevent key repeat spam)
                if self.last_space_press.elapsed() >= Duration::from_millis(200) {
                    self.last_space_press = Instant::now();
                    self.is_playing = !self.is_playing;
                    if self.is_playing {
                        self.last_play_time = Instant::now()
                            .checked_sub(Duration::from_millis(PLAY_INTERVAL_MS))
                            .unwrap_or(Instant::now());
                        self.status_message = "Playing...".to_string();
                    } else {
                        self.status_message = "Paused".to_string();
                    }
                }
            }
            KeyCode::Enter => {
                // Run until the program halts or asks for input
                self.is_playing = false;
                self.run_to_pause();
            }
            KeyCode::Backspace => {
                // Jump to start of execution
                self.is_playing = false;
                self.session.rewind_to_start();
                self.error = None;
                self.status_message = "Jumped to start".to_string();
                self.terminal_scroll = usize::MAX;
            }
            _ => {}
        }
    }

    fn begin_input(&mut self, mode: InputMode) {
        self.is_playing = false;
        self.input_mode = Some(mode);
        self.input_buffer.clear();
    }

    fn handle_input_key(&mut self, mode: InputMode, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.input_mode = None;
                self.status_message = "Input cancelled".to_string();
            }
            KeyCode::Backspace => {
                self.input_buffer.pop();
            }
            KeyCode::Enter => {
                self.input_mode = None;
                self.submit_input(mode);
            }
            KeyCode::Char(c) => {
                self.input_buffer.push(c);
            }
            _ => {}
        }
    }

    /// Send the typed line to the machine
    fn submit_input(&mut self, mode: InputMode) {
        let line = std::mem::take(&mut self.input_buffer);
        let values = match mode {
            InputMode::Ascii => ascii::encode_line(&line),
            InputMode::Numeric => match parse_program(&line) {
                Ok(values) => values,
                Err(e) => {
                    self.status_message = format!("Bad input: {}", e);
                    return;
                }
            },
        };

        let count = values.len();
        match self.session.provide_input(values) {
            Ok(()) => {
                self.error = None;
                self.status_message = format!("Queued {} input value(s)", count);
            }
            Err(e) => {
                self.status_message = format!("Cannot queue input: {}", e);
            }
        }
    }

    /// Step forward in execution; returns false when no step was taken
    fn step_forward(&mut self) -> bool {
        match self.session.step_forward() {
            Ok(()) => {
                self.error = None;
                // Auto-scroll terminal to bottom
                self.terminal_scroll = usize::MAX;
                true
            }
            Err(e) => {
                self.report(e);
                false
            }
        }
    }

    /// Step backward in execution
    fn step_backward(&mut self) {
        match self.session.step_backward() {
            Ok(()) => {
                self.error = None;
                self.status_message = "Stepped backward".to_string();
                self.terminal_scroll = usize::MAX;
            }
            Err(e) => {
                self.status_message = format!("Cannot step backward: {}", e);
            }
        }
    }

    fn run_to_pause(&mut self) {
        match self.session.run_to_pause(RUN_STEP_LIMIT) {
            Ok(steps) => {
                let machine = self.session.machine();
                self.status_message = if machine.is_halted() {
                    format!("Ran {} step(s) to halt", steps)
                } else if machine.is_awaiting_input() {
                    format!("Ran {} step(s); waiting for input", steps)
                } else {
                    format!("Ran {} step(s); stopped at step limit", steps)
                };
            }
            Err(e) => self.report(e),
        }
        self.terminal_scroll = usize::MAX;
    }

    fn report(&mut self, err: SessionError) {
        self.status_message = match err {
            SessionError::NeedsInput => {
                "Waiting for input: press i (numbers) or a (text)".to_string()
            }
            SessionError::AtEnd => "Program halted".to_string(),
            SessionError::Machine(e) => {
                let message = format!("Fault: {}", e);
                self.error = Some(e);
                message
            }
            other => format!("Cannot step forward: {}", other),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::machine::Machine;
    use crossterm::event::KeyModifiers;

    fn app(program: Vec<i64>) -> App {
        let session = Session::new(Machine::new(program), 16 * 1024 * 1024).unwrap();
        App::new(session)
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key_event(KeyEvent::new(code, KeyModifiers::NONE));
    }

    #[test]
    fn test_focus_cycles() {
        let mut focus = FocusedPane::Disasm;
        for _ in 0..4 {
            focus = focus.next();
        }
        assert_eq!(focus, FocusedPane::Disasm);
    }

    #[test]
    fn test_ascii_input_round_trip() {
        // in [13]; out [13]; jnz #1, #0
        let mut app = app(vec![3, 13, 4, 13, 1105, 1, 0, 0, 0, 0, 0, 0, 0, 0]);
        press(&mut app, KeyCode::Enter);
        assert!(app.session.machine().is_awaiting_input());

        press(&mut app, KeyCode::Char('a'));
        for c in "ok".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.input_mode, None);
        assert_eq!(app.session.machine().input().len(), 3);

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.session.machine().output(), &[111, 107, 10]);
    }

    #[test]
    fn test_bad_numeric_input_is_rejected() {
        let mut app = app(vec![3, 0, 99]);
        press(&mut app, KeyCode::Char('i'));
        press(&mut app, KeyCode::Char('x'));
        press(&mut app, KeyCode::Enter);
        assert!(app.status_message.starts_with("Bad input"));
        assert!(app.session.machine().input().is_empty());
    }

    #[test]
    fn test_fault_is_reported() {
        let mut app = app(vec![77]);
        press(&mut app, KeyCode::Right);
        assert_eq!(
            app.error,
            Some(MachineError::UnknownOpcode { pc: 0, word: 77 })
        );
        assert!(app.status_message.starts_with("Fault"));
    }
}
