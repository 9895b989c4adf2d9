//! Registers pane: machine status, program counter, relative base and queues

use super::utils::pane_block;
use crate::interpreter::disasm;
use crate::interpreter::errors::MachineError;
use crate::interpreter::machine::{Machine, Status};
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};

/// Pending input values shown before the queue is elided
const INPUT_PREVIEW: usize = 16;

/// Data needed to render the registers pane
pub struct RegistersRenderData<'a> {
    pub machine: &'a Machine,
    pub error: Option<&'a MachineError>,
}

fn row<'a>(label: &'a str, value: String, value_style: Style) -> Line<'a> {
    Line::from(vec![
        Span::styled(
            format!("{:<10}", label),
            Style::default().fg(DEFAULT_THEME.comment),
        ),
        Span::styled(value, value_style),
    ])
}

/// Render the registers pane
pub fn render_registers_pane(
    frame: &mut Frame,
    area: Rect,
    data: RegistersRenderData,
    is_focused: bool,
) {
    let block = pane_block(" Registers ", is_focused);
    let machine = data.machine;
    let value_style = Style::default().fg(DEFAULT_THEME.fg);

    let (status_text, status_color) = match (data.error, machine.status()) {
        (Some(_), _) => ("FAULT", DEFAULT_THEME.error),
        (None, Status::Running) => ("RUNNING", DEFAULT_THEME.success),
        (None, Status::AwaitingInput) => ("AWAITING INPUT", DEFAULT_THEME.secondary),
        (None, Status::Halted) => ("HALTED", DEFAULT_THEME.error),
    };

    let current = disasm::disassemble_at(machine.memory(), machine.pc());

    let input: Vec<String> = machine
        .input()
        .iter()
        .take(INPUT_PREVIEW)
        .map(i64::to_string)
        .collect();
    let mut input_text = format!("[{}]", input.join(", "));
    if machine.input().len() > INPUT_PREVIEW {
        input_text = format!(
            "[{}, … +{}]",
            input.join(", "),
            machine.input().len() - INPUT_PREVIEW
        );
    }

    let mut lines = vec![
        row(
            "status",
            status_text.to_string(),
            Style::default()
                .fg(status_color)
                .add_modifier(Modifier::BOLD),
        ),
        row("pc", machine.pc().to_string(), value_style),
        row(
            "rb",
            machine.relative_base().to_string(),
            Style::default().fg(DEFAULT_THEME.relative),
        ),
        row("steps", machine.steps().to_string(), value_style),
        row(
            "next",
            current.text,
            Style::default().fg(DEFAULT_THEME.keyword),
        ),
        row(
            "input",
            input_text,
            Style::default().fg(DEFAULT_THEME.number),
        ),
        row("output", format!("{} value(s)", machine.output().len()), value_style),
    ];

    if let Some(error) = data.error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            error.to_string(),
            Style::default()
                .fg(DEFAULT_THEME.error)
                .add_modifier(Modifier::BOLD),
        )));
    }

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}
