//! Memory dump pane
//!
//! Memory is shown eight cells per row. The cell under the program counter and the
//! operand cells of the current instruction are highlighted. When not scrolled
//! manually the dump follows the program counter.

use super::utils::{clamp_scroll, pane_block, visible_rows};
use crate::interpreter::machine::Machine;
use crate::interpreter::opcode::Instruction;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// Cells per row
pub const ROW_WIDTH: usize = 8;

/// Scroll state for the memory pane
#[derive(Debug)]
pub struct MemoryScrollState {
    pub offset: usize,
    /// Keep the program counter's row in view
    pub follow_pc: bool,
}

impl Default for MemoryScrollState {
    fn default() -> Self {
        MemoryScrollState {
            offset: 0,
            follow_pc: true,
        }
    }
}

/// Render the memory pane
pub fn render_memory_pane(
    frame: &mut Frame,
    area: Rect,
    machine: &Machine,
    is_focused: bool,
    scroll_state: &mut MemoryScrollState,
) {
    let title = format!(" Memory ({} cells) ", machine.memory().extent());
    let block = pane_block(&title, is_focused);

    let pc = machine.pc();
    let operand_count = Instruction::decode(machine.peek(pc), pc)
        .map(|instr| instr.opcode.arity())
        .unwrap_or(0);

    let total_rows = machine.memory().extent().div_ceil(ROW_WIDTH).max(1);
    let visible_height = visible_rows(area.height);

    if scroll_state.follow_pc {
        let pc_row = pc / ROW_WIDTH;
        if pc_row < scroll_state.offset || pc_row >= scroll_state.offset + visible_height {
            scroll_state.offset = pc_row.saturating_sub(visible_height / 2);
        }
    }
    scroll_state.offset = clamp_scroll(scroll_state.offset, total_rows, visible_height);

    // Width of the widest value on screen, so columns line up
    let first = scroll_state.offset * ROW_WIDTH;
    let shown = machine.memory().slice(first, visible_height * ROW_WIDTH);
    let cell_width = shown
        .iter()
        .map(|value| value.to_string().len())
        .max()
        .unwrap_or(1);

    let lines: Vec<Line> = shown
        .chunks(ROW_WIDTH)
        .enumerate()
        .map(|(row, values)| {
            let base = first + row * ROW_WIDTH;
            let mut spans = vec![Span::styled(
                format!("{:05}│", base),
                Style::default().fg(DEFAULT_THEME.comment),
            )];

            for (col, value) in values.iter().enumerate() {
                let address = base + col;
                let style = if address == pc {
                    Style::default()
                        .bg(DEFAULT_THEME.secondary)
                        .fg(Color::Black)
                        .add_modifier(Modifier::BOLD)
                } else if address > pc && address <= pc + operand_count {
                    Style::default()
                        .bg(DEFAULT_THEME.operand_bg)
                        .fg(DEFAULT_THEME.secondary)
                } else if *value == 0 {
                    Style::default().fg(DEFAULT_THEME.comment)
                } else {
                    Style::default().fg(DEFAULT_THEME.fg)
                };
                spans.push(Span::raw(" "));
                spans.push(Span::styled(
                    format!("{:>width$}", value, width = cell_width),
                    style,
                ));
            }

            Line::from(spans)
        })
        .collect();

    let paragraph = Paragraph::new(lines).block(block);
    frame.render_widget(paragraph, area);
}
