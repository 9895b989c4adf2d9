//! Disassembly pane rendering
//!
//! Shows a linear listing of the memory around the program counter, with the
//! instruction under it highlighted. The highlight turns orange while the machine
//! waits for input and red when the instruction failed to execute.
//!
//! The current instruction stays at a fixed visual row while stepping; ↑/↓ move
//! that row, which scrolls the listing around it.

use super::utils::{pane_block, visible_rows};
use crate::interpreter::constants::DISASM_WINDOW;
use crate::interpreter::disasm::{self, Line as DisasmLine};
use crate::interpreter::machine::Machine;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// Scroll state for the disassembly pane
#[derive(Debug, Default)]
pub struct DisasmScrollState {
    pub offset: usize,
    /// Visual row the current instruction is pinned to (None = centre on first render)
    pub target_line_row: Option<usize>,
}

fn operand_style(operand: &str) -> Style {
    if operand.starts_with('#') {
        Style::default().fg(DEFAULT_THEME.number)
    } else if operand.starts_with("[rb") {
        Style::default().fg(DEFAULT_THEME.relative)
    } else {
        Style::default().fg(DEFAULT_THEME.primary)
    }
}

/// Split "add [1], #2, [rb+3]" into styled spans
fn highlight(text: &str) -> Vec<Span<'static>> {
    if let Some(rest) = text.strip_prefix(".data") {
        return vec![
            Span::styled(".data", Style::default().fg(DEFAULT_THEME.comment)),
            Span::styled(rest.to_string(), Style::default().fg(DEFAULT_THEME.comment)),
        ];
    }

    let (mnemonic, operands) = text.split_once(' ').unwrap_or((text, ""));
    let mut spans = vec![Span::styled(
        format!("{:<4}", mnemonic),
        Style::default()
            .fg(DEFAULT_THEME.keyword)
            .add_modifier(Modifier::BOLD),
    )];

    for (i, operand) in operands.split(", ").filter(|s| !s.is_empty()).enumerate() {
        if i > 0 {
            spans.push(Span::styled(", ", Style::default().fg(DEFAULT_THEME.fg)));
        } else {
            spans.push(Span::raw(" "));
        }
        spans.push(Span::styled(operand.to_string(), operand_style(operand)));
    }

    spans
}

/// Render the disassembly pane
pub fn render_disasm_pane(
    frame: &mut Frame,
    area: Rect,
    machine: &Machine,
    is_error: bool,
    is_focused: bool,
    scroll_state: &mut DisasmScrollState,
) {
    let block = pane_block(" Disassembly ", is_focused);

    let pc = machine.pc();
    let lines: Vec<DisasmLine> =
        disasm::window(machine.memory(), pc, DISASM_WINDOW, DISASM_WINDOW);
    let total_lines = lines.len();
    let current_idx = lines.iter().position(|line| line.address == pc);

    let visible_height = visible_rows(area.height);

    if scroll_state.target_line_row.is_none() {
        scroll_state.target_line_row = Some(visible_height / 2);
    }
    let target_row = scroll_state
        .target_line_row
        .unwrap_or(0)
        .min(visible_height.saturating_sub(1));
    scroll_state.target_line_row = Some(target_row);

    if let Some(idx) = current_idx {
        scroll_state.offset = idx.saturating_sub(target_row);
    }
    if total_lines > visible_height {
        scroll_state.offset = scroll_state.offset.min(total_lines - visible_height);
    } else {
        scroll_state.offset = 0;
    }

    let awaiting = machine.is_awaiting_input();

    let visible_lines: Vec<Line> = lines
        .iter()
        .enumerate()
        .skip(scroll_state.offset)
        .take(visible_height)
        .map(|(idx, line)| {
            let is_current = Some(idx) == current_idx;

            let (marker, num_style, bg) = if is_current && is_error {
                (
                    "✖ ",
                    Style::default()
                        .fg(DEFAULT_THEME.error)
                        .add_modifier(Modifier::BOLD),
                    Some(DEFAULT_THEME.error),
                )
            } else if is_current && awaiting {
                (
                    "⌨ ",
                    Style::default()
                        .fg(DEFAULT_THEME.secondary)
                        .add_modifier(Modifier::BOLD),
                    Some(DEFAULT_THEME.secondary),
                )
            } else if is_current {
                (
                    "▶ ",
                    Style::default()
                        .fg(DEFAULT_THEME.secondary)
                        .add_modifier(Modifier::BOLD),
                    Some(DEFAULT_THEME.current_line_bg),
                )
            } else {
                ("  ", Style::default().fg(DEFAULT_THEME.comment), None)
            };

            let mut spans = vec![Span::styled(
                format!("{}{:05} ", marker, line.address),
                num_style,
            )];
            let mut content = highlight(&line.text);

            match bg {
                // Error and input rows are drawn as solid bars
                Some(color) if color != DEFAULT_THEME.current_line_bg => {
                    for span in &mut content {
                        span.style = Style::default()
                            .bg(color)
                            .fg(Color::Black)
                            .add_modifier(Modifier::BOLD);
                    }
                }
                Some(color) => {
                    for span in &mut content {
                        span.style = span.style.bg(color);
                    }
                }
                None => {}
            }

            spans.extend(content);
            Line::from(spans)
        })
        .collect();

    let paragraph = Paragraph::new(visible_lines).block(block);
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::machine::Status;
    use ratatui::{backend::TestBackend, Terminal};

    #[test]
    fn test_highlight_splits_operands() {
        let spans = highlight("add [1], #2, [rb+3]");
        let texts: Vec<&str> = spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(texts, vec!["add ", " ", "[1]", ", ", "#2", ", ", "[rb+3]"]);
    }

    #[test]
    fn test_highlight_data() {
        let spans = highlight(".data 42");
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[1].content.as_ref(), " 42");
    }

    #[test]
    fn test_render_after_far_jump() {
        // jnz #1, #20000000 halts with pc far past the program
        let mut machine = Machine::new(vec![1105, 1, 20_000_000]);
        assert_eq!(machine.resume(), Ok(Status::Halted));

        let mut terminal = Terminal::new(TestBackend::new(60, 12)).unwrap();
        let mut state = DisasmScrollState::default();
        terminal
            .draw(|f| render_disasm_pane(f, f.area(), &machine, false, true, &mut state))
            .unwrap();

        let screen: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(screen.contains("20000000"));
        assert_eq!(state.offset, 0);
    }
}
