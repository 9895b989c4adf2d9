//! Terminal output pane rendering

use super::utils::{clamp_scroll, pane_block, visible_rows};
use crate::ascii::{self, AsciiItem};
use crate::ui::theme::DEFAULT_THEME;
use std::collections::VecDeque;

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    widgets::{List, ListItem, Padding, Paragraph},
    Frame,
};

/// Render the terminal output pane
pub fn render_terminal_pane(
    frame: &mut Frame,
    area: Rect,
    output: &VecDeque<i64>,
    is_focused: bool,
    scroll_offset: &mut usize,
) {
    let block = pane_block(" Terminal Output ", is_focused);

    let items = ascii::decode(output);

    if items.is_empty() {
        let paragraph = Paragraph::new("(no output)")
            .block(block)
            .style(Style::default().fg(DEFAULT_THEME.comment));
        frame.render_widget(paragraph, area);
    } else {
        let block = block.padding(Padding::new(1, 0, 0, 0));
        // Values that are not characters stand out from the text around them
        let all_items: Vec<ListItem> = items
            .into_iter()
            .map(|item| match item {
                AsciiItem::Line(text) => {
                    ListItem::new(text).style(Style::default().fg(DEFAULT_THEME.fg))
                }
                AsciiItem::Value(value) => ListItem::new(value.to_string()).style(
                    Style::default()
                        .fg(DEFAULT_THEME.number)
                        .add_modifier(Modifier::BOLD),
                ),
            })
            .collect();

        let total_items = all_items.len();
        let visible_height = visible_rows(area.height);
        *scroll_offset = clamp_scroll(*scroll_offset, total_items, visible_height);

        let visible_items: Vec<ListItem> = all_items
            .into_iter()
            .skip(*scroll_offset)
            .take(visible_height)
            .collect();

        let list = List::new(visible_items).block(block);
        frame.render_widget(list, area);
    }
}
