//! Status bar rendering with keybindings and state indicators

use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// Data needed to render the status bar
pub struct StatusRenderData<'a> {
    pub message: &'a str,
    pub current_step: usize,
    pub total_steps: usize,
    /// More steps can be executed past the recorded history
    pub can_extend: bool,
    pub is_error: bool,
    pub is_playing: bool,
    pub is_awaiting_input: bool,
    /// Prompt label and typed text while an input line is being edited
    pub input_prompt: Option<(&'a str, &'a str)>,
}

/// Render the status bar at the bottom.
pub fn render_status_bar(frame: &mut Frame, area: Rect, data: StatusRenderData) {
    // Split status bar into left and right
    let layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    // Left side: Step info and status (or the input line being typed)
    let step_text = if data.can_extend {
        format!(" Step {}/{}+ ", data.current_step + 1, data.total_steps)
    } else {
        format!(" Step {}/{} ", data.current_step + 1, data.total_steps)
    };

    let badge_bg = if data.is_error {
        DEFAULT_THEME.error
    } else if data.is_awaiting_input || data.input_prompt.is_some() {
        DEFAULT_THEME.secondary
    } else {
        DEFAULT_THEME.primary
    };

    let mut left_spans = vec![
        Span::styled(
            step_text,
            Style::default()
                .bg(badge_bg)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            " | ",
            Style::default()
                .bg(DEFAULT_THEME.current_line_bg)
                .fg(DEFAULT_THEME.comment),
        ),
    ];

    match data.input_prompt {
        Some((prompt, buffer)) => {
            left_spans.push(Span::styled(
                format!(" {} ", prompt),
                Style::default()
                    .bg(DEFAULT_THEME.current_line_bg)
                    .fg(DEFAULT_THEME.secondary)
                    .add_modifier(Modifier::BOLD),
            ));
            left_spans.push(Span::styled(
                format!("{}█", buffer),
                Style::default()
                    .bg(DEFAULT_THEME.current_line_bg)
                    .fg(DEFAULT_THEME.fg),
            ));
        }
        None => {
            left_spans.push(Span::styled(
                format!(" {} ", data.message),
                Style::default()
                    .bg(DEFAULT_THEME.current_line_bg)
                    .fg(if data.is_error {
                        DEFAULT_THEME.error
                    } else {
                        DEFAULT_THEME.fg
                    }),
            ));
        }
    }

    let left_paragraph = Paragraph::new(Line::from(left_spans))
        .style(Style::default().bg(DEFAULT_THEME.current_line_bg))
        .alignment(Alignment::Left);

    frame.render_widget(left_paragraph, layout[0]);

    // Right side: Keybinds with visual grouping
    let key_style = Style::default().bg(DEFAULT_THEME.comment).fg(Color::Black);
    let desc_style = Style::default()
        .bg(DEFAULT_THEME.current_line_bg)
        .fg(DEFAULT_THEME.fg);
    let sep_style = Style::default()
        .bg(DEFAULT_THEME.current_line_bg)
        .fg(DEFAULT_THEME.comment);

    let mut right_spans = if data.input_prompt.is_some() {
        vec![
            Span::styled(" ↵ ", key_style),
            Span::styled(" send ", desc_style),
            Span::styled("│", sep_style),
            Span::styled(" ", desc_style),
            Span::styled(" esc ", key_style),
            Span::styled(" cancel ", desc_style),
        ]
    } else {
        vec![
            Span::styled(" ←/→ ", key_style),
            Span::styled(" step ", desc_style),
            Span::styled("│", sep_style),
            Span::styled(" ", desc_style),
            Span::styled(" ⎵ ", key_style),
            Span::styled(" play ", desc_style),
            Span::styled("│", sep_style),
            Span::styled(" ", desc_style),
            Span::styled(" ↵ / ⌫ ", key_style),
            Span::styled(" run/start ", desc_style),
            Span::styled("│", sep_style),
            Span::styled(" ", desc_style),
            Span::styled(" i / a ", key_style),
            Span::styled(" input ", desc_style),
            Span::styled("│", sep_style),
            Span::styled(" ", desc_style),
            Span::styled("q", key_style),
            Span::styled(" quit ", desc_style),
        ]
    };

    // Show status indicators based on position and state
    let is_at_start = data.current_step == 0;
    let is_at_end = !data.can_extend && data.current_step + 1 >= data.total_steps;

    let indicator = if data.is_awaiting_input {
        Some((" ⌨ INPUT ", DEFAULT_THEME.secondary))
    } else if data.is_playing {
        Some((" ▶ PLAYING ", DEFAULT_THEME.secondary))
    } else if is_at_end {
        Some((" END ", DEFAULT_THEME.error))
    } else if is_at_start {
        Some((" START ", DEFAULT_THEME.success))
    } else {
        None
    };

    if let Some((label, color)) = indicator {
        right_spans.push(Span::styled("│", sep_style));
        right_spans.push(Span::styled(
            label,
            Style::default()
                .bg(color)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        ));
    }

    let right_paragraph = Paragraph::new(Line::from(right_spans))
        .style(Style::default().bg(DEFAULT_THEME.current_line_bg))
        .alignment(Alignment::Right);

    frame.render_widget(right_paragraph, layout[1]);
}
