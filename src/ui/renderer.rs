use std::time::Duration;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::core::message::Role;
use crate::core::session::SessionStats;
use crate::core::transcript::Transcript;
use crate::ui::state::UiState;
use crate::ui::markdown::render_markdown;
use crate::ui::wrap::visible_tail;

pub const APP_TITLE: &str = "AI Chatbot Assistant";
pub const TAGLINE: &str = "Ask me anything and I'll help you with intelligent responses!";
pub const INPUT_PLACEHOLDER: &str = "What would you like to know?";
pub const SIDEBAR_WIDTH: u16 = 34;

/// Everything one frame needs.
pub struct Screen<'a> {
    pub transcript: &'a Transcript,
    pub stats: SessionStats,
    pub state: &'a UiState,
    pub model: &'a str,
}

/// Draws the whole page and returns how far the chat pane can scroll.
pub fn ui(f: &mut Frame, screen: &Screen) -> u16 {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(SIDEBAR_WIDTH)])
        .split(f.area());

    let error_height = u16::from(screen.state.error.is_some());
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(error_height),
            Constraint::Length(3),
        ])
        .split(columns[0]);

    render_header(f, rows[0], screen.model);
    let max_scroll = render_transcript(f, rows[1], screen);
    if let Some(error) = &screen.state.error {
        render_error(f, rows[2], error);
    }
    render_input(f, rows[3], screen.state);
    render_sidebar(f, columns[1], screen.stats);

    max_scroll
}

fn role_styles(role: Role) -> (Style, Style) {
    match role {
        Role::User => (
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            Style::default().fg(Color::Cyan),
        ),
        Role::Assistant => (
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
            Style::default(),
        ),
    }
}

fn pulse_symbol(elapsed: Duration) -> char {
    let phase = (elapsed.as_millis() as f32 / 1000.0 * 2.0) % 2.0;
    let intensity = if phase < 1.0 { phase } else { 2.0 - phase };
    if intensity < 0.33 {
        '○'
    } else if intensity < 0.66 {
        '◐'
    } else {
        '●'
    }
}

fn thinking_text(state: &UiState) -> String {
    format!("{} Thinking...", pulse_symbol(state.busy_since.elapsed()))
}

/// Flattens the transcript into display rows: markdown is styled first,
/// then wrapped to `width`.
pub fn transcript_lines(transcript: &Transcript, state: &UiState, width: u16) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    for turn in transcript {
        let (label_style, body_style) = role_styles(turn.role());
        lines.push(Line::from(Span::styled(
            format!("{}:", turn.role().display_label()),
            label_style,
        )));
        lines.extend(render_markdown(turn.content(), body_style, width as usize));
        lines.push(Line::from(""));
    }

    if state.busy {
        let (label_style, _) = role_styles(Role::Assistant);
        lines.push(Line::from(Span::styled(
            format!("{}:", Role::Assistant.display_label()),
            label_style,
        )));
        lines.push(Line::from(Span::styled(
            thinking_text(state),
            Style::default().fg(Color::Yellow),
        )));
    }

    lines
}

fn render_header(f: &mut Frame, area: Rect, model: &str) {
    let header = Paragraph::new(vec![
        Line::from(Span::styled(
            APP_TITLE,
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(TAGLINE),
        Line::from(Span::styled(
            format!("Model: {model}"),
            Style::default().fg(Color::DarkGray),
        )),
    ]);
    f.render_widget(header, area);
}

fn render_transcript(f: &mut Frame, area: Rect, screen: &Screen) -> u16 {
    let block = Block::default().borders(Borders::TOP).title("Chat");
    let inner = block.inner(area);

    let lines = transcript_lines(screen.transcript, screen.state, inner.width);
    let total = u16::try_from(lines.len()).unwrap_or(u16::MAX);
    let max_scroll = total.saturating_sub(inner.height);
    let offset = max_scroll - screen.state.scroll_from_bottom.min(max_scroll);

    let paragraph = Paragraph::new(lines).block(block).scroll((offset, 0));
    f.render_widget(paragraph, area);

    max_scroll
}

fn render_error(f: &mut Frame, area: Rect, error: &str) {
    let banner = Paragraph::new(Line::from(Span::styled(
        format!("Error: {error}"),
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
    )));
    f.render_widget(banner, area);
}

fn render_input(f: &mut Frame, area: Rect, state: &UiState) {
    let title = if state.busy {
        "Waiting for reply"
    } else {
        "Type your message (Enter to send, Ctrl+L to clear, Esc to quit)"
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(if state.busy {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default().fg(Color::Cyan)
        });
    let inner = block.inner(area);

    if state.busy {
        let text = Span::styled(thinking_text(state), Style::default().fg(Color::Yellow));
        f.render_widget(Paragraph::new(Line::from(text)).block(block), area);
        return;
    }

    if state.input.is_empty() {
        let placeholder = Span::styled(INPUT_PLACEHOLDER, Style::default().fg(Color::DarkGray));
        f.render_widget(Paragraph::new(Line::from(placeholder)).block(block), area);
        f.set_cursor_position((inner.x, inner.y));
        return;
    }

    // Leave one column for the cursor.
    let room = inner.width.saturating_sub(1) as usize;
    let (visible, used) = visible_tail(&state.input, room);
    f.render_widget(Paragraph::new(visible.to_string()).block(block), area);
    f.set_cursor_position((inner.x + used as u16, inner.y));
}

fn render_sidebar(f: &mut Frame, area: Rect, stats: SessionStats) {
    let heading = Style::default().add_modifier(Modifier::BOLD);
    let muted = Style::default().fg(Color::DarkGray);

    let mut lines = vec![
        Line::from(Span::styled("About This App", heading)),
        Line::from("This AI chatbot is powered by:"),
        Line::from("• Groq for fast LLM inference"),
        Line::from("• reqwest for the API calls"),
        Line::from("• ratatui for the terminal UI"),
        Line::from(""),
        Line::from(Span::styled("Chat Controls", heading)),
        Line::from(vec![
            Span::styled("Ctrl+L ", muted),
            Span::raw("Clear Chat History"),
        ]),
        Line::from(vec![Span::styled("PgUp/PgDn ", muted), Span::raw("Scroll")]),
        Line::from(vec![Span::styled("Esc ", muted), Span::raw("Quit")]),
        Line::from(""),
        Line::from(Span::styled("Stats", heading)),
        Line::from(format!("Messages in Chat: {}", stats.total_turns)),
    ];
    if stats.total_turns > 0 {
        lines.push(Line::from(format!(
            "Questions Asked: {}",
            stats.questions_asked
        )));
    }

    let sidebar = Paragraph::new(lines)
        .block(Block::default().borders(Borders::LEFT))
        .wrap(Wrap { trim: true });
    f.render_widget(sidebar, area);
}
