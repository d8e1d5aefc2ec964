use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use term_sampler::{Event, EventType, MouseEvent};

use crate::app::{App, LogEntry};

/// Render the full TUI frame.
pub fn draw(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // status bar
            Constraint::Min(1),    // event log
            Constraint::Length(1), // help bar
        ])
        .split(frame.area());

    // ── Status bar ──────────────────────────────────────────────
    let area = frame.area();
    let status_text = format!(
        " {}x{} | {} received | {} keys, {} mouse, {} resize | {} ignored",
        area.width,
        area.height,
        app.received,
        app.count(EventType::Key),
        app.count(EventType::Mouse),
        app.count(EventType::Resize),
        app.ignored,
    );
    let status_bar = Paragraph::new(Line::from(vec![Span::styled(
        status_text,
        Style::default()
            .fg(Color::Black)
            .bg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )]))
    .style(Style::default().bg(Color::Cyan));
    frame.render_widget(status_bar, chunks[0]);

    // ── Event log ───────────────────────────────────────────────
    // Newest at the bottom; minus 2 rows for the block borders.
    let visible = chunks[1].height.saturating_sub(2) as usize;
    let skip = app.log.len().saturating_sub(visible);
    let lines: Vec<Line> = app
        .log
        .iter()
        .skip(skip)
        .map(|entry| style_entry(app, entry))
        .collect();

    let log_widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Events ")
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    frame.render_widget(log_widget, chunks[1]);

    // ── Help bar ────────────────────────────────────────────────
    let help = " q / Ctrl-C: quit | c: clear | try Esc, Alt+key, arrows, F-keys, mouse, paste ";
    let help_bar = Paragraph::new(Line::from(Span::styled(
        help,
        Style::default().fg(Color::DarkGray),
    )));
    frame.render_widget(help_bar, chunks[2]);
}

/// Map a logged event to a coloured line.
fn style_entry(app: &App, entry: &LogEntry) -> Line<'static> {
    let millis = entry.at.duration_since(app.started_at).as_millis();
    let prefix = Span::styled(
        format!("{:>6} {:>8}ms  ", entry.seq, millis),
        Style::default().fg(Color::DarkGray),
    );
    let body = match entry.event {
        Event::Key(key) => Span::styled(
            format!("key    {:<16} {key:?}", key.to_string()),
            Style::default().fg(Color::Green),
        ),
        Event::Mouse(mouse) => Span::styled(
            describe_mouse(&mouse),
            Style::default().fg(Color::Cyan),
        ),
        Event::Resize => Span::styled(
            "resize".to_string(),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        Event::None => Span::raw("none"),
    };
    Line::from(vec![prefix, body])
}

fn describe_mouse(mouse: &MouseEvent) -> String {
    format!(
        "mouse  {:?} at ({}, {}) {:?}",
        mouse.button, mouse.x, mouse.y, mouse.modifier
    )
}
