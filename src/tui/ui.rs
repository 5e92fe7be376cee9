//! Main UI rendering

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use super::app::TuiApp;
use super::widgets::MessageList;

/// Tallest the input box grows before it scrolls
const MAX_INPUT_LINES: u16 = 5;

/// Render the entire UI
pub fn render(frame: &mut Frame, app: &mut TuiApp) {
    let input_height = (app.input.lines().len() as u16).clamp(1, MAX_INPUT_LINES) + 2;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),            // Header
            Constraint::Min(0),               // Messages
            Constraint::Length(input_height), // Input
        ])
        .split(frame.area());

    render_header(frame, app, chunks[0]);
    render_messages(frame, app, chunks[1]);
    render_input(frame, app, chunks[2]);

    if app.show_help {
        render_help(frame, app, frame.area());
    }
}

fn render_header(frame: &mut Frame, app: &TuiApp, area: Rect) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            app.settings.assistant_name.clone(),
            Style::default()
                .fg(app.theme.text)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(
            app.settings.tagline.clone(),
            Style::default().fg(app.theme.text_muted),
        ),
    ]))
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(app.theme.border)),
    );

    frame.render_widget(header, area);
}

fn render_messages(frame: &mut Frame, app: &mut TuiApp, area: Rect) {
    let typing = app
        .store
        .is_awaiting_response()
        .then(|| app.typing_indicator());
    let message_list =
        MessageList::new(app.store.messages(), &app.rendered, &app.theme).typing(typing);

    frame.render_stateful_widget(message_list, area, &mut app.message_list_state);
}

fn render_input(frame: &mut Frame, app: &mut TuiApp, area: Rect) {
    let awaiting = app.store.is_awaiting_response();
    let (title, border_color) = if awaiting {
        (" Waiting for reply ", app.theme.text_muted)
    } else {
        (" Message ", app.theme.accent)
    };

    app.input.set_block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border_color))
            .title(title),
    );

    frame.render_widget(&app.input, area);
}

fn render_help(frame: &mut Frame, app: &TuiApp, area: Rect) {
    let key = Style::default().fg(app.theme.accent);
    let help_lines = vec![
        Line::from(vec![Span::styled(
            " Keyboard Shortcuts ",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from(""),
        Line::from(vec![
            Span::styled(" Enter       ", key),
            Span::raw("Send message"),
        ]),
        Line::from(vec![
            Span::styled(" Shift+Enter ", key),
            Span::raw("New line (Alt+Enter also works)"),
        ]),
        Line::from(vec![
            Span::styled(" ↑/↓ PgUp/Dn ", key),
            Span::raw("Scroll messages"),
        ]),
        Line::from(vec![
            Span::styled(" F1          ", key),
            Span::raw("Toggle this help"),
        ]),
        Line::from(vec![
            Span::styled(" Esc/Ctrl+C  ", key),
            Span::raw("Quit"),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.accent))
        .title(" Help ");

    let paragraph = Paragraph::new(help_lines)
        .block(block)
        .alignment(Alignment::Left);

    let area = centered_rect(60, 50, area);
    frame.render_widget(Clear, area);
    frame.render_widget(paragraph, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
