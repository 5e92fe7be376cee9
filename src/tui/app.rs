//! Main TUI application state and logic

use std::collections::HashMap;
use std::io::{self, Stdout};
use std::sync::Arc;

use anyhow::{Context, Result};
use crossterm::{
    event::{
        DisableBracketedPaste, EnableBracketedPaste, KeyCode, KeyEvent, KeyModifiers,
        KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use ratatui::Terminal;
use tui_textarea::{CursorMove, Input, TextArea};

use super::event::{AppEvent, EventHandler};
use super::theme::Theme;
use super::ui;
use super::widgets::MessageListState;
use crate::chat::{ConversationReceiver, ConversationStore, Rejection, Reply, Submission};
use crate::config::Settings;
use crate::render::{MessageRenderer, RenderedMessage};
use crate::responder::DemoResponder;

/// Lines moved per PgUp/PgDn
const PAGE_SCROLL: usize = 10;
/// Ticks per typing-indicator dot
const TICKS_PER_DOT: u64 = 4;

/// Raw-mode alternate screen for the lifetime of the value
pub struct TerminalSession {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    enhanced_keys: bool,
}

impl TerminalSession {
    pub fn enter() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;

        // Shift+Enter is only distinguishable with the kitty keyboard
        // protocol; elsewhere Alt+Enter inserts newlines
        let enhanced_keys = crossterm::terminal::supports_keyboard_enhancement().unwrap_or(false);
        if enhanced_keys {
            let _ = execute!(
                stdout,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES)
            );
        }

        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        Ok(Self {
            terminal,
            enhanced_keys,
        })
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        // Restore terminal in reverse order of setup
        if self.enhanced_keys {
            let _ = execute!(self.terminal.backend_mut(), PopKeyboardEnhancementFlags);
        }
        let _ = disable_raw_mode();
        let _ = execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableBracketedPaste
        );
        let _ = self.terminal.show_cursor();
    }
}

/// Main TUI application
pub struct TuiApp {
    pub(crate) settings: Settings,
    pub(crate) theme: Theme,
    pub(crate) store: ConversationStore,
    /// Change notifications from `store`
    observer: ConversationReceiver,
    renderer: MessageRenderer,
    /// Rendered messages by id; messages never change once appended
    pub(crate) rendered: HashMap<String, RenderedMessage>,
    /// Text input area
    pub(crate) input: TextArea<'static>,
    pub(crate) message_list_state: MessageListState,
    pub(crate) show_help: bool,
    should_quit: bool,
    ticks: u64,
}

impl TuiApp {
    /// Build the session: demo transcript loaded, nothing drawn yet.
    ///
    /// Needs a tokio runtime for replies.
    pub fn new(settings: Settings) -> Result<Self> {
        let renderer = MessageRenderer::with_theme(&settings.code_theme)
            .context("setting up code highlighting")?;
        let responder =
            DemoResponder::new(settings.response_delay(), settings.assistant_name.clone());
        let mut store = ConversationStore::new(Arc::new(responder));
        let observer = store.subscribe();
        store.initialize();

        let mut app = Self {
            theme: Theme::dark(),
            input: Self::build_input(&Theme::dark()),
            settings,
            store,
            observer,
            renderer,
            rendered: HashMap::new(),
            message_list_state: MessageListState::default(),
            show_help: false,
            should_quit: false,
            ticks: 0,
        };
        app.sync_with_store();
        Ok(app)
    }

    /// Run the main event loop
    pub async fn run(&mut self, session: &mut TerminalSession) -> Result<()> {
        let mut events = EventHandler::new(self.settings.tick_rate());

        while !self.should_quit {
            session.terminal.draw(|frame| ui::render(frame, self))?;

            tokio::select! {
                Some(reply) = self.store.recv_reply() => {
                    self.on_reply(reply);
                }
                maybe_event = events.next() => {
                    match maybe_event {
                        Some(event) => self.handle_event(event),
                        None => {
                            tracing::warn!("terminal event stream ended");
                            self.should_quit = true;
                        }
                    }
                }
            }
        }

        self.store.shutdown();
        tracing::info!(messages = self.store.messages().len(), "session ended");
        Ok(())
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// "NoAI is typing" with a cycling ellipsis
    pub fn typing_indicator(&self) -> String {
        let dots = 1 + (self.ticks / TICKS_PER_DOT) % 3;
        format!(
            "{} is typing{}",
            self.settings.assistant_name,
            ".".repeat(dots as usize)
        )
    }

    pub(crate) fn on_reply(&mut self, reply: Reply) {
        if self.store.apply_reply(reply) {
            self.sync_with_store();
        }
    }

    /// Catch up with store changes: render new messages, follow the bottom.
    pub(crate) fn sync_with_store(&mut self) {
        for event in self.observer.drain() {
            tracing::trace!(?event, "conversation event");
            if event.changes_messages() {
                self.message_list_state.scroll_to_bottom();
            }
        }

        if self.rendered.len() > self.store.messages().len() {
            self.rendered.clear();
        }
        for message in self.store.messages() {
            if !self.rendered.contains_key(message.id()) {
                self.rendered.insert(
                    message.id().to_string(),
                    self.renderer.render_message(message),
                );
            }
        }
    }

    /// Handle an application event
    pub(crate) fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Key(key) => self.handle_key(key),
            AppEvent::Paste(text) => {
                if !self.store.is_awaiting_response() {
                    self.input.insert_str(&text);
                }
            }
            AppEvent::Resize(..) => {}
            AppEvent::Tick => self.ticks = self.ticks.wrapping_add(1),
        }
    }

    pub(crate) fn handle_key(&mut self, key: KeyEvent) {
        match (key.modifiers, key.code) {
            (KeyModifiers::CONTROL, KeyCode::Char('c')) => {
                self.should_quit = true;
            }
            (_, KeyCode::Esc) => {
                if self.show_help {
                    self.show_help = false;
                } else {
                    self.should_quit = true;
                }
            }
            (_, KeyCode::F(1)) => {
                self.show_help = !self.show_help;
            }
            (_, KeyCode::Up) => self.message_list_state.scroll_up(1),
            (_, KeyCode::Down) => self.message_list_state.scroll_down(1),
            (_, KeyCode::PageUp) => self.message_list_state.scroll_up(PAGE_SCROLL),
            (_, KeyCode::PageDown) => self.message_list_state.scroll_down(PAGE_SCROLL),
            // Input is disabled while a reply is outstanding
            _ if self.store.is_awaiting_response() => {}
            (KeyModifiers::NONE, KeyCode::Enter) => self.send_message(),
            (KeyModifiers::SHIFT, KeyCode::Enter) | (KeyModifiers::ALT, KeyCode::Enter) => {
                self.input.insert_newline();
            }
            _ => {
                self.input.input(Input::from(key));
            }
        }
    }

    fn send_message(&mut self) {
        let content = self.input.lines().join("\n");
        match self.store.submit_user_message(&content) {
            Submission::Accepted { id } => {
                tracing::debug!(%id, "sent");
                self.input = Self::build_input(&self.theme);
                self.sync_with_store();
            }
            Submission::Rejected(Rejection::Empty) => {}
            Submission::Rejected(Rejection::Busy) => {
                tracing::debug!("send ignored while awaiting a reply");
            }
        }
    }

    fn build_input(theme: &Theme) -> TextArea<'static> {
        let mut input = TextArea::default();
        input.set_cursor_line_style(Style::default());
        input.set_cursor_style(Style::default().add_modifier(Modifier::REVERSED));
        input.set_placeholder_text("Type a message...");
        input.set_placeholder_style(Style::default().fg(theme.text_muted));
        input.set_style(Style::default().fg(theme.text).bg(theme.input_background));
        input.move_cursor(CursorMove::End);
        input
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;
    use std::time::Duration;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(app: &mut TuiApp, text: &str) {
        for c in text.chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
    }

    fn screen(app: &mut TuiApp) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 30)).unwrap();
        terminal.draw(|frame| ui::render(frame, app)).unwrap();
        let buffer = terminal.backend().buffer();
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                text.push_str(buffer[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    #[tokio::test]
    async fn test_starts_with_demo_rendered() {
        let app = TuiApp::new(Settings::default()).unwrap();
        assert_eq!(app.store.messages().len(), 5);
        assert_eq!(app.rendered.len(), 5);
        assert!(app.message_list_state.follow);
    }

    #[tokio::test]
    async fn test_unknown_code_theme_fails() {
        let settings = Settings {
            code_theme: "nope".to_string(),
            ..Settings::default()
        };
        assert!(TuiApp::new(settings).is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_enter_sends_and_reply_arrives() {
        let mut app = TuiApp::new(Settings::default()).unwrap();
        type_text(&mut app, "hello");
        app.handle_key(key(KeyCode::Enter));

        assert_eq!(app.store.messages().len(), 6);
        assert!(app.store.is_awaiting_response());
        assert!(app.input.is_empty());
        assert_eq!(app.rendered.len(), 6);

        let reply = tokio::time::timeout(Duration::from_secs(5), app.store.recv_reply())
            .await
            .unwrap()
            .unwrap();
        app.on_reply(reply);

        assert_eq!(app.store.messages().len(), 7);
        assert!(!app.store.is_awaiting_response());
        assert_eq!(app.rendered.len(), 7);
    }

    #[tokio::test(start_paused = true)]
    async fn test_typing_ignored_while_awaiting() {
        let mut app = TuiApp::new(Settings::default()).unwrap();
        type_text(&mut app, "first");
        app.handle_key(key(KeyCode::Enter));

        type_text(&mut app, "second");
        app.handle_key(key(KeyCode::Enter));
        assert!(app.input.is_empty());
        assert_eq!(app.store.messages().len(), 6);
    }

    #[tokio::test(start_paused = true)]
    async fn test_append_returns_to_bottom_after_scroll_up() {
        let mut app = TuiApp::new(Settings::default()).unwrap();
        screen(&mut app);
        app.handle_key(key(KeyCode::PageUp));
        assert!(!app.message_list_state.follow);

        type_text(&mut app, "hi");
        app.handle_key(key(KeyCode::Enter));
        screen(&mut app);
        let state = &app.message_list_state;
        assert!(state.follow);
        assert_eq!(state.offset, state.content_height - state.viewport_height);

        app.handle_key(key(KeyCode::PageUp));
        assert!(!app.message_list_state.follow);
        let reply = tokio::time::timeout(Duration::from_secs(5), app.store.recv_reply())
            .await
            .unwrap()
            .unwrap();
        app.on_reply(reply);
        screen(&mut app);
        let state = &app.message_list_state;
        assert!(state.follow);
        assert_eq!(state.offset, state.content_height - state.viewport_height);
    }

    #[tokio::test(start_paused = true)]
    async fn test_paste_ignored_while_awaiting() {
        let mut app = TuiApp::new(Settings::default()).unwrap();
        app.handle_event(AppEvent::Paste("first".to_string()));
        assert_eq!(app.input.lines(), ["first"]);
        app.handle_key(key(KeyCode::Enter));
        assert!(app.store.is_awaiting_response());

        app.handle_event(AppEvent::Paste("second".to_string()));
        assert!(app.input.is_empty());
        assert_eq!(app.store.messages().len(), 6);
    }

    #[tokio::test]
    async fn test_blank_input_is_not_sent() {
        let mut app = TuiApp::new(Settings::default()).unwrap();
        type_text(&mut app, "   ");
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.store.messages().len(), 5);
        assert!(!app.store.is_awaiting_response());
    }

    #[tokio::test]
    async fn test_alt_enter_inserts_newline() {
        let mut app = TuiApp::new(Settings::default()).unwrap();
        type_text(&mut app, "a");
        app.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::ALT));
        type_text(&mut app, "b");
        assert_eq!(app.input.lines(), ["a", "b"]);
        assert_eq!(app.store.messages().len(), 5);
    }

    #[tokio::test]
    async fn test_escape_closes_help_then_quits() {
        let mut app = TuiApp::new(Settings::default()).unwrap();
        app.handle_key(key(KeyCode::F(1)));
        assert!(app.show_help);
        app.handle_key(key(KeyCode::Esc));
        assert!(!app.show_help);
        assert!(!app.should_quit());
        app.handle_key(key(KeyCode::Esc));
        assert!(app.should_quit());
    }

    #[tokio::test]
    async fn test_ctrl_c_quits() {
        let mut app = TuiApp::new(Settings::default()).unwrap();
        app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit());
    }

    #[tokio::test]
    async fn test_typing_indicator_cycles() {
        let mut app = TuiApp::new(Settings::default()).unwrap();
        assert_eq!(app.typing_indicator(), "NoAI is typing.");
        for _ in 0..TICKS_PER_DOT {
            app.handle_event(AppEvent::Tick);
        }
        assert_eq!(app.typing_indicator(), "NoAI is typing..");
    }

    #[tokio::test]
    async fn test_screen_shows_header_and_messages() {
        let mut app = TuiApp::new(Settings::default()).unwrap();
        let text = screen(&mut app);
        assert!(text.contains("NoAI"));
        assert!(text.contains("Minimalistic Chat Interface"));
        assert!(text.contains("Message"));
        assert!(text.contains("10:32 AM"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_screen_shows_typing_while_awaiting() {
        let mut app = TuiApp::new(Settings::default()).unwrap();
        type_text(&mut app, "hi");
        app.handle_key(key(KeyCode::Enter));
        let text = screen(&mut app);
        assert!(text.contains("NoAI is typing"));
        assert!(text.contains("Waiting for reply"));
    }
}
