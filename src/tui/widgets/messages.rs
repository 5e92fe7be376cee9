//! Message list widget: chat bubbles built from rendered messages

use std::collections::HashMap;

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::StatefulWidget,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::chat::Message;
use crate::render::{Block, Body, CodeSpan, Inline, RenderedMessage};
use crate::tui::theme::Theme;

/// Widest a bubble may get, as a share of the list width
const MAX_BUBBLE_PERCENT: usize = 80;
/// Blank columns inside a bubble on each side
const BUBBLE_PADDING: usize = 1;

type StyledLine = Vec<Span<'static>>;

/// State for the message list
#[derive(Debug)]
pub struct MessageListState {
    /// Current scroll offset (in lines)
    pub offset: usize,
    /// Total content height (in lines)
    pub content_height: usize,
    /// Viewport height
    pub viewport_height: usize,
    /// Keep the newest line in view as content grows
    pub follow: bool,
}

impl Default for MessageListState {
    fn default() -> Self {
        Self {
            offset: 0,
            content_height: 0,
            viewport_height: 0,
            follow: true,
        }
    }
}

impl MessageListState {
    fn max_offset(&self) -> usize {
        self.content_height.saturating_sub(self.viewport_height)
    }

    pub fn scroll_up(&mut self, amount: usize) {
        self.offset = self.offset.saturating_sub(amount);
        self.follow = self.offset >= self.max_offset();
    }

    pub fn scroll_down(&mut self, amount: usize) {
        self.offset = (self.offset + amount).min(self.max_offset());
        self.follow = self.offset >= self.max_offset();
    }

    pub fn scroll_to_bottom(&mut self) {
        self.follow = true;
        self.offset = self.max_offset();
    }
}

/// Widget for rendering the message list
pub struct MessageList<'a> {
    messages: &'a [Message],
    rendered: &'a HashMap<String, RenderedMessage>,
    theme: &'a Theme,
    typing: Option<String>,
}

impl<'a> MessageList<'a> {
    /// `rendered` is keyed by message id; messages missing from it are shown
    /// as plain text.
    pub fn new(
        messages: &'a [Message],
        rendered: &'a HashMap<String, RenderedMessage>,
        theme: &'a Theme,
    ) -> Self {
        Self {
            messages,
            rendered,
            theme,
            typing: None,
        }
    }

    /// Show a typing indicator after the last message.
    pub fn typing(mut self, indicator: Option<String>) -> Self {
        self.typing = indicator;
        self
    }

    fn lines(&self, width: usize) -> Vec<Line<'static>> {
        let mut lines = Vec::new();
        for (i, msg) in self.messages.iter().enumerate() {
            if i > 0 {
                lines.push(Line::default());
            }
            let bubble = match self.rendered.get(msg.id()) {
                Some(rendered) => bubble_lines(rendered, msg.is_error(), width, self.theme),
                None => {
                    let fallback = RenderedMessage {
                        body: Body::Literal(msg.content().to_string()),
                        is_authored_by_user: msg.is_authored_by_user(),
                        timestamp: Some(msg.timestamp().to_string()),
                    };
                    bubble_lines(&fallback, msg.is_error(), width, self.theme)
                }
            };
            lines.extend(bubble);
        }

        if let Some(indicator) = &self.typing {
            if !lines.is_empty() {
                lines.push(Line::default());
            }
            let style = Style::default()
                .fg(self.theme.text_muted)
                .bg(self.theme.assistant_bubble)
                .add_modifier(Modifier::ITALIC);
            let pad = " ".repeat(BUBBLE_PADDING);
            lines.push(Line::from(vec![
                Span::styled(pad.clone(), style),
                Span::styled(indicator.clone(), style),
                Span::styled(pad, style),
            ]));
        }
        lines
    }
}

impl StatefulWidget for MessageList<'_> {
    type State = MessageListState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let lines = self.lines(area.width as usize);

        state.content_height = lines.len();
        state.viewport_height = area.height as usize;
        state.offset = if state.follow {
            state.max_offset()
        } else {
            state.offset.min(state.max_offset())
        };

        for (row, line) in lines
            .iter()
            .skip(state.offset)
            .take(area.height as usize)
            .enumerate()
        {
            buf.set_line(area.x, area.y + row as u16, line, area.width);
        }
    }
}

/// Lay out one message as a bubble `width` columns wide at most.
///
/// User bubbles hug the right edge, assistant bubbles the left. A bubble is
/// as wide as its content, capped at 80% of `width`. The timestamp, when
/// present, is the last line.
pub fn bubble_lines(
    rendered: &RenderedMessage,
    is_error: bool,
    width: usize,
    theme: &Theme,
) -> Vec<Line<'static>> {
    let padding = BUBBLE_PADDING * 2;
    let max_bubble = (width * MAX_BUBBLE_PERCENT / 100)
        .max(padding + 1)
        .min(width.max(padding + 1));
    let content_max = max_bubble - padding;

    let (bg, fg) = if rendered.is_authored_by_user {
        (theme.user_bubble, theme.user_text)
    } else {
        (theme.assistant_bubble, theme.text)
    };
    let base = Style::default()
        .fg(if is_error { theme.error } else { fg })
        .bg(bg);

    let mut content = match &rendered.body {
        Body::Literal(text) => text
            .split('\n')
            .flat_map(|line| textwrap::wrap(line, content_max))
            .map(|line| vec![Span::styled(line.into_owned(), base)])
            .collect(),
        Body::Markdown(blocks) => block_lines(blocks, content_max, base, theme, true),
    };
    if let Some(timestamp) = &rendered.timestamp {
        content.push(vec![Span::styled(
            timestamp.clone(),
            base.fg(theme.text_muted),
        )]);
    }

    let inner = content
        .iter()
        .map(|spans| spans_width(spans))
        .max()
        .unwrap_or(0)
        .min(content_max);
    let indent = if rendered.is_authored_by_user {
        width.saturating_sub(inner + padding)
    } else {
        0
    };

    content
        .into_iter()
        .map(|spans| {
            let fill = inner.saturating_sub(spans_width(&spans)) + BUBBLE_PADDING;
            let mut out = Vec::with_capacity(spans.len() + 3);
            if indent > 0 {
                out.push(Span::raw(" ".repeat(indent)));
            }
            out.push(Span::styled(" ".repeat(BUBBLE_PADDING), base));
            out.extend(spans);
            out.push(Span::styled(" ".repeat(fill), base));
            Line::from(out)
        })
        .collect()
}

fn block_lines(
    blocks: &[Block],
    width: usize,
    base: Style,
    theme: &Theme,
    spaced: bool,
) -> Vec<StyledLine> {
    let mut lines = Vec::new();
    for (i, block) in blocks.iter().enumerate() {
        if spaced && i > 0 {
            lines.push(Vec::new());
        }
        match block {
            Block::Paragraph(inlines) => {
                let mut pieces = Vec::new();
                inline_pieces(inlines, base, theme, &mut pieces);
                lines.extend(wrap_pieces(&pieces, width));
            }
            Block::List(list) => {
                for (index, item) in list.items.iter().enumerate() {
                    let marker = format!("{} ", list.marker(index));
                    let indent = marker.width();
                    let item_width = width.saturating_sub(indent).max(1);
                    let item_lines = block_lines(item, item_width, base, theme, false);
                    for (n, mut line) in item_lines.into_iter().enumerate() {
                        let prefix = if n == 0 {
                            Span::styled(marker.clone(), base.fg(theme.text_muted))
                        } else {
                            Span::styled(" ".repeat(indent), base)
                        };
                        line.insert(0, prefix);
                        lines.push(line);
                    }
                }
            }
            Block::HighlightedCode(code) => {
                lines.push(vec![Span::styled(
                    code.language.clone(),
                    base.fg(theme.text_muted).add_modifier(Modifier::ITALIC),
                )]);
                lines.extend(code_lines(&code.lines, width, theme));
            }
            Block::PlainCode(code) => {
                let code: Vec<Vec<CodeSpan>> = code
                    .split('\n')
                    .map(|line| vec![CodeSpan::plain(line)])
                    .collect();
                lines.extend(code_lines(&code, width, theme));
            }
        }
    }
    lines
}

/// Code keeps its whitespace and is hard-wrapped, padded to a box.
fn code_lines(code: &[Vec<CodeSpan>], width: usize, theme: &Theme) -> Vec<StyledLine> {
    let base = Style::default()
        .fg(theme.text)
        .bg(theme.code_background);
    let mut lines = Vec::new();
    for spans in code {
        let mut line: StyledLine = Vec::new();
        let mut used = 0;
        for span in spans {
            let style = code_style(span, base);
            for ch in span.text.chars() {
                let w = ch.width().unwrap_or(0);
                if used + w > width && used > 0 {
                    lines.push(std::mem::take(&mut line));
                    used = 0;
                }
                push_span(&mut line, &ch.to_string(), style);
                used += w;
            }
        }
        lines.push(line);
    }

    let box_width = lines.iter().map(|l| spans_width(l)).max().unwrap_or(0);
    for line in &mut lines {
        let fill = box_width - spans_width(line);
        if fill > 0 {
            line.push(Span::styled(" ".repeat(fill), base));
        }
    }
    lines
}

fn code_style(span: &CodeSpan, base: Style) -> Style {
    let mut style = base;
    if let Some(c) = span.color {
        style = style.fg(Color::Rgb(c.r, c.g, c.b));
    }
    if span.bold {
        style = style.add_modifier(Modifier::BOLD);
    }
    if span.italic {
        style = style.add_modifier(Modifier::ITALIC);
    }
    style
}

enum Piece {
    Text(String, Style),
    Break,
}

fn push_text(pieces: &mut Vec<Piece>, text: &str, style: Style) {
    for (i, segment) in text.split('\n').enumerate() {
        if i > 0 {
            pieces.push(Piece::Break);
        }
        if !segment.is_empty() {
            pieces.push(Piece::Text(segment.to_string(), style));
        }
    }
}

fn inline_pieces(inlines: &[Inline], style: Style, theme: &Theme, out: &mut Vec<Piece>) {
    for inline in inlines {
        match inline {
            Inline::Text(text) => push_text(out, text, style),
            Inline::Strong(children) => {
                inline_pieces(children, style.add_modifier(Modifier::BOLD), theme, out)
            }
            Inline::Emphasis(children) => {
                inline_pieces(children, style.add_modifier(Modifier::ITALIC), theme, out)
            }
            Inline::Code(code) => push_text(out, code, style.bg(theme.inline_code_background)),
            Inline::LineBreak => out.push(Piece::Break),
        }
    }
}

/// Greedy word wrap that keeps each word's style.
fn wrap_pieces(pieces: &[Piece], width: usize) -> Vec<StyledLine> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut line: StyledLine = Vec::new();
    let mut used = 0;

    for piece in pieces {
        let (text, style) = match piece {
            Piece::Break => {
                trim_trailing_space(&mut line);
                lines.push(std::mem::take(&mut line));
                used = 0;
                continue;
            }
            Piece::Text(text, style) => (text, *style),
        };

        for token in split_words(text) {
            let w = token.width();
            if token.chars().all(char::is_whitespace) {
                if used == 0 {
                    continue;
                }
                if used + w > width {
                    trim_trailing_space(&mut line);
                    lines.push(std::mem::take(&mut line));
                    used = 0;
                } else {
                    push_span(&mut line, token, style);
                    used += w;
                }
                continue;
            }

            if used + w > width && used > 0 {
                trim_trailing_space(&mut line);
                lines.push(std::mem::take(&mut line));
                used = 0;
            }
            if w <= width {
                push_span(&mut line, token, style);
                used += w;
                continue;
            }
            for ch in token.chars() {
                let cw = ch.width().unwrap_or(0);
                if used + cw > width && used > 0 {
                    lines.push(std::mem::take(&mut line));
                    used = 0;
                }
                push_span(&mut line, &ch.to_string(), style);
                used += cw;
            }
        }
    }

    if !line.is_empty() || lines.is_empty() {
        trim_trailing_space(&mut line);
        lines.push(line);
    }
    lines
}

/// Split into alternating runs of whitespace and non-whitespace.
fn split_words(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start = 0;
    let mut prev_space = None;
    for (i, ch) in text.char_indices() {
        let space = ch.is_whitespace();
        if prev_space.is_some_and(|prev| prev != space) {
            tokens.push(&text[start..i]);
            start = i;
        }
        prev_space = Some(space);
    }
    if start < text.len() {
        tokens.push(&text[start..]);
    }
    tokens
}

fn push_span(line: &mut StyledLine, text: &str, style: Style) {
    if let Some(last) = line.last_mut() {
        if last.style == style {
            last.content.to_mut().push_str(text);
            return;
        }
    }
    line.push(Span::styled(text.to_string(), style));
}

fn trim_trailing_space(line: &mut StyledLine) {
    while let Some(last) = line.last_mut() {
        let trimmed = last.content.trim_end().len();
        if trimmed > 0 {
            last.content.to_mut().truncate(trimmed);
            return;
        }
        line.pop();
    }
}

fn spans_width(spans: &[Span<'_>]) -> usize {
    spans.iter().map(|s| s.content.width()).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::MessageRenderer;

    fn line_text(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    fn plain_lines(lines: &[StyledLine]) -> Vec<String> {
        lines
            .iter()
            .map(|l| l.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    fn buffer_rows(buf: &Buffer) -> Vec<String> {
        (0..buf.area.height)
            .map(|y| {
                (0..buf.area.width)
                    .map(|x| buf[(x, y)].symbol().to_string())
                    .collect::<String>()
            })
            .collect()
    }

    #[test]
    fn test_wrap_breaks_on_words() {
        let mut pieces = Vec::new();
        push_text(&mut pieces, "the quick brown fox", Style::default());
        assert_eq!(
            plain_lines(&wrap_pieces(&pieces, 10)),
            vec!["the quick", "brown fox"]
        );
    }

    #[test]
    fn test_wrap_splits_long_words() {
        let mut pieces = Vec::new();
        push_text(&mut pieces, "abcdefghij", Style::default());
        assert_eq!(plain_lines(&wrap_pieces(&pieces, 4)), vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn test_wrap_keeps_styles_and_breaks() {
        let bold = Style::default().add_modifier(Modifier::BOLD);
        let pieces = vec![
            Piece::Text("plain ".to_string(), Style::default()),
            Piece::Text("bold".to_string(), bold),
            Piece::Break,
            Piece::Text("next".to_string(), Style::default()),
        ];
        let lines = wrap_pieces(&pieces, 40);
        assert_eq!(plain_lines(&lines), vec!["plain bold", "next"]);
        assert_eq!(lines[0][1].style, bold);
    }

    #[test]
    fn test_split_words() {
        assert_eq!(split_words("a  bc d"), vec!["a", "  ", "bc", " ", "d"]);
        assert!(split_words("").is_empty());
    }

    #[test]
    fn test_user_bubble_is_right_aligned() {
        let theme = Theme::dark();
        let renderer = MessageRenderer::new();
        let rendered = renderer.render("**hi**", true, Some("10:31 AM"));
        let lines = bubble_lines(&rendered, false, 40, &theme);

        assert_eq!(lines.len(), 2);
        for line in &lines {
            assert_eq!(line.width(), 40);
        }
        assert!(line_text(&lines[0]).ends_with(" **hi**   "));
        assert!(line_text(&lines[1]).ends_with(" 10:31 AM "));
    }

    #[test]
    fn test_assistant_bubble_is_left_aligned_and_capped() {
        let theme = Theme::dark();
        let renderer = MessageRenderer::new();
        let long = "word ".repeat(40);
        let rendered = renderer.render(&long, false, None);
        let lines = bubble_lines(&rendered, false, 50, &theme);

        assert!(lines.len() > 1);
        for line in &lines {
            assert!(line.width() <= 40, "line too wide: {}", line.width());
            assert!(line_text(line).starts_with(" word"));
        }
    }

    #[test]
    fn test_markdown_blocks_layout() {
        let theme = Theme::dark();
        let renderer = MessageRenderer::new();
        let rendered = renderer.render(
            "Intro\n\n- one\n- two\n\n```js\ncode()\n```",
            false,
            None,
        );
        let texts: Vec<String> = bubble_lines(&rendered, false, 60, &theme)
            .iter()
            .map(|l| line_text(l).trim_end().to_string())
            .collect();
        assert_eq!(
            texts,
            vec![" Intro", "", " • one", " • two", "", " js", " code()"]
        );
    }

    #[test]
    fn test_error_message_uses_error_color() {
        let theme = Theme::dark();
        let renderer = MessageRenderer::new();
        let rendered = renderer.render("Error: boom", false, None);
        let lines = bubble_lines(&rendered, true, 60, &theme);
        let word = lines[0]
            .spans
            .iter()
            .find(|s| s.content.contains("boom"))
            .unwrap();
        assert_eq!(word.style.fg, Some(theme.error));
    }

    #[test]
    fn test_scroll_state() {
        let mut state = MessageListState {
            content_height: 50,
            viewport_height: 10,
            ..Default::default()
        };
        state.scroll_to_bottom();
        assert_eq!(state.offset, 40);

        state.scroll_up(5);
        assert_eq!(state.offset, 35);
        assert!(!state.follow);

        state.scroll_down(100);
        assert_eq!(state.offset, 40);
        assert!(state.follow);

        state.scroll_up(100);
        assert_eq!(state.offset, 0);
    }

    #[test]
    fn test_list_follows_bottom_and_shows_typing() {
        let theme = Theme::dark();
        let renderer = MessageRenderer::new();
        let messages = crate::chat::demo_transcript();
        let rendered: HashMap<_, _> = messages
            .iter()
            .map(|m| (m.id().to_string(), renderer.render_message(m)))
            .collect();

        let area = Rect::new(0, 0, 60, 8);
        let mut buf = Buffer::empty(area);
        let mut state = MessageListState::default();
        MessageList::new(&messages, &rendered, &theme)
            .typing(Some("NoAI is typing...".to_string()))
            .render(area, &mut buf, &mut state);

        assert!(state.content_height > 8);
        assert_eq!(state.offset, state.content_height - 8);
        let rows = buffer_rows(&buf);
        assert!(rows[7].contains("NoAI is typing..."), "{:?}", rows);
    }

    #[test]
    fn test_list_falls_back_to_plain_text() {
        let theme = Theme::dark();
        let messages = vec![Message::assistant("1", "**raw**", "10:30 AM")];
        let rendered = HashMap::new();

        let area = Rect::new(0, 0, 40, 4);
        let mut buf = Buffer::empty(area);
        let mut state = MessageListState::default();
        MessageList::new(&messages, &rendered, &theme).render(area, &mut buf, &mut state);

        let rows = buffer_rows(&buf);
        assert!(rows[0].contains("**raw**"));
        assert!(rows[1].contains("10:30 AM"));
    }
}
