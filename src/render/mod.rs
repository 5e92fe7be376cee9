//! Message rendering.
//!
//! [`MessageRenderer`] turns a message's text into a [`RenderedMessage`]:
//! user text is kept verbatim, assistant text goes through markdown with
//! syntax-highlighted code blocks. The output is UI-neutral; the TUI maps it
//! to styled lines.

mod highlight;
mod markdown;
mod tree;

pub use highlight::{CodeHighlighter, HighlightError, DEFAULT_CODE_THEME};
pub use markdown::{language_tag, parse_markdown};
pub use tree::{Block, Body, CodeSpan, HighlightedCode, Inline, List, RenderedMessage, Rgb};

use crate::chat::Message;

/// Renders message text into display instructions.
///
/// Rendering is pure: the same input always yields the same tree.
#[derive(Default)]
pub struct MessageRenderer {
    highlighter: CodeHighlighter,
}

impl MessageRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Renderer highlighting code with a named bundled theme.
    pub fn with_theme(theme: &str) -> Result<Self, HighlightError> {
        Ok(Self {
            highlighter: CodeHighlighter::with_theme(theme)?,
        })
    }

    /// Render `text`.
    ///
    /// User text is never interpreted as markdown. The timestamp, when given,
    /// is shown as-is under the content.
    pub fn render(
        &self,
        text: &str,
        is_authored_by_user: bool,
        timestamp: Option<&str>,
    ) -> RenderedMessage {
        let body = if is_authored_by_user {
            Body::Literal(text.to_string())
        } else {
            Body::Markdown(parse_markdown(text, &self.highlighter))
        };
        RenderedMessage {
            body,
            is_authored_by_user,
            timestamp: timestamp.map(str::to_string),
        }
    }

    /// Render a conversation message with its timestamp.
    pub fn render_message(&self, message: &Message) -> RenderedMessage {
        self.render(
            message.content(),
            message.is_authored_by_user(),
            Some(message.timestamp()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::demo_transcript;

    #[test]
    fn test_user_text_is_literal() {
        let renderer = MessageRenderer::new();
        let rendered = renderer.render("**bold**", true, None);
        assert_eq!(rendered.body, Body::Literal("**bold**".to_string()));
        assert!(rendered.is_authored_by_user);
        assert_eq!(rendered.timestamp, None);
    }

    #[test]
    fn test_user_code_fence_is_literal() {
        let renderer = MessageRenderer::new();
        let text = "```js\ncode()\n```";
        assert_eq!(renderer.render(text, true, None).plain_text(), text);
    }

    #[test]
    fn test_assistant_markdown_is_parsed() {
        let renderer = MessageRenderer::new();
        let rendered = renderer.render("**bold**", false, Some("10:30 AM"));
        assert_eq!(
            rendered.body,
            Body::Markdown(vec![Block::Paragraph(vec![Inline::Strong(vec![
                Inline::text("bold")
            ])])])
        );
        assert_eq!(rendered.timestamp.as_deref(), Some("10:30 AM"));
    }

    #[test]
    fn test_assistant_code_block_is_highlighted() {
        let renderer = MessageRenderer::new();
        let rendered = renderer.render("```js\ncode()\n```", false, None);
        let Body::Markdown(blocks) = &rendered.body else {
            panic!("expected markdown");
        };
        let Block::HighlightedCode(code) = &blocks[0] else {
            panic!("expected highlighted code, got {:?}", blocks);
        };
        assert_eq!(code.language, "js");
        assert!(code.text().contains("code()"));
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let renderer = MessageRenderer::new();
        let text = "Some *text*\n\n- a\n- b\n\n```rust\nfn f() {}\n```";
        assert_eq!(
            renderer.render(text, false, None),
            renderer.render(text, false, None)
        );
    }

    #[test]
    fn test_demo_transcript_renders() {
        let renderer = MessageRenderer::new();
        let messages = demo_transcript();
        let rendered: Vec<_> = messages.iter().map(|m| renderer.render_message(m)).collect();

        assert!(matches!(rendered[1].body, Body::Literal(_)));
        let Body::Markdown(blocks) = &rendered[2].body else {
            panic!("expected markdown");
        };
        assert!(blocks.iter().any(|b| matches!(
            b,
            Block::HighlightedCode(code) if code.language == "javascript"
        )));
        assert!(rendered.iter().all(|r| r.timestamp.is_some()));
    }

    #[test]
    fn test_unknown_theme_rejected() {
        assert!(MessageRenderer::with_theme("nope").is_err());
    }
}
