//! Render instructions produced from a message.
//!
//! The tree only knows a handful of node kinds. Anything else in the source
//! markdown is folded into these before it gets here.

/// 24-bit foreground color of a highlighted token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// A run of code text sharing one highlight style
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeSpan {
    pub text: String,
    pub color: Option<Rgb>,
    pub bold: bool,
    pub italic: bool,
}

impl CodeSpan {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            color: None,
            bold: false,
            italic: false,
        }
    }
}

/// A fenced code block with a language tag, split into highlighted lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightedCode {
    pub language: String,
    pub lines: Vec<Vec<CodeSpan>>,
}

impl HighlightedCode {
    /// The code with highlighting stripped
    pub fn text(&self) -> String {
        self.lines
            .iter()
            .map(|spans| spans.iter().map(|s| s.text.as_str()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Inline content of a paragraph
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Text(String),
    Strong(Vec<Inline>),
    Emphasis(Vec<Inline>),
    /// Inline code, shown monospace on a muted background
    Code(String),
    LineBreak,
}

impl Inline {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Concatenated visible text
    pub fn plain_text(&self) -> String {
        match self {
            Self::Text(t) | Self::Code(t) => t.clone(),
            Self::Strong(children) | Self::Emphasis(children) => inlines_text(children),
            Self::LineBreak => "\n".to_string(),
        }
    }
}

pub(crate) fn inlines_text(inlines: &[Inline]) -> String {
    inlines.iter().map(Inline::plain_text).collect()
}

/// A bulleted (`start == None`) or numbered list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct List {
    pub start: Option<u64>,
    pub items: Vec<Vec<Block>>,
}

impl List {
    pub fn is_ordered(&self) -> bool {
        self.start.is_some()
    }

    /// Marker shown in front of item `index`
    pub fn marker(&self, index: usize) -> String {
        match self.start {
            Some(start) => format!("{}.", start + index as u64),
            None => "•".to_string(),
        }
    }
}

/// Block-level render instruction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Paragraph(Vec<Inline>),
    List(List),
    HighlightedCode(HighlightedCode),
    /// Code without a language tag
    PlainCode(String),
}

impl Block {
    /// Concatenated visible text, blocks separated by newlines
    pub fn plain_text(&self) -> String {
        match self {
            Self::Paragraph(inlines) => inlines_text(inlines),
            Self::List(list) => list
                .items
                .iter()
                .map(|item| blocks_text(item))
                .collect::<Vec<_>>()
                .join("\n"),
            Self::HighlightedCode(code) => code.text(),
            Self::PlainCode(code) => code.clone(),
        }
    }
}

pub(crate) fn blocks_text(blocks: &[Block]) -> String {
    blocks
        .iter()
        .map(Block::plain_text)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Message content as it should be shown
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    /// Shown exactly as typed
    Literal(String),
    Markdown(Vec<Block>),
}

/// One message bubble
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage {
    pub body: Body,
    pub is_authored_by_user: bool,
    /// Shown under the content, de-emphasized
    pub timestamp: Option<String>,
}

impl RenderedMessage {
    pub fn plain_text(&self) -> String {
        match &self.body {
            Body::Literal(text) => text.clone(),
            Body::Markdown(blocks) => blocks_text(blocks),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_markers() {
        let bullets = List {
            start: None,
            items: vec![],
        };
        assert_eq!(bullets.marker(3), "•");
        assert!(!bullets.is_ordered());

        let numbered = List {
            start: Some(3),
            items: vec![],
        };
        assert_eq!(numbered.marker(0), "3.");
        assert_eq!(numbered.marker(2), "5.");
    }

    #[test]
    fn test_plain_text_flattens_nesting() {
        let para = Block::Paragraph(vec![
            Inline::text("a "),
            Inline::Strong(vec![Inline::text("b "), Inline::Emphasis(vec![Inline::text("c")])]),
            Inline::LineBreak,
            Inline::Code("d".to_string()),
        ]);
        assert_eq!(para.plain_text(), "a b c\nd");
    }

    #[test]
    fn test_highlighted_code_text_joins_lines() {
        let code = HighlightedCode {
            language: "js".to_string(),
            lines: vec![
                vec![CodeSpan::plain("let "), CodeSpan::plain("x;")],
                vec![CodeSpan::plain("x++")],
            ],
        };
        assert_eq!(code.text(), "let x;\nx++");
    }
}
