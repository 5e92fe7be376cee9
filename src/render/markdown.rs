//! Markdown to render tree.
//!
//! Handles paragraphs, bold, italic, inline code, bulleted and numbered lists,
//! and fenced code blocks. Other constructs are folded into those: headings
//! become bold paragraphs, blockquotes are flattened, links and images keep
//! only their text, raw HTML is shown literally and rules are dropped.

use pulldown_cmark::{CodeBlockKind, Event, Parser, Tag, TagEnd};

use super::highlight::CodeHighlighter;
use super::tree::{Block, Inline, List};

/// Parse `text` into blocks, highlighting tagged code with `highlighter`.
pub fn parse_markdown(text: &str, highlighter: &CodeHighlighter) -> Vec<Block> {
    let mut builder = TreeBuilder::new(highlighter);
    for event in Parser::new(text) {
        builder.push(event);
    }
    builder.finish()
}

/// Language tag of a fence info string.
///
/// Only the leading word characters count, so `c++` is tagged `c` and an
/// info string starting with punctuation has no language.
pub fn language_tag(info: &str) -> Option<String> {
    let word = info.split_whitespace().next()?;
    let tag: String = word
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();
    (!tag.is_empty()).then_some(tag)
}

enum Container {
    Blocks(Vec<Block>),
    List {
        start: Option<u64>,
        items: Vec<Vec<Block>>,
    },
}

#[derive(Clone, Copy)]
enum Frame {
    Paragraph,
    Strong,
    Emphasis,
}

struct Fence {
    language: Option<String>,
    code: String,
}

struct TreeBuilder<'h> {
    highlighter: &'h CodeHighlighter,
    containers: Vec<Container>,
    /// Open inline frames; non-empty while a paragraph is open
    inlines: Vec<(Frame, Vec<Inline>)>,
    fence: Option<Fence>,
    /// Raw lines of the HTML block being read
    html: Option<String>,
}

impl<'h> TreeBuilder<'h> {
    fn new(highlighter: &'h CodeHighlighter) -> Self {
        Self {
            highlighter,
            containers: vec![Container::Blocks(Vec::new())],
            inlines: Vec::new(),
            fence: None,
            html: None,
        }
    }

    fn push(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => match tag {
                Tag::Paragraph => {
                    self.flush_paragraph();
                    self.open_paragraph();
                }
                Tag::Heading { .. } => {
                    self.flush_paragraph();
                    self.open_paragraph();
                    self.inlines.push((Frame::Strong, Vec::new()));
                }
                Tag::List(start) => {
                    self.flush_paragraph();
                    self.containers.push(Container::List {
                        start,
                        items: Vec::new(),
                    });
                }
                Tag::Item => {
                    self.flush_paragraph();
                    self.containers.push(Container::Blocks(Vec::new()));
                }
                Tag::CodeBlock(kind) => {
                    self.flush_paragraph();
                    let language = match kind {
                        CodeBlockKind::Fenced(info) => language_tag(&info),
                        CodeBlockKind::Indented => None,
                    };
                    self.fence = Some(Fence {
                        language,
                        code: String::new(),
                    });
                }
                Tag::HtmlBlock => {
                    self.flush_paragraph();
                    self.html = Some(String::new());
                }
                Tag::Emphasis => {
                    self.open_paragraph();
                    self.inlines.push((Frame::Emphasis, Vec::new()));
                }
                Tag::Strong => {
                    self.open_paragraph();
                    self.inlines.push((Frame::Strong, Vec::new()));
                }
                _ => {}
            },
            Event::End(tag_end) => match tag_end {
                TagEnd::Paragraph => self.flush_paragraph(),
                TagEnd::Heading(_) => {
                    self.close_frame();
                    self.flush_paragraph();
                }
                TagEnd::Item => {
                    self.flush_paragraph();
                    self.close_item();
                }
                TagEnd::List(_) => {
                    self.flush_paragraph();
                    self.close_list();
                }
                TagEnd::CodeBlock => self.close_fence(),
                TagEnd::HtmlBlock => self.close_html(),
                TagEnd::Emphasis | TagEnd::Strong => self.close_frame(),
                _ => {}
            },
            Event::Text(text) => match self.fence.as_mut() {
                Some(fence) => fence.code.push_str(&text),
                None => self.push_text(&text),
            },
            Event::Code(code) => self.push_inline(Inline::Code(code.to_string())),
            Event::Html(html) => match (self.fence.as_mut(), self.html.as_mut()) {
                (Some(fence), _) => fence.code.push_str(&html),
                (None, Some(block)) => block.push_str(&html),
                (None, None) => self.push_text(html.trim_end_matches('\n')),
            },
            Event::InlineHtml(html) => self.push_text(&html),
            Event::SoftBreak => self.push_text(" "),
            Event::HardBreak => self.push_inline(Inline::LineBreak),
            _ => {}
        }
    }

    fn finish(mut self) -> Vec<Block> {
        self.close_fence();
        self.close_html();
        self.flush_paragraph();
        while self.containers.len() > 1 {
            match self.containers.last() {
                Some(Container::List { .. }) => self.close_list(),
                _ => self.close_item(),
            }
        }
        match self.containers.pop() {
            Some(Container::Blocks(blocks)) => blocks,
            _ => Vec::new(),
        }
    }

    fn open_paragraph(&mut self) {
        if self.inlines.is_empty() {
            self.inlines.push((Frame::Paragraph, Vec::new()));
        }
    }

    fn push_inline(&mut self, inline: Inline) {
        self.open_paragraph();
        if let Some((_, children)) = self.inlines.last_mut() {
            children.push(inline);
        }
    }

    fn push_text(&mut self, text: &str) {
        self.open_paragraph();
        if let Some((_, children)) = self.inlines.last_mut() {
            match children.last_mut() {
                Some(Inline::Text(prev)) => prev.push_str(text),
                _ => children.push(Inline::text(text)),
            }
        }
    }

    /// Close the innermost strong/emphasis frame into its parent.
    fn close_frame(&mut self) {
        if self.inlines.len() < 2 {
            return;
        }
        if let Some((frame, children)) = self.inlines.pop() {
            let inline = match frame {
                Frame::Strong => Inline::Strong(children),
                Frame::Emphasis => Inline::Emphasis(children),
                Frame::Paragraph => return,
            };
            if let Some((_, parent)) = self.inlines.last_mut() {
                parent.push(inline);
            }
        }
    }

    fn flush_paragraph(&mut self) {
        while self.inlines.len() > 1 {
            self.close_frame();
        }
        if let Some((_, children)) = self.inlines.pop() {
            if !children.is_empty() {
                self.push_block(Block::Paragraph(children));
            }
        }
    }

    fn push_block(&mut self, block: Block) {
        match self.containers.last_mut() {
            Some(Container::Blocks(blocks)) => blocks.push(block),
            Some(Container::List { items, .. }) => items.push(vec![block]),
            None => self.containers.push(Container::Blocks(vec![block])),
        }
    }

    fn close_item(&mut self) {
        if self.containers.len() < 2 {
            return;
        }
        if let Some(Container::Blocks(item)) = self.containers.pop() {
            match self.containers.last_mut() {
                Some(Container::List { items, .. }) => items.push(item),
                Some(Container::Blocks(blocks)) => blocks.extend(item),
                None => {}
            }
        }
    }

    fn close_list(&mut self) {
        if !matches!(self.containers.last(), Some(Container::List { .. })) {
            return;
        }
        if let Some(Container::List { start, items }) = self.containers.pop() {
            self.push_block(Block::List(List { start, items }));
        }
    }

    fn close_fence(&mut self) {
        let Some(fence) = self.fence.take() else {
            return;
        };
        let code = fence.code.strip_suffix('\n').unwrap_or(&fence.code);
        let block = match fence.language {
            Some(language) => Block::HighlightedCode(self.highlighter.highlight(&language, code)),
            None => Block::PlainCode(code.to_string()),
        };
        self.push_block(block);
    }

    /// Emit the HTML block as a literal paragraph, one line per source line.
    fn close_html(&mut self) {
        let Some(html) = self.html.take() else {
            return;
        };
        let mut children = Vec::new();
        for (i, line) in html.trim_end_matches('\n').split('\n').enumerate() {
            if i > 0 {
                children.push(Inline::LineBreak);
            }
            if !line.is_empty() {
                children.push(Inline::text(line));
            }
        }
        if !children.is_empty() {
            self.push_block(Block::Paragraph(children));
        }
    }
}
