//! Syntax highlighting for fenced code blocks.

use syntect::easy::HighlightLines;
use syntect::highlighting::{FontStyle, Style, Theme, ThemeSet};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

use super::tree::{CodeSpan, HighlightedCode, Rgb};

/// Theme used when none is configured.
pub const DEFAULT_CODE_THEME: &str = "base16-ocean.dark";

#[derive(Debug, thiserror::Error)]
pub enum HighlightError {
    #[error("unknown code theme '{name}', available: {available}")]
    UnknownTheme { name: String, available: String },
}

/// Turns code into styled spans using syntect's bundled grammars.
pub struct CodeHighlighter {
    syntax_set: SyntaxSet,
    theme: Theme,
}

impl CodeHighlighter {
    /// Highlighter with the default theme.
    pub fn new() -> Self {
        let mut themes = ThemeSet::load_defaults();
        let theme = themes
            .themes
            .remove(DEFAULT_CODE_THEME)
            .unwrap_or_default();
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme,
        }
    }

    /// Highlighter with a named bundled theme.
    pub fn with_theme(name: &str) -> Result<Self, HighlightError> {
        let mut themes = ThemeSet::load_defaults();
        match themes.themes.remove(name) {
            Some(theme) => Ok(Self {
                syntax_set: SyntaxSet::load_defaults_newlines(),
                theme,
            }),
            None => {
                let mut names: Vec<&String> = themes.themes.keys().collect();
                names.sort();
                Err(HighlightError::UnknownTheme {
                    name: name.to_string(),
                    available: names
                        .iter()
                        .map(|n| n.as_str())
                        .collect::<Vec<_>>()
                        .join(", "),
                })
            }
        }
    }

    /// Whether a grammar exists for the language tag.
    pub fn knows_language(&self, language: &str) -> bool {
        self.find_syntax(language).is_some()
    }

    fn find_syntax(&self, language: &str) -> Option<&syntect::parsing::SyntaxReference> {
        self.syntax_set
            .find_syntax_by_token(language)
            .or_else(|| self.syntax_set.find_syntax_by_extension(language))
    }

    /// Highlight `code` as `language`.
    ///
    /// Languages without a bundled grammar come back as unstyled lines but
    /// keep their label.
    pub fn highlight(&self, language: &str, code: &str) -> HighlightedCode {
        let syntax = self
            .find_syntax(language)
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());
        let mut highlighter = HighlightLines::new(syntax, &self.theme);

        let mut lines = Vec::new();
        for line in LinesWithEndings::from(code) {
            let spans = match highlighter.highlight_line(line, &self.syntax_set) {
                Ok(ranges) => ranges
                    .into_iter()
                    .filter_map(|(style, text)| {
                        let text = text.trim_end_matches(['\n', '\r']);
                        (!text.is_empty()).then(|| to_span(style, text))
                    })
                    .collect(),
                Err(e) => {
                    tracing::debug!(language, "highlighting failed, using plain text: {}", e);
                    vec![CodeSpan::plain(line.trim_end_matches(['\n', '\r']))]
                }
            };
            lines.push(spans);
        }

        HighlightedCode {
            language: language.to_string(),
            lines,
        }
    }
}

impl Default for CodeHighlighter {
    fn default() -> Self {
        Self::new()
    }
}

fn to_span(style: Style, text: &str) -> CodeSpan {
    let fg = style.foreground;
    CodeSpan {
        text: text.to_string(),
        color: Some(Rgb {
            r: fg.r,
            g: fg.g,
            b: fg.b,
        }),
        bold: style.font_style.contains(FontStyle::BOLD),
        italic: style.font_style.contains(FontStyle::ITALIC),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_highlight_keeps_code_text() {
        let highlighter = CodeHighlighter::new();
        let code = highlighter.highlight("js", "function greet(name) {\n  return name;\n}");
        assert_eq!(code.language, "js");
        assert_eq!(code.lines.len(), 3);
        assert_eq!(code.text(), "function greet(name) {\n  return name;\n}");
    }

    #[test]
    fn test_known_language_gets_multiple_colors() {
        let highlighter = CodeHighlighter::new();
        let code = highlighter.highlight("rust", "fn main() { let x = \"hi\"; }");
        let colors: std::collections::HashSet<_> = code.lines[0]
            .iter()
            .filter_map(|span| span.color)
            .collect();
        assert!(colors.len() > 1, "expected token colors, got {:?}", colors);
    }

    #[test]
    fn test_language_lookup() {
        let highlighter = CodeHighlighter::new();
        assert!(highlighter.knows_language("js"));
        assert!(highlighter.knows_language("rust"));
        assert!(highlighter.knows_language("py"));
        assert!(!highlighter.knows_language("definitely-not-a-language"));
    }

    #[test]
    fn test_unknown_language_keeps_label() {
        let highlighter = CodeHighlighter::new();
        let code = highlighter.highlight("klingon", "qapla'");
        assert_eq!(code.language, "klingon");
        assert_eq!(code.text(), "qapla'");
    }

    #[test]
    fn test_empty_lines_survive() {
        let highlighter = CodeHighlighter::new();
        let code = highlighter.highlight("js", "a();\n\nb();");
        assert_eq!(code.lines.len(), 3);
        assert!(code.lines[1].is_empty());
        assert_eq!(code.text(), "a();\n\nb();");
    }

    #[test]
    fn test_unknown_theme_is_an_error() {
        let err = CodeHighlighter::with_theme("no-such-theme").err().unwrap();
        assert!(err.to_string().contains("base16-ocean.dark"));
        assert!(CodeHighlighter::with_theme("InspiredGitHub").is_ok());
    }
}
