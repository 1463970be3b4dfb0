//! Styled status lines and reply rendering.

use std::io::{self, Write};

use console::Term;

use crate::config::EnvConfig;
use crate::style;
use crate::widgets::{Markdown, MarkdownTheme};

const FALLBACK_WIDTH: usize = 80;

/// Semantic color of a status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Plain,
    Info,
    Success,
    Warning,
    Error,
    Muted,
    Heading,
    User,
    Assistant,
}

#[derive(Debug, Clone)]
pub struct Output {
    styled: bool,
    plain_replies: bool,
    width: Option<usize>,
}

impl Output {
    pub fn new(styled: bool, plain_replies: bool) -> Self {
        Self {
            styled,
            plain_replies,
            width: None,
        }
    }

    /// Styling is on only for a color-capable stdout terminal without `NO_COLOR`.
    pub fn from_env(env: &EnvConfig) -> Self {
        let styled = !env.no_color && Term::stdout().is_term() && console::colors_enabled();
        Self::new(styled, env.plain_replies)
    }

    /// Pins the render width instead of asking the terminal.
    pub fn with_width(mut self, width: usize) -> Self {
        self.width = Some(width.max(1));
        self
    }

    pub fn is_styled(&self) -> bool {
        self.styled
    }

    pub fn width(&self) -> usize {
        self.width.unwrap_or_else(|| match Term::stdout().size_checked() {
            Some((_rows, columns)) if columns > 0 => usize::from(columns),
            _ => FALLBACK_WIDTH,
        })
    }

    pub fn paint(&self, tone: Tone, text: &str) -> String {
        if !self.styled {
            return text.to_string();
        }
        match tone {
            Tone::Plain => text.to_string(),
            Tone::Info => style::cyan(text),
            Tone::Success => style::bold(&style::green(text)),
            Tone::Warning => style::yellow(text),
            Tone::Error => style::bold(&style::red(text)),
            Tone::Muted => style::dim(text),
            Tone::Heading => style::bold(&style::underline(text)),
            Tone::User => style::bold(&style::cyan(text)),
            Tone::Assistant => style::bold(&style::green(text)),
        }
    }

    pub fn markdown_theme(&self) -> MarkdownTheme {
        if self.styled {
            MarkdownTheme::ansi()
        } else {
            MarkdownTheme::plain()
        }
    }

    /// Lines for an assistant reply: rendered Markdown, or the raw text when
    /// plain replies are requested.
    pub fn reply_lines(&self, text: &str) -> Vec<String> {
        if self.plain_replies {
            return text.lines().map(str::to_string).collect();
        }
        Markdown::new(text, self.markdown_theme()).render(self.width())
    }

    /// Writes one status line to stdout.
    pub fn line(&self, tone: Tone, text: &str) {
        println!("{}", self.paint(tone, text));
    }

    /// Writes a status line to stderr, keeping stdout for results.
    pub fn notice(&self, tone: Tone, text: &str) {
        eprintln!("{}", self.paint(tone, text));
    }

    /// Writes text without a newline and flushes.
    pub fn inline(&self, tone: Tone, text: &str) {
        let mut stdout = io::stdout();
        let _ = write!(stdout, "{}", self.paint(tone, text));
        let _ = stdout.flush();
    }

    pub fn blank(&self) {
        println!();
    }

    pub fn reply(&self, text: &str) {
        for line in self.reply_lines(text) {
            println!("{line}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Output, Tone};

    #[test]
    fn unstyled_output_leaves_text_untouched() {
        let output = Output::new(false, false);
        for tone in [Tone::Info, Tone::Error, Tone::Heading, Tone::User] {
            assert_eq!(output.paint(tone, "hello"), "hello");
        }
    }

    #[test]
    fn styled_output_wraps_with_escape_sequences() {
        let output = Output::new(true, false);
        assert_eq!(output.paint(Tone::Warning, "careful"), "\x1b[33mcareful\x1b[39m");
        assert_eq!(output.paint(Tone::Plain, "as is"), "as is");
        assert_eq!(crate::visible_width(&output.paint(Tone::Error, "boom")), 4);
    }

    #[test]
    fn reply_lines_render_markdown_unless_plain() {
        let rendered = Output::new(false, false).with_width(40);
        assert_eq!(
            rendered.reply_lines("# Title\n\n- a\n- b"),
            vec![
                "Title".to_string(),
                String::new(),
                "- a".to_string(),
                "- b".to_string(),
            ]
        );

        let plain = Output::new(false, true).with_width(40);
        assert_eq!(
            plain.reply_lines("# Title\n- a"),
            vec!["# Title".to_string(), "- a".to_string()]
        );
    }

    #[test]
    fn pinned_width_is_used() {
        assert_eq!(Output::new(false, false).with_width(33).width(), 33);
        assert_eq!(Output::new(false, false).with_width(0).width(), 1);
    }
}
