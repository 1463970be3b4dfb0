//! Terminal presentation for line-oriented chat clients.
//!
//! Invariant: nothing in this crate writes log records to stdout. Replies and
//! status lines go through [`Output`], diagnostics go through `tracing` on
//! stderr.
//!
//! # Public API Overview
//! - Render assistant replies with [`Markdown`] and a [`MarkdownTheme`].
//! - Print status lines and replies with [`Output`], which honors
//!   [`EnvConfig`] (`NO_COLOR`, `AI_CLI_PLAIN`).
//! - Read interactive input through the [`LineSource`] seam; [`LineReader`]
//!   is the rustyline-backed implementation.
//! - Install the stderr log subscriber with [`logging::init_logging`].

pub mod config;
pub mod line_reader;
pub mod logging;
pub mod output;
pub mod style;
pub mod widgets;

/// Environment switches for terminal presentation.
pub use crate::config::EnvConfig;
/// Interactive input.
pub use crate::line_reader::{LineReader, LineSource, ReadOutcome};
/// Styled status and reply output.
pub use crate::output::{Output, Tone};
/// Markdown rendering.
pub use crate::widgets::{Markdown, MarkdownStyleFn, MarkdownTheme};

/// Visible width helper that ignores ANSI control sequences.
pub fn visible_width(text: &str) -> usize {
    console::measure_text_width(text)
}
