//! Block renderers.

pub mod markdown;

pub use markdown::{Markdown, MarkdownStyleFn, MarkdownTheme};
