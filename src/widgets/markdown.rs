//! Markdown to styled terminal lines.
//!
//! Output is one `String` per terminal row with styles applied through the
//! [`MarkdownTheme`] closures. Lines are not wrapped; the terminal soft-wraps
//! anything wider than the viewport. Only tables and rules consult the width.

use markdown::{mdast, to_mdast, ParseOptions};

use crate::style;
use crate::visible_width;

pub type MarkdownStyleFn = Box<dyn Fn(&str) -> String + Send + Sync>;

pub struct MarkdownTheme {
    pub heading: MarkdownStyleFn,
    pub link: MarkdownStyleFn,
    pub link_url: MarkdownStyleFn,
    pub code: MarkdownStyleFn,
    pub code_block: MarkdownStyleFn,
    pub code_block_border: MarkdownStyleFn,
    pub quote: MarkdownStyleFn,
    pub quote_border: MarkdownStyleFn,
    pub hr: MarkdownStyleFn,
    pub list_bullet: MarkdownStyleFn,
    pub bold: MarkdownStyleFn,
    pub italic: MarkdownStyleFn,
    pub strikethrough: MarkdownStyleFn,
    pub underline: MarkdownStyleFn,
    pub code_block_indent: Option<String>,
}

fn identity(text: &str) -> String {
    text.to_string()
}

impl MarkdownTheme {
    /// Structure only, no escape sequences.
    pub fn plain() -> Self {
        Self {
            heading: Box::new(identity),
            link: Box::new(identity),
            link_url: Box::new(identity),
            code: Box::new(identity),
            code_block: Box::new(identity),
            code_block_border: Box::new(identity),
            quote: Box::new(identity),
            quote_border: Box::new(identity),
            hr: Box::new(identity),
            list_bullet: Box::new(identity),
            bold: Box::new(identity),
            italic: Box::new(identity),
            strikethrough: Box::new(identity),
            underline: Box::new(identity),
            code_block_indent: None,
        }
    }

    pub fn ansi() -> Self {
        Self {
            heading: Box::new(style::cyan),
            link: Box::new(style::blue),
            link_url: Box::new(style::dim),
            code: Box::new(style::yellow),
            code_block: Box::new(style::green),
            code_block_border: Box::new(style::dim),
            quote: Box::new(style::italic),
            quote_border: Box::new(style::dim),
            hr: Box::new(style::dim),
            list_bullet: Box::new(style::cyan),
            bold: Box::new(style::bold),
            italic: Box::new(style::italic),
            strikethrough: Box::new(style::strikethrough),
            underline: Box::new(style::underline),
            code_block_indent: None,
        }
    }
}

#[derive(Clone, Copy)]
enum InlineStyleKind {
    Default,
    Quote,
}

/// A list item row, either the item's own content or a row of a nested list
/// that already carries its own indentation and bullet.
enum ItemLine {
    Own(String),
    Nested(String),
}

pub struct Markdown {
    text: String,
    theme: MarkdownTheme,
}

impl Markdown {
    pub fn new(text: impl Into<String>, theme: MarkdownTheme) -> Self {
        Self {
            text: text.into(),
            theme,
        }
    }

    /// Renders the text for a viewport `width` columns wide.
    ///
    /// Blank input renders to no lines. Trailing blank lines are dropped.
    pub fn render(&self, width: usize) -> Vec<String> {
        let width = width.max(1);
        if self.text.trim().is_empty() {
            return Vec::new();
        }

        let normalized_text = self.text.replace('\t', "   ");
        let root = match to_mdast(&normalized_text, &ParseOptions::gfm()) {
            Ok(node) => node,
            Err(_) => mdast::Node::Text(mdast::Text {
                value: normalized_text.clone(),
                position: None,
            }),
        };

        let nodes = match root {
            mdast::Node::Root(root) => root.children,
            other => vec![other],
        };

        let mut rendered_lines = Vec::new();
        for idx in 0..nodes.len() {
            let node = &nodes[idx];
            let next_node = nodes.get(idx + 1);
            let next_is_list = matches!(next_node, Some(mdast::Node::List(_)));
            let has_next = next_node.is_some();

            let space_after = match (node_position(node), next_node.and_then(node_position)) {
                (Some((end, _)), Some((_, next_start))) => {
                    has_blank_line_between(&normalized_text, end, next_start)
                }
                _ => false,
            };

            let raw = raw_slice_between(node, &normalized_text);
            let mut lines = self.render_node(
                node,
                width,
                next_is_list,
                has_next,
                space_after,
                raw.as_deref(),
            );
            rendered_lines.append(&mut lines);

            if space_after {
                rendered_lines.push(String::new());
            }
        }

        let mut lines: Vec<String> = rendered_lines
            .iter()
            .flat_map(|line| line.split('\n').map(str::to_string))
            .collect();
        while lines.last().is_some_and(|line| line.is_empty()) {
            lines.pop();
        }
        lines
    }

    fn apply_inline_style(&self, text: &str, kind: InlineStyleKind) -> String {
        match kind {
            InlineStyleKind::Default => text.to_string(),
            InlineStyleKind::Quote => (self.theme.quote)(&(self.theme.italic)(text)),
        }
    }

    fn apply_inline_style_with_newlines(&self, text: &str, kind: InlineStyleKind) -> String {
        text.split('\n')
            .map(|segment| self.apply_inline_style(segment, kind))
            .collect::<Vec<String>>()
            .join("\n")
    }

    fn render_inline_nodes(&self, nodes: &[mdast::Node], kind: InlineStyleKind) -> String {
        let mut result = String::new();

        for node in nodes {
            match node {
                mdast::Node::Text(text) => {
                    result.push_str(&self.apply_inline_style_with_newlines(&text.value, kind));
                }
                mdast::Node::Paragraph(paragraph) => {
                    result.push_str(&self.render_inline_nodes(&paragraph.children, kind));
                }
                mdast::Node::Strong(strong) => {
                    let content = self.render_inline_nodes(&strong.children, kind);
                    result.push_str(&(self.theme.bold)(&content));
                }
                mdast::Node::Emphasis(emphasis) => {
                    let content = self.render_inline_nodes(&emphasis.children, kind);
                    result.push_str(&(self.theme.italic)(&content));
                }
                mdast::Node::Delete(delete) => {
                    let content = self.render_inline_nodes(&delete.children, kind);
                    result.push_str(&(self.theme.strikethrough)(&content));
                }
                mdast::Node::InlineCode(code) => {
                    result.push_str(&(self.theme.code)(&code.value));
                }
                mdast::Node::Link(link) => {
                    let link_text = self.render_inline_nodes(&link.children, kind);
                    let link_text_plain = plain_text_from_nodes(&link.children);
                    let href = link.url.as_str();
                    let href_cmp = href.strip_prefix("mailto:").unwrap_or(href);
                    result.push_str(&(self.theme.link)(&(self.theme.underline)(&link_text)));
                    if link_text_plain != href && link_text_plain != href_cmp {
                        result.push_str(&(self.theme.link_url)(&format!(" ({href})")));
                    }
                }
                mdast::Node::Break(_) => {
                    result.push('\n');
                }
                mdast::Node::Html(html) => {
                    result.push_str(&self.apply_inline_style_with_newlines(&html.value, kind));
                }
                mdast::Node::Image(image) => {
                    let alt = if image.alt.is_empty() {
                        image.url.as_str()
                    } else {
                        image.alt.as_str()
                    };
                    result.push_str(&self.apply_inline_style_with_newlines(alt, kind));
                }
                mdast::Node::InlineMath(math) => {
                    result.push_str(&self.apply_inline_style_with_newlines(&math.value, kind));
                }
                mdast::Node::Math(math) => {
                    result.push_str(&self.apply_inline_style_with_newlines(&math.value, kind));
                }
                _ => {}
            }
        }

        result
    }

    fn render_code_block(&self, code: &mdast::Code) -> Vec<String> {
        let indent = self.theme.code_block_indent.as_deref().unwrap_or("  ");
        let mut lines = Vec::new();
        lines.push((self.theme.code_block_border)(&format!(
            "```{}",
            code.lang.as_deref().unwrap_or_default()
        )));
        for line in code.value.split('\n') {
            lines.push(format!("{indent}{}", (self.theme.code_block)(line)));
        }
        lines.push((self.theme.code_block_border)("```"));
        lines
    }

    fn render_list(&self, list: &mdast::List, depth: usize) -> Vec<String> {
        let mut lines = Vec::new();
        let indent = "  ".repeat(depth);
        let start_number = list.start.unwrap_or(1);

        for (i, node) in list.children.iter().enumerate() {
            let mdast::Node::ListItem(item) = node else {
                continue;
            };
            let bullet = if list.ordered {
                format!("{}. ", start_number + i as u32)
            } else {
                "- ".to_string()
            };
            let task = match item.checked {
                Some(true) => "[x] ",
                Some(false) => "[ ] ",
                None => "",
            };
            let marker = format!("{indent}{}{task}", (self.theme.list_bullet)(&bullet));

            let item_lines = self.render_list_item(item, depth);
            if !matches!(item_lines.first(), Some(ItemLine::Own(_))) {
                lines.push(marker.trim_end().to_string());
            }

            let mut first_own = true;
            for line in item_lines {
                match line {
                    ItemLine::Nested(line) => lines.push(line),
                    ItemLine::Own(line) if first_own => {
                        first_own = false;
                        lines.push(format!("{marker}{line}"));
                    }
                    ItemLine::Own(line) => lines.push(format!("{indent}  {line}")),
                }
            }
        }

        lines
    }

    fn render_list_item(&self, item: &mdast::ListItem, depth: usize) -> Vec<ItemLine> {
        let mut lines = Vec::new();

        for node in item.children.iter() {
            match node {
                mdast::Node::List(list) => {
                    lines.extend(
                        self.render_list(list, depth + 1)
                            .into_iter()
                            .map(ItemLine::Nested),
                    );
                }
                mdast::Node::Code(code) => {
                    lines.extend(self.render_code_block(code).into_iter().map(ItemLine::Own));
                }
                _ => {
                    let text = self
                        .render_inline_nodes(std::slice::from_ref(node), InlineStyleKind::Default);
                    if !text.is_empty() {
                        lines.extend(text.split('\n').map(|line| ItemLine::Own(line.to_string())));
                    }
                }
            }
        }

        lines
    }

    fn render_blockquote(&self, blockquote: &mdast::Blockquote) -> Vec<String> {
        let mut blocks = Vec::new();
        for child in &blockquote.children {
            let block = match child {
                mdast::Node::Blockquote(inner) => self.render_blockquote(inner).join("\n"),
                mdast::Node::List(list) => self.render_list(list, 0).join("\n"),
                mdast::Node::Code(code) => self.render_code_block(code).join("\n"),
                other => {
                    self.render_inline_nodes(std::slice::from_ref(other), InlineStyleKind::Quote)
                }
            };
            blocks.push(block);
        }

        blocks
            .join("\n")
            .split('\n')
            .map(|line| format!("{}{line}", (self.theme.quote_border)("│ ")))
            .collect()
    }

    /// Boxed table at natural column widths. Falls back to the raw source
    /// when the box would not fit in `width`.
    fn render_table(&self, table: &mdast::Table, width: usize, raw: Option<&str>) -> Vec<String> {
        let rows: Vec<Vec<String>> = table
            .children
            .iter()
            .filter_map(|node| match node {
                mdast::Node::TableRow(row) => Some(
                    row.children
                        .iter()
                        .map(|cell| self.render_cell_text(cell))
                        .collect(),
                ),
                _ => None,
            })
            .collect();

        let num_cols = rows.first().map_or(0, Vec::len);
        if num_cols == 0 {
            return Vec::new();
        }

        let mut column_widths = vec![0usize; num_cols];
        for row in &rows {
            for (col_idx, cell) in row.iter().enumerate().take(num_cols) {
                column_widths[col_idx] = column_widths[col_idx].max(visible_width(cell));
            }
        }

        let border_overhead = 3 * num_cols + 1;
        let total_width = column_widths.iter().sum::<usize>() + border_overhead;
        if total_width > width {
            if let Some(raw) = raw {
                return raw.split('\n').map(str::to_string).collect();
            }
        }

        let border = |left: &str, join: &str, right: &str| {
            let cells: Vec<String> = column_widths.iter().map(|w| "─".repeat(*w)).collect();
            format!("{left}─{}─{right}", cells.join(&format!("─{join}─")))
        };
        let row_line = |cells: &[String], header: bool| {
            let parts: Vec<String> = column_widths
                .iter()
                .enumerate()
                .map(|(col_idx, col_width)| {
                    let text = cells.get(col_idx).map(String::as_str).unwrap_or_default();
                    let padding = col_width.saturating_sub(visible_width(text));
                    let padded = format!("{text}{}", " ".repeat(padding));
                    if header {
                        (self.theme.bold)(&padded)
                    } else {
                        padded
                    }
                })
                .collect();
            format!("│ {} │", parts.join(" │ "))
        };

        let separator_line = border("├", "┼", "┤");
        let mut lines = vec![border("┌", "┬", "┐"), row_line(&rows[0], true)];
        lines.push(separator_line.clone());
        for (row_index, row) in rows.iter().enumerate().skip(1) {
            lines.push(row_line(row, false));
            if row_index < rows.len() - 1 {
                lines.push(separator_line.clone());
            }
        }
        lines.push(border("└", "┴", "┘"));
        lines
    }

    fn render_cell_text(&self, cell: &mdast::Node) -> String {
        match cell {
            mdast::Node::TableCell(table_cell) => {
                self.render_inline_nodes(&table_cell.children, InlineStyleKind::Default)
            }
            other => self.render_inline_nodes(std::slice::from_ref(other), InlineStyleKind::Default),
        }
    }

    fn render_node(
        &self,
        node: &mdast::Node,
        width: usize,
        next_is_list: bool,
        has_next: bool,
        space_after: bool,
        raw: Option<&str>,
    ) -> Vec<String> {
        let mut lines = match node {
            mdast::Node::Heading(heading) => {
                let heading_text =
                    self.render_inline_nodes(&heading.children, InlineStyleKind::Default);
                let styled = match heading.depth {
                    1 => (self.theme.heading)(&(self.theme.bold)(&(self.theme.underline)(
                        &heading_text,
                    ))),
                    2 => (self.theme.heading)(&(self.theme.bold)(&heading_text)),
                    _ => {
                        let prefix = "#".repeat(heading.depth as usize);
                        (self.theme.heading)(&(self.theme.bold)(&format!(
                            "{prefix} {heading_text}"
                        )))
                    }
                };
                vec![styled]
            }
            mdast::Node::Paragraph(paragraph) => {
                let paragraph_text =
                    self.render_inline_nodes(&paragraph.children, InlineStyleKind::Default);
                let mut lines = vec![paragraph_text];
                if has_next && !next_is_list && !space_after {
                    lines.push(String::new());
                }
                return lines;
            }
            mdast::Node::Code(code) => self.render_code_block(code),
            mdast::Node::List(list) => return self.render_list(list, 0),
            mdast::Node::Blockquote(blockquote) => self.render_blockquote(blockquote),
            mdast::Node::ThematicBreak(_) => {
                vec![(self.theme.hr)(&"─".repeat(width.min(80)))]
            }
            mdast::Node::Table(table) => self.render_table(table, width, raw),
            mdast::Node::Html(html) => return vec![html.value.trim().to_string()],
            mdast::Node::Text(text) => return vec![text.value.clone()],
            mdast::Node::Break(_) => return vec![String::new()],
            _ => return Vec::new(),
        };

        if !space_after {
            lines.push(String::new());
        }
        lines
    }
}

fn plain_text_from_nodes(nodes: &[mdast::Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        match node {
            mdast::Node::Text(text) => out.push_str(&text.value),
            mdast::Node::InlineCode(code) => out.push_str(&code.value),
            mdast::Node::Strong(strong) => out.push_str(&plain_text_from_nodes(&strong.children)),
            mdast::Node::Emphasis(emphasis) => {
                out.push_str(&plain_text_from_nodes(&emphasis.children))
            }
            mdast::Node::Delete(delete) => out.push_str(&plain_text_from_nodes(&delete.children)),
            mdast::Node::Link(link) => out.push_str(&plain_text_from_nodes(&link.children)),
            mdast::Node::Html(html) => out.push_str(&html.value),
            mdast::Node::Image(image) => out.push_str(&image.alt),
            mdast::Node::Paragraph(paragraph) => {
                out.push_str(&plain_text_from_nodes(&paragraph.children))
            }
            _ => {}
        }
    }
    out
}

fn node_position(node: &mdast::Node) -> Option<(usize, usize)> {
    let position = match node {
        mdast::Node::Heading(heading) => heading.position.as_ref(),
        mdast::Node::Paragraph(paragraph) => paragraph.position.as_ref(),
        mdast::Node::Code(code) => code.position.as_ref(),
        mdast::Node::List(list) => list.position.as_ref(),
        mdast::Node::Blockquote(blockquote) => blockquote.position.as_ref(),
        mdast::Node::ThematicBreak(thematic) => thematic.position.as_ref(),
        mdast::Node::Html(html) => html.position.as_ref(),
        mdast::Node::Table(table) => table.position.as_ref(),
        mdast::Node::Text(text) => text.position.as_ref(),
        _ => None,
    };
    position.map(|pos| (pos.end.offset, pos.start.offset))
}

fn raw_slice_between(node: &mdast::Node, source: &str) -> Option<String> {
    let position = match node {
        mdast::Node::Table(table) => table.position.as_ref(),
        _ => None,
    }?;

    let start = position.start.offset.min(source.len());
    let end = position.end.offset.min(source.len());
    if start >= end {
        return None;
    }
    source.get(start..end).map(str::to_string)
}

fn has_blank_line_between(source: &str, end: usize, start: usize) -> bool {
    if start <= end || end >= source.len() {
        return false;
    }
    let Some(slice) = source.get(end..start.min(source.len())) else {
        return false;
    };
    let mut saw_newline = false;
    let mut only_whitespace = true;

    for ch in slice.chars() {
        if ch == '\n' || ch == '\r' {
            if saw_newline && only_whitespace {
                return true;
            }
            saw_newline = true;
            only_whitespace = true;
        } else if ch.is_whitespace() {
            if saw_newline {
                continue;
            }
        } else {
            saw_newline = false;
            only_whitespace = false;
        }
    }

    false
}
